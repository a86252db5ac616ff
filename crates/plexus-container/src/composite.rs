// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The composed application: plugins, their modules, and the ordered hook
//! passes that compose, register, start, stop, and dispose them.
//!
//! Plugins are held in discovery order. Lifecycle passes walk them in tier
//! order (Core, then AppComponent, then the AppHost) and, within a plugin,
//! walk modules in declaration order. Stop walks the start order backwards.

use serde_json::{Map, Value};

use plexus_core::{
    HookPhase, PlexusError, PluginTier, ServiceCollection, ServiceProvider, ServiceScope,
};
use plexus_plugin::{
    ModuleContext, Plugin, PluginModule, PluginType, ServiceRegistrar, TypeRegistration,
    TypeResolver,
};

type Modules = Vec<Vec<Box<dyn PluginModule>>>;

/// Plugins and module instances of one application.
pub struct CompositeApplication {
    plugins: Vec<Plugin>,
    modules: Modules,
    is_started: bool,
}

impl CompositeApplication {
    /// `modules[i]` holds the module instances of `plugins[i]`.
    pub fn new(plugins: Vec<Plugin>, modules: Modules) -> Result<Self, PlexusError> {
        if plugins.len() != modules.len() {
            return Err(PlexusError::Internal(format!(
                "{} plugins but {} module sets",
                plugins.len(),
                modules.len()
            )));
        }
        Ok(Self {
            plugins,
            modules,
            is_started: false,
        })
    }

    /// Every plugin, in discovery order.
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn plugin(&self, plugin_id: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.plugin_id() == plugin_id)
    }

    pub fn host_plugin(&self) -> Option<&Plugin> {
        self.plugins_in(PluginTier::AppHost).next()
    }

    pub fn component_plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins_in(PluginTier::AppComponent)
    }

    pub fn core_plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins_in(PluginTier::Core)
    }

    pub fn plugins_in(&self, tier: PluginTier) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter().filter(move |p| p.tier() == tier)
    }

    /// Types declared by plugins of the given tiers.
    pub fn plugin_types(&self, tiers: &[PluginTier]) -> Vec<&PluginType> {
        types_in(&self.plugins, tiers, None)
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }

    /// Bind every module's known-type slots and record each plugin's
    /// discovered capability types.
    ///
    /// Core modules bind against every declared type; application modules
    /// bind against AppComponent and AppHost types only.
    pub fn compose(&mut self, resolver: &dyn TypeResolver) -> Result<(), PlexusError> {
        let order = tier_order(&self.plugins);
        let plugins = &self.plugins;
        let universe = types_in(plugins, &PluginTier::ALL, None);
        let application = types_in(plugins, &PluginTier::APPLICATION, None);

        for index in order {
            let plugin = &plugins[index];
            let scope = if plugin.tier() == PluginTier::Core {
                &universe
            } else {
                &application
            };

            let mut discovered = Vec::new();
            for module in &mut self.modules[index] {
                let span = hook_span(plugin, &**module, HookPhase::Compose);
                let _entered = span.enter();
                for capability in resolver.bind_known_types(&mut **module, scope) {
                    if !discovered.contains(&capability) {
                        discovered.push(capability);
                    }
                }
            }
            tracing::debug!(
                plugin = %plugin.name(),
                scope = scope.len(),
                discovered = discovered.len(),
                "composed plugin"
            );
            plugin.set_discovered_types(discovered)?;
        }
        Ok(())
    }

    /// Record, on every concrete known type, the plugins whose modules
    /// discovered it.
    pub fn set_known_type_discoveries(&self) -> Result<(), PlexusError> {
        for owner in &self.plugins {
            for ty in owner.types() {
                if !ty.is_concrete() || !ty.is_known_type() {
                    continue;
                }
                let discoverers: Vec<String> = self
                    .plugins
                    .iter()
                    .filter(|p| p.tier() == PluginTier::Core || owner.tier().is_application())
                    .filter(|p| {
                        p.discovered_types()
                            .iter()
                            .any(|capability| ty.implements_contract(*capability))
                    })
                    .map(|p| p.name().to_string())
                    .collect();
                ty.record_discovered_by(discoverers)?;
            }
        }
        Ok(())
    }

    /// Run every registration hook in order. Host registrations are applied
    /// by the caller afterwards.
    pub fn register_components(&mut self, services: &mut ServiceCollection) -> Result<(), PlexusError> {
        let plugins = &self.plugins;
        let modules = &mut self.modules;
        let tiers = tier_order(plugins);

        for &index in &tiers {
            let order = module_order(modules, &[index]);
            invoke(plugins, modules, &order, HookPhase::Initialize, |module, ctx| {
                module.initialize(ctx)
            })?;
            invoke(plugins, modules, &order, HookPhase::Configure, |module, ctx| {
                module.configure(ctx)
            })?;
        }

        let all = module_order(modules, &tiers);
        invoke(
            plugins,
            modules,
            &all,
            HookPhase::RegisterDefaultComponents,
            |module, ctx| {
                let mut registrar = ServiceRegistrar::new(&mut *services, ctx.plugin().plugin_id());
                module.register_default_components(ctx, &mut registrar)
            },
        )?;

        let application = types_in(plugins, &PluginTier::APPLICATION, None);
        for &index in &tiers {
            let plugin = &plugins[index];
            let order = module_order(modules, &[index]);
            let own: Vec<&PluginType> = plugin.types().iter().collect();
            let others = if plugin.tier() == PluginTier::Core {
                types_in(plugins, &PluginTier::ALL, Some(index))
            } else {
                types_in(plugins, &PluginTier::APPLICATION, Some(index))
            };

            scan(
                plugins,
                modules,
                &order,
                HookPhase::ScanOwnPlugin,
                services,
                &own,
                |module, ctx, registration| module.scan_own_plugin(ctx, registration),
            )?;
            invoke(plugins, modules, &order, HookPhase::RegisterComponents, |module, ctx| {
                let mut registrar = ServiceRegistrar::new(&mut *services, ctx.plugin().plugin_id());
                module.register_components(ctx, &mut registrar)
            })?;
            scan(
                plugins,
                modules,
                &order,
                HookPhase::ScanOtherPlugins,
                services,
                &others,
                |module, ctx, registration| module.scan_other_plugins(ctx, registration),
            )?;
            if plugin.tier() == PluginTier::Core {
                scan(
                    plugins,
                    modules,
                    &order,
                    HookPhase::ScanApplicationPlugins,
                    services,
                    &application,
                    |module, ctx, registration| module.scan_application_plugins(ctx, registration),
                )?;
            }
        }

        tracing::debug!(services = services.len(), "registered plugin components");
        Ok(())
    }

    /// Start modules tier by tier inside one service scope, then run them in
    /// discovery order.
    pub fn start(&mut self, services: &ServiceProvider) -> Result<(), PlexusError> {
        if self.is_started {
            return Err(PlexusError::Misuse("the application has already been started".into()));
        }
        self.is_started = true;

        let scope = services.create_scope();
        let plugins = &self.plugins;
        let modules = &mut self.modules;

        let start_order = module_order(modules, &tier_order(plugins));
        invoke(plugins, modules, &start_order, HookPhase::Start, |module, ctx| {
            module.start(ctx, services, &scope)
        })?;

        let discovery: Vec<usize> = (0..plugins.len()).collect();
        let run_order = module_order(modules, &discovery);
        invoke(plugins, modules, &run_order, HookPhase::Run, |module, ctx| {
            module.run(ctx, &scope)
        })
    }

    /// Stop modules in the exact reverse of the start order.
    pub fn stop(&mut self, services: &ServiceProvider) -> Result<(), PlexusError> {
        if !self.is_started {
            return Err(PlexusError::Misuse("the application has not been started".into()));
        }

        let scope = services.create_scope();
        let plugins = &self.plugins;
        let modules = &mut self.modules;

        let mut order = module_order(modules, &tier_order(plugins));
        order.reverse();
        invoke(plugins, modules, &order, HookPhase::Stop, |module, ctx| {
            module.stop(ctx, &scope)
        })?;

        self.is_started = false;
        Ok(())
    }

    /// Call every module's dispose hook, in stop order, continuing past
    /// failures. Returns the failures.
    pub fn dispose_modules(&mut self) -> Vec<PlexusError> {
        let mut order = module_order(&self.modules, &tier_order(&self.plugins));
        order.reverse();

        let mut failures = Vec::new();
        for (p, m) in order {
            let plugin = &self.plugins[p];
            let module = &mut self.modules[p][m];
            let span = hook_span(plugin, &**module, HookPhase::Dispose);
            let _entered = span.enter();
            if let Err(source) = module.dispose() {
                let err = PlexusError::module_execution(
                    HookPhase::Dispose,
                    plugin.name(),
                    module.name(),
                    source,
                );
                tracing::warn!(error = %err, "module dispose failed");
                failures.push(err);
            }
        }
        failures
    }

    /// Diagnostic entries of the plugin's modules, keyed by module name.
    pub fn module_logs(&self, plugin_id: &str) -> Map<String, Value> {
        let mut logs = Map::new();
        let Some(index) = self.plugins.iter().position(|p| p.plugin_id() == plugin_id) else {
            return logs;
        };
        for module in &self.modules[index] {
            let mut entries = Map::new();
            module.log(&mut entries);
            logs.insert(module.name(), Value::Object(entries));
        }
        logs
    }
}

impl std::fmt::Debug for CompositeApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeApplication")
            .field("plugins", &self.plugins)
            .field("is_started", &self.is_started)
            .finish()
    }
}

/// Plugin indices, Core first, then AppComponent, then AppHost. Stable
/// within a tier.
fn tier_order(plugins: &[Plugin]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..plugins.len()).collect();
    order.sort_by_key(|&index| plugins[index].tier());
    order
}

/// `(plugin, module)` pairs for the given plugins, modules in declaration
/// order.
fn module_order(modules: &[Vec<Box<dyn PluginModule>>], plugins: &[usize]) -> Vec<(usize, usize)> {
    plugins
        .iter()
        .flat_map(|&p| (0..modules[p].len()).map(move |m| (p, m)))
        .collect()
}

fn types_in<'a>(plugins: &'a [Plugin], tiers: &[PluginTier], except: Option<usize>) -> Vec<&'a PluginType> {
    plugins
        .iter()
        .enumerate()
        .filter(|(index, plugin)| Some(*index) != except && tiers.contains(&plugin.tier()))
        .flat_map(|(_, plugin)| plugin.types())
        .collect()
}

fn hook_span(plugin: &Plugin, module: &dyn PluginModule, phase: HookPhase) -> tracing::Span {
    tracing::debug_span!(
        "module",
        plugin = %plugin.name(),
        module = %module.name(),
        %phase
    )
}

/// Run one hook over `order`, stopping at the first failure.
fn invoke<F>(
    plugins: &[Plugin],
    modules: &mut [Vec<Box<dyn PluginModule>>],
    order: &[(usize, usize)],
    phase: HookPhase,
    mut hook: F,
) -> Result<(), PlexusError>
where
    F: FnMut(&mut dyn PluginModule, &ModuleContext<'_>) -> Result<(), PlexusError>,
{
    for &(p, m) in order {
        let plugin = &plugins[p];
        let module = &mut modules[p][m];
        let span = hook_span(plugin, &**module, phase);
        let _entered = span.enter();
        let ctx = ModuleContext::new(plugin, plugins, span.clone());
        hook(&mut **module, &ctx).map_err(|source| {
            PlexusError::module_execution(phase, plugin.name(), module.name(), source)
        })?;
    }
    Ok(())
}

/// Run one scanning hook over `order`, each call scanning `scope`.
fn scan<F>(
    plugins: &[Plugin],
    modules: &mut [Vec<Box<dyn PluginModule>>],
    order: &[(usize, usize)],
    phase: HookPhase,
    services: &mut ServiceCollection,
    scope: &[&PluginType],
    mut hook: F,
) -> Result<(), PlexusError>
where
    F: FnMut(&mut dyn PluginModule, &ModuleContext<'_>, &mut TypeRegistration<'_>) -> Result<(), PlexusError>,
{
    invoke(plugins, modules, order, phase, |module, ctx| {
        let registrar = ServiceRegistrar::new(&mut *services, ctx.plugin().plugin_id());
        let mut registration = TypeRegistration::new(registrar, scope.to_vec());
        hook(module, ctx, &mut registration)
    })
}
