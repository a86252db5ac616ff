// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plugin module contract.
//!
//! A module is a unit of extensibility logic owned by one plugin. It
//! implements any subset of the lifecycle hooks below; every hook defaults to
//! a no-op. Hooks are called by the composite application in a fixed order:
//!
//! 1. `compose` (bind known-type slots)
//! 2. `initialize`, then `configure`
//! 3. `register_default_components`
//! 4. `scan_own_plugin`, `register_components`, `scan_other_plugins`,
//!    `scan_application_plugins`
//! 5. `start`, then `run`
//! 6. `stop`
//! 7. `dispose`

use std::sync::Arc;

use plexus_core::{
    CapabilityType, ContainerConfig, PlexusError, PluginTier, ServiceCollection,
    ServiceDescriptor, ServiceLifetime, ServiceProvider, ServiceResolver, ServiceScope,
    short_type_name,
};
use serde_json::{Map, Value};

use crate::known_types::KnownTypeSlots;
use crate::plugin::Plugin;
use crate::plugin_type::PluginType;

/// Read access handed to every hook.
pub struct ModuleContext<'a> {
    plugin: &'a Plugin,
    plugins: &'a [Plugin],
    span: tracing::Span,
}

impl<'a> ModuleContext<'a> {
    pub fn new(plugin: &'a Plugin, plugins: &'a [Plugin], span: tracing::Span) -> Self {
        Self {
            plugin,
            plugins,
            span,
        }
    }

    /// The plugin that owns the module.
    pub fn plugin(&self) -> &'a Plugin {
        self.plugin
    }

    /// Every plugin of the application, in discovery order.
    pub fn plugins(&self) -> &'a [Plugin] {
        self.plugins
    }

    pub fn plugins_in(&self, tier: PluginTier) -> impl Iterator<Item = &'a Plugin> {
        self.plugins.iter().filter(move |p| p.tier() == tier)
    }

    /// Config of type `T` routed to the owning plugin.
    pub fn config<T: ContainerConfig>(&self) -> Option<&'a T> {
        self.plugin.config::<T>()
    }

    /// Span the hook runs in.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }
}

/// Explicit service registrations made by a module.
///
/// Every registration is attributed to the module's plugin.
pub struct ServiceRegistrar<'a> {
    services: &'a mut ServiceCollection,
    plugin_id: &'a str,
}

impl<'a> ServiceRegistrar<'a> {
    pub fn new(services: &'a mut ServiceCollection, plugin_id: &'a str) -> Self {
        Self {
            services,
            plugin_id,
        }
    }

    pub fn add<C, F>(&mut self, lifetime: ServiceLifetime, factory: F) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceResolver<'_>) -> Result<Arc<C>, PlexusError> + Send + Sync + 'static,
    {
        let plugin_id = self.plugin_id;
        self.services.add(lifetime, factory).from_plugin(plugin_id)
    }

    pub fn add_singleton<C, F>(&mut self, factory: F) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceResolver<'_>) -> Result<Arc<C>, PlexusError> + Send + Sync + 'static,
    {
        self.add(ServiceLifetime::Singleton, factory)
    }

    pub fn add_scoped<C, F>(&mut self, factory: F) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceResolver<'_>) -> Result<Arc<C>, PlexusError> + Send + Sync + 'static,
    {
        self.add(ServiceLifetime::Scoped, factory)
    }

    pub fn add_transient<C, F>(&mut self, factory: F) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceResolver<'_>) -> Result<Arc<C>, PlexusError> + Send + Sync + 'static,
    {
        self.add(ServiceLifetime::Transient, factory)
    }

    pub fn add_instance<C>(&mut self, instance: Arc<C>) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let plugin_id = self.plugin_id;
        self.services.add_instance(instance).from_plugin(plugin_id)
    }

    /// Registrations made so far by every module.
    pub fn services(&self) -> &ServiceCollection {
        &*self.services
    }

    pub fn plugin_id(&self) -> &str {
        self.plugin_id
    }
}

/// Service registration by scanning a scope of declared types.
///
/// Scanned registrations are attributed to the plugin that declares the
/// implementing type.
pub struct TypeRegistration<'a> {
    registrar: ServiceRegistrar<'a>,
    scope: Vec<&'a PluginType>,
}

impl<'a> TypeRegistration<'a> {
    pub fn new(registrar: ServiceRegistrar<'a>, scope: Vec<&'a PluginType>) -> Self {
        Self { registrar, scope }
    }

    /// Types being scanned.
    pub fn types(&self) -> &[&'a PluginType] {
        &self.scope
    }

    /// Register every concrete type in scope that can be activated as `C`.
    ///
    /// Returns the number of registrations made.
    pub fn register_contract<C>(&mut self, lifetime: ServiceLifetime) -> usize
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let contract = CapabilityType::of::<C>();
        let scope = self.scope.clone();
        let mut registered = 0;
        for ty in scope {
            if ty.is_concrete() && self.register_type(ty, contract, lifetime) {
                registered += 1;
            }
        }
        registered
    }

    /// Register one type under `contract`. Returns false when the type has no
    /// activator for it.
    pub fn register_type(
        &mut self,
        ty: &PluginType,
        contract: CapabilityType,
        lifetime: ServiceLifetime,
    ) -> bool {
        let Some(activator) = ty.activator(contract) else {
            return false;
        };
        let owner = ty.plugin_id().unwrap_or(self.registrar.plugin_id);
        self.registrar
            .services
            .add_activator(lifetime, activator, ty.short_name())
            .from_plugin(owner);
        tracing::debug!(
            contract = %contract.short_name(),
            implementation = %ty.short_name(),
            %lifetime,
            "registered scanned type"
        );
        true
    }

    pub fn registrar(&mut self) -> &mut ServiceRegistrar<'a> {
        &mut self.registrar
    }
}

/// A unit of extensibility logic owned by one plugin.
///
/// Hooks that return errors abort the current lifecycle pass; the error is
/// wrapped with the phase, plugin, and module that raised it.
pub trait PluginModule: Send {
    /// Display name used in logs and diagnostics.
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Declare and fill known-type slots.
    fn compose(&mut self, _slots: &mut KnownTypeSlots<'_>) {}

    fn initialize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), PlexusError> {
        Ok(())
    }

    fn configure(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), PlexusError> {
        Ok(())
    }

    /// Register defaults that later registrations may override.
    fn register_default_components(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registrar: &mut ServiceRegistrar<'_>,
    ) -> Result<(), PlexusError> {
        Ok(())
    }

    fn scan_own_plugin(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registration: &mut TypeRegistration<'_>,
    ) -> Result<(), PlexusError> {
        Ok(())
    }

    fn scan_other_plugins(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registration: &mut TypeRegistration<'_>,
    ) -> Result<(), PlexusError> {
        Ok(())
    }

    /// Core plugins only: scan types of AppComponent and AppHost plugins.
    fn scan_application_plugins(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registration: &mut TypeRegistration<'_>,
    ) -> Result<(), PlexusError> {
        Ok(())
    }

    fn register_components(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registrar: &mut ServiceRegistrar<'_>,
    ) -> Result<(), PlexusError> {
        Ok(())
    }

    fn start(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _services: &ServiceProvider,
        _scope: &ServiceScope,
    ) -> Result<(), PlexusError> {
        Ok(())
    }

    fn run(&mut self, _ctx: &ModuleContext<'_>, _scope: &ServiceScope) -> Result<(), PlexusError> {
        Ok(())
    }

    fn stop(&mut self, _ctx: &ModuleContext<'_>, _scope: &ServiceScope) -> Result<(), PlexusError> {
        Ok(())
    }

    /// Release resources. Called once, after stop.
    fn dispose(&mut self) -> Result<(), PlexusError> {
        Ok(())
    }

    /// Add diagnostic entries to the composite log.
    fn log(&self, _log: &mut Map<String, Value>) {}
}
