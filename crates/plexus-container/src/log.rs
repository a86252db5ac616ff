// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only diagnostic projection of a composed application.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use plexus_core::{PlexusError, PluginTier, ServiceLifetime, ServiceProvider};
use plexus_plugin::Plugin;

use crate::composite::CompositeApplication;

/// Everything the container composed, grouped by tier.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeLog {
    pub search_patterns: Vec<String>,
    pub searched_assemblies: SearchedAssemblies,
    pub application_host: Option<PluginLog>,
    pub component_plugins: BTreeMap<String, PluginLog>,
    pub core_plugins: BTreeMap<String, PluginLog>,
}

/// Units that contributed a plugin, per tier.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchedAssemblies {
    pub app_host: Vec<String>,
    pub app_components: Vec<String>,
    pub core: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginLog {
    pub name: String,
    pub plugin_id: String,
    pub assembly: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub modules: Map<String, Value>,
    /// Concrete known types declared by the plugin, with the plugins that
    /// discovered each one.
    pub known_types: BTreeMap<String, Vec<String>>,
    pub discovered_types: Vec<String>,
    /// Registered services keyed by implementation.
    pub services: BTreeMap<String, Vec<ServiceLog>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceLog {
    pub contract: String,
    pub lifetime: ServiceLifetime,
}

impl CompositeLog {
    pub fn new(
        application: &CompositeApplication,
        services: &ServiceProvider,
        search_patterns: &[String],
    ) -> Self {
        let mut searched = SearchedAssemblies::default();
        let mut component_plugins = BTreeMap::new();
        let mut core_plugins = BTreeMap::new();
        let mut application_host = None;

        for plugin in application.plugins() {
            let entry = PluginLog::new(plugin, application, services);
            let assembly = plugin.manifest().assembly_name.clone();
            match plugin.tier() {
                PluginTier::AppHost => {
                    searched.app_host.push(assembly);
                    application_host = Some(entry);
                }
                PluginTier::AppComponent => {
                    searched.app_components.push(assembly);
                    component_plugins.insert(plugin.name().to_string(), entry);
                }
                PluginTier::Core => {
                    searched.core.push(assembly);
                    core_plugins.insert(plugin.name().to_string(), entry);
                }
            }
        }

        Self {
            search_patterns: search_patterns.to_vec(),
            searched_assemblies: searched,
            application_host,
            component_plugins,
            core_plugins,
        }
    }

    /// Entry for the plugin with the given name, in any tier.
    pub fn plugin(&self, name: &str) -> Option<&PluginLog> {
        self.application_host
            .as_ref()
            .filter(|host| host.name == name)
            .or_else(|| self.component_plugins.get(name))
            .or_else(|| self.core_plugins.get(name))
    }

    pub fn to_json(&self) -> Result<String, PlexusError> {
        serde_json::to_string(self)
            .map_err(|e| PlexusError::Internal(format!("failed to serialize composite log: {e}")))
    }

    pub fn to_json_pretty(&self) -> Result<String, PlexusError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PlexusError::Internal(format!("failed to serialize composite log: {e}")))
    }
}

impl PluginLog {
    fn new(plugin: &Plugin, application: &CompositeApplication, services: &ServiceProvider) -> Self {
        let manifest = plugin.manifest();

        let known_types = plugin
            .types()
            .iter()
            .filter(|ty| ty.is_concrete() && ty.is_known_type())
            .map(|ty| (ty.short_name(), ty.discovered_by().to_vec()))
            .collect();

        let discovered_types = plugin
            .discovered_types()
            .iter()
            .map(|capability| capability.short_name())
            .collect();

        let mut grouped: BTreeMap<String, Vec<ServiceLog>> = BTreeMap::new();
        for descriptor in services
            .descriptors()
            .iter()
            .filter(|d| d.plugin_id() == Some(plugin.plugin_id()))
        {
            grouped
                .entry(descriptor.implementation().to_string())
                .or_default()
                .push(ServiceLog {
                    contract: descriptor.contract().short_name(),
                    lifetime: descriptor.lifetime(),
                });
        }

        Self {
            name: manifest.name.clone(),
            plugin_id: manifest.plugin_id.clone(),
            assembly: manifest.assembly_name.clone(),
            description: manifest.description.clone(),
            version: manifest.version.clone(),
            modules: application.module_logs(plugin.plugin_id()),
            known_types,
            discovered_types,
            services: grouped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use plexus_core::ServiceCollection;
    use plexus_plugin::{PluginManifest, PluginModule, ServiceRegistrar};

    trait Clock: Send + Sync {}

    struct SystemClock;

    impl Clock for SystemClock {}

    struct ClockModule;

    impl PluginModule for ClockModule {
        fn log(&self, log: &mut Map<String, Value>) {
            log.insert("precision".into(), Value::from("ms"));
        }
    }

    fn plugin(id: &str, name: &str, tier: PluginTier) -> Plugin {
        let plugin = Plugin::new(
            PluginManifest::new(id, name, format!("{id}.unit"), tier).with_description("test"),
        );
        plugin.set_types(vec![]).unwrap();
        plugin.set_module_names(vec![]).unwrap();
        plugin.set_configs(vec![]).unwrap();
        plugin.set_discovered_types(vec![]).unwrap();
        plugin
    }

    fn composed() -> (CompositeApplication, ServiceProvider) {
        let application = CompositeApplication::new(
            vec![
                plugin("c", "Clock", PluginTier::Core),
                plugin("o", "Orders", PluginTier::AppComponent),
                plugin("h", "Host", PluginTier::AppHost),
            ],
            vec![vec![Box::new(ClockModule)], vec![], vec![]],
        )
        .unwrap();

        let mut services = ServiceCollection::new();
        ServiceRegistrar::new(&mut services, "c")
            .add_instance::<dyn Clock>(Arc::new(SystemClock))
            .implemented_by::<SystemClock>();
        (application, services.build())
    }

    #[test]
    fn plugins_are_grouped_by_tier() {
        let (application, services) = composed();
        let log = CompositeLog::new(&application, &services, &["*".to_string()]);

        assert_eq!(log.application_host.as_ref().map(|h| h.name.as_str()), Some("Host"));
        assert!(log.component_plugins.contains_key("Orders"));
        assert!(log.core_plugins.contains_key("Clock"));
        assert_eq!(log.searched_assemblies.core, vec!["c.unit"]);
        assert_eq!(log.searched_assemblies.app_host, vec!["h.unit"]);
        assert_eq!(log.plugin("Host").map(|p| p.plugin_id.as_str()), Some("h"));
    }

    #[test]
    fn services_and_module_logs_are_attributed() {
        let (application, services) = composed();
        let log = CompositeLog::new(&application, &services, &[]);

        let clock = log.plugin("Clock").unwrap();
        assert_eq!(
            clock.services.get("SystemClock"),
            Some(&vec![ServiceLog {
                contract: "Clock".into(),
                lifetime: ServiceLifetime::Singleton,
            }])
        );
        assert_eq!(clock.modules["ClockModule"]["precision"], "ms");
        assert!(log.plugin("Orders").unwrap().services.is_empty());
    }

    #[test]
    fn serializes_to_json() {
        let (application, services) = composed();
        let log = CompositeLog::new(&application, &services, &["acme.*".to_string()]);
        let value: Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();

        assert_eq!(value["search_patterns"][0], "acme.*");
        assert_eq!(value["application_host"]["description"], "test");
        assert!(value["application_host"].get("version").is_none());
        assert_eq!(value["core_plugins"]["Clock"]["services"]["SystemClock"][0]["lifetime"], "Singleton");
    }
}
