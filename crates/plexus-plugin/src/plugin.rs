// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A discovered plugin: its manifest plus everything assigned during build.

use std::any::TypeId;
use std::fmt;
use std::sync::OnceLock;

use plexus_core::{CapabilityType, ConfigValue, ContainerConfig, PlexusError, PluginTier};

use crate::manifest::PluginManifest;
use crate::plugin_type::PluginType;

/// A plugin composed into the application.
///
/// Types, module names, configs, and discovered capability types are each
/// assigned exactly once, in that order. A second assignment, or one out of
/// order, is a misuse error.
pub struct Plugin {
    manifest: PluginManifest,
    types: OnceLock<Vec<PluginType>>,
    module_names: OnceLock<Vec<String>>,
    configs: OnceLock<Vec<ConfigValue>>,
    discovered_types: OnceLock<Vec<CapabilityType>>,
}

impl Plugin {
    pub fn new(manifest: PluginManifest) -> Self {
        Self {
            manifest,
            types: OnceLock::new(),
            module_names: OnceLock::new(),
            configs: OnceLock::new(),
            discovered_types: OnceLock::new(),
        }
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    pub fn plugin_id(&self) -> &str {
        &self.manifest.plugin_id
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn tier(&self) -> PluginTier {
        self.manifest.tier
    }

    pub fn set_types(&self, types: Vec<PluginType>) -> Result<(), PlexusError> {
        self.types
            .set(types)
            .map_err(|_| self.reassigned("types"))
    }

    pub fn set_module_names(&self, names: Vec<String>) -> Result<(), PlexusError> {
        self.require(self.types.get().is_some(), "modules", "types")?;
        self.module_names
            .set(names)
            .map_err(|_| self.reassigned("modules"))
    }

    pub fn set_configs(&self, configs: Vec<ConfigValue>) -> Result<(), PlexusError> {
        self.require(self.module_names.get().is_some(), "configs", "modules")?;
        self.configs
            .set(configs)
            .map_err(|_| self.reassigned("configs"))
    }

    pub fn set_discovered_types(&self, discovered: Vec<CapabilityType>) -> Result<(), PlexusError> {
        self.require(self.configs.get().is_some(), "discovered types", "configs")?;
        self.discovered_types
            .set(discovered)
            .map_err(|_| self.reassigned("discovered types"))
    }

    /// Declared types, empty until assigned.
    pub fn types(&self) -> &[PluginType] {
        self.types.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn module_names(&self) -> &[String] {
        self.module_names.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn configs(&self) -> &[ConfigValue] {
        self.configs.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Capability base types the plugin's modules resolved during composition.
    pub fn discovered_types(&self) -> &[CapabilityType] {
        self.discovered_types.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// The config of type `T` routed to this plugin, if the host supplied one.
    pub fn config<T: ContainerConfig>(&self) -> Option<&T> {
        self.configs().iter().find_map(|config| config.downcast_ref::<T>())
    }

    /// True if the plugin declares a type with the given id.
    pub fn declares_type(&self, type_id: TypeId) -> bool {
        self.types().iter().any(|t| t.type_id() == type_id)
    }

    fn reassigned(&self, what: &str) -> PlexusError {
        PlexusError::Misuse(format!("{what} already assigned for plugin {}", self.name()))
    }

    fn require(&self, ready: bool, what: &str, before: &str) -> Result<(), PlexusError> {
        if ready {
            Ok(())
        } else {
            Err(PlexusError::Misuse(format!(
                "{before} must be assigned before {what} for plugin {}",
                self.name()
            )))
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("plugin_id", &self.manifest.plugin_id)
            .field("name", &self.manifest.name)
            .field("tier", &self.manifest.tier)
            .field("types", &self.types().len())
            .field("modules", &self.module_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct QueueSettings {
        depth: usize,
    }

    impl ContainerConfig for QueueSettings {}

    fn plugin() -> Plugin {
        Plugin::new(PluginManifest::new("q", "Queue", "queue", PluginTier::Core))
    }

    #[test]
    fn assignments_happen_once_in_order() {
        let plugin = plugin();
        assert!(plugin.set_module_names(vec![]).unwrap_err().is_misuse());

        plugin.set_types(vec![PluginType::of::<QueueSettings>()]).unwrap();
        assert!(plugin.set_types(vec![]).unwrap_err().is_misuse());

        plugin.set_module_names(vec!["QueueModule".into()]).unwrap();
        plugin
            .set_configs(vec![ConfigValue::new(QueueSettings { depth: 8 })])
            .unwrap();
        plugin.set_discovered_types(vec![]).unwrap();
        assert!(plugin.set_discovered_types(vec![]).unwrap_err().is_misuse());

        assert_eq!(plugin.module_names(), ["QueueModule".to_string()]);
        assert_eq!(plugin.config::<QueueSettings>().map(|c| c.depth), Some(8));
        assert!(plugin.declares_type(TypeId::of::<QueueSettings>()));
    }

    #[test]
    fn unassigned_collections_are_empty() {
        let plugin = plugin();
        assert!(plugin.types().is_empty());
        assert!(plugin.configs().is_empty());
        assert!(plugin.config::<QueueSettings>().is_none());
    }
}
