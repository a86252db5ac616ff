// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration objects handed to the container before build.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use plexus_core::{ConfigValue, ContainerConfig, PlexusError, ServiceCollection};
use plexus_plugin::Plugin;

/// Controls how the container reports fatal errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Log each fatal error once, at the point it is detected, before
    /// returning it.
    pub log_exceptions: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_exceptions: true,
        }
    }
}

impl ContainerConfig for LoggerConfig {}

type Registration = Arc<dyn Fn(&mut ServiceCollection) + Send + Sync>;

/// Service registrations supplied by the host.
///
/// Applied after every plugin module has registered, so they override
/// module registrations for the same contract.
#[derive(Clone, Default)]
pub struct ServiceRegistrationConfig {
    registrations: Vec<Registration>,
}

impl ServiceRegistrationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, registration: F) -> Self
    where
        F: Fn(&mut ServiceCollection) + Send + Sync + 'static,
    {
        self.registrations.push(Arc::new(registration));
        self
    }

    pub fn apply(&self, services: &mut ServiceCollection) {
        for registration in &self.registrations {
            registration(services);
        }
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl fmt::Debug for ServiceRegistrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistrationConfig")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

impl ContainerConfig for ServiceRegistrationConfig {}

/// At most one config per type.
#[derive(Debug, Clone, Default)]
pub struct ConfigSet {
    values: Vec<ConfigValue>,
}

impl ConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: ContainerConfig>(&mut self, config: T) -> Result<(), PlexusError> {
        if self.contains(TypeId::of::<T>()) {
            return Err(PlexusError::Misuse(format!(
                "a configuration of type {} has already been added",
                std::any::type_name::<T>()
            )));
        }
        self.values.push(ConfigValue::new(config));
        Ok(())
    }

    pub fn get<T: ContainerConfig>(&self) -> Option<&T> {
        self.values.iter().find_map(|value| value.downcast_ref::<T>())
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.values.iter().any(|value| value.type_id() == type_id)
    }

    /// Configs whose type the plugin declares.
    pub fn routed_to(&self, plugin: &Plugin) -> Vec<ConfigValue> {
        self.values
            .iter()
            .filter(|value| plugin.declares_type(value.type_id()))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
