// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Container configuration objects supplied by the host before build.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A configuration object handed to the container by the host.
///
/// At most one value per type may be added. A config whose type is declared
/// among a plugin's types is routed to that plugin during build.
pub trait ContainerConfig: Any + Send + Sync + fmt::Debug {}

/// Type-erased container config, shareable between the container and plugins.
#[derive(Clone)]
pub struct ConfigValue {
    type_id: TypeId,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    debug: String,
}

impl ConfigValue {
    pub fn new<T: ContainerConfig>(config: T) -> Self {
        let debug = format!("{config:?}");
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Arc::new(config),
            debug,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the config as its concrete type.
    pub fn downcast_ref<T: ContainerConfig>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: ContainerConfig>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigValue")
            .field("type", &self.type_name)
            .field("value", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct BrokerSettings {
        host: String,
    }

    impl ContainerConfig for BrokerSettings {}

    #[derive(Debug)]
    struct Other;

    impl ContainerConfig for Other {}

    #[test]
    fn downcast_returns_original_value() {
        let value = ConfigValue::new(BrokerSettings {
            host: "localhost".into(),
        });
        assert!(value.is::<BrokerSettings>());
        assert_eq!(value.downcast_ref::<BrokerSettings>().unwrap().host, "localhost");
        assert!(value.downcast_ref::<Other>().is_none());
    }

    #[test]
    fn debug_shows_type_and_value() {
        let value = ConfigValue::new(Other);
        let text = format!("{value:?}");
        assert!(text.contains("Other"));
    }
}
