// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by discovery, composition, and the service registry.

use std::any::TypeId;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Architectural layer of a plugin.
///
/// Tiers determine composition scope and the order of registration,
/// start, and stop. The derived ordering is the start order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum PluginTier {
    /// Generic functionality reusable across applications.
    Core,
    /// Application-specific components.
    AppComponent,
    /// The process hosting the application. Exactly one per system.
    AppHost,
}

impl PluginTier {
    /// All tiers in start order.
    pub const ALL: [PluginTier; 3] = [PluginTier::Core, PluginTier::AppComponent, PluginTier::AppHost];

    /// Tiers visible to application code during capability discovery.
    pub const APPLICATION: [PluginTier; 2] = [PluginTier::AppComponent, PluginTier::AppHost];

    /// Returns true for AppComponent and AppHost.
    pub fn is_application(self) -> bool {
        matches!(self, PluginTier::AppComponent | PluginTier::AppHost)
    }
}

/// How long a resolved service instance lives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ServiceLifetime {
    /// One instance for the whole registry.
    Singleton,
    /// One instance per service scope.
    Scoped,
    /// A new instance on every resolution.
    Transient,
}

/// Lifecycle hook being executed when a module fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HookPhase {
    Compose,
    Initialize,
    Configure,
    RegisterDefaultComponents,
    ScanOwnPlugin,
    ScanOtherPlugins,
    ScanApplicationPlugins,
    RegisterComponents,
    Start,
    Run,
    Stop,
    Dispose,
}

/// Identity of a capability or service contract, usually a trait object type
/// such as `dyn MessageHandler`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityType {
    id: TypeId,
    name: &'static str,
}

impl CapabilityType {
    /// Identity of the contract `C`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

impl fmt::Debug for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strip the module path (and a leading `dyn `) from a type name.
///
/// Generic arguments are kept as written.
pub fn short_type_name(full: &str) -> String {
    let trimmed = full.strip_prefix("dyn ").unwrap_or(full);
    let base_end = trimmed.find('<').unwrap_or(trimmed.len());
    let (base, generics) = trimmed.split_at(base_end);
    let base = base.rsplit("::").next().unwrap_or(base);
    format!("{base}{generics}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    trait Greeter {}

    #[test]
    fn tiers_order_in_start_sequence() {
        let mut tiers = vec![PluginTier::AppHost, PluginTier::Core, PluginTier::AppComponent];
        tiers.sort();
        assert_eq!(tiers, PluginTier::ALL.to_vec());
    }

    #[test]
    fn tier_parses_from_manifest_text() {
        assert_eq!(PluginTier::from_str("AppHost").unwrap(), PluginTier::AppHost);
        assert!(PluginTier::from_str("Host").is_err());
        assert!(PluginTier::AppComponent.is_application());
        assert!(!PluginTier::Core.is_application());
    }

    #[test]
    fn hook_phase_displays_snake_case() {
        assert_eq!(HookPhase::ScanOwnPlugin.to_string(), "scan_own_plugin");
        assert_eq!(HookPhase::Start.to_string(), "start");
    }

    #[test]
    fn capability_type_identifies_trait_objects() {
        let a = CapabilityType::of::<dyn Greeter>();
        let b = CapabilityType::of::<dyn Greeter>();
        assert_eq!(a, b);
        assert_ne!(a, CapabilityType::of::<String>());
        assert_eq!(a.short_name(), "Greeter");
    }

    #[test]
    fn short_type_name_keeps_generics() {
        assert_eq!(short_type_name("alloc::vec::Vec<u8>"), "Vec<u8>");
        assert_eq!(short_type_name("plain"), "plain");
        assert_eq!(short_type_name("dyn app::orders::Handler"), "Handler");
    }
}
