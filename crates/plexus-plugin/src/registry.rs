// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The set of discovered manifests, partitioned by tier.
//!
//! `ManifestRegistry` is built from the raw output of a type resolver and
//! validated before any plugin is instantiated.

use std::collections::BTreeMap;

use plexus_core::{PlexusError, PluginTier};

use crate::manifest::PluginManifest;
use crate::validation::validate_manifests;

/// Validated manifests in discovery order.
#[derive(Debug, Clone)]
pub struct ManifestRegistry {
    manifests: Vec<PluginManifest>,
}

impl ManifestRegistry {
    /// Validate and wrap a discovered manifest set.
    pub fn new(manifests: Vec<PluginManifest>) -> Result<Self, PlexusError> {
        validate_manifests(&manifests)?;
        tracing::debug!(count = manifests.len(), "manifest set validated");
        Ok(Self { manifests })
    }

    /// All manifests in discovery order.
    pub fn all(&self) -> &[PluginManifest] {
        &self.manifests
    }

    /// Manifests of one tier, in discovery order.
    pub fn by_tier(&self, tier: PluginTier) -> impl Iterator<Item = &PluginManifest> {
        self.manifests.iter().filter(move |m| m.tier == tier)
    }

    /// Manifests in tier order (Core, AppComponent, AppHost), stable within a tier.
    pub fn in_tier_order(&self) -> Vec<&PluginManifest> {
        PluginTier::ALL
            .iter()
            .flat_map(|tier| self.by_tier(*tier))
            .collect()
    }

    /// The single application host.
    pub fn host(&self) -> Option<&PluginManifest> {
        self.by_tier(PluginTier::AppHost).next()
    }

    pub fn get(&self, plugin_id: &str) -> Option<&PluginManifest> {
        self.manifests.iter().find(|m| m.plugin_id == plugin_id)
    }

    /// Unit names holding plugins, grouped by tier.
    pub fn assemblies_by_tier(&self) -> BTreeMap<PluginTier, Vec<String>> {
        let mut grouped: BTreeMap<PluginTier, Vec<String>> = BTreeMap::new();
        for manifest in &self.manifests {
            let units = grouped.entry(manifest.tier).or_default();
            if !units.contains(&manifest.assembly_name) {
                units.push(manifest.assembly_name.clone());
            }
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    pub fn into_manifests(self) -> Vec<PluginManifest> {
        self.manifests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ManifestRegistry {
        ManifestRegistry::new(vec![
            PluginManifest::new("h", "Host", "host", PluginTier::AppHost),
            PluginManifest::new("a", "Orders", "orders", PluginTier::AppComponent),
            PluginManifest::new("c1", "Messaging", "messaging", PluginTier::Core),
            PluginManifest::new("c2", "Storage", "storage", PluginTier::Core),
        ])
        .unwrap()
    }

    #[test]
    fn partitions_by_tier() {
        let registry = registry();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.by_tier(PluginTier::Core).count(), 2);
        assert_eq!(registry.host().map(|m| m.name.as_str()), Some("Host"));
        assert_eq!(registry.get("a").map(|m| m.tier), Some(PluginTier::AppComponent));
    }

    #[test]
    fn tier_order_is_stable_within_tier() {
        let registry = registry();
        let names: Vec<&str> = registry.in_tier_order().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Messaging", "Storage", "Orders", "Host"]);
    }

    #[test]
    fn assemblies_grouped_by_tier() {
        let grouped = registry().assemblies_by_tier();
        assert_eq!(grouped[&PluginTier::Core], vec!["messaging", "storage"]);
        assert_eq!(grouped[&PluginTier::AppHost], vec!["host"]);
    }

    #[test]
    fn invalid_set_is_rejected() {
        let err = ManifestRegistry::new(vec![]).unwrap_err();
        assert!(matches!(err, PlexusError::Validation { .. }));
    }
}
