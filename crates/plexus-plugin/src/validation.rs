// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation of a discovered manifest set.
//!
//! Checks run in a fixed order and stop at the first failing rule:
//! ids present, ids unique, names and assemblies present, names unique,
//! versions valid, exactly one application host.

use std::collections::HashMap;

use plexus_core::{PlexusError, PluginTier};

use crate::manifest::PluginManifest;

/// Validate the full set of manifests discovered for one application.
pub fn validate_manifests(manifests: &[PluginManifest]) -> Result<(), PlexusError> {
    let missing_ids: Vec<String> = manifests
        .iter()
        .filter(|m| m.plugin_id.trim().is_empty())
        .map(describe)
        .collect();
    if !missing_ids.is_empty() {
        return Err(PlexusError::validation(
            "all plugin manifests must have an identifier",
            missing_ids,
        ));
    }

    let duplicate_ids = duplicates(manifests.iter().map(|m| m.plugin_id.as_str()));
    if !duplicate_ids.is_empty() {
        return Err(PlexusError::validation(
            "plugin identifiers must be unique",
            duplicate_ids,
        ));
    }

    let incomplete: Vec<String> = manifests
        .iter()
        .filter(|m| m.name.trim().is_empty() || m.assembly_name.trim().is_empty())
        .map(|m| m.plugin_id.clone())
        .collect();
    if !incomplete.is_empty() {
        return Err(PlexusError::validation(
            "all plugin manifests must have a name and an assembly name",
            incomplete,
        ));
    }

    let duplicate_names = duplicates(manifests.iter().map(|m| m.name.as_str()));
    if !duplicate_names.is_empty() {
        return Err(PlexusError::validation(
            "plugin names must be unique",
            duplicate_names,
        ));
    }

    let bad_versions: Vec<String> = manifests
        .iter()
        .filter(|m| {
            m.version
                .as_deref()
                .is_some_and(|v| semver::Version::parse(v).is_err())
        })
        .map(|m| m.name.clone())
        .collect();
    if !bad_versions.is_empty() {
        return Err(PlexusError::validation(
            "plugin versions must be valid semantic versions",
            bad_versions,
        ));
    }

    let hosts: Vec<String> = manifests
        .iter()
        .filter(|m| m.tier == PluginTier::AppHost)
        .map(|m| m.name.clone())
        .collect();
    match hosts.len() {
        0 => Err(PlexusError::validation(
            "no application host plugin was discovered",
            Vec::new(),
        )),
        1 => Ok(()),
        _ => Err(PlexusError::validation(
            "more than one application host plugin was discovered",
            hosts,
        )),
    }
}

fn describe(manifest: &PluginManifest) -> String {
    if manifest.name.is_empty() {
        manifest.assembly_name.clone()
    } else {
        manifest.name.clone()
    }
}

/// Values that occur more than once, in order of first occurrence.
fn duplicates<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for value in values {
        let count = counts.entry(value).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(value.to_string());
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn manifest(id: &str, name: &str, tier: PluginTier) -> PluginManifest {
        PluginManifest::new(id, name, name.to_lowercase(), tier)
    }

    fn valid_set() -> Vec<PluginManifest> {
        vec![
            manifest("1", "Messaging", PluginTier::Core),
            manifest("2", "Orders", PluginTier::AppComponent),
            manifest("3", "Host", PluginTier::AppHost),
        ]
    }

    fn details(err: PlexusError) -> (String, Vec<String>) {
        match err {
            PlexusError::Validation { message, details } => (message, details),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_set_passes() {
        validate_manifests(&valid_set()).unwrap();
    }

    #[test]
    fn missing_id_is_reported_first() {
        let mut set = valid_set();
        set[0].plugin_id = String::new();
        set[1].plugin_id = "3".into();
        let (message, offending) = details(validate_manifests(&set).unwrap_err());
        assert!(message.contains("identifier"));
        assert_eq!(offending, vec!["Messaging"]);
    }

    #[test]
    fn duplicate_ids_are_listed() {
        let mut set = valid_set();
        set[2].plugin_id = "1".into();
        let (message, offending) = details(validate_manifests(&set).unwrap_err());
        assert!(message.contains("unique"));
        assert_eq!(offending, vec!["1"]);
    }

    #[test]
    fn missing_assembly_is_rejected() {
        let mut set = valid_set();
        set[1].assembly_name = " ".into();
        let (_, offending) = details(validate_manifests(&set).unwrap_err());
        assert_eq!(offending, vec!["2"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut set = valid_set();
        set[1].name = "Messaging".into();
        let (message, offending) = details(validate_manifests(&set).unwrap_err());
        assert!(message.contains("names must be unique"));
        assert_eq!(offending, vec!["Messaging"]);
    }

    #[test]
    fn invalid_version_is_rejected() {
        let mut set = valid_set();
        set[0].version = Some("1.x".into());
        let (message, _) = details(validate_manifests(&set).unwrap_err());
        assert!(message.contains("semantic"));
    }

    #[test]
    fn host_count_must_be_one() {
        let set: Vec<_> = valid_set().into_iter().take(2).collect();
        let (message, _) = details(validate_manifests(&set).unwrap_err());
        assert!(message.contains("no application host"));

        let mut set = valid_set();
        set.push(manifest("4", "Second Host", PluginTier::AppHost));
        let (message, offending) = details(validate_manifests(&set).unwrap_err());
        assert!(message.contains("more than one"));
        assert_eq!(offending, vec!["Host", "Second Host"]);
    }

    fn tier_strategy() -> impl Strategy<Value = PluginTier> {
        prop_oneof![
            Just(PluginTier::Core),
            Just(PluginTier::AppComponent),
            Just(PluginTier::AppHost),
        ]
    }

    proptest! {
        #[test]
        fn unique_sets_pass_iff_exactly_one_host(tiers in prop::collection::vec(tier_strategy(), 0..12)) {
            let set: Vec<PluginManifest> = tiers
                .iter()
                .enumerate()
                .map(|(i, tier)| manifest(&format!("id-{i}"), &format!("Plugin{i}"), *tier))
                .collect();
            let hosts = tiers.iter().filter(|t| **t == PluginTier::AppHost).count();
            prop_assert_eq!(validate_manifests(&set).is_ok(), hosts == 1);
        }

        #[test]
        fn any_duplicated_id_fails(extra in 0usize..3, dup_of in 0usize..3) {
            let mut set = valid_set();
            let mut copy = set[dup_of].clone();
            copy.name = format!("Copy{extra}");
            set.push(copy);
            let err = validate_manifests(&set).unwrap_err();
            prop_assert!(matches!(err, PlexusError::Validation { .. }), "expected PlexusError::Validation, got {:?}", err);
            prop_assert!(err.to_string().contains("identifiers must be unique"));
        }
    }
}
