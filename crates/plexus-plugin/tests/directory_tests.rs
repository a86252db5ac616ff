// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for discovery from manifest directories.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use plexus_core::{PlexusError, PluginTier};
use plexus_plugin::{
    ManifestDirResolver, Plugin, PluginAssembly, PluginCatalog, PluginManifest, PluginModule,
    PluginType, TypeResolver,
};

#[derive(Default)]
struct OrdersModule;

impl PluginModule for OrdersModule {}

struct OrderService;

fn catalog() -> Arc<PluginCatalog> {
    Arc::new(
        PluginCatalog::new()
            .with(
                PluginAssembly::new("orders")
                    .with_type(PluginType::of::<OrderService>())
                    .default_module::<OrdersModule>(),
            )
            .with(PluginAssembly::new("host")),
    )
}

fn write(dir: &Path, file: &str, content: &str) {
    fs::write(dir.join(file), content).unwrap();
}

const ORDERS: &str = r#"
[plugin]
id = "orders-id"
name = "Orders"
assembly = "orders"
tier = "AppComponent"
"#;

const HOST: &str = r#"
[plugin]
id = "host-id"
name = "Host"
assembly = "host"
tier = "AppHost"
version = "2.0.0"
"#;

#[test]
fn discovers_manifests_sorted_by_file_name() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b-orders.plugin.toml", ORDERS);
    write(dir.path(), "a-host.plugin.toml", HOST);
    write(dir.path(), "notes.txt", "ignored");

    let resolver = ManifestDirResolver::with_default_pattern(dir.path(), catalog()).unwrap();
    let manifests = resolver.discover_manifests().unwrap();
    let names: Vec<&str> = manifests.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Host", "Orders"]);
    assert_eq!(manifests[0].tier, PluginTier::AppHost);
    assert_eq!(manifests[0].version.as_deref(), Some("2.0.0"));
}

#[test]
fn files_without_plugin_table_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "host.plugin.toml", HOST);
    write(dir.path(), "other.plugin.toml", "[settings]\nlevel = 3\n");

    let resolver = ManifestDirResolver::with_default_pattern(dir.path(), catalog()).unwrap();
    assert_eq!(resolver.discover_manifests().unwrap().len(), 1);
}

#[test]
fn malformed_manifest_aborts_discovery() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.plugin.toml", "[plugin\nid = ");

    let resolver = ManifestDirResolver::with_default_pattern(dir.path(), catalog()).unwrap();
    match resolver.discover_manifests().unwrap_err() {
        PlexusError::Discovery { offending_units, .. } => {
            assert_eq!(offending_units.len(), 1);
            assert!(offending_units[0].ends_with("broken.plugin.toml"));
        }
        other => panic!("expected discovery error, got {other:?}"),
    }
}

#[test]
fn unknown_unit_aborts_discovery() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "ghost.plugin.toml",
        "[plugin]\nid = \"g\"\nname = \"Ghost\"\nassembly = \"ghost\"\ntier = \"Core\"\n",
    );

    let resolver = ManifestDirResolver::with_default_pattern(dir.path(), catalog()).unwrap();
    match resolver.discover_manifests().unwrap_err() {
        PlexusError::Discovery { reason, offending_units } => {
            assert!(reason.contains("not compiled in"));
            assert!(offending_units.contains(&"ghost".to_string()));
        }
        other => panic!("expected discovery error, got {other:?}"),
    }
}

#[test]
fn missing_directory_is_a_discovery_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let resolver = ManifestDirResolver::with_default_pattern(&missing, catalog()).unwrap();
    assert!(matches!(
        resolver.discover_manifests(),
        Err(PlexusError::Discovery { .. })
    ));
}

#[test]
fn custom_patterns_filter_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "orders.plugin.toml", ORDERS);
    write(dir.path(), "host.plugin.toml", HOST);

    let resolver = ManifestDirResolver::new(dir.path(), &["host.*"], catalog()).unwrap();
    let manifests = resolver.discover_manifests().unwrap();
    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0].name, "Host");
}

#[test]
fn types_and_modules_come_from_the_named_unit() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "orders.plugin.toml", ORDERS);

    let resolver = ManifestDirResolver::with_default_pattern(dir.path(), catalog()).unwrap();
    let manifest: PluginManifest = resolver.discover_manifests().unwrap().remove(0);
    let plugin = Plugin::new(manifest);

    let types = resolver.load_plugin_types(&plugin).unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].plugin_id(), Some("orders-id"));

    let modules = resolver.discover_modules(&plugin).unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].name(), "OrdersModule");
}
