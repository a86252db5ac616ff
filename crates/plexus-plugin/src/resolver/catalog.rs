// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled-in plugin units and the resolver that discovers them.
//!
//! A [`PluginAssembly`] is the unit of packaging: a name, an optional plugin
//! manifest, the types the unit declares, the module constructors it exports,
//! and the other units it depends on. Units without a manifest contribute
//! nothing but can satisfy dependencies.

use std::fmt;
use std::sync::Arc;

use plexus_core::PlexusError;

use super::{SearchPatterns, TypeResolver};
use crate::manifest::PluginManifest;
use crate::module::PluginModule;
use crate::plugin::Plugin;
use crate::plugin_type::PluginType;

/// Constructor for one module of a plugin.
pub type ModuleFactory = Arc<dyn Fn() -> Box<dyn PluginModule> + Send + Sync>;

/// A compiled-in unit that may hold one plugin.
#[derive(Clone)]
pub struct PluginAssembly {
    name: String,
    manifest: Option<PluginManifest>,
    types: Vec<PluginType>,
    modules: Vec<ModuleFactory>,
    dependencies: Vec<String>,
}

impl PluginAssembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manifest: None,
            types: Vec::new(),
            modules: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Declare the plugin packaged by this unit.
    ///
    /// The manifest's assembly name is set to the unit name.
    pub fn manifest(mut self, mut manifest: PluginManifest) -> Self {
        manifest.assembly_name = self.name.clone();
        self.manifest = Some(manifest);
        self
    }

    pub fn with_type(mut self, ty: PluginType) -> Self {
        self.types.push(ty);
        self
    }

    /// Export a module constructor. Modules are created in export order.
    pub fn module<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn PluginModule> + Send + Sync + 'static,
    {
        self.modules.push(Arc::new(factory));
        self
    }

    /// Export a module built with `Default`.
    pub fn default_module<M: PluginModule + Default + 'static>(self) -> Self {
        self.module(|| Box::new(M::default()) as Box<dyn PluginModule>)
    }

    /// Declare a unit that must be present for this one to load.
    pub fn depends_on(mut self, unit: impl Into<String>) -> Self {
        self.dependencies.push(unit.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin_manifest(&self) -> Option<&PluginManifest> {
        self.manifest.as_ref()
    }

    pub fn types(&self) -> &[PluginType] {
        &self.types
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

impl fmt::Debug for PluginAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginAssembly")
            .field("name", &self.name)
            .field("manifest", &self.manifest)
            .field("types", &self.types.len())
            .field("modules", &self.modules.len())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Every compiled-in unit available to the process.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    assemblies: Vec<PluginAssembly>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit. A unit with the same name replaces the earlier one.
    pub fn add(&mut self, assembly: PluginAssembly) -> &mut Self {
        self.assemblies.retain(|a| a.name != assembly.name);
        self.assemblies.push(assembly);
        self
    }

    pub fn with(mut self, assembly: PluginAssembly) -> Self {
        self.add(assembly);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PluginAssembly> {
        self.assemblies.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginAssembly> {
        self.assemblies.iter()
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// Fail if any declared dependency of the unit is missing.
    pub fn check_dependencies(&self, assembly: &PluginAssembly) -> Result<(), PlexusError> {
        let missing: Vec<String> = assembly
            .dependencies
            .iter()
            .filter(|dep| self.get(dep).is_none())
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(PlexusError::discovery(
            format!(
                "unit {} could not be loaded: missing dependencies {}",
                assembly.name,
                missing.join(", ")
            ),
            vec![assembly.name.clone()],
        ))
    }

    /// Types declared by the plugin's unit, bound to the plugin.
    pub fn types_for(&self, plugin: &Plugin) -> Result<Vec<PluginType>, PlexusError> {
        let assembly = self.assembly_for(plugin)?;
        Ok(assembly
            .types
            .iter()
            .cloned()
            .map(|ty| ty.owned_by(plugin.plugin_id(), assembly.name.as_str()))
            .collect())
    }

    /// New instances of the plugin's modules, in export order.
    pub fn modules_for(&self, plugin: &Plugin) -> Result<Vec<Box<dyn PluginModule>>, PlexusError> {
        let assembly = self.assembly_for(plugin)?;
        Ok(assembly.modules.iter().map(|factory| factory()).collect())
    }

    fn assembly_for(&self, plugin: &Plugin) -> Result<&PluginAssembly, PlexusError> {
        let unit = &plugin.manifest().assembly_name;
        self.get(unit).ok_or_else(|| {
            PlexusError::discovery(
                format!("unit {unit} of plugin {} is not available", plugin.name()),
                vec![unit.clone()],
            )
        })
    }
}

/// Discovers plugins among the catalog's units whose names match the
/// search patterns.
#[derive(Debug, Clone)]
pub struct CatalogResolver {
    catalog: Arc<PluginCatalog>,
    patterns: SearchPatterns,
}

impl CatalogResolver {
    pub fn new<S: AsRef<str>>(catalog: Arc<PluginCatalog>, patterns: &[S]) -> Result<Self, PlexusError> {
        Ok(Self {
            catalog,
            patterns: SearchPatterns::new(patterns)?,
        })
    }

    /// Resolver matching every unit in the catalog.
    pub fn all(catalog: Arc<PluginCatalog>) -> Self {
        Self {
            catalog,
            patterns: SearchPatterns::everything(),
        }
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }
}

impl TypeResolver for CatalogResolver {
    fn discover_manifests(&self) -> Result<Vec<PluginManifest>, PlexusError> {
        let mut manifests = Vec::new();
        for assembly in self.catalog.iter().filter(|a| self.patterns.matches(&a.name)) {
            self.catalog.check_dependencies(assembly)?;
            match &assembly.manifest {
                Some(manifest) => {
                    tracing::debug!(unit = %assembly.name, plugin = %manifest.name, "discovered plugin");
                    manifests.push(manifest.clone());
                }
                None => tracing::trace!(unit = %assembly.name, "unit has no plugin manifest"),
            }
        }
        Ok(manifests)
    }

    fn load_plugin_types(&self, plugin: &Plugin) -> Result<Vec<PluginType>, PlexusError> {
        self.catalog.types_for(plugin)
    }

    fn discover_modules(&self, plugin: &Plugin) -> Result<Vec<Box<dyn PluginModule>>, PlexusError> {
        self.catalog.modules_for(plugin)
    }

    fn search_patterns(&self) -> &[String] {
        self.patterns.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_core::PluginTier;

    #[derive(Default)]
    struct FirstModule;
    #[derive(Default)]
    struct SecondModule;

    impl PluginModule for FirstModule {}
    impl PluginModule for SecondModule {}

    struct Marker;

    fn catalog() -> Arc<PluginCatalog> {
        Arc::new(
            PluginCatalog::new()
                .with(
                    PluginAssembly::new("acme.messaging")
                        .manifest(PluginManifest::new("m", "Messaging", "", PluginTier::Core))
                        .with_type(PluginType::of::<Marker>())
                        .default_module::<FirstModule>()
                        .default_module::<SecondModule>(),
                )
                .with(PluginAssembly::new("acme.shared"))
                .with(
                    PluginAssembly::new("acme.host")
                        .manifest(PluginManifest::new("h", "Host", "", PluginTier::AppHost))
                        .depends_on("acme.shared"),
                )
                .with(
                    PluginAssembly::new("other.tools")
                        .manifest(PluginManifest::new("t", "Tools", "", PluginTier::Core)),
                ),
        )
    }

    #[test]
    fn discovers_only_matching_units_with_manifests() {
        let resolver = CatalogResolver::new(catalog(), &["acme.*"]).unwrap();
        let names: Vec<String> = resolver
            .discover_manifests()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Messaging", "Host"]);
        assert_eq!(resolver.search_patterns(), ["acme.*".to_string()]);
    }

    #[test]
    fn manifest_takes_unit_name() {
        let catalog = catalog();
        let manifest = catalog.get("acme.host").and_then(PluginAssembly::plugin_manifest).unwrap();
        assert_eq!(manifest.assembly_name, "acme.host");
    }

    #[test]
    fn missing_dependency_aborts_discovery() {
        let catalog = PluginCatalog::new().with(
            PluginAssembly::new("acme.host")
                .manifest(PluginManifest::new("h", "Host", "", PluginTier::AppHost))
                .depends_on("acme.missing"),
        );
        let resolver = CatalogResolver::all(Arc::new(catalog));
        match resolver.discover_manifests().unwrap_err() {
            PlexusError::Discovery { offending_units, .. } => {
                assert_eq!(offending_units, vec!["acme.host"]);
            }
            other => panic!("expected discovery error, got {other:?}"),
        }
    }

    #[test]
    fn types_are_bound_and_modules_created_in_order() {
        let resolver = CatalogResolver::all(catalog());
        let manifest = resolver.catalog().get("acme.messaging").unwrap().plugin_manifest().unwrap().clone();
        let plugin = Plugin::new(manifest);

        let types = resolver.load_plugin_types(&plugin).unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].plugin_id(), Some("m"));
        assert_eq!(types[0].assembly_name(), Some("acme.messaging"));

        let modules = resolver.discover_modules(&plugin).unwrap();
        let names: Vec<String> = modules.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["FirstModule", "SecondModule"]);
    }

    #[test]
    fn unknown_unit_is_a_discovery_error() {
        let resolver = CatalogResolver::all(catalog());
        let plugin = Plugin::new(PluginManifest::new("x", "X", "acme.gone", PluginTier::Core));
        assert!(matches!(
            resolver.load_plugin_types(&plugin),
            Err(PlexusError::Discovery { .. })
        ));
    }
}
