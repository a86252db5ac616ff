// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifests, type descriptors, modules, and discovery.
//!
//! A plugin is a manifest (identity and tier) plus the types its unit
//! declares and the modules it exports. Resolvers discover plugins from
//! compiled-in catalogs or manifest directories; the manifest set is
//! validated before any module code runs.

pub mod known_types;
pub mod manifest;
pub mod module;
pub mod plugin;
pub mod plugin_type;
pub mod registry;
pub mod resolver;
pub mod validation;

pub use known_types::KnownTypeSlots;
pub use manifest::{PluginManifest, parse_plugin_manifest, read_plugin_manifest};
pub use module::{ModuleContext, PluginModule, ServiceRegistrar, TypeRegistration};
pub use plugin::Plugin;
pub use plugin_type::{ContractBinding, PluginType};
pub use registry::ManifestRegistry;
pub use resolver::{
    CatalogResolver, ManifestDirResolver, ModuleFactory, PluginAssembly, PluginCatalog,
    SearchPatterns, TypeResolver,
};
pub use validation::validate_manifests;
