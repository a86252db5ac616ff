// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery from `*.plugin.toml` manifest files.
//!
//! Each manifest names the compiled-in unit that implements the plugin. The
//! unit must exist in the catalog; its types and modules are used as-is.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plexus_core::PlexusError;

use super::catalog::PluginCatalog;
use super::{SearchPatterns, TypeResolver};
use crate::manifest::{PluginManifest, read_plugin_manifest};
use crate::module::PluginModule;
use crate::plugin::Plugin;
use crate::plugin_type::PluginType;

/// Default pattern for manifest file names.
pub const DEFAULT_MANIFEST_PATTERN: &str = "*.plugin.toml";

/// Discovers plugins from manifest files in one directory.
#[derive(Debug, Clone)]
pub struct ManifestDirResolver {
    dir: PathBuf,
    patterns: SearchPatterns,
    catalog: Arc<PluginCatalog>,
}

impl ManifestDirResolver {
    /// Probe `dir` for files matching `patterns`.
    pub fn new<S: AsRef<str>>(
        dir: impl Into<PathBuf>,
        patterns: &[S],
        catalog: Arc<PluginCatalog>,
    ) -> Result<Self, PlexusError> {
        Ok(Self {
            dir: dir.into(),
            patterns: SearchPatterns::new(patterns)?,
            catalog,
        })
    }

    /// Probe `dir` for `*.plugin.toml` files.
    pub fn with_default_pattern(
        dir: impl Into<PathBuf>,
        catalog: Arc<PluginCatalog>,
    ) -> Result<Self, PlexusError> {
        Self::new(dir, &[DEFAULT_MANIFEST_PATTERN], catalog)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Manifest files in the directory matching the patterns, sorted by name.
    fn candidate_files(&self) -> Result<Vec<PathBuf>, PlexusError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            PlexusError::discovery(
                format!("cannot read manifest directory {}: {e}", self.dir.display()),
                vec![self.dir.display().to_string()],
            )
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| self.patterns.matches(name))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn load_manifest(&self, path: &Path) -> Result<Option<PluginManifest>, PlexusError> {
        let unit = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| {
            PlexusError::discovery(format!("cannot read manifest {unit}: {e}"), vec![unit.clone()])
        })?;

        let Some(manifest) = read_plugin_manifest(&content)
            .map_err(|e| PlexusError::discovery(format!("{unit}: {e}"), vec![unit.clone()]))?
        else {
            tracing::trace!(file = %unit, "file has no [plugin] table, skipping");
            return Ok(None);
        };

        let Some(assembly) = self.catalog.get(&manifest.assembly_name) else {
            return Err(PlexusError::discovery(
                format!(
                    "{unit}: plugin {} names unit {} which is not compiled in",
                    manifest.name, manifest.assembly_name
                ),
                vec![unit, manifest.assembly_name],
            ));
        };
        self.catalog.check_dependencies(assembly)?;

        Ok(Some(manifest))
    }
}

impl TypeResolver for ManifestDirResolver {
    fn discover_manifests(&self) -> Result<Vec<PluginManifest>, PlexusError> {
        let mut manifests = Vec::new();
        for path in self.candidate_files()? {
            if let Some(manifest) = self.load_manifest(&path)? {
                tracing::debug!(file = %path.display(), plugin = %manifest.name, "discovered plugin");
                manifests.push(manifest);
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
