// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifests: identity and tier of a plugin.
//!
//! Manifests are declared in code by compiled-in units, or parsed from
//! `*.plugin.toml` files when discovering from a directory.

use std::str::FromStr;

use plexus_core::{PlexusError, PluginTier};
use serde::{Deserialize, Serialize};

/// Identity and tier of one plugin. Immutable after discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Globally unique identifier.
    pub plugin_id: String,
    /// Globally unique display name.
    pub name: String,
    /// Name of the unit that packages the plugin.
    pub assembly_name: String,
    pub description: String,
    pub tier: PluginTier,
    /// Optional semantic version.
    pub version: Option<String>,
}

impl PluginManifest {
    pub fn new(
        plugin_id: impl Into<String>,
        name: impl Into<String>,
        assembly_name: impl Into<String>,
        tier: PluginTier,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            name: name.into(),
            assembly_name: assembly_name.into(),
            description: String::new(),
            tier,
            version: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Parsed semantic version, if one is declared and valid.
    pub fn semver(&self) -> Option<semver::Version> {
        self.version
            .as_deref()
            .and_then(|v| semver::Version::parse(v).ok())
    }
}

/// Intermediate TOML deserialization struct for `*.plugin.toml`.
#[derive(Debug, Deserialize)]
struct PluginManifestFile {
    plugin: PluginSection,
}

/// The `[plugin]` section of a manifest file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginSection {
    id: String,
    name: String,
    assembly: String,
    #[serde(default)]
    description: String,
    tier: String,
    version: Option<String>,
}

/// Parse a manifest file that may or may not describe a plugin.
///
/// Returns `Ok(None)` for valid TOML without a `[plugin]` table; such files
/// are skipped by discovery. Malformed TOML is an error.
pub fn read_plugin_manifest(toml_content: &str) -> Result<Option<PluginManifest>, PlexusError> {
    let table: toml::Table = toml_content
        .parse()
        .map_err(|e| PlexusError::Config(format!("invalid plugin manifest: {e}")))?;

    if !table.get("plugin").is_some_and(toml::Value::is_table) {
        return Ok(None);
    }
    parse_plugin_manifest(toml_content).map(Some)
}

/// Parse a plugin manifest from TOML content.
///
/// The tier must name a [`PluginTier`] variant and the version, when present,
/// must be valid semver. Empty identity fields are left for manifest
/// validation to report across the whole set.
pub fn parse_plugin_manifest(toml_content: &str) -> Result<PluginManifest, PlexusError> {
    let file: PluginManifestFile = toml::from_str(toml_content)
        .map_err(|e| PlexusError::Config(format!("invalid plugin manifest: {e}")))?;

    let section = file.plugin;

    let tier = PluginTier::from_str(&section.tier).map_err(|_| {
        PlexusError::Config(format!(
            "plugin manifest: invalid tier '{}'. Expected one of: Core, AppComponent, AppHost",
            section.tier
        ))
    })?;

    if let Some(version) = &section.version {
        semver::Version::parse(version).map_err(|e| {
            PlexusError::Config(format!("plugin manifest: invalid version '{version}': {e}"))
        })?;
    }

    Ok(PluginManifest {
        plugin_id: section.id,
        name: section.name,
        assembly_name: section.assembly,
        description: section.description,
        tier,
        version: section.version,
    })
}
