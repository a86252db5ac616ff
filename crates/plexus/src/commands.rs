// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Implementations of the `plexus` subcommands.

use std::path::{Path, PathBuf};

use tracing::info;

use plexus_config::PlexusConfig;
use plexus_container::{AppContainer, LoggerConfig};
use plexus_core::{PlexusError, PluginTier};
use plexus_plugin::{CatalogResolver, ManifestDirResolver, ManifestRegistry, TypeResolver};

use crate::demo;

/// Where plugins are discovered from.
///
/// A manifest directory on the command line takes precedence over the
/// configured one. Without either, the compiled-in catalog is searched.
pub fn resolver(config: &PlexusConfig, manifests: Option<&Path>) -> Result<Box<dyn TypeResolver>, PlexusError> {
    let patterns = &config.bootstrap.search_patterns;
    let dir: Option<PathBuf> = manifests
        .map(Path::to_path_buf)
        .or_else(|| config.bootstrap.manifest_dir.as_ref().map(PathBuf::from));

    match dir {
        Some(dir) if is_match_all(patterns) => {
            info!(dir = %dir.display(), "discovering plugins from manifest directory");
            Ok(Box::new(ManifestDirResolver::with_default_pattern(dir, demo::catalog())?))
        }
        Some(dir) => {
            info!(dir = %dir.display(), ?patterns, "discovering plugins from manifest directory");
            Ok(Box::new(ManifestDirResolver::new(dir, patterns, demo::catalog())?))
        }
        None => Ok(Box::new(CatalogResolver::new(demo::catalog(), patterns)?)),
    }
}

/// The default `*` pattern would match every file in a manifest directory.
fn is_match_all(patterns: &[String]) -> bool {
    patterns.len() == 1 && patterns[0] == "*"
}

pub fn new_container(config: &PlexusConfig, manifests: Option<&Path>) -> Result<AppContainer, PlexusError> {
    let mut container = AppContainer::from_boxed(resolver(config, manifests)?);
    container.with_config(LoggerConfig {
        log_exceptions: config.bootstrap.log_exceptions,
    })?;
    Ok(container)
}

/// Build the application and return its composite log as JSON.
pub fn inspect(config: &PlexusConfig, manifests: Option<&Path>, pretty: bool) -> Result<String, PlexusError> {
    let mut container = new_container(config, manifests)?;
    container.build()?;
    let log = container.log()?;
    let json = if pretty {
        log.to_json_pretty()?
    } else {
        log.to_json()?
    };
    container.dispose()?;
    Ok(json)
}

/// Discover and validate manifests without running any module code.
pub fn validate(config: &PlexusConfig, manifests: Option<&Path>) -> Result<String, PlexusError> {
    let registry = ManifestRegistry::new(resolver(config, manifests)?.discover_manifests()?)?;

    let mut report = format!("{} plugins valid\n", registry.len());
    for tier in PluginTier::ALL {
        for manifest in registry.by_tier(tier) {
            let version = manifest.version.as_deref().unwrap_or("-");
            report.push_str(&format!(
                "  {tier:<12} {:<16} {:<8} {}\n",
                manifest.name, version, manifest.assembly_name
            ));
        }
    }
    Ok(report)
}

/// Build, start, wait for Ctrl+C, then stop and dispose.
pub async fn run(config: &PlexusConfig, manifests: Option<&Path>) -> Result<(), PlexusError> {
    let mut container = new_container(config, manifests)?;
    container.build()?;
    container.start()?;
    info!("plexus running, press Ctrl+C to stop");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| PlexusError::Internal(format!("failed to listen for Ctrl+C: {e}")))?;
    info!("received Ctrl+C, shutting down");

    container.stop()?;
    container.dispose()
}
