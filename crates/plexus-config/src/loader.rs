// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later overrides earlier: compiled defaults,
//! `/etc/plexus/plexus.toml`, `~/.config/plexus/plexus.toml`,
//! `./plexus.toml`, then `PLEXUS_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PlexusConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/plexus/plexus.toml";
pub(crate) const LOCAL_CONFIG: &str = "plexus.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("plexus/plexus.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<PlexusConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<PlexusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlexusConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PlexusConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlexusConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PlexusConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// `PLEXUS_BOOTSTRAP_LOG_EXCEPTIONS` maps to `bootstrap.log_exceptions`.
///
/// Only the section prefix is split; key names keep their underscores.
fn env_provider() -> Env {
    Env::prefixed("PLEXUS_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("bootstrap_", "bootstrap.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
