// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for Plexus hosts.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlexusConfig {
    /// Plugin discovery settings.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How plugins are discovered when the container is built.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Wildcard patterns selecting plugin units (or manifest files when
    /// `manifest_dir` is set).
    #[serde(default = "default_search_patterns")]
    pub search_patterns: Vec<String>,

    /// Directory of `*.plugin.toml` manifests. `None` uses the compiled-in
    /// catalog directly.
    #[serde(default)]
    pub manifest_dir: Option<String>,

    /// Log fatal container errors once before returning them.
    #[serde(default = "default_log_exceptions")]
    pub log_exceptions: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            search_patterns: default_search_patterns(),
            manifest_dir: None,
            log_exceptions: default_log_exceptions(),
        }
    }
}

fn default_search_patterns() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_log_exceptions() -> bool {
    true
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level for `plexus` targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit the composite log at trace level after the container starts.
    #[serde(default = "default_trace_composite_log")]
    pub trace_composite_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            trace_composite_log: default_trace_composite_log(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_trace_composite_log() -> bool {
    true
}
