// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! All failures are collected; validation does not stop at the first one.

use crate::diagnostic::ConfigError;
use crate::model::PlexusConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate semantic constraints serde cannot express.
pub fn validate_config(config: &PlexusConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.bootstrap.search_patterns.is_empty() {
        errors.push(ConfigError::Validation {
            message: "bootstrap.search_patterns must list at least one pattern".to_string(),
        });
    }

    for pattern in &config.bootstrap.search_patterns {
        if pattern.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "bootstrap.search_patterns must not contain empty patterns".to_string(),
            });
        }
    }

    if config
        .bootstrap
        .manifest_dir
        .as_deref()
        .is_some_and(|dir| dir.trim().is_empty())
    {
        errors.push(ConfigError::Validation {
            message: "bootstrap.manifest_dir must not be empty when set".to_string(),
        });
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
