// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Plexus plugin orchestrator.

use thiserror::Error;

use crate::types::HookPhase;

/// Boxed error type accepted as the source of module-raised errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across discovery, composition, and lifecycle operations.
#[derive(Debug, Error)]
pub enum PlexusError {
    /// Manifest data is missing, duplicated, or the tier layout is invalid.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        /// Offending values (plugin ids, names, assemblies).
        details: Vec<String>,
    },

    /// A candidate unit could not be loaded during discovery.
    #[error("discovery error: {reason}")]
    Discovery {
        reason: String,
        /// Units (assemblies or manifest files) that caused the failure.
        offending_units: Vec<String>,
    },

    /// The container or one of its parts was driven in an invalid order
    /// (double start, stop while stopped, build twice, reassignment).
    #[error("invalid operation: {0}")]
    Misuse(String),

    /// The container has been disposed and can no longer be accessed.
    #[error("the application container has been disposed and can no longer be accessed")]
    Disposed,

    /// A module hook failed. Carries the phase and the module that raised it.
    #[error("module {module} of plugin {plugin} failed during {phase}: {source}")]
    ModuleExecution {
        phase: HookPhase,
        plugin: String,
        module: String,
        source: Box<PlexusError>,
    },

    /// Raised from inside module code.
    #[error("module error: {message}")]
    Module {
        message: String,
        source: Option<BoxError>,
    },

    /// No registration exists for the requested service contract.
    #[error("no service registered for contract {contract}")]
    ServiceNotRegistered { contract: String },

    /// A registered service could not be activated.
    #[error("service {contract} could not be activated: {message}")]
    ServiceActivation { contract: String, message: String },

    /// Container configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlexusError {
    /// Create a validation error with offending values.
    pub fn validation(message: impl Into<String>, details: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// Create a discovery error naming the units that failed to load.
    pub fn discovery(reason: impl Into<String>, offending_units: Vec<String>) -> Self {
        Self::Discovery {
            reason: reason.into(),
            offending_units,
        }
    }

    /// Create a module error without an underlying source.
    pub fn module(message: impl Into<String>) -> Self {
        Self::Module {
            message: message.into(),
            source: None,
        }
    }

    /// Create a module error wrapping an underlying source.
    pub fn module_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Module {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wrap an error raised by a module hook with the phase and module identity.
    pub fn module_execution(
        phase: HookPhase,
        plugin: impl Into<String>,
        module: impl Into<String>,
        source: PlexusError,
    ) -> Self {
        Self::ModuleExecution {
            phase,
            plugin: plugin.into(),
            module: module.into(),
            source: Box::new(source),
        }
    }

    /// Returns true for errors produced by driving the container incorrectly.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::Misuse(_) | Self::Disposed)
    }
}
