// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition and lifecycle orchestration.
//!
//! [`AppContainer`] discovers plugins through a
//! [`TypeResolver`](plexus_plugin::TypeResolver), composes them into a
//! [`CompositeApplication`], builds the service registry, and drives every
//! module through start, stop, and dispose. [`CompositeLog`] is the
//! serializable picture of what was composed.

pub mod composite;
pub mod configs;
pub mod container;
pub mod log;

pub use composite::CompositeApplication;
pub use configs::{ConfigSet, LoggerConfig, ServiceRegistrationConfig};
pub use container::{AppContainer, ContainerState};
pub use log::{CompositeLog, PluginLog, SearchedAssemblies, ServiceLog};
