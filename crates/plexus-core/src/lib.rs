// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the Plexus plugin orchestrator.
//!
//! This crate defines the shared vocabulary used by every other crate in the
//! workspace: the error type, plugin tiers, capability identities, activators,
//! and the minimal service registry that plugin modules populate.

pub mod activator;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

pub use activator::Activator;
pub use error::{BoxError, PlexusError};
pub use services::{
    ServiceCollection, ServiceDescriptor, ServiceProvider, ServiceResolver, ServiceScope,
};
pub use traits::{ConfigValue, ContainerConfig, KnownType};
pub use types::{CapabilityType, HookPhase, PluginTier, ServiceLifetime, short_type_name};
