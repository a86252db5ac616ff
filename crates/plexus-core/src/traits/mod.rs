// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marker traits implemented by plugin code.

pub mod config;
pub mod known_type;

pub use config::{ConfigValue, ContainerConfig};
pub use known_type::KnownType;
