// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Plexus integration tests.
//!
//! # Components
//!
//! - [`HookRecorder`] - Shared, ordered record of every hook call
//! - [`RecordingModule`] - Module that records its hooks and can fail on demand
//! - [`TestCatalog`] - Builder for catalogs of recording plugins

pub mod fixtures;
pub mod recorder;

pub use fixtures::{TestCatalog, TestCatalogBuilder};
pub use recorder::{HookEvent, HookRecorder, RecordingModule};
