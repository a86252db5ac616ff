// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marker trait for capabilities collected into module slots.

/// Base trait of every capability whose implementations are collected
/// automatically into module slots during composition.
///
/// Declare a capability by extending this trait, then collect it with
/// `slots.bind::<dyn MyCapability>()` from a module's `compose` hook:
///
/// ```
/// use plexus_core::KnownType;
///
/// pub trait MessageHandler: KnownType {
///     fn handles(&self) -> &str;
/// }
/// ```
pub trait KnownType: Send + Sync + 'static {}
