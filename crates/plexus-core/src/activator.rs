// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parameterless, type-erased constructors for contract implementations.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::types::CapabilityType;

type ActivateFn = dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync;

/// Creates instances of one implementation viewed through one contract.
///
/// The erased value produced by the closure is always an `Arc<C>` where `C`
/// is the contract the activator was created for.
#[derive(Clone)]
pub struct Activator {
    contract: CapabilityType,
    activate: Arc<ActivateFn>,
}

impl Activator {
    /// Wrap a constructor returning the implementation as `Arc<C>`.
    pub fn new<C, F>(factory: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<C> + Send + Sync + 'static,
    {
        Self {
            contract: CapabilityType::of::<C>(),
            activate: Arc::new(move || Box::new(factory()) as Box<dyn Any + Send + Sync>),
        }
    }

    /// The contract this activator produces.
    pub fn contract(&self) -> CapabilityType {
        self.contract
    }

    /// Create a new instance typed as the contract `C`.
    ///
    /// Returns `None` when `C` is not the activator's contract.
    pub fn activate<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>> {
        if self.contract.id() != TypeId::of::<C>() {
            return None;
        }
        (self.activate)().downcast::<Arc<C>>().ok().map(|boxed| *boxed)
    }

    /// Create a new instance without naming the contract type.
    pub fn activate_erased(&self) -> Box<dyn Any + Send + Sync> {
        (self.activate)()
    }
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator")
            .field("contract", &self.contract)
            .finish()
    }
}
