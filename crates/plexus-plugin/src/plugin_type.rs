// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptors for the types a plugin declares.
//!
//! A plugin unit lists its types explicitly: concrete implementations with the
//! contracts they provide, declared capability traits, and configuration
//! types. Discovery binds each descriptor to its owning plugin.

use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock};

use plexus_core::{Activator, CapabilityType, KnownType, PlexusError, short_type_name};

/// One contract a declared type implements.
#[derive(Clone)]
pub struct ContractBinding {
    contract: CapabilityType,
    known: bool,
    activator: Option<Activator>,
}

impl ContractBinding {
    pub fn contract(&self) -> CapabilityType {
        self.contract
    }

    /// True when the contract is a known-type capability.
    pub fn is_known(&self) -> bool {
        self.known
    }

    pub fn activator(&self) -> Option<&Activator> {
        self.activator.as_ref()
    }
}

impl fmt::Debug for ContractBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractBinding")
            .field("contract", &self.contract)
            .field("known", &self.known)
            .field("activator", &self.activator.is_some())
            .finish()
    }
}

/// Descriptor of one type declared by a plugin.
#[derive(Clone)]
pub struct PluginType {
    type_id: TypeId,
    type_name: &'static str,
    plugin_id: Option<String>,
    assembly_name: Option<String>,
    is_abstract: bool,
    declares_known_type: bool,
    contracts: Vec<ContractBinding>,
    discovered_by: OnceLock<Vec<String>>,
}

impl PluginType {
    fn new(type_id: TypeId, type_name: &'static str, is_abstract: bool) -> Self {
        Self {
            type_id,
            type_name,
            plugin_id: None,
            assembly_name: None,
            is_abstract,
            declares_known_type: false,
            contracts: Vec::new(),
            discovered_by: OnceLock::new(),
        }
    }

    /// Declare the concrete type `T`.
    pub fn of<T: 'static>() -> Self {
        Self::new(TypeId::of::<T>(), std::any::type_name::<T>(), false)
    }

    /// Declare a capability or service contract, usually `dyn Trait`.
    pub fn capability<C: ?Sized + 'static>() -> Self {
        Self::new(TypeId::of::<C>(), std::any::type_name::<C>(), true)
    }

    /// Declare a known-type capability that modules collect into slots.
    pub fn known_capability<C: ?Sized + KnownType>() -> Self {
        let mut ty = Self::capability::<C>();
        ty.declares_known_type = true;
        ty
    }

    /// The type provides the known-type capability `C`.
    ///
    /// The factory is the parameterless activator used when the capability
    /// is bound into module slots.
    pub fn provides<C, F>(mut self, factory: F) -> Self
    where
        C: ?Sized + KnownType,
        F: Fn() -> Arc<C> + Send + Sync + 'static,
    {
        self.contracts.push(ContractBinding {
            contract: CapabilityType::of::<C>(),
            known: true,
            activator: Some(Activator::new(factory)),
        });
        self
    }

    /// The type implements the service contract `C` and can be constructed
    /// without arguments. Picked up by type scans.
    pub fn exposes<C, F>(mut self, factory: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<C> + Send + Sync + 'static,
    {
        self.contracts.push(ContractBinding {
            contract: CapabilityType::of::<C>(),
            known: false,
            activator: Some(Activator::new(factory)),
        });
        self
    }

    /// The type implements `C` but has no parameterless constructor.
    pub fn implements<C: ?Sized + 'static>(mut self) -> Self {
        self.contracts.push(ContractBinding {
            contract: CapabilityType::of::<C>(),
            known: false,
            activator: None,
        });
        self
    }

    /// Bind the descriptor to the plugin and unit that declare it.
    pub fn owned_by(mut self, plugin_id: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        self.plugin_id = Some(plugin_id.into());
        self.assembly_name = Some(assembly_name.into());
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn short_name(&self) -> String {
        short_type_name(self.type_name)
    }

    /// Id of the owning plugin, once bound.
    pub fn plugin_id(&self) -> Option<&str> {
        self.plugin_id.as_deref()
    }

    pub fn assembly_name(&self) -> Option<&str> {
        self.assembly_name.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_abstract
    }

    /// True if the type declares or implements a known-type capability.
    pub fn is_known_type(&self) -> bool {
        self.declares_known_type || self.contracts.iter().any(|c| c.known)
    }

    pub fn contracts(&self) -> &[ContractBinding] {
        &self.contracts
    }

    /// True if the type is, or implements, `contract`.
    pub fn implements_contract(&self, contract: CapabilityType) -> bool {
        self.type_id == contract.id() || self.contracts.iter().any(|c| c.contract == contract)
    }

    /// Activator producing this type as `contract`, if it has one.
    pub fn activator(&self, contract: CapabilityType) -> Option<&Activator> {
        self.contracts
            .iter()
            .find(|c| c.contract == contract)
            .and_then(ContractBinding::activator)
    }

    /// Record the plugins whose modules discovered this type.
    pub fn record_discovered_by(&self, plugin_names: Vec<String>) -> Result<(), PlexusError> {
        self.discovered_by.set(plugin_names).map_err(|_| {
            PlexusError::Misuse(format!(
                "known-type discoveries already recorded for {}",
                self.short_name()
            ))
        })
    }

    /// Names of the plugins whose modules discovered this type.
    pub fn discovered_by(&self) -> &[String] {
        self.discovered_by.get().map(Vec::as_slice).unwrap_or_default()
    }
}

impl fmt::Debug for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginType")
            .field("type", &self.type_name)
            .field("plugin_id", &self.plugin_id)
            .field("is_abstract", &self.is_abstract)
            .field("is_known_type", &self.is_known_type())
            .field("contracts", &self.contracts)
            .finish()
    }
}
