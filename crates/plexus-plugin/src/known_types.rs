// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binding of known-type capabilities into module slots.
//!
//! Each module asks for the capabilities it collects by calling
//! [`KnownTypeSlots::bind`] from its `compose` hook. The binder searches only
//! the scope of types it was created with, so a module never sees
//! implementations outside its composition layer.

use std::sync::Arc;

use plexus_core::{CapabilityType, KnownType};

use crate::plugin_type::PluginType;

/// Fills module capability slots from a scope of declared types.
pub struct KnownTypeSlots<'a> {
    scope: &'a [&'a PluginType],
    resolved: Vec<CapabilityType>,
}

impl<'a> KnownTypeSlots<'a> {
    pub fn new(scope: &'a [&'a PluginType]) -> Self {
        Self {
            scope,
            resolved: Vec::new(),
        }
    }

    /// Instantiate every concrete type in scope that provides `C`.
    ///
    /// Types without an activator for `C` are skipped. An empty result is
    /// valid.
    pub fn bind<C: ?Sized + KnownType>(&mut self) -> Vec<Arc<C>> {
        let contract = CapabilityType::of::<C>();
        if !self.resolved.contains(&contract) {
            self.resolved.push(contract);
        }

        let instances: Vec<Arc<C>> = self
            .scope
            .iter()
            .filter(|ty| ty.is_concrete())
            .filter_map(|ty| ty.activator(contract))
            .filter_map(|activator| activator.activate::<C>())
            .collect();

        tracing::debug!(
            capability = %contract.short_name(),
            count = instances.len(),
            "bound known-type slot"
        );
        instances
    }

    /// Number of types visible to the binder.
    pub fn scope_len(&self) -> usize {
        self.scope.len()
    }

    /// Capability base types requested so far, in request order.
    pub fn resolved(&self) -> &[CapabilityType] {
        &self.resolved
    }

    pub fn into_resolved(self) -> Vec<CapabilityType> {
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Formatter: KnownType {
        fn format(&self, input: &str) -> String;
    }

    struct Upper;
    struct Lower;

    impl KnownType for Upper {}
    impl KnownType for Lower {}

    impl Formatter for Upper {
        fn format(&self, input: &str) -> String {
            input.to_uppercase()
        }
    }

    impl Formatter for Lower {
        fn format(&self, input: &str) -> String {
            input.to_lowercase()
        }
    }

    fn scope() -> Vec<PluginType> {
        vec![
            PluginType::known_capability::<dyn Formatter>(),
            PluginType::of::<Upper>()
                .provides::<dyn Formatter, _>(|| Arc::new(Upper) as Arc<dyn Formatter>),
            PluginType::of::<Lower>()
                .provides::<dyn Formatter, _>(|| Arc::new(Lower) as Arc<dyn Formatter>),
            PluginType::of::<String>(),
        ]
    }

    #[test]
    fn binds_concrete_implementations_in_scope_order() {
        let types = scope();
        let refs: Vec<&PluginType> = types.iter().collect();
        let mut slots = KnownTypeSlots::new(&refs);

        let formatters = slots.bind::<dyn Formatter>();
        let out: Vec<String> = formatters.iter().map(|f| f.format("Ab")).collect();
        assert_eq!(out, vec!["AB", "ab"]);
        assert_eq!(slots.into_resolved(), vec![CapabilityType::of::<dyn Formatter>()]);
    }

    #[test]
    fn empty_scope_binds_nothing_but_records_capability() {
        let refs: Vec<&PluginType> = Vec::new();
        let mut slots = KnownTypeSlots::new(&refs);
        assert!(slots.bind::<dyn Formatter>().is_empty());
        slots.bind::<dyn Formatter>();
        assert_eq!(slots.resolved().len(), 1);
    }
}
