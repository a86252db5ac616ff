// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery of plugins, their types, and their modules.
//!
//! A [`TypeResolver`] is the boundary between the orchestrator and wherever
//! plugins come from. Two implementations ship with the crate:
//! [`CatalogResolver`] for compiled-in units and [`ManifestDirResolver`] for
//! `*.plugin.toml` files bound to compiled-in units.

pub mod catalog;
pub mod directory;

pub use catalog::{CatalogResolver, ModuleFactory, PluginAssembly, PluginCatalog};
pub use directory::ManifestDirResolver;

use plexus_core::{CapabilityType, PlexusError};
use regex::Regex;

use crate::known_types::KnownTypeSlots;
use crate::manifest::PluginManifest;
use crate::module::PluginModule;
use crate::plugin::Plugin;
use crate::plugin_type::PluginType;

/// Source of plugins for one application.
pub trait TypeResolver: Send {
    /// Manifests of every plugin matching the resolver's search patterns.
    fn discover_manifests(&self) -> Result<Vec<PluginManifest>, PlexusError>;

    /// Types declared by the plugin, bound to it.
    fn load_plugin_types(&self, plugin: &Plugin) -> Result<Vec<PluginType>, PlexusError>;

    /// One instance of every module the plugin declares, in declaration order.
    fn discover_modules(&self, plugin: &Plugin) -> Result<Vec<Box<dyn PluginModule>>, PlexusError>;

    /// Fill the module's known-type slots from `scope`.
    ///
    /// Returns the capability base types the module asked for.
    fn bind_known_types(
        &self,
        module: &mut dyn PluginModule,
        scope: &[&PluginType],
    ) -> Vec<CapabilityType> {
        let mut slots = KnownTypeSlots::new(scope);
        module.compose(&mut slots);
        slots.into_resolved()
    }

    /// Search patterns the resolver was configured with.
    fn search_patterns(&self) -> &[String];
}

/// Wildcard patterns (`*`, `?`) matched against unit or file names.
#[derive(Debug, Clone)]
pub struct SearchPatterns {
    raw: Vec<String>,
    compiled: Vec<Regex>,
    match_all: bool,
}

impl SearchPatterns {
    /// Compile the patterns. An empty list matches nothing.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PlexusError> {
        let raw: Vec<String> = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        let compiled = raw
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw,
            compiled,
            match_all: false,
        })
    }

    /// The single pattern `*`.
    pub fn everything() -> Self {
        Self {
            raw: vec!["*".to_string()],
            compiled: Vec::new(),
            match_all: true,
        }
    }

    /// True if `name` matches any pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.match_all || self.compiled.iter().any(|re| re.is_match(name))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.raw
    }
}

fn compile(pattern: &str) -> Result<Regex, PlexusError> {
    if pattern.trim().is_empty() {
        return Err(PlexusError::discovery(
            "search patterns must not be empty",
            vec![pattern.to_string()],
        ));
    }

    let mut expr = String::from("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|e| {
        PlexusError::discovery(format!("invalid search pattern: {e}"), vec![pattern.to_string()])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_match_whole_names() {
        let patterns = SearchPatterns::new(&["acme.*", "host"]).unwrap();
        assert!(patterns.matches("acme.orders"));
        assert!(patterns.matches("ACME.Billing"));
        assert!(patterns.matches("host"));
        assert!(!patterns.matches("hosting"));
        assert!(!patterns.matches("other.acme.orders"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let patterns = SearchPatterns::new(&["svc-?"]).unwrap();
        assert!(patterns.matches("svc-a"));
        assert!(!patterns.matches("svc-ab"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let patterns = SearchPatterns::new(&["a+b.plugin.toml"]).unwrap();
        assert!(patterns.matches("a+b.plugin.toml"));
        assert!(!patterns.matches("aab.plugin.toml"));
        assert!(!patterns.matches("a+bxplugin.toml"));
    }

    #[test]
    fn empty_pattern_is_a_discovery_error() {
        let err = SearchPatterns::new(&[" "]).unwrap_err();
        assert!(matches!(err, PlexusError::Discovery { .. }));
    }

    #[test]
    fn everything_matches_any_name() {
        let patterns = SearchPatterns::everything();
        assert!(patterns.matches("anything.at.all"));
        assert_eq!(patterns.as_slice(), ["*".to_string()]);
    }

    #[test]
    fn no_patterns_match_nothing() {
        let patterns = SearchPatterns::new::<&str>(&[]).unwrap();
        assert!(!patterns.matches("anything"));
    }
}
