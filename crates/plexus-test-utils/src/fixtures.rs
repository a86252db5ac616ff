// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog fixtures for container tests.
//!
//! `TestCatalog` builds a catalog of plugins whose modules are
//! [`RecordingModule`]s sharing one [`HookRecorder`].

use std::sync::Arc;

use plexus_core::{HookPhase, PluginTier};
use plexus_plugin::{
    CatalogResolver, PluginAssembly, PluginCatalog, PluginManifest, PluginModule, PluginType,
};

use crate::recorder::{HookRecorder, RecordingModule};

struct TestPlugin {
    name: String,
    tier: PluginTier,
    modules: Vec<String>,
    types: Vec<PluginType>,
}

/// Builder for creating test catalogs.
pub struct TestCatalogBuilder {
    recorder: HookRecorder,
    plugins: Vec<TestPlugin>,
    failures: Vec<(String, HookPhase)>,
    extra: Vec<PluginAssembly>,
}

impl TestCatalogBuilder {
    fn new() -> Self {
        Self {
            recorder: HookRecorder::new(),
            plugins: Vec::new(),
            failures: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Add a plugin with a single module named `<name>Module`.
    pub fn plugin(self, name: &str, tier: PluginTier) -> Self {
        let module = format!("{name}Module");
        self.plugin_with_modules(name, tier, &[module.as_str()])
    }

    pub fn plugin_with_modules(mut self, name: &str, tier: PluginTier, modules: &[&str]) -> Self {
        self.plugins.push(TestPlugin {
            name: name.to_string(),
            tier,
            modules: modules.iter().map(|m| m.to_string()).collect(),
            types: Vec::new(),
        });
        self
    }

    pub fn core(self, name: &str) -> Self {
        self.plugin(name, PluginTier::Core)
    }

    pub fn component(self, name: &str) -> Self {
        self.plugin(name, PluginTier::AppComponent)
    }

    pub fn host(self, name: &str) -> Self {
        self.plugin(name, PluginTier::AppHost)
    }

    /// Declare a type on the most recently added plugin.
    pub fn with_type(mut self, ty: PluginType) -> Self {
        if let Some(plugin) = self.plugins.last_mut() {
            plugin.types.push(ty);
        }
        self
    }

    /// Make the named module fail at `phase`.
    pub fn failing(mut self, module: &str, phase: HookPhase) -> Self {
        self.failures.push((module.to_string(), phase));
        self
    }

    /// Add a hand-built unit alongside the recording plugins.
    pub fn with_assembly(mut self, assembly: PluginAssembly) -> Self {
        self.extra.push(assembly);
        self
    }

    pub fn build(self) -> TestCatalog {
        let mut catalog = PluginCatalog::new();
        for plugin in self.plugins {
            let id = plugin.name.to_lowercase();
            let mut assembly = PluginAssembly::new(format!("test.{id}"))
                .manifest(PluginManifest::new(&id, &plugin.name, "", plugin.tier));
            for ty in plugin.types {
                assembly = assembly.with_type(ty);
            }
            for module in plugin.modules {
                let fail_at = self
                    .failures
                    .iter()
                    .find(|(name, _)| *name == module)
                    .map(|(_, phase)| *phase);
                let recorder = self.recorder.clone();
                let plugin_name = plugin.name.clone();
                assembly = assembly.module(move || {
                    let recording = RecordingModule::new(&plugin_name, &module, recorder.clone());
                    let recording = match fail_at {
                        Some(phase) => recording.fail_at(phase),
                        None => recording,
                    };
                    Box::new(recording) as Box<dyn PluginModule>
                });
            }
            catalog.add(assembly);
        }
        for assembly in self.extra {
            catalog.add(assembly);
        }

        TestCatalog {
            catalog: Arc::new(catalog),
            recorder: self.recorder,
        }
    }
}

/// A catalog of recording plugins plus the recorder they share.
pub struct TestCatalog {
    catalog: Arc<PluginCatalog>,
    recorder: HookRecorder,
}

impl TestCatalog {
    pub fn builder() -> TestCatalogBuilder {
        TestCatalogBuilder::new()
    }

    /// One Core, one AppComponent, and one AppHost plugin.
    pub fn layered() -> Self {
        Self::builder()
            .core("Messaging")
            .component("Orders")
            .host("Host")
            .build()
    }

    pub fn catalog(&self) -> Arc<PluginCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn recorder(&self) -> HookRecorder {
        self.recorder.clone()
    }

    /// Resolver over every unit in the catalog.
    pub fn resolver(&self) -> CatalogResolver {
        CatalogResolver::all(self.catalog())
    }
}
