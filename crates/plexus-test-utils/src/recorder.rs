// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hook recording for lifecycle-order assertions.

use std::sync::{Arc, Mutex};

use plexus_core::{HookPhase, PlexusError, ServiceProvider, ServiceScope};
use plexus_plugin::{ModuleContext, PluginModule, ServiceRegistrar, TypeRegistration};
use serde_json::{Map, Value};

/// One hook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEvent {
    pub plugin: String,
    pub module: String,
    pub phase: HookPhase,
}

/// Ordered record of hook calls, shared between modules and the test.
#[derive(Debug, Clone, Default)]
pub struct HookRecorder {
    events: Arc<Mutex<Vec<HookEvent>>>,
}

impl HookRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, plugin: &str, module: &str, phase: HookPhase) {
        self.lock().push(HookEvent {
            plugin: plugin.to_string(),
            module: module.to_string(),
            phase,
        });
    }

    /// Every recorded call, in call order.
    pub fn events(&self) -> Vec<HookEvent> {
        self.lock().clone()
    }

    /// Module names that ran `phase`, in call order.
    pub fn modules_in(&self, phase: HookPhase) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|e| e.phase == phase)
            .map(|e| e.module.clone())
            .collect()
    }

    /// Number of calls for `phase`.
    pub fn count(&self, phase: HookPhase) -> usize {
        self.lock().iter().filter(|e| e.phase == phase).count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HookEvent>> {
        // A panicking test thread must not hide the events from the others.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A module that records every hook it receives.
///
/// With [`fail_at`](Self::fail_at) set, the hook for that phase records the
/// call and then returns a module error.
pub struct RecordingModule {
    plugin: String,
    name: String,
    recorder: HookRecorder,
    fail_at: Option<HookPhase>,
}

impl RecordingModule {
    pub fn new(plugin: impl Into<String>, name: impl Into<String>, recorder: HookRecorder) -> Self {
        Self {
            plugin: plugin.into(),
            name: name.into(),
            recorder,
            fail_at: None,
        }
    }

    pub fn fail_at(mut self, phase: HookPhase) -> Self {
        self.fail_at = Some(phase);
        self
    }

    fn hook(&self, phase: HookPhase) -> Result<(), PlexusError> {
        self.recorder.record(&self.plugin, &self.name, phase);
        if self.fail_at == Some(phase) {
            return Err(PlexusError::module(format!("{} failed on purpose", self.name)));
        }
        Ok(())
    }
}

impl PluginModule for RecordingModule {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn initialize(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), PlexusError> {
        self.hook(HookPhase::Initialize)
    }

    fn configure(&mut self, _ctx: &ModuleContext<'_>) -> Result<(), PlexusError> {
        self.hook(HookPhase::Configure)
    }

    fn register_default_components(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registrar: &mut ServiceRegistrar<'_>,
    ) -> Result<(), PlexusError> {
        self.hook(HookPhase::RegisterDefaultComponents)
    }

    fn scan_own_plugin(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registration: &mut TypeRegistration<'_>,
    ) -> Result<(), PlexusError> {
        self.hook(HookPhase::ScanOwnPlugin)
    }

    fn scan_other_plugins(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registration: &mut TypeRegistration<'_>,
    ) -> Result<(), PlexusError> {
        self.hook(HookPhase::ScanOtherPlugins)
    }

    fn scan_application_plugins(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registration: &mut TypeRegistration<'_>,
    ) -> Result<(), PlexusError> {
        self.hook(HookPhase::ScanApplicationPlugins)
    }

    fn register_components(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _registrar: &mut ServiceRegistrar<'_>,
    ) -> Result<(), PlexusError> {
        self.hook(HookPhase::RegisterComponents)
    }

    fn start(
        &mut self,
        _ctx: &ModuleContext<'_>,
        _services: &ServiceProvider,
        _scope: &ServiceScope,
    ) -> Result<(), PlexusError> {
        self.hook(HookPhase::Start)
    }

    fn run(&mut self, _ctx: &ModuleContext<'_>, _scope: &ServiceScope) -> Result<(), PlexusError> {
        self.hook(HookPhase::Run)
    }

    fn stop(&mut self, _ctx: &ModuleContext<'_>, _scope: &ServiceScope) -> Result<(), PlexusError> {
        self.hook(HookPhase::Stop)
    }

    fn dispose(&mut self) -> Result<(), PlexusError> {
        self.hook(HookPhase::Dispose)
    }

    fn log(&self, log: &mut Map<String, Value>) {
        log.insert("recording".into(), Value::Bool(true));
    }
}
