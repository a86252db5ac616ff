// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The application container: configuration, build, and lifecycle.
//!
//! ```text
//! Unbuilt --build--> Built --start--> Started --stop--> Stopped --start--> Started
//!    |
//!    +--build fails--> Failed            any --dispose--> Disposed
//! ```

use std::any::TypeId;

use serde::Serialize;
use strum::Display;
use tracing::{error, info, trace, warn};

use plexus_core::{ContainerConfig, PlexusError, ServiceCollection, ServiceProvider};
use plexus_plugin::{ManifestRegistry, Plugin, TypeResolver};

use crate::composite::CompositeApplication;
use crate::configs::{ConfigSet, LoggerConfig, ServiceRegistrationConfig};
use crate::log::CompositeLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Unbuilt,
    Built,
    Started,
    Stopped,
    Failed,
    Disposed,
}

/// Everything produced by a successful build.
struct Composed {
    application: CompositeApplication,
    services: ServiceProvider,
    log: CompositeLog,
}

/// Owns one composed application and drives it through its lifecycle.
pub struct AppContainer {
    resolver: Box<dyn TypeResolver>,
    configs: ConfigSet,
    state: ContainerState,
    composed: Option<Composed>,
    /// Modules of a build that failed after they were created. Disposed with
    /// the container.
    failed: Option<CompositeApplication>,
}

impl AppContainer {
    pub fn new(resolver: impl TypeResolver + 'static) -> Self {
        Self::from_boxed(Box::new(resolver))
    }

    pub fn from_boxed(resolver: Box<dyn TypeResolver>) -> Self {
        Self {
            resolver,
            configs: ConfigSet::new(),
            state: ContainerState::Unbuilt,
            composed: None,
            failed: None,
        }
    }

    /// Add a configuration object. At most one per type, before build.
    ///
    /// Configs whose type a plugin declares are routed to that plugin.
    pub fn with_config<T: ContainerConfig>(&mut self, config: T) -> Result<&mut Self, PlexusError> {
        self.ensure_not_disposed()?;
        if self.state != ContainerState::Unbuilt {
            return Err(self.report(PlexusError::Misuse(
                "configuration must be added before the container is built".into(),
            )));
        }
        self.configs.insert(config).map_err(|e| self.report(e))?;
        Ok(self)
    }

    pub fn config<T: ContainerConfig>(&self) -> Option<&T> {
        self.configs.get::<T>()
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Discover, validate, compose, and register every plugin.
    ///
    /// On failure the container moves to [`ContainerState::Failed`] and
    /// exposes nothing. Modules already created are kept only so that
    /// [`dispose`](Self::dispose) can run their dispose hooks.
    pub fn build(&mut self) -> Result<(), PlexusError> {
        self.ensure_not_disposed()?;
        if self.state != ContainerState::Unbuilt {
            return Err(self.report(PlexusError::Misuse(format!(
                "build called on a container that is {}",
                self.state
            ))));
        }

        match self.compose() {
            Ok(composed) => {
                info!(
                    plugins = composed.application.plugins().len(),
                    services = composed.services.descriptors().len(),
                    "application container built"
                );
                self.composed = Some(composed);
                self.state = ContainerState::Built;
                Ok(())
            }
            Err(err) => {
                self.state = ContainerState::Failed;
                Err(self.report(err))
            }
        }
    }

    /// Start every module, then run them.
    pub fn start(&mut self) -> Result<(), PlexusError> {
        self.ensure_not_disposed()?;
        match self.state {
            ContainerState::Built | ContainerState::Stopped => {}
            ContainerState::Started => {
                return Err(self.report(PlexusError::Misuse(
                    "the application has already been started".into(),
                )));
            }
            state => {
                return Err(self.report(PlexusError::Misuse(format!(
                    "start called on a container that is {state}"
                ))));
            }
        }

        let composed = self.composed_mut()?;
        let result = composed.application.start(&composed.services);
        // Start hooks are not rolled back; a partial start can still be stopped.
        self.state = ContainerState::Started;
        result.map_err(|e| self.report(e))?;

        // Module logs may report runtime state.
        if let Some(composed) = self.composed.as_mut() {
            composed.log = CompositeLog::new(
                &composed.application,
                &composed.services,
                self.resolver.search_patterns(),
            );
        }

        info!("application started");
        if tracing::enabled!(tracing::Level::TRACE) {
            self.trace_log();
        }
        Ok(())
    }

    /// Stop every module, in reverse start order.
    pub fn stop(&mut self) -> Result<(), PlexusError> {
        self.ensure_not_disposed()?;
        if self.state != ContainerState::Started {
            return Err(self.report(PlexusError::Misuse(format!(
                "stop called on a container that is {}",
                self.state
            ))));
        }

        let composed = self.composed_mut()?;
        let result = composed.application.stop(&composed.services);
        result.map_err(|e| self.report(e))?;
        self.state = ContainerState::Stopped;
        info!("application stopped");
        Ok(())
    }

    /// Stop if started, dispose every module, and drop the application.
    ///
    /// Module dispose failures are logged and do not stop the pass. Returns
    /// the stop failure, if any. A second call does nothing.
    pub fn dispose(&mut self) -> Result<(), PlexusError> {
        if self.state == ContainerState::Disposed {
            return Ok(());
        }

        let stopped = if self.state == ContainerState::Started {
            self.stop()
        } else {
            Ok(())
        };

        let application = self
            .composed
            .take()
            .map(|composed| composed.application)
            .or_else(|| self.failed.take());
        if let Some(mut application) = application {
            let failures = application.dispose_modules();
            if !failures.is_empty() {
                warn!(failures = failures.len(), "some modules failed to dispose");
            }
        }
        self.state = ContainerState::Disposed;
        info!("application container disposed");
        stopped
    }

    /// The built service registry.
    pub fn services(&self) -> Result<&ServiceProvider, PlexusError> {
        Ok(&self.composed()?.services)
    }

    pub fn log(&self) -> Result<&CompositeLog, PlexusError> {
        Ok(&self.composed()?.log)
    }

    pub fn application(&self) -> Result<&CompositeApplication, PlexusError> {
        Ok(&self.composed()?.application)
    }

    /// The plugin that declares `T`.
    pub fn plugin_for_type<T: ?Sized + 'static>(&self) -> Result<Option<&Plugin>, PlexusError> {
        let type_id = TypeId::of::<T>();
        Ok(self
            .application()?
            .plugins()
            .iter()
            .find(|plugin| plugin.declares_type(type_id)))
    }

    fn compose(&mut self) -> Result<Composed, PlexusError> {
        let mut application = self.load()?;
        match self.register(&mut application) {
            Ok((services, log)) => Ok(Composed {
                application,
                services,
                log,
            }),
            Err(err) => {
                self.failed = Some(application);
                Err(err)
            }
        }
    }

    /// Discover plugins, their types, and their modules.
    fn load(&self) -> Result<CompositeApplication, PlexusError> {
        let registry = ManifestRegistry::new(self.resolver.discover_manifests()?)?;
        info!(plugins = registry.len(), "discovered plugins");

        let mut plugins = Vec::with_capacity(registry.len());
        let mut modules = Vec::with_capacity(registry.len());
        for manifest in registry.into_manifests() {
            let plugin = Plugin::new(manifest);
            plugin.set_types(self.resolver.load_plugin_types(&plugin)?)?;
            let plugin_modules = self.resolver.discover_modules(&plugin)?;
            plugin.set_module_names(plugin_modules.iter().map(|m| m.name()).collect())?;
            plugin.set_configs(self.configs.routed_to(&plugin))?;
            tracing::debug!(
                plugin = %plugin.name(),
                tier = %plugin.tier(),
                types = plugin.types().len(),
                modules = plugin_modules.len(),
                "loaded plugin"
            );
            plugins.push(plugin);
            modules.push(plugin_modules);
        }

        CompositeApplication::new(plugins, modules)
    }

    /// Run composition and registration over loaded modules.
    fn register(
        &self,
        application: &mut CompositeApplication,
    ) -> Result<(ServiceProvider, CompositeLog), PlexusError> {
        application.compose(self.resolver.as_ref())?;
        application.set_known_type_discoveries()?;

        let mut services = ServiceCollection::new();
        application.register_components(&mut services)?;
        if let Some(host) = self.configs.get::<ServiceRegistrationConfig>() {
            host.apply(&mut services);
        }
        let services = services.build();

        let log = CompositeLog::new(application, &services, self.resolver.search_patterns());
        Ok((services, log))
    }

    fn composed(&self) -> Result<&Composed, PlexusError> {
        self.ensure_not_disposed()?;
        self.composed.as_ref().ok_or_else(|| {
            PlexusError::Misuse(format!("the container is {}, not built", self.state))
        })
    }

    fn composed_mut(&mut self) -> Result<&mut Composed, PlexusError> {
        let state = self.state;
        self.composed
            .as_mut()
            .ok_or_else(|| PlexusError::Internal(format!("container is {state} but holds no application")))
    }

    fn ensure_not_disposed(&self) -> Result<(), PlexusError> {
        if self.state == ContainerState::Disposed {
            return Err(self.report(PlexusError::Disposed));
        }
        Ok(())
    }

    fn trace_log(&self) {
        let Some(composed) = &self.composed else {
            return;
        };
        match composed.log.to_json_pretty() {
            Ok(json) => trace!(composite_log = %json, "composed application"),
            Err(err) => warn!(error = %err, "composite log unavailable"),
        }
    }

    /// Log a fatal error once, if enabled, and hand it back.
    fn report(&self, err: PlexusError) -> PlexusError {
        let log_exceptions = self
            .configs
            .get::<LoggerConfig>()
            .is_none_or(|config| config.log_exceptions);
        if log_exceptions {
            error!(error = %err, "application container error");
        }
        err
    }
}

impl Drop for AppContainer {
    fn drop(&mut self) {
        // A stop failure has already been reported.
        let _ = self.dispose();
    }
}

impl std::fmt::Debug for AppContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContainer")
            .field("state", &self.state)
            .field("configs", &self.configs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_test_utils::TestCatalog;
    use tracing_test::traced_test;

    fn error_lines(lines: &[&str]) -> usize {
        lines
            .iter()
            .filter(|line| line.contains("application container error"))
            .count()
    }

    #[test]
    #[traced_test]
    fn fatal_error_is_logged_once() {
        let fixture = TestCatalog::builder().core("Messaging").build();
        let mut container = AppContainer::new(fixture.resolver());

        assert!(container.build().is_err());
        assert_eq!(container.state(), ContainerState::Failed);
        assert!(logs_contain("no application host plugin was discovered"));
        logs_assert(|lines| match error_lines(lines) {
            1 => Ok(()),
            n => Err(format!("expected one error line, found {n}")),
        });
    }

    #[test]
    #[traced_test]
    fn errors_are_not_logged_when_disabled() {
        let fixture = TestCatalog::builder().core("Messaging").build();
        let mut container = AppContainer::new(fixture.resolver());
        container
            .with_config(LoggerConfig {
                log_exceptions: false,
            })
            .unwrap();

        assert!(container.build().is_err());
        assert!(!logs_contain("application container error"));
    }

    #[test]
    #[traced_test]
    fn composite_log_is_traced_after_start() {
        let fixture = TestCatalog::layered();
        let mut container = AppContainer::new(fixture.resolver());
        container.build().unwrap();
        container.start().unwrap();

        assert!(logs_contain("composed application"));
        assert!(logs_contain("application started"));
    }

    #[test]
    #[traced_test]
    fn stop_failure_during_drop_is_logged_once() {
        let fixture = TestCatalog::builder()
            .core("Messaging")
            .component("Orders")
            .host("Host")
            .failing("OrdersModule", plexus_core::HookPhase::Stop)
            .build();
        {
            let mut container = AppContainer::new(fixture.resolver());
            container.build().unwrap();
            container.start().unwrap();
        }

        assert!(logs_contain("OrdersModule failed on purpose"));
        assert!(!logs_contain("dispose on drop failed"));
        logs_assert(|lines| match error_lines(lines) {
            1 => Ok(()),
            n => Err(format!("expected one error line, found {n}")),
        });
    }

    #[test]
    fn state_displays_in_snake_case() {
        assert_eq!(ContainerState::Unbuilt.to_string(), "unbuilt");
        assert_eq!(ContainerState::Disposed.to_string(), "disposed");
    }
}
