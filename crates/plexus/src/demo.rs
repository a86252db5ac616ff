// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled-in demo plugins.
//!
//! - `plexus.messaging` (Core): an in-process message bus. Its module
//!   collects every `MessageHandler` in the system and registers a bus that
//!   dispatches to them, over a null default.
//! - `plexus.orders` (AppComponent): an order-placed handler and an order
//!   repository picked up by a scan of its own types.
//! - `plexus.host` (AppHost): publishes a readiness message once running.

use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tracing::{debug, info};

use plexus_core::{KnownType, PlexusError, PluginTier, ServiceLifetime, ServiceScope};
use plexus_plugin::{
    KnownTypeSlots, ModuleContext, PluginAssembly, PluginCatalog, PluginManifest, PluginModule,
    PluginType, ServiceRegistrar, TypeRegistration,
};

pub const READY_TOPIC: &str = "host.ready";
pub const ORDER_PLACED_TOPIC: &str = "orders.placed";

/// Receives messages published on one topic.
pub trait MessageHandler: KnownType {
    fn topic(&self) -> &'static str;

    fn handle(&self, payload: &str) -> Result<(), PlexusError>;
}

pub trait MessageBus: Send + Sync {
    /// Deliver `payload` to every handler of `topic`. Returns the number of
    /// handlers reached.
    fn publish(&self, topic: &str, payload: &str) -> Result<usize, PlexusError>;
}

/// Drops every message.
#[derive(Debug, Default)]
pub struct NullBus;

impl MessageBus for NullBus {
    fn publish(&self, topic: &str, _payload: &str) -> Result<usize, PlexusError> {
        debug!(topic, "no message bus registered, dropping message");
        Ok(0)
    }
}

pub struct InMemoryBus {
    handlers: Vec<Arc<dyn MessageHandler>>,
}

impl InMemoryBus {
    pub fn new(handlers: Vec<Arc<dyn MessageHandler>>) -> Self {
        Self { handlers }
    }
}

impl MessageBus for InMemoryBus {
    fn publish(&self, topic: &str, payload: &str) -> Result<usize, PlexusError> {
        let mut reached = 0;
        for handler in self.handlers.iter().filter(|h| h.topic() == topic) {
            handler.handle(payload)?;
            reached += 1;
        }
        Ok(reached)
    }
}

/// Logs readiness messages.
#[derive(Debug, Default)]
pub struct AuditHandler;

impl KnownType for AuditHandler {}

impl MessageHandler for AuditHandler {
    fn topic(&self) -> &'static str {
        READY_TOPIC
    }

    fn handle(&self, payload: &str) -> Result<(), PlexusError> {
        info!(payload, "audit: host ready");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct OrderPlacedHandler;

impl KnownType for OrderPlacedHandler {}

impl MessageHandler for OrderPlacedHandler {
    fn topic(&self) -> &'static str {
        ORDER_PLACED_TOPIC
    }

    fn handle(&self, payload: &str) -> Result<(), PlexusError> {
        info!(order = payload, "order placed");
        Ok(())
    }
}

pub trait OrderRepository: Send + Sync {
    fn save(&self, order: &str);

    fn count(&self) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<String>>,
}

impl OrderRepository for InMemoryOrderRepository {
    fn save(&self, order: &str) {
        if let Ok(mut orders) = self.orders.lock() {
            orders.push(order.to_string());
        }
    }

    fn count(&self) -> usize {
        self.orders.lock().map(|orders| orders.len()).unwrap_or_default()
    }
}

/// Core messaging module.
#[derive(Default)]
pub struct BusModule {
    handlers: Vec<Arc<dyn MessageHandler>>,
}

impl PluginModule for BusModule {
    fn compose(&mut self, slots: &mut KnownTypeSlots<'_>) {
        self.handlers = slots.bind::<dyn MessageHandler>();
    }

    fn register_default_components(
        &mut self,
        _ctx: &ModuleContext<'_>,
        registrar: &mut ServiceRegistrar<'_>,
    ) -> Result<(), PlexusError> {
        registrar
            .add_instance::<dyn MessageBus>(Arc::new(NullBus))
            .implemented_by::<NullBus>();
        Ok(())
    }

    fn register_components(
        &mut self,
        _ctx: &ModuleContext<'_>,
        registrar: &mut ServiceRegistrar<'_>,
    ) -> Result<(), PlexusError> {
        if self.handlers.is_empty() {
            return Ok(());
        }
        let handlers = self.handlers.clone();
        registrar
            .add_singleton::<dyn MessageBus, _>(move |_| {
                Ok(Arc::new(InMemoryBus::new(handlers.clone())) as Arc<dyn MessageBus>)
            })
            .implemented_by::<InMemoryBus>();
        Ok(())
    }

    fn log(&self, log: &mut Map<String, Value>) {
        let topics: Vec<Value> = self.handlers.iter().map(|h| Value::from(h.topic())).collect();
        log.insert("handler_topics".into(), Value::Array(topics));
    }
}

/// Registers the orders plugin's repositories.
#[derive(Default)]
pub struct OrdersModule;

impl PluginModule for OrdersModule {
    fn scan_own_plugin(
        &mut self,
        _ctx: &ModuleContext<'_>,
        registration: &mut TypeRegistration<'_>,
    ) -> Result<(), PlexusError> {
        let registered = registration.register_contract::<dyn OrderRepository>(ServiceLifetime::Scoped);
        debug!(registered, "order repositories registered");
        Ok(())
    }
}

/// Announces readiness once every plugin has started, then places a first
/// order when the orders plugin is loaded.
#[derive(Default)]
pub struct HostModule {
    announced: usize,
    orders: usize,
}

impl PluginModule for HostModule {
    fn run(&mut self, ctx: &ModuleContext<'_>, scope: &ServiceScope) -> Result<(), PlexusError> {
        let bus = scope.resolve::<dyn MessageBus>()?;
        self.announced = bus.publish(READY_TOPIC, ctx.plugin().name())?;
        info!(handlers = self.announced, "host ready");

        if let Some(repository) = scope.try_resolve::<dyn OrderRepository>() {
            repository.save("order-1");
            bus.publish(ORDER_PLACED_TOPIC, "order-1")?;
            self.orders = repository.count();
        }
        Ok(())
    }

    fn stop(&mut self, _ctx: &ModuleContext<'_>, _scope: &ServiceScope) -> Result<(), PlexusError> {
        info!("host stopping");
        Ok(())
    }

    fn log(&self, log: &mut Map<String, Value>) {
        log.insert("announced_to".into(), Value::from(self.announced));
        log.insert("orders".into(), Value::from(self.orders));
    }
}

fn handler<T: MessageHandler + Default>() -> PluginType {
    PluginType::of::<T>()
        .provides::<dyn MessageHandler, _>(|| Arc::new(T::default()) as Arc<dyn MessageHandler>)
}

/// Every demo unit.
pub fn catalog() -> Arc<PluginCatalog> {
    let messaging = PluginAssembly::new("plexus.messaging")
        .manifest(
            PluginManifest::new("plexus-messaging", "Messaging", "", PluginTier::Core)
                .with_description("In-process message bus")
                .with_version("1.0.0"),
        )
        .with_type(PluginType::known_capability::<dyn MessageHandler>())
        .with_type(PluginType::capability::<dyn MessageBus>())
        .with_type(handler::<AuditHandler>())
        .default_module::<BusModule>();

    let orders = PluginAssembly::new("plexus.orders")
        .manifest(
            PluginManifest::new("plexus-orders", "Orders", "", PluginTier::AppComponent)
                .with_description("Order intake"),
        )
        .with_type(handler::<OrderPlacedHandler>())
        .with_type(PluginType::capability::<dyn OrderRepository>())
        .with_type(PluginType::of::<InMemoryOrderRepository>().exposes::<dyn OrderRepository, _>(
            || Arc::new(InMemoryOrderRepository::default()) as Arc<dyn OrderRepository>,
        ))
        .default_module::<OrdersModule>()
        .depends_on("plexus.messaging");

    let host = PluginAssembly::new("plexus.host")
        .manifest(
            PluginManifest::new("plexus-host", "Host", "", PluginTier::AppHost)
                .with_description("Demo application host"),
        )
        .default_module::<HostModule>()
        .depends_on("plexus.messaging");

    Arc::new(PluginCatalog::new().with(messaging).with(orders).with(host))
}
