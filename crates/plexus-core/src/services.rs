// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal service registry populated by plugin modules.
//!
//! [`ServiceCollection`] records `(contract, implementation, lifetime)`
//! registrations in order. [`ServiceProvider`] is the built, read-only
//! registry. Resolving a single service returns the **last** registration for
//! its contract, which lets an application plugin replace a default that a
//! core plugin registered earlier.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::activator::Activator;
use crate::error::PlexusError;
use crate::types::{CapabilityType, ServiceLifetime, short_type_name};

/// A resolved instance. The erased value is always an `Arc<C>` for the
/// descriptor's contract `C`.
type Instance = Arc<dyn Any + Send + Sync>;

type ServiceFactory =
    Arc<dyn Fn(&ServiceResolver<'_>) -> Result<Instance, PlexusError> + Send + Sync>;

/// One registration in the service registry.
#[derive(Clone)]
pub struct ServiceDescriptor {
    contract: CapabilityType,
    implementation: String,
    lifetime: ServiceLifetime,
    plugin_id: Option<String>,
    factory: ServiceFactory,
}

impl ServiceDescriptor {
    pub fn contract(&self) -> CapabilityType {
        self.contract
    }

    /// Name of the implementing type, used for diagnostics.
    pub fn implementation(&self) -> &str {
        &self.implementation
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    /// Plugin that contributed the registration, if any.
    pub fn plugin_id(&self) -> Option<&str> {
        self.plugin_id.as_deref()
    }

    /// Name the implementing type for diagnostics.
    pub fn implemented_by<T: ?Sized>(&mut self) -> &mut Self {
        self.implementation = short_type_name(std::any::type_name::<T>());
        self
    }

    /// Name the implementation explicitly.
    pub fn named(&mut self, implementation: impl Into<String>) -> &mut Self {
        self.implementation = implementation.into();
        self
    }

    /// Attribute the registration to a plugin.
    pub fn from_plugin(&mut self, plugin_id: impl Into<String>) -> &mut Self {
        self.plugin_id = Some(plugin_id.into());
        self
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("contract", &self.contract)
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .field("plugin_id", &self.plugin_id)
            .finish()
    }
}

/// Ordered list of service registrations, built into a [`ServiceProvider`].
#[derive(Default, Clone)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for contract `C` with the given lifetime.
    pub fn add<C, F>(&mut self, lifetime: ServiceLifetime, factory: F) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceResolver<'_>) -> Result<Arc<C>, PlexusError> + Send + Sync + 'static,
    {
        let contract = CapabilityType::of::<C>();
        let factory: ServiceFactory =
            Arc::new(move |resolver| factory(resolver).map(|service| Arc::new(service) as Instance));
        self.push(ServiceDescriptor {
            contract,
            implementation: contract.short_name(),
            lifetime,
            plugin_id: None,
            factory,
        })
    }

    pub fn add_singleton<C, F>(&mut self, factory: F) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceResolver<'_>) -> Result<Arc<C>, PlexusError> + Send + Sync + 'static,
    {
        self.add(ServiceLifetime::Singleton, factory)
    }

    pub fn add_scoped<C, F>(&mut self, factory: F) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceResolver<'_>) -> Result<Arc<C>, PlexusError> + Send + Sync + 'static,
    {
        self.add(ServiceLifetime::Scoped, factory)
    }

    pub fn add_transient<C, F>(&mut self, factory: F) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceResolver<'_>) -> Result<Arc<C>, PlexusError> + Send + Sync + 'static,
    {
        self.add(ServiceLifetime::Transient, factory)
    }

    /// Register an existing instance as a singleton.
    pub fn add_instance<C>(&mut self, instance: Arc<C>) -> &mut ServiceDescriptor
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceLifetime::Singleton, move |_| Ok(Arc::clone(&instance)))
    }

    /// Register a parameterless activator under its contract.
    pub fn add_activator(
        &mut self,
        lifetime: ServiceLifetime,
        activator: &Activator,
        implementation: impl Into<String>,
    ) -> &mut ServiceDescriptor {
        let contract = activator.contract();
        let activator = activator.clone();
        let factory: ServiceFactory = Arc::new(move |_| Ok(Arc::from(activator.activate_erased())));
        self.push(ServiceDescriptor {
            contract,
            implementation: implementation.into(),
            lifetime,
            plugin_id: None,
            factory,
        })
    }

    /// Registrations in the order they were added.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Returns true if at least one registration exists for `C`.
    pub fn contains<C: ?Sized + 'static>(&self) -> bool {
        let contract = CapabilityType::of::<C>();
        self.descriptors.iter().any(|d| d.contract == contract)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the registrations into a provider.
    pub fn build(self) -> ServiceProvider {
        let mut by_contract: HashMap<CapabilityType, Vec<usize>> = HashMap::new();
        for (idx, descriptor) in self.descriptors.iter().enumerate() {
            by_contract.entry(descriptor.contract).or_default().push(idx);
        }
        let singletons = self.descriptors.iter().map(|_| Mutex::new(None)).collect();

        ServiceProvider {
            inner: Arc::new(ProviderInner {
                descriptors: self.descriptors,
                by_contract,
                singletons,
                root_scoped: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn push(&mut self, descriptor: ServiceDescriptor) -> &mut ServiceDescriptor {
        let idx = self.descriptors.len();
        self.descriptors.push(descriptor);
        &mut self.descriptors[idx]
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.descriptors).finish()
    }
}

struct ProviderInner {
    descriptors: Vec<ServiceDescriptor>,
    by_contract: HashMap<CapabilityType, Vec<usize>>,
    singletons: Vec<Mutex<Option<Instance>>>,
    root_scoped: Mutex<HashMap<usize, Instance>>,
}

/// The built service registry.
///
/// Cheap to clone; clones share singleton instances.
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

impl ServiceProvider {
    /// Begin a new scope. Scoped services resolved through it are cached
    /// until the scope is dropped.
    pub fn create_scope(&self) -> ServiceScope {
        ServiceScope {
            provider: self.clone(),
            scoped: Mutex::new(HashMap::new()),
        }
    }

    /// Resolver over the root scope.
    pub fn resolver(&self) -> ServiceResolver<'_> {
        ServiceResolver {
            provider: self,
            scoped: &self.inner.root_scoped,
            path: Vec::new(),
        }
    }

    /// Resolve the last registration of `C` from the root scope.
    pub fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, PlexusError> {
        self.resolver().resolve::<C>()
    }

    pub fn try_resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>> {
        self.resolver().try_resolve::<C>()
    }

    pub fn resolve_all<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<C>>, PlexusError> {
        self.resolver().resolve_all::<C>()
    }

    pub fn contains<C: ?Sized + 'static>(&self) -> bool {
        self.inner.by_contract.contains_key(&CapabilityType::of::<C>())
    }

    /// Every registration, in registration order.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.inner.descriptors
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("registrations", &self.inner.descriptors.len())
            .finish()
    }
}

/// A lifetime scope over a [`ServiceProvider`].
pub struct ServiceScope {
    provider: ServiceProvider,
    scoped: Mutex<HashMap<usize, Instance>>,
}

impl ServiceScope {
    pub fn provider(&self) -> &ServiceProvider {
        &self.provider
    }

    pub fn resolver(&self) -> ServiceResolver<'_> {
        ServiceResolver {
            provider: &self.provider,
            scoped: &self.scoped,
            path: Vec::new(),
        }
    }

    pub fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, PlexusError> {
        self.resolver().resolve::<C>()
    }

    pub fn try_resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>> {
        self.resolver().try_resolve::<C>()
    }

    pub fn resolve_all<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<C>>, PlexusError> {
        self.resolver().resolve_all::<C>()
    }
}

impl fmt::Debug for ServiceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceScope")
            .field("provider", &self.provider)
            .finish()
    }
}

/// Resolves services against a provider and one scope cache.
///
/// Passed to service factories so they can resolve their own dependencies.
pub struct ServiceResolver<'a> {
    provider: &'a ServiceProvider,
    scoped: &'a Mutex<HashMap<usize, Instance>>,
    /// Registrations being activated on this resolution path.
    path: Vec<usize>,
}

impl ServiceResolver<'_> {
    /// Resolve the last registration of `C`.
    pub fn resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<C>, PlexusError> {
        let contract = CapabilityType::of::<C>();
        let idx = self
            .provider
            .inner
            .by_contract
            .get(&contract)
            .and_then(|indices| indices.last())
            .copied()
            .ok_or_else(|| PlexusError::ServiceNotRegistered {
                contract: contract.name().to_string(),
            })?;
        tracing::trace!(
            contract = %contract.short_name(),
            implementation = %self.provider.inner.descriptors[idx].implementation,
            "resolving service"
        );
        let instance = self.instance(idx)?;
        downcast::<C>(&instance, contract)
    }

    pub fn try_resolve<C: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<C>> {
        self.resolve::<C>().ok()
    }

    /// Resolve every registration of `C`, in registration order.
    pub fn resolve_all<C: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<C>>, PlexusError> {
        let contract = CapabilityType::of::<C>();
        let Some(indices) = self.provider.inner.by_contract.get(&contract) else {
            return Ok(Vec::new());
        };
        indices
            .iter()
            .map(|&idx| {
                let instance = self.instance(idx)?;
                downcast::<C>(&instance, contract)
            })
            .collect()
    }

    fn instance(&self, idx: usize) -> Result<Instance, PlexusError> {
        let inner = &self.provider.inner;
        let descriptor = &inner.descriptors[idx];
        if self.path.contains(&idx) {
            return Err(PlexusError::ServiceActivation {
                contract: descriptor.contract.name().to_string(),
                message: "circular dependency".to_string(),
            });
        }

        match descriptor.lifetime {
            ServiceLifetime::Singleton => {
                if let Some(existing) = lock(&inner.singletons[idx]).as_ref() {
                    return Ok(Arc::clone(existing));
                }
                // Singletons only see the root scope.
                let created = (descriptor.factory)(&self.nested(&inner.root_scoped, idx))?;
                let mut slot = lock(&inner.singletons[idx]);
                Ok(Arc::clone(slot.get_or_insert(created)))
            }
            ServiceLifetime::Scoped => {
                if let Some(existing) = lock(self.scoped).get(&idx) {
                    return Ok(Arc::clone(existing));
                }
                let created = (descriptor.factory)(&self.nested(self.scoped, idx))?;
                let mut cache = lock(self.scoped);
                Ok(Arc::clone(cache.entry(idx).or_insert(created)))
            }
            ServiceLifetime::Transient => (descriptor.factory)(&self.nested(self.scoped, idx)),
        }
    }

    /// Resolver handed to the factory of registration `idx`.
    fn nested<'s>(&'s self, scoped: &'s Mutex<HashMap<usize, Instance>>, idx: usize) -> ServiceResolver<'s> {
        let mut path = self.path.clone();
        path.push(idx);
        ServiceResolver {
            provider: self.provider,
            scoped,
            path,
        }
    }
}

fn downcast<C: ?Sized + Send + Sync + 'static>(
    instance: &Instance,
    contract: CapabilityType,
) -> Result<Arc<C>, PlexusError> {
    instance
        .downcast_ref::<Arc<C>>()
        .cloned()
        .ok_or_else(|| PlexusError::ServiceActivation {
            contract: contract.name().to_string(),
            message: "factory produced a value of a different type".to_string(),
        })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct NullClock;

    impl Clock for NullClock {
        fn now(&self) -> u64 {
            0
        }
    }

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now(&self) -> u64 {
            self.0
        }
    }

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct ClockGreeter {
        clock: Arc<dyn Clock>,
    }

    impl Greeter for ClockGreeter {
        fn greet(&self) -> String {
            format!("hello at {}", self.clock.now())
        }
    }

    #[test]
    fn last_registration_wins() {
        let mut services = ServiceCollection::new();
        services
            .add_singleton::<dyn Clock, _>(|_| Ok(Arc::new(NullClock) as Arc<dyn Clock>))
            .implemented_by::<NullClock>();
        services
            .add_singleton::<dyn Clock, _>(|_| Ok(Arc::new(FixedClock(42)) as Arc<dyn Clock>))
            .implemented_by::<FixedClock>();

        let provider = services.build();
        assert_eq!(provider.resolve::<dyn Clock>().unwrap().now(), 42);

        let all = provider.resolve_all::<dyn Clock>().unwrap();
        let times: Vec<u64> = all.iter().map(|c| c.now()).collect();
        assert_eq!(times, vec![0, 42]);
    }

    fn circular(err: PlexusError) -> bool {
        matches!(err, PlexusError::ServiceActivation { ref message, .. } if message == "circular dependency")
    }

    #[test]
    fn mutually_dependent_singletons_are_rejected() {
        let mut services = ServiceCollection::new();
        services.add_singleton::<dyn Clock, _>(|resolver| {
            resolver.resolve::<dyn Greeter>()?;
            Ok(Arc::new(NullClock) as Arc<dyn Clock>)
        });
        services.add_singleton::<dyn Greeter, _>(|resolver| {
            let clock = resolver.resolve::<dyn Clock>()?;
            Ok(Arc::new(ClockGreeter { clock }) as Arc<dyn Greeter>)
        });
        let provider = services.build();

        assert!(circular(provider.resolve::<dyn Greeter>().err().unwrap()));
        assert!(circular(provider.create_scope().resolve::<dyn Clock>().err().unwrap()));
    }

    #[test]
    fn self_dependent_scoped_service_is_rejected() {
        let mut services = ServiceCollection::new();
        services.add_scoped::<dyn Clock, _>(|resolver| {
            resolver.resolve::<dyn Clock>()?;
            Ok(Arc::new(NullClock) as Arc<dyn Clock>)
        });
        let provider = services.build();
        assert!(circular(provider.create_scope().resolve::<dyn Clock>().err().unwrap()));
    }

    #[test]
    fn shared_dependency_is_not_a_cycle() {
        let mut services = ServiceCollection::new();
        services.add_transient::<dyn Clock, _>(|_| Ok(Arc::new(FixedClock(5)) as Arc<dyn Clock>));
        services.add_transient::<dyn Greeter, _>(|resolver| {
            let clock = resolver.resolve::<dyn Clock>()?;
            resolver.resolve::<dyn Clock>()?;
            Ok(Arc::new(ClockGreeter { clock }) as Arc<dyn Greeter>)
        });
        let provider = services.build();
        assert_eq!(provider.resolve::<dyn Greeter>().unwrap().greet(), "hello at 5");
    }

    #[test]
    fn unregistered_contract_is_an_error() {
        let provider = ServiceCollection::new().build();
        let err = provider.resolve::<dyn Clock>().err().unwrap();
        assert!(matches!(err, PlexusError::ServiceNotRegistered { .. }));
        assert!(provider.try_resolve::<dyn Clock>().is_none());
        assert!(provider.resolve_all::<dyn Clock>().unwrap().is_empty());
    }

    #[test]
    fn singleton_is_shared_across_scopes() {
        let mut services = ServiceCollection::new();
        services.add_singleton::<dyn Clock, _>(|_| Ok(Arc::new(FixedClock(1)) as Arc<dyn Clock>));
        let provider = services.build();

        let a = provider.create_scope().resolve::<dyn Clock>().unwrap();
        let b = provider.create_scope().resolve::<dyn Clock>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn scoped_is_cached_per_scope() {
        let mut services = ServiceCollection::new();
        services.add_scoped::<dyn Clock, _>(|_| Ok(Arc::new(FixedClock(7)) as Arc<dyn Clock>));
        let provider = services.build();

        let scope = provider.create_scope();
        let a = scope.resolve::<dyn Clock>().unwrap();
        let b = scope.resolve::<dyn Clock>().unwrap();
        let c = provider.create_scope().resolve::<dyn Clock>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn transient_creates_each_time() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let mut services = ServiceCollection::new();
        services.add_transient::<dyn Clock, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NullClock) as Arc<dyn Clock>)
        });
        let provider = services.build();

        provider.resolve::<dyn Clock>().unwrap();
        provider.resolve::<dyn Clock>().unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn factories_resolve_dependencies() {
        let mut services = ServiceCollection::new();
        services.add_instance::<dyn Clock>(Arc::new(FixedClock(9)));
        services.add_singleton::<dyn Greeter, _>(|resolver| {
            let clock = resolver.resolve::<dyn Clock>()?;
            Ok(Arc::new(ClockGreeter { clock }) as Arc<dyn Greeter>)
        });
        let provider = services.build();

        assert_eq!(provider.resolve::<dyn Greeter>().unwrap().greet(), "hello at 9");
    }

    #[test]
    fn missing_dependency_propagates() {
        let mut services = ServiceCollection::new();
        services.add_singleton::<dyn Greeter, _>(|resolver| {
            let clock = resolver.resolve::<dyn Clock>()?;
            Ok(Arc::new(ClockGreeter { clock }) as Arc<dyn Greeter>)
        });
        let provider = services.build();
        assert!(matches!(
            provider.resolve::<dyn Greeter>(),
            Err(PlexusError::ServiceNotRegistered { .. })
        ));
    }

    #[test]
    fn activator_registrations_resolve() {
        let activator = Activator::new(|| Arc::new(FixedClock(3)) as Arc<dyn Clock>);
        let mut services = ServiceCollection::new();
        services
            .add_activator(ServiceLifetime::Singleton, &activator, "FixedClock")
            .from_plugin("clock-plugin");

        assert!(services.contains::<dyn Clock>());
        let descriptor = &services.descriptors()[0];
        assert_eq!(descriptor.implementation(), "FixedClock");
        assert_eq!(descriptor.plugin_id(), Some("clock-plugin"));

        let provider = services.build();
        assert_eq!(provider.resolve::<dyn Clock>().unwrap().now(), 3);
    }

    proptest::proptest! {
        #[test]
        fn resolve_returns_the_last_of_any_registration_sequence(
            values in proptest::collection::vec(0u64..1000, 1..16)
        ) {
            let mut services = ServiceCollection::new();
            for value in &values {
                let value = *value;
                services.add_singleton::<dyn Clock, _>(move |_| Ok(Arc::new(FixedClock(value)) as Arc<dyn Clock>));
            }
            let provider = services.build();

            let all: Vec<u64> = provider
                .resolve_all::<dyn Clock>()
                .unwrap()
                .iter()
                .map(|c| c.now())
                .collect();
            proptest::prop_assert_eq!(&all, &values);
            proptest::prop_assert_eq!(provider.resolve::<dyn Clock>().unwrap().now(), *values.last().unwrap());
        }
    }
}
