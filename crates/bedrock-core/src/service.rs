// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A typed service container for game subsystems.
//!
//! The [`ServiceContainer`] is a type-map where components store and retrieve
//! shared services (audio mixer, save system, input router, ...) by their
//! concrete type. It is owned by a [`MediatorContext`](crate::MediatorContext)
//! and passed explicitly to whatever needs it; there is no global instance.
//!
//! # Lifetimes
//!
//! - **Singleton**: an instance registered up front and shared.
//! - **Lazy**: a factory run on first resolve; the result is cached and shared.
//! - **Transient**: a factory run on every resolve.
//!
//! Factories receive the container so they can resolve their own dependencies.

use crate::error::ServiceError;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

type Shared = Rc<dyn Any>;
type LazyFactory = Box<dyn FnOnce(&ServiceContainer) -> Shared>;
type TransientFactory = Rc<dyn Fn(&ServiceContainer) -> Shared>;

enum Entry {
    Singleton(Shared),
    Lazy(LazyFactory),
    Transient(TransientFactory),
    /// A lazy factory for this type is currently running.
    Constructing,
}

struct Slot {
    type_name: &'static str,
    entry: Entry,
}

/// A service container keyed by [`TypeId`].
///
/// # Example
///
/// ```rust
/// use bedrock_core::service::ServiceContainer;
///
/// struct Mixer { volume: f32 }
/// struct Jukebox { mixer: std::rc::Rc<Mixer> }
///
/// let mut services = ServiceContainer::new();
/// services.add_singleton(Mixer { volume: 0.8 }).unwrap();
/// services
///     .add_lazy(|s| Jukebox { mixer: s.resolve::<Mixer>().unwrap() })
///     .unwrap();
///
/// let jukebox = services.resolve::<Jukebox>().unwrap();
/// assert_eq!(jukebox.mixer.volume, 0.8);
/// ```
#[derive(Default)]
pub struct ServiceContainer {
    services: RefCell<HashMap<TypeId, Slot>>,
}

impl ServiceContainer {
    /// Creates an empty service container.
    pub fn new() -> Self {
        Self {
            services: RefCell::new(HashMap::new()),
        }
    }

    /// Registers a shared instance of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AlreadyRegistered`] if `T` is already registered;
    /// the existing registration is kept.
    pub fn add_singleton<T: 'static>(&mut self, service: T) -> Result<&mut Self, ServiceError> {
        self.register::<T>(Entry::Singleton(Rc::new(service)))
    }

    /// Registers a factory that builds `T` on first resolve.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AlreadyRegistered`] if `T` is already registered.
    pub fn add_lazy<T, F>(&mut self, factory: F) -> Result<&mut Self, ServiceError>
    where
        T: 'static,
        F: FnOnce(&ServiceContainer) -> T + 'static,
    {
        self.register::<T>(Entry::Lazy(Box::new(move |services| {
            Rc::new(factory(services)) as Shared
        })))
    }

    /// Registers a factory that builds a new `T` on every resolve.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AlreadyRegistered`] if `T` is already registered.
    pub fn add_transient<T, F>(&mut self, factory: F) -> Result<&mut Self, ServiceError>
    where
        T: 'static,
        F: Fn(&ServiceContainer) -> T + 'static,
    {
        self.register::<T>(Entry::Transient(Rc::new(move |services| {
            Rc::new(factory(services)) as Shared
        })))
    }

    fn register<T: 'static>(&mut self, entry: Entry) -> Result<&mut Self, ServiceError> {
        let type_name = type_name::<T>();
        let services = self.services.get_mut();
        if services.contains_key(&TypeId::of::<T>()) {
            log::warn!("Service of type '{type_name}' is already registered.");
            return Err(ServiceError::AlreadyRegistered { type_name });
        }
        services.insert(TypeId::of::<T>(), Slot { type_name, entry });
        log::debug!("Registered service '{type_name}'.");
        Ok(self)
    }

    /// Resolves the service of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotRegistered`] if nothing is registered for
    /// `T`, or [`ServiceError::CircularDependency`] if a lazy factory for `T`
    /// ends up resolving `T` itself.
    pub fn resolve<T: 'static>(&self) -> Result<Rc<T>, ServiceError> {
        let type_name = type_name::<T>();
        let id = TypeId::of::<T>();

        // Take what we need out of the map so factories can resolve freely.
        let pending = {
            let mut services = self.services.borrow_mut();
            let slot = services
                .get_mut(&id)
                .ok_or(ServiceError::NotRegistered { type_name })?;
            match std::mem::replace(&mut slot.entry, Entry::Constructing) {
                Entry::Singleton(service) => {
                    slot.entry = Entry::Singleton(Rc::clone(&service));
                    return Ok(downcast(service));
                }
                Entry::Transient(factory) => {
                    slot.entry = Entry::Transient(Rc::clone(&factory));
                    Pending::Transient(factory)
                }
                Entry::Lazy(factory) => Pending::Lazy(factory),
                Entry::Constructing => {
                    return Err(ServiceError::CircularDependency { type_name });
                }
            }
        };

        match pending {
            Pending::Transient(factory) => Ok(downcast(factory(self))),
            Pending::Lazy(factory) => {
                log::debug!("Constructing lazy service '{type_name}'.");
                let service = factory(self);
                if let Some(slot) = self.services.borrow_mut().get_mut(&id) {
                    slot.entry = Entry::Singleton(Rc::clone(&service));
                }
                Ok(downcast(service))
            }
        }
    }

    /// Resolves the service of type `T`, or returns `None`.
    pub fn try_resolve<T: 'static>(&self) -> Option<Rc<T>> {
        self.resolve::<T>().ok()
    }

    /// Returns `true` if a service of type `T` is registered.
    pub fn contains<T: 'static>(&self) -> bool {
        self.services.borrow().contains_key(&TypeId::of::<T>())
    }

    /// Unregisters the service of type `T`. Returns `false` if it was absent.
    ///
    /// Instances already handed out stay alive until their last `Rc` drops.
    pub fn remove<T: 'static>(&mut self) -> bool {
        self.services.get_mut().remove(&TypeId::of::<T>()).is_some()
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.services.borrow().len()
    }

    /// Returns `true` if no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.borrow().is_empty()
    }

    /// Returns the type names of every registered service, sorted.
    pub fn registered_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .services
            .borrow()
            .values()
            .map(|slot| slot.type_name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Unregisters every service.
    pub fn clear(&mut self) {
        let services = self.services.get_mut();
        if !services.is_empty() {
            log::debug!("Clearing {} service(s).", services.len());
        }
        services.clear();
    }
}

enum Pending {
    Lazy(LazyFactory),
    Transient(TransientFactory),
}

fn downcast<T: 'static>(service: Shared) -> Rc<T> {
    match service.downcast::<T>() {
        Ok(service) => service,
        // Entries are keyed by `TypeId::of::<T>()` and only ever built from a `T`.
        Err(_) => unreachable!("service stored under the wrong TypeId"),
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.registered_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeMixer {
        name: String,
    }

    struct FakeSaveSystem {}

    #[test]
    fn test_insert_and_resolve() {
        let mut services = ServiceContainer::new();
        services
            .add_singleton(FakeMixer {
                name: "Master".to_string(),
            })
            .unwrap();

        let mixer = services.resolve::<FakeMixer>().unwrap();
        assert_eq!(mixer.name, "Master");
    }

    #[test]
    fn test_resolve_missing() {
        let services = ServiceContainer::new();
        assert_eq!(
            services.resolve::<FakeMixer>().err(),
            Some(ServiceError::NotRegistered {
                type_name: type_name::<FakeMixer>()
            })
        );
        assert!(services.try_resolve::<FakeMixer>().is_none());
    }

    #[test]
    fn test_multiple_services() {
        let mut services = ServiceContainer::new();
        services
            .add_singleton(FakeMixer {
                name: "Mix".to_string(),
            })
            .unwrap()
            .add_singleton(FakeSaveSystem {})
            .unwrap();

        assert_eq!(services.len(), 2);
        assert!(services.contains::<FakeMixer>());
        assert!(services.contains::<FakeSaveSystem>());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut services = ServiceContainer::new();
        services
            .add_singleton(FakeMixer {
                name: "old".to_string(),
            })
            .unwrap();
        let err = services
            .add_singleton(FakeMixer {
                name: "new".to_string(),
            })
            .err();

        assert!(matches!(err, Some(ServiceError::AlreadyRegistered { .. })));
        assert_eq!(services.resolve::<FakeMixer>().unwrap().name, "old");
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn test_lazy_runs_once_and_is_shared() {
        let built = Rc::new(Cell::new(0));
        let counter = Rc::clone(&built);
        let mut services = ServiceContainer::new();
        services
            .add_lazy(move |_| {
                counter.set(counter.get() + 1);
                FakeSaveSystem {}
            })
            .unwrap();
        assert_eq!(built.get(), 0);

        let a = services.resolve::<FakeSaveSystem>().unwrap();
        let b = services.resolve::<FakeSaveSystem>().unwrap();
        assert_eq!(built.get(), 1);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_transient_builds_every_time() {
        let mut services = ServiceContainer::new();
        services
            .add_transient(|_| FakeMixer {
                name: "voice".to_string(),
            })
            .unwrap();

        let a = services.resolve::<FakeMixer>().unwrap();
        let b = services.resolve::<FakeMixer>().unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_lazy_resolves_dependencies() {
        struct Music {
            mixer: Rc<FakeMixer>,
        }

        let mut services = ServiceContainer::new();
        services
            .add_lazy(|s| Music {
                mixer: s.resolve::<FakeMixer>().unwrap(),
            })
            .unwrap()
            .add_lazy(|_| FakeMixer {
                name: "music".to_string(),
            })
            .unwrap();

        let music = services.resolve::<Music>().unwrap();
        assert_eq!(music.mixer.name, "music");
    }

    #[test]
    fn test_circular_lazy_dependency() {
        struct Loop;

        let mut services = ServiceContainer::new();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        services
            .add_lazy(move |s| {
                *sink.borrow_mut() = s.resolve::<Loop>().err();
                Loop
            })
            .unwrap();

        assert!(services.resolve::<Loop>().is_ok());
        assert!(matches!(
            *seen.borrow(),
            Some(ServiceError::CircularDependency { .. })
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut services = ServiceContainer::new();
        services.add_singleton(FakeSaveSystem {}).unwrap();
        assert!(services.remove::<FakeSaveSystem>());
        assert!(!services.remove::<FakeSaveSystem>());

        services.add_singleton(FakeSaveSystem {}).unwrap();
        services.clear();
        assert!(services.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        let services = ServiceContainer::default();
        assert!(services.is_empty());
        assert!(services.registered_names().is_empty());
    }
}
