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

//! The composition root handed to game components.

use crate::config::MediatorSettings;
use crate::error::RegistryError;
use crate::event::{Broadcast, Listener};
use crate::pool::{Pool, PoolBuilder};
use crate::schedule::FrameScheduler;
use crate::service::ServiceContainer;
use std::cell::Cell;
use std::fmt;
use std::time::Duration;

/// Owns the runtime services of a game session.
///
/// The context is created once by the host, passed by reference to whatever
/// needs it, and driven by calling [`tick`](MediatorContext::tick) once per
/// frame. [`shutdown`](MediatorContext::shutdown) notifies the shutdown
/// listeners and tears everything down; dropping a running context does the
/// same.
///
/// # Example
///
/// ```rust
/// use bedrock_core::MediatorContext;
/// use std::time::Duration;
///
/// struct Score(u32);
///
/// let mut context = MediatorContext::builder()
///     .services(|services| {
///         services.add_singleton(Score(0)).unwrap();
///     })
///     .build();
///
/// assert_eq!(context.services().resolve::<Score>().unwrap().0, 0);
/// context.tick(Duration::from_millis(16));
/// assert_eq!(context.scheduler().frame(), 1);
///
/// context.shutdown();
/// assert!(!context.is_running());
/// ```
pub struct MediatorContext {
    settings: MediatorSettings,
    services: ServiceContainer,
    scheduler: FrameScheduler,
    shutdown: Broadcast<()>,
    running: Cell<bool>,
}

impl MediatorContext {
    /// Starts building a context with default settings.
    pub fn builder() -> MediatorContextBuilder {
        MediatorContextBuilder::default()
    }

    /// Creates a running context configured by `settings`.
    pub fn with_settings(settings: MediatorSettings) -> Self {
        Self::builder().settings(settings).build()
    }

    /// Returns the settings the context was created with.
    pub fn settings(&self) -> &MediatorSettings {
        &self.settings
    }

    /// Returns the service container.
    pub fn services(&self) -> &ServiceContainer {
        &self.services
    }

    /// Returns the service container for registration.
    pub fn services_mut(&mut self) -> &mut ServiceContainer {
        &mut self.services
    }

    /// Returns the frame scheduler.
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Creates a broadcast configured by the context settings.
    pub fn broadcast<A: ?Sized>(&self) -> Broadcast<A> {
        Broadcast::with_settings(&self.settings)
    }

    /// Starts building a pool sized by the context settings.
    pub fn pool<T, F>(&self, factory: F) -> PoolBuilder<T>
    where
        F: FnMut() -> T + 'static,
    {
        Pool::builder(factory).settings(&self.settings)
    }

    /// Advances the scheduler by one frame. Ignored once the context has shut
    /// down.
    pub fn tick(&self, delta: Duration) {
        if !self.running.get() {
            log::warn!("Tick ignored: the context has shut down.");
            return;
        }
        self.scheduler.tick(delta);
    }

    /// Registers a listener invoked when the context shuts down.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] if the listener is bound to a
    /// dropped target.
    pub fn on_shutdown(&self, listener: Listener<()>) -> Result<(), RegistryError> {
        self.shutdown.add(listener)
    }

    /// Returns `true` until [`shutdown`](MediatorContext::shutdown) is called.
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Notifies the shutdown listeners, then removes every scheduler listener,
    /// timer and service.
    ///
    /// Only the first call has any effect.
    pub fn shutdown(&mut self) {
        if !self.running.replace(false) {
            return;
        }
        log::info!(
            "Shutting down after {} frame(s) ({:?}).",
            self.scheduler.frame(),
            self.scheduler.elapsed()
        );
        self.shutdown.raise(&());
        self.shutdown.clear();
        self.scheduler.clear();
        self.services.clear();
    }
}

impl Default for MediatorContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Drop for MediatorContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for MediatorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediatorContext")
            .field("running", &self.running.get())
            .field("settings", &self.settings)
            .field("services", &self.services)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

/// Configures a [`MediatorContext`] before it starts.
#[derive(Default)]
#[must_use = "call `build` to create the context"]
pub struct MediatorContextBuilder {
    settings: MediatorSettings,
    services: ServiceContainer,
}

impl MediatorContextBuilder {
    /// Replaces the settings.
    pub fn settings(mut self, settings: MediatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registers services before the context starts.
    pub fn services(mut self, register: impl FnOnce(&mut ServiceContainer)) -> Self {
        register(&mut self.services);
        self
    }

    /// Creates the running context.
    pub fn build(self) -> MediatorContext {
        log::info!(
            "Mediator context started with {} service(s).",
            self.services.len()
        );
        MediatorContext {
            scheduler: FrameScheduler::with_settings(&self.settings),
            shutdown: Broadcast::with_settings(&self.settings),
            settings: self.settings,
            services: self.services,
            running: Cell::new(true),
        }
    }
}
