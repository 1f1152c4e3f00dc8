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

//! Reusable object pools.
//!
//! A [`Pool`] hands out instances built by a factory and takes them back for
//! reuse. Ownership moves out on [`get`](Pool::get) and back in on
//! [`release`](Pool::release), so an instance can never be released twice.

use crate::config::MediatorSettings;
use std::fmt;

/// The loading state of a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PoolState {
    /// No instance has been created yet, or the pool was unloaded.
    #[default]
    Unloaded,
    /// The pool has been warmed up and is handing out instances.
    Loaded,
}

/// Callbacks for types that want to know when they move in and out of a pool.
pub trait Poolable {
    /// Called when the instance is taken from the pool.
    fn on_get_from_pool(&mut self) {}

    /// Called when the instance is returned to the pool.
    fn on_release_to_pool(&mut self) {}
}

type Factory<T> = Box<dyn FnMut() -> T>;
type Hook<T> = Box<dyn FnMut(&mut T)>;
type DestroyHook<T> = Box<dyn FnMut(T)>;

/// A pool of reusable `T` instances.
///
/// # Example
///
/// ```rust
/// use bedrock_core::pool::Pool;
///
/// let mut bullets = Pool::builder(|| Vec::<u8>::with_capacity(64))
///     .initial_size(4)
///     .on_release(|buffer| buffer.clear())
///     .build();
///
/// let mut buffer = bullets.get();
/// buffer.push(1);
/// bullets.release(buffer);
///
/// assert_eq!(bullets.count_all(), 4);
/// assert_eq!(bullets.count_inactive(), 4);
/// ```
pub struct Pool<T> {
    factory: Factory<T>,
    on_get: Option<Hook<T>>,
    on_release: Option<Hook<T>>,
    on_destroy: Option<DestroyHook<T>>,
    initial_size: usize,
    max_size: Option<usize>,
    inactive: Vec<T>,
    count_all: usize,
    state: PoolState,
}

impl<T> Pool<T> {
    /// Starts building a pool around `factory`.
    pub fn builder<F>(factory: F) -> PoolBuilder<T>
    where
        F: FnMut() -> T + 'static,
    {
        PoolBuilder {
            factory: Box::new(factory),
            on_get: None,
            on_release: None,
            on_destroy: None,
            initial_size: MediatorSettings::default().pool_initial_size,
            max_size: None,
        }
    }

    /// Creates an empty pool with default sizing and no hooks.
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> T + 'static,
    {
        Self::builder(factory).build()
    }

    /// Creates `initial_size` instances and stores them. Does nothing if the
    /// pool is already loaded.
    pub fn load(&mut self) {
        if self.state == PoolState::Loaded {
            return;
        }
        let warmup = self
            .max_size
            .map_or(self.initial_size, |max| self.initial_size.min(max));
        self.inactive.reserve(warmup);
        for _ in 0..warmup {
            let mut item = (self.factory)();
            self.count_all += 1;
            if let Some(hook) = &mut self.on_release {
                hook(&mut item);
            }
            self.inactive.push(item);
        }
        self.state = PoolState::Loaded;
        log::debug!("Pool loaded with {warmup} instance(s).");
    }

    /// Takes an instance out of the pool, creating one if none is inactive.
    ///
    /// Loads the pool first if it is unloaded. The most recently released
    /// instance is handed out first.
    pub fn get(&mut self) -> T {
        self.load();
        let mut item = match self.inactive.pop() {
            Some(item) => item,
            None => {
                self.count_all += 1;
                log::trace!("Pool is empty; creating instance #{}.", self.count_all);
                (self.factory)()
            }
        };
        if let Some(hook) = &mut self.on_get {
            hook(&mut item);
        }
        item
    }

    /// Returns an instance to the pool.
    /// ## Arguments
    /// * `item` - An instance previously handed out by [`get`](Pool::get).
    /// ## Behavior
    /// The instance is destroyed instead of stored if the pool already retains
    /// `max_size` inactive instances, or if it is unloaded.
    ///
    /// An instance released while no instance is counted as active was created
    /// before the last [`unload`](Pool::unload); the pool adopts it and counts
    /// it again.
    pub fn release(&mut self, mut item: T) {
        if self.state == PoolState::Unloaded {
            log::warn!("Instance released into an unloaded pool; destroying it.");
            self.destroy(item);
            return;
        }
        if self.count_active() == 0 {
            log::debug!("Adopting an instance created before the pool was unloaded.");
            self.count_all += 1;
        }
        if let Some(hook) = &mut self.on_release {
            hook(&mut item);
        }
        match self.max_size {
            Some(max) if self.inactive.len() >= max => {
                self.count_all -= 1;
                self.destroy(item);
            }
            _ => self.inactive.push(item),
        }
    }

    /// Destroys every inactive instance and returns the pool to
    /// [`PoolState::Unloaded`].
    ///
    /// Instances currently handed out are no longer counted; releasing them
    /// later destroys them.
    pub fn unload(&mut self) {
        let destroyed = self.inactive.len();
        for item in std::mem::take(&mut self.inactive) {
            self.destroy(item);
        }
        self.count_all = 0;
        if self.state == PoolState::Loaded {
            log::debug!("Pool unloaded; destroyed {destroyed} instance(s).");
        }
        self.state = PoolState::Unloaded;
    }

    /// Same as [`unload`](Pool::unload).
    pub fn clear(&mut self) {
        self.unload();
    }

    fn destroy(&mut self, item: T) {
        match &mut self.on_destroy {
            Some(hook) => hook(item),
            None => drop(item),
        }
    }

    /// Returns the current loading state.
    pub fn state(&self) -> PoolState {
        self.state
    }

    /// Returns the number of instances created and not yet destroyed.
    pub fn count_all(&self) -> usize {
        self.count_all
    }

    /// Returns the number of instances waiting in the pool.
    pub fn count_inactive(&self) -> usize {
        self.inactive.len()
    }

    /// Returns the number of instances currently handed out.
    /// ## Returns
    /// `count_all - count_inactive`; instances taken before the last unload are
    /// not included.
    pub fn count_active(&self) -> usize {
        self.count_all.saturating_sub(self.inactive.len())
    }

    /// Returns the maximum number of inactive instances retained, if bounded.
    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }
}

impl<T: Poolable + 'static> Pool<T> {
    /// Starts building a pool whose instances receive their [`Poolable`]
    /// callbacks on get and release.
    pub fn poolable<F>(factory: F) -> PoolBuilder<T>
    where
        F: FnMut() -> T + 'static,
    {
        Pool::builder(factory)
            .on_get(T::on_get_from_pool)
            .on_release(T::on_release_to_pool)
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        self.unload();
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("state", &self.state)
            .field("count_all", &self.count_all)
            .field("count_inactive", &self.inactive.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}

/// Configures a [`Pool`] before it is created.
#[must_use = "call `build` to create the pool"]
pub struct PoolBuilder<T> {
    factory: Factory<T>,
    on_get: Option<Hook<T>>,
    on_release: Option<Hook<T>>,
    on_destroy: Option<DestroyHook<T>>,
    initial_size: usize,
    max_size: Option<usize>,
}

impl<T> PoolBuilder<T> {
    /// Sets how many instances [`Pool::load`] creates.
    pub fn initial_size(mut self, size: usize) -> Self {
        self.initial_size = size;
        self
    }

    /// Bounds the number of inactive instances the pool retains.
    pub fn max_size(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }

    /// Applies the pool sizing from `settings`.
    pub fn settings(mut self, settings: &MediatorSettings) -> Self {
        self.initial_size = settings.pool_initial_size;
        self.max_size = settings.pool_max_size;
        self
    }

    /// Runs `hook` on every instance handed out by [`Pool::get`].
    pub fn on_get(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.on_get = Some(Box::new(hook));
        self
    }

    /// Runs `hook` on every instance stored in the pool.
    pub fn on_release(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    /// Runs `hook` on every instance the pool discards.
    pub fn on_destroy(mut self, hook: impl FnMut(T) + 'static) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    /// Creates the pool. No instance is created until it is loaded.
    pub fn build(self) -> Pool<T> {
        Pool {
            factory: self.factory,
            on_get: self.on_get,
            on_release: self.on_release,
            on_destroy: self.on_destroy,
            initial_size: self.initial_size,
            max_size: self.max_size,
            inactive: Vec::new(),
            count_all: 0,
            state: PoolState::Unloaded,
        }
    }
}
