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

use super::{Listener, ListenerRegistry, Subscription, DEFAULT_CAPACITY};
use crate::config::MediatorSettings;
use crate::error::RegistryError;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

/// The state shared by every handle to one channel.
struct Channel<A: ?Sized> {
    registry: RefCell<ListenerRegistry<A>>,
    raise_level: log::Level,
}

/// A receiver-only handle to a channel.
///
/// Code holding a relay can register and unregister listeners but cannot raise
/// the event. Relays are obtained from the owning [`Broadcast`] with
/// [`Broadcast::relay`]; clones share the same listeners.
///
/// All methods take `&self`, so listeners may hold a relay and modify the
/// channel while it is being raised.
pub struct Relay<A: ?Sized> {
    channel: Rc<Channel<A>>,
}

impl<A: ?Sized> Relay<A> {
    /// Appends `listener` to the channel. Duplicates are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] if the listener is bound to a
    /// dropped target.
    pub fn add(&self, listener: Listener<A>) -> Result<(), RegistryError> {
        self.channel.registry.borrow_mut().add(listener)
    }

    /// Appends `listener` unless it is already registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] if the listener is bound to a
    /// dropped target.
    pub fn add_unique(&self, listener: Listener<A>) -> Result<bool, RegistryError> {
        self.channel.registry.borrow_mut().add_unique(listener)
    }

    /// Wraps `callback` in a new listener, registers it and returns the handle.
    pub fn listen<F>(&self, callback: F) -> Listener<A>
    where
        F: Fn(&A) + 'static,
    {
        let listener = Listener::new(callback);
        // An unbound listener is always valid.
        let _ = self.add(listener.clone());
        listener
    }

    /// Removes the first registration of `listener`.
    pub fn remove(&self, listener: &Listener<A>) -> bool {
        let removed = self.channel.registry.borrow_mut().take(listener);
        removed.is_some()
    }

    /// Returns `true` if `listener` is registered.
    pub fn contains(&self, listener: &Listener<A>) -> bool {
        self.channel.registry.borrow().contains(listener)
    }

    /// Removes every listener.
    pub fn clear(&self) {
        // Handles are dropped once the registry is released: a dropped
        // closure may own a subscription to this same channel.
        let removed = self.channel.registry.borrow_mut().drain();
        drop(removed);
    }

    /// Removes every listener bound to a dropped target and returns how many
    /// were removed.
    pub fn clear_invalid(&self) -> usize {
        let removed = self.channel.registry.borrow_mut().drain_invalid();
        removed.len()
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.channel.registry.borrow().len()
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.channel.registry.borrow().is_empty()
    }

    /// Returns the registered listeners in raise order.
    pub fn listeners(&self) -> Vec<Listener<A>> {
        self.channel.registry.borrow().snapshot()
    }

    /// Returns `true` if both handles refer to the same channel.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.channel, &other.channel)
    }
}

impl<A: ?Sized + 'static> Relay<A> {
    /// Registers `listener` and returns a guard that removes it when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] if the listener is bound to a
    /// dropped target.
    pub fn subscribe(&self, listener: Listener<A>) -> Result<Subscription, RegistryError> {
        self.add(listener.clone())?;
        let channel: Weak<Channel<A>> = Rc::downgrade(&self.channel);
        Ok(Subscription::new(move || {
            if let Some(channel) = channel.upgrade() {
                let removed = channel.registry.borrow_mut().take(&listener);
                drop(removed);
            }
        }))
    }
}

impl<A: ?Sized> Clone for Relay<A> {
    fn clone(&self) -> Self {
        Self {
            channel: Rc::clone(&self.channel),
        }
    }
}

impl<A: ?Sized> fmt::Debug for Relay<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("listeners", &self.len())
            .finish()
    }
}

/// An event channel that can be raised by whoever holds it.
///
/// A broadcast dereferences to its [`Relay`], so every listener operation is
/// available on it directly. Hand out [`Broadcast::relay`] to code that should
/// only listen.
///
/// # Raising
///
/// [`raise`](Broadcast::raise) snapshots the registered listeners before
/// invoking them, in registration order. Listeners may add or remove listeners
/// (including themselves) while the event is being raised:
/// - a listener added during a raise is first invoked by the next raise,
/// - a listener removed during a raise is still invoked by the current raise if
///   it had not run yet,
/// - raising the same broadcast again from inside a listener is allowed.
///
/// # Example
///
/// ```rust
/// use bedrock_core::event::Broadcast;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let on_score = Broadcast::<u32>::new();
/// let total = Rc::new(Cell::new(0));
///
/// let sink = Rc::clone(&total);
/// let relay = on_score.relay();
/// let _sub = relay.subscribe(bedrock_core::Listener::new(move |points: &u32| {
///     sink.set(sink.get() + points);
/// }));
///
/// on_score.raise(&10);
/// on_score.raise(&5);
/// assert_eq!(total.get(), 15);
/// ```
pub struct Broadcast<A: ?Sized> {
    relay: Relay<A>,
}

impl<A: ?Sized> Broadcast<A> {
    /// Creates a broadcast with the default listener capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a broadcast with room for `capacity` listeners before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(capacity, log::Level::Trace)
    }

    /// Creates a broadcast configured by `settings`.
    pub fn with_settings(settings: &MediatorSettings) -> Self {
        Self::build(settings.listener_capacity, settings.raise_level())
    }

    fn build(capacity: usize, raise_level: log::Level) -> Self {
        Self {
            relay: Relay {
                channel: Rc::new(Channel {
                    registry: RefCell::new(ListenerRegistry::with_capacity(capacity)),
                    raise_level,
                }),
            },
        }
    }

    /// Returns a receiver-only handle to this channel.
    pub fn relay(&self) -> Relay<A> {
        self.relay.clone()
    }

    /// Invokes every registered listener with `args`, in registration order.
    pub fn raise(&self, args: &A) {
        let channel = &self.relay.channel;
        let listeners = channel.registry.borrow().snapshot();
        log::log!(
            channel.raise_level,
            "Raising broadcast to {} listener(s).",
            listeners.len()
        );
        for listener in &listeners {
            listener.invoke(args);
        }
    }
}

impl<A: ?Sized> Deref for Broadcast<A> {
    type Target = Relay<A>;

    fn deref(&self) -> &Self::Target {
        &self.relay
    }
}

impl<A: ?Sized> Clone for Broadcast<A> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
        }
    }
}

impl<A: ?Sized> Default for Broadcast<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for Broadcast<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcast")
            .field("listeners", &self.len())
            .finish()
    }
}
