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

//! Observable values that notify listeners when they change.

use crate::error::RegistryError;
use crate::event::{Broadcast, Listener, Relay};
use std::cell::RefCell;
use std::fmt;

/// A value paired with a change event.
///
/// Listeners registered through [`subscribe_changed`](Observable::subscribe_changed)
/// are invoked right away with the current value, then again after every
/// [`set`](Observable::set).
///
/// The value is cloned out before listeners run, so listeners may read or
/// write the observable while it is being raised.
pub struct Observable<T: Clone> {
    value: RefCell<T>,
    changed: Broadcast<T>,
}

impl<T: Clone> Observable<T> {
    /// Creates an observable holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            changed: Broadcast::new(),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Runs `f` with a reference to the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.borrow())
    }

    /// Stores `value` and notifies every listener.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value.clone();
        self.changed.raise(&value);
    }

    /// Stores `value`, notifies every listener and returns the previous value.
    pub fn replace(&self, value: T) -> T {
        let previous = self.value.replace(value.clone());
        self.changed.raise(&value);
        previous
    }

    /// Registers `listener` and immediately invokes it with the current value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] if the listener is bound to a
    /// dropped target; it is not invoked in that case.
    pub fn subscribe_changed(&self, listener: Listener<T>) -> Result<(), RegistryError> {
        self.changed.add(listener.clone())?;
        listener.invoke(&self.get());
        Ok(())
    }

    /// Unregisters `listener`.
    pub fn unsubscribe_changed(&self, listener: &Listener<T>) -> bool {
        self.changed.remove(listener)
    }

    /// Returns the receiver-only change channel.
    ///
    /// Listeners added directly to the relay are not invoked with the current
    /// value.
    pub fn changed(&self) -> Relay<T> {
        self.changed.relay()
    }

    /// Removes every change listener.
    pub fn clear_listeners(&self) {
        self.changed.clear();
    }
}

impl<T: Clone + PartialEq> Observable<T> {
    /// Stores `value` and notifies listeners only if it differs from the
    /// current value. Returns `true` if the value changed.
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: Clone> Observable<Option<T>> {
    /// Returns `true` if the observable currently holds a value.
    pub fn has_value(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Returns `true` if the observable is currently empty.
    pub fn is_none(&self) -> bool {
        self.value.borrow().is_none()
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.value.borrow())
            .field("listeners", &self.changed.len())
            .finish()
    }
}
