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

//! Locks held by any number of holders, with notifications on the
//! empty/non-empty transitions.
//!
//! A typical use is input or cursor gating: every menu that is open adds itself
//! as a holder, and gameplay input is re-enabled when the last one closes.

use crate::error::RegistryError;
use crate::event::{Broadcast, Listener};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// A lock that stays engaged while at least one holder is registered.
///
/// Each holder can be registered once. The *first added* event fires when the
/// lock goes from free to held, the *last removed* event when it goes from held
/// to free.
pub struct Lock<K: Eq + Hash> {
    holders: HashSet<K>,
    first_added: Broadcast<()>,
    last_removed: Broadcast<()>,
}

impl<K: Eq + Hash> Lock<K> {
    /// Creates a free lock.
    pub fn new() -> Self {
        Self {
            holders: HashSet::with_capacity(4),
            first_added: Broadcast::new(),
            last_removed: Broadcast::new(),
        }
    }

    /// Registers `holder`. Returns `false` if it already holds the lock.
    pub fn add(&mut self, holder: K) -> bool {
        let added = self.holders.insert(holder);
        if added && self.holders.len() == 1 {
            log::debug!("Lock engaged.");
            self.first_added.raise(&());
        }
        added
    }

    /// Unregisters `holder`. Returns `false` if it did not hold the lock.
    pub fn remove(&mut self, holder: &K) -> bool {
        let removed = self.holders.remove(holder);
        if removed && self.holders.is_empty() {
            log::debug!("Lock released.");
            self.last_removed.raise(&());
        }
        removed
    }

    /// Removes every holder and returns how many there were.
    ///
    /// The *last removed* event fires if any holder was removed, unless
    /// `discrete` is `true`.
    pub fn release_all(&mut self, discrete: bool) -> usize {
        let count = self.holders.len();
        self.holders.clear();
        if count > 0 && !discrete {
            self.last_removed.raise(&());
        }
        count
    }

    /// Returns `true` if any holder is registered.
    pub fn has_any(&self) -> bool {
        !self.holders.is_empty()
    }

    /// Returns `true` if no holder is registered.
    pub fn has_none(&self) -> bool {
        self.holders.is_empty()
    }

    /// Returns `true` if `holder` is registered.
    pub fn is_held_by(&self, holder: &K) -> bool {
        self.holders.contains(holder)
    }

    /// Returns the number of holders.
    pub fn len(&self) -> usize {
        self.holders.len()
    }

    /// Returns `true` if no holder is registered.
    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    /// Returns an iterator over the current holders, in no particular order.
    pub fn holders(&self) -> impl Iterator<Item = &K> + '_ {
        self.holders.iter()
    }

    /// Registers a listener for the free-to-held transition.
    ///
    /// The listener is invoked right away if the lock is already held.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] if the listener is bound to a
    /// dropped target.
    pub fn on_first_added(&self, listener: Listener<()>) -> Result<(), RegistryError> {
        self.first_added.add(listener.clone())?;
        if self.has_any() {
            listener.invoke(&());
        }
        Ok(())
    }

    /// Registers a listener for the held-to-free transition.
    ///
    /// The listener is invoked right away if the lock is currently free.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] if the listener is bound to a
    /// dropped target.
    pub fn on_last_removed(&self, listener: Listener<()>) -> Result<(), RegistryError> {
        self.last_removed.add(listener.clone())?;
        if self.has_none() {
            listener.invoke(&());
        }
        Ok(())
    }

    /// Unregisters a free-to-held listener.
    pub fn remove_first_added(&self, listener: &Listener<()>) -> bool {
        self.first_added.remove(listener)
    }

    /// Unregisters a held-to-free listener.
    pub fn remove_last_removed(&self, listener: &Listener<()>) -> bool {
        self.last_removed.remove(listener)
    }

    /// Removes every holder and every listener without raising anything.
    pub fn dispose(&mut self) {
        self.first_added.clear();
        self.last_removed.clear();
        self.holders.clear();
    }
}

impl<K: Eq + Hash> Default for Lock<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + fmt::Debug> fmt::Debug for Lock<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.holders.iter()).finish()
    }
}
