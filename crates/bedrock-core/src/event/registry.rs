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

use super::Listener;
use crate::error::RegistryError;
use std::fmt;

/// The number of slots a registry allocates when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 8;

/// An ordered, growable list of listeners invoked in registration order.
///
/// Live listeners always occupy slots `0..len()` contiguously. Removal shifts
/// the following listeners one slot to the left, so the relative order of the
/// remaining listeners never changes. When the backing store is full its
/// capacity doubles; it never shrinks on its own.
///
/// The registry is a plain, exclusively owned data structure: it is mutated
/// through `&mut self` and raised through `&self`, so a listener can never
/// mutate the registry it is being raised from. Use a
/// [`Broadcast`](super::Broadcast) when listeners need to do that.
///
/// # Example
///
/// ```rust
/// use bedrock_core::event::{Listener, ListenerRegistry};
///
/// let mut registry = ListenerRegistry::<u32>::new();
/// let log = Listener::new(|score: &u32| println!("score: {score}"));
///
/// registry.add(log.clone()).unwrap();
/// assert!(registry.contains(&log));
///
/// registry.raise(&42);
/// assert!(registry.remove(&log));
/// assert!(registry.is_empty());
/// ```
pub struct ListenerRegistry<A: ?Sized> {
    slots: Box<[Option<Listener<A>>]>,
    count: usize,
}

impl<A: ?Sized> ListenerRegistry<A> {
    /// Creates an empty registry with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty registry with room for `capacity` listeners.
    ///
    /// A capacity of zero is rounded up to one so the store can always double.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: empty_slots(capacity.max(1)),
            count: 0,
        }
    }

    /// Appends `listener` after every registered listener.
    ///
    /// Duplicates are allowed and are invoked once per registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] if the listener is bound to a
    /// target that has already been dropped.
    pub fn add(&mut self, listener: Listener<A>) -> Result<(), RegistryError> {
        if !listener.is_valid() {
            log::warn!("Rejected a listener whose target was already dropped.");
            return Err(RegistryError::InvalidListener);
        }

        if self.count == self.slots.len() {
            self.grow();
        }

        self.slots[self.count] = Some(listener);
        self.count += 1;
        Ok(())
    }

    /// Appends `listener` unless an equal listener is already registered.
    ///
    /// Returns `Ok(true)` if the listener was added and `Ok(false)` if it was
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidListener`] under the same condition as
    /// [`add`](Self::add).
    pub fn add_unique(&mut self, listener: Listener<A>) -> Result<bool, RegistryError> {
        if listener.is_valid() && self.contains(&listener) {
            return Ok(false);
        }
        self.add(listener)?;
        Ok(true)
    }

    /// Removes the first listener equal to `listener`.
    ///
    /// Returns `false` and leaves the registry untouched if it is not present.
    pub fn remove(&mut self, listener: &Listener<A>) -> bool {
        self.take(listener).is_some()
    }

    /// Removes the first listener equal to `listener` and hands back the
    /// registry's handle to it.
    /// ## Returns
    /// The removed handle, or `None` if no equal listener is registered.
    pub fn take(&mut self, listener: &Listener<A>) -> Option<Listener<A>> {
        let index = self.position(listener)?;
        Some(self.take_at(index))
    }

    /// Returns `true` if a listener equal to `listener` is registered.
    pub fn contains(&self, listener: &Listener<A>) -> bool {
        self.position(listener).is_some()
    }

    /// Removes every listener and drops the handles held by the store.
    pub fn clear(&mut self) {
        drop(self.drain());
    }

    /// Removes every listener and returns the handles in raise order.
    ///
    /// Dropping a handle may run arbitrary code (a captured
    /// [`Subscription`](super::Subscription), for instance), so owners that
    /// guard the registry with a `RefCell` drop the result after releasing it.
    pub fn drain(&mut self) -> Vec<Listener<A>> {
        let drained = self.slots[..self.count]
            .iter_mut()
            .filter_map(Option::take)
            .collect();
        self.count = 0;
        drained
    }

    /// Removes every listener bound to a dropped target.
    ///
    /// The remaining listeners keep their relative order. Returns the number of
    /// listeners removed.
    pub fn clear_invalid(&mut self) -> usize {
        self.drain_invalid().len()
    }

    /// Removes every listener bound to a dropped target and returns them.
    pub fn drain_invalid(&mut self) -> Vec<Listener<A>> {
        let mut removed = Vec::new();
        let mut kept = 0;
        for index in 0..self.count {
            match self.slots[index].take() {
                Some(listener) if listener.is_valid() => {
                    self.slots[kept] = Some(listener);
                    kept += 1;
                }
                Some(listener) => removed.push(listener),
                None => {}
            }
        }

        self.count = kept;
        if !removed.is_empty() {
            log::debug!(
                "Removed {} listener(s) bound to dropped targets.",
                removed.len()
            );
        }
        removed
    }

    /// Invokes every registered listener in registration order.
    pub fn raise(&self, args: &A) {
        for listener in self.iter() {
            listener.invoke(args);
        }
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the listener at `index` in raise order.
    pub fn get(&self, index: usize) -> Option<&Listener<A>> {
        self.live().get(index).and_then(Option::as_ref)
    }

    /// Returns an iterator over the registered listeners in raise order.
    pub fn iter(&self) -> impl Iterator<Item = &Listener<A>> + '_ {
        self.live().iter().flatten()
    }

    /// Clones the registered listener handles in raise order.
    pub fn snapshot(&self) -> Vec<Listener<A>> {
        self.iter().cloned().collect()
    }

    fn live(&self) -> &[Option<Listener<A>>] {
        &self.slots[..self.count]
    }

    fn position(&self, listener: &Listener<A>) -> Option<usize> {
        self.live()
            .iter()
            .position(|slot| slot.as_ref() == Some(listener))
    }

    fn take_at(&mut self, index: usize) -> Listener<A> {
        // Shift everything after `index` one slot left; the removed handle
        // ends up in the last live slot.
        self.slots[index..self.count].rotate_left(1);
        self.count -= 1;
        match self.slots[self.count].take() {
            Some(listener) => listener,
            None => unreachable!("live slots are always occupied"),
        }
    }

    fn grow(&mut self) {
        let capacity = self.slots.len() * 2;
        let mut grown = Vec::with_capacity(capacity);
        grown.extend(self.slots.iter_mut().map(Option::take));
        grown.resize_with(capacity, || None);
        self.slots = grown.into_boxed_slice();
        log::trace!("Listener registry grew to {capacity} slots.");
    }
}

fn empty_slots<A: ?Sized>(capacity: usize) -> Box<[Option<Listener<A>>]> {
    (0..capacity).map(|_| None).collect()
}

impl<A: ?Sized> Default for ListenerRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for ListenerRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.count)
            .field("capacity", &self.slots.len())
            .finish()
    }
}

impl<'a, A: ?Sized> IntoIterator for &'a ListenerRegistry<A> {
    type Item = &'a Listener<A>;
    type IntoIter = std::iter::Flatten<std::slice::Iter<'a, Option<Listener<A>>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.live().iter().flatten()
    }
}
