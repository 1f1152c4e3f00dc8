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

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

/// A shareable callback handle for events carrying arguments of type `A`.
///
/// Equality is identity: a listener is equal to its clones and to nothing
/// else, even another listener built from an identical closure. Keep a clone of
/// the handle around if you intend to remove it later.
///
/// A listener can be *bound* to a target through a weak reference. Once the
/// target is dropped the listener becomes invalid: invoking it does nothing,
/// registries refuse to add it, and
/// [`ListenerRegistry::clear_invalid`](super::ListenerRegistry::clear_invalid)
/// removes it.
///
/// # Example
///
/// ```rust
/// use bedrock_core::event::Listener;
///
/// let on_damage = Listener::new(|(amount, source): &(u32, String)| {
///     println!("took {amount} damage from {source}");
/// });
/// on_damage.invoke(&(12, "trap".to_string()));
/// assert_eq!(on_damage, on_damage.clone());
/// ```
pub struct Listener<A: ?Sized> {
    callback: Rc<dyn Fn(&A)>,
    target: Option<Weak<dyn Any>>,
}

impl<A: ?Sized> Listener<A> {
    /// Creates an unbound listener. It stays valid for as long as it exists.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&A) + 'static,
    {
        Self {
            callback: Rc::new(callback),
            target: None,
        }
    }

    /// Creates a listener bound to `target`.
    ///
    /// Only a weak reference to the target is retained, so registering the
    /// listener never keeps the target alive.
    pub fn bound<T, F>(target: &Rc<T>, callback: F) -> Self
    where
        A: 'static,
        T: 'static,
        F: Fn(&T, &A) + 'static,
    {
        let weak = Rc::downgrade(target);
        let guard: Weak<dyn Any> = weak.clone();
        Self {
            callback: Rc::new(move |args: &A| {
                if let Some(target) = weak.upgrade() {
                    callback(target.as_ref(), args);
                }
            }),
            target: Some(guard),
        }
    }

    /// Returns `true` unless the listener is bound to a dropped target.
    pub fn is_valid(&self) -> bool {
        self.target
            .as_ref()
            .map_or(true, |target| target.strong_count() > 0)
    }

    /// Returns `true` if the listener was created with [`Listener::bound`].
    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    /// Invokes the callback with `args`.
    #[inline]
    pub fn invoke(&self, args: &A) {
        (self.callback)(args);
    }
}

impl<A: ?Sized> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
            target: self.target.clone(),
        }
    }
}

impl<A: ?Sized> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<A: ?Sized> Eq for Listener<A> {}

impl<A: ?Sized> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("callback", &Rc::as_ptr(&self.callback).cast::<()>())
            .field("bound", &self.is_bound())
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_clone_is_equal() {
        let listener = Listener::<()>::new(|_| {});
        assert_eq!(listener, listener.clone());
    }

    #[test]
    fn test_identical_closures_are_not_equal() {
        let a = Listener::<()>::new(|_| {});
        let b = Listener::<()>::new(|_| {});
        assert_ne!(a, b);
    }

    #[test]
    fn test_invoke_passes_arguments() {
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        let listener = Listener::new(move |(a, b): &(i32, i32)| sink.set(a + b));
        listener.invoke(&(2, 3));
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn test_bound_listener_tracks_target() {
        let target = Rc::new(Cell::new(0));
        let listener = Listener::bound(&target, |t: &Cell<i32>, v: &i32| t.set(*v));
        assert!(listener.is_bound());
        assert!(listener.is_valid());

        listener.invoke(&7);
        assert_eq!(target.get(), 7);

        drop(target);
        assert!(!listener.is_valid());
        // Invoking an invalid listener is a no-op.
        listener.invoke(&9);
    }

    #[test]
    fn test_bound_listener_does_not_keep_target_alive() {
        let target = Rc::new(());
        let _listener = Listener::bound(&target, |_: &(), _: &()| {});
        assert_eq!(Rc::strong_count(&target), 1);
    }
}
