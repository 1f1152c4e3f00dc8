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

use std::fmt;

/// A guard that runs an unsubscribe action when dropped.
///
/// Returned by [`Relay::subscribe`](super::Relay::subscribe). Dropping it
/// removes the listener from its channel, if the channel still exists.
#[must_use = "dropping a Subscription immediately unregisters its listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wraps an arbitrary teardown action.
    pub fn new<F>(unsubscribe: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Runs the teardown action now.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    /// Forgets the guard without running the teardown action.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }

    fn run(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting(counter: &Rc<Cell<u32>>) -> Subscription {
        let counter = Rc::clone(counter);
        Subscription::new(move || counter.set(counter.get() + 1))
    }

    #[test]
    fn test_drop_runs_action_once() {
        let counter = Rc::new(Cell::new(0));
        drop(counting(&counter));
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_explicit_unsubscribe() {
        let counter = Rc::new(Cell::new(0));
        counting(&counter).unsubscribe();
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_detach_skips_action() {
        let counter = Rc::new(Cell::new(0));
        counting(&counter).detach();
        assert_eq!(counter.get(), 0);
    }
}
