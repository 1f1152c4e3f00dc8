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

//! Finite state machines with enter/exit hooks and a change event.
//!
//! A [`StateMachine`] holds the active state and the one before it. Moving to
//! a new state runs the exit hook of the old state, then the enter hook of the
//! new one, then raises the machine's `state_changed` channel with
//! `(previous, next)`.

use crate::error::StateError;
use crate::event::{Broadcast, Relay};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// A state a [`StateMachine`] can be in.
///
/// States are compared with `PartialEq` to detect no-op transitions and are
/// cloned into the change event, so they are usually small enums or cheap
/// handles.
pub trait State: Clone + PartialEq + 'static {
    /// A stable name for the kind of state. A machine registers at most one
    /// state per name.
    fn name(&self) -> &'static str;

    /// Called after the state becomes active.
    fn on_enter(&self, _previous: Option<&Self>) {}

    /// Called before the state stops being active.
    fn on_exit(&self, _next: Option<&Self>) {}
}

/// Tracks the active state of some system.
///
/// # Example
///
/// ```rust
/// use bedrock_core::state::{State, StateMachine};
///
/// #[derive(Clone, PartialEq)]
/// enum Phase { Menu, Playing }
///
/// impl State for Phase {
///     fn name(&self) -> &'static str {
///         match self {
///             Phase::Menu => "menu",
///             Phase::Playing => "playing",
///         }
///     }
/// }
///
/// let machine = StateMachine::new();
/// machine.state_changed().listen(|(from, to): &(Option<Phase>, Option<Phase>)| {
///     println!("{:?} -> {:?}", from.as_ref().map(State::name), to.as_ref().map(State::name));
/// });
///
/// assert!(machine.set_active(Phase::Menu));
/// assert!(machine.set_active(Phase::Playing));
/// assert!(!machine.set_active(Phase::Playing));
/// assert!(machine.previous_state() == Some(Phase::Menu));
/// ```
pub struct StateMachine<S: State> {
    registered: HashMap<&'static str, S>,
    state: RefCell<Option<S>>,
    previous: RefCell<Option<S>>,
    state_changed: Broadcast<(Option<S>, Option<S>)>,
}

impl<S: State> StateMachine<S> {
    /// Creates a machine with no active state.
    pub fn new() -> Self {
        Self {
            registered: HashMap::new(),
            state: RefCell::new(None),
            previous: RefCell::new(None),
            state_changed: Broadcast::new(),
        }
    }

    /// Registers `state` so it can later be activated by name.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::AlreadyRegistered`] if a state with the same
    /// name is registered; the first registration is kept.
    pub fn add_unique_state(&mut self, state: S) -> Result<(), StateError> {
        let kind = state.name();
        if self.registered.contains_key(kind) {
            log::error!("A state of kind '{kind}' is already registered.");
            return Err(StateError::AlreadyRegistered { kind });
        }
        self.registered.insert(kind, state);
        Ok(())
    }

    /// Returns the registered state called `name`.
    pub fn registered_state(&self, name: &str) -> Option<&S> {
        self.registered.get(name)
    }

    /// Makes `next` the active state.
    /// ## Arguments
    /// * `next` - The state to enter. It does not need to be registered.
    /// ## Returns
    /// `false` if `next` is already active, in which case no hook runs and
    /// nothing is raised.
    pub fn set_active(&self, next: S) -> bool {
        self.transition(Some(next))
    }

    /// Activates the registered state called `name`.
    /// ## Returns
    /// `false` if no such state is registered or it is already active.
    pub fn set_active_registered(&self, name: &str) -> bool {
        match self.registered.get(name) {
            Some(state) => self.transition(Some(state.clone())),
            None => {
                log::warn!("No state named '{name}' is registered.");
                false
            }
        }
    }

    /// Leaves the active state without entering another one.
    pub fn clear_state(&self) -> bool {
        self.transition(None)
    }

    fn transition(&self, next: Option<S>) -> bool {
        let current = self.state.borrow().clone();
        if current == next {
            return false;
        }
        log::debug!(
            "Transition from state: {} to {}.",
            name_of(current.as_ref()),
            name_of(next.as_ref())
        );

        // No borrow is held while hooks and listeners run.
        self.previous.replace(current.clone());
        if let Some(exiting) = &current {
            exiting.on_exit(next.as_ref());
        }
        self.state.replace(next.clone());
        if let Some(entering) = &next {
            entering.on_enter(current.as_ref());
        }
        self.state_changed.raise(&(current, next));
        true
    }

    /// Returns the active state.
    pub fn state(&self) -> Option<S> {
        self.state.borrow().clone()
    }

    /// Returns the state that was active before the last transition.
    pub fn previous_state(&self) -> Option<S> {
        self.previous.borrow().clone()
    }

    /// Returns `true` if the active state is called `name`.
    pub fn is_in(&self, name: &str) -> bool {
        self.state
            .borrow()
            .as_ref()
            .is_some_and(|state| state.name() == name)
    }

    /// Returns the channel raised with `(previous, next)` after each
    /// transition.
    pub fn state_changed(&self) -> Relay<(Option<S>, Option<S>)> {
        self.state_changed.relay()
    }
}

fn name_of<S: State>(state: Option<&S>) -> &'static str {
    state.map_or("<none>", State::name)
}

impl<S: State> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("state", &name_of(self.state.borrow().as_ref()))
            .field("previous", &name_of(self.previous.borrow().as_ref()))
            .field("registered", &self.registered.len())
            .finish()
    }
}
