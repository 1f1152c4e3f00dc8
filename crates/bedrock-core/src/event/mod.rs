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

//! Provides the primitives for synchronous, ordered event dispatch.
//!
//! The core component is the [`ListenerRegistry`], an ordered, growable list of
//! [`Listener`] handles that are invoked in registration order. A single generic
//! type covers every arity: events without payload use `()`, events with one
//! argument use `T`, and events with two to four arguments use a tuple.
//!
//! On top of the registry sit the shared channel handles:
//! - [`Broadcast`] owns a registry and may be raised by anyone holding it.
//! - [`Relay`] is the receiver-only view of a broadcast, handed out to code that
//!   should listen but never raise.
//! - [`Subscription`] unregisters a listener when dropped.
//! - [`EventQueue`] collects events from any thread and delivers them through a
//!   broadcast when flushed on the owning thread.

mod broadcast;
mod listener;
mod queue;
mod registry;
mod subscription;

pub use self::broadcast::{Broadcast, Relay};
pub use self::listener::Listener;
pub use self::queue::{EventQueue, EventSender};
pub use self::registry::{ListenerRegistry, DEFAULT_CAPACITY};
pub use self::subscription::Subscription;
