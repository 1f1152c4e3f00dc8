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

//! # Bedrock Core
//!
//! Host-independent runtime primitives for game code: ordered listener
//! registries, broadcasts and relays, observable values, locks, conditions,
//! an explicit service container, object pools, state machines and a
//! tick-driven scheduler.
//!
//! Everything here is single-threaded and synchronous. The only type meant to
//! cross threads is the sender half of an [`event::EventQueue`].

#![warn(missing_docs)]

pub mod condition;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod lock;
pub mod pool;
pub mod schedule;
pub mod service;
pub mod state;
pub mod value;

pub use config::MediatorSettings;
pub use context::MediatorContext;
pub use error::{ConfigError, RegistryError, ScheduleError, ServiceError, StateError};
pub use event::{Broadcast, Listener, ListenerRegistry, Relay, Subscription};
pub use pool::{Pool, PoolState, Poolable};
pub use schedule::{FrameScheduler, FrameTime, Stopwatch};
pub use service::ServiceContainer;
pub use state::{State, StateMachine};
