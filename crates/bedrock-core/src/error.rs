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

//! Defines the error types returned by the runtime primitives.
//!
//! Missing listeners or holders are never errors: the corresponding
//! operations simply return `false`.

use thiserror::Error;

/// An error raised when registering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The listener is bound to a target that has already been dropped.
    #[error("listener target is no longer alive; refusing to register it")]
    InvalidListener,
}

/// An error related to registering or resolving services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A service of this type is already registered.
    #[error("service of type '{type_name}' is already registered")]
    AlreadyRegistered {
        /// The name of the service type.
        type_name: &'static str,
    },
    /// No service of this type is registered.
    #[error("service of type '{type_name}' is not registered")]
    NotRegistered {
        /// The name of the service type.
        type_name: &'static str,
    },
    /// A lazy factory tried to resolve the service it is constructing.
    #[error("circular dependency while constructing service '{type_name}'")]
    CircularDependency {
        /// The name of the service type.
        type_name: &'static str,
    },
}

/// An error raised by the frame scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A repeating timer was requested with a zero interval.
    #[error("repeating timers need a non-zero interval")]
    ZeroInterval,
}

/// An error raised when registering states with a
/// [`StateMachine`](crate::state::StateMachine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    /// A state of the same kind is already registered.
    #[error("a state of kind '{kind}' is already registered")]
    AlreadyRegistered {
        /// The debug name of the rejected state's kind.
        kind: &'static str,
    },
}

/// An error raised while loading [`MediatorSettings`](crate::MediatorSettings).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    /// The settings document is not valid JSON for the settings schema.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    /// The settings parsed but hold an unusable value.
    #[error("invalid settings: {0}")]
    Invalid(String),
}
