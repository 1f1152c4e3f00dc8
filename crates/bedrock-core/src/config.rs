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

//! Global settings for the mediator runtime.

use crate::error::ConfigError;
use crate::event::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A collection of settings applied by a [`MediatorContext`](crate::MediatorContext)
/// to the channels and pools it creates.
///
/// Every field is optional in the serialized form; missing fields take their
/// default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorSettings {
    /// The initial listener capacity of newly created channels.
    pub listener_capacity: usize,
    /// The number of instances a pool creates when it is loaded.
    pub pool_initial_size: usize,
    /// The maximum number of inactive instances a pool retains, if bounded.
    pub pool_max_size: Option<usize>,
    /// If `true`, raises are logged at `debug` level instead of `trace`.
    pub log_raises: bool,
}

impl Default for MediatorSettings {
    fn default() -> Self {
        Self {
            listener_capacity: DEFAULT_CAPACITY,
            pool_initial_size: 10,
            pool_max_size: None,
            log_raises: false,
        }
    }
}

impl MediatorSettings {
    /// Parses settings from a JSON document and validates them.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and parses settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::debug!("Loaded mediator settings from '{}'.", path.display());
        Ok(settings)
    }

    /// Checks that the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listener_capacity == 0 {
            return Err(ConfigError::Invalid(
                "listener_capacity must be greater than zero".to_string(),
            ));
        }
        if let Some(max) = self.pool_max_size {
            if max < self.pool_initial_size {
                return Err(ConfigError::Invalid(format!(
                    "pool_max_size ({max}) is smaller than pool_initial_size ({})",
                    self.pool_initial_size
                )));
            }
        }
        Ok(())
    }

    /// The log level used when channels built from these settings are raised.
    pub(crate) fn raise_level(&self) -> log::Level {
        if self.log_raises {
            log::Level::Debug
        } else {
            log::Level::Trace
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = MediatorSettings::default();
        assert_eq!(settings.listener_capacity, 8);
        assert_eq!(settings.pool_initial_size, 10);
        assert_eq!(settings.pool_max_size, None);
        assert!(!settings.log_raises);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = MediatorSettings::from_json_str(r#"{ "listener_capacity": 32 }"#)
            .expect("valid settings");
        assert_eq!(settings.listener_capacity, 32);
        assert_eq!(settings.pool_initial_size, 10);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let err = MediatorSettings::from_json_str(r#"{ "listener_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_pool_bounds_are_checked() {
        let err = MediatorSettings::from_json_str(
            r#"{ "pool_initial_size": 20, "pool_max_size": 4 }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = MediatorSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "log_raises": true, "pool_max_size": 64 }}"#).expect("write");

        let settings = MediatorSettings::from_json_file(file.path()).expect("load");
        assert!(settings.log_raises);
        assert_eq!(settings.pool_max_size, Some(64));
        assert_eq!(settings.raise_level(), log::Level::Debug);
    }

    #[test]
    fn test_missing_file() {
        let err = MediatorSettings::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
