// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CONTEXT: TOML configuration for tool names, property keys and reboot timing
//! OWNERS: @runtime
//! STATUS: Functional
//! API_STABILITY: Stable (v1.0)
//! TEST_COVERAGE: 6 unit tests
//!
//! Every field has a default, so an empty document reproduces the built-in
//! platform behaviour.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::property::{PropertyKey, PropertyKeys};
use crate::reboot::RebootTiming;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// External tools invoked by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPaths {
    /// Property store front end.
    pub property: String,
    /// Flash write-protect inspector.
    pub write_protect: String,
    /// Non-volatile memory reset tool.
    pub nvram: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self { property: "crossystem".into(), write_protect: "flashrom".into(), nvram: "mosys".into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RebootSection {
    settle_secs: u64,
    grace_secs: u64,
}

impl Default for RebootSection {
    fn default() -> Self {
        let timing = RebootTiming::default();
        Self { settle_secs: timing.settle.as_secs(), grace_secs: timing.grace.as_secs() }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    command_timeout_secs: Option<u64>,
    tools: ToolPaths,
    keys: PropertyKeys,
    reboot: RebootSection,
}

/// Complete platform configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformConfig {
    pub tools: ToolPaths,
    pub keys: PropertyKeys,
    /// `None` waits for external commands indefinitely.
    pub command_timeout: Option<Duration>,
    pub reboot: RebootTiming,
}

impl PlatformConfig {
    /// Loads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let raw: RawConfig = toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        Self::from_raw(raw)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)
            .map_err(|source| ConfigError::Parse { path: PathBuf::from("<inline>"), source })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let config = Self {
            tools: raw.tools,
            keys: raw.keys,
            command_timeout: raw.command_timeout_secs.map(Duration::from_secs),
            reboot: RebootTiming {
                settle: Duration::from_secs(raw.reboot.settle_secs),
                grace: Duration::from_secs(raw.reboot.grace_secs),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks tool names and key strings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, tool) in [
            ("tools.property", &self.tools.property),
            ("tools.write_protect", &self.tools.write_protect),
            ("tools.nvram", &self.tools.nvram),
        ] {
            if tool.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        for key in PropertyKey::ALL {
            let name = self.keys.name(key);
            if name.is_empty() {
                return Err(ConfigError::Invalid(format!("key for {key:?} must not be empty")));
            }
            if name.contains('=') || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "key `{name}` for {key:?} contains '=' or whitespace"
                )));
            }
        }
        if self.command_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid("command_timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
