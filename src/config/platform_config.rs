// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform configuration as written in the host config file.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::LockId;

use super::{DeviceConfig, LoggingMode};

/// Lowest accepted poll interval.
pub const MIN_REFRESH_RATE: Duration = Duration::from_secs(1800);

/// Debounce window used when `pushRate` is not set.
pub const DEFAULT_PUSH_RATE: Duration = Duration::from_millis(100);

/// Delay before the confirmation poll that follows a command.
pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_secs(5);

/// The platform block of the host config.
///
/// # Examples
///
/// ```
/// use august_bridge::config::PlatformConfig;
///
/// let json = r#"{
///     "name": "August",
///     "credentials": {"augustId": "me@example.com", "password": "secret", "installId": "id"},
///     "options": {"refreshRate": 600}
/// }"#;
/// let config: PlatformConfig = serde_json::from_str(json).unwrap();
/// let verified = config.verify().unwrap();
/// assert_eq!(verified.refresh_rate.as_secs(), 1800);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Platform display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Account credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Refuse to start.
    #[serde(default)]
    pub disable_plugin: bool,
    /// Polling, logging and device options.
    #[serde(default)]
    pub options: Options,
    /// Set when the host runs in debug mode; not part of the file.
    #[serde(skip)]
    pub debug_mode: bool,
}

/// August account credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// API key override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// PubNub subscribe key override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pn_sub_key: Option<String>,
    /// Installation identifier the session was validated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_id: Option<String>,
    /// E-mail address or `+<country code><number>` phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub august_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Access token of an already validated session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_validated: Option<bool>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("install_id", &self.install_id)
            .field("august_id", &self.august_id)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("country_code", &self.country_code)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("is_validated", &self.is_validated)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Creates credentials from an August ID and password.
    #[must_use]
    pub fn new(august_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            august_id: Some(august_id.into()),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// Sets the installation identifier.
    #[must_use]
    pub fn with_install_id(mut self, install_id: impl Into<String>) -> Self {
        self.install_id = Some(install_id.into());
        self
    }

    /// Sets the access token of a validated session.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

/// The `options` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Poll interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u64>,
    /// Debounce window in seconds (fractions allowed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_rate: Option<f64>,
    /// Delay before the post-command confirmation poll, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingMode>,
    /// Per-lock overrides.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Configuration that passed [`PlatformConfig::verify`], with every default
/// and clamp applied.
#[derive(Debug, Clone)]
pub struct VerifiedConfig {
    pub name: String,
    pub credentials: Credentials,
    /// Platform poll interval, at least [`MIN_REFRESH_RATE`].
    pub refresh_rate: Duration,
    /// Debounce window for lock commands.
    pub push_rate: Duration,
    /// Delay before the confirmation poll.
    pub confirm_delay: Duration,
    /// Platform log verbosity.
    pub logging: LoggingMode,
    /// Whether the host runs in debug mode.
    pub debug_mode: bool,
    /// Per-lock overrides.
    pub devices: Vec<DeviceConfig>,
}

impl VerifiedConfig {
    /// Returns the device entry matching a lock, if any.
    #[must_use]
    pub fn device(&self, lock_id: &LockId) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.lock_id.matches(lock_id))
    }
}

impl PlatformConfig {
    /// Creates a configuration for the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..Self::default()
        }
    }

    /// Sets the poll interval in seconds.
    #[must_use]
    pub fn with_refresh_rate(mut self, seconds: u64) -> Self {
        self.options.refresh_rate = Some(seconds);
        self
    }

    /// Sets the debounce window in seconds.
    #[must_use]
    pub fn with_push_rate(mut self, seconds: f64) -> Self {
        self.options.push_rate = Some(seconds);
        self
    }

    /// Sets the confirmation delay in seconds.
    #[must_use]
    pub fn with_confirm_delay(mut self, seconds: f64) -> Self {
        self.options.confirm_delay = Some(seconds);
        self
    }

    /// Sets the platform log verbosity.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingMode) -> Self {
        self.options.logging = Some(logging);
        self
    }

    /// Adds a per-lock entry.
    #[must_use]
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.options.devices.push(device);
        self
    }

    /// Marks the host as running in debug mode.
    #[must_use]
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Resolves the platform log verbosity.
    ///
    /// An explicit `logging` option wins over the host debug mode.
    #[must_use]
    pub fn logging(&self) -> LoggingMode {
        match self.options.logging {
            Some(mode @ (LoggingMode::Standard | LoggingMode::Debug | LoggingMode::None)) => mode,
            _ if self.debug_mode => LoggingMode::DebugMode,
            _ => LoggingMode::Standard,
        }
    }

    /// Checks the configuration and applies defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the platform is disabled or the credentials
    /// are incomplete.
    pub fn verify(&self) -> Result<VerifiedConfig, ConfigError> {
        if self.disable_plugin {
            return Err(ConfigError::Disabled);
        }

        let credentials = self
            .credentials
            .clone()
            .ok_or(ConfigError::MissingCredentials)?;
        if credentials.august_id.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingAugustId);
        }
        if credentials.password.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingPassword);
        }

        let refresh_rate = match self.options.refresh_rate {
            None => {
                tracing::debug!("Using default refresh rate of {}s", MIN_REFRESH_RATE.as_secs());
                MIN_REFRESH_RATE
            }
            Some(seconds) => clamp_refresh_rate(seconds),
        };

        let push_rate = seconds_or(self.options.push_rate, DEFAULT_PUSH_RATE, "pushRate");
        let confirm_delay =
            seconds_or(self.options.confirm_delay, DEFAULT_CONFIRM_DELAY, "confirmDelay");

        let verified = VerifiedConfig {
            name: self.name.clone().unwrap_or_else(|| "August".to_string()),
            credentials,
            refresh_rate,
            push_rate,
            confirm_delay,
            logging: self.logging(),
            debug_mode: self.debug_mode,
            devices: self.options.devices.clone(),
        };

        tracing::debug!(
            refresh_rate = verified.refresh_rate.as_secs(),
            push_rate_ms = u64::try_from(verified.push_rate.as_millis()).unwrap_or(u64::MAX),
            logging = %verified.logging,
            devices = verified.devices.len(),
            "Config OK"
        );

        Ok(verified)
    }
}

/// Applies the refresh rate floor, warning when it kicks in.
pub(crate) fn clamp_refresh_rate(seconds: u64) -> Duration {
    let requested = Duration::from_secs(seconds);
    if requested < MIN_REFRESH_RATE {
        tracing::warn!(
            requested = seconds,
            minimum = MIN_REFRESH_RATE.as_secs(),
            "Refresh rate raised to the minimum, lock details are unlikely to change faster"
        );
        MIN_REFRESH_RATE
    } else {
        requested
    }
}

fn seconds_or(value: Option<f64>, default: Duration, key: &str) -> Duration {
    match value.map(Duration::try_from_secs_f64) {
        None => default,
        Some(Ok(duration)) => duration,
        Some(Err(_)) => {
            tracing::warn!(key, "Ignoring invalid duration, using the default");
            default
        }
    }
}
