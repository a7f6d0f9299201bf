// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Effective settings of a single accessory.

use std::time::Duration;

use super::platform_config::{
    DEFAULT_CONFIRM_DELAY, DEFAULT_PUSH_RATE, MIN_REFRESH_RATE, clamp_refresh_rate,
};
use super::{DeviceConfig, LoggingMode, VerifiedConfig};

/// Shortest poll period an accessory accepts, whatever its settings say.
pub(crate) const MIN_POLL_PERIOD: Duration = Duration::from_secs(1);

/// Timing, visibility and logging of one lock accessory after merging the
/// platform options with its device entry.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use august_bridge::config::{AccessorySettings, LoggingMode};
///
/// let settings = AccessorySettings::default()
///     .with_push_rate(Duration::from_millis(50))
///     .with_logging(LoggingMode::Debug);
///
/// assert_eq!(settings.refresh_rate, Duration::from_secs(1800));
/// assert!(!settings.hide_lock);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorySettings {
    /// Poll interval.
    pub refresh_rate: Duration,
    /// Debounce window for lock commands.
    pub push_rate: Duration,
    /// Delay before the post-command confirmation poll.
    pub confirm_delay: Duration,
    /// Log verbosity.
    pub logging: LoggingMode,
    /// The lock mechanism service is not exposed and commands are not sent.
    pub hide_lock: bool,
    /// The contact sensor service is not exposed.
    pub hide_contact_sensor: bool,
}

impl Default for AccessorySettings {
    fn default() -> Self {
        Self {
            refresh_rate: MIN_REFRESH_RATE,
            push_rate: DEFAULT_PUSH_RATE,
            confirm_delay: DEFAULT_CONFIRM_DELAY,
            logging: LoggingMode::Standard,
            hide_lock: false,
            hide_contact_sensor: false,
        }
    }
}

impl AccessorySettings {
    /// Merges the platform configuration with an optional device entry.
    ///
    /// The refresh rate comes from the device entry when set (clamped to
    /// the minimum), else from the platform. Logging follows debug mode,
    /// then the device entry, then the platform, then `standard`.
    #[must_use]
    pub fn resolve(
        platform: &VerifiedConfig,
        device: Option<&DeviceConfig>,
        debug_mode: bool,
    ) -> Self {
        let refresh_rate = device
            .and_then(|d| d.refresh_rate)
            .map_or(platform.refresh_rate, clamp_refresh_rate);

        let logging = if debug_mode {
            LoggingMode::DebugMode
        } else {
            device.and_then(|d| d.logging).unwrap_or(platform.logging)
        };

        Self {
            refresh_rate,
            push_rate: platform.push_rate,
            confirm_delay: platform.confirm_delay,
            logging,
            hide_lock: device.is_some_and(DeviceConfig::hides_lock),
            hide_contact_sensor: device.is_some_and(DeviceConfig::hides_contact_sensor),
        }
    }

    /// Sets the poll interval without the configuration floor.
    ///
    /// Intervals below one second are raised to one second.
    #[must_use]
    pub fn with_refresh_rate(mut self, refresh_rate: Duration) -> Self {
        self.refresh_rate = refresh_rate.max(MIN_POLL_PERIOD);
        self
    }

    /// Sets the debounce window.
    #[must_use]
    pub fn with_push_rate(mut self, push_rate: Duration) -> Self {
        self.push_rate = push_rate;
        self
    }

    /// Sets the confirmation delay.
    #[must_use]
    pub fn with_confirm_delay(mut self, confirm_delay: Duration) -> Self {
        self.confirm_delay = confirm_delay;
        self
    }

    /// Sets the log verbosity.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingMode) -> Self {
        self.logging = logging;
        self
    }

    /// Hides the lock mechanism service.
    #[must_use]
    pub fn with_hidden_lock(mut self) -> Self {
        self.hide_lock = true;
        self
    }

    /// Hides the contact sensor service.
    #[must_use]
    pub fn with_hidden_contact_sensor(mut self) -> Self {
        self.hide_contact_sensor = true;
        self
    }
}
