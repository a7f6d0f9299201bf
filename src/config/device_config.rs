// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-lock configuration entries.

use serde::{Deserialize, Serialize};

use crate::types::LockId;

use super::LoggingMode;

/// One entry of `options.devices`.
///
/// Entries are matched to discovered locks by [`LockId::matches`]; every
/// field set here overrides what the vendor reports.
///
/// # Examples
///
/// ```
/// use august_bridge::config::DeviceConfig;
///
/// let config = DeviceConfig::new("ABC123")
///     .with_name("Garage")
///     .with_refresh_rate(3600)
///     .with_hidden_contact_sensor();
///
/// assert_eq!(config.config_lock_name.as_deref(), Some("Garage"));
/// assert!(config.lock.unwrap().hide_contactsensor);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    /// The lock this entry applies to.
    pub lock_id: LockId,
    /// Name to use instead of the one chosen in the August app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_lock_name: Option<String>,
    /// Do not expose this lock at all.
    #[serde(rename = "hide_device", default)]
    pub hide_device: bool,
    /// Publish as an external accessory instead of through the bridge.
    #[serde(default)]
    pub external: bool,
    /// Log verbosity for this lock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingMode>,
    /// Poll interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u64>,
    /// Service visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockOptions>,
}

impl DeviceConfig {
    /// Creates an entry for a lock with nothing overridden.
    #[must_use]
    pub fn new(lock_id: impl Into<LockId>) -> Self {
        Self {
            lock_id: lock_id.into(),
            config_lock_name: None,
            hide_device: false,
            external: false,
            logging: None,
            refresh_rate: None,
            lock: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config_lock_name = Some(name.into());
        self
    }

    /// Hides the whole device.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hide_device = true;
        self
    }

    /// Publishes the device as an external accessory.
    #[must_use]
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Sets the log verbosity.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingMode) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Sets the poll interval in seconds.
    #[must_use]
    pub fn with_refresh_rate(mut self, seconds: u64) -> Self {
        self.refresh_rate = Some(seconds);
        self
    }

    /// Removes the lock mechanism service.
    #[must_use]
    pub fn with_hidden_lock(mut self) -> Self {
        self.lock.get_or_insert_with(LockOptions::default).hide_lock = true;
        self
    }

    /// Removes the contact sensor service.
    #[must_use]
    pub fn with_hidden_contact_sensor(mut self) -> Self {
        self.lock
            .get_or_insert_with(LockOptions::default)
            .hide_contactsensor = true;
        self
    }

    /// Returns `true` if the lock mechanism service is hidden.
    #[must_use]
    pub fn hides_lock(&self) -> bool {
        self.lock.as_ref().is_some_and(|l| l.hide_lock)
    }

    /// Returns `true` if the contact sensor service is hidden.
    #[must_use]
    pub fn hides_contact_sensor(&self) -> bool {
        self.lock.as_ref().is_some_and(|l| l.hide_contactsensor)
    }
}

/// Service visibility of one lock (`lock` block of a device entry).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOptions {
    /// Drop the lock mechanism service; commands are never sent.
    #[serde(default)]
    pub hide_lock: bool,
    /// Drop the contact sensor service.
    #[serde(default)]
    pub hide_contactsensor: bool,
}
