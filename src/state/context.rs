// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Values persisted with an accessory across restarts.

use serde::{Deserialize, Serialize};

use crate::config::LoggingMode;
use crate::types::{
    BatteryLevel, ContactSensorState, LockCurrentState, LockId, LockTargetState,
    StatusLowBattery,
};

use super::AccessoryState;

/// The key-value bag the host caches with each accessory.
///
/// Every field is optional: a freshly created accessory has an empty
/// context, and older caches may lack newer keys. How the host stores the
/// bag is up to the host; it only needs to round-trip through serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_id: Option<LockId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_current_state: Option<LockCurrentState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_target_state: Option<LockTargetState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_sensor_state: Option<ContactSensorState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<BatteryLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_low_battery: Option<StatusLowBattery>,
    /// Last firmware revision seen; a different live value is reported as
    /// an update.
    #[serde(
        rename = "currentFirmwareVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub firmware_version: Option<String>,
    /// Hardware SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Effective poll interval in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u64>,
    /// Effective log verbosity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingMode>,
}

impl AccessoryContext {
    /// Creates an empty context for a lock.
    #[must_use]
    pub fn for_lock(lock_id: LockId) -> Self {
        Self {
            lock_id: Some(lock_id),
            ..Self::default()
        }
    }

    /// Stores the characteristic values of a state.
    ///
    /// The firmware revision is only stored once known, so an unknown live
    /// value never erases the cached one.
    pub fn record(&mut self, state: &AccessoryState) {
        self.lock_current_state = Some(state.lock_current());
        self.lock_target_state = Some(state.lock_target());
        self.contact_sensor_state = Some(state.contact());
        self.battery_level = Some(state.battery());
        self.status_low_battery = Some(state.low_battery());
        if let Some(firmware) = state.firmware() {
            self.firmware_version = Some(firmware.to_string());
        }
    }
}
