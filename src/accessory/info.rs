// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory information service.

use crate::types::LockId;

/// Manufacturer reported for every lock.
pub const MANUFACTURER: &str = "August Home Inc.";

/// Values of the HomeKit `AccessoryInformation` service, plus which optional
/// services the accessory exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    /// Display name.
    pub name: String,
    pub lock_id: LockId,
    pub manufacturer: &'static str,
    /// Hardware SKU.
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_revision: Option<String>,
    /// The `LockMechanism` service is exposed.
    pub lock_service: bool,
    /// The `ContactSensor` service is exposed.
    pub contact_sensor_service: bool,
}

impl AccessoryInfo {
    /// Returns the name of the contact sensor service.
    #[must_use]
    pub fn contact_sensor_name(&self) -> String {
        format!("{} Contact Sensor", self.name)
    }

    /// Returns the name of the battery service.
    #[must_use]
    pub fn battery_name(&self) -> String {
        format!("{} Battery", self.name)
    }
}
