// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lock listing and lock details payloads.

use serde::{Deserialize, Serialize};

use crate::types::{BatteryLevel, LockId};

use super::LockStatus;

/// One entry of `GET /users/locks/mine`.
///
/// The endpoint returns an object keyed by lock ID; the ID is copied into
/// [`LockSummary::lock_id`] when the listing is flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockSummary {
    /// Lock identifier (filled from the listing key).
    #[serde(skip_deserializing, default = "empty_lock_id")]
    pub lock_id: LockId,
    /// Display name chosen in the August app.
    #[serde(rename = "LockName", default)]
    pub lock_name: String,
    /// Identifier of the house the lock belongs to.
    #[serde(rename = "HouseID", default)]
    pub house_id: Option<String>,
    /// Name of the house the lock belongs to.
    #[serde(rename = "HouseName", default)]
    pub house_name: Option<String>,
    /// Access level of the signed-in user.
    #[serde(rename = "UserType", default)]
    pub user_type: Option<String>,
}

fn empty_lock_id() -> LockId {
    LockId::new("")
}

/// Response of `GET /locks/{id}`.
///
/// Only the fields the bridge uses are decoded; everything else is ignored.
///
/// # Examples
///
/// ```
/// use august_bridge::response::LockDetails;
///
/// let json = r#"{
///     "LockName": "Front Door",
///     "LockID": "ABC123",
///     "battery": 0.87,
///     "currentFirmwareVersion": "2.0.4",
///     "LockStatus": {"status": "locked", "doorState": "closed"}
/// }"#;
/// let details: LockDetails = serde_json::from_str(json).unwrap();
/// assert_eq!(details.battery_level().unwrap().value(), 87);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockDetails {
    /// Display name chosen in the August app.
    #[serde(rename = "LockName", default)]
    pub lock_name: String,
    /// Lock identifier.
    #[serde(rename = "LockID")]
    pub lock_id: LockId,
    /// Identifier of the house the lock belongs to.
    #[serde(rename = "HouseID", default)]
    pub house_id: Option<String>,
    /// Name of the house the lock belongs to.
    #[serde(rename = "HouseName", default)]
    pub house_name: Option<String>,
    /// Battery charge as a 0-1 fraction.
    #[serde(default)]
    pub battery: Option<f64>,
    /// Current firmware version.
    #[serde(rename = "currentFirmwareVersion", default)]
    pub firmware_version: Option<String>,
    /// Hardware SKU, used as the HomeKit model.
    #[serde(rename = "skuNumber", default)]
    pub sku_number: Option<String>,
    /// Serial number.
    #[serde(rename = "SerialNumber", default)]
    pub serial_number: Option<String>,
    /// PubNub channel carrying push events for this lock.
    #[serde(rename = "pubsubChannel", default)]
    pub pubsub_channel: Option<String>,
    /// Last known lock status.
    #[serde(rename = "LockStatus", default)]
    pub lock_status: Option<LockStatus>,
}

impl LockDetails {
    /// Returns the battery level, if the vendor reported one.
    #[must_use]
    pub fn battery_level(&self) -> Option<BatteryLevel> {
        self.battery.map(BatteryLevel::from_fraction)
    }
}
