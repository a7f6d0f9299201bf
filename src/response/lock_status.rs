// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lock status payload.

use serde::{Deserialize, Serialize};

use crate::types::SimpleState;

/// Lock and door status as reported by the vendor.
///
/// The same shape is returned by `GET /locks/{id}/status`, embedded as
/// `LockStatus` in the lock details, returned by the remote-operate calls
/// and pushed over PubNub.
///
/// # Examples
///
/// ```
/// use august_bridge::response::LockStatus;
///
/// let json = r#"{"status": "kAugLockState_Locked", "doorState": "kAugDoorState_Open"}"#;
/// let status: LockStatus = serde_json::from_str(json).unwrap();
/// let state = status.simple_state();
/// assert!(state.locked);
/// assert!(state.open);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    /// Lock status string (`kAugLockState_Locked`, `locked`, ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Door sensor state string (`kAugDoorState_Open`, `closed`, ...).
    #[serde(default)]
    pub door_state: Option<String>,
    /// Vendor timestamp of the reading.
    #[serde(default)]
    pub date_time: Option<String>,
    /// Whether the vendor considers this reading valid.
    #[serde(default)]
    pub valid: Option<bool>,
}

impl LockStatus {
    /// Derives the discrete state flags from the status strings.
    #[must_use]
    pub fn simple_state(&self) -> SimpleState {
        SimpleState::from_status(self.status.as_deref(), self.door_state.as_deref())
    }
}
