// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door contact sensor state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SimpleState;

/// HomeKit `ContactSensorState` characteristic.
///
/// `Detected` means the two halves of the sensor touch, i.e. the door is
/// closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactSensorState {
    /// Door closed.
    Detected,
    /// Door open.
    NotDetected,
}

impl ContactSensorState {
    /// Derives the sensor state from vendor flags.
    ///
    /// Returns `None` when the flags carry no door information.
    #[must_use]
    pub fn from_simple_state(state: &SimpleState) -> Option<Self> {
        if state.open {
            Some(Self::NotDetected)
        } else if state.closed {
            Some(Self::Detected)
        } else {
            None
        }
    }

    /// Returns the numeric value of the HomeKit characteristic.
    #[must_use]
    pub const fn hap_value(&self) -> u8 {
        match self {
            Self::Detected => 0,
            Self::NotDetected => 1,
        }
    }

    /// Returns the past-tense verb used in transition messages.
    #[must_use]
    pub const fn transition_verb(&self) -> &'static str {
        match self {
            Self::Detected => "Closed",
            Self::NotDetected => "Opened",
        }
    }
}

impl fmt::Display for ContactSensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Detected => "CONTACT_DETECTED",
            Self::NotDetected => "CONTACT_NOT_DETECTED",
        })
    }
}
