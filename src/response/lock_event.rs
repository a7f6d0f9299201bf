// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push event payload.

use chrono::{DateTime, Utc};

use crate::types::SimpleState;

use super::LockStatus;

/// A state change pushed by the vendor for one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct LockEvent {
    /// Discrete flags carried by the event.
    pub state: SimpleState,
    /// When the event was received (or published, if the transport says so).
    pub timestamp: DateTime<Utc>,
}

impl LockEvent {
    /// Creates an event from state flags, timestamped now.
    #[must_use]
    pub fn new(state: SimpleState) -> Self {
        Self {
            state,
            timestamp: Utc::now(),
        }
    }

    /// Creates an event from a vendor status payload.
    #[must_use]
    pub fn from_status(status: &LockStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            state: status.simple_state(),
            timestamp,
        }
    }
}
