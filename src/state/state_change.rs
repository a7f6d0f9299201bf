// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the building blocks for updating an
//! [`AccessoryState`](super::AccessoryState). Polls, push events and user
//! commands all express what they learned as changes, which are applied to
//! the state and then dispatched to characteristic callbacks.
//!
//! # Change Types
//!
//! - [`StateChange::LockCurrent`] - Bolt position as reported by the lock
//! - [`StateChange::LockTarget`] - Bolt position requested by the user
//! - [`StateChange::Contact`] - Door sensor
//! - [`StateChange::Battery`] - Battery level (low battery status follows)
//! - [`StateChange::Firmware`] - Firmware revision
//! - [`StateChange::Batch`] - Multiple changes grouped together
//!
//! # Examples
//!
//! ```
//! use august_bridge::state::{AccessoryState, StateChange};
//! use august_bridge::types::LockCurrentState;
//!
//! let mut state = AccessoryState::default();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::lock_current(LockCurrentState::Unsecured)));
//!
//! // Applying same change again returns false
//! assert!(!state.apply(&StateChange::lock_current(LockCurrentState::Unsecured)));
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{BatteryLevel, ContactSensorState, LockCurrentState, LockTargetState};

/// Represents a change in accessory state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateChange {
    /// The reported bolt position changed.
    LockCurrent(LockCurrentState),

    /// The requested bolt position changed.
    LockTarget(LockTargetState),

    /// The door sensor changed.
    Contact(ContactSensorState),

    /// The battery level changed.
    ///
    /// The low battery status is derived from the level when applied.
    Battery(BatteryLevel),

    /// The firmware revision changed.
    Firmware(String),

    /// Multiple changes at once.
    ///
    /// Used when a refresh returns several values.
    Batch(Vec<StateChange>),
}

impl StateChange {
    #[must_use]
    pub fn lock_current(state: LockCurrentState) -> Self {
        Self::LockCurrent(state)
    }

    #[must_use]
    pub fn lock_target(state: LockTargetState) -> Self {
        Self::LockTarget(state)
    }

    #[must_use]
    pub fn contact(state: ContactSensorState) -> Self {
        Self::Contact(state)
    }

    #[must_use]
    pub fn battery(level: BatteryLevel) -> Self {
        Self::Battery(level)
    }

    #[must_use]
    pub fn firmware(version: impl Into<String>) -> Self {
        Self::Firmware(version.into())
    }

    /// Creates a batch of changes.
    #[must_use]
    pub fn batch(changes: Vec<StateChange>) -> Self {
        Self::Batch(changes)
    }

    /// Creates the changes implied by a settled bolt position.
    ///
    /// A lock that reports its bolt position also reached its target, so
    /// both the current and the target state move. Returns `None` for
    /// positions that have no target counterpart.
    #[must_use]
    pub fn settled(state: LockCurrentState) -> Option<Self> {
        let target = match state {
            LockCurrentState::Secured => LockTargetState::Secured,
            LockCurrentState::Unsecured => LockTargetState::Unsecured,
            LockCurrentState::Jammed | LockCurrentState::Unknown => return None,
        };
        Some(Self::Batch(vec![
            Self::LockCurrent(state),
            Self::LockTarget(target),
        ]))
    }
}
