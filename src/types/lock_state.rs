// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lock mechanism states.
//!
//! The August cloud reports lock and door state as status strings such as
//! `kAugLockState_Locked` or `kAugDoorState_Open`. Those are first reduced to
//! a [`SimpleState`] of discrete flags, from which the HomeKit
//! [`LockCurrentState`] is derived.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Discrete flags derived from a vendor status payload.
///
/// In a healthy read at most one of `locked` and `unlocked` is set, and at
/// most one of `open` and `closed`. All flags cleared means the payload did
/// not say anything conclusive.
///
/// # Examples
///
/// ```
/// use august_bridge::types::SimpleState;
///
/// let state = SimpleState::from_status(Some("kAugLockState_Locked"), Some("kAugDoorState_Closed"));
/// assert!(state.locked);
/// assert!(state.closed);
/// assert!(!state.is_ambiguous());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleState {
    /// The bolt is thrown.
    #[serde(default)]
    pub locked: bool,
    /// The bolt is retracted.
    #[serde(default)]
    pub unlocked: bool,
    /// The lock reported a jam.
    #[serde(default)]
    pub jammed: bool,
    /// The door sensor reports the door open.
    #[serde(default)]
    pub open: bool,
    /// The door sensor reports the door closed.
    #[serde(default)]
    pub closed: bool,
}

impl SimpleState {
    /// Derives the flags from the vendor lock and door status strings.
    ///
    /// Both the long form (`kAugLockState_Locked`) and the short form
    /// (`locked`) are accepted, case-insensitively. Unknown strings leave the
    /// corresponding flags cleared.
    #[must_use]
    pub fn from_status(lock_status: Option<&str>, door_state: Option<&str>) -> Self {
        let mut state = Self::default();

        match lock_status.map(status_suffix).as_deref() {
            Some("locked") => state.locked = true,
            Some("unlocked") => state.unlocked = true,
            Some("jammed") => state.jammed = true,
            _ => {}
        }

        match door_state.map(status_suffix).as_deref() {
            Some("open") => state.open = true,
            Some("closed") => state.closed = true,
            _ => {}
        }

        state
    }

    /// Returns `true` if the lock flags do not designate a single state.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.locked == self.unlocked && !self.jammed
    }
}

/// Strips the `kAug...State_` prefix and lowercases the remainder.
fn status_suffix(raw: &str) -> String {
    raw.rsplit_once('_')
        .map_or(raw, |(_, suffix)| suffix)
        .trim()
        .to_ascii_lowercase()
}

/// HomeKit `LockCurrentState` characteristic.
///
/// # Examples
///
/// ```
/// use august_bridge::types::{LockCurrentState, SimpleState};
///
/// let state = SimpleState { unlocked: true, ..SimpleState::default() };
/// assert_eq!(LockCurrentState::from_simple_state(&state), LockCurrentState::Unsecured);
/// assert_eq!(LockCurrentState::Unsecured.hap_value(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockCurrentState {
    /// The bolt is retracted.
    Unsecured,
    /// The bolt is thrown.
    Secured,
    /// The lock reported a jam.
    Jammed,
    /// The state could not be determined.
    Unknown,
}

impl LockCurrentState {
    /// Derives the current state from vendor flags.
    ///
    /// Conflicting or absent lock flags map to [`LockCurrentState::Unknown`].
    #[must_use]
    pub fn from_simple_state(state: &SimpleState) -> Self {
        match (state.locked, state.unlocked) {
            (true, false) => Self::Secured,
            (false, true) => Self::Unsecured,
            _ if state.jammed => Self::Jammed,
            _ => Self::Unknown,
        }
    }

    /// Returns the numeric value of the HomeKit characteristic.
    #[must_use]
    pub const fn hap_value(&self) -> u8 {
        match self {
            Self::Unsecured => 0,
            Self::Secured => 1,
            Self::Jammed => 2,
            Self::Unknown => 3,
        }
    }

    /// Returns the past-tense verb used in transition messages, if any.
    #[must_use]
    pub const fn transition_verb(&self) -> Option<&'static str> {
        match self {
            Self::Unsecured => Some("Unlocked"),
            Self::Secured => Some("Locked"),
            Self::Jammed | Self::Unknown => None,
        }
    }
}

impl From<LockTargetState> for LockCurrentState {
    fn from(value: LockTargetState) -> Self {
        match value {
            LockTargetState::Unsecured => Self::Unsecured,
            LockTargetState::Secured => Self::Secured,
        }
    }
}

impl fmt::Display for LockCurrentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unsecured => "UNSECURED",
            Self::Secured => "SECURED",
            Self::Jammed => "JAMMED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// HomeKit `LockTargetState` characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockTargetState {
    /// Retract the bolt.
    Unsecured,
    /// Throw the bolt.
    Secured,
}

impl LockTargetState {
    /// Returns the numeric value of the HomeKit characteristic.
    #[must_use]
    pub const fn hap_value(&self) -> u8 {
        match self {
            Self::Unsecured => 0,
            Self::Secured => 1,
        }
    }

    /// Parses the numeric value of the HomeKit characteristic.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidCharacteristic` for anything but 0 or 1.
    pub fn from_hap_value(value: u8) -> Result<Self, ValueError> {
        match value {
            0 => Ok(Self::Unsecured),
            1 => Ok(Self::Secured),
            _ => Err(ValueError::InvalidCharacteristic {
                characteristic: "LockTargetState",
                value,
            }),
        }
    }
}

impl fmt::Display for LockTargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unsecured => "UNSECURED",
            Self::Secured => "SECURED",
        })
    }
}
