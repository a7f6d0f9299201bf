// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory state tracking.

use serde::{Deserialize, Serialize};

use crate::types::{
    BatteryLevel, ContactSensorState, LockCurrentState, LockTargetState, StatusLowBattery,
};

use super::{AccessoryContext, StateChange};

/// Characteristic values of one lock accessory.
///
/// Every value is always known: before the first live refresh the state is
/// seeded from the persisted [`AccessoryContext`], falling back to a secured
/// lock, an open door and a full battery.
///
/// # Examples
///
/// ```
/// use august_bridge::state::{AccessoryState, StateChange};
/// use august_bridge::types::{BatteryLevel, StatusLowBattery};
///
/// let mut state = AccessoryState::default();
/// state.apply(&StateChange::battery(BatteryLevel::new(9).unwrap()));
/// assert_eq!(state.low_battery(), StatusLowBattery::Low);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryState {
    lock_current: LockCurrentState,
    lock_target: LockTargetState,
    contact: ContactSensorState,
    battery: BatteryLevel,
    low_battery: StatusLowBattery,
    firmware: Option<String>,
}

impl Default for AccessoryState {
    fn default() -> Self {
        Self {
            lock_current: LockCurrentState::Secured,
            lock_target: LockTargetState::Secured,
            contact: ContactSensorState::NotDetected,
            battery: BatteryLevel::MAX,
            low_battery: StatusLowBattery::Normal,
            firmware: None,
        }
    }
}

impl AccessoryState {
    /// Creates a state seeded from a persisted context.
    ///
    /// Values missing from the context take the defaults. The low battery
    /// status is recomputed from the seeded level.
    #[must_use]
    pub fn seeded(context: &AccessoryContext) -> Self {
        let defaults = Self::default();
        let battery = context.battery_level.unwrap_or(defaults.battery);
        Self {
            lock_current: context.lock_current_state.unwrap_or(defaults.lock_current),
            lock_target: context.lock_target_state.unwrap_or(defaults.lock_target),
            contact: context.contact_sensor_state.unwrap_or(defaults.contact),
            battery,
            low_battery: StatusLowBattery::for_level(battery),
            firmware: context.firmware_version.clone(),
        }
    }

    #[must_use]
    pub fn lock_current(&self) -> LockCurrentState {
        self.lock_current
    }

    #[must_use]
    pub fn lock_target(&self) -> LockTargetState {
        self.lock_target
    }

    #[must_use]
    pub fn contact(&self) -> ContactSensorState {
        self.contact
    }

    #[must_use]
    pub fn battery(&self) -> BatteryLevel {
        self.battery
    }

    #[must_use]
    pub fn low_battery(&self) -> StatusLowBattery {
        self.low_battery
    }

    /// Returns the firmware revision, once known.
    #[must_use]
    pub fn firmware(&self) -> Option<&str> {
        self.firmware.as_deref()
    }

    /// Applies a change.
    ///
    /// Returns `true` if any value actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::LockCurrent(state) => replace(&mut self.lock_current, *state),
            StateChange::LockTarget(state) => replace(&mut self.lock_target, *state),
            StateChange::Contact(state) => replace(&mut self.contact, *state),
            StateChange::Battery(level) => {
                let level_changed = replace(&mut self.battery, *level);
                let status_changed =
                    replace(&mut self.low_battery, StatusLowBattery::for_level(*level));
                level_changed || status_changed
            }
            StateChange::Firmware(version) => {
                if self.firmware.as_deref() == Some(version.as_str()) {
                    false
                } else {
                    self.firmware = Some(version.clone());
                    true
                }
            }
            StateChange::Batch(changes) => changes
                .iter()
                .fold(false, |changed, change| self.apply(change) || changed),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
