// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for lock accessories.
//!
//! This module provides type-safe representations of the values exchanged
//! between the August cloud and HomeKit. Each type ensures values are within
//! their valid ranges at construction time.
//!
//! # Types
//!
//! - [`LockId`] - Vendor lock identifier
//! - [`SimpleState`] - Discrete flags derived from vendor status strings
//! - [`LockCurrentState`] - Secured/Unsecured/Jammed/Unknown
//! - [`LockTargetState`] - Secured/Unsecured
//! - [`ContactSensorState`] - Door closed/open
//! - [`BatteryLevel`] - Battery charge (0-100%)
//! - [`StatusLowBattery`] - Normal/Low, derived from the battery level

mod battery;
mod contact;
mod lock_id;
mod lock_state;

pub use battery::{BatteryLevel, LOW_BATTERY_THRESHOLD, StatusLowBattery};
pub use contact::ContactSensorState;
pub use lock_id::LockId;
pub use lock_state::{LockCurrentState, LockTargetState, SimpleState};
