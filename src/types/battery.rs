// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery level types.
//!
//! August reports battery charge as a fraction between 0 and 1. HomeKit
//! expects an integer percentage plus a separate low-battery status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Battery percentage below which [`StatusLowBattery::Low`] is reported.
pub const LOW_BATTERY_THRESHOLD: u8 = 15;

/// Battery charge as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use august_bridge::types::{BatteryLevel, StatusLowBattery};
///
/// let level = BatteryLevel::from_fraction(0.8734);
/// assert_eq!(level.value(), 87);
/// assert_eq!(level.status(), StatusLowBattery::Normal);
///
/// assert!(BatteryLevel::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BatteryLevel(u8);

impl BatteryLevel {
    /// Empty battery.
    pub const MIN: Self = Self(0);

    /// Full battery.
    pub const MAX: Self = Self(100);

    /// Creates a battery level.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Converts the vendor's 0-1 fraction into a rounded percentage.
    ///
    /// Out-of-range and non-finite inputs are clamped.
    #[must_use]
    pub fn from_fraction(fraction: f64) -> Self {
        if !fraction.is_finite() {
            return Self::MIN;
        }
        let percent = (fraction * 100.0).round().clamp(0.0, 100.0);
        // Safe: clamped to 0-100 above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self(percent as u8)
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the low-battery status for this level.
    #[must_use]
    pub fn status(&self) -> StatusLowBattery {
        StatusLowBattery::for_level(*self)
    }
}

impl Default for BatteryLevel {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<u8> for BatteryLevel {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BatteryLevel> for u8 {
    fn from(value: BatteryLevel) -> Self {
        value.0
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// HomeKit `StatusLowBattery` characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusLowBattery {
    /// Battery level is at or above the threshold.
    Normal,
    /// Battery level is below the threshold.
    Low,
}

impl StatusLowBattery {
    /// Derives the status from a battery level.
    #[must_use]
    pub fn for_level(level: BatteryLevel) -> Self {
        if level.value() < LOW_BATTERY_THRESHOLD {
            Self::Low
        } else {
            Self::Normal
        }
    }

    /// Returns the numeric value of the HomeKit characteristic.
    #[must_use]
    pub const fn hap_value(&self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Low => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_low() {
        for value in 0..LOW_BATTERY_THRESHOLD {
            let level = BatteryLevel::new(value).unwrap();
            assert_eq!(level.status(), StatusLowBattery::Low, "level {value}");
        }
    }

    #[test]
    fn threshold_and_above_is_normal() {
        for value in LOW_BATTERY_THRESHOLD..=100 {
            let level = BatteryLevel::new(value).unwrap();
            assert_eq!(level.status(), StatusLowBattery::Normal, "level {value}");
        }
    }

    #[test]
    fn from_fraction_rounds() {
        assert_eq!(BatteryLevel::from_fraction(0.146).value(), 15);
        assert_eq!(BatteryLevel::from_fraction(0.14).value(), 14);
        assert_eq!(BatteryLevel::from_fraction(1.0).value(), 100);
    }

    #[test]
    fn from_fraction_clamps() {
        assert_eq!(BatteryLevel::from_fraction(1.7).value(), 100);
        assert_eq!(BatteryLevel::from_fraction(-0.2).value(), 0);
        assert_eq!(BatteryLevel::from_fraction(f64::NAN).value(), 0);
    }

    #[test]
    fn deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<BatteryLevel>("150").is_err());
        let level: BatteryLevel = serde_json::from_str("42").unwrap();
        assert_eq!(level.value(), 42);
    }
}
