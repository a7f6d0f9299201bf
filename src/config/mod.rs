// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform and accessory configuration.
//!
//! [`PlatformConfig`] mirrors the JSON block the host hands to the platform.
//! [`PlatformConfig::verify`] rejects unusable configurations and produces a
//! [`VerifiedConfig`] with every default applied; [`AccessorySettings`] then
//! merges it with the per-lock [`DeviceConfig`] entry.

mod device_config;
mod logging;
mod platform_config;
mod settings;

pub use device_config::{DeviceConfig, LockOptions};
pub use logging::{DeviceLog, LoggingMode};
pub use platform_config::{
    Credentials, DEFAULT_CONFIRM_DELAY, DEFAULT_PUSH_RATE, MIN_REFRESH_RATE, Options,
    PlatformConfig, VerifiedConfig,
};
pub use settings::AccessorySettings;
pub(crate) use settings::MIN_POLL_PERIOD;
