// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `august_bridge` - August smart locks as HomeKit accessories.
//!
//! This library keeps a HomeKit view of August locks in line with the
//! August cloud. Each lock becomes a [`LockAccessory`] exposing the lock
//! mechanism, door sensor, battery and accessory information services.
//!
//! # Supported Features
//!
//! - **Polling**: lock, door and battery state on a fixed interval
//! - **Commands**: HomeKit lock/unlock requests, debounced and confirmed
//! - **Push events**: instant updates over the lock's PubNub channel
//! - **Platform**: account-wide discovery, per-lock config overrides, cache
//!   restoration
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use august_bridge::config::{Credentials, PlatformConfig};
//! use august_bridge::platform::Platform;
//! use august_bridge::protocol::{ApiConfig, HttpClient};
//! use august_bridge::subscription::Subscribable;
//! use august_bridge::types::{LockId, LockTargetState};
//!
//! #[tokio::main]
//! async fn main() -> august_bridge::Result<()> {
//!     let api = HttpClient::new(ApiConfig::new())?;
//!     api.start_session("install-id", "me@example.com", "secret").await?;
//!
//!     let config = PlatformConfig::new(Credentials::new("me@example.com", "secret"));
//!     let platform = Platform::new(config, Arc::new(api))?;
//!     platform.discover_devices().await?;
//!
//!     if let Some(lock) = platform.accessory(&LockId::new("ABC123")).await {
//!         lock.on_lock_current_state_changed(|state| {
//!             println!("LockCurrentState = {}", state.hap_value());
//!         });
//!         lock.set_lock_target_state(LockTargetState::Secured)?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod accessory;
pub mod config;
pub mod error;
pub mod event;
pub mod platform;
pub mod protocol;
pub mod response;
pub mod state;
pub mod subscription;
pub mod types;

pub use accessory::{AccessoryInfo, LockAccessory};
pub use config::{AccessorySettings, DeviceConfig, LoggingMode, PlatformConfig};
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{AccessoryEvent, EventBus};
pub use platform::{CachedAccessory, Platform};
#[cfg(feature = "http")]
pub use protocol::{ApiConfig, HttpClient};
pub use protocol::LockApi;
pub use state::{AccessoryContext, AccessoryState, StateChange};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{
    BatteryLevel, ContactSensorState, LockCurrentState, LockId, LockTargetState,
    StatusLowBattery,
};
