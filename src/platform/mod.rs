// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Account-level discovery and accessory lifecycle.
//!
//! The [`Platform`] is what a host instantiates once per config block. It
//! verifies the configuration, takes back the accessories the host restored
//! from its cache, and on [`Platform::discover_devices`] lines up the
//! account's locks with the per-lock config entries:
//!
//! - a lock with a cached accessory is restored with the cached context;
//! - a new lock gets a fresh accessory, unless its entry sets `hide_device`;
//! - a cached accessory whose lock is now hidden is unregistered.
//!
//! Every lifecycle step is published on the event bus.
//!
//! # Event Subscription
//!
//! ```no_run
//! use august_bridge::event::AccessoryEvent;
//! use august_bridge::platform::Platform;
//! use august_bridge::protocol::HttpClient;
//!
//! # fn example(platform: &Platform<HttpClient>) {
//! let mut events = platform.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         if let AccessoryEvent::TransitionLogged { name, verb, .. } = event {
//!             println!("{name} was {verb}");
//!         }
//!     }
//! });
//! # }
//! ```

mod august_platform;
mod cached_accessory;

pub use august_platform::Platform;
pub use cached_accessory::CachedAccessory;
