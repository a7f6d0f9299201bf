// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for accessory lifecycle and state changes.
//!
//! The [`EventBus`] uses tokio's broadcast channel so that any number of
//! observers (a HomeKit bridge, a logger, tests) can follow what the
//! platform and its accessories do.
//!
//! # Examples
//!
//! ```
//! use august_bridge::event::{AccessoryEvent, EventBus};
//! use august_bridge::types::LockId;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(AccessoryEvent::AccessoryRestored {
//!     lock_id: LockId::new("ABC"),
//!     name: "Front Door".to_string(),
//! });
//! ```

mod accessory_event;
mod event_bus;

pub use accessory_event::AccessoryEvent;
pub use event_bus::EventBus;
