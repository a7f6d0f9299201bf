// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-lock state reconciliation and update scheduling.
//!
//! A [`LockAccessory`] keeps one lock's HomeKit state in line with the
//! August cloud. Three sources write to the same state:
//!
//! - the poll loop, on a fixed interval;
//! - user commands, debounced and followed by one confirmation poll;
//! - vendor push events.
//!
//! They share an update-in-progress flag: it is raised by a command and
//! lowered once the command has been sent, and while it is up neither the
//! poll loop nor the confirmation poll touches the vendor API. Refreshes
//! never overlap.
//!
//! All vendor failures are logged and absorbed; the state simply stays as
//! it was until the next successful read.

mod info;
mod lock_accessory;
mod shared;

pub use info::{AccessoryInfo, MANUFACTURER};
pub use lock_accessory::LockAccessory;
