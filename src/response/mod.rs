// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for August cloud payloads.
//!
//! This module provides structures for deserializing the JSON returned by
//! the August REST API and pushed over the PubNub channel of each lock.

mod lock_details;
mod lock_event;
mod lock_status;

pub use lock_details::{LockDetails, LockSummary};
pub use lock_event::LockEvent;
pub use lock_status::LockStatus;
