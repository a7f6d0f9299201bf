// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory state management types.
//!
//! [`AccessoryState`] holds the characteristic values of a lock accessory,
//! [`StateChange`] represents individual changes that can be applied to it,
//! and [`AccessoryContext`] is what survives a restart.
//!
//! # Examples
//!
//! ```
//! use august_bridge::state::{AccessoryContext, AccessoryState, StateChange};
//! use august_bridge::types::LockCurrentState;
//!
//! let mut context = AccessoryContext::default();
//! let mut state = AccessoryState::seeded(&context);
//!
//! state.apply(&StateChange::lock_current(LockCurrentState::Unsecured));
//! context.record(&state);
//!
//! assert_eq!(context.lock_current_state, Some(LockCurrentState::Unsecured));
//! ```

mod accessory_state;
mod context;
mod state_change;

pub use accessory_state::AccessoryState;
pub use context::AccessoryContext;
pub use state_change::StateChange;
