// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessory event types.

use crate::state::{AccessoryState, StateChange};
use crate::types::LockId;

/// Events emitted by the platform and its accessories.
///
/// # Examples
///
/// ```
/// use august_bridge::event::AccessoryEvent;
/// use august_bridge::types::LockId;
///
/// let event = AccessoryEvent::AccessoryRemoved {
///     lock_id: LockId::new("ABC"),
///     name: "Front Door".to_string(),
/// };
/// assert!(event.is_lifecycle());
/// assert_eq!(event.lock_id().as_str(), "ABC");
/// ```
#[derive(Debug, Clone)]
pub enum AccessoryEvent {
    /// A new accessory was created for a discovered lock.
    AccessoryAdded {
        lock_id: LockId,
        name: String,
        /// Published as an external accessory rather than through the bridge.
        external: bool,
    },

    /// A cached accessory was matched to a discovered lock and restarted.
    AccessoryRestored { lock_id: LockId, name: String },

    /// An accessory was unregistered.
    AccessoryRemoved { lock_id: LockId, name: String },

    /// Accessory state changed.
    ///
    /// Emitted for every change that altered the state, whatever its source.
    StateChanged {
        lock_id: LockId,
        /// The specific change that occurred.
        change: StateChange,
        /// The complete new state.
        new_state: AccessoryState,
    },

    /// A push event moved the lock or the door to a new position.
    ///
    /// `verb` is one of `Locked`, `Unlocked`, `Opened`, `Closed`.
    TransitionLogged {
        lock_id: LockId,
        name: String,
        verb: &'static str,
    },
}

impl AccessoryEvent {
    /// Returns the lock ID associated with this event.
    #[must_use]
    pub fn lock_id(&self) -> &LockId {
        match self {
            Self::AccessoryAdded { lock_id, .. }
            | Self::AccessoryRestored { lock_id, .. }
            | Self::AccessoryRemoved { lock_id, .. }
            | Self::StateChanged { lock_id, .. }
            | Self::TransitionLogged { lock_id, .. } => lock_id,
        }
    }

    /// Returns `true` for added, restored and removed events.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::AccessoryAdded { .. }
                | Self::AccessoryRestored { .. }
                | Self::AccessoryRemoved { .. }
        )
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }
}
