// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel shared by a platform and its accessories.

use tokio::sync::broadcast;

use super::AccessoryEvent;

/// Events a slow observer may fall behind by before it starts losing them.
const BACKLOG: usize = 128;

/// Fan-out of [`AccessoryEvent`]s.
///
/// Clones publish into the same channel, so a [`Platform`] hands one clone to
/// every accessory it starts and observers subscribe once on the platform.
/// An observer that falls more than 128 events behind gets
/// `RecvError::Lagged` and resumes with the oldest event still buffered.
///
/// [`Platform`]: crate::platform::Platform
///
/// # Examples
///
/// ```
/// use august_bridge::event::{AccessoryEvent, EventBus};
/// use august_bridge::types::LockId;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(AccessoryEvent::AccessoryRemoved {
///     lock_id: LockId::new("ABC"),
///     name: "Front Door".to_string(),
/// });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AccessoryEvent>,
}

impl EventBus {
    /// Creates a bus with no observers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BACKLOG);
        Self { sender }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccessoryEvent> {
        self.sender.subscribe()
    }

    /// Sends `event` to every current observer. Nobody listening is not an error.
    pub fn publish(&self, event: AccessoryEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(lock = %event.lock_id(), "No observer for accessory event");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
