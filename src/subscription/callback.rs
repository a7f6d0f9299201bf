// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for characteristic updates.
//!
//! This module provides the core types for managing subscription callbacks:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::StateChange;
use crate::types::{
    BatteryLevel, ContactSensorState, LockCurrentState, LockTargetState, StatusLowBattery,
};

/// Unique identifier for a subscription.
///
/// IDs are unique within an accessory's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type LockCurrentCallback = Arc<dyn Fn(LockCurrentState) + Send + Sync>;
type LockTargetCallback = Arc<dyn Fn(LockTargetState) + Send + Sync>;
type ContactCallback = Arc<dyn Fn(ContactSensorState) + Send + Sync>;
type BatteryCallback = Arc<dyn Fn(BatteryLevel, StatusLowBattery) + Send + Sync>;
type FirmwareCallback = Arc<dyn Fn(&str) + Send + Sync>;
type StateChangedCallback = Arc<dyn Fn(&StateChange) + Send + Sync>;

/// Registry for characteristic callbacks of one accessory.
///
/// This is how state reaches the HomeKit side: every applied
/// [`StateChange`] is dispatched here, and the host pushes the new values to
/// the matching characteristics.
///
/// # Thread Safety
///
/// The registry uses `parking_lot::RwLock` internally and can be shared
/// between tasks. Callbacks run synchronously on the dispatching task and
/// must not register or remove callbacks themselves.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    lock_current_callbacks: RwLock<HashMap<SubscriptionId, LockCurrentCallback>>,
    lock_target_callbacks: RwLock<HashMap<SubscriptionId, LockTargetCallback>>,
    contact_callbacks: RwLock<HashMap<SubscriptionId, ContactCallback>>,
    battery_callbacks: RwLock<HashMap<SubscriptionId, BatteryCallback>>,
    firmware_callbacks: RwLock<HashMap<SubscriptionId, FirmwareCallback>>,
    state_changed_callbacks: RwLock<HashMap<SubscriptionId, StateChangedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            lock_current_callbacks: RwLock::new(HashMap::new()),
            lock_target_callbacks: RwLock::new(HashMap::new()),
            contact_callbacks: RwLock::new(HashMap::new()),
            battery_callbacks: RwLock::new(HashMap::new()),
            firmware_callbacks: RwLock::new(HashMap::new()),
            state_changed_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for `LockCurrentState` updates.
    pub fn on_lock_current_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(LockCurrentState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lock_current_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for `LockTargetState` updates.
    pub fn on_lock_target_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(LockTargetState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.lock_target_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for `ContactSensorState` updates.
    pub fn on_contact_sensor_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ContactSensorState) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.contact_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for battery updates.
    ///
    /// The callback receives the level and the derived low battery status.
    pub fn on_battery_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(BatteryLevel, StatusLowBattery) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.battery_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for firmware revision updates.
    pub fn on_firmware_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.firmware_callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for all state changes.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock_current_callbacks.write().remove(&id).is_some()
            || self.lock_target_callbacks.write().remove(&id).is_some()
            || self.contact_callbacks.write().remove(&id).is_some()
            || self.battery_callbacks.write().remove(&id).is_some()
            || self.firmware_callbacks.write().remove(&id).is_some()
            || self.state_changed_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.lock_current_callbacks.write().clear();
        self.lock_target_callbacks.write().clear();
        self.contact_callbacks.write().clear();
        self.battery_callbacks.write().clear();
        self.firmware_callbacks.write().clear();
        self.state_changed_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches a state change to the relevant callbacks.
    ///
    /// Generic callbacks receive the change as a whole; batches are then
    /// flattened for the characteristic callbacks.
    pub fn dispatch(&self, change: &StateChange) {
        {
            let callbacks = self.state_changed_callbacks.read();
            for callback in callbacks.values() {
                callback(change);
            }
        }
        self.dispatch_characteristics(change);
    }

    fn dispatch_characteristics(&self, change: &StateChange) {
        match change {
            StateChange::LockCurrent(state) => {
                for callback in self.lock_current_callbacks.read().values() {
                    callback(*state);
                }
            }
            StateChange::LockTarget(state) => {
                for callback in self.lock_target_callbacks.read().values() {
                    callback(*state);
                }
            }
            StateChange::Contact(state) => {
                for callback in self.contact_callbacks.read().values() {
                    callback(*state);
                }
            }
            StateChange::Battery(level) => {
                let status = StatusLowBattery::for_level(*level);
                for callback in self.battery_callbacks.read().values() {
                    callback(*level, status);
                }
            }
            StateChange::Firmware(version) => {
                for callback in self.firmware_callbacks.read().values() {
                    callback(version);
                }
            }
            StateChange::Batch(changes) => {
                for nested in changes {
                    self.dispatch_characteristics(nested);
                }
            }
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.lock_current_callbacks.read().len()
            + self.lock_target_callbacks.read().len()
            + self.contact_callbacks.read().len()
            + self.battery_callbacks.read().len()
            + self.firmware_callbacks.read().len()
            + self.state_changed_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
