// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for accessories that report characteristic updates.

use crate::state::StateChange;
use crate::subscription::SubscriptionId;
use crate::types::{
    BatteryLevel, ContactSensorState, LockCurrentState, LockTargetState, StatusLowBattery,
};

/// Trait for types that push characteristic updates to subscribers.
///
/// Callbacks fire after the accessory state has been updated, whatever the
/// source: poll, push event or user command. They only fire for values that
/// actually changed.
///
/// # Examples
///
/// ```no_run
/// use august_bridge::accessory::LockAccessory;
/// use august_bridge::protocol::HttpClient;
/// use august_bridge::subscription::Subscribable;
///
/// fn wire(accessory: &LockAccessory<HttpClient>) {
///     let sub_id = accessory.on_lock_current_state_changed(|state| {
///         println!("LockCurrentState = {}", state.hap_value());
///     });
///
///     accessory.on_contact_sensor_changed(|state| {
///         println!("ContactSensorState = {}", state.hap_value());
///     });
///
///     // Unsubscribe when no longer needed
///     accessory.unsubscribe(sub_id);
/// }
/// ```
pub trait Subscribable {
    /// Subscribes to `LockCurrentState` updates.
    fn on_lock_current_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(LockCurrentState) + Send + Sync + 'static;

    /// Subscribes to `LockTargetState` updates.
    fn on_lock_target_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(LockTargetState) + Send + Sync + 'static;

    /// Subscribes to `ContactSensorState` updates.
    fn on_contact_sensor_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ContactSensorState) + Send + Sync + 'static;

    /// Subscribes to `BatteryLevel` and `StatusLowBattery` updates.
    fn on_battery_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(BatteryLevel, StatusLowBattery) + Send + Sync + 'static;

    /// Subscribes to `FirmwareRevision` updates.
    fn on_firmware_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static;

    /// Subscribes to all state changes.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
