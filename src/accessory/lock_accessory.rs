// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The lock accessory and its background tasks.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::{AccessorySettings, MIN_POLL_PERIOD};
use crate::error::Error;
use crate::event::EventBus;
use crate::protocol::LockApi;
use crate::response::{LockDetails, LockEvent};
use crate::state::{AccessoryContext, AccessoryState, StateChange};
use crate::subscription::{Subscribable, SubscriptionId};
use crate::types::{
    BatteryLevel, ContactSensorState, LockCurrentState, LockId, LockTargetState,
    StatusLowBattery,
};

use super::info::MANUFACTURER;
use super::shared::Shared;
use super::AccessoryInfo;

/// One August lock exposed as a HomeKit accessory.
///
/// The accessory owns three background tasks once started:
///
/// - a **poll loop** refreshing the state every `refresh_rate`, skipping
///   ticks while a command burst is in progress;
/// - a **command debouncer** collapsing target changes that arrive within
///   `push_rate` of each other into a single lock/unlock call, followed by
///   one confirmation poll;
/// - a **push subscriber** applying vendor events as they arrive.
///
/// Dropping the accessory (or calling [`shutdown`](Self::shutdown)) aborts
/// them.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use august_bridge::accessory::LockAccessory;
/// use august_bridge::config::AccessorySettings;
/// use august_bridge::protocol::{ApiConfig, HttpClient, LockApi};
/// use august_bridge::state::AccessoryContext;
/// use august_bridge::types::{LockId, LockTargetState};
///
/// # async fn example() -> august_bridge::Result<()> {
/// let api = Arc::new(HttpClient::new(ApiConfig::new().with_access_token("token"))?);
/// let details = api.details(&LockId::new("ABC123")).await?;
///
/// let accessory = LockAccessory::new(
///     api,
///     &details,
///     AccessorySettings::default(),
///     AccessoryContext::default(),
/// );
/// accessory.start().await;
///
/// accessory.set_lock_target_state(LockTargetState::Unsecured)?;
/// # Ok(())
/// # }
/// ```
pub struct LockAccessory<A: LockApi> {
    shared: Arc<Shared<A>>,
    pubsub_channel: Option<String>,
    command_tx: mpsc::UnboundedSender<()>,
    command_rx: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<A: LockApi> LockAccessory<A> {
    /// Creates an accessory with its own event bus.
    ///
    /// The state is seeded from `context` until [`start`](Self::start)
    /// fetches the live values.
    #[must_use]
    pub fn new(
        api: Arc<A>,
        details: &LockDetails,
        settings: AccessorySettings,
        context: AccessoryContext,
    ) -> Self {
        Self::with_event_bus(api, details, settings, context, EventBus::new())
    }

    /// Creates an accessory publishing on a shared event bus.
    #[must_use]
    pub fn with_event_bus(
        api: Arc<A>,
        details: &LockDetails,
        settings: AccessorySettings,
        mut context: AccessoryContext,
        events: EventBus,
    ) -> Self {
        context.lock_id = Some(details.lock_id.clone());
        context.model.clone_from(&details.sku_number);
        context.serial_number.clone_from(&details.serial_number);
        if context.firmware_version.is_none() {
            context.firmware_version.clone_from(&details.firmware_version);
        }
        context.refresh_rate = Some(settings.refresh_rate.as_secs());
        context.logging = Some(settings.logging);

        let info = AccessoryInfo {
            name: details.lock_name.clone(),
            lock_id: details.lock_id.clone(),
            manufacturer: MANUFACTURER,
            model: details.sku_number.clone(),
            serial_number: details.serial_number.clone(),
            firmware_revision: context.firmware_version.clone(),
            lock_service: !settings.hide_lock,
            contact_sensor_service: !settings.hide_contact_sensor,
        };

        let shared = Shared::new(api, info, settings, context, events);
        shared.log.debug_warn(format!(
            "Using {} logging, refresh rate {}s",
            shared.settings.logging,
            shared.settings.refresh_rate.as_secs()
        ));
        if shared.settings.hide_lock {
            shared.log.warn("Removing Lock Mechanism Service");
        }
        if shared.settings.hide_contact_sensor {
            shared.log.warn("Removing Contact Sensor Service");
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(shared),
            pubsub_channel: details.pubsub_channel.clone(),
            command_tx,
            command_rx: Mutex::new(Some(command_rx)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Performs the initial refresh, then starts the background tasks.
    ///
    /// A failed initial refresh is logged and the seeded state kept. Calling
    /// `start` again has no effect.
    pub async fn start(&self) {
        let Some(command_rx) = self.command_rx.lock().take() else {
            self.shared.log.debug("Accessory already started");
            return;
        };

        self.shared.refresh_logged("Initial").await;

        let push_rx = self.subscribe_push().await;

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(run_poll(Arc::clone(&self.shared))));
        tasks.push(tokio::spawn(run_debounce(
            Arc::clone(&self.shared),
            command_rx,
        )));
        if let Some(push_rx) = push_rx {
            tasks.push(tokio::spawn(run_subscriber(
                Arc::clone(&self.shared),
                push_rx,
            )));
        }
    }

    async fn subscribe_push(&self) -> Option<mpsc::Receiver<LockEvent>> {
        let Some(channel) = self.pubsub_channel.as_deref() else {
            self.shared
                .log
                .warn("No push channel for this lock, relying on polling");
            return None;
        };

        match self.shared.api.subscribe(&self.shared.lock_id, channel).await {
            Ok(rx) => Some(rx),
            Err(e) => {
                self.shared
                    .log
                    .error(format!("Push subscription failed: {e}"));
                None
            }
        }
    }

    /// Stops every background task, including pending confirmation polls.
    pub fn shutdown(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            task.abort();
        }
        self.shared.abort_confirmations();
        self.shared.set_update_in_progress(false);
        self.shared.log.debug("Accessory stopped");
    }

    /// Returns `true` while the background tasks run.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.tasks.lock().is_empty()
    }

    // =========================================================================
    // State access
    // =========================================================================

    #[must_use]
    pub fn lock_id(&self) -> &LockId {
        &self.shared.lock_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.shared.info.read().name.clone()
    }

    /// Returns the current characteristic values.
    #[must_use]
    pub fn state(&self) -> AccessoryState {
        self.shared.state()
    }

    /// Returns a receiver that observes every state update.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<AccessoryState> {
        self.shared.state_tx.subscribe()
    }

    /// Returns a copy of the context to persist.
    #[must_use]
    pub fn context(&self) -> AccessoryContext {
        self.shared.context.lock().clone()
    }

    /// Returns the accessory information values.
    #[must_use]
    pub fn info(&self) -> AccessoryInfo {
        self.shared.info.read().clone()
    }

    #[must_use]
    pub fn settings(&self) -> &AccessorySettings {
        &self.shared.settings
    }

    /// Returns the event bus the accessory publishes on.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Returns `true` between a target change and the end of its push.
    #[must_use]
    pub fn is_update_in_progress(&self) -> bool {
        self.shared.is_update_in_progress()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Refreshes the state from the vendor now.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the details cannot be fetched; the state
    /// is left unchanged.
    pub async fn refresh(&self) -> Result<(), Error> {
        self.shared.refresh().await.map_err(Error::from)
    }

    /// Handles a HomeKit write of `LockTargetState`.
    ///
    /// The target is applied optimistically; the vendor call happens once no
    /// further target arrives for `push_rate`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotStarted` if the accessory is not running.
    pub fn set_lock_target_state(&self, target: LockTargetState) -> Result<(), Error> {
        if !self.is_running() {
            return Err(Error::NotStarted);
        }

        self.shared
            .log
            .debug(format!("Set LockTargetState: {}", target.hap_value()));
        self.shared.apply(StateChange::lock_target(target));
        self.shared.context.lock().lock_target_state = Some(target);
        self.shared.set_update_in_progress(true);
        self.command_tx.send(()).map_err(|_| Error::NotStarted)
    }
}

impl<A: LockApi> Drop for LockAccessory<A> {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
        self.shared.abort_confirmations();
    }
}

impl<A: LockApi> std::fmt::Debug for LockAccessory<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockAccessory")
            .field("lock_id", &self.shared.lock_id)
            .field("running", &self.is_running())
            .field("update_in_progress", &self.is_update_in_progress())
            .finish_non_exhaustive()
    }
}

impl<A: LockApi> Subscribable for LockAccessory<A> {
    fn on_lock_current_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(LockCurrentState) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_lock_current_state_changed(callback)
    }

    fn on_lock_target_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(LockTargetState) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_lock_target_state_changed(callback)
    }

    fn on_contact_sensor_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ContactSensorState) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_contact_sensor_changed(callback)
    }

    fn on_battery_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(BatteryLevel, StatusLowBattery) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_battery_changed(callback)
    }

    fn on_firmware_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_firmware_changed(callback)
    }

    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.shared.callbacks.on_state_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.callbacks.unsubscribe(id)
    }
}

// =============================================================================
// Background tasks
// =============================================================================

async fn run_poll<A: LockApi>(shared: Arc<Shared<A>>) {
    let mut ticker = tokio::time::interval(shared.settings.refresh_rate.max(MIN_POLL_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; start() already refreshed.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if shared.is_update_in_progress() {
            shared.log.debug("Update in progress, skipping poll");
            continue;
        }
        shared.refresh_logged("Poll").await;
    }
}

async fn run_debounce<A: LockApi>(
    shared: Arc<Shared<A>>,
    mut commands: mpsc::UnboundedReceiver<()>,
) {
    while commands.recv().await.is_some() {
        shared.set_update_in_progress(true);

        // Every signal within the window restarts it.
        loop {
            match tokio::time::timeout(shared.settings.push_rate, commands.recv()).await {
                Ok(Some(())) => {}
                Ok(None) => return,
                Err(_) => break,
            }
        }

        shared.push_changes().await;
        shared.schedule_confirmation();
        // A signal queued during the write opens the next burst at once.
        if commands.is_empty() {
            shared.set_update_in_progress(false);
        }
    }
}

async fn run_subscriber<A: LockApi>(
    shared: Arc<Shared<A>>,
    mut events: mpsc::Receiver<LockEvent>,
) {
    while let Some(event) = events.recv().await {
        shared.handle_push(event).await;
    }
    shared.log.debug("Push event stream ended");
}
