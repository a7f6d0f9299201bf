// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State shared by an accessory and its background tasks.
//!
//! Every path that learns something about the lock (poll, push event, user
//! command) ends in [`Shared::apply`], which updates the state, records the
//! context, syncs characteristics and publishes an event.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{AccessorySettings, DeviceLog};
use crate::error::ProtocolError;
use crate::event::{AccessoryEvent, EventBus};
use crate::protocol::LockApi;
use crate::response::{LockDetails, LockEvent, LockStatus};
use crate::state::{AccessoryContext, AccessoryState, StateChange};
use crate::subscription::CallbackRegistry;
use crate::types::{ContactSensorState, LockCurrentState, LockId, LockTargetState};

use super::AccessoryInfo;

pub(crate) struct Shared<A: LockApi> {
    pub(crate) api: Arc<A>,
    pub(crate) lock_id: LockId,
    pub(crate) settings: AccessorySettings,
    pub(crate) log: DeviceLog,
    pub(crate) state_tx: watch::Sender<AccessoryState>,
    pub(crate) context: Mutex<AccessoryContext>,
    pub(crate) info: RwLock<AccessoryInfo>,
    pub(crate) callbacks: CallbackRegistry,
    pub(crate) events: EventBus,
    update_in_progress: AtomicBool,
    /// Serializes refreshes; a tick arriving mid-refresh waits its turn.
    refresh_lock: tokio::sync::Mutex<()>,
    /// Pending post-command confirmation polls.
    confirmations: Mutex<Vec<JoinHandle<()>>>,
}

impl<A: LockApi> Shared<A> {
    pub(crate) fn new(
        api: Arc<A>,
        info: AccessoryInfo,
        settings: AccessorySettings,
        context: AccessoryContext,
        events: EventBus,
    ) -> Self {
        let state = AccessoryState::seeded(&context);
        let (state_tx, _) = watch::channel(state);
        Self {
            api,
            lock_id: info.lock_id.clone(),
            log: DeviceLog::new(info.name.clone(), settings.logging),
            settings,
            state_tx,
            context: Mutex::new(context),
            info: RwLock::new(info),
            callbacks: CallbackRegistry::new(),
            events,
            update_in_progress: AtomicBool::new(false),
            refresh_lock: tokio::sync::Mutex::new(()),
            confirmations: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn state(&self) -> AccessoryState {
        self.state_tx.borrow().clone()
    }

    pub(crate) fn is_update_in_progress(&self) -> bool {
        self.update_in_progress.load(Ordering::SeqCst)
    }

    pub(crate) fn set_update_in_progress(&self, in_progress: bool) {
        self.update_in_progress.store(in_progress, Ordering::SeqCst);
    }

    /// Applies a change and propagates it if anything changed.
    pub(crate) fn apply(&self, change: StateChange) -> bool {
        let changed = self.state_tx.send_if_modified(|state| state.apply(&change));
        if !changed {
            return false;
        }

        let new_state = self.state();
        self.context.lock().record(&new_state);
        self.callbacks.dispatch(&change);
        self.events.publish(AccessoryEvent::StateChanged {
            lock_id: self.lock_id.clone(),
            change,
            new_state,
        });
        true
    }

    // =========================================================================
    // Poll
    // =========================================================================

    /// Fetches the lock details and reconciles the state with them.
    ///
    /// An ambiguous lock state is reported as `Unknown` and triggers exactly
    /// one more fetch; a second ambiguous answer leaves it `Unknown`.
    pub(crate) async fn refresh(&self) -> Result<(), ProtocolError> {
        let _guard = self.refresh_lock.lock().await;

        if self.fetch_and_apply().await? {
            self.log
                .debug("Lock state is ambiguous, refreshing once more");
            if self.fetch_and_apply().await? {
                self.log.debug("Lock state still ambiguous, keeping UNKNOWN");
            }
        }
        Ok(())
    }

    /// Logs a refresh failure; the previous state stays in place.
    pub(crate) async fn refresh_logged(&self, origin: &str) {
        if let Err(e) = self.refresh().await {
            self.log.error(format!("{origin} refresh failed: {e}"));
        }
    }

    /// Returns `true` if the lock state was ambiguous.
    async fn fetch_and_apply(&self) -> Result<bool, ProtocolError> {
        let details = self.api.details(&self.lock_id).await?;
        self.log.debug(format!("lockDetails (refreshStatus): {details:?}"));

        let (change, ambiguous) = self.reconcile(&details);
        self.apply(change);
        Ok(ambiguous)
    }

    fn reconcile(&self, details: &LockDetails) -> (StateChange, bool) {
        let simple = details
            .lock_status
            .as_ref()
            .map(LockStatus::simple_state)
            .unwrap_or_default();

        let mut changes = Vec::new();
        let mut ambiguous = false;

        if !self.settings.hide_lock {
            let current = LockCurrentState::from_simple_state(&simple);
            ambiguous = current == LockCurrentState::Unknown;
            changes.push(self.observed_lock(current));
        }

        if let Some(level) = details.battery_level() {
            self.log.debug(format!(
                "BatteryLevel: {}, StatusLowBattery: {}",
                level.value(),
                level.status().hap_value()
            ));
            changes.push(StateChange::battery(level));
        }

        if let Some(firmware) = details.firmware_version.as_deref() {
            self.note_firmware(firmware);
            changes.push(StateChange::firmware(firmware));
        }

        if !self.settings.hide_contact_sensor {
            match ContactSensorState::from_simple_state(&simple) {
                Some(contact) => {
                    self.log
                        .debug(format!("ContactSensorState: {}", contact.hap_value()));
                    changes.push(StateChange::contact(contact));
                }
                None => self.log.error(format!(
                    "doorState: {:?}, closed: {}, open: {}",
                    details.lock_status.as_ref().and_then(|s| s.door_state.as_deref()),
                    simple.closed,
                    simple.open
                )),
            }
        }

        {
            let mut info = self.info.write();
            if details.sku_number.is_some() {
                info.model.clone_from(&details.sku_number);
            }
            if details.serial_number.is_some() {
                info.serial_number.clone_from(&details.serial_number);
            }
        }

        (StateChange::batch(changes), ambiguous)
    }

    /// A settled bolt also settles the target, so HomeKit does not wait for
    /// a position it will never reach. A pending command keeps its target.
    fn observed_lock(&self, current: LockCurrentState) -> StateChange {
        if self.is_update_in_progress() {
            return StateChange::lock_current(current);
        }
        StateChange::settled(current).unwrap_or_else(|| StateChange::lock_current(current))
    }

    fn note_firmware(&self, firmware: &str) {
        let known = self.context.lock().firmware_version.clone();
        if known.as_deref() == Some(firmware) {
            return;
        }
        self.log.warn(format!(
            "Firmware Version changed to Current Firmware Version: {firmware}"
        ));
        self.info.write().firmware_revision = Some(firmware.to_string());
        self.context.lock().firmware_version = Some(firmware.to_string());
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Sends the latest target to the lock. Failures are logged only.
    pub(crate) async fn push_changes(&self) {
        if self.settings.hide_lock {
            self.log.debug("Lock service hidden, not sending command");
            return;
        }

        let target = self.state().lock_target();
        let result = match target {
            LockTargetState::Unsecured => {
                self.log.debug_warn(format!(
                    "Sending request to August API: Unlock ({})",
                    target.hap_value()
                ));
                self.api.unlock(&self.lock_id).await
            }
            LockTargetState::Secured => {
                self.log.debug_warn(format!(
                    "Sending request to August API: Lock ({})",
                    target.hap_value()
                ));
                self.api.lock(&self.lock_id).await
            }
        };

        match result {
            Ok(status) => self
                .log
                .debug_warn(format!("(pushChanges) lockStatus: {status:?}")),
            Err(e) => self.log.error(format!("failed pushChanges: {e}")),
        }
    }

    /// Schedules the single confirmation poll that follows a command burst.
    ///
    /// The poll waits for the confirmation delay, then keeps waiting in
    /// steps of that delay while another burst is in progress.
    pub(crate) fn schedule_confirmation(self: &Arc<Self>) {
        let shared = Arc::clone(self);
        let delay = confirmation_step(self.settings.confirm_delay);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(delay).await;
                if !shared.is_update_in_progress() {
                    break;
                }
            }
            shared.refresh_logged("Confirmation").await;
        });

        let mut confirmations = self.confirmations.lock();
        confirmations.retain(|h| !h.is_finished());
        confirmations.push(handle);
    }

    pub(crate) fn abort_confirmations(&self) {
        for handle in self.confirmations.lock().drain(..) {
            handle.abort();
        }
    }

    // =========================================================================
    // Push events
    // =========================================================================

    /// Applies a pushed event.
    ///
    /// Visible parts without matching information fall back to one full
    /// refresh.
    pub(crate) async fn handle_push(&self, event: LockEvent) {
        self.log.debug(format!(
            "AugustEvent: {:?}, {}",
            event.state, event.timestamp
        ));

        let mut changes = Vec::new();
        let mut needs_refresh = false;

        if !self.settings.hide_lock {
            match pushed_lock_state(&event) {
                Some(current) => {
                    let known = self.context.lock().lock_current_state;
                    if known != Some(current)
                        && let Some(verb) = current.transition_verb()
                    {
                        self.log_transition(verb);
                    }
                    changes.push(self.observed_lock(current));
                }
                None => needs_refresh = true,
            }
        }

        if !self.settings.hide_contact_sensor {
            match ContactSensorState::from_simple_state(&event.state) {
                Some(contact) => {
                    self.log
                        .debug(format!("ContactSensorState: {}", contact.hap_value()));
                    let known = self.context.lock().contact_sensor_state;
                    if known != Some(contact) {
                        self.log_transition(contact.transition_verb());
                    }
                    changes.push(StateChange::contact(contact));
                }
                None => needs_refresh = true,
            }
        }

        if !changes.is_empty() {
            self.apply(StateChange::batch(changes));
        }

        if needs_refresh {
            self.refresh_logged("Push fallback").await;
        }
    }

    fn log_transition(&self, verb: &'static str) {
        let name = self.log.name().to_string();
        self.log.info(format!("Lock: {name} was {verb}"));
        self.events.publish(AccessoryEvent::TransitionLogged {
            lock_id: self.lock_id.clone(),
            name,
            verb,
        });
    }
}

/// Unlocked wins when both flags are set.
fn pushed_lock_state(event: &LockEvent) -> Option<LockCurrentState> {
    if event.state.unlocked {
        Some(LockCurrentState::Unsecured)
    } else if event.state.locked {
        Some(LockCurrentState::Secured)
    } else {
        None
    }
}

/// A zero delay would spin while a burst is in progress.
fn confirmation_step(delay: Duration) -> Duration {
    delay.max(Duration::from_millis(10))
}
