// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory August cloud shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use august_bridge::ProtocolError;
use august_bridge::protocol::LockApi;
use august_bridge::response::{LockDetails, LockEvent, LockStatus, LockSummary};
use august_bridge::types::{LockId, SimpleState};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Scripted lock account.
///
/// Each lock answers `details` with whatever the test last stored for it.
#[derive(Default)]
pub struct MockApi {
    locks: Mutex<Vec<LockDetails>>,
    failing_details: Mutex<Vec<String>>,
    push_senders: Mutex<HashMap<String, mpsc::Sender<LockEvent>>>,
    pub details_calls: AtomicUsize,
    pub lock_calls: AtomicUsize,
    pub unlock_calls: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub fail_listing: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

impl MockApi {
    pub fn with_locks(locks: Vec<LockDetails>) -> Self {
        Self {
            locks: Mutex::new(locks),
            ..Self::default()
        }
    }

    pub fn with_lock(details: LockDetails) -> Self {
        Self::with_locks(vec![details])
    }

    /// Replaces the stored status of a lock.
    pub fn set_status(&self, lock_id: &str, status: Option<&str>, door: Option<&str>) {
        self.update(lock_id, |details| {
            details.lock_status = Some(LockStatus {
                status: status.map(str::to_string),
                door_state: door.map(str::to_string),
                ..LockStatus::default()
            });
        });
    }

    pub fn set_battery(&self, lock_id: &str, fraction: f64) {
        self.update(lock_id, |details| details.battery = Some(fraction));
    }

    pub fn set_firmware(&self, lock_id: &str, firmware: &str) {
        self.update(lock_id, |details| {
            details.firmware_version = Some(firmware.to_string());
        });
    }

    /// Makes every lock and unlock call take `delay` before answering.
    pub fn delay_writes(&self, delay: Duration) {
        *self.write_delay.lock() = Some(delay);
    }

    async fn write_latency(&self) {
        let delay = *self.write_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn fail_details_for(&self, lock_id: &str) {
        self.failing_details.lock().push(lock_id.to_string());
    }

    pub fn details_calls(&self) -> usize {
        self.details_calls.load(Ordering::SeqCst)
    }

    pub fn lock_calls(&self) -> usize {
        self.lock_calls.load(Ordering::SeqCst)
    }

    pub fn unlock_calls(&self) -> usize {
        self.unlock_calls.load(Ordering::SeqCst)
    }

    pub fn has_subscriber(&self, lock_id: &str) -> bool {
        self.push_senders.lock().contains_key(lock_id)
    }

    /// Delivers a push event to the lock's subscriber.
    pub async fn push(&self, lock_id: &str, state: SimpleState) {
        let sender = self
            .push_senders
            .lock()
            .get(lock_id)
            .cloned()
            .expect("lock has no push subscriber");
        sender.send(LockEvent::new(state)).await.unwrap();
    }

    fn update(&self, lock_id: &str, f: impl FnOnce(&mut LockDetails)) {
        let mut locks = self.locks.lock();
        let details = locks
            .iter_mut()
            .find(|d| d.lock_id.as_str() == lock_id)
            .expect("unknown lock");
        f(details);
    }
}

impl LockApi for MockApi {
    async fn locks(&self) -> Result<Vec<LockSummary>, ProtocolError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ProtocolError::AuthenticationFailed);
        }
        Ok(self
            .locks
            .lock()
            .iter()
            .map(|d| LockSummary {
                lock_id: d.lock_id.clone(),
                lock_name: d.lock_name.clone(),
                house_id: d.house_id.clone(),
                house_name: d.house_name.clone(),
                user_type: Some("superuser".to_string()),
            })
            .collect())
    }

    async fn details(&self, lock_id: &LockId) -> Result<LockDetails, ProtocolError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_details
            .lock()
            .iter()
            .any(|id| id == lock_id.as_str())
        {
            return Err(ProtocolError::ConnectionFailed("HTTP 503".to_string()));
        }
        self.locks
            .lock()
            .iter()
            .find(|d| d.lock_id.matches(lock_id))
            .cloned()
            .ok_or_else(|| ProtocolError::ConnectionFailed("HTTP 404".to_string()))
    }

    async fn status(&self, lock_id: &LockId) -> Result<LockStatus, ProtocolError> {
        let details = self.details(lock_id).await?;
        Ok(details.lock_status.unwrap_or_default())
    }

    async fn lock(&self, _lock_id: &LockId) -> Result<LockStatus, ProtocolError> {
        self.lock_calls.fetch_add(1, Ordering::SeqCst);
        self.write_latency().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProtocolError::ConnectionFailed("HTTP 502".to_string()));
        }
        Ok(LockStatus {
            status: Some("kAugLockState_Locked".to_string()),
            ..LockStatus::default()
        })
    }

    async fn unlock(&self, _lock_id: &LockId) -> Result<LockStatus, ProtocolError> {
        self.unlock_calls.fetch_add(1, Ordering::SeqCst);
        self.write_latency().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProtocolError::ConnectionFailed("HTTP 502".to_string()));
        }
        Ok(LockStatus {
            status: Some("kAugLockState_Unlocked".to_string()),
            ..LockStatus::default()
        })
    }

    async fn subscribe(
        &self,
        lock_id: &LockId,
        _channel: &str,
    ) -> Result<mpsc::Receiver<LockEvent>, ProtocolError> {
        let (tx, rx) = mpsc::channel(16);
        self.push_senders
            .lock()
            .insert(lock_id.as_str().to_string(), tx);
        Ok(rx)
    }
}

/// Details of a locked lock with a closed door.
pub fn lock_details(id: &str, name: &str) -> LockDetails {
    LockDetails {
        lock_name: name.to_string(),
        lock_id: LockId::new(id),
        house_id: Some("house-1".to_string()),
        house_name: Some("Home".to_string()),
        battery: Some(0.8),
        firmware_version: Some("1.1.12".to_string()),
        sku_number: Some("AUG-SL03".to_string()),
        serial_number: Some(format!("SN-{id}")),
        pubsub_channel: Some(format!("chan-{id}")),
        lock_status: Some(LockStatus {
            status: Some("kAugLockState_Locked".to_string()),
            door_state: Some("kAugDoorState_Closed".to_string()),
            ..LockStatus::default()
        }),
    }
}

pub fn locked_closed() -> SimpleState {
    SimpleState {
        locked: true,
        closed: true,
        ..SimpleState::default()
    }
}

pub fn unlocked_open() -> SimpleState {
    SimpleState {
        unlocked: true,
        open: true,
        ..SimpleState::default()
    }
}

pub fn door_only(open: bool) -> SimpleState {
    SimpleState {
        open,
        closed: !open,
        ..SimpleState::default()
    }
}
