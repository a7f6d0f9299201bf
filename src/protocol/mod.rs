// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor API access.
//!
//! The reconciliation logic only talks to the August cloud through the
//! [`LockApi`] trait, so it can run against the real REST client or against
//! an in-memory implementation in tests.
//!
//! # Implementations
//!
//! - [`HttpClient`]: the August REST API, with push events delivered over the
//!   PubNub long-poll endpoint

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
mod pubnub;

#[cfg(feature = "http")]
pub use http::{ApiConfig, HttpClient};

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::ProtocolError;
use crate::response::{LockDetails, LockEvent, LockStatus, LockSummary};
use crate::types::LockId;

/// Operations the bridge needs from the August cloud.
///
/// All futures must be `Send` because accessories drive them from spawned
/// tasks.
pub trait LockApi: Send + Sync + 'static {
    /// Lists the locks visible to the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn locks(&self) -> impl Future<Output = Result<Vec<LockSummary>, ProtocolError>> + Send;

    /// Fetches the full details of a lock, including its last known status
    /// and battery level.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn details(
        &self,
        lock_id: &LockId,
    ) -> impl Future<Output = Result<LockDetails, ProtocolError>> + Send;

    /// Fetches only the lock and door status.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn status(
        &self,
        lock_id: &LockId,
    ) -> impl Future<Output = Result<LockStatus, ProtocolError>> + Send;

    /// Throws the bolt.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn lock(&self, lock_id: &LockId)
    -> impl Future<Output = Result<LockStatus, ProtocolError>> + Send;

    /// Retracts the bolt.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    fn unlock(
        &self,
        lock_id: &LockId,
    ) -> impl Future<Output = Result<LockStatus, ProtocolError>> + Send;

    /// Subscribes to push events of a lock.
    ///
    /// Events are delivered until the returned receiver is dropped.
    ///
    /// # Arguments
    ///
    /// * `lock_id` - The lock the events belong to
    /// * `channel` - The lock's push channel (`pubsubChannel` in the details)
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the subscription cannot be set up.
    fn subscribe(
        &self,
        lock_id: &LockId,
        channel: &str,
    ) -> impl Future<Output = Result<mpsc::Receiver<LockEvent>, ProtocolError>> + Send;
}
