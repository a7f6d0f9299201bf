// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push events over the PubNub HTTP long-poll subscribe endpoint.
//!
//! Each lock publishes its state changes on its own PubNub channel. A
//! background task keeps a long-poll request open against
//! `/v2/subscribe/{sub_key}/{channel}/0`, advancing the timetoken after every
//! response, and forwards decoded payloads as [`LockEvent`]s.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::error::ProtocolError;
use crate::response::{LockEvent, LockStatus};
use crate::types::LockId;

/// The server holds a subscribe request for up to 280 seconds.
const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(310);

/// Pause before resubscribing after a failed long-poll.
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// Buffered events per subscription.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Shared settings of every PubNub subscription opened by one client.
#[derive(Debug, Clone)]
pub(crate) struct PubNubSubscription {
    client: Client,
    origin: String,
    subscribe_key: String,
    uuid: String,
}

impl PubNubSubscription {
    pub(crate) fn new(origin: String, subscribe_key: String) -> Result<Self, ProtocolError> {
        let client = Client::builder()
            .timeout(LONG_POLL_TIMEOUT)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            client,
            origin,
            subscribe_key,
            uuid: uuid::Uuid::new_v4().to_string(),
        })
    }

    fn subscribe_url(&self, channel: &str, cursor: &Cursor) -> String {
        let mut url = format!(
            "{}/v2/subscribe/{}/{}/0?tt={}&uuid={}",
            self.origin,
            urlencoding::encode(&self.subscribe_key),
            urlencoding::encode(channel),
            urlencoding::encode(&cursor.timetoken),
            urlencoding::encode(&self.uuid),
        );
        if let Some(region) = cursor.region {
            url.push_str(&format!("&tr={region}"));
        }
        url
    }

    async fn poll(&self, channel: &str, cursor: &Cursor) -> Result<Envelope, ProtocolError> {
        let response = self
            .client
            .get(self.subscribe_url(channel, cursor))
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "PubNub HTTP {}",
                response.status().as_u16()
            )));
        }

        let body = response.text().await.map_err(ProtocolError::Http)?;
        serde_json::from_str(&body).map_err(|e| ProtocolError::InvalidResponse(e.into()))
    }
}

/// Position in the channel history.
#[derive(Debug, Clone)]
struct Cursor {
    timetoken: String,
    region: Option<u32>,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            timetoken: "0".to_string(),
            region: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    t: TimetokenInfo,
    #[serde(default)]
    m: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct TimetokenInfo {
    t: String,
    #[serde(default)]
    r: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Message {
    d: serde_json::Value,
    #[serde(default)]
    p: Option<TimetokenInfo>,
}

/// Converts a PubNub timetoken (100 ns ticks since the epoch) to a UTC time.
fn timetoken_to_datetime(timetoken: &str) -> Option<DateTime<Utc>> {
    let ticks: i64 = timetoken.parse().ok()?;
    let secs = ticks / 10_000_000;
    // Safe: the remainder is below 10^7, so the product stays below 10^9
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let nanos = ((ticks % 10_000_000) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// Spawns the long-poll loop for one channel and returns its event stream.
///
/// The loop stops once the receiver is dropped.
pub(crate) fn spawn_subscriber(
    subscription: PubNubSubscription,
    lock_id: LockId,
    channel: String,
) -> mpsc::Receiver<LockEvent> {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut cursor = Cursor::default();

        loop {
            let result = tokio::select! {
                () = tx.closed() => break,
                result = subscription.poll(&channel, &cursor) => result,
            };

            match result {
                Ok(envelope) => {
                    cursor = Cursor {
                        timetoken: envelope.t.t,
                        region: envelope.t.r,
                    };

                    for message in envelope.m {
                        let status: LockStatus = match serde_json::from_value(message.d) {
                            Ok(status) => status,
                            Err(e) => {
                                tracing::debug!(lock = %lock_id, error = %e, "Ignoring undecodable push message");
                                continue;
                            }
                        };
                        let timestamp = message
                            .p
                            .and_then(|p| timetoken_to_datetime(&p.t))
                            .unwrap_or_else(Utc::now);

                        if tx
                            .send(LockEvent::from_status(&status, timestamp))
                            .await
                            .is_err()
                        {
                            tracing::debug!(lock = %lock_id, "Push receiver dropped, stopping subscription");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(lock = %lock_id, error = %e, "Push subscription request failed");
                    tokio::select! {
                        () = tx.closed() => break,
                        () = tokio::time::sleep(RESUBSCRIBE_DELAY) => {}
                    }
                }
            }
        }

        tracing::debug!(lock = %lock_id, "Push subscription closed");
    });

    rx
}
