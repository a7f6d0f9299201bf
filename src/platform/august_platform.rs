// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform coordinating every lock of an August account.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use crate::accessory::LockAccessory;
use crate::config::{AccessorySettings, DeviceConfig, DeviceLog, PlatformConfig, VerifiedConfig};
use crate::error::Error;
use crate::event::{AccessoryEvent, EventBus};
use crate::protocol::LockApi;
use crate::response::LockDetails;
use crate::state::AccessoryContext;
use crate::types::LockId;

use super::CachedAccessory;

/// The bridge platform: discovers locks and owns their accessories.
///
/// Accessories are keyed by the normalized lock ID, so a config entry or a
/// cache entry written with different case or separators still matches.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use august_bridge::config::{Credentials, PlatformConfig};
/// use august_bridge::platform::Platform;
/// use august_bridge::protocol::{ApiConfig, HttpClient};
///
/// #[tokio::main]
/// async fn main() -> august_bridge::Result<()> {
///     let config = PlatformConfig::new(
///         Credentials::new("me@example.com", "secret").with_access_token("token"),
///     );
///     let api = Arc::new(HttpClient::new(ApiConfig::new().with_access_token("token"))?);
///     let platform = Platform::new(config, api)?;
///
///     // Subscribe to events
///     let mut events = platform.subscribe();
///     tokio::spawn(async move {
///         while let Ok(event) = events.recv().await {
///             println!("Event: {event:?}");
///         }
///     });
///
///     let count = platform.discover_devices().await?;
///     println!("{count} locks exposed");
///     Ok(())
/// }
/// ```
pub struct Platform<A: LockApi> {
    config: VerifiedConfig,
    api: Arc<A>,
    /// Running accessories, keyed by normalized lock ID.
    accessories: Arc<RwLock<HashMap<String, Arc<LockAccessory<A>>>>>,
    /// Cache entries not yet matched to a discovered lock.
    cached: RwLock<HashMap<String, CachedAccessory>>,
    event_bus: EventBus,
    log: DeviceLog,
}

impl<A: LockApi> Platform<A> {
    /// Verifies the configuration and creates the platform.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is unusable.
    pub fn new(config: PlatformConfig, api: Arc<A>) -> Result<Self, Error> {
        let config = match config.verify() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Verify Config failed");
                return Err(e.into());
            }
        };

        let log = DeviceLog::new(config.name.clone(), config.logging);
        log.debug_warn(format!("Using {} logging", config.logging));
        log.info(format!("Finished initializing platform: {}", config.name));

        Ok(Self {
            config,
            api,
            accessories: Arc::new(RwLock::new(HashMap::new())),
            cached: RwLock::new(HashMap::new()),
            event_bus: EventBus::new(),
            log,
        })
    }

    /// Returns the verified configuration.
    #[must_use]
    pub fn config(&self) -> &VerifiedConfig {
        &self.config
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to platform and accessory events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AccessoryEvent> {
        self.event_bus.subscribe()
    }

    // =========================================================================
    // Accessory management
    // =========================================================================

    /// Records an accessory restored from the host cache.
    ///
    /// It is reused by the next [`discover_devices`](Self::discover_devices)
    /// if its lock is still present.
    pub async fn configure_accessory(&self, cached: CachedAccessory) {
        self.log.debug(format!(
            "Loading accessory from cache: {}",
            cached.display_name
        ));
        self.cached
            .write()
            .await
            .insert(cached.lock_id.normalized(), cached);
    }

    /// Lists the account's locks and creates, restores or removes their
    /// accessories.
    ///
    /// A lock whose details cannot be fetched is skipped. Returns the number
    /// of accessories running afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the lock list cannot be fetched.
    pub async fn discover_devices(&self) -> Result<usize, Error> {
        let locks = self.api.locks().await?;
        self.log
            .info(format!("Total August Locks Found: {}", locks.len()));
        if self.config.devices.is_empty() {
            self.log.debug_warn("August Platform Config Not Set");
        }

        for summary in locks {
            let mut details = match self.api.details(&summary.lock_id).await {
                Ok(details) => details,
                Err(e) => {
                    self.log.error(format!(
                        "Lock: {} failed to fetch details: {e}",
                        summary.lock_name
                    ));
                    continue;
                }
            };
            // The listing key is authoritative for the ID.
            details.lock_id = summary.lock_id;

            let device = self.config.device(&details.lock_id).cloned();
            if let Some(name) = device.as_ref().and_then(|d| d.config_lock_name.clone()) {
                details.lock_name = name;
            }
            self.log.debug(format!("device: {details:?}, config: {device:?}"));

            self.create_lock(details, device.as_ref()).await;
        }

        Ok(self.accessories.read().await.len())
    }

    async fn create_lock(&self, details: LockDetails, device: Option<&DeviceConfig>) {
        let key = details.lock_id.normalized();
        let register = !device.is_some_and(|d| d.hide_device);
        let external = device.is_some_and(|d| d.external);

        let running = self.accessories.write().await.remove(&key);
        let existing = match running {
            Some(accessory) => {
                accessory.shutdown();
                Some(CachedAccessory::new(accessory.lock_id().clone(), accessory.name())
                    .with_context(accessory.context()))
            }
            None => self.cached.write().await.remove(&key),
        };

        match (existing, register) {
            (Some(cached), true) => {
                self.log.info(format!(
                    "Restoring existing accessory from cache: {} Lock ID: {}",
                    details.lock_name, details.lock_id
                ));
                self.start_accessory(&details, device, cached.context).await;
                self.event_bus.publish(AccessoryEvent::AccessoryRestored {
                    lock_id: details.lock_id.clone(),
                    name: details.lock_name.clone(),
                });
            }
            (Some(cached), false) => {
                self.log.warn(format!(
                    "Removing existing accessory from cache: {}",
                    details.lock_name
                ));
                self.event_bus.publish(AccessoryEvent::AccessoryRemoved {
                    lock_id: cached.lock_id,
                    name: details.lock_name.clone(),
                });
            }
            (None, true) => {
                if external {
                    self.log.info(format!(
                        "{} External Accessory Mode: {external}",
                        details.lock_name
                    ));
                } else {
                    self.log.info(format!(
                        "Adding new accessory: {} Lock ID: {}",
                        details.lock_name, details.lock_id
                    ));
                }
                let context = AccessoryContext::for_lock(details.lock_id.clone());
                self.start_accessory(&details, device, context).await;
                self.event_bus.publish(AccessoryEvent::AccessoryAdded {
                    lock_id: details.lock_id.clone(),
                    name: details.lock_name.clone(),
                    external,
                });
            }
            (None, false) => {
                self.log.debug_error(format!(
                    "Unable to Register new device: {} Lock ID: {}",
                    details.lock_name, details.lock_id
                ));
                self.log
                    .debug_error("Check Config to see if lockId is being Hidden.");
            }
        }
    }

    async fn start_accessory(
        &self,
        details: &LockDetails,
        device: Option<&DeviceConfig>,
        context: AccessoryContext,
    ) {
        let settings = AccessorySettings::resolve(&self.config, device, self.config.debug_mode);
        let accessory = Arc::new(LockAccessory::with_event_bus(
            Arc::clone(&self.api),
            details,
            settings,
            context,
            self.event_bus.clone(),
        ));
        accessory.start().await;
        self.accessories
            .write()
            .await
            .insert(details.lock_id.normalized(), accessory);
    }

    /// Stops and unregisters an accessory.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no accessory exists for the lock.
    pub async fn remove_accessory(&self, lock_id: &LockId) -> Result<(), Error> {
        let accessory = self
            .accessories
            .write()
            .await
            .remove(&lock_id.normalized())
            .ok_or(Error::DeviceNotFound)?;

        accessory.shutdown();
        let name = accessory.name();
        self.log
            .warn(format!("Removing existing accessory from cache: {name}"));
        self.event_bus.publish(AccessoryEvent::AccessoryRemoved {
            lock_id: accessory.lock_id().clone(),
            name,
        });
        Ok(())
    }

    /// Returns the accessory of a lock.
    pub async fn accessory(&self, lock_id: &LockId) -> Option<Arc<LockAccessory<A>>> {
        self.accessories
            .read()
            .await
            .get(&lock_id.normalized())
            .cloned()
    }

    /// Returns the IDs of every running accessory.
    pub async fn lock_ids(&self) -> Vec<LockId> {
        self.accessories
            .read()
            .await
            .values()
            .map(|a| a.lock_id().clone())
            .collect()
    }

    /// Returns what the host should cache for every running accessory.
    pub async fn cache_snapshot(&self) -> Vec<CachedAccessory> {
        self.accessories
            .read()
            .await
            .values()
            .map(|a| CachedAccessory::new(a.lock_id().clone(), a.name()).with_context(a.context()))
            .collect()
    }

    /// Stops every accessory.
    pub async fn shutdown(&self) {
        let accessories: Vec<_> = self.accessories.write().await.drain().collect();
        for (_, accessory) in accessories {
            accessory.shutdown();
        }
        self.log.debug("Platform stopped");
    }
}

impl<A: LockApi> std::fmt::Debug for Platform<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("name", &self.config.name)
            .field("logging", &self.config.logging)
            .finish_non_exhaustive()
    }
}
