// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessories handed back by the host cache.

use serde::{Deserialize, Serialize};

use crate::state::AccessoryContext;
use crate::types::LockId;

/// An accessory the host restored from its cache at startup.
///
/// The platform matches it to a discovered lock and reuses its context, or
/// unregisters it when the lock is hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedAccessory {
    pub lock_id: LockId,
    /// Display name the accessory was registered with.
    pub display_name: String,
    #[serde(default)]
    pub context: AccessoryContext,
}

impl CachedAccessory {
    #[must_use]
    pub fn new(lock_id: impl Into<LockId>, display_name: impl Into<String>) -> Self {
        Self {
            lock_id: lock_id.into(),
            display_name: display_name.into(),
            context: AccessoryContext::default(),
        }
    }

    /// Sets the persisted context.
    #[must_use]
    pub fn with_context(mut self, context: AccessoryContext) -> Self {
        self.context = context;
        self
    }
}
