// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for characteristic updates.
//!
//! The host side of the bridge learns about new characteristic values by
//! registering callbacks on an accessory.
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Registry that stores callbacks and dispatches changes
//! - [`Subscribable`] - Trait for types that support subscriptions
//!
//! Accessories also expose their whole state through a
//! `tokio::sync::watch` channel for consumers that prefer polling the latest
//! value.

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
