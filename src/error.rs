// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! This module provides the error hierarchy used across the crate: value
//! validation, vendor API communication, payload parsing and configuration
//! verification.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the vendor API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a vendor payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The platform configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// No accessory is registered for the requested lock.
    #[error("accessory not found")]
    DeviceNotFound,

    /// The accessory has not been started yet.
    #[error("accessory is not started")]
    NotStarted,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// A HomeKit characteristic value has no meaning for the characteristic.
    #[error("invalid {characteristic} value: {value}")]
    InvalidCharacteristic {
        /// The characteristic name.
        characteristic: &'static str,
        /// The rejected raw value.
        value: u8,
    },
}

/// Errors related to vendor API communication (REST and push).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor answered with an unexpected status.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The access token was rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The vendor response could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(#[from] ParseError),
}

/// Errors related to parsing vendor payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),
}

/// Errors raised while verifying the platform configuration.
///
/// These are fatal: the platform refuses to start.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The `credentials` block is absent.
    #[error("missing credentials")]
    MissingCredentials,

    /// No August ID (e-mail or phone number) was given.
    #[error("missing August ID (e-mail/phone number)")]
    MissingAugustId,

    /// No password was given.
    #[error("missing August password")]
    MissingPassword,

    /// The plugin is disabled in the configuration.
    #[error("platform is disabled")]
    Disabled,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
