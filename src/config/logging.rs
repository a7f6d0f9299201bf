// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-accessory log verbosity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much an accessory (or the platform) logs.
///
/// The host config accepts `standard`, `debug` and `none`. `debugMode` is
/// never written by hand; it is selected when the host runs in debug mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoggingMode {
    /// Regular messages at their level, debug messages at `debug`.
    #[default]
    Standard,
    /// Debug messages promoted to `info` with a `[DEBUG]` prefix.
    Debug,
    /// Host debug mode: like `Standard`, plus `[DEBUG]` warnings.
    DebugMode,
    /// Nothing is logged.
    None,
}

impl LoggingMode {
    /// Returns `true` unless logging is switched off.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns `true` for `debug` and `debugMode`.
    #[must_use]
    pub const fn is_debug(self) -> bool {
        matches!(self, Self::Debug | Self::DebugMode)
    }

    /// Returns the config spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Debug => "debug",
            Self::DebugMode => "debugMode",
            Self::None => "none",
        }
    }
}

impl fmt::Display for LoggingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logger bound to one accessory name and verbosity.
///
/// All output goes through `tracing`; the mode only decides whether and at
/// which level a message is emitted.
#[derive(Debug, Clone)]
pub struct DeviceLog {
    name: String,
    mode: LoggingMode,
}

impl DeviceLog {
    /// Creates a logger for the named accessory.
    #[must_use]
    pub fn new(name: impl Into<String>, mode: LoggingMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }

    /// Returns the accessory name used in every message.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the verbosity.
    #[must_use]
    pub fn mode(&self) -> LoggingMode {
        self.mode
    }

    pub fn info(&self, message: impl fmt::Display) {
        if self.mode.is_enabled() {
            tracing::info!(lock = %self.name, "{message}");
        }
    }

    pub fn warn(&self, message: impl fmt::Display) {
        if self.mode.is_enabled() {
            tracing::warn!(lock = %self.name, "{message}");
        }
    }

    pub fn error(&self, message: impl fmt::Display) {
        if self.mode.is_enabled() {
            tracing::error!(lock = %self.name, "{message}");
        }
    }

    /// Logs a debug message according to the mode.
    pub fn debug(&self, message: impl fmt::Display) {
        match self.mode {
            LoggingMode::Debug => tracing::info!(lock = %self.name, "[DEBUG] {message}"),
            LoggingMode::Standard | LoggingMode::DebugMode => {
                tracing::debug!(lock = %self.name, "{message}");
            }
            LoggingMode::None => {}
        }
    }

    /// Logs a warning only in the debug modes.
    pub fn debug_warn(&self, message: impl fmt::Display) {
        if self.mode.is_debug() {
            tracing::warn!(lock = %self.name, "[DEBUG] {message}");
        }
    }

    /// Logs an error only in the debug modes.
    pub fn debug_error(&self, message: impl fmt::Display) {
        if self.mode.is_debug() {
            tracing::error!(lock = %self.name, "[DEBUG] {message}");
        }
    }
}
