// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lock identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a lock in the August cloud.
///
/// The raw value is kept as received. Comparisons against user-supplied
/// identifiers go through [`LockId::matches`], which ignores case and any
/// separator characters.
///
/// # Examples
///
/// ```
/// use august_bridge::types::LockId;
///
/// let id = LockId::new("a1b2c3d4e5");
/// assert!(id.matches(&LockId::new("A1-B2-C3-D4-E5")));
/// assert_eq!(id.normalized(), "A1B2C3D4E5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockId(String);

impl LockId {
    /// Creates a lock identifier from its raw value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the identifier uppercased with every non-alphanumeric
    /// character removed.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }

    /// Returns `true` if both identifiers designate the same lock.
    #[must_use]
    pub fn matches(&self, other: &LockId) -> bool {
        self.normalized() == other.normalized()
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LockId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_strips_separators_and_uppercases() {
        let id = LockId::new("ab:cd-12_34 ef");
        assert_eq!(id.normalized(), "ABCD1234EF");
    }

    #[test]
    fn matches_ignores_case() {
        assert!(LockId::new("7EDFD6A4").matches(&LockId::new("7edfd6a4")));
        assert!(!LockId::new("7EDFD6A4").matches(&LockId::new("7EDFD6A5")));
    }

    #[test]
    fn deserializes_from_plain_string() {
        let id: LockId = serde_json::from_str("\"ABC123\"").unwrap();
        assert_eq!(id.as_str(), "ABC123");
    }
}
