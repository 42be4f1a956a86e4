// Refbase - Reference Database for Content-Addressed Stores
// Copyright (C) 2025 Refbase Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Committer identity attached to reflog entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who performed a reference mutation, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Name of the committer
    pub name: String,

    /// Email address
    pub email: String,

    /// Timestamp of the signature
    pub timestamp: DateTime<Utc>,
}

impl Signature {
    /// Create a new signature
    ///
    /// # Examples
    ///
    /// ```
    /// use refbase_core::Signature;
    /// use chrono::Utc;
    ///
    /// let sig = Signature::new(
    ///     "Alice Developer".to_string(),
    ///     "alice@example.com".to_string(),
    ///     Utc::now(),
    /// );
    /// assert_eq!(sig.name, "Alice Developer");
    /// ```
    pub fn new(name: String, email: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            name,
            email,
            timestamp,
        }
    }

    /// Create a signature with the current timestamp
    pub fn now(name: String, email: String) -> Self {
        Self {
            name,
            email,
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {}",
            self.name,
            self.email,
            self.timestamp.timestamp()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_format() {
        let sig = Signature::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            Utc.timestamp_opt(1_700_000_000, 0).single().unwrap(),
        );
        assert_eq!(sig.to_string(), "Alice <alice@example.com> 1700000000");
    }

    #[test]
    fn test_now_uses_current_time() {
        let before = Utc::now();
        let sig = Signature::now("A".to_string(), "a@b.c".to_string());
        assert!(sig.timestamp >= before);
    }
}
