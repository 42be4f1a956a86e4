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

//! Object Identifier (OID) for content-addressed objects
//!
//! An OID is a fixed 20-byte binary identifier whose canonical textual
//! form is a 40-character lowercase hex string. Refbase does not own the
//! object format; it only names objects, so the codec here is the whole
//! contract: bytes in, hex out, byte-wise equality.

use crate::error::{RefError, RefResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Object Identifier - 20-byte content address
///
/// # Examples
///
/// ```
/// use refbase_core::Oid;
///
/// let oid = Oid::hash(b"Hello, World!");
/// assert_eq!(oid.to_hex().len(), 40);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Oid([u8; 20]);

impl Oid {
    /// The all-zero OID, used as the "before" side of a reference's
    /// first reflog entry.
    pub const ZERO: Oid = Oid([0u8; 20]);

    /// Create an OID by hashing the given data
    ///
    /// The id is the SHA-256 digest truncated to 20 bytes. Refbase only
    /// needs stable, collision-resistant names for test fixtures and
    /// embedders; the real object format belongs to the object store.
    ///
    /// # Examples
    ///
    /// ```
    /// use refbase_core::Oid;
    ///
    /// let oid = Oid::hash(b"test content");
    /// assert_eq!(oid.to_string().len(), 40);
    /// ```
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Oid(bytes)
    }

    /// Create an OID from raw bytes
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Oid(bytes)
    }

    /// Get the raw bytes of the OID
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert the OID to its 40-character lowercase hex form
    ///
    /// # Examples
    ///
    /// ```
    /// use refbase_core::Oid;
    ///
    /// let hex = Oid::hash(b"test").to_hex();
    /// assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse an OID from a 40-character hex string
    ///
    /// # Errors
    ///
    /// Returns [`RefError::InvalidOid`] unless the input is exactly 40
    /// hex characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use refbase_core::Oid;
    ///
    /// let oid = Oid::hash(b"test");
    /// assert_eq!(Oid::from_hex(&oid.to_hex()).unwrap(), oid);
    /// assert!(Oid::from_hex("abc123").is_err());
    /// ```
    pub fn from_hex(s: &str) -> RefResult<Self> {
        if s.len() != 40 {
            return Err(RefError::InvalidOid {
                value: s.to_string(),
            });
        }

        let bytes = hex::decode(s).map_err(|_| RefError::InvalidOid {
            value: s.to_string(),
        })?;

        let mut oid_bytes = [0u8; 20];
        oid_bytes.copy_from_slice(&bytes);
        Ok(Oid(oid_bytes))
    }

    /// Get the loose-object path for this OID
    ///
    /// Returns the `{first2hex}/{remaining38hex}` fan-out used by the
    /// loose object directory that abbreviated expansion scans.
    pub fn to_path(&self) -> String {
        let hex = self.to_hex();
        format!("{}/{}", &hex[..2], &hex[2..])
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.to_hex())
    }
}

impl From<[u8; 20]> for Oid {
    fn from(bytes: [u8; 20]) -> Self {
        Oid(bytes)
    }
}

impl From<Oid> for [u8; 20] {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_deterministic() {
        let data = b"test content";
        assert_eq!(Oid::hash(data), Oid::hash(data));
    }

    #[test]
    fn test_hash_different_content() {
        assert_ne!(Oid::hash(b"content1"), Oid::hash(b"content2"));
    }

    #[test]
    fn test_hex_roundtrip() {
        let oid1 = Oid::hash(b"test");
        let oid2 = Oid::from_hex(&oid1.to_hex()).unwrap();
        assert_eq!(oid1, oid2);
    }

    #[test]
    fn test_hex_length() {
        assert_eq!(Oid::hash(b"test").to_hex().len(), 40);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Oid::from_hex("too_short").is_err());
        assert!(Oid::from_hex(&"z".repeat(40)).is_err());
        assert!(Oid::from_hex(&"a".repeat(39)).is_err());
        assert!(Oid::from_hex(&"a".repeat(41)).is_err());
    }

    #[test]
    fn test_zero_oid() {
        assert_eq!(Oid::ZERO.to_hex(), "0".repeat(40));
    }

    #[test]
    fn test_path_format() {
        let path = Oid::hash(b"test").to_path();
        let parts: Vec<&str> = path.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 38);
    }

    #[test]
    fn test_display() {
        let display = format!("{}", Oid::hash(b"test"));
        assert_eq!(display.len(), 40);
        assert!(display.chars().all(|c| c.is_ascii_hexdigit()));
    }

    proptest! {
        #[test]
        fn prop_hex_roundtrip(bytes in prop::array::uniform20(any::<u8>())) {
            let oid = Oid::from_bytes(bytes);
            let hex = oid.to_hex();
            prop_assert_eq!(Oid::from_hex(&hex).unwrap(), oid);
            prop_assert_eq!(hex.len(), 40);
        }
    }
}
