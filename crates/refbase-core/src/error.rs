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

//! Error types for reference operations
//!
//! Every store call returns a typed error; there is no shared "last
//! error" channel and no sentinel return values. Failures are local and
//! deterministic, so callers are expected to surface them, not retry.

use thiserror::Error;

/// Result type for reference operations
pub type RefResult<T> = Result<T, RefError>;

/// Errors that can occur during reference and reflog operations
#[derive(Debug, Error)]
pub enum RefError {
    /// The named reference, symbolic target, or object does not exist
    #[error("reference not found: {name}")]
    NotFound {
        /// Name that failed to resolve
        name: String,
    },

    /// The supplied reference name is malformed
    #[error("invalid reference name: {name}: {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Which rule the name violated
        reason: String,
    },

    /// The supplied target value cannot be parsed or applied
    #[error("invalid target {value:?}: {reason}")]
    InvalidTarget {
        /// The rejected target value
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The supplied string is not a valid 40-character hex OID
    #[error("invalid object id: {value:?}")]
    InvalidOid {
        /// The rejected spec
        value: String,
    },

    /// A create or rename collides with an existing name under the
    /// no-overwrite policy
    #[error("reference already exists: {name}")]
    Conflict {
        /// The colliding name
        name: String,
    },

    /// An abbreviated object id matches more than one object
    #[error("ambiguous object id prefix: {prefix}")]
    AmbiguousOid {
        /// The ambiguous prefix
        prefix: String,
    },

    /// Structural problem in the store, such as a symbolic resolution
    /// cycle or a corrupt ref file
    #[error("invalid reference {name}: {reason}")]
    InvalidReference {
        /// The reference involved
        name: String,
        /// What is structurally wrong
        reason: String,
    },

    /// Operation attempted on a reference whose handle was already
    /// released by `delete()`
    #[error("reference was deleted and is no longer valid")]
    UseAfterDelete,

    /// Malformed store configuration file
    #[error("config error: {0}")]
    Config(String),

    /// I/O error from a file-backed store
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
