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

//! The [`RefStore`] trait defining the reference storage seam
//!
//! A [`Reference`](crate::Reference) handle never touches persistence
//! directly; every operation goes through one call on this trait. Each
//! call is atomic from the handle's point of view: it either returns a
//! fresh [`RefData`] snapshot to adopt, or a typed error and the caller
//! keeps its old snapshot.

use crate::error::RefResult;
use crate::oid::Oid;
use crate::signature::Signature;
use serde::{Deserialize, Serialize};

/// Reference kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefKind {
    /// Direct reference to an object OID (branches, tags)
    Direct,
    /// Symbolic reference pointing to another ref (HEAD)
    Symbolic,
}

/// What a reference points at
///
/// Exactly one of the two variants is present; there is no state where
/// a reference carries both an OID and a symbolic target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefTarget {
    /// Points directly at an object
    Direct(Oid),
    /// Points at another reference by name
    Symbolic(String),
}

impl RefTarget {
    /// The kind of reference this target implies
    pub fn kind(&self) -> RefKind {
        match self {
            RefTarget::Direct(_) => RefKind::Direct,
            RefTarget::Symbolic(_) => RefKind::Symbolic,
        }
    }
}

/// Owned snapshot of one named pointer, as returned by the store
///
/// This is the "handle" a [`Reference`](crate::Reference) owns: the
/// store hands out a fresh one on every successful mutation and the
/// handle swaps it into place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefData {
    /// Full hierarchical name (e.g. `refs/heads/main`, `HEAD`)
    pub name: String,

    /// Current target of the reference
    pub target: RefTarget,
}

impl RefData {
    /// The kind of this reference
    pub fn kind(&self) -> RefKind {
        self.target.kind()
    }
}

/// One recorded mutation in a reference's history, as stored
///
/// The store owns these; iteration copies the fields out into
/// independently owned [`RefLogEntry`](crate::RefLogEntry) values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogRecord {
    /// State before the mutation ([`Oid::ZERO`] for a new reference)
    pub old_oid: Oid,
    /// State after the mutation
    pub new_oid: Oid,
    /// Who performed the mutation
    pub committer: Signature,
    /// Human-readable description (may be empty)
    pub message: String,
}

/// Read side of one reference's mutation history
///
/// Opened by [`RefStore::open_reflog`]; a snapshot of the history at
/// open time, oldest entry first. External mutation of the reference
/// after opening is not reflected.
pub trait ReflogSource {
    /// Total number of entries in this snapshot
    fn entry_count(&self) -> usize;

    /// The entry at `index` (0 = oldest), or `None` past the end
    fn entry_at(&self, index: usize) -> Option<&ReflogRecord>;
}

/// Storage backend for named references
///
/// Implementations must be thread-safe (`Send + Sync`) and provide
/// atomic single-call operations. The namespace follows the usual
/// hierarchical layout (`refs/heads/*`, `refs/tags/*`, `HEAD`).
///
/// Mutating calls return the post-mutation [`RefData`] so the caller
/// can adopt it without a second lookup; on error nothing in the store
/// has changed.
pub trait RefStore: Send + Sync {
    /// Look up a reference by its full name
    ///
    /// Fails with `NotFound` if no reference has this name.
    fn lookup(&self, name: &str) -> RefResult<RefData>;

    /// Create a direct reference pointing at `oid`
    ///
    /// Fails with `Conflict` if the name exists and `force` is false,
    /// or `InvalidName` if the name is malformed.
    fn create_direct(&self, name: &str, oid: Oid, force: bool) -> RefResult<RefData>;

    /// Create a symbolic reference pointing at `target`
    ///
    /// Same failure modes as [`RefStore::create_direct`].
    fn create_symbolic(&self, name: &str, target: &str, force: bool) -> RefResult<RefData>;

    /// Resolve a reference to a direct one, chasing symbolic links
    ///
    /// One-shot: the store follows the whole chain internally. Fails
    /// with `NotFound` if any link is dangling, or `InvalidReference`
    /// if the chain is cyclic or too deep.
    fn resolve(&self, data: &RefData) -> RefResult<RefData>;

    /// Rename a reference, carrying its reflog along
    ///
    /// Fails with `InvalidName`, `Conflict` (target name taken and
    /// `force` is false), or `NotFound` if the reference vanished
    /// out-of-band. On failure the old name is untouched.
    fn rename(&self, data: &RefData, new_name: &str, force: bool) -> RefResult<RefData>;

    /// Remove a reference and its reflog
    ///
    /// Fails with `NotFound` if it was already removed out-of-band.
    fn delete(&self, data: &RefData) -> RefResult<()>;

    /// Replace the target of a symbolic reference
    fn set_symbolic_target(&self, data: &RefData, target: &str) -> RefResult<RefData>;

    /// Replace the target of a direct reference
    fn set_direct_target(&self, data: &RefData, oid: Oid) -> RefResult<RefData>;

    /// Expand a possibly-abbreviated object id against the object index
    ///
    /// A full 40-hex spec decodes directly. A shorter prefix must match
    /// exactly one known object; fails with `AmbiguousOid` on multiple
    /// matches, `NotFound` on none, or `InvalidOid` on garbage input.
    fn expand_oid(&self, spec: &str) -> RefResult<Oid>;

    /// Open the mutation history of a reference
    ///
    /// A reference with no recorded history yields an empty source,
    /// never an error.
    fn open_reflog(&self, name: &str) -> RefResult<Box<dyn ReflogSource>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kind() {
        let direct = RefTarget::Direct(Oid::hash(b"x"));
        assert_eq!(direct.kind(), RefKind::Direct);

        let symbolic = RefTarget::Symbolic("refs/heads/main".to_string());
        assert_eq!(symbolic.kind(), RefKind::Symbolic);
    }

    #[test]
    fn test_ref_data_kind() {
        let data = RefData {
            name: "HEAD".to_string(),
            target: RefTarget::Symbolic("refs/heads/main".to_string()),
        };
        assert_eq!(data.kind(), RefKind::Symbolic);
    }
}
