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

//! Reference handles: named pointers into the object store
//!
//! A [`Reference`] owns exactly one store snapshot at a time. Mutating
//! operations (`rename`, `set_target`) build the replacement snapshot
//! first and swap it in only on success, so a failed call leaves the
//! handle exactly as it was. `delete` empties the slot once and for
//! all: every later call on the handle, accessors included, fails with
//! [`RefError::UseAfterDelete`].

use crate::error::{RefError, RefResult};
use crate::oid::Oid;
use crate::reflog::Reflog;
use crate::store::{RefData, RefKind, RefStore, RefTarget};
use std::sync::Arc;
use tracing::debug;

/// A handle to one named pointer, direct or symbolic
///
/// # Examples
///
/// ```
/// use refbase_core::{MemoryRefStore, Oid, RefKind, Reference};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryRefStore::new());
/// let oid = Oid::hash(b"commit");
/// store.insert_object(oid);
///
/// let branch = Reference::create_direct(store.clone(), "refs/heads/main", oid, false)?;
/// assert_eq!(branch.name()?, "refs/heads/main");
/// assert_eq!(branch.kind()?, RefKind::Direct);
/// # Ok::<(), refbase_core::RefError>(())
/// ```
pub struct Reference {
    store: Arc<dyn RefStore>,
    /// `None` once the reference has been deleted.
    handle: Option<RefData>,
}

impl std::fmt::Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reference")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Reference {
    /// Wrap an already-fetched store snapshot in a handle
    pub fn from_data(store: Arc<dyn RefStore>, data: RefData) -> Self {
        Self {
            store,
            handle: Some(data),
        }
    }

    /// Look up an existing reference by its full name
    ///
    /// Fails with [`RefError::NotFound`] if no reference has this name.
    pub fn lookup(store: Arc<dyn RefStore>, name: &str) -> RefResult<Self> {
        let data = store.lookup(name)?;
        Ok(Self::from_data(store, data))
    }

    /// Create a direct reference pointing at `oid`
    pub fn create_direct(
        store: Arc<dyn RefStore>,
        name: &str,
        oid: Oid,
        force: bool,
    ) -> RefResult<Self> {
        let data = store.create_direct(name, oid, force)?;
        Ok(Self::from_data(store, data))
    }

    /// Create a symbolic reference pointing at `target`
    pub fn create_symbolic(
        store: Arc<dyn RefStore>,
        name: &str,
        target: &str,
        force: bool,
    ) -> RefResult<Self> {
        let data = store.create_symbolic(name, target, force)?;
        Ok(Self::from_data(store, data))
    }

    /// The live snapshot, or `UseAfterDelete` once the slot is empty.
    fn data(&self) -> RefResult<&RefData> {
        self.handle.as_ref().ok_or(RefError::UseAfterDelete)
    }

    /// The full name of the reference
    pub fn name(&self) -> RefResult<&str> {
        Ok(&self.data()?.name)
    }

    /// Whether the reference is direct or symbolic
    pub fn kind(&self) -> RefResult<RefKind> {
        Ok(self.data()?.kind())
    }

    /// The current target: an OID for direct refs, a name for symbolic
    pub fn target(&self) -> RefResult<RefTarget> {
        Ok(self.data()?.target.clone())
    }

    /// The target OID of a direct reference
    ///
    /// Fails with [`RefError::InvalidTarget`] on a symbolic reference;
    /// resolve it first.
    pub fn peel_oid(&self) -> RefResult<Oid> {
        match &self.data()?.target {
            RefTarget::Direct(oid) => Ok(*oid),
            RefTarget::Symbolic(target) => Err(RefError::InvalidTarget {
                value: target.clone(),
                reason: "oid is only available on a direct reference".to_string(),
            }),
        }
    }

    /// Resolve to a direct reference
    ///
    /// A direct reference resolves to an equivalent handle without a
    /// store call. A symbolic reference performs exactly one store
    /// call, which internally chases the whole chain of links; the
    /// store owns cycle detection and depth policy.
    pub fn resolve(&self) -> RefResult<Reference> {
        let data = self.data()?;

        match data.kind() {
            RefKind::Direct => Ok(Self::from_data(Arc::clone(&self.store), data.clone())),
            RefKind::Symbolic => {
                let resolved = self.store.resolve(data)?;
                debug!(name = %data.name, resolved = %resolved.name, "Resolved symbolic reference");
                Ok(Self::from_data(Arc::clone(&self.store), resolved))
            }
        }
    }

    /// Rename the reference in place
    ///
    /// Uses the no-overwrite policy: an existing reference at
    /// `new_name` fails with [`RefError::Conflict`]. On success the
    /// handle transparently points at the renamed reference; on
    /// failure it is unchanged.
    pub fn rename(&mut self, new_name: &str) -> RefResult<()> {
        let data = self.data()?;

        let renamed = self.store.rename(data, new_name, false)?;
        debug!(old_name = %data.name, new_name = %renamed.name, "Renamed reference");
        self.handle = Some(renamed);
        Ok(())
    }

    /// Delete the reference. The handle will no longer be valid!
    pub fn delete(&mut self) -> RefResult<()> {
        let data = self.data()?;

        self.store.delete(data)?;
        debug!(name = %data.name, "Deleted reference");
        self.handle = None;
        Ok(())
    }

    /// Replace the target of the reference
    ///
    /// For a symbolic reference, `value` is the new target name. For a
    /// direct reference, `value` is an object id spec, possibly
    /// abbreviated, expanded against the object index before the
    /// update. The handle adopts the new snapshot only on success.
    pub fn set_target(&mut self, value: &str) -> RefResult<()> {
        let data = self.data()?;

        let updated = match data.kind() {
            RefKind::Symbolic => self.store.set_symbolic_target(data, value)?,
            RefKind::Direct => {
                let oid = self.store.expand_oid(value)?;
                self.store.set_direct_target(data, oid)?
            }
        };

        debug!(name = %updated.name, "Updated reference target");
        self.handle = Some(updated);
        Ok(())
    }

    /// Point a direct reference at `oid`, bypassing spec expansion
    pub fn set_target_oid(&mut self, oid: Oid) -> RefResult<()> {
        let data = self.data()?;

        let updated = self.store.set_direct_target(data, oid)?;
        debug!(name = %updated.name, oid = %oid, "Updated reference target");
        self.handle = Some(updated);
        Ok(())
    }

    /// Open the reflog for this reference's current name
    ///
    /// A reference with no recorded history yields an empty, valid
    /// [`Reflog`]; "no history" is not an error.
    pub fn log(&self) -> RefResult<Reflog> {
        let data = self.data()?;
        let source = self.store.open_reflog(&data.name)?;
        Ok(Reflog::new(source))
    }
}
