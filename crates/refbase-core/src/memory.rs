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

//! In-memory reference store for tests and ephemeral use
//!
//! [`MemoryRefStore`] keeps refs, reflogs, and a small object index in
//! `RwLock`-protected maps. It implements the full [`RefStore`]
//! contract, including conflict policy, bounded symbolic resolution,
//! and reflog appends on target-changing mutations, so handle
//! semantics can be exercised without touching the filesystem.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{RefError, RefResult};
use crate::names::validate_ref_name;
use crate::oid::Oid;
use crate::signature::Signature;
use crate::store::{RefData, RefStore, RefTarget, ReflogRecord, ReflogSource};

/// Symbolic chains longer than this are treated as cycles.
const MAX_RESOLVE_DEPTH: usize = 10;

struct Inner {
    refs: HashMap<String, RefTarget>,
    logs: HashMap<String, Vec<ReflogRecord>>,
    /// Hex ids of known objects, sorted for prefix scans.
    objects: BTreeSet<String>,
}

/// An in-memory implementation of [`RefStore`]
///
/// Data is lost when the store is dropped.
///
/// # Examples
///
/// ```
/// use refbase_core::{MemoryRefStore, Oid, Reference};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryRefStore::new());
/// let oid = Oid::hash(b"commit");
/// store.insert_object(oid);
///
/// let r = Reference::create_direct(store, "refs/heads/main", oid, false)?;
/// assert_eq!(r.peel_oid()?, oid);
/// # Ok::<(), refbase_core::RefError>(())
/// ```
pub struct MemoryRefStore {
    inner: RwLock<Inner>,
    /// Identity stamped on store-generated reflog entries.
    identity: (String, String),
}

impl MemoryRefStore {
    /// Create a new empty store with a default identity
    pub fn new() -> Self {
        Self::with_identity("refbase", "refbase@localhost")
    }

    /// Create a new empty store with the given committer identity
    pub fn with_identity(name: &str, email: &str) -> Self {
        Self {
            inner: RwLock::new(Inner {
                refs: HashMap::new(),
                logs: HashMap::new(),
                objects: BTreeSet::new(),
            }),
            identity: (name.to_string(), email.to_string()),
        }
    }

    /// Register an object id so abbreviated specs can expand to it
    pub fn insert_object(&self, oid: Oid) {
        self.write().objects.insert(oid.to_hex());
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        // Single-writer contract; recover the data if a test panicked
        // while holding the lock.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    fn signature(&self) -> Signature {
        Signature::now(self.identity.0.clone(), self.identity.1.clone())
    }

    fn append_log(inner: &mut Inner, name: &str, record: ReflogRecord) {
        inner.logs.entry(name.to_string()).or_default().push(record);
    }

    /// Current direct oid of `name`, if it is a direct ref.
    fn direct_oid(inner: &Inner, name: &str) -> Option<Oid> {
        match inner.refs.get(name) {
            Some(RefTarget::Direct(oid)) => Some(*oid),
            _ => None,
        }
    }
}

impl Default for MemoryRefStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RefStore for MemoryRefStore {
    fn lookup(&self, name: &str) -> RefResult<RefData> {
        let inner = self.read();
        let target = inner.refs.get(name).ok_or_else(|| RefError::NotFound {
            name: name.to_string(),
        })?;
        Ok(RefData {
            name: name.to_string(),
            target: target.clone(),
        })
    }

    fn create_direct(&self, name: &str, oid: Oid, force: bool) -> RefResult<RefData> {
        validate_ref_name(name)?;

        let mut inner = self.write();
        if !force && inner.refs.contains_key(name) {
            return Err(RefError::Conflict {
                name: name.to_string(),
            });
        }

        let old_oid = Self::direct_oid(&inner, name).unwrap_or(Oid::ZERO);
        inner
            .refs
            .insert(name.to_string(), RefTarget::Direct(oid));
        Self::append_log(
            &mut inner,
            name,
            ReflogRecord {
                old_oid,
                new_oid: oid,
                committer: self.signature(),
                message: format!("create: {name}"),
            },
        );

        Ok(RefData {
            name: name.to_string(),
            target: RefTarget::Direct(oid),
        })
    }

    fn create_symbolic(&self, name: &str, target: &str, force: bool) -> RefResult<RefData> {
        validate_ref_name(name)?;
        validate_ref_name(target)?;

        let mut inner = self.write();
        if !force && inner.refs.contains_key(name) {
            return Err(RefError::Conflict {
                name: name.to_string(),
            });
        }

        let target = RefTarget::Symbolic(target.to_string());
        inner.refs.insert(name.to_string(), target.clone());

        Ok(RefData {
            name: name.to_string(),
            target,
        })
    }

    fn resolve(&self, data: &RefData) -> RefResult<RefData> {
        let inner = self.read();
        let mut current = data.name.clone();
        let mut target = data.target.clone();

        for _ in 0..MAX_RESOLVE_DEPTH {
            match target {
                RefTarget::Direct(_) => {
                    return Ok(RefData {
                        name: current,
                        target,
                    });
                }
                RefTarget::Symbolic(next) => {
                    target = inner
                        .refs
                        .get(&next)
                        .cloned()
                        .ok_or_else(|| RefError::NotFound { name: next.clone() })?;
                    current = next;
                }
            }
        }

        Err(RefError::InvalidReference {
            name: data.name.clone(),
            reason: format!("symbolic chain exceeds depth {MAX_RESOLVE_DEPTH} (cycle?)"),
        })
    }

    fn rename(&self, data: &RefData, new_name: &str, force: bool) -> RefResult<RefData> {
        validate_ref_name(new_name)?;

        let mut inner = self.write();
        if !inner.refs.contains_key(&data.name) {
            return Err(RefError::NotFound {
                name: data.name.clone(),
            });
        }
        if new_name == data.name {
            let target = inner.refs[&data.name].clone();
            return Ok(RefData {
                name: new_name.to_string(),
                target,
            });
        }
        if !force && inner.refs.contains_key(new_name) {
            return Err(RefError::Conflict {
                name: new_name.to_string(),
            });
        }

        let target = inner
            .refs
            .remove(&data.name)
            .unwrap_or_else(|| data.target.clone());
        inner.refs.insert(new_name.to_string(), target.clone());

        // The reflog follows the reference to its new name.
        let mut log = inner.logs.remove(&data.name).unwrap_or_default();
        if let RefTarget::Direct(oid) = target {
            log.push(ReflogRecord {
                old_oid: oid,
                new_oid: oid,
                committer: self.signature(),
                message: format!("rename: {} -> {}", data.name, new_name),
            });
        }
        inner.logs.insert(new_name.to_string(), log);

        Ok(RefData {
            name: new_name.to_string(),
            target,
        })
    }

    fn delete(&self, data: &RefData) -> RefResult<()> {
        let mut inner = self.write();
        if inner.refs.remove(&data.name).is_none() {
            return Err(RefError::NotFound {
                name: data.name.clone(),
            });
        }
        inner.logs.remove(&data.name);
        Ok(())
    }

    fn set_symbolic_target(&self, data: &RefData, target: &str) -> RefResult<RefData> {
        validate_ref_name(target)?;

        let mut inner = self.write();
        if !inner.refs.contains_key(&data.name) {
            return Err(RefError::NotFound {
                name: data.name.clone(),
            });
        }

        let target = RefTarget::Symbolic(target.to_string());
        inner.refs.insert(data.name.clone(), target.clone());

        Ok(RefData {
            name: data.name.clone(),
            target,
        })
    }

    fn set_direct_target(&self, data: &RefData, oid: Oid) -> RefResult<RefData> {
        let mut inner = self.write();
        if !inner.refs.contains_key(&data.name) {
            return Err(RefError::NotFound {
                name: data.name.clone(),
            });
        }

        let old_oid = Self::direct_oid(&inner, &data.name).unwrap_or(Oid::ZERO);
        inner
            .refs
            .insert(data.name.clone(), RefTarget::Direct(oid));
        Self::append_log(
            &mut inner,
            &data.name,
            ReflogRecord {
                old_oid,
                new_oid: oid,
                committer: self.signature(),
                message: format!("update: {}", data.name),
            },
        );

        Ok(RefData {
            name: data.name.clone(),
            target: RefTarget::Direct(oid),
        })
    }

    fn expand_oid(&self, spec: &str) -> RefResult<Oid> {
        if spec.len() == 40 {
            return Oid::from_hex(spec);
        }
        // Minimum abbreviation length follows git: four hex chars.
        if spec.len() < 4 || spec.len() > 40 || !spec.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RefError::InvalidOid {
                value: spec.to_string(),
            });
        }

        let inner = self.read();
        let mut matches = inner
            .objects
            .range(spec.to_string()..)
            .take_while(|hex| hex.starts_with(spec));

        let first = matches.next().ok_or_else(|| RefError::NotFound {
            name: spec.to_string(),
        })?;
        if matches.next().is_some() {
            return Err(RefError::AmbiguousOid {
                prefix: spec.to_string(),
            });
        }

        Oid::from_hex(first)
    }

    fn open_reflog(&self, name: &str) -> RefResult<Box<dyn ReflogSource>> {
        let inner = self.read();
        let records = inner.logs.get(name).cloned().unwrap_or_default();
        Ok(Box::new(MemoryReflog(records)))
    }
}

/// Snapshot of one ref's history at open time.
struct MemoryReflog(Vec<ReflogRecord>);

impl ReflogSource for MemoryReflog {
    fn entry_count(&self) -> usize {
        self.0.len()
    }

    fn entry_at(&self, index: usize) -> Option<&ReflogRecord> {
        self.0.get(index)
    }
}
