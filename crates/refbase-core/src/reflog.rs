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

//! Reference log (reflog): the mutation history of one reference
//!
//! [`Reflog`] is a read-only snapshot taken at open time; later changes
//! to the reference are not reflected. Iteration is single-pass and
//! oldest-first, and every yielded [`RefLogEntry`] owns independent
//! copies of its fields, so entries stay valid after the `Reflog`
//! itself is dropped. Re-iterating requires a fresh
//! [`Reference::log`](crate::Reference::log) call.

use crate::signature::Signature;
use crate::store::ReflogSource;

/// One recorded mutation, copied out of the log at read time
///
/// Fully owned value: no field borrows from the [`Reflog`] it came
/// from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefLogEntry {
    /// Hex OID of the state before this mutation
    pub old_oid: String,
    /// Hex OID of the state after this mutation
    pub new_oid: String,
    /// Who performed the mutation
    pub committer: Signature,
    /// Description of the mutation (may be empty)
    pub message: String,
}

/// Snapshot of a reference's mutation history
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
/// let r = Reference::create_direct(store, "refs/heads/main", oid, false)?;
///
/// for entry in &r.log()? {
///     println!("{} -> {}: {}", entry.old_oid, entry.new_oid, entry.message);
/// }
/// # Ok::<(), refbase_core::RefError>(())
/// ```
pub struct Reflog {
    source: Box<dyn ReflogSource>,
    /// Entry count snapshotted at open time.
    size: usize,
}

impl std::fmt::Debug for Reflog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflog")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl Reflog {
    /// Wrap a store-provided history source, snapshotting its size
    pub fn new(source: Box<dyn ReflogSource>) -> Self {
        let size = source.entry_count();
        Self { source, size }
    }

    /// Number of entries in this snapshot
    pub fn entry_count(&self) -> usize {
        self.size
    }

    /// Whether the snapshot contains no entries
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Iterate the entries, oldest first
    pub fn iter(&self) -> RefLogIter<'_> {
        RefLogIter {
            log: self,
            size: self.size,
            i: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Reflog {
    type Item = RefLogEntry;
    type IntoIter = RefLogIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Single-pass, forward-only producer of [`RefLogEntry`] values
///
/// Cursor runs from 0 (oldest entry) to the size snapshot; once
/// exhausted it stays exhausted.
pub struct RefLogIter<'a> {
    log: &'a Reflog,
    size: usize,
    i: usize,
}

impl Iterator for RefLogIter<'_> {
    type Item = RefLogEntry;

    fn next(&mut self) -> Option<RefLogEntry> {
        if self.i < self.size {
            let record = self.log.source.entry_at(self.i)?;

            // Copy every field out of the store-owned record so the
            // entry outlives both this iterator and the Reflog.
            let entry = RefLogEntry {
                old_oid: record.old_oid.to_hex(),
                new_oid: record.new_oid.to_hex(),
                committer: record.committer.clone(),
                message: record.message.clone(),
            };

            self.i += 1;
            Some(entry)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.i;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RefLogIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid::Oid;
    use crate::store::ReflogRecord;

    struct VecSource(Vec<ReflogRecord>);

    impl ReflogSource for VecSource {
        fn entry_count(&self) -> usize {
            self.0.len()
        }

        fn entry_at(&self, index: usize) -> Option<&ReflogRecord> {
            self.0.get(index)
        }
    }

    fn record(n: u8, message: &str) -> ReflogRecord {
        ReflogRecord {
            old_oid: Oid::hash(&[n]),
            new_oid: Oid::hash(&[n + 1]),
            committer: Signature::now("Tester".to_string(), "tester@example.com".to_string()),
            message: message.to_string(),
        }
    }

    fn three_entry_log() -> Reflog {
        Reflog::new(Box::new(VecSource(vec![
            record(0, "first"),
            record(1, "second"),
            record(2, "third"),
        ])))
    }

    #[test]
    fn test_oldest_first_order() {
        let log = three_entry_log();
        let messages: Vec<String> = log.iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_entry_count() {
        let log = three_entry_log();
        assert_eq!(log.entry_count(), 3);
        assert!(!log.is_empty());
        assert_eq!(log.iter().len(), 3);
    }

    #[test]
    fn test_iterator_terminates_and_stays_terminated() {
        let log = three_entry_log();
        let mut iter = log.iter();

        assert!(iter.next().is_some());
        assert!(iter.next().is_some());
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_entries_outlive_the_log() {
        let log = three_entry_log();
        let entries: Vec<RefLogEntry> = log.iter().collect();
        drop(log);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].old_oid, Oid::hash(&[0]).to_hex());
        assert_eq!(entries[0].new_oid, Oid::hash(&[1]).to_hex());
        assert_eq!(entries[2].message, "third");
        assert_eq!(entries[1].committer.email, "tester@example.com");
    }

    #[test]
    fn test_hex_encoded_ids() {
        let log = three_entry_log();
        let first = log.iter().next().unwrap();
        assert_eq!(first.old_oid.len(), 40);
        assert_eq!(first.new_oid.len(), 40);
    }

    #[test]
    fn test_empty_log() {
        let log = Reflog::new(Box::new(VecSource(Vec::new())));
        assert_eq!(log.entry_count(), 0);
        assert!(log.is_empty());
        assert!(log.iter().next().is_none());
    }
}
