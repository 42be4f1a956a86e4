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

//! End-to-end reference handle semantics over the file-backed store.

use refbase_core::{Oid, RefError, RefKind, RefLogEntry, RefTarget, Reference};
use refbase_store::FileRefStore;
use std::sync::Arc;
use tempfile::TempDir;

fn open_store() -> (TempDir, Arc<FileRefStore>) {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FileRefStore::open(tmp.path()).unwrap());
    (tmp, store)
}

#[test]
fn direct_resolution_is_idempotent() {
    let (_tmp, store) = open_store();
    let oid = Oid::hash(b"commit");
    let r = Reference::create_direct(store, "refs/heads/main", oid, false).unwrap();

    let resolved = r.resolve().unwrap();
    assert_eq!(resolved.name().unwrap(), r.name().unwrap());
    assert_eq!(resolved.kind().unwrap(), r.kind().unwrap());
    assert_eq!(resolved.target().unwrap(), r.target().unwrap());
}

#[test]
fn symbolic_resolution_reaches_the_direct_tip() {
    let (_tmp, store) = open_store();
    let oid = Oid::hash(b"X");
    Reference::create_direct(store.clone(), "refs/heads/b", oid, false).unwrap();
    Reference::create_symbolic(store.clone(), "refs/heads/a", "refs/heads/b", false).unwrap();

    let a = Reference::lookup(store, "refs/heads/a").unwrap();
    let resolved = a.resolve().unwrap();

    assert_eq!(resolved.kind().unwrap(), RefKind::Direct);
    assert_eq!(resolved.target().unwrap(), RefTarget::Direct(oid));
}

#[test]
fn delete_invalidates_the_handle_permanently() {
    let (_tmp, store) = open_store();
    let oid = Oid::hash(b"commit");
    let mut r = Reference::create_direct(store, "refs/heads/doomed", oid, false).unwrap();

    r.delete().unwrap();

    assert!(matches!(r.name().unwrap_err(), RefError::UseAfterDelete));
    assert!(matches!(
        r.rename("refs/heads/reborn").unwrap_err(),
        RefError::UseAfterDelete
    ));
    assert!(matches!(
        r.set_target("refs/heads/other").unwrap_err(),
        RefError::UseAfterDelete
    ));
}

#[test]
fn rename_is_all_or_nothing() {
    let (_tmp, store) = open_store();
    let oid = Oid::hash(b"commit");
    let mut r = Reference::create_direct(store.clone(), "refs/heads/a", oid, false).unwrap();

    // Success: new name resolvable, old name gone.
    r.rename("refs/heads/c").unwrap();
    assert_eq!(r.name().unwrap(), "refs/heads/c");
    assert!(Reference::lookup(store.clone(), "refs/heads/a").is_err());
    assert!(Reference::lookup(store.clone(), "refs/heads/c").is_ok());

    // Failure: handle and store untouched.
    Reference::create_direct(store.clone(), "refs/heads/taken", oid, false).unwrap();
    assert!(matches!(
        r.rename("refs/heads/taken").unwrap_err(),
        RefError::Conflict { .. }
    ));
    assert_eq!(r.name().unwrap(), "refs/heads/c");
    assert!(Reference::lookup(store, "refs/heads/c").is_ok());
}

#[test]
fn reflog_is_ordered_and_copy_independent() {
    let (_tmp, store) = open_store();
    let mut r =
        Reference::create_direct(store, "refs/heads/main", Oid::hash(b"c1"), false).unwrap();
    r.set_target_oid(Oid::hash(b"c2")).unwrap();
    r.set_target_oid(Oid::hash(b"c3")).unwrap();

    let log = r.log().unwrap();
    assert_eq!(log.entry_count(), 3);

    let entries: Vec<RefLogEntry> = log.iter().collect();
    drop(log);
    drop(r);

    // Oldest first: create, then the two updates.
    assert_eq!(entries[0].old_oid, Oid::ZERO.to_hex());
    assert_eq!(entries[0].new_oid, Oid::hash(b"c1").to_hex());
    assert_eq!(entries[1].old_oid, Oid::hash(b"c1").to_hex());
    assert_eq!(entries[1].new_oid, Oid::hash(b"c2").to_hex());
    assert_eq!(entries[2].old_oid, Oid::hash(b"c2").to_hex());
    assert_eq!(entries[2].new_oid, Oid::hash(b"c3").to_hex());
}

#[test]
fn reflog_iterator_terminates_and_stays_terminated() {
    let (_tmp, store) = open_store();
    let mut r =
        Reference::create_direct(store, "refs/heads/main", Oid::hash(b"c1"), false).unwrap();
    r.set_target_oid(Oid::hash(b"c2")).unwrap();
    r.set_target_oid(Oid::hash(b"c3")).unwrap();

    let log = r.log().unwrap();
    let mut iter = log.iter();
    for _ in 0..3 {
        assert!(iter.next().is_some());
    }
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn reflog_snapshot_ignores_later_mutations() {
    let (_tmp, store) = open_store();
    let mut r =
        Reference::create_direct(store, "refs/heads/main", Oid::hash(b"c1"), false).unwrap();

    let log = r.log().unwrap();
    assert_eq!(log.entry_count(), 1);

    r.set_target_oid(Oid::hash(b"c2")).unwrap();
    assert_eq!(log.entry_count(), 1);
    assert_eq!(r.log().unwrap().entry_count(), 2);
}

#[test]
fn set_target_expands_abbreviated_specs() {
    let (_tmp, store) = open_store();
    let oid = Oid::hash(b"c1");
    let next = Oid::hash(b"c2");
    store.register_object(next).unwrap();
    let mut r = Reference::create_direct(store, "refs/heads/main", oid, false).unwrap();

    r.set_target(&next.to_hex()[..10]).unwrap();
    assert_eq!(r.target().unwrap(), RefTarget::Direct(next));
}

#[test]
fn set_target_on_symbolic_redirects_it() {
    let (_tmp, store) = open_store();
    let oid = Oid::hash(b"c1");
    Reference::create_direct(store.clone(), "refs/heads/main", oid, false).unwrap();
    Reference::create_direct(store.clone(), "refs/heads/dev", oid, false).unwrap();
    let mut head =
        Reference::create_symbolic(store, "HEAD", "refs/heads/main", false).unwrap();

    head.set_target("refs/heads/dev").unwrap();
    assert_eq!(
        head.target().unwrap(),
        RefTarget::Symbolic("refs/heads/dev".to_string())
    );
    assert_eq!(head.resolve().unwrap().name().unwrap(), "refs/heads/dev");
}

#[test]
fn handles_stay_valid_across_store_handles() {
    // A Reflog opened before the reference is deleted keeps working.
    let (_tmp, store) = open_store();
    let mut r =
        Reference::create_direct(store, "refs/heads/main", Oid::hash(b"c1"), false).unwrap();
    r.set_target_oid(Oid::hash(b"c2")).unwrap();

    let log = r.log().unwrap();
    r.delete().unwrap();

    let entries: Vec<RefLogEntry> = log.iter().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].new_oid, Oid::hash(b"c2").to_hex());
}
