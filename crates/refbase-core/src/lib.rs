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

//! Reference and reflog model for content-addressed object stores
//!
//! This crate implements the in-memory reference subsystem of Refbase:
//! - **OIDs**: 20-byte content identifiers with a 40-hex codec
//! - **References**: owned handles over named pointers, direct
//!   (OID-targeted) or symbolic (name-targeted), with in-place rename
//!   and target updates and strict use-after-delete guarding
//! - **Reflogs**: read-once snapshots of a reference's mutation
//!   history, iterated oldest-first into fully owned entries
//! - **The store seam**: the [`RefStore`] trait through which all
//!   persistence flows; [`MemoryRefStore`] is the in-process
//!   implementation, and `refbase-store` provides the file-backed one
//!
//! # Architecture
//!
//! A [`Reference`] owns exactly one [`RefData`] snapshot. Every
//! mutation is one atomic store call that returns the replacement
//! snapshot; the handle swaps it in only on success, so callers never
//! observe a half-updated reference. `delete` empties the slot, and
//! every later call fails with [`RefError::UseAfterDelete`].
//!
//! # Examples
//!
//! ```
//! use refbase_core::{MemoryRefStore, Oid, RefKind, Reference};
//! use std::sync::Arc;
//!
//! # fn main() -> refbase_core::RefResult<()> {
//! let store = Arc::new(MemoryRefStore::new());
//! let oid = Oid::hash(b"first commit");
//! store.insert_object(oid);
//!
//! let branch = Reference::create_direct(store.clone(), "refs/heads/main", oid, false)?;
//! let head = Reference::create_symbolic(store, "HEAD", "refs/heads/main", false)?;
//!
//! let resolved = head.resolve()?;
//! assert_eq!(resolved.kind()?, RefKind::Direct);
//! assert_eq!(resolved.peel_oid()?, branch.peel_oid()?);
//!
//! for entry in &branch.log()? {
//!     println!("{} -> {}: {}", entry.old_oid, entry.new_oid, entry.message);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod names;
mod oid;
mod reference;
mod reflog;
mod signature;
mod store;

pub use error::{RefError, RefResult};
pub use memory::MemoryRefStore;
pub use names::validate_ref_name;
pub use oid::Oid;
pub use reference::Reference;
pub use reflog::{RefLogEntry, RefLogIter, Reflog};
pub use signature::Signature;
pub use store::{RefData, RefKind, RefStore, RefTarget, ReflogRecord, ReflogSource};
