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

//! File-backed reference store for Refbase
//!
//! Implements [`refbase_core::RefStore`] over a directory of loose ref
//! files with per-ref reflog files, exactly the layout a git user would
//! recognize:
//!
//! ```text
//! <root>/HEAD                    ref: refs/heads/main
//! <root>/refs/heads/main        <40-hex oid>
//! <root>/logs/refs/heads/main   one reflog line per mutation
//! <root>/objects/aa/<38 hex>    loose object index (expansion only)
//! <root>/config.toml            committer identity
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use refbase_core::{Oid, Reference};
//! use refbase_store::FileRefStore;
//! use std::sync::Arc;
//!
//! # fn main() -> refbase_core::RefResult<()> {
//! let store = Arc::new(FileRefStore::open("/tmp/refbase")?);
//! let oid = Oid::hash(b"first commit");
//! store.register_object(oid)?;
//!
//! let branch = Reference::create_direct(store.clone(), "refs/heads/main", oid, false)?;
//! let head = Reference::create_symbolic(store, "HEAD", "refs/heads/main", false)?;
//! assert_eq!(head.resolve()?.peel_oid()?, branch.peel_oid()?);
//! # Ok(())
//! # }
//! ```

mod config;
mod logfile;
mod reffile;
mod store;

pub use config::IdentityConfig;
pub use store::FileRefStore;
