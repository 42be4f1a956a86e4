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

//! File-backed reference store
//!
//! Layout under the store root:
//! - `HEAD`, `refs/heads/*`, `refs/tags/*` — loose ref files
//! - `logs/<ref name>` — reflog files, one line per mutation
//! - `objects/aa/<38 hex>` — loose object index scanned by
//!   abbreviated-oid expansion
//! - `config.toml` — identity configuration
//!
//! Ref writes go through a temp file plus rename so a crashed writer
//! never leaves a half-written ref behind.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use refbase_core::{
    validate_ref_name, Oid, RefData, RefError, RefResult, RefStore, RefTarget, ReflogRecord,
    ReflogSource,
};
use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::logfile;
use crate::reffile;

/// Symbolic chains longer than this are treated as cycles.
const MAX_RESOLVE_DEPTH: usize = 10;

/// Top-level store-metadata names that can never be references.
const RESERVED_NAMES: &[&str] = &["config.toml", "logs", "objects"];

/// Validate a name that will be written under the store root.
///
/// On top of the general naming rules, names whose first path component
/// is store metadata are rejected so a reference write can never
/// clobber `config.toml` or stray into `logs/` or `objects/`.
fn validate_store_name(name: &str) -> RefResult<()> {
    validate_ref_name(name)?;
    let first = name.split('/').next().unwrap_or(name);
    if RESERVED_NAMES.contains(&first) {
        return Err(RefError::InvalidName {
            name: name.to_string(),
            reason: "name is reserved for store metadata".to_string(),
        });
    }
    Ok(())
}

/// A [`RefStore`] persisting references as loose files
///
/// # Examples
///
/// ```no_run
/// use refbase_core::{Oid, Reference};
/// use refbase_store::FileRefStore;
/// use std::sync::Arc;
///
/// # fn main() -> refbase_core::RefResult<()> {
/// let store = Arc::new(FileRefStore::open("/tmp/refbase")?);
/// let oid = Oid::hash(b"commit");
/// store.register_object(oid)?;
///
/// let mut branch = Reference::create_direct(store, "refs/heads/main", oid, false)?;
/// branch.rename("refs/heads/trunk")?;
/// # Ok(())
/// # }
/// ```
pub struct FileRefStore {
    /// Store root directory.
    root: PathBuf,
    identity: IdentityConfig,
}

impl FileRefStore {
    /// Open a store at `root`, creating the directory if needed
    ///
    /// Loads the committer identity from `<root>/config.toml`, falling
    /// back to the default identity. `REFBASE_IDENTITY_NAME` and
    /// `REFBASE_IDENTITY_EMAIL` override either.
    pub fn open<P: AsRef<Path>>(root: P) -> RefResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        let identity = IdentityConfig::load(&root)?.from_env();
        Ok(Self { root, identity })
    }

    /// Open a store with an explicit identity, ignoring `config.toml`
    pub fn with_identity<P: AsRef<Path>>(root: P, identity: IdentityConfig) -> RefResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root, identity })
    }

    /// The store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record an object id in the loose object index
    ///
    /// Touches the `objects/aa/<38 hex>` fan-out entry so abbreviated
    /// specs can expand to `oid`. The store indexes names only; object
    /// contents belong to the object database.
    pub fn register_object(&self, oid: Oid) -> RefResult<()> {
        let path = self.root.join("objects").join(oid.to_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(&path)?;
        Ok(())
    }

    fn ref_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn log_path(&self, name: &str) -> PathBuf {
        self.root.join("logs").join(name)
    }

    /// Read and parse one loose ref file.
    fn read_ref(&self, name: &str) -> RefResult<RefTarget> {
        match fs::read(self.ref_path(name)) {
            Ok(data) => reffile::parse(name, &data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RefError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a ref file atomically via temp file + rename.
    ///
    /// The temp file appends `.lock` to the full name. Valid ref names
    /// cannot end in `.lock`, so the temp path can never collide with
    /// a sibling reference.
    fn write_ref(&self, name: &str, target: &RefTarget) -> RefResult<()> {
        let path = self.ref_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.ref_path(&format!("{name}.lock"));
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&reffile::serialize(target))?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &path)?;
        debug!(ref_name = %name, "Wrote reference");
        Ok(())
    }

    fn ref_exists(&self, name: &str) -> bool {
        self.ref_path(name).is_file()
    }

    fn append_log(&self, name: &str, record: &ReflogRecord) -> RefResult<()> {
        let path = self.log_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(logfile::to_line(record).as_bytes())?;
        Ok(())
    }

    fn log_create(&self, name: &str, old_oid: Oid, new_oid: Oid) -> RefResult<()> {
        self.append_log(
            name,
            &ReflogRecord {
                old_oid,
                new_oid,
                committer: self.identity.signature(),
                message: format!("create: {name}"),
            },
        )
    }
}

impl RefStore for FileRefStore {
    fn lookup(&self, name: &str) -> RefResult<RefData> {
        let target = self.read_ref(name)?;
        Ok(RefData {
            name: name.to_string(),
            target,
        })
    }

    fn create_direct(&self, name: &str, oid: Oid, force: bool) -> RefResult<RefData> {
        validate_store_name(name)?;

        if !force && self.ref_exists(name) {
            return Err(RefError::Conflict {
                name: name.to_string(),
            });
        }
        let old_oid = match self.read_ref(name) {
            Ok(RefTarget::Direct(existing)) => existing,
            _ => Oid::ZERO,
        };

        let target = RefTarget::Direct(oid);
        self.write_ref(name, &target)?;
        self.log_create(name, old_oid, oid)?;

        Ok(RefData {
            name: name.to_string(),
            target,
        })
    }

    fn create_symbolic(&self, name: &str, target: &str, force: bool) -> RefResult<RefData> {
        validate_store_name(name)?;
        validate_ref_name(target)?;

        if !force && self.ref_exists(name) {
            return Err(RefError::Conflict {
                name: name.to_string(),
            });
        }

        let target = RefTarget::Symbolic(target.to_string());
        self.write_ref(name, &target)?;

        Ok(RefData {
            name: name.to_string(),
            target,
        })
    }

    fn resolve(&self, data: &RefData) -> RefResult<RefData> {
        let mut current = data.name.clone();
        let mut target = data.target.clone();

        for _ in 0..MAX_RESOLVE_DEPTH {
            match target {
                RefTarget::Direct(_) => {
                    debug!(ref_name = %data.name, resolved = %current, "Resolved reference");
                    return Ok(RefData {
                        name: current,
                        target,
                    });
                }
                RefTarget::Symbolic(next) => {
                    target = self.read_ref(&next)?;
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
        validate_store_name(new_name)?;

        let target = self.read_ref(&data.name)?;
        if new_name == data.name {
            return Ok(RefData {
                name: new_name.to_string(),
                target,
            });
        }
        if !force && self.ref_exists(new_name) {
            return Err(RefError::Conflict {
                name: new_name.to_string(),
            });
        }

        let new_path = self.ref_path(new_name);
        if let Some(parent) = new_path.parent() {
            fs::create_dir_all(parent)?;
        }
        // One atomic move: at no point is the ref reachable under both
        // names or neither.
        fs::rename(self.ref_path(&data.name), &new_path)?;

        // The reflog follows the reference to its new name.
        let old_log = self.log_path(&data.name);
        if old_log.is_file() {
            let new_log = self.log_path(new_name);
            if let Some(parent) = new_log.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&old_log, &new_log)?;
        }
        if let RefTarget::Direct(oid) = target {
            self.append_log(
                new_name,
                &ReflogRecord {
                    old_oid: oid,
                    new_oid: oid,
                    committer: self.identity.signature(),
                    message: format!("rename: {} -> {}", data.name, new_name),
                },
            )?;
        }

        debug!(old_name = %data.name, new_name = %new_name, "Renamed reference");
        Ok(RefData {
            name: new_name.to_string(),
            target,
        })
    }

    fn delete(&self, data: &RefData) -> RefResult<()> {
        match fs::remove_file(self.ref_path(&data.name)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RefError::NotFound {
                    name: data.name.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        let log = self.log_path(&data.name);
        if log.is_file() {
            fs::remove_file(&log)?;
        }

        debug!(ref_name = %data.name, "Deleted reference");
        Ok(())
    }

    fn set_symbolic_target(&self, data: &RefData, target: &str) -> RefResult<RefData> {
        validate_ref_name(target)?;

        // Refuse to resurrect a ref that vanished out-of-band.
        self.read_ref(&data.name)?;

        let target = RefTarget::Symbolic(target.to_string());
        self.write_ref(&data.name, &target)?;

        Ok(RefData {
            name: data.name.clone(),
            target,
        })
    }

    fn set_direct_target(&self, data: &RefData, oid: Oid) -> RefResult<RefData> {
        let old_oid = match self.read_ref(&data.name)? {
            RefTarget::Direct(existing) => existing,
            RefTarget::Symbolic(_) => Oid::ZERO,
        };

        let target = RefTarget::Direct(oid);
        self.write_ref(&data.name, &target)?;
        self.append_log(
            &data.name,
            &ReflogRecord {
                old_oid,
                new_oid: oid,
                committer: self.identity.signature(),
                message: format!("update: {}", data.name),
            },
        )?;

        Ok(RefData {
            name: data.name.clone(),
            target,
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

        let fanout = self.root.join("objects").join(&spec[..2]);
        let rest = &spec[2..];

        let entries = match fs::read_dir(&fanout) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RefError::NotFound {
                    name: spec.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut matched: Option<String> = None;
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with(rest) {
                if matched.is_some() {
                    return Err(RefError::AmbiguousOid {
                        prefix: spec.to_string(),
                    });
                }
                matched = Some(format!("{}{}", &spec[..2], file_name));
            }
        }

        let hex = matched.ok_or_else(|| RefError::NotFound {
            name: spec.to_string(),
        })?;
        Oid::from_hex(&hex)
    }

    fn open_reflog(&self, name: &str) -> RefResult<Box<dyn ReflogSource>> {
        let path = self.log_path(name);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match logfile::parse_line(name, line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(ref_name = %name, error = %e, "Skipping invalid reflog line");
                }
            }
        }

        Ok(Box::new(FileReflog(records)))
    }
}

/// Snapshot of one ref's history, parsed at open time.
struct FileReflog(Vec<ReflogRecord>);

impl ReflogSource for FileReflog {
    fn entry_count(&self) -> usize {
        self.0.len()
    }

    fn entry_at(&self, index: usize) -> Option<&ReflogRecord> {
        self.0.get(index)
    }
}
