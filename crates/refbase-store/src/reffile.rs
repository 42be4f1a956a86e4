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

//! Loose ref file format
//!
//! One file per reference, plain text:
//! - Direct ref: `<40-hex-oid>\n`
//! - Symbolic ref: `ref: <target>\n`

use refbase_core::{Oid, RefError, RefResult, RefTarget};

/// Serialize a target to its loose-file representation
pub fn serialize(target: &RefTarget) -> Vec<u8> {
    let content = match target {
        RefTarget::Direct(oid) => format!("{}\n", oid.to_hex()),
        RefTarget::Symbolic(name) => format!("ref: {name}\n"),
    };
    content.into_bytes()
}

/// Parse a loose ref file's contents
///
/// `name` is only used for error context; the file itself does not
/// record the reference's name.
pub fn parse(name: &str, data: &[u8]) -> RefResult<RefTarget> {
    let content = std::str::from_utf8(data)
        .map_err(|e| RefError::InvalidReference {
            name: name.to_string(),
            reason: format!("ref file is not valid UTF-8: {e}"),
        })?
        .trim();

    if let Some(target) = content.strip_prefix("ref: ") {
        return Ok(RefTarget::Symbolic(target.to_string()));
    }

    let oid = Oid::from_hex(content).map_err(|_| RefError::InvalidReference {
        name: name.to_string(),
        reason: format!("ref file contains neither a symbolic target nor a hex oid: {content:?}"),
    })?;
    Ok(RefTarget::Direct(oid))
}
