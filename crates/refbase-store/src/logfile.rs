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

//! Reflog line format
//!
//! Entries are stored one per line, oldest first:
//!
//! ```text
//! <old_oid> <new_oid> <name> <email> <timestamp> <tz>\t<message>
//! ```

use chrono::{TimeZone, Utc};
use refbase_core::{Oid, RefError, RefResult, ReflogRecord, Signature};

/// Format a record as a single reflog line (newline-terminated)
pub fn to_line(record: &ReflogRecord) -> String {
    let timestamp = record.committer.timestamp.timestamp();

    format!(
        "{} {} {} <{}> {} +0000\t{}\n",
        record.old_oid.to_hex(),
        record.new_oid.to_hex(),
        record.committer.name,
        record.committer.email,
        timestamp,
        record.message
    )
}

/// Parse one reflog line
///
/// `ref_name` is error context only.
pub fn parse_line(ref_name: &str, line: &str) -> RefResult<ReflogRecord> {
    let invalid = |reason: String| RefError::InvalidReference {
        name: ref_name.to_string(),
        reason,
    };

    let (header, message) = line
        .split_once('\t')
        .ok_or_else(|| invalid("reflog line missing tab separator".into()))?;
    let message = message.trim_end().to_string();

    let header_parts: Vec<&str> = header.split_whitespace().collect();
    if header_parts.len() < 6 {
        return Err(invalid("reflog header has too few fields".into()));
    }

    let old_oid = Oid::from_hex(header_parts[0])
        .map_err(|_| invalid("invalid old oid in reflog line".into()))?;
    let new_oid = Oid::from_hex(header_parts[1])
        .map_err(|_| invalid("invalid new oid in reflog line".into()))?;

    // The committer name may contain spaces; locate the bracketed email.
    let header_rest = header_parts[2..].join(" ");
    let email_start = header_rest
        .find('<')
        .ok_or_else(|| invalid("missing email start bracket".into()))?;
    // Search only past the opening bracket so a stray `>` before it
    // cannot yield an inverted slice range.
    let email_end = header_rest[email_start..]
        .find('>')
        .map(|i| email_start + i)
        .ok_or_else(|| invalid("missing email end bracket".into()))?;

    let name = header_rest[..email_start].trim().to_string();
    let email = header_rest[email_start + 1..email_end].to_string();

    let after_email = header_rest[email_end + 1..].trim();
    let timestamp_str = after_email
        .split_whitespace()
        .next()
        .ok_or_else(|| invalid("missing timestamp in reflog line".into()))?;
    let timestamp: i64 = timestamp_str
        .parse()
        .map_err(|_| invalid(format!("invalid timestamp: {timestamp_str:?}")))?;
    let datetime = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| invalid(format!("timestamp out of range: {timestamp}")))?;

    Ok(ReflogRecord {
        old_oid,
        new_oid,
        committer: Signature {
            name,
            email,
            timestamp: datetime,
        },
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> ReflogRecord {
        ReflogRecord {
            old_oid: Oid::ZERO,
            new_oid: Oid::hash(b"commit"),
            committer: Signature::new(
                "Test User".to_string(),
                "test@example.com".to_string(),
                Utc.timestamp_opt(1_700_000_000, 0).single().unwrap(),
            ),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_line_roundtrip() {
        let original = record("commit: Test commit");
        let line = to_line(&original);
        let parsed = parse_line("HEAD", line.trim_end()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_empty_message_roundtrip() {
        let original = record("");
        let parsed = parse_line("HEAD", to_line(&original).trim_end()).unwrap();
        assert_eq!(parsed.message, "");
    }

    #[test]
    fn test_name_with_spaces() {
        let mut original = record("update");
        original.committer.name = "Ada Byron Lovelace".to_string();
        let parsed = parse_line("HEAD", to_line(&original).trim_end()).unwrap();
        assert_eq!(parsed.committer.name, "Ada Byron Lovelace");
        assert_eq!(parsed.committer.email, "test@example.com");
    }

    #[test]
    fn test_missing_tab_rejected() {
        assert!(matches!(
            parse_line("HEAD", "no tab here").unwrap_err(),
            RefError::InvalidReference { .. }
        ));
    }

    #[test]
    fn test_bad_oid_rejected() {
        let line = format!("xyz {} u <u@e> 1700000000 +0000\tm", Oid::ZERO.to_hex());
        assert!(parse_line("HEAD", &line).is_err());
    }

    #[test]
    fn test_inverted_brackets_rejected() {
        // A `>` before the `<` must be a parse error, not a panic.
        let line = format!(
            "{} {} > < 1 +0000\tmsg",
            Oid::ZERO.to_hex(),
            Oid::ZERO.to_hex()
        );
        assert!(matches!(
            parse_line("refs/heads/main", &line).unwrap_err(),
            RefError::InvalidReference { .. }
        ));
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let line = format!(
            "{} {} u <u@e> notanumber +0000\tm",
            Oid::ZERO.to_hex(),
            Oid::ZERO.to_hex()
        );
        assert!(parse_line("HEAD", &line).is_err());
    }
}
