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

//! Identity configuration for the file-backed store
//!
//! The committer identity stamped on reflog entries comes from
//! `<root>/config.toml`:
//!
//! ```toml
//! [identity]
//! name = "Alice Developer"
//! email = "alice@example.com"
//! ```
//!
//! A missing file falls back to the default identity; a malformed file
//! is an error rather than a silent fallback.

use refbase_core::{RefError, RefResult, Signature};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Committer identity used for store-generated reflog entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Committer name
    #[serde(default = "default_name")]
    pub name: String,

    /// Committer email
    #[serde(default = "default_email")]
    pub email: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            email: default_email(),
        }
    }
}

fn default_name() -> String {
    "refbase".to_string()
}

fn default_email() -> String {
    "refbase@localhost".to_string()
}

/// On-disk shape of `config.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    identity: Option<IdentityConfig>,
}

impl IdentityConfig {
    /// Load the identity from `<root>/config.toml`
    ///
    /// Returns the default identity if the file does not exist or has
    /// no `[identity]` table.
    pub fn load(root: &Path) -> RefResult<Self> {
        let path = root.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| RefError::Config(format!("{}: {e}", path.display())))?;
        Ok(config.identity.unwrap_or_default())
    }

    /// Load the identity from environment variables, if set
    ///
    /// `REFBASE_IDENTITY_NAME` and `REFBASE_IDENTITY_EMAIL` override
    /// the given base configuration.
    pub fn from_env(mut self) -> Self {
        if let Ok(name) = std::env::var("REFBASE_IDENTITY_NAME") {
            self.name = name;
        }
        if let Ok(email) = std::env::var("REFBASE_IDENTITY_EMAIL") {
            self.email = email;
        }
        self
    }

    /// A signature for this identity at the current time
    pub fn signature(&self) -> Signature {
        Signature::now(self.name.clone(), self.email.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identity() {
        let config = IdentityConfig::default();
        assert_eq!(config.name, "refbase");
        assert_eq!(config.email, "refbase@localhost");
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let config = IdentityConfig::load(tmp.path()).unwrap();
        assert_eq!(config, IdentityConfig::default());
    }

    #[test]
    fn test_load_from_toml() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[identity]\nname = \"Alice\"\nemail = \"alice@example.com\"\n",
        )
        .unwrap();

        let config = IdentityConfig::load(tmp.path()).unwrap();
        assert_eq!(config.name, "Alice");
        assert_eq!(config.email, "alice@example.com");
    }

    #[test]
    fn test_load_partial_identity_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "[identity]\nname = \"Bob\"\n")
            .unwrap();

        let config = IdentityConfig::load(tmp.path()).unwrap();
        assert_eq!(config.name, "Bob");
        assert_eq!(config.email, "refbase@localhost");
    }

    #[test]
    fn test_load_malformed_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "not [ valid toml").unwrap();

        assert!(matches!(
            IdentityConfig::load(tmp.path()).unwrap_err(),
            RefError::Config(_)
        ));
    }

    #[test]
    fn test_env_overrides_base() {
        // Sole test touching these variables (the env is process-wide),
        // so the unset case is checked here too.
        let untouched = IdentityConfig::default().from_env();
        assert_eq!(untouched, IdentityConfig::default());

        std::env::set_var("REFBASE_IDENTITY_NAME", "Env User");
        std::env::set_var("REFBASE_IDENTITY_EMAIL", "env@example.com");

        let config = IdentityConfig::default().from_env();

        std::env::remove_var("REFBASE_IDENTITY_NAME");
        std::env::remove_var("REFBASE_IDENTITY_EMAIL");

        assert_eq!(config.name, "Env User");
        assert_eq!(config.email, "env@example.com");
    }

    #[test]
    fn test_signature_carries_identity() {
        let config = IdentityConfig {
            name: "Carol".to_string(),
            email: "carol@example.com".to_string(),
        };
        let sig = config.signature();
        assert_eq!(sig.name, "Carol");
        assert_eq!(sig.email, "carol@example.com");
    }
}
