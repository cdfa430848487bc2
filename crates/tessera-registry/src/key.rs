// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache key derivation.
//!
//! Entry keys have the form `{namespace}_{family}:{generation}:{qualifier}`.
//! Namespace and family cannot contain `:` and the generation is a UUID, so
//! two different qualifiers (or families) never map to the same key. Each
//! family also owns a generation key, `{namespace}_{family}:generation`,
//! whose value is the current generation token, and a qualifier list key,
//! `{namespace}_{family}:qualifiers`, naming the qualifiers cached under
//! that generation.

use tessera_core::{Family, Qualifier, TesseraError};

/// Default namespace prefix for all keys.
pub const DEFAULT_NAMESPACE: &str = "tessera";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    namespace: String,
}

impl CacheKeys {
    /// `namespace` follows the same character rules as family names.
    pub fn new(namespace: impl Into<String>) -> Result<Self, TesseraError> {
        let namespace = namespace.into();
        Family::new(namespace.as_str())
            .map_err(|_| TesseraError::Config(format!("invalid cache namespace `{namespace}`")))?;
        Ok(Self { namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn generation(&self, family: &Family) -> String {
        format!("{}_{family}:generation", self.namespace)
    }

    pub fn qualifiers(&self, family: &Family) -> String {
        format!("{}_{family}:qualifiers", self.namespace)
    }

    pub fn entry(&self, family: &Family, generation: &str, qualifier: &Qualifier) -> String {
        format!("{}_{family}:{generation}:{qualifier}", self.namespace)
    }
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Whether `token` can be used as a generation in an entry key.
pub(crate) fn is_valid_generation(token: &str) -> bool {
    !token.is_empty()
        && token != "generation"
        && token != "qualifiers"
        && token.chars().all(|c| c.is_ascii_alphanumeric())
}
