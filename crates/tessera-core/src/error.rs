// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tessera component registry.
//!
//! Each layer has its own error enum ([`DiscoveryError`], [`ConstructionError`],
//! [`CacheError`]); [`TesseraError`] is what the registry facade returns.

use std::fmt;

use thiserror::Error;

use crate::types::ValueKind;

/// Boxed error used for opaque failures raised by backends and constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Scan-time failures. A scan never drops or overwrites an offending candidate.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Two candidates in the same family declared the same id.
    #[error("duplicate component id `{id}` in family `{family}`: declared by {first} and {second}")]
    DuplicateId {
        family: String,
        id: String,
        first: String,
        second: String,
    },

    /// A candidate omitted a field every definition must carry.
    #[error("{candidate}: missing required field `{field}`")]
    MissingField {
        candidate: String,
        field: &'static str,
    },

    /// A source location could not be read.
    #[error("cannot read {candidate}: {source}")]
    Unreadable {
        candidate: String,
        #[source]
        source: std::io::Error,
    },

    /// A candidate was readable but its metadata could not be interpreted.
    #[error("{candidate}: {reason}")]
    Malformed { candidate: String, reason: String },
}

impl DiscoveryError {
    /// Name of the candidate (or source) the error refers to.
    pub fn candidate(&self) -> &str {
        match self {
            DiscoveryError::DuplicateId { second, .. } => second,
            DiscoveryError::MissingField { candidate, .. }
            | DiscoveryError::Unreadable { candidate, .. }
            | DiscoveryError::Malformed { candidate, .. } => candidate,
        }
    }
}

/// A single problem found while checking a construction config against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    /// A required key is absent.
    Missing { key: String },
    /// A key is present but holds a value of the wrong kind.
    WrongType {
        key: String,
        expected: ValueKind,
        found: &'static str,
    },
    /// A key is not declared by a strict schema.
    Unknown { key: String },
}

impl ConfigProblem {
    /// The configuration key this problem concerns.
    pub fn key(&self) -> &str {
        match self {
            ConfigProblem::Missing { key }
            | ConfigProblem::WrongType { key, .. }
            | ConfigProblem::Unknown { key } => key,
        }
    }
}

impl fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigProblem::Missing { key } => write!(f, "missing required key `{key}`"),
            ConfigProblem::WrongType {
                key,
                expected,
                found,
            } => write!(f, "key `{key}` expects {expected}, found {found}"),
            ConfigProblem::Unknown { key } => write!(f, "unknown key `{key}`"),
        }
    }
}

fn join_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Factory-time failures.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// No constructor is registered for the definition's handle.
    #[error("component `{id}`: no constructor registered for handle `{handle}`")]
    UnresolvedHandle { id: String, handle: String },

    /// The supplied configuration does not satisfy the definition's schema.
    /// Every problem is listed, not just the first one found.
    #[error("component `{id}`: invalid configuration: {}", join_problems(.problems))]
    InvalidConfig {
        id: String,
        problems: Vec<ConfigProblem>,
    },

    /// The constructor itself failed.
    #[error("component `{id}`: constructor failed: {source}")]
    Constructor {
        id: String,
        #[source]
        source: BoxError,
    },
}

/// Cache store failures. The decorator downgrades these to misses on reads.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store failed or is unreachable.
    #[error("cache backend error: {source}")]
    Backend {
        #[source]
        source: BoxError,
    },

    /// A stored value could not be encoded or decoded.
    #[error("cache entry `{key}` could not be decoded: {reason}")]
    Codec { key: String, reason: String },
}

impl CacheError {
    /// Wrap any backend error.
    pub fn backend(err: impl Into<BoxError>) -> Self {
        CacheError::Backend { source: err.into() }
    }
}

/// The primary error type returned by registry operations.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// Definition discovery failed.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Instantiating a component failed.
    #[error("construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// The requested id is not in the current definition index.
    #[error("unknown component: {family}/{id}")]
    UnknownComponent { family: String, id: String },

    /// Cache store error surfaced by an explicit invalidation.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Invalid names, settings, or other configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_lists_every_problem() {
        let err = ConstructionError::InvalidConfig {
            id: "default".into(),
            problems: vec![
                ConfigProblem::Missing { key: "url".into() },
                ConfigProblem::Missing {
                    key: "timeout".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("`url`"), "got: {msg}");
        assert!(msg.contains("`timeout`"), "got: {msg}");
    }

    #[test]
    fn wrong_type_names_expected_and_found() {
        let problem = ConfigProblem::WrongType {
            key: "retries".into(),
            expected: ValueKind::Integer,
            found: "string",
        };
        assert_eq!(problem.key(), "retries");
        assert_eq!(problem.to_string(), "key `retries` expects integer, found string");
    }

    #[test]
    fn discovery_errors_convert_into_tessera_error() {
        let err: TesseraError = DiscoveryError::MissingField {
            candidate: "a/component.toml#component[0]".into(),
            field: "id",
        }
        .into();
        assert!(matches!(err, TesseraError::Discovery(_)));
        assert!(err.to_string().contains("missing required field `id`"));
    }

    #[test]
    fn duplicate_id_names_both_candidates() {
        let err = DiscoveryError::DuplicateId {
            family: "fetcher".into(),
            id: "default".into(),
            first: "a.toml".into(),
            second: "b.toml".into(),
        };
        assert_eq!(err.candidate(), "b.toml");
        let msg = err.to_string();
        assert!(msg.contains("a.toml") && msg.contains("b.toml"));
    }
}
