// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean?" suggestions.
//!
//! Every configuration problem becomes a [`ConfigError`] carrying, where the
//! offending key can be found in a TOML source, a span into that source.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(tessera::config::unknown_key),
        help("{}", format_choices_help(suggestion.as_deref(), "valid keys", valid))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A string value is not one of the accepted variants.
    #[error("unknown value `{value}` for `{key}`")]
    #[diagnostic(
        code(tessera::config::unknown_variant),
        help("{}", format_choices_help(suggestion.as_deref(), "accepted values", valid))
    )]
    UnknownVariant {
        key: String,
        value: String,
        suggestion: Option<String>,
        valid: String,
        #[label("not an accepted value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(tessera::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(tessera::config::missing_key),
        help("add `{key} = <value>` to your tessera.toml")
    )]
    MissingKey { key: String },

    /// A value deserialized but violates a semantic rule.
    #[error("invalid value for `{key}`: {message}")]
    #[diagnostic(code(tessera::config::invalid_value))]
    Invalid {
        /// Dotted key path, e.g. `cache.database_path`.
        key: String,
        message: String,
        #[label("{message}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(tessera::config::other))]
    Other(String),
}

impl ConfigError {
    /// Semantic validation error for `key`, without a source location yet.
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
            span: None,
            src: None,
        }
    }

    /// Dotted key path the error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::UnknownKey { key, .. }
            | Self::UnknownVariant { key, .. }
            | Self::InvalidType { key, .. }
            | Self::MissingKey { key }
            | Self::Invalid { key, .. } => Some(key),
            Self::Other(_) => None,
        }
    }
}

fn format_choices_help(suggestion: Option<&str>, what: &str, valid: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {what}: {valid}"),
        None => format!("{what}: {valid}"),
    }
}

/// Convert a `figment::Error` into one [`ConfigError`] per contained error.
///
/// `toml_sources` holds `(name, content)` pairs used to resolve spans; a
/// file-backed error is matched by path, anything else by the first source
/// containing the key.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let valid: Vec<&str> = expected.to_vec();
                    let (span, src) = locate(&error, &path, field, toml_sources);
                    ConfigError::UnknownKey {
                        key: dotted(&path, Some(field.as_str())),
                        suggestion: suggest_key(field, &valid),
                        valid: valid.join(", "),
                        span,
                        src,
                    }
                }
                Kind::UnknownVariant(value, expected) => {
                    let valid: Vec<&str> = expected.to_vec();
                    let (sections, field) = split_last(&path);
                    let (span, src) = locate(&error, sections, field, toml_sources);
                    ConfigError::UnknownVariant {
                        key: path.join("."),
                        value: value.clone(),
                        suggestion: suggest_key(value, &valid),
                        valid: valid.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: dotted(&path, Some(&**field)),
                },
                Kind::InvalidType(actual, expected) => {
                    let (sections, field) = split_last(&path);
                    let (span, src) = locate(&error, sections, field, toml_sources);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        detail: format!("found {actual}, expected {expected}"),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Attach source spans to semantic validation errors.
pub fn attach_sources(
    errors: Vec<ConfigError>,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    errors
        .into_iter()
        .map(|error| match error {
            ConfigError::Invalid {
                key,
                message,
                span: None,
                src: None,
            } => {
                let path: Vec<String> = key.split('.').map(str::to_string).collect();
                let (sections, field) = split_last(&path);
                let (span, src) = first_match(sections, field, toml_sources);
                ConfigError::Invalid {
                    key,
                    message,
                    span,
                    src,
                }
            }
            other => other,
        })
        .collect()
}

fn dotted(path: &[String], field: Option<&str>) -> String {
    path.iter()
        .map(String::as_str)
        .chain(field)
        .collect::<Vec<_>>()
        .join(".")
}

fn split_last(path: &[String]) -> (&[String], &str) {
    match path.split_last() {
        Some((field, sections)) => (sections, field.as_str()),
        None => (&[], ""),
    }
}

type Located = (Option<SourceSpan>, Option<NamedSource<String>>);

/// Find a span for `field` in the file figment attributes the error to,
/// falling back to the first source containing it when that file is not
/// among `toml_sources`.
fn locate(
    error: &figment::error::Error,
    sections: &[String],
    field: &str,
    toml_sources: &[(String, String)],
) -> Located {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    let matching: Vec<(String, String)> = toml_sources
        .iter()
        .filter(|(name, _)| origin.as_deref() == Some(name.as_str()))
        .cloned()
        .collect();
    if matching.is_empty() {
        first_match(sections, field, toml_sources)
    } else {
        first_match(sections, field, &matching)
    }
}

fn first_match(sections: &[String], field: &str, toml_sources: &[(String, String)]) -> Located {
    if field.is_empty() {
        return (None, None);
    }
    toml_sources
        .iter()
        .find_map(|(name, content)| {
            find_key_offset(content, sections, field).map(|offset| {
                (
                    Some(SourceSpan::new(offset.into(), field.len())),
                    Some(NamedSource::new(name, content.clone())),
                )
            })
        })
        .unwrap_or((None, None))
}

/// Byte offset of `field` in TOML `content`, searching below the `[a.b]`
/// header named by `sections` (or from the start when `sections` is empty).
pub fn find_key_offset(content: &str, sections: &[String], field: &str) -> Option<usize> {
    let search_start = if sections.is_empty() {
        0
    } else {
        let header = format!("[{}]", sections.join("."));
        content.find(&header).map(|pos| pos + header.len())?
    };

    let mut offset = search_start;
    for line in content[search_start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if !sections.is_empty() && trimmed.starts_with('[') {
            break;
        }
        if let Some(after) = trimmed.strip_prefix(field) {
            if after.trim_start().starts_with('=') {
                return Some(offset + (line.len() - trimmed.len()));
            }
        }
        offset += line.len();
    }

    None
}

/// Suggest the closest of `valid` to `unknown` by Jaro-Winkler similarity.
pub fn suggest_key(unknown: &str, valid: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best = None;

    for &candidate in valid {
        let score = strsim::jaro_winkler(unknown, candidate);
        if score > best_score {
            best_score = score;
            best = Some(candidate.to_string());
        }
    }

    best
}

/// Render errors to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}
