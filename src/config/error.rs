//! Configuration error types with source location tracking
//!
//! Provides rich diagnostic output using miette for configuration validation errors.

// False positives from miette's derive macros - fields are used but rustc doesn't see it
#![allow(unused_assignments)]

use super::types::{OptionKind, Span};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A single validation issue with location information
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Byte span in source
    pub span: Span,
    /// Primary error message
    pub message: String,
    /// Label shown at the span location
    pub label: String,
    /// Optional help text with suggestions
    pub help: Option<String>,
}

impl ConfigIssue {
    /// Create an issue for a recognized option holding the wrong kind of value
    pub fn wrong_type(span: Span, key: &str, expected: OptionKind) -> Self {
        let help = match expected {
            OptionKind::Bool => format!("example: {key} = true"),
            OptionKind::String => format!("example: {key} = \"XF86AudioNext\""),
        };
        Self {
            span,
            message: format!("option '{key}' must be a {}", expected.describe()),
            label: format!("expected {}", expected.describe()),
            help: Some(help),
        }
    }
}

/// Individual validation issue wrapped for miette's `#[related]` attribute
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct ConfigIssueDiagnostic {
    message: String,
    #[label("{label}")]
    span: SourceSpan,
    label: String,
    #[help]
    help: Option<String>,
}

/// Collection of configuration validation errors
///
/// This is the main diagnostic type returned when config validation fails.
/// It contains the source file and all issues found, sorted by position.
#[derive(Debug, Error, Diagnostic)]
#[error(
    "configuration has {count} error{s}",
    count = self.issues.len(),
    s = if self.issues.len() == 1 { "" } else { "s" }
)]
#[diagnostic(code(gsd_mediakeys::config::validation))]
pub struct ConfigValidationError {
    #[source_code]
    src: NamedSource<String>,

    #[related]
    issues: Vec<ConfigIssueDiagnostic>,
}

impl ConfigValidationError {
    /// Create a validation error from collected issues, sorted by source position
    pub fn new(
        source_name: impl Into<String>,
        source_content: String,
        mut issues: Vec<ConfigIssue>,
    ) -> Self {
        issues.sort_by_key(|i| i.span.start);

        let diagnostics = issues
            .into_iter()
            .map(|issue| ConfigIssueDiagnostic {
                message: issue.message,
                span: (issue.span.start, issue.span.len()).into(),
                label: issue.label,
                help: issue.help,
            })
            .collect();

        let name: String = source_name.into();
        Self {
            src: NamedSource::new(name, source_content),
            issues: diagnostics,
        }
    }

    /// Number of issues collected
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Top-level configuration errors
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(code(gsd_mediakeys::config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    #[diagnostic(code(gsd_mediakeys::config::parse))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("{msg}")]
        span: Option<SourceSpan>,
        msg: String,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ConfigValidationError),
}

impl ConfigError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(
        source_name: impl Into<String>,
        source_content: String,
        err: toml::de::Error,
    ) -> Self {
        let name: String = source_name.into();
        Self::Parse {
            src: NamedSource::new(name, source_content),
            span: err.span().map(|r| (r.start, r.len()).into()),
            msg: err.message().to_string(),
        }
    }

    /// Whether this error means the file does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
