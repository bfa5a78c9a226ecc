//! Error types for the codeloom analysis kernel.
//!
//! A single exhaustive error enum carries every failure mode described in
//! the error-handling design: fail-fast input errors, recoverable per-file
//! and per-analyzer errors, and the small set of invariant violations that
//! are fatal in debug builds and merely logged in release builds.

use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodeloomError>;

/// Comprehensive error type for all codeloom operations.
#[derive(Error, Debug)]
pub enum CodeloomError {
    /// I/O related errors (file reads, directory walking).
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message.
        message: String,
        /// Underlying I/O error, if any.
        #[source]
        source: Option<io::Error>,
    },

    /// Configuration / settings errors.
    #[error("configuration error: {message}")]
    Config {
        /// Error description.
        message: String,
        /// Settings field that caused the error, if known.
        field: Option<String>,
    },

    /// Parsing and language processing errors.
    #[error("parse error in {language}: {message}")]
    Parse {
        /// Programming language being parsed.
        language: String,
        /// Error description.
        message: String,
        /// File path where the error occurred, if known.
        file_path: Option<String>,
    },

    /// Mathematical computation errors (degenerate inputs, numerical issues).
    #[error("math error: {message}")]
    Math {
        /// Error description.
        message: String,
    },

    /// Graph algorithm errors.
    #[error("graph analysis error: {message}")]
    Graph {
        /// Error description.
        message: String,
    },

    /// Analysis pipeline / analyzer stage errors.
    #[error("pipeline error at stage '{stage}': {message}")]
    Pipeline {
        /// Pipeline stage where the error occurred.
        stage: String,
        /// Error description.
        message: String,
    },

    /// Input validation errors.
    #[error("validation error: {message}")]
    Validation {
        /// Error description.
        message: String,
        /// Field or input that failed validation, if known.
        field: Option<String>,
    },

    /// Resource exhaustion (file count / size caps exceeded).
    #[error("resource exhaustion: {message}")]
    ResourceExhaustion {
        /// Error description.
        message: String,
    },

    /// A "this should never happen" invariant violation.
    ///
    /// Raised via [`crate::core::invariant::check`]: panics in debug builds,
    /// downgrades to a logged error (and a dropped finding/signal) in
    /// release builds.
    #[error("invariant violated: {message}")]
    Invariant {
        /// Description of the violated invariant.
        message: String,
    },

    /// Generic internal errors.
    #[error("internal error: {message}")]
    Internal {
        /// Error description.
        message: String,
    },

    /// Unsupported operation or feature.
    #[error("unsupported: {message}")]
    Unsupported {
        /// Error description.
        message: String,
    },
}

impl CodeloomError {
    /// Create a new I/O error with context.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error naming the offending field.
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error.
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: None,
        }
    }

    /// Create a new parse error with a file path attached.
    pub fn parse_at(
        language: impl Into<String>,
        message: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: Some(file_path.into()),
        }
    }

    /// Create a new pipeline-stage error.
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error naming the offending field.
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an "unsupported language" error for a language key with no
    /// registered grammar.
    pub fn unsupported_language(language: impl Into<String>) -> Self {
        Self::Unsupported {
            message: format!("no grammar registered for language '{}'", language.into()),
        }
    }
}

impl From<io::Error> for CodeloomError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result extension trait for adding context to errors, mirroring the
/// teacher's `ResultExt`.
pub trait ResultExt<T> {
    /// Attach static context to an error result.
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CodeloomError>,
{
    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            CodeloomError::internal(format!("{msg}: {inner}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_constructors_tag_the_right_variant() {
        assert!(matches!(
            CodeloomError::config("bad"),
            CodeloomError::Config { .. }
        ));
        assert!(matches!(
            CodeloomError::parse("python", "bad"),
            CodeloomError::Parse { .. }
        ));
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let wrapped = result.context("reading settings file");
        assert!(wrapped.is_err());
    }
}
