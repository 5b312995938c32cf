//! Error and diagnostic types for model loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for IDL parsing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unexpected token.
    #[error("line {line}: expected {expected}, found '{found}'")]
    Unexpected {
        /// Line of the offending token.
        line: usize,
        /// Description of what was expected.
        expected: String,
        /// Token actually found.
        found: String,
    },

    /// Input ended early.
    #[error("line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// Last line of the input.
        line: usize,
        /// Description of what was expected.
        expected: String,
    },

    /// Comment or annotation never closed.
    #[error("line {line}: unterminated {what}")]
    Unterminated {
        /// Line where the construct started.
        line: usize,
        /// Kind of construct.
        what: &'static str,
    },

    /// Character that cannot start any token.
    #[error("line {line}: invalid character '{ch}'")]
    InvalidCharacter {
        /// Line of the character.
        line: usize,
        /// The character.
        ch: char,
    },
}

impl ParseError {
    /// Creates an unexpected-token error.
    pub fn unexpected(line: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Unexpected {
            line,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Returns the line the error refers to.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Unexpected { line, .. }
            | Self::UnexpectedEof { line, .. }
            | Self::Unterminated { line, .. }
            | Self::InvalidCharacter { line, .. } => *line,
        }
    }

    /// Converts the error into a diagnostic, dropping the line prefix.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = match self {
            Self::Unexpected {
                expected, found, ..
            } => format!("expected {expected}, found '{found}'"),
            Self::UnexpectedEof { expected, .. } => {
                format!("unexpected end of input, expected {expected}")
            }
            Self::Unterminated { what, .. } => format!("unterminated {what}"),
            Self::InvalidCharacter { ch, .. } => format!("invalid character '{ch}'"),
        };
        Diagnostic::new(self.line(), message)
    }
}

/// Problem found in a loaded model, attached to a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based source line.
    pub line: usize,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.line, self.message)
    }
}

/// Error type for loaders that cannot produce a model at all.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input could not be read.
    #[error("unable to read '{}': {source}", path.display())]
    Io {
        /// Input path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Loader-specific failure.
    #[error("load error: {message}")]
    Other {
        /// Error message.
        message: String,
    },
}
