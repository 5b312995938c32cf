//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Input file has the wrong or no extension. Batch callers may skip the
    /// input and continue with the rest.
    #[error("Unsupported input file extension '{extension}'")]
    FileType {
        /// Extension found on the input, empty if none.
        extension: String,
    },

    /// The loaded model carries diagnostics.
    #[error("Syntax error(s):{report}")]
    Syntax {
        /// One `\n<location>:<line> Error: <message>` entry per diagnostic.
        report: String,
    },

    /// Type reference that has no C mapping.
    #[error("unsupported type kind '{type_name}' for argument '{argument}'")]
    UnsupportedTypeKind {
        /// Type as written in the model.
        type_name: String,
        /// Argument carrying the type.
        argument: String,
    },

    /// Interface or method without a name.
    #[error("{kind} without a name in '{context}'")]
    MissingName {
        /// What lacks the name.
        kind: &'static str,
        /// Enclosing element.
        context: String,
    },

    /// Fire-and-forget method declaring output arguments.
    #[error("fire-and-forget method '{interface}.{method}' declares out arguments")]
    FireAndForgetOutputs {
        /// Interface name.
        interface: String,
        /// Method name.
        method: String,
    },

    /// Invalid generator configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    /// Model loader failure.
    #[error("unable to load model: {0}")]
    Load(#[from] capic_idl::LoadError),

    /// The artifact sink refused a file.
    #[error("unable to write output file '{file_name}'")]
    Sink {
        /// File that could not be written.
        file_name: String,
    },

    /// Name that would clash with a generated identifier or a C keyword.
    #[error("{kind} name '{name}' in '{context}' is reserved in generated C code")]
    ReservedName {
        /// What carries the name.
        kind: &'static str,
        /// The offending name.
        name: String,
        /// Enclosing element.
        context: String,
    },
}

impl GeneratorError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true for the file-kind error a batch caller can skip past.
    #[must_use]
    pub const fn is_file_type(&self) -> bool {
        matches!(self, Self::FileType { .. })
    }
}

/// Result alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;
