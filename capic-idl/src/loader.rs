//! Model loading.
//!
//! A loader turns an input artifact into a [`Model`] plus the diagnostics
//! found while reading it. Diagnostics are data, not errors: the caller
//! decides whether any of them blocks further processing.

use crate::error::{Diagnostic, LoadError};
use crate::model::Model;
use crate::parser::parse_fidl;
use crate::validation::validate_model;
use std::path::Path;

/// File extension of Franca IDL sources.
pub const FIDL_EXTENSION: &str = "fidl";

/// Result of loading one input.
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    /// The loaded model; empty if the input failed to parse.
    pub model: Model,
    /// Syntax and semantic findings in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadedModel {
    /// Returns true if the model carries no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Source of interface models.
pub trait ModelLoader {
    /// Loads the model stored at `path`.
    ///
    /// # Errors
    /// Returns `LoadError` if the input cannot be read at all. Problems inside
    /// a readable input are reported through [`LoadedModel::diagnostics`].
    fn load_model(&self, path: &Path) -> Result<LoadedModel, LoadError>;
}

/// Loader for Franca IDL files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FidlLoader;

impl FidlLoader {
    /// Creates a new loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a model from Franca IDL source text.
    #[must_use]
    pub fn load_str(&self, source: &str) -> LoadedModel {
        match parse_fidl(source) {
            Ok((model, lines)) => {
                let diagnostics = validate_model(&model, &lines);
                LoadedModel { model, diagnostics }
            }
            Err(e) => LoadedModel {
                model: Model::default(),
                diagnostics: vec![e.to_diagnostic()],
            },
        }
    }
}

impl ModelLoader for FidlLoader {
    fn load_model(&self, path: &Path) -> Result<LoadedModel, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded = self.load_str(&source);
        tracing::debug!(
            "Loaded {}: {} interface(s), {} diagnostic(s)",
            path.display(),
            loaded.model.interfaces.len(),
            loaded.diagnostics.len()
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_str_clean() {
        let loaded = FidlLoader::new().load_str("interface A { method m {} }");
        assert!(loaded.is_clean());
        assert_eq!(loaded.model.interfaces[0].methods[0].name, "m");
    }

    #[test]
    fn test_load_str_syntax_error() {
        let loaded = FidlLoader::new().load_str("interface A {\n  method {\n}");
        assert!(!loaded.is_clean());
        assert!(loaded.model.interfaces.is_empty());
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].line, 2);
    }

    #[test]
    fn test_load_model_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ball.fidl");
        std::fs::write(&path, "interface Ball {\n  method drop fireAndForget {}\n}\n")
            .expect("write");

        let loaded = FidlLoader::new().load_model(&path).expect("load");
        assert!(loaded.is_clean());
        assert!(loaded.model.interfaces[0].methods[0].fire_and_forget);
    }

    #[test]
    fn test_load_model_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = FidlLoader::new()
            .load_model(&dir.path().join("missing.fidl"))
            .expect_err("should fail");
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("missing.fidl"));
    }
}
