//! Generator configuration.

use crate::error::{GeneratorError, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted tab width.
pub const MAX_SPACES_PER_TAB: usize = 16;

/// Options controlling artifact emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Spaces each tab in generated text expands to.
    pub spaces_per_tab: usize,
    /// Directory under the sink's output folder that receives the artifacts.
    pub output_path: String,
    /// File extension an input model must carry.
    pub idl_extension: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            spaces_per_tab: 4,
            output_path: String::new(),
            idl_extension: capic_idl::FIDL_EXTENSION.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tab width.
    #[must_use]
    pub fn spaces_per_tab(mut self, spaces: usize) -> Self {
        self.spaces_per_tab = spaces;
        self
    }

    /// Sets the output path.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets the accepted input extension, without the leading dot.
    #[must_use]
    pub fn idl_extension(mut self, extension: impl Into<String>) -> Self {
        self.idl_extension = extension.into();
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the tab width exceeds
    /// [`MAX_SPACES_PER_TAB`] or the extension is empty.
    pub fn validate(&self) -> Result<()> {
        if self.spaces_per_tab > MAX_SPACES_PER_TAB {
            return Err(GeneratorError::invalid_config(format!(
                "spaces_per_tab must be at most {MAX_SPACES_PER_TAB}, got {}",
                self.spaces_per_tab
            )));
        }
        if self.idl_extension.is_empty() {
            return Err(GeneratorError::invalid_config(
                "idl_extension must not be empty",
            ));
        }
        Ok(())
    }
}
