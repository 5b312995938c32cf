//! # Capic Codegen
//!
//! C client/server stub generation from Franca IDL interfaces.
//!
//! This crate provides:
//! - C type mapping and the identifier naming scheme
//! - Client stubs with synchronous and asynchronous calls
//! - Server stubs with dispatch thunks and sd-bus vtable registration
//! - A driver writing four artifacts per interface into a sink

pub mod c;
pub mod config;
pub mod error;
pub mod format;
pub mod generator;
pub mod sink;

pub use c::{ClientGenerator, ServerGenerator};
pub use config::GeneratorConfig;
pub use error::{GeneratorError, Result};
pub use generator::{
    Artifact, GenerationReport, Generator, Stage, generate_artifacts, generate_model_artifacts,
};
pub use sink::{ArtifactSink, LocalFileSink, MemorySink};

use capic_idl::FidlLoader;
use generator::syntax_report;

/// Generates C stubs from Franca IDL source text.
///
/// # Arguments
/// * `source` - Franca IDL content
/// * `config` - Tab width applied to the returned text
///
/// # Returns
/// Four artifacts per interface, in emission order.
///
/// # Errors
/// Returns `GeneratorError` if the configuration is invalid, the source has
/// diagnostics, or generation fails.
pub fn generate_from_str(source: &str, config: &GeneratorConfig) -> Result<Vec<Artifact>> {
    config.validate()?;
    let loaded = FidlLoader::new().load_str(source);
    if !loaded.is_clean() {
        return Err(GeneratorError::Syntax {
            report: syntax_report("<input>", &loaded.diagnostics),
        });
    }
    let mut artifacts = generate_model_artifacts(&loaded.model)?;
    for artifact in &mut artifacts {
        artifact.contents = format::expand_tabs(&artifact.contents, config.spaces_per_tab);
    }
    Ok(artifacts)
}

/// Generates C stubs from a Franca IDL file into `<root>/src-gen/`.
///
/// # Errors
/// Returns `GeneratorError` if the input is rejected or any file cannot be
/// written.
pub fn generate_from_file(
    path: &std::path::Path,
    root: &std::path::Path,
    config: &GeneratorConfig,
) -> Result<GenerationReport> {
    let generator = Generator::with_config(FidlLoader::new(), config.clone())?;
    let mut sink = LocalFileSink::new(root);
    generator.generate(path, &mut sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING: &str = r"
package test

interface Ping {
    method ping {
        in { Int32 seq }
        out { Int32 seq_reply }
    }
}
";

    #[test]
    fn test_generate_from_str() {
        let artifacts =
            generate_from_str(PING, &GeneratorConfig::default()).expect("Failed to generate");
        assert_eq!(artifacts.len(), 4);
        assert_eq!(artifacts[0].file_name, "client-Ping.h");
        assert!(artifacts[0].contents.contains("int cc_Ping_ping(struct cc_client_Ping *instance, int32_t seq, int32_t *seq_reply);"));
        assert!(artifacts.iter().all(|a| !a.contents.contains('\t')));
    }

    #[test]
    fn test_generate_from_str_reports_syntax() {
        let err = generate_from_str("interface {", &GeneratorConfig::default())
            .expect_err("syntax error");
        assert!(err.to_string().starts_with("Syntax error(s):\n<input>:1 Error: "));
    }
}
