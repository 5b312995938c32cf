//! Generation driver.
//!
//! The driver checks the input kind, loads the model, renders all artifacts
//! and only then hands them to the sink. A model with diagnostics produces no
//! output at all. If the sink refuses a file, the files already written for
//! that interface are removed again; earlier interfaces stay written.

use crate::c::{ClientGenerator, ServerGenerator, naming};
use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::format::expand_tabs;
use crate::sink::ArtifactSink;
use capic_idl::{Diagnostic, FidlLoader, Interface, Model, ModelLoader};
use std::path::{Path, PathBuf};

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name, e.g. `client-Calculator.h`.
    pub file_name: String,
    /// File text with tab indentation.
    pub contents: String,
}

impl Artifact {
    fn new(file_name: String, contents: String) -> Self {
        Self {
            file_name,
            contents,
        }
    }
}

/// Renders the four artifacts of one interface in emission order: client
/// header, client body, server header, server body.
///
/// # Errors
/// Returns `GeneratorError` if the interface cannot be rendered.
pub fn generate_artifacts(api: &Interface) -> Result<Vec<Artifact>> {
    let client = ClientGenerator::new(api);
    let server = ServerGenerator::new(api);
    let file = |side: &str, ext: &str| naming::file_name(side, &api.name, ext);

    Ok(vec![
        Artifact::new(file("client", "h"), client.generate_header()?),
        Artifact::new(file("client", "c"), client.generate_body()?),
        Artifact::new(file("server", "h"), server.generate_header()?),
        Artifact::new(file("server", "c"), server.generate_body()?),
    ])
}

/// Renders every interface of a model, in model order.
///
/// # Errors
/// Returns the first rendering failure.
pub fn generate_model_artifacts(model: &Model) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::with_capacity(model.interfaces.len() * 4);
    for api in &model.interfaces {
        artifacts.extend(generate_artifacts(api)?);
    }
    Ok(artifacts)
}

/// Formats diagnostics into the report carried by [`GeneratorError::Syntax`].
#[must_use]
pub fn syntax_report(location: &str, diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("\n{location}:{} Error: {}", d.line, d.message))
        .collect()
}

/// Driver progress, reported in trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing done yet.
    Idle,
    /// Model loaded without diagnostics.
    ModelLoaded,
    /// Writing the artifacts of one interface.
    Emission,
    /// All artifacts written.
    Done,
    /// Stopped on an error.
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Interfaces emitted, in model order.
    pub interfaces: Vec<String>,
    /// Locations returned by the sink, in write order.
    pub files: Vec<PathBuf>,
}

/// Drives a loader and the stub generators into an artifact sink.
pub struct Generator<L = FidlLoader> {
    loader: L,
    config: GeneratorConfig,
}

impl Default for Generator<FidlLoader> {
    fn default() -> Self {
        Self::new(FidlLoader::new())
    }
}

impl<L: ModelLoader> Generator<L> {
    /// Creates a driver with the default configuration.
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            config: GeneratorConfig::default(),
        }
    }

    /// Creates a driver with a custom configuration.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn with_config(loader: L, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { loader, config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the stubs for the model stored at `input`.
    ///
    /// # Arguments
    /// * `input` - Path of the IDL file
    /// * `sink` - Destination of the generated files
    ///
    /// # Returns
    /// The interfaces emitted and the files written.
    ///
    /// # Errors
    /// Returns `FileType` before loading if `input` has the wrong extension,
    /// `Syntax` if the model carries diagnostics, and any rendering or sink
    /// failure.
    pub fn generate(&self, input: &Path, sink: &mut dyn ArtifactSink) -> Result<GenerationReport> {
        tracing::debug!(stage = ?Stage::Idle, "Generating from {}", input.display());
        let result = self.load(input).and_then(|model| self.emit(&model, sink));
        if let Err(e) = &result {
            tracing::debug!(stage = ?Stage::Failed, "{}", e);
        }
        result
    }

    /// Generates the stubs for an already loaded model.
    ///
    /// # Errors
    /// Returns any rendering or sink failure.
    pub fn generate_model(&self, model: &Model, sink: &mut dyn ArtifactSink) -> Result<GenerationReport> {
        self.emit(model, sink)
    }

    fn load(&self, input: &Path) -> Result<Model> {
        let extension = input
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if extension != self.config.idl_extension {
            tracing::warn!("Skipping {}: not a .{} file", input.display(), self.config.idl_extension);
            return Err(GeneratorError::FileType {
                extension: extension.to_string(),
            });
        }

        let loaded = self.loader.load_model(input)?;
        if !loaded.is_clean() {
            let report = syntax_report(&input.display().to_string(), &loaded.diagnostics);
            tracing::error!("Syntax error(s) in {}", input.display());
            return Err(GeneratorError::Syntax { report });
        }
        tracing::debug!(
            stage = ?Stage::ModelLoaded,
            "{} interface(s) in {}",
            loaded.model.interfaces.len(),
            input.display()
        );
        Ok(loaded.model)
    }

    fn emit(&self, model: &Model, sink: &mut dyn ArtifactSink) -> Result<GenerationReport> {
        let mut rendered = Vec::with_capacity(model.interfaces.len());
        for api in &model.interfaces {
            rendered.push((api.name.as_str(), generate_artifacts(api)?));
        }

        let mut report = GenerationReport::default();
        for (name, artifacts) in rendered {
            tracing::debug!(stage = ?Stage::Emission, "Emitting interface {}", name);
            let mut written = Vec::with_capacity(artifacts.len());
            for artifact in artifacts {
                let text = expand_tabs(&artifact.contents, self.config.spaces_per_tab);
                match sink.make_file(&self.config.output_path, &artifact.file_name, text.as_bytes()) {
                    Some(path) => written.push(path),
                    None => {
                        discard(sink, &written);
                        return Err(GeneratorError::Sink {
                            file_name: artifact.file_name,
                        });
                    }
                }
            }
            report.files.extend(written);
            report.interfaces.push(name.to_string());
        }

        tracing::info!(
            stage = ?Stage::Done,
            "Generated {} file(s) for {} interface(s)",
            report.files.len(),
            report.interfaces.len()
        );
        Ok(report)
    }
}

/// Removes the files of an interface whose emission did not complete.
fn discard(sink: &mut dyn ArtifactSink, written: &[PathBuf]) {
    for path in written.iter().rev() {
        if !sink.remove_file(path) {
            tracing::warn!("Left partial output {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use capic_idl::{Argument, LoadError, LoadedModel, Method, PredefinedType};
    use std::cell::Cell;

    struct FixedLoader {
        loaded: LoadedModel,
        calls: Cell<usize>,
    }

    impl FixedLoader {
        fn new(loaded: LoadedModel) -> Self {
            Self {
                loaded,
                calls: Cell::new(0),
            }
        }
    }

    impl ModelLoader for FixedLoader {
        fn load_model(&self, _path: &Path) -> std::result::Result<LoadedModel, LoadError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.loaded.clone())
        }
    }

    fn calculator() -> Model {
        Model::new(vec![Interface::new("Calculator").with_method(
            Method::new("split")
                .with_in(Argument::new(PredefinedType::Double, "value"))
                .with_out(Argument::new(PredefinedType::Int32, "whole"))
                .with_out(Argument::new(PredefinedType::Int32, "fraction")),
        )])
    }

    #[test]
    fn test_artifact_order() {
        let api = Interface::new("Calculator");
        let names: Vec<String> = generate_artifacts(&api)
            .expect("rendered")
            .into_iter()
            .map(|a| a.file_name)
            .collect();
        assert_eq!(
            names,
            ["client-Calculator.h", "client-Calculator.c", "server-Calculator.h", "server-Calculator.c"]
        );
    }

    #[test]
    fn test_wrong_extension_skips_loader() {
        let generator = Generator::new(FixedLoader::new(LoadedModel::default()));
        let mut sink = MemorySink::new();

        let err = generator
            .generate(Path::new("model.txt"), &mut sink)
            .expect_err("wrong extension");
        assert!(err.is_file_type());
        assert_eq!(generator.loader.calls.get(), 0);
        assert!(sink.is_empty());

        let err = generator
            .generate(Path::new("model"), &mut sink)
            .expect_err("no extension");
        assert!(matches!(err, GeneratorError::FileType { ref extension } if extension.is_empty()));
    }

    #[test]
    fn test_diagnostics_block_output() {
        let loaded = LoadedModel {
            model: calculator(),
            diagnostics: vec![Diagnostic::new(3, "bad"), Diagnostic::new(7, "worse")],
        };
        let generator = Generator::new(FixedLoader::new(loaded));
        let mut sink = MemorySink::new();

        let err = generator
            .generate(Path::new("calc.fidl"), &mut sink)
            .expect_err("diagnostics");
        assert_eq!(
            err.to_string(),
            "Syntax error(s):\ncalc.fidl:3 Error: bad\ncalc.fidl:7 Error: worse"
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_generate_writes_four_files() {
        let loaded = LoadedModel {
            model: calculator(),
            diagnostics: Vec::new(),
        };
        let generator = Generator::new(FixedLoader::new(loaded));
        let mut sink = MemorySink::new();

        let report = generator
            .generate(Path::new("calc.fidl"), &mut sink)
            .expect("generated");
        assert_eq!(report.interfaces, ["Calculator"]);
        assert_eq!(report.files.len(), 4);
        assert_eq!(sink.len(), 4);

        let body = sink.get_str("", "client-Calculator.c").expect("body");
        assert!(!body.contains('\t'));
        assert!(body.contains("\n    int cc_result = 0;\n"));
    }

    #[test]
    fn test_render_failure_writes_nothing() {
        let model = Model::new(vec![
            Interface::new("Good").with_method(Method::new("ping")),
            Interface::new("Bad").with_method(
                Method::new("m").with_in(Argument::new(capic_idl::TypeRef::Derived("Point".into()), "p")),
            ),
        ]);
        let generator = Generator::new(FidlLoader::new());
        let mut sink = MemorySink::new();

        let err = generator
            .generate_model(&model, &mut sink)
            .expect_err("unsupported type");
        assert!(matches!(err, GeneratorError::UnsupportedTypeKind { .. }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_output_path_and_tab_width() {
        let config = GeneratorConfig::new().output_path("gen").spaces_per_tab(2);
        let generator = Generator::with_config(FidlLoader::new(), config).expect("valid config");
        let mut sink = MemorySink::new();

        generator
            .generate_model(&calculator(), &mut sink)
            .expect("generated");
        let body = sink.get_str("gen", "server-Calculator.c").expect("body");
        assert!(body.contains("\n  int cc_result = 0;\n"));
        assert!(!body.contains('\t'));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig::new().spaces_per_tab(40);
        assert!(Generator::with_config(FidlLoader::new(), config).is_err());
    }

    #[test]
    fn test_syntax_report() {
        assert_eq!(syntax_report("a.fidl", &[]), "");
        assert_eq!(
            syntax_report("a.fidl", &[Diagnostic::new(1, "x")]),
            "\na.fidl:1 Error: x"
        );
    }
}
