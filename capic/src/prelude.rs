//! Prelude module for convenient imports.
//!
//! ```ignore
//! use capic::prelude::*;
//! ```

// Model types
pub use capic_idl::{
    Argument, Diagnostic, FidlLoader, Interface, LoadedModel, Method, Model, ModelLoader,
    PredefinedType, TypeRef,
};

// Generation
pub use capic_codegen::{
    Artifact, ArtifactSink, GenerationReport, Generator, GeneratorConfig, GeneratorError,
    LocalFileSink, MemorySink, generate_from_str,
};
