//! # capic IDL
//!
//! Interface model and Franca IDL loader for the Common API C stub generator.
//!
//! This crate provides:
//! - An immutable value model of interfaces, methods and typed arguments
//! - A parser for the scalar subset of Franca IDL
//! - Semantic validation reported as line-numbered diagnostics
//! - The `ModelLoader` seam used by the generation driver

pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod validation;

pub use error::{Diagnostic, LoadError, ParseError};
pub use loader::{FIDL_EXTENSION, FidlLoader, LoadedModel, ModelLoader};
pub use model::{Argument, Interface, Method, Model, PredefinedType, TypeRef};
pub use parser::{ArgDirection, SourceMap, parse_fidl};
pub use validation::{GENERATED_PREFIX, is_c_keyword, is_reserved_argument_name, validate_model};
