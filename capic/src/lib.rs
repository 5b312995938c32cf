//! # Capic
//!
//! Common API C stub generator.
//!
//! Capic reads Franca IDL interface definitions and emits, per interface, a
//! client and a server header/body pair in C. Clients get synchronous and
//! asynchronous calls; servers get dispatch thunks registered on sd-bus.
//!
//! ## Quick Start
//!
//! ```ignore
//! use capic::prelude::*;
//!
//! let generator = Generator::new(FidlLoader::new());
//! let mut sink = LocalFileSink::new(".");
//! generator.generate(Path::new("calculator.fidl"), &mut sink)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`idl`] - Interface model, Franca IDL loader and validation
//! - [`codegen`] - C stub generation, sinks and the generation driver

pub mod prelude;

/// Interface model and Franca IDL loading.
pub mod idl {
    pub use capic_idl::*;
}

/// C stub generation.
pub mod codegen {
    pub use capic_codegen::*;
}
