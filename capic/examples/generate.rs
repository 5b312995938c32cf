//! Generates the Calculator stubs into `./src-gen/calculator/`.
//!
//! Run with `RUST_LOG=debug` to follow the driver stages.

use capic::prelude::*;
use std::path::Path;

const CALCULATOR: &str = r"
package org.genivi.capic.simple

<** @description: Splits a number into its whole and fractional parts **>
interface Calculator {
    version { major 1 minor 0 }

    method split {
        in {
            Double value
        }
        out {
            Int32 whole
            Int32 fraction
        }
    }
}
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let input = std::env::temp_dir().join("Calculator.fidl");
    std::fs::write(&input, CALCULATOR)?;

    let config = GeneratorConfig::new().output_path("calculator");
    let generator = Generator::with_config(FidlLoader::new(), config)?;
    let mut sink = LocalFileSink::new(Path::new("."));

    let report = generator.generate(&input, &mut sink)?;
    for file in &report.files {
        println!("Generated {}", file.display());
    }

    Ok(())
}
