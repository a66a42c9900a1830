//! Prelude module for convenient imports
//!
//! Re-exports the types needed to describe flows, compile them and inspect the results.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowgen::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let unit = RawUnit::from_file("path/to/flows.json")?.into_unit()?;
//! let compiled = Compiler::builder(unit).build().compile()?;
//! compiled.write(&FsWriter)?;
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{CompiledUnit, Compiler, CompilerBuilder, FlowRejection, GeneratorOptions};
pub use crate::codegen::InitializerStyle;

// Flow description
pub use crate::model::json::RawUnit;
pub use crate::model::{
    ArtifactBundle, ArtifactKind, Branch, CompilationUnit, Coverage, DecisionSpec, FlowNode,
    FlowResult, FlowSpec, GeneratedArtifact, IntoFlowSpec, IntoUnit, StepSpec, TypeRef,
};

// Output
pub use crate::output::{ArtifactWriter, FsWriter, GofmtFormatter, MemoryWriter, Passthrough};

// Error types
pub use crate::error::{BundleError, ConversionError, GraphError, OutputError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
