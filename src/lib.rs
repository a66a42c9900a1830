//! # flowgen - Flow Compilation Engine
//!
//! **flowgen** turns declarative *flows* (ordered, possibly branching sequences of named
//! steps, each of which may fail) into two artifacts that always agree with each other:
//! Go source implementing the flow with error propagation and dependency injection, and a
//! PlantUML sequence diagram of the same control flow.
//!
//! ## Core Workflow
//!
//! 1.  **Describe Your Flows**: Build a `CompilationUnit` directly, load the JSON rendition
//!     with `RawUnit`, or implement `IntoUnit` for whatever your front end discovers.
//! 2.  **Build Graphs**: Every `FlowSpec` is validated and lowered into a `FlowGraph` that
//!     records control flow, error edges and which step's value feeds which step.
//! 3.  **Resolve Services**: Steps with the same signature are grouped, across all flows,
//!     into one generated service interface.
//! 4.  **Emit**: The Go and PlantUML backends project each graph independently, through
//!     the same traversal, so the order of calls and messages is identical.
//! 5.  **Write**: The output coordinator assembles one Go file per package and hands every
//!     artifact to an `ArtifactWriter`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowgen::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let flow = FlowSpec {
//!         name: "C".to_string(),
//!         source: "cmd/app/flows.go".into(),
//!         input: None,
//!         nodes: vec![
//!             FlowNode::Step(StepSpec::new("step1").with_output(TypeRef::new("a")).fallible()),
//!             FlowNode::Step(StepSpec::new("step2").with_input(TypeRef::new("a")).fallible()),
//!         ],
//!         result: FlowResult { output: None, fallible: true },
//!     };
//!     let unit = CompilationUnit::new("main").with_flow(flow);
//!
//!     let compiled = Compiler::builder(unit)
//!         .with_diagram_dir("docs")
//!         .build()
//!         .run()?;
//!
//!     for rejection in &compiled.rejected {
//!         eprintln!("skipped {}: {}", rejection.flow, rejection);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod codegen;
pub mod compiler;
pub mod diagram;
pub mod error;
pub mod graph;
pub mod model;
pub mod naming;
pub mod output;
pub mod prelude;
pub mod resolver;
