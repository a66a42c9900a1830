use super::definition::{CompilationUnit, FlowSpec};
use crate::error::ConversionError;

/// A trait for front-end models that can be converted into a flowgen `CompilationUnit`.
///
/// This is the seam between whatever discovers flow declarations (a source parser, a
/// JSON file, a test fixture) and the compiler. The compiler itself never reads source
/// text.
///
/// # Example
///
/// ```rust,no_run
/// use flowgen::error::ConversionError;
/// use flowgen::model::{CompilationUnit, FlowNode, FlowResult, FlowSpec, IntoUnit, StepSpec};
///
/// struct Discovered {
///     package: String,
///     flows: Vec<(String, Vec<String>)>,
/// }
///
/// impl IntoUnit for Discovered {
///     fn into_unit(self) -> Result<CompilationUnit, ConversionError> {
///         let mut unit = CompilationUnit::new(self.package);
///         for (name, steps) in self.flows {
///             unit = unit.with_flow(FlowSpec {
///                 name,
///                 source: "pkg/flows.go".into(),
///                 input: None,
///                 nodes: steps
///                     .into_iter()
///                     .map(|s| FlowNode::Step(StepSpec::new(s).fallible()))
///                     .collect(),
///                 result: FlowResult { output: None, fallible: true },
///             });
///         }
///         Ok(unit)
///     }
/// }
/// ```
pub trait IntoUnit {
    /// Consumes the object and converts it into a compilation unit.
    fn into_unit(self) -> Result<CompilationUnit, ConversionError>;
}

impl IntoUnit for CompilationUnit {
    fn into_unit(self) -> Result<CompilationUnit, ConversionError> {
        Ok(self)
    }
}

/// A single discovered flow that can be turned into a `FlowSpec`.
///
/// Front ends that find flows one at a time implement this and let [`IntoUnit`]
/// collect them.
pub trait IntoFlowSpec {
    fn into_flow_spec(self) -> Result<FlowSpec, ConversionError>;
}

impl IntoFlowSpec for FlowSpec {
    fn into_flow_spec(self) -> Result<FlowSpec, ConversionError> {
        Ok(self)
    }
}
