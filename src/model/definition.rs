use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A target-language type expression, plus the import path it needs (if any).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef {
    pub expr: String,
    pub import: Option<String>,
}

impl TypeRef {
    pub fn new(expr: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            import: None,
        }
    }

    pub fn imported(expr: impl Into<String>, import: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            import: Some(import.into()),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

/// A function body emitted in place of an injected service call.
///
/// The body sees its input (when the step declares one) as `input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineBody {
    pub body: String,
    pub imports: Vec<String>,
}

/// A single named operation of a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSpec {
    pub name: String,
    /// The factory function wired into the generated implementation. Defaults to `name`.
    pub function: Option<String>,
    pub input: Option<TypeRef>,
    pub output: Option<TypeRef>,
    pub fallible: bool,
    pub inline: Option<InlineBody>,
}

impl StepSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: None,
            input: None,
            output: None,
            fallible: false,
            inline: None,
        }
    }

    pub fn with_input(mut self, ty: TypeRef) -> Self {
        self.input = Some(ty);
        self
    }

    pub fn with_output(mut self, ty: TypeRef) -> Self {
        self.output = Some(ty);
        self
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    pub fn fallible(mut self) -> Self {
        self.fallible = true;
        self
    }

    pub fn inline(mut self, body: impl Into<String>, imports: Vec<String>) -> Self {
        self.inline = Some(InlineBody {
            body: body.into(),
            imports,
        });
        self
    }

    pub fn function_ref(&self) -> &str {
        self.function.as_deref().unwrap_or(&self.name)
    }

    pub fn is_inline(&self) -> bool {
        self.inline.is_some()
    }
}

/// How completely a decision's labels cover its discriminant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Coverage {
    /// Unlisted values fall through to a generated "unhandled branch" error.
    #[default]
    Open,
    /// The labels list every value the discriminant can take.
    Exhaustive,
    /// Unlisted values are a declaration error unless a default branch exists.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// A literal expression compared against the discriminant's value.
    pub label: String,
    pub nodes: Vec<FlowNode>,
}

impl Branch {
    pub fn new(label: impl Into<String>, nodes: Vec<FlowNode>) -> Self {
        Self {
            label: label.into(),
            nodes,
        }
    }
}

/// A branch point selecting one subsequence by the value a step produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionSpec {
    pub discriminant: StepSpec,
    pub branches: Vec<Branch>,
    pub default: Option<Vec<FlowNode>>,
    pub coverage: Coverage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowNode {
    Step(StepSpec),
    Decision(DecisionSpec),
    /// Ends the enclosing branch (or the flow) by returning the flow's result.
    Return,
}

impl FlowNode {
    /// The name of the first step this node runs, used for diagnostics.
    pub fn lead_name(&self) -> &str {
        match self {
            FlowNode::Step(step) => &step.name,
            FlowNode::Decision(decision) => &decision.discriminant.name,
            FlowNode::Return => "return",
        }
    }
}

/// The declared result of a flow: an optional value plus an optional error channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowResult {
    pub output: Option<TypeRef>,
    pub fallible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSpec {
    pub name: String,
    /// The file that declares the flow. Its directory is where output lands.
    pub source: PathBuf,
    pub input: Option<TypeRef>,
    pub nodes: Vec<FlowNode>,
    pub result: FlowResult,
}

/// All flows of one target package, keyed by flow name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: String,
    pub flows: BTreeMap<String, FlowSpec>,
}

impl CompilationUnit {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            flows: BTreeMap::new(),
        }
    }

    pub fn with_flow(mut self, flow: FlowSpec) -> Self {
        self.flows.insert(flow.name.clone(), flow);
        self
    }
}
