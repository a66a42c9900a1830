//! The JSON rendition of the front-end IR.
//!
//! A source parser (or a hand-written fixture) describes a package's flows in this
//! shape; `RawUnit` converts into the canonical `CompilationUnit`.
//!
//! ```json
//! {
//!   "package": "main",
//!   "flows": [{
//!     "name": "C",
//!     "source": "cmd/app/flows.go",
//!     "result": { "output": { "type": "*gentleman.Response", "import": "gopkg.in/h2non/gentleman.v2" } },
//!     "steps": [
//!       { "kind": "step", "name": "step1", "fallible": true },
//!       { "kind": "decision",
//!         "on": { "name": "check", "output": "bool" },
//!         "cases": [ { "label": "true", "steps": [] }, { "label": "false", "steps": [ { "kind": "return" } ] } ] }
//!     ]
//!   }]
//! }
//! ```

use super::conversion::{IntoFlowSpec, IntoUnit};
use super::definition::{
    Branch, CompilationUnit, Coverage, DecisionSpec, FlowNode, FlowResult, FlowSpec, InlineBody,
    StepSpec, TypeRef,
};
use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUnit {
    pub package: String,
    pub flows: Vec<RawFlow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFlow {
    pub name: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<RawType>,
    pub steps: Vec<RawNode>,
    #[serde(default)]
    pub result: RawResult,
}

/// A type is either a bare expression or an expression with its import path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawType {
    Plain(String),
    Imported {
        #[serde(rename = "type")]
        expr: String,
        import: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RawNode {
    Step(RawStep),
    Decision(RawDecision),
    Return,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStep {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<RawType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<RawType>,
    #[serde(default)]
    pub fallible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<RawInline>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInline {
    pub body: String,
    #[serde(default)]
    pub imports: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDecision {
    pub on: RawStep,
    pub cases: Vec<RawCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCase {
    pub label: String,
    #[serde(default)]
    pub steps: Vec<RawNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<RawType>,
    #[serde(default = "default_fallible")]
    pub fallible: bool,
}

impl Default for RawResult {
    fn default() -> Self {
        Self {
            output: None,
            fallible: default_fallible(),
        }
    }
}

fn default_fallible() -> bool {
    true
}

impl RawUnit {
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| ConversionError::JsonParseError(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ConversionError::JsonParseError(format!(
                "Could not read '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }
}

impl IntoUnit for RawUnit {
    fn into_unit(self) -> Result<CompilationUnit, ConversionError> {
        let mut unit = CompilationUnit::new(self.package);
        for raw_flow in self.flows {
            if unit.flows.contains_key(&raw_flow.name) {
                return Err(ConversionError::ValidationError(format!(
                    "flow '{}' is declared more than once",
                    raw_flow.name
                )));
            }
            unit = unit.with_flow(raw_flow.into_flow_spec()?);
        }
        Ok(unit)
    }
}

impl IntoFlowSpec for RawFlow {
    fn into_flow_spec(self) -> Result<FlowSpec, ConversionError> {
        Ok(FlowSpec {
            name: self.name,
            source: self.source.into(),
            input: self.input.map(RawType::into_type),
            nodes: convert_nodes(self.steps)?,
            result: FlowResult {
                output: self.result.output.map(RawType::into_type),
                fallible: self.result.fallible,
            },
        })
    }
}

impl RawType {
    fn into_type(self) -> TypeRef {
        match self {
            RawType::Plain(expr) => TypeRef::new(expr),
            RawType::Imported { expr, import } => TypeRef::imported(expr, import),
        }
    }
}

impl From<RawStep> for StepSpec {
    fn from(raw: RawStep) -> Self {
        StepSpec {
            name: raw.name,
            function: raw.function,
            input: raw.input.map(RawType::into_type),
            output: raw.output.map(RawType::into_type),
            fallible: raw.fallible,
            inline: raw.inline.map(|i| InlineBody {
                body: i.body,
                imports: i.imports,
            }),
        }
    }
}

fn convert_nodes(raw: Vec<RawNode>) -> Result<Vec<FlowNode>, ConversionError> {
    raw.into_iter().map(convert_node).collect()
}

fn convert_node(raw: RawNode) -> Result<FlowNode, ConversionError> {
    Ok(match raw {
        RawNode::Step(step) => FlowNode::Step(step.into()),
        RawNode::Return => FlowNode::Return,
        RawNode::Decision(decision) => {
            let coverage = parse_coverage(decision.coverage.as_deref())?;
            let branches = decision
                .cases
                .into_iter()
                .map(|case| Ok(Branch::new(case.label, convert_nodes(case.steps)?)))
                .collect::<Result<Vec<_>, ConversionError>>()?;
            let default = decision.default.map(convert_nodes).transpose()?;
            FlowNode::Decision(DecisionSpec {
                discriminant: decision.on.into(),
                branches,
                default,
                coverage,
            })
        }
    })
}

fn parse_coverage(raw: Option<&str>) -> Result<Coverage, ConversionError> {
    match raw {
        None | Some("open") => Ok(Coverage::Open),
        Some("exhaustive") => Ok(Coverage::Exhaustive),
        Some("strict") => Ok(Coverage::Strict),
        Some(other) => Err(ConversionError::ValidationError(format!(
            "unknown decision coverage '{}', expected open, exhaustive or strict",
            other
        ))),
    }
}
