//! The host-neutral control-flow graph every backend projects from.

use crate::model::{FlowResult, StepSpec, TypeRef};
use std::fmt;
use std::path::{Path, PathBuf};

mod builder;
pub mod walk;

pub use builder::GraphBuilder;
pub use walk::{GraphVisitor, step_order, walk};

pub type NodeId = usize;

/// Where a step's input value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    FlowInput,
    Step(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNode {
    pub spec: StepSpec,
    pub input_from: Option<ValueSource>,
    /// Whether any later step (or a return) reads the value this step produces.
    pub output_consumed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionNode {
    /// The step whose output is switched on. Always the node right before the decision.
    pub discriminant: NodeId,
    /// The node every non-returning branch converges on.
    pub merge: NodeId,
    /// Unlisted discriminant values reach a generated "unhandled branch" error.
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// The end of the flow's top-level sequence.
    Success,
    /// The error sink every fallible node points at.
    Failure,
    /// An explicit early return.
    Return,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Step(StepNode),
    Decision(DecisionNode),
    Terminal(Terminal),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BranchLabel {
    Case(String),
    Default,
}

impl fmt::Display for BranchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchLabel::Case(label) => f.write_str(label),
            BranchLabel::Default => f.write_str("default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Next,
    Fail,
    Branch(BranchLabel),
}

/// A validated flow: acyclic, single entry, every step reachable.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    name: String,
    source: PathBuf,
    input: Option<TypeRef>,
    result: FlowResult,
    nodes: Vec<Node>,
    edges: Vec<Vec<(Edge, NodeId)>>,
    entry: NodeId,
    success: NodeId,
    failure: NodeId,
}

impl FlowGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn input(&self) -> Option<&TypeRef> {
        self.input.as_ref()
    }

    pub fn result(&self) -> &FlowResult {
        &self.result
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn success(&self) -> NodeId {
        self.success
    }

    pub fn failure(&self) -> NodeId {
        self.failure
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn outgoing(&self, id: NodeId) -> &[(Edge, NodeId)] {
        &self.edges[id]
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.find_edge(id, |e| matches!(e, Edge::Next))
    }

    pub fn fail(&self, id: NodeId) -> Option<NodeId> {
        self.find_edge(id, |e| matches!(e, Edge::Fail))
    }

    /// The `Branch` edges of a decision, in declaration order (default last).
    pub fn branches(&self, id: NodeId) -> impl Iterator<Item = (&BranchLabel, NodeId)> {
        self.edges[id].iter().filter_map(|(edge, target)| match edge {
            Edge::Branch(label) => Some((label, *target)),
            _ => None,
        })
    }

    pub fn step(&self, id: NodeId) -> Option<&StepNode> {
        match &self.nodes[id] {
            Node::Step(step) => Some(step),
            _ => None,
        }
    }

    /// All step nodes in build order, which is also traversal order.
    pub fn steps(&self) -> impl Iterator<Item = (NodeId, &StepNode)> {
        self.nodes.iter().enumerate().filter_map(|(id, node)| match node {
            Node::Step(step) => Some((id, step)),
            _ => None,
        })
    }

    /// Distinct injected steps (inline steps excluded), first occurrence wins.
    pub fn bound_steps(&self) -> Vec<&StepSpec> {
        let mut seen: Vec<&StepSpec> = Vec::new();
        for (_, step) in self.steps() {
            if !step.spec.is_inline() && !seen.iter().any(|s| s.name == step.spec.name) {
                seen.push(&step.spec);
            }
        }
        seen
    }

    /// Whether any edge leads to `id`.
    pub fn has_incoming(&self, id: NodeId) -> bool {
        self.edges
            .iter()
            .any(|out| out.iter().any(|(_, target)| *target == id))
    }

    /// Whether any decision in the graph needs the generated fallback arm.
    pub fn has_fallback(&self) -> bool {
        self.nodes
            .iter()
            .any(|node| matches!(node, Node::Decision(d) if d.fallback))
    }
}

impl fmt::Display for FlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "flow {} (entry #{})", self.name, self.entry)?;
        for (id, node) in self.nodes.iter().enumerate() {
            let label = match node {
                Node::Step(step) => {
                    let mut label = format!("step {}", step.spec.name);
                    if step.spec.is_inline() {
                        label.push_str(" [inline]");
                    }
                    if step.spec.fallible {
                        label.push_str(" [fallible]");
                    }
                    label
                }
                Node::Decision(decision) => {
                    format!("decision on #{} (merge #{})", decision.discriminant, decision.merge)
                }
                Node::Terminal(terminal) => format!("{:?}", terminal).to_lowercase(),
            };
            let edges = self.edges[id]
                .iter()
                .map(|(edge, target)| match edge {
                    Edge::Next => format!("next #{}", target),
                    Edge::Fail => format!("fail #{}", target),
                    Edge::Branch(label) => format!("case {} #{}", label, target),
                })
                .collect::<Vec<_>>();
            if edges.is_empty() {
                writeln!(f, "  #{} {}", id, label)?;
            } else {
                writeln!(f, "  #{} {} -> {}", id, label, edges.join(", "))?;
            }
        }
        Ok(())
    }
}

impl FlowGraph {
    fn find_edge(&self, id: NodeId, pred: impl Fn(&Edge) -> bool) -> Option<NodeId> {
        self.edges[id]
            .iter()
            .find(|(edge, _)| pred(edge))
            .map(|(_, target)| *target)
    }
}
