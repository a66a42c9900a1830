use super::{
    BranchLabel, DecisionNode, Edge, FlowGraph, Node, NodeId, StepNode, Terminal, ValueSource,
};
use crate::error::GraphError;
use crate::model::{
    Branch, Coverage, DecisionSpec, FlowNode, FlowResult, FlowSpec, Signature, StepSpec, TypeRef,
};
use crate::naming;
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;

const UNPATCHED: NodeId = NodeId::MAX;

/// The values visible at a point of the flow, keyed by type. The latest producer wins.
#[derive(Debug, Clone, Default)]
struct Scope {
    values: AHashMap<TypeRef, ValueSource>,
}

/// A built subsequence whose outgoing edges are still waiting for a target.
#[derive(Debug, Default)]
struct Chain {
    entry: Option<NodeId>,
    /// Dangling edges, patched onto whatever node follows the subsequence.
    pending: Vec<(NodeId, Edge)>,
    /// Decisions whose merge node is whatever follows the subsequence.
    merges: Vec<NodeId>,
    /// Every path through the subsequence ends in a terminal.
    terminated: bool,
}

/// Responsible for turning a `FlowSpec` into a validated `FlowGraph`.
///
/// Nodes are created left to right, so node ids follow traversal order. Edges whose
/// target is not known yet (the node after a step, the merge node of a decision) are
/// recorded as pending and patched once the next node exists.
pub struct GraphBuilder {
    flow: String,
    result: FlowResult,
    nodes: Vec<Node>,
    edges: Vec<Vec<(Edge, NodeId)>>,
    declared: AHashMap<String, StepSpec>,
    /// Exported method name -> the step that claimed it.
    methods: AHashMap<String, String>,
    success: NodeId,
    failure: NodeId,
}

impl GraphBuilder {
    pub fn build(flow: FlowSpec) -> Result<FlowGraph, GraphError> {
        let FlowSpec {
            name,
            source,
            input,
            nodes,
            result,
        } = flow;

        if !naming::is_identifier(&name) {
            return Err(GraphError::InvalidIdentifier {
                flow: name.clone(),
                name,
            });
        }
        if nodes.is_empty() {
            return Err(GraphError::EmptyFlow { flow: name });
        }

        let mut builder = GraphBuilder {
            flow: name,
            result,
            nodes: Vec::new(),
            edges: Vec::new(),
            declared: AHashMap::new(),
            methods: AHashMap::new(),
            success: 0,
            failure: 0,
        };
        builder.success = builder.push(Node::Terminal(Terminal::Success));
        builder.failure = builder.push(Node::Terminal(Terminal::Failure));

        let mut scope = Scope::default();
        if let Some(ty) = &input {
            scope.values.insert(ty.clone(), ValueSource::FlowInput);
        }

        let chain = builder.chain(nodes, &mut scope)?;
        if !chain.terminated {
            builder.resolve_result(&scope)?;
        }
        let success = builder.success;
        builder.connect(&chain.pending, &chain.merges, success);

        let graph = FlowGraph {
            name: builder.flow,
            source,
            input,
            result: builder.result,
            nodes: builder.nodes,
            edges: builder.edges,
            entry: chain.entry.unwrap_or(success),
            success,
            failure: builder.failure,
        };
        ensure_reachable(&graph)?;
        Ok(graph)
    }

    fn chain(&mut self, sequence: Vec<FlowNode>, scope: &mut Scope) -> Result<Chain, GraphError> {
        let mut current = Chain::default();
        for node in sequence {
            if current.terminated {
                return Err(GraphError::UnreachableStep {
                    flow: self.flow.clone(),
                    step: node.lead_name().to_string(),
                });
            }
            match node {
                FlowNode::Step(spec) => {
                    let id = self.add_step(spec, scope)?;
                    self.attach(&mut current, id);
                    current.pending.push((id, Edge::Next));
                }
                FlowNode::Decision(decision) => self.add_decision(decision, scope, &mut current)?,
                FlowNode::Return => {
                    self.resolve_result(scope)?;
                    let id = self.push(Node::Terminal(Terminal::Return));
                    self.attach(&mut current, id);
                    current.terminated = true;
                }
            }
        }
        Ok(current)
    }

    fn add_step(&mut self, spec: StepSpec, scope: &mut Scope) -> Result<NodeId, GraphError> {
        for name in [spec.name.as_str(), spec.function_ref()] {
            if !naming::is_identifier(name) {
                return Err(GraphError::InvalidIdentifier {
                    flow: self.flow.clone(),
                    name: name.to_string(),
                });
            }
        }
        self.check_redeclaration(&spec)?;
        if spec.fallible {
            self.require_error_channel(&spec.name)?;
        }

        let input_from = match &spec.input {
            Some(ty) => {
                let source = scope.values.get(ty).copied().ok_or_else(|| {
                    GraphError::UnresolvedInput {
                        flow: self.flow.clone(),
                        step: spec.name.clone(),
                        ty: ty.expr.clone(),
                    }
                })?;
                self.mark_consumed(source);
                Some(source)
            }
            None => None,
        };

        let output = spec.output.clone();
        let fallible = spec.fallible;
        let id = self.push(Node::Step(StepNode {
            spec,
            input_from,
            output_consumed: false,
        }));
        if fallible {
            self.link(id, Edge::Fail, self.failure);
        }
        if let Some(ty) = output {
            scope.values.insert(ty, ValueSource::Step(id));
        }
        Ok(id)
    }

    fn add_decision(
        &mut self,
        decision: DecisionSpec,
        scope: &mut Scope,
        current: &mut Chain,
    ) -> Result<(), GraphError> {
        let DecisionSpec {
            discriminant,
            branches,
            default,
            coverage,
        } = decision;
        let decision_name = discriminant.name.clone();

        if discriminant.output.is_none() {
            return Err(GraphError::DiscriminantWithoutOutput {
                flow: self.flow.clone(),
                step: decision_name,
            });
        }
        if branches.is_empty() && default.is_none() {
            return Err(GraphError::NoBranches {
                flow: self.flow.clone(),
                decision: decision_name,
            });
        }
        {
            let mut labels = AHashSet::new();
            for branch in &branches {
                if !labels.insert(naming::case_key(&branch.label)) {
                    return Err(GraphError::DuplicateBranchLabel {
                        flow: self.flow.clone(),
                        decision: decision_name,
                        label: branch.label.clone(),
                    });
                }
            }
        }
        if coverage == Coverage::Strict && default.is_none() {
            return Err(GraphError::MissingDefaultBranch {
                flow: self.flow.clone(),
                decision: decision_name,
            });
        }
        let fallback =
            coverage == Coverage::Open && default.is_none() && !is_boolean_pair(&branches);
        if fallback {
            self.require_error_channel(&decision_name)?;
        }

        let discriminant_id = self.add_step(discriminant, scope)?;
        self.mark_consumed(ValueSource::Step(discriminant_id));
        self.attach(current, discriminant_id);

        let id = self.push(Node::Decision(DecisionNode {
            discriminant: discriminant_id,
            merge: self.success,
            fallback,
        }));
        self.link(discriminant_id, Edge::Next, id);
        if fallback {
            self.link(id, Edge::Fail, self.failure);
        }

        let arms = branches
            .into_iter()
            .map(|branch| (BranchLabel::Case(branch.label), branch.nodes))
            .chain(default.map(|nodes| (BranchLabel::Default, nodes)));

        let mut pending = Vec::new();
        let mut merges = Vec::new();
        let mut all_terminated = true;
        for (label, nodes) in arms {
            // Values produced inside a branch do not escape it.
            let mut branch_scope = scope.clone();
            let arm = self.chain(nodes, &mut branch_scope)?;
            match arm.entry {
                Some(entry) => self.link(id, Edge::Branch(label), entry),
                None => {
                    // Keep declaration order; the target is patched with the merge node.
                    self.edges[id].push((Edge::Branch(label.clone()), UNPATCHED));
                    pending.push((id, Edge::Branch(label)));
                }
            }
            all_terminated &= arm.terminated;
            pending.extend(arm.pending);
            merges.extend(arm.merges);
        }
        merges.push(id);

        current.pending = pending;
        current.merges = merges;
        current.terminated = all_terminated;
        Ok(())
    }

    fn check_redeclaration(&mut self, spec: &StepSpec) -> Result<(), GraphError> {
        match self.declared.get(&spec.name) {
            Some(first) if !same_shape(first, spec) => Err(GraphError::ConflictingStepSignature {
                flow: self.flow.clone(),
                step: spec.name.clone(),
                first: describe(first),
                second: describe(spec),
            }),
            Some(_) => Ok(()),
            None => {
                // `step1` and `Step1` would share a method, a field and an initializer entry.
                let method = naming::exported(&spec.name);
                if let Some(first) = self.methods.get(&method) {
                    return Err(GraphError::ConflictingMethodName {
                        flow: self.flow.clone(),
                        first: first.clone(),
                        second: spec.name.clone(),
                        method,
                    });
                }
                self.methods.insert(method, spec.name.clone());
                self.declared.insert(spec.name.clone(), spec.clone());
                Ok(())
            }
        }
    }

    fn require_error_channel(&self, origin: &str) -> Result<(), GraphError> {
        if self.result.fallible {
            Ok(())
        } else {
            Err(GraphError::MissingErrorChannel {
                flow: self.flow.clone(),
                origin: origin.to_string(),
            })
        }
    }

    fn resolve_result(&mut self, scope: &Scope) -> Result<(), GraphError> {
        let Some(ty) = self.result.output.clone() else {
            return Ok(());
        };
        let source = scope
            .values
            .get(&ty)
            .copied()
            .ok_or_else(|| GraphError::UnresolvedResult {
                flow: self.flow.clone(),
                ty: ty.expr.clone(),
            })?;
        self.mark_consumed(source);
        Ok(())
    }

    fn mark_consumed(&mut self, source: ValueSource) {
        if let ValueSource::Step(id) = source {
            if let Node::Step(step) = &mut self.nodes[id] {
                step.output_consumed = true;
            }
        }
    }

    fn attach(&mut self, current: &mut Chain, target: NodeId) {
        let pending = std::mem::take(&mut current.pending);
        let merges = std::mem::take(&mut current.merges);
        self.connect(&pending, &merges, target);
        current.entry.get_or_insert(target);
    }

    fn connect(&mut self, pending: &[(NodeId, Edge)], merges: &[NodeId], target: NodeId) {
        for (from, edge) in pending {
            self.link(*from, edge.clone(), target);
        }
        for id in merges {
            if let Node::Decision(decision) = &mut self.nodes[*id] {
                decision.merge = target;
            }
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.edges.push(Vec::new());
        self.nodes.len() - 1
    }

    fn link(&mut self, from: NodeId, edge: Edge, to: NodeId) {
        let slot = self.edges[from]
            .iter_mut()
            .find(|(existing, target)| *target == UNPATCHED && *existing == edge);
        match slot {
            Some(slot) => slot.1 = to,
            None => self.edges[from].push((edge, to)),
        }
    }
}

fn is_boolean_pair(branches: &[Branch]) -> bool {
    let labels: AHashSet<&str> = branches.iter().map(|b| b.label.trim()).collect();
    branches.len() == 2 && labels.contains("true") && labels.contains("false")
}

fn same_shape(a: &StepSpec, b: &StepSpec) -> bool {
    Signature::of(a) == Signature::of(b) && a.function_ref() == b.function_ref() && a.inline == b.inline
}

fn describe(step: &StepSpec) -> String {
    if step.is_inline() {
        format!("inline {}", Signature::of(step))
    } else {
        format!("{} via {}()", Signature::of(step), step.function_ref())
    }
}

/// Every non-terminal node must be reachable from the entry.
fn ensure_reachable(graph: &FlowGraph) -> Result<(), GraphError> {
    let mut seen = vec![false; graph.nodes.len()];
    let mut queue = VecDeque::from([graph.entry]);
    while let Some(id) = queue.pop_front() {
        if std::mem::replace(&mut seen[id], true) {
            continue;
        }
        queue.extend(graph.edges[id].iter().map(|(_, target)| *target));
    }
    for (id, node) in graph.nodes.iter().enumerate() {
        if seen[id] {
            continue;
        }
        let step = match node {
            Node::Step(step) => step.spec.name.clone(),
            Node::Decision(decision) => match &graph.nodes[decision.discriminant] {
                Node::Step(step) => step.spec.name.clone(),
                _ => continue,
            },
            Node::Terminal(_) => continue,
        };
        return Err(GraphError::UnreachableStep {
            flow: graph.name.clone(),
            step,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(nodes: Vec<FlowNode>) -> FlowSpec {
        FlowSpec {
            name: "F".to_string(),
            source: "pkg/flows.go".into(),
            input: None,
            nodes,
            result: FlowResult {
                output: None,
                fallible: true,
            },
        }
    }

    #[test]
    fn fallible_steps_point_at_the_failure_sink() {
        let graph = GraphBuilder::build(flow(vec![
            FlowNode::Step(StepSpec::new("a").fallible()),
            FlowNode::Step(StepSpec::new("b")),
        ]))
        .unwrap();

        let a = graph.entry();
        let b = graph.next(a).unwrap();
        assert_eq!(graph.fail(a), Some(graph.failure()));
        assert_eq!(graph.fail(b), None);
        assert_eq!(graph.next(b), Some(graph.success()));
    }

    #[test]
    fn branches_converge_on_the_node_after_the_decision() {
        let graph = GraphBuilder::build(flow(vec![
            FlowNode::Decision(DecisionSpec {
                discriminant: StepSpec::new("check").with_output(TypeRef::new("bool")),
                branches: vec![
                    Branch::new("true", vec![FlowNode::Step(StepSpec::new("yes"))]),
                    Branch::new("false", vec![]),
                ],
                default: None,
                coverage: Coverage::Open,
            }),
            FlowNode::Step(StepSpec::new("after")),
        ]))
        .unwrap();

        let (decision_id, decision) = (0..graph.len())
            .find_map(|id| match graph.node(id) {
                Node::Decision(d) => Some((id, d.clone())),
                _ => None,
            })
            .unwrap();
        let after = graph.step(decision.merge).unwrap();
        assert_eq!(after.spec.name, "after");
        assert!(!decision.fallback);

        let arms: Vec<_> = graph.branches(decision_id).collect();
        assert_eq!(arms.len(), 2);
        // The empty branch links straight to the merge node.
        assert_eq!(arms[1].1, decision.merge);
        let yes = arms[0].1;
        assert_eq!(graph.next(yes), Some(decision.merge));
    }

    #[test]
    fn inputs_resolve_to_the_latest_producer() {
        let a = TypeRef::new("a");
        let graph = GraphBuilder::build(flow(vec![
            FlowNode::Step(StepSpec::new("first").with_output(a.clone())),
            FlowNode::Step(StepSpec::new("second").with_output(a.clone())),
            FlowNode::Step(StepSpec::new("use").with_input(a)),
        ]))
        .unwrap();

        let steps: Vec<_> = graph.steps().collect();
        assert!(!steps[0].1.output_consumed);
        assert!(steps[1].1.output_consumed);
        assert_eq!(steps[2].1.input_from, Some(ValueSource::Step(steps[1].0)));
    }

    #[test]
    fn values_produced_in_a_branch_do_not_escape_it() {
        let a = TypeRef::new("a");
        let err = GraphBuilder::build(flow(vec![
            FlowNode::Decision(DecisionSpec {
                discriminant: StepSpec::new("check").with_output(TypeRef::new("bool")),
                branches: vec![
                    Branch::new(
                        "true",
                        vec![FlowNode::Step(StepSpec::new("make").with_output(a.clone()))],
                    ),
                    Branch::new("false", vec![]),
                ],
                default: None,
                coverage: Coverage::Open,
            }),
            FlowNode::Step(StepSpec::new("use").with_input(a)),
        ]))
        .unwrap_err();
        assert!(matches!(err, GraphError::UnresolvedInput { step, .. } if step == "use"));
    }

    #[test]
    fn redeclared_steps_must_agree() {
        let err = GraphBuilder::build(flow(vec![
            FlowNode::Step(StepSpec::new("a")),
            FlowNode::Step(StepSpec::new("a").fallible()),
        ]))
        .unwrap_err();
        assert!(matches!(err, GraphError::ConflictingStepSignature { .. }));

        assert!(
            GraphBuilder::build(flow(vec![
                FlowNode::Step(StepSpec::new("a")),
                FlowNode::Step(StepSpec::new("a")),
            ]))
            .is_ok()
        );
    }

    #[test]
    fn steps_after_a_return_are_unreachable() {
        let err = GraphBuilder::build(flow(vec![
            FlowNode::Step(StepSpec::new("a")),
            FlowNode::Return,
            FlowNode::Step(StepSpec::new("b")),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnreachableStep {
                flow: "F".to_string(),
                step: "b".to_string()
            }
        );
    }
}
