use super::{BranchLabel, DecisionNode, FlowGraph, Node, NodeId, StepNode, Terminal};

/// Callbacks for the structured traversal shared by every backend.
///
/// Both backends are driven by [`walk`], so the order in which they see steps,
/// decisions and branches is the same by construction.
pub trait GraphVisitor {
    fn step(&mut self, id: NodeId, step: &StepNode);

    fn enter_decision(&mut self, id: NodeId, decision: &DecisionNode);

    fn enter_branch(&mut self, label: &BranchLabel);

    fn exit_branch(&mut self) {}

    /// The generated arm for discriminant values no branch lists.
    fn fallback(&mut self, id: NodeId, decision: &DecisionNode);

    fn exit_decision(&mut self, id: NodeId, decision: &DecisionNode);

    fn terminal(&mut self, terminal: Terminal);
}

/// Walks the graph from its entry. Branches are walked up to their merge node, then
/// the walk resumes at the merge node once, after the decision is closed.
pub fn walk<V: GraphVisitor>(graph: &FlowGraph, visitor: &mut V) {
    walk_chain(graph, graph.entry(), None, visitor);
}

fn walk_chain<V: GraphVisitor>(
    graph: &FlowGraph,
    start: NodeId,
    stop: Option<NodeId>,
    visitor: &mut V,
) {
    let mut current = start;
    while Some(current) != stop {
        match graph.node(current) {
            Node::Step(step) => {
                visitor.step(current, step);
                match graph.next(current) {
                    Some(next) => current = next,
                    None => return,
                }
            }
            Node::Decision(decision) => {
                visitor.enter_decision(current, decision);
                for (label, target) in graph.branches(current) {
                    visitor.enter_branch(label);
                    walk_chain(graph, target, Some(decision.merge), visitor);
                    visitor.exit_branch();
                }
                if decision.fallback {
                    visitor.fallback(current, decision);
                }
                visitor.exit_decision(current, decision);
                current = decision.merge;
            }
            Node::Terminal(terminal) => {
                visitor.terminal(*terminal);
                return;
            }
        }
    }
}

struct StepOrder(Vec<String>);

impl GraphVisitor for StepOrder {
    fn step(&mut self, _id: NodeId, step: &StepNode) {
        self.0.push(step.spec.name.clone());
    }
    fn enter_decision(&mut self, _id: NodeId, _decision: &DecisionNode) {}
    fn enter_branch(&mut self, _label: &BranchLabel) {}
    fn fallback(&mut self, _id: NodeId, _decision: &DecisionNode) {}
    fn exit_decision(&mut self, _id: NodeId, _decision: &DecisionNode) {}
    fn terminal(&mut self, _terminal: Terminal) {}
}

/// The step names in the order every backend visits them.
pub fn step_order(graph: &FlowGraph) -> Vec<String> {
    let mut order = StepOrder(Vec::new());
    walk(graph, &mut order);
    order.0
}
