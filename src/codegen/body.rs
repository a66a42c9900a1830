use crate::backend::SourceBuffer;
use crate::graph::{
    BranchLabel, DecisionNode, FlowGraph, GraphVisitor, NodeId, StepNode, Terminal, walk,
};
use crate::model::{InlineBody, StepSpec, TypeRef};
use crate::naming;
use ahash::{AHashMap, AHashSet};

/// Emits the flow constructor: a function taking the flow's service and returning
/// the flow function that calls every step in order.
pub(super) fn emit_flow_function(graph: &FlowGraph) -> String {
    let name = graph.name();
    let mut body = FlowBody::new(graph);
    let param = graph
        .input()
        .map(|ty| format!("{} {}", body.vars.of(ty), ty.expr))
        .unwrap_or_default();
    let results = naming::results(graph.result().output.as_ref(), graph.result().fallible);

    walk(graph, &mut body);

    let mut out = SourceBuffer::tabs();
    out.line(format!("func {}(service {}Service) {}Func {{", name, name, name));
    out.indent();
    out.line(format!("return func({}){} {{", param, results));
    out.indent();
    out.block(&body.out.take());
    out.dedent();
    out.line("}");
    out.dedent();
    out.line("}");
    out.take()
}

/// One Go variable per distinct value type of a flow.
///
/// Types that render to the same base name (`a.User` and `b.User`, `a` and `A`) get a
/// numeric suffix in the order they first appear.
struct Variables {
    names: AHashMap<TypeRef, String>,
}

impl Variables {
    fn for_graph(graph: &FlowGraph) -> Self {
        let mut names = AHashMap::new();
        let mut taken = AHashSet::new();
        let types = graph
            .input()
            .into_iter()
            .chain(graph.steps().filter_map(|(_, step)| step.spec.output.as_ref()));
        for ty in types {
            if names.contains_key(ty) {
                continue;
            }
            let base = naming::var_name(ty);
            let mut name = base.clone();
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}{}", base, n);
                n += 1;
            }
            names.insert(ty.clone(), name);
        }
        Self { names }
    }

    fn of(&self, ty: &TypeRef) -> String {
        self.names
            .get(ty)
            .cloned()
            .unwrap_or_else(|| naming::var_name(ty))
    }
}

/// Turns the traversal into Go statements.
///
/// Tracks the variables declared in each Go block so that a value is introduced with
/// `:=` once and reassigned with `=` afterwards.
struct FlowBody<'g> {
    graph: &'g FlowGraph,
    vars: Variables,
    out: SourceBuffer,
    blocks: Vec<AHashSet<String>>,
}

impl<'g> FlowBody<'g> {
    fn new(graph: &'g FlowGraph) -> Self {
        let vars = Variables::for_graph(graph);
        let mut root = AHashSet::new();
        if let Some(ty) = graph.input() {
            root.insert(vars.of(ty));
        }
        Self {
            graph,
            vars,
            out: SourceBuffer::tabs(),
            blocks: vec![root],
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        self.blocks
            .last()
            .is_some_and(|block| block.contains(name))
    }

    /// `x, err :=` or `x, err =`, declaring whatever is new in the current block.
    fn assignment(&mut self, names: &[String]) -> String {
        let named: Vec<&String> = names.iter().filter(|n| n.as_str() != "_").collect();
        let fresh = named.iter().any(|n| !self.is_declared(n));
        if let Some(block) = self.blocks.last_mut() {
            block.extend(named.into_iter().cloned());
        }
        format!("{} {} ", names.join(", "), if fresh { ":=" } else { "=" })
    }

    fn failure_return(&self, err: &str) -> String {
        match &self.graph.result().output {
            Some(ty) => format!("return {}, {}", naming::zero_value(ty), err),
            None => format!("return {}", err),
        }
    }

    fn success_return(&self) -> String {
        let result = self.graph.result();
        match (&result.output, result.fallible) {
            (Some(ty), true) => format!("return {}, nil", self.vars.of(ty)),
            (Some(ty), false) => format!("return {}", self.vars.of(ty)),
            (None, true) => "return nil".to_string(),
            (None, false) => "return".to_string(),
        }
    }

    fn emit_inline(&mut self, prefix: &str, spec: &StepSpec, inline: &InlineBody, arg: &str) {
        let param = spec
            .input
            .as_ref()
            .map(|ty| format!("input {}", ty.expr))
            .unwrap_or_default();
        let results = naming::results(spec.output.as_ref(), spec.fallible);
        self.out.line(format!("{}func({}){} {{", prefix, param, results));
        self.out.indent();
        self.out.block(&inline.body);
        self.out.dedent();
        self.out.line(format!("}}({})", arg));
    }
}

impl GraphVisitor for FlowBody<'_> {
    fn step(&mut self, _id: NodeId, step: &StepNode) {
        let spec = &step.spec;
        let arg = spec
            .input
            .as_ref()
            .map(|ty| self.vars.of(ty))
            .unwrap_or_default();

        let mut names = Vec::new();
        match &spec.output {
            Some(ty) if step.output_consumed => names.push(self.vars.of(ty)),
            Some(_) if spec.fallible => names.push("_".to_string()),
            _ => {}
        }
        if spec.fallible {
            names.push("err".to_string());
        }
        let prefix = if names.is_empty() {
            String::new()
        } else {
            self.assignment(&names)
        };

        match &spec.inline {
            Some(inline) => self.emit_inline(&prefix, spec, inline, &arg),
            None => self.out.line(format!(
                "{}service.{}({})",
                prefix,
                naming::exported(&spec.name),
                arg
            )),
        }

        if spec.fallible {
            let ret = self.failure_return("err");
            self.out.line("if err != nil {");
            self.out.indent();
            self.out.line(ret);
            self.out.dedent();
            self.out.line("}");
        }
    }

    fn enter_decision(&mut self, _id: NodeId, decision: &DecisionNode) {
        let value = self
            .graph
            .step(decision.discriminant)
            .and_then(|step| step.spec.output.as_ref())
            .map(|ty| self.vars.of(ty))
            .unwrap_or_default();
        self.out.line(format!("switch {} {{", value));
    }

    fn enter_branch(&mut self, label: &BranchLabel) {
        match label {
            BranchLabel::Case(label) => self.out.line(format!("case {}:", label.trim())),
            BranchLabel::Default => self.out.line("default:"),
        }
        self.out.indent();
        self.blocks.push(AHashSet::new());
    }

    fn exit_branch(&mut self) {
        self.blocks.pop();
        self.out.dedent();
    }

    fn fallback(&mut self, _id: NodeId, decision: &DecisionNode) {
        let Some(step) = self.graph.step(decision.discriminant) else {
            return;
        };
        let value = step
            .spec
            .output
            .as_ref()
            .map(|ty| self.vars.of(ty))
            .unwrap_or_default();
        let err = format!(
            "fmt.Errorf(\"{}: unhandled branch %v of {}\", {})",
            self.graph.name(),
            step.spec.name,
            value
        );
        let ret = self.failure_return(&err);
        self.out.line("default:");
        self.out.indent();
        self.out.line(ret);
        self.out.dedent();
    }

    fn exit_decision(&mut self, _id: NodeId, _decision: &DecisionNode) {
        self.out.line("}");
    }

    fn terminal(&mut self, terminal: Terminal) {
        match terminal {
            Terminal::Return => {
                let ret = self.success_return();
                self.out.line(ret);
            }
            Terminal::Success if self.graph.has_incoming(self.graph.success()) => {
                let ret = self.success_return();
                self.out.line(ret);
            }
            // Every branch before this point returned; Go still wants a terminating statement.
            Terminal::Success => self.out.line("panic(\"unreachable\")"),
            Terminal::Failure => {}
        }
    }
}
