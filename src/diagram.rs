//! The PlantUML backend: one sequence diagram per flow.

use crate::backend::{Backend, SourceBuffer};
use crate::graph::{
    BranchLabel, DecisionNode, FlowGraph, GraphVisitor, NodeId, StepNode, Terminal, walk,
};
use crate::model::{ArtifactKind, GeneratedArtifact};
use crate::resolver::Bindings;
use std::path::PathBuf;

pub const DEFAULT_DIAGRAM_DIR: &str = "diagrams";

#[derive(Debug, Clone)]
pub struct PlantUmlBackend {
    diagram_dir: String,
}

impl Default for PlantUmlBackend {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGRAM_DIR)
    }
}

impl PlantUmlBackend {
    pub fn new(diagram_dir: impl Into<String>) -> Self {
        Self {
            diagram_dir: diagram_dir.into(),
        }
    }

    /// `<source dir>/<diagram dir>/<flow>.plantuml`
    pub fn path_for(&self, graph: &FlowGraph) -> PathBuf {
        graph
            .source()
            .parent()
            .map(|dir| dir.to_path_buf())
            .unwrap_or_default()
            .join(&self.diagram_dir)
            .join(format!("{}.plantuml", graph.name()))
    }
}

impl Backend for PlantUmlBackend {
    type Output = GeneratedArtifact;

    fn emit(&self, graph: &FlowGraph, bindings: &Bindings) -> GeneratedArtifact {
        let mut sequence = Sequence::new(graph, bindings);
        walk(graph, &mut sequence);

        let mut doc = SourceBuffer::tabs();
        doc.line("@startuml");
        doc.line(format!("right footer - {}", graph.name()));
        doc.line("scale 1.2");
        doc.line("");
        doc.line("skinparam monochrome true");
        doc.line("skinparam SequenceBoxBackgroundColor #FAFAFA");
        doc.line("skinparam SequenceBoxBorderColor #F0F0F0");
        doc.line("hide footbox");
        doc.line(format!("participant {}", graph.name()));
        for participant in &sequence.participants {
            doc.line(format!("participant {}", participant));
        }
        doc.block(&sequence.out.take());
        doc.line("@enduml");

        GeneratedArtifact::new(
            self.path_for(graph),
            doc.take().into_bytes(),
            ArtifactKind::Diagram,
        )
    }
}

/// Emits one flow with the default diagram directory.
pub fn emit_diagram(graph: &FlowGraph, bindings: &Bindings) -> GeneratedArtifact {
    PlantUmlBackend::default().emit(graph, bindings)
}

struct Sequence<'g> {
    graph: &'g FlowGraph,
    bindings: &'g Bindings,
    participants: Vec<String>,
    out: SourceBuffer,
    /// Whether the innermost open `alt` block has had its first section yet.
    sections: Vec<bool>,
}

impl<'g> Sequence<'g> {
    fn new(graph: &'g FlowGraph, bindings: &'g Bindings) -> Self {
        Self {
            graph,
            bindings,
            participants: Vec::new(),
            out: SourceBuffer::new("  "),
            sections: Vec::new(),
        }
    }

    fn section(&mut self, title: &str) {
        let opened = self
            .sections
            .last_mut()
            .map(|open| std::mem::replace(open, true));
        match opened {
            Some(true) => self.out.line(format!("else {}", title)),
            _ => self.out.line(format!("alt {}", title)),
        }
    }
}

impl GraphVisitor for Sequence<'_> {
    fn step(&mut self, _id: NodeId, step: &StepNode) {
        let flow = self.graph.name();
        let caller = if step.spec.is_inline() {
            flow.to_string()
        } else {
            match self.bindings.binding_for(flow, &step.spec.name) {
                Some(binding) => {
                    if !self.participants.contains(&binding.interface) {
                        self.participants.push(binding.interface.clone());
                    }
                    binding.interface.clone()
                }
                None => flow.to_string(),
            }
        };
        self.out
            .line(format!("{} -> {}: {}", caller, flow, step.spec.name));
    }

    fn enter_decision(&mut self, _id: NodeId, _decision: &DecisionNode) {
        self.sections.push(false);
    }

    fn enter_branch(&mut self, label: &BranchLabel) {
        self.section(&label.to_string());
        self.out.indent();
    }

    fn exit_branch(&mut self) {
        self.out.dedent();
    }

    fn fallback(&mut self, _id: NodeId, _decision: &DecisionNode) {
        self.section("unhandled");
        self.out.indent();
        self.out
            .line(format!("note over {}: unhandled branch error", self.graph.name()));
        self.out.dedent();
    }

    fn exit_decision(&mut self, _id: NodeId, _decision: &DecisionNode) {
        self.sections.pop();
        self.out.line("end");
    }

    fn terminal(&mut self, terminal: Terminal) {
        if terminal == Terminal::Return {
            self.out
                .line(format!("note over {}: return", self.graph.name()));
        }
    }
}
