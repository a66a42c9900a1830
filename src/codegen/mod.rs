//! The Go backend: turns one `FlowGraph` into its share of the generated unit file.

use crate::backend::Backend;
use crate::graph::FlowGraph;
use crate::model::TypeRef;
use crate::resolver::Bindings;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

mod body;
mod decls;

/// How `New<Flow>Impl` obtains the function behind each step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitializerStyle {
    /// Calls each step's factory function: `step1FieldFunc: step1()`.
    #[default]
    Factories,
    /// Takes one function value per step as a parameter.
    Injected,
}

/// One flow's contribution to the unit file, kept apart so the output coordinator
/// can order and deduplicate across flows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeFragments {
    pub flow: String,
    /// Import paths, sorted and unique.
    pub imports: Vec<String>,
    pub constructor: String,
    pub initializer: String,
    /// Each type declaration on its own, binding interfaces first.
    pub types: Vec<String>,
    pub methods: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GoBackend {
    initializer: InitializerStyle,
}

impl GoBackend {
    pub fn new(initializer: InitializerStyle) -> Self {
        Self { initializer }
    }
}

impl Backend for GoBackend {
    type Output = CodeFragments;

    fn emit(&self, graph: &FlowGraph, bindings: &Bindings) -> CodeFragments {
        let services = bindings.flow_services(graph);
        let steps = graph.bound_steps();

        let mut types: Vec<String> = services
            .iter()
            .map(|binding| decls::binding_interface(binding))
            .collect();
        types.push(decls::flow_service(graph, &services));
        types.push(decls::impl_struct(graph, &steps));
        types.push(decls::func_type(graph));

        CodeFragments {
            flow: graph.name().to_string(),
            imports: imports(graph),
            constructor: body::emit_flow_function(graph),
            initializer: decls::initializer(graph, &steps, self.initializer),
            types,
            methods: decls::methods(graph, &steps),
        }
    }
}

/// Every import the flow's types and inline bodies need, plus `fmt` for fallback arms.
fn imports(graph: &FlowGraph) -> Vec<String> {
    let mut types: Vec<&TypeRef> = graph.input().into_iter().collect();
    types.extend(graph.result().output.as_ref());
    let mut paths: Vec<String> = Vec::new();
    for (_, step) in graph.steps() {
        types.extend(step.spec.input.as_ref());
        types.extend(step.spec.output.as_ref());
        if let Some(inline) = &step.spec.inline {
            paths.extend(inline.imports.iter().cloned());
        }
    }
    paths.extend(types.into_iter().filter_map(|ty| ty.import.clone()));
    if graph.has_fallback() {
        paths.push("fmt".to_string());
    }

    paths.into_iter().sorted().dedup().collect()
}

/// Emits one flow with the default settings.
pub fn emit_code(graph: &FlowGraph, bindings: &Bindings) -> CodeFragments {
    GoBackend::default().emit(graph, bindings)
}
