use crate::graph::FlowGraph;
use crate::model::Signature;
use ahash::{AHashMap, AHashSet};

/// A step wrapped by a service binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundStep {
    pub flow: String,
    pub step: String,
    pub function: String,
}

/// One generated capability interface, shared by every step with the same signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBinding {
    pub interface: String,
    pub signature: Signature,
    pub steps: Vec<BoundStep>,
}

/// The dependency-injection plan of a batch of flows.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    services: Vec<ServiceBinding>,
    by_step: AHashMap<(String, String), usize>,
}

impl Bindings {
    /// All bindings, ordered by the first step that required them.
    pub fn services(&self) -> &[ServiceBinding] {
        &self.services
    }

    pub fn binding_for(&self, flow: &str, step: &str) -> Option<&ServiceBinding> {
        self.by_step
            .get(&(flow.to_string(), step.to_string()))
            .map(|index| &self.services[*index])
    }

    /// The bindings one flow uses, in the order its steps are visited.
    pub fn flow_services(&self, graph: &FlowGraph) -> Vec<&ServiceBinding> {
        let mut seen = AHashSet::new();
        graph
            .bound_steps()
            .into_iter()
            .filter_map(|step| self.by_step.get(&(graph.name().to_string(), step.name.clone())))
            .filter(|index| seen.insert(**index))
            .map(|index| &self.services[*index])
            .collect()
    }
}

/// Groups steps by signature across every graph it is fed.
///
/// Works like a common-subexpression cache: the first time a signature is seen it
/// gets a new binding, later steps with the same signature reuse it.
pub struct DependencyResolver {
    cache: AHashMap<Signature, usize>,
    services: Vec<ServiceBinding>,
    by_step: AHashMap<(String, String), usize>,
    taken: AHashSet<String>,
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self {
            cache: AHashMap::new(),
            services: Vec::new(),
            by_step: AHashMap::new(),
            taken: AHashSet::new(),
        }
    }

    /// Registers the type names a flow declares so binding interfaces never collide with them.
    pub fn reserve_flow_names(&mut self, flow: &str) {
        for suffix in ["", "Service", "Impl", "Func"] {
            self.taken.insert(format!("{}{}", flow, suffix));
        }
        self.taken.insert(format!("New{}Impl", flow));
    }

    pub fn add_graph(&mut self, graph: &FlowGraph) {
        for step in graph.bound_steps() {
            let signature = Signature::of(step);
            let index = match self.cache.get(&signature) {
                Some(index) => *index,
                None => {
                    let interface = self.unique_interface_name(&signature.method);
                    let index = self.services.len();
                    self.services.push(ServiceBinding {
                        interface,
                        signature: signature.clone(),
                        steps: Vec::new(),
                    });
                    self.cache.insert(signature, index);
                    index
                }
            };
            self.services[index].steps.push(BoundStep {
                flow: graph.name().to_string(),
                step: step.name.clone(),
                function: step.function_ref().to_string(),
            });
            self.by_step
                .insert((graph.name().to_string(), step.name.clone()), index);
        }
    }

    pub fn finish(self) -> Bindings {
        Bindings {
            services: self.services,
            by_step: self.by_step,
        }
    }

    fn unique_interface_name(&mut self, method: &str) -> String {
        let base = format!("{}Service", method);
        let mut candidate = base.clone();
        let mut counter = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Resolves the bindings of a whole batch. Graph order decides binding order.
pub fn resolve(graphs: &[FlowGraph]) -> Bindings {
    let mut resolver = DependencyResolver::new();
    for graph in graphs {
        resolver.reserve_flow_names(graph.name());
    }
    for graph in graphs {
        resolver.add_graph(graph);
    }
    resolver.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::model::{FlowNode, FlowResult, FlowSpec, StepSpec, TypeRef};

    fn graph(name: &str, steps: Vec<StepSpec>) -> FlowGraph {
        GraphBuilder::build(FlowSpec {
            name: name.to_string(),
            source: "pkg/flows.go".into(),
            input: None,
            nodes: steps.into_iter().map(FlowNode::Step).collect(),
            result: FlowResult {
                output: None,
                fallible: true,
            },
        })
        .unwrap()
    }

    #[test]
    fn identical_signatures_share_one_binding_across_flows() {
        let graphs = vec![
            graph("A", vec![StepSpec::new("load").fallible()]),
            graph("B", vec![StepSpec::new("load").fallible(), StepSpec::new("save")]),
        ];
        let bindings = resolve(&graphs);

        assert_eq!(bindings.services().len(), 2);
        let load = &bindings.services()[0];
        assert_eq!(load.interface, "LoadService");
        assert_eq!(load.steps.len(), 2);
        assert_eq!(
            bindings.binding_for("A", "load"),
            bindings.binding_for("B", "load")
        );
    }

    #[test]
    fn same_method_with_different_types_gets_a_distinct_interface() {
        let graphs = vec![
            graph("A", vec![StepSpec::new("load").fallible()]),
            graph(
                "B",
                vec![StepSpec::new("load").with_output(TypeRef::new("int")).fallible()],
            ),
        ];
        let bindings = resolve(&graphs);
        let names: Vec<_> = bindings.services().iter().map(|s| s.interface.as_str()).collect();
        assert_eq!(names, vec!["LoadService", "LoadService2"]);
    }

    #[test]
    fn binding_names_avoid_flow_type_names() {
        let graphs = vec![graph("Load", vec![StepSpec::new("load")])];
        let bindings = resolve(&graphs);
        assert_eq!(bindings.services()[0].interface, "LoadService2");
    }

    #[test]
    fn order_follows_first_seen_step_not_group_size() {
        let graphs = vec![
            graph("A", vec![StepSpec::new("zeta"), StepSpec::new("alpha")]),
            graph("B", vec![StepSpec::new("alpha")]),
        ];
        let bindings = resolve(&graphs);
        assert_eq!(bindings.services()[0].signature.method, "Zeta");
        assert_eq!(bindings.services()[1].signature.method, "Alpha");
    }
}
