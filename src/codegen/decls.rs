use super::InitializerStyle;
use crate::backend::SourceBuffer;
use crate::graph::FlowGraph;
use crate::model::{Signature, StepSpec};
use crate::naming;
use crate::resolver::ServiceBinding;

fn field_name(step: &StepSpec) -> String {
    format!("{}FieldFunc", naming::unexported(&step.name))
}

/// `type Step1Service interface { Step1() error }`
pub(super) fn binding_interface(binding: &ServiceBinding) -> String {
    let mut out = SourceBuffer::tabs();
    out.line(format!("type {} interface {{", binding.interface));
    out.indent();
    out.line(binding.signature.to_string());
    out.dedent();
    out.line("}");
    out.take()
}

/// The flow's service: every binding interface the flow calls, embedded.
pub(super) fn flow_service(graph: &FlowGraph, services: &[&ServiceBinding]) -> String {
    if services.is_empty() {
        return format!("type {}Service interface{{}}\n", graph.name());
    }
    let mut out = SourceBuffer::tabs();
    out.line(format!("type {}Service interface {{", graph.name()));
    out.indent();
    for binding in services {
        out.line(&binding.interface);
    }
    out.dedent();
    out.line("}");
    out.take()
}

pub(super) fn impl_struct(graph: &FlowGraph, steps: &[&StepSpec]) -> String {
    if steps.is_empty() {
        return format!("type {}Impl struct{{}}\n", graph.name());
    }
    let mut out = SourceBuffer::tabs();
    out.line(format!("type {}Impl struct {{", graph.name()));
    out.indent();
    for step in steps {
        out.line(format!(
            "{} {}",
            field_name(step),
            Signature::of(step).func_type()
        ));
    }
    out.dedent();
    out.line("}");
    out.take()
}

pub(super) fn func_type(graph: &FlowGraph) -> String {
    let result = graph.result();
    format!(
        "type {}Func {}\n",
        graph.name(),
        naming::func_type(graph.input(), result.output.as_ref(), result.fallible)
    )
}

/// `New<Flow>Impl`, wiring one function value per wrapped step.
pub(super) fn initializer(graph: &FlowGraph, steps: &[&StepSpec], style: InitializerStyle) -> String {
    let params = match style {
        InitializerStyle::Factories => String::new(),
        InitializerStyle::Injected => steps
            .iter()
            .map(|step| format!("{} {}", step.name, Signature::of(step).func_type()))
            .collect::<Vec<_>>()
            .join(", "),
    };

    let mut out = SourceBuffer::tabs();
    out.line(format!(
        "func New{}Impl({}) *{}Impl {{",
        graph.name(),
        params,
        graph.name()
    ));
    out.indent();
    if steps.is_empty() {
        out.line(format!("return &{}Impl{{}}", graph.name()));
    } else {
        out.line(format!("return &{}Impl{{", graph.name()));
        out.indent();
        for step in steps {
            let value = match style {
                InitializerStyle::Factories => format!("{}()", step.function_ref()),
                InitializerStyle::Injected => step.name.clone(),
            };
            out.line(format!("{}: {},", field_name(step), value));
        }
        out.dedent();
        out.line("}");
    }
    out.dedent();
    out.line("}");
    out.take()
}

/// One forwarding method per wrapped step, so `*<Flow>Impl` satisfies `<Flow>Service`.
pub(super) fn methods(graph: &FlowGraph, steps: &[&StepSpec]) -> String {
    let mut out = SourceBuffer::tabs();
    for (index, step) in steps.iter().enumerate() {
        if index > 0 {
            out.line("");
        }
        let signature = Signature::of(step);
        let param = step
            .input
            .as_ref()
            .map(|ty| format!("input {}", ty.expr))
            .unwrap_or_default();
        let arg = if step.input.is_some() { "input" } else { "" };
        let returns = step.output.is_some() || step.fallible;

        out.line(format!(
            "func (c *{}Impl) {}({}){} {{",
            graph.name(),
            signature.method,
            param,
            naming::results(step.output.as_ref(), step.fallible)
        ));
        out.indent();
        out.line(format!(
            "{}c.{}({})",
            if returns { "return " } else { "" },
            field_name(step),
            arg
        ));
        out.dedent();
        out.line("}");
    }
    out.take()
}
