//! Properties that must hold for every compiled unit, checked over the shared fixtures.
mod common;
use common::*;
use flowgen::graph::{GraphBuilder, step_order};
use flowgen::naming;
use flowgen::prelude::*;

fn fixtures() -> Vec<FlowSpec> {
    vec![
        scenario_a(),
        scenario_b(),
        scenario_c(),
        open_decision(),
    ]
}

#[test]
fn test_output_is_deterministic() {
    let first = compile(unit_of(fixtures()));
    for _ in 0..5 {
        let again = compile(unit_of(fixtures()));
        assert_eq!(again.artifacts, first.artifacts);
    }
}

#[test]
fn test_every_fallible_call_is_followed_by_its_early_return() {
    let compiled = compile(unit_of(fixtures()));
    let code = compiled.code().unwrap().text();
    let lines: Vec<&str> = code.lines().collect();

    let mut checked = 0;
    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        let is_call = trimmed.contains("err := ") || trimmed.contains("err = ");
        if !is_call || trimmed.starts_with("if ") {
            continue;
        }
        // Inline calls close with `}(...)`; the check follows the closing line.
        let call_end = if trimmed.ends_with('{') {
            let indent = line.len() - trimmed.len();
            index
                + lines[index + 1..]
                    .iter()
                    .position(|l| l.len() - l.trim_start().len() == indent && l.trim_start().starts_with("}("))
                    .map(|offset| offset + 1)
                    .expect("unterminated inline call")
        } else {
            index
        };
        assert_eq!(lines[call_end + 1].trim(), "if err != nil {", "after: {}", line);
        assert!(lines[call_end + 2].trim().starts_with("return "));
        assert!(lines[call_end + 2].trim().ends_with("err"));
        assert_eq!(lines[call_end + 3].trim(), "}");
        checked += 1;
    }
    assert!(checked >= 6, "only {} fallible calls found", checked);
}

#[test]
fn test_open_decisions_always_get_a_fallback_arm() {
    let labels = ["1", "2", "3"];
    for count in 1..=labels.len() {
        let spec = flow(
            "Dispatch",
            vec![FlowNode::Decision(DecisionSpec {
                discriminant: step("kind").with_output(TypeRef::new("int")),
                branches: labels[..count]
                    .iter()
                    .map(|label| Branch::new(*label, vec![]))
                    .collect(),
                default: None,
                coverage: Coverage::Open,
            })],
            fallible(),
        );
        let compiled = compile(unit_of(vec![spec]));
        let code = compiled.code().unwrap().text();
        let block = switch_block(code);
        assert_eq!(block.iter().filter(|l| l.trim() == "default:").count(), 1);
        assert!(compiled.diagram("Dispatch").unwrap().text().contains("else unhandled\n"));
    }
}

#[test]
fn test_open_decision_in_flow_without_error_channel_is_rejected() {
    let spec = flow(
        "Dispatch",
        vec![FlowNode::Decision(DecisionSpec {
            discriminant: step("kind").with_output(TypeRef::new("int")),
            branches: vec![Branch::new("1", vec![])],
            default: None,
            coverage: Coverage::Open,
        })],
        FlowResult::default(),
    );
    let compiled = compile(unit_of(vec![spec]));
    assert!(matches!(
        &compiled.rejected[0].error,
        GraphError::MissingErrorChannel { origin, .. } if origin == "kind"
    ));
}

#[test]
fn test_diagram_messages_follow_code_call_order() {
    for spec in fixtures() {
        let name = spec.name.clone();
        let graph = GraphBuilder::build(spec.clone()).expect("Failed to build");
        let order = step_order(&graph);

        let compiled = compile(unit_of(vec![spec]));
        let code = compiled.code().unwrap().text();
        let diagram = compiled.diagram(&name).unwrap().text();

        let messages: Vec<String> = diagram
            .lines()
            .filter_map(|line| line.split_once(" -> "))
            .filter_map(|(_, rest)| rest.split_once(": "))
            .map(|(_, step)| step.to_string())
            .collect();
        assert_eq!(messages, order, "diagram of {}", name);

        // Injected calls appear in the code in the same relative order.
        let injected: Vec<String> = graph
            .steps()
            .filter(|(_, s)| !s.spec.is_inline())
            .map(|(_, s)| s.spec.name.clone())
            .collect();
        let calls: Vec<String> = code
            .lines()
            .filter_map(|line| line.split_once("service."))
            .filter_map(|(_, rest)| rest.split_once('('))
            .map(|(method, _)| method.to_string())
            .collect();
        let expected: Vec<String> = order
            .iter()
            .filter(|step| injected.contains(step))
            .map(|step| naming::exported(step))
            .collect();
        assert_eq!(calls, expected, "code of {}", name);
    }
}

#[test]
fn test_identical_signatures_are_declared_once_across_flows() {
    let compiled = compile(shared_service_unit());
    let code = compiled.code().unwrap().text();

    assert_eq!(code.matches("type LoadService interface").count(), 1);
    assert!(code.contains("type ImportService interface {\n\tLoadService\n\tParseService\n}"));
    assert!(code.contains("type ExportService interface {\n\tLoadService\n\tWriteService\n}"));
    // Each implementation still forwards its own step.
    assert!(code.contains("func (c *ImportImpl) Load() error"));
    assert!(code.contains("func (c *ExportImpl) Load() error"));
}

#[test]
fn test_same_method_with_different_shape_gets_its_own_interface() {
    let compiled = compile(unit_of(vec![
        flow("A", vec![FlowNode::Step(step("load").fallible())], fallible()),
        flow(
            "B",
            vec![FlowNode::Step(
                step("load").with_output(TypeRef::new("int")).fallible(),
            )],
            fallible(),
        ),
    ]));
    let code = compiled.code().unwrap().text();
    assert!(code.contains("type LoadService interface {\n\tLoad() error\n}"));
    assert!(code.contains("type LoadService2 interface {\n\tLoad() (int, error)\n}"));
}
