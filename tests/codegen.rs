//! Tests for the generated Go unit file.
mod common;
use common::*;
use flowgen::prelude::*;

#[test]
fn test_scenario_a_wires_step_and_returns_early() {
    let compiled = compile(unit_of(vec![scenario_a()]));
    let code = compiled.code().expect("No code artifact").text();

    assert!(code.contains("func NewCImpl() *CImpl {\n\treturn &CImpl{\n\t\tstep1FieldFunc: step1(),\n\t}\n}"));
    assert!(code.contains("type Step1Service interface {\n\tStep1() error\n}"));
    assert!(code.contains("type CService interface {\n\tStep1Service\n}"));
    assert!(code.contains("type CImpl struct {\n\tstep1FieldFunc func() error\n}"));
    assert!(code.contains("type CFunc func() (*gentleman.Response, error)"));
    assert!(code.contains("func (c *CImpl) Step1() error {\n\treturn c.step1FieldFunc()\n}"));

    let body = "\t\terr := service.Step1()\n\
                \t\tif err != nil {\n\
                \t\t\treturn nil, err\n\
                \t\t}\n\
                \t\tresponsePtrVal, err := func() (*gentleman.Response, error) {\n\
                \t\t\tcli := gentleman.New()\n";
    assert!(code.contains(body), "unexpected flow body:\n{}", code);
    assert!(code.contains("\t\t}()\n\t\tif err != nil {\n\t\t\treturn nil, err\n\t\t}\n\t\treturn responsePtrVal, nil\n"));
}

#[test]
fn test_scenario_a_file_layout() {
    let compiled = compile(unit_of(vec![scenario_a()]));
    let code = compiled.code().unwrap();
    assert_eq!(code.path(), std::path::Path::new("app/flowgen_gen.go"));

    let text = code.text();
    assert!(text.starts_with(
        "// Code generated by flowgen. DO NOT EDIT.\n\
         \n\
         //go:build !flowgeninject\n\
         // +build !flowgeninject\n\
         \n\
         package main\n\
         \n\
         import \"gopkg.in/h2non/gentleman.v2\"\n"
    ));

    let position = |needle: &str| text.find(needle).unwrap_or_else(|| panic!("missing {}", needle));
    let constructor = position("func C(service CService) CFunc {");
    let initializer = position("func NewCImpl()");
    let types = position("type Step1Service interface");
    let methods = position("func (c *CImpl) Step1()");
    assert!(constructor < initializer && initializer < types && types < methods);
}

#[test]
fn test_scenario_b_passes_value_between_steps() {
    let compiled = compile(unit_of(vec![scenario_b()]));
    let code = compiled.code().unwrap().text();

    let body = "\t\taVal, err := service.Step1()\n\
                \t\tif err != nil {\n\
                \t\t\treturn err\n\
                \t\t}\n\
                \t\terr = service.Step2(aVal)\n\
                \t\tif err != nil {\n\
                \t\t\treturn err\n\
                \t\t}\n\
                \t\treturn nil\n";
    assert!(code.contains(body), "unexpected flow body:\n{}", code);
    assert!(code.contains("func (c *BImpl) Step2(input a) error {\n\treturn c.step2FieldFunc(input)\n}"));
    assert!(code.contains("step1FieldFunc func() (a, error)"));
    assert!(!code.contains("switch"));
}

#[test]
fn test_scenario_c_has_two_arms_and_no_error_return() {
    let compiled = compile(unit_of(vec![scenario_c()]));
    let code = compiled.code().unwrap().text();

    let block = switch_block(code);
    assert_eq!(
        block,
        vec![
            "\t\tswitch boolVal {",
            "\t\tcase true:",
            "\t\t\tservice.Ship(aVal)",
            "\t\tcase false:",
            "\t\t\tservice.Discard()",
            "\t\t}",
        ]
    );
    assert!(block.iter().all(|line| !line.contains("return")));
    assert!(!code.contains("\"fmt\""));
    assert!(code.contains("\t\tboolVal := service.Check(aVal)\n"));
}

#[test]
fn test_open_decision_falls_back_to_an_error() {
    let compiled = compile(unit_of(vec![open_decision()]));
    let code = compiled.code().unwrap().text();

    assert!(code.contains("import \"fmt\""));
    let block = switch_block(code);
    assert_eq!(block.first(), Some(&"\t\tswitch intVal {"));
    assert!(block.contains(&"\t\tdefault:"));
    assert!(block.contains(&"\t\t\treturn fmt.Errorf(\"Route: unhandled branch %v of pick\", intVal)"));
    // The arm with an explicit return ends the flow right there.
    assert!(block.contains(&"\t\tcase 2:"));
    assert!(block.contains(&"\t\t\treturn nil"));
    assert!(code.contains("\t\terr = service.Finish()\n"));
}

#[test]
fn test_exhaustive_and_defaulted_decisions_have_no_fallback() {
    let decision = |coverage, default| {
        FlowNode::Decision(DecisionSpec {
            discriminant: step("kind").with_output(TypeRef::new("string")),
            branches: vec![Branch::new("\"a\"", vec![FlowNode::Step(step("onA"))])],
            default,
            coverage,
        })
    };
    let exhaustive = flow("X", vec![decision(Coverage::Exhaustive, None)], FlowResult::default());
    let defaulted = flow(
        "Y",
        vec![decision(
            Coverage::Strict,
            Some(vec![FlowNode::Step(step("other"))]),
        )],
        FlowResult::default(),
    );

    let compiled = compile(unit_of(vec![exhaustive, defaulted]));
    assert!(compiled.is_complete());
    let code = compiled.code().unwrap().text();
    assert!(!code.contains("fmt.Errorf"));
    assert!(code.contains("\t\tcase \"a\":\n\t\t\tservice.OnA()\n\t\tdefault:\n\t\t\tservice.Other()\n"));
}

#[test]
fn test_flow_input_feeds_first_consumer() {
    let mut spec = flow(
        "Greet",
        vec![FlowNode::Step(
            step("render")
                .with_input(TypeRef::new("string"))
                .with_output(TypeRef::new("[]byte")),
        )],
        FlowResult {
            output: Some(TypeRef::new("[]byte")),
            fallible: false,
        },
    );
    spec.input = Some(TypeRef::new("string"));

    let compiled = compile(unit_of(vec![spec]));
    let code = compiled.code().unwrap().text();
    assert!(code.contains("\treturn func(stringVal string) []byte {\n"));
    assert!(code.contains("\t\tbyteSliceVal := service.Render(stringVal)\n\t\treturn byteSliceVal\n"));
    assert!(code.contains("type GreetFunc func(string) []byte"));
}

#[test]
fn test_injected_initializer_style() {
    let compiled = Compiler::builder(unit_of(vec![scenario_b()]))
        .with_initializer_style(InitializerStyle::Injected)
        .build()
        .compile()
        .expect("Failed to compile");
    let code = compiled.code().unwrap().text();
    assert!(code.contains(
        "func NewBImpl(step1 func() (a, error), step2 func(a) error) *BImpl {\n\
         \treturn &BImpl{\n\
         \t\tstep1FieldFunc: step1,\n\
         \t\tstep2FieldFunc: step2,\n\
         \t}\n\
         }"
    ));
}

#[test]
fn test_custom_function_reference_is_wired() {
    let compiled = compile(unit_of(vec![flow(
        "Load",
        vec![FlowNode::Step(step("fetch").with_function("newFetcher").fallible())],
        fallible(),
    )]));
    let code = compiled.code().unwrap().text();
    assert!(code.contains("fetchFieldFunc: newFetcher(),"));
}

#[test]
fn test_every_branch_returning_ends_with_unreachable_panic() {
    let compiled = compile(unit_of(vec![flow(
        "Gate",
        vec![FlowNode::Decision(DecisionSpec {
            discriminant: step("open").with_output(TypeRef::new("bool")),
            branches: vec![
                Branch::new("true", vec![FlowNode::Step(step("pass")), FlowNode::Return]),
                Branch::new("false", vec![FlowNode::Return]),
            ],
            default: None,
            coverage: Coverage::Open,
        })],
        FlowResult::default(),
    )]));
    let code = compiled.code().unwrap().text();
    assert!(code.contains("\t\t}\n\t\tpanic(\"unreachable\")\n\t}\n}"));
}

#[test]
fn test_types_differing_only_in_case_keep_separate_variables() {
    let compiled = compile(unit_of(vec![flow(
        "Pair",
        vec![
            FlowNode::Step(step("mkLower").with_output(TypeRef::new("a"))),
            FlowNode::Step(step("mkUpper").with_output(TypeRef::new("A"))),
            FlowNode::Step(step("useLower").with_input(TypeRef::new("a"))),
            FlowNode::Step(step("useUpper").with_input(TypeRef::new("A"))),
        ],
        FlowResult::default(),
    )]));
    let code = compiled.code().unwrap().text();
    assert!(code.contains(
        "\t\taVal := service.MkLower()\n\
         \t\taVal2 := service.MkUpper()\n\
         \t\tservice.UseLower(aVal)\n\
         \t\tservice.UseUpper(aVal2)\n\
         \t\treturn\n"
    ));
}

#[test]
fn test_forwarding_methods_are_separated_by_blank_lines() {
    let compiled = compile(unit_of(vec![scenario_b()]));
    let code = compiled.code().unwrap().text();
    assert!(code.contains(
        "func (c *BImpl) Step1() (a, error) {\n\
         \treturn c.step1FieldFunc()\n\
         }\n\
         \n\
         func (c *BImpl) Step2(input a) error {\n\
         \treturn c.step2FieldFunc(input)\n\
         }\n"
    ));
}
