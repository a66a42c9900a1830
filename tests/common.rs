//! Common test utilities for building flow descriptions and compiling them in memory.
use flowgen::prelude::*;

pub const GENTLEMAN: &str = "gopkg.in/h2non/gentleman.v2";

#[allow(dead_code)]
pub fn fallible() -> FlowResult {
    FlowResult {
        output: None,
        fallible: true,
    }
}

#[allow(dead_code)]
pub fn flow_in(dir: &str, name: &str, nodes: Vec<FlowNode>, result: FlowResult) -> FlowSpec {
    FlowSpec {
        name: name.to_string(),
        source: format!("{}/flows.go", dir).into(),
        input: None,
        nodes,
        result,
    }
}

#[allow(dead_code)]
pub fn flow(name: &str, nodes: Vec<FlowNode>, result: FlowResult) -> FlowSpec {
    flow_in("app", name, nodes, result)
}

#[allow(dead_code)]
pub fn step(name: &str) -> StepSpec {
    StepSpec::new(name)
}

#[allow(dead_code)]
pub fn unit_of(flows: Vec<FlowSpec>) -> CompilationUnit {
    flows
        .into_iter()
        .fold(CompilationUnit::new("main"), CompilationUnit::with_flow)
}

/// Compiles without touching the filesystem.
#[allow(dead_code)]
pub fn compile(unit: CompilationUnit) -> CompiledUnit {
    Compiler::builder(unit)
        .build()
        .compile()
        .expect("Failed to compile")
}

/// Flow `C`: a fallible `step1` followed by an inline HTTP call whose response is the result.
#[allow(dead_code)]
pub fn scenario_a() -> FlowSpec {
    let response = TypeRef::imported("*gentleman.Response", GENTLEMAN);
    flow(
        "C",
        vec![
            FlowNode::Step(step("step1").fallible()),
            FlowNode::Step(
                step("send")
                    .with_output(response.clone())
                    .fallible()
                    .inline(
                        "cli := gentleman.New()\n\
                         cli.URI(\"http://example.com\")\n\
                         req := cli.Request()\n\
                         req.Method(\"POST\")\n\
                         return req.Send()",
                        vec![],
                    ),
            ),
        ],
        FlowResult {
            output: Some(response),
            fallible: true,
        },
    )
}

/// Flow `B`: `step1() (a, error)` hands its value to `step2(a) error`.
#[allow(dead_code)]
pub fn scenario_b() -> FlowSpec {
    let a = TypeRef::new("a");
    flow(
        "B",
        vec![
            FlowNode::Step(step("step1").with_output(a.clone()).fallible()),
            FlowNode::Step(step("step2").with_input(a).fallible()),
        ],
        fallible(),
    )
}

/// Flow `D`: a boolean decision whose two arms cannot fail.
#[allow(dead_code)]
pub fn scenario_c() -> FlowSpec {
    let a = TypeRef::new("a");
    flow(
        "D",
        vec![
            FlowNode::Step(step("step1").with_output(a.clone()).fallible()),
            FlowNode::Decision(DecisionSpec {
                discriminant: step("check")
                    .with_input(a.clone())
                    .with_output(TypeRef::new("bool")),
                branches: vec![
                    Branch::new("true", vec![FlowNode::Step(step("ship").with_input(a))]),
                    Branch::new("false", vec![FlowNode::Step(step("discard"))]),
                ],
                default: None,
                coverage: Coverage::Open,
            }),
        ],
        fallible(),
    )
}

/// An open decision over an integer, so the generated fallback arm is required.
#[allow(dead_code)]
pub fn open_decision() -> FlowSpec {
    flow(
        "Route",
        vec![
            FlowNode::Decision(DecisionSpec {
                discriminant: step("pick").with_output(TypeRef::new("int")).fallible(),
                branches: vec![
                    Branch::new("1", vec![FlowNode::Step(step("one").fallible())]),
                    Branch::new("2", vec![FlowNode::Return]),
                ],
                default: None,
                coverage: Coverage::Open,
            }),
            FlowNode::Step(step("finish").fallible()),
        ],
        fallible(),
    )
}

/// Two flows sharing `load`, to exercise service deduplication.
#[allow(dead_code)]
pub fn shared_service_unit() -> CompilationUnit {
    unit_of(vec![
        flow(
            "Import",
            vec![
                FlowNode::Step(step("load").fallible()),
                FlowNode::Step(step("parse").fallible()),
            ],
            fallible(),
        ),
        flow(
            "Export",
            vec![
                FlowNode::Step(step("load").fallible()),
                FlowNode::Step(step("write").fallible()),
            ],
            fallible(),
        ),
    ])
}

/// Two flows declared in different directories.
#[allow(dead_code)]
pub fn conflicting_unit() -> CompilationUnit {
    unit_of(vec![
        flow_in("app", "A", vec![FlowNode::Step(step("a"))], FlowResult::default()),
        flow_in("other", "B", vec![FlowNode::Step(step("b"))], FlowResult::default()),
    ])
}

/// The lines between `switch` and its closing brace, inclusive.
#[allow(dead_code)]
pub fn switch_block(code: &str) -> Vec<&str> {
    let lines: Vec<&str> = code.lines().collect();
    let Some(start) = lines.iter().position(|l| l.trim_start().starts_with("switch ")) else {
        return Vec::new();
    };
    let indent = lines[start].len() - lines[start].trim_start().len();
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.len() - l.trim_start().len() == indent && l.trim() == "}")
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len() - 1);
    lines[start..=end].to_vec()
}
