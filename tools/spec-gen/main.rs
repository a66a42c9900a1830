use clap::Parser;
use flowgen::model::json::{RawCase, RawDecision, RawFlow, RawNode, RawResult, RawStep, RawType, RawUnit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;

/// Generates random flow descriptions for exercising the flowgen compiler
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_flows.json")]
    output: String,

    /// Number of flows to generate
    #[arg(long, default_value_t = 4)]
    flows: usize,

    /// Maximum number of top-level steps per flow
    #[arg(long, default_value_t = 6)]
    max_steps: usize,

    /// Seed for reproducible output
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory the flows pretend to be declared in
    #[arg(long, default_value = "app")]
    dir: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.max_steps == 0 {
        eprintln!("Error: --max-steps must be at least 1");
        std::process::exit(1);
    }

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let flows = (0..cli.flows)
        .map(|index| generate_flow(&mut rng, index, cli.max_steps, &cli.dir))
        .collect();
    let unit = RawUnit {
        package: "main".to_string(),
        flows,
    };

    let json_output = serde_json::to_string_pretty(&unit)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} flow(s) and saved them to '{}'",
        cli.flows, cli.output
    );
    Ok(())
}

fn generate_flow(rng: &mut StdRng, index: usize, max_steps: usize, dir: &str) -> RawFlow {
    let count = rng.random_range(1..=max_steps);
    let mut steps = Vec::with_capacity(count);
    // Steps draw from a shared pool of names so flows end up sharing services.
    let mut previous: Option<String> = None;
    for position in 0..count {
        if position > 0 && rng.random_bool(0.25) {
            steps.push(generate_decision(rng, index, position));
            continue;
        }
        let (step, produced) = generate_step(rng, previous.as_deref());
        previous = produced;
        steps.push(RawNode::Step(step));
    }

    RawFlow {
        name: format!("Flow{}", index),
        source: format!("{}/flows.go", dir),
        input: None,
        steps,
        result: RawResult::default(),
    }
}

/// A step named after the types it moves, so equal names always mean equal signatures.
fn generate_step(rng: &mut StdRng, available: Option<&str>) -> (RawStep, Option<String>) {
    let input = available.filter(|_| rng.random_bool(0.7));
    let output = rng
        .random_bool(0.6)
        .then(|| format!("t{}", rng.random_range(0..5)));
    let name = format!(
        "step{}To{}",
        input.map(|t| t.to_uppercase()).unwrap_or_else(|| "Nil".to_string()),
        output
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "Nil".to_string())
    );
    let step = RawStep {
        name,
        function: None,
        input: input.map(|t| RawType::Plain(t.to_string())),
        output: output.clone().map(RawType::Plain),
        fallible: true,
        inline: None,
    };
    (step, output.or_else(|| available.map(str::to_string)))
}

fn generate_decision(rng: &mut StdRng, flow: usize, position: usize) -> RawNode {
    let branch = |rng: &mut StdRng, label: &str| RawCase {
        label: label.to_string(),
        steps: (0..rng.random_range(0..=2))
            .map(|_| RawNode::Step(generate_step(rng, None).0))
            .collect(),
    };
    RawNode::Decision(RawDecision {
        on: RawStep {
            name: format!("check{}x{}", flow, position),
            function: None,
            input: None,
            output: Some(RawType::Plain("bool".to_string())),
            fallible: false,
            inline: None,
        },
        cases: vec![branch(rng, "true"), branch(rng, "false")],
        default: None,
        coverage: None,
    })
}
