use crate::backend::Backend;
use crate::codegen::{CodeFragments, GoBackend};
use crate::diagram::PlantUmlBackend;
use crate::error::{GraphError, OutputError};
use crate::graph::{FlowGraph, GraphBuilder};
use crate::model::{ArtifactBundle, ArtifactKind, CompilationUnit, GeneratedArtifact};
use crate::output::{ArtifactWriter, OutputCoordinator, SourceFormatter, detect_output_dir};
use crate::resolver;
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(feature = "debug-tools")]
use std::fs;

mod builder;
mod options;

pub use builder::CompilerBuilder;
pub use options::{DEFAULT_BUILD_TAG, DEFAULT_CODE_FILE, GeneratorOptions};

/// A flow that failed structural validation. The rest of its unit is still generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRejection {
    pub flow: String,
    pub error: GraphError,
}

impl fmt::Display for FlowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Everything one compilation produced, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub package: String,
    /// The package directory all artifacts are relative to.
    pub dir: PathBuf,
    /// The code file first (when any flow survived), then one diagram per flow in name order.
    pub artifacts: Vec<GeneratedArtifact>,
    pub rejected: Vec<FlowRejection>,
}

impl CompiledUnit {
    pub fn code(&self) -> Option<&GeneratedArtifact> {
        self.artifacts
            .iter()
            .find(|a| a.kind() == ArtifactKind::Code)
    }

    pub fn diagram(&self, flow: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| {
            a.kind() == ArtifactKind::Diagram
                && a.path().file_stem().and_then(|s| s.to_str()) == Some(flow)
        })
    }

    /// Whether every flow of the unit made it into the artifacts.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Hands every artifact to `writer`, stopping at the first failure.
    pub fn write(&self, writer: &dyn ArtifactWriter) -> Result<(), OutputError> {
        for artifact in &self.artifacts {
            writer.write(artifact)?;
        }
        Ok(())
    }

    pub fn into_bundle(self) -> ArtifactBundle {
        ArtifactBundle::new(self.package, self.artifacts)
    }
}

/// Runs the whole pipeline for one compilation unit: build, resolve, emit, assemble.
pub struct Compiler {
    unit: CompilationUnit,
    options: GeneratorOptions,
    formatter: Box<dyn SourceFormatter>,
    writer: Arc<dyn ArtifactWriter>,
}

impl Compiler {
    pub fn builder(unit: CompilationUnit) -> CompilerBuilder {
        CompilerBuilder::new(unit)
    }

    /// Produces every artifact of the unit without touching the filesystem.
    ///
    /// Fails only when the flows do not share one output directory (or there are
    /// none). Flows that fail validation are reported in [`CompiledUnit::rejected`].
    pub fn compile(self) -> Result<CompiledUnit, OutputError> {
        let dir = detect_output_dir(self.unit.flows.values().map(|f| f.source.as_path()))?;
        let package = self.unit.package;

        // BTreeMap order, so graphs and every later stage run in flow-name order.
        let built: Vec<Result<FlowGraph, GraphError>> = self
            .unit
            .flows
            .into_values()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(GraphBuilder::build)
            .collect();

        let mut graphs = Vec::with_capacity(built.len());
        let mut rejected = Vec::new();
        for result in built {
            match result {
                Ok(graph) => graphs.push(graph),
                Err(error) => {
                    log::warn!("Skipping flow: {}", error);
                    rejected.push(FlowRejection {
                        flow: error.flow().to_string(),
                        error,
                    });
                }
            }
        }

        for graph in &graphs {
            log::debug!("{}", graph);
            #[cfg(feature = "debug-tools")]
            write_debug_file(
                &format!("tmp/flow_{}_graph.txt", graph.name()),
                &graph.to_string(),
            );
        }

        let bindings = resolver::resolve(&graphs);
        for binding in bindings.services() {
            log::debug!(
                "{} serves {} step(s) as {}",
                binding.interface,
                binding.steps.len(),
                binding.signature
            );
        }

        let go = GoBackend::new(self.options.initializer);
        let plantuml = PlantUmlBackend::new(self.options.diagram_dir.clone());
        let emitted: Vec<(CodeFragments, GeneratedArtifact)> = graphs
            .par_iter()
            .map(|graph| (go.emit(graph, &bindings), plantuml.emit(graph, &bindings)))
            .collect();
        let (fragments, diagrams): (Vec<_>, Vec<_>) = emitted.into_iter().unzip();

        let mut artifacts = Vec::with_capacity(diagrams.len() + 1);
        if !fragments.is_empty() {
            let coordinator = OutputCoordinator::new(
                &package,
                &self.options.build_tag,
                self.formatter.as_ref(),
            );
            artifacts.push(coordinator.assemble(dir.join(&self.options.code_file), &fragments));
        }
        artifacts.extend(diagrams);

        for graph in &graphs {
            log::info!(
                "Compiled flow '{}' ({} nodes)",
                graph.name(),
                graph.len()
            );
        }

        Ok(CompiledUnit {
            package,
            dir,
            artifacts,
            rejected,
        })
    }

    /// Compiles and then writes every artifact through the configured writer.
    pub fn run(self) -> Result<CompiledUnit, OutputError> {
        let writer = Arc::clone(&self.writer);
        let compiled = self.compile()?;
        compiled.write(writer.as_ref())?;
        log::info!(
            "Wrote {} artifact(s) for package '{}' to {}",
            compiled.artifacts.len(),
            compiled.package,
            compiled.dir.display()
        );
        Ok(compiled)
    }
}

#[cfg(feature = "debug-tools")]
fn write_debug_file(path: &str, content: &str) {
    let result = std::path::Path::new(path)
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| fs::write(path, content));
    if let Err(e) = result {
        log::warn!("Could not write debug file '{}': {}", path, e);
    }
}
