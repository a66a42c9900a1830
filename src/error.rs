use std::path::PathBuf;
use thiserror::Error;

/// Structural problems found while turning a `FlowSpec` into a `FlowGraph`.
///
/// Every variant names the offending flow so the caller can report it without
/// extra bookkeeping. A `GraphError` rejects that flow only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Flow '{flow}' has no steps")]
    EmptyFlow { flow: String },

    #[error("Flow '{flow}': decision on '{decision}' declares no branches")]
    NoBranches { flow: String, decision: String },

    #[error("Flow '{flow}': decision on '{decision}' declares branch label '{label}' more than once")]
    DuplicateBranchLabel {
        flow: String,
        decision: String,
        label: String,
    },

    #[error("Flow '{flow}': strict decision on '{decision}' has no default branch")]
    MissingDefaultBranch { flow: String, decision: String },

    #[error("Flow '{flow}': step '{step}' is used as a decision discriminant but produces no value")]
    DiscriminantWithoutOutput { flow: String, step: String },

    #[error(
        "Flow '{flow}': step '{step}' is declared twice with conflicting signatures: '{first}' and '{second}'"
    )]
    ConflictingStepSignature {
        flow: String,
        step: String,
        first: String,
        second: String,
    },

    #[error("Flow '{flow}': steps '{first}' and '{second}' both become the Go method '{method}'")]
    ConflictingMethodName {
        flow: String,
        first: String,
        second: String,
        method: String,
    },

    #[error("Flow '{flow}': '{name}' is not a valid identifier")]
    InvalidIdentifier { flow: String, name: String },

    #[error("Flow '{flow}': no value of type '{ty}' is available as input to step '{step}'")]
    UnresolvedInput {
        flow: String,
        step: String,
        ty: String,
    },

    #[error("Flow '{flow}': no value of result type '{ty}' is available where the flow returns")]
    UnresolvedResult { flow: String, ty: String },

    #[error("Flow '{flow}' can fail at '{origin}' but its result type has no error channel")]
    MissingErrorChannel { flow: String, origin: String },

    #[error("Flow '{flow}': step '{step}' can never be reached")]
    UnreachableStep { flow: String, step: String },
}

impl GraphError {
    /// The name of the flow this error rejects.
    pub fn flow(&self) -> &str {
        match self {
            GraphError::EmptyFlow { flow }
            | GraphError::NoBranches { flow, .. }
            | GraphError::DuplicateBranchLabel { flow, .. }
            | GraphError::MissingDefaultBranch { flow, .. }
            | GraphError::DiscriminantWithoutOutput { flow, .. }
            | GraphError::ConflictingStepSignature { flow, .. }
            | GraphError::ConflictingMethodName { flow, .. }
            | GraphError::InvalidIdentifier { flow, .. }
            | GraphError::UnresolvedInput { flow, .. }
            | GraphError::UnresolvedResult { flow, .. }
            | GraphError::MissingErrorChannel { flow, .. }
            | GraphError::UnreachableStep { flow, .. } => flow,
        }
    }
}

/// Errors raised while assembling or persisting the artifacts of a compilation unit.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Found conflicting directories '{}' and '{}'", first.display(), second.display())]
    ConflictingOutput { first: PathBuf, second: PathBuf },

    #[error("No flow sources to derive an output directory from")]
    NoSources,

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The pretty-printer rejected a generated buffer. Recovered by writing the raw buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Formatting failed: {0}")]
pub struct FormatError(pub String);

/// Errors that can occur when converting a front-end description into a `CompilationUnit`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid flow description: {0}")]
    ValidationError(String),
}

/// Errors raised while saving or loading an `ArtifactBundle`.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Serialization failed: {0}")]
    Encode(String),

    #[error("Deserialization failed: {0}")]
    Decode(String),

    #[error("I/O on '{}' failed: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
