use crate::codegen::InitializerStyle;
use crate::diagram::DEFAULT_DIAGRAM_DIR;
use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CODE_FILE: &str = "flowgen_gen.go";
pub const DEFAULT_BUILD_TAG: &str = "flowgeninject";

/// Everything about the generated output that can be configured.
///
/// Deserializable so the CLI can take it from a JSON file; every field is optional there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorOptions {
    /// File name of the generated Go file, placed in the package directory.
    pub code_file: String,
    /// Directory, relative to the package directory, that receives the diagrams.
    pub diagram_dir: String,
    /// Build tag that excludes the generated file from injector builds.
    pub build_tag: String,
    pub initializer: InitializerStyle,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            code_file: DEFAULT_CODE_FILE.to_string(),
            diagram_dir: DEFAULT_DIAGRAM_DIR.to_string(),
            build_tag: DEFAULT_BUILD_TAG.to_string(),
            initializer: InitializerStyle::default(),
        }
    }
}

impl GeneratorOptions {
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| ConversionError::JsonParseError(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ConversionError::JsonParseError(format!(
                "Could not read '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }
}
