//! Directory resolution and assembly of the unit file.

use crate::codegen::CodeFragments;
use crate::error::OutputError;
use crate::model::{ArtifactKind, GeneratedArtifact};
use itertools::Itertools;
use std::path::{Path, PathBuf};

mod format;
mod writer;

pub use format::{GofmtFormatter, Passthrough, SourceFormatter};
pub use writer::{ArtifactWriter, FsWriter, MemoryWriter};

pub const GENERATED_MARKER: &str = "// Code generated by flowgen. DO NOT EDIT.";

/// Resolves the one directory every source file lives in.
///
/// Paths that exist on disk are compared after canonicalization, so `./pkg` and `pkg`
/// are the same directory.
pub fn detect_output_dir<'a>(
    sources: impl IntoIterator<Item = &'a Path>,
) -> Result<PathBuf, OutputError> {
    let mut found: Option<(PathBuf, PathBuf)> = None;
    for source in sources {
        let dir = source.parent().map(Path::to_path_buf).unwrap_or_default();
        let key = std::fs::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        match &found {
            Some((first, first_key)) if *first_key != key => {
                return Err(OutputError::ConflictingOutput {
                    first: first.clone(),
                    second: dir,
                });
            }
            Some(_) => {}
            None => found = Some((dir, key)),
        }
    }
    found.map(|(dir, _)| dir).ok_or(OutputError::NoSources)
}

/// Merges per-flow fragments into the single code artifact of a package.
pub struct OutputCoordinator<'a> {
    package: &'a str,
    build_tag: &'a str,
    formatter: &'a dyn SourceFormatter,
}

impl<'a> OutputCoordinator<'a> {
    pub fn new(package: &'a str, build_tag: &'a str, formatter: &'a dyn SourceFormatter) -> Self {
        Self {
            package,
            build_tag,
            formatter,
        }
    }

    /// Lays out the file: marker, build constraint, package, imports, constructors,
    /// initializers, types, methods. Fragments are taken in the given order.
    pub fn assemble(&self, path: PathBuf, fragments: &[CodeFragments]) -> GeneratedArtifact {
        let raw = self.render(fragments);
        let text = match self.formatter.format(&raw) {
            Ok(formatted) => formatted,
            Err(e) => {
                log::warn!("{}; writing {} unformatted", e, path.display());
                raw
            }
        };
        GeneratedArtifact::new(path, text.into_bytes(), ArtifactKind::Code)
    }

    fn render(&self, fragments: &[CodeFragments]) -> String {
        let mut sections: Vec<String> = vec![
            GENERATED_MARKER.to_string(),
            format!(
                "//go:build !{tag}\n// +build !{tag}",
                tag = self.build_tag
            ),
            format!("package {}", self.package),
        ];

        let imports: Vec<&String> = fragments
            .iter()
            .flat_map(|f| f.imports.iter())
            .sorted()
            .dedup()
            .collect();
        match imports.as_slice() {
            [] => {}
            [single] => sections.push(format!("import \"{}\"", single)),
            many => sections.push(format!(
                "import (\n{}\n)",
                many.iter().map(|path| format!("\t\"{}\"", path)).join("\n")
            )),
        }

        let join = |parts: Vec<&str>| {
            parts
                .into_iter()
                .map(|p| p.trim_end())
                .filter(|p| !p.is_empty())
                .join("\n\n")
        };
        sections.push(join(fragments.iter().map(|f| f.constructor.as_str()).collect()));
        sections.push(join(fragments.iter().map(|f| f.initializer.as_str()).collect()));
        // The same binding interface is declared by every flow that uses it; keep the first.
        sections.push(join(
            fragments
                .iter()
                .flat_map(|f| f.types.iter().map(String::as_str))
                .unique()
                .collect(),
        ));
        sections.push(join(fragments.iter().map(|f| f.methods.as_str()).collect()));

        let mut out = sections.into_iter().filter(|s| !s.is_empty()).join("\n\n");
        out.push('\n');
        out
    }
}
