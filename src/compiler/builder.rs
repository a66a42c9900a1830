use super::{Compiler, GeneratorOptions};
use crate::codegen::InitializerStyle;
use crate::model::CompilationUnit;
use crate::output::{ArtifactWriter, FsWriter, Passthrough, SourceFormatter};
use std::sync::Arc;

/// Configures a [`Compiler`] for one compilation unit.
pub struct CompilerBuilder {
    unit: CompilationUnit,
    options: GeneratorOptions,
    formatter: Box<dyn SourceFormatter>,
    writer: Arc<dyn ArtifactWriter>,
}

impl CompilerBuilder {
    pub fn new(unit: CompilationUnit) -> Self {
        Self {
            unit,
            options: GeneratorOptions::default(),
            formatter: Box::new(Passthrough),
            writer: Arc::new(FsWriter),
        }
    }

    /// Replaces every output setting at once, e.g. with options read from a file.
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_code_file(mut self, file_name: impl Into<String>) -> Self {
        self.options.code_file = file_name.into();
        self
    }

    pub fn with_diagram_dir(mut self, dir: impl Into<String>) -> Self {
        self.options.diagram_dir = dir.into();
        self
    }

    pub fn with_build_tag(mut self, tag: impl Into<String>) -> Self {
        self.options.build_tag = tag.into();
        self
    }

    pub fn with_initializer_style(mut self, style: InitializerStyle) -> Self {
        self.options.initializer = style;
        self
    }

    pub fn with_formatter(mut self, formatter: Box<dyn SourceFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// The writer [`Compiler::run`] persists through. Defaults to the filesystem.
    pub fn with_writer(mut self, writer: Arc<dyn ArtifactWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            unit: self.unit,
            options: self.options,
            formatter: self.formatter,
            writer: self.writer,
        }
    }
}
