use crate::error::FormatError;
use std::io::Write;
use std::process::{Command, Stdio};

/// Pretty-prints a generated Go buffer. Allowed to fail; callers fall back to the raw text.
pub trait SourceFormatter: Send + Sync {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Leaves the buffer untouched. The generator already emits gofmt-style layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl SourceFormatter for Passthrough {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        Ok(source.to_string())
    }
}

/// Pipes the buffer through an external `gofmt` binary.
#[derive(Debug, Clone)]
pub struct GofmtFormatter {
    program: String,
}

impl Default for GofmtFormatter {
    fn default() -> Self {
        Self::new("gofmt")
    }
}

impl GofmtFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SourceFormatter for GofmtFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FormatError(format!("could not start '{}': {}", self.program, e)))?;

        // Dropping stdin after the write closes the pipe so gofmt sees EOF.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| FormatError(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| FormatError(e.to_string()))?;
        if !output.status.success() {
            return Err(FormatError(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        String::from_utf8(output.stdout).map_err(|e| FormatError(e.to_string()))
    }
}
