use crate::graph::FlowGraph;
use crate::resolver::Bindings;

/// A pure projection of a `FlowGraph` into one kind of output.
///
/// Backends never see each other's output; they only share the graph and its bindings.
pub trait Backend: Send + Sync {
    type Output: Send;

    fn emit(&self, graph: &FlowGraph, bindings: &Bindings) -> Self::Output;
}

/// A line-oriented text buffer owned by a single emission call.
///
/// Each backend call creates its own buffer, so flows can be emitted in parallel
/// without sharing any output state.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    buf: String,
    depth: usize,
    unit: &'static str,
}

impl SourceBuffer {
    pub fn new(unit: &'static str) -> Self {
        Self {
            buf: String::new(),
            depth: 0,
            unit,
        }
    }

    /// Tab-indented, the way gofmt lays out Go.
    pub fn tabs() -> Self {
        Self::new("\t")
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(self.unit);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    /// Writes every line of a multi-line block at the current depth.
    pub fn block(&mut self, text: &str) {
        for line in text.trim_matches('\n').lines() {
            self.line(line.trim_end());
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Hands out the accumulated text and leaves the buffer empty for reuse.
    pub fn take(&mut self) -> String {
        self.depth = 0;
        std::mem::take(&mut self.buf)
    }
}
