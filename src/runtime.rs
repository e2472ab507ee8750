//! Runtime module for pooplang
//!
//! The reduction engine talks to its host through two narrow seams:
//! an [`OutputSink`] receiving `Print` output and diagnostic log lines, and
//! an [`InputSource`] supplying one line of text whenever `Input` is reduced.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::errors::PoopError;

pub mod eval;
pub mod registry;
pub mod substitute;

pub use eval::{Engine, RunStatus, RunSummary, StepOutcome};
pub use registry::MacroTable;

// ============================================================================
// HOST SEAMS
// ============================================================================

/// Output sink for `Print` and diagnostics, to make I/O testable and injectable.
pub trait OutputSink {
    /// Receives the fully decoded text of one completed `Print`. A failed
    /// write stops the run.
    fn write(&mut self, text: &str) -> Result<(), PoopError>;

    /// Receives one debug/trace line. Never affects evaluation.
    fn log(&mut self, _text: &str) {}
}

/// Supplies lines of text for the `Input` built-in.
pub trait InputSource {
    /// Returns the next line, or `None` once the source is exhausted.
    fn read_line(&mut self) -> Result<Option<String>, PoopError>;
}

/// Ergonomic wrapper for shared, mutable output sinks.
#[derive(Clone)]
pub struct SharedOutput(pub Rc<RefCell<dyn OutputSink>>);

impl SharedOutput {
    /// Create a new SharedOutput from any OutputSink.
    pub fn new<T: OutputSink + 'static>(sink: T) -> Self {
        SharedOutput(Rc::new(RefCell::new(sink)))
    }

    pub fn write(&self, text: &str) -> Result<(), PoopError> {
        self.0.borrow_mut().write(text)
    }

    pub fn log(&self, text: &str) {
        self.0.borrow_mut().log(text);
    }
}

// ============================================================================
// CAPTURING SINK AND SCRIPTED INPUT
// ============================================================================

#[derive(Debug, Default)]
struct Captured {
    output: String,
    writes: Vec<String>,
    log: Vec<String>,
}

/// Collects output for tests or programmatic capture.
///
/// Clones share the same buffer, so one clone can be handed to the engine
/// while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    inner: Rc<RefCell<Captured>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, concatenated.
    pub fn output(&self) -> String {
        self.inner.borrow().output.clone()
    }

    /// One entry per completed `Print`.
    pub fn writes(&self) -> Vec<String> {
        self.inner.borrow().writes.clone()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.inner.borrow().log.clone()
    }

    pub fn shared(&self) -> SharedOutput {
        SharedOutput::new(self.clone())
    }
}

impl OutputSink for OutputBuffer {
    fn write(&mut self, text: &str) -> Result<(), PoopError> {
        let mut captured = self.inner.borrow_mut();
        captured.output.push_str(text);
        captured.writes.push(text.to_string());
        Ok(())
    }

    fn log(&mut self, text: &str) {
        self.inner.borrow_mut().log.push(text.to_string());
    }
}

/// Pre-recorded input lines, handed out in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self) -> Result<Option<String>, PoopError> {
        Ok(self.lines.pop_front())
    }
}
