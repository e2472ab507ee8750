pub use crate::errors::{ErrorCategory, PoopError, SourceContext};

pub mod ast;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod runtime;
pub mod syntax;

pub use crate::ast::Node;
pub use crate::engine::{EngineConfig, ExecutionPipeline, Strategy};
pub use crate::runtime::{
    Engine, InputSource, OutputBuffer, OutputSink, RunStatus, RunSummary, ScriptedInput,
    SharedOutput, StepOutcome,
};
pub use crate::syntax::parse_program;

/// Runs `source` under `config`, collecting output into `output`.
///
/// A convenience wrapper over [`ExecutionPipeline::execute`] for hosts and
/// tests that feed `Input` from a fixed list of lines.
pub fn run_source_with_output(
    source: &str,
    config: EngineConfig,
    output: &OutputBuffer,
    input_lines: &[&str],
) -> Result<RunSummary, PoopError> {
    let mut input = ScriptedInput::new(input_lines.iter().copied());
    ExecutionPipeline::new(config).execute(source, "source", output.shared(), &mut input)
}
