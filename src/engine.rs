use std::path::Path;

use miette::Report;
use serde::{Deserialize, Serialize};

use crate::{
    ast::{source_string, EmptyLiteral, Node},
    errors::{PoopError, SourceContext},
    runtime::{Engine, InputSource, RunSummary, SharedOutput},
    syntax::{lexer, parser},
};

/// Default safety valve for runaway programs.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

// ============================================================================
// ENGINE CONFIGURATION
// ============================================================================

/// How an application of a `Func` treats its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Substitute the argument unevaluated (call-by-name).
    #[default]
    Lazy,
    /// Expand macros in the body, then reduce the argument to a fixed point
    /// before substituting, unless the body prints.
    Legacy,
}

/// Options recognized by the reduction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub strategy: Strategy,
    /// Log one line per rewrite.
    pub debug: bool,
    /// Log the whole sequence before each step.
    pub trace: bool,
    /// `None` runs until normal form, however long that takes.
    pub max_steps: Option<usize>,
    pub empty_literal: EmptyLiteral,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Lazy,
            debug: false,
            trace: false,
            max_steps: Some(DEFAULT_MAX_STEPS),
            empty_literal: EmptyLiteral::Empty,
        }
    }
}

impl EngineConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_empty_literal(mut self, empty_literal: EmptyLiteral) -> Self {
        self.empty_literal = empty_literal;
        self
    }
}

// ============================================================================
// EXECUTION PIPELINE
// ============================================================================

/// Parse → reduce, with a fresh engine (and macro table) per run.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPipeline {
    pub config: EngineConfig,
}

impl ExecutionPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Parses source code with pure parsing logic (no I/O)
    pub fn parse_source(source: &str, filename: &str) -> Result<Vec<Node>, PoopError> {
        parser::parse_source(source, SourceContext::from_file(filename, source))
    }

    /// Source form of a parsed program, one top-level node per line.
    pub fn format_source(source: &str, filename: &str) -> Result<String, PoopError> {
        let nodes = Self::parse_source(source, filename)?;
        Ok(nodes
            .iter()
            .map(|node| source_string(std::slice::from_ref(node)))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Lexer output in trace-escaped form, one token per line.
    pub fn tokens_source(source: &str) -> Vec<String> {
        lexer::tokenize(source)
            .iter()
            .map(|token| lexer::escape_token_text(&token.text))
            .collect()
    }

    /// Builds an engine for `source` without running it.
    pub fn prepare(
        &self,
        source: &str,
        filename: &str,
        output: SharedOutput,
    ) -> Result<Engine, PoopError> {
        let program = Self::parse_source(source, filename)?;
        Ok(Engine::new(program, self.config.clone(), output))
    }

    /// Parses and runs `source` to normal form (or the step limit).
    pub fn execute<I: InputSource + ?Sized>(
        &self,
        source: &str,
        filename: &str,
        output: SharedOutput,
        input: &mut I,
    ) -> Result<RunSummary, PoopError> {
        let mut engine = self.prepare(source, filename, output)?;
        engine.run_with(input)
    }

    /// Reads a file with standardized error handling
    pub fn read_file(path: &Path) -> Result<String, PoopError> {
        std::fs::read_to_string(path)
            .map_err(|error| PoopError::io(format!("{} ({})", path.display(), error)))
    }
}

/// Prints a PoopError with full miette diagnostics
pub fn print_error(error: PoopError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{OutputBuffer, ScriptedInput};

    #[test]
    fn defaults_are_lazy_and_bounded() {
        let config = EngineConfig::default();
        assert_eq!(config.strategy, Strategy::Lazy);
        assert_eq!(config.max_steps, Some(DEFAULT_MAX_STEPS));
        assert!(!config.debug && !config.trace);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = EngineConfig::default()
            .with_strategy(Strategy::Legacy)
            .with_empty_literal(EmptyLiteral::Space)
            .with_max_steps(None);
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn pipeline_runs_each_source_with_fresh_macros() {
        let pipeline = ExecutionPipeline::default();
        let source = "poop Hi is PoHiop qooq pooping Print poopy Hi qooq";
        for _ in 0..2 {
            let buffer = OutputBuffer::new();
            let summary = pipeline
                .execute(source, "test", buffer.shared(), &mut ScriptedInput::default())
                .unwrap();
            assert!(summary.converged());
            assert_eq!(buffer.output(), "Hi");
        }
    }

    #[test]
    fn format_puts_top_level_nodes_on_lines() {
        let formatted =
            ExecutionPipeline::format_source("a   poop x poops x qooq\n\nPoBop", "test").unwrap();
        assert_eq!(formatted, "a\npoop x poops x qooq\nPoBop");
    }
}
