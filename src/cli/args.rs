//! Defines the command-line arguments and subcommands for the pooplang CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::ast::EmptyLiteral;
use crate::engine::{EngineConfig, Strategy};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "pooplang",
    version,
    about = "An interpreter for a tiny term-rewriting language."
)]
pub struct PoopArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse and reduce a program to normal form, printing its output.
    Run {
        /// The path to the program to run.
        #[arg(required = true)]
        file: PathBuf,
        #[command(flatten)]
        engine: EngineFlags,
    },
    /// Run a program, showing a colored diff of the sequence after every step.
    Trace {
        /// The path to the program to trace.
        #[arg(required = true)]
        file: PathBuf,
        #[command(flatten)]
        engine: EngineFlags,
    },
    /// Show the parsed node sequence.
    Ast {
        /// The path to the program to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Emit JSON instead of the debug representation.
        #[arg(long)]
        json: bool,
    },
    /// Show the lexer's tokens, one per line, with escapes re-applied.
    Tokens {
        /// The path to the program to lex.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Pretty-print and normalize a program.
    Format {
        /// The path to the program to format.
        #[arg(required = true)]
        file: PathBuf,
    },
}

/// Reduction options shared by `run` and `trace`.
#[derive(Debug, Clone, Default, Args)]
pub struct EngineFlags {
    /// Use the legacy strategy: reduce arguments before substituting.
    #[arg(long)]
    pub legacy: bool,
    /// Log every rewrite to stderr.
    #[arg(long)]
    pub debug: bool,
    /// Log the whole sequence to stderr before every step.
    #[arg(long)]
    pub trace: bool,
    /// Stop after this many rewrites.
    #[arg(long, value_name = "N", conflicts_with = "unbounded")]
    pub max_steps: Option<usize>,
    /// Never stop before normal form.
    #[arg(long)]
    pub unbounded: bool,
    /// Decode the literal `Poop` as a single space instead of nothing.
    #[arg(long)]
    pub poop_space: bool,
}

impl EngineFlags {
    pub fn to_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        let max_steps = if self.unbounded {
            None
        } else {
            self.max_steps.or(defaults.max_steps)
        };
        defaults
            .with_strategy(if self.legacy {
                Strategy::Legacy
            } else {
                Strategy::Lazy
            })
            .with_debug(self.debug)
            .with_trace(self.trace)
            .with_max_steps(max_steps)
            .with_empty_literal(if self.poop_space {
                EmptyLiteral::Space
            } else {
                EmptyLiteral::Empty
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_config() {
        let args = PoopArgs::parse_from([
            "pooplang",
            "run",
            "prog.poop",
            "--legacy",
            "--max-steps",
            "50",
            "--poop-space",
        ]);
        let Command::Run { engine, .. } = args.command else {
            panic!("expected run");
        };
        let config = engine.to_config();
        assert_eq!(config.strategy, Strategy::Legacy);
        assert_eq!(config.max_steps, Some(50));
        assert_eq!(config.empty_literal, EmptyLiteral::Space);
    }

    #[test]
    fn unbounded_clears_the_cap() {
        let flags = EngineFlags {
            unbounded: true,
            ..EngineFlags::default()
        };
        assert_eq!(flags.to_config().max_steps, None);
    }

    #[test]
    fn max_steps_conflicts_with_unbounded() {
        let result = PoopArgs::try_parse_from([
            "pooplang",
            "run",
            "prog.poop",
            "--max-steps",
            "5",
            "--unbounded",
        ]);
        assert!(result.is_err());
    }
}
