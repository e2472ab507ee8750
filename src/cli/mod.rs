//! The pooplang Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::Path;
use std::process;

use clap::Parser;

use crate::{
    ast::trace_string,
    cli::args::{Command, EngineFlags, PoopArgs},
    cli::output::{print_ast, print_step, print_warning, StdinInput, StdoutSink},
    engine::{print_error, ExecutionPipeline},
    errors::PoopError,
    runtime::{InputSource, RunStatus, SharedOutput, StepOutcome},
};

pub mod args;
pub mod output;

/// Exit code when the step limit stops a run before normal form.
pub const EXIT_STEP_LIMIT: i32 = 2;

/// The main entry point for the CLI.
pub fn run() {
    let args = PoopArgs::parse();

    let result = match args.command {
        Command::Run { file, engine } => handle_run(&file, &engine),
        Command::Trace { file, engine } => handle_trace(&file, &engine),
        Command::Ast { file, json } => handle_ast(&file, json),
        Command::Tokens { file } => handle_tokens(&file),
        Command::Format { file } => handle_format(&file),
    };

    match result {
        Ok(RunStatus::StepLimitReached) => process::exit(EXIT_STEP_LIMIT),
        Ok(_) => {}
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_run(file: &Path, flags: &EngineFlags) -> Result<RunStatus, PoopError> {
    let source = ExecutionPipeline::read_file(file)?;
    let pipeline = ExecutionPipeline::new(flags.to_config());
    let summary = pipeline.execute(
        &source,
        &file.display().to_string(),
        SharedOutput::new(StdoutSink),
        &mut StdinInput,
    )?;
    Ok(summary.status)
}

/// Steps by hand so every intermediate sequence can be shown.
fn handle_trace(file: &Path, flags: &EngineFlags) -> Result<RunStatus, PoopError> {
    let source = ExecutionPipeline::read_file(file)?;
    let pipeline = ExecutionPipeline::new(flags.to_config());
    let mut engine = pipeline.prepare(
        &source,
        &file.display().to_string(),
        SharedOutput::new(StdoutSink),
    )?;
    let mut input = StdinInput;

    let mut previous = trace_string(engine.program());
    print_step(0, "", &previous)?;
    loop {
        if let Some(limit) = engine.config().max_steps {
            if engine.steps() >= limit {
                print_warning(&format!("step limit of {limit} reached before normal form"));
                return Ok(RunStatus::StepLimitReached);
            }
        }
        match engine.step()? {
            StepOutcome::Changed => {
                let current = trace_string(engine.program());
                print_step(engine.steps(), &previous, &current)?;
                previous = current;
            }
            StepOutcome::Converged => return Ok(RunStatus::Converged),
            StepOutcome::AwaitingInput => {
                let line = input
                    .read_line()?
                    .ok_or_else(|| PoopError::io("input closed while the program awaits `Input`"))?;
                engine.provide_input(line)?;
            }
        }
    }
}

fn handle_ast(file: &Path, json: bool) -> Result<RunStatus, PoopError> {
    let source = ExecutionPipeline::read_file(file)?;
    let nodes = ExecutionPipeline::parse_source(&source, &file.display().to_string())?;
    print_ast(&nodes, json)?;
    Ok(RunStatus::Converged)
}

fn handle_tokens(file: &Path) -> Result<RunStatus, PoopError> {
    let source = ExecutionPipeline::read_file(file)?;
    for token in ExecutionPipeline::tokens_source(&source) {
        println!("{token}");
    }
    Ok(RunStatus::Converged)
}

fn handle_format(file: &Path) -> Result<RunStatus, PoopError> {
    let source = ExecutionPipeline::read_file(file)?;
    println!(
        "{}",
        ExecutionPipeline::format_source(&source, &file.display().to_string())?
    );
    Ok(RunStatus::Converged)
}
