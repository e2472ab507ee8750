//! Handles all user-facing output for the CLI.
//!
//! `Print` output goes to stdout unchanged; log lines and step diffs are
//! colorized with `termcolor` when the terminal supports it.

use std::io::{self, BufRead, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::Node;
use crate::errors::PoopError;
use crate::runtime::{InputSource, OutputSink};

// ============================================================================
// HOST ADAPTERS: stdout sink and stdin input
// ============================================================================

/// StdoutSink: writes `Print` output to stdout and log lines to stderr.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&mut self, text: &str) -> Result<(), PoopError> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    fn log(&mut self, text: &str) {
        let mut stderr = StandardStream::stderr(ColorChoice::Auto);
        let color = if text.starts_with("warning:") {
            Color::Yellow
        } else {
            Color::Cyan
        };
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_dimmed(true));
        let _ = writeln!(stderr, "{text}");
        let _ = stderr.reset();
    }
}

/// Reads `Input` lines from stdin, without their line terminator.
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self) -> Result<Option<String>, PoopError> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints one step of a trace as a word-level diff against the previous form.
pub fn print_step(step: usize, previous: &str, current: &str) -> Result<(), PoopError> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    writeln!(stdout, "--- Step {step} ---")?;
    stdout.reset()?;

    if step == 0 {
        writeln!(stdout, "{current}")?;
        return Ok(());
    }
    let changeset = Changeset::new(previous, current, " ");
    print_diff(&mut stdout, &changeset.diffs)
}

/// Prints a parsed program, as debug structures or JSON.
pub fn print_ast(nodes: &[Node], json: bool) -> Result<(), PoopError> {
    if json {
        let rendered =
            serde_json::to_string_pretty(nodes).map_err(|e| PoopError::io(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }
    if nodes.is_empty() {
        println!("(empty)");
        return Ok(());
    }
    for (node_index, node) in nodes.iter().enumerate() {
        if nodes.len() > 1 {
            println!("\nNode {} ({}):", node_index + 1, node.type_name());
        }
        println!("{node:#?}");
    }
    Ok(())
}

/// Prints a one-line warning to stderr.
pub fn print_warning(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    let _ = write!(stderr, "warning:");
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {message}");
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) -> Result<(), PoopError> {
    for (index, diff) in diffs.iter().enumerate() {
        if index > 0 {
            write!(stdout, " ")?;
        }
        let (color, text) = match diff {
            Difference::Same(x) => (None, x),
            Difference::Add(x) => (Some(Color::Green), x),
            Difference::Rem(x) => (Some(Color::Red), x),
        };
        match color {
            Some(color) => stdout.set_color(ColorSpec::new().set_fg(Some(color)))?,
            None => stdout.reset()?,
        }
        write!(stdout, "{text}")?;
    }
    stdout.reset()?;
    writeln!(stdout)?;
    Ok(())
}
