//! Runs every program under `tests/scripts/` and checks it against its
//! sibling expectation files.
//!
//! For `name.poop`:
//! - `name.input`, if present, supplies `Input` lines, one per line.
//! - `name.expected` is the outcome under the lazy strategy.
//! - `name.legacy.expected` is the outcome under the legacy strategy.
//!
//! An outcome is the printed output followed by any `warning:` log lines,
//! or the error message when the run fails.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use walkdir::WalkDir;

use pooplang::{run_source_with_output, EngineConfig, OutputBuffer, Strategy};

const SCRIPT_DIR: &str = "tests/scripts";
const SCRIPT_STEP_LIMIT: usize = 10_000;

struct ScriptCase {
    script: PathBuf,
    input: Vec<String>,
    expectations: Vec<(Strategy, PathBuf)>,
}

struct Mismatch {
    label: String,
    expected: String,
    actual: String,
}

fn discover_scripts(dir: &str) -> io::Result<Vec<ScriptCase>> {
    let mut cases = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |e| e != "poop") {
            continue;
        }

        let expectations: Vec<(Strategy, PathBuf)> = [
            (Strategy::Lazy, path.with_extension("expected")),
            (Strategy::Legacy, path.with_extension("legacy.expected")),
        ]
        .into_iter()
        .filter(|(_, expected)| expected.exists())
        .collect();

        let input_path = path.with_extension("input");
        let input = if input_path.exists() {
            normalized(&fs::read_to_string(&input_path)?)
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        cases.push(ScriptCase {
            script: path.to_path_buf(),
            input,
            expectations,
        });
    }
    Ok(cases)
}

fn normalized(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}

fn read_normalized(path: &Path) -> io::Result<String> {
    Ok(normalized(&fs::read_to_string(path)?))
}

/// Printed output, then warnings; or the error message.
fn run_case(source: &str, strategy: Strategy, input: &[String]) -> String {
    let config = EngineConfig::default()
        .with_strategy(strategy)
        .with_max_steps(Some(SCRIPT_STEP_LIMIT));
    let buffer = OutputBuffer::new();
    let input: Vec<&str> = input.iter().map(String::as_str).collect();

    match run_source_with_output(source, config, &buffer, &input) {
        Ok(_) => {
            let mut outcome = buffer.output();
            for warning in buffer
                .log_lines()
                .into_iter()
                .filter(|line| line.starts_with("warning:"))
            {
                outcome.push('\n');
                outcome.push_str(&warning);
            }
            normalized(&outcome)
        }
        Err(e) => normalized(&e.to_string()),
    }
}

fn report(
    stdout: &mut StandardStream,
    label: &str,
    mismatch: Option<&Mismatch>,
) -> io::Result<()> {
    match mismatch {
        None => {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            writeln!(stdout, "PASS: {label}")?;
        }
        Some(mismatch) => {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            writeln!(stdout, "FAIL: {}", mismatch.label)?;
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            writeln!(stdout, "  Expected: {:?}", mismatch.expected)?;
            writeln!(stdout, "  Actual:   {:?}", mismatch.actual)?;
        }
    }
    stdout.reset()
}

#[test]
fn integration_scripts() {
    let cases = discover_scripts(SCRIPT_DIR).expect("failed to scan tests/scripts");
    assert!(!cases.is_empty(), "no .poop scripts found in {SCRIPT_DIR}");

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut mismatches = Vec::new();

    for case in &cases {
        let name = case.script.display().to_string();
        assert!(
            !case.expectations.is_empty(),
            "{name} has neither a .expected nor a .legacy.expected file"
        );
        let source = read_normalized(&case.script).expect("failed to read script");

        for (strategy, expected_path) in &case.expectations {
            let label = format!("{name} [{strategy:?}]");
            let expected = read_normalized(expected_path).expect("failed to read expectation");
            let actual = run_case(&source, *strategy, &case.input);

            let mismatch = (actual != expected).then(|| Mismatch {
                label: label.clone(),
                expected,
                actual,
            });
            let _ = report(&mut stdout, &label, mismatch.as_ref());
            mismatches.extend(mismatch);
        }
    }

    if !mismatches.is_empty() {
        let labels: Vec<&str> = mismatches.iter().map(|m| m.label.as_str()).collect();
        panic!("{} script run(s) failed: {}", mismatches.len(), labels.join(", "));
    }
}
