//! The reduction engine.
//!
//! One [`Engine`] owns one run: the program sequence, a fresh macro table,
//! and the output sink. [`Engine::step`] performs at most one leftmost-outermost
//! rewrite; the drivers call it until it reports no change.
//!
//! ## Priority at the head of a sequence
//!
//! 1. `Input` token: splice in the parsed input line (or suspend for it).
//! 2. `MacroDef`: register the name, drop the node.
//! 3. Known macro token: splice in its body. Other tokens: reduce the tail.
//! 4. `Apply`: reduce the callee first, then dispatch on its shape
//!    (`Func`, `Print`, anything else).
//! 5. `Func`: expand the leftmost macro token in its body, else reduce the tail.
//! 6. `Literal`: reduce the tail.
//!
//! ## Input suspension
//!
//! Reaching `Input` without a pending line leaves the sequence untouched and
//! reports [`StepOutcome::AwaitingInput`]. Nothing else is rewritten in that
//! step, and stepping is deterministic, so after [`Engine::provide_input`]
//! the next step reaches the same `Input` token and consumes the line.

use crate::ast::{output_string, source_string, trace_string, Node};
use crate::engine::{EngineConfig, Strategy};
use crate::errors::{PoopError, SourceContext};
use crate::runtime::registry::MacroTable;
use crate::runtime::substitute::{contains_print_application, expand_leftmost_macro, substitute};
use crate::runtime::{InputSource, SharedOutput};
use crate::syntax::{parse_source, BUILTIN_INPUT, BUILTIN_PRINT};

/// Source name used for diagnostics in parsed `Input` lines.
pub const INPUT_SOURCE_NAME: &str = "<input>";

/// What one call to [`Engine::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One rewrite happened.
    Changed,
    /// The sequence is in normal form.
    Converged,
    /// `Input` was reached and no line is pending.
    AwaitingInput,
}

/// Why a driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Converged,
    StepLimitReached,
    AwaitingInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Rewrites performed since the engine was created.
    pub steps: usize,
    pub status: RunStatus,
}

impl RunSummary {
    pub fn converged(&self) -> bool {
        self.status == RunStatus::Converged
    }
}

/// Internal result of reducing one sequence.
enum Reduction {
    Changed(Vec<Node>),
    Unchanged,
    AwaitingInput,
}

pub struct Engine {
    program: Vec<Node>,
    macros: MacroTable,
    config: EngineConfig,
    output: SharedOutput,
    pending_input: Option<String>,
    awaiting_input: bool,
    steps: usize,
}

impl Engine {
    pub fn new(program: Vec<Node>, config: EngineConfig, output: SharedOutput) -> Self {
        Self {
            program,
            macros: MacroTable::new(),
            config,
            output,
            pending_input: None,
            awaiting_input: false,
            steps: 0,
        }
    }

    pub fn program(&self) -> &[Node] {
        &self.program
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.awaiting_input
    }

    /// Hands the engine the line requested by the last `AwaitingInput` step.
    pub fn provide_input(&mut self, line: impl Into<String>) -> Result<(), PoopError> {
        if !self.awaiting_input {
            return Err(PoopError::InputRejected);
        }
        self.awaiting_input = false;
        self.pending_input = Some(line.into());
        Ok(())
    }

    // ========================================================================
    // DRIVERS
    // ========================================================================

    /// Performs at most one rewrite.
    pub fn step(&mut self) -> Result<StepOutcome, PoopError> {
        if self.awaiting_input {
            return Ok(StepOutcome::AwaitingInput);
        }
        if self.config.trace {
            let line = format!("[step {}] {}", self.steps + 1, trace_string(&self.program));
            self.output.log(&line);
        }

        let program = std::mem::take(&mut self.program);
        let reduction = self.reduce_sequence(&program);
        match reduction {
            Ok(Reduction::Changed(next)) => {
                self.program = next;
                self.steps += 1;
                Ok(StepOutcome::Changed)
            }
            Ok(Reduction::Unchanged) => {
                self.program = program;
                Ok(StepOutcome::Converged)
            }
            Ok(Reduction::AwaitingInput) => {
                self.program = program;
                self.awaiting_input = true;
                Ok(StepOutcome::AwaitingInput)
            }
            Err(error) => {
                self.program = program;
                Err(error)
            }
        }
    }

    /// Steps until normal form, the step limit, or a request for input.
    ///
    /// Hosts with their own event loop resume after `AwaitingInput` by
    /// calling [`Engine::provide_input`] and then `run` again.
    pub fn run(&mut self) -> Result<RunSummary, PoopError> {
        loop {
            if self.step_limit_reached() {
                return Ok(self.summary(RunStatus::StepLimitReached));
            }
            match self.step()? {
                StepOutcome::Changed => continue,
                StepOutcome::Converged => return Ok(self.summary(RunStatus::Converged)),
                StepOutcome::AwaitingInput => return Ok(self.summary(RunStatus::AwaitingInput)),
            }
        }
    }

    /// Steps until normal form or the step limit, reading `Input` lines from
    /// `input` as they are requested.
    pub fn run_with<I: InputSource + ?Sized>(
        &mut self,
        input: &mut I,
    ) -> Result<RunSummary, PoopError> {
        loop {
            let summary = self.run()?;
            if summary.status != RunStatus::AwaitingInput {
                return Ok(summary);
            }
            let line = input
                .read_line()?
                .ok_or_else(|| PoopError::io("input closed while the program awaits `Input`"))?;
            self.provide_input(line)?;
        }
    }

    fn step_limit_reached(&self) -> bool {
        match self.config.max_steps {
            Some(limit) if self.steps >= limit => {
                self.output.log(&format!(
                    "warning: step limit of {limit} reached before normal form"
                ));
                true
            }
            _ => false,
        }
    }

    fn summary(&self, status: RunStatus) -> RunSummary {
        RunSummary {
            steps: self.steps,
            status,
        }
    }

    fn debug(&self, message: impl FnOnce() -> String) {
        if self.config.debug {
            self.output.log(&message());
        }
    }

    // ========================================================================
    // REDUCTION
    // ========================================================================

    /// Scans left to right for the first node that can be rewritten.
    fn reduce_sequence(&mut self, nodes: &[Node]) -> Result<Reduction, PoopError> {
        for index in 0..nodes.len() {
            match self.reduce_head(&nodes[index], &nodes[index + 1..])? {
                Reduction::Unchanged => continue,
                Reduction::Changed(rest) => {
                    let mut next = nodes[..index].to_vec();
                    next.extend(rest);
                    return Ok(Reduction::Changed(next));
                }
                Reduction::AwaitingInput => return Ok(Reduction::AwaitingInput),
            }
        }
        Ok(Reduction::Unchanged)
    }

    /// Rewrites `head` (possibly consuming `tail`), or reports it stuck.
    fn reduce_head(&mut self, head: &Node, tail: &[Node]) -> Result<Reduction, PoopError> {
        match head {
            Node::Token(name) if name == BUILTIN_INPUT => self.reduce_input(tail),
            Node::MacroDef { name, body } => {
                self.macros.define(name, body.clone())?;
                self.debug(|| format!("define macro {name}"));
                Ok(Reduction::Changed(tail.to_vec()))
            }
            Node::Token(name) => match self.macros.get(name) {
                Some(body) => {
                    let spliced = splice(body.to_vec(), tail);
                    self.debug(|| format!("expand macro {name}"));
                    Ok(Reduction::Changed(spliced))
                }
                None => Ok(Reduction::Unchanged),
            },
            Node::Apply { callee, args } => self.reduce_application(callee, args, tail),
            Node::Func { param, body } => match expand_leftmost_macro(body, &self.macros) {
                Some(expanded) => {
                    self.debug(|| format!("expand macro in body of `poop {param}`"));
                    Ok(Reduction::Changed(prepend(Node::func(param.clone(), expanded), tail)))
                }
                None => Ok(Reduction::Unchanged),
            },
            Node::Literal(_) => Ok(Reduction::Unchanged),
        }
    }

    fn reduce_input(&mut self, tail: &[Node]) -> Result<Reduction, PoopError> {
        let Some(line) = self.pending_input.take() else {
            return Ok(Reduction::AwaitingInput);
        };
        self.debug(|| format!("input {line:?}"));
        let nodes = parse_source(&line, SourceContext::from_file(INPUT_SOURCE_NAME, line.as_str()))?;
        Ok(Reduction::Changed(splice(nodes, tail)))
    }

    fn reduce_application(
        &mut self,
        callee: &Node,
        args: &[Node],
        tail: &[Node],
    ) -> Result<Reduction, PoopError> {
        // A definition would vanish from the callee slot; reject it before it
        // reaches the macro table.
        if let Node::MacroDef { .. } = callee {
            return Err(PoopError::CalleeNotSingleNode {
                callee: source_string(std::slice::from_ref(callee)),
                count: 0,
            });
        }
        match self.reduce_sequence(std::slice::from_ref(callee))? {
            Reduction::Changed(mut reduced) => {
                if reduced.len() != 1 {
                    return Err(PoopError::CalleeNotSingleNode {
                        callee: source_string(std::slice::from_ref(callee)),
                        count: reduced.len(),
                    });
                }
                let rebuilt = Node::apply(reduced.remove(0), args.to_vec());
                return Ok(Reduction::Changed(prepend(rebuilt, tail)));
            }
            Reduction::AwaitingInput => return Ok(Reduction::AwaitingInput),
            Reduction::Unchanged => {}
        }

        match callee {
            Node::Func { param, body } => self.apply_function(param, body, args, tail),
            Node::Token(name) if name == BUILTIN_PRINT => self.apply_print(callee, args, tail),
            _ => self.reduce_arguments(callee, args, tail),
        }
    }

    /// `body` has no macro left to expand here: reducing the callee expanded
    /// them one step at a time before the application could fire.
    fn apply_function(
        &mut self,
        param: &str,
        body: &[Node],
        args: &[Node],
        tail: &[Node],
    ) -> Result<Reduction, PoopError> {
        if self.config.strategy == Strategy::Lazy {
            return Ok(self.beta_reduce(param, body, args, tail));
        }

        if contains_print_application(body) {
            return Ok(self.beta_reduce(param, body, args, tail));
        }
        match self.reduce_sequence(args)? {
            Reduction::Changed(reduced) => {
                let rebuilt = Node::apply(Node::func(param, body.to_vec()), reduced);
                Ok(Reduction::Changed(prepend(rebuilt, tail)))
            }
            Reduction::AwaitingInput => Ok(Reduction::AwaitingInput),
            Reduction::Unchanged => Ok(self.beta_reduce(param, body, args, tail)),
        }
    }

    fn beta_reduce(&self, param: &str, body: &[Node], args: &[Node], tail: &[Node]) -> Reduction {
        self.debug(|| format!("beta-reduce {param} := {}", trace_string(args)));
        Reduction::Changed(splice(substitute(param, args, body), tail))
    }

    fn apply_print(
        &mut self,
        callee: &Node,
        args: &[Node],
        tail: &[Node],
    ) -> Result<Reduction, PoopError> {
        if !args.iter().all(|arg| self.is_printable(arg)) {
            return self.reduce_arguments(callee, args, tail);
        }
        let text = output_string(args, self.config.empty_literal);
        self.debug(|| format!("print {text:?}"));
        self.output.write(&text)?;
        Ok(Reduction::Changed(splice(args.to_vec(), tail)))
    }

    /// Reduces the argument list of an application whose callee cannot fire.
    fn reduce_arguments(
        &mut self,
        callee: &Node,
        args: &[Node],
        tail: &[Node],
    ) -> Result<Reduction, PoopError> {
        match self.reduce_sequence(args)? {
            Reduction::Changed(reduced) => {
                let rebuilt = Node::apply(callee.clone(), reduced);
                Ok(Reduction::Changed(prepend(rebuilt, tail)))
            }
            Reduction::AwaitingInput => Ok(Reduction::AwaitingInput),
            Reduction::Unchanged => Ok(Reduction::Unchanged),
        }
    }

    /// Literals and irreducible free names.
    fn is_printable(&self, node: &Node) -> bool {
        match node {
            Node::Literal(_) => true,
            Node::Token(name) => name != BUILTIN_INPUT && !self.macros.contains(name),
            _ => false,
        }
    }
}

fn splice(mut nodes: Vec<Node>, tail: &[Node]) -> Vec<Node> {
    nodes.extend_from_slice(tail);
    nodes
}

fn prepend(head: Node, tail: &[Node]) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(tail.len() + 1);
    nodes.push(head);
    nodes.extend_from_slice(tail);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::OutputBuffer;

    fn engine_for(program: Vec<Node>) -> (Engine, OutputBuffer) {
        let buffer = OutputBuffer::new();
        let engine = Engine::new(program, EngineConfig::default(), buffer.shared());
        (engine, buffer)
    }

    #[test]
    fn long_flat_sequences_do_not_recurse_per_sibling() {
        let mut program = vec![Node::literal("PoAop"); 200_000];
        program.push(Node::apply(Node::token("Print"), vec![Node::literal("PoEndop")]));
        let (mut engine, out) = engine_for(program);
        assert_eq!(engine.step().unwrap(), StepOutcome::Changed);
        assert_eq!(out.output(), "End");
        assert_eq!(engine.program().len(), 200_001);
    }

    struct ClosedSink;

    impl crate::runtime::OutputSink for ClosedSink {
        fn write(&mut self, _text: &str) -> Result<(), PoopError> {
            Err(PoopError::io("broken pipe"))
        }
    }

    #[test]
    fn failed_print_write_stops_the_run() {
        let program = vec![Node::apply(Node::token("Print"), vec![Node::literal("PoHiop")])];
        let mut engine = Engine::new(program.clone(), EngineConfig::default(), SharedOutput::new(ClosedSink));
        assert!(matches!(engine.run(), Err(PoopError::Io { .. })));
        assert_eq!(engine.program(), program.as_slice());
        assert_eq!(engine.steps(), 0);
    }

    #[test]
    fn failed_step_leaves_program_intact() {
        let program = vec![
            Node::macro_def("Two", vec![Node::token("a"), Node::token("b")]),
            Node::apply(Node::token("Two"), vec![]),
        ];
        let (mut engine, _) = engine_for(program);
        assert_eq!(engine.step().unwrap(), StepOutcome::Changed);
        let before = engine.program().to_vec();
        assert!(engine.step().is_err());
        assert_eq!(engine.program(), before.as_slice());
        assert_eq!(engine.steps(), 1);
    }
}
