//! Pooplang Error Handling
//!
//! Every failure the interpreter can report is a variant of [`PoopError`].
//! Parse errors carry the named source and the byte span of the offending
//! token so that `miette` can render a labeled snippet; runtime errors carry
//! the offending name and a help line.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Named source text that parse errors point into.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real file content
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> SourceArc {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

/// Converts a byte span into the span type miette expects.
pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from((span.start, span.end.saturating_sub(span.start)))
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// The unified error type for lexing, parsing, and reduction.
#[derive(Debug, Error, Diagnostic)]
pub enum PoopError {
    #[error("Parse error: expected {expected}, found '{found}'")]
    #[diagnostic(code(pooplang::parse::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: String,
        #[source_code]
        src: SourceArc,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("Parse error: missing {element}")]
    #[diagnostic(
        code(pooplang::parse::missing),
        help("every `poop` and `pooping` form must be closed with `qooq`")
    )]
    MissingElement {
        element: String,
        #[source_code]
        src: SourceArc,
        #[label("input ends here")]
        span: SourceSpan,
    },

    #[error("Parse error: illegal macro name '{name}'")]
    #[diagnostic(
        code(pooplang::parse::illegal_macro_name),
        help("macro names must not consist only of lowercase letters and underscores")
    )]
    IllegalMacroName {
        name: String,
        #[source_code]
        src: SourceArc,
        #[label("defined here")]
        span: SourceSpan,
    },

    #[error("Parse error: illegal parameter name '{name}'")]
    #[diagnostic(
        code(pooplang::parse::illegal_parameter_name),
        help("parameter names may only contain lowercase letters and underscores")
    )]
    IllegalParameterName {
        name: String,
        #[source_code]
        src: SourceArc,
        #[label("bound here")]
        span: SourceSpan,
    },

    #[error("Parse error: application has no callee")]
    #[diagnostic(code(pooplang::parse::empty_callee))]
    EmptyCallee {
        #[source_code]
        src: SourceArc,
        #[label("expected a callee before `poopy`")]
        span: SourceSpan,
    },

    #[error("Parse error: unexpected trailing tokens: {tokens}")]
    #[diagnostic(code(pooplang::parse::trailing_tokens))]
    TrailingTokens {
        tokens: String,
        #[source_code]
        src: SourceArc,
        #[label("not part of any form")]
        span: SourceSpan,
    },

    #[error("Parse error: forms nested deeper than {limit} levels")]
    #[diagnostic(
        code(pooplang::parse::nesting_too_deep),
        help("split deeply nested forms into named macros")
    )]
    NestingTooDeep {
        limit: usize,
        #[source_code]
        src: SourceArc,
        #[label("this form is too deep")]
        span: SourceSpan,
    },

    #[error("Runtime error: macro redefinition '{name}'")]
    #[diagnostic(
        code(pooplang::runtime::macro_redefinition),
        help("a macro name can be defined only once per run")
    )]
    MacroRedefinition { name: String },

    #[error("Runtime error: callee '{callee}' must reduce to a single node, got {count}")]
    #[diagnostic(
        code(pooplang::runtime::callee_not_single_node),
        help("a macro used as callee must reduce to a single node")
    )]
    CalleeNotSingleNode { callee: String, count: usize },

    #[error("Input rejected: the engine is not awaiting input")]
    #[diagnostic(code(pooplang::host::input_rejected))]
    InputRejected,

    #[error("I/O error: {message}")]
    #[diagnostic(code(pooplang::host::io))]
    Io { message: String },
}

/// Coarse classification used by hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Runtime,
    Host,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Parse => "Parse",
            ErrorCategory::Runtime => "Runtime",
            ErrorCategory::Host => "Host",
        };
        f.write_str(name)
    }
}

impl PoopError {
    /// Get the error category for test assertions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedToken { .. }
            | Self::MissingElement { .. }
            | Self::IllegalMacroName { .. }
            | Self::IllegalParameterName { .. }
            | Self::EmptyCallee { .. }
            | Self::TrailingTokens { .. }
            | Self::NestingTooDeep { .. } => ErrorCategory::Parse,

            Self::MacroRedefinition { .. } | Self::CalleeNotSingleNode { .. } => {
                ErrorCategory::Runtime
            }

            Self::InputRejected | Self::Io { .. } => ErrorCategory::Host,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PoopError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}
