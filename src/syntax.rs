//! Syntax module for pooplang
//!
//! Source text is lexed into whitespace-delimited tokens and parsed by a
//! small recursive-descent parser into a flat sequence of [`Node`]s.
//!
//! [`Node`]: crate::ast::Node

use serde::{Deserialize, Serialize};

pub mod lexer;
pub mod parser;

pub use lexer::{is_literal_token, is_variable_name, tokenize, Token};
pub use parser::{parse_program, parse_source};

/// Represents a byte span in the source code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Language keywords. None of them is ever a literal.
pub const KW_POOP: &str = "poop";
pub const KW_POOPING: &str = "pooping";
pub const KW_QOOQ: &str = "qooq";
pub const KW_POOPS: &str = "poops";
pub const KW_POOPY: &str = "poopy";
pub const KW_IS: &str = "is";

pub const RESERVED_WORDS: [&str; 6] = [KW_POOP, KW_POOPING, KW_QOOQ, KW_POOPS, KW_POOPY, KW_IS];

/// Built-in names resolved by the reduction engine.
pub const BUILTIN_INPUT: &str = "Input";
pub const BUILTIN_PRINT: &str = "Print";
