//! AST module for pooplang
//!
//! A program is a flat sequence of [`Node`]s; sequences are the only
//! grouping construct, so function bodies, macro bodies, and argument
//! lists are all `Vec<Node>`. Nodes are never mutated in place: every
//! rewrite builds new nodes.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod render;

pub use render::{decode_literal, output_string, source_string, trace_string};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// The five syntax node variants.
///
/// # Examples
///
/// ```rust
/// use pooplang::ast::Node;
/// let id = Node::func("x", vec![Node::token("x")]);
/// assert_eq!(id.to_string(), "poop x poops x qooq");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// A bare name, resolved against the macro table at reduction time.
    Token(String),
    /// Raw `Po...op` text, escapes already resolved. Never rewritten.
    Literal(String),
    /// A one-parameter abstraction with a multi-node body.
    Func { param: String, body: Vec<Node> },
    /// A named, unparameterized alias for a node sequence.
    MacroDef { name: String, body: Vec<Node> },
    /// A callee applied to one positional argument sequence.
    Apply { callee: Box<Node>, args: Vec<Node> },
}

/// What the four-character literal `Poop` decodes to.
///
/// Language revisions disagree here, so the choice is a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmptyLiteral {
    /// `Poop` decodes to the empty string.
    #[default]
    Empty,
    /// `Poop` decodes to a single space.
    Space,
}

// ============================================================================
// CONSTRUCTORS AND ACCESSORS
// ============================================================================

impl Node {
    pub fn token(name: impl Into<String>) -> Self {
        Node::Token(name.into())
    }

    pub fn literal(raw: impl Into<String>) -> Self {
        Node::Literal(raw.into())
    }

    pub fn func(param: impl Into<String>, body: Vec<Node>) -> Self {
        Node::Func {
            param: param.into(),
            body,
        }
    }

    pub fn macro_def(name: impl Into<String>, body: Vec<Node>) -> Self {
        Node::MacroDef {
            name: name.into(),
            body,
        }
    }

    pub fn apply(callee: Node, args: Vec<Node>) -> Self {
        Node::Apply {
            callee: Box::new(callee),
            args,
        }
    }

    /// The name of this node if it is a bare token.
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Node::Token(name) => Some(name),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Token(_) => "token",
            Node::Literal(_) => "literal",
            Node::Func { .. } => "func",
            Node::MacroDef { .. } => "macro definition",
            Node::Apply { .. } => "application",
        }
    }
}

impl fmt::Display for Node {
    /// Source form, as accepted back by the parser.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&source_string(std::slice::from_ref(self)))
    }
}
