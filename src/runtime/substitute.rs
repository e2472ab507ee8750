//! Structural rewriting helpers: parameter substitution, single-occurrence
//! macro expansion, and the `Print`-containment query used by the legacy strategy.
//!
//! Substitution is not hygienic. The only binder respected is a nested
//! `Func` with the same parameter name, which shadows the outer one; free
//! names inside the argument may be captured by other binders in the body.

use crate::ast::{source_string, Node};
use crate::runtime::registry::MacroTable;
use crate::syntax::BUILTIN_PRINT;

/// Replaces every free `Token(param)` in `body` with a copy of `args`,
/// spliced in place.
pub fn substitute(param: &str, args: &[Node], body: &[Node]) -> Vec<Node> {
    let mut out = Vec::with_capacity(body.len());
    for node in body {
        match node {
            Node::Token(name) if name == param => out.extend(args.iter().cloned()),
            Node::Token(_) | Node::Literal(_) => out.push(node.clone()),
            Node::Func { param: inner, .. } if inner == param => out.push(node.clone()),
            Node::Func { param: inner, body } => {
                out.push(Node::func(inner.clone(), substitute(param, args, body)));
            }
            Node::MacroDef { name, body } => {
                out.push(Node::macro_def(name.clone(), substitute(param, args, body)));
            }
            Node::Apply { callee, args: call_args } => {
                out.push(Node::apply(
                    substitute_callee(param, args, callee),
                    substitute(param, args, call_args),
                ));
            }
        }
    }
    out
}

/// Replaces the leftmost known macro token in `body` with a copy of its
/// definition, looking inside `Func` bodies and applications.
///
/// One call is one rewrite. Returns `None` when no token names a macro.
/// Literals and nested `MacroDef` bodies are left alone.
pub fn expand_leftmost_macro(body: &[Node], macros: &MacroTable) -> Option<Vec<Node>> {
    for (index, node) in body.iter().enumerate() {
        let replacement = match node {
            Node::Token(name) => macros.get(name).map(<[Node]>::to_vec),
            Node::Func { param, body } => expand_leftmost_macro(body, macros)
                .map(|expanded| vec![Node::func(param.clone(), expanded)]),
            Node::Apply { callee, args } => {
                expand_in_application(callee, args, macros).map(|apply| vec![apply])
            }
            Node::Literal(_) | Node::MacroDef { .. } => None,
        };
        if let Some(replacement) = replacement {
            let mut out = Vec::with_capacity(body.len() + replacement.len());
            out.extend_from_slice(&body[..index]);
            out.extend(replacement);
            out.extend_from_slice(&body[index + 1..]);
            return Some(out);
        }
    }
    None
}

/// True if `body` holds an application of `Print` at any depth.
pub fn contains_print_application(body: &[Node]) -> bool {
    body.iter().any(|node| match node {
        Node::Apply { callee, args } => {
            callee.as_token() == Some(BUILTIN_PRINT)
                || contains_print_application(std::slice::from_ref(&**callee))
                || contains_print_application(args)
        }
        Node::Func { body, .. } | Node::MacroDef { body, .. } => contains_print_application(body),
        Node::Token(_) | Node::Literal(_) => false,
    })
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

/// The callee slot holds exactly one node. A parameter standing there takes
/// a single-node argument as is; a longer argument collapses into one token
/// named after its source form, the same rule the parser applies to a
/// multi-node callee. An empty argument would leave the slot empty, so the
/// parameter token stays in place.
fn substitute_callee(param: &str, args: &[Node], callee: &Node) -> Node {
    let mut replaced = substitute(param, args, std::slice::from_ref(callee));
    match replaced.len() {
        0 => callee.clone(),
        1 => replaced.remove(0),
        _ => Node::token(source_string(&replaced)),
    }
}

fn expand_in_application(callee: &Node, args: &[Node], macros: &MacroTable) -> Option<Node> {
    if let Some(expanded) = expand_callee(callee, macros) {
        return Some(Node::apply(expanded, args.to_vec()));
    }
    expand_leftmost_macro(args, macros).map(|expanded| Node::apply(callee.clone(), expanded))
}

/// A macro callee is only expanded in place when its body is a single node;
/// otherwise it is left for the engine, which reports the arity error when
/// the application is reached.
fn expand_callee(callee: &Node, macros: &MacroTable) -> Option<Node> {
    match callee {
        Node::Token(name) => match macros.get(name) {
            Some([single]) => Some(single.clone()),
            _ => None,
        },
        _ => {
            let mut expanded = expand_leftmost_macro(std::slice::from_ref(callee), macros)?;
            (expanded.len() == 1).then(|| expanded.remove(0))
        }
    }
}
