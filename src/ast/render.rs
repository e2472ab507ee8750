//! The three stringification modes over node sequences.
//!
//! - **source**: reconstructs parseable syntax, literal text echoed verbatim.
//! - **output**: what `Print` writes; literals decoded, siblings concatenated.
//! - **trace**: like source, but escapes control characters and spaces so a
//!   logged sequence is unambiguous.

use crate::ast::{EmptyLiteral, Node};
use crate::syntax::lexer::escape_token_text;
use crate::syntax::{KW_IS, KW_POOP, KW_POOPING, KW_POOPS, KW_POOPY, KW_QOOQ};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Source,
    Output(EmptyLiteral),
    Trace,
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn source_string(nodes: &[Node]) -> String {
    render(nodes, Mode::Source)
}

pub fn output_string(nodes: &[Node], empty: EmptyLiteral) -> String {
    render(nodes, Mode::Output(empty))
}

pub fn trace_string(nodes: &[Node]) -> String {
    render(nodes, Mode::Trace)
}

/// Decodes literal raw text: the text strictly between `Po` and `op`.
pub fn decode_literal(raw: &str, empty: EmptyLiteral) -> String {
    if raw.len() == 4 {
        return match empty {
            EmptyLiteral::Empty => String::new(),
            EmptyLiteral::Space => " ".to_string(),
        };
    }
    raw.get(2..raw.len().saturating_sub(2))
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn render(nodes: &[Node], mode: Mode) -> String {
    let mut out = String::new();
    render_sequence(nodes, mode, &mut out);
    out
}

fn render_sequence(nodes: &[Node], mode: Mode, out: &mut String) {
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 && !matches!(mode, Mode::Output(_)) {
            out.push(' ');
        }
        render_node(node, mode, out);
    }
}

fn render_node(node: &Node, mode: Mode, out: &mut String) {
    match node {
        Node::Token(name) => out.push_str(&text(name, mode)),
        Node::Literal(raw) => match mode {
            Mode::Output(empty) => out.push_str(&decode_literal(raw, empty)),
            _ => out.push_str(&text(raw, mode)),
        },
        Node::Func { param, body } => {
            keyword_form(out, &[KW_POOP, param.as_str(), KW_POOPS], body, mode);
        }
        Node::MacroDef { name, body } => {
            let name = text(name, mode);
            keyword_form(out, &[KW_POOP, name.as_str(), KW_IS], body, mode);
        }
        Node::Apply { callee, args } => {
            out.push_str(KW_POOPING);
            out.push(' ');
            render_node(callee, mode, out);
            out.push(' ');
            out.push_str(KW_POOPY);
            if !args.is_empty() {
                out.push(' ');
                render_sequence(args, mode, out);
            }
            out.push(' ');
            out.push_str(KW_QOOQ);
        }
    }
}

fn keyword_form(out: &mut String, head: &[&str], body: &[Node], mode: Mode) {
    out.push_str(&head.join(" "));
    if !body.is_empty() {
        out.push(' ');
        render_sequence(body, mode, out);
    }
    out.push(' ');
    out.push_str(KW_QOOQ);
}

fn text(raw: &str, mode: Mode) -> String {
    match mode {
        Mode::Trace => escape_token_text(raw),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        vec![
            Node::macro_def("Id", vec![Node::func("x", vec![Node::token("x")])]),
            Node::apply(Node::token("Print"), vec![Node::literal("PoHi thereop")]),
        ]
    }

    #[test]
    fn source_echoes_keywords_and_literals() {
        assert_eq!(
            source_string(&sample()),
            "poop Id is poop x poops x qooq qooq pooping Print poopy PoHi thereop qooq"
        );
    }

    #[test]
    fn trace_escapes_whitespace() {
        assert_eq!(
            trace_string(&[Node::literal("Poa\tb op"), Node::token("c\\d")]),
            r"Poa\tb\sop c\\d"
        );
    }

    #[test]
    fn output_decodes_and_concatenates() {
        let nodes = vec![
            Node::literal("PoHiop"),
            Node::token("there"),
            Node::literal("Po!op"),
        ];
        assert_eq!(output_string(&nodes, EmptyLiteral::Empty), "Hithere!");
    }

    #[test]
    fn output_keeps_keywords_of_nested_forms() {
        let nodes = vec![Node::func("x", vec![Node::literal("PoAop"), Node::token("x")])];
        assert_eq!(
            output_string(&nodes, EmptyLiteral::Empty),
            "poop x poops Ax qooq"
        );
    }

    #[test]
    fn empty_bodies_render_without_double_spaces() {
        assert_eq!(source_string(&[Node::func("x", vec![])]), "poop x poops qooq");
        assert_eq!(
            source_string(&[Node::apply(Node::token("f"), vec![])]),
            "pooping f poopy qooq"
        );
    }

    #[test]
    fn four_character_literal_is_version_dependent() {
        assert_eq!(decode_literal("Poop", EmptyLiteral::Empty), "");
        assert_eq!(decode_literal("Poop", EmptyLiteral::Space), " ");
        assert_eq!(decode_literal("PoXop", EmptyLiteral::Space), "X");
    }
}
