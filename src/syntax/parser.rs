//! Pooplang Parser
//!
//! Recursive descent over the token sequence. Every parse function returns
//! what it parsed together with the tokens it did not consume. `qooq` and
//! `poopy` end a sequence and are left for the enclosing form to check.

use std::cell::Cell;

use crate::ast::{source_string, Node};
use crate::errors::{to_source_span, PoopError, SourceArc, SourceContext};
use crate::syntax::lexer::{is_control_token, is_literal_token, is_variable_name, tokenize, Token};
use crate::syntax::{Span, KW_IS, KW_POOP, KW_POOPING, KW_POOPS, KW_POOPY, KW_QOOQ};

/// How many leftover tokens a trailing-token error quotes.
const TRAILING_TOKEN_PREVIEW: usize = 5;

/// Deepest nesting of `poop`/`pooping` forms accepted. Parsing, reduction
/// and rendering all recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 128;

type Parsed<'t, T> = Result<(T, &'t [Token]), PoopError>;

/// Source, end-of-input position and current nesting depth of one parse.
pub struct ParseContext {
    src: SourceArc,
    eof: Span,
    depth: Cell<usize>,
}

impl ParseContext {
    pub fn new(source: &SourceContext) -> Self {
        let end = source.content.len();
        Self {
            src: source.to_named_source(),
            eof: Span { start: end, end },
            depth: Cell::new(0),
        }
    }

    /// Runs `parse` one nesting level below the form opened by `opener`.
    fn nested<T>(
        &self,
        opener: &Token,
        parse: impl FnOnce() -> Result<T, PoopError>,
    ) -> Result<T, PoopError> {
        let depth = self.depth.get() + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(PoopError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                src: self.src.clone(),
                span: to_source_span(opener.span),
            });
        }
        self.depth.set(depth);
        let result = parse();
        self.depth.set(depth - 1);
        result
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a whole program; every token must belong to some form.
pub fn parse_program(text: &str) -> Result<Vec<Node>, PoopError> {
    parse_source(text, SourceContext::from_file("source", text))
}

/// Like [`parse_program`], with errors pointing into a named source.
pub fn parse_source(text: &str, source: SourceContext) -> Result<Vec<Node>, PoopError> {
    let cx = ParseContext::new(&source);
    let tokens = tokenize(text);
    let (nodes, rest) = parse_sequence(&tokens, &cx)?;

    if let Some(first) = rest.first() {
        let preview = &rest[..rest.len().min(TRAILING_TOKEN_PREVIEW)];
        let last = preview.last().unwrap_or(first);
        let tokens = preview
            .iter()
            .map(Token::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        return Err(PoopError::TrailingTokens {
            tokens,
            src: cx.src.clone(),
            span: to_source_span(Span {
                start: first.span.start,
                end: last.span.end,
            }),
        });
    }
    Ok(nodes)
}

/// Parses sibling nodes until the input ends or a `qooq`/`poopy` is next.
pub fn parse_sequence<'t>(tokens: &'t [Token], cx: &ParseContext) -> Parsed<'t, Vec<Node>> {
    let mut nodes = Vec::new();
    let mut rest = tokens;

    while let Some((head, tail)) = rest.split_first() {
        match head.as_str() {
            KW_QOOQ | KW_POOPY => break,
            KW_POOP => {
                let (node, remaining) = cx.nested(head, || parse_poop_form(head, tail, cx))?;
                nodes.push(node);
                rest = remaining;
            }
            KW_POOPING => {
                let (node, remaining) = cx.nested(head, || parse_apply_form(head, tail, cx))?;
                nodes.push(node);
                rest = remaining;
            }
            text => {
                nodes.push(if is_literal_token(text) {
                    Node::literal(text)
                } else {
                    Node::token(text)
                });
                rest = tail;
            }
        }
    }
    Ok((nodes, rest))
}

/// Parses `<name> is <body> qooq` or `<param> poops <body> qooq`; `tokens`
/// start right after `poop`.
pub fn parse_poop_form<'t>(poop: &Token, tokens: &'t [Token], cx: &ParseContext) -> Parsed<'t, Node> {
    let Some((name, rest)) = tokens.split_first() else {
        return Err(missing(cx, format!("a name after `{KW_POOP}`")));
    };
    let Some((keyword, rest)) = rest.split_first() else {
        return Err(missing(
            cx,
            format!("`{KW_IS}` or `{KW_POOPS}` after `{KW_POOP} {}`", name.text),
        ));
    };

    match keyword.as_str() {
        KW_IS => {
            if is_variable_name(&name.text) || is_control_token(&name.text) {
                return Err(PoopError::IllegalMacroName {
                    name: name.text.clone(),
                    src: cx.src.clone(),
                    span: to_source_span(name.span),
                });
            }
            let (body, rest) = parse_sequence(rest, cx)?;
            let rest = expect(rest, KW_QOOQ, "to close the macro definition", cx)?;
            Ok((Node::macro_def(name.text.clone(), body), rest))
        }
        KW_POOPS => {
            if !is_variable_name(&name.text) {
                return Err(PoopError::IllegalParameterName {
                    name: name.text.clone(),
                    src: cx.src.clone(),
                    span: to_source_span(name.span),
                });
            }
            let (body, rest) = parse_sequence(rest, cx)?;
            let rest = expect(rest, KW_QOOQ, "to close the function", cx)?;
            Ok((Node::func(name.text.clone(), body), rest))
        }
        other => Err(PoopError::UnexpectedToken {
            expected: format!("`{KW_IS}` or `{KW_POOPS}` after `{} {}`", poop.text, name.text),
            found: other.to_string(),
            src: cx.src.clone(),
            span: to_source_span(keyword.span),
        }),
    }
}

/// Parses `<callee...> poopy <args...> qooq`; `tokens` start right after
/// `pooping`. A multi-node callee collapses into one synthetic token named
/// by its source form.
pub fn parse_apply_form<'t>(
    pooping: &Token,
    tokens: &'t [Token],
    cx: &ParseContext,
) -> Parsed<'t, Node> {
    let (mut callee, rest) = parse_sequence(tokens, cx)?;
    let rest = expect(rest, KW_POOPY, "to end the callee", cx)?;
    let (args, rest) = parse_sequence(rest, cx)?;
    let rest = expect(rest, KW_QOOQ, "to close the application", cx)?;

    let callee = match callee.len() {
        0 => {
            return Err(PoopError::EmptyCallee {
                src: cx.src.clone(),
                span: to_source_span(pooping.span),
            })
        }
        1 => callee.remove(0),
        _ => Node::token(source_string(&callee)),
    };
    Ok((Node::apply(callee, args), rest))
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn expect<'t>(
    tokens: &'t [Token],
    keyword: &str,
    purpose: &str,
    cx: &ParseContext,
) -> Result<&'t [Token], PoopError> {
    match tokens.split_first() {
        Some((head, rest)) if head.text == keyword => Ok(rest),
        Some((head, _)) => Err(PoopError::UnexpectedToken {
            expected: format!("`{keyword}` {purpose}"),
            found: head.text.clone(),
            src: cx.src.clone(),
            span: to_source_span(head.span),
        }),
        None => Err(missing(cx, format!("`{keyword}` {purpose}"))),
    }
}

fn missing(cx: &ParseContext, element: String) -> PoopError {
    PoopError::MissingElement {
        element,
        src: cx.src.clone(),
        span: to_source_span(cx.eof),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;

    #[test]
    fn bare_tokens_and_literals() {
        let nodes = parse_program("a PoHiop b").unwrap();
        assert_eq!(
            nodes,
            vec![Node::token("a"), Node::literal("PoHiop"), Node::token("b")]
        );
    }

    #[test]
    fn function_with_multi_node_body() {
        let nodes = parse_program("poop x poops x y qooq").unwrap();
        assert_eq!(
            nodes,
            vec![Node::func("x", vec![Node::token("x"), Node::token("y")])]
        );
    }

    #[test]
    fn macro_definition() {
        let nodes = parse_program("poop Id is poop x poops x qooq qooq").unwrap();
        assert_eq!(
            nodes,
            vec![Node::macro_def(
                "Id",
                vec![Node::func("x", vec![Node::token("x")])]
            )]
        );
    }

    #[test]
    fn multi_node_callee_collapses_to_token() {
        let nodes = parse_program("pooping a PoXop poopy b qooq").unwrap();
        assert_eq!(
            nodes,
            vec![Node::apply(Node::token("a PoXop"), vec![Node::token("b")])]
        );
    }

    #[test]
    fn lowercase_macro_name_is_rejected() {
        let err = parse_program("poop id is x qooq").unwrap_err();
        assert!(matches!(err, PoopError::IllegalMacroName { ref name, .. } if name == "id"));
    }

    #[test]
    fn control_character_macro_name_is_rejected() {
        let err = parse_program(r"poop \n is x qooq").unwrap_err();
        assert!(matches!(err, PoopError::IllegalMacroName { ref name, .. } if name == "\n"));
    }

    #[test]
    fn uppercase_parameter_is_rejected() {
        let err = parse_program("poop X poops X qooq").unwrap_err();
        assert!(matches!(err, PoopError::IllegalParameterName { .. }));
    }

    #[test]
    fn missing_terminators() {
        assert!(matches!(
            parse_program("poop x poops x").unwrap_err(),
            PoopError::MissingElement { .. }
        ));
        assert!(matches!(
            parse_program("pooping f x qooq").unwrap_err(),
            PoopError::UnexpectedToken { ref found, .. } if found == "qooq"
        ));
        assert!(matches!(
            parse_program("poop x").unwrap_err(),
            PoopError::MissingElement { .. }
        ));
    }

    #[test]
    fn bad_keyword_after_poop_name() {
        let err = parse_program("poop x y qooq").unwrap_err();
        assert!(matches!(err, PoopError::UnexpectedToken { ref found, .. } if found == "y"));
    }

    #[test]
    fn empty_callee_is_rejected() {
        let err = parse_program("pooping poopy a qooq").unwrap_err();
        assert!(matches!(err, PoopError::EmptyCallee { .. }));
    }

    #[test]
    fn trailing_tokens_preview_first_five() {
        let err = parse_program("a qooq b c d e f g").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Parse);
        match err {
            PoopError::TrailingTokens { tokens, .. } => assert_eq!(tokens, "qooq b c d e"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn keywords_in_sequence_position_are_tokens() {
        let nodes = parse_program("is poops").unwrap();
        assert_eq!(nodes, vec![Node::token("is"), Node::token("poops")]);
    }
}
