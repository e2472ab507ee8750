//! Lexer: comment stripping, escape decoding, and whitespace tokenization.
//!
//! Comment stripping blanks comments out with spaces instead of deleting
//! them, so byte offsets into the original source stay valid for
//! diagnostics and a closed block comment always separates its neighbours.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::syntax::{Span, RESERVED_WORDS};

static VARIABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_]+$").expect("variable name pattern is valid"));

/// One lexed token: its decoded text and where its raw form sits in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Blanks out `// ...` line comments and `/* ... */` block comments.
///
/// An unterminated block comment runs to the end of the input. Newlines
/// inside comments are kept.
pub fn remove_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '/' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('/') => {
                out.push_str("  ");
                chars.next();
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    blank(&mut out, next);
                    chars.next();
                }
            }
            Some('*') => {
                out.push_str("  ");
                chars.next();
                let mut previous_star = false;
                for next in chars.by_ref() {
                    blank(&mut out, next);
                    if previous_star && next == '/' {
                        break;
                    }
                    previous_star = next == '*';
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Resolves `\n \t \r \s \\`; any other escaped character decodes to itself.
///
/// Decoding runs exactly once per token, so `\\n` yields a backslash
/// followed by `n`, never a newline.
pub fn unescape_literal_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('s') => out.push(' '),
            Some(other) => out.push(other),
            // a lone trailing backslash has nothing to escape
            None => out.push('\\'),
        }
    }
    out
}

/// The inverse of [`unescape_literal_text`] for the characters it can produce
/// that would otherwise break re-lexing.
pub fn escape_token_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            ' ' => out.push_str("\\s"),
            other => out.push(other),
        }
    }
    out
}

/// Splits source text into decoded tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let cleaned = remove_comments(text);
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (index, c) in cleaned.char_indices() {
        if is_separator(c) {
            if let Some(begin) = start.take() {
                tokens.push(make_token(&cleaned, begin, index));
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        tokens.push(make_token(&cleaned, begin, cleaned.len()));
    }
    tokens
}

/// True for legal parameter names: one or more of `a-z` and `_`.
pub fn is_variable_name(s: &str) -> bool {
    VARIABLE_NAME.is_match(s)
}

/// True for self-delimited literal text `Po...op` of length four or more.
pub fn is_literal_token(s: &str) -> bool {
    if RESERVED_WORDS.contains(&s) {
        return false;
    }
    s.len() >= 4 && s.starts_with("Po") && s.ends_with("op")
}

/// True for the single control tokens that may never name a macro.
pub fn is_control_token(s: &str) -> bool {
    matches!(s, "\n" | "\r" | "\t" | "\\")
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        for _ in 0..c.len_utf8() {
            out.push(' ');
        }
    }
}

fn make_token(cleaned: &str, start: usize, end: usize) -> Token {
    Token {
        text: unescape_literal_text(&cleaned[start..end]),
        span: Span { start, end },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn splits_on_all_whitespace_runs() {
        assert_eq!(texts("  a\tb\r\n\nc  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn line_comment_runs_to_newline() {
        assert_eq!(texts("a // b c\nd"), vec!["a", "d"]);
        assert_eq!(texts("a // trailing"), vec!["a"]);
    }

    #[test]
    fn block_comment_separates_neighbours() {
        assert_eq!(texts("a/* x */b"), vec!["a", "b"]);
    }

    #[test]
    fn unterminated_block_comment_consumes_rest() {
        assert_eq!(texts("a /* b c"), vec!["a"]);
    }

    #[test]
    fn comment_stripping_keeps_offsets() {
        let source = "/* é */ tok";
        let cleaned = remove_comments(source);
        assert_eq!(cleaned.len(), source.len());
        let tokens = tokenize(source);
        assert_eq!(&source[tokens[0].span.start..tokens[0].span.end], "tok");
    }

    #[test]
    fn escapes_decode_once() {
        assert_eq!(unescape_literal_text(r"a\nb"), "a\nb");
        assert_eq!(unescape_literal_text(r"\s\t\r"), " \t\r");
        assert_eq!(unescape_literal_text(r"\\n"), "\\n");
        assert_eq!(unescape_literal_text(r"\q"), "q");
        assert_eq!(unescape_literal_text("end\\"), "end\\");
    }

    #[test]
    fn escaped_whitespace_stays_inside_token() {
        assert_eq!(texts(r"PoHello\sWorldop"), vec!["PoHello Worldop"]);
    }

    #[test]
    fn escape_inverts_unescape() {
        let raw = "a b\\c\n\t\r";
        assert_eq!(unescape_literal_text(&escape_token_text(raw)), raw);
    }

    #[test]
    fn variable_names() {
        assert!(is_variable_name("x"));
        assert!(is_variable_name("long_name_"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name("Id"));
        assert!(!is_variable_name("x1"));
    }

    #[test]
    fn literal_tokens() {
        assert!(is_literal_token("Poop"));
        assert!(is_literal_token("PoHiop"));
        assert!(!is_literal_token("Pop"));
        assert!(!is_literal_token("poop"));
        assert!(!is_literal_token("Hi"));
        for word in RESERVED_WORDS {
            assert!(!is_literal_token(word));
        }
    }

    #[test]
    fn control_tokens() {
        assert!(is_control_token("\n"));
        assert!(is_control_token("\\"));
        assert!(!is_control_token("n"));
    }
}
