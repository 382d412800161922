//! Lexical scan shared by the bundled inspection tools.
//!
//! Comments, string literals, and character literals are recognized and
//! excluded from the token stream, so a keyword inside a comment or a string
//! never looks like code.

/// Kind of one lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Number,
    Op,
    Punct,
}

/// One token with its byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Multi-character operators, longest first so lexing is greedy.
const OPERATORS: &[&str] = &[
    "===", "!==", "...", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=", "%=", "++",
    "--", "->", "?:", "::", "..", "=", "+", "-", "*", "/", "%", "<", ">", "!", "?", ":", ".",
];

#[derive(Debug, Default)]
pub struct ScanResult {
    pub tokens: Vec<Token>,
    /// Byte ranges of line and block comments, in source order.
    pub comments: Vec<(usize, usize)>,
}

pub fn scan(text: &str) -> ScanResult {
    let bytes = text.as_bytes();
    let mut result = ScanResult::default();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &text[i..];

        // Line comment
        if rest.starts_with("//") {
            let end = rest.find('\n').map_or(bytes.len(), |n| i + n);
            result.comments.push((i, end));
            i = end;
            continue;
        }

        // Block comment, nested
        if rest.starts_with("/*") {
            let mut depth = 1;
            let mut j = i + 2;
            while j < bytes.len() && depth > 0 {
                if bytes[j] == b'/' && bytes.get(j + 1) == Some(&b'*') {
                    depth += 1;
                    j += 2;
                } else if bytes[j] == b'*' && bytes.get(j + 1) == Some(&b'/') {
                    depth -= 1;
                    j += 2;
                } else {
                    j += 1;
                }
            }
            result.comments.push((i, j.min(bytes.len())));
            i = j.min(bytes.len());
            continue;
        }

        // Triple-quoted string
        if rest.starts_with("\"\"\"") {
            let end = rest[3..].find("\"\"\"").map_or(bytes.len(), |n| i + 3 + n + 3);
            i = end;
            continue;
        }

        // String literal
        if bytes[i] == b'"' {
            let mut j = i + 1;
            while j < bytes.len() {
                match bytes[j] {
                    b'\\' => j += 2,
                    b'"' => {
                        j += 1;
                        break;
                    }
                    _ => j += 1,
                }
            }
            i = j.min(bytes.len());
            continue;
        }

        // Character literal
        if bytes[i] == b'\'' {
            let mut j = i + 1;
            while j < bytes.len() {
                match bytes[j] {
                    b'\\' => j += 2,
                    b'\'' => {
                        j += 1;
                        break;
                    }
                    b'\n' => break,
                    _ => j += 1,
                }
            }
            i = j.min(bytes.len());
            continue;
        }

        let b = bytes[i];

        if b.is_ascii_alphabetic() || b == b'_' {
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            result.tokens.push(Token { kind: TokenKind::Word, start: i, end: j });
            i = j;
            continue;
        }

        if b.is_ascii_digit() {
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            result.tokens.push(Token { kind: TokenKind::Number, start: i, end: j });
            i = j;
            continue;
        }

        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            result.tokens.push(Token { kind: TokenKind::Op, start: i, end: i + op.len() });
            i += op.len();
            continue;
        }

        if matches!(b, b'(' | b')' | b'{' | b'}' | b'[' | b']' | b',' | b';' | b'@') {
            result.tokens.push(Token { kind: TokenKind::Punct, start: i, end: i + 1 });
            i += 1;
            continue;
        }

        // Whitespace and anything unrecognized, full characters at a time so
        // the next slice stays on a boundary
        i += rest.chars().next().map_or(1, |c| c.len_utf8());
    }

    result
}

pub fn tokenize(text: &str) -> Vec<Token> {
    scan(text).tokens
}

pub fn comment_spans(text: &str) -> Vec<(usize, usize)> {
    scan(text).comments
}
