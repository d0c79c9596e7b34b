//! The token definition for shell command lines.

/// A token is a single unit of a command line, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    /// A bare run of characters, e.g. `filter`, `createdAt`, `-12`, `true`
    Word(&'a str),
    /// A double-quoted string, including the quotes
    Quoted(&'a str),
    /// A JSON array or object, including the outer brackets
    Bracketed(&'a str),

    // Punctuation
    At, // @
    Eq, // =

    // Special
    Illegal, // An unterminated string or bracket
}

impl<'a> TokenKind<'a> {
    /// Raw text of tokens that can stand for a value.
    pub fn value_text(&self) -> Option<&'a str> {
        match self {
            TokenKind::Word(s) | TokenKind::Quoted(s) | TokenKind::Bracketed(s) => Some(*s),
            _ => None,
        }
    }

    /// Source text of the token, `None` for illegal input.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            TokenKind::At => Some("@"),
            TokenKind::Eq => Some("="),
            TokenKind::Illegal => None,
            other => other.value_text(),
        }
    }
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
