//! Token types produced by the scanner.

use serde::Serialize;

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Keyword,
    /// Bare or quoted identifier (`name`, `"Name"`, `` `name` ``)
    Identifier,
    StringLiteral,
    /// `DATE '<literal>'` scanned as a single unit
    DateLiteral,
    Number,
    Operator,
    /// `( ) , ; . [ ]`
    Punctuation,
    Comment,
    Whitespace
}

impl TokenKind {
    /// Whether the token carries meaning for rule matching
    pub fn is_significant(self) -> bool {
        !matches!(self, Self::Comment | Self::Whitespace)
    }
}

/// Byte range `[start, end)` into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end:   usize
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A lexical unit with its original position.
///
/// Line and column are 1-based and always refer to the text that was
/// scanned; rewriting never changes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind:         TokenKind,
    pub span:         Span,
    pub line:         usize,
    pub column:       usize,
    /// Literal, quoted identifier or block comment without a closing
    /// delimiter
    pub unterminated: bool
}
