//! Lexical scanner for SQL scripts.
//!
//! The scanner splits raw SQL text into [`Token`]s that are precise enough to
//! locate dialect-specific constructs without a full parser. It never fails:
//! malformed input (an unterminated string, quoted identifier or block
//! comment) still produces a token, flagged as
//! [`unterminated`](Token::unterminated), so later stages can report it
//! instead of aborting.
//!
//! Every token keeps the 1-based line and column where it starts in the
//! scanned text. Diagnostics are attributed from these positions, so they
//! stay correct no matter how much the text changes during rewriting.
//!
//! # Example
//!
//! ```
//! use sql_dialect_converter::scanner::{TokenKind, scan};
//!
//! let tokens = scan("SEL a\nFROM t WHERE d = DATE '2024-01-01'");
//! let date = tokens
//!     .iter()
//!     .find(|t| t.kind == TokenKind::DateLiteral)
//!     .unwrap();
//! assert_eq!(date.line, 2);
//! ```

mod token;

use std::ops::Range;

pub use token::{Span, Token, TokenKind};

/// Number of lines in `text`, never less than one
pub fn count_lines(text: &str) -> usize {
    text.lines().count().max(1)
}

/// Scan the whole text into a [`TokenStream`]
pub fn scan(text: &str) -> TokenStream<'_> {
    TokenStream {
        source: text,
        tokens: Scanner::new(text).collect()
    }
}

/// Streaming tokenizer over a SQL string.
///
/// Restartable: a new scanner over the same text yields the same tokens.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    src:    &'a str,
    pos:    usize,
    line:   usize,
    column: usize
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1
        }
    }

    fn advance_to(&mut self, end: usize) {
        for c in self.src[self.pos..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    /// Length and termination of the token starting at the current position
    fn measure(&self, rest: &str) -> (TokenKind, usize, bool) {
        let mut chars = rest.chars();
        let Some(first) = chars.next() else {
            return (TokenKind::Whitespace, 0, false);
        };
        let second = chars.next();

        if first.is_whitespace() {
            return (TokenKind::Whitespace, whitespace_len(rest), false);
        }
        if first == '-' && second == Some('-') {
            let len = rest.find('\n').unwrap_or(rest.len());
            return (TokenKind::Comment, len, false);
        }
        if first == '/' && second == Some('*') {
            return match rest[2..].find("*/") {
                Some(idx) => (TokenKind::Comment, idx + 4, false),
                None => (TokenKind::Comment, rest.len(), true)
            };
        }
        match first {
            '\'' => {
                let (len, unterminated) = quoted_len(rest, '\'');
                return (TokenKind::StringLiteral, len, unterminated);
            }
            '"' | '`' => {
                let (len, unterminated) = quoted_len(rest, first);
                return (TokenKind::Identifier, len, unterminated);
            }
            _ => {}
        }
        if first.is_alphabetic() || first == '_' {
            let len = word_len(rest);
            let word = &rest[..len];
            if word.eq_ignore_ascii_case("DATE") {
                let gap = whitespace_len(&rest[len..]);
                let after = &rest[len + gap..];
                if after.starts_with('\'') {
                    let (lit_len, unterminated) = quoted_len(after, '\'');
                    return (TokenKind::DateLiteral, len + gap + lit_len, unterminated);
                }
            }
            let kind = if is_keyword(&word.to_ascii_uppercase()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            return (kind, len, false);
        }
        if first.is_ascii_digit() {
            return (TokenKind::Number, number_len(rest), false);
        }
        if let Some(second) = second {
            let pair = [first, second];
            if matches!(
                pair,
                ['<', '='] | ['>', '='] | ['<', '>'] | ['!', '='] | ['|', '|'] | [':', ':']
            ) {
                return (TokenKind::Operator, 2, false);
            }
        }
        let kind = if matches!(first, '(' | ')' | ',' | ';' | '.' | '[' | ']') {
            TokenKind::Punctuation
        } else {
            TokenKind::Operator
        };
        (kind, first.len_utf8(), false)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.pos >= self.src.len() {
            return None;
        }
        let (kind, len, unterminated) = self.measure(&self.src[self.pos..]);
        let token = Token {
            kind,
            span: Span::new(self.pos, self.pos + len),
            line: self.line,
            column: self.column,
            unterminated
        };
        self.advance_to(self.pos + len);
        Some(token)
    }
}

fn whitespace_len(rest: &str) -> usize {
    rest.char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(rest.len(), |(i, _)| i)
}

fn word_len(rest: &str) -> usize {
    rest.char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || matches!(c, '_' | '$' | '#')))
        .map_or(rest.len(), |(i, _)| i)
}

fn number_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |p| from + p)
    };
    let mut end = digits(0);
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end = digits(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        if bytes.get(end + 1 + sign).is_some_and(u8::is_ascii_digit) {
            end = digits(end + 1 + sign);
        }
    }
    end
}

/// Length of a quoted token starting at `rest[0] == quote`.
///
/// A doubled quote is an escaped quote. Without a closing quote the token
/// ends at the end of its first line and is reported unterminated.
fn quoted_len(rest: &str, quote: char) -> (usize, bool) {
    let q = quote.len_utf8();
    let mut from = q;
    while let Some(idx) = rest[from..].find(quote) {
        let close = from + idx;
        if rest[close + q..].starts_with(quote) {
            from = close + 2 * q;
            continue;
        }
        return (close + q, false);
    }
    (rest.find('\n').unwrap_or(rest.len()), true)
}

fn is_keyword(upper: &str) -> bool {
    matches!(
        upper,
        "ALL"
            | "ALTER"
            | "AND"
            | "AS"
            | "ASC"
            | "BETWEEN"
            | "BY"
            | "CASE"
            | "CREATE"
            | "CROSS"
            | "DEL"
            | "DELETE"
            | "DESC"
            | "DISTINCT"
            | "DROP"
            | "ELSE"
            | "END"
            | "EXCEPT"
            | "EXISTS"
            | "FROM"
            | "FULL"
            | "GROUP"
            | "HAVING"
            | "ILIKE"
            | "IN"
            | "INNER"
            | "INS"
            | "INSERT"
            | "INTERSECT"
            | "INTO"
            | "IS"
            | "JOIN"
            | "LEFT"
            | "LIKE"
            | "LIMIT"
            | "MERGE"
            | "MINUS"
            | "NOT"
            | "NULL"
            | "ON"
            | "OR"
            | "ORDER"
            | "OUTER"
            | "OVER"
            | "PARTITION"
            | "QUALIFY"
            | "RIGHT"
            | "SEL"
            | "SELECT"
            | "SET"
            | "TABLE"
            | "THEN"
            | "TOP"
            | "UNION"
            | "UPD"
            | "UPDATE"
            | "USING"
            | "VALUES"
            | "VIEW"
            | "WHEN"
            | "WHERE"
            | "WITH"
    )
}

/// Tokens of one script together with the text they were scanned from
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    source: &'a str,
    tokens: Vec<Token>
}

impl<'a> TokenStream<'a> {
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Token> {
        self.tokens.get(idx)
    }

    pub fn kind(&self, idx: usize) -> Option<TokenKind> {
        self.tokens.get(idx).map(|t| t.kind)
    }

    /// Source text of the token at `idx`, empty when out of range
    pub fn text(&self, idx: usize) -> &'a str {
        self.tokens
            .get(idx)
            .map_or("", |t| &self.source[t.span.start..t.span.end])
    }

    /// Source text covering tokens `range` (end exclusive)
    pub fn slice(&self, range: Range<usize>) -> &'a str {
        match (self.tokens.get(range.start), range.end.checked_sub(1)) {
            (Some(first), Some(last)) if last >= range.start => {
                let end = self.tokens.get(last).map_or(first.span.end, |t| t.span.end);
                &self.source[first.span.start..end]
            }
            _ => ""
        }
    }

    /// Index of the first significant token strictly after `idx`
    pub fn next_significant(&self, idx: usize) -> Option<usize> {
        (idx + 1..self.tokens.len()).find(|&i| self.tokens[i].kind.is_significant())
    }

    /// Index of the last significant token strictly before `idx`
    pub fn prev_significant(&self, idx: usize) -> Option<usize> {
        (0..idx.min(self.tokens.len()))
            .rev()
            .find(|&i| self.tokens[i].kind.is_significant())
    }

    /// Case-insensitive keyword check
    pub fn is_keyword(&self, idx: usize, keyword: &str) -> bool {
        self.kind(idx) == Some(TokenKind::Keyword) && self.text(idx).eq_ignore_ascii_case(keyword)
    }

    pub fn is_punct(&self, idx: usize, punct: &str) -> bool {
        self.kind(idx) == Some(TokenKind::Punctuation) && self.text(idx) == punct
    }

    /// Case-insensitive check of a keyword or identifier
    pub fn is_word(&self, idx: usize, word: &str) -> bool {
        matches!(
            self.kind(idx),
            Some(TokenKind::Keyword | TokenKind::Identifier)
        ) && self.text(idx).eq_ignore_ascii_case(word)
    }

    /// Whether the significant token at `idx` is the first of its statement
    pub fn starts_statement(&self, idx: usize) -> bool {
        self.kind(idx).is_some_and(TokenKind::is_significant)
            && self
                .prev_significant(idx)
                .is_none_or(|p| self.is_punct(p, ";"))
    }

    /// Index of the `)` closing the `(` at `open`
    pub fn matching_paren(&self, open: usize) -> Option<usize> {
        if !self.is_punct(open, "(") {
            return None;
        }
        let mut depth = 0usize;
        for idx in open..self.tokens.len() {
            if self.is_punct(idx, "(") {
                depth += 1;
            } else if self.is_punct(idx, ")") {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Index of the first unterminated token
    pub fn first_unterminated(&self) -> Option<usize> {
        self.tokens.iter().position(|t| t.unterminated)
    }

    /// Token ranges of the `;`-separated statements.
    ///
    /// A range includes its terminating `;`. Segments holding only
    /// whitespace and comments are not statements.
    pub fn statements(&self) -> Vec<Range<usize>> {
        let mut statements = Vec::new();
        let mut start = 0;
        let mut has_content = false;
        for (idx, token) in self.tokens.iter().enumerate() {
            if self.is_punct(idx, ";") {
                if has_content {
                    statements.push(start..idx + 1);
                }
                start = idx + 1;
                has_content = false;
            } else if token.kind.is_significant() {
                has_content = true;
            }
        }
        if has_content {
            statements.push(start..self.tokens.len());
        }
        statements
    }

    /// Token range of the statement containing `idx`
    pub fn statement_at(&self, idx: usize) -> Option<Range<usize>> {
        self.statements().into_iter().find(|r| r.contains(&idx))
    }
}

impl<'s> IntoIterator for &'s TokenStream<'_> {
    type Item = &'s Token;
    type IntoIter = std::slice::Iter<'s, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
