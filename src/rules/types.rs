//! Type definitions for the conversion rule system.
//!
//! - [`RuleInfo`] - Static metadata and diagnostic templates of a rule
//! - [`RuleMatch`] - One located construct, with captured groups
//! - [`RuleContext`] - What a rule may look at while matching or rewriting
//! - [`RewriteError`] - A rewrite that could not be produced

use std::{fmt, ops::Range};

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::{
    diagnostics::Severity,
    dialect::Dialect,
    scanner::{Span, TokenStream}
};

/// Metadata about a rule for identification, filtering and reporting.
#[derive(Debug, Clone)]
pub struct RuleInfo {
    /// Unique kebab-case identifier (e.g., "sel-abbrev")
    pub id:       &'static str,
    /// Human-readable rule name
    pub name:     &'static str,
    /// Default severity of the diagnostic
    pub severity: Severity,
    /// Dialects the rule converts from
    pub sources:  &'static [Dialect],
    /// Dialects the rule converts to
    pub targets:  &'static [Dialect],
    /// Diagnostic message template
    pub message:  &'static str,
    /// Optional remediation template
    pub solution: Option<&'static str>
}

impl RuleInfo {
    pub fn applies_to(&self, source: Dialect, target: Dialect) -> bool {
        self.sources.contains(&source) && self.targets.contains(&target)
    }
}

/// Captured groups of a match, referenced as `{1}`, `{2}`, ... in templates
pub type Captures = SmallVec<[CompactString; 4]>;

/// A construct located by a rule in the original token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Token index range `[start, end)`
    pub tokens:   Range<usize>,
    /// Byte span in the source text
    pub span:     Span,
    pub line:     usize,
    pub column:   usize,
    pub captures: Captures
}

impl RuleMatch {
    /// Build a match covering the tokens in `range`.
    ///
    /// Returns `None` for an empty or out-of-range token range.
    pub fn from_tokens(
        tokens: &TokenStream<'_>,
        range: Range<usize>,
        captures: Captures
    ) -> Option<Self> {
        let first = tokens.get(range.start)?;
        let last = tokens.get(range.end.checked_sub(1)?)?;
        if range.end <= range.start {
            return None;
        }
        Some(Self {
            span: Span::new(first.span.start, last.span.end),
            line: first.line,
            column: first.column,
            tokens: range,
            captures
        })
    }

    /// Source text covered by the match
    pub fn text<'a>(&self, tokens: &TokenStream<'a>) -> &'a str {
        &tokens.source()[self.span.start..self.span.end]
    }
}

/// Read-only view handed to rules during one conversion
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Tokens of the original, unmodified source
    pub tokens: &'a TokenStream<'a>,
    pub source: Dialect,
    pub target: Dialect
}

/// Failure to produce a rewrite for a located match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteError(pub String);

impl RewriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for RewriteError {}
