use std::sync::LazyLock;

use regex::Regex;
use smallvec::smallvec;

use super::{
    ConversionRule, RewriteError, RuleContext, RuleInfo, RuleMatch, TERADATA_SOURCES
};
use crate::{diagnostics::Severity, dialect::Dialect, scanner::TokenKind};

/// Regex splitting a scanned date literal into keyword and literal body.
/// Matches: `DATE '2024-01-01'`, `date'2024-01-01'`
static DATE_LITERAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^DATE\s*'((?:[^']|'')*)'$").expect("valid regex"));

/// Targets that accept the `DATE('...')` function form
const DATE_FUNCTION_TARGETS: &[Dialect] =
    &[Dialect::Db2, Dialect::PostgreSql, Dialect::MySql, Dialect::Other];

/// ANSI/Teradata `DATE '<literal>'` rewritten as `DATE('<literal>')`
pub struct DateLiteral;

impl ConversionRule for DateLiteral {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "date-literal",
            name:     "DATE literal",
            severity: Severity::Warning,
            sources:  TERADATA_SOURCES,
            targets:  DATE_FUNCTION_TARGETS,
            message:  "{source} DATE literal '{1}' converted to {target} DATE('{1}') format",
            solution: Some("Review the DATE function conversion for accuracy")
        }
    }

    fn find_matches(&self, ctx: &RuleContext<'_>) -> Vec<RuleMatch> {
        let tokens = ctx.tokens;
        tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TokenKind::DateLiteral && !t.unterminated)
            .filter_map(|(idx, _)| {
                let literal = DATE_LITERAL_REGEX
                    .captures(tokens.text(idx))
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str())?;
                RuleMatch::from_tokens(tokens, idx..idx + 1, smallvec![literal.into()])
            })
            .collect()
    }

    fn rewrite(
        &self,
        matched: &RuleMatch,
        ctx: &RuleContext<'_>
    ) -> Result<Option<String>, RewriteError> {
        let text = matched.text(ctx.tokens);
        if !DATE_LITERAL_REGEX.is_match(text) {
            return Err(RewriteError::new(format!(
                "`{}` is not a DATE literal",
                text
            )));
        }
        Ok(Some(
            DATE_LITERAL_REGEX
                .replace(text, "DATE('$1')")
                .into_owned()
        ))
    }
}
