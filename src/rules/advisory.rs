use smallvec::smallvec;

use super::{ConversionRule, RewriteError, RuleContext, RuleInfo, RuleMatch};
use crate::{
    diagnostics::Severity,
    dialect::Dialect,
    scanner::{TokenKind, TokenStream}
};

/// Keywords followed by a table reference
const TABLE_KEYWORDS: [&str; 7] = ["FROM", "JOIN", "INTO", "UPDATE", "UPD", "TABLE", "USING"];

/// Schema-qualified table references (`schema.table`).
///
/// Advisory only: the reference is left as written, but the schema has to
/// exist on the target side.
pub struct SchemaQualifiedTable;

impl ConversionRule for SchemaQualifiedTable {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "schema-qualify-hint",
            name:     "Schema-qualified table",
            severity: Severity::Warning,
            sources:  &Dialect::ALL,
            targets:  &Dialect::ALL,
            message:  "Table reference {1} is schema-qualified; schema {2} must exist in {target}",
            solution: Some(
                "Create schema {2} in the target database or map it to an existing schema before running the script"
            )
        }
    }

    fn find_matches(&self, ctx: &RuleContext<'_>) -> Vec<RuleMatch> {
        let tokens = ctx.tokens;
        let mut matches = Vec::new();
        for idx in 0..tokens.len() {
            if !TABLE_KEYWORDS.iter().any(|kw| tokens.is_keyword(idx, kw)) {
                continue;
            }
            let mut cursor = tokens.next_significant(idx);
            while let Some(first) = cursor {
                let Some(last) = table_reference_end(tokens, first) else {
                    break;
                };
                if last > first
                    && let Some(m) = qualified_match(tokens, first, last)
                {
                    matches.push(m);
                }
                // FROM a.x, b.y lists
                cursor = skip_alias(tokens, last)
                    .filter(|&i| tokens.is_keyword(idx, "FROM") && tokens.is_punct(i, ","))
                    .and_then(|comma| tokens.next_significant(comma));
            }
        }
        matches
    }

    fn rewrite(
        &self,
        _matched: &RuleMatch,
        _ctx: &RuleContext<'_>
    ) -> Result<Option<String>, RewriteError> {
        Ok(None)
    }
}

fn is_identifier(tokens: &TokenStream<'_>, idx: usize) -> bool {
    tokens.kind(idx) == Some(TokenKind::Identifier)
}

/// Last token index of the dotted name starting at `first`
fn table_reference_end(tokens: &TokenStream<'_>, first: usize) -> Option<usize> {
    if !is_identifier(tokens, first) {
        return None;
    }
    let mut last = first;
    while let Some(dot) = tokens.next_significant(last).filter(|&i| tokens.is_punct(i, ".")) {
        match tokens
            .next_significant(dot)
            .filter(|&i| is_identifier(tokens, i))
        {
            Some(part) => last = part,
            None => break
        }
    }
    Some(last)
}

fn qualified_match(tokens: &TokenStream<'_>, first: usize, last: usize) -> Option<RuleMatch> {
    let name = tokens.slice(first..last + 1);
    let dot = name.rfind('.')?;
    let schema = name[..dot].trim();
    RuleMatch::from_tokens(
        tokens,
        first..last + 1,
        smallvec![name.into(), schema.into(), tokens.text(last).into()]
    )
}

/// First significant token after the table name and its optional alias
fn skip_alias(tokens: &TokenStream<'_>, last: usize) -> Option<usize> {
    let mut next = tokens.next_significant(last)?;
    if tokens.is_keyword(next, "AS") {
        next = tokens.next_significant(next)?;
    }
    if is_identifier(tokens, next) {
        return tokens.next_significant(next);
    }
    Some(next)
}
