//! The conversion engine.
//!
//! [`convert`] runs one script through the registry:
//!
//! 1. **Scan** the source once.
//! 2. **Match** every applicable rule, in registry order, against the
//!    *original* token stream. A matcher that panics is skipped with an
//!    `error` diagnostic; matches whose span is not a valid slice of the text
//!    are dropped.
//! 3. **Resolve overlaps**: the earliest start offset wins, ties go to the
//!    rule registered first; losing matches are dropped without a diagnostic.
//! 4. **Rewrite**: replacements are computed from the original text and
//!    applied in descending offset order, so no edit shifts another.
//! 5. **Report** one diagnostic per accepted match at the match's original
//!    line.
//!
//! The engine never fails. Input problems and rule failures become `error`
//! diagnostics next to a best-effort target text.

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    ops::Range
};

use tracing::{debug, instrument, warn};

use crate::{
    diagnostics::{Diagnostic, Severity, TemplateVars, fill_template},
    dialect::Dialect,
    rules::{ConversionRule, RuleContext, RuleMatch, RuleRegistry},
    scanner::{Span, TokenKind, scan},
    script::SourceScript,
    session::ConversionResult
};

/// A match competing for its span
struct Candidate<'r> {
    priority: usize,
    rule:     &'r dyn ConversionRule,
    matched:  RuleMatch
}

/// Convert a script to `target` using the rules in `registry`.
///
/// # Example
///
/// ```
/// use sql_dialect_converter::{
///     dialect::Dialect, engine::convert, rules::RuleRegistry, script::SourceScript
/// };
///
/// let registry = RuleRegistry::new().unwrap();
/// let script = SourceScript::new("SEL a, b FROM t;", Dialect::Teradata);
/// let result = convert(&script, Dialect::Db2, &registry);
///
/// assert_eq!(result.target_text, "SELECT a, b FROM t;");
/// assert_eq!(result.warning_count, 1);
/// ```
#[instrument(
    level = "debug",
    skip_all,
    fields(script = script.name.as_deref().unwrap_or("<unnamed>"), source = %script.dialect, %target)
)]
pub fn convert(script: &SourceScript, target: Dialect, registry: &RuleRegistry) -> ConversionResult {
    let source_text = script.text.as_str();
    let tokens = scan(source_text);
    let statements = tokens.statements();

    if statements.is_empty() {
        let diagnostic = Diagnostic::input_error(1, 1, "Script contains no SQL statements")
            .with_solution("Provide at least one statement to convert");
        return ConversionResult::from_parts(source_text.to_string(), vec![diagnostic], 0);
    }

    let mut diagnostics = Vec::new();
    let mut failed = vec![false; statements.len()];

    let cutoff = tokens
        .first_unterminated()
        .and_then(|idx| tokens.get(idx))
        .map(|t| t.span.start);
    for (idx, token) in tokens.iter().enumerate().filter(|(_, t)| t.unterminated) {
        diagnostics.push(
            Diagnostic::input_error(token.line, token.column, unterminated_message(token.kind))
                .with_solution(
                    "Add the missing closing delimiter; no rules were applied from this point on"
                )
        );
        mark_failed(&statements, &mut failed, idx);
    }

    let ctx = RuleContext {
        tokens: &tokens,
        source: script.dialect,
        target
    };
    let rules = registry.rules_for(script.dialect, target);
    let mut candidates = Vec::new();
    for (priority, rule) in rules.iter().enumerate() {
        match run_matcher(*rule, &ctx) {
            Ok(matches) => {
                candidates.extend(admit_matches(*rule, priority, matches, source_text, cutoff))
            }
            Err(reason) => {
                let id = rule.info().id;
                warn!(rule = id, %reason, "rule matcher failed; rule skipped");
                let (line, column) = statements
                    .first()
                    .and_then(|r| tokens.get(r.start))
                    .map_or((1, 1), |t| (t.line, t.column));
                diagnostics.push(Diagnostic {
                    rule: Some(id.into()),
                    line,
                    column,
                    message: format!("Rule '{}' failed: {}", id, reason),
                    severity: Severity::Error,
                    solution: Some(
                        "The rule was skipped for this script; review it manually".to_string()
                    )
                });
                failed[0] = true;
            }
        }
    }
    let accepted = resolve_overlaps(candidates);

    let mut edits: Vec<(Span, String)> = Vec::new();
    for candidate in &accepted {
        let info = candidate.rule.info();
        let matched = &candidate.matched;
        let diagnostic = match run_rewrite(candidate.rule, matched, &ctx) {
            Ok(rewrite) => {
                if let Some(text) = rewrite {
                    edits.push((matched.span, text));
                }
                let vars = TemplateVars {
                    source:   script.dialect,
                    target,
                    captures: &matched.captures
                };
                Diagnostic {
                    rule:     Some(info.id.into()),
                    line:     matched.line,
                    column:   matched.column,
                    message:  fill_template(info.message, &vars),
                    severity: registry.severity_of(&info),
                    solution: info.solution.map(|s| fill_template(s, &vars))
                }
            }
            Err(reason) => {
                warn!(rule = info.id, line = matched.line, %reason, "rule failed; span left unchanged");
                Diagnostic {
                    rule:     Some(info.id.into()),
                    line:     matched.line,
                    column:   matched.column,
                    message:  format!("Rule '{}' failed: {}", info.id, reason),
                    severity: Severity::Error,
                    solution: Some(
                        "Convert this construct manually; the original text was kept".to_string()
                    )
                }
            }
        };
        if diagnostic.severity == Severity::Error {
            mark_failed(&statements, &mut failed, matched.tokens.start);
        }
        diagnostics.push(diagnostic);
    }

    let target_text = apply_edits(source_text, edits);
    let success_count = failed.iter().filter(|f| !**f).count();
    ConversionResult::from_parts(target_text, diagnostics, success_count)
}

/// Turn one rule's matches into candidates, dropping unusable spans
fn admit_matches<'r>(
    rule: &'r dyn ConversionRule,
    priority: usize,
    matches: Vec<RuleMatch>,
    source: &str,
    cutoff: Option<usize>
) -> Vec<Candidate<'r>> {
    let mut candidates = Vec::with_capacity(matches.len());
    for matched in matches {
        let span = matched.span;
        if span.start > span.end
            || span.end > source.len()
            || !source.is_char_boundary(span.start)
            || !source.is_char_boundary(span.end)
        {
            warn!(
                rule = rule.info().id,
                start = span.start,
                end = span.end,
                "match with invalid span dropped"
            );
            continue;
        }
        if cutoff.is_some_and(|c| span.start >= c) {
            debug!(
                rule = rule.info().id,
                line = matched.line,
                "match after unterminated token skipped"
            );
            continue;
        }
        candidates.push(Candidate {
            priority,
            rule,
            matched
        });
    }
    candidates
}

/// Keep non-overlapping matches; result is in registry order, then position
fn resolve_overlaps(mut candidates: Vec<Candidate<'_>>) -> Vec<Candidate<'_>> {
    candidates.sort_by_key(|c| (c.matched.span.start, c.priority));
    let mut accepted: Vec<Candidate<'_>> = Vec::with_capacity(candidates.len());
    let mut last_end = 0;
    for candidate in candidates {
        if candidate.matched.span.start >= last_end {
            last_end = candidate.matched.span.end;
            accepted.push(candidate);
        } else {
            debug!(
                rule = candidate.rule.info().id,
                line = candidate.matched.line,
                "overlapping match dropped"
            );
        }
    }
    accepted.sort_by_key(|c| (c.priority, c.matched.span.start));
    accepted
}

/// Run a rule's matcher, turning panics into failures
fn run_matcher(
    rule: &dyn ConversionRule,
    ctx: &RuleContext<'_>
) -> Result<Vec<RuleMatch>, String> {
    catch_unwind(AssertUnwindSafe(|| rule.find_matches(ctx)))
        .map_err(|payload| format!("matcher panicked: {}", panic_message(payload.as_ref())))
}

/// Run a rule's rewrite, turning panics into failures
fn run_rewrite(
    rule: &dyn ConversionRule,
    matched: &RuleMatch,
    ctx: &RuleContext<'_>
) -> Result<Option<String>, String> {
    match catch_unwind(AssertUnwindSafe(|| rule.rewrite(matched, ctx))) {
        Ok(Ok(rewrite)) => Ok(rewrite),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(format!("rewrite panicked: {}", panic_message(payload.as_ref())))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn apply_edits(source: &str, mut edits: Vec<(Span, String)>) -> String {
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut text = source.to_string();
    for (span, replacement) in edits {
        text.replace_range(span.start..span.end, &replacement);
    }
    text
}

fn mark_failed(statements: &[Range<usize>], failed: &mut [bool], token_idx: usize) {
    if let Some(pos) = statements.iter().position(|r| r.contains(&token_idx)) {
        failed[pos] = true;
    }
}

fn unterminated_message(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::StringLiteral => "Unterminated string literal",
        TokenKind::DateLiteral => "Unterminated DATE literal",
        TokenKind::Identifier => "Unterminated quoted identifier",
        TokenKind::Comment => "Unterminated block comment",
        _ => "Unterminated token"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edits_descending() {
        let edits = vec![
            (Span::new(0, 3), "SELECT".to_string()),
            (Span::new(4, 5), "x".to_string()),
        ];
        assert_eq!(apply_edits("SEL a FROM t", edits), "SELECT x FROM t");
    }

    #[test]
    fn test_admit_matches_drops_invalid_spans() {
        let tokens = scan("SELECT 'é' FROM t");
        let rule = crate::rules::KeywordAbbreviation::SEL;
        let valid = RuleMatch::from_tokens(&tokens, 0..1, Default::default()).unwrap();
        let mut inside_char = valid.clone();
        inside_char.span = Span::new(8, 9);
        let mut past_end = valid.clone();
        past_end.span = Span::new(10, 100);

        let admitted =
            admit_matches(&rule, 0, vec![valid, inside_char, past_end], "SELECT 'é' FROM t", None);
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].matched.span, Span::new(0, 6));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
