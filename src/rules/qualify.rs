//! Teradata `QUALIFY` clause handling.
//!
//! `QUALIFY ROW_NUMBER() OVER (PARTITION BY p ORDER BY o) = 1` keeps the first
//! row of every partition. Targets without `QUALIFY` get the same filter as a
//! correlated `NOT EXISTS` subquery in place of the clause:
//!
//! ```sql
//! WHERE NOT EXISTS (
//!     SELECT 1
//!     FROM orders q2
//!     WHERE (q2.customer_id = o.customer_id OR (q2.customer_id IS NULL AND o.customer_id IS NULL))
//!       AND (q2.order_date > o.order_date OR (q2.order_date IS NOT NULL AND o.order_date IS NULL))
//! )
//! ```
//!
//! NULL partition keys form one partition and NULL sorts lowest. The rewrite
//! is only attempted for a single-table query without WHERE, GROUP BY or
//! HAVING, whose window columns belong to that table; anything else fails and
//! the clause is kept. Any other `QUALIFY` form is reported without a rewrite.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;
use smallvec::smallvec;

use super::{
    ConversionRule, NON_TERADATA, RewriteError, RuleContext, RuleInfo, RuleMatch,
    TERADATA_SOURCES
};
use crate::{
    diagnostics::Severity,
    scanner::{TokenKind, TokenStream}
};

/// Regex for a plain, optionally qualified column with an optional direction.
/// Captures the qualifier (with its trailing dot), the column and `ASC`/`DESC`.
static ORDER_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^((?:[a-z_][\w$#]*\.)*)([a-z_][\w$#]*)(?:\s+(asc|desc))?$")
        .expect("valid regex")
});

/// `QUALIFY ROW_NUMBER() OVER (PARTITION BY .. ORDER BY ..) = 1`
pub struct QualifyRowNumber;

impl ConversionRule for QualifyRowNumber {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "qualify-rownum",
            name:     "QUALIFY ROW_NUMBER() = 1",
            severity: Severity::Error,
            sources:  TERADATA_SOURCES,
            targets:  NON_TERADATA,
            message:  "QUALIFY clause is not supported in {target}, converted to an equivalent NOT EXISTS subquery over PARTITION BY {1}",
            solution: Some(
                "Verify the generated subquery keeps one row per {1}: rows tied on ORDER BY {2} are all kept, so add a unique column to the ordering if needed"
            )
        }
    }

    fn find_matches(&self, ctx: &RuleContext<'_>) -> Vec<RuleMatch> {
        let tokens = ctx.tokens;
        (0..tokens.len())
            .filter(|&idx| tokens.is_keyword(idx, "QUALIFY"))
            .filter_map(|idx| match_row_number_filter(tokens, idx))
            .collect()
    }

    fn rewrite(
        &self,
        matched: &RuleMatch,
        ctx: &RuleContext<'_>
    ) -> Result<Option<String>, RewriteError> {
        let tokens = ctx.tokens;
        let (Some(partition), Some(order)) = (matched.captures.first(), matched.captures.get(1))
        else {
            return Err(RewriteError::new("match is missing PARTITION BY/ORDER BY captures"));
        };
        let statement = tokens
            .statement_at(matched.tokens.start)
            .ok_or_else(|| RewriteError::new("QUALIFY is not inside a statement"))?;
        let outer = OuterQuery::locate(tokens, statement.start..matched.tokens.start)?;

        let partition_cols = split_top_level(partition)
            .into_iter()
            .map(|expr| -> Result<String, RewriteError> {
                match plain_column(expr, &outer, "partition")? {
                    (column, None) => Ok(column.to_string()),
                    (_, Some(_)) => Err(RewriteError::new(format!(
                        "partition expression `{}` is not a plain column",
                        expr
                    )))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        let order_cols = split_top_level(order)
            .into_iter()
            .map(|expr| -> Result<(String, bool), RewriteError> {
                let (column, direction) = plain_column(expr, &outer, "ORDER BY")?;
                let descending = direction.is_some_and(|d| d.eq_ignore_ascii_case("desc"));
                Ok((column.to_string(), descending))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let corr = if outer.alias.eq_ignore_ascii_case("q2") { "q3" } else { "q2" };

        let mut sql = format!(
            "WHERE NOT EXISTS (\n    SELECT 1\n    FROM {} {}\n    WHERE ",
            outer.table, corr
        );
        let correlation: Vec<String> = partition_cols
            .iter()
            .map(|c| null_safe_eq(c, corr, &outer.alias))
            .collect();
        sql.push_str(&correlation.join("\n      AND "));
        sql.push_str(&format!(
            "\n      AND ({})\n)",
            precedes(&order_cols, corr, &outer.alias)
        ));
        Ok(Some(sql))
    }
}

/// Any `QUALIFY` clause that has no automatic conversion
pub struct QualifyUnsupported;

impl ConversionRule for QualifyUnsupported {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "qualify-unsupported",
            name:     "Unconvertible QUALIFY",
            severity: Severity::Error,
            sources:  TERADATA_SOURCES,
            targets:  NON_TERADATA,
            message:  "QUALIFY clause is not supported in {target} and could not be converted automatically",
            solution: Some(
                "Move the window function into a derived table and filter on its alias in the outer WHERE clause"
            )
        }
    }

    fn find_matches(&self, ctx: &RuleContext<'_>) -> Vec<RuleMatch> {
        let tokens = ctx.tokens;
        (0..tokens.len())
            .filter(|&idx| tokens.is_keyword(idx, "QUALIFY"))
            .filter_map(|idx| {
                RuleMatch::from_tokens(tokens, idx..idx + 1, smallvec![tokens.text(idx).into()])
            })
            .collect()
    }

    fn rewrite(
        &self,
        _matched: &RuleMatch,
        _ctx: &RuleContext<'_>
    ) -> Result<Option<String>, RewriteError> {
        Ok(None)
    }
}

/// Match the `ROW_NUMBER() ... = 1` form starting at the QUALIFY keyword
fn match_row_number_filter(tokens: &TokenStream<'_>, qualify: usize) -> Option<RuleMatch> {
    let row_number = tokens.next_significant(qualify)?;
    if !tokens.is_word(row_number, "ROW_NUMBER") {
        return None;
    }
    let open = tokens.next_significant(row_number)?;
    let close = tokens.next_significant(open)?;
    if !tokens.is_punct(open, "(") || !tokens.is_punct(close, ")") {
        return None;
    }
    let over = tokens.next_significant(close)?;
    if !tokens.is_keyword(over, "OVER") {
        return None;
    }
    let window_open = tokens.next_significant(over)?;
    let window_close = tokens.matching_paren(window_open)?;
    let partition = tokens.next_significant(window_open)?;
    let partition_by = tokens.next_significant(partition)?;
    if !tokens.is_keyword(partition, "PARTITION") || !tokens.is_keyword(partition_by, "BY") {
        return None;
    }
    let order = find_top_level_order(tokens, partition_by + 1..window_close)?;
    let order_by = tokens.next_significant(order)?;
    if !tokens.is_keyword(order_by, "BY") || order_by >= window_close {
        return None;
    }
    let eq = tokens.next_significant(window_close)?;
    let one = tokens.next_significant(eq)?;
    if tokens.kind(eq) != Some(TokenKind::Operator)
        || tokens.text(eq) != "="
        || tokens.kind(one) != Some(TokenKind::Number)
        || tokens.text(one) != "1"
    {
        return None;
    }
    let partition_expr = tokens.slice(partition_by + 1..order).trim();
    let order_expr = tokens.slice(order_by + 1..window_close).trim();
    if partition_expr.is_empty() || order_expr.is_empty() {
        return None;
    }
    RuleMatch::from_tokens(
        tokens,
        qualify..one + 1,
        smallvec![partition_expr.into(), order_expr.into()]
    )
}

/// First `ORDER` keyword at parenthesis depth zero within `range`
fn find_top_level_order(tokens: &TokenStream<'_>, range: Range<usize>) -> Option<usize> {
    let mut depth = 0usize;
    for idx in range {
        if tokens.is_punct(idx, "(") {
            depth += 1;
        } else if tokens.is_punct(idx, ")") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && tokens.is_keyword(idx, "ORDER") {
            return Some(idx);
        }
    }
    None
}

/// The query the QUALIFY clause filters
struct OuterQuery {
    table: String,
    /// Alias, or the table as written when there is none
    alias: String
}

impl OuterQuery {
    /// Inspect the top-level clauses preceding QUALIFY.
    ///
    /// Only `SELECT .. FROM <table> [[AS] alias] QUALIFY ..` is accepted: a
    /// WHERE clause or a join filters the rows QUALIFY ranks, which a
    /// subquery over the base table cannot reproduce.
    fn locate(tokens: &TokenStream<'_>, range: Range<usize>) -> Result<Self, RewriteError> {
        let end = range.end;
        let mut depth = 0usize;
        let mut from = None;
        for idx in range {
            if tokens.is_punct(idx, "(") {
                depth += 1;
            } else if tokens.is_punct(idx, ")") {
                depth = depth.saturating_sub(1);
            } else if depth == 0 {
                if from.is_none() && tokens.is_keyword(idx, "FROM") {
                    from = Some(idx);
                } else if tokens.is_keyword(idx, "WHERE") {
                    return Err(RewriteError::new(
                        "QUALIFY ranks rows after WHERE, which a correlated subquery over the base table cannot reproduce"
                    ));
                } else if tokens.is_keyword(idx, "GROUP") || tokens.is_keyword(idx, "HAVING") {
                    return Err(RewriteError::new(
                        "QUALIFY follows GROUP BY/HAVING, so it cannot be folded into WHERE"
                    ));
                } else if from.is_some()
                    && (tokens.is_keyword(idx, "JOIN") || tokens.is_punct(idx, ","))
                {
                    return Err(RewriteError::new(
                        "QUALIFY over a join cannot be rewritten against a single table"
                    ));
                }
            }
        }
        let from = from.ok_or_else(|| RewriteError::new("statement has no FROM clause"))?;

        let first = tokens
            .next_significant(from)
            .filter(|&i| tokens.kind(i) == Some(TokenKind::Identifier))
            .ok_or_else(|| RewriteError::new("FROM clause does not start with a table name"))?;
        let mut last = first;
        while let Some(dot) = tokens.next_significant(last).filter(|&i| tokens.is_punct(i, "."))
        {
            match tokens
                .next_significant(dot)
                .filter(|&i| tokens.kind(i) == Some(TokenKind::Identifier))
            {
                Some(part) => last = part,
                None => break
            }
        }
        let table = tokens.slice(first..last + 1).to_string();

        let mut next = tokens.next_significant(last);
        if next.is_some_and(|i| tokens.is_keyword(i, "AS")) {
            next = next.and_then(|i| tokens.next_significant(i));
        }
        let (alias, after) = match next.filter(|&i| tokens.kind(i) == Some(TokenKind::Identifier)) {
            Some(i) => (tokens.text(i).to_string(), tokens.next_significant(i)),
            None => (table.clone(), next)
        };
        if let Some(extra) = after.filter(|&i| i < end) {
            return Err(RewriteError::new(format!(
                "unexpected `{}` after the FROM table",
                tokens.text(extra)
            )));
        }

        Ok(Self {
            table,
            alias
        })
    }

    /// Whether a column qualifier (`o`, `sales.orders`) names this table
    fn owns(&self, qualifier: &str) -> bool {
        qualifier.is_empty()
            || qualifier.eq_ignore_ascii_case(&self.alias)
            || qualifier.eq_ignore_ascii_case(&self.table)
    }
}

/// Parse `[qualifier.]column [ASC|DESC]`, requiring the qualifier to name the outer table
fn plain_column<'e>(
    expr: &'e str,
    outer: &OuterQuery,
    clause: &str
) -> Result<(&'e str, Option<&'e str>), RewriteError> {
    let caps = ORDER_ITEM_REGEX.captures(expr).ok_or_else(|| {
        RewriteError::new(format!("{} expression `{}` is not a plain column", clause, expr))
    })?;
    let qualifier = caps.get(1).map_or("", |m| m.as_str().trim_end_matches('.'));
    if !outer.owns(qualifier) {
        return Err(RewriteError::new(format!(
            "{} column `{}` does not belong to `{}`",
            clause, expr, outer.table
        )));
    }
    let column = caps.get(2).map_or("", |m| m.as_str());
    Ok((column, caps.get(3).map(|m| m.as_str())))
}

/// `a = b`, treating two NULLs as equal the way PARTITION BY groups them
fn null_safe_eq(col: &str, corr: &str, outer: &str) -> String {
    format!("({corr}.{col} = {outer}.{col} OR ({corr}.{col} IS NULL AND {outer}.{col} IS NULL))")
}

/// True when the correlated row sorts first on `col`; NULL sorts lowest
fn sorts_first(col: &str, descending: bool, corr: &str, outer: &str) -> String {
    if descending {
        format!("{corr}.{col} > {outer}.{col} OR ({corr}.{col} IS NOT NULL AND {outer}.{col} IS NULL)")
    } else {
        format!("{corr}.{col} < {outer}.{col} OR ({corr}.{col} IS NULL AND {outer}.{col} IS NOT NULL)")
    }
}

/// Predicate true when the correlated row sorts before the outer row
fn precedes(order_cols: &[(String, bool)], corr: &str, outer: &str) -> String {
    let mut terms = Vec::with_capacity(order_cols.len());
    for (pos, (col, descending)) in order_cols.iter().enumerate() {
        let first = sorts_first(col, *descending, corr, outer);
        if pos == 0 {
            terms.push(first);
            continue;
        }
        let mut parts: Vec<String> = order_cols[..pos]
            .iter()
            .map(|(prev, _)| null_safe_eq(prev, corr, outer))
            .collect();
        parts.push(format!("({})", first));
        terms.push(format!("({})", parts.join(" AND ")));
    }
    terms.join(" OR ")
}

/// Split on commas outside parentheses
fn split_top_level(expr: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(expr[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(expr[start..].trim());
    parts
}
