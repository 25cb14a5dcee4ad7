use smallvec::smallvec;

use super::{
    ConversionRule, NON_TERADATA, RewriteError, RuleContext, RuleInfo, RuleMatch,
    TERADATA_SOURCES
};
use crate::{diagnostics::Severity, scanner::TokenKind};

/// Teradata keyword abbreviation at the start of a statement (`SEL`, `INS`,
/// `UPD`, `DEL`), expanded to the full keyword.
pub struct KeywordAbbreviation {
    id:       &'static str,
    name:     &'static str,
    short:    &'static str,
    full:     &'static str,
    message:  &'static str,
    solution: &'static str
}

impl KeywordAbbreviation {
    pub const SEL: Self = Self {
        id:       "sel-abbrev",
        name:     "SEL abbreviation",
        short:    "SEL",
        full:     "SELECT",
        message:  "{1} abbreviation is not supported in {target}, changed to SELECT",
        solution: "Check that the SELECT statement is correctly formatted"
    };
    pub const INS: Self = Self {
        id:       "ins-abbrev",
        name:     "INS abbreviation",
        short:    "INS",
        full:     "INSERT",
        message:  "{1} abbreviation is not supported in {target}, changed to INSERT",
        solution: "Check that the INSERT statement is correctly formatted"
    };
    pub const UPD: Self = Self {
        id:       "upd-abbrev",
        name:     "UPD abbreviation",
        short:    "UPD",
        full:     "UPDATE",
        message:  "{1} abbreviation is not supported in {target}, changed to UPDATE",
        solution: "Check that the UPDATE statement is correctly formatted"
    };
    pub const DEL: Self = Self {
        id:       "del-abbrev",
        name:     "DEL abbreviation",
        short:    "DEL",
        full:     "DELETE",
        message:  "{1} abbreviation is not supported in {target}, changed to DELETE",
        solution: "Check that the DELETE statement is correctly formatted"
    };
}

impl ConversionRule for KeywordAbbreviation {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       self.id,
            name:     self.name,
            severity: Severity::Warning,
            sources:  TERADATA_SOURCES,
            targets:  NON_TERADATA,
            message:  self.message,
            solution: Some(self.solution)
        }
    }

    fn find_matches(&self, ctx: &RuleContext<'_>) -> Vec<RuleMatch> {
        let tokens = ctx.tokens;
        (0..tokens.len())
            .filter(|&idx| {
                tokens.is_keyword(idx, self.short)
                    && tokens.starts_statement(idx)
                    && tokens.kind(idx + 1) == Some(TokenKind::Whitespace)
            })
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
        Ok(Some(self.full.to_string()))
    }
}
