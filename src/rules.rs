//! Dialect conversion rules and the rule registry.
//!
//! A rule locates one kind of source-dialect construct in the token stream of
//! a script and describes how to express it in the target dialect. Rules are
//! types implementing [`ConversionRule`]; the [`RuleRegistry`] holds them in
//! a fixed priority order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   Tokens    │────▶│    Engine    │────▶│   Result    │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                            │
//!                     ┌──────┴──────┐
//!                     │  Registry   │
//!                     │  (ordered)  │
//!                     └─────────────┘
//! ```
//!
//! # Built-in Rules
//!
//! | ID | Trigger | Rewrite |
//! |----|---------|---------|
//! | `sel-abbrev` | statement starts with `SEL` | `SELECT` |
//! | `ins-abbrev` | statement starts with `INS` | `INSERT` |
//! | `upd-abbrev` | statement starts with `UPD` | `UPDATE` |
//! | `del-abbrev` | statement starts with `DEL` | `DELETE` |
//! | `date-literal` | `DATE '2024-01-01'` | `DATE('2024-01-01')` |
//! | `qualify-rownum` | `QUALIFY ROW_NUMBER() OVER (...) = 1` | `NOT EXISTS` subquery |
//! | `qualify-unsupported` | any other `QUALIFY` | none |
//! | `schema-qualify-hint` | `schema.table` reference | none |
//!
//! # Configuration
//!
//! Rules can be disabled or have their severity modified via [`RulesConfig`]:
//!
//! ```toml
//! [rules]
//! disabled = ["schema-qualify-hint"]
//!
//! [rules.severity]
//! date-literal = "error"
//! ```
//!
//! # Implementing Custom Rules
//!
//! ```
//! use sql_dialect_converter::{
//!     diagnostics::Severity,
//!     dialect::Dialect,
//!     rules::{ConversionRule, RewriteError, RuleContext, RuleInfo, RuleMatch}
//! };
//!
//! pub struct NvlToCoalesce;
//!
//! impl ConversionRule for NvlToCoalesce {
//!     fn info(&self) -> RuleInfo {
//!         RuleInfo {
//!             id:       "nvl-coalesce",
//!             name:     "NVL function",
//!             severity: Severity::Warning,
//!             sources:  &[Dialect::Oracle],
//!             targets:  &[Dialect::PostgreSql],
//!             message:  "NVL is not available in {target}, changed to COALESCE",
//!             solution: None
//!         }
//!     }
//!
//!     fn find_matches(&self, ctx: &RuleContext<'_>) -> Vec<RuleMatch> {
//!         let tokens = ctx.tokens;
//!         (0..tokens.len())
//!             .filter(|&i| tokens.is_word(i, "NVL"))
//!             .filter_map(|i| RuleMatch::from_tokens(tokens, i..i + 1, Default::default()))
//!             .collect()
//!     }
//!
//!     fn rewrite(
//!         &self,
//!         _matched: &RuleMatch,
//!         _ctx: &RuleContext<'_>
//!     ) -> Result<Option<String>, RewriteError> {
//!         Ok(Some("COALESCE".into()))
//!     }
//! }
//! ```

mod abbreviation;
mod advisory;
mod literal;
mod qualify;
mod types;

use std::collections::{HashMap, HashSet};

pub use abbreviation::KeywordAbbreviation;
pub use advisory::SchemaQualifiedTable;
pub use literal::DateLiteral;
pub use qualify::{QualifyRowNumber, QualifyUnsupported};
use tracing::debug;
pub use types::{Captures, RewriteError, RuleContext, RuleInfo, RuleMatch};

use crate::{
    config::RulesConfig,
    diagnostics::Severity,
    dialect::Dialect,
    error::{AppResult, config_error, registry_error}
};

/// Source dialects of the Teradata rules; `other` follows Teradata syntax
pub(crate) const TERADATA_SOURCES: &[Dialect] = &[Dialect::Teradata, Dialect::Other];

/// Every target dialect except Teradata itself
pub(crate) const NON_TERADATA: &[Dialect] = &[
    Dialect::Oracle,
    Dialect::SqlServer,
    Dialect::PostgreSql,
    Dialect::MySql,
    Dialect::Db2,
    Dialect::Other
];

/// Trait for implementing dialect conversion rules.
///
/// Rules are stateless. Matching must be side-effect free and may only look at
/// the token stream it is given; it always sees the original script, never a
/// partially rewritten one. Rules must be `Send + Sync` so one registry can
/// serve parallel conversions.
pub trait ConversionRule: Send + Sync {
    /// Returns metadata about this rule.
    fn info(&self) -> RuleInfo;

    /// Locates every construct this rule handles.
    fn find_matches(&self, ctx: &RuleContext<'_>) -> Vec<RuleMatch>;

    /// Produces the target-dialect text for a match.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(text))` - replace the matched span with `text`
    /// - `Ok(None)` - advisory rule, leave the span as written
    /// - `Err(_)` - the construct cannot be converted; reported as an error
    fn rewrite(
        &self,
        matched: &RuleMatch,
        ctx: &RuleContext<'_>
    ) -> Result<Option<String>, RewriteError>;
}

/// Built-in rules in priority order
pub fn builtin_rules() -> Vec<Box<dyn ConversionRule>> {
    vec![
        Box::new(KeywordAbbreviation::SEL),
        Box::new(KeywordAbbreviation::INS),
        Box::new(KeywordAbbreviation::UPD),
        Box::new(KeywordAbbreviation::DEL),
        Box::new(DateLiteral),
        Box::new(QualifyRowNumber),
        Box::new(QualifyUnsupported),
        Box::new(SchemaQualifiedTable),
    ]
}

/// Ordered, read-only collection of conversion rules.
///
/// Built once at startup and shared by reference; every configuration
/// problem surfaces while building it.
///
/// # Example
///
/// ```
/// use sql_dialect_converter::{dialect::Dialect, rules::RuleRegistry};
///
/// let registry = RuleRegistry::new().unwrap();
/// let ids: Vec<_> = registry
///     .rules_for(Dialect::Teradata, Dialect::Db2)
///     .iter()
///     .map(|r| r.info().id)
///     .collect();
/// assert_eq!(ids.first(), Some(&"sel-abbrev"));
/// ```
pub struct RuleRegistry {
    rules:          Vec<Box<dyn ConversionRule>>,
    severity_cache: HashMap<&'static str, Severity>
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.ids())
            .field("severity_cache", &self.severity_cache)
            .finish()
    }
}

impl RuleRegistry {
    /// Registry with all built-in rules
    pub fn new() -> AppResult<Self> {
        Self::with_config(&RulesConfig::default())
    }

    /// Built-in rules filtered and adjusted by configuration
    pub fn with_config(config: &RulesConfig) -> AppResult<Self> {
        Self::with_rules_and_config(builtin_rules(), config)
    }

    /// Registry over an explicit rule list, in the given order
    pub fn from_rules(rules: Vec<Box<dyn ConversionRule>>) -> AppResult<Self> {
        Self::with_rules_and_config(rules, &RulesConfig::default())
    }

    /// Validate `rules`, then apply `config`.
    ///
    /// # Errors
    ///
    /// Fails on duplicate or malformed rule ids, rules without dialects,
    /// unknown rule ids in `config` and unknown severity names.
    pub fn with_rules_and_config(
        rules: Vec<Box<dyn ConversionRule>>,
        config: &RulesConfig
    ) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            let info = rule.info();
            if !is_kebab_case(info.id) {
                return Err(registry_error(info.id, "rule id must be kebab-case"));
            }
            if info.sources.is_empty() || info.targets.is_empty() {
                return Err(registry_error(
                    info.id,
                    "rule must apply to at least one source and one target dialect"
                ));
            }
            if !seen.insert(info.id) {
                return Err(registry_error(info.id, "duplicate rule id"));
            }
        }

        let known = |id: &str| rules.iter().find(|r| r.info().id.eq_ignore_ascii_case(id));
        for id in &config.disabled {
            if known(id).is_none() {
                return Err(config_error(format!("Unknown rule '{}' in rules.disabled", id)));
            }
        }
        let mut severity_cache = HashMap::new();
        for (id, sev_str) in &config.severity {
            let rule = known(id).ok_or_else(|| {
                config_error(format!("Unknown rule '{}' in rules.severity", id))
            })?;
            let severity = parse_severity(sev_str).ok_or_else(|| {
                config_error(format!(
                    "Invalid severity '{}' for rule '{}' (expected \"warning\" or \"error\")",
                    sev_str, id
                ))
            })?;
            severity_cache.insert(rule.info().id, severity);
        }

        let rules: Vec<Box<dyn ConversionRule>> = rules
            .into_iter()
            .filter(|r| {
                let disabled = config
                    .disabled
                    .iter()
                    .any(|d| d.eq_ignore_ascii_case(r.info().id));
                if disabled {
                    debug!(rule = r.info().id, "rule disabled by configuration");
                }
                !disabled
            })
            .collect();
        Ok(Self {
            rules,
            severity_cache
        })
    }

    /// Rules applicable to a conversion, in priority order
    pub fn rules_for(&self, source: Dialect, target: Dialect) -> Vec<&dyn ConversionRule> {
        self.rules
            .iter()
            .map(|r| r.as_ref())
            .filter(|r| r.info().applies_to(source, target))
            .collect()
    }

    /// All registered rules, in priority order
    pub fn rules(&self) -> impl Iterator<Item = &dyn ConversionRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.info().id).collect()
    }

    /// Effective severity of a rule after configuration overrides
    pub fn severity_of(&self, info: &RuleInfo) -> Severity {
        self.severity_cache
            .get(info.id)
            .copied()
            .unwrap_or(info.severity)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parse severity string to enum
fn parse_severity(s: &str) -> Option<Severity> {
    match s.to_lowercase().as_str() {
        "error" => Some(Severity::Error),
        "warning" | "warn" => Some(Severity::Warning),
        _ => None
    }
}

fn is_kebab_case(id: &str) -> bool {
    !id.is_empty()
        && id.starts_with(|c: char| c.is_ascii_lowercase())
        && !id.ends_with('-')
        && !id.contains("--")
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case() {
        assert!(is_kebab_case("sel-abbrev"));
        assert!(is_kebab_case("rule2"));
        assert!(!is_kebab_case("Sel-Abbrev"));
        assert!(!is_kebab_case("sel--abbrev"));
        assert!(!is_kebab_case("-sel"));
        assert!(!is_kebab_case(""));
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(parse_severity("ERROR"), Some(Severity::Error));
        assert_eq!(parse_severity("warn"), Some(Severity::Warning));
        assert_eq!(parse_severity("info"), None);
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let registry = RuleRegistry::new().unwrap();
        assert_eq!(registry.len(), builtin_rules().len());
    }
}
