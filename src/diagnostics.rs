//! Conversion diagnostics and their presentation.
//!
//! A [`Diagnostic`] is produced for every rule application, rule failure and
//! input problem found during a conversion. Its line always points into the
//! *source* script. This module also holds the pure helpers the reporter
//! needs: [`fill_template`] renders rule message templates, and [`to_issue`]
//! turns a diagnostic into a [`DisplayableIssue`] ready for output.

use std::{fmt, sync::LazyLock};

use compact_str::CompactString;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

/// Placeholders in rule templates: `{source}`, `{target}`, `{1}`, `{2}`, ...
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z]+|[0-9]+)\}").expect("valid regex"));

/// Severity level of a diagnostic.
///
/// Ordered from lowest to highest severity for sorting purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Converted, but the result should be reviewed
    Warning,
    /// No faithful conversion; manual work required
    Error
}

impl Severity {
    /// Short label used in text output
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "WARN",
            Self::Error => "ERROR"
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.pad("warning"),
            Self::Error => f.pad("error")
        }
    }
}

/// One issue found while converting a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Id of the rule that produced it; `None` for input problems
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule:     Option<CompactString>,
    /// 1-based line in the source script
    pub line:     usize,
    /// 1-based column in the source script
    pub column:   usize,
    pub message:  String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>
}

impl Diagnostic {
    /// Error-level diagnostic for a problem with the input itself
    pub fn input_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            rule: None,
            line,
            column,
            message: message.into(),
            severity: Severity::Error,
            solution: None
        }
    }

    pub fn with_solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = Some(solution.into());
        self
    }
}

/// Values available to a rule's message and solution templates
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub source:   Dialect,
    pub target:   Dialect,
    pub captures: &'a [CompactString]
}

/// Fill `{source}`, `{target}` and positional `{n}` placeholders.
///
/// Captures are 1-based. Unknown placeholders are left untouched.
///
/// # Example
///
/// ```
/// use compact_str::CompactString;
/// use sql_dialect_converter::{
///     diagnostics::{TemplateVars, fill_template},
///     dialect::Dialect
/// };
///
/// let captures = [CompactString::from("SEL")];
/// let vars = TemplateVars {
///     source:   Dialect::Teradata,
///     target:   Dialect::Db2,
///     captures: &captures
/// };
/// assert_eq!(
///     fill_template("{1} is not supported in {target}", &vars),
///     "SEL is not supported in Db2"
/// );
/// ```
pub fn fill_template(template: &str, vars: &TemplateVars<'_>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            match key {
                "source" => vars.source.display_name().to_string(),
                "target" => vars.target.display_name().to_string(),
                _ => key
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|n| vars.captures.get(n))
                    .map_or_else(|| caps[0].to_string(), |c| c.to_string())
            }
        })
        .into_owned()
}

/// A diagnostic formatted for people
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayableIssue {
    pub label:    &'static str,
    pub location: String,
    pub rule:     Option<String>,
    pub message:  String,
    pub solution: Option<String>
}

impl fmt::Display for DisplayableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.label, self.location)?;
        if let Some(rule) = &self.rule {
            write!(f, " ({})", rule)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(solution) = &self.solution {
            write!(f, "\n  -> {}", solution)?;
        }
        Ok(())
    }
}

/// Format a diagnostic for display
pub fn to_issue(diagnostic: &Diagnostic) -> DisplayableIssue {
    DisplayableIssue {
        label:    diagnostic.severity.label(),
        location: format!("line {}, column {}", diagnostic.line, diagnostic.column),
        rule:     diagnostic.rule.as_ref().map(|r| r.to_string()),
        message:  diagnostic.message.clone(),
        solution: diagnostic.solution.clone()
    }
}
