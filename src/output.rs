use colored::Colorize;
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    diagnostics::{Diagnostic, Severity, to_issue},
    dialect::Dialect,
    probe::ConnectionResult,
    rules::{ConversionRule, RuleRegistry},
    session::{ConversionResult, ConversionSummary},
    validate::ValidationFinding
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:         OutputFormat,
    pub colored:        bool,
    pub verbose:        bool,
    /// Print converted SQL in text output
    pub include_target: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:         OutputFormat::Text,
            colored:        true,
            verbose:        false,
            include_target: true
        }
    }
}

/// Batch result for serialization
#[derive(Debug, Serialize)]
pub struct ConversionReport<'a> {
    #[serde(flatten)]
    pub summary:    &'a ConversionSummary,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub validation: &'a IndexMap<String, ValidationFinding>
}

/// Rule metadata for listings
#[derive(Debug, Serialize)]
pub struct RuleListing {
    pub id:       &'static str,
    pub name:     &'static str,
    pub severity: Severity,
    pub sources:  &'static [Dialect],
    pub targets:  &'static [Dialect]
}

fn paint(text: &str, opts: &OutputOptions, style: impl Fn(&str) -> String) -> String {
    if opts.colored {
        style(text)
    } else {
        text.to_string()
    }
}

/// Format conversion results of one or more scripts
pub fn format_summary(
    summary: &ConversionSummary,
    validation: &IndexMap<String, ValidationFinding>,
    opts: &OutputOptions
) -> String {
    let report = ConversionReport {
        summary,
        validation
    };
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&report).unwrap_or_default(),
        OutputFormat::Text => format_text_summary(summary, validation, opts)
    }
}

fn format_text_summary(
    summary: &ConversionSummary,
    validation: &IndexMap<String, ValidationFinding>,
    opts: &OutputOptions
) -> String {
    let mut output = String::new();
    for (id, result) in &summary.results {
        output.push_str(&format_text_result(id, result, validation.get(id), opts));
        output.push('\n');
    }

    let totals = summary.totals;
    let line = format!(
        "Summary: {} script(s), {} statement(s) converted, {} warning(s), {} error(s)",
        totals.scripts, totals.success_count, totals.warning_count, totals.error_count
    );
    let line = if totals.error_count > 0 {
        paint(&line, opts, |s| s.red().bold().to_string())
    } else if totals.warning_count > 0 {
        paint(&line, opts, |s| s.yellow().bold().to_string())
    } else {
        paint(&line, opts, |s| s.green().bold().to_string())
    };
    output.push_str(&line);
    output.push('\n');
    output
}

fn format_text_result(
    id: &str,
    result: &ConversionResult,
    finding: Option<&ValidationFinding>,
    opts: &OutputOptions
) -> String {
    let mut text = String::new();
    let header = format!("=== {} ===", id);
    text.push_str(&paint(&header, opts, |s| s.cyan().bold().to_string()));
    text.push('\n');

    if opts.include_target {
        text.push_str(&result.target_text);
        if !result.target_text.ends_with('\n') {
            text.push('\n');
        }
        text.push('\n');
    }

    if result.diagnostics.is_empty() {
        text.push_str(&paint("No issues found", opts, |s| s.green().to_string()));
        text.push('\n');
    } else {
        text.push_str(&format!("Issues ({}):\n", result.diagnostics.len()));
        for diagnostic in &result.diagnostics {
            text.push_str(&format_diagnostic(diagnostic, opts));
        }
    }

    if let Some(finding) = finding {
        let note = format!("Validation: converted SQL does not parse {}", finding);
        text.push_str(&paint(&note, opts, |s| s.yellow().to_string()));
        text.push('\n');
    }

    if opts.verbose {
        text.push_str(&format!(
            "Statements converted: {}, warnings: {}, errors: {}\n",
            result.success_count, result.warning_count, result.error_count
        ));
    }
    text
}

fn format_diagnostic(diagnostic: &Diagnostic, opts: &OutputOptions) -> String {
    let issue = to_issue(diagnostic);
    let label = format!("[{}]", issue.label);
    let label = match diagnostic.severity {
        Severity::Error => paint(&label, opts, |s| s.red().bold().to_string()),
        Severity::Warning => paint(&label, opts, |s| s.yellow().bold().to_string())
    };
    let mut line = format!("  {} {}", label, issue.location);
    if let Some(rule) = &issue.rule {
        line.push_str(&format!(" ({})", rule));
    }
    line.push_str(&format!(": {}\n", issue.message));
    if let Some(solution) = &issue.solution {
        line.push_str(&format!("      -> {}\n", solution));
    }
    line
}

/// Format the rules applicable to a conversion
pub fn format_rules(
    rules: &[&dyn ConversionRule],
    registry: &RuleRegistry,
    opts: &OutputOptions
) -> String {
    let listings: Vec<RuleListing> = rules
        .iter()
        .map(|rule| {
            let info = rule.info();
            RuleListing {
                id:       info.id,
                name:     info.name,
                severity: registry.severity_of(&info),
                sources:  info.sources,
                targets:  info.targets
            }
        })
        .collect();
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&listings).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&listings).unwrap_or_default(),
        OutputFormat::Text => {
            let mut output = String::from("Conversion rules (in priority order):\n\n");
            for listing in &listings {
                let id = format!("{:<22}", listing.id);
                output.push_str(&format!(
                    "  {} {:<8} {}\n",
                    paint(&id, opts, |s| s.cyan().to_string()),
                    listing.severity,
                    listing.name
                ));
            }
            if listings.is_empty() {
                output.push_str("  (none)\n");
            }
            output
        }
    }
}

/// Format a connection test outcome
pub fn format_connection_result(name: &str, result: &ConnectionResult, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(result).unwrap_or_default(),
        OutputFormat::Text => {
            if result.success {
                paint(&format!("Connection to {} succeeded", name), opts, |s| {
                    s.green().to_string()
                })
            } else {
                let reason = result.message.as_deref().unwrap_or("unknown error");
                paint(&format!("Connection to {} failed: {}", name, reason), opts, |s| {
                    s.red().to_string()
                })
            }
        }
    }
}
