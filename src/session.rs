//! Conversion results and batch aggregation.
//!
//! A [`ConversionResult`] is what one [`convert`](crate::engine::convert) call
//! hands back. [`aggregate`] folds many of them into a
//! [`ConversionSummary`] keyed by script id, and [`convert_batch`] runs a
//! whole set of scripts on a bounded [`rayon`] pool before reducing.

use indexmap::IndexMap;
use rayon::{ThreadPoolBuilder, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    diagnostics::{Diagnostic, Severity},
    dialect::Dialect,
    engine::convert,
    error::{AppResult, internal_error},
    rules::RuleRegistry,
    script::SourceScript
};

/// Output of converting one script.
///
/// Ownership passes entirely to the caller; the engine keeps nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub target_text:   String,
    pub diagnostics:   Vec<Diagnostic>,
    /// Statements converted without an error
    pub success_count: usize,
    pub warning_count: usize,
    pub error_count:   usize
}

impl ConversionResult {
    /// Build a result, counting diagnostics by severity
    pub fn from_parts(
        target_text: String,
        diagnostics: Vec<Diagnostic>,
        success_count: usize
    ) -> Self {
        let warning_count = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        let error_count = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        Self {
            target_text,
            diagnostics,
            success_count,
            warning_count,
            error_count
        }
    }

    /// Highest severity among the diagnostics
    pub fn max_severity(&self) -> Option<Severity> {
        self.diagnostics.iter().map(|d| d.severity).max()
    }
}

/// Totals over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    pub scripts:       usize,
    pub success_count: usize,
    pub warning_count: usize,
    pub error_count:   usize
}

/// Results of a batch, keyed by unique script id in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub results: IndexMap<String, ConversionResult>,
    pub totals:  SummaryTotals
}

impl ConversionSummary {
    /// Highest severity across all scripts
    pub fn max_severity(&self) -> Option<Severity> {
        self.results
            .values()
            .filter_map(ConversionResult::max_severity)
            .max()
    }
}

/// Fold per-script results into a summary.
///
/// Keys stay unique: a repeated id is stored as `id#2`, `id#3`, ...
///
/// # Example
///
/// ```
/// use sql_dialect_converter::session::{ConversionResult, aggregate};
///
/// let clean = ConversionResult::from_parts("SELECT 1".into(), vec![], 1);
/// let summary = aggregate(vec![
///     ("a.sql".to_string(), clean.clone()),
///     ("a.sql".to_string(), clean)
/// ]);
///
/// assert_eq!(summary.totals.scripts, 2);
/// assert!(summary.results.contains_key("a.sql#2"));
/// ```
pub fn aggregate(results: impl IntoIterator<Item = (String, ConversionResult)>) -> ConversionSummary {
    let mut summary = ConversionSummary::default();
    for (id, result) in results {
        summary.totals.scripts += 1;
        summary.totals.success_count += result.success_count;
        summary.totals.warning_count += result.warning_count;
        summary.totals.error_count += result.error_count;
        let key = unique_key(&summary.results, id);
        summary.results.insert(key, result);
    }
    summary
}

fn unique_key(results: &IndexMap<String, ConversionResult>, id: String) -> String {
    if !results.contains_key(&id) {
        return id;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}#{}", id, n);
        if !results.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Convert scripts in parallel on at most `workers` threads
pub fn convert_batch(
    scripts: &[SourceScript],
    target: Dialect,
    registry: &RuleRegistry,
    workers: usize
) -> AppResult<ConversionSummary> {
    convert_batch_with(scripts, target, registry, workers, |_| {})
}

/// Like [`convert_batch`], calling `on_converted` after each script
/// (from worker threads, in completion order).
pub fn convert_batch_with<F>(
    scripts: &[SourceScript],
    target: Dialect,
    registry: &RuleRegistry,
    workers: usize,
    on_converted: F
) -> AppResult<ConversionSummary>
where
    F: Fn(&SourceScript) + Sync
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .map_err(|e| internal_error(format!("Failed to start worker pool: {}", e)))?;
    info!(scripts = scripts.len(), workers = workers.max(1), %target, "converting batch");

    let results: Vec<(String, ConversionResult)> = pool.install(|| {
        scripts
            .par_iter()
            .enumerate()
            .map(|(idx, script)| {
                let result = convert(script, target, registry);
                on_converted(script);
                (script.id(idx), result)
            })
            .collect()
    });
    Ok(aggregate(results))
}
