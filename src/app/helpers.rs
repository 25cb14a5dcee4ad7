//! Helper functions for CLI operations.
//!
//! Reading scripts, resolving dialects and worker counts, exporting
//! converted text and computing exit codes.

use std::{
    fs::{create_dir_all, read_to_string, write},
    io::{self, Read},
    path::{Path, PathBuf},
    thread::available_parallelism
};

use tracing::debug;

use super::convert::convert_format;
use crate::{
    cli::Format,
    config::Config,
    diagnostics::Severity,
    dialect::Dialect,
    error::{AppResult, config_error, file_read_error, file_write_error},
    output::OutputOptions,
    script::SourceScript,
    session::ConversionSummary
};

/// Target dialect when neither the command line nor the config names one
pub const DEFAULT_TARGET: Dialect = Dialect::Db2;

/// Calculates the process exit code from the highest severity in a batch.
///
/// - `0` - No diagnostics
/// - `1` - At least one warning present
/// - `2` - At least one error present
///
/// # Example
///
/// ```
/// use sql_dialect_converter::{app::calculate_exit_code, session::ConversionSummary};
///
/// assert_eq!(calculate_exit_code(&ConversionSummary::default()), 0);
/// ```
pub fn calculate_exit_code(summary: &ConversionSummary) -> i32 {
    match summary.max_severity() {
        Some(Severity::Error) => 2,
        Some(Severity::Warning) => 1,
        None => 0
    }
}

/// Reads a SQL script from a file, or from stdin when the path is "-".
///
/// # Errors
///
/// Returns an error if the file cannot be read or stdin fails.
pub fn read_script_input(path: &Path) -> AppResult<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        read_to_string(path).map_err(|e| file_read_error(&path.display().to_string(), e))
    }
}

/// Name of the script read from `path`
pub fn script_name(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

/// Reads every input into a [`SourceScript`].
///
/// The source dialect is `declared` when given; otherwise it is detected
/// from the script text, falling back to [`Dialect::Other`].
pub fn load_scripts(inputs: &[PathBuf], declared: Option<Dialect>) -> AppResult<Vec<SourceScript>> {
    inputs
        .iter()
        .map(|path| {
            let text = read_script_input(path)?;
            let dialect = declared
                .or_else(|| Dialect::detect(&text))
                .unwrap_or(Dialect::Other);
            debug!(script = %path.display(), %dialect, "loaded script");
            Ok(SourceScript::named(script_name(path), text, dialect))
        })
        .collect()
}

/// Worker threads for a batch: command line, then config, then CPU count.
///
/// # Errors
///
/// Returns an error when zero workers are requested.
pub fn resolve_workers(requested: Option<usize>, config: &Config) -> AppResult<usize> {
    match requested.or(config.batch.workers) {
        Some(0) => Err(config_error("--workers must be at least 1")),
        Some(workers) => Ok(workers),
        None => Ok(available_parallelism().map(|n| n.get()).unwrap_or(1))
    }
}

/// File name for an exported script: `<stem>.<target>.sql`.
///
/// Batch ids with a duplicate suffix (`a.sql#2`) become `a-2.<target>.sql`.
///
/// # Example
///
/// ```
/// use sql_dialect_converter::{app::export_file_name, dialect::Dialect};
///
/// assert_eq!(export_file_name("etl/load.sql", Dialect::Db2), "load.db2.sql");
/// assert_eq!(export_file_name("load.sql#2", Dialect::Db2), "load-2.db2.sql");
/// ```
pub fn export_file_name(script_id: &str, target: Dialect) -> String {
    let (base, duplicate) = match script_id.split_once('#') {
        Some((base, n)) => (base, Some(n)),
        None => (script_id, None)
    };
    let stem = Path::new(base)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string());
    match duplicate {
        Some(n) => format!("{}-{}.{}.sql", stem, n, target),
        None => format!("{}.{}.sql", stem, target)
    }
}

/// Writes converted scripts.
///
/// A single script is written to `output` itself; several scripts go into
/// `output` as a directory, one file per script.
///
/// # Errors
///
/// Returns an error when a file or the directory cannot be written.
pub fn write_outputs(
    summary: &ConversionSummary,
    output: &Path,
    target: Dialect
) -> AppResult<Vec<PathBuf>> {
    if summary.results.len() == 1 {
        if let Some(result) = summary.results.values().next() {
            write(output, &result.target_text)
                .map_err(|e| file_write_error(&output.display().to_string(), e))?;
        }
        return Ok(vec![output.to_path_buf()]);
    }

    create_dir_all(output).map_err(|e| file_write_error(&output.display().to_string(), e))?;
    let mut written = Vec::with_capacity(summary.results.len());
    for (id, result) in &summary.results {
        let path = output.join(export_file_name(id, target));
        write(&path, &result.target_text)
            .map_err(|e| file_write_error(&path.display().to_string(), e))?;
        debug!(path = %path.display(), "wrote converted script");
        written.push(path);
    }
    Ok(written)
}

/// Creates output options from CLI parameters.
pub fn create_output_options(
    format: Format,
    no_color: bool,
    verbose: bool,
    include_target: bool
) -> OutputOptions {
    OutputOptions {
        format: convert_format(format),
        colored: !no_color,
        verbose,
        include_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ConversionResult, aggregate};

    fn result_with(severity: Option<Severity>) -> ConversionResult {
        let diagnostics = severity
            .map(|s| {
                vec![crate::diagnostics::Diagnostic {
                    rule:     None,
                    line:     1,
                    column:   1,
                    message:  "m".into(),
                    severity: s,
                    solution: None
                }]
            })
            .unwrap_or_default();
        ConversionResult::from_parts("SELECT 1".into(), diagnostics, 1)
    }

    #[test]
    fn test_exit_code_levels() {
        let clean = aggregate(vec![("a".to_string(), result_with(None))]);
        let warned = aggregate(vec![
            ("a".to_string(), result_with(None)),
            ("b".to_string(), result_with(Some(Severity::Warning))),
        ]);
        let failed = aggregate(vec![
            ("a".to_string(), result_with(Some(Severity::Warning))),
            ("b".to_string(), result_with(Some(Severity::Error))),
        ]);
        assert_eq!(calculate_exit_code(&clean), 0);
        assert_eq!(calculate_exit_code(&warned), 1);
        assert_eq!(calculate_exit_code(&failed), 2);
    }

    #[test]
    fn test_script_name_stdin() {
        assert_eq!(script_name(Path::new("-")), "stdin");
        assert_eq!(script_name(Path::new("a/b.sql")), "a/b.sql");
    }

    #[test]
    fn test_resolve_workers() {
        let mut config = Config::default();
        assert_eq!(resolve_workers(Some(3), &config).unwrap(), 3);
        config.batch.workers = Some(2);
        assert_eq!(resolve_workers(None, &config).unwrap(), 2);
        assert_eq!(resolve_workers(Some(5), &config).unwrap(), 5);
        assert!(resolve_workers(Some(0), &config).is_err());
    }

    #[test]
    fn test_export_file_name_without_extension() {
        assert_eq!(export_file_name("stdin", Dialect::PostgreSql), "stdin.postgresql.sql");
    }

    #[test]
    fn test_write_outputs_directory() {
        let dir = tempfile::tempdir().unwrap();
        let summary = aggregate(vec![
            ("one.sql".to_string(), result_with(None)),
            ("two.sql".to_string(), result_with(None)),
        ]);
        let out = dir.path().join("converted");
        let written = write_outputs(&summary, &out, Dialect::Db2).unwrap();
        assert_eq!(written.len(), 2);
        assert!(out.join("one.db2.sql").exists());
        assert_eq!(read_to_string(out.join("two.db2.sql")).unwrap(), "SELECT 1");
    }
}
