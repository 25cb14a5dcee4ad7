//! Command execution.
//!
//! One function per subcommand. Each returns a [`CommandOutput`] so `main`
//! only prints and exits, and tests can drive the commands directly.

use std::time::Duration;

use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::{
    convert::{convert_dialect, convert_format},
    helpers::{
        DEFAULT_TARGET, calculate_exit_code, create_output_options, load_scripts,
        resolve_workers, write_outputs
    },
    types::{CommandOutput, ConvertParams, ProbeParams}
};
use crate::{
    cli::{DialectArg, Format},
    config::Config,
    error::{AppResult, config_error},
    output::{OutputOptions, format_connection_result, format_rules, format_summary},
    probe::{ConnectionSpec, test_connection},
    rules::RuleRegistry,
    session::convert_batch_with,
    validate::check_target
};

/// Converts every input script and formats the batch.
///
/// Pipeline:
///
/// 1. **Load**: read inputs, resolve each script's source dialect
/// 2. **Convert**: run the batch on a bounded worker pool
/// 3. **Validate** (optional): parse converted text with the target dialect
/// 4. **Export** (optional): write converted text to `params.output`
///
/// # Errors
///
/// Returns an error if an input cannot be read, an output cannot be written
/// or the worker count is invalid.
///
/// # Example
///
/// ```no_run
/// use sql_dialect_converter::{
///     app::{ConvertParams, run_convert},
///     cli::{DialectArg, Format},
///     config::Config,
///     rules::RuleRegistry
/// };
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = ConvertParams {
///     inputs:        vec!["legacy.sql".into()],
///     from:          Some(DialectArg::Teradata),
///     to:            Some(DialectArg::Db2),
///     output:        None,
///     output_format: Format::Text,
///     workers:       None,
///     validate:      false,
///     verbose:       false,
///     no_color:      true
/// };
/// let config = Config::default();
/// let registry = RuleRegistry::with_config(&config.rules)?;
/// let output = run_convert(params, &config, &registry)?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
pub fn run_convert(
    params: ConvertParams,
    config: &Config,
    registry: &RuleRegistry
) -> AppResult<CommandOutput> {
    let declared = params
        .from
        .map(convert_dialect)
        .or(config.conversion.source);
    let target = params
        .to
        .map(convert_dialect)
        .or(config.conversion.target)
        .unwrap_or(DEFAULT_TARGET);
    let workers = resolve_workers(params.workers, config)?;
    let scripts = load_scripts(&params.inputs, declared)?;

    let pb = if scripts.len() > 1 {
        let pb = ProgressBar::new(scripts.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{pos}/{len}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message("Converting scripts...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };
    let summary = convert_batch_with(&scripts, target, registry, workers, |_| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let mut validation = IndexMap::new();
    if params.validate {
        for (id, result) in &summary.results {
            if let Some(finding) = check_target(&result.target_text, target) {
                info!(script = %id, %finding, "converted script does not parse");
                validation.insert(id.clone(), finding);
            }
        }
    }

    if let Some(output) = &params.output {
        let written = write_outputs(&summary, output, target)?;
        info!(files = written.len(), "exported converted scripts");
    }

    let output_opts = create_output_options(
        params.output_format,
        params.no_color,
        params.verbose,
        params.output.is_none()
    );
    Ok(CommandOutput {
        exit_code: calculate_exit_code(&summary),
        stdout:    format_summary(&summary, &validation, &output_opts)
    })
}

/// Lists the rules that apply to a conversion.
///
/// An omitted dialect, when the config does not name one either, matches
/// every dialect.
pub fn run_rules(
    from: Option<DialectArg>,
    to: Option<DialectArg>,
    format: Format,
    no_color: bool,
    config: &Config,
    registry: &RuleRegistry
) -> CommandOutput {
    let source = from.map(convert_dialect).or(config.conversion.source);
    let target = to.map(convert_dialect).or(config.conversion.target);
    let rules: Vec<_> = registry
        .rules()
        .filter(|rule| {
            let info = rule.info();
            source.is_none_or(|s| info.sources.contains(&s))
                && target.is_none_or(|t| info.targets.contains(&t))
        })
        .collect();
    let output_opts = create_output_options(format, no_color, false, false);
    CommandOutput {
        exit_code: 0,
        stdout:    format_rules(&rules, registry, &output_opts)
    }
}

/// Tests a database endpoint.
///
/// Fields given on the command line override the named connection from the
/// config. Exit code is `0` when the endpoint is reachable, `1` otherwise.
///
/// # Errors
///
/// Returns an error when the named connection is not configured.
pub async fn run_probe(params: ProbeParams, config: &Config) -> AppResult<CommandOutput> {
    let mut spec = match &params.connection {
        Some(name) => config.connections.get(name).cloned().ok_or_else(|| {
            config_error(format!("Unknown connection '{}' (not in [connections])", name))
        })?,
        None => ConnectionSpec::default()
    };
    merge_overrides(&mut spec, &params);

    let name = params
        .connection
        .clone()
        .unwrap_or_else(|| format!("{}:{}", spec.host, spec.port));
    let limit = Duration::from_secs(params.timeout_secs.max(1));
    let result = test_connection(&spec, limit).await;

    let output_opts = OutputOptions {
        format: convert_format(params.output_format.unwrap_or(Format::Text)),
        colored: !params.no_color,
        verbose: false,
        include_target: false
    };
    Ok(CommandOutput {
        exit_code: if result.success { 0 } else { 1 },
        stdout:    format_connection_result(&name, &result, &output_opts)
    })
}

fn merge_overrides(spec: &mut ConnectionSpec, params: &ProbeParams) {
    if let Some(kind) = params.kind {
        spec.kind = Some(convert_dialect(kind));
    }
    let fields = [
        (&mut spec.host, &params.host),
        (&mut spec.port, &params.port),
        (&mut spec.database, &params.database),
        (&mut spec.username, &params.username),
        (&mut spec.password, &params.password)
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            field.clone_from(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn test_merge_overrides_prefers_cli() {
        let mut spec = ConnectionSpec {
            kind:     Some(Dialect::Teradata),
            host:     "config-host".into(),
            port:     "1025".into(),
            database: "dbc".into(),
            username: "admin".into(),
            password: "pw".into()
        };
        let params = ProbeParams {
            kind: Some(DialectArg::Db2),
            host: Some("cli-host".into()),
            timeout_secs: 1,
            ..Default::default()
        };
        merge_overrides(&mut spec, &params);
        assert_eq!(spec.kind, Some(Dialect::Db2));
        assert_eq!(spec.host, "cli-host");
        assert_eq!(spec.port, "1025");
    }

    #[tokio::test]
    async fn test_run_probe_unknown_connection() {
        let params = ProbeParams {
            connection: Some("missing".into()),
            timeout_secs: 1,
            ..Default::default()
        };
        assert!(run_probe(params, &Config::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_run_probe_incomplete_spec_exits_one() {
        let params = ProbeParams {
            host: Some("localhost".into()),
            timeout_secs: 1,
            no_color: true,
            ..Default::default()
        };
        let output = run_probe(params, &Config::default()).await.unwrap();
        assert_eq!(output.exit_code, 1);
        assert!(output.stdout.contains("Missing required fields: port"));
    }

    #[test]
    fn test_run_rules_filters_by_dialect() {
        let registry = RuleRegistry::new().unwrap();
        let output = run_rules(
            Some(DialectArg::Oracle),
            Some(DialectArg::Db2),
            Format::Text,
            true,
            &Config::default(),
            &registry
        );
        assert!(output.stdout.contains("schema-qualify-hint"));
        assert!(!output.stdout.contains("sel-abbrev"));
    }
}
