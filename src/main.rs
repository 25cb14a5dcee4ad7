//! # SQL Dialect Converter
//!
//! Rewrites SQL scripts written for one database dialect so they run on
//! another, reporting every change and every construct it could not convert.
//!
//! # Quick Start
//!
//! ```bash
//! # Convert a Teradata script to Db2, printing SQL and issues
//! sql-dialect-converter convert legacy.sql --from teradata --to db2
//!
//! # Convert a directory of scripts into ./converted
//! sql-dialect-converter convert etl/*.sql --to db2 -o converted
//!
//! # Stream from stdin, JSON report
//! cat legacy.sql | sql-dialect-converter convert - --to postgresql -f json
//!
//! # Rules applied to a conversion
//! sql-dialect-converter rules --from teradata --to db2
//!
//! # Check a database endpoint from the config file
//! sql-dialect-converter probe --connection warehouse
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`SQL_CONVERTER_SOURCE`, `SQL_CONVERTER_TARGET`,
//!    `SQL_CONVERTER_WORKERS`)
//! 3. `.sql-converter.toml` in current directory
//! 4. `~/.config/sql-dialect-converter/config.toml`
//!
//! # Exit Codes
//!
//! `convert` exits with the highest severity found:
//!
//! - `0` - Converted without issues
//! - `1` - Warnings found
//! - `2` - Errors found
//!
//! `probe` exits `0` when the endpoint is reachable and `1` otherwise. Fatal
//! errors (unreadable input, invalid configuration) exit `1`.
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG=debug` to see
//! dropped overlapping matches and per-script details.

use std::process;

use clap::Parser;
use sql_dialect_converter::{
    app::{ConvertParams, ProbeParams, run_convert, run_probe, run_rules},
    cli::{Cli, Commands},
    config::Config,
    error::AppResult,
    rules::RuleRegistry
};
use tokio::main;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[main]
async fn main() {
    init_tracing();
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let registry = RuleRegistry::with_config(&config.rules)?;

    let output = match cli.command {
        Commands::Convert {
            inputs,
            from,
            to,
            output,
            output_format,
            workers,
            validate,
            verbose,
            no_color
        } => {
            let params = ConvertParams {
                inputs,
                from,
                to,
                output,
                output_format,
                workers,
                validate,
                verbose,
                no_color
            };
            run_convert(params, &config, &registry)?
        }
        Commands::Rules {
            from,
            to,
            output_format,
            no_color
        } => run_rules(from, to, output_format, no_color, &config, &registry),
        Commands::Probe {
            connection,
            kind,
            host,
            port,
            database,
            username,
            password,
            timeout_secs,
            output_format,
            no_color
        } => {
            let params = ProbeParams {
                connection,
                kind,
                host,
                port,
                database,
                username,
                password,
                timeout_secs,
                output_format: Some(output_format),
                no_color
            };
            run_probe(params, &config).await?
        }
    };

    println!("{}", output.stdout.trim_end());
    Ok(output.exit_code)
}
