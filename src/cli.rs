use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SQL Dialect Converter - Rewrite SQL scripts between database dialects
#[derive(Parser, Debug)]
#[command(name = "sql-dialect-converter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert SQL scripts to a target dialect
    Convert {
        /// SQL script files (use - for stdin)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Source dialect; detected from the script when omitted
        #[arg(long, value_enum)]
        from: Option<DialectArg>,

        /// Target dialect
        #[arg(long, value_enum)]
        to: Option<DialectArg>,

        /// Output file, or directory when converting several scripts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Worker threads for batch conversion
        #[arg(long)]
        workers: Option<usize>,

        /// Check that converted SQL parses in the target dialect
        #[arg(long)]
        validate: bool,

        /// Enable verbose output with per-script counts
        #[arg(short, long)]
        verbose: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// List the rules that apply to a conversion
    Rules {
        /// Source dialect
        #[arg(long, value_enum)]
        from: Option<DialectArg>,

        /// Target dialect
        #[arg(long, value_enum)]
        to: Option<DialectArg>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// Test that a database endpoint accepts connections
    Probe {
        /// Named connection from the configuration file
        #[arg(short, long)]
        connection: Option<String>,

        /// Database kind
        #[arg(long, value_enum)]
        kind: Option<DialectArg>,

        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<String>,

        #[arg(long)]
        database: Option<String>,

        #[arg(long)]
        username: Option<String>,

        /// Password for the connection
        #[arg(long, env = "SQL_CONVERTER_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Seconds to wait for the endpoint
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DialectArg {
    Teradata,
    Oracle,
    #[value(alias = "mssql")]
    Sqlserver,
    #[value(alias = "postgres")]
    Postgresql,
    Mysql,
    Db2,
    Other
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
