//! Application types for CLI commands.
//!
//! Parameters passed from the command line to the command runners and the
//! outputs they hand back to `main`.

use std::path::PathBuf;

use crate::cli::{DialectArg, Format};

/// Parameters for the convert command.
///
/// # Example
///
/// ```
/// use sql_dialect_converter::{
///     app::ConvertParams,
///     cli::{DialectArg, Format}
/// };
///
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
/// assert_eq!(params.inputs.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertParams {
    /// Script paths, "-" for stdin.
    pub inputs:        Vec<PathBuf>,
    /// Declared source dialect; detected per script when absent.
    pub from:          Option<DialectArg>,
    pub to:            Option<DialectArg>,
    /// File for one script, directory for several.
    pub output:        Option<PathBuf>,
    pub output_format: Format,
    pub workers:       Option<usize>,
    /// Parse converted SQL with the target dialect.
    pub validate:      bool,
    pub verbose:       bool,
    pub no_color:      bool
}

/// Parameters for the probe command
#[derive(Debug, Clone, Default)]
pub struct ProbeParams {
    pub connection:    Option<String>,
    pub kind:          Option<DialectArg>,
    pub host:          Option<String>,
    pub port:          Option<String>,
    pub database:      Option<String>,
    pub username:      Option<String>,
    pub password:      Option<String>,
    pub timeout_secs:  u64,
    pub output_format: Option<Format>,
    pub no_color:      bool
}

/// Output of a command run
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (0, 1, or 2).
    pub exit_code: i32,
    /// Text to print on stdout.
    pub stdout:    String
}
