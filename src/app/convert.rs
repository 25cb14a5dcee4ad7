//! Type conversion functions for CLI to internal types.

use crate::{
    cli::{DialectArg, Format},
    dialect::Dialect,
    output::OutputFormat
};

/// Converts a CLI dialect enum to the library dialect.
///
/// # Example
///
/// ```
/// use sql_dialect_converter::{app::convert_dialect, cli::DialectArg, dialect::Dialect};
///
/// assert_eq!(convert_dialect(DialectArg::Sqlserver), Dialect::SqlServer);
/// ```
pub fn convert_dialect(dialect: DialectArg) -> Dialect {
    match dialect {
        DialectArg::Teradata => Dialect::Teradata,
        DialectArg::Oracle => Dialect::Oracle,
        DialectArg::Sqlserver => Dialect::SqlServer,
        DialectArg::Postgresql => Dialect::PostgreSql,
        DialectArg::Mysql => Dialect::MySql,
        DialectArg::Db2 => Dialect::Db2,
        DialectArg::Other => Dialect::Other
    }
}

/// Converts a CLI format enum to the internal output format type.
///
/// # Example
///
/// ```
/// use sql_dialect_converter::{app::convert_format, cli::Format, output::OutputFormat};
///
/// let format = convert_format(Format::Json);
/// assert!(matches!(format, OutputFormat::Json));
/// ```
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}
