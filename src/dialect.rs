//! SQL dialects known to the converter.
//!
//! A [`Dialect`] names the database a script was written for or is being
//! converted to. Besides identification it supplies the `sqlparser` dialect
//! used to validate converted output and a cheap heuristic
//! ([`Dialect::detect`]) for scripts whose dialect was not declared.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{
    Dialect as ParserDialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect
};

use crate::scanner::{TokenKind, scan};

/// Database dialect of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Teradata,
    Oracle,
    #[serde(alias = "mssql")]
    SqlServer,
    #[serde(alias = "postgres")]
    PostgreSql,
    MySql,
    Db2,
    Other
}

impl Dialect {
    /// Every dialect, in declaration order
    pub const ALL: [Dialect; 7] = [
        Self::Teradata,
        Self::Oracle,
        Self::SqlServer,
        Self::PostgreSql,
        Self::MySql,
        Self::Db2,
        Self::Other
    ];

    /// Stable lowercase identifier used in configs and CLI
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teradata => "teradata",
            Self::Oracle => "oracle",
            Self::SqlServer => "sqlserver",
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::Db2 => "db2",
            Self::Other => "other"
        }
    }

    /// Human-readable product name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Teradata => "Teradata",
            Self::Oracle => "Oracle",
            Self::SqlServer => "SQL Server",
            Self::PostgreSql => "PostgreSQL",
            Self::MySql => "MySQL",
            Self::Db2 => "Db2",
            Self::Other => "the target database"
        }
    }

    /// Convert to sqlparser dialect for validating converted output.
    ///
    /// Dialects without a dedicated `sqlparser` implementation fall back to
    /// the generic one.
    pub fn into_parser_dialect(self) -> Box<dyn ParserDialect> {
        match self {
            Self::SqlServer => Box::new(MsSqlDialect {}),
            Self::PostgreSql => Box::new(PostgreSqlDialect {}),
            Self::MySql => Box::new(MySqlDialect {}),
            Self::Teradata | Self::Oracle | Self::Db2 | Self::Other => Box::new(GenericDialect {})
        }
    }

    /// Guess the dialect of a script from dialect-specific markers.
    ///
    /// Returns `None` when the script carries no recognizable marker. The
    /// first marker found in token order decides.
    pub fn detect(sql: &str) -> Option<Self> {
        let tokens = scan(sql);
        let mut prev_significant: Option<usize> = None;
        for (idx, token) in tokens.iter().enumerate() {
            let text = tokens.text(idx);
            match token.kind {
                TokenKind::Keyword | TokenKind::Identifier => {
                    let upper = text.to_ascii_uppercase();
                    match upper.as_str() {
                        "QUALIFY" => return Some(Self::Teradata),
                        "SEL" | "INS" | "UPD" | "DEL" if tokens.starts_statement(idx) => {
                            return Some(Self::Teradata);
                        }
                        "TOP" if prev_significant.is_some_and(|p| tokens.is_keyword(p, "SELECT")) => {
                            return Some(Self::SqlServer);
                        }
                        "ROWNUM" | "DUAL" | "NVL" | "SYSDATE" => return Some(Self::Oracle),
                        "ILIKE" => return Some(Self::PostgreSql),
                        _ => {}
                    }
                    if text.starts_with('`') {
                        return Some(Self::MySql);
                    }
                }
                TokenKind::DateLiteral => return Some(Self::Teradata),
                TokenKind::Operator if text == "::" => return Some(Self::PostgreSql),
                TokenKind::Punctuation if text == "[" => {
                    if tokens
                        .next_significant(idx)
                        .is_some_and(|n| tokens.kind(n) == Some(TokenKind::Identifier))
                    {
                        return Some(Self::SqlServer);
                    }
                }
                _ => {}
            }
            if token.kind.is_significant() {
                prev_significant = Some(idx);
            }
        }
        None
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a dialect name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDialect(pub String);

impl fmt::Display for UnknownDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown SQL dialect '{}'", self.0)
    }
}

impl std::error::Error for UnknownDialect {}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teradata" => Ok(Self::Teradata),
            "oracle" => Ok(Self::Oracle),
            "sqlserver" | "mssql" => Ok(Self::SqlServer),
            "postgresql" | "postgres" | "pg" => Ok(Self::PostgreSql),
            "mysql" => Ok(Self::MySql),
            "db2" => Ok(Self::Db2),
            "other" => Ok(Self::Other),
            _ => Err(UnknownDialect(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Postgres".parse::<Dialect>(), Ok(Dialect::PostgreSql));
        assert_eq!("mssql".parse::<Dialect>(), Ok(Dialect::SqlServer));
        assert_eq!(" DB2 ".parse::<Dialect>(), Ok(Dialect::Db2));
        assert!("sybase".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>(), Ok(dialect));
        }
    }

    #[test]
    fn test_detect_teradata_markers() {
        assert_eq!(Dialect::detect("SEL a FROM t"), Some(Dialect::Teradata));
        assert_eq!(
            Dialect::detect("SELECT a FROM t QUALIFY ROW_NUMBER() OVER (ORDER BY a) = 1"),
            Some(Dialect::Teradata)
        );
        assert_eq!(
            Dialect::detect("SELECT a FROM t WHERE d = DATE '2024-01-01'"),
            Some(Dialect::Teradata)
        );
    }

    #[test]
    fn test_detect_other_dialects() {
        assert_eq!(Dialect::detect("SELECT TOP 10 a FROM t"), Some(Dialect::SqlServer));
        assert_eq!(Dialect::detect("SELECT [name] FROM t"), Some(Dialect::SqlServer));
        assert_eq!(Dialect::detect("SELECT `a` FROM t"), Some(Dialect::MySql));
        assert_eq!(Dialect::detect("SELECT SYSDATE FROM dual"), Some(Dialect::Oracle));
        assert_eq!(Dialect::detect("SELECT a::int FROM t"), Some(Dialect::PostgreSql));
    }

    #[test]
    fn test_detect_plain_sql() {
        assert_eq!(Dialect::detect("SELECT a FROM t WHERE b = 1"), None);
        assert_eq!(Dialect::detect(""), None);
    }
}
