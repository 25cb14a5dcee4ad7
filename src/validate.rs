//! Optional check that converted SQL parses in the target dialect.
//!
//! Uses `sqlparser` with the dialect returned by
//! [`Dialect::into_parser_dialect`]. The check is informational: a script that
//! does not parse keeps its conversion result, the finding is reported next
//! to it.

use serde::Serialize;
use sqlparser::parser::Parser;

use crate::dialect::Dialect;

/// Why converted SQL failed to parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    /// Line in the converted text, when the parser reported one
    pub line:    Option<usize>,
    pub column:  Option<usize>,
    pub message: String
}

impl std::fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "at line {}, column {}: {}", line, column, self.message)
            }
            _ => f.write_str(&self.message)
        }
    }
}

/// Parse `sql` as `dialect`; `None` when it parses
pub fn check_target(sql: &str, dialect: Dialect) -> Option<ValidationFinding> {
    let parser_dialect = dialect.into_parser_dialect();
    let err = Parser::parse_sql(parser_dialect.as_ref(), sql).err()?;
    let message = err.to_string();
    let position = extract_position(&message);
    Some(ValidationFinding {
        line: position.map(|p| p.0),
        column: position.map(|p| p.1),
        message
    })
}

/// Extract `(line, column)` from a sqlparser message
/// ("... at Line: X, Column: Y" or "... at Line: X, Column Y")
fn extract_position(message: &str) -> Option<(usize, usize)> {
    let line_marker = "Line: ";
    let col_marker = ", Column";

    let line_start = message.find(line_marker)? + line_marker.len();
    let col_rel = message[line_start..].find(col_marker)?;
    let line_str = &message[line_start..line_start + col_rel];

    let col_num_start = line_start + col_rel + col_marker.len();
    let rest = message[col_num_start..].trim_start_matches([':', ' ']);
    let col_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    match (line_str.trim().parse(), rest[..col_end].parse()) {
        (Ok(line), Ok(column)) => Some((line, column)),
        _ => None
    }
}
