//! # SQL Dialect Converter Library
//!
//! Rule-based rewriting of SQL scripts from one database dialect to another.
//!
//! A script is scanned once into tokens, every applicable
//! [`ConversionRule`](rules::ConversionRule) matches against that token
//! stream, overlapping matches are resolved, and the accepted rewrites are
//! applied to the original text. Each accepted match is reported as a
//! line-accurate [`Diagnostic`](diagnostics::Diagnostic).
//!
//! ```
//! use sql_dialect_converter::{
//!     dialect::Dialect, engine::convert, rules::RuleRegistry, script::SourceScript
//! };
//!
//! let registry = RuleRegistry::new().unwrap();
//! let script = SourceScript::new("SELECT * FROM t WHERE d = DATE '2020-01-01';", Dialect::Teradata);
//! let result = convert(&script, Dialect::Db2, &registry);
//!
//! assert_eq!(result.target_text, "SELECT * FROM t WHERE d = DATE('2020-01-01');");
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod output;
pub mod probe;
pub mod rules;
pub mod scanner;
pub mod script;
pub mod session;
pub mod validate;
