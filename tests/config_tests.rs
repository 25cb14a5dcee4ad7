use std::collections::HashMap;

use sql_dialect_converter::{
    config::{Config, RulesConfig},
    dialect::Dialect
};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert!(config.conversion.source.is_none());
    assert!(config.conversion.target.is_none());
    assert!(config.batch.workers.is_none());
    assert!(config.rules.disabled.is_empty());
    assert!(config.connections.is_empty());
}

#[test]
fn test_default_rules_config() {
    let config = RulesConfig::default();

    assert!(config.disabled.is_empty());
    assert!(config.severity.is_empty());
}

#[test]
fn test_full_config_file() {
    let config = Config::from_toml_str(
        r#"
[conversion]
source = "teradata"
target = "db2"

[batch]
workers = 4

[rules]
disabled = ["schema-qualify-hint"]

[rules.severity]
date-literal = "error"

[connections.warehouse]
kind = "db2"
host = "localhost"
port = "50000"
database = "BLUDB"
username = "db2inst1"
password = "secret"

[connections.legacy]
kind = "teradata"
host = "td.example.com"
"#
    )
    .unwrap();

    assert_eq!(config.conversion.source, Some(Dialect::Teradata));
    assert_eq!(config.conversion.target, Some(Dialect::Db2));
    assert_eq!(config.batch.workers, Some(4));
    assert_eq!(config.rules.disabled, vec!["schema-qualify-hint"]);
    assert_eq!(config.rules.severity.get("date-literal").unwrap(), "error");

    let names: Vec<_> = config.connections.keys().cloned().collect();
    assert_eq!(names, vec!["warehouse", "legacy"]);
    let warehouse = &config.connections["warehouse"];
    assert_eq!(warehouse.port, "50000");
    assert!(warehouse.missing_fields().is_empty());
    assert_eq!(
        config.connections["legacy"].missing_fields(),
        vec!["port", "database", "username", "password"]
    );
}

#[test]
fn test_dialect_aliases_in_config() {
    let config = Config::from_toml_str("[conversion]\nsource = \"mssql\"\ntarget = \"postgres\"\n")
        .unwrap();
    assert_eq!(config.conversion.source, Some(Dialect::SqlServer));
    assert_eq!(config.conversion.target, Some(Dialect::PostgreSql));
}

#[test]
fn test_invalid_config_file() {
    assert!(Config::from_toml_str("[conversion]\ntarget = \"sqlite\"\n").is_err());
    assert!(Config::from_toml_str("not toml at all = = =").is_err());
}

#[test]
fn test_env_overrides_file() {
    let mut config = Config::from_toml_str("[conversion]\ntarget = \"db2\"\n").unwrap();
    config
        .apply_env(env(&[
            ("SQL_CONVERTER_SOURCE", "oracle"),
            ("SQL_CONVERTER_TARGET", "postgresql"),
            ("SQL_CONVERTER_WORKERS", "8")
        ]))
        .unwrap();

    assert_eq!(config.conversion.source, Some(Dialect::Oracle));
    assert_eq!(config.conversion.target, Some(Dialect::PostgreSql));
    assert_eq!(config.batch.workers, Some(8));
}

#[test]
fn test_env_absent_keeps_values() {
    let mut config = Config::from_toml_str("[batch]\nworkers = 2\n").unwrap();
    config.apply_env(env(&[])).unwrap();
    assert_eq!(config.batch.workers, Some(2));
}

#[test]
fn test_env_invalid_values() {
    let mut config = Config::default();
    assert!(config.apply_env(env(&[("SQL_CONVERTER_WORKERS", "many")])).is_err());

    let mut config = Config::default();
    assert!(config.apply_env(env(&[("SQL_CONVERTER_WORKERS", "0")])).is_err());

    let mut config = Config::default();
    assert!(config.apply_env(env(&[("SQL_CONVERTER_TARGET", "sybase")])).is_err());
}

#[test]
fn test_zero_workers_in_file_rejected() {
    let mut config = Config::from_toml_str("[batch]\nworkers = 0\n").unwrap();
    assert!(config.apply_env(env(&[])).is_err());
}
