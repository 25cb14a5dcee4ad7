use indexmap::IndexMap;
use sql_dialect_converter::{
    dialect::Dialect,
    output::{
        OutputFormat, OutputOptions, format_connection_result, format_rules, format_summary
    },
    probe::ConnectionResult,
    rules::RuleRegistry,
    script::SourceScript,
    session::{ConversionSummary, convert_batch},
    validate::ValidationFinding
};

fn plain(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false,
        ..Default::default()
    }
}

fn sample_summary() -> ConversionSummary {
    let registry = RuleRegistry::new().unwrap();
    let scripts = vec![
        SourceScript::named("a.sql", "SEL a FROM t;", Dialect::Teradata),
        SourceScript::named("b.sql", "SELECT 1;", Dialect::Teradata),
    ];
    convert_batch(&scripts, Dialect::Db2, &registry, 1).unwrap()
}

#[test]
fn test_output_format_default() {
    let format = OutputFormat::default();
    assert!(matches!(format, OutputFormat::Text));
}

#[test]
fn test_output_options_default() {
    let opts = OutputOptions::default();
    assert!(matches!(opts.format, OutputFormat::Text));
    assert!(opts.colored);
    assert!(!opts.verbose);
    assert!(opts.include_target);
}

#[test]
fn test_text_summary() {
    let text = format_summary(&sample_summary(), &IndexMap::new(), &plain(OutputFormat::Text));

    assert!(text.contains("=== a.sql ==="));
    assert!(text.contains("SELECT a FROM t;"));
    assert!(text.contains("[WARN] line 1, column 1 (sel-abbrev): SEL abbreviation"));
    assert!(text.contains("-> Check that the SELECT statement is correctly formatted"));
    assert!(text.contains("No issues found"));
    assert!(text.contains("Summary: 2 script(s), 2 statement(s) converted, 1 warning(s), 0 error(s)"));
}

#[test]
fn test_text_summary_without_target() {
    let opts = OutputOptions {
        include_target: false,
        ..plain(OutputFormat::Text)
    };
    let text = format_summary(&sample_summary(), &IndexMap::new(), &opts);
    assert!(!text.contains("SELECT a FROM t;"));
    assert!(text.contains("Issues (1):"));
}

#[test]
fn test_text_summary_verbose_and_validation() {
    let mut validation = IndexMap::new();
    validation.insert(
        "b.sql".to_string(),
        ValidationFinding {
            line:    Some(1),
            column:  Some(8),
            message: "Expected: an expression".to_string()
        }
    );
    let opts = OutputOptions {
        verbose: true,
        ..plain(OutputFormat::Text)
    };
    let text = format_summary(&sample_summary(), &validation, &opts);
    assert!(text.contains("Validation: converted SQL does not parse at line 1, column 8"));
    assert!(text.contains("Statements converted: 1, warnings: 1, errors: 0"));
}

#[test]
fn test_json_summary() {
    let json = format_summary(&sample_summary(), &IndexMap::new(), &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["results"]["a.sql"]["targetText"], "SELECT a FROM t;");
    assert_eq!(value["results"]["a.sql"]["diagnostics"][0]["severity"], "warning");
    assert_eq!(value["results"]["a.sql"]["diagnostics"][0]["rule"], "sel-abbrev");
    assert_eq!(value["totals"]["warningCount"], 1);
    assert!(value.get("validation").is_none());
}

#[test]
fn test_yaml_summary() {
    let yaml = format_summary(&sample_summary(), &IndexMap::new(), &plain(OutputFormat::Yaml));
    assert!(yaml.contains("targetText: SELECT a FROM t;"));
    assert!(yaml.contains("warningCount: 1"));
}

#[test]
fn test_rules_listing() {
    let registry = RuleRegistry::new().unwrap();
    let rules = registry.rules_for(Dialect::Teradata, Dialect::Db2);

    let text = format_rules(&rules, &registry, &plain(OutputFormat::Text));
    assert!(text.contains("sel-abbrev"));
    assert!(text.contains("qualify-rownum"));

    let json = format_rules(&rules, &registry, &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 8);
    assert_eq!(value[5]["severity"], "error");
    assert_eq!(value[0]["sources"][0], "teradata");
}

#[test]
fn test_empty_rules_listing() {
    let registry = RuleRegistry::new().unwrap();
    let text = format_rules(&[], &registry, &plain(OutputFormat::Text));
    assert!(text.contains("(none)"));
}

#[test]
fn test_connection_result_output() {
    let ok = ConnectionResult {
        success: true,
        message: None
    };
    let failed = ConnectionResult {
        success: false,
        message: Some("Connection failed: refused".to_string())
    };
    let opts = plain(OutputFormat::Text);

    assert_eq!(
        format_connection_result("warehouse", &ok, &opts),
        "Connection to warehouse succeeded"
    );
    assert_eq!(
        format_connection_result("warehouse", &failed, &opts),
        "Connection to warehouse failed: Connection failed: refused"
    );

    let json = format_connection_result("warehouse", &ok, &plain(OutputFormat::Json));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["success"], true);
    assert!(value.get("message").is_none());
}
