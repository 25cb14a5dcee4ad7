use clap::Parser;
use sql_dialect_converter::cli::{Cli, Commands, DialectArg, Format};

#[test]
fn test_parse_convert() {
    let cli = Cli::try_parse_from([
        "sql-dialect-converter",
        "convert",
        "a.sql",
        "b.sql",
        "--from",
        "teradata",
        "--to",
        "db2",
        "-o",
        "out",
        "-f",
        "json",
        "--workers",
        "2",
        "--validate"
    ])
    .unwrap();

    match cli.command {
        Commands::Convert {
            inputs,
            from,
            to,
            output,
            output_format,
            workers,
            validate,
            ..
        } => {
            assert_eq!(inputs.len(), 2);
            assert!(matches!(from, Some(DialectArg::Teradata)));
            assert!(matches!(to, Some(DialectArg::Db2)));
            assert_eq!(output.unwrap().to_str(), Some("out"));
            assert!(matches!(output_format, Format::Json));
            assert_eq!(workers, Some(2));
            assert!(validate);
        }
        _ => panic!("expected convert")
    }
}

#[test]
fn test_convert_requires_input() {
    assert!(Cli::try_parse_from(["sql-dialect-converter", "convert"]).is_err());
}

#[test]
fn test_dialect_aliases() {
    let cli =
        Cli::try_parse_from(["sql-dialect-converter", "rules", "--from", "mssql", "--to", "postgres"])
            .unwrap();
    match cli.command {
        Commands::Rules { from, to, .. } => {
            assert!(matches!(from, Some(DialectArg::Sqlserver)));
            assert!(matches!(to, Some(DialectArg::Postgresql)));
        }
        _ => panic!("expected rules")
    }
}

#[test]
fn test_unknown_dialect_rejected() {
    assert!(
        Cli::try_parse_from(["sql-dialect-converter", "rules", "--to", "sqlite"]).is_err()
    );
}

#[test]
fn test_parse_probe_defaults() {
    let cli = Cli::try_parse_from([
        "sql-dialect-converter",
        "probe",
        "--host",
        "localhost",
        "--port",
        "50000"
    ])
    .unwrap();
    match cli.command {
        Commands::Probe {
            host,
            port,
            timeout_secs,
            connection,
            ..
        } => {
            assert_eq!(host.as_deref(), Some("localhost"));
            assert_eq!(port.as_deref(), Some("50000"));
            assert_eq!(timeout_secs, 5);
            assert!(connection.is_none());
        }
        _ => panic!("expected probe")
    }
}
