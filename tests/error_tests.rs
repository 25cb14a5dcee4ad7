use sql_dialect_converter::error::{
    config_error, file_read_error, file_write_error, internal_error, registry_error
};

#[test]
fn test_file_read_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error = file_read_error("/path/to/script.sql", io_error);
    assert!(!error.to_string().is_empty());
}

#[test]
fn test_file_write_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = file_write_error("/readonly/out.sql", io_error);
    assert!(!error.to_string().is_empty());
}

#[test]
fn test_config_error() {
    let error = config_error("Invalid configuration value");
    assert!(!error.to_string().is_empty());
}

#[test]
fn test_registry_error() {
    let error = registry_error("sel-abbrev", "duplicate rule id");
    assert!(!error.to_string().is_empty());
}

#[test]
fn test_internal_error() {
    let error = internal_error("worker pool failed");
    assert!(!error.to_string().is_empty());
}
