pub use masterror::{AppError, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create file write error
pub fn file_write_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to write file '{}': {}", path, source))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create rule registry error.
///
/// Raised while the registry is being assembled at startup; never during a
/// conversion.
pub fn registry_error(rule_id: &str, message: impl Into<String>) -> AppError {
    AppError::bad_request(format!(
        "Invalid rule registry ({}): {}",
        rule_id,
        message.into()
    ))
}

/// Create internal error (thread pool setup, runtime failures)
pub fn internal_error(message: impl Into<String>) -> AppError {
    AppError::internal(message.into())
}
