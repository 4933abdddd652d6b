use thiserror::Error;

/// Lane departure checker error types
#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("{what} needs at least {required} point(s), got {actual}")]
    InsufficientPoints {
        what: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for checker operations
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Fail with `InsufficientPoints` when `actual < required`
pub(crate) fn ensure_points(what: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        return Err(CheckerError::InsufficientPoints {
            what,
            required,
            actual,
        });
    }
    Ok(())
}
