//! Error types for isomesh

use thiserror::Error;

/// Main error type for isomesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Scalar field has {actual} samples, grid expects {expected}")]
    FieldLength { expected: usize, actual: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Case table defect: {0}")]
    CaseTable(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for isomesh operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::FieldLength {
            expected: 125,
            actual: 64,
        };
        assert_eq!(
            err.to_string(),
            "Scalar field has 64 samples, grid expects 125"
        );

        let err = Error::InvalidGrid("axis 1 has 0 cells".to_string());
        assert_eq!(err.to_string(), "Invalid grid: axis 1 has 0 cells");
    }
}
