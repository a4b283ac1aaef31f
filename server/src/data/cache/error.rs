//! Cache error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_display() {
        let err = CacheError::Serialization("expected value at line 1".to_string());
        assert_eq!(
            err.to_string(),
            "Serialization error: expected value at line 1"
        );
    }
}
