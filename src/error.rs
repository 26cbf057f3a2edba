use thiserror::Error;

#[derive(Debug, Error)]
pub enum CantineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Maximum {max} components per dish")]
    ComponentLimit { max: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl CantineError {
    /// Errors caused by what the user typed; an interactive session reports
    /// them and carries on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CantineError::InvalidInput(_)
                | CantineError::InvalidDate(_)
                | CantineError::ComponentLimit { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CantineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_recoverable() {
        assert!(CantineError::InvalidInput("Invalid number: 2,x".into()).is_recoverable());
        assert!(CantineError::InvalidDate("2026-13-01".into()).is_recoverable());
        assert!(CantineError::ComponentLimit { max: 5 }.is_recoverable());
    }

    #[test]
    fn test_storage_errors_are_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(!CantineError::Io(io).is_recoverable());
        assert!(!CantineError::Config("missing key".into()).is_recoverable());
    }
}
