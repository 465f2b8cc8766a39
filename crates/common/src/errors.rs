use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Warning(String),
    #[error("{0}")]
    Unrecoverable(String),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("channel send error: {0}")]
    ChannelSendError(String),
}

impl AppError {
    /// Warnings are logged and skipped, everything else stops the caller
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Warning(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_warnings_are_recoverable() {
        assert!(AppError::Warning("bad line".to_string()).is_recoverable());
        assert!(!AppError::Unrecoverable("gone".to_string()).is_recoverable());
        assert!(!AppError::ChannelSendError("closed".to_string()).is_recoverable());
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let app_error: AppError = err.into();
        assert!(matches!(app_error, AppError::Serialization(_)));
        assert!(app_error.to_string().starts_with("serialization error"));
    }
}
