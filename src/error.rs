use std::time::Duration;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ratings parse error: {0}")]
    Parse(String),

    #[error("Provider rejected the API key: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider rate limit hit")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Errors worth retrying after a backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Network(_) | AppError::RateLimited { .. } | AppError::Unavailable(_)
        )
    }

    /// Errors that must abort an aggregation pass instead of skipping one item
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Auth(_) | AppError::Config(_))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return AppError::Parse(err.to_string());
        }
        match err.into_kind() {
            csv::ErrorKind::Io(io) => AppError::Io(io),
            other => AppError::Parse(format!("{:?}", other)),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
