use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid group: {group}")]
    InvalidGroup { group: String },

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Token signing failed: {message}")]
    TokenError { message: String },
}

/// 錯誤分類，決定回應狀態碼與 CLI 退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Upstream,
    Config,
    Internal,
}

impl RelayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::InvalidRequest { .. } | RelayError::InvalidGroup { .. } => {
                ErrorCategory::Client
            }
            RelayError::ApiError(_) | RelayError::Upstream { .. } => ErrorCategory::Upstream,
            RelayError::ConfigError { .. }
            | RelayError::MissingConfigError { .. }
            | RelayError::InvalidConfigValueError { .. }
            | RelayError::TokenError { .. } => ErrorCategory::Config,
            RelayError::CsvError(_) | RelayError::IoError(_) | RelayError::SerializationError(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Client => 400,
            _ => 500,
        }
    }

    /// 對呼叫端公開的訊息；伺服器端錯誤一律不透露細節
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::InvalidGroup { .. } => "Invalid group specified.",
            RelayError::InvalidRequest { .. } => "Invalid request body.",
            _ => "An unknown server error occurred.",
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Client => "Check the group name and the request JSON fields",
            ErrorCategory::Upstream => "Check the provider API key, base URL and network access",
            ErrorCategory::Config => "Check the environment variables or the TOML config file",
            ErrorCategory::Internal => "Check the local file permissions and disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
