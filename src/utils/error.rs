use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required environment values: {}", keys.join(", "))]
    MissingConfigError { keys: Vec<String> },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration parse error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Io,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::ApiError(_) => ErrorCategory::Network,
            ScanError::IoError(_) => ErrorCategory::Io,
            ScanError::SerializationError(_) | ScanError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            ScanError::ConfigError { .. }
            | ScanError::MissingConfigError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScanError::ApiError(_) => {
                "Check the service URL and your network connection, then re-run the batch".to_string()
            }
            ScanError::IoError(_) => {
                "Make sure the input directory exists and the output directory is writable".to_string()
            }
            ScanError::SerializationError(_) => {
                "The service answered with unexpected JSON; re-run with --verbose to inspect it".to_string()
            }
            ScanError::MissingConfigError { keys } => {
                format!("Add {} to your environment or .env file", keys.join(", "))
            }
            ScanError::ConfigError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::ConfigValidationError { .. } => {
                "Review grocery-scan.toml and the environment values".to_string()
            }
            ScanError::ProcessingError { .. } => {
                "Inspect the offending input file and re-run the batch".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScanError::MissingConfigError { keys } => {
                format!("Please provide {} in .env file.", keys.join(", "))
            }
            ScanError::ApiError(e) => format!("Could not reach the remote service: {}", e),
            ScanError::IoError(e) => format!("File system problem: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
