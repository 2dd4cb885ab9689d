use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Catalog request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lookup task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Catalog session error: {message}")]
    SessionError { message: String },

    #[error("Lookup for {isbn} timed out after {timeout:?}")]
    TimeoutError { isbn: String, timeout: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Configuration,
    Data,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CheckError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CheckError::HttpError(_) | CheckError::SessionError { .. } | CheckError::TimeoutError { .. } => {
                ErrorCategory::Network
            }
            CheckError::IoError(_) => ErrorCategory::Io,
            CheckError::ConfigError { .. }
            | CheckError::InvalidConfigValueError { .. }
            | CheckError::MissingConfigError { .. }
            | CheckError::PatternError(_) => ErrorCategory::Configuration,
            CheckError::CsvError(_) => ErrorCategory::Data,
            CheckError::TaskError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Io | ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定程序退出碼，失敗一律非零
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// 連線層級的錯誤才值得重試
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CheckError::TimeoutError { .. } => true,
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CheckError::HttpError(e) => match e.status() {
                Some(status) => format!("The catalog answered with HTTP {}", status),
                None => "Could not reach the catalog".to_string(),
            },
            CheckError::TimeoutError { isbn, .. } => {
                format!("The catalog did not answer in time while checking {}", isbn)
            }
            CheckError::SessionError { message } => format!("Catalog session failed: {}", message),
            CheckError::IoError(e) => format!("File access failed: {}", e),
            CheckError::CsvError(e) => format!("Could not read or write the result file: {}", e),
            CheckError::ConfigError { message } => format!("Invalid configuration: {}", message),
            CheckError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for '{}': {}", field, reason)
            }
            CheckError::MissingConfigError { field } => format!("'{}' must be set", field),
            CheckError::PatternError(_) => "The hit count pattern is not a valid regular expression".to_string(),
            CheckError::TaskError(_) => "An internal lookup task crashed".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the catalog URL and your network, or raise --timeout-secs / --retry-attempts",
            ErrorCategory::Io => "Make sure the input file exists and the output directory is writable",
            ErrorCategory::Configuration => "Review the command line flags or the TOML configuration file",
            ErrorCategory::Data => "Make sure the result file is a comma separated file with an 'isbn,match' header",
            ErrorCategory::Internal => "Re-run with --verbose and report the log output",
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
