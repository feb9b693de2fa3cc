use thiserror::Error;

#[derive(Error, Debug)]
pub enum NamecheckError {
    #[error("HTTP client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

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

    #[error("Unknown service: {name}")]
    UnknownServiceError { name: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl NamecheckError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            NamecheckError::ApiError(_) => ErrorCategory::Network,
            NamecheckError::IoError(_) => ErrorCategory::Storage,
            NamecheckError::SerializationError(_) | NamecheckError::ValidationError { .. } => {
                ErrorCategory::Data
            }
            NamecheckError::TomlError(_)
            | NamecheckError::ConfigError { .. }
            | NamecheckError::InvalidConfigValueError { .. }
            | NamecheckError::MissingConfigError { .. }
            | NamecheckError::UnknownServiceError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            NamecheckError::ApiError(_) => "Could not reach the service".to_string(),
            NamecheckError::IoError(e) => format!("File access failed: {}", e),
            NamecheckError::UnknownServiceError { name } => {
                format!("No service named '{}' in the services file", name)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the service URL",
            ErrorCategory::Storage => "Check that the output and wordlist paths exist and are writable",
            ErrorCategory::Configuration => "Check the services file and command line arguments",
            ErrorCategory::Data => "Check the wordlist contents and service response format",
        }
    }
}

pub type Result<T> = std::result::Result<T, NamecheckError>;

/// 服務描述中的 URL/body 模板函式執行失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("template evaluation failed: {message}")]
pub struct TemplateError {
    pub message: String,
}

impl TemplateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 可用性判斷函式在回應上執行失敗
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("classification failed: {message}")]
pub struct ClassificationError {
    pub message: String,
}

impl ClassificationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 單一候選字在 pipeline 中的失敗，只影響該候選字
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    #[error("no response from {url}")]
    Transport { url: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("failed to persist result: {message}")]
    Persistence { message: String },

    #[error("candidate task aborted: {message}")]
    Aborted { message: String },
}

impl CandidateError {
    pub fn kind(&self) -> &'static str {
        match self {
            CandidateError::Transport { .. } => "TransportFailure",
            CandidateError::Template(_) => "TemplateEvaluationError",
            CandidateError::Classification(_) => "ClassificationError",
            CandidateError::Persistence { .. } => "PersistenceFailure",
            CandidateError::Aborted { .. } => "TaskAborted",
        }
    }
}
