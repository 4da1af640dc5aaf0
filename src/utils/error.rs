use thiserror::Error;

/// Failures raised by a completion provider call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Rate limited by completion provider after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    #[error("Completion request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("Completion provider error: {message}")]
    Provider { status: Option<u16>, message: String },
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("Schema validation failed at {path}: {message}")]
    SchemaValidation { path: String, message: String },

    #[error("Missing template variable: {name}")]
    MissingVariable { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Provider,
    Schema,
    Template,
    Configuration,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code reported by the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl PlannerError {
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        PlannerError::SchemaValidation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PlannerError::Completion(CompletionError::Auth { .. }) => ErrorCategory::Authentication,
            PlannerError::Completion(_) => ErrorCategory::Provider,
            PlannerError::SchemaValidation { .. } => ErrorCategory::Schema,
            PlannerError::MissingVariable { .. } => ErrorCategory::Template,
            PlannerError::IoError(_) | PlannerError::SerializationError(_) => ErrorCategory::Storage,
            PlannerError::TomlError(_)
            | PlannerError::ConfigError { .. }
            | PlannerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlannerError::Completion(CompletionError::RateLimited { .. })
            | PlannerError::Completion(CompletionError::Timeout { .. }) => ErrorSeverity::Medium,
            PlannerError::Completion(CompletionError::Provider { status, .. }) => match status {
                Some(code) if *code < 500 => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            PlannerError::SchemaValidation { .. } => ErrorSeverity::High,
            _ => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PlannerError::Completion(CompletionError::Auth { .. }) => {
                "The completion provider rejected the API credentials".to_string()
            }
            PlannerError::Completion(CompletionError::RateLimited { attempts }) => {
                format!("The completion provider kept rate limiting requests ({attempts} attempts)")
            }
            PlannerError::Completion(CompletionError::Timeout { attempts }) => {
                format!("The completion provider did not answer in time ({attempts} attempts)")
            }
            PlannerError::Completion(CompletionError::Provider { message, .. }) => {
                format!("The completion provider returned an error: {message}")
            }
            PlannerError::SchemaValidation { path, message } => {
                format!("The model answer did not match the expected format at {path}: {message}")
            }
            PlannerError::MissingVariable { name } => {
                format!("Prompt template references an unknown variable '{name}'")
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Authentication => "Set OPENAI_API_KEY (environment or .env) to a valid key",
            ErrorCategory::Provider => match self.severity() {
                ErrorSeverity::Medium => "Wait a moment and run again, or raise --max-retries",
                _ => "Check --model, --max-tokens and --base-url",
            },
            ErrorCategory::Schema => "Run again; the model occasionally ignores the requested format",
            ErrorCategory::Template => "This is a bug in the prompt templates, please report it",
            ErrorCategory::Configuration => "Check the command line flags and the profile file",
            ErrorCategory::Storage => "Check that --output-path is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
