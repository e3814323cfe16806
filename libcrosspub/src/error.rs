//! Error types for Crosspub

use thiserror::Error;

use crate::types::Platform;

pub type Result<T> = std::result::Result<T, CrosspubError>;

#[derive(Error, Debug)]
pub enum CrosspubError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CrosspubError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CrosspubError::Validation(_) => 3,
            CrosspubError::Config(_) => 2,
            CrosspubError::Gateway(_) => 1,
        }
    }
}

impl From<reqwest::Error> for CrosspubError {
    fn from(err: reqwest::Error) -> Self {
        CrosspubError::Gateway(GatewayError::Transport(err))
    }
}

/// A caller input violated a precondition. Raised before any network call
/// is made, so no backend state can have changed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("No platform selected")]
    NoPlatformSelected,

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("A connect attempt for {0} is already running")]
    ConnectInProgress(Platform),

    #[error("Missing required credential field '{field}' for {platform}")]
    MissingField { platform: Platform, field: String },

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Catch-all for shell-level input problems (bad flag values and the like)
    #[error("{0}")]
    InvalidInput(String),
}

/// The backend rejected a request or could not be reached.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Non-success response; `message` is the backend's own error text,
    /// passed through unmodified.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GatewayError {
    /// Construct a rejection carrying the backend's message as-is
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            status,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to write config file: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
