//! Error types for configuration loading.

use thiserror::Error;

/// Errors that can occur while loading or validating settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration: {message}")]
    Io {
        /// Error message.
        message: String,
    },

    /// The configuration text could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    Parse {
        /// Error message.
        message: String,
    },

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Error message.
        message: String,
    },

    /// The file extension does not name a known format.
    #[error("Unsupported configuration format: {extension}")]
    UnsupportedFormat {
        /// The offending extension.
        extension: String,
    },
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format<S: Into<String>>(extension: S) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
