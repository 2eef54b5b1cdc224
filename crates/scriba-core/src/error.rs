//! Error types and handling for rule integration

use std::path::PathBuf;
use thiserror::Error;

use crate::model::RuleOrigin;

/// Main error type for rule integration operations
#[derive(Debug, Error)]
pub enum ScribaError {
    /// A raw record could not be turned into a rule (missing description, bad ratio)
    #[error("Malformed {origin} rule at position {position}: {reason}")]
    MalformedRule {
        origin: RuleOrigin,
        position: usize,
        reason: String,
    },

    /// An empirical id clashed with an official id and was renamed
    #[error("Rule id '{id}' already taken, renamed to '{resolved}'")]
    IdCollision { id: String, resolved: String },

    /// The same id appeared twice in one input list; the later record wins
    #[error("Duplicate {origin} rule id '{id}', keeping the last occurrence")]
    DuplicateId { id: String, origin: RuleOrigin },

    /// Every record of an update delta failed normalization
    #[error("Update delta rejected: all {rejected} records failed normalization")]
    UpdateDeltaInvalid { rejected: usize },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding of guides and input documents
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedRule,
    IdCollision,
    DuplicateId,
    UpdateDeltaInvalid,
    Config,
    Io,
    Serialization,
    Internal,
}

impl ScribaError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScribaError::MalformedRule { .. } => ErrorKind::MalformedRule,
            ScribaError::IdCollision { .. } => ErrorKind::IdCollision,
            ScribaError::DuplicateId { .. } => ErrorKind::DuplicateId,
            ScribaError::UpdateDeltaInvalid { .. } => ErrorKind::UpdateDeltaInvalid,
            ScribaError::ConfigError { .. } => ErrorKind::Config,
            ScribaError::IoError { .. } => ErrorKind::Io,
            ScribaError::SerializationError { .. } => ErrorKind::Serialization,
            ScribaError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (the batch can continue without the record)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedRule | ErrorKind::IdCollision | ErrorKind::DuplicateId
        )
    }

    /// Create a malformed rule error
    pub fn malformed_rule(origin: RuleOrigin, position: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRule {
            origin,
            position,
            reason: reason.into(),
        }
    }

    /// Create an id collision warning
    pub fn id_collision(id: impl Into<String>, resolved: impl Into<String>) -> Self {
        Self::IdCollision {
            id: id.into(),
            resolved: resolved.into(),
        }
    }

    /// Create a duplicate id warning
    pub fn duplicate_id(id: impl Into<String>, origin: RuleOrigin) -> Self {
        Self::DuplicateId {
            id: id.into(),
            origin,
        }
    }

    /// Create a rejected-delta error
    pub fn update_delta_invalid(rejected: usize) -> Self {
        Self::UpdateDeltaInvalid { rejected }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for ScribaError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ScribaError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = ScribaError::malformed_rule(RuleOrigin::Empirical, 3, "missing description");
        assert_eq!(err.kind(), ErrorKind::MalformedRule);
        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Malformed empirical rule at position 3: missing description"
        );

        let err = ScribaError::update_delta_invalid(2);
        assert_eq!(err.kind(), ErrorKind::UpdateDeltaInvalid);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ScribaError = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
