//! Result type alias for rule integration operations

use crate::error::ScribaError;

/// Standard Result type for rule integration operations
pub type Result<T> = std::result::Result<T, ScribaError>;
