//! Error types for gqlbind.

use alloc::string::String;
use core::fmt;

/// Result type alias for gqlbind operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Usage errors raised by the binding layer.
///
/// None of these are fatal: callers report them as diagnostics and treat the
/// failed operation as a no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A query key was declared twice on the same instance.
    DuplicateQuery {
        key: String,
    },
    /// An operation referenced a key that was never declared.
    QueryNotFound {
        key: String,
    },
    /// A declaration was rejected before any state was created.
    InvalidDeclaration {
        message: String,
    },
    /// The owning instance has already been torn down.
    Detached,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateQuery { key } => {
                write!(f, "Query {} is already declared", key)
            }
            Error::QueryNotFound { key } => {
                write!(f, "Unable to find a query with key: {}", key)
            }
            Error::InvalidDeclaration { message } => {
                write!(f, "Invalid query declaration: {}", message)
            }
            Error::Detached => write!(f, "Instance is detached"),
        }
    }
}

impl Error {
    /// Creates a duplicate query error.
    pub fn duplicate_query(key: impl Into<String>) -> Self {
        Error::DuplicateQuery { key: key.into() }
    }

    /// Creates a query not found error.
    pub fn query_not_found(key: impl Into<String>) -> Self {
        Error::QueryNotFound { key: key.into() }
    }

    /// Creates an invalid declaration error.
    pub fn invalid_declaration(message: impl Into<String>) -> Self {
        Error::InvalidDeclaration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::query_not_found("users").to_string(),
            "Unable to find a query with key: users"
        );
        assert_eq!(
            Error::duplicate_query("users").to_string(),
            "Query users is already declared"
        );
        assert_eq!(Error::Detached.to_string(), "Instance is detached");
    }
}
