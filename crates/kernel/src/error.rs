//! Error taxonomy for store and service operations.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure a store or service operation can surface.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input is missing a mandatory field or carries an invalid value.
    #[error("{0}")]
    Validation(String),

    /// A referenced author, customer, or book does not exist.
    #[error("{0}")]
    Reference(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("operation canceled")]
    Cancelled,

    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode or decode {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::Reference(message.into())
    }

    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn decode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for cancellation and deadline expiry.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = Error::not_found("order", 7);
        assert_eq!(err.to_string(), "order with id 7 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = Error::validation("book title is mandatory");
        assert_eq!(err.to_string(), "book title is mandatory");
        assert!(!err.is_cancellation());
    }

    #[test]
    fn persistence_classification() {
        let io = Error::io(
            "data/books.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(io.is_persistence());
        assert!(Error::DeadlineExceeded.is_cancellation());
        assert!(!Error::Cancelled.is_persistence());
    }
}
