//! # Error Types
//!
//! The error taxonomy every engine operation reports through. Store-level
//! failures are translated into one of these kinds before leaving the engine.

use thiserror::Error;

/// Errors returned by ledger reconstruction operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Malformed or empty selector, inverted range, bad hash encoding.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Block, account or transaction absent, or addressed before genesis.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No balance snapshot has been ingested yet.
    #[error("Node is starting: no balance snapshot available")]
    NodeIsStarting,

    /// Store I/O, connectivity or deadline failure.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be interpreted.
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

/// Discriminant of [`LedgerError`], for metrics labels and API mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    NodeIsStarting,
    DatabaseError,
    InternalServerError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::NodeIsStarting => "node_is_starting",
            ErrorKind::DatabaseError => "database_error",
            ErrorKind::InternalServerError => "internal_server_error",
        }
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::NodeIsStarting => ErrorKind::NodeIsStarting,
            LedgerError::DatabaseError(_) => ErrorKind::DatabaseError,
            LedgerError::InternalServerError(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether a caller may retry the same request later.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            LedgerError::NodeIsStarting | LedgerError::DatabaseError(_)
        )
    }

    pub fn start_after_end(start: i64, end: i64) -> Self {
        LedgerError::InvalidArgument(format!(
            "start must not be after end: start {} > end {}",
            start, end
        ))
    }

    pub fn block_not_found() -> Self {
        LedgerError::NotFound("block not found".to_string())
    }

    pub fn account_not_found(account: impl std::fmt::Display) -> Self {
        LedgerError::NotFound(format!("account {} not found", account))
    }

    pub fn transaction_not_found(hash: &str) -> Self {
        LedgerError::NotFound(format!("transaction {} not found", hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_kinds() {
        assert!(LedgerError::NodeIsStarting.is_retriable());
        assert!(LedgerError::DatabaseError("timeout".into()).is_retriable());
        assert!(!LedgerError::block_not_found().is_retriable());
        assert!(!LedgerError::InternalServerError("bad row".into()).is_retriable());
    }

    #[test]
    fn test_start_after_end_message() {
        let err = LedgerError::start_after_end(100, 50);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("start must not be after end"));
    }
}
