//! Domain error model.

use thiserror::Error;

use crate::money::{Money, Qty};

/// Result type used across the engine.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Caller-visible error taxonomy of the costed-ledger core.
///
/// Every variant aborts the enclosing business operation with no partial
/// ledger or journal writes. Only `ConcurrencyConflict` is safe to retry:
/// it is detected before anything commits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A value failed validation (e.g. malformed input, empty journal).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Quantity not strictly positive, or a negative unit cost. Rejected
    /// before any write.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// An issue exceeded the on-hand quantity for its stock key. Rejected
    /// before any write.
    #[error("insufficient stock: requested {requested}, on hand {on_hand}")]
    InsufficientStock { requested: Qty, on_hand: Qty },

    /// A journal line referenced an account code the registry cannot resolve.
    #[error("unknown account code: {0}")]
    UnknownAccount(String),

    /// Journal debit and credit totals differ.
    #[error("unbalanced journal: debits {debits}, credits {credits}")]
    UnbalancedJournal { debits: Money, credits: Money },

    /// Lost-update detected on a running-balance append (stale stream
    /// version). Retry a bounded number of times, never swallow.
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn insufficient_stock(requested: Qty, on_hand: Qty) -> Self {
        Self::InsufficientStock { requested, on_hand }
    }

    pub fn unknown_account(code: impl Into<String>) -> Self {
        Self::UnknownAccount(code.into())
    }

    pub fn unbalanced(debits: Money, credits: Money) -> Self {
        Self::UnbalancedJournal { debits, credits }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConcurrencyConflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Whether the caller may safely retry the failed operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict(_))
    }
}
