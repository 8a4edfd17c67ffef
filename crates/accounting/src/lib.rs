//! Accounting domain (double-entry books).
//!
//! Pure domain logic only: chart-of-accounts classification, journal shapes,
//! and the balance validation every posted journal must pass. No IO, no HTTP,
//! no persistence concerns.

pub mod chart;
pub mod journal;

pub use chart::{AccountCodes, AccountType, ChartOfAccount, ChartOfAccounts};
pub use journal::{DraftLine, Journal, JournalDraft, JournalLine};
