//! Read-only report feeds over the stores.
//!
//! Everything here is a replay: no report mutates a store, and none of them
//! is ever the source of truth for a running balance.

pub mod aging;
pub mod stock_card;
pub mod trial_balance;

pub use aging::{AgingBucket, AgingReport, ItemAging};
pub use stock_card::{StockCard, StockCardLine, StockCardReport};
pub use trial_balance::{TrialBalance, TrialBalanceReport, TrialBalanceRow};
