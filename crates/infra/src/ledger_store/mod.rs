//! Valued ledger store: durable, ordered, append-only storage of costed
//! stock movements, one stream per `(item, warehouse)` key.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryValuedLedgerStore;
pub use r#trait::{StoredEntry, ValuedLedgerStore};
