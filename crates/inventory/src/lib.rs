//! Inventory costing domain (event-sourced).
//!
//! This crate contains the business rules of the costed stock ledger,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage): running balances per `(item, warehouse)`, weighted-average and
//! FIFO costing, and the open-lot queue.

pub mod entry;
pub mod item;
pub mod ledger;

pub use entry::{CostedMovement, Direction, Lot, LotConsumption, ValuedLedgerEntry};
pub use item::{CostingMethod, CostingPolicy, Item, ItemType, StockKey, Warehouse};
pub use ledger::{
    IssueStock, ReceiptCost, ReceiveStock, StockCommand, StockEvent, StockIssued, StockLedger,
    StockReceived,
};
