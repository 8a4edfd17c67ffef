//! The stock ledger aggregate: one append-only stream of costed movements per
//! `(item, warehouse)` key.
//!
//! `handle` decides entries (pure, no mutation) and `apply` evolves the
//! running state, so replaying a stream reproduces the stored snapshots
//! exactly. The open-lot queue lives here too: receives push a lot, issues
//! decrement lots front-first, and the issue entry records the consumption so
//! a lot is never decremented twice.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use costbooks_core::{Aggregate, AggregateRoot, DocRef, LedgerError, Money, Qty, UserId};

use crate::entry::{CostedMovement, Direction, Lot, LotConsumption, ValuedLedgerEntry};
use crate::item::{CostingMethod, StockKey};

/// Aggregate root: the costed stock ledger for one stock key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLedger {
    key: StockKey,
    running_qty: Qty,
    running_value: Money,
    running_avg_cost: Money,
    open_lots: VecDeque<Lot>,
    version: u64,
}

impl StockLedger {
    /// Empty aggregate for rehydration.
    pub fn empty(key: StockKey) -> Self {
        Self {
            key,
            running_qty: Qty::ZERO,
            running_value: Money::ZERO,
            running_avg_cost: Money::ZERO,
            open_lots: VecDeque::new(),
            version: 0,
        }
    }

    pub fn key(&self) -> StockKey {
        self.key
    }

    pub fn running_qty(&self) -> Qty {
        self.running_qty
    }

    pub fn running_value(&self) -> Money {
        self.running_value
    }

    pub fn running_avg_cost(&self) -> Money {
        self.running_avg_cost
    }

    /// Receipt lots not yet fully consumed, oldest first.
    pub fn open_lots(&self) -> &VecDeque<Lot> {
        &self.open_lots
    }
}

impl AggregateRoot for StockLedger {
    type Id = StockKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// How a receipt's cost is specified.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptCost {
    /// Cost per unit; the entry value is `qty × unit cost`.
    PerUnit(Money),
    /// Total value received; the unit cost is derived. Transfers and
    /// finished-goods receipts carry a value, not a price, and booking the
    /// value verbatim keeps it conserved across the movement.
    Total(Money),
}

/// Command: receive stock (purchase receipt, finished goods, transfer-in,
/// opening balance, write-on adjustment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub key: StockKey,
    pub qty: Qty,
    pub cost: ReceiptCost,
    pub method: CostingMethod,
    pub reference: DocRef,
    pub user_id: UserId,
    pub posted_at: DateTime<Utc>,
}

/// Command: issue stock (production material issue, sale delivery,
/// transfer-out, write-off adjustment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStock {
    pub key: StockKey,
    pub qty: Qty,
    pub method: CostingMethod,
    pub reference: DocRef,
    pub user_id: UserId,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockCommand {
    Receive(ReceiveStock),
    Issue(IssueStock),
}

/// Event: an IN entry was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReceived {
    pub key: StockKey,
    pub entry: ValuedLedgerEntry,
}

/// Event: an OUT entry was appended, consuming the recorded lot quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockIssued {
    pub key: StockKey,
    pub entry: ValuedLedgerEntry,
    /// Per-lot consumption breakdown, front-of-queue first.
    pub consumed: Vec<LotConsumption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockEvent {
    Received(StockReceived),
    Issued(StockIssued),
}

impl StockEvent {
    pub fn key(&self) -> StockKey {
        match self {
            StockEvent::Received(e) => e.key,
            StockEvent::Issued(e) => e.key,
        }
    }

    pub fn entry(&self) -> &ValuedLedgerEntry {
        match self {
            StockEvent::Received(e) => &e.entry,
            StockEvent::Issued(e) => &e.entry,
        }
    }

    /// The movement cost the orchestrating caller builds journal lines from.
    pub fn costed(&self) -> CostedMovement {
        let entry = self.entry();
        CostedMovement {
            unit_cost: entry.unit_cost,
            value: entry.value,
        }
    }
}

impl Aggregate for StockLedger {
    type Command = StockCommand;
    type Event = StockEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockEvent::Received(e) => {
                self.load_snapshot(&e.entry);
                self.open_lots
                    .push_back(Lot::new(e.entry.posted_at, e.entry.unit_cost, e.entry.qty));
            }
            StockEvent::Issued(e) => {
                self.load_snapshot(&e.entry);
                self.consume_lots(&e.consumed);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockCommand::Receive(cmd) => self.handle_receive(cmd),
            StockCommand::Issue(cmd) => self.handle_issue(cmd),
        }
    }
}

impl StockLedger {
    fn ensure_key(&self, key: StockKey) -> Result<(), LedgerError> {
        if self.key != key {
            return Err(LedgerError::validation("stock key mismatch"));
        }
        Ok(())
    }

    /// Adopt the stored running snapshot rather than recomputing it: replay
    /// must reproduce exactly what was written.
    fn load_snapshot(&mut self, entry: &ValuedLedgerEntry) {
        self.running_qty = entry.running_qty;
        self.running_value = entry.running_value;
        self.running_avg_cost = entry.running_avg_cost;
    }

    fn consume_lots(&mut self, consumed: &[LotConsumption]) {
        for consumption in consumed {
            let mut left = consumption.qty;
            while left.is_positive() {
                let Some(front) = self.open_lots.front_mut() else {
                    break;
                };
                let take = front.remaining_qty.min(left);
                front.remaining_qty -= take;
                left -= take;
                if front.is_exhausted() {
                    self.open_lots.pop_front();
                }
            }
        }
    }

    /// Plan which open lots an issue consumes, front (oldest) first.
    fn consumption_plan(&self, qty: Qty) -> Vec<LotConsumption> {
        let mut plan = Vec::new();
        let mut left = qty;

        for lot in &self.open_lots {
            if !left.is_positive() {
                break;
            }
            let take = lot.remaining_qty.min(left);
            if take.is_positive() {
                plan.push(LotConsumption {
                    lot_posted_at: lot.posted_at,
                    qty: take,
                    unit_cost: lot.unit_cost,
                });
                left -= take;
            }
        }

        plan
    }

    fn handle_receive(&self, cmd: &ReceiveStock) -> Result<Vec<StockEvent>, LedgerError> {
        self.ensure_key(cmd.key)?;

        if !cmd.qty.is_positive() {
            return Err(LedgerError::invalid_quantity(
                "receive quantity must be positive",
            ));
        }

        let (unit_cost, value) = match cmd.cost {
            ReceiptCost::PerUnit(unit_cost) => {
                if unit_cost.is_negative() {
                    return Err(LedgerError::invalid_quantity(
                        "unit cost cannot be negative",
                    ));
                }
                (unit_cost, unit_cost * cmd.qty)
            }
            ReceiptCost::Total(total) => {
                if total.is_negative() {
                    return Err(LedgerError::invalid_quantity(
                        "receipt value cannot be negative",
                    ));
                }
                (total / cmd.qty, total)
            }
        };

        let running_qty = self.running_qty + cmd.qty;
        let running_value = self.running_value + value;

        let entry = ValuedLedgerEntry {
            direction: Direction::In,
            qty: cmd.qty,
            unit_cost,
            value,
            running_qty,
            running_value,
            running_avg_cost: running_value / running_qty,
            reference: cmd.reference,
            posted_at: cmd.posted_at,
            user_id: cmd.user_id,
        };

        Ok(vec![StockEvent::Received(StockReceived {
            key: cmd.key,
            entry,
        })])
    }

    fn handle_issue(&self, cmd: &IssueStock) -> Result<Vec<StockEvent>, LedgerError> {
        self.ensure_key(cmd.key)?;

        if !cmd.qty.is_positive() {
            return Err(LedgerError::invalid_quantity(
                "issue quantity must be positive",
            ));
        }
        if cmd.qty > self.running_qty {
            return Err(LedgerError::insufficient_stock(cmd.qty, self.running_qty));
        }

        let consumed = self.consumption_plan(cmd.qty);

        let value = if cmd.qty == self.running_qty {
            // Issuing everything charges everything: drains the running value
            // to exactly zero regardless of method.
            self.running_value
        } else {
            match cmd.method {
                // Charge at the running average, computed as the proportional
                // share of the running value. The average cost of what remains
                // is unchanged under a proportional removal.
                CostingMethod::WeightedAverage => {
                    self.running_value.proportion(cmd.qty, self.running_qty)
                }
                // Charge the consumed lot mix, oldest lots first.
                CostingMethod::Fifo => consumed.iter().map(LotConsumption::value).sum(),
            }
        };

        let running_qty = self.running_qty - cmd.qty;
        let running_value = self.running_value - value;
        let running_avg_cost = if running_qty.is_zero() {
            Money::ZERO
        } else {
            running_value / running_qty
        };

        let entry = ValuedLedgerEntry {
            direction: Direction::Out,
            qty: cmd.qty,
            unit_cost: value / cmd.qty,
            value,
            running_qty,
            running_value,
            running_avg_cost,
            reference: cmd.reference,
            posted_at: cmd.posted_at,
            user_id: cmd.user_id,
        };

        Ok(vec![StockEvent::Issued(StockIssued {
            key: cmd.key,
            entry,
            consumed,
        })])
    }
}
