//! Valued ledger entry types: one record per stock movement, carrying the
//! running quantity/value/average-cost snapshot after that movement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use costbooks_core::{DocRef, Money, Qty, UserId};

/// Movement direction. Values are stored as magnitudes; the direction signs
/// them for display and for the running-balance recurrence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    In,
    Out,
}

/// A distinct receipt batch, tracked individually for FIFO consumption and
/// for the aging report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    /// Receipt time; lots are consumed in ascending order of this.
    pub posted_at: DateTime<Utc>,
    pub unit_cost: Money,
    /// Quantity originally received into the lot.
    pub qty: Qty,
    /// Quantity not yet consumed by later issues.
    pub remaining_qty: Qty,
}

impl Lot {
    pub fn new(posted_at: DateTime<Utc>, unit_cost: Money, qty: Qty) -> Self {
        Self {
            posted_at,
            unit_cost,
            qty,
            remaining_qty: qty,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining_qty.is_zero()
    }

    /// Value of the unconsumed remainder.
    pub fn remaining_value(&self) -> Money {
        self.unit_cost * self.remaining_qty
    }
}

/// One lot's share of an issue. Recorded on the issue entry so each lot is
/// decremented exactly once, and the consumption is auditable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotConsumption {
    /// `posted_at` of the consumed lot.
    pub lot_posted_at: DateTime<Utc>,
    pub qty: Qty,
    pub unit_cost: Money,
}

impl LotConsumption {
    pub fn value(&self) -> Money {
        self.unit_cost * self.qty
    }
}

/// One inventory movement with its running-balance snapshot.
///
/// Entries are immutable once written (corrections are new entries). For a
/// fixed stock key, ordering by `posted_at` (ties broken by insertion order)
/// gives the recurrence
/// `running_qty[n] = running_qty[n-1] ± qty[n]`, likewise for value, with
/// `running_avg_cost = running_value / running_qty` whenever quantity is
/// positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuedLedgerEntry {
    pub direction: Direction,
    pub qty: Qty,
    pub unit_cost: Money,
    /// `qty × unit_cost`, stored as a magnitude.
    pub value: Money,
    /// Snapshot **after** applying this entry.
    pub running_qty: Qty,
    pub running_value: Money,
    /// Zero while the key holds no stock.
    pub running_avg_cost: Money,
    pub reference: DocRef,
    pub posted_at: DateTime<Utc>,
    pub user_id: UserId,
}

impl ValuedLedgerEntry {
    /// The quantity signed by direction (IN positive, OUT negative).
    pub fn signed_qty(&self) -> Qty {
        match self.direction {
            Direction::In => self.qty,
            Direction::Out => Qty::ZERO - self.qty,
        }
    }

    /// The value signed by direction.
    pub fn signed_value(&self) -> Money {
        match self.direction {
            Direction::In => self.value,
            Direction::Out => Money::ZERO - self.value,
        }
    }
}

/// What a movement cost: returned to the orchestrating caller, which builds
/// the matching journal lines from it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostedMovement {
    pub unit_cost: Money,
    pub value: Money,
}
