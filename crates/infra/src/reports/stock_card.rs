//! Stock card: the ordered movement history of one stock key.

use chrono::{DateTime, Utc};

use costbooks_core::{DocRef, LedgerError, LedgerResult, Money, Qty};
use costbooks_inventory::{Direction, StockKey};

use crate::ledger_store::ValuedLedgerStore;

/// One stock-card row (a rendered ledger entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCardLine {
    pub sequence_number: u64,
    pub posted_at: DateTime<Utc>,
    pub direction: Direction,
    pub reference: DocRef,
    pub qty: Qty,
    pub unit_cost: Money,
    pub value: Money,
    pub running_qty: Qty,
    pub running_value: Money,
    pub running_avg_cost: Money,
}

/// Stock card for one `(item, warehouse)` key over a date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockCard {
    pub key: StockKey,
    pub lines: Vec<StockCardLine>,
}

impl StockCard {
    pub fn closing_qty(&self) -> Qty {
        self.lines.last().map(|l| l.running_qty).unwrap_or(Qty::ZERO)
    }

    pub fn closing_value(&self) -> Money {
        self.lines
            .last()
            .map(|l| l.running_value)
            .unwrap_or(Money::ZERO)
    }
}

/// Builds stock cards by replaying the valued ledger.
#[derive(Debug)]
pub struct StockCardReport<S> {
    store: S,
}

impl<S> StockCardReport<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> StockCardReport<S>
where
    S: ValuedLedgerStore,
{
    pub fn build(
        &self,
        key: StockKey,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LedgerResult<StockCard> {
        let entries = self.store.replay(key, from, to)?;

        let lines = entries
            .iter()
            .map(|stored| {
                let entry = stored.entry();
                StockCardLine {
                    sequence_number: stored.sequence_number,
                    posted_at: entry.posted_at,
                    direction: entry.direction,
                    reference: entry.reference,
                    qty: entry.qty,
                    unit_cost: entry.unit_cost,
                    value: entry.value,
                    running_qty: entry.running_qty,
                    running_value: entry.running_value,
                    running_avg_cost: entry.running_avg_cost,
                }
            })
            .collect();

        Ok(StockCard { key, lines })
    }

    /// Re-derive the running balances from the signed movement amounts and
    /// compare against the stored snapshots at every step.
    ///
    /// A divergence means the append path was bypassed or corrupted; this
    /// check is the report-side witness of the running-balance recurrence.
    pub fn verify_replay(&self, key: StockKey) -> LedgerResult<()> {
        let entries = self.store.replay(key, None, None)?;

        let mut qty = Qty::ZERO;
        let mut value = Money::ZERO;

        for stored in &entries {
            let entry = stored.entry();
            qty += entry.signed_qty();
            value += entry.signed_value();

            if qty < Qty::ZERO {
                return Err(LedgerError::validation(format!(
                    "negative on-hand at sequence {}",
                    stored.sequence_number
                )));
            }
            if qty != entry.running_qty || value != entry.running_value {
                return Err(LedgerError::validation(format!(
                    "running balance diverges at sequence {} (derived {qty}/{value}, stored {}/{})",
                    stored.sequence_number, entry.running_qty, entry.running_value
                )));
            }

            let expected_avg = if qty.is_zero() {
                Money::ZERO
            } else {
                value / qty
            };
            if expected_avg != entry.running_avg_cost {
                return Err(LedgerError::validation(format!(
                    "average cost diverges at sequence {}",
                    stored.sequence_number
                )));
            }
        }

        Ok(())
    }
}
