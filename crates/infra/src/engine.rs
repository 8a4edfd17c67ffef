//! The costing engine: executes receive/issue commands against the valued
//! ledger store.
//!
//! Pipeline per call: load the key's stream → rehydrate the stock ledger →
//! decide the entry (pure) → append with an exact expected version. A
//! concurrent writer on the same key makes the append fail its version check;
//! the engine retries the whole pipeline a bounded number of times before
//! surfacing the conflict, which is safe because nothing commits before the
//! append.

use chrono::Utc;

use costbooks_core::{
    Aggregate, AggregateRoot, DocRef, ExpectedVersion, LedgerError, LedgerResult, Money, Qty,
    UserId,
};
use costbooks_inventory::{
    CostedMovement, CostingMethod, IssueStock, ReceiptCost, ReceiveStock, StockCommand,
    StockEvent, StockIssued, StockKey, StockLedger,
};

use crate::ledger_store::{StoredEntry, ValuedLedgerStore};

const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Costing calculator + append pipeline over a [`ValuedLedgerStore`].
#[derive(Debug)]
pub struct CostingEngine<S> {
    store: S,
    conflict_retries: u32,
}

impl<S> CostingEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }

    pub fn with_conflict_retries(store: S, conflict_retries: u32) -> Self {
        Self {
            store,
            conflict_retries,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> CostingEngine<S>
where
    S: ValuedLedgerStore,
{
    /// Receive stock at a unit cost. Returns what the movement cost so the
    /// caller can build the matching journal lines.
    pub fn receive_inventory(
        &self,
        key: StockKey,
        qty: Qty,
        unit_cost: Money,
        method: CostingMethod,
        reference: DocRef,
        user_id: UserId,
    ) -> LedgerResult<CostedMovement> {
        self.receive(key, qty, ReceiptCost::PerUnit(unit_cost), method, reference, user_id)
    }

    /// Receive stock carrying a total value rather than a unit price
    /// (transfer-in legs, finished goods at accumulated production cost).
    pub fn receive_inventory_at_value(
        &self,
        key: StockKey,
        qty: Qty,
        value: Money,
        method: CostingMethod,
        reference: DocRef,
        user_id: UserId,
    ) -> LedgerResult<CostedMovement> {
        self.receive(key, qty, ReceiptCost::Total(value), method, reference, user_id)
    }

    /// Issue stock, costed per the supplied method.
    pub fn issue_inventory(
        &self,
        key: StockKey,
        qty: Qty,
        method: CostingMethod,
        reference: DocRef,
        user_id: UserId,
    ) -> LedgerResult<CostedMovement> {
        self.issue_inventory_detailed(key, qty, method, reference, user_id)
            .map(|issued| CostedMovement {
                unit_cost: issued.entry.unit_cost,
                value: issued.entry.value,
            })
    }

    /// Issue stock and return the full entry with its per-lot consumption
    /// breakdown (transfers mirror it into the destination warehouse).
    pub fn issue_inventory_detailed(
        &self,
        key: StockKey,
        qty: Qty,
        method: CostingMethod,
        reference: DocRef,
        user_id: UserId,
    ) -> LedgerResult<StockIssued> {
        let command = StockCommand::Issue(IssueStock {
            key,
            qty,
            method,
            reference,
            user_id,
            posted_at: Utc::now(),
        });

        match self.execute(key, command)? {
            StockEvent::Issued(issued) => Ok(issued),
            StockEvent::Received(_) => {
                Err(LedgerError::validation("issue command produced a receipt"))
            }
        }
    }

    fn receive(
        &self,
        key: StockKey,
        qty: Qty,
        cost: ReceiptCost,
        method: CostingMethod,
        reference: DocRef,
        user_id: UserId,
    ) -> LedgerResult<CostedMovement> {
        let command = StockCommand::Receive(ReceiveStock {
            key,
            qty,
            cost,
            method,
            reference,
            user_id,
            posted_at: Utc::now(),
        });

        self.execute(key, command).map(|event| event.costed())
    }

    /// Run the full pipeline, retrying on version conflicts.
    fn execute(&self, key: StockKey, command: StockCommand) -> LedgerResult<StockEvent> {
        let mut attempt = 0;
        loop {
            match self.try_execute(key, &command) {
                Err(err @ LedgerError::ConcurrencyConflict(_)) => {
                    attempt += 1;
                    if attempt > self.conflict_retries {
                        return Err(err);
                    }
                    tracing::debug!(%key, attempt, "retrying append after version conflict");
                }
                other => return other,
            }
        }
    }

    fn try_execute(&self, key: StockKey, command: &StockCommand) -> LedgerResult<StockEvent> {
        // 1) Load history for the key.
        let history = self.store.load(key)?;
        validate_loaded_stream(key, &history)?;
        let expected = ExpectedVersion::Exact(stream_version(&history));

        // 2) Rehydrate the stock ledger.
        let mut ledger = StockLedger::empty(key);
        for stored in &history {
            ledger.apply(&stored.event);
        }
        debug_assert_eq!(ledger.version(), stream_version(&history));

        // 3) Decide the entry (no mutation).
        let decided = ledger.handle(command)?;

        // 4) Persist (append-only, optimistic).
        let mut committed = self.store.append(key, decided, expected)?;
        let event = committed
            .pop()
            .map(|stored: StoredEntry| stored.event)
            .ok_or_else(|| LedgerError::validation("append committed no entries"))?;

        tracing::debug!(
            %key,
            qty = %event.entry().qty,
            value = %event.entry().value,
            running_qty = %event.entry().running_qty,
            "stock movement appended"
        );

        Ok(event)
    }
}

fn stream_version(stream: &[StoredEntry]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

fn validate_loaded_stream(key: StockKey, stream: &[StoredEntry]) -> LedgerResult<()> {
    // Defense in depth: even a buggy backend must not feed another key's
    // entries (or a reordered stream) into the running balance.
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.key != key {
            return Err(LedgerError::validation(format!(
                "loaded stream contains wrong stock key at index {idx}"
            )));
        }
        if e.sequence_number <= last {
            return Err(LedgerError::validation(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            )));
        }
        last = e.sequence_number;
    }
    Ok(())
}
