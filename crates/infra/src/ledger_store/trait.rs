use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use costbooks_core::{ExpectedVersion, LedgerResult};
use costbooks_inventory::{StockEvent, StockKey, ValuedLedgerEntry};

/// A committed ledger entry: the decided stock event plus its position in
/// the stream.
///
/// Sequence numbers are assigned by the store during append and are
/// monotonically increasing per stream, with no gaps. They double as the
/// optimistic-concurrency version: an append at `ExpectedVersion::Exact(n)`
/// only succeeds while the stream still ends at `n`, which is what
/// serializes concurrent running-balance updates on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub key: StockKey,
    /// Monotonically increasing position in the stream (1-based).
    pub sequence_number: u64,
    pub event: StockEvent,
}

impl StoredEntry {
    pub fn entry(&self) -> &ValuedLedgerEntry {
        self.event.entry()
    }
}

/// Append-only, per-stock-key valued ledger store.
///
/// The single correctness-critical operation is `append`: it must read the
/// current stream version and write the new entries as one atomic unit. A
/// lost update here corrupts the running balance forever; nothing in this
/// core ever recomputes it from scratch.
///
/// Entries are immutable once written; there is deliberately no update or
/// delete surface. Corrections are new entries.
pub trait ValuedLedgerStore: Send + Sync {
    /// Append events to a stream (append-only, optimistic concurrency).
    ///
    /// Implementations must:
    /// - reject events whose key differs from the stream key
    /// - enforce the expected version against the current stream version
    /// - assign monotonically increasing `sequence_number`s starting at
    ///   `current_version + 1`
    /// - persist the batch atomically (all or nothing)
    fn append(
        &self,
        key: StockKey,
        events: Vec<StockEvent>,
        expected_version: ExpectedVersion,
    ) -> LedgerResult<Vec<StoredEntry>>;

    /// Load the full stream for a key, in sequence order.
    fn load(&self, key: StockKey) -> LedgerResult<Vec<StoredEntry>>;

    /// The most recent entry for a key (stock-on-hand and the next running
    /// balance both come from here).
    fn latest(&self, key: StockKey) -> LedgerResult<Option<StoredEntry>>;

    /// Ordered entries for stock-card/aging reads, filtered to
    /// `posted_at ∈ [from, to]` (either bound optional), ordered by
    /// `posted_at` with ties broken by insertion order.
    fn replay(
        &self,
        key: StockKey,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LedgerResult<Vec<StoredEntry>>;
}

impl<S> ValuedLedgerStore for Arc<S>
where
    S: ValuedLedgerStore + ?Sized,
{
    fn append(
        &self,
        key: StockKey,
        events: Vec<StockEvent>,
        expected_version: ExpectedVersion,
    ) -> LedgerResult<Vec<StoredEntry>> {
        (**self).append(key, events, expected_version)
    }

    fn load(&self, key: StockKey) -> LedgerResult<Vec<StoredEntry>> {
        (**self).load(key)
    }

    fn latest(&self, key: StockKey) -> LedgerResult<Option<StoredEntry>> {
        (**self).latest(key)
    }

    fn replay(
        &self,
        key: StockKey,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LedgerResult<Vec<StoredEntry>> {
        (**self).replay(key, from, to)
    }
}
