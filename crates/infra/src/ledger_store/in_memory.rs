use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use costbooks_core::{ExpectedVersion, LedgerError, LedgerResult};
use costbooks_inventory::{StockEvent, StockKey};

use super::r#trait::{StoredEntry, ValuedLedgerStore};

/// In-memory append-only valued ledger store.
///
/// The write lock makes each append a single critical section (version check
/// + sequence assignment + push), so readers never observe a partially
/// written batch. Intended for tests/dev; not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryValuedLedgerStore {
    streams: RwLock<HashMap<StockKey, Vec<StoredEntry>>>,
}

impl InMemoryValuedLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_version(stream: &[StoredEntry]) -> u64 {
        stream.last().map(|e| e.sequence_number).unwrap_or(0)
    }
}

impl ValuedLedgerStore for InMemoryValuedLedgerStore {
    fn append(
        &self,
        key: StockKey,
        events: Vec<StockEvent>,
        expected_version: ExpectedVersion,
    ) -> LedgerResult<Vec<StoredEntry>> {
        if events.is_empty() {
            return Ok(vec![]);
        }

        // All events must target the stream they are appended to.
        for (idx, e) in events.iter().enumerate() {
            if e.key() != key {
                return Err(LedgerError::validation(format!(
                    "batch contains an event for another stock key (index {idx})"
                )));
            }
        }

        let mut streams = self
            .streams
            .write()
            .map_err(|_| LedgerError::validation("lock poisoned"))?;

        let stream = streams.entry(key).or_default();
        let current = Self::current_version(stream);

        if !expected_version.matches(current) {
            return Err(LedgerError::conflict(format!(
                "expected {expected_version:?}, found {current}"
            )));
        }

        // Assign sequence numbers and append (append-only).
        let mut next = current + 1;
        let mut committed = Vec::with_capacity(events.len());
        for event in events {
            let stored = StoredEntry {
                key,
                sequence_number: next,
                event,
            };
            next += 1;
            stream.push(stored.clone());
            committed.push(stored);
        }

        Ok(committed)
    }

    fn load(&self, key: StockKey) -> LedgerResult<Vec<StoredEntry>> {
        let streams = self
            .streams
            .read()
            .map_err(|_| LedgerError::validation("lock poisoned"))?;

        Ok(streams.get(&key).cloned().unwrap_or_default())
    }

    fn latest(&self, key: StockKey) -> LedgerResult<Option<StoredEntry>> {
        let streams = self
            .streams
            .read()
            .map_err(|_| LedgerError::validation("lock poisoned"))?;

        Ok(streams.get(&key).and_then(|s| s.last().cloned()))
    }

    fn replay(
        &self,
        key: StockKey,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LedgerResult<Vec<StoredEntry>> {
        let mut entries = self.load(key)?;

        entries.retain(|e| {
            let at = e.entry().posted_at;
            from.is_none_or(|f| at >= f) && to.is_none_or(|t| at <= t)
        });
        // Business time first, insertion order for ties.
        entries.sort_by_key(|e| (e.entry().posted_at, e.sequence_number));

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use costbooks_core::{Aggregate, DocRef, Money, Qty, RefId, RefType, UserId};
    use costbooks_inventory::{
        CostingMethod, IssueStock, ReceiptCost, ReceiveStock, StockCommand, StockLedger,
    };
    use rust_decimal_macros::dec;

    fn test_key() -> StockKey {
        StockKey::new(costbooks_core::ItemId::new(), costbooks_core::WarehouseId::new())
    }

    fn receive_event(
        ledger: &mut StockLedger,
        qty: rust_decimal::Decimal,
        unit_cost: rust_decimal::Decimal,
        posted_at: DateTime<Utc>,
    ) -> StockEvent {
        let cmd = StockCommand::Receive(ReceiveStock {
            key: ledger.key(),
            qty: Qty::new(qty),
            cost: ReceiptCost::PerUnit(Money::new(unit_cost)),
            method: CostingMethod::Fifo,
            reference: DocRef::new(RefType::Purchase, RefId::new()),
            user_id: UserId::new(),
            posted_at,
        });
        let event = ledger.handle(&cmd).unwrap().remove(0);
        ledger.apply(&event);
        event
    }

    fn issue_event(
        ledger: &mut StockLedger,
        qty: rust_decimal::Decimal,
        posted_at: DateTime<Utc>,
    ) -> StockEvent {
        let cmd = StockCommand::Issue(IssueStock {
            key: ledger.key(),
            qty: Qty::new(qty),
            method: CostingMethod::Fifo,
            reference: DocRef::new(RefType::Sale, RefId::new()),
            user_id: UserId::new(),
            posted_at,
        });
        let event = ledger.handle(&cmd).unwrap().remove(0);
        ledger.apply(&event);
        event
    }

    #[test]
    fn append_assigns_monotonic_sequence_numbers() {
        let store = InMemoryValuedLedgerStore::new();
        let key = test_key();
        let mut ledger = StockLedger::empty(key);
        let now = Utc::now();

        let first = receive_event(&mut ledger, dec!(10), dec!(5), now);
        let second = receive_event(&mut ledger, dec!(4), dec!(6), now);

        let committed = store
            .append(key, vec![first, second], ExpectedVersion::Exact(0))
            .unwrap();
        assert_eq!(committed[0].sequence_number, 1);
        assert_eq!(committed[1].sequence_number, 2);
        assert_eq!(store.latest(key).unwrap().unwrap().sequence_number, 2);
    }

    #[test]
    fn stale_expected_version_is_rejected_without_writing() {
        let store = InMemoryValuedLedgerStore::new();
        let key = test_key();
        let mut ledger = StockLedger::empty(key);
        let now = Utc::now();

        let event = receive_event(&mut ledger, dec!(10), dec!(5), now);
        store
            .append(key, vec![event.clone()], ExpectedVersion::Exact(0))
            .unwrap();

        // A second writer that also read version 0 must lose.
        let err = store
            .append(key, vec![event], ExpectedVersion::Exact(0))
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.load(key).unwrap().len(), 1);
    }

    #[test]
    fn events_for_another_key_are_rejected() {
        let store = InMemoryValuedLedgerStore::new();
        let key = test_key();
        let mut other = StockLedger::empty(test_key());
        let event = receive_event(&mut other, dec!(1), dec!(1), Utc::now());

        let err = store
            .append(key, vec![event], ExpectedVersion::Exact(0))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(store.load(key).unwrap().is_empty());
    }

    #[test]
    fn replay_filters_by_posted_at_range() {
        let store = InMemoryValuedLedgerStore::new();
        let key = test_key();
        let mut ledger = StockLedger::empty(key);
        let base = Utc::now();

        let events = vec![
            receive_event(&mut ledger, dec!(10), dec!(5), base),
            receive_event(&mut ledger, dec!(5), dec!(6), base + Duration::days(1)),
            issue_event(&mut ledger, dec!(8), base + Duration::days(2)),
        ];
        store.append(key, events, ExpectedVersion::Exact(0)).unwrap();

        let window = store
            .replay(key, Some(base + Duration::hours(1)), None)
            .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].sequence_number, 2);

        let all = store.replay(key, None, None).unwrap();
        assert_eq!(all.len(), 3);
    }
}
