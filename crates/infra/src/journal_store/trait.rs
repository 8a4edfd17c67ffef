use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use costbooks_accounting::{Journal, JournalLine};
use costbooks_core::{JournalId, LedgerResult, UserId};

/// A validated journal awaiting its number: lines are already resolved and
/// balanced, the store only assigns identity and position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpostedJournal {
    pub date: DateTime<Utc>,
    pub memo: String,
    pub posted_by: UserId,
    pub lines: Vec<JournalLine>,
}

/// Append-only journal persistence.
///
/// `persist` must allocate the next sequential `journal_no` and write the
/// journal with all its lines as one atomic unit. There is no update or
/// delete surface: corrections are new journals with swapped legs, composed
/// by the caller.
pub trait JournalStore: Send + Sync {
    fn persist(&self, journal: UnpostedJournal) -> LedgerResult<Journal>;

    fn get(&self, id: JournalId) -> LedgerResult<Option<Journal>>;

    /// All journals in posting order.
    fn journals(&self) -> LedgerResult<Vec<Journal>>;

    /// Journals with `date ∈ [from, to]` (either bound optional), in posting
    /// order. Feeds the trial-balance/general-ledger reads.
    fn in_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LedgerResult<Vec<Journal>>;
}

impl<S> JournalStore for Arc<S>
where
    S: JournalStore + ?Sized,
{
    fn persist(&self, journal: UnpostedJournal) -> LedgerResult<Journal> {
        (**self).persist(journal)
    }

    fn get(&self, id: JournalId) -> LedgerResult<Option<Journal>> {
        (**self).get(id)
    }

    fn journals(&self) -> LedgerResult<Vec<Journal>> {
        (**self).journals()
    }

    fn in_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LedgerResult<Vec<Journal>> {
        (**self).in_range(from, to)
    }
}
