//! The journal poster: validates a draft against the chart of accounts and
//! persists it atomically.

use costbooks_accounting::{ChartOfAccounts, Journal, JournalDraft, JournalLine};
use costbooks_core::LedgerResult;

use crate::journal_store::{JournalStore, UnpostedJournal};

/// Validate-then-persist pipeline for journals.
#[derive(Debug)]
pub struct JournalPoster<C, J> {
    chart: C,
    store: J,
}

impl<C, J> JournalPoster<C, J> {
    pub fn new(chart: C, store: J) -> Self {
        Self { chart, store }
    }

    pub fn store(&self) -> &J {
        &self.store
    }
}

impl<C, J> JournalPoster<C, J>
where
    C: ChartOfAccounts,
    J: JournalStore,
{
    /// Resolve, validate, and persist a journal draft.
    ///
    /// Fails with `UnknownAccount` for unresolvable codes and
    /// `UnbalancedJournal` when debit and credit totals differ; in both cases
    /// nothing is written. On success the journal and all its lines are
    /// persisted atomically under the next sequential number.
    pub fn post_journal(&self, draft: JournalDraft) -> LedgerResult<Journal> {
        let lines = draft.resolve(&self.chart)?;
        let journal = self.store.persist(UnpostedJournal {
            date: draft.date,
            memo: draft.memo,
            posted_by: draft.posted_by,
            lines,
        })?;

        tracing::info!(
            journal_no = journal.journal_no,
            lines = journal.lines.len(),
            "journal posted"
        );

        Ok(journal)
    }

    /// Validation without persistence: the movement service resolves a
    /// movement's account codes up front, before the ledger append commits.
    pub fn validate(&self, draft: &JournalDraft) -> LedgerResult<Vec<JournalLine>> {
        draft.resolve(&self.chart)
    }

    /// Whether a code resolves in the chart (pre-flight check for the
    /// movement service).
    pub fn resolves(&self, code: &str) -> bool {
        self.chart.resolve(code).is_some()
    }
}
