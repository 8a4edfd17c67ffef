use std::sync::RwLock;

use chrono::{DateTime, Utc};

use costbooks_accounting::Journal;
use costbooks_core::{JournalId, LedgerError, LedgerResult};

use super::r#trait::{JournalStore, UnpostedJournal};

/// In-memory append-only journal store.
///
/// One write lock covers number allocation and the push, so `journal_no` is
/// gapless and a journal appears with all its lines or not at all.
#[derive(Debug, Default)]
pub struct InMemoryJournalStore {
    journals: RwLock<Vec<Journal>>,
}

impl InMemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JournalStore for InMemoryJournalStore {
    fn persist(&self, journal: UnpostedJournal) -> LedgerResult<Journal> {
        let mut journals = self
            .journals
            .write()
            .map_err(|_| LedgerError::validation("lock poisoned"))?;

        let posted = Journal {
            id: JournalId::new(),
            journal_no: journals.len() as u64 + 1,
            date: journal.date,
            memo: journal.memo,
            posted_by: journal.posted_by,
            lines: journal.lines,
        };
        journals.push(posted.clone());

        Ok(posted)
    }

    fn get(&self, id: JournalId) -> LedgerResult<Option<Journal>> {
        let journals = self
            .journals
            .read()
            .map_err(|_| LedgerError::validation("lock poisoned"))?;

        Ok(journals.iter().find(|j| j.id == id).cloned())
    }

    fn journals(&self) -> LedgerResult<Vec<Journal>> {
        let journals = self
            .journals
            .read()
            .map_err(|_| LedgerError::validation("lock poisoned"))?;

        Ok(journals.clone())
    }

    fn in_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LedgerResult<Vec<Journal>> {
        let mut journals = self.journals()?;
        journals.retain(|j| from.is_none_or(|f| j.date >= f) && to.is_none_or(|t| j.date <= t));
        Ok(journals)
    }
}
