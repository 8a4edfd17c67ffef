//! Originating-document references shared by ledger entries and journal lines.

use serde::{Deserialize, Serialize};

use crate::id::RefId;

/// The kind of business event behind a movement or journal line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefType {
    Purchase,
    Production,
    Sale,
    Adjustment,
    Transfer,
    OpeningBalance,
}

/// Reference to the originating business document. A transfer's OUT and IN
/// legs share one `ref_id`, as do a movement's ledger entry and its journal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocRef {
    pub ref_type: RefType,
    pub ref_id: RefId,
}

impl DocRef {
    pub fn new(ref_type: RefType, ref_id: RefId) -> Self {
        Self { ref_type, ref_id }
    }
}

impl core::fmt::Display for DocRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}:{}", self.ref_type, self.ref_id)
    }
}
