//! Journal store: atomic persistence of journals and their lines, with
//! sequential journal-number allocation.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryJournalStore;
pub use r#trait::{JournalStore, UnpostedJournal};
