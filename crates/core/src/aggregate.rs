//! Aggregate root trait for the event-sourced ledger domains.

use crate::error::{LedgerError, LedgerResult};

/// Aggregate root marker + minimal interface.
///
/// Intentionally small: the stock ledger and the books decide their own state
/// transitions (pure decision + event application) without any infrastructure
/// concerns leaking in.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Corresponds to the number of entries applied (the stream revision).
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for an append.
///
/// Serializing running-balance appends per stock key relies on this: two
/// writers that both read version `n` cannot both append at `Exact(n)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (replays, migrations).
    Any,
    /// Require the stream to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> LedgerResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(LedgerError::conflict(format!(
                "stale stream version (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

/// Aggregate execution semantics (pure, deterministic).
///
/// - **Decision logic**: `handle(&self, cmd)` returns events.
/// - **State mutation**: `apply(&mut self, event)` evolves state.
///
/// Aggregates must not perform IO or side effects. Replaying the same events
/// in order must rebuild the identical running state; that is what makes the
/// stored running balances replayable at all.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single event.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events to emit given the current state and a command.
    ///
    /// This must not mutate state. State evolution is done through `apply`.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}
