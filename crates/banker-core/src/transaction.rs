//! Ledger transactions
//!
//! A transaction captures the pre-image of everything a single-process
//! delta can touch (the pool and that process's allocation and need rows)
//! before mutating. Aborting writes the pre-image back instead of applying
//! inverse arithmetic, so rollback is exact by construction.
//!
//! ```text
//! begin ──▶ apply ──▶ (verify via ledger()) ──┬──▶ commit
//!                                             └──▶ abort / drop
//! ```

use crate::error::DenialReason;
use crate::ledger::ResourceLedger;
use crate::request::validate;
use crate::types::{ProcessId, Units};

/// Lifecycle of a live transaction. `commit` and `abort` consume it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TxState {
    /// Begun, nothing applied yet
    Open,
    /// A delta has been applied and is visible through `ledger()`
    Tentative,
}

/// Values overwritten by a transaction, restored on abort
struct PreImage {
    available: Vec<Units>,
    allocation_row: Vec<Units>,
    need_row: Vec<Units>,
}

/// An in-flight speculative change to one process's holdings.
///
/// Holds the ledger mutably for its whole lifetime, so nothing else can
/// observe the tentative state. Dropping a transaction that was neither
/// committed nor aborted aborts it.
pub(crate) struct LedgerTransaction<'a> {
    ledger: &'a mut ResourceLedger,
    pid: ProcessId,
    pre_image: Option<PreImage>,
    state: TxState,
}

impl<'a> LedgerTransaction<'a> {
    /// Begin a transaction over `pid`'s rows.
    ///
    /// Returns `None` if `pid` is not in the ledger.
    pub(crate) fn begin(ledger: &'a mut ResourceLedger, pid: ProcessId) -> Option<Self> {
        let pre_image = PreImage {
            available: ledger.available().to_vec(),
            allocation_row: ledger.allocation_of(pid)?.to_vec(),
            need_row: ledger.need_of(pid)?.to_vec(),
        };
        Some(Self {
            ledger,
            pid,
            pre_image: Some(pre_image),
            state: TxState::Open,
        })
    }

    /// Move `delta` units from the pool to the process.
    ///
    /// The delta goes through the same checks as a request. A rejected delta
    /// leaves the ledger and the transaction state untouched.
    pub(crate) fn apply(&mut self, delta: &[Units]) -> Result<(), DenialReason> {
        validate(self.ledger, self.pid, delta)?;
        self.ledger.apply_delta(self.pid, delta);
        self.state = TxState::Tentative;
        Ok(())
    }

    /// Read-only view of the tentative state
    pub(crate) fn ledger(&self) -> &ResourceLedger {
        &*self.ledger
    }

    /// Keep the applied changes.
    pub(crate) fn commit(mut self) {
        debug_assert_eq!(self.state, TxState::Tentative);
        self.pre_image = None;
    }

    /// Restore the pre-image.
    pub(crate) fn abort(mut self) {
        self.rollback();
    }

    fn rollback(&mut self) {
        if let Some(pre) = self.pre_image.take() {
            self.ledger
                .restore(self.pid, pre.available, pre.allocation_row, pre.need_row);
        }
    }
}

impl Drop for LedgerTransaction<'_> {
    fn drop(&mut self) {
        self.rollback();
    }
}
