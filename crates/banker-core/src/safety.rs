//! Safety search
//!
//! Decides whether a ledger state admits an ordering in which every process
//! can obtain its full claim and terminate.
//!
//! # Search order
//!
//! The search is round-based and greedy: each round scans unfinished
//! processes from the lowest id upward and finishes the *first* one whose
//! remaining need fits in the working pool. After every success the scan
//! restarts at id 0, so a low-id process unblocked by the release is always
//! preferred over a higher id that was already satisfiable. The safe/unsafe
//! verdict does not depend on this tie-break; the reported sequence does.
//!
//! Worst case is O(P² × R).

use serde::{Deserialize, Serialize};

use crate::ledger::ResourceLedger;
use crate::types::{fits_within, ProcessId, Units};

/// Outcome of a safety search
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyResult {
    /// Every process can finish; `sequence` is a witness order
    Safe {
        /// Completion order, each process exactly once
        sequence: Vec<ProcessId>,
    },
    /// The search stalled before every process finished
    Unsafe {
        /// Processes that finished before the stall, in completion order
        finished: Vec<ProcessId>,
        /// Processes that could never be satisfied, in id order
        blocked: Vec<ProcessId>,
    },
}

impl SafetyResult {
    /// Whether a safe sequence exists
    pub fn is_safe(&self) -> bool {
        matches!(self, SafetyResult::Safe { .. })
    }

    /// The safe sequence, if one exists
    pub fn sequence(&self) -> Option<&[ProcessId]> {
        match self {
            SafetyResult::Safe { sequence } => Some(sequence),
            SafetyResult::Unsafe { .. } => None,
        }
    }

    /// Consume the result, returning the safe sequence if one exists
    pub fn into_sequence(self) -> Option<Vec<ProcessId>> {
        match self {
            SafetyResult::Safe { sequence } => Some(sequence),
            SafetyResult::Unsafe { .. } => None,
        }
    }
}

/// Stateless safety evaluator.
#[derive(Clone, Copy, Debug, Default)]
pub struct SafetyEngine;

impl SafetyEngine {
    /// Run the safety search over `ledger`. Never mutates the ledger.
    pub fn is_safe(ledger: &ResourceLedger) -> SafetyResult {
        is_safe(ledger)
    }
}

/// Run the safety search over `ledger`.
///
/// # Properties
///
/// 1. **Pure**: works on a private copy of `available`
/// 2. **Deterministic**: the same ledger always yields the same result
/// 3. **Complete**: on success the sequence contains every process once
pub fn is_safe(ledger: &ResourceLedger) -> SafetyResult {
    let n = ledger.num_processes();
    let need = ledger.need_matrix();
    let allocation = ledger.allocation_matrix();

    let mut work: Vec<Units> = ledger.available().to_vec();
    let mut finished = vec![false; n];
    let mut sequence = Vec::with_capacity(n);

    while sequence.len() < n {
        let next = (0..n).find(|&p| !finished[p] && fits_within(&need[p], &work));

        let Some(p) = next else {
            let blocked = (0..n).filter(|&p| !finished[p]).map(ProcessId).collect();
            return SafetyResult::Unsafe {
                finished: sequence,
                blocked,
            };
        };

        for (w, &held) in work.iter_mut().zip(&allocation[p]) {
            *w += held;
        }
        finished[p] = true;
        sequence.push(ProcessId(p));
    }

    SafetyResult::Safe { sequence }
}
