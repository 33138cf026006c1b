//! Request processing - the heart of the allocator
//!
//! A single request moves through a small state machine:
//!
//! ```text
//! Validating ──(unknown pid / malformed / over claim / over pool)──▶ Denied
//!     │
//!     ▼
//! Tentative ──(safe)──▶ Granted
//!     │
//!     └──(unsafe, pre-image restored)──▶ Denied(WouldCauseUnsafeState)
//! ```
//!
//! Every check in `Validating` happens before any mutation. The transition
//! out of `Tentative` is unconditional and happens within the same call, so
//! callers only ever observe `Granted` or `Denied`.

use serde::{Deserialize, Serialize};

use crate::error::DenialReason;
use crate::ledger::ResourceLedger;
use crate::safety::{is_safe, SafetyResult};
use crate::transaction::LedgerTransaction;
use crate::types::{ProcessId, ResourceId, Units};

/// States of a single request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// Preconditions are being checked; the ledger is untouched
    Validating,
    /// The request has been applied speculatively
    Tentative,
    /// The request was committed
    Granted,
    /// The request was rejected; the ledger is as before the call
    Denied,
}

/// Final decision for a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Request committed
    Granted {
        /// Safe sequence witnessing the new state
        safe_sequence: Vec<ProcessId>,
    },
    /// Request rejected
    Denied {
        /// Why it was rejected
        reason: DenialReason,
    },
}

/// Everything a caller needs to report on a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Requesting process
    pub process: ProcessId,
    /// Request vector as supplied
    pub request: Vec<Units>,
    /// Granted or denied
    pub decision: Decision,
    /// Available vector after the call
    pub available: Vec<Units>,
    /// Allocation matrix after the call
    pub allocation: Vec<Vec<Units>>,
}

impl RequestOutcome {
    fn new(
        ledger: &ResourceLedger,
        process: ProcessId,
        request: &[Units],
        decision: Decision,
    ) -> Self {
        Self {
            process,
            request: request.to_vec(),
            decision,
            available: ledger.snapshot_available(),
            allocation: ledger.snapshot_allocation(),
        }
    }

    /// Whether the request was granted
    pub fn is_granted(&self) -> bool {
        matches!(self.decision, Decision::Granted { .. })
    }

    /// Terminal state reached by the request
    pub fn final_state(&self) -> RequestState {
        match self.decision {
            Decision::Granted { .. } => RequestState::Granted,
            Decision::Denied { .. } => RequestState::Denied,
        }
    }

    /// Denial reason, if the request was denied
    pub fn denial(&self) -> Option<&DenialReason> {
        match &self.decision {
            Decision::Granted { .. } => None,
            Decision::Denied { reason } => Some(reason),
        }
    }

    /// Safe sequence reported for a granted request
    pub fn safe_sequence(&self) -> Option<&[ProcessId]> {
        match &self.decision {
            Decision::Granted { safe_sequence } => Some(safe_sequence),
            Decision::Denied { .. } => None,
        }
    }
}

/// Stateless request processor.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestProcessor;

impl RequestProcessor {
    /// Process a resource request against `ledger`.
    pub fn request(
        ledger: &mut ResourceLedger,
        pid: ProcessId,
        request: &[Units],
    ) -> RequestOutcome {
        self::request(ledger, pid, request)
    }
}

/// Process a resource request against `ledger`.
///
/// # Properties
///
/// 1. **Atomic**: the ledger either ends in the committed state or is
///    bit-identical to its state before the call
/// 2. **Deterministic**: same ledger and request always give the same outcome
/// 3. **Validated**: no mutation happens before all preconditions pass
pub fn request(ledger: &mut ResourceLedger, pid: ProcessId, request: &[Units]) -> RequestOutcome {
    if let Err(reason) = validate(ledger, pid, request) {
        return RequestOutcome::new(ledger, pid, request, Decision::Denied { reason });
    }

    let decision = match LedgerTransaction::begin(ledger, pid) {
        Some(mut tx) => match tx.apply(request) {
            Err(reason) => Decision::Denied { reason },
            Ok(()) => match is_safe(tx.ledger()) {
                SafetyResult::Safe { sequence } => {
                    tx.commit();
                    Decision::Granted {
                        safe_sequence: sequence,
                    }
                }
                SafetyResult::Unsafe { .. } => {
                    tx.abort();
                    Decision::Denied {
                        reason: DenialReason::WouldCauseUnsafeState,
                    }
                }
            },
        },
        None => Decision::Denied {
            reason: DenialReason::UnknownProcess { process: pid },
        },
    };

    RequestOutcome::new(ledger, pid, request, decision)
}

/// Check every precondition of a request without touching the ledger.
pub fn validate(
    ledger: &ResourceLedger,
    pid: ProcessId,
    request: &[Units],
) -> Result<(), DenialReason> {
    let Some(need) = ledger.need_of(pid) else {
        return Err(DenialReason::UnknownProcess { process: pid });
    };

    if request.len() != ledger.num_resource_types() {
        return Err(DenialReason::InvalidRequest {
            message: format!(
                "request has {} entries, expected {}",
                request.len(),
                ledger.num_resource_types()
            ),
        });
    }
    if let Some(r) = request.iter().position(|&units| units < 0) {
        return Err(DenialReason::InvalidRequest {
            message: format!("request for R{} is negative ({})", r, request[r]),
        });
    }

    if let Some(r) = (0..request.len()).find(|&r| request[r] > need[r]) {
        return Err(DenialReason::ClaimExceeded {
            process: pid,
            resource: ResourceId(r),
            requested: request[r],
            need: need[r],
        });
    }

    let available = ledger.available();
    if let Some(r) = (0..request.len()).find(|&r| request[r] > available[r]) {
        return Err(DenialReason::InsufficientResources {
            process: pid,
            resource: ResourceId(r),
            requested: request[r],
            available: available[r],
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::check_all_invariants;
    use crate::types::{InitialState, Limits};

    fn pids(ids: &[usize]) -> Vec<ProcessId> {
        ids.iter().copied().map(ProcessId).collect()
    }

    fn textbook() -> ResourceLedger {
        ResourceLedger::initialize(
            &Limits::default(),
            &InitialState {
                num_processes: 5,
                num_resource_types: 3,
                available: vec![3, 3, 2],
                max: vec![
                    vec![7, 5, 3],
                    vec![3, 2, 2],
                    vec![9, 0, 2],
                    vec![2, 2, 2],
                    vec![4, 3, 3],
                ],
                allocation: vec![
                    vec![0, 1, 0],
                    vec![2, 0, 0],
                    vec![3, 0, 2],
                    vec![2, 1, 1],
                    vec![0, 0, 2],
                ],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_request_granted() {
        let mut ledger = textbook();

        let outcome = request(&mut ledger, ProcessId(1), &[1, 0, 2]);

        assert!(outcome.is_granted());
        assert_eq!(outcome.final_state(), RequestState::Granted);
        assert_eq!(outcome.safe_sequence(), Some(&pids(&[1, 3, 0, 2, 4])[..]));
        assert_eq!(outcome.available, vec![2, 3, 0]);
        assert_eq!(outcome.allocation[1], vec![3, 0, 2]);
        assert_eq!(ledger.need_of(ProcessId(1)), Some(&[0, 2, 0][..]));
        assert!(check_all_invariants(&ledger).is_empty());
    }

    #[test]
    fn test_request_from_initial_state_resolves_deterministically() {
        let mut ledger = textbook();

        let outcome = request(&mut ledger, ProcessId(0), &[0, 2, 0]);

        assert!(outcome.is_granted());
        assert_eq!(outcome.safe_sequence(), Some(&pids(&[3, 1, 0, 2, 4])[..]));
        assert_eq!(ledger.available(), &[3, 1, 2]);
    }

    #[test]
    fn test_unsafe_request_is_rolled_back() {
        let mut ledger = textbook();
        assert!(request(&mut ledger, ProcessId(1), &[1, 0, 2]).is_granted());
        let before = ledger.clone();

        let outcome = request(&mut ledger, ProcessId(0), &[0, 2, 0]);

        assert_eq!(outcome.denial(), Some(&DenialReason::WouldCauseUnsafeState));
        assert_eq!(outcome.final_state(), RequestState::Denied);
        assert_eq!(ledger, before);
        assert_eq!(outcome.available, vec![2, 3, 0]);
    }

    #[test]
    fn test_request_over_claim() {
        let mut ledger = textbook();
        let before = ledger.clone();

        let outcome = request(&mut ledger, ProcessId(3), &[1, 0, 0]);

        assert_eq!(
            outcome.denial(),
            Some(&DenialReason::ClaimExceeded {
                process: ProcessId(3),
                resource: ResourceId(0),
                requested: 1,
                need: 0,
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_request_over_availability() {
        let mut ledger = textbook();
        let before = ledger.clone();

        let outcome = request(&mut ledger, ProcessId(0), &[0, 4, 0]);

        assert_eq!(
            outcome.denial(),
            Some(&DenialReason::InsufficientResources {
                process: ProcessId(0),
                resource: ResourceId(1),
                requested: 4,
                available: 3,
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_claim_checked_before_availability() {
        let mut ledger = textbook();

        // Over P1's claim on R0 and over the pool on R2
        let outcome = request(&mut ledger, ProcessId(1), &[2, 0, 3]);

        assert_eq!(outcome.denial().map(DenialReason::kind), Some("claim_exceeded"));
    }

    #[test]
    fn test_unknown_process() {
        let mut ledger = textbook();
        let before = ledger.clone();

        let outcome = request(&mut ledger, ProcessId(5), &[0, 0, 0]);

        assert_eq!(
            outcome.denial(),
            Some(&DenialReason::UnknownProcess {
                process: ProcessId(5)
            })
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_negative_entries_are_rejected() {
        let mut ledger = textbook();
        let before = ledger.clone();

        let outcome = request(&mut ledger, ProcessId(2), &[-1, 0, 0]);

        assert_eq!(outcome.denial().map(DenialReason::kind), Some("invalid_request"));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let mut ledger = textbook();

        let outcome = request(&mut ledger, ProcessId(2), &[1, 0]);

        assert_eq!(outcome.denial().map(DenialReason::kind), Some("invalid_request"));
    }

    #[test]
    fn test_rejection_is_idempotent() {
        let mut ledger = textbook();
        let before = ledger.clone();

        let first = request(&mut ledger, ProcessId(4), &[4, 0, 0]);
        let second = request(&mut ledger, ProcessId(4), &[4, 0, 0]);

        assert_eq!(first, second);
        assert_eq!(first.denial().map(DenialReason::kind), Some("insufficient_resources"));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_zero_request_is_granted_without_change() {
        let mut ledger = textbook();
        let before = ledger.clone();

        let outcome = RequestProcessor::request(&mut ledger, ProcessId(2), &[0, 0, 0]);

        assert!(outcome.is_granted());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_grant_is_monotonic() {
        let mut ledger = textbook();
        let requests: [(usize, [Units; 3]); 4] = [
            (1, [1, 0, 2]),
            (3, [0, 1, 1]),
            (4, [0, 2, 0]),
            (2, [2, 0, 0]),
        ];

        for (p, vector) in requests {
            let pid = ProcessId(p);
            let available_before = ledger.available().to_vec();
            let alloc_before = ledger.allocation_of(pid).unwrap().to_vec();
            let need_before = ledger.need_of(pid).unwrap().to_vec();

            let outcome = request(&mut ledger, pid, &vector);
            if !outcome.is_granted() {
                assert_eq!(ledger.available(), &available_before[..]);
                continue;
            }

            for r in 0..3 {
                assert_eq!(ledger.available()[r], available_before[r] - vector[r]);
                assert_eq!(ledger.allocation_of(pid).unwrap()[r], alloc_before[r] + vector[r]);
                assert_eq!(ledger.need_of(pid).unwrap()[r], need_before[r] - vector[r]);
            }
            assert!(check_all_invariants(&ledger).is_empty());
        }
    }
}
