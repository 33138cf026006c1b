//! Allocation session
//!
//! Entry point for all requests. The session:
//! 1. Logs the request to the AuditLog
//! 2. Runs the pure request protocol against the ledger
//! 3. Appends a commit to the CommitLog if the request was granted
//! 4. Logs the decision to the AuditLog
//!
//! The session is the single writer of its ledger. Wrap it in
//! [`SharedSession`](crate::shared::SharedSession) to serve concurrent
//! requesters.

use banker_core::{
    check_all_invariants, is_safe, request, BankerError, Decision, InitialState, LedgerSnapshot,
    Limits, ProcessId, RequestOutcome, ResourceLedger, SafetyResult, Units,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audit::{AuditLog, CommitLog};
use crate::error::{Result, SessionError};

/// A live allocation session.
#[derive(Debug)]
pub struct Session {
    /// Ledger as accepted at start, kept for replay
    genesis: ResourceLedger,
    /// Live ledger
    ledger: ResourceLedger,
    /// Request/decision audit trail
    audit: AuditLog,
    /// Granted deltas
    commits: CommitLog,
}

impl Session {
    /// Build the ledger and accept it only if its initial state is safe.
    pub fn start(limits: &Limits, initial: &InitialState) -> Result<Self> {
        let ledger = ResourceLedger::initialize(limits, initial).map_err(|e| {
            warn!(error = %e, "Ledger initialization rejected");
            e
        })?;

        match is_safe(&ledger) {
            SafetyResult::Safe { sequence } => {
                info!(
                    processes = ledger.num_processes(),
                    resource_types = ledger.num_resource_types(),
                    ?sequence,
                    "Session started in a safe state"
                );
            }
            SafetyResult::Unsafe { blocked, .. } => {
                warn!(?blocked, "Initial state is unsafe, refusing to start");
                return Err(BankerError::UnsafeInitialState { blocked }.into());
            }
        }

        Ok(Self {
            genesis: ledger.clone(),
            ledger,
            audit: AuditLog::new(),
            commits: CommitLog::new(),
        })
    }

    /// Process a resource request.
    pub fn request(&mut self, pid: ProcessId, vector: &[Units]) -> RequestOutcome {
        let request_id = self.audit.log_request(pid, vector);

        let outcome = request(&mut self.ledger, pid, vector);

        match &outcome.decision {
            Decision::Granted { safe_sequence } => {
                // An all-zero grant changes nothing and is not worth a commit
                if vector.iter().all(|&units| units == 0) {
                    info!(process = %pid, "Empty request granted");
                } else {
                    let seq = self.commits.append(pid, vector, request_id);
                    info!(process = %pid, ?vector, seq, "Request granted");
                }
                debug!(
                    process = %pid,
                    ?safe_sequence,
                    available = ?outcome.available,
                    "Safe sequence after grant"
                );
            }
            Decision::Denied { reason } => {
                info!(process = %pid, ?vector, kind = reason.kind(), %reason, "Request denied");
            }
        }

        self.audit.log_response(pid, request_id, outcome.decision.clone());

        debug_assert!(check_all_invariants(&self.ledger).is_empty());
        outcome
    }

    /// Run the safety search over the live ledger.
    pub fn check_safety(&self) -> SafetyResult {
        is_safe(&self.ledger)
    }

    /// Check every ledger invariant.
    pub fn verify(&self) -> Result<()> {
        let violations = check_all_invariants(&self.ledger);
        if violations.is_empty() {
            Ok(())
        } else {
            for v in &violations {
                warn!(invariant = v.invariant, description = %v.description, "Invariant violated");
            }
            Err(SessionError::Integrity { violations })
        }
    }

    /// Rebuild the ledger by re-running every committed grant over the
    /// genesis state, and check it matches the live ledger.
    pub fn replay(&self) -> Result<ResourceLedger> {
        let mut ledger = self.genesis.clone();

        for commit in self.commits.commits() {
            let outcome = request(&mut ledger, commit.process, &commit.delta);
            if let Decision::Denied { reason } = outcome.decision {
                return Err(SessionError::replay(
                    commit.seq,
                    format!("{} was not re-granted: {}", commit.process, reason),
                ));
            }
        }

        if ledger != self.ledger {
            return Err(SessionError::replay(
                self.commits.current_seq(),
                "replayed ledger differs from live ledger",
            ));
        }

        debug!(commits = self.commits.len(), "Replay reproduced live ledger");
        Ok(ledger)
    }

    /// Read-only view of the live ledger
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Copy of every externally visible matrix
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    /// Request/decision audit trail
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Committed grants
    pub fn commits(&self) -> &CommitLog {
        &self.commits
    }

    /// Summary of session activity.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            processes: self.ledger.num_processes(),
            resource_types: self.ledger.num_resource_types(),
            audit_events: self.audit.len(),
            audit_next_id: self.audit.next_id(),
            commits: self.commits.len(),
            commit_seq: self.commits.current_seq(),
        }
    }
}

/// Summary of session state (for debugging/monitoring).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Number of processes
    pub processes: usize,
    /// Number of resource types
    pub resource_types: usize,
    /// Number of retained audit events
    pub audit_events: usize,
    /// Next audit event ID
    pub audit_next_id: u64,
    /// Number of committed grants
    pub commits: usize,
    /// Latest commit sequence number
    pub commit_seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditEventType;
    use banker_core::DenialReason;

    fn textbook() -> InitialState {
        InitialState {
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
        }
    }

    #[test]
    fn test_session_creation() {
        let session = Session::start(&Limits::default(), &textbook()).unwrap();
        assert!(session.audit().is_empty());
        assert!(session.commits().is_empty());
        assert!(session.check_safety().is_safe());
    }

    #[test]
    fn test_session_rejects_unsafe_initial_state() {
        let initial = InitialState {
            num_processes: 2,
            num_resource_types: 1,
            available: vec![0],
            max: vec![vec![2], vec![2]],
            allocation: vec![vec![1], vec![1]],
        };

        let err = Session::start(&Limits::default(), &initial).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Banker(BankerError::UnsafeInitialState { ref blocked })
                if blocked == &vec![ProcessId(0), ProcessId(1)]
        ));
    }

    #[test]
    fn test_session_rejects_bad_dimensions() {
        let limits = Limits {
            max_processes: 2,
            max_resource_types: 3,
        };

        let err = Session::start(&limits, &textbook()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Banker(BankerError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_session_request_no_commit_on_denial() {
        let mut session = Session::start(&Limits::default(), &textbook()).unwrap();

        let outcome = session.request(ProcessId(3), &[1, 0, 0]);

        assert!(!outcome.is_granted());
        assert_eq!(session.audit().len(), 2); // Request + Response
        assert!(session.commits().is_empty());
    }

    #[test]
    fn test_session_request_with_commit() {
        let mut session = Session::start(&Limits::default(), &textbook()).unwrap();

        let outcome = session.request(ProcessId(1), &[1, 0, 2]);

        assert!(outcome.is_granted());
        assert_eq!(session.audit().len(), 2);
        assert_eq!(session.commits().len(), 1);
        assert_eq!(session.commits().commits()[0].caused_by, 0);
        assert_eq!(session.snapshot().available, vec![2, 3, 0]);

        let events = session.audit().events();
        assert!(matches!(
            &events[1].event_type,
            AuditEventType::Response {
                request_id: 0,
                decision: Decision::Granted { .. }
            }
        ));
    }

    #[test]
    fn test_session_unsafe_request_rolled_back() {
        let mut session = Session::start(&Limits::default(), &textbook()).unwrap();
        session.request(ProcessId(1), &[1, 0, 2]);
        let before = session.snapshot();

        let outcome = session.request(ProcessId(0), &[0, 2, 0]);

        assert_eq!(outcome.denial(), Some(&DenialReason::WouldCauseUnsafeState));
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.commits().len(), 1);
        assert!(session.verify().is_ok());
    }

    #[test]
    fn test_session_replay_matches_live_ledger() {
        let mut session = Session::start(&Limits::default(), &textbook()).unwrap();
        session.request(ProcessId(1), &[1, 0, 2]);
        session.request(ProcessId(0), &[0, 2, 0]);
        session.request(ProcessId(2), &[2, 0, 0]);
        session.request(ProcessId(9), &[0, 0, 0]);

        let replayed = session.replay().unwrap();
        assert_eq!(&replayed, session.ledger());
    }

    #[test]
    fn test_empty_grants_are_not_committed() {
        let mut session = Session::start(&Limits::default(), &textbook()).unwrap();

        for _ in 0..3 {
            assert!(session.request(ProcessId(2), &[0, 0, 0]).is_granted());
        }
        session.request(ProcessId(1), &[1, 0, 2]);

        assert_eq!(session.audit().len(), 8);
        assert_eq!(session.commits().len(), 1);
        assert_eq!(session.commits().commits()[0].caused_by, 6);
        assert_eq!(&session.replay().unwrap(), session.ledger());
    }

    #[test]
    fn test_session_summary() {
        let mut session = Session::start(&Limits::default(), &textbook()).unwrap();
        session.request(ProcessId(1), &[1, 0, 2]);
        session.request(ProcessId(4), &[3, 3, 0]);

        let summary = session.summary();
        assert_eq!(summary.processes, 5);
        assert_eq!(summary.audit_events, 4);
        assert_eq!(summary.audit_next_id, 4);
        assert_eq!(summary.commits, 1);
        assert_eq!(summary.commit_seq, 1);
    }
}
