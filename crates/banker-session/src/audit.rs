//! Audit trail
//!
//! Two append-only logs kept by every session:
//!
//! - [`AuditLog`] records each request and the decision it received. It is
//!   for auditing and is capped in memory.
//! - [`CommitLog`] records each granted delta. It is never trimmed, so the
//!   live ledger can always be rebuilt by replaying it over the genesis state.

use banker_core::{Decision, ProcessId, Units};
use serde::{Deserialize, Serialize};

/// Monotonic audit event identifier
pub type EventId = u64;

/// Maximum number of audit events to keep in memory
const MAX_AUDIT_EVENTS: usize = 10000;

/// A request or its response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID (monotonic)
    pub id: EventId,
    /// Process the event concerns
    pub process: ProcessId,
    /// Request or response payload
    pub event_type: AuditEventType,
}

/// Type of audit event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventType {
    /// Resource request from a process
    Request {
        /// Requested units per resource type
        vector: Vec<Units>,
    },
    /// Decision returned for a request
    Response {
        /// ID of the request this responds to
        request_id: EventId,
        /// Granted or denied, with reason
        decision: Decision,
    },
}

/// Request/response log for auditing.
///
/// Events are append-only with monotonic IDs.
#[derive(Debug, Default)]
pub struct AuditLog {
    /// Event entries (append-only)
    events: Vec<AuditEvent>,
    /// Next event ID to assign
    next_id: EventId,
}

impl AuditLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a request.
    ///
    /// Returns the event ID for correlating with the response.
    pub fn log_request(&mut self, process: ProcessId, vector: &[Units]) -> EventId {
        self.push(
            process,
            AuditEventType::Request {
                vector: vector.to_vec(),
            },
        )
    }

    /// Log the decision for a request.
    pub fn log_response(&mut self, process: ProcessId, request_id: EventId, decision: Decision) {
        self.push(
            process,
            AuditEventType::Response {
                request_id,
                decision,
            },
        );
    }

    fn push(&mut self, process: ProcessId, event_type: AuditEventType) -> EventId {
        let id = self.next_id;
        self.next_id += 1;

        self.events.push(AuditEvent {
            id,
            process,
            event_type,
        });

        self.trim_if_needed();
        id
    }

    /// Get all retained events.
    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }

    /// Get the most recent N events, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<&AuditEvent> {
        self.events.iter().rev().take(count).collect()
    }

    /// Get every retained event concerning `process`.
    pub fn for_process(&self, process: ProcessId) -> Vec<&AuditEvent> {
        self.events.iter().filter(|e| e.process == process).collect()
    }

    /// Get the number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get the next event ID.
    pub fn next_id(&self) -> EventId {
        self.next_id
    }

    /// Trim old events if exceeding max capacity.
    fn trim_if_needed(&mut self) {
        if self.events.len() > MAX_AUDIT_EVENTS {
            let drain_count = self.events.len() - MAX_AUDIT_EVENTS;
            self.events.drain(0..drain_count);
        }
    }
}

/// A committed grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Sequence number (1-based; 0 is genesis)
    pub seq: u64,
    /// Request event that caused this commit
    pub caused_by: EventId,
    /// Process that received the units
    pub process: ProcessId,
    /// Units moved from the pool to the process
    pub delta: Vec<Units>,
}

/// Log of every committed grant, in order.
#[derive(Debug, Default)]
pub struct CommitLog {
    commits: Vec<Commit>,
}

impl CommitLog {
    /// Create an empty commit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a grant, returning its sequence number.
    pub fn append(&mut self, process: ProcessId, delta: &[Units], caused_by: EventId) -> u64 {
        let seq = self.current_seq() + 1;
        self.commits.push(Commit {
            seq,
            caused_by,
            process,
            delta: delta.to_vec(),
        });
        seq
    }

    /// All commits in order.
    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    /// Sequence number of the latest commit (0 if none).
    pub fn current_seq(&self) -> u64 {
        self.commits.last().map_or(0, |c| c.seq)
    }

    /// Number of commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Check if no grant has been committed.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banker_core::DenialReason;

    #[test]
    fn test_audit_log_creation() {
        let log = AuditLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert_eq!(log.next_id(), 0);
    }

    #[test]
    fn test_audit_request_response() {
        let mut log = AuditLog::new();

        let req_id = log.log_request(ProcessId(1), &[1, 0, 2]);
        assert_eq!(req_id, 0);

        log.log_response(
            ProcessId(1),
            req_id,
            Decision::Denied {
                reason: DenialReason::WouldCauseUnsafeState,
            },
        );

        assert_eq!(log.len(), 2);

        let events = log.events();
        assert!(matches!(
            &events[0].event_type,
            AuditEventType::Request { vector } if vector == &vec![1, 0, 2]
        ));
        assert!(matches!(
            &events[1].event_type,
            AuditEventType::Response { request_id: 0, .. }
        ));
    }

    #[test]
    fn test_audit_get_recent_and_filter() {
        let mut log = AuditLog::new();

        for i in 0..10 {
            log.log_request(ProcessId(i % 2), &[i as Units]);
        }

        let recent = log.get_recent(3);
        assert_eq!(recent.len(), 3);
        // Most recent first
        assert_eq!(recent[0].id, 9);
        assert_eq!(recent[2].id, 7);

        assert_eq!(log.for_process(ProcessId(0)).len(), 5);
    }

    #[test]
    fn test_audit_log_is_capped() {
        let mut log = AuditLog::new();

        for _ in 0..(MAX_AUDIT_EVENTS + 5) {
            log.log_request(ProcessId(0), &[0]);
        }

        assert_eq!(log.len(), MAX_AUDIT_EVENTS);
        assert_eq!(log.events()[0].id, 5);
        assert_eq!(log.next_id(), (MAX_AUDIT_EVENTS + 5) as u64);
    }

    #[test]
    fn test_commit_log_sequence() {
        let mut commits = CommitLog::new();
        assert_eq!(commits.current_seq(), 0);

        assert_eq!(commits.append(ProcessId(1), &[1, 0, 2], 0), 1);
        assert_eq!(commits.append(ProcessId(3), &[0, 1, 0], 4), 2);

        assert_eq!(commits.len(), 2);
        assert_eq!(commits.commits()[1].caused_by, 4);
        assert_eq!(commits.current_seq(), 2);
    }
}
