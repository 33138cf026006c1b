//! Banker Core - Pure Deadlock-Avoidance State Machine
//!
//! This crate contains the **pure, I/O-free** Banker's Algorithm engine:
//! the resource ledger, the safety search and the transactional request
//! protocol. Logging, auditing and configuration live in `banker-session`.
//!
//! # Design Principles
//!
//! 1. **No I/O or side effects**: Pure state transformations only
//! 2. **Deterministic**: Same ledger and request always produce the same outcome
//! 3. **Single mutation path**: Every change flows through `LedgerTransaction`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       banker-core                           │
//! │                                                             │
//! │   ┌────────────────┐    ┌────────────────┐                  │
//! │   │ ResourceLedger │    │   request()    │                  │
//! │   │  - available   │───▶│ validate, then │                  │
//! │   │  - max         │    │ LedgerTx apply │                  │
//! │   │  - allocation  │    └───────┬────────┘                  │
//! │   │  - need        │            │ verify                    │
//! │   └────────────────┘            ▼                           │
//! │                         ┌────────────────┐                  │
//! │   ┌────────────────┐    │   is_safe()    │                  │
//! │   │   Invariants   │    │ restart-scan   │                  │
//! │   │   assertions   │    │ greedy search  │                  │
//! │   └────────────────┘    └────────────────┘                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! - `types` - Ids, units, limits and raw initialization data
//! - `error` - Construction errors and request denial reasons
//! - `ledger` - `ResourceLedger` with all allocator state
//! - `safety` - Safe-sequence search
//! - `transaction` - Pre-image based speculative mutation
//! - `request` - `request(ledger, pid, vector) -> RequestOutcome`
//! - `invariants` - Runtime invariant assertions

pub mod error;
pub mod invariants;
pub mod ledger;
pub mod request;
pub mod safety;
mod transaction;
pub mod types;

pub use error::{BankerError, DenialReason, Result};
pub use invariants::{assert_invariants, check_all_invariants, InvariantViolation};
pub use ledger::ResourceLedger;
pub use request::{request, validate, Decision, RequestOutcome, RequestProcessor, RequestState};
pub use safety::{is_safe, SafetyEngine, SafetyResult};
pub use types::{
    InitialState, LedgerSnapshot, Limits, ProcessId, ResourceId, Units, DEFAULT_MAX_PROCESSES,
    DEFAULT_MAX_RESOURCE_TYPES,
};
