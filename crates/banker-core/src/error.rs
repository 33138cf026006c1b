//! Error and denial types
//!
//! `BankerError` covers construction-time failures, which are fatal to a
//! session. `DenialReason` covers per-request rejections, which never mutate
//! the ledger and are always recoverable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProcessId, ResourceId, Units};

/// Result type alias for fallible core operations
pub type Result<T> = core::result::Result<T, BankerError>;

/// Construction and integrity errors
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum BankerError {
    /// Process or resource counts are out of range, or input shapes disagree
    /// with the declared counts
    #[error("invalid dimension: {message}")]
    InvalidDimension {
        /// What was wrong with the dimensions
        message: String,
    },

    /// An initial allocation exceeds the process's declared maximum claim
    #[error("{process} holds {allocated} units of {resource} but claims at most {max}")]
    ClaimExceeded {
        /// Offending process
        process: ProcessId,
        /// Offending resource type
        resource: ResourceId,
        /// Units allocated
        allocated: Units,
        /// Declared maximum claim
        max: Units,
    },

    /// Unit conservation cannot be established from the inputs
    #[error("integrity violation: {message}")]
    IntegrityViolation {
        /// Which quantity broke the ledger invariants
        message: String,
    },

    /// No safe completion order exists for the initial state
    #[error("initial state is unsafe: {blocked:?} can never finish")]
    UnsafeInitialState {
        /// Processes that could not be scheduled to completion
        blocked: Vec<ProcessId>,
    },
}

impl BankerError {
    pub(crate) fn dimension(message: impl Into<String>) -> Self {
        BankerError::InvalidDimension {
            message: message.into(),
        }
    }

    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        BankerError::IntegrityViolation {
            message: message.into(),
        }
    }

    /// Whether the error prevents a session from starting at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BankerError::InvalidDimension { .. } | BankerError::UnsafeInitialState { .. }
        )
    }
}

/// Why a resource request was denied
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    /// Process id is outside `[0, num_processes)`
    #[error("unknown process {process}")]
    UnknownProcess {
        /// Requested process
        process: ProcessId,
    },

    /// Request vector is malformed (wrong length or negative entries)
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was wrong with the vector
        message: String,
    },

    /// Request exceeds the process's remaining declared claim
    #[error("{process} requested {requested} of {resource} but may only claim {need} more")]
    ClaimExceeded {
        /// Requesting process
        process: ProcessId,
        /// First resource type that exceeded the claim
        resource: ResourceId,
        /// Units requested
        requested: Units,
        /// Remaining need
        need: Units,
    },

    /// Request exceeds current availability
    #[error("{process} requested {requested} of {resource} but only {available} are available")]
    InsufficientResources {
        /// Requesting process
        process: ProcessId,
        /// First resource type that was short
        resource: ResourceId,
        /// Units requested
        requested: Units,
        /// Units available
        available: Units,
    },

    /// Granting would leave the system without a safe sequence
    #[error("request would leave the system in an unsafe state")]
    WouldCauseUnsafeState,
}

impl DenialReason {
    /// Short machine-friendly name of the denial kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DenialReason::UnknownProcess { .. } => "unknown_process",
            DenialReason::InvalidRequest { .. } => "invalid_request",
            DenialReason::ClaimExceeded { .. } => "claim_exceeded",
            DenialReason::InsufficientResources { .. } => "insufficient_resources",
            DenialReason::WouldCauseUnsafeState => "would_cause_unsafe_state",
        }
    }
}
