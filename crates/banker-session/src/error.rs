//! Session error types

use banker_core::{BankerError, InvariantViolation};
use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session layer
#[derive(Error, Debug)]
pub enum SessionError {
    /// Ledger construction failed or the initial state is unsafe
    #[error(transparent)]
    Banker(#[from] BankerError),

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// The live ledger broke one of its invariants
    #[error("ledger integrity violated ({} violations)", .violations.len())]
    Integrity {
        /// Every violated invariant
        violations: Vec<InvariantViolation>,
    },

    /// Replaying the commit log did not reproduce the live ledger
    #[error("replay diverged at commit {seq}: {message}")]
    Replay {
        /// Sequence number of the offending commit
        seq: u64,
        /// What went wrong
        message: String,
    },

    /// A thread panicked while holding the session lock
    #[error("session lock poisoned")]
    Poisoned,
}

impl SessionError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SessionError::Config {
            message: message.into(),
        }
    }

    pub(crate) fn replay(seq: u64, message: impl Into<String>) -> Self {
        SessionError::Replay {
            seq,
            message: message.into(),
        }
    }
}
