//! Serialized access for concurrent requesters
//!
//! The request protocol applies a grant speculatively and may roll it back.
//! Another requester observing the ledger in between would see a state that
//! was never committed, so every operation here holds the session lock for
//! its full duration.

use std::sync::{Arc, Mutex, MutexGuard};

use banker_core::{LedgerSnapshot, ProcessId, RequestOutcome, SafetyResult, Units};

use crate::error::{Result, SessionError};
use crate::session::{Session, SessionSummary};

/// Cloneable handle to a session shared between threads.
#[derive(Clone, Debug)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    /// Share an existing session.
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.inner.lock().map_err(|_| SessionError::Poisoned)
    }

    /// Process a request inside the critical section.
    pub fn request(&self, pid: ProcessId, vector: &[Units]) -> Result<RequestOutcome> {
        Ok(self.lock()?.request(pid, vector))
    }

    /// Run the safety search over the committed state.
    pub fn check_safety(&self) -> Result<SafetyResult> {
        Ok(self.lock()?.check_safety())
    }

    /// Copy of the committed state.
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    /// Summary of session activity.
    pub fn summary(&self) -> Result<SessionSummary> {
        Ok(self.lock()?.summary())
    }

    /// Run `f` with exclusive access to the session.
    pub fn with<T>(&self, f: impl FnOnce(&mut Session) -> T) -> Result<T> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }
}
