//! Banker Session - runtime wrapper around the pure core
//!
//! Everything with side effects lives here:
//! - `session` - Single-writer session: audit, commit and replay
//! - `shared` - Mutex-guarded handle for concurrent requesters
//! - `audit` - Request/decision AuditLog and grant CommitLog
//! - `config` - Figment-based configuration loading
//! - `logging` - tracing subscriber setup
//!
//! ```text
//! request ──▶ Session ──▶ AuditLog (request)
//!                │
//!                ├──▶ banker_core::request ──▶ ResourceLedger
//!                │
//!                ├──▶ CommitLog (if granted)
//!                └──▶ AuditLog (response)
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod shared;

pub use audit::{AuditEvent, AuditEventType, AuditLog, Commit, CommitLog, EventId};
pub use config::{BankerConfig, ConfigLoader, LoggingConfig, CONFIG_ENV_PREFIX};
pub use error::{Result, SessionError};
pub use logging::{init_logging, parse_log_level, LOG_ENV_VAR};
pub use session::{Session, SessionSummary};
pub use shared::SharedSession;

// Re-export the core so drivers only need one dependency
pub use banker_core;
