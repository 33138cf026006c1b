//! Core allocator types
//!
//! This module contains the fundamental types used throughout the banker core.
//! All types here are pure data.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Units of a resource type. Inputs are signed so that malformed data can be
/// detected and rejected; every stored quantity is non-negative.
pub type Units = i64;

/// Default cap on the number of processes a ledger may track
pub const DEFAULT_MAX_PROCESSES: usize = 100;

/// Default cap on the number of resource types a ledger may track
pub const DEFAULT_MAX_RESOURCE_TYPES: usize = 100;

/// Process identifier, an index into the claim matrices
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub usize);

/// Resource type identifier, an index into the resource vectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub usize);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Dimension limits enforced when a ledger is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of processes
    pub max_processes: usize,
    /// Maximum number of resource types
    pub max_resource_types: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_processes: DEFAULT_MAX_PROCESSES,
            max_resource_types: DEFAULT_MAX_RESOURCE_TYPES,
        }
    }
}

/// Raw initialization data for a ledger.
///
/// Rows of `max` and `allocation` are indexed by process id, columns by
/// resource id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialState {
    /// Number of processes
    pub num_processes: usize,
    /// Number of resource types
    pub num_resource_types: usize,
    /// Unallocated units per resource type
    pub available: Vec<Units>,
    /// Maximum claim matrix
    pub max: Vec<Vec<Units>>,
    /// Current allocation matrix
    pub allocation: Vec<Vec<Units>>,
}

/// Read-only copy of the externally visible ledger state, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Unallocated units per resource type
    pub available: Vec<Units>,
    /// Maximum claim matrix
    pub max: Vec<Vec<Units>>,
    /// Current allocation matrix
    pub allocation: Vec<Vec<Units>>,
    /// Remaining need matrix
    pub need: Vec<Vec<Units>>,
}

/// Returns true if `lhs[r] <= rhs[r]` for every resource.
pub(crate) fn fits_within(lhs: &[Units], rhs: &[Units]) -> bool {
    lhs.iter().zip(rhs).all(|(l, r)| l <= r)
}
