//! Resource ledger - pure data structure holding all allocator state
//!
//! The ledger is the authoritative record of availability, claims,
//! allocations and remaining need. Its fields are private: after
//! construction the only mutation path is `apply_delta`, which is driven
//! exclusively by the crate-private `LedgerTransaction`.

use crate::error::{BankerError, Result};
use crate::types::{InitialState, LedgerSnapshot, Limits, ProcessId, ResourceId, Units};

/// The pure allocator state - no I/O, no side effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLedger {
    /// Number of processes
    num_processes: usize,
    /// Number of resource types
    num_resource_types: usize,
    /// Unallocated units per resource type
    available: Vec<Units>,
    /// Maximum claim matrix (fixed after construction)
    max: Vec<Vec<Units>>,
    /// Current allocation matrix
    allocation: Vec<Vec<Units>>,
    /// Remaining need matrix, kept in step with `allocation`
    need: Vec<Vec<Units>>,
    /// Units of each resource type in the system (fixed after construction)
    total_units: Vec<Units>,
}

impl ResourceLedger {
    /// Build a ledger from raw initialization data.
    ///
    /// The returned ledger satisfies the structural invariants. Whether the
    /// state is *safe* is a separate question answered by
    /// [`SafetyEngine`](crate::safety::SafetyEngine).
    pub fn initialize(limits: &Limits, initial: &InitialState) -> Result<Self> {
        let n = initial.num_processes;
        let m = initial.num_resource_types;

        if n == 0 || n > limits.max_processes {
            return Err(BankerError::dimension(format!(
                "process count {} outside 1..={}",
                n, limits.max_processes
            )));
        }
        if m == 0 || m > limits.max_resource_types {
            return Err(BankerError::dimension(format!(
                "resource type count {} outside 1..={}",
                m, limits.max_resource_types
            )));
        }
        if initial.available.len() != m {
            return Err(BankerError::dimension(format!(
                "available vector has {} entries, expected {}",
                initial.available.len(),
                m
            )));
        }
        check_matrix_shape("max", &initial.max, n, m)?;
        check_matrix_shape("allocation", &initial.allocation, n, m)?;

        for (r, &units) in initial.available.iter().enumerate() {
            if units < 0 {
                return Err(BankerError::integrity(format!(
                    "available[{}] is negative ({})",
                    r, units
                )));
            }
        }
        check_non_negative("max", &initial.max)?;
        check_non_negative("allocation", &initial.allocation)?;

        let mut need = Vec::with_capacity(n);
        for (p, (max_row, alloc_row)) in initial.max.iter().zip(&initial.allocation).enumerate() {
            let mut need_row = Vec::with_capacity(m);
            for (r, (&max, &allocated)) in max_row.iter().zip(alloc_row).enumerate() {
                if allocated > max {
                    return Err(BankerError::ClaimExceeded {
                        process: ProcessId(p),
                        resource: ResourceId(r),
                        allocated,
                        max,
                    });
                }
                need_row.push(max - allocated);
            }
            need.push(need_row);
        }

        let mut total_units = initial.available.clone();
        for alloc_row in &initial.allocation {
            for (r, &allocated) in alloc_row.iter().enumerate() {
                total_units[r] = total_units[r].checked_add(allocated).ok_or_else(|| {
                    BankerError::integrity(format!("total units of R{} overflow", r))
                })?;
            }
        }

        Ok(Self {
            num_processes: n,
            num_resource_types: m,
            available: initial.available.clone(),
            max: initial.max.clone(),
            allocation: initial.allocation.clone(),
            need,
            total_units,
        })
    }

    // ========================================================================
    // Read-only accessors
    // ========================================================================

    /// Number of processes
    pub fn num_processes(&self) -> usize {
        self.num_processes
    }

    /// Number of resource types
    pub fn num_resource_types(&self) -> usize {
        self.num_resource_types
    }

    /// Whether `pid` names a process in this ledger
    pub fn contains(&self, pid: ProcessId) -> bool {
        pid.0 < self.num_processes
    }

    /// Iterate over all process ids in increasing order
    pub fn process_ids(&self) -> impl Iterator<Item = ProcessId> {
        (0..self.num_processes).map(ProcessId)
    }

    /// Unallocated units per resource type
    pub fn available(&self) -> &[Units] {
        &self.available
    }

    /// Units of each resource type in the system
    pub fn total_units(&self) -> &[Units] {
        &self.total_units
    }

    /// Maximum claim row for a process
    pub fn max_of(&self, pid: ProcessId) -> Option<&[Units]> {
        self.max.get(pid.0).map(Vec::as_slice)
    }

    /// Allocation row for a process
    pub fn allocation_of(&self, pid: ProcessId) -> Option<&[Units]> {
        self.allocation.get(pid.0).map(Vec::as_slice)
    }

    /// Remaining need row for a process
    pub fn need_of(&self, pid: ProcessId) -> Option<&[Units]> {
        self.need.get(pid.0).map(Vec::as_slice)
    }

    pub(crate) fn max_matrix(&self) -> &[Vec<Units>] {
        &self.max
    }

    pub(crate) fn allocation_matrix(&self) -> &[Vec<Units>] {
        &self.allocation
    }

    pub(crate) fn need_matrix(&self) -> &[Vec<Units>] {
        &self.need
    }

    /// Owned copy of the available vector
    pub fn snapshot_available(&self) -> Vec<Units> {
        self.available.clone()
    }

    /// Owned copy of the allocation matrix
    pub fn snapshot_allocation(&self) -> Vec<Vec<Units>> {
        self.allocation.clone()
    }

    /// Owned copy of every externally visible matrix
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            available: self.available.clone(),
            max: self.max.clone(),
            allocation: self.allocation.clone(),
            need: self.need.clone(),
        }
    }

    // ========================================================================
    // Mutation primitives (transaction use only)
    // ========================================================================

    /// Move `delta` units from the pool to `pid` (negative entries move them
    /// back). Performs no validation.
    pub(crate) fn apply_delta(&mut self, pid: ProcessId, delta: &[Units]) {
        let p = pid.0;
        for (r, &d) in delta.iter().enumerate() {
            self.available[r] -= d;
            self.allocation[p][r] += d;
            self.need[p][r] -= d;
        }
    }

    /// Overwrite the pool and one process's rows with previously captured
    /// values.
    pub(crate) fn restore(
        &mut self,
        pid: ProcessId,
        available: Vec<Units>,
        allocation_row: Vec<Units>,
        need_row: Vec<Units>,
    ) {
        self.available = available;
        self.allocation[pid.0] = allocation_row;
        self.need[pid.0] = need_row;
    }
}

fn check_matrix_shape(name: &str, matrix: &[Vec<Units>], n: usize, m: usize) -> Result<()> {
    if matrix.len() != n {
        return Err(BankerError::dimension(format!(
            "{} matrix has {} rows, expected {}",
            name,
            matrix.len(),
            n
        )));
    }
    for (p, row) in matrix.iter().enumerate() {
        if row.len() != m {
            return Err(BankerError::dimension(format!(
                "{} row {} has {} entries, expected {}",
                name,
                p,
                row.len(),
                m
            )));
        }
    }
    Ok(())
}

fn check_non_negative(name: &str, matrix: &[Vec<Units>]) -> Result<()> {
    for (p, row) in matrix.iter().enumerate() {
        if let Some(r) = row.iter().position(|&units| units < 0) {
            return Err(BankerError::integrity(format!(
                "{}[{}][{}] is negative ({})",
                name, p, r, row[r]
            )));
        }
    }
    Ok(())
}
