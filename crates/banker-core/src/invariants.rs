//! Runtime-checkable ledger invariants
//!
//! These are used for:
//! 1. Assertion checking after every committed mutation in debug builds
//! 2. Property tests over sequences of requests
//! 3. Integrity reports from the session layer
//!
//! # Invariants
//!
//! 1. **Non-negativity**: available, allocation and need are never negative
//! 2. **Need Consistency**: `allocation + need == max` per process and resource
//! 3. **Conservation**: `available + Σ allocation == total_units` per resource
//! 4. **Claim Bound**: `allocation <= max` per process and resource

use crate::ledger::ResourceLedger;

/// An invariant violation with details
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Description of what went wrong
    pub description: String,
}

/// Check all ledger invariants.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_all_invariants(ledger: &ResourceLedger) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    violations.extend(check_non_negativity(ledger));
    violations.extend(check_need_consistency(ledger));
    violations.extend(check_conservation(ledger));
    violations.extend(check_claim_bound(ledger));

    violations
}

/// Invariant 1: no quantity is negative
fn check_non_negativity(ledger: &ResourceLedger) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (r, &units) in ledger.available().iter().enumerate() {
        if units < 0 {
            violations.push(InvariantViolation {
                invariant: "non_negativity",
                description: format!("available[{}] is {}", r, units),
            });
        }
    }

    for (name, matrix) in [
        ("allocation", ledger.allocation_matrix()),
        ("need", ledger.need_matrix()),
    ] {
        for (p, row) in matrix.iter().enumerate() {
            for (r, &units) in row.iter().enumerate() {
                if units < 0 {
                    violations.push(InvariantViolation {
                        invariant: "non_negativity",
                        description: format!("{}[{}][{}] is {}", name, p, r, units),
                    });
                }
            }
        }
    }

    violations
}

/// Invariant 2: allocation + need == max
fn check_need_consistency(ledger: &ResourceLedger) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let rows = ledger
        .max_matrix()
        .iter()
        .zip(ledger.allocation_matrix())
        .zip(ledger.need_matrix());
    for (p, ((max_row, alloc_row), need_row)) in rows.enumerate() {
        for r in 0..max_row.len() {
            if alloc_row[r] + need_row[r] != max_row[r] {
                violations.push(InvariantViolation {
                    invariant: "need_consistency",
                    description: format!(
                        "P{} R{}: allocation {} + need {} != max {}",
                        p, r, alloc_row[r], need_row[r], max_row[r]
                    ),
                });
            }
        }
    }

    violations
}

/// Invariant 3: units are neither created nor destroyed
fn check_conservation(ledger: &ResourceLedger) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    let pool = ledger.available().iter().zip(ledger.total_units());
    for (r, (&available, &total)) in pool.enumerate() {
        let held: i64 = ledger.allocation_matrix().iter().map(|row| row[r]).sum();
        if available + held != total {
            violations.push(InvariantViolation {
                invariant: "conservation",
                description: format!(
                    "R{}: available {} + allocated {} != total {}",
                    r, available, held, total
                ),
            });
        }
    }

    violations
}

/// Invariant 4: no process holds more than it claimed
fn check_claim_bound(ledger: &ResourceLedger) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (p, (max_row, alloc_row)) in ledger
        .max_matrix()
        .iter()
        .zip(ledger.allocation_matrix())
        .enumerate()
    {
        for (r, (&max, &allocated)) in max_row.iter().zip(alloc_row).enumerate() {
            if allocated > max {
                violations.push(InvariantViolation {
                    invariant: "claim_bound",
                    description: format!("P{} R{}: allocation {} > max {}", p, r, allocated, max),
                });
            }
        }
    }

    violations
}

/// Assert all invariants hold (panic if not)
pub fn assert_invariants(ledger: &ResourceLedger) {
    let violations = check_all_invariants(ledger);
    if let Some(v) = violations.first() {
        panic!("Invariant violated: {} ({})", v.invariant, v.description);
    }
}
