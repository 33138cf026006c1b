//! Human-readable rendering of session state

use std::fmt::Write;

use banker_session::banker_core::{Decision, ProcessId, RequestOutcome, Units};

fn join(units: &[Units]) -> String {
    units
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_pids(pids: &[ProcessId]) -> String {
    pids.iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the banner printed once the initial state is accepted.
pub fn render_start(sequence: &[ProcessId]) -> String {
    format!("System is in a safe state.\nSafe sequence: {}\n", join_pids(sequence))
}

/// Render allocation matrix and available vector.
pub fn render_state(available: &[Units], allocation: &[Vec<Units>]) -> String {
    let mut out = String::from("Current resource allocation:\n");
    for (p, row) in allocation.iter().enumerate() {
        let _ = writeln!(out, "  {}: {}", ProcessId(p), join(row));
    }
    let _ = writeln!(out, "Available resources: {}", join(available));
    out
}

/// Render one request outcome.
pub fn render_outcome(outcome: &RequestOutcome) -> String {
    let mut out = format!(
        "Request from {} for [{}]: ",
        outcome.process,
        join(&outcome.request)
    );
    match &outcome.decision {
        Decision::Granted { safe_sequence } => {
            let _ = writeln!(out, "granted (safe sequence: {})", join_pids(safe_sequence));
            out.push_str(&render_state(&outcome.available, &outcome.allocation));
        }
        Decision::Denied { reason } => {
            let _ = writeln!(out, "denied ({})", reason);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use banker_session::banker_core::DenialReason;

    #[test]
    fn test_render_granted() {
        let outcome = RequestOutcome {
            process: ProcessId(1),
            request: vec![1, 0, 2],
            decision: Decision::Granted {
                safe_sequence: vec![ProcessId(1), ProcessId(0)],
            },
            available: vec![2, 3, 0],
            allocation: vec![vec![0, 1, 0], vec![3, 0, 2]],
        };

        assert_eq!(
            render_outcome(&outcome),
            "Request from P1 for [1 0 2]: granted (safe sequence: P1 P0)\n\
             Current resource allocation:\n  P0: 0 1 0\n  P1: 3 0 2\n\
             Available resources: 2 3 0\n"
        );
    }

    #[test]
    fn test_render_denied() {
        let outcome = RequestOutcome {
            process: ProcessId(0),
            request: vec![0, 2, 0],
            decision: Decision::Denied {
                reason: DenialReason::WouldCauseUnsafeState,
            },
            available: vec![2, 3, 0],
            allocation: vec![vec![0, 1, 0]],
        };

        assert_eq!(
            render_outcome(&outcome),
            "Request from P0 for [0 2 0]: denied (request would leave the system in an unsafe state)\n"
        );
    }

    #[test]
    fn test_render_start() {
        assert_eq!(
            render_start(&[ProcessId(1), ProcessId(3)]),
            "System is in a safe state.\nSafe sequence: P1 P3\n"
        );
    }
}
