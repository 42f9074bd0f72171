//! Aggregation of run outcomes into the final report.

use std::time::Duration;

use serde::Serialize;

use crate::domain::types::duration_ms;
use crate::domain::{Run, TransportFailure, TransportPolicy};

/// Aggregate outcome of one pass over the combination space.
///
/// `fails + successes == amount == runs.len()` holds under both transport
/// policies.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Number of combinations that produced a counted run.
    pub amount: usize,
    pub runs: Vec<Run>,
    pub successes: usize,
    pub fails: usize,
    /// Whether any run failed unexpectedly.
    pub failed: bool,
    /// Sum of all run durations, not wall-clock time.
    #[serde(rename = "totalTimeMs", serialize_with = "duration_ms")]
    pub total_time: Duration,
    /// Combinations that died at the transport level, whatever the policy.
    pub transport_errors: usize,
    pub transport_failures: Vec<TransportFailure>,
}

impl Report {
    pub(crate) fn absorb_run(&mut self, run: Run) {
        if run.failed && !run.want_fail {
            self.failed = true;
            self.fails += 1;
        } else {
            self.successes += 1;
        }
        self.amount += 1;
        self.total_time += run.duration;
        self.runs.push(run);
    }

    pub(crate) fn absorb_transport(&mut self, failure: TransportFailure, policy: TransportPolicy) {
        self.transport_errors += 1;
        if policy == TransportPolicy::Fail {
            // want_fail stays false so the synthesized run can never count
            // as an expected failure.
            self.absorb_run(Run {
                cases: failure.cases.clone(),
                failed: true,
                transport_error: Some(failure.error.clone()),
                ..Run::default()
            });
        }
        self.transport_failures.push(failure);
    }

    /// One-line digest of the whole run.
    pub fn summary(&self) -> String {
        if self.amount == 0 {
            return if self.transport_errors > 0 {
                format!(
                    "No requests completed ({} transport errors)",
                    self.transport_errors
                )
            } else {
                "No requests completed".to_string()
            };
        }
        if self.failed {
            format!(
                "Completed {} ({} failed) requests in {:?}",
                self.amount, self.fails, self.total_time
            )
        } else {
            let average =
                Duration::from_nanos((self.total_time.as_nanos() / self.amount as u128) as u64);
            format!(
                "Completed {} requests in {:?}, average time: {:?}",
                self.amount, self.total_time, average
            )
        }
    }
}
