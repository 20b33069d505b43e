//! Supervisor loop

use crate::listener::{Listen, ListenReport};

use super::policy::RestartPolicy;

/// Totals across every listen invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SupervisorReport {
    /// Listen invocations run
    pub invocations: u32,
    /// Records committed across all invocations
    pub committed: u32,
}

/// Runs a listener under a restart policy
///
/// There is no backoff between invocations; a timed-out listener is
/// re-armed straight away if the policy allows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Supervisor {
    policy: RestartPolicy,
}

impl Supervisor {
    /// Create a supervisor with the given policy
    pub const fn new(policy: RestartPolicy) -> Self {
        Self { policy }
    }

    /// Restart policy in use
    pub fn policy(&self) -> RestartPolicy {
        self.policy
    }

    /// Drive `listener` until the policy says stop
    ///
    /// `on_timeout` sees the report of every invocation as soon as it
    /// times out, before any restart. With an unbounded policy this never
    /// returns.
    pub fn run<L, F>(&self, listener: &mut L, mut on_timeout: F) -> SupervisorReport
    where
        L: Listen,
        F: FnMut(&ListenReport),
    {
        let mut totals = SupervisorReport::default();

        loop {
            let report = listener.listen();
            totals.invocations = totals.invocations.saturating_add(1);
            totals.committed = totals.committed.saturating_add(report.committed);
            on_timeout(&report);

            let restarts = totals.invocations - 1;
            if !self.policy.should_restart(restarts) {
                return totals;
            }
        }
    }
}
