//! Progress reporting hooks.
//!
//! The scheduler tells the presentation layer what it is doing through a
//! [`Notifier`]. Chat relays, dashboards and tests implement it; the
//! default [`TracingNotifier`] just logs.

use craftwork_types::{Goal, GoalReport};
use tracing::{info, warn};

/// Receives progress messages and final reports for goals.
///
/// Called from the scheduler task; implementations must not block.
pub trait Notifier: Send + Sync {
    /// A human-readable progress line for the running goal.
    fn progress(&self, goal: &Goal, message: &str);

    /// The goal reached a terminal state.
    fn finished(&self, report: &GoalReport);
}

/// Writes progress and reports to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn progress(&self, goal: &Goal, message: &str) {
        info!(goal_id = %goal.id, requester = %goal.requester, "{message}");
    }

    fn finished(&self, report: &GoalReport) {
        let goal = &report.goal;
        match report.failure {
            None => info!(
                goal_id = %goal.id,
                requester = %goal.requester,
                target = %goal.target,
                count = goal.count,
                "Goal completed"
            ),
            Some(kind) => warn!(
                goal_id = %goal.id,
                requester = %goal.requester,
                target = %goal.target,
                failure = %kind,
                diagnostic = report.diagnostic.as_deref().unwrap_or(""),
                "Goal failed"
            ),
        }
    }
}

/// A notifier that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn progress(&self, _goal: &Goal, _message: &str) {}

    fn finished(&self, _report: &GoalReport) {}
}
