//! Search stage: concurrent fan-out over the plan, fan-in in completion order.

use std::task::Poll;

use futures::stream::{self, FuturesUnordered, StreamExt};
use tracing::{info, warn};

use crate::gateway::{AgentGateway, AgentRole};
use crate::progress::{ProgressReporter, StepKey};
use crate::types::{SearchPlan, SearchResultSet};

/// Run every task of `plan` against the search agent.
///
/// Every call is polled once, and so started, before any result is consumed;
/// results are then consumed as they complete. A failed task contributes no
/// summary and is not retried; it still counts toward the `N/total` progress.
/// Exactly one update per task is emitted, followed by a single completion
/// update. This stage never fails.
pub async fn search<G, R>(gateway: &G, reporter: &R, plan: &SearchPlan) -> SearchResultSet
where
    G: AgentGateway + ?Sized,
    R: ProgressReporter + ?Sized,
{
    let total = plan.len();
    let mut results = SearchResultSet::new();

    // Calls that finish on their first poll are held back until all are started
    let mut finished = Vec::new();
    let in_flight = FuturesUnordered::new();
    for task in &plan.searches {
        let mut call = Box::pin(async move {
            let outcome = gateway.invoke(AgentRole::Search, &task.agent_input()).await;
            (task, outcome)
        });
        match futures::poll!(call.as_mut()) {
            Poll::Ready(outcome) => finished.push(outcome),
            Poll::Pending => in_flight.push(call),
        }
    }

    let mut outcomes = stream::iter(finished).chain(in_flight);
    let mut completed = 0usize;
    let mut failed = 0usize;

    while let Some((task, outcome)) = outcomes.next().await {
        completed += 1;
        match outcome {
            Ok(summary) => results.push(summary.into()),
            Err(e) => {
                failed += 1;
                warn!(
                    search_term = %task.search_term,
                    error = %e,
                    "Search task failed, dropping it"
                );
            }
        }

        reporter.update(
            StepKey::Searching,
            &format!("Searching... {completed}/{total} completed"),
            false,
        );
        reporter.set_fraction(StepKey::Searching, completed as f32 / total as f32);
    }

    if total == 0 {
        reporter.set_fraction(StepKey::Searching, 1.0);
    }

    let summary = if failed == 0 {
        format!("Searching... {completed}/{total} completed")
    } else {
        format!("Searching... {completed}/{total} completed ({failed} failed)")
    };
    reporter.update(StepKey::Searching, &summary, true);

    info!(
        planned = total,
        succeeded = results.len(),
        failed,
        "Searches finished"
    );

    results
}
