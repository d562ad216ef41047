//! Planner stage: query in, search plan out.

use tracing::{debug, info};

use crate::error::GatewayError;
use crate::gateway::{parse_structured, AgentGateway, AgentRole};
use crate::progress::{ProgressReporter, StepKey};
use crate::types::SearchPlan;

/// Ask the planner agent which searches to run for `query`.
///
/// Any gateway error or malformed plan is returned as-is; there is no retry
/// and no fallback plan.
pub async fn plan<G, R>(gateway: &G, reporter: &R, query: &str) -> Result<SearchPlan, GatewayError>
where
    G: AgentGateway + ?Sized,
    R: ProgressReporter + ?Sized,
{
    reporter.update(StepKey::Planning, "Planning searches...", false);

    let raw = gateway
        .invoke(AgentRole::Planner, &format!("Query: {query}"))
        .await?;
    debug!(bytes = raw.len(), "Planner answered");

    let plan: SearchPlan = parse_structured(AgentRole::Planner, &raw)?;
    plan.validate()
        .map_err(|e| GatewayError::schema(AgentRole::Planner, e))?;

    info!(searches = plan.len(), "Search plan ready");
    reporter.update(
        StepKey::Planning,
        &format!("Will perform {} searches", plan.len()),
        true,
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::AgentStream;
    use crate::progress::DashboardReporter;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedPlanner {
        answer: Result<String, String>,
        inputs: Mutex<Vec<String>>,
    }

    impl FixedPlanner {
        fn new(answer: Result<&str, &str>) -> Self {
            Self {
                answer: answer.map(str::to_string).map_err(str::to_string),
                inputs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AgentGateway for FixedPlanner {
        async fn invoke(&self, role: AgentRole, input: &str) -> Result<String, GatewayError> {
            assert_eq!(role, AgentRole::Planner);
            self.inputs.lock().unwrap().push(input.to_string());
            self.answer
                .clone()
                .map_err(|e| GatewayError::agent(role, e))
        }

        async fn invoke_streamed(
            &self,
            role: AgentRole,
            _input: &str,
        ) -> Result<AgentStream, GatewayError> {
            Err(GatewayError::agent(role, "not used"))
        }
    }

    #[tokio::test]
    async fn test_plan_reports_task_count() {
        let gateway = FixedPlanner::new(Ok(
            r#"{"searches": [{"query": "a", "reason": "x"}, {"query": "b", "reason": "y"}]}"#,
        ));
        let (reporter, _rx) = DashboardReporter::new();

        let plan = plan(&gateway, &reporter, "what is rust").await.unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(gateway.inputs.lock().unwrap()[0], "Query: what is rust");
        let board = reporter.snapshot();
        assert_eq!(board.planning.message, "Will perform 2 searches");
        assert!(board.planning.done);
    }

    #[tokio::test]
    async fn test_plan_failure_is_not_marked_done() {
        let gateway = FixedPlanner::new(Err("rate limited"));
        let (reporter, _rx) = DashboardReporter::new();

        let err = plan(&gateway, &reporter, "q").await.unwrap_err();

        assert!(matches!(err, GatewayError::Agent { role: AgentRole::Planner, .. }));
        assert!(!reporter.snapshot().planning.done);
    }

    #[tokio::test]
    async fn test_plan_rejects_blank_search_terms() {
        let gateway = FixedPlanner::new(Ok(r#"{"searches": [{"query": "", "reason": "x"}]}"#));
        let (reporter, _rx) = DashboardReporter::new();

        let err = plan(&gateway, &reporter, "q").await.unwrap_err();
        assert!(matches!(err, GatewayError::Schema { .. }));
    }
}
