use sparql_analytics_model::{
    QueryResult, RegressionOutcome, RegressionRequest, ViewSelection,
};
use std::time::Duration;

/// Where one session stands in the submit/render cycle.
#[derive(Debug, Clone, Default)]
pub enum QueryPhase {
    #[default]
    NoQuery,
    /// A submission passed validation and is out at the endpoint. With the
    /// one-request-per-interaction model this phase only lasts for the
    /// duration of the submit handler.
    QueryRunning,
    QueryFailed {
        error: String,
        duration: Duration,
    },
    QuerySucceeded {
        result: QueryResult,
    },
}

/// Everything one browser session accumulates between requests.
///
/// The struct is owned by the session map; handlers mutate it through the
/// map entry, one request at a time. A new query submission invalidates the
/// per-result selections (view, page cursor, regression) as a whole.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub endpoint: String,
    pub query_text: String,
    pub template: String,
    pub phase: QueryPhase,
    pub view: ViewSelection,
    pub page: usize,
    pub regression_request: Option<RegressionRequest>,
    pub regression: Option<RegressionOutcome>,
    /// One-shot inline message, consumed by the next page render.
    pub notice: Option<String>,
}

impl SessionState {
    /// Submit transition: `NoQuery`/`QueryFailed`/`QuerySucceeded` move to
    /// `QueryRunning`; the previous result stays visible only through the
    /// executor's answer.
    pub fn begin_query(&mut self) {
        self.phase = QueryPhase::QueryRunning;
        self.notice = None;
    }

    /// Executor answer: `QueryRunning` moves to `QuerySucceeded` or
    /// `QueryFailed`. A fresh result resets every per-result selection.
    pub fn finish_query(&mut self, result: QueryResult) {
        if result.success {
            self.phase = QueryPhase::QuerySucceeded { result };
            self.view = ViewSelection::default();
            self.page = 1;
            self.regression_request = None;
            self.regression = None;
        } else {
            self.phase = QueryPhase::QueryFailed {
                error: result
                    .error
                    .unwrap_or_else(|| "unknown error".to_owned()),
                duration: result.duration,
            };
        }
    }

    /// The stored result, present only in `QuerySucceeded`.
    pub fn result(&self) -> Option<&QueryResult> {
        match &self.phase {
            QueryPhase::QuerySucceeded { result } => Some(result),
            _ => None,
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_analytics_model::ChartKind;

    fn success() -> QueryResult {
        QueryResult::ok(
            vec!["a".to_owned()],
            vec![vec!["1".to_owned()], vec!["2".to_owned()]],
            Duration::from_millis(10),
        )
    }

    #[test]
    fn submit_then_success_stores_the_result() {
        let mut session = SessionState::default();
        assert!(matches!(session.phase, QueryPhase::NoQuery));
        session.begin_query();
        assert!(matches!(session.phase, QueryPhase::QueryRunning));
        session.finish_query(success());
        assert!(session.result().is_some());
    }

    #[test]
    fn failure_keeps_the_error_and_no_result() {
        let mut session = SessionState::default();
        session.begin_query();
        session.finish_query(QueryResult::failed("boom", Duration::ZERO));
        assert!(session.result().is_none());
        assert!(matches!(
            &session.phase,
            QueryPhase::QueryFailed { error, .. } if error == "boom"
        ));
    }

    #[test]
    fn resubmitting_after_a_failure_is_allowed() {
        let mut session = SessionState::default();
        session.begin_query();
        session.finish_query(QueryResult::failed("boom", Duration::ZERO));
        session.begin_query();
        session.finish_query(success());
        assert!(session.result().is_some());
    }

    #[test]
    fn a_new_result_resets_the_per_result_selections() {
        let mut session = SessionState::default();
        session.begin_query();
        session.finish_query(success());
        session.view.kind = ChartKind::PieChart;
        session.page = 7;
        session.begin_query();
        session.finish_query(success());
        assert_eq!(session.view.kind, ChartKind::Table);
        assert_eq!(session.page, 1);
        assert!(session.regression.is_none());
    }

    #[test]
    fn changing_the_view_does_not_touch_the_phase() {
        let mut session = SessionState::default();
        session.begin_query();
        session.finish_query(success());
        session.view.kind = ChartKind::BarChart;
        session.page = 2;
        assert!(session.result().is_some());
    }

    #[test]
    fn notices_are_one_shot() {
        let mut session = SessionState::default();
        session.set_notice("check your query");
        assert_eq!(session.take_notice().as_deref(), Some("check your query"));
        assert!(session.take_notice().is_none());
    }
}
