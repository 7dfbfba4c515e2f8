use common::Progress;
use serde::Serialize;
use utoipa::ToSchema;

use crate::judging::progress::{EvaluatorProgress, ProgressOverview};

#[derive(Serialize, ToSchema)]
pub struct EvaluatorProgressItem {
    pub evaluator_id: i32,
    pub username: String,
    pub display_name: String,
    pub count: u64,
    pub total: u64,
}

impl From<EvaluatorProgress> for EvaluatorProgressItem {
    fn from(p: EvaluatorProgress) -> Self {
        Self {
            evaluator_id: p.evaluator_id,
            username: p.username,
            display_name: p.display_name,
            count: p.progress.count,
            total: p.progress.total,
        }
    }
}

/// Dashboard figures for the current contest. Contest-wide parts are `null`
/// without `view_admin_stats`.
#[derive(Serialize, ToSchema)]
pub struct ProgressOverviewResponse {
    pub contest_id: i32,
    pub user: Progress,
    pub group: Progress,
    pub entries: Option<Progress>,
    pub evaluations: Option<Progress>,
    pub evaluators: Option<Vec<EvaluatorProgressItem>>,
}

impl From<ProgressOverview> for ProgressOverviewResponse {
    fn from(o: ProgressOverview) -> Self {
        Self {
            contest_id: o.contest_id,
            user: o.user,
            group: o.group,
            entries: o.entries,
            evaluations: o.evaluations,
            evaluators: o
                .evaluators
                .map(|rows| rows.into_iter().map(Into::into).collect()),
        }
    }
}
