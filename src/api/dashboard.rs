//! Dashboard API endpoint.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::dashboard::DashboardSummary;
use crate::AppState;

/// GET /api/dashboard - Collection counts and budget totals.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    match state.dashboard.summary(&state.repo).await {
        Ok(summary) => success(summary, revision_id),
        Err(e) => error(e, revision_id),
    }
}
