//! Admin endpoints shared by every collection.
//!
//! Each handler is generic over the entity type; [`entity_routes`] mounts the
//! full set for one type.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::bulk::{self, BulkAction, BulkReport};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::export::export_csv;
use crate::models::{Entity, StatusAction};
use crate::view::{filtered_sorted, view, ListQuery, Page, QueryParams, Selection};
use crate::AppState;

/// Body of a bulk action request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub action: BulkAction,
    #[serde(default)]
    pub keys: Vec<String>,
    /// Also select every record on the page described by the query string.
    #[serde(default)]
    pub select_page: bool,
}

/// Bulk outcome plus the list re-rendered with the caller's filters.
#[derive(Debug, Serialize)]
pub struct BulkResponse<E> {
    pub report: BulkReport,
    pub page: Page<E>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub key: String,
    pub deleted: bool,
}

fn not_found<E: Entity>(key: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", E::KIND, key))
}

/// GET /api/{collection} - Filtered, sorted page of records.
pub async fn list_records<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Page<E>> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    let query = match ListQuery::parse::<E>(&params) {
        Ok(query) => query,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.store::<E>().list().await {
        Ok(records) => success(view(records, &query), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/{collection}/{key} - Get a single record.
pub async fn get_record<E: Entity>(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<E> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    match state.repo.store::<E>().get(&key).await {
        Ok(Some(record)) => success(record, revision_id),
        Ok(None) => error(not_found::<E>(&key), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/{collection} - Create a record, or replace the one with the same key.
pub async fn create_record<E: Entity>(
    State(state): State<AppState>,
    Json(mut record): Json<E>,
) -> ApiResult<E> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    record.assign_key();

    match state.repo.store::<E>().upsert(record).await {
        Ok(saved) => {
            let new_revision = state.repo.revision_id().await.unwrap_or(revision_id);
            success(saved, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/{collection}/{key} - Replace an existing record.
pub async fn update_record<E: Entity>(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(record): Json<E>,
) -> ApiResult<E> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    // Keys are immutable
    if record.key() != key {
        return error(
            AppError::Validation(format!(
                "Body key '{}' does not match path key '{}'",
                record.key(),
                key
            )),
            revision_id,
        );
    }

    match state.repo.store::<E>().replace(record).await {
        Ok(Some(saved)) => {
            let new_revision = state.repo.revision_id().await.unwrap_or(revision_id);
            success(saved, new_revision)
        }
        Ok(None) => error(not_found::<E>(&key), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/{collection}/{key} - Delete a record. Absent keys are a no-op.
pub async fn delete_record<E: Entity>(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<DeleteResult> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    match state.repo.store::<E>().delete(&key).await {
        Ok(deleted) => {
            let new_revision = state.repo.revision_id().await.unwrap_or(revision_id);
            success(DeleteResult { key, deleted }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/{collection}/{key}/{action} - Apply a status action.
pub async fn transition_record<E: Entity>(
    State(state): State<AppState>,
    Path((key, action)): Path<(String, String)>,
) -> ApiResult<E> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    let action: StatusAction = match action.parse() {
        Ok(action) => action,
        Err(e) => return error(e, revision_id),
    };

    let store = state.repo.store::<E>();
    let outcome = match action {
        StatusAction::Publish => store.publish(&key).await,
        StatusAction::Unpublish => store.unpublish(&key).await,
        StatusAction::Retire => store.retire(&key).await,
        StatusAction::Activate => store.activate(&key).await,
        StatusAction::Suspend => store.suspend(&key).await,
    };

    match outcome {
        Ok(Some(record)) => {
            let new_revision = state.repo.revision_id().await.unwrap_or(revision_id);
            success(record, new_revision)
        }
        Ok(None) => error(not_found::<E>(&key), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/{collection}/bulk - Apply one action to many keys.
///
/// The query string carries the caller's list filters so the refreshed page
/// comes back with the report.
pub async fn bulk_records<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
    Json(request): Json<BulkRequest>,
) -> ApiResult<BulkResponse<E>> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    let query = match ListQuery::parse::<E>(&params) {
        Ok(query) => query,
        Err(e) => return error(e, revision_id),
    };

    let store = state.repo.store::<E>();
    let mut selection = Selection::from_keys(request.keys);
    if request.select_page {
        match store.list().await {
            Ok(records) => selection.select_page(&view(records, &query)),
            Err(e) => return error(e, revision_id),
        }
    }

    tracing::debug!("Bulk {} on {} selected keys", request.action, selection.len());
    let report = bulk::run_selection(&store, request.action, &mut selection).await;

    let new_revision = state.repo.revision_id().await.unwrap_or(revision_id);
    match store.list().await {
        Ok(records) => success(
            BulkResponse {
                report,
                page: view(records, &query),
            },
            new_revision,
        ),
        Err(e) => error(e, new_revision),
    }
}

/// GET /api/{collection}/export.csv - Download the filtered, sorted view as CSV.
///
/// `columns=a,b,c` picks and orders the columns; repeated `columns` append.
pub async fn export_records<E: Entity>(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, AppErrorWithRevision> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);
    let fail = |error| AppErrorWithRevision { error, revision_id };

    let (column_params, params): (QueryParams, QueryParams) =
        params.into_iter().partition(|(name, _)| name == "columns");
    let columns: Vec<String> = column_params
        .iter()
        .flat_map(|(_, raw)| raw.split(','))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    let query = ListQuery::parse::<E>(&params).map_err(fail)?;
    let records = state.repo.store::<E>().list().await.map_err(fail)?;
    let csv = export_csv(&filtered_sorted(records, &query), &columns).map_err(fail)?;

    let disposition = format!(
        "attachment; filename=\"{}.csv\"",
        slug::slugify(E::KIND)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// Every admin route for one collection.
pub fn entity_routes<E: Entity>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records::<E>).post(create_record::<E>))
        .route("/bulk", post(bulk_records::<E>))
        .route("/export.csv", get(export_records::<E>))
        .route(
            "/{key}",
            get(get_record::<E>)
                .put(update_record::<E>)
                .delete(delete_record::<E>),
        )
        .route("/{key}/{action}", post(transition_record::<E>))
}
