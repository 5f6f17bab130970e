//! Public read-only endpoints for the website: published articles and
//! public resources.

use axum::extract::{Path, Query, State};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    ArticleStatus, BlogArticle, Entity, Resource, ResourceStatus, Visibility,
};
use crate::view::{view, ListQuery, Page, QueryParams};
use crate::AppState;

fn article_is_public(article: &BlogArticle) -> bool {
    article.status == ArticleStatus::Published && article.meta.is_published()
}

fn resource_is_public(resource: &Resource) -> bool {
    resource.status == ResourceStatus::Published
        && resource.meta.is_published()
        && resource.visibility == Visibility::Public
}

async fn public_page<E: Entity>(
    state: &AppState,
    params: &[(String, String)],
    is_public: fn(&E) -> bool,
) -> ApiResult<Page<E>> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    let query = match ListQuery::parse::<E>(params) {
        Ok(query) => query,
        Err(e) => return error(e, revision_id),
    };

    match state.repo.store::<E>().list().await {
        Ok(records) => {
            let visible = records.into_iter().filter(|r| is_public(r)).collect();
            success(view(visible, &query), revision_id)
        }
        Err(e) => error(e, revision_id),
    }
}

async fn public_record<E: Entity>(
    state: &AppState,
    key: &str,
    is_public: fn(&E) -> bool,
) -> ApiResult<E> {
    let revision_id = state.repo.revision_id().await.unwrap_or(0);

    match state.repo.store::<E>().get(key).await {
        Ok(Some(record)) if is_public(&record) => success(record, revision_id),
        // Drafts are indistinguishable from missing records
        Ok(_) => error(
            AppError::NotFound(format!("{} {} not found", E::KIND, key)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// GET /public/blog - Published articles.
pub async fn list_public_articles(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Page<BlogArticle>> {
    public_page(&state, &params, article_is_public).await
}

/// GET /public/blog/{slug}
pub async fn get_public_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<BlogArticle> {
    public_record(&state, &slug, article_is_public).await
}

/// GET /public/resources - Published resources visible to everyone.
pub async fn list_public_resources(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Page<Resource>> {
    public_page(&state, &params, resource_is_public).await
}

/// GET /public/resources/{id}
pub async fn get_public_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Resource> {
    public_record(&state, &id, resource_is_public).await
}
