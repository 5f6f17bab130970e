//! Dashboard summary: collection counts and project budget totals.
//!
//! When a remote dashboard API is configured it is asked first; any failure
//! there falls back to the summary computed from the local stores.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{
    now_timestamp, BlogArticle, Distributor, Entity, Project, ProjectStatus, Resource, Supplier,
    TeamMember,
};

const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub kind: String,
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub budget: f64,
    pub spent: f64,
    pub projects: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub by_category: BTreeMap<String, CategoryBudget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub source: SummarySource,
    pub generated_at: String,
    pub collections: Vec<CollectionStats>,
    pub budget: BudgetSummary,
    pub active_projects: usize,
}

/// Count records per status.
pub fn collection_stats<E: Entity>(records: &[E]) -> CollectionStats {
    let mut by_status = BTreeMap::new();
    for record in records {
        *by_status
            .entry(record.status_label().to_string())
            .or_insert(0) += 1;
    }
    CollectionStats {
        kind: E::KIND.to_string(),
        total: records.len(),
        by_status,
    }
}

/// Sum project budgets and spending, overall and per category.
pub fn aggregate_budget(projects: &[Project]) -> BudgetSummary {
    let mut summary = BudgetSummary::default();

    for project in projects {
        summary.total_budget += project.budget;
        summary.total_spent += project.spent;

        let category = match project.category.trim() {
            "" => UNCATEGORIZED.to_string(),
            name => name.to_string(),
        };
        let entry = summary.by_category.entry(category).or_default();
        entry.budget += project.budget;
        entry.spent += project.spent;
        entry.projects += 1;
    }

    summary.remaining = summary.total_budget - summary.total_spent;
    summary
}

/// Build the summary from the local stores.
pub async fn local_summary(repo: &Repository) -> Result<DashboardSummary, AppError> {
    let projects = repo.store::<Project>().list().await?;

    let collections = vec![
        collection_stats(&repo.store::<BlogArticle>().list().await?),
        collection_stats(&repo.store::<Resource>().list().await?),
        collection_stats(&repo.store::<Supplier>().list().await?),
        collection_stats(&repo.store::<Distributor>().list().await?),
        collection_stats(&repo.store::<TeamMember>().list().await?),
        collection_stats(&projects),
    ];

    Ok(DashboardSummary {
        source: SummarySource::Local,
        generated_at: now_timestamp(),
        collections,
        budget: aggregate_budget(&projects),
        active_projects: projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
    })
}

/// Serves dashboard summaries, preferring the remote API when configured.
#[derive(Clone)]
pub struct DashboardService {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl DashboardService {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn is_remote(&self) -> bool {
        self.base_url.is_some()
    }

    pub async fn summary(&self, repo: &Repository) -> Result<DashboardSummary, AppError> {
        if let Some(base_url) = &self.base_url {
            match self.fetch_remote(base_url).await {
                Ok(summary) => return Ok(summary),
                Err(e) => {
                    tracing::warn!("Remote dashboard unavailable, using local data: {}", e);
                }
            }
        }
        local_summary(repo).await
    }

    async fn fetch_remote(&self, base_url: &str) -> Result<DashboardSummary, AppError> {
        let mut summary: DashboardSummary = self
            .client
            .get(format!("{}/dashboard", base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        summary.source = SummarySource::Remote;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{seed::seed_all, MemoryStorage};
    use axum::{routing::get, Json, Router};
    use std::sync::Arc;

    async fn seeded_repo() -> Repository {
        let repo = Repository::new(Arc::new(MemoryStorage::new()));
        seed_all(&repo).await.unwrap();
        repo
    }

    #[test]
    fn test_aggregate_budget() {
        let summary = aggregate_budget(&Project::seed());

        assert_eq!(summary.total_budget, 215_000.0);
        assert_eq!(summary.total_spent, 126_500.0);
        assert_eq!(summary.remaining, 88_500.0);

        let water = &summary.by_category["eau"];
        assert_eq!(water.budget, 150_000.0);
        assert_eq!(water.spent, 114_500.0);
        assert_eq!(water.projects, 2);
        assert_eq!(summary.by_category["agriculture"].projects, 1);
    }

    #[test]
    fn test_aggregate_budget_groups_blank_category() {
        let project = Project {
            budget: 10.0,
            ..Project::new("p", "Sans catégorie")
        };
        let summary = aggregate_budget(&[project]);
        assert_eq!(summary.by_category[UNCATEGORIZED].budget, 10.0);
        assert_eq!(aggregate_budget(&[]), BudgetSummary::default());
    }

    #[tokio::test]
    async fn test_local_summary() {
        let repo = seeded_repo().await;
        let service = DashboardService::new(None, Duration::from_secs(1)).unwrap();

        let summary = service.summary(&repo).await.unwrap();
        assert_eq!(summary.source, SummarySource::Local);
        assert_eq!(summary.collections.len(), 6);
        assert_eq!(summary.active_projects, 1);

        let projects = summary
            .collections
            .iter()
            .find(|c| c.kind == Project::KIND)
            .unwrap();
        assert_eq!(projects.total, 3);
        assert_eq!(projects.by_status["completed"], 1);
    }

    #[tokio::test]
    async fn test_unreachable_remote_falls_back() {
        let repo = seeded_repo().await;
        let service = DashboardService::new(
            Some("http://127.0.0.1:1".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(service.is_remote());

        let summary = service.summary(&repo).await.unwrap();
        assert_eq!(summary.source, SummarySource::Local);
        assert_eq!(summary.budget.total_budget, 215_000.0);
    }

    #[tokio::test]
    async fn test_remote_summary_is_used() {
        let remote = DashboardSummary {
            source: SummarySource::Local,
            generated_at: "2025-06-01T00:00:00Z".to_string(),
            collections: Vec::new(),
            budget: BudgetSummary {
                total_budget: 1.0,
                total_spent: 0.5,
                remaining: 0.5,
                by_category: BTreeMap::new(),
            },
            active_projects: 42,
        };
        let body = remote.clone();
        let app = Router::new().route("/dashboard", get(move || async move { Json(body) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let repo = Repository::new(Arc::new(MemoryStorage::new()));
        let service =
            DashboardService::new(Some(format!("http://{}", addr)), Duration::from_secs(5))
                .unwrap();

        let summary = service.summary(&repo).await.unwrap();
        assert_eq!(summary.source, SummarySource::Remote);
        assert_eq!(summary.active_projects, 42);
    }

    #[tokio::test]
    async fn test_remote_error_status_falls_back() {
        let app = Router::new().route(
            "/dashboard",
            get(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let repo = seeded_repo().await;
        let service =
            DashboardService::new(Some(format!("http://{}", addr)), Duration::from_secs(5))
                .unwrap();

        let summary = service.summary(&repo).await.unwrap();
        assert_eq!(summary.source, SummarySource::Local);
        assert_eq!(summary.active_projects, 1);
    }
}
