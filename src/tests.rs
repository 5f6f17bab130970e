//! Integration tests for the DonorOps backend.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::dashboard::DashboardService;
use crate::db::{init_database, seed::seed_all, MemoryStorage, Repository, SqliteStorage};
use crate::{create_router, AppState};

const TEST_PSK: &str = "test-api-key";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

struct FixtureOptions {
    psk: Option<String>,
    seed: bool,
    quota: Option<usize>,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            psk: Some(TEST_PSK.to_string()),
            seed: true,
            quota: None,
        }
    }
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_options(FixtureOptions::default()).await
    }

    async fn with_options(options: FixtureOptions) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let mut storage = SqliteStorage::new(pool);
        if let Some(quota) = options.quota {
            storage = storage.with_quota(quota);
        }
        let repo = Arc::new(Repository::new(Arc::new(storage)));

        if options.seed {
            seed_all(&repo).await.expect("Failed to seed");
        }

        // Create config
        let mut config = Config::from_lookup(|_| None).expect("Default config");
        config.api_psk = options.psk.clone();
        config.db_path = db_path;
        config.log_level = "warn".to_string();

        let dashboard = DashboardService::new(None, Duration::from_secs(1)).unwrap();

        let state = AppState {
            repo,
            dashboard: Arc::new(dashboard),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = options.psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn post_json(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

fn keys(items: &Value, field: &str) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item[field].as_str().unwrap().to_string())
        .collect()
}

// ==================== HEALTH & AUTH ====================

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_and_wrong_key() {
    let fixture = TestFixture::new().await;
    let client = Client::new();

    let resp = client
        .get(fixture.url("/api/datastore"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = client
        .get(fixture.url("/api/blog"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = client
        .get(fixture.url("/api/blog"))
        .bearer_auth(TEST_PSK)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_public_routes_need_no_key() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/public/blog"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_no_psk_configured_allows_requests() {
    let fixture = TestFixture::with_options(FixtureOptions {
        psk: None,
        ..FixtureOptions::default()
    })
    .await;

    let (status, _) = fixture.get_json("/api/team").await;
    assert_eq!(status, 200);
}

// ==================== LISTING ====================

#[tokio::test]
async fn test_list_blog_newest_first() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/blog").await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let page = &body["data"];
    assert_eq!(page["total"], 3);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 10);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(
        keys(&page["items"], "slug"),
        vec![
            "rapport-annuel-2024",
            "puits-solaires-sahel",
            "formation-benevoles"
        ]
    );
}

#[tokio::test]
async fn test_list_filters_and_sort() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get_json("/api/blog?q=SAHEL").await;
    assert_eq!(keys(&body["data"]["items"], "slug"), vec!["puits-solaires-sahel"]);

    let (_, body) = fixture
        .get_json("/api/blog?sort=oldest&category=transparence")
        .await;
    assert_eq!(keys(&body["data"]["items"], "slug"), vec!["rapport-annuel-2024"]);

    let (_, body) = fixture.get_json("/api/blog?tags=eau,sahel&year=2025").await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = fixture.get_json("/api/blog?tags=eau,rapport").await;
    assert_eq!(body["data"]["total"], 0);

    // Repeated tags combine with AND, like a comma list
    let (_, body) = fixture.get_json("/api/blog?tags=eau&tags=sahel").await;
    assert_eq!(keys(&body["data"]["items"], "slug"), vec!["puits-solaires-sahel"]);

    let (_, body) = fixture.get_json("/api/blog?tags=eau&tags=rapport").await;
    assert_eq!(body["data"]["total"], 0);

    let (_, body) = fixture.get_json("/api/projects?status=active").await;
    assert_eq!(keys(&body["data"]["items"], "id"), vec!["prj-puits-kaya"]);
}

#[tokio::test]
async fn test_list_rejects_bad_parameters() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/blog?visibility=public").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture.get_json("/api/blog?pageSize=20").await;
    assert_eq!(status, 400);

    let (status, body) = fixture.get_json("/api/blog?sort=title&sort=oldest").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_page_clamped_to_last_page() {
    let fixture = TestFixture::with_options(FixtureOptions {
        seed: false,
        ..FixtureOptions::default()
    })
    .await;

    for i in 0..25 {
        let (status, _) = fixture
            .post_json(
                "/api/team",
                json!({ "id": format!("m{:02}", i), "name": format!("Member {}", i) }),
            )
            .await;
        assert_eq!(status, 200);
    }

    let mut seen = Vec::new();
    for page in 1..=3 {
        let (_, body) = fixture
            .get_json(&format!("/api/team?page={}&sort=title", page))
            .await;
        seen.extend(keys(&body["data"]["items"], "id"));
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 25);

    let (_, body) = fixture.get_json("/api/team?page=9").await;
    assert_eq!(body["data"]["page"], 3);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 5);
}

// ==================== CRUD ====================

#[tokio::test]
async fn test_create_get_update_delete() {
    let fixture = TestFixture::new().await;

    let (_, before) = fixture.get_json("/api/datastore/revision").await;
    let revision_before = before["data"]["revisionId"].as_i64().unwrap();

    // Slug is derived from the title
    let (status, created) = fixture
        .post_json(
            "/api/blog",
            json!({ "title": "Apple Pie Recipe", "tags": ["dessert"] }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(created["data"]["slug"], "apple-pie-recipe");
    assert_eq!(created["data"]["status"], "draft");
    assert_eq!(created["data"]["publishedAt"], "");
    assert!(created["revisionId"].as_i64().unwrap() > revision_before);

    let (status, fetched) = fixture.get_json("/api/blog/apple-pie-recipe").await;
    assert_eq!(status, 200);
    assert_eq!(fetched["data"]["tags"], json!(["dessert"]));

    let mut updated = fetched["data"].clone();
    updated["excerpt"] = json!("Grandma's classic");
    let resp = fixture
        .client
        .put(fixture.url("/api/blog/apple-pie-recipe"))
        .json(&updated)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["excerpt"], "Grandma's classic");

    let resp = fixture
        .client
        .delete(fixture.url("/api/blog/apple-pie-recipe"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["deleted"], true);

    let (status, body) = fixture.get_json("/api/blog/apple-pie-recipe").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_missing_is_noop() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .delete(fixture.url("/api/suppliers/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["deleted"], false);
}

#[tokio::test]
async fn test_update_rejects_key_change_and_missing_record() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/suppliers/sup-solaire-bf"))
        .json(&json!({ "id": "other", "name": "Renamed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .put(fixture.url("/api/suppliers/ghost"))
        .json(&json!({ "id": "ghost", "name": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_create_rejects_invalid_record() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post_json(
            "/api/suppliers",
            json!({ "name": "Bad mail", "contactEmail": "nobody" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture
        .post_json("/api/projects", json!({ "title": "Negative", "budget": -5.0 }))
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_route_segments_cannot_be_keys() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.post_json("/api/blog", json!({ "title": "Bulk" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture
        .post_json("/api/blog", json!({ "slug": "export.csv", "title": "Export" }))
        .await;
    assert_eq!(status, 400);

    let (status, _) = fixture
        .post_json("/api/suppliers", json!({ "id": "bulk", "name": "Bulk buyer" }))
        .await;
    assert_eq!(status, 400);

    // The export route still serves CSV
    let resp = fixture
        .client
        .get(fixture.url("/api/blog/export.csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().starts_with("slug,"));
}

#[tokio::test]
async fn test_published_article_needs_publication_date() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post_json(
            "/api/blog",
            json!({ "slug": "live", "title": "Live", "status": "published" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = fixture.get_json("/public/blog/live").await;
    assert_eq!(status, 404);

    let (status, created) = fixture
        .post_json(
            "/api/blog",
            json!({
                "slug": "live",
                "title": "Live",
                "status": "published",
                "publishedAt": "2025-04-01T09:00:00Z"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(created["data"]["publishedAt"], "2025-04-01T09:00:00Z");

    let (status, _) = fixture.get_json("/public/blog/live").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_update_after_delete_is_not_found() {
    let fixture = TestFixture::new().await;

    let (_, fetched) = fixture.get_json("/api/suppliers/sup-solaire-bf").await;
    let record = fetched["data"].clone();

    let resp = fixture
        .client
        .delete(fixture.url("/api/suppliers/sup-solaire-bf"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .put(fixture.url("/api/suppliers/sup-solaire-bf"))
        .json(&record)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let (status, _) = fixture.get_json("/api/suppliers/sup-solaire-bf").await;
    assert_eq!(status, 404);
}

// ==================== STATUS ACTIONS ====================

#[tokio::test]
async fn test_publish_is_idempotent() {
    let fixture = TestFixture::new().await;
    fixture
        .post_json("/api/blog", json!({ "slug": "a", "title": "Apple pie" }))
        .await;

    let (status, first) = fixture.post_json("/api/blog/a/publish", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(first["data"]["status"], "published");
    let published_at = first["data"]["publishedAt"].as_str().unwrap().to_string();
    assert!(!published_at.is_empty());

    let (_, second) = fixture.post_json("/api/blog/a/publish", json!({})).await;
    assert_eq!(second["data"]["publishedAt"], published_at.as_str());
    assert_eq!(second["revisionId"], first["revisionId"]);

    let (_, unpublished) = fixture.post_json("/api/blog/a/unpublish", json!({})).await;
    assert_eq!(unpublished["data"]["status"], "draft");
    assert_eq!(unpublished["data"]["publishedAt"], "");
}

#[tokio::test]
async fn test_invalid_actions() {
    let fixture = TestFixture::new().await;

    let (status, _) = fixture
        .post_json("/api/blog/rapport-annuel-2024/retire", json!({}))
        .await;
    assert_eq!(status, 400);

    let (status, _) = fixture
        .post_json("/api/blog/rapport-annuel-2024/archive", json!({}))
        .await;
    assert_eq!(status, 400);

    let (status, _) = fixture.post_json("/api/blog/ghost/publish", json!({})).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_resource_retire_hides_from_public() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get_json("/public/resources").await;
    assert_eq!(keys(&body["data"]["items"], "id"), vec!["res-comptes-2024"]);

    let (status, retired) = fixture
        .post_json("/api/resources/res-comptes-2024/retire", json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(retired["data"]["status"], "retired");

    let (_, body) = fixture.get_json("/public/resources").await;
    assert_eq!(body["data"]["total"], 0);

    let (status, _) = fixture.get_json("/public/resources/res-comptes-2024").await;
    assert_eq!(status, 404);
}

// ==================== BULK ====================

#[tokio::test]
async fn test_bulk_delete_with_missing_key() {
    let fixture = TestFixture::with_options(FixtureOptions {
        seed: false,
        ..FixtureOptions::default()
    })
    .await;
    fixture
        .post_json("/api/team", json!({ "id": "x", "name": "Xavier" }))
        .await;
    fixture
        .post_json("/api/team", json!({ "id": "y", "name": "Yasmine" }))
        .await;

    let (status, body) = fixture
        .post_json(
            "/api/team/bulk",
            json!({ "action": "delete", "keys": ["x", "missing-key"] }),
        )
        .await;
    assert_eq!(status, 200);

    let report = &body["data"]["report"];
    assert_eq!(report["action"], "delete");
    assert_eq!(report["succeeded"], json!(["x"]));
    assert_eq!(report["failed"][0]["key"], "missing-key");
    assert_eq!(report["failed"][0]["reason"], "not found");

    // Refreshed page comes back with the report
    assert_eq!(keys(&body["data"]["page"]["items"], "id"), vec!["y"]);

    let (status, _) = fixture.get_json("/api/team/x").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_bulk_select_page_respects_filters() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post_json(
            "/api/suppliers/bulk?status=en_revue",
            json!({ "action": "activate", "selectPage": true }),
        )
        .await;
    assert_eq!(status, 200);

    let report = &body["data"]["report"];
    let activated = report["succeeded"].as_array().unwrap().len();
    assert!(activated > 0);
    assert!(report["failed"].as_array().unwrap().is_empty());
    // Same filter now matches nothing
    assert_eq!(body["data"]["page"]["total"], 0);

    let (_, body) = fixture.get_json("/api/suppliers?status=actif").await;
    assert!(body["data"]["total"].as_u64().unwrap() >= activated as u64);
}

#[tokio::test]
async fn test_bulk_rejects_unknown_action() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/blog/bulk"))
        .json(&json!({ "action": "explode", "keys": ["a"] }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

// ==================== EXPORT ====================

#[tokio::test]
async fn test_export_csv() {
    let fixture = TestFixture::new().await;
    fixture
        .post_json(
            "/api/suppliers",
            json!({
                "id": "sup-comma",
                "name": "Comma & Co",
                "description": "Contains, a comma",
                "tags": ["bois", "metal"]
            }),
        )
        .await;

    let resp = fixture
        .client
        .get(fixture.url("/api/suppliers/export.csv?columns=id,description,tags&q=comma"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(resp.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("supplier.csv"));

    let body = resp.text().await.unwrap();
    assert_eq!(
        body,
        "id,description,tags\r\nsup-comma,\"Contains, a comma\",bois|metal\r\n"
    );
}

#[tokio::test]
async fn test_export_default_columns_cover_full_view() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/blog/export.csv?pageSize=10&page=1"))
        .send()
        .await
        .unwrap();
    let body = resp.text().await.unwrap();

    let mut reader = csv::Reader::from_reader(body.as_bytes());
    assert_eq!(
        reader.headers().unwrap().iter().next(),
        Some("slug")
    );
    assert_eq!(reader.records().count(), 3);
}

#[tokio::test]
async fn test_export_unknown_column() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .get_json("/api/projects/export.csv?columns=id,secret")
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// ==================== PUBLIC, DASHBOARD & DATASTORE ====================

#[tokio::test]
async fn test_public_blog_hides_drafts() {
    let fixture = TestFixture::new().await;
    fixture
        .post_json("/api/blog", json!({ "slug": "brouillon", "title": "Brouillon" }))
        .await;

    let (_, body) = fixture.get_json("/public/blog").await;
    assert_eq!(body["data"]["total"], 3);

    let (_, body) = fixture.get_json("/public/blog?status=draft").await;
    assert_eq!(body["data"]["total"], 0);

    let (status, _) = fixture.get_json("/public/blog/brouillon").await;
    assert_eq!(status, 404);

    let (status, body) = fixture.get_json("/public/blog/puits-solaires-sahel").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["slug"], "puits-solaires-sahel");
}

#[tokio::test]
async fn test_dashboard_local_summary() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/dashboard").await;
    assert_eq!(status, 200);

    let summary = &body["data"];
    assert_eq!(summary["source"], "local");
    assert_eq!(summary["collections"].as_array().unwrap().len(), 6);
    assert_eq!(summary["budget"]["totalBudget"], 215000.0);
    assert_eq!(summary["budget"]["byCategory"]["eau"]["projects"], 2);
    assert_eq!(summary["activeProjects"], 1);
}

#[tokio::test]
async fn test_datastore_snapshot() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/datastore").await;
    assert_eq!(status, 200);

    let data = &body["data"];
    assert_eq!(data["schemaVersion"], 1);
    assert_eq!(data["articles"].as_array().unwrap().len(), 3);
    assert_eq!(data["projects"].as_array().unwrap().len(), 3);
    assert_eq!(data["revisionId"], body["revisionId"]);
}

// ==================== STORAGE LIMITS ====================

#[tokio::test]
async fn test_quota_exceeded_is_reported() {
    let fixture = TestFixture::with_options(FixtureOptions {
        seed: false,
        quota: Some(512),
        ..FixtureOptions::default()
    })
    .await;

    let (status, body) = fixture
        .post_json(
            "/api/blog",
            json!({ "slug": "huge", "title": "Huge", "content": "x".repeat(1024) }),
        )
        .await;
    assert_eq!(status, 507);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "QUOTA_EXCEEDED");
    assert_eq!(body["error"]["details"]["quota"], 512);

    let (status, _) = fixture.get_json("/api/blog/huge").await;
    assert_eq!(status, 404);
}

// ==================== ROUTER ====================

#[tokio::test]
async fn test_router_with_memory_storage() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let repo = Arc::new(Repository::new(Arc::new(MemoryStorage::new())));
    seed_all(&repo).await.unwrap();

    let mut config = Config::from_lookup(|_| None).unwrap();
    config.api_psk = Some(TEST_PSK.to_string());
    let state = AppState {
        repo,
        dashboard: Arc::new(DashboardService::new(None, Duration::from_secs(1)).unwrap()),
        config: Arc::new(config),
    };
    let app = create_router(state);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/distributors?region=Centre-Nord")
                .header("x-api-key", TEST_PSK)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/distributors")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
