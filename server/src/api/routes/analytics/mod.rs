//! Blog analytics report endpoints

pub mod blog_views;
pub mod params;
pub mod performance;
pub mod top;
pub mod types;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::types::ApiError;
use crate::data::AnalyticsRepository;
use crate::data::cache::{CacheKey, CacheService};
use crate::data::types::ReportFilter;
use crate::utils::debug::{DEBUG_QUERIES_FILE, write_debug};

use params::ReportQuery;

/// Shared state for the report endpoints
#[derive(Clone)]
pub struct AnalyticsApiState {
    pub repo: Arc<dyn AnalyticsRepository>,
    pub cache: Arc<CacheService>,
    /// Set in debug mode; compiled queries are appended here
    pub debug_dir: Option<PathBuf>,
}

/// Build report routes (mounted under `/api/v1/analytics`)
pub fn routes(state: AnalyticsApiState) -> Router<()> {
    Router::new()
        .route("/blog-views", get(blog_views::get_blog_views))
        .route("/top", get(top::get_top))
        .route("/performance", get(performance::get_performance))
        .with_state(state)
}

impl AnalyticsApiState {
    /// Cache key for the request, or `None` when the window is not cacheable
    fn cache_key(
        &self,
        endpoint: &str,
        query: &ReportQuery,
        filter: &ReportFilter,
        now: DateTime<Utc>,
        extra: Vec<(&'static str, String)>,
    ) -> Option<String> {
        if !self.cache.is_enabled() || !query.is_cacheable(filter, now) {
            return None;
        }
        let mut params = query.cache_params(filter);
        params.extend(extra);
        Some(CacheKey::report(endpoint, &params))
    }

    /// Serve from cache when possible, otherwise run `load` and store the result
    ///
    /// Cache failures are logged and fall through to the query.
    async fn cached<T, F>(&self, key: Option<String>, load: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, ApiError>>,
    {
        let Some(key) = key else {
            return load.await;
        };

        match self.cache.get::<T>(&key).await {
            Ok(Some(hit)) => {
                tracing::trace!(%key, "Report cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(%key, error = %e, "Report cache get error"),
        }

        let value = load.await?;
        if let Err(e) = self.cache.set(&key, &value).await {
            tracing::warn!(%key, error = %e, "Report cache set error");
        }
        Ok(value)
    }

    /// Record the compiled query in debug mode
    async fn record_debug(&self, endpoint: &str, query: &ReportQuery, filter: &ReportFilter) {
        let Some(dir) = &self.debug_dir else {
            return;
        };
        let data = serde_json::json!({
            "filter": query.filter,
            "predicate": filter.predicate,
            "start": filter.start.to_rfc3339(),
            "end": filter.end.to_rfc3339(),
            "title": filter.title,
            "author": filter.author,
            "country": filter.country,
            "filter_blog_creation": filter.filter_blog_creation,
        });
        write_debug(dir, DEBUG_QUERIES_FILE, endpoint, &data).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::core::config::CacheConfig;
    use crate::data::DataError;
    use crate::data::DuckdbService;
    use crate::data::types::{
        GroupViewsRow, ObjectType, PerformanceBucketRow, PerformanceParams, SeedParams,
        SeedSummary, TopKind, TopRow,
    };

    /// Repository that counts calls and returns a fixed row
    #[derive(Default)]
    struct CountingRepo {
        calls: AtomicUsize,
    }

    impl CountingRepo {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalyticsRepository for CountingRepo {
        async fn blog_views_report(
            &self,
            _object_type: ObjectType,
            _filter: &ReportFilter,
        ) -> Result<Vec<GroupViewsRow>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![GroupViewsRow {
                label: Some("alice".into()),
                blogs: 2,
                views: 8,
            }])
        }

        async fn top_report(
            &self,
            _kind: TopKind,
            _filter: &ReportFilter,
            _limit: usize,
        ) -> Result<Vec<TopRow>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn performance_report(
            &self,
            _params: &PerformanceParams,
        ) -> Result<Vec<PerformanceBucketRow>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DataError::InvalidQuery("too many buckets".into()))
        }

        async fn seed(&self, _params: SeedParams) -> Result<SeedSummary, DataError> {
            Ok(SeedSummary::default())
        }

        async fn ping(&self) -> Result<(), DataError> {
            Ok(())
        }
    }

    fn cache() -> Arc<CacheService> {
        Arc::new(CacheService::new(&CacheConfig {
            enabled: true,
            max_entries: 100,
            ttl_secs: 60,
        }))
    }

    fn router_with(repo: Arc<dyn AnalyticsRepository>, debug_dir: Option<PathBuf>) -> Router {
        routes(AnalyticsApiState {
            repo,
            cache: cache(),
            debug_dir,
        })
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_bad_filter_rejected_before_query() {
        let repo = Arc::new(CountingRepo::default());
        let router = router_with(repo.clone(), None);

        let (status, body) = get(&router, "/blog-views?filter=and(x:eq:1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "FILTER_SYNTAX_ERROR");
        assert!(body["detail"].as_str().unwrap().contains("parentheses"));
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_field_is_resolution_error() {
        let repo = Arc::new(CountingRepo::default());
        let router = router_with(repo.clone(), None);

        let (status, body) = get(&router, "/top?filter=password:eq:x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "FILTER_RESOLUTION_ERROR");
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_date_pair_validation() {
        let repo = Arc::new(CountingRepo::default());
        let router = router_with(repo.clone(), None);

        let (status, body) = get(&router, "/blog-views?start_date=2024-01-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["detail"],
            "Provide both start_date & end_date or omit both."
        );

        let (status, _) = get(
            &router,
            "/blog-views?start_date=2024-02-01&end_date=2024-01-01",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_enum_value_is_parse_error() {
        let router = router_with(Arc::new(CountingRepo::default()), None);
        let (status, body) = get(&router, "/top?top=planet").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "QUERY_PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_past_window_is_cached() {
        let repo = Arc::new(CountingRepo::default());
        let router = router_with(repo.clone(), None);
        let uri = "/blog-views?start_date=2024-01-01&end_date=2024-02-01";

        let (first_status, first) = get(&router, uri).await;
        let (_, second) = get(&router, uri).await;
        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(repo.calls(), 1);

        // Different grouping is a different entry
        get(&router, &format!("{}&object_type=country", uri)).await;
        assert_eq!(repo.calls(), 2);
    }

    #[tokio::test]
    async fn test_relative_window_is_not_cached() {
        let repo = Arc::new(CountingRepo::default());
        let router = router_with(repo.clone(), None);

        get(&router, "/blog-views?range=week").await;
        get(&router, "/blog-views?range=week").await;
        assert_eq!(repo.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_query_maps_to_bad_request() {
        let router = router_with(Arc::new(CountingRepo::default()), None);
        let (status, body) = get(&router, "/performance?compare=day").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_debug_mode_records_query() {
        let temp_dir = TempDir::new().unwrap();
        let router = router_with(
            Arc::new(CountingRepo::default()),
            Some(temp_dir.path().to_path_buf()),
        );

        let (status, _) = get(&router, "/blog-views?filter=country:eq:France").await;
        assert_eq!(status, StatusCode::OK);

        let content =
            std::fs::read_to_string(temp_dir.path().join(DEBUG_QUERIES_FILE)).unwrap();
        let entry: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(entry["endpoint"], "blog-views");
        assert_eq!(entry["data"]["filter"], "country:eq:France");
        assert_eq!(entry["data"]["predicate"]["params"][0], "France");
    }

    fn duckdb_repo() -> Arc<dyn AnalyticsRepository> {
        let db = DuckdbService::open_in_memory(Duration::from_secs(5)).unwrap();
        db.conn()
            .execute_batch(
                "INSERT INTO countries (id, name, code) VALUES (1, 'France', 'FR'), (2, 'Germany', 'DE');
                 INSERT INTO users (id, username, country_id) VALUES
                     (1, 'alice', 1), (2, 'bob', 1), (3, 'carl', 2);
                 INSERT INTO blogs (id, title, author_id, created_at) VALUES
                     (1, 'Rust tips', 1, TIMESTAMP '2024-01-05 09:00:00'),
                     (2, 'Paris walks', 2, TIMESTAMP '2024-01-06 09:00:00'),
                     (3, 'Berlin food', 3, TIMESTAMP '2024-01-07 09:00:00');
                 INSERT INTO blog_views (blog_id, created_at) VALUES
                     (1, TIMESTAMP '2024-01-10 10:00:00'),
                     (1, TIMESTAMP '2024-01-11 10:00:00'),
                     (2, TIMESTAMP '2024-01-12 10:00:00'),
                     (3, TIMESTAMP '2024-01-13 10:00:00'),
                     (3, TIMESTAMP '2024-01-14 10:00:00'),
                     (3, TIMESTAMP '2024-01-15 10:00:00');",
            )
            .unwrap();
        Arc::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_blog_views_country_filter_end_to_end() {
        let router = router_with(duckdb_repo(), None);
        let (status, body) = get(
            &router,
            "/blog-views?start_date=2024-01-01&end_date=2024-02-01&filter=country:eq:France",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["object_type"], "user");
        assert_eq!(body["labels"], types::BLOG_VIEWS_LABELS);
        assert_eq!(
            body["data"],
            serde_json::json!([
                {"x": "alice", "y": 1, "z": 2},
                {"x": "bob", "y": 1, "z": 1}
            ])
        );
    }

    #[tokio::test]
    async fn test_top_blogs_end_to_end() {
        let router = router_with(duckdb_repo(), None);
        let (status, body) = get(
            &router,
            "/top?start_date=2024-01-01&end_date=2024-02-01&top=blog",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0], serde_json::json!({"x": "Berlin food", "y": 3, "z": 3}));
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_performance_end_to_end() {
        let router = router_with(duckdb_repo(), None);
        let (status, body) = get(
            &router,
            "/performance?start_date=2024-01-01&end_date=2024-02-15&compare=month&user=carl",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], "carl");
        assert_eq!(
            body["data"],
            serde_json::json!([
                {"x": "2024-01-01", "y": 3, "z": null, "blogs": 1},
                {"x": "2024-02-01", "y": 0, "z": -100.0, "blogs": 0}
            ])
        );
    }
}
