//! AnalyticsRepository trait implementation for DuckDB
//!
//! The trait is implemented for `Arc<DuckdbService>` rather than
//! `DuckdbService` directly because the mutex guard protecting the connection
//! is not Send: the Arc is cloned and the connection locked inside the
//! blocking closure.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::error::DataError;
use crate::data::traits::AnalyticsRepository;
use crate::data::types::{
    GroupViewsRow, ObjectType, PerformanceBucketRow, PerformanceParams, ReportFilter, SeedParams,
    SeedSummary, TopKind, TopRow,
};

use super::DuckdbService;
use super::repositories::{analytics, seed};

#[async_trait]
impl AnalyticsRepository for Arc<DuckdbService> {
    async fn blog_views_report(
        &self,
        object_type: ObjectType,
        filter: &ReportFilter,
    ) -> Result<Vec<GroupViewsRow>, DataError> {
        let db = Arc::clone(self);
        let filter = filter.clone();
        self.run_query(move || {
            let conn = db.conn();
            analytics::blog_views_report(&conn, object_type, &filter)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn top_report(
        &self,
        kind: TopKind,
        filter: &ReportFilter,
        limit: usize,
    ) -> Result<Vec<TopRow>, DataError> {
        let db = Arc::clone(self);
        let filter = filter.clone();
        self.run_query(move || {
            let conn = db.conn();
            analytics::top_report(&conn, kind, &filter, limit)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn performance_report(
        &self,
        params: &PerformanceParams,
    ) -> Result<Vec<PerformanceBucketRow>, DataError> {
        let db = Arc::clone(self);
        let params = params.clone();
        self.run_query(move || {
            let conn = db.conn();
            analytics::performance_report(&conn, &params)
        })
        .await
        .map_err(DataError::from)?
        .map_err(Into::into)
    }

    async fn seed(&self, params: SeedParams) -> Result<SeedSummary, DataError> {
        let db = Arc::clone(self);
        // Seeding is a one-off write; it is not bound by the query timeout
        tokio::task::spawn_blocking(move || {
            let conn = db.conn();
            let mut rng = StdRng::from_entropy();
            seed::seed(&conn, &params, Utc::now(), &mut rng)
        })
        .await
        .map_err(|e| DataError::Io(std::io::Error::other(e)))?
        .map_err(Into::into)
    }

    async fn ping(&self) -> Result<(), DataError> {
        DuckdbService::ping(self).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;
    use crate::data::filters::{columns, compile_filter};
    use crate::data::duckdb::repositories::analytics::FACTS_ALIAS;

    fn service() -> Arc<DuckdbService> {
        Arc::new(DuckdbService::open_in_memory(Duration::from_secs(10)).unwrap())
    }

    fn last_year() -> ReportFilter {
        let end = Utc::now();
        ReportFilter::new(end - chrono::Duration::days(366), end)
    }

    #[tokio::test]
    async fn test_seed_then_report() {
        let repo = service();
        let summary = repo
            .seed(SeedParams {
                countries: 4,
                users: 10,
                blogs: 30,
                views: 200,
            })
            .await
            .unwrap();
        assert_eq!(summary.views, 200);

        let rows = repo
            .blog_views_report(ObjectType::User, &last_year())
            .await
            .unwrap();
        let blogs: i64 = rows.iter().map(|r| r.blogs).sum();
        let views: i64 = rows.iter().map(|r| r.views).sum();
        assert_eq!(blogs, summary.blogs as i64);
        assert_eq!(views, 200);
        assert!(rows.windows(2).all(|w| w[0].views >= w[1].views));
    }

    #[tokio::test]
    async fn test_top_report_limit() {
        let repo = service();
        repo.seed(SeedParams {
            countries: 3,
            users: 5,
            blogs: 40,
            views: 100,
        })
        .await
        .unwrap();

        let rows = repo
            .top_report(TopKind::Blog, &last_year(), 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 10);
    }

    #[tokio::test]
    async fn test_empty_store_reports() {
        let repo = service();
        let mut filter = ReportFilter::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap(),
        );
        filter.predicate =
            Some(compile_filter("views:gt:0", columns::BLOG_FACTS, FACTS_ALIAS).unwrap());

        let rows = repo
            .blog_views_report(ObjectType::Country, &filter)
            .await
            .unwrap();
        assert!(rows.is_empty());

        let buckets = repo
            .performance_report(&PerformanceParams {
                filter,
                compare: crate::data::types::CompareUnit::Month,
                user: None,
            })
            .await
            .unwrap();
        assert_eq!(buckets.len(), 3);
        assert!(buckets.iter().all(|b| b.views == 0 && b.blogs == 0));
    }
}
