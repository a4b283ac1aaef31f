//! Repository trait for the analytics store
//!
//! The API layer only talks to this trait; the DuckDB backend implements it.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    GroupViewsRow, ObjectType, PerformanceBucketRow, PerformanceParams, ReportFilter, SeedParams,
    SeedSummary, TopKind, TopRow,
};

/// Repository trait for blog analytics reports
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Blogs and views grouped per author or per author country
    ///
    /// Ordered by views descending, then label.
    async fn blog_views_report(
        &self,
        object_type: ObjectType,
        filter: &ReportFilter,
    ) -> Result<Vec<GroupViewsRow>, DataError>;

    /// Top entries by views inside the window
    async fn top_report(
        &self,
        kind: TopKind,
        filter: &ReportFilter,
        limit: usize,
    ) -> Result<Vec<TopRow>, DataError>;

    /// Views and created blogs per time bucket, including empty buckets
    async fn performance_report(
        &self,
        params: &PerformanceParams,
    ) -> Result<Vec<PerformanceBucketRow>, DataError>;

    /// Populate the store with generated data
    async fn seed(&self, params: SeedParams) -> Result<SeedSummary, DataError>;

    /// Cheap liveness check of the underlying store
    async fn ping(&self) -> Result<(), DataError>;
}
