//! Report query parameters and result rows

use chrono::{DateTime, NaiveDate, Utc};

use super::enums::CompareUnit;
use crate::data::filters::Predicate;

// ============================================================================
// Parameters
// ============================================================================

/// Constraints shared by every report query
///
/// All constraints are ANDed: the view window always applies to view counts;
/// the remaining fields narrow the set of blogs.
#[derive(Debug, Clone)]
pub struct ReportFilter {
    /// Inclusive view window start
    pub start: DateTime<Utc>,
    /// Inclusive view window end
    pub end: DateTime<Utc>,
    /// Only blogs created inside the window
    pub filter_blog_creation: bool,
    /// Compiled `filter` expression over blog facts
    pub predicate: Option<Predicate>,
    /// Case-insensitive contains-match on the blog title
    pub title: Option<String>,
    /// Case-insensitive contains-match on the author username
    pub author: Option<String>,
    /// Case-insensitive contains-match on the author country name
    pub country: Option<String>,
}

impl ReportFilter {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            filter_blog_creation: false,
            predicate: None,
            title: None,
            author: None,
            country: None,
        }
    }
}

/// Performance report parameters
#[derive(Debug, Clone)]
pub struct PerformanceParams {
    pub filter: ReportFilter,
    pub compare: CompareUnit,
    /// Exact author username
    pub user: Option<String>,
}

// ============================================================================
// Row types (query results)
// ============================================================================

/// One group of the blog-views report
#[derive(Debug, Clone, PartialEq)]
pub struct GroupViewsRow {
    /// Username or country name (`None` for authors without a country)
    pub label: Option<String>,
    pub blogs: i64,
    pub views: i64,
}

/// One ranked entry of the top report
#[derive(Debug, Clone, PartialEq)]
pub struct TopRow {
    /// Username, country name or blog title
    pub label: Option<String>,
    pub views: i64,
    /// Blog count for users/countries, blog id for blogs
    pub secondary: i64,
}

/// Counts for one time bucket of the performance report
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceBucketRow {
    pub bucket: NaiveDate,
    pub views: i64,
    pub blogs: i64,
}

/// Growth in percent relative to the previous bucket
///
/// `None` when there is no previous bucket or it had no views.
pub fn growth_percent(previous: Option<i64>, current: i64) -> Option<f64> {
    match previous {
        Some(prev) if prev > 0 => {
            let pct = (current - prev) as f64 / prev as f64 * 100.0;
            Some((pct * 100.0).round() / 100.0)
        }
        _ => None,
    }
}

/// Rows created by a seeding run; reused countries and users are not counted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub countries: usize,
    pub users: usize,
    pub blogs: usize,
    pub views: usize,
}

/// Seeding parameters
#[derive(Debug, Clone, Copy)]
pub struct SeedParams {
    pub countries: usize,
    pub users: usize,
    pub blogs: usize,
    pub views: usize,
}
