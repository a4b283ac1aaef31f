//! Report response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::types::{
    CompareUnit, GroupViewsRow, ObjectType, PerformanceBucketRow, TopKind, TopRow,
    growth_percent,
};

pub const BLOG_VIEWS_LABELS: &str = "X = Object (User/Country), Y = Total Blogs, Z = Total Views";
pub const TOP_USER_LABELS: &str = "X = User, Y = Total Views, Z = Total Blogs";
pub const TOP_COUNTRY_LABELS: &str = "X = Country, Y = Total Views, Z = Total Blogs";
pub const TOP_BLOG_LABELS: &str = "X = Blog Title, Y = Total Views, Z = Blog ID";
pub const PERFORMANCE_LABELS: &str =
    "X = Period start (YYYY-MM-DD), Y = Views, Z = Growth % vs previous period, Blogs = Blogs created";

/// One `x/y/z` data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportRowDto {
    /// Username, country name or blog title (`null` for authors without a country)
    pub x: Option<String>,
    pub y: i64,
    pub z: i64,
}

impl From<GroupViewsRow> for ReportRowDto {
    fn from(row: GroupViewsRow) -> Self {
        Self {
            x: row.label,
            y: row.blogs,
            z: row.views,
        }
    }
}

impl From<TopRow> for ReportRowDto {
    fn from(row: TopRow) -> Self {
        Self {
            x: row.label,
            y: row.views,
            z: row.secondary,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogViewsResponse {
    pub object_type: ObjectType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub labels: String,
    pub data: Vec<ReportRowDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopResponse {
    pub top: TopKind,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub labels: String,
    pub data: Vec<ReportRowDto>,
}

/// One time bucket of the performance report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PerformanceRowDto {
    /// Bucket start date
    pub x: String,
    /// Views in bucket
    pub y: i64,
    /// Growth in percent vs the previous bucket
    pub z: Option<f64>,
    /// Blogs created in bucket
    pub blogs: i64,
}

/// Convert bucket rows into data points with growth against the previous bucket
pub fn performance_rows(rows: Vec<PerformanceBucketRow>) -> Vec<PerformanceRowDto> {
    let mut previous = None;
    rows.into_iter()
        .map(|row| {
            let dto = PerformanceRowDto {
                x: row.bucket.format("%Y-%m-%d").to_string(),
                y: row.views,
                z: growth_percent(previous, row.views),
                blogs: row.blogs,
            };
            previous = Some(row.views);
            dto
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PerformanceResponse {
    pub compare: CompareUnit,
    pub user: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub labels: String,
    pub data: Vec<PerformanceRowDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bucket(day: u32, views: i64) -> PerformanceBucketRow {
        PerformanceBucketRow {
            bucket: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            views,
            blogs: 1,
        }
    }

    #[test]
    fn test_performance_rows_growth() {
        let rows = performance_rows(vec![bucket(1, 4), bucket(2, 6), bucket(3, 0), bucket(4, 5)]);
        let growth: Vec<Option<f64>> = rows.iter().map(|r| r.z).collect();
        assert_eq!(growth, vec![None, Some(50.0), Some(-100.0), None]);
        assert_eq!(rows[0].x, "2024-01-01");
        assert_eq!(rows[3].y, 5);
    }

    #[test]
    fn test_group_row_maps_blogs_to_y() {
        let dto = ReportRowDto::from(GroupViewsRow {
            label: None,
            blogs: 2,
            views: 9,
        });
        assert_eq!(
            dto,
            ReportRowDto {
                x: None,
                y: 2,
                z: 9
            }
        );
    }

    #[test]
    fn test_top_row_maps_views_to_y() {
        let dto = ReportRowDto::from(TopRow {
            label: Some("Rust tips".into()),
            views: 7,
            secondary: 3,
        });
        assert_eq!((dto.y, dto.z), (7, 3));
    }
}
