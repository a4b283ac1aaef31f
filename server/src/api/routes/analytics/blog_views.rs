//! Blogs and views per author or per author country

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use super::AnalyticsApiState;
use super::params::{BlogViewsQuery, ReportQuery};
use super::types::{BLOG_VIEWS_LABELS, BlogViewsResponse, ReportRowDto};
use crate::api::extractors::ValidatedQuery;
use crate::api::types::ApiError;

const ENDPOINT: &str = "blog-views";

/// Blogs and views grouped by author or country
#[utoipa::path(
    get,
    path = "/api/v1/analytics/blog-views",
    tag = "analytics",
    params(ReportQuery, BlogViewsQuery),
    responses(
        (status = 200, description = "One row per group, ordered by views", body = BlogViewsResponse),
        (status = 400, description = "Invalid parameters or filter expression")
    )
)]
pub async fn get_blog_views(
    State(state): State<AnalyticsApiState>,
    ValidatedQuery(report): ValidatedQuery<ReportQuery>,
    ValidatedQuery(query): ValidatedQuery<BlogViewsQuery>,
) -> Result<Json<BlogViewsResponse>, ApiError> {
    let now = Utc::now();
    let filter = report.to_filter(now)?;
    state.record_debug(ENDPOINT, &report, &filter).await;

    let object_type = query.object_type;
    let key = state.cache_key(
        ENDPOINT,
        &report,
        &filter,
        now,
        vec![("object_type", object_type.as_str().to_string())],
    );

    let response = state
        .cached(key, async {
            let rows = state
                .repo
                .blog_views_report(object_type, &filter)
                .await
                .map_err(ApiError::from_data)?;
            Ok::<_, ApiError>(BlogViewsResponse {
                object_type,
                start_date: filter.start,
                end_date: filter.end,
                labels: BLOG_VIEWS_LABELS.to_string(),
                data: rows.into_iter().map(ReportRowDto::from).collect(),
            })
        })
        .await?;

    Ok(Json(response))
}
