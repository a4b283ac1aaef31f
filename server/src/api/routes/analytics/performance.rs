//! Views and created blogs over time

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use super::AnalyticsApiState;
use super::params::{PerformanceQuery, ReportQuery};
use super::types::{PERFORMANCE_LABELS, PerformanceResponse, performance_rows};
use crate::api::extractors::ValidatedQuery;
use crate::api::types::ApiError;
use crate::data::types::PerformanceParams;

const ENDPOINT: &str = "performance";

/// Per-bucket views, blogs created and growth against the previous bucket
#[utoipa::path(
    get,
    path = "/api/v1/analytics/performance",
    tag = "analytics",
    params(ReportQuery, PerformanceQuery),
    responses(
        (status = 200, description = "One row per time bucket, empty buckets included", body = PerformanceResponse),
        (status = 400, description = "Invalid parameters, filter expression or too many buckets")
    )
)]
pub async fn get_performance(
    State(state): State<AnalyticsApiState>,
    ValidatedQuery(report): ValidatedQuery<ReportQuery>,
    ValidatedQuery(query): ValidatedQuery<PerformanceQuery>,
) -> Result<Json<PerformanceResponse>, ApiError> {
    let now = Utc::now();
    let filter = report.to_filter(now)?;
    state.record_debug(ENDPOINT, &report, &filter).await;

    let mut extra = vec![("compare", query.compare.as_str().to_string())];
    if let Some(user) = &query.user {
        extra.push(("user", user.clone()));
    }
    let key = state.cache_key(ENDPOINT, &report, &filter, now, extra);

    let params = PerformanceParams {
        filter,
        compare: query.compare,
        user: query.user.clone(),
    };

    let response = state
        .cached(key, async {
            let rows = state
                .repo
                .performance_report(&params)
                .await
                .map_err(ApiError::from_data)?;
            Ok::<_, ApiError>(PerformanceResponse {
                compare: params.compare,
                user: params.user.clone(),
                start_date: params.filter.start,
                end_date: params.filter.end,
                labels: PERFORMANCE_LABELS.to_string(),
                data: performance_rows(rows),
            })
        })
        .await?;

    Ok(Json(response))
}
