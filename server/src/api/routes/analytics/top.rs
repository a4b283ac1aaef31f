//! Top entries by views

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use super::AnalyticsApiState;
use super::params::{ReportQuery, TopQuery};
use super::types::{
    ReportRowDto, TOP_BLOG_LABELS, TOP_COUNTRY_LABELS, TOP_USER_LABELS, TopResponse,
};
use crate::api::extractors::ValidatedQuery;
use crate::api::types::ApiError;
use crate::core::constants::REPORT_TOP_LIMIT;
use crate::data::types::TopKind;

const ENDPOINT: &str = "top";

fn labels(kind: TopKind) -> &'static str {
    match kind {
        TopKind::User => TOP_USER_LABELS,
        TopKind::Country => TOP_COUNTRY_LABELS,
        TopKind::Blog => TOP_BLOG_LABELS,
    }
}

/// Top 10 users, countries or blogs by views in the window
#[utoipa::path(
    get,
    path = "/api/v1/analytics/top",
    tag = "analytics",
    params(ReportQuery, TopQuery),
    responses(
        (status = 200, description = "Ranked entries", body = TopResponse),
        (status = 400, description = "Invalid parameters or filter expression")
    )
)]
pub async fn get_top(
    State(state): State<AnalyticsApiState>,
    ValidatedQuery(report): ValidatedQuery<ReportQuery>,
    ValidatedQuery(query): ValidatedQuery<TopQuery>,
) -> Result<Json<TopResponse>, ApiError> {
    let now = Utc::now();
    let filter = report.to_filter(now)?;
    state.record_debug(ENDPOINT, &report, &filter).await;

    let kind = query.top;
    let key = state.cache_key(
        ENDPOINT,
        &report,
        &filter,
        now,
        vec![("top", kind.as_str().to_string())],
    );

    let response = state
        .cached(key, async {
            let rows = state
                .repo
                .top_report(kind, &filter, REPORT_TOP_LIMIT)
                .await
                .map_err(ApiError::from_data)?;
            Ok::<_, ApiError>(TopResponse {
                top: kind,
                start_date: filter.start,
                end_date: filter.end,
                labels: labels(kind).to_string(),
                data: rows.into_iter().map(ReportRowDto::from).collect(),
            })
        })
        .await?;

    Ok(Json(response))
}
