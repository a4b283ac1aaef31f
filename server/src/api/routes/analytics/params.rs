//! Query parameters shared by the report endpoints
//!
//! Each handler extracts `ReportQuery` (validated) plus its own small query
//! struct; both deserialize from the same query string.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::{Validate, ValidationError};

use crate::api::types::ApiError;
use crate::core::constants::CACHE_MIN_WINDOW_AGE_SECS;
use crate::data::duckdb::repositories::analytics::FACTS_ALIAS;
use crate::data::filters::{columns, compile_filter};
use crate::data::types::{CompareUnit, ObjectType, RangeUnit, ReportFilter, TopKind};
use crate::utils::time::parse_query_datetime;

const INVALID_DATE_FORMAT: &str = "expected RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD";

/// Window and blog constraints accepted by every report
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[validate(schema(function = "validate_dates"))]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Window length used when no dates are given (default `year`)
    #[serde(default)]
    pub range: RangeUnit,
    /// Window start; requires `end_date`
    pub start_date: Option<String>,
    /// Window end; requires `start_date`
    pub end_date: Option<String>,
    /// Only include blogs created inside the window
    #[serde(default)]
    pub filter_blog_creation: bool,
    /// Filter expression, e.g. `and(country:eq:France,views:gte:10)`
    pub filter: Option<String>,
    /// Case-insensitive substring of the blog title
    #[validate(length(max = 200, message = "title must be at most 200 characters"))]
    pub title: Option<String>,
    /// Case-insensitive substring of the author username
    #[validate(length(max = 200, message = "author must be at most 200 characters"))]
    pub author: Option<String>,
    /// Case-insensitive substring of the author country name
    #[validate(length(max = 200, message = "country must be at most 200 characters"))]
    pub country: Option<String>,
}

fn parse_date(name: &str, raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    parse_query_datetime(raw).ok_or_else(|| {
        ValidationError::new("date_format")
            .with_message(format!("Invalid {}: {}", name, INVALID_DATE_FORMAT).into())
    })
}

fn validate_dates(query: &ReportQuery) -> Result<(), ValidationError> {
    match (&query.start_date, &query.end_date) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) => {
            let start = parse_date("start_date", start)?;
            let end = parse_date("end_date", end)?;
            if start > end {
                return Err(ValidationError::new("date_order")
                    .with_message("start_date cannot be greater than end_date.".into()));
            }
            Ok(())
        }
        _ => Err(ValidationError::new("date_pair")
            .with_message("Provide both start_date & end_date or omit both.".into())),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl ReportQuery {
    /// Resolved `[start, end]` window; without dates it ends at `now`
    pub fn window(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => {
                let parse = |name: &str, raw: &str| {
                    parse_query_datetime(raw).ok_or_else(|| {
                        ApiError::bad_request(
                            "INVALID_DATE",
                            format!("Invalid {}: {}", name, INVALID_DATE_FORMAT),
                        )
                    })
                };
                Ok((
                    parse("start_date", start.as_str())?,
                    parse("end_date", end.as_str())?,
                ))
            }
            _ => Ok((self.range.start_before(now), now)),
        }
    }

    /// Build the repository filter, compiling the `filter` expression
    ///
    /// Filter errors surface here, before any query is executed.
    pub fn to_filter(&self, now: DateTime<Utc>) -> Result<ReportFilter, ApiError> {
        let (start, end) = self.window(now)?;
        let mut filter = ReportFilter::new(start, end);
        filter.filter_blog_creation = self.filter_blog_creation;
        filter.predicate = match &self.filter {
            Some(raw) => Some(compile_filter(raw, columns::BLOG_FACTS, FACTS_ALIAS)?),
            None => None,
        };
        filter.title = non_empty(&self.title);
        filter.author = non_empty(&self.author);
        filter.country = non_empty(&self.country);
        Ok(filter)
    }

    /// Whether a response for this window may be cached
    ///
    /// Only explicit windows that ended a while ago are stable; anything
    /// relative to `now` changes with every request.
    pub fn is_cacheable(&self, filter: &ReportFilter, now: DateTime<Utc>) -> bool {
        self.end_date.is_some() && (now - filter.end).num_seconds() > CACHE_MIN_WINDOW_AGE_SECS
    }

    /// Normalised `(name, value)` pairs identifying the request
    pub fn cache_params(&self, filter: &ReportFilter) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("start", filter.start.to_rfc3339()),
            ("end", filter.end.to_rfc3339()),
            ("filter_blog_creation", filter.filter_blog_creation.to_string()),
        ];
        let optional = [
            ("filter", self.filter.as_ref().map(|f| f.trim().to_string())),
            ("title", filter.title.clone()),
            ("author", filter.author.clone()),
            ("country", filter.country.clone()),
        ];
        params.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v))),
        );
        params
    }
}

/// `GET /blog-views` parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogViewsQuery {
    /// Group by author (`user`, default) or author country (`country`)
    #[serde(default)]
    pub object_type: ObjectType,
}

/// `GET /top` parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopQuery {
    /// Ranked entity: `user`, `country` or `blog` (default)
    #[serde(default)]
    pub top: TopKind,
}

/// `GET /performance` parameters
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PerformanceQuery {
    /// Bucket unit: `day`, `week`, `month` (default) or `year`
    #[serde(default)]
    pub compare: CompareUnit,
    /// Exact author username
    #[validate(length(min = 1, max = 150, message = "user must be 1-150 characters"))]
    pub user: Option<String>,
}
