//! Report dimension enums
//!
//! Grouping, ranking and time-unit choices shared by the API layer and the
//! repository queries. SQL fragments are only ever taken from these enums,
//! never from request text.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Grouping dimension of the blog-views report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    #[default]
    User,
    Country,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Country => "country",
        }
    }
}

/// Ranked entity of the top report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TopKind {
    User,
    Country,
    #[default]
    Blog,
}

impl TopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Country => "country",
            Self::Blog => "blog",
        }
    }
}

/// Relative window size used when no explicit dates are given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    Week,
    Month,
    #[default]
    Year,
}

impl RangeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Start of a window of this size ending at `end` (calendar arithmetic)
    ///
    /// Month and year steps clamp to the last valid day (Mar 31 → Feb 29).
    pub fn start_before(&self, end: DateTime<Utc>) -> DateTime<Utc> {
        let start = match self {
            Self::Week => end.checked_sub_days(Days::new(7)),
            Self::Month => end.checked_sub_months(Months::new(1)),
            Self::Year => end.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Time bucket unit of the performance report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompareUnit {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl CompareUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// DuckDB `date_trunc` part name (weeks start on Monday in both)
    pub fn sql_part(&self) -> &'static str {
        self.as_str()
    }

    /// Start date of the bucket containing `dt`
    pub fn truncate(&self, dt: DateTime<Utc>) -> NaiveDate {
        let date = dt.date_naive();
        match self {
            Self::Day => date,
            Self::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Self::Month => date.with_day(1).unwrap_or(date),
            Self::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Start date of the bucket following the one starting at `bucket`
    pub fn next(&self, bucket: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day => bucket.checked_add_days(Days::new(1)),
            Self::Week => bucket.checked_add_days(Days::new(7)),
            Self::Month => bucket.checked_add_months(Months::new(1)),
            Self::Year => bucket.checked_add_months(Months::new(12)),
        }
    }

    /// All bucket starts covering `[start, end]`, or `None` past `limit`
    pub fn buckets(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Option<Vec<NaiveDate>> {
        let last = self.truncate(end);
        let mut current = self.truncate(start);
        let mut buckets = Vec::new();
        while current <= last {
            if buckets.len() == limit {
                return None;
            }
            buckets.push(current);
            current = match self.next(current) {
                Some(next) => next,
                None => break,
            };
        }
        Some(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_enum_serde_lowercase() {
        assert_eq!(
            serde_json::from_str::<ObjectType>(r#""country""#).unwrap(),
            ObjectType::Country
        );
        assert_eq!(serde_json::to_string(&TopKind::Blog).unwrap(), r#""blog""#);
        assert!(serde_json::from_str::<CompareUnit>(r#""hour""#).is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ObjectType::default(), ObjectType::User);
        assert_eq!(TopKind::default(), TopKind::Blog);
        assert_eq!(RangeUnit::default(), RangeUnit::Year);
        assert_eq!(CompareUnit::default(), CompareUnit::Month);
    }

    #[test]
    fn test_range_start_before() {
        let end = utc(2024, 3, 31, 12);
        assert_eq!(RangeUnit::Week.start_before(end), utc(2024, 3, 24, 12));
        assert_eq!(RangeUnit::Month.start_before(end), utc(2024, 2, 29, 12));
        assert_eq!(RangeUnit::Year.start_before(end), utc(2023, 3, 31, 12));
    }

    #[test]
    fn test_truncate() {
        // 2024-05-15 is a Wednesday
        let dt = utc(2024, 5, 15, 18);
        assert_eq!(CompareUnit::Day.truncate(dt), date(2024, 5, 15));
        assert_eq!(CompareUnit::Week.truncate(dt), date(2024, 5, 13));
        assert_eq!(CompareUnit::Month.truncate(dt), date(2024, 5, 1));
        assert_eq!(CompareUnit::Year.truncate(dt), date(2024, 1, 1));
    }

    #[test]
    fn test_week_truncate_on_monday_and_sunday() {
        assert_eq!(CompareUnit::Week.truncate(utc(2024, 5, 13, 0)), date(2024, 5, 13));
        assert_eq!(CompareUnit::Week.truncate(utc(2024, 5, 19, 23)), date(2024, 5, 13));
    }

    #[test]
    fn test_buckets_month() {
        let buckets = CompareUnit::Month
            .buckets(utc(2024, 1, 20, 0), utc(2024, 4, 2, 0), 100)
            .unwrap();
        assert_eq!(
            buckets,
            vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1), date(2024, 4, 1)]
        );
    }

    #[test]
    fn test_buckets_single_day_window() {
        let buckets = CompareUnit::Day
            .buckets(utc(2024, 1, 1, 1), utc(2024, 1, 1, 23), 10)
            .unwrap();
        assert_eq!(buckets, vec![date(2024, 1, 1)]);
    }

    #[test]
    fn test_buckets_limit() {
        assert!(
            CompareUnit::Day
                .buckets(utc(2020, 1, 1, 0), utc(2024, 1, 1, 0), 1000)
                .is_none()
        );
        assert_eq!(
            CompareUnit::Day
                .buckets(utc(2024, 1, 1, 0), utc(2024, 1, 10, 0), 10)
                .unwrap()
                .len(),
            10
        );
    }
}
