//! Report queries over per-blog facts
//!
//! Every report starts from the same `blog_facts` CTE: one row per blog with
//! its author, the author's country and the number of views inside the
//! requested window. Filter predicates are compiled against those columns
//! (see `filters::columns::BLOG_FACTS`) and applied in a second `filtered`
//! CTE, so the `views` field filters on the windowed count.

use std::collections::HashMap;

use chrono::NaiveDate;
use duckdb::Connection;

use crate::core::constants::MAX_PERFORMANCE_BUCKETS;
use crate::data::duckdb::DuckdbError;
use crate::data::filters::{SqlParams, SqlValue};
use crate::data::types::{
    GroupViewsRow, ObjectType, PerformanceBucketRow, PerformanceParams, ReportFilter, TopKind,
    TopRow,
};
use crate::utils::sql::contains_pattern;
use crate::utils::time::to_sql_timestamp;

/// Alias the compiled filter predicate is written against
pub const FACTS_ALIAS: &str = "bf";

const BLOG_FACTS_CTE: &str = r#"
WITH blog_facts AS (
    SELECT
        b.id AS blog_id,
        b.title AS title,
        b.created_at AS created_at,
        u.id AS author_id,
        u.username AS author_username,
        u.first_name AS author_first_name,
        c.name AS country_name,
        c.code AS country_code,
        COUNT(v.id) AS views
    FROM blogs b
    JOIN users u ON u.id = b.author_id
    LEFT JOIN countries c ON c.id = u.country_id
    LEFT JOIN blog_views v
        ON v.blog_id = b.id
       AND v.created_at BETWEEN CAST(? AS TIMESTAMP) AND CAST(? AS TIMESTAMP)
    GROUP BY b.id, b.title, b.created_at, u.id, u.username, u.first_name, c.name, c.code
)"#;

/// Builder for the `blog_facts` + `filtered` CTE pair
///
/// Parameters are kept in placeholder order: window bounds for the facts
/// CTE, then every condition of the `filtered` CTE, then whatever the final
/// SELECT binds.
struct FactsQuery {
    conditions: Vec<String>,
    params: SqlParams,
}

impl FactsQuery {
    fn new(filter: &ReportFilter) -> Self {
        let start = to_sql_timestamp(&filter.start);
        let end = to_sql_timestamp(&filter.end);

        let mut query = Self {
            conditions: Vec::new(),
            params: SqlParams::default(),
        };
        query.params.push(start.clone());
        query.params.push(end.clone());

        if filter.filter_blog_creation {
            query.conditions.push(format!(
                "{FACTS_ALIAS}.created_at BETWEEN CAST(? AS TIMESTAMP) AND CAST(? AS TIMESTAMP)"
            ));
            query.params.push(start);
            query.params.push(end);
        }

        if let Some(predicate) = &filter.predicate {
            query.conditions.push(predicate.sql.clone());
            query.params.extend(predicate.params.clone());
        }

        let contains = [
            ("title", &filter.title),
            ("author_username", &filter.author),
            ("country_name", &filter.country),
        ];
        for (column, value) in contains {
            if let Some(value) = value {
                query
                    .conditions
                    .push(format!("{FACTS_ALIAS}.{column} ILIKE ? ESCAPE '\\'"));
                query.params.push(contains_pattern(value));
            }
        }

        query
    }

    /// Add an extra condition on the facts row
    fn and(mut self, condition: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(condition.to_string());
        self.params.push(value);
        self
    }

    /// Full SQL text with `select` appended after the CTEs
    fn finish(self, select: &str, select_params: SqlParams) -> (String, SqlParams) {
        let where_clause = if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        };
        let sql = format!(
            "{BLOG_FACTS_CTE},
filtered AS (
    SELECT {FACTS_ALIAS}.* FROM blog_facts {FACTS_ALIAS}
    {where_clause}
)
{select}"
        );
        let mut params = self.params;
        params.extend(select_params);
        (sql, params)
    }
}

/// Blogs and windowed views per author or per author country
pub fn blog_views_report(
    conn: &Connection,
    object_type: ObjectType,
    filter: &ReportFilter,
) -> Result<Vec<GroupViewsRow>, DuckdbError> {
    let label = match object_type {
        ObjectType::User => "author_username",
        ObjectType::Country => "country_name",
    };
    let select = format!(
        "SELECT {label} AS label, COUNT(*) AS blogs, CAST(SUM(views) AS BIGINT) AS total_views
         FROM filtered
         GROUP BY {label}
         ORDER BY total_views DESC, label ASC NULLS LAST"
    );
    let (sql, params) = FactsQuery::new(filter).finish(&select, SqlParams::default());

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(&*params.as_params(), |row| {
        Ok(GroupViewsRow {
            label: row.get(0)?,
            blogs: row.get(1)?,
            views: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Top users, countries or blogs by windowed views
///
/// Authors without a country are left out of the country ranking.
pub fn top_report(
    conn: &Connection,
    kind: TopKind,
    filter: &ReportFilter,
    limit: usize,
) -> Result<Vec<TopRow>, DuckdbError> {
    let select = match kind {
        TopKind::User => {
            "SELECT author_username AS label, CAST(SUM(views) AS BIGINT) AS total_views, COUNT(*) AS secondary
             FROM filtered
             GROUP BY author_username
             ORDER BY total_views DESC, label ASC
             LIMIT ?"
        }
        TopKind::Country => {
            "SELECT country_name AS label, CAST(SUM(views) AS BIGINT) AS total_views, COUNT(*) AS secondary
             FROM filtered
             WHERE country_name IS NOT NULL
             GROUP BY country_name
             ORDER BY total_views DESC, label ASC
             LIMIT ?"
        }
        TopKind::Blog => {
            "SELECT title AS label, views, blog_id AS secondary
             FROM filtered
             ORDER BY views DESC, label ASC, blog_id ASC
             LIMIT ?"
        }
    };
    let mut select_params = SqlParams::default();
    select_params.push(i64::try_from(limit).unwrap_or(i64::MAX));
    let (sql, params) = FactsQuery::new(filter).finish(select, select_params);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(&*params.as_params(), |row| {
        Ok(TopRow {
            label: row.get(0)?,
            views: row.get(1)?,
            secondary: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Views and created blogs per time bucket across the whole window
///
/// Buckets without activity are filled with zeros.
pub fn performance_report(
    conn: &Connection,
    params: &PerformanceParams,
) -> Result<Vec<PerformanceBucketRow>, DuckdbError> {
    let filter = &params.filter;
    let buckets = params
        .compare
        .buckets(filter.start, filter.end, MAX_PERFORMANCE_BUCKETS)
        .ok_or_else(|| {
            DuckdbError::InvalidQuery(format!(
                "Date range spans more than {} {} buckets",
                MAX_PERFORMANCE_BUCKETS,
                params.compare.as_str()
            ))
        })?;

    let part = params.compare.sql_part();
    let views_select = format!(
        "SELECT strftime(date_trunc('{part}', v.created_at), '%Y-%m-%d') AS bucket, COUNT(*) AS n
         FROM blog_views v
         JOIN filtered f ON f.blog_id = v.blog_id
         WHERE v.created_at BETWEEN CAST(? AS TIMESTAMP) AND CAST(? AS TIMESTAMP)
         GROUP BY bucket"
    );
    let blogs_select = format!(
        "SELECT strftime(date_trunc('{part}', f.created_at), '%Y-%m-%d') AS bucket, COUNT(*) AS n
         FROM filtered f
         WHERE f.created_at BETWEEN CAST(? AS TIMESTAMP) AND CAST(? AS TIMESTAMP)
         GROUP BY bucket"
    );

    let views = bucket_counts(conn, params, &views_select)?;
    let blogs = bucket_counts(conn, params, &blogs_select)?;

    Ok(buckets
        .into_iter()
        .map(|bucket| PerformanceBucketRow {
            bucket,
            views: views.get(&bucket).copied().unwrap_or(0),
            blogs: blogs.get(&bucket).copied().unwrap_or(0),
        })
        .collect())
}

fn bucket_counts(
    conn: &Connection,
    params: &PerformanceParams,
    select: &str,
) -> Result<HashMap<NaiveDate, i64>, DuckdbError> {
    let filter = &params.filter;
    let mut query = FactsQuery::new(filter);
    if let Some(user) = &params.user {
        query = query.and(
            &format!("{FACTS_ALIAS}.author_username = ?"),
            user.as_str(),
        );
    }

    let mut window = SqlParams::default();
    window.push(to_sql_timestamp(&filter.start));
    window.push(to_sql_timestamp(&filter.end));
    let (sql, sql_params) = query.finish(select, window);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(&*sql_params.as_params(), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut counts = HashMap::new();
    for row in rows {
        let (bucket, count) = row?;
        let date = NaiveDate::parse_from_str(&bucket, "%Y-%m-%d").map_err(|e| {
            DuckdbError::InvalidQuery(format!("Unexpected bucket value '{}': {}", bucket, e))
        })?;
        counts.insert(date, count);
    }
    Ok(counts)
}
