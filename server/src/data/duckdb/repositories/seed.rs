//! Dummy data generator for local development
//!
//! Produces countries, users, blogs spread over the last year and views
//! clustered after each blog's creation, plus one user without blogs, one
//! blog without views and one country without users so every report has
//! empty groups to show.

use chrono::{DateTime, Duration, Utc};
use duckdb::{Connection, OptionalExt, params};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::data::duckdb::{DuckdbError, in_transaction};
use crate::data::types::{SeedParams, SeedSummary};
use crate::utils::time::to_sql_timestamp;

const COUNTRIES: &[(&str, &str)] = &[
    ("France", "FR"),
    ("Germany", "DE"),
    ("Spain", "ES"),
    ("Italy", "IT"),
    ("Portugal", "PT"),
    ("Netherlands", "NL"),
    ("Belgium", "BE"),
    ("Poland", "PL"),
    ("Sweden", "SE"),
    ("Norway", "NO"),
    ("Finland", "FI"),
    ("Ireland", "IE"),
    ("Austria", "AT"),
    ("Greece", "GR"),
    ("Canada", "CA"),
    ("Brazil", "BR"),
    ("Argentina", "AR"),
    ("Mexico", "MX"),
    ("Japan", "JP"),
    ("India", "IN"),
    ("Kenya", "KE"),
    ("Nigeria", "NG"),
    ("Australia", "AU"),
    ("Chile", "CL"),
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bruno", "Chloe", "Diego", "Elena", "Farid", "Greta", "Hugo", "Ines", "Jonas",
    "Keiko", "Lars", "Maya", "Nikolai", "Olga", "Pablo", "Quinn", "Rosa", "Sven", "Tara",
];

const WORDS: &[&str] = &[
    "async", "cache", "data", "design", "engine", "fast", "guide", "habits", "index", "journey",
    "kernel", "lessons", "memory", "notes", "open", "patterns", "queries", "rust", "systems",
    "testing", "tuning", "understanding", "views", "web", "writing",
];

/// Name of the user that never writes a blog
pub const USER_WITHOUT_BLOGS: &str = "user_no_blog";
/// Title of the blog that never gets a view
pub const BLOG_WITHOUT_VIEWS: &str = "No views blog";
/// Country that no user lives in
pub const COUNTRY_WITHOUT_USERS: (&str, &str) = ("EmptyLand", "EL");

/// Insert generated data in a single transaction
///
/// Re-running is safe: existing countries and usernames are reused.
pub fn seed<R: Rng>(
    conn: &Connection,
    params: &SeedParams,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<SeedSummary, DuckdbError> {
    in_transaction(conn, |conn| {
        let mut summary = SeedSummary::default();

        let (country_ids, countries_created) = seed_countries(conn, params.countries, rng)?;
        summary.countries = countries_created;

        let (user_ids, users_created) = seed_users(conn, params.users, &country_ids, rng)?;
        summary.users = users_created;

        let blogs = seed_blogs(conn, params.blogs, &user_ids, now, rng)?;
        summary.blogs = blogs.len();

        summary.views = seed_views(conn, params.views, &blogs, now, rng)?;

        // Entities with nothing attached
        let country = country_ids.choose(rng).copied();
        let (_, created) = upsert_user(conn, USER_WITHOUT_BLOGS, "NoBlog", country)?;
        summary.users += usize::from(created);
        if let Some(&author) = user_ids.choose(rng) {
            insert_blog(conn, BLOG_WITHOUT_VIEWS, author, now - Duration::days(10))?;
            summary.blogs += 1;
        }
        let (_, created) = upsert_country(conn, COUNTRY_WITHOUT_USERS.0, COUNTRY_WITHOUT_USERS.1)?;
        summary.countries += usize::from(created);

        Ok(summary)
    })
}

fn seed_countries<R: Rng>(
    conn: &Connection,
    count: usize,
    rng: &mut R,
) -> Result<(Vec<i64>, usize), DuckdbError> {
    let mut ids = Vec::with_capacity(count);
    let mut created = 0;
    for (name, code) in COUNTRIES.choose_multiple(rng, count) {
        let (id, inserted) = upsert_country(conn, name, code)?;
        ids.push(id);
        created += usize::from(inserted);
    }
    Ok((ids, created))
}

/// Returns the row id and whether the row was newly inserted
fn upsert_country(
    conn: &Connection,
    name: &str,
    code: &str,
) -> Result<(i64, bool), DuckdbError> {
    let existing = conn
        .query_row(
            "SELECT id FROM countries WHERE name = ? OR code = ?",
            params![name, code],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok((id, false));
    }
    let id = conn.query_row(
        "INSERT INTO countries (name, code) VALUES (?, ?) RETURNING id",
        params![name, code],
        |row| row.get(0),
    )?;
    Ok((id, true))
}

fn seed_users<R: Rng>(
    conn: &Connection,
    count: usize,
    country_ids: &[i64],
    rng: &mut R,
) -> Result<(Vec<i64>, usize), DuckdbError> {
    let mut ids = Vec::with_capacity(count);
    let mut created = 0;
    for _ in 0..count {
        let first_name = FIRST_NAMES.choose(rng).copied().unwrap_or("Sam");
        let username = format!(
            "{}_{}{}",
            first_name.to_lowercase(),
            WORDS.choose(rng).copied().unwrap_or("user"),
            rng.gen_range(1..=9999)
        );
        let country = country_ids.choose(rng).copied();
        let (id, inserted) = upsert_user(conn, &username, first_name, country)?;
        ids.push(id);
        created += usize::from(inserted);
    }
    Ok((ids, created))
}

fn upsert_user(
    conn: &Connection,
    username: &str,
    first_name: &str,
    country_id: Option<i64>,
) -> Result<(i64, bool), DuckdbError> {
    let existing = conn
        .query_row(
            "SELECT id FROM users WHERE username = ?",
            params![username],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok((id, false));
    }
    let email = format!("{}@example.com", username);
    let id = conn.query_row(
        "INSERT INTO users (username, first_name, email, country_id)
         VALUES (?, ?, ?, ?) RETURNING id",
        params![username, first_name, email, country_id],
        |row| row.get(0),
    )?;
    Ok((id, true))
}

fn seed_blogs<R: Rng>(
    conn: &Connection,
    count: usize,
    user_ids: &[i64],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Vec<(i64, DateTime<Utc>)>, DuckdbError> {
    let mut blogs = Vec::with_capacity(count);
    if user_ids.is_empty() {
        return Ok(blogs);
    }
    for _ in 0..count {
        let author = user_ids[rng.gen_range(0..user_ids.len())];
        let created_at = now - Duration::days(rng.gen_range(0..=365));
        let id = insert_blog(conn, &sentence(rng, 6), author, created_at)?;
        blogs.push((id, created_at));
    }
    Ok(blogs)
}

fn insert_blog(
    conn: &Connection,
    title: &str,
    author_id: i64,
    created_at: DateTime<Utc>,
) -> Result<i64, DuckdbError> {
    Ok(conn.query_row(
        "INSERT INTO blogs (title, author_id, created_at)
         VALUES (?, ?, CAST(? AS TIMESTAMP)) RETURNING id",
        params![title, author_id, to_sql_timestamp(&created_at)],
        |row| row.get(0),
    )?)
}

fn seed_views<R: Rng>(
    conn: &Connection,
    count: usize,
    blogs: &[(i64, DateTime<Utc>)],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<usize, DuckdbError> {
    if blogs.is_empty() {
        return Ok(0);
    }
    let mut stmt = conn.prepare(
        "INSERT INTO blog_views (blog_id, ip_address, created_at)
         VALUES (?, ?, CAST(? AS TIMESTAMP))",
    )?;
    for _ in 0..count {
        let (blog_id, blog_created) = blogs[rng.gen_range(0..blogs.len())];
        let days_since_creation = (now - blog_created).num_days().max(1);
        let viewed_at = (blog_created + Duration::days(rng.gen_range(0..=days_since_creation)))
            .min(now);
        let ip = format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=223),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=254)
        );
        stmt.execute(params![blog_id, ip, to_sql_timestamp(&viewed_at)])?;
    }
    Ok(count)
}

/// Capitalised sentence of `words` random words ending with a period
fn sentence<R: Rng>(rng: &mut R, words: usize) -> String {
    let mut text = (0..words)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(first) = text.get(0..1) {
        let upper = first.to_uppercase();
        text.replace_range(0..1, &upper);
    }
    text.push('.');
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::data::duckdb::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
        run_migrations(&conn).expect("Failed to run migrations");
        conn
    }

    fn count(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    fn small() -> SeedParams {
        SeedParams {
            countries: 3,
            users: 5,
            blogs: 20,
            views: 100,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_seed_inserts_requested_amounts_plus_empty_entities() {
        let conn = setup();
        let mut rng = StdRng::seed_from_u64(7);
        let summary = seed(&conn, &small(), now(), &mut rng).unwrap();

        assert_eq!(summary.countries, 4);
        assert_eq!(summary.blogs, 21);
        assert_eq!(summary.views, 100);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM countries"), 4);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM blogs"), 21);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM blog_views"), 100);
        assert_eq!(
            count(&conn, "SELECT COUNT(*) FROM users"),
            summary.users as i64
        );
    }

    #[test]
    fn test_seed_creates_entities_without_children() {
        let conn = setup();
        let mut rng = StdRng::seed_from_u64(11);
        seed(&conn, &small(), now(), &mut rng).unwrap();

        assert_eq!(
            count(
                &conn,
                "SELECT COUNT(*) FROM blogs b JOIN users u ON u.id = b.author_id
                 WHERE u.username = 'user_no_blog'"
            ),
            0
        );
        assert_eq!(
            count(
                &conn,
                "SELECT COUNT(*) FROM blog_views v JOIN blogs b ON b.id = v.blog_id
                 WHERE b.title = 'No views blog'"
            ),
            0
        );
        assert_eq!(
            count(
                &conn,
                "SELECT COUNT(*) FROM users u JOIN countries c ON c.id = u.country_id
                 WHERE c.code = 'EL'"
            ),
            0
        );
    }

    #[test]
    fn test_seeded_views_follow_blog_creation_and_not_future() {
        let conn = setup();
        let mut rng = StdRng::seed_from_u64(3);
        seed(&conn, &small(), now(), &mut rng).unwrap();

        assert_eq!(
            count(
                &conn,
                "SELECT COUNT(*) FROM blog_views v JOIN blogs b ON b.id = v.blog_id
                 WHERE v.created_at < b.created_at"
            ),
            0
        );
        assert_eq!(
            count(
                &conn,
                "SELECT COUNT(*) FROM blog_views WHERE created_at > TIMESTAMP '2024-06-01 12:00:00'"
            ),
            0
        );
        assert_eq!(
            count(
                &conn,
                "SELECT COUNT(*) FROM blogs WHERE created_at < TIMESTAMP '2023-06-01 12:00:00'"
            ),
            0
        );
    }

    #[test]
    fn test_seed_twice_reuses_countries() {
        let conn = setup();
        let mut rng = StdRng::seed_from_u64(5);
        seed(&conn, &small(), now(), &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        seed(&conn, &small(), now(), &mut rng).unwrap();

        assert_eq!(count(&conn, "SELECT COUNT(*) FROM countries"), 4);
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM blogs"), 42);
    }

    #[test]
    fn test_seed_twice_counts_only_new_rows() {
        let conn = setup();
        let mut rng = StdRng::seed_from_u64(5);
        let first = seed(&conn, &small(), now(), &mut rng).unwrap();
        let users_after_first = count(&conn, "SELECT COUNT(*) FROM users");
        assert_eq!(first.users as i64, users_after_first);

        let mut rng = StdRng::seed_from_u64(5);
        let second = seed(&conn, &small(), now(), &mut rng).unwrap();

        assert_eq!(second.countries, 0);
        assert_eq!(
            second.users as i64,
            count(&conn, "SELECT COUNT(*) FROM users") - users_after_first
        );
        assert_eq!(second.blogs, 21);
        assert_eq!(second.views, 100);
    }

    #[test]
    fn test_sentence_is_capitalised() {
        let mut rng = StdRng::seed_from_u64(1);
        let s = sentence(&mut rng, 6);
        assert!(s.ends_with('.'));
        assert!(s.chars().next().unwrap().is_uppercase());
        assert_eq!(s.split_whitespace().count(), 6);
    }
}
