//! DuckDB schema definitions
//!
//! Blog analytics tables. Ids are generated from sequences so seeded and
//! imported rows share one id space per table.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- Infrastructure: Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at BIGINT NOT NULL,
    description VARCHAR
);

CREATE SEQUENCE IF NOT EXISTS countries_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS users_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS blogs_id_seq START 1;
CREATE SEQUENCE IF NOT EXISTS blog_views_id_seq START 1;

CREATE TABLE IF NOT EXISTS countries (
    id      BIGINT PRIMARY KEY DEFAULT nextval('countries_id_seq'),
    name    VARCHAR NOT NULL UNIQUE,
    code    VARCHAR NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS users (
    id          BIGINT PRIMARY KEY DEFAULT nextval('users_id_seq'),
    username    VARCHAR NOT NULL UNIQUE,
    first_name  VARCHAR NOT NULL DEFAULT '',
    email       VARCHAR NOT NULL DEFAULT '',
    country_id  BIGINT REFERENCES countries(id)     -- NULL = unknown country
);

CREATE TABLE IF NOT EXISTS blogs (
    id          BIGINT PRIMARY KEY DEFAULT nextval('blogs_id_seq'),
    title       VARCHAR NOT NULL,
    author_id   BIGINT NOT NULL REFERENCES users(id),
    created_at  TIMESTAMP NOT NULL                  -- UTC
);

CREATE TABLE IF NOT EXISTS blog_views (
    id          BIGINT PRIMARY KEY DEFAULT nextval('blog_views_id_seq'),
    blog_id     BIGINT NOT NULL REFERENCES blogs(id),
    ip_address  VARCHAR,
    created_at  TIMESTAMP NOT NULL                  -- UTC
);

CREATE INDEX IF NOT EXISTS idx_blogs_author ON blogs(author_id);
CREATE INDEX IF NOT EXISTS idx_blogs_created ON blogs(created_at);
CREATE INDEX IF NOT EXISTS idx_blog_views_blog ON blog_views(blog_id);
CREATE INDEX IF NOT EXISTS idx_blog_views_created ON blog_views(created_at);
CREATE INDEX IF NOT EXISTS idx_blog_views_blog_created ON blog_views(blog_id, created_at);
"#;

/// Version 2: composite index for window-filtered view counts
pub const MIGRATION_V2_VIEW_WINDOW_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_blog_views_blog_created ON blog_views(blog_id, created_at);
"#;
