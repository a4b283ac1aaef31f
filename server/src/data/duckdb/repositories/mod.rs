//! DuckDB repository functions
//!
//! Synchronous query functions taking a `&Connection`; the async wrappers in
//! `repository_impl` run them on the blocking pool.

pub mod analytics;
pub mod seed;
