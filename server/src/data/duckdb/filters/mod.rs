//! Dynamic filter expressions
//!
//! Parses the compact `filter` grammar (`and(country:eq:France,views:gte:10)`)
//! and compiles it into a parameterised DuckDB predicate.
//!
//! ## Usage
//!
//! ```no_run
//! use blogscope_server::data::duckdb::filters::{columns, compile_filter};
//!
//! let predicate = compile_filter("not(country:eq:France)", columns::BLOG_FACTS, "bf").unwrap();
//! let params = predicate.params.as_params();
//! ```

mod builder;
mod parser;
mod types;

pub use builder::{FieldDef, FieldKind, columns, compile};
pub use parser::{parse_filter, prevalidate};
pub use types::{
    Condition, FilterError, FilterExpression, OperatorKind, Predicate, SqlParams, SqlValue,
};

/// Parse and compile a raw filter string in one step
///
/// Fails before any query is built; the returned predicate is ready to be
/// ANDed into a WHERE clause.
pub fn compile_filter(
    raw: &str,
    fields: &[FieldDef],
    alias: &str,
) -> Result<Predicate, FilterError> {
    let expr = parse_filter(raw)?;
    compile(&expr, fields, alias)
}
