//! SQL predicate compiler
//!
//! Translates a parsed [`FilterExpression`] into a parameterised DuckDB
//! boolean expression. Field names are resolved through a static whitelist;
//! literals are bound as parameters in the field's native type and never
//! interpolated into the SQL text.
//!
//! Every leaf compiles to a two-valued expression (`COALESCE(..., FALSE)`),
//! so `NOT` always selects the exact complement, including rows where the
//! compared column is NULL.

use crate::utils::time::{parse_compact_timestamp, to_sql_timestamp};

use super::types::{
    Condition, FilterError, FilterExpression, OperatorKind, Predicate, SqlParams, SqlValue,
};

/// Native type of a filterable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Timestamp,
}

/// A filterable field name bound to a typed column
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

/// Column whitelists for filterable entities
pub mod columns {
    use super::{FieldDef, FieldKind};

    const fn field(name: &'static str, column: &'static str, kind: FieldKind) -> FieldDef {
        FieldDef { name, column, kind }
    }

    /// Fields of the per-blog fact rows every report filters
    ///
    /// Relation paths (`author__country__name`) and their short forms
    /// (`country`) resolve to the same column.
    pub const BLOG_FACTS: &[FieldDef] = &[
        field("id", "blog_id", FieldKind::Integer),
        field("blog__id", "blog_id", FieldKind::Integer),
        field("title", "title", FieldKind::Text),
        field("created_at", "created_at", FieldKind::Timestamp),
        field("author", "author_username", FieldKind::Text),
        field("author__username", "author_username", FieldKind::Text),
        field("author__id", "author_id", FieldKind::Integer),
        field("author__first_name", "author_first_name", FieldKind::Text),
        field("country", "country_name", FieldKind::Text),
        field("author__country", "country_name", FieldKind::Text),
        field("author__country__name", "country_name", FieldKind::Text),
        field("country__code", "country_code", FieldKind::Text),
        field("author__country__code", "country_code", FieldKind::Text),
        field("views", "views", FieldKind::Integer),
    ];

    /// Look up a field by its exact (case-sensitive) name
    pub fn resolve<'a>(fields: &'a [FieldDef], name: &str) -> Option<&'a FieldDef> {
        fields.iter().find(|f| f.name == name)
    }
}

/// Compile a predicate tree against a field registry
///
/// The alias is prepended to every column (e.g. "bf" → "bf.views").
pub fn compile(
    expr: &FilterExpression,
    fields: &[FieldDef],
    alias: &str,
) -> Result<Predicate, FilterError> {
    let mut params = SqlParams::default();
    let sql = compile_node(expr, fields, alias, &mut params)?;
    Ok(Predicate { sql, params })
}

fn compile_node(
    expr: &FilterExpression,
    fields: &[FieldDef],
    alias: &str,
    params: &mut SqlParams,
) -> Result<String, FilterError> {
    match expr {
        FilterExpression::Leaf(condition) => compile_leaf(condition, fields, alias, params),
        FilterExpression::And(children) => compile_group(children, " AND ", fields, alias, params),
        FilterExpression::Or(children) => compile_group(children, " OR ", fields, alias, params),
        FilterExpression::Not(child) => Ok(format!(
            "(NOT {})",
            compile_node(child, fields, alias, params)?
        )),
    }
}

fn compile_group(
    children: &[FilterExpression],
    join_op: &str,
    fields: &[FieldDef],
    alias: &str,
    params: &mut SqlParams,
) -> Result<String, FilterError> {
    let parts = children
        .iter()
        .map(|child| compile_node(child, fields, alias, params))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", parts.join(join_op)))
}

fn compile_leaf(
    condition: &Condition,
    fields: &[FieldDef],
    alias: &str,
    params: &mut SqlParams,
) -> Result<String, FilterError> {
    let field = columns::resolve(fields, &condition.field).ok_or_else(|| {
        FilterError::resolution(format!("Unknown filter field: {}", condition.field))
    })?;

    let col = if alias.is_empty() {
        field.column.to_string()
    } else {
        format!("{}.{}", alias, field.column)
    };
    let placeholder = match field.kind {
        FieldKind::Timestamp => "CAST(? AS TIMESTAMP)",
        FieldKind::Text | FieldKind::Integer => "?",
    };

    // Bind everything first so a bad literal fails before any SQL is emitted
    let values = condition
        .values()
        .into_iter()
        .map(|raw| bind_value(field, raw))
        .collect::<Result<Vec<_>, _>>()?;
    let count = values.len();
    params.values.extend(values);

    Ok(match condition.operator {
        OperatorKind::In => {
            let placeholders = vec![placeholder; count].join(", ");
            format!("COALESCE({} IN ({}), FALSE)", col, placeholders)
        }
        OperatorKind::Ne => format!("(NOT COALESCE({} = {}, FALSE))", col, placeholder),
        op => {
            let symbol = op.sql_symbol().unwrap_or("=");
            format!("COALESCE({} {} {}, FALSE)", col, symbol, placeholder)
        }
    })
}

/// Convert a raw literal to the field's native type
fn bind_value(field: &FieldDef, raw: &str) -> Result<SqlValue, FilterError> {
    match field.kind {
        FieldKind::Text => Ok(SqlValue::Text(raw.to_string())),
        FieldKind::Integer => raw.parse::<i64>().map(SqlValue::Integer).map_err(|_| {
            FilterError::resolution(format!(
                "Invalid value '{}' for field '{}': expected an integer",
                raw, field.name
            ))
        }),
        FieldKind::Timestamp => parse_compact_timestamp(raw)
            .map(|dt| SqlValue::Text(to_sql_timestamp(&dt)))
            .ok_or_else(|| {
                FilterError::resolution(format!(
                    "Invalid value '{}' for field '{}': expected YYYYMMDD or YYYYMMDDTHH:MM:SS",
                    raw, field.name
                ))
            }),
    }
}
