//! Filter type definitions
//!
//! Defines the predicate tree produced by the parser, the operator set,
//! and the parameter container filled in by the compiler.

use std::fmt;
use std::str::FromStr;

use duckdb::ToSql;
use duckdb::types::ToSqlOutput;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while parsing or compiling a filter expression.
///
/// Both variants are caller-fixable and map to a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// Malformed grammar (characters, parentheses, arity, operator)
    #[error("{0}")]
    Syntax(String),
    /// Well-formed, but references an unknown field or an incompatible value
    #[error("{0}")]
    Resolution(String),
}

impl FilterError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution(message.into())
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::Syntax(_) => "FILTER_SYNTAX_ERROR",
            Self::Resolution(_) => "FILTER_RESOLUTION_ERROR",
        }
    }
}

/// Comparison operators accepted in a leaf condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }

    /// SQL comparison symbol for scalar operators (`None` for `in`)
    pub(super) fn sql_symbol(&self) -> Option<&'static str> {
        match self {
            Self::Eq | Self::Ne => Some("="),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            Self::In => None,
        }
    }
}

impl FromStr for OperatorKind {
    type Err = FilterError;

    /// Operators are matched case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Ok(Self::Eq),
            "ne" => Ok(Self::Ne),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "in" => Ok(Self::In),
            _ => Err(FilterError::syntax(format!("Unsupported operator: {}", s))),
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field:operator:value` comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub operator: OperatorKind,
    pub value: String,
}

impl Condition {
    /// Literal values of the condition (`in` splits on `|`)
    pub fn values(&self) -> Vec<&str> {
        match self.operator {
            OperatorKind::In => self.value.split('|').collect(),
            _ => vec![self.value.as_str()],
        }
    }
}

/// Boolean predicate tree
///
/// `And`/`Or` hold at least one child; `Not` holds exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    Leaf(Condition),
    And(Vec<FilterExpression>),
    Or(Vec<FilterExpression>),
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    /// Nesting depth of combinators (a bare leaf has depth 0)
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Not(child) => 1 + child.depth(),
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(c) => write!(f, "{}:{}:{}", c.field, c.operator, c.value),
            Self::And(children) => write_combinator(f, "and", children),
            Self::Or(children) => write_combinator(f, "or", children),
            Self::Not(child) => write!(f, "not({})", child),
        }
    }
}

fn write_combinator(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    children: &[FilterExpression],
) -> fmt::Result {
    write!(f, "{}(", keyword)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", child)?;
    }
    f.write_str(")")
}

/// A bound SQL parameter with its native type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        match self {
            Self::Text(s) => s.to_sql(),
            Self::Integer(i) => i.to_sql(),
        }
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

impl SqlParams {
    pub fn push(&mut self, value: impl Into<SqlValue>) {
        self.values.push(value.into());
    }

    pub fn extend(&mut self, other: SqlParams) {
        self.values.extend(other.values);
    }

    /// Borrow the values as DuckDB parameters
    pub fn as_params(&self) -> Vec<&dyn ToSql> {
        self.values.iter().map(|v| v as &dyn ToSql).collect()
    }
}

/// A compiled, parameterised SQL boolean expression
#[derive(Debug, Clone, Serialize)]
pub struct Predicate {
    pub sql: String,
    pub params: SqlParams,
}
