//! Filter parsing
//!
//! Parses the compact filter grammar into a [`FilterExpression`] tree:
//!
//! ```text
//! expr       := combinator | leaf
//! combinator := ("and"|"or"|"not") "(" expr ("," expr)* ")"
//! leaf       := field ":" operator ":" value
//! ```
//!
//! All string-level checks run in a single pre-validation pass before
//! recursive descent starts, so malformed input never reaches the parser
//! proper.

use std::sync::OnceLock;

use regex::Regex;

use super::types::{Condition, FilterError, FilterExpression};

/// Maximum length of a filter expression in bytes
const MAX_FILTER_LENGTH: usize = 2048;

/// Maximum combinator nesting depth
const MAX_FILTER_DEPTH: usize = 16;

fn combinator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(and|or|not)\((.*)\)$").expect("Invalid regex"))
}

/// Characters permitted anywhere in a filter expression
fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '(' | ')' | ',' | '|')
}

/// Parse a raw filter string into a predicate tree
pub fn parse_filter(raw: &str) -> Result<FilterExpression, FilterError> {
    let input = prevalidate(raw)?;
    parse_expr(input, 0)
}

/// Run every string-level check and return the trimmed expression
///
/// Order: empty, length, character whitelist, parenthesis balance.
pub fn prevalidate(raw: &str) -> Result<&str, FilterError> {
    let input = raw.trim();

    if input.is_empty() {
        return Err(FilterError::syntax("Filter expression cannot be empty"));
    }

    if input.len() > MAX_FILTER_LENGTH {
        return Err(FilterError::syntax(format!(
            "Filter expression exceeds maximum length of {} characters",
            MAX_FILTER_LENGTH
        )));
    }

    if let Some(c) = input.chars().find(|c| !is_allowed_char(*c)) {
        return Err(FilterError::syntax(format!(
            "Invalid character '{}' in filter expression",
            c.escape_default()
        )));
    }

    let mut depth: usize = 0;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    FilterError::syntax("Unbalanced parentheses in filter expression: unexpected ')'")
                })?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(FilterError::syntax(
            "Unbalanced parentheses in filter expression: missing ')'",
        ));
    }

    Ok(input)
}

fn parse_expr(input: &str, depth: usize) -> Result<FilterExpression, FilterError> {
    if depth > MAX_FILTER_DEPTH {
        return Err(FilterError::syntax(format!(
            "Filter expression exceeds maximum nesting depth of {}",
            MAX_FILTER_DEPTH
        )));
    }

    let Some(caps) = combinator_re().captures(input) else {
        return parse_leaf(input).map(FilterExpression::Leaf);
    };

    let keyword = caps.get(1).map_or("", |m| m.as_str());
    let inner = caps.get(2).map_or("", |m| m.as_str());

    let args = split_arguments(inner)
        .ok_or_else(|| FilterError::syntax(format!("Invalid condition: {}", input)))?;

    if keyword == "not" && args.len() != 1 {
        return Err(FilterError::syntax("not() accepts exactly one condition"));
    }
    if args.is_empty() {
        return Err(FilterError::syntax(format!(
            "{}() requires at least one condition",
            keyword
        )));
    }
    if args.iter().any(|a| a.is_empty()) {
        return Err(FilterError::syntax(format!(
            "Empty condition in {}()",
            keyword
        )));
    }

    let mut children = args
        .into_iter()
        .map(|arg| parse_expr(arg, depth + 1))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match keyword {
        "and" => FilterExpression::And(children),
        "or" => FilterExpression::Or(children),
        _ => FilterExpression::Not(Box::new(children.remove(0))),
    })
}

/// Split an argument list on commas at parenthesis depth zero
///
/// Single pass over the bytes with a depth counter and a start index.
/// Returns `None` if a `)` closes a paren opened outside the list.
fn split_arguments(inner: &str) -> Option<Vec<&str>> {
    if inner.is_empty() {
        return Some(Vec::new());
    }

    let mut args = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (i, b) in inner.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.checked_sub(1)?,
            b',' if depth == 0 => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(&inner[start..]);

    Some(args)
}

/// Parse `field:operator:value`; only the first two colons are structural
fn parse_leaf(input: &str) -> Result<Condition, FilterError> {
    let invalid = || FilterError::syntax(format!("Invalid condition: {}", input));

    let parts: Vec<&str> = input.splitn(3, ':').collect();
    let [field, operator, value] = parts.as_slice() else {
        return Err(invalid());
    };

    let field_ok =
        !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    let value_ok = !value.is_empty() && !value.contains(['(', ')', ',']);
    if !field_ok || !value_ok {
        return Err(invalid());
    }

    Ok(Condition {
        field: field.to_string(),
        operator: operator.parse()?,
        value: value.to_string(),
    })
}
