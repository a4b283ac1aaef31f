//! SQL utility functions

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Patterns built from this must be used with `ESCAPE '\'`.
///
/// # Example
///
/// ```
/// use blogscope_server::utils::sql::escape_like_pattern;
///
/// assert_eq!(escape_like_pattern("100% rust_lang"), "100\\% rust\\_lang");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Build a LIKE pattern matching any value that contains `s`
pub fn contains_pattern(s: &str) -> String {
    format!("%{}%", escape_like_pattern(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern_plain() {
        assert_eq!(escape_like_pattern("django"), "django");
    }

    #[test]
    fn test_escape_like_pattern_metacharacters() {
        assert_eq!(escape_like_pattern("50%"), "50\\%");
        assert_eq!(escape_like_pattern("first_post"), "first\\_post");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_escape_like_pattern_backslash_escaped_first() {
        assert_eq!(escape_like_pattern("\\%"), "\\\\\\%");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("rust"), "%rust%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern(""), "%%");
    }
}
