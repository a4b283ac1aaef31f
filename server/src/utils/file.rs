//! File utility functions

use std::path::PathBuf;

/// Expand a user-supplied path to an absolute path.
///
/// `~` and `~/...` resolve against the home directory; relative paths
/// (including bare names) resolve against the current directory. An empty
/// string yields the current directory.
///
/// ```text
/// expand_path("~/.blogscope") // -> /home/user/.blogscope
/// expand_path("./data")       // -> /current/dir/./data
/// expand_path("/srv/blogs")   // -> /srv/blogs
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if path.is_empty() {
        return cwd();
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        cwd().join(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute_unchanged() {
        assert_eq!(expand_path("/srv/blogscope"), PathBuf::from("/srv/blogscope"));
    }

    #[test]
    fn test_expand_path_trims_whitespace() {
        assert_eq!(expand_path("  /srv/data  "), PathBuf::from("/srv/data"));
    }

    #[test]
    fn test_expand_path_relative_becomes_absolute() {
        let result = expand_path("./data/blogscope");
        assert!(result.is_absolute());
        assert!(result.ends_with("data/blogscope"));

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path(".."), cwd.join(".."));
        assert_eq!(expand_path("reports"), cwd.join("reports"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let result = expand_path("~/.blogscope");
        assert!(result.is_absolute());
        assert!(!result.to_string_lossy().contains('~'));
        assert!(result.ends_with(".blogscope"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
        }
    }

    #[test]
    fn test_expand_path_tilde_user_is_relative_name() {
        // `~alice` is not expanded
        let result = expand_path("~alice");
        assert!(result.ends_with("~alice"));
    }

    #[test]
    fn test_expand_path_empty_is_cwd() {
        let result = expand_path("   ");
        assert_eq!(result, std::env::current_dir().unwrap());
    }
}
