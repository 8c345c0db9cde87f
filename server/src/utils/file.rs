//! File utility functions

use std::path::PathBuf;

use directories::BaseDirs;

/// Current user's home directory, if the platform exposes one
pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Expand a path string to an absolute path.
///
/// Handles `~` / `~/path` (home directory), relative paths and bare names
/// (resolved against the current directory). Absolute paths pass through.
///
/// ```text
/// expand_path("~/.medassist") // -> /home/user/.medassist
/// expand_path("./data")       // -> /current/dir/data
/// expand_path("/etc/config")  // -> /etc/config
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_expand_path_absolute_unix() {
        assert_eq!(expand_path("/etc/config"), PathBuf::from("/etc/config"));
    }

    #[test]
    fn test_expand_path_relative_dot_slash() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("./data"), cwd.join("./data"));
    }

    #[test]
    fn test_expand_path_bare_name() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("medassist.json"), cwd.join("medassist.json"));
    }

    #[test]
    fn test_expand_path_empty_is_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("  "), cwd);
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/.medassist"), home.join(".medassist"));
        }
    }
}
