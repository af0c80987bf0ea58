//! Path helpers for config and schema file arguments.
//!
//! Supports "~" home directory expansion for paths given on the command line.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Expand a leading `~` to the user's home directory.
///
/// Paths without `~` are returned unchanged. If the home directory cannot be
/// determined the path is left as written.
pub fn expand_home(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if path_str != "~" && !path_str.starts_with("~/") {
        return path.to_path_buf();
    }

    let Some(home) = home_dir() else {
        warn!(path = %path.display(), "Could not determine home directory");
        return path.to_path_buf();
    };
    let rest = path_str.strip_prefix("~/").unwrap_or("");
    let resolved = if rest.is_empty() {
        home
    } else {
        home.join(rest)
    };
    debug!(
        original = %path.display(),
        resolved = %resolved.display(),
        "Expanded home directory path"
    );
    resolved
}

/// Resolve the user's home directory (cross-platform).
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}
