use std::path::{Path, PathBuf};

/// Resolve a possibly-relative path against the configured project root.
///
/// Relative paths in configs and CLI defaults are anchored to the root the
/// caller passed in, never to the invocation cwd, so gate output does not
/// depend on where the process was launched from.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Render a path relative to the project root when possible, absolute otherwise.
pub fn display_path(path: &Path, root: &Path) -> String {
    if let Ok(relative) = path.strip_prefix(root) {
        if !relative.as_os_str().is_empty() {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}
