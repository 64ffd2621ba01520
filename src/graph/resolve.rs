//! Path resolution for path-kind references

use std::path::{Component, Path, PathBuf};

/// Resolve a reference path against `base`
///
/// Returns `None` for remote references, which are never resolved locally.
/// A reference starting with `/` is taken as absolute. Otherwise at most one
/// leading `./` is stripped and the rest is joined onto `base`.
pub fn resolve_path(base: &Path, reference: &str) -> Option<PathBuf> {
    if is_remote(reference) {
        return None;
    }
    if reference.starts_with('/') {
        return Some(PathBuf::from(reference));
    }
    let trimmed = reference.strip_prefix("./").unwrap_or(reference);
    Some(base.join(trimmed))
}

/// Whether a reference points at a remote location
///
/// A plain, case-sensitive prefix test: the rest of the string need not be a
/// valid URL.
pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Lexically clean a path: drop `.` segments and fold `..` into the parent
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never climb above the root or past a leading `..`
                let can_pop = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Repository-relative path with forward slashes
///
/// Paths outside `root` are returned as given.
pub fn relative_to(root: &Path, path: &Path) -> String {
    let Ok(rel) = path.strip_prefix(root) else {
        return path.to_string_lossy().into_owned();
    };
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
