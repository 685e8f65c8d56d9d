//! Materialized path helpers.
//!
//! A folder's path is `"/" + name` at the root and `parent.path + "/" + name`
//! below it. The store derives paths only through these functions so that
//! every backend agrees on the format.

use crate::naming::PATH_SEPARATOR;

/// Path of a folder named `name` placed under `parent_path`.
pub fn child_path(parent_path: Option<&str>, name: &str) -> String {
    match parent_path {
        Some(parent) => format!("{parent}{PATH_SEPARATOR}{name}"),
        None => format!("{PATH_SEPARATOR}{name}"),
    }
}

/// Rewrite a descendant path after its ancestor moved from `old_prefix`
/// to `new_prefix`.
///
/// Returns `None` when `path` is not strictly below `old_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    let rest = path.strip_prefix(old_prefix)?;
    if !rest.starts_with(PATH_SEPARATOR) {
        return None;
    }
    Some(format!("{new_prefix}{rest}"))
}
