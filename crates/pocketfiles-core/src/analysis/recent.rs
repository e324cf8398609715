/// Recency ordering: newest files first, as every browser tab shows them.
///
/// The scanner never stats files, so modification times are read here, once
/// per path, only for the listing that is about to be shown.
use std::path::PathBuf;
use std::time::SystemTime;

/// Sort `paths` by modification time, newest first, keeping at most `limit`.
///
/// Paths whose metadata cannot be read (deleted since the scan, permission
/// denied) sort after every readable path instead of failing the whole
/// listing. Ties keep scan order.
pub fn sort_by_recent(paths: Vec<PathBuf>, limit: Option<usize>) -> Vec<(PathBuf, Option<SystemTime>)> {
    if limit == Some(0) {
        return Vec::new();
    }

    let mut stamped: Vec<(PathBuf, Option<SystemTime>)> = paths
        .into_iter()
        .map(|p| {
            let modified = std::fs::metadata(&p).and_then(|m| m.modified()).ok();
            (p, modified)
        })
        .collect();

    // `None < Some(_)`, so reversing the comparison puts unreadable paths last.
    stamped.sort_by(|a, b| b.1.cmp(&a.1));

    if let Some(n) = limit {
        stamped.truncate(n);
    }
    stamped
}
