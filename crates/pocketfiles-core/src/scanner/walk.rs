/// Multi-root directory walker built on `jwalk`.
///
/// Roots are walked one after another so that every path under root *n*
/// precedes every path under root *n + 1*. Within a root, `jwalk` reads
/// directories on a rayon pool; the order it yields entries in is
/// filesystem-dependent.
///
/// Nothing here fails: unreadable directories, broken entries and missing
/// roots are reported on the progress channel and otherwise skipped.
use crate::model::{RequestId, ScanRequest};
use crate::scanner::progress::{ScanOutcome, ScanProgress};
use crossbeam_channel::Sender;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Entries processed between two `ScanProgress::Update` messages.
const UPDATE_INTERVAL: u64 = 1_000;

/// Running totals for one scan, shared across its roots.
struct WalkState<'a> {
    request_id: RequestId,
    progress_tx: &'a Sender<ScanProgress>,
    files: Vec<PathBuf>,
    error_count: u64,
    seen: u64,
}

impl WalkState<'_> {
    fn report_error(&mut self, path: String, message: String) {
        self.error_count += 1;
        debug!("Skipping unreadable entry {path}: {message}");
        let _ = self.progress_tx.send(ScanProgress::Error {
            request_id: self.request_id,
            path,
            message,
        });
    }

    fn tick(&mut self, current: &Path) {
        self.seen += 1;
        if self.seen.is_multiple_of(UPDATE_INTERVAL) {
            let _ = self.progress_tx.send(ScanProgress::Update {
                request_id: self.request_id,
                files_found: self.files.len() as u64,
                current_path: current.to_string_lossy().into_owned(),
            });
        }
    }
}

/// Walk every root of `request` and return the combined listing.
///
/// Sends `Update`, `RootSkipped` and `Error` messages on `progress_tx` as it
/// goes but never `Complete`; the caller decides how to deliver the result.
pub fn walk_roots(
    request: &ScanRequest,
    walk_threads: usize,
    progress_tx: &Sender<ScanProgress>,
) -> ScanOutcome {
    let start = Instant::now();
    let mut state = WalkState {
        request_id: request.id(),
        progress_tx,
        files: Vec::new(),
        error_count: 0,
        seen: 0,
    };

    for root in request.roots() {
        if !root.is_dir() {
            debug!("Root {} is missing or not a directory", root.display());
            let _ = progress_tx.send(ScanProgress::RootSkipped {
                request_id: request.id(),
                root: root.clone(),
            });
            continue;
        }
        walk_one_root(root, walk_threads.max(1), &mut state);
    }

    let duration = start.elapsed();
    debug!(
        "Walk {} complete: {} files, {} errors in {:?}",
        request.id(),
        state.files.len(),
        state.error_count,
        duration
    );

    ScanOutcome {
        request_id: request.id(),
        files: state.files,
        duration,
        error_count: state.error_count,
    }
}

fn walk_one_root(root: &Path, walk_threads: usize, state: &mut WalkState<'_>) {
    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(jwalk::Parallelism::RayonNewPool(walk_threads));

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                // jwalk errors are typically access-denied on directories.
                let err_path = err
                    .path()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
                state.report_error(err_path, err.to_string());
                continue;
            }
        };

        // Directories are descended into; sockets/FIFOs/devices are not
        // files anyone wants to browse.
        let file_type = entry.file_type();
        let path = entry.path();
        if file_type.is_symlink() {
            // Links are resolved but never descended: a link to a regular
            // file is listed under the link's own path.
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(err) => {
                    state.report_error(path.to_string_lossy().into_owned(), err.to_string());
                    continue;
                }
            }
        } else if !file_type.is_file() {
            continue;
        }

        state.tick(&path);
        state.files.push(path);
    }
}
