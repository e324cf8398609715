/// Turning a raw scan result into the rows a tab shows.
///
/// Runs on a worker thread: filtering is cheap, but recency sorting stats
/// every candidate and gallery thumbnails decode images.
use crate::tabs::Tab;
use chrono::{DateTime, Local};
use compact_str::CompactString;
use crossbeam_channel::Sender;
use pocketfiles_core::analysis::{filter_by_category, sort_by_recent};
use pocketfiles_core::model::size::format_size;
use pocketfiles_core::model::RequestId;
use pocketfiles_core::thumbnail::ThumbnailCache;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// One row in a tab.
#[derive(Debug, Clone)]
pub struct FileRow {
    pub path: PathBuf,
    /// File name only.
    pub name: CompactString,
    /// Size in bytes; 0 if the file vanished after the scan.
    pub size: u64,
    /// Pre-formatted size label.
    pub size_display: String,
    pub modified: Option<DateTime<Local>>,
    /// Cached preview, for gallery rows that have one.
    pub thumbnail: Option<PathBuf>,
}

/// Messages from listing workers back to the browser state.
#[derive(Debug)]
pub enum ListingEvent {
    /// Rows are ready to show.
    Rows {
        request_id: RequestId,
        rows: Vec<FileRow>,
    },
    /// Thumbnails for the first `thumbs.len()` rows of that listing. Sent
    /// after `Rows`, only for tabs that want thumbnails.
    Thumbnails {
        request_id: RequestId,
        thumbs: Vec<Option<PathBuf>>,
    },
}

/// Thumbnail work attached to a listing job.
pub struct ThumbnailJob {
    pub cache: Arc<ThumbnailCache>,
    pub bounds: (u32, u32),
    pub batch_limit: usize,
}

/// Filter, sort and truncate `files` for `tab`.
pub fn build_rows(files: Vec<PathBuf>, tab: Tab) -> Vec<FileRow> {
    let candidates = match tab.category() {
        Some(category) => filter_by_category(&files, category),
        None => files,
    };

    sort_by_recent(candidates, tab.listing_limit())
        .into_iter()
        .map(|(path, modified)| {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            let name = path
                .file_name()
                .map(|n| CompactString::new(n.to_string_lossy()))
                .unwrap_or_default();
            FileRow {
                name,
                size,
                size_display: format_size(size),
                modified: modified.map(DateTime::<Local>::from),
                thumbnail: None,
                path,
            }
        })
        .collect()
}

/// Drop paths inside the thumbnail cache so a gallery over a root that
/// contains the cache never previews its own previews.
pub fn without_cache_entries(files: Vec<PathBuf>, cache_root: &Path) -> Vec<PathBuf> {
    // Scanned paths are absolute; a relative cache dir only matches once
    // canonicalized.
    let canonical = fs::canonicalize(cache_root).ok();
    files
        .into_iter()
        .filter(|p| {
            !p.starts_with(cache_root) && !canonical.as_ref().is_some_and(|c| p.starts_with(c))
        })
        .collect()
}

/// Build the listing for `tab` on a background thread and report through
/// `events_tx`. If `thumbnails` is given, a second message follows with the
/// previews for the first `batch_limit` rows.
pub fn spawn_listing(
    request_id: RequestId,
    files: Vec<PathBuf>,
    tab: Tab,
    thumbnails: Option<ThumbnailJob>,
    events_tx: Sender<ListingEvent>,
) -> io::Result<()> {
    thread::Builder::new()
        .name(format!("pocketfiles-listing-{}", request_id.0))
        .spawn(move || {
            let files = match &thumbnails {
                Some(job) => without_cache_entries(files, job.cache.root()),
                None => files,
            };
            let rows = build_rows(files, tab);
            debug!("Listing {request_id} for {}: {} rows", tab.label(), rows.len());

            let sources: Vec<PathBuf> = match &thumbnails {
                Some(_) => rows.iter().map(|r| r.path.clone()).collect(),
                None => Vec::new(),
            };
            if events_tx.send(ListingEvent::Rows { request_id, rows }).is_err() {
                // Browser state is gone; nobody wants the thumbnails either.
                return;
            }

            if let Some(job) = thumbnails {
                let thumbs = job.cache.generate_batch(&sources, job.bounds, job.batch_limit);
                let made = thumbs.iter().filter(|t| t.is_some()).count();
                debug!("Listing {request_id}: {made}/{} thumbnails", thumbs.len());
                let _ = events_tx.send(ListingEvent::Thumbnails { request_id, thumbs });
            }
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_filtered_and_described() {
        let tmp = tempfile::TempDir::new().unwrap();
        let song = tmp.path().join("song.mp3");
        let note = tmp.path().join("note.txt");
        fs::write(&song, vec![0u8; 2048]).unwrap();
        fs::write(&note, b"hi").unwrap();

        let rows = build_rows(vec![note, song.clone()], Tab::Audio);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, song);
        assert_eq!(rows[0].name, "song.mp3");
        assert_eq!(rows[0].size, 2048);
        assert_eq!(rows[0].size_display, "2.0 KB");
        assert!(rows[0].modified.is_some());
        assert!(rows[0].thumbnail.is_none());
    }

    #[test]
    fn vanished_file_gets_zero_size() {
        let rows = build_rows(vec![PathBuf::from("/does/not/exist.pdf")], Tab::Docs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].size, 0);
        assert!(rows[0].modified.is_none());
    }

    #[test]
    fn files_tab_lists_everything() {
        let tmp = tempfile::TempDir::new().unwrap();
        let paths: Vec<PathBuf> = ["a.bin", "b.png", "c.flac"]
            .iter()
            .map(|n| {
                let p = tmp.path().join(n);
                fs::write(&p, b"x").unwrap();
                p
            })
            .collect();
        assert_eq!(build_rows(paths, Tab::Files).len(), 3);
    }

    #[test]
    fn cache_entries_are_dropped() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = tmp.path().join(".thumbs");
        fs::create_dir(&cache).unwrap();
        let photo = tmp.path().join("photo.jpg");
        let preview = cache.join("0123456789abcdef0123456789abcdef.jpg");
        let lookalike = tmp.path().join(".thumbs-old").join("x.jpg");

        let kept = without_cache_entries(vec![photo.clone(), preview, lookalike.clone()], &cache);
        assert_eq!(kept, vec![photo, lookalike]);
    }
}
