/// Thumbnail cache: small JPEG previews persisted on disk, keyed by the
/// source image's path.
///
/// # Layout
///
/// One flat directory. Each entry is `<32 hex chars>.jpg`, named by
/// [`CacheKey::for_path`]. The existence of that file *is* the cache state:
/// there is no index or manifest.
///
/// # Writes
///
/// A preview is encoded into a temporary file inside the cache directory and
/// renamed into place, so a reader never sees a half-written file under a
/// valid key. Concurrent requests for the same uncached key are serialized on
/// a per-key lock; the second caller finds the first caller's file and
/// returns without decoding.
///
/// Entries are never invalidated or evicted.
pub mod error;
pub mod key;
pub mod render;

pub use error::{Result, ThumbnailError};
pub use key::CacheKey;

use crate::config::ThumbnailSettings;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Counters since the cache was opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbnailStats {
    /// Requests answered from an existing file.
    pub hits: u64,
    /// Thumbnails decoded, encoded and written.
    pub generated: u64,
    /// Requests that produced no thumbnail.
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    generated: AtomicU64,
    failures: AtomicU64,
}

/// Handle to a thumbnail cache directory.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct ThumbnailCache {
    root: PathBuf,
    settings: ThumbnailSettings,
    /// Per-key locks for generations currently in flight.
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
    counters: Counters,
}

impl ThumbnailCache {
    /// Open (creating if needed) the cache directory at `root`.
    pub fn open(root: impl Into<PathBuf>, settings: ThumbnailSettings) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!("Thumbnail cache at {}", root.display());
        Ok(Self {
            root,
            settings,
            in_flight: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    /// Bounds used when a caller does not supply its own.
    pub fn default_bounds(&self) -> (u32, u32) {
        self.settings.bounds
    }

    /// Where the thumbnail for `source` lives, whether or not it exists yet.
    pub fn path_for(&self, source: &Path) -> PathBuf {
        CacheKey::for_path(source).path_in(&self.root)
    }

    pub fn stats(&self) -> ThumbnailStats {
        ThumbnailStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            generated: self.counters.generated.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Return the cached thumbnail for `source`, generating it first if needed.
    ///
    /// An existing entry is returned without touching `source` at all. A
    /// fresh one fits inside `bounds` without upscaling, is RGB, and is
    /// encoded at the configured JPEG quality. Blocks for the full
    /// decode/encode/write cycle.
    pub fn ensure_thumbnail(&self, source: &Path, bounds: (u32, u32)) -> Result<PathBuf> {
        let result = self.ensure_inner(source, bounds);
        if result.is_err() {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// [`ensure_thumbnail`](Self::ensure_thumbnail) with failures absorbed:
    /// `None` means "no preview available".
    pub fn thumbnail_or_none(&self, source: &Path, bounds: (u32, u32)) -> Option<PathBuf> {
        match self.ensure_thumbnail(source, bounds) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!("No thumbnail for {}: {e}", source.display());
                None
            }
        }
    }

    /// Ensure thumbnails for at most `limit` of `sources`, in parallel.
    ///
    /// The result lines up with the first `limit` sources; each slot is
    /// `None` where no preview could be made.
    pub fn generate_batch(
        &self,
        sources: &[PathBuf],
        bounds: (u32, u32),
        limit: usize,
    ) -> Vec<Option<PathBuf>> {
        let take = sources.len().min(limit);
        sources[..take]
            .par_iter()
            .map(|src| self.thumbnail_or_none(src, bounds))
            .collect()
    }

    fn ensure_inner(&self, source: &Path, bounds: (u32, u32)) -> Result<PathBuf> {
        if bounds.0 == 0 || bounds.1 == 0 {
            return Err(ThumbnailError::InvalidBounds(bounds.0, bounds.1));
        }

        let key = CacheKey::for_path(source);
        let dest = key.path_in(&self.root);

        // Fast path: no lock, no decode.
        if dest.is_file() {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(dest);
        }

        let slot = {
            let mut map = self.in_flight.lock();
            map.entry(key.clone()).or_default().clone()
        };

        let result = {
            let _guard = slot.lock();
            if dest.is_file() {
                // Another caller generated it while we waited.
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Ok(dest)
            } else {
                self.generate(source, bounds, &dest)
            }
        };

        // Drop the slot once nobody else is queued on it. Clones only happen
        // under the map lock, so the count cannot grow behind our back.
        {
            let mut map = self.in_flight.lock();
            if Arc::strong_count(&slot) == 2 {
                map.remove(&key);
            }
        }

        result
    }

    fn generate(&self, source: &Path, bounds: (u32, u32), dest: &Path) -> Result<PathBuf> {
        let meta = fs::metadata(source).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ThumbnailError::NotFound(source.to_path_buf())
            } else {
                ThumbnailError::Read {
                    path: source.to_path_buf(),
                    source: e,
                }
            }
        })?;
        if !meta.is_file() {
            return Err(ThumbnailError::NotFound(source.to_path_buf()));
        }
        if meta.len() > self.settings.max_source_bytes {
            return Err(ThumbnailError::TooLarge {
                path: source.to_path_buf(),
                size: meta.len(),
                limit: self.settings.max_source_bytes,
            });
        }

        let img = render::decode(source, self.settings.max_source_dimension)?;
        let rgb = render::shrink_to_rgb(&img, bounds);
        self.write_atomically(&rgb, dest)?;

        self.counters.generated.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Generated {}x{} thumbnail for {} at {}",
            rgb.width(),
            rgb.height(),
            source.display(),
            dest.display()
        );
        Ok(dest.to_path_buf())
    }

    fn write_atomically(&self, rgb: &image::RgbImage, dest: &Path) -> Result<()> {
        let write_err = |e: io::Error| ThumbnailError::Write {
            path: dest.to_path_buf(),
            source: e,
        };

        // The temp file lives in the cache dir so the rename never crosses
        // filesystems. If anything below fails it is deleted on drop.
        let tmp = tempfile::Builder::new()
            .prefix(".partial-")
            .tempfile_in(&self.root)
            .map_err(write_err)?;

        {
            let mut writer = BufWriter::new(tmp.as_file());
            render::encode_jpeg(rgb, self.settings.quality, &mut writer, dest)?;
            writer.flush().map_err(write_err)?;
        }

        tmp.persist(dest).map_err(|e| {
            warn!("Could not move thumbnail into place at {}: {}", dest.display(), e.error);
            write_err(e.error)
        })?;
        Ok(())
    }
}
