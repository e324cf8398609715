//! Settings shared by every pocketfiles frontend.
//!
//! Everything has a sensible default, so a missing config file is not an
//! error. A present-but-malformed file is.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the thumbnail directory created under the working directory.
pub const DEFAULT_CACHE_DIR_NAME: &str = ".thumbs";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Thumbnail generation knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    /// Bounding box every preview must fit within, `(width, height)`.
    pub bounds: (u32, u32),
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Sources larger than this on disk are refused before decoding.
    pub max_source_bytes: u64,
    /// Sources wider or taller than this are refused by the decoder.
    pub max_source_dimension: u32,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            bounds: (300, 300),
            quality: 75,
            max_source_bytes: 24 * 1024 * 1024,
            max_source_dimension: 16_384,
        }
    }
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Roots to scan. Empty means "use the platform defaults".
    pub roots: Vec<PathBuf>,
    /// Thumbnail cache directory. `None` means `./.thumbs`.
    pub cache_dir: Option<PathBuf>,
    pub thumbnails: ThumbnailSettings,
    /// How many gallery images get a thumbnail per listing.
    pub thumbnail_batch_limit: usize,
    /// Worker threads for the directory walker. 0 means one per CPU.
    pub walk_threads: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            cache_dir: None,
            thumbnails: ThumbnailSettings::default(),
            thumbnail_batch_limit: 500,
            walk_threads: 0,
        }
    }
}

impl Settings {
    /// Per-user config file, `<config dir>/pocketfiles/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pocketfiles").join("config.json"))
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values the thumbnail encoder or walker cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = self.thumbnails.bounds;
        if w == 0 || h == 0 {
            return Err(ConfigError::Invalid {
                field: "thumbnails.bounds",
                reason: format!("{w}x{h} has a zero side"),
            });
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Invalid {
                field: "thumbnails.quality",
                reason: format!("{} is outside 1-100", self.thumbnails.quality),
            });
        }
        Ok(())
    }

    /// Roots to scan: the configured list, or the platform defaults.
    pub fn effective_roots(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            crate::platform::default_roots()
        } else {
            self.roots.clone()
        }
    }

    /// Cache directory: the configured one, or `.thumbs` under the working dir.
    pub fn effective_cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(DEFAULT_CACHE_DIR_NAME),
        }
    }

    /// Walker threads, resolving 0 to the CPU count.
    pub fn effective_walk_threads(&self) -> usize {
        if self.walk_threads == 0 {
            num_cpus::get()
        } else {
            self.walk_threads
        }
    }
}
