use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ThumbnailError>;

/// Why a thumbnail could not be produced.
///
/// None of these are cached: a later request for the same source tries again.
#[derive(thiserror::Error, Debug)]
pub enum ThumbnailError {
    #[error("source image not found: {0}")]
    NotFound(PathBuf),
    #[error("source image {path} is {size} bytes, over the {limit} byte limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("thumbnail bounds {0}x{1} have a zero side")]
    InvalidBounds(u32, u32),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write thumbnail {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode thumbnail {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
