/// Cache keys: a fixed-width digest of the source *path*, not its contents.
///
/// Keying on the path means a cache hit costs one `stat` and no reads of the
/// source. The flip side is that a file rewritten in place keeps its stale
/// thumbnail.
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

/// Digest bytes kept from the BLAKE3 output.
const KEY_BYTES: usize = 16;

/// Length of the hex rendering of a key.
pub const KEY_HEX_LEN: usize = KEY_BYTES * 2;

/// Extension of every cached thumbnail.
pub const THUMBNAIL_EXTENSION: &str = "jpg";

/// 128-bit key derived from a source path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; KEY_BYTES]);

impl CacheKey {
    /// Derive the key for `source`.
    ///
    /// Hashes the path's raw bytes, which for any path that is valid UTF-8
    /// are exactly its UTF-8 encoding. Deterministic across calls and
    /// processes.
    pub fn for_path(source: &Path) -> Self {
        let digest = blake3::hash(source.as_os_str().as_encoded_bytes());
        let mut key = [0u8; KEY_BYTES];
        key.copy_from_slice(&digest.as_bytes()[..KEY_BYTES]);
        Self(key)
    }

    /// Lowercase hex, always [`KEY_HEX_LEN`] characters.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(KEY_HEX_LEN);
        for byte in self.0 {
            // Writing into a String cannot fail.
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// `<hex>.jpg`
    pub fn file_name(&self) -> String {
        format!("{}.{THUMBNAIL_EXTENSION}", self.to_hex())
    }

    /// Where this key's thumbnail lives inside `cache_dir`.
    pub fn path_in(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(self.file_name())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self.to_hex())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
