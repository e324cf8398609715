/// Extension-based media categories.
///
/// The browser shows one tab per category; everything a tab lists comes from
/// filtering the scanner's flat path list through [`filter_by_category`].
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Broad media categories, one per browser tab plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Images,
    Video,
    Audio,
    Documents,
    Other,
}

impl MediaCategory {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Images => "Images",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Documents => "Documents",
            Self::Other => "Other",
        }
    }

    /// `true` for categories the thumbnail cache can decode.
    pub fn has_thumbnails(self) -> bool {
        matches!(self, Self::Images)
    }
}

/// Categorise a file extension (without the leading dot).
///
/// Extensions are lowercased into a fixed-size stack buffer, so the hot path
/// over a few hundred thousand scan results never allocates. Anything longer
/// than 8 bytes cannot be a known extension.
pub fn categorise_extension(ext: &str) -> MediaCategory {
    let bytes = ext.as_bytes();
    if bytes.len() > 8 {
        return MediaCategory::Other;
    }

    let mut lower = [0u8; 8];
    for (dest, &src) in lower.iter_mut().zip(bytes.iter()) {
        *dest = src.to_ascii_lowercase();
    }
    let lower_str = match std::str::from_utf8(&lower[..bytes.len()]) {
        Ok(s) => s,
        Err(_) => return MediaCategory::Other,
    };

    match lower_str {
        "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif" => MediaCategory::Images,
        "mp4" | "mkv" | "mov" => MediaCategory::Video,
        "mp3" | "wav" | "m4a" | "flac" | "ogg" => MediaCategory::Audio,
        "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "txt" | "csv" => {
            MediaCategory::Documents
        }
        _ => MediaCategory::Other,
    }
}

/// Categorise a path by its final extension. Dotfiles such as `.png` have no
/// extension and land in `Other`.
pub fn categorise_path(path: &Path) -> MediaCategory {
    path.extension()
        .and_then(|e| e.to_str())
        .map(categorise_extension)
        .unwrap_or(MediaCategory::Other)
}

/// Keep only the paths in `category`, preserving their order.
pub fn filter_by_category(paths: &[PathBuf], category: MediaCategory) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|p| categorise_path(p) == category)
        .cloned()
        .collect()
}

/// Count paths per category. Categories with no paths are absent.
pub fn category_counts(paths: &[PathBuf]) -> HashMap<MediaCategory, usize> {
    let mut map: HashMap<MediaCategory, usize> = HashMap::with_capacity(5);
    for path in paths {
        *map.entry(categorise_path(path)).or_default() += 1;
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorise_known_image_extensions() {
        for ext in &["jpg", "jpeg", "png", "webp", "bmp", "gif"] {
            assert_eq!(
                categorise_extension(ext),
                MediaCategory::Images,
                "expected Images for .{ext}"
            );
        }
    }

    #[test]
    fn categorise_known_audio_and_document_extensions() {
        for ext in &["mp3", "wav", "m4a", "flac", "ogg"] {
            assert_eq!(categorise_extension(ext), MediaCategory::Audio, ".{ext}");
        }
        for ext in &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv"] {
            assert_eq!(categorise_extension(ext), MediaCategory::Documents, ".{ext}");
        }
    }

    #[test]
    fn video_is_not_an_image() {
        assert_eq!(categorise_extension("mp4"), MediaCategory::Video);
        assert!(!MediaCategory::Video.has_thumbnails());
    }

    /// "JPG" from a camera must land in the same tab as "jpg".
    #[test]
    fn categorise_case_insensitive() {
        assert_eq!(categorise_extension("JPG"), MediaCategory::Images);
        assert_eq!(categorise_extension("Mp3"), MediaCategory::Audio);
        assert_eq!(categorise_extension("PDF"), MediaCategory::Documents);
    }

    #[test]
    fn unknown_and_oversized_extensions_are_other() {
        assert_eq!(categorise_extension("xyz"), MediaCategory::Other);
        assert_eq!(categorise_extension(""), MediaCategory::Other);
        assert_eq!(categorise_extension("averyverylongext"), MediaCategory::Other);
    }

    #[test]
    fn categorise_path_uses_last_extension() {
        assert_eq!(categorise_path(Path::new("/a/b/photo.tar.png")), MediaCategory::Images);
        assert_eq!(categorise_path(Path::new("/a/b/README")), MediaCategory::Other);
        assert_eq!(categorise_path(Path::new("/a/b/.png")), MediaCategory::Other);
    }

    #[test]
    fn filter_preserves_order() {
        let paths: Vec<PathBuf> = ["z.png", "a.mp3", "m.JPG", "b.txt", "c.gif"]
            .iter()
            .map(PathBuf::from)
            .collect();
        let images = filter_by_category(&paths, MediaCategory::Images);
        assert_eq!(
            images,
            vec![PathBuf::from("z.png"), PathBuf::from("m.JPG"), PathBuf::from("c.gif")]
        );
    }

    #[test]
    fn counts_skip_empty_categories() {
        let paths: Vec<PathBuf> = ["a.png", "b.png", "c.flac"].iter().map(PathBuf::from).collect();
        let counts = category_counts(&paths);
        assert_eq!(counts.get(&MediaCategory::Images), Some(&2));
        assert_eq!(counts.get(&MediaCategory::Audio), Some(&1));
        assert!(!counts.contains_key(&MediaCategory::Documents));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(filter_by_category(&[], MediaCategory::Images).is_empty());
        assert!(category_counts(&[]).is_empty());
    }
}
