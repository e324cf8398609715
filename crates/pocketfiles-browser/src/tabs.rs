/// The browser's tabs and what each one lists.
use pocketfiles_core::analysis::MediaCategory;

/// Rows shown by tabs that cap their listing.
pub const DEFAULT_LISTING_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    /// Every file, newest first.
    Files,
    /// Images only, with thumbnails.
    Gallery,
    Audio,
    Docs,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Files, Tab::Gallery, Tab::Audio, Tab::Docs];

    pub fn label(self) -> &'static str {
        match self {
            Self::Files => "Files",
            Self::Gallery => "Gallery",
            Self::Audio => "Audio",
            Self::Docs => "Docs",
        }
    }

    /// Category filter, or `None` to list everything.
    pub fn category(self) -> Option<MediaCategory> {
        match self {
            Self::Files => None,
            Self::Gallery => Some(MediaCategory::Images),
            Self::Audio => Some(MediaCategory::Audio),
            Self::Docs => Some(MediaCategory::Documents),
        }
    }

    /// Maximum rows. Files and Gallery are capped because either can match
    /// most of a device; Audio and Docs rarely grow that large.
    pub fn listing_limit(self) -> Option<usize> {
        match self {
            Self::Files | Self::Gallery => Some(DEFAULT_LISTING_LIMIT),
            Self::Audio | Self::Docs => None,
        }
    }

    pub fn wants_thumbnails(self) -> bool {
        self.category().is_some_and(MediaCategory::has_thumbnails)
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tab `{s}` (expected files, gallery, audio or docs)"))
    }
}
