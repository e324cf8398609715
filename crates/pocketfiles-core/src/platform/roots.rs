/// Default scan roots per platform.
///
/// This is a lookup table, not scanner logic: the scanner accepts any list
/// of roots, and frontends may override the defaults through settings.
use std::path::PathBuf;

/// Well-known shared-storage mount points on Android. Both usually resolve to
/// the same volume; the scanner does not deduplicate them.
const ANDROID_STORAGE_ROOTS: [&str; 2] = ["/storage/emulated/0", "/sdcard"];

/// Platforms with distinct root policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPlatform {
    Android,
    Desktop,
}

impl TargetPlatform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else {
            Self::Desktop
        }
    }
}

/// Roots for the running platform.
pub fn default_roots() -> Vec<PathBuf> {
    roots_for(TargetPlatform::current())
}

/// Roots for `platform`. On desktop this is the invoking user's home
/// directory, or `.` if it cannot be determined.
pub fn roots_for(platform: TargetPlatform) -> Vec<PathBuf> {
    match platform {
        TargetPlatform::Android => ANDROID_STORAGE_ROOTS.iter().map(PathBuf::from).collect(),
        TargetPlatform::Desktop => {
            let home = dirs::home_dir().unwrap_or_else(|| {
                tracing::warn!("Home directory unknown; scanning the working directory");
                PathBuf::from(".")
            });
            vec![home]
        }
    }
}
