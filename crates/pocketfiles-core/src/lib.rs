/// pocketfiles core: storage scanning, thumbnail caching and file categorisation.
///
/// This crate contains all business logic with zero UI dependencies.
/// Any frontend (the headless browser state, a CLI, a mobile shell) drives
/// it through the same handful of entry points.
///
/// # Modules
///
/// - [`model`]: Scan requests, request identifiers, size formatting.
/// - [`scanner`]: Background multi-root filesystem scanning with progress reporting.
/// - [`thumbnail`]: Persistent on-disk thumbnail cache keyed by source path.
/// - [`analysis`]: Post-scan category filtering and recency ordering.
/// - [`platform`]: Default storage roots per target platform.
/// - [`config`]: Serde-backed settings shared by every frontend.
/// - [`convert`]: Whole-image conversion to WebP.
pub mod analysis;
pub mod config;
pub mod convert;
pub mod model;
pub mod platform;
pub mod scanner;
pub mod thumbnail;

pub use config::{ConfigError, Settings};
