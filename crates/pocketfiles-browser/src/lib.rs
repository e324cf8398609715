/// pocketfiles browser: headless state for a tabbed storage browser.
///
/// This crate holds everything a UI shell needs except drawing: which tab is
/// open, whether a scan is running, the rows to show and their thumbnails.
/// Business logic lives in `pocketfiles-core`.
pub mod listing;
pub mod state;
pub mod tabs;

pub use listing::FileRow;
pub use state::{BrowserPhase, BrowserState};
pub use tabs::Tab;
