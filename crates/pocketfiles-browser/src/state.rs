/// Browser state management.
///
/// Centralises all mutable state a UI shell reads and writes. Scans and
/// listing workers report through channels; state changes happen only in
/// [`BrowserState::process_messages`], which a shell calls once per frame
/// (or in a loop, for a CLI).
///
/// Switching tabs starts a new scan without waiting for the old one, which
/// keeps running to completion. Every message carries its request id, and
/// anything not addressed to the current request is dropped.
use crate::listing::{spawn_listing, FileRow, ListingEvent, ThumbnailJob};
use crate::tabs::Tab;
use crossbeam_channel::{Receiver, Sender};
use pocketfiles_core::model::{RequestId, ScanRequest};
use pocketfiles_core::scanner::progress::ScanProgress;
use pocketfiles_core::scanner::{start_scan_into, PROGRESS_CHANNEL_CAPACITY};
use pocketfiles_core::thumbnail::ThumbnailCache;
use pocketfiles_core::Settings;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The current phase of the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserPhase {
    /// Nothing requested yet.
    Idle,
    /// Walking storage; live counters are updating.
    Scanning,
    /// Scan done, rows being filtered and sorted.
    Listing,
    /// Rows are available. Gallery thumbnails may still be on their way.
    Results,
}

/// Maximum messages drained from each channel per call, so a backlog
/// cannot stall the caller's frame.
const MAX_MESSAGES_PER_CALL: usize = 300;

/// Maximum per-entry scan errors retained for display. The count keeps going.
pub const MAX_SCAN_ERRORS: usize = 1_000;

/// All browser state.
pub struct BrowserState {
    settings: Settings,
    roots: Vec<PathBuf>,
    thumbnails: Option<Arc<ThumbnailCache>>,

    // ── Channels ───────────────────────────────────────
    scan_tx: Sender<ScanProgress>,
    scan_rx: Receiver<ScanProgress>,
    listing_tx: Sender<ListingEvent>,
    listing_rx: Receiver<ListingEvent>,

    // ── Scan ───────────────────────────────────────────
    pub phase: BrowserPhase,
    pub current_tab: Tab,
    /// The request whose results the browser is waiting for.
    pub current_request: Option<RequestId>,
    pub scan_files_found: u64,
    pub scan_current_path: String,
    pub scan_error_count: u64,
    pub scan_errors: Vec<(String, String)>,
    pub skipped_roots: Vec<PathBuf>,
    pub scan_duration: Option<Duration>,
    /// Total files found across all categories by the last completed scan.
    pub scan_total_files: usize,
    /// Messages dropped because they belonged to an older request.
    pub stale_messages: u64,

    // ── Results ────────────────────────────────────────
    pub rows: Vec<FileRow>,
    /// `true` between showing gallery rows and receiving their thumbnails.
    pub thumbnails_pending: bool,
    /// Set when the OS refused a worker thread; shown instead of rows.
    pub last_error: Option<String>,
}

impl BrowserState {
    /// Create browser state from `settings`.
    ///
    /// If the thumbnail directory cannot be created the browser still works;
    /// gallery rows simply have no previews.
    pub fn new(settings: Settings) -> Self {
        let roots = settings.effective_roots();
        let cache_dir = settings.effective_cache_dir();
        let thumbnails = match ThumbnailCache::open(&cache_dir, settings.thumbnails.clone()) {
            Ok(cache) => Some(Arc::new(cache)),
            Err(e) => {
                warn!("Thumbnails disabled: cannot open {}: {e}", cache_dir.display());
                None
            }
        };
        let (scan_tx, scan_rx) = crossbeam_channel::bounded(PROGRESS_CHANNEL_CAPACITY);
        let (listing_tx, listing_rx) = crossbeam_channel::unbounded();

        Self {
            settings,
            roots,
            thumbnails,
            scan_tx,
            scan_rx,
            listing_tx,
            listing_rx,
            phase: BrowserPhase::Idle,
            current_tab: Tab::Files,
            current_request: None,
            scan_files_found: 0,
            scan_current_path: String::new(),
            scan_error_count: 0,
            scan_errors: Vec::new(),
            skipped_roots: Vec::new(),
            scan_duration: None,
            scan_total_files: 0,
            stale_messages: 0,
            rows: Vec::new(),
            thumbnails_pending: false,
            last_error: None,
        }
    }

    /// Roots every scan walks.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn thumbnail_cache(&self) -> Option<&ThumbnailCache> {
        self.thumbnails.as_deref()
    }

    /// Open `tab` and start a fresh scan for it.
    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.refresh();
    }

    /// Re-scan for the current tab, discarding the current rows.
    pub fn refresh(&mut self) {
        self.phase = BrowserPhase::Scanning;
        self.scan_files_found = 0;
        self.scan_current_path.clear();
        self.scan_error_count = 0;
        self.scan_errors.clear();
        self.skipped_roots.clear();
        self.scan_duration = None;
        self.scan_total_files = 0;
        self.rows.clear();
        self.thumbnails_pending = false;
        self.last_error = None;

        let request = ScanRequest::new(self.roots.iter().cloned());
        info!(
            "{} tab: scan {} over {} root(s)",
            self.current_tab.label(),
            request.id(),
            self.roots.len()
        );
        let walk_threads = self.settings.effective_walk_threads();
        match start_scan_into(request, walk_threads, self.scan_tx.clone()) {
            Ok(id) => self.current_request = Some(id),
            Err(e) => self.fail(format!("could not start scan: {e}")),
        }
    }

    /// `true` once the current tab has rows and nothing more is coming.
    pub fn is_settled(&self) -> bool {
        self.phase == BrowserPhase::Results && !self.thumbnails_pending
    }

    /// Process pending scan and listing messages.
    ///
    /// Returns `true` if anything visible changed.
    pub fn process_messages(&mut self) -> bool {
        let mut changed = self.process_scan_messages();
        changed |= self.process_listing_events();
        changed
    }

    fn is_current(&self, id: RequestId) -> bool {
        self.current_request == Some(id)
    }

    fn process_scan_messages(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_MESSAGES_PER_CALL {
            let msg = match self.scan_rx.try_recv() {
                Ok(m) => m,
                Err(_) => break,
            };
            if !self.is_current(msg.request_id()) {
                self.stale_messages += 1;
                debug!("Dropping message from stale scan {}", msg.request_id());
                continue;
            }
            changed = true;
            match msg {
                ScanProgress::Update {
                    files_found,
                    current_path,
                    ..
                } => {
                    self.scan_files_found = files_found;
                    self.scan_current_path = current_path;
                }
                ScanProgress::RootSkipped { root, .. } => {
                    self.skipped_roots.push(root);
                }
                ScanProgress::Error { path, message, .. } => {
                    self.scan_error_count += 1;
                    if self.scan_errors.len() < MAX_SCAN_ERRORS {
                        self.scan_errors.push((path, message));
                    }
                }
                ScanProgress::Complete(outcome) => {
                    self.scan_duration = Some(outcome.duration);
                    self.scan_error_count = outcome.error_count;
                    self.scan_total_files = outcome.files.len();
                    self.scan_files_found = outcome.files.len() as u64;
                    self.phase = BrowserPhase::Listing;
                    self.start_listing(outcome.request_id, outcome.files);
                    // Anything after Complete for this request cannot exist.
                    break;
                }
            }
        }
        changed
    }

    fn start_listing(&mut self, request_id: RequestId, files: Vec<PathBuf>) {
        let tab = self.current_tab;
        let thumbnails = match (&self.thumbnails, tab.wants_thumbnails()) {
            (Some(cache), true) => Some(ThumbnailJob {
                cache: Arc::clone(cache),
                bounds: self.settings.thumbnails.bounds,
                batch_limit: self.settings.thumbnail_batch_limit,
            }),
            _ => None,
        };
        self.thumbnails_pending = thumbnails.is_some();

        if let Err(e) = spawn_listing(request_id, files, tab, thumbnails, self.listing_tx.clone()) {
            self.fail(format!("could not build listing: {e}"));
        }
    }

    fn process_listing_events(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_MESSAGES_PER_CALL {
            let event = match self.listing_rx.try_recv() {
                Ok(e) => e,
                Err(_) => break,
            };
            match event {
                ListingEvent::Rows { request_id, rows } if self.is_current(request_id) => {
                    self.rows = rows;
                    self.phase = BrowserPhase::Results;
                    changed = true;
                }
                ListingEvent::Thumbnails { request_id, thumbs } if self.is_current(request_id) => {
                    for (row, thumb) in self.rows.iter_mut().zip(thumbs) {
                        row.thumbnail = thumb;
                    }
                    self.thumbnails_pending = false;
                    changed = true;
                }
                _ => self.stale_messages += 1,
            }
        }
        changed
    }

    fn fail(&mut self, message: String) {
        warn!("{message}");
        self.last_error = Some(message);
        self.current_request = None;
        self.phase = BrowserPhase::Results;
        self.thumbnails_pending = false;
    }
}
