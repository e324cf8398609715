/// Scan progress reporting: lightweight messages sent from the scan
/// thread to whoever holds the [`ScanHandle`](super::ScanHandle).
use crate::model::RequestId;
use std::path::PathBuf;
use std::time::Duration;

/// The terminal result of one scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// The request this result answers.
    pub request_id: RequestId,
    /// Every regular file found, in discovery order. All files under the
    /// first root precede all files under the second, and so on.
    pub files: Vec<PathBuf>,
    /// Wall-clock time from thread start to the end of the last root.
    pub duration: Duration,
    /// Number of entries that could not be read. They are absent from `files`.
    pub error_count: u64,
}

impl ScanOutcome {
    /// An outcome with no files, used when a scan thread dies before
    /// reporting.
    pub fn empty(request_id: RequestId) -> Self {
        Self {
            request_id,
            files: Vec::new(),
            duration: Duration::ZERO,
            error_count: 0,
        }
    }
}

/// Progress updates sent from the scan thread.
///
/// Exactly one `Complete` is sent per scan, always last. Every message names
/// its request so several scans can share one channel.
#[derive(Debug)]
pub enum ScanProgress {
    /// Periodic update with running totals.
    Update {
        request_id: RequestId,
        files_found: u64,
        current_path: String,
    },
    /// A requested root does not exist or is not a directory. Not an error.
    RootSkipped { request_id: RequestId, root: PathBuf },
    /// A non-fatal error (e.g. permission denied on one directory).
    Error {
        request_id: RequestId,
        path: String,
        message: String,
    },
    /// Scanning finished; carries the complete listing.
    Complete(ScanOutcome),
}

impl ScanProgress {
    /// The request this message belongs to.
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Update { request_id, .. }
            | Self::RootSkipped { request_id, .. }
            | Self::Error { request_id, .. } => *request_id,
            Self::Complete(outcome) => outcome.request_id,
        }
    }
}
