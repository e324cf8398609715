/// Scan requests and their process-wide identifiers.
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of request identifiers. Starts at 1 so that 0 can never collide
/// with a real request.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Monotonically increasing identifier attached to every scan.
///
/// Scans are never cancelled, so a consumer that issues a second scan while
/// the first is still running will eventually receive both results. Comparing
/// the id on the result with the id of the latest request lets it drop the
/// stale one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Allocate the next identifier.
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One or more root directories to walk, in the order they should be walked.
///
/// Immutable once constructed: the roots are only reachable through a slice.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    id: RequestId,
    roots: Vec<PathBuf>,
}

impl ScanRequest {
    /// Build a request over `roots`, allocating a fresh [`RequestId`].
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            id: RequestId::next(),
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}
