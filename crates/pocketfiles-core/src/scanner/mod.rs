/// Scanner module: enumerates files under one or more roots without
/// blocking the caller.
///
/// Two delivery styles share one walker:
/// - [`start_scan`] returns a [`ScanHandle`] whose channel carries progress
///   messages and, last, exactly one [`ScanProgress::Complete`].
/// - [`scan`] takes a callback that runs once, on the scan thread, with the
///   complete listing.
///
/// Scans cannot be cancelled. Each runs on its own thread to completion;
/// concurrent scans deliver independently and consumers tell them apart by
/// [`RequestId`](crate::model::RequestId).
pub mod progress;
pub mod walk;

use crate::model::{RequestId, ScanRequest};
use progress::{ScanOutcome, ScanProgress};

use crossbeam_channel::{Receiver, Sender};
use std::io;
use std::path::PathBuf;
use std::thread;
use tracing::info;

/// Maximum number of progress messages that may queue up in the channel.
///
/// The browser drains this channel a few hundred messages at a time. A
/// consumer that falls far behind stalls the walker briefly rather than
/// letting the queue grow without bound.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Handle to a running or completed scan.
pub struct ScanHandle {
    /// The request this scan is answering.
    pub request_id: RequestId,
    /// Receiver for progress updates from the scan thread.
    pub progress_rx: Receiver<ScanProgress>,
    /// Join handle for the scan thread.
    _thread: thread::JoinHandle<()>,
}

impl ScanHandle {
    /// Block until the scan finishes and return its outcome, discarding
    /// intermediate progress.
    ///
    /// If the scan thread disappears without reporting (it panicked), an
    /// empty outcome is returned.
    pub fn wait(self) -> ScanOutcome {
        for msg in self.progress_rx.iter() {
            if let ScanProgress::Complete(outcome) = msg {
                return outcome;
            }
        }
        ScanOutcome::empty(self.request_id)
    }
}

/// Start scanning `request` on a new background thread.
///
/// Fails only if the OS refuses to spawn the thread.
pub fn start_scan(request: ScanRequest, walk_threads: usize) -> io::Result<ScanHandle> {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let request_id = request.id();
    let thread = spawn_scan(request, walk_threads, progress_tx)?;

    Ok(ScanHandle {
        request_id,
        progress_rx,
        _thread: thread,
    })
}

/// Start scanning `request`, reporting on a channel the caller owns.
///
/// Lets one consumer multiplex many scans over a single receiver and sort
/// the messages out by [`ScanProgress::request_id`]. The thread is detached.
pub fn start_scan_into(
    request: ScanRequest,
    walk_threads: usize,
    progress_tx: Sender<ScanProgress>,
) -> io::Result<RequestId> {
    let request_id = request.id();
    spawn_scan(request, walk_threads, progress_tx)?;
    Ok(request_id)
}

fn spawn_scan(
    request: ScanRequest,
    walk_threads: usize,
    progress_tx: Sender<ScanProgress>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("pocketfiles-scan-{}", request.id().0))
        .spawn(move || {
            info!(
                "Starting scan {} over {} root(s)",
                request.id(),
                request.roots().len()
            );
            let outcome = walk::walk_roots(&request, walk_threads, &progress_tx);
            info!(
                "Scan {} found {} files in {:?}",
                outcome.request_id,
                outcome.files.len(),
                outcome.duration
            );
            let _ = progress_tx.send(ScanProgress::Complete(outcome));
        })
}

/// Scan `roots` in the background and hand the full listing to `on_complete`.
///
/// The callback runs exactly once, on the scan thread, after every root has
/// been walked; it receives an empty vec if nothing was found. Marshalling
/// its effects onto a UI thread is the caller's business. Returns the id of
/// the issued request.
pub fn scan<I, P, F>(roots: I, on_complete: F) -> io::Result<RequestId>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
    F: FnOnce(Vec<PathBuf>) + Send + 'static,
{
    let request = ScanRequest::new(roots);
    let request_id = request.id();
    let walk_threads = num_cpus::get();

    thread::Builder::new()
        .name(format!("pocketfiles-scan-{}", request_id.0))
        .spawn(move || {
            // Progress is not observable through this entry point. With the
            // receiver dropped every send fails immediately instead of blocking.
            let (sink, _) = crossbeam_channel::bounded(0);
            let outcome = walk::walk_roots(&request, walk_threads, &sink);
            info!(
                "Scan {} found {} files in {:?}",
                outcome.request_id,
                outcome.files.len(),
                outcome.duration
            );
            on_complete(outcome.files);
        })?;

    Ok(request_id)
}
