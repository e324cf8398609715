/// End-to-end scanner integration tests.
///
/// These run the real walker on real OS threads against a temporary
/// directory tree, so thread spawning, jwalk traversal, error handling and
/// terminal delivery are all exercised with no mocking.
use pocketfiles_core::model::ScanRequest;
use pocketfiles_core::scanner::progress::{ScanOutcome, ScanProgress};
use pocketfiles_core::scanner::{scan, start_scan, start_scan_into, PROGRESS_CHANNEL_CAPACITY};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Create a reproducible directory tree:
///
/// ```text
/// root/
///   alpha/
///     a.txt
///     b.jpg
///     deep/
///       e.mp3
///   beta/
///     c.png
///   empty/
///   d.pdf
/// ```
///
/// 5 files across 4 subdirectories.
fn build_test_tree(root: &Path) -> Vec<PathBuf> {
    let alpha = root.join("alpha");
    let deep = alpha.join("deep");
    let beta = root.join("beta");
    fs::create_dir_all(&deep).unwrap();
    fs::create_dir_all(&beta).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();

    let files = vec![
        alpha.join("a.txt"),
        alpha.join("b.jpg"),
        deep.join("e.mp3"),
        beta.join("c.png"),
        root.join("d.pdf"),
    ];
    for f in &files {
        write_bytes(f, 64);
    }
    files
}

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

/// Drain progress messages until `Complete`, panicking after a generous
/// timeout so a stuck scanner fails the test instead of hanging the suite.
fn drain_to_completion(handle: pocketfiles_core::scanner::ScanHandle) -> ScanOutcome {
    let deadline = std::time::Instant::now() + Duration::from_secs(30);
    loop {
        assert!(
            std::time::Instant::now() < deadline,
            "scanner did not complete within 30 seconds"
        );
        match handle.progress_rx.try_recv() {
            Ok(ScanProgress::Complete(outcome)) => return outcome,
            Ok(_) => continue,
            Err(crossbeam_channel::TryRecvError::Empty) => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(crossbeam_channel::TryRecvError::Disconnected) => {
                panic!("scanner channel disconnected before Complete was sent");
            }
        }
    }
}

fn as_set(paths: &[PathBuf]) -> HashSet<PathBuf> {
    paths.iter().cloned().collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

/// Every file in the tree is reported exactly once; directories are not.
#[test]
fn scan_discovers_all_files() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let expected = build_test_tree(tmp.path());

    let outcome = drain_to_completion(start_scan(ScanRequest::new([tmp.path()]), 2).unwrap());

    assert_eq!(outcome.files.len(), expected.len(), "got {:?}", outcome.files);
    assert_eq!(as_set(&outcome.files), as_set(&expected));
    assert_eq!(outcome.error_count, 0);
}

/// The terminal message carries the id of the request it answers.
#[test]
fn outcome_carries_request_id() {
    let tmp = TempDir::new().unwrap();
    let request = ScanRequest::new([tmp.path()]);
    let id = request.id();

    let handle = start_scan(request, 1).unwrap();
    assert_eq!(handle.request_id, id);
    assert_eq!(handle.wait().request_id, id);
}

/// An empty directory completes normally with an empty listing.
#[test]
fn scan_empty_directory() {
    let tmp = TempDir::new().unwrap();
    let outcome = start_scan(ScanRequest::new([tmp.path()]), 1).unwrap().wait();
    assert!(outcome.files.is_empty());
    assert_eq!(outcome.error_count, 0);
}

/// A scan with no roots at all still completes.
#[test]
fn scan_with_no_roots_completes() {
    let outcome = start_scan(ScanRequest::new(Vec::<PathBuf>::new()), 1)
        .unwrap()
        .wait();
    assert!(outcome.files.is_empty());
}

/// All files under the first root precede all files under the second.
#[test]
fn multi_root_results_are_concatenated_in_request_order() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    for name in ["1.txt", "2.txt", "3.txt"] {
        write_bytes(&a.path().join(name), 8);
    }
    fs::create_dir(b.path().join("sub")).unwrap();
    write_bytes(&b.path().join("4.txt"), 8);
    write_bytes(&b.path().join("sub").join("5.txt"), 8);

    let outcome = start_scan(ScanRequest::new([a.path(), b.path()]), 2)
        .unwrap()
        .wait();

    assert_eq!(outcome.files.len(), 5);
    let (first, second) = outcome.files.split_at(3);
    assert!(first.iter().all(|p| p.starts_with(a.path())), "{first:?}");
    assert!(second.iter().all(|p| p.starts_with(b.path())), "{second:?}");
}

/// A missing root is skipped (reported, not counted as an error) and the
/// remaining roots are still scanned.
#[test]
fn missing_root_is_skipped() {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("kept.txt"), 8);
    let missing = tmp.path().join("does").join("not").join("exist");

    let handle = start_scan(ScanRequest::new([missing.clone(), tmp.path().to_path_buf()]), 1).unwrap();
    let mut skipped = Vec::new();
    let outcome = loop {
        match handle.progress_rx.recv_timeout(Duration::from_secs(30)) {
            Ok(ScanProgress::RootSkipped { root, .. }) => skipped.push(root),
            Ok(ScanProgress::Complete(o)) => break o,
            Ok(_) => continue,
            Err(e) => panic!("scanner stalled: {e}"),
        }
    };

    assert_eq!(skipped, vec![missing]);
    assert_eq!(outcome.files, vec![tmp.path().join("kept.txt")]);
    assert_eq!(outcome.error_count, 0);
}

/// A root that is a plain file is treated like a missing root.
#[test]
fn file_root_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("not_a_dir.txt");
    write_bytes(&file, 8);

    let outcome = start_scan(ScanRequest::new([file]), 1).unwrap().wait();
    assert!(outcome.files.is_empty());
}

/// Symlinks are neither followed nor reported, so a loop cannot hang the walk.
#[cfg(unix)]
#[test]
fn symlink_loops_do_not_hang() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("d");
    fs::create_dir(&dir).unwrap();
    write_bytes(&dir.join("f.txt"), 8);
    std::os::unix::fs::symlink(tmp.path(), dir.join("loop")).unwrap();

    let outcome = start_scan(ScanRequest::new([tmp.path()]), 2).unwrap().wait();
    assert_eq!(outcome.files, vec![dir.join("f.txt")]);
}

/// A link to a regular file is listed under the link's path; a dangling
/// link is counted as an error and left out.
#[cfg(unix)]
#[test]
fn file_symlinks_are_resolved_and_dangling_ones_reported() {
    let elsewhere = TempDir::new().unwrap();
    let target = elsewhere.path().join("target.jpg");
    write_bytes(&target, 16);

    let tmp = TempDir::new().unwrap();
    let link = tmp.path().join("link.jpg");
    let dangling = tmp.path().join("gone.jpg");
    std::os::unix::fs::symlink(&target, &link).unwrap();
    std::os::unix::fs::symlink(elsewhere.path().join("missing.jpg"), &dangling).unwrap();

    let handle = start_scan(ScanRequest::new([tmp.path()]), 1).unwrap();
    let mut error_paths = Vec::new();
    let outcome = loop {
        match handle
            .progress_rx
            .recv_timeout(Duration::from_secs(30))
            .expect("scanner did not complete within 30 seconds")
        {
            ScanProgress::Error { path, .. } => error_paths.push(path),
            ScanProgress::Complete(outcome) => break outcome,
            _ => {}
        }
    };

    assert_eq!(outcome.files, vec![link]);
    assert_eq!(outcome.error_count, 1);
    assert_eq!(error_paths, vec![dangling.to_string_lossy().into_owned()]);
}

/// The callback API delivers exactly once with the full listing.
#[test]
fn callback_scan_delivers_once() {
    let tmp = TempDir::new().unwrap();
    let expected = build_test_tree(tmp.path());

    let (tx, rx) = crossbeam_channel::unbounded();
    scan([tmp.path().to_path_buf()], move |files| {
        tx.send(files).unwrap();
    })
    .unwrap();

    let files = rx
        .recv_timeout(Duration::from_secs(30))
        .expect("callback never ran");
    assert_eq!(as_set(&files), as_set(&expected));
    // The sender was moved into the callback, which has now run and been
    // dropped, so no second delivery is possible.
    assert!(rx.recv_timeout(Duration::from_secs(1)).is_err());
}

/// The callback still runs, with an empty list, when nothing exists.
#[test]
fn callback_scan_missing_root_calls_back_empty() {
    let (tx, rx) = crossbeam_channel::unbounded();
    scan(["/does/not/exist"], move |files| {
        tx.send(files).unwrap();
    })
    .unwrap();

    let files = rx.recv_timeout(Duration::from_secs(30)).unwrap();
    assert!(files.is_empty());
}

/// Two overlapping scans complete independently with distinct ids.
#[test]
fn concurrent_scans_are_independent() {
    let tmp = TempDir::new().unwrap();
    build_test_tree(tmp.path());

    let first = start_scan(ScanRequest::new([tmp.path()]), 1).unwrap();
    let second = start_scan(ScanRequest::new([tmp.path()]), 1).unwrap();
    assert!(second.request_id > first.request_id);

    let o2 = second.wait();
    let o1 = first.wait();
    assert_eq!(o1.files.len(), 5);
    assert_eq!(o2.files.len(), 5);
    assert_ne!(o1.request_id, o2.request_id);
}

/// Scans sharing one channel are told apart by request id.
#[test]
fn shared_channel_scans_are_distinguishable() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write_bytes(&a.path().join("only_a.txt"), 1);
    write_bytes(&b.path().join("only_b.txt"), 1);
    write_bytes(&b.path().join("also_b.txt"), 1);

    let (tx, rx) = crossbeam_channel::bounded(PROGRESS_CHANNEL_CAPACITY);
    let id_a = start_scan_into(ScanRequest::new([a.path()]), 1, tx.clone()).unwrap();
    let id_b = start_scan_into(ScanRequest::new([b.path()]), 1, tx).unwrap();

    let mut done = std::collections::HashMap::new();
    while done.len() < 2 {
        match rx.recv_timeout(Duration::from_secs(30)) {
            Ok(ScanProgress::Complete(o)) => {
                done.insert(o.request_id, o.files.len());
            }
            Ok(other) => assert!([id_a, id_b].contains(&other.request_id())),
            Err(e) => panic!("scanner stalled: {e}"),
        }
    }
    assert_eq!(done[&id_a], 1);
    assert_eq!(done[&id_b], 2);
}

/// Enough files to trigger at least one periodic update.
#[test]
fn large_scan_sends_progress_updates() {
    let tmp = TempDir::new().unwrap();
    for i in 0..1_200 {
        write_bytes(&tmp.path().join(format!("file{i:04}.bin")), 1);
    }

    let handle = start_scan(ScanRequest::new([tmp.path()]), 2).unwrap();
    let mut saw_update = false;
    let outcome = loop {
        match handle.progress_rx.recv_timeout(Duration::from_secs(30)) {
            Ok(ScanProgress::Update { files_found, .. }) => {
                assert!(files_found > 0);
                saw_update = true;
            }
            Ok(ScanProgress::Complete(o)) => break o,
            Ok(_) => continue,
            Err(e) => panic!("scanner stalled: {e}"),
        }
    };
    assert!(saw_update);
    assert_eq!(outcome.files.len(), 1_200);
}

/// An unreadable subdirectory is skipped without aborting the walk; its
/// siblings are still reported.
#[cfg(unix)]
#[test]
fn unreadable_directory_is_swallowed() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let locked = tmp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    write_bytes(&locked.join("hidden.txt"), 8);
    write_bytes(&tmp.path().join("visible.txt"), 8);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; only assert what holds for everyone.
    let readable_anyway = fs::read_dir(&locked).is_ok();
    let outcome = start_scan(ScanRequest::new([tmp.path()]), 1).unwrap().wait();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(outcome.files.contains(&tmp.path().join("visible.txt")));
    if !readable_anyway {
        assert!(!outcome.files.contains(&locked.join("hidden.txt")));
    }
}

/// `PROGRESS_CHANNEL_CAPACITY` must never be 0, or every `send()` would
/// rendezvous with a receiver that may not be listening.
const _: () = assert!(
    PROGRESS_CHANNEL_CAPACITY > 0,
    "PROGRESS_CHANNEL_CAPACITY must be > 0"
);
