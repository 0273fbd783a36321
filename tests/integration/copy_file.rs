//! Copy outcome integration tests.
//!
//! These tests drive the public callback API and check:
//! - Byte-identical content on both the native and the fallback path
//! - Permission bits carried over from the source
//! - Missing sources reported through the callback, never returned
//! - Write failures reported through the callback
//! - A stalled copy never delays the completion of an unrelated one

#[path = "../common/mod.rs"]
mod common;

use common::{Route, TestFixture, copy_and_wait};
use copyfile_shim::{
    CopyFileBuilder, CopyFlags, CopyOptions, ErrorKind, PlatformCopy, Result, copy_file,
    copy_file_with_flags,
};
use rstest::rstest;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

#[rstest]
#[case::native(Route::Native)]
#[case::fallback(Route::Fallback)]
fn test_copy_hello(#[case] route: Route) {
    let fx = TestFixture::new();

    copy_and_wait(&fx.src(), &fx.dest(), CopyFlags::empty(), route.options()).unwrap();

    fx.assert_file_content(&fx.dest(), b"hello\n");
}

#[rstest]
fn test_copy_round_trip(
    #[values(Route::Native, Route::Fallback)] route: Route,
    #[values(0usize, 1, 4095, 65_536, 65_537, 1_000_003)] len: usize,
) {
    let fx = TestFixture::new();
    let content: Vec<u8> = (0..len).map(|i| (i.wrapping_mul(31) % 256) as u8).collect();
    fx.write_src(&content);

    copy_and_wait(&fx.src(), &fx.dest(), CopyFlags::empty(), route.options()).unwrap();

    fx.assert_file_content(&fx.dest(), &content);
}

#[rstest]
#[case::native(Route::Native)]
#[case::fallback(Route::Fallback)]
fn test_copy_overwrites_without_exclusive(#[case] route: Route) {
    let fx = TestFixture::new();
    fx.write_dest(b"previous destination content that is longer");

    copy_and_wait(&fx.src(), &fx.dest(), CopyFlags::empty(), route.options()).unwrap();

    fx.assert_file_content(&fx.dest(), b"hello\n");
}

#[rstest]
#[case::native(Route::Native)]
#[case::fallback(Route::Fallback)]
fn test_missing_source_is_delivered_via_callback(#[case] route: Route) {
    let fx = TestFixture::new();
    let missing = fx.dir.path().join("0.6180339887");

    let err = copy_and_wait(&missing, &fx.dest(), CopyFlags::empty(), route.options()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.code(), "ENOENT");
    assert_eq!(err.path(), Some(missing.as_path()));
    assert_eq!(err.dest(), Some(fx.dest().as_path()));
    assert!(!fx.dest().exists());
}

#[rstest]
#[case::native(Route::Native)]
#[case::fallback(Route::Fallback)]
fn test_source_directory_is_io_error(#[case] route: Route) {
    let fx = TestFixture::new();
    let sub = fx.dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    let err = copy_and_wait(&sub, &fx.dest(), CopyFlags::empty(), route.options()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.io_error().is_some());
}

#[cfg(unix)]
#[rstest]
#[case::native(Route::Native)]
#[case::fallback(Route::Fallback)]
fn test_copy_preserves_mode(#[case] route: Route) {
    use std::os::unix::fs::PermissionsExt;

    let fx = TestFixture::new();
    fs::set_permissions(fx.src(), fs::Permissions::from_mode(0o754)).unwrap();

    copy_and_wait(&fx.src(), &fx.dest(), CopyFlags::empty(), route.options()).unwrap();

    let mode = fs::metadata(fx.dest()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o754);
}

#[test]
fn test_copy_file_two_path_form() {
    let fx = TestFixture::new();
    let (tx, rx) = mpsc::channel();

    copy_file(fx.src(), fx.dest(), move |outcome| {
        tx.send(outcome).unwrap();
    })
    .unwrap();

    rx.recv_timeout(common::CALLBACK_TIMEOUT).unwrap().unwrap();
    fx.assert_file_content(&fx.dest(), b"hello\n");
}

#[test]
fn test_copy_file_with_flags_three_arg_form() {
    let fx = TestFixture::new();
    let (tx, rx) = mpsc::channel();

    copy_file_with_flags(fx.src(), fx.dest(), CopyFlags::CLONE_HINT, move |outcome| {
        tx.send(outcome).unwrap();
    })
    .unwrap();

    rx.recv_timeout(common::CALLBACK_TIMEOUT).unwrap().unwrap();
    fx.assert_file_content(&fx.dest(), b"hello\n");
}

#[test]
fn test_fallback_with_fsync_and_small_buffer() {
    let fx = TestFixture::new();
    let content = vec![7u8; 100_000];
    fx.write_src(&content);

    let options = CopyOptions::default()
        .without_platform()
        .with_fsync()
        .with_buffer_size(333);
    copy_and_wait(&fx.src(), &fx.dest(), CopyFlags::empty(), options).unwrap();

    fx.assert_file_content(&fx.dest(), &content);
}

#[cfg(target_os = "linux")]
#[test]
fn test_write_failure_is_delivered_via_callback() {
    let fx = TestFixture::new();
    let full = Path::new("/dev/full");

    let err = copy_and_wait(&fx.src(), full, CopyFlags::empty(), Route::Fallback.options())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.code(), "EIO");
    assert_eq!(err.path(), Some(full));
    assert_eq!(
        err.io_error().map(std::io::Error::kind),
        Some(std::io::ErrorKind::StorageFull)
    );
}

/// A primitive that blocks until its gate is closed, then reports success
/// without writing anything.
#[derive(Debug)]
struct Stalled {
    gate: Mutex<mpsc::Receiver<()>>,
}

impl PlatformCopy for Stalled {
    fn copy_file(&self, _src: &Path, _dst: &Path, _flags: CopyFlags, _options: &CopyOptions) -> Result<()> {
        let gate = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        let _ = gate.recv();
        Ok(())
    }
}

#[test]
fn test_stalled_copies_do_not_block_independent_copy() {
    let fx = TestFixture::new();
    let (release, gate) = mpsc::channel::<()>();
    let stalled = Arc::new(Stalled {
        gate: Mutex::new(gate),
    });

    // More stalled calls than there are cores, so any shared pool sized by
    // parallelism would be saturated.
    let stuck = thread::available_parallelism().map_or(4, NonZeroUsize::get) + 1;
    let (stalled_tx, stalled_rx) = mpsc::channel();
    for i in 0..stuck {
        let tx = stalled_tx.clone();
        CopyFileBuilder::new()
            .source(fx.src())
            .destination(fx.dir.path().join(format!("stalled-{i}")))
            .platform(stalled.clone())
            .on_complete(move |outcome| {
                let _ = tx.send(outcome);
            })
            .spawn()
            .unwrap();
    }
    drop(stalled_tx);

    copy_and_wait(&fx.src(), &fx.dest(), CopyFlags::empty(), Route::Fallback.options()).unwrap();
    fx.assert_file_content(&fx.dest(), b"hello\n");

    // Still parked.
    assert!(stalled_rx.try_recv().is_err());

    drop(release);
    for _ in 0..stuck {
        stalled_rx.recv_timeout(common::CALLBACK_TIMEOUT).unwrap().unwrap();
    }
}
