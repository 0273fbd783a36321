//! Common test utilities for integration tests.

#![allow(dead_code)]

use copyfile_shim::{CopyFileBuilder, CopyFlags, CopyOptions, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tempfile::TempDir;

/// How long a test waits for the completion callback.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Which copy path a test exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Delegate to the native host primitive
    Native,
    /// Stream fallback, no host primitive
    Fallback,
}

impl Route {
    pub fn options(self) -> CopyOptions {
        match self {
            Route::Native => CopyOptions::default(),
            Route::Fallback => CopyOptions::default().without_platform(),
        }
    }
}

/// A temp directory holding a `src` file and a `dest` location.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Fresh directory with `src` containing `"hello\n"`.
    pub fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        };
        fixture.write_src(b"hello\n");
        fixture
    }

    pub fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn dest(&self) -> PathBuf {
        self.dir.path().join("dest")
    }

    pub fn write_src(&self, content: &[u8]) {
        fs::write(self.src(), content).expect("Failed to write source");
    }

    pub fn write_dest(&self, content: &[u8]) {
        fs::write(self.dest(), content).expect("Failed to write destination");
    }

    /// Check that a file exists and has the expected content.
    pub fn assert_file_content(&self, path: &Path, expected: &[u8]) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        let actual = fs::read(path).expect("Failed to read file");
        assert_eq!(actual, expected, "File content mismatch");
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Start a copy through the callback API and wait for its outcome.
///
/// Panics if the call is rejected synchronously or the callback never fires.
pub fn copy_and_wait(src: &Path, dst: &Path, flags: CopyFlags, options: CopyOptions) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    CopyFileBuilder::new()
        .source(src)
        .destination(dst)
        .flags(flags)
        .options(options)
        .on_complete(move |outcome| {
            tx.send(outcome).expect("receiver alive");
        })
        .spawn()
        .expect("arguments are valid");

    let outcome = rx
        .recv_timeout(CALLBACK_TIMEOUT)
        .expect("callback was not invoked");
    // Exactly once: the sender is gone after the single call.
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    outcome
}
