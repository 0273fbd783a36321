//! Core copy operations.
//!
//! This module provides the single-file copy: dispatch to a host
//! primitive when one is configured, or the stream fallback with its
//! two-step exclusive check otherwise.

mod file;
mod platform;
mod reflink;
mod stream;
mod utils;

// Re-export public API
pub use file::{CopyRequest, copy_file, copy_file_fallback, copy_file_sync, copy_file_with_flags};
pub use platform::{NativeCopy, PlatformCopy};
