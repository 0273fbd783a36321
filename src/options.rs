//! Configuration options for copy operations.
//!
//! This module provides [`CopyOptions`], which selects the host copy
//! primitive and tunes the fallback transfer.
//!
//! # Example
//!
//! ```
//! use copyfile_shim::CopyOptions;
//!
//! // Force the stream fallback with a larger buffer and durable writes
//! let options = CopyOptions::default()
//!     .without_platform()
//!     .with_buffer_size(1024 * 1024)
//!     .with_fsync();
//! assert!(options.platform.is_none());
//! ```

use crate::copy::{NativeCopy, PlatformCopy};
use std::sync::Arc;

/// Default size of the fallback pipe buffer (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Options for copy operations.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `platform` | `Some(NativeCopy)` | Host primitive to delegate to |
/// | `fsync` | `false` | Sync destination to disk after write |
/// | `preserve_permissions` | `true` | Copy the source permission bits |
/// | `buffer_size` | 64 KiB | Fallback pipe buffer |
/// | `warn_handler` | `None` | Route warnings to `tracing` (if enabled) |
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Host copy primitive (default: [`NativeCopy`])
    ///
    /// When `Some`, the copy is delegated to it entirely. When `None`, the
    /// stream fallback runs: an existence check for `EXCLUSIVE`, then a
    /// read-stream to write-stream pipe.
    #[cfg_attr(feature = "serde", serde(skip, default = "default_platform"))]
    pub platform: Option<Arc<dyn PlatformCopy>>,

    /// Whether to sync the destination to disk after writing (default: false)
    pub fsync: bool,

    /// Whether to give the destination the source's permissions (default: true)
    pub preserve_permissions: bool,

    /// Buffer size of the fallback pipe in bytes (default: 64 KiB)
    pub buffer_size: usize,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    /// Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,
}

fn default_platform() -> Option<Arc<dyn PlatformCopy>> {
    Some(Arc::new(NativeCopy))
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            fsync: false,
            preserve_permissions: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
            warn_handler: None,
        }
    }
}

impl CopyOptions {
    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Delegate copies to the given host primitive
    #[must_use]
    pub fn with_platform(mut self, platform: Arc<dyn PlatformCopy>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Run without a host primitive, using the stream fallback
    #[must_use]
    pub fn without_platform(mut self) -> Self {
        self.platform = None;
        self
    }

    /// Sync the destination to disk before reporting success
    #[must_use]
    pub fn with_fsync(mut self) -> Self {
        self.fsync = true;
        self
    }

    /// Set the fallback pipe buffer size
    ///
    /// Value is clamped to at least 1 byte.
    #[must_use]
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes.max(1);
        self
    }

    /// Disable permission preservation
    ///
    /// The destination then gets the default mode for new files (umask applied).
    #[must_use]
    pub fn without_permissions(mut self) -> Self {
        self.preserve_permissions = false;
        self
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }
}
