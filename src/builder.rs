//! Builder API for copy calls with every argument optional.
//!
//! [`copy_file`](crate::copy_file) and
//! [`copy_file_with_flags`](crate::copy_file_with_flags) cover the usual
//! call shapes. [`CopyFileBuilder`] is for callers that assemble arguments
//! from untyped input (raw integer flags, paths that may be absent): every
//! argument-shape error is reachable here and is returned synchronously.
//!
//! # Examples
//!
//! ## Asynchronous
//!
//! ```no_run
//! use copyfile_shim::{CopyFileBuilder, constants};
//!
//! CopyFileBuilder::new()
//!     .source("src.txt")
//!     .destination("dst.txt")
//!     .raw_flags(constants::EXCLUSIVE)
//!     .on_complete(|outcome| {
//!         if let Err(e) = outcome {
//!             eprintln!("{}: {e}", e.code());
//!         }
//!     })
//!     .spawn()?;
//! # Ok::<(), copyfile_shim::Error>(())
//! ```
//!
//! ## Blocking, forcing the stream fallback
//!
//! ```no_run
//! use copyfile_shim::CopyFileBuilder;
//!
//! CopyFileBuilder::new()
//!     .source("src.txt")
//!     .destination("dst.txt")
//!     .exclusive()
//!     .fallback()
//!     .run()?;
//! # Ok::<(), copyfile_shim::Error>(())
//! ```

use crate::copy::{CopyRequest, PlatformCopy};
use crate::error::{Error, Result};
use crate::flags::CopyFlags;
use crate::options::CopyOptions;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

type Callback = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// A builder for configuring and starting a single file copy.
///
/// # Validation order
///
/// [`spawn`](Self::spawn) checks, stopping at the first failure:
///
/// 1. callback present ([`Error::InvalidCallback`])
/// 2. destination present and non-empty ([`Error::InvalidArgumentType`])
/// 3. source present and non-empty ([`Error::InvalidArgumentType`])
/// 4. flags within `0..=MAX_MASK` ([`Error::InvalidFlags`])
///
/// [`run`](Self::run) needs no callback and starts at step 2.
#[derive(Default)]
pub struct CopyFileBuilder {
    src: Option<PathBuf>,
    dst: Option<PathBuf>,
    flags: i64,
    options: CopyOptions,
    callback: Option<Callback>,
}

impl fmt::Debug for CopyFileBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyFileBuilder")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("flags", &self.flags)
            .field("options", &self.options)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl CopyFileBuilder {
    /// Create an empty builder with default options and no flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source path.
    #[must_use]
    pub fn source<P: AsRef<Path>>(mut self, src: P) -> Self {
        self.src = Some(src.as_ref().to_path_buf());
        self
    }

    /// Set the destination path.
    #[must_use]
    pub fn destination<P: AsRef<Path>>(mut self, dst: P) -> Self {
        self.dst = Some(dst.as_ref().to_path_buf());
        self
    }

    /// Set typed flags, replacing any previous flags.
    #[must_use]
    pub fn flags(mut self, flags: CopyFlags) -> Self {
        self.flags = i64::from(flags.bits());
        self
    }

    /// Set raw integer flags, replacing any previous flags.
    ///
    /// The value is not checked until [`spawn`](Self::spawn) or
    /// [`run`](Self::run).
    #[must_use]
    pub fn raw_flags(mut self, flags: i64) -> Self {
        self.flags = flags;
        self
    }

    /// Add [`CopyFlags::EXCLUSIVE`]: fail if the destination exists.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.flags |= i64::from(CopyFlags::EXCLUSIVE.bits());
        self
    }

    /// Replace all options.
    #[must_use]
    pub fn options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    /// Delegate to `platform` instead of the default [`NativeCopy`](crate::NativeCopy).
    #[must_use]
    pub fn platform(mut self, platform: Arc<dyn PlatformCopy>) -> Self {
        self.options = self.options.with_platform(platform);
        self
    }

    /// Use the stream fallback even though a host primitive is available.
    #[must_use]
    pub fn fallback(mut self) -> Self {
        self.options = self.options.without_platform();
        self
    }

    /// Sync the destination to disk before reporting success.
    #[must_use]
    pub fn fsync(mut self) -> Self {
        self.options = self.options.with_fsync();
        self
    }

    /// Do not copy the source permissions.
    #[must_use]
    pub fn no_permissions(mut self) -> Self {
        self.options = self.options.without_permissions();
        self
    }

    /// Set the completion callback.
    #[must_use]
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Validate and start the copy in the background.
    ///
    /// On `Ok(())` the copy runs on its own thread and the callback will be
    /// invoked exactly once with the outcome. Calls do not share threads, so
    /// a copy stalled in IO never delays another call's completion. A
    /// panicking callback unwinds only that thread.
    ///
    /// # Errors
    ///
    /// Argument errors, in the order listed on [`CopyFileBuilder`], or
    /// [`Error::Io`] if the copy thread could not be started. The callback
    /// is not invoked when this returns `Err`.
    pub fn spawn(self) -> Result<()> {
        let Self {
            src,
            dst,
            flags,
            options,
            callback,
        } = self;

        let callback = callback.ok_or(Error::InvalidCallback)?;
        let request = CopyRequest::validate(src.as_deref(), dst.as_deref(), flags)?;
        let dest = request.destination().to_path_buf();

        thread::Builder::new()
            .name("copyfile".into())
            .spawn(move || {
                let outcome = request.execute(&options);

                #[cfg(feature = "tracing")]
                if let Err(ref e) = outcome {
                    tracing::debug!(code = e.code(), error = %e, "copy failed");
                }

                callback(outcome);
            })
            .map(drop)
            .map_err(|source| Error::Io {
                path: dest,
                dest: None,
                source,
            })
    }

    /// Validate and copy on the calling thread.
    ///
    /// A callback set on the builder is ignored.
    ///
    /// # Errors
    ///
    /// Argument errors (destination, source, flags), then the copy outcome.
    pub fn run(self) -> Result<()> {
        CopyRequest::validate(self.src.as_deref(), self.dst.as_deref(), self.flags)?
            .execute(&self.options)
    }
}
