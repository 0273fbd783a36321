//! Single file copy.
//!
//! This module holds the validated [`CopyRequest`], the dispatch between
//! the host primitive and the stream fallback, and the callback-style entry
//! points [`copy_file`] and [`copy_file_with_flags`].

use crate::builder::CopyFileBuilder;
use crate::error::{Error, Result};
use crate::flags::CopyFlags;
use crate::options::CopyOptions;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::stream::stream_copy;

/// A validated copy request.
///
/// Constructed only through validation, so both paths are non-empty and
/// the flags lie within the recognized mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    source: PathBuf,
    destination: PathBuf,
    flags: CopyFlags,
}

impl CopyRequest {
    /// Validate arguments into a request.
    ///
    /// Checks run in a fixed order and the first failure wins: destination,
    /// then source, then flags. The callback check, when there is one,
    /// happens before all of these in [`CopyFileBuilder::spawn`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgumentType`] if `dst` or `src` is missing or empty
    /// - [`Error::InvalidFlags`] if `flags` is negative or above
    ///   [`MAX_MASK`](crate::constants::MAX_MASK)
    pub fn validate(src: Option<&Path>, dst: Option<&Path>, flags: i64) -> Result<Self> {
        let destination = check_path("dest", dst)?;
        let source = check_path("src", src)?;
        let flags = CopyFlags::from_raw(flags).ok_or_else(|| Error::InvalidFlags {
            flags,
            dest: destination.to_path_buf(),
        })?;

        Ok(Self {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            flags,
        })
    }

    /// Source path.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Destination path.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Requested flags.
    pub fn flags(&self) -> CopyFlags {
        self.flags
    }

    /// Perform the copy and return its outcome.
    ///
    /// Delegates to [`CopyOptions::platform`] when set; otherwise runs the
    /// stream fallback (see [`copy_file_fallback`]).
    pub fn execute(&self, options: &CopyOptions) -> Result<()> {
        let (src, dst) = (self.source.as_path(), self.destination.as_path());

        match &options.platform {
            Some(platform) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(src = %src.display(), dst = %dst.display(), flags = self.flags.bits(), ?platform, "delegating copy");
                platform.copy_file(src, dst, self.flags, options)
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(src = %src.display(), dst = %dst.display(), flags = self.flags.bits(), "fallback copy");
                copy_file_fallback(src, dst, self.flags, options)
            }
        }
    }
}

fn check_path<'a>(name: &'static str, path: Option<&'a Path>) -> Result<&'a Path> {
    match path {
        None => Err(Error::InvalidArgumentType {
            name,
            received: "nothing",
        }),
        Some(p) if p.as_os_str().is_empty() => Err(Error::InvalidArgumentType {
            name,
            received: "an empty path",
        }),
        Some(p) => Ok(p),
    }
}

/// Copy without a host primitive.
///
/// With [`CopyFlags::EXCLUSIVE`] the destination is stat'ed first and the
/// transfer only starts if it is absent. The check and the transfer are
/// two separate steps: a file created at `dst` in between is overwritten.
/// Use [`NativeCopy`](crate::NativeCopy) when that matters.
///
/// Clone flags are accepted and ignored here.
///
/// # Errors
///
/// - [`Error::AlreadyExists`] if `EXCLUSIVE` is set and `dst` exists
/// - [`Error::Io`] carrying the stat error verbatim if the existence check
///   fails for any reason other than "not found"
/// - [`Error::NotFound`] if `src` does not exist
/// - [`Error::Io`] for any read or write failure
pub fn copy_file_fallback(
    src: &Path,
    dst: &Path,
    flags: CopyFlags,
    options: &CopyOptions,
) -> Result<()> {
    if flags.contains(CopyFlags::EXCLUSIVE) {
        ensure_absent(src, dst)?;
    }
    stream_copy(src, dst, options).map(drop)
}

/// Fail if `dst` exists; pass through any other stat error.
pub(crate) fn ensure_absent(src: &Path, dst: &Path) -> Result<()> {
    match fs::metadata(dst) {
        Ok(_) => Err(Error::already_exists(src, dst)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::Io {
            path: dst.to_path_buf(),
            dest: None,
            source,
        }),
    }
}

/// Copy `src` to `dst` asynchronously with no flags.
///
/// Arguments are validated before this returns; argument errors come back
/// as `Err` and the callback is never called. Otherwise the copy runs on
/// a dedicated thread and `callback` receives the outcome exactly once,
/// independently of any other copy in flight.
///
/// # Example
///
/// ```no_run
/// use copyfile_shim::copy_file;
///
/// copy_file("src.txt", "dst.txt", |outcome| match outcome {
///     Ok(()) => println!("copied"),
///     Err(e) => eprintln!("copy failed: {e}"),
/// })?;
/// # Ok::<(), copyfile_shim::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidArgumentType`] for an empty path, or
/// [`Error::Io`] if the copy thread cannot be started.
pub fn copy_file<P, Q, F>(src: P, dst: Q, callback: F) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnOnce(Result<()>) + Send + 'static,
{
    CopyFileBuilder::new()
        .source(src)
        .destination(dst)
        .on_complete(callback)
        .spawn()
}

/// Copy `src` to `dst` asynchronously with `flags`.
///
/// Same contract as [`copy_file`].
///
/// # Example
///
/// ```no_run
/// use copyfile_shim::{copy_file_with_flags, CopyFlags, ErrorKind};
///
/// copy_file_with_flags("src.txt", "dst.txt", CopyFlags::EXCLUSIVE, |outcome| {
///     if let Err(e) = outcome {
///         if e.kind() == ErrorKind::AlreadyExists {
///             println!("left existing file alone");
///         }
///     }
/// })?;
/// # Ok::<(), copyfile_shim::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidArgumentType`] for an empty path, or
/// [`Error::Io`] if the copy thread cannot be started.
pub fn copy_file_with_flags<P, Q, F>(src: P, dst: Q, flags: CopyFlags, callback: F) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnOnce(Result<()>) + Send + 'static,
{
    CopyFileBuilder::new()
        .source(src)
        .destination(dst)
        .flags(flags)
        .on_complete(callback)
        .spawn()
}

/// Copy `src` to `dst` on the calling thread.
///
/// # Errors
///
/// Argument errors as in [`CopyRequest::validate`], then any outcome error
/// described on [`copy_file_fallback`] or the configured
/// [`PlatformCopy`](crate::PlatformCopy).
pub fn copy_file_sync(src: &Path, dst: &Path, flags: CopyFlags, options: &CopyOptions) -> Result<()> {
    CopyRequest::validate(Some(src), Some(dst), i64::from(flags.bits()))?.execute(options)
}
