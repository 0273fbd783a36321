//! Helpers shared by the copy paths.

use crate::error::{Error, Result};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;

// =============================================================================
// Source inspection
// =============================================================================

/// Stat the source of a copy.
///
/// A missing source is [`Error::NotFound`]; a directory is rejected with
/// [`io::ErrorKind::IsADirectory`] since only regular file content is copied.
pub(crate) fn source_metadata(src: &Path, dst: &Path) -> Result<Metadata> {
    let meta = fs::metadata(src).map_err(|e| Error::from_source(src, dst, e))?;
    if meta.is_dir() {
        let message = format!(
            "EISDIR: illegal operation on a directory, copyfile '{}' -> '{}'",
            src.display(),
            dst.display()
        );
        return Err(Error::from_source(
            src,
            dst,
            io::Error::new(io::ErrorKind::IsADirectory, message),
        ));
    }
    Ok(meta)
}

// =============================================================================
// File content copying
// =============================================================================

/// Copy file contents using the best available method.
///
/// On Linux 4.5+, uses `copy_file_range` for an in-kernel transfer.
/// Falls back to `std::io::copy` on other platforms or when the
/// filesystem pair cannot do it.
pub(crate) fn copy_file_contents(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        copy_file_range_all(src, dst, len)
    }
    #[cfg(not(target_os = "linux"))]
    {
        use std::io::BufReader;
        let _ = len;
        io::copy(&mut BufReader::new(src), &mut &*dst)
    }
}

/// Linux: move `len` bytes in-kernel with copy_file_range(2).
///
/// If the kernel refuses the file pair, whatever is left is streamed with
/// `io::copy` from the current offsets, which copy_file_range advances.
#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    let mut copied: u64 = 0;

    while copied < len {
        match kernel_copy(src, dst, len - copied) {
            Ok(0) => break, // source shrank since it was measured
            Ok(n) => copied += n as u64,
            Err(e) if kernel_refused(&e) => {
                let rest = io::copy(&mut io::BufReader::new(src), &mut &*dst)?;
                return Ok(copied + rest);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(copied)
}

/// One copy_file_range(2) call of at most 128 MiB, retried on EINTR.
#[cfg(target_os = "linux")]
fn kernel_copy(src: &File, dst: &File, want: u64) -> io::Result<usize> {
    use std::os::unix::io::AsRawFd;

    const MAX_CHUNK: u64 = 128 * 1024 * 1024;
    let chunk = usize::try_from(want.min(MAX_CHUNK)).unwrap_or(usize::MAX);

    loop {
        // SAFETY: both descriptors stay open for the borrows; null offsets
        // use and advance the file positions.
        let rc = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };
        match usize::try_from(rc) {
            Ok(n) => return Ok(n),
            Err(_) => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }
}

/// Errors meaning "this pair cannot be copied in-kernel", not a real IO
/// failure.
#[cfg(target_os = "linux")]
fn kernel_refused(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EOPNOTSUPP)
    )
}

// =============================================================================
// Paths
// =============================================================================

/// Directory a temp file for `dst` should be created in.
///
/// `Path::parent` yields `""` for a bare file name; that maps to `"."`.
pub(crate) fn temp_dir_for(dst: &Path) -> &Path {
    match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
