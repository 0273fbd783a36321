//! Stream fallback transfer.
//!
//! Used when no host primitive is configured. The source is opened as a
//! read stream, the destination as a write stream carrying the source's
//! mode, and [`pipe`] moves the bytes across. The destination is written
//! in place: on failure a partial file may remain, and the error is still
//! reported.

use crate::error::{Error, Result};
use crate::options::CopyOptions;
use std::fs::{File, Metadata, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use super::utils::source_metadata;

/// Which side of a [`pipe`] failed.
#[derive(Debug)]
pub(crate) enum PipeError {
    /// Reading from the source stream failed
    Read(io::Error),
    /// Writing to (or flushing) the destination stream failed
    Write(io::Error),
}

/// Copy everything from `reader` to `writer` through a `buffer_size` buffer.
///
/// Retries interrupted reads and flushes `writer` at EOF. Returns the
/// number of bytes moved.
pub(crate) fn pipe<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    buffer_size: usize,
) -> std::result::Result<u64, PipeError> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PipeError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(PipeError::Write)?;
        total += n as u64;
    }

    writer.flush().map_err(PipeError::Write)?;
    Ok(total)
}

/// Copy `src` to `dst` with plain streams.
///
/// Overwrites `dst` if it exists. The caller handles `EXCLUSIVE`.
pub(crate) fn stream_copy(src: &Path, dst: &Path, options: &CopyOptions) -> Result<u64> {
    let src_meta = source_metadata(src, dst)?;

    let reader = File::open(src).map_err(|e| Error::from_source(src, dst, e))?;
    let mut writer = open_destination(dst, &src_meta, options).map_err(|e| Error::from_dest(dst, e))?;

    let bytes = pipe(reader, &mut writer, options.buffer_size).map_err(|e| match e {
        PipeError::Read(source) => Error::Io {
            path: src.to_path_buf(),
            dest: Some(dst.to_path_buf()),
            source,
        },
        PipeError::Write(source) => Error::from_dest(dst, source),
    })?;

    // Creation mode is filtered by the umask and ignored for an existing
    // file, so the source permissions are applied explicitly.
    if options.preserve_permissions {
        writer
            .set_permissions(src_meta.permissions())
            .map_err(|e| Error::from_dest(dst, e))?;
    }

    if options.fsync {
        writer.sync_all().map_err(|e| Error::from_dest(dst, e))?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(src = %src.display(), dst = %dst.display(), bytes, "stream copy finished");

    Ok(bytes)
}

fn open_destination(dst: &Path, src_meta: &Metadata, options: &CopyOptions) -> io::Result<File> {
    let mut open = OpenOptions::new();
    open.write(true).create(true).truncate(true);

    #[cfg(unix)]
    if options.preserve_permissions {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        open.mode(src_meta.permissions().mode() & 0o7777);
    }
    #[cfg(not(unix))]
    let _ = (src_meta, options);

    open.open(dst)
}
