//! Host copy primitives.
//!
//! A [`PlatformCopy`] is a complete single-file copy operation that honors
//! [`CopyFlags`] on its own. When [`CopyOptions::platform`] holds one, the
//! entry points delegate to it and skip the stream fallback entirely.
//!
//! [`NativeCopy`] is the primitive this crate ships. It writes into a temp
//! file next to the destination and publishes it with a rename, so
//! exclusive-create is atomic and no half-written destination is ever
//! visible.

use crate::error::{Error, Result};
use crate::flags::CopyFlags;
use crate::options::CopyOptions;
use std::fmt;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

use super::reflink;
use super::utils::{copy_file_contents, source_metadata, temp_dir_for};

/// A host-provided copy primitive.
///
/// Implementations must perform the whole copy, including the
/// `EXCLUSIVE` check, and report failures with the same [`Error`] shapes
/// the fallback uses: [`Error::NotFound`] for a missing source,
/// [`Error::AlreadyExists`] for an exclusive conflict, [`Error::Io`]
/// otherwise.
///
/// # Example
///
/// ```
/// use copyfile_shim::{CopyFlags, CopyOptions, PlatformCopy, Result};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct StdCopy;
///
/// impl PlatformCopy for StdCopy {
///     fn copy_file(
///         &self,
///         src: &Path,
///         dst: &Path,
///         _flags: CopyFlags,
///         _options: &CopyOptions,
///     ) -> Result<()> {
///         std::fs::copy(src, dst).map(drop).map_err(|source| copyfile_shim::Error::Io {
///             path: src.to_path_buf(),
///             dest: Some(dst.to_path_buf()),
///             source,
///         })
///     }
/// }
///
/// let options = CopyOptions::default().with_platform(Arc::new(StdCopy));
/// ```
pub trait PlatformCopy: fmt::Debug + Send + Sync {
    /// Copy `src` to `dst` honoring `flags`.
    fn copy_file(&self, src: &Path, dst: &Path, flags: CopyFlags, options: &CopyOptions)
    -> Result<()>;
}

/// Atomic copy built on temp file + rename.
///
/// | Flag | Behavior |
/// |------|----------|
/// | none | `persist` replaces the destination atomically |
/// | `EXCLUSIVE` | `persist_noclobber` fails if the destination appeared, even mid-copy |
/// | `CLONE_HINT` | reflink when possible, byte copy otherwise (with a warning) |
/// | `CLONE_FORCE` | reflink or fail with [`io::ErrorKind::Unsupported`] |
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCopy;

impl PlatformCopy for NativeCopy {
    fn copy_file(
        &self,
        src: &Path,
        dst: &Path,
        flags: CopyFlags,
        options: &CopyOptions,
    ) -> Result<()> {
        let src_meta = source_metadata(src, dst)?;
        let exclusive = flags.contains(CopyFlags::EXCLUSIVE);

        // Early out only; persist_noclobber below is what makes it atomic
        if exclusive && fs::symlink_metadata(dst).is_ok() {
            return Err(Error::already_exists(src, dst));
        }

        let dir = temp_dir_for(dst);

        if flags.wants_clone() {
            match tempfile::Builder::new().make_in(dir, |path| reflink::clone_file(src, path, dir)) {
                Ok(cloned) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(src = %src.display(), dst = %dst.display(), "cloned via reflink");
                    return publish(cloned, src, dst, exclusive, &src_meta, options);
                }
                Err(e) if flags.contains(CopyFlags::CLONE_FORCE) => {
                    return Err(clone_forced_error(src, dst, e));
                }
                Err(e) => options.warn(&format!(
                    "Clone of {} failed ({}), falling back to byte copy",
                    src.display(),
                    e
                )),
            }
        }

        let src_file = File::open(src).map_err(|e| Error::from_source(src, dst, e))?;
        let temp = new_temp(dir, options).map_err(|e| Error::from_dest(dst, e))?;

        let _bytes = copy_file_contents(&src_file, temp.as_file(), src_meta.len())
            .map_err(|e| Error::from_dest(dst, e))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(src = %src.display(), dst = %dst.display(), bytes = _bytes, "copied contents");

        publish(temp, src, dst, exclusive, &src_meta, options)
    }
}

/// Temp file in `dir`, created with the default new-file mode when the
/// source permissions will not be applied afterwards.
fn new_temp(dir: &Path, options: &CopyOptions) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    if !options.preserve_permissions {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    #[cfg(not(unix))]
    let _ = options;
    builder.tempfile_in(dir)
}

/// Apply permissions, sync if asked, then rename the temp file onto `dst`.
///
/// A reflinked temp file carries no open handle, so the sync reopens it by
/// path for both kinds of temp file.
fn publish<F>(
    temp: NamedTempFile<F>,
    src: &Path,
    dst: &Path,
    exclusive: bool,
    src_meta: &Metadata,
    options: &CopyOptions,
) -> Result<()> {
    if options.preserve_permissions {
        fs::set_permissions(temp.path(), src_meta.permissions())
            .map_err(|e| Error::from_dest(dst, e))?;
    }

    if options.fsync {
        OpenOptions::new()
            .write(true)
            .open(temp.path())
            .and_then(|file| file.sync_all())
            .map_err(|e| Error::from_dest(dst, e))?;
    }

    if exclusive {
        match temp.persist_noclobber(dst) {
            Ok(_) => Ok(()),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(Error::already_exists(src, dst))
            }
            Err(e) => Err(Error::from_dest(dst, e.error)),
        }
    } else {
        temp.persist(dst)
            .map(drop)
            .map_err(|e| Error::from_dest(dst, e.error))
    }
}

fn clone_forced_error(src: &Path, dst: &Path, error: io::Error) -> Error {
    let source = if error.kind() == io::ErrorKind::Unsupported {
        io::Error::new(
            io::ErrorKind::Unsupported,
            format!(
                "ENOTSUP: operation not supported, copyfile '{}' -> '{}'",
                src.display(),
                dst.display()
            ),
        )
    } else {
        error
    };
    Error::Io {
        path: src.to_path_buf(),
        dest: Some(dst.to_path_buf()),
        source,
    }
}
