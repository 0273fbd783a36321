//! Copy-on-write clone support.
//!
//! [`clone_file`] is the single entry used by the host primitive for the
//! `CLONE_HINT` and `CLONE_FORCE` flags. It returns
//! [`io::ErrorKind::Unsupported`] whenever a clone cannot be attempted:
//! the `reflink` feature is off, the platform has no clone syscall, or the
//! destination filesystem is known not to support it.

use std::io;
use std::path::Path;

#[cfg(all(feature = "reflink", target_os = "linux"))]
mod platform {
    use std::collections::HashMap;
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::fs::MetadataExt;
    use std::path::Path;
    use std::sync::{Mutex, OnceLock};

    // From /usr/include/linux/magic.h. XFS also needs reflink=1 at mkfs time,
    // which the clone attempt itself reveals.
    const BTRFS_SUPER_MAGIC: i64 = 0x9123_683E;
    const XFS_SUPER_MAGIC: i64 = 0x5846_5342;

    // device id -> filesystem can clone
    fn cache() -> &'static Mutex<HashMap<u64, bool>> {
        static CACHE: OnceLock<Mutex<HashMap<u64, bool>>> = OnceLock::new();
        CACHE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    pub fn supports_reflink(dir: &Path) -> bool {
        let Ok(dev) = dir.metadata().map(|m| m.dev()) else {
            return false;
        };

        if let Some(&known) = cache()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&dev)
        {
            return known;
        }

        let supported = statfs_magic(dir)
            .is_some_and(|magic| magic == BTRFS_SUPER_MAGIC || magic == XFS_SUPER_MAGIC);
        cache()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(dev, supported);
        supported
    }

    fn statfs_magic(dir: &Path) -> Option<i64> {
        let c_path = CString::new(dir.as_os_str().as_bytes()).ok()?;
        // SAFETY: statfs only writes into the zeroed buffer we own.
        let mut buf: libc::statfs = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::statfs(c_path.as_ptr(), &mut buf) };
        // f_type is not i64 on every target
        #[allow(clippy::unnecessary_cast)]
        let magic = buf.f_type as i64;
        (rc == 0).then_some(magic)
    }
}

#[cfg(all(feature = "reflink", target_os = "macos"))]
mod platform {
    use std::path::Path;

    /// APFS is the default on supported macOS releases; a failed clonefile
    /// covers the exceptions.
    pub fn supports_reflink(_dir: &Path) -> bool {
        true
    }
}

/// Clone `src` to the not-yet-existing path `dst`.
///
/// `dir` is the directory `dst` will live in, used for capability
/// detection.
#[cfg(all(feature = "reflink", any(target_os = "linux", target_os = "macos")))]
pub(crate) fn clone_file(src: &Path, dst: &Path, dir: &Path) -> io::Result<()> {
    if !platform::supports_reflink(dir) {
        return Err(unsupported());
    }
    reflink_copy::reflink(src, dst)
}

#[cfg(not(all(feature = "reflink", any(target_os = "linux", target_os = "macos"))))]
pub(crate) fn clone_file(_src: &Path, _dst: &Path, _dir: &Path) -> io::Result<()> {
    Err(unsupported())
}

fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "copy-on-write clone not supported here",
    )
}
