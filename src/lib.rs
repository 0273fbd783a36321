//! # copyfile-shim
//!
//! Single-file copy with exclusive-create and clone-hint flags, for hosts
//! that lack a native copy primitive with these semantics.
//!
//! ## Core Features
//!
//! - **Callback completion**: argument errors are returned at the call site;
//!   runtime outcomes are delivered to a callback exactly once
//! - **Exclusive create**: [`CopyFlags::EXCLUSIVE`] refuses to touch an existing destination
//! - **Clone flags**: [`CopyFlags::CLONE_HINT`] / [`CopyFlags::CLONE_FORCE`] request copy-on-write
//! - **Pluggable host primitive**: delegate to any [`PlatformCopy`], or run the stream fallback
//! - **Atomic native copy**: [`NativeCopy`] publishes via temp file + rename
//! - **Permission preserving**: the destination gets the source's mode
//! - **Structured errors**: every [`Error`] has a stable [`ErrorKind`] and code
//!
//! ## Quick Start
//!
//! ```no_run
//! use copyfile_shim::{copy_file_with_flags, CopyFlags, ErrorKind};
//! use std::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel();
//! copy_file_with_flags("config.toml", "config.toml.bak", CopyFlags::EXCLUSIVE, move |outcome| {
//!     let _ = tx.send(outcome);
//! })?;
//!
//! match rx.recv().expect("callback is always invoked") {
//!     Ok(()) => println!("backed up"),
//!     Err(e) if e.kind() == ErrorKind::AlreadyExists => println!("backup already present"),
//!     Err(e) => return Err(e),
//! }
//! # Ok::<(), copyfile_shim::Error>(())
//! ```
//!
//! ## Blocking API
//!
//! ```no_run
//! use copyfile_shim::{copy_file_sync, CopyFlags, CopyOptions};
//! use std::path::Path;
//!
//! let options = CopyOptions::default().with_fsync();
//! copy_file_sync(Path::new("a.bin"), Path::new("b.bin"), CopyFlags::CLONE_HINT, &options)?;
//! # Ok::<(), copyfile_shim::Error>(())
//! ```
//!
//! ## Host Primitive vs Fallback
//!
//! By default copies are delegated to [`NativeCopy`]. Calling
//! [`CopyOptions::without_platform`] (or [`CopyFileBuilder::fallback`])
//! selects the stream fallback instead:
//!
//! 1. with `EXCLUSIVE`, stat the destination; present means
//!    [`ErrorKind::AlreadyExists`], any error other than "not found" is
//!    returned as is
//! 2. stat the source for its mode, open both files, pipe the bytes
//!
//! The two steps are not atomic: a destination created between them is
//! overwritten. Clone flags are accepted and have no effect on the fallback.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] and [`CopyFlags`] |
//! | `reflink` | Copy-on-write clones on Btrfs/XFS/APFS |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod error;
mod flags;
mod options;

pub use builder::CopyFileBuilder;
pub use copy::{
    CopyRequest, NativeCopy, PlatformCopy, copy_file, copy_file_fallback, copy_file_sync,
    copy_file_with_flags,
};
pub use error::{Error, ErrorKind, Result};
pub use flags::{CopyFlags, constants};
pub use options::{CopyOptions, DEFAULT_BUFFER_SIZE};
