//! Error types for copyfile-shim.
//!
//! This module provides the [`Error`] enum describing every way a copy can
//! fail, the [`ErrorKind`] discriminant callers branch on, and the
//! [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors | Signaled |
//! |----------|--------|----------|
//! | Arguments | [`Error::InvalidCallback`], [`Error::InvalidArgumentType`], [`Error::InvalidFlags`] | returned synchronously by the entry point |
//! | Runtime | [`Error::NotFound`], [`Error::AlreadyExists`], [`Error::Io`] | delivered to the completion callback |
//!
//! Argument errors are programming mistakes and surface at the call site.
//! Runtime errors are environmental and always go through the callback,
//! exactly once.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for copyfile-shim operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable discriminant of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Completion callback missing.
    InvalidCallback,
    /// Source or destination is not a usable path.
    InvalidArgumentType,
    /// Flags outside `0..=MAX_MASK`.
    InvalidFlags,
    /// Source file absent at transfer time.
    NotFound,
    /// Destination present while `EXCLUSIVE` was requested.
    AlreadyExists,
    /// Any other stat, read or write failure.
    Io,
}

impl ErrorKind {
    /// Short code for programmatic matching, e.g. `"EEXIST"`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidCallback => "ERR_INVALID_CALLBACK",
            ErrorKind::InvalidArgumentType => "ERR_INVALID_ARG_TYPE",
            ErrorKind::InvalidFlags => "EINVAL",
            ErrorKind::NotFound => "ENOENT",
            ErrorKind::AlreadyExists => "EEXIST",
            ErrorKind::Io => "EIO",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors that can occur during a copy.
///
/// Runtime variants carry the source path as `path` and the destination as
/// `dest` where both are known. The wrapped [`io::Error`] of
/// [`Error::NotFound`] and [`Error::Io`] is reachable through
/// [`std::error::Error::source`] and [`Error::io_error`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The completion callback was not provided
    #[error("The \"callback\" argument must be of type function")]
    InvalidCallback,

    /// A path argument was missing or empty
    #[error("The \"{name}\" argument must be a non-empty path. Received {received}")]
    InvalidArgumentType {
        /// Argument name: `"src"` or `"dest"`
        name: &'static str,
        /// What was received instead
        received: &'static str,
    },

    /// Flags outside the recognized mask
    #[error("EINVAL: invalid argument, copyfile -> '{}'", .dest.display())]
    InvalidFlags {
        /// The rejected raw value
        flags: i64,
        /// Destination path as passed by the caller
        dest: PathBuf,
    },

    /// Source file does not exist
    #[error("ENOENT: no such file or directory, copyfile '{}' -> '{}'", .path.display(), .dest.display())]
    NotFound {
        /// Source path
        path: PathBuf,
        /// Destination path
        dest: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Destination exists and `EXCLUSIVE` was requested
    #[error("EEXIST: file already exists, copyfile '{}' -> '{}'", .path.display(), .dest.display())]
    AlreadyExists {
        /// Source path
        path: PathBuf,
        /// Destination path
        dest: PathBuf,
    },

    /// Any other IO failure, reported verbatim
    #[error("{source}")]
    Io {
        /// Path the failing operation touched
        path: PathBuf,
        /// Destination path, when the failure belongs to a copy pair
        dest: Option<PathBuf>,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// The stable kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCallback => ErrorKind::InvalidCallback,
            Error::InvalidArgumentType { .. } => ErrorKind::InvalidArgumentType,
            Error::InvalidFlags { .. } => ErrorKind::InvalidFlags,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// Shorthand for `self.kind().code()`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// The path the error is about, if any.
    ///
    /// For copy failures this is the source path, except for [`Error::Io`]
    /// where it is whichever path the failing operation touched.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::NotFound { path, .. }
            | Error::AlreadyExists { path, .. }
            | Error::Io { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The destination path, if the error carries one.
    #[must_use]
    pub fn dest(&self) -> Option<&Path> {
        match self {
            Error::InvalidFlags { dest, .. }
            | Error::NotFound { dest, .. }
            | Error::AlreadyExists { dest, .. } => Some(dest),
            Error::Io { dest, .. } => dest.as_deref(),
            _ => None,
        }
    }

    /// The wrapped IO error, with its original [`io::ErrorKind`].
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Error::NotFound { source, .. } | Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether this is an argument error raised at the call site.
    #[must_use]
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidCallback | ErrorKind::InvalidArgumentType | ErrorKind::InvalidFlags
        )
    }

    /// Classify an IO failure on the source side of a copy.
    ///
    /// A missing source becomes [`Error::NotFound`]; everything else stays
    /// an [`Error::Io`] about the source.
    pub(crate) fn from_source(src: &Path, dst: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound {
                path: src.to_path_buf(),
                dest: dst.to_path_buf(),
                source,
            }
        } else {
            Error::Io {
                path: src.to_path_buf(),
                dest: Some(dst.to_path_buf()),
                source,
            }
        }
    }

    /// An IO failure on the destination side of a copy.
    pub(crate) fn from_dest(dst: &Path, source: io::Error) -> Self {
        Error::Io {
            path: dst.to_path_buf(),
            dest: None,
            source,
        }
    }

    pub(crate) fn already_exists(src: &Path, dst: &Path) -> Self {
        Error::AlreadyExists {
            path: src.to_path_buf(),
            dest: dst.to_path_buf(),
        }
    }
}
