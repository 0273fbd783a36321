//! Copy behavior flags.
//!
//! [`CopyFlags`] is the typed form of the flag bitmask. Callers that receive
//! flags as plain integers (for example from a config file or an FFI layer)
//! use the raw values in [`constants`] and go through
//! [`CopyFlags::from_raw`], which rejects negative values and any bit
//! outside [`constants::MAX_MASK`].
//!
//! # Example
//!
//! ```
//! use copyfile_shim::{constants, CopyFlags};
//!
//! let flags = CopyFlags::EXCLUSIVE | CopyFlags::CLONE_HINT;
//! assert_eq!(flags.bits(), 3);
//!
//! assert_eq!(CopyFlags::from_raw(constants::EXCLUSIVE), Some(CopyFlags::EXCLUSIVE));
//! assert_eq!(CopyFlags::from_raw(8), None);
//! assert_eq!(CopyFlags::from_raw(-1), None);
//! ```

bitflags::bitflags! {
    /// Flags accepted by the copy entry points.
    ///
    /// The values are bit-disjoint and combine with `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CopyFlags: u32 {
        /// Fail with [`ErrorKind::AlreadyExists`](crate::ErrorKind::AlreadyExists)
        /// if the destination exists.
        const EXCLUSIVE = 1;
        /// Prefer a copy-on-write clone; fall back to a byte copy.
        const CLONE_HINT = 2;
        /// Require a copy-on-write clone; fail if the filesystem cannot clone.
        const CLONE_FORCE = 4;
    }
}

/// Raw integer values of the flags.
pub mod constants {
    /// Raw value of [`CopyFlags::EXCLUSIVE`](super::CopyFlags::EXCLUSIVE).
    pub const EXCLUSIVE: i64 = 1;
    /// Raw value of [`CopyFlags::CLONE_HINT`](super::CopyFlags::CLONE_HINT).
    pub const CLONE_HINT: i64 = 2;
    /// Raw value of [`CopyFlags::CLONE_FORCE`](super::CopyFlags::CLONE_FORCE).
    pub const CLONE_FORCE: i64 = 4;
    /// Every recognized bit. Raw flags must lie in `0..=MAX_MASK`.
    pub const MAX_MASK: i64 = EXCLUSIVE | CLONE_HINT | CLONE_FORCE;
}

impl Default for CopyFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl CopyFlags {
    /// Convert a raw integer into flags.
    ///
    /// Returns `None` for negative values and for values above
    /// [`constants::MAX_MASK`].
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        if !(0..=constants::MAX_MASK).contains(&raw) {
            return None;
        }
        let bits = u32::try_from(raw).ok()?;
        Self::from_bits(bits)
    }

    /// Whether either clone flag is set.
    #[inline]
    pub(crate) fn wants_clone(self) -> bool {
        self.intersects(Self::CLONE_HINT | Self::CLONE_FORCE)
    }
}
