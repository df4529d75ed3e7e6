#![forbid(unsafe_code)]

//! Error model for the accordion stack.
//!
//! # Design Principles
//!
//! 1. **Fail fast on caller bugs**: an out-of-range ordinal is a precondition
//!    violation and surfaces immediately as [`AccordionError::IndexOutOfRange`].
//! 2. **Swallow stale callbacks**: platform observers deliver asynchronously and
//!    can race teardown. Those deliveries are reported as
//!    [`AccordionError::DetachedObserverUse`] so the controller can drop them
//!    without treating them as failures.
//! 3. **Clamp transient layout states**: negative viewports and empty registries
//!    are not errors at all; the geometry layer clamps them.

use std::fmt;

/// Errors produced by the section registry, geometry, and signal adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccordionError {
    /// A toggle or geometry query named an ordinal outside `[0, len)`.
    IndexOutOfRange {
        /// The offending ordinal.
        index: usize,
        /// Number of sections in the registry.
        len: usize,
    },
    /// A scroll or visibility signal arrived after its observer was stopped
    /// or detached.
    DetachedObserverUse {
        /// Which observer received the signal.
        observer: &'static str,
    },
}

/// Standard result type for foldline APIs.
pub type Result<T> = std::result::Result<T, AccordionError>;

impl AccordionError {
    /// Whether the error is a benign race that callers should ignore.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::DetachedObserverUse { .. })
    }

    /// Check `index` against `len`.
    #[inline]
    pub fn check_index(index: usize, len: usize) -> Result<usize> {
        if index < len {
            Ok(index)
        } else {
            Err(Self::IndexOutOfRange { index, len })
        }
    }
}

impl fmt::Display for AccordionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "section index {index} out of range (0..{len})")
            }
            Self::DetachedObserverUse { observer } => {
                write!(f, "{observer} signal received after detach")
            }
        }
    }
}

impl std::error::Error for AccordionError {}
