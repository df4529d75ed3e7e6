#![forbid(unsafe_code)]

//! Identity of the elements signal sources are attached to.

use std::fmt;

/// An element the platform reports viewport or scroll signals for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    /// The accordion's outer container.
    Root,
    /// The scrollable content area of the section with this ordinal.
    Content(usize),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("root"),
            Self::Content(ordinal) => write!(f, "content#{ordinal}"),
        }
    }
}
