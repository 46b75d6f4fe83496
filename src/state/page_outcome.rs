/// Per-page outcome definitions
///
/// Every claimed frontier entry ends in exactly one of these outcomes.
use crate::MirrorError;
use std::fmt;
use std::path::PathBuf;

/// Why a page was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Skip-existing mode is on and the output file is already present
    AlreadyExists,

    /// The converted page carries no real content beyond its title
    NoContent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already exists"),
            Self::NoContent => write!(f, "no content"),
        }
    }
}

/// Final outcome of processing one page
#[derive(Debug)]
pub enum PageOutcome {
    /// Markdown was written to this path (relative to the output root)
    Downloaded { path: PathBuf },

    /// The page was deliberately not written
    Skipped(SkipReason),

    /// A per-page step failed; the run continues
    Failed(MirrorError),
}

impl From<MirrorError> for PageOutcome {
    fn from(error: MirrorError) -> Self {
        Self::Failed(error)
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloaded { path } => write!(f, "saved {}", path.display()),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Failed(error) => write!(f, "failed: {}", error),
        }
    }
}
