//! # Error Taxonomy
//!
//! Every failure the crate reports is a [`PackError`] carried inside an
//! `eyre::Report`. Callers that need to branch on the category downcast:
//!
//! ```ignore
//! match manager.put(slot, &record) {
//!     Err(e) if e.downcast_ref::<PackError>().map(PackError::kind)
//!         == Some(ErrorKind::OutOfBounds) => { /* ... */ }
//!     other => other?,
//! }
//! ```
//!
//! | Kind | Raised by |
//! |------|-----------|
//! | `Configuration` | schema compilation, store sizing |
//! | `OutOfBounds` | slot index or write past the end of the store |
//! | `TypeMismatch` | value type differs from the compiled schema |
//! | `Capacity` | arena deque is full |
//! | `Empty` | remove/get on an empty deque |
//! | `InvalidArgument` | null payload, wrong array/string length, negative address |
//! | `ConcurrentModification` | cursor used after a structural change |

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    OutOfBounds,
    TypeMismatch,
    Capacity,
    Empty,
    InvalidArgument,
    ConcurrentModification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    /// Bad record declaration or store sizing request.
    Configuration(String),
    /// Index outside `[0, limit)`.
    OutOfBounds { index: usize, limit: usize },
    /// A value did not have the type the schema was compiled for.
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },
    /// The arena deque has no free slot left.
    Capacity { capacity: usize },
    /// The collection holds no elements.
    Empty,
    /// Rejected argument, reported before anything is written.
    InvalidArgument(String),
    /// The collection changed after a cursor captured its generation.
    ConcurrentModification { expected: u64, actual: u64 },
}

impl PackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackError::Configuration(_) => ErrorKind::Configuration,
            PackError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            PackError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            PackError::Capacity { .. } => ErrorKind::Capacity,
            PackError::Empty => ErrorKind::Empty,
            PackError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PackError::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> eyre::Report {
        PackError::Configuration(msg.into()).into()
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> eyre::Report {
        PackError::InvalidArgument(msg.into()).into()
    }
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            PackError::OutOfBounds { index, limit } => {
                write!(f, "index {} out of bounds (limit {})", index, limit)
            }
            PackError::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {}, got {}", expected, actual)
            }
            PackError::Capacity { capacity } => {
                write!(f, "predefined storage full ({} slots)", capacity)
            }
            PackError::Empty => write!(f, "collection is empty"),
            PackError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            PackError::ConcurrentModification { expected, actual } => write!(
                f,
                "concurrent modification: generation {} changed to {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for PackError {}

/// Category of a report, if it carries a [`PackError`].
pub fn error_kind(report: &eyre::Report) -> Option<ErrorKind> {
    report.downcast_ref::<PackError>().map(PackError::kind)
}
