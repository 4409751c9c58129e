//! Outline domain model.
//!
//! # Responsibility
//! - Define the note/outline records shared by the editor, repositories and
//!   the orchestration service.
//! - Define the `Patch` change descriptor handed to view layers.
//!
//! # Invariants
//! - Every note and outline is identified by a stable `Uuid`.
//! - Hierarchy is encoded only by note order plus per-note `depth`.
//! - A note refers to its outline by id, never by ownership.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod note;
pub mod outline;
pub mod patch;

/// Validation failures for note and outline records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nil UUID is reserved and cannot identify a record.
    NilUuid,
    /// Write counter is ahead of read counter.
    RevisionExceedsReads { revision: u32, reads: u32 },
    /// Progress must stay within `0..=100`.
    ProgressOutOfRange(u8),
    /// Depth is above `MAX_NOTE_DEPTH`.
    DepthOutOfRange(u16),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "uuid must not be nil"),
            Self::RevisionExceedsReads { revision, reads } => {
                write!(f, "revision {revision} exceeds reads {reads}")
            }
            Self::ProgressOutOfRange(value) => {
                write!(f, "progress {value} is outside 0..=100")
            }
            Self::DepthOutOfRange(depth) => write!(
                f,
                "depth {depth} exceeds maximum {}",
                outline::MAX_NOTE_DEPTH
            ),
        }
    }
}

impl Error for ValidationError {}

/// Returns current wall clock time in Unix epoch milliseconds.
///
/// Falls back to `0` when the clock is before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
