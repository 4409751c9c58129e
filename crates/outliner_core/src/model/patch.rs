//! Change descriptor for structural outline edits.
//!
//! # Responsibility
//! - Describe whether an operation changed an outline and which contiguous
//!   note range a view must repaint.
//!
//! # Invariants
//! - `start` and `count` are meaningful only when `diff != Diff::No`.
//! - The affected range is inclusive: `[start, start + count]`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

/// Kind of change reported by a structural operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diff {
    /// Nothing changed.
    No,
    /// Notes in range changed in place (e.g. depth), no reordering.
    Change,
    /// Notes in range were shuffled to different offsets.
    Move,
    /// Notes in range were removed from the outline.
    Delete,
}

impl Display for Diff {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::No => "no",
            Self::Change => "change",
            Self::Move => "move",
            Self::Delete => "delete",
        };
        f.write_str(value)
    }
}

/// Minimal-repaint descriptor returned by editor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub diff: Diff,
    /// First affected offset.
    pub start: usize,
    /// Number of affected notes after `start`; `0` means only `start`.
    pub count: usize,
}

impl Patch {
    /// No-op patch, `{No, 0, 0}`.
    pub const NONE: Patch = Patch {
        diff: Diff::No,
        start: 0,
        count: 0,
    };

    pub fn none() -> Self {
        Self::NONE
    }

    pub fn change(start: usize, count: usize) -> Self {
        Self {
            diff: Diff::Change,
            start,
            count,
        }
    }

    pub fn moved(start: usize, count: usize) -> Self {
        Self {
            diff: Diff::Move,
            start,
            count,
        }
    }

    pub fn deleted(start: usize, count: usize) -> Self {
        Self {
            diff: Diff::Delete,
            start,
            count,
        }
    }

    /// Returns whether the operation modified the outline.
    pub fn is_change(&self) -> bool {
        self.diff != Diff::No
    }

    /// Returns the inclusive offset range to repaint, if any.
    ///
    /// For `Diff::Delete` the range refers to offsets before removal.
    pub fn affected_range(&self) -> Option<RangeInclusive<usize>> {
        if self.is_change() {
            Some(self.start..=self.start + self.count)
        } else {
            None
        }
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::NONE
    }
}
