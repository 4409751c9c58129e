//! Note domain model.
//!
//! # Responsibility
//! - Define the single entry of an outline: content payload, nesting depth
//!   and usage counters.
//! - Provide lifecycle helpers used by the structural editor and loaders.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `revision <= reads` holds after `complete_properties`.
//! - `outline_id` is a lookup key of the holding outline, not an owner.

use crate::model::outline::{OutlineId, MAX_NOTE_DEPTH};
use crate::model::{now_epoch_ms, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static NON_ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid anchor regex"));

/// Stable note identifier.
pub type NoteId = Uuid;

/// Name given to notes loaded without a title.
pub const DEFAULT_NOTE_NAME: &str = "Note";
/// Default note type label.
pub const DEFAULT_NOTE_KIND: &str = "Note";

/// One entry of an outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Outline currently holding this note. `None` until adopted.
    pub outline_id: Option<OutlineId>,
    pub name: String,
    /// Nesting level; top-level notes have depth 0.
    pub depth: u16,
    /// Serialized as `type` to match heading metadata naming.
    #[serde(rename = "type")]
    pub kind: String,
    /// Markdown body.
    pub description: String,
    pub tags: Vec<String>,
    /// Percent done, `0..=100`.
    pub progress: u8,
    /// Unix epoch milliseconds.
    pub deadline: Option<i64>,
    pub created_at: i64,
    pub modified_at: i64,
    pub read_at: i64,
    pub reads: u32,
    pub revision: u32,
}

impl Note {
    /// Creates a note with a generated id and fresh counters.
    pub fn new(name: impl Into<String>, depth: u16) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            outline_id: None,
            name: name.into(),
            depth,
            kind: DEFAULT_NOTE_KIND.to_string(),
            description: String::new(),
            tags: Vec::new(),
            progress: 0,
            deadline: None,
            created_at: now,
            modified_at: now,
            read_at: now,
            reads: 1,
            revision: 1,
        }
    }

    /// Creates a note with a caller-provided stable id.
    ///
    /// Used by load/import paths where identity already exists.
    pub fn with_id(
        id: NoteId,
        name: impl Into<String>,
        depth: u16,
    ) -> Result<Self, ValidationError> {
        if id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        let mut note = Self::new(name, depth);
        note.id = id;
        Ok(note)
    }

    /// Decreases depth by one, floored at 0.
    pub fn promote(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Increases depth by one, capped at `MAX_NOTE_DEPTH`.
    pub fn demote(&mut self) {
        self.depth = self.depth.saturating_add(1).min(MAX_NOTE_DEPTH);
    }

    /// Records a write: bumps `revision` and the modification time.
    ///
    /// A write implies a read, so `reads` is raised when needed.
    pub fn make_modified(&mut self) {
        self.modified_at = now_epoch_ms().max(self.modified_at);
        self.revision = self.revision.saturating_add(1);
        if self.revision > self.reads {
            self.reads = self.revision;
        }
    }

    /// Records a read.
    pub fn record_read(&mut self) {
        self.read_at = now_epoch_ms().max(self.read_at);
        self.reads = self.reads.saturating_add(1);
    }

    /// Fills missing timestamps/counters and repairs inconsistent ones.
    ///
    /// `fallback_modified` is the holder's modification time, used when the
    /// note carries none.
    pub fn complete_properties(&mut self, fallback_modified: i64) {
        if self.created_at == 0 {
            if self.modified_at != 0 {
                self.created_at = self.modified_at;
            } else {
                self.created_at = fallback_modified;
                self.modified_at = fallback_modified;
            }
        } else if self.modified_at == 0 {
            self.modified_at = fallback_modified.max(self.created_at);
        }
        if self.created_at > self.modified_at {
            self.created_at = self.modified_at;
        }
        if self.read_at < self.modified_at {
            self.read_at = self.modified_at;
        }

        if self.revision == 0 {
            if self.reads == 0 {
                self.reads = 1;
            }
            self.revision = self.reads;
        }
        if self.reads < self.revision {
            self.reads = self.revision;
        }

        if self.progress > 100 {
            self.progress = 100;
        }
        if self.name.trim().is_empty() {
            self.name = DEFAULT_NOTE_NAME.to_string();
        }
    }

    /// Turns a copied note into an independent clone held by `outline_id`.
    ///
    /// Content, tags, type and depth are kept; identity, counters and
    /// timestamps are reset.
    pub(crate) fn reset_as_clone(&mut self, outline_id: Option<OutlineId>) {
        let now = now_epoch_ms();
        self.id = Uuid::new_v4();
        self.outline_id = outline_id;
        self.created_at = now;
        self.modified_at = now;
        self.read_at = now;
        self.reads = 1;
        self.revision = 1;
    }

    /// Returns the link anchor form of the name.
    ///
    /// Lowercase, with every run of non-alphanumeric characters replaced by
    /// a single `-`, trimmed of leading/trailing dashes.
    pub fn mangled_name(&self) -> String {
        mangle_name(&self.name)
    }

    /// Validates record consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        if self.revision > self.reads {
            return Err(ValidationError::RevisionExceedsReads {
                revision: self.revision,
                reads: self.reads,
            });
        }
        if self.progress > 100 {
            return Err(ValidationError::ProgressOutOfRange(self.progress));
        }
        if self.depth > MAX_NOTE_DEPTH {
            return Err(ValidationError::DepthOutOfRange(self.depth));
        }
        Ok(())
    }
}

/// Converts a display name into its link anchor form.
pub fn mangle_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    NON_ANCHOR_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
