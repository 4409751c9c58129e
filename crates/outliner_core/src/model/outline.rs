//! Outline domain model.
//!
//! # Responsibility
//! - Own the ordered note sequence that encodes an outline hierarchy.
//! - Provide lookup, insertion, removal and hierarchy queries over it.
//!
//! # Invariants
//! - Subtree contiguity: the notes immediately following `notes[i]` with a
//!   greater depth are exactly the subtree of `notes[i]`.
//! - Siblings share a depth with no shallower note between them.
//! - Every held note has `outline_id == Some(self.id)`.
//!
//! Structural rewrites (promote, move, clone, refactor) live in
//! `crate::editor`.

use crate::editor::blocks::{parent, subtree_end, top_level_offsets};
use crate::model::note::{mangle_name, Note, NoteId};
use crate::model::patch::Patch;
use crate::model::{now_epoch_ms, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable outline identifier, used as lookup key.
pub type OutlineId = Uuid;

/// Deepest nesting level a note may reach.
pub const MAX_NOTE_DEPTH: u16 = 100;
/// Name given to outlines loaded without a title.
pub const DEFAULT_OUTLINE_NAME: &str = "Outline";
const COPY_NAME_PREFIX: &str = "Copy of ";

/// Ordered, depth-annotated sequence of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub id: OutlineId,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub modified_at: i64,
    pub read_at: i64,
    pub reads: u32,
    pub revision: u32,
    notes: Vec<Note>,
    /// Changed since last remembered.
    #[serde(skip)]
    dirty: bool,
}

impl Outline {
    /// Creates an empty outline with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            created_at: now,
            modified_at: now,
            read_at: now,
            reads: 1,
            revision: 1,
            notes: Vec::new(),
            dirty: false,
        }
    }

    /// Creates an empty outline with a caller-provided stable id.
    pub fn with_id(id: OutlineId, name: impl Into<String>) -> Result<Self, ValidationError> {
        if id.is_nil() {
            return Err(ValidationError::NilUuid);
        }
        let mut outline = Self::new(name);
        outline.id = id;
        Ok(outline)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Replaces all notes, adopting each of them.
    pub fn set_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;
        let id = self.id;
        for note in &mut self.notes {
            note.outline_id = Some(id);
        }
    }

    /// Appends one note.
    pub fn add_note(&mut self, mut note: Note) {
        note.outline_id = Some(self.id);
        self.notes.push(note);
    }

    /// Inserts one note at `offset`; offsets past the end append.
    pub fn insert_note(&mut self, offset: usize, note: Note) {
        self.insert_notes(offset, vec![note]);
    }

    /// Inserts a contiguous block at `offset`, preserving block order.
    ///
    /// Offsets past the end append.
    pub fn insert_notes(&mut self, offset: usize, notes: Vec<Note>) {
        let at = offset.min(self.notes.len());
        let id = self.id;
        self.notes.splice(
            at..at,
            notes.into_iter().map(|mut note| {
                note.outline_id = Some(id);
                note
            }),
        );
    }

    pub fn note_offset(&self, note_id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == note_id)
    }

    pub fn contains_note(&self, note_id: NoteId) -> bool {
        self.note_offset(note_id).is_some()
    }

    pub fn note(&self, note_id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == note_id)
    }

    pub fn note_mut(&mut self, note_id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == note_id)
    }

    pub fn note_by_name(&self, name: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.name == name)
    }

    /// Finds a note by the link anchor form of its name.
    pub fn note_by_mangled_name(&self, mangled_name: &str) -> Option<&Note> {
        let wanted = mangle_name(mangled_name);
        self.notes
            .iter()
            .find(|note| note.mangled_name() == wanted)
    }

    /// Returns all descendants of a note (its subtree without the root).
    ///
    /// Empty when the note has no children or is not in this outline.
    pub fn note_children(&self, note_id: NoteId) -> &[Note] {
        match self.note_offset(note_id) {
            Some(offset) => &self.notes[offset + 1..subtree_end(&self.notes, offset)],
            None => &[],
        }
    }

    /// Returns direct children of `parent`, or of the outline for `None`.
    ///
    /// A child is direct regardless of the depth gap to its parent: with
    /// `[a(2), b(1), c(2), d(0)]` the outline's direct children are `a`,
    /// `b` and `d`.
    pub fn direct_children(&self, parent_id: Option<NoteId>) -> Vec<&Note> {
        let scope = match parent_id {
            None => &self.notes[..],
            Some(parent_id) => match self.note_offset(parent_id) {
                Some(offset) => &self.notes[offset + 1..subtree_end(&self.notes, offset)],
                None => return Vec::new(),
            },
        };
        top_level_offsets(scope)
            .into_iter()
            .map(|offset| &scope[offset])
            .collect()
    }

    /// Returns the parent note, `None` for top-level or unknown notes.
    pub fn parent_note(&self, note_id: NoteId) -> Option<&Note> {
        let offset = self.note_offset(note_id)?;
        parent(&self.notes, offset).map(|index| &self.notes[index])
    }

    /// Returns ancestor ids ordered from the top-level ancestor down to the
    /// immediate parent.
    pub fn path_to_root(&self, note_id: NoteId) -> Vec<NoteId> {
        let mut path = Vec::new();
        let mut cursor = self.note_offset(note_id);
        while let Some(offset) = cursor {
            cursor = parent(&self.notes, offset);
            if let Some(parent_offset) = cursor {
                path.push(self.notes[parent_offset].id);
            }
        }
        path.reverse();
        path
    }

    /// Detaches a note with its subtree and returns the block.
    ///
    /// Back-references of the returned notes are left untouched.
    pub fn remove_note(&mut self, note_id: NoteId) -> Option<Vec<Note>> {
        let offset = self.note_offset(note_id)?;
        let end = subtree_end(&self.notes, offset);
        Some(self.notes.drain(offset..end).collect())
    }

    /// Deletes a note with its subtree.
    ///
    /// The patch range refers to offsets before removal.
    pub fn forget_note(&mut self, note_id: NoteId) -> Patch {
        let Some(start) = self.note_offset(note_id) else {
            return Patch::none();
        };
        let end = subtree_end(&self.notes, start);
        self.notes.drain(start..end);
        self.make_modified();
        Patch::deleted(start, end - start - 1)
    }

    /// Records a write on the outline.
    pub fn make_modified(&mut self) {
        self.modified_at = now_epoch_ms().max(self.modified_at);
        self.revision = self.revision.saturating_add(1);
        if self.revision > self.reads {
            self.reads = self.revision;
        }
        self.dirty = true;
    }

    /// Records a read on the outline.
    pub fn record_read(&mut self) {
        self.read_at = now_epoch_ms().max(self.read_at);
        self.reads = self.reads.saturating_add(1);
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Fills missing metadata and repairs inconsistent counters for the
    /// outline and every note.
    ///
    /// `fallback_modified` is typically the storage modification time.
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
        if self.name.trim().is_empty() {
            self.name = DEFAULT_OUTLINE_NAME.to_string();
        }

        let modified_at = self.modified_at;
        let id = self.id;
        for note in &mut self.notes {
            note.outline_id = Some(id);
            note.complete_properties(modified_at);
            if note.depth > MAX_NOTE_DEPTH {
                note.depth = MAX_NOTE_DEPTH;
            }
        }
    }

    /// Creates an independent copy named `Copy of <name>`.
    ///
    /// Every note is cloned with a fresh id and reset counters.
    pub fn duplicate(&self) -> Outline {
        let mut copy = Outline::new(format!("{COPY_NAME_PREFIX}{}", self.name));
        copy.description = self.description.clone();
        copy.tags = self.tags.clone();
        let copy_id = copy.id;
        copy.notes = self
            .notes
            .iter()
            .map(|note| {
                let mut cloned = note.clone();
                cloned.reset_as_clone(Some(copy_id));
                cloned
            })
            .collect();
        copy.dirty = true;
        copy
    }

    /// Validates the outline record and every held note.
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
        self.notes.iter().try_for_each(Note::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::{Outline, MAX_NOTE_DEPTH};
    use crate::model::note::Note;
    use crate::model::patch::Patch;

    /// Builds `[1, 2(1), 3(1), 33(2), 4]`.
    fn sample() -> Outline {
        let mut outline = Outline::new("sample");
        for (name, depth) in [("1", 0), ("2", 1), ("3", 1), ("33", 2), ("4", 0)] {
            outline.add_note(Note::new(name, depth));
        }
        outline
    }

    fn names(outline: &Outline) -> Vec<&str> {
        outline.notes().iter().map(|n| n.name.as_str()).collect()
    }

    fn id_of(outline: &Outline, name: &str) -> uuid::Uuid {
        outline.note_by_name(name).unwrap().id
    }

    #[test]
    fn add_and_insert_adopt_notes() {
        let mut outline = sample();
        outline.insert_note(1, Note::new("new", 1));
        outline.insert_note(99, Note::new("tail", 0));

        assert_eq!(names(&outline), vec!["1", "new", "2", "3", "33", "4", "tail"]);
        assert!(outline
            .notes()
            .iter()
            .all(|n| n.outline_id == Some(outline.id)));
    }

    #[test]
    fn note_children_is_contiguous_subtree() {
        let outline = sample();
        let children: Vec<&str> = outline
            .note_children(id_of(&outline, "1"))
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(children, vec!["2", "3", "33"]);
        assert!(outline.note_children(id_of(&outline, "4")).is_empty());
    }

    #[test]
    fn direct_children_of_outline_and_note() {
        let outline = sample();
        let top: Vec<&str> = outline
            .direct_children(None)
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(top, vec!["1", "4"]);

        let under_first: Vec<&str> = outline
            .direct_children(Some(id_of(&outline, "1")))
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(under_first, vec!["2", "3"]);
    }

    #[test]
    fn path_to_root_lists_ancestors_top_down() {
        let outline = sample();
        let path = outline.path_to_root(id_of(&outline, "33"));
        assert_eq!(path, vec![id_of(&outline, "1"), id_of(&outline, "3")]);
        assert!(outline.path_to_root(id_of(&outline, "4")).is_empty());
        assert_eq!(
            outline.parent_note(id_of(&outline, "33")).map(|n| n.name.as_str()),
            Some("3")
        );
    }

    #[test]
    fn forget_note_reports_deleted_range() {
        let mut outline = sample();
        let patch = outline.forget_note(id_of(&outline, "3"));

        assert_eq!(patch, Patch::deleted(2, 1));
        assert_eq!(names(&outline), vec!["1", "2", "4"]);
        assert_eq!(outline.forget_note(uuid::Uuid::new_v4()), Patch::none());
    }

    #[test]
    fn note_by_mangled_name_matches_anchor() {
        let mut outline = Outline::new("anchors");
        outline.add_note(Note::new("Getting Started!", 0));
        let found = outline.note_by_mangled_name("getting-started");
        assert_eq!(found.map(|n| n.name.as_str()), Some("Getting Started!"));
    }

    #[test]
    fn duplicate_copies_structure_with_fresh_identity() {
        let mut outline = sample();
        outline.notes_mut()[0].reads = 9;
        outline.notes_mut()[0].revision = 7;

        let copy = outline.duplicate();

        assert_eq!(copy.name, "Copy of sample");
        assert_ne!(copy.id, outline.id);
        assert_eq!(names(&copy), names(&outline));
        for (original, cloned) in outline.notes().iter().zip(copy.notes()) {
            assert_ne!(original.id, cloned.id);
            assert_eq!(original.depth, cloned.depth);
            assert_eq!(cloned.outline_id, Some(copy.id));
            assert_eq!((cloned.reads, cloned.revision), (1, 1));
        }
        assert!(copy.modified_at >= copy.created_at);
        assert!(copy.read_at >= copy.modified_at);
    }

    #[test]
    fn complete_properties_clamps_depth_and_fixes_counters() {
        let mut outline = sample();
        outline.reads = 0;
        outline.revision = 3;
        outline.notes_mut()[4].depth = MAX_NOTE_DEPTH + 5;
        outline.notes_mut()[4].revision = 4;
        outline.notes_mut()[4].reads = 1;

        outline.complete_properties(1);

        assert_eq!(outline.reads, 3);
        assert_eq!(outline.notes()[4].depth, MAX_NOTE_DEPTH);
        assert_eq!(outline.notes()[4].reads, 4);
        assert!(outline.validate().is_ok());
    }
}
