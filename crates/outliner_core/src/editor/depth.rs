//! Promote/demote: in-place depth rewrites of one subtree.
//!
//! The whole block shifts by the same delta, so the subtree keeps its shape.
//! Reported range is `[note, last descendant]`.

use crate::editor::blocks::subtree_end;
use crate::model::note::NoteId;
use crate::model::outline::{Outline, MAX_NOTE_DEPTH};
use crate::model::patch::Patch;

impl Outline {
    /// Moves a note one level up (depth - 1, floored at 0) with its subtree.
    pub fn promote_note(&mut self, note_id: NoteId) -> Patch {
        let Some(offset) = self.note_offset(note_id) else {
            return Patch::none();
        };
        let notes = self.notes_mut();
        if notes[offset].depth == 0 {
            return Patch::none();
        }

        let end = subtree_end(notes, offset);
        for note in &mut notes[offset..end] {
            note.promote();
        }
        notes[offset].make_modified();
        self.make_modified();
        Patch::change(offset, end - offset - 1)
    }

    /// Moves a note one level down (depth + 1) with its subtree.
    ///
    /// No-op when any note of the block is already at `MAX_NOTE_DEPTH`.
    pub fn demote_note(&mut self, note_id: NoteId) -> Patch {
        let Some(offset) = self.note_offset(note_id) else {
            return Patch::none();
        };
        let notes = self.notes_mut();
        let end = subtree_end(notes, offset);
        if notes[offset..end]
            .iter()
            .any(|note| note.depth >= MAX_NOTE_DEPTH)
        {
            return Patch::none();
        }

        for note in &mut notes[offset..end] {
            note.demote();
        }
        notes[offset].make_modified();
        self.make_modified();
        Patch::change(offset, end - offset - 1)
    }
}
