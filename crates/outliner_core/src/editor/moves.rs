//! Sibling reordering: move up/down and move to first/last position.
//!
//! A move never changes depths. Each operation swaps or rotates whole
//! subtree blocks, so every block keeps its internal order. The patch spans
//! from the lowest to the highest offset touched by the rotation.

use crate::editor::blocks::{
    first_sibling, last_sibling, next_sibling, previous_sibling, subtree_end,
};
use crate::model::note::NoteId;
use crate::model::outline::Outline;
use crate::model::patch::Patch;

impl Outline {
    /// Swaps a note's subtree with the previous sibling's subtree.
    pub fn move_note_up(&mut self, note_id: NoteId) -> Patch {
        let Some(offset) = self.note_offset(note_id) else {
            return Patch::none();
        };
        match previous_sibling(self.notes(), offset) {
            Some(sibling) => self.rotate_block_to(offset, sibling),
            None => Patch::none(),
        }
    }

    /// Swaps a note's subtree with the next sibling's subtree.
    pub fn move_note_down(&mut self, note_id: NoteId) -> Patch {
        let Some(offset) = self.note_offset(note_id) else {
            return Patch::none();
        };
        match next_sibling(self.notes(), offset) {
            Some(sibling) => self.rotate_block_past(offset, sibling),
            None => Patch::none(),
        }
    }

    /// Makes a note the first child of its current parent.
    pub fn move_note_to_first(&mut self, note_id: NoteId) -> Patch {
        let Some(offset) = self.note_offset(note_id) else {
            return Patch::none();
        };
        let first = first_sibling(self.notes(), offset);
        if first == offset {
            return Patch::none();
        }
        self.rotate_block_to(offset, first)
    }

    /// Makes a note the last child of its current parent.
    pub fn move_note_to_last(&mut self, note_id: NoteId) -> Patch {
        let Some(offset) = self.note_offset(note_id) else {
            return Patch::none();
        };
        let last = last_sibling(self.notes(), offset);
        if last == offset {
            return Patch::none();
        }
        self.rotate_block_past(offset, last)
    }

    /// Moves the block rooted at `offset` so it starts at `target`
    /// (`target < offset`).
    fn rotate_block_to(&mut self, offset: usize, target: usize) -> Patch {
        let notes = self.notes_mut();
        let end = subtree_end(notes, offset);
        notes[target..end].rotate_left(offset - target);
        self.make_modified();
        Patch::moved(target, end - target - 1)
    }

    /// Moves the block rooted at `offset` right behind the block rooted at
    /// `sibling` (`sibling > offset`).
    fn rotate_block_past(&mut self, offset: usize, sibling: usize) -> Patch {
        let notes = self.notes_mut();
        let end = subtree_end(notes, offset);
        let sibling_end = subtree_end(notes, sibling);
        notes[offset..sibling_end].rotate_left(end - offset);
        self.make_modified();
        Patch::moved(offset, sibling_end - offset - 1)
    }
}
