//! Subtree relocation between outlines.
//!
//! A refactored block becomes a self-contained top-level section at the
//! head of the target: the root is rebased to depth 0 and descendants keep
//! their relative nesting.

use crate::model::note::{Note, NoteId};
use crate::model::outline::Outline;

/// Moves a note with its subtree from `source` to the top of `target`.
///
/// Every moved note is re-pointed to `target`. Returns the number of moved
/// notes, or `None` when the note is not in `source` (nothing is mutated).
pub fn refactor_note(
    source: &mut Outline,
    note_id: NoteId,
    target: &mut Outline,
) -> Option<usize> {
    let mut block = source.remove_note(note_id)?;
    prepare_block(&mut block);
    let moved = block.len();
    target.insert_notes(0, block);
    source.make_modified();
    target.make_modified();
    Some(moved)
}

impl Outline {
    /// Refactors a note into its own outline: the rebased block moves to
    /// the top.
    pub fn refactor_note_to_top(&mut self, note_id: NoteId) -> Option<usize> {
        let mut block = self.remove_note(note_id)?;
        prepare_block(&mut block);
        let moved = block.len();
        self.insert_notes(0, block);
        self.make_modified();
        Some(moved)
    }
}

fn prepare_block(block: &mut [Note]) {
    let Some(base) = block.first().map(|root| root.depth) else {
        return;
    };
    for note in block.iter_mut() {
        note.depth -= base;
        note.make_modified();
    }
}
