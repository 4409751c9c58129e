//! Subtree and sibling resolution over a flat, depth-annotated sequence.
//!
//! All functions take an `index` that must be in bounds of `notes`.

use crate::model::note::Note;

/// Returns the exclusive end of the subtree rooted at `index`.
///
/// The block `[index, subtree_end)` is the note plus every immediately
/// following note that is deeper than it.
pub fn subtree_end(notes: &[Note], index: usize) -> usize {
    let depth = notes[index].depth;
    notes[index + 1..]
        .iter()
        .position(|note| note.depth <= depth)
        .map_or(notes.len(), |distance| index + 1 + distance)
}

/// Returns the offset of the closest sibling above `index`.
///
/// Deeper notes (descendants of that sibling) are skipped; hitting a
/// shallower note first means there is none.
pub fn previous_sibling(notes: &[Note], index: usize) -> Option<usize> {
    let depth = notes[index].depth;
    for offset in (0..index).rev() {
        let candidate = notes[offset].depth;
        if candidate == depth {
            return Some(offset);
        }
        if candidate < depth {
            return None;
        }
    }
    None
}

/// Returns the offset of the closest sibling below `index`.
pub fn next_sibling(notes: &[Note], index: usize) -> Option<usize> {
    let end = subtree_end(notes, index);
    notes
        .get(end)
        .filter(|note| note.depth == notes[index].depth)
        .map(|_| end)
}

/// Returns the offset of the first sibling in the group of `index`.
///
/// Returns `index` itself when it is already first.
pub fn first_sibling(notes: &[Note], index: usize) -> usize {
    let mut cursor = index;
    while let Some(offset) = previous_sibling(notes, cursor) {
        cursor = offset;
    }
    cursor
}

/// Returns the offset of the last sibling in the group of `index`.
pub fn last_sibling(notes: &[Note], index: usize) -> usize {
    let mut cursor = index;
    while let Some(offset) = next_sibling(notes, cursor) {
        cursor = offset;
    }
    cursor
}

/// Returns the offset of the parent note, `None` when the outline itself is
/// the parent.
pub fn parent(notes: &[Note], index: usize) -> Option<usize> {
    let depth = notes[index].depth;
    (0..index).rev().find(|&offset| notes[offset].depth < depth)
}

/// Returns offsets of the notes that have no parent within `notes`.
pub fn top_level_offsets(notes: &[Note]) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut shallowest = u16::MAX;
    for (offset, note) in notes.iter().enumerate() {
        if note.depth <= shallowest {
            offsets.push(offset);
            shallowest = note.depth;
        }
    }
    offsets
}
