//! Subtree cloning within one outline.

use crate::editor::blocks::subtree_end;
use crate::model::note::{Note, NoteId};
use crate::model::outline::Outline;

impl Outline {
    /// Deep-copies a note with its subtree right below the original block.
    ///
    /// Copies keep name, depth, type, tags and description. Each copy gets a
    /// fresh id and `reads = revision = 1`. The original block is untouched.
    /// Returns the root of the new block.
    pub fn clone_note(&mut self, note_id: NoteId) -> Option<&Note> {
        let offset = self.note_offset(note_id)?;
        let outline_id = self.id;
        let notes = self.notes_mut();
        let end = subtree_end(notes, offset);
        let copies: Vec<Note> = notes[offset..end]
            .iter()
            .map(|note| {
                let mut copy = note.clone();
                copy.reset_as_clone(Some(outline_id));
                copy
            })
            .collect();
        notes.splice(end..end, copies);
        self.make_modified();
        self.notes().get(end)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::note::Note;
    use crate::model::outline::Outline;

    #[test]
    fn clone_of_last_block_is_appended() {
        let mut outline = Outline::new("copy");
        outline.add_note(Note::new("a", 0));
        outline.add_note(Note::new("b", 0));
        outline.add_note(Note::new("bb", 1));
        let id = outline.notes()[1].id;

        let root = outline.clone_note(id).cloned().unwrap();

        let names: Vec<&str> = outline.notes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "bb", "b", "bb"]);
        assert_eq!(outline.note_offset(root.id), Some(3));
        assert_ne!(root.id, id);
        assert_eq!(root.outline_id, Some(outline.id));
    }

    #[test]
    fn clone_of_unknown_note_is_none() {
        let mut outline = Outline::new("copy");
        outline.add_note(Note::new("a", 0));
        assert!(outline.clone_note(uuid::Uuid::new_v4()).is_none());
        assert_eq!(outline.len(), 1);
    }
}
