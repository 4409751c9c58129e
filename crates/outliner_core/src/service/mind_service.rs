//! Outline editing use-case service.
//!
//! # Responsibility
//! - Resolve outlines and notes by id before delegating to the editor.
//! - Remember changed outlines and forward resulting patches to observers.
//!
//! # Invariants
//! - Unknown outline or note ids are reported before any mutation.
//! - An outline is saved only when the edit actually changed it.
//! - Observers receive exactly one notice per non-empty patch, after save.
//! - Log events carry ids and ranges only, never note content.

use crate::editor::refactor_note;
use crate::model::note::{Note, NoteId};
use crate::model::outline::{Outline, OutlineId, MAX_NOTE_DEPTH};
use crate::model::patch::{Diff, Patch};
use crate::repo::outline_repo::{OutlineRepoError, OutlineRepository, OutlineSummary};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Sender;

/// Result type used by mind operations.
pub type MindResult<T> = Result<T, MindError>;

/// Errors from mind operations.
#[derive(Debug)]
pub enum MindError {
    OutlineNotFound(OutlineId),
    /// Note id is not part of the given outline.
    NoteNotFound {
        outline_id: OutlineId,
        note_id: NoteId,
    },
    /// Repository-level failure.
    Repo(OutlineRepoError),
}

impl Display for MindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutlineNotFound(id) => write!(f, "outline not found: {id}"),
            Self::NoteNotFound {
                outline_id,
                note_id,
            } => write!(f, "note {note_id} not found in outline {outline_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MindError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OutlineRepoError> for MindError {
    fn from(value: OutlineRepoError) -> Self {
        match value {
            OutlineRepoError::OutlineNotFound(id) => Self::OutlineNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Structural edit that produced a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOperation {
    Promote,
    Demote,
    MoveUp,
    MoveDown,
    MoveToFirst,
    MoveToLast,
    Forget,
}

impl EditOperation {
    /// Stable event name used in logs.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Promote => "note_promote",
            Self::Demote => "note_demote",
            Self::MoveUp => "note_up",
            Self::MoveDown => "note_down",
            Self::MoveToFirst => "note_first",
            Self::MoveToLast => "note_last",
            Self::Forget => "note_forget",
        }
    }
}

/// Patch delivered to observers after an outline was remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchNotice {
    pub outline_id: OutlineId,
    pub note_id: NoteId,
    pub operation: EditOperation,
    pub patch: Patch,
}

/// Receives patches produced by mind operations, e.g. to repaint a view.
pub trait PatchObserver {
    fn on_patch(&mut self, notice: &PatchNotice);
}

impl PatchObserver for Sender<PatchNotice> {
    fn on_patch(&mut self, notice: &PatchNotice) {
        if self.send(*notice).is_err() {
            debug!(
                "event=patch_notify module=mind status=noop reason=receiver_closed outline={}",
                notice.outline_id
            );
        }
    }
}

/// Outline editing facade over a repository.
pub struct MindService<R: OutlineRepository> {
    repo: R,
    observers: Vec<Box<dyn PatchObserver>>,
}

impl<R: OutlineRepository> MindService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            observers: Vec::new(),
        }
    }

    /// Registers an observer for every subsequent non-empty patch.
    pub fn subscribe(&mut self, observer: impl PatchObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Creates and remembers an empty outline.
    pub fn outline_new(&mut self, name: impl Into<String>) -> MindResult<Outline> {
        let mut outline = Outline::new(name);
        outline.complete_properties(outline.modified_at);
        self.repo.save_outline(&outline)?;
        info!(
            "event=outline_new module=mind status=ok outline={}",
            outline.id
        );
        Ok(outline)
    }

    /// Returns a detached copy of one outline.
    pub fn outline_get(&self, outline_id: OutlineId) -> MindResult<Outline> {
        self.load(outline_id)
    }

    /// Opens an outline for reading: bumps its read counter and remembers it.
    pub fn outline_open(&mut self, outline_id: OutlineId) -> MindResult<Outline> {
        let mut outline = self.load(outline_id)?;
        outline.record_read();
        self.repo.save_outline(&outline)?;
        outline.clear_dirty();
        debug!(
            "event=outline_open module=mind status=ok outline={} reads={}",
            outline_id, outline.reads
        );
        Ok(outline)
    }

    /// Opens one note for reading; both the note and its outline count a read.
    pub fn note_open(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Note> {
        let mut outline = self.load_with_note(outline_id, note_id, "note_open")?;
        let note = match outline.note_mut(note_id) {
            Some(note) => {
                note.record_read();
                note.clone()
            }
            None => {
                return Err(MindError::NoteNotFound {
                    outline_id,
                    note_id,
                })
            }
        };
        outline.record_read();
        self.repo.save_outline(&outline)?;
        debug!(
            "event=note_open module=mind status=ok outline={} note={} reads={}",
            outline_id, note_id, note.reads
        );
        Ok(note)
    }

    pub fn outline_list(&self) -> MindResult<Vec<OutlineSummary>> {
        self.repo.list_outlines().map_err(Into::into)
    }

    /// Duplicates an outline as `Copy of <name>` and remembers the copy.
    pub fn outline_clone(&mut self, outline_id: OutlineId) -> MindResult<Outline> {
        let source = self.load(outline_id)?;
        let copy = source.duplicate();
        self.repo.save_outline(&copy)?;
        info!(
            "event=outline_clone module=mind status=ok outline={} copy={} notes={}",
            outline_id,
            copy.id,
            copy.len()
        );
        Ok(copy)
    }

    /// Forgets an outline with all of its notes.
    pub fn outline_forget(&mut self, outline_id: OutlineId) -> MindResult<()> {
        self.repo.delete_outline(outline_id)?;
        info!("event=outline_forget module=mind status=ok outline={outline_id}");
        Ok(())
    }

    /// Remembers a caller-edited outline, repairing missing metadata first.
    pub fn remember(&mut self, outline: &mut Outline) -> MindResult<()> {
        outline.complete_properties(outline.modified_at);
        self.repo.save_outline(outline)?;
        outline.clear_dirty();
        debug!(
            "event=outline_remember module=mind status=ok outline={} notes={}",
            outline.id,
            outline.len()
        );
        Ok(())
    }

    /// Creates a note at `offset` (past the end appends).
    ///
    /// A blank name falls back to the default note name; depth is capped at
    /// `MAX_NOTE_DEPTH`.
    pub fn note_new(
        &mut self,
        outline_id: OutlineId,
        offset: usize,
        name: impl Into<String>,
        depth: u16,
    ) -> MindResult<Note> {
        let mut outline = self.load(outline_id)?;
        let mut note = Note::new(name, depth.min(MAX_NOTE_DEPTH));
        note.complete_properties(note.modified_at);
        let at = offset.min(outline.len());
        outline.insert_note(at, note.clone());
        outline.make_modified();
        self.repo.save_outline(&outline)?;
        note.outline_id = Some(outline_id);
        info!(
            "event=note_new module=mind status=ok outline={} note={} offset={}",
            outline_id, note.id, at
        );
        Ok(note)
    }

    pub fn note_promote(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Patch> {
        self.edit(EditOperation::Promote, outline_id, note_id, Outline::promote_note)
    }

    pub fn note_demote(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Patch> {
        self.edit(EditOperation::Demote, outline_id, note_id, Outline::demote_note)
    }

    pub fn note_up(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Patch> {
        self.edit(EditOperation::MoveUp, outline_id, note_id, Outline::move_note_up)
    }

    pub fn note_down(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Patch> {
        self.edit(EditOperation::MoveDown, outline_id, note_id, Outline::move_note_down)
    }

    pub fn note_first(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Patch> {
        self.edit(
            EditOperation::MoveToFirst,
            outline_id,
            note_id,
            Outline::move_note_to_first,
        )
    }

    pub fn note_last(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Patch> {
        self.edit(
            EditOperation::MoveToLast,
            outline_id,
            note_id,
            Outline::move_note_to_last,
        )
    }

    /// Deletes a note with its subtree.
    pub fn note_forget(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Patch> {
        self.edit(EditOperation::Forget, outline_id, note_id, Outline::forget_note)
    }

    /// Clones a note with its subtree below the original block.
    ///
    /// Returns the root of the new block.
    pub fn note_clone(&mut self, outline_id: OutlineId, note_id: NoteId) -> MindResult<Note> {
        let mut outline = self.load_with_note(outline_id, note_id, "note_clone")?;
        let clone = outline
            .clone_note(note_id)
            .cloned()
            .ok_or(MindError::NoteNotFound {
                outline_id,
                note_id,
            })?;
        self.repo.save_outline(&outline)?;
        info!(
            "event=note_clone module=mind status=ok outline={} note={} clone={}",
            outline_id, note_id, clone.id
        );
        Ok(clone)
    }

    /// Moves a note with its subtree to the top of `target_id`.
    ///
    /// With `target_id == source_id` the block moves to the top of its own
    /// outline. Both outlines are remembered together.
    pub fn note_refactor(
        &mut self,
        source_id: OutlineId,
        note_id: NoteId,
        target_id: OutlineId,
    ) -> MindResult<()> {
        let mut source = self.load_with_note(source_id, note_id, "note_refactor")?;

        if source_id == target_id {
            let moved = source
                .refactor_note_to_top(note_id)
                .ok_or(MindError::NoteNotFound {
                    outline_id: source_id,
                    note_id,
                })?;
            self.repo.save_outline(&source)?;
            log_refactor(source_id, note_id, target_id, moved);
            return Ok(());
        }

        let mut target = match self.load(target_id) {
            Ok(target) => target,
            Err(err) => {
                warn!(
                    "event=note_refactor module=mind status=error error_code=target_not_found outline={source_id} note={note_id} target={target_id}"
                );
                return Err(err);
            }
        };

        let moved = refactor_note(&mut source, note_id, &mut target).ok_or(
            MindError::NoteNotFound {
                outline_id: source_id,
                note_id,
            },
        )?;
        self.repo.save_outlines(&[&source, &target])?;
        log_refactor(source_id, note_id, target_id, moved);
        Ok(())
    }

    fn edit(
        &mut self,
        operation: EditOperation,
        outline_id: OutlineId,
        note_id: NoteId,
        apply: impl FnOnce(&mut Outline, NoteId) -> Patch,
    ) -> MindResult<Patch> {
        let event = operation.event_name();
        let mut outline = self.load_with_note(outline_id, note_id, event)?;
        let patch = apply(&mut outline, note_id);

        if patch.diff == Diff::No {
            debug!("event={event} module=mind status=noop outline={outline_id} note={note_id}");
            return Ok(patch);
        }

        self.repo.save_outline(&outline)?;
        info!(
            "event={event} module=mind status=ok outline={outline_id} note={note_id} diff={} start={} count={}",
            patch.diff, patch.start, patch.count
        );
        self.notify(PatchNotice {
            outline_id,
            note_id,
            operation,
            patch,
        });
        Ok(patch)
    }

    fn notify(&mut self, notice: PatchNotice) {
        for observer in &mut self.observers {
            observer.on_patch(&notice);
        }
    }

    fn load(&self, outline_id: OutlineId) -> MindResult<Outline> {
        self.repo
            .load_outline(outline_id)?
            .ok_or(MindError::OutlineNotFound(outline_id))
    }

    fn load_with_note(
        &self,
        outline_id: OutlineId,
        note_id: NoteId,
        event: &str,
    ) -> MindResult<Outline> {
        let outline = self.load(outline_id).inspect_err(|_| {
            warn!(
                "event={event} module=mind status=error error_code=outline_not_found outline={outline_id}"
            );
        })?;
        if !outline.contains_note(note_id) {
            warn!(
                "event={event} module=mind status=error error_code=note_not_found outline={outline_id} note={note_id}"
            );
            return Err(MindError::NoteNotFound {
                outline_id,
                note_id,
            });
        }
        Ok(outline)
    }
}

fn log_refactor(source_id: OutlineId, note_id: NoteId, target_id: OutlineId, moved: usize) {
    info!(
        "event=note_refactor module=mind status=ok outline={source_id} note={note_id} target={target_id} moved={moved}"
    );
}

#[cfg(test)]
mod tests {
    use super::{EditOperation, MindError, MindService, PatchNotice, PatchObserver};
    use crate::model::note::Note;
    use crate::model::outline::Outline;
    use crate::model::patch::Patch;
    use crate::repo::memory_repo::InMemoryOutlineRepository;
    use crate::repo::outline_repo::OutlineRepository;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<PatchNotice>>>);

    impl PatchObserver for Recorder {
        fn on_patch(&mut self, notice: &PatchNotice) {
            self.0.borrow_mut().push(*notice);
        }
    }

    fn service_with(outline: &Outline) -> MindService<InMemoryOutlineRepository> {
        let mut repo = InMemoryOutlineRepository::new();
        repo.save_outline(outline).unwrap();
        MindService::new(repo)
    }

    #[test]
    fn noop_edit_is_not_saved_nor_notified() {
        let mut outline = Outline::new("noop");
        outline.add_note(Note::new("only", 0));
        let note_id = outline.notes()[0].id;
        let mut service = service_with(&outline);
        let recorder = Recorder::default();
        service.subscribe(recorder.clone());

        let patch = service.note_up(outline.id, note_id).unwrap();

        assert_eq!(patch, Patch::none());
        assert!(recorder.0.borrow().is_empty());
        let stored = service.outline_get(outline.id).unwrap();
        assert_eq!(stored.revision, outline.revision);
    }

    #[test]
    fn applied_edit_notifies_once_with_operation() {
        let mut outline = Outline::new("notify");
        outline.add_note(Note::new("a", 0));
        outline.add_note(Note::new("b", 0));
        let note_id = outline.notes()[1].id;
        let mut service = service_with(&outline);
        let recorder = Recorder::default();
        service.subscribe(recorder.clone());

        let patch = service.note_demote(outline.id, note_id).unwrap();

        let notices = recorder.0.borrow();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].operation, EditOperation::Demote);
        assert_eq!(notices[0].patch, patch);
        assert_eq!(notices[0].note_id, note_id);
    }

    #[test]
    fn unknown_note_is_reported_before_mutation() {
        let outline = Outline::new("empty");
        let mut service = service_with(&outline);
        let missing = uuid::Uuid::new_v4();

        let err = service.note_promote(outline.id, missing).unwrap_err();

        assert!(matches!(
            err,
            MindError::NoteNotFound { outline_id, note_id }
                if outline_id == outline.id && note_id == missing
        ));
        assert_eq!(service.outline_get(outline.id).unwrap(), outline);
    }

    #[test]
    fn note_new_clamps_depth_and_fills_blank_name() {
        let outline = Outline::new("new");
        let mut service = service_with(&outline);

        let note = service.note_new(outline.id, 10, "  ", u16::MAX).unwrap();

        assert_eq!(note.name, "Note");
        assert_eq!(note.depth, crate::model::outline::MAX_NOTE_DEPTH);
        assert_eq!(note.outline_id, Some(outline.id));
        let stored = service.outline_get(outline.id).unwrap();
        assert_eq!(stored.notes()[0].id, note.id);
    }
}
