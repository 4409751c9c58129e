//! In-process outline repository.
//!
//! Stores detached copies, so callers never share state with the store.

use crate::model::outline::{Outline, OutlineId};
use crate::repo::outline_repo::{
    OutlineRepoError, OutlineRepoResult, OutlineRepository, OutlineSummary,
};
use std::collections::BTreeMap;

/// `BTreeMap`-backed repository for tests, demos and embedding.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOutlineRepository {
    outlines: BTreeMap<OutlineId, Outline>,
}

impl InMemoryOutlineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.outlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }
}

impl OutlineRepository for InMemoryOutlineRepository {
    fn load_outline(&self, id: OutlineId) -> OutlineRepoResult<Option<Outline>> {
        Ok(self.outlines.get(&id).cloned())
    }

    fn list_outlines(&self) -> OutlineRepoResult<Vec<OutlineSummary>> {
        let mut summaries: Vec<OutlineSummary> =
            self.outlines.values().map(OutlineSummary::of).collect();
        summaries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(summaries)
    }

    fn save_outline(&mut self, outline: &Outline) -> OutlineRepoResult<()> {
        outline.validate()?;
        let mut stored = outline.clone();
        stored.clear_dirty();
        self.outlines.insert(stored.id, stored);
        Ok(())
    }

    fn save_outlines(&mut self, outlines: &[&Outline]) -> OutlineRepoResult<()> {
        for outline in outlines {
            outline.validate()?;
        }
        for outline in outlines {
            self.save_outline(outline)?;
        }
        Ok(())
    }

    fn delete_outline(&mut self, id: OutlineId) -> OutlineRepoResult<()> {
        self.outlines
            .remove(&id)
            .map(|_| ())
            .ok_or(OutlineRepoError::OutlineNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryOutlineRepository;
    use crate::model::note::Note;
    use crate::model::outline::Outline;
    use crate::repo::outline_repo::{OutlineRepoError, OutlineRepository};

    #[test]
    fn saved_copy_is_detached_from_caller() {
        let mut repo = InMemoryOutlineRepository::new();
        let mut outline = Outline::new("detached");
        outline.add_note(Note::new("a", 0));
        repo.save_outline(&outline).unwrap();

        outline.add_note(Note::new("b", 0));

        let loaded = repo.load_outline(outline.id).unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn list_orders_by_name_case_insensitively() {
        let mut repo = InMemoryOutlineRepository::new();
        for name in ["beta", "Alpha", "gamma"] {
            repo.save_outline(&Outline::new(name)).unwrap();
        }
        let names: Vec<String> = repo
            .list_outlines()
            .unwrap()
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn save_outlines_validates_all_before_writing() {
        let mut repo = InMemoryOutlineRepository::new();
        let good = Outline::new("good");
        let mut bad = Outline::new("bad");
        bad.revision = bad.reads + 1;

        let err = repo.save_outlines(&[&good, &bad]).unwrap_err();
        assert!(matches!(err, OutlineRepoError::Validation(_)));
        assert!(repo.is_empty());
    }

    #[test]
    fn delete_missing_outline_is_not_found() {
        let mut repo = InMemoryOutlineRepository::new();
        let outline = Outline::new("gone");
        repo.save_outline(&outline).unwrap();
        repo.delete_outline(outline.id).unwrap();
        assert!(matches!(
            repo.delete_outline(outline.id),
            Err(OutlineRepoError::OutlineNotFound(_))
        ));
    }
}
