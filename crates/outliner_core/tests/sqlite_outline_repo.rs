use outliner_core::db::{open_db, open_db_in_memory};
use outliner_core::{
    MindService, Note, Outline, OutlineRepoError, OutlineRepository, SqliteOutlineRepository,
};

fn sample() -> Outline {
    let mut outline = Outline::new("Project");
    outline.description = "plan".to_string();
    outline.tags = vec!["work".to_string(), "q3".to_string()];
    for (name, depth) in [("1", 0), ("11", 1), ("111", 2), ("2", 0)] {
        let mut note = Note::new(name, depth);
        note.tags = vec![format!("t{name}"), "shared".to_string()];
        note.progress = 40;
        note.deadline = Some(1_700_000_000_000);
        outline.add_note(note);
    }
    outline
}

#[test]
fn save_and_load_round_trips_order_depth_and_tags() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteOutlineRepository::try_new(&mut conn).unwrap();
    let outline = sample();

    repo.save_outline(&outline).unwrap();
    let loaded = repo.load_outline(outline.id).unwrap().expect("outline saved");

    assert_eq!(loaded, outline);
}

#[test]
fn resave_replaces_notes_in_new_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteOutlineRepository::try_new(&mut conn).unwrap();
    let mut outline = sample();
    repo.save_outline(&outline).unwrap();

    let second = outline.note_by_name("2").unwrap().id;
    outline.move_note_up(second);
    outline.forget_note(outline.note_by_name("111").unwrap().id);
    outline.clear_dirty();
    repo.save_outline(&outline).unwrap();

    let loaded = repo.load_outline(outline.id).unwrap().unwrap();
    let names: Vec<&str> = loaded.notes().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["2", "1", "11"]);
    assert_eq!(loaded, outline);
}

#[test]
fn refactor_saved_together_moves_rows_between_outlines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mind.db");
    let source = sample();
    let target = Outline::new("Archive");
    let note = source.note_by_name("11").unwrap().id;

    {
        let mut conn = open_db(&path).unwrap();
        let mut repo = SqliteOutlineRepository::try_new(&mut conn).unwrap();
        repo.save_outlines(&[&source, &target]).unwrap();
        let mut mind = MindService::new(repo);
        mind.note_refactor(source.id, note, target.id).unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    let repo = SqliteOutlineRepository::try_new(&mut conn).unwrap();
    let source_after = repo.load_outline(source.id).unwrap().unwrap();
    let target_after = repo.load_outline(target.id).unwrap().unwrap();

    let source_names: Vec<&str> = source_after.notes().iter().map(|n| n.name.as_str()).collect();
    let target_shape: Vec<(&str, u16)> = target_after
        .notes()
        .iter()
        .map(|n| (n.name.as_str(), n.depth))
        .collect();
    assert_eq!(source_names, vec!["1", "2"]);
    assert_eq!(target_shape, vec![("11", 0), ("111", 1)]);
    assert_eq!(target_after.notes()[0].tags, vec!["t11", "shared"]);
}

#[test]
fn list_and_delete_outlines() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteOutlineRepository::try_new(&mut conn).unwrap();
    let project = sample();
    let inbox = Outline::new("inbox");
    repo.save_outlines(&[&project, &inbox]).unwrap();

    let listed: Vec<(String, usize)> = repo
        .list_outlines()
        .unwrap()
        .into_iter()
        .map(|summary| (summary.name, summary.note_count))
        .collect();
    assert_eq!(
        listed,
        vec![("inbox".to_string(), 0), ("Project".to_string(), 4)]
    );

    repo.delete_outline(project.id).unwrap();
    assert!(repo.load_outline(project.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_outline(project.id),
        Err(OutlineRepoError::OutlineNotFound(_))
    ));
    assert_eq!(repo.list_outlines().unwrap().len(), 1);
}

#[test]
fn deleting_outline_cascades_to_notes_and_tags() {
    let mut conn = open_db_in_memory().unwrap();
    let outline = sample();
    {
        let mut repo = SqliteOutlineRepository::try_new(&mut conn).unwrap();
        repo.save_outline(&outline).unwrap();
        repo.delete_outline(outline.id).unwrap();
    }

    for table in ["notes", "note_tags", "outline_tags"] {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 0, "{table} should be empty");
    }
}
