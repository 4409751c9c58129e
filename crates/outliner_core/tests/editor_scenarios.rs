use outliner_core::{refactor_note, Diff, Note, Outline, Patch};

fn build(name: &str, shape: &[(&str, u16)]) -> Outline {
    let mut outline = Outline::new(name);
    for (note_name, depth) in shape {
        outline.add_note(Note::new(*note_name, *depth));
    }
    outline
}

/// `[1, 2, 3, 33(1), 333(2), 4, 44(1), 5, 6]`
fn nine() -> Outline {
    build(
        "nine",
        &[
            ("1", 0),
            ("2", 0),
            ("3", 0),
            ("33", 1),
            ("333", 2),
            ("4", 0),
            ("44", 1),
            ("5", 0),
            ("6", 0),
        ],
    )
}

fn names(outline: &Outline) -> Vec<&str> {
    outline.notes().iter().map(|n| n.name.as_str()).collect()
}

fn shape(outline: &Outline) -> Vec<(&str, u16)> {
    outline
        .notes()
        .iter()
        .map(|n| (n.name.as_str(), n.depth))
        .collect()
}

fn id(outline: &Outline, name: &str) -> uuid::Uuid {
    outline.note_by_name(name).expect("note exists").id
}

#[test]
fn demote_last_of_flat_outline_nests_it_under_previous() {
    let mut outline = build("flat", &[("1", 0), ("2", 0), ("3", 0)]);

    let patch = outline.demote_note(id(&outline, "3"));

    assert_eq!(patch, Patch::change(2, 0));
    assert_eq!(shape(&outline), vec![("1", 0), ("2", 0), ("3", 1)]);
}

#[test]
fn move_up_swaps_whole_subtree_blocks() {
    let mut outline = nine();

    let patch = outline.move_note_up(id(&outline, "4"));

    assert_eq!(patch.diff, Diff::Move);
    assert_eq!((patch.start, patch.count), (2, 4));
    assert_eq!(
        names(&outline),
        vec!["1", "2", "4", "44", "3", "33", "333", "5", "6"]
    );
    assert_eq!(outline.notes()[3].depth, 1);
    assert_eq!(outline.notes()[6].depth, 2);
}

#[test]
fn move_up_then_down_restores_order() {
    let mut outline = nine();
    let before = shape(&outline)
        .into_iter()
        .map(|(n, d)| (n.to_string(), d))
        .collect::<Vec<_>>();
    let note = id(&outline, "4");

    let up = outline.move_note_up(note);
    let down = outline.move_note_down(note);

    assert_eq!(up, down);
    let after = shape(&outline)
        .into_iter()
        .map(|(n, d)| (n.to_string(), d))
        .collect::<Vec<_>>();
    assert_eq!(after, before);
}

#[test]
fn moves_without_sibling_are_noops() {
    let mut outline = nine();
    let original = outline.clone();

    assert_eq!(outline.move_note_up(id(&outline, "1")), Patch::none());
    assert_eq!(outline.move_note_down(id(&outline, "6")), Patch::none());
    assert_eq!(outline.move_note_up(id(&outline, "33")), Patch::none());
    assert_eq!(outline.move_note_down(id(&outline, "44")), Patch::none());
    assert_eq!(outline.move_note_to_first(id(&outline, "1")), Patch::none());
    assert_eq!(outline.move_note_to_last(id(&outline, "6")), Patch::none());
    assert_eq!(outline, original);
}

#[test]
fn move_to_first_and_last_stay_within_parent() {
    let mut outline = nine();

    let first = outline.move_note_to_first(id(&outline, "5"));
    assert_eq!(first, Patch::moved(0, 7));
    assert_eq!(
        names(&outline),
        vec!["5", "1", "2", "3", "33", "333", "4", "44", "6"]
    );

    let last = outline.move_note_to_last(id(&outline, "3"));
    assert_eq!(last, Patch::moved(3, 5));
    assert_eq!(
        names(&outline),
        vec!["5", "1", "2", "4", "44", "6", "3", "33", "333"]
    );
}

#[test]
fn promote_then_demote_restores_depths() {
    let mut outline = nine();
    let before: Vec<u16> = outline.notes().iter().map(|n| n.depth).collect();
    let note = id(&outline, "33");

    let promoted = outline.promote_note(note);
    let demoted = outline.demote_note(note);

    assert_eq!(promoted, Patch::change(3, 1));
    assert_eq!(demoted, Patch::change(3, 1));
    let after: Vec<u16> = outline.notes().iter().map(|n| n.depth).collect();
    assert_eq!(after, before);
}

#[test]
fn clone_inserts_copy_below_original_block() {
    let mut outline = nine();
    let original_block: Vec<Note> = outline.notes()[2..5].to_vec();

    let clone = outline
        .clone_note(id(&outline, "3"))
        .cloned()
        .expect("clone root");

    assert_eq!(
        names(&outline),
        vec!["1", "2", "3", "33", "333", "3", "33", "333", "4", "44", "5", "6"]
    );
    assert_eq!(&outline.notes()[2..5], original_block.as_slice());
    assert_eq!((clone.reads, clone.revision), (1, 1));
    for (copy, source) in outline.notes()[5..8].iter().zip(&original_block) {
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.depth, source.depth);
        assert_eq!(copy.name, source.name);
    }
}

#[test]
fn clone_resets_counters_of_whole_block_and_keeps_content() {
    let mut outline = nine();
    for note in outline.notes().iter().map(|n| n.id).collect::<Vec<_>>() {
        let note = outline.note_mut(note).expect("note exists");
        note.reads = 9;
        note.revision = 7;
        note.tags = vec!["t".to_string(), note.name.clone()];
        note.kind = "Task".to_string();
        note.description = format!("body of {}", note.name);
    }
    let before: Vec<Note> = outline.notes().to_vec();

    let root = outline
        .clone_note(id(&outline, "3"))
        .map(|n| n.id)
        .expect("clone root");

    assert_eq!(&outline.notes()[..5], &before[..5]);
    assert_eq!(&outline.notes()[8..], &before[5..]);
    assert_eq!(outline.notes()[5].id, root);
    for (copy, source) in outline.notes()[5..8].iter().zip(&before[2..5]) {
        assert_eq!((copy.reads, copy.revision), (1, 1));
        assert_ne!(copy.id, source.id);
        assert_eq!(copy.name, source.name);
        assert_eq!(copy.depth, source.depth);
        assert_eq!(copy.kind, "Task");
        assert_eq!(copy.tags, source.tags);
        assert_eq!(copy.description, source.description);
        assert_eq!(copy.outline_id, Some(outline.id));
    }
}

#[test]
fn refactor_moves_block_to_top_of_target() {
    let mut source = nine();
    let mut target = build(
        "target",
        &[
            ("A", 0),
            ("B", 0),
            ("C", 0),
            ("CC", 1),
            ("CCC", 2),
            ("D", 0),
            ("DD", 1),
            ("E", 0),
            ("F", 0),
        ],
    );
    let note = id(&source, "3");

    let moved = refactor_note(&mut source, note, &mut target);

    assert_eq!(moved, Some(3));
    assert_eq!(names(&source), vec!["1", "2", "4", "44", "5", "6"]);
    assert_eq!(target.len(), 12);
    assert_eq!(
        shape(&target),
        vec![
            ("3", 0),
            ("33", 1),
            ("333", 2),
            ("A", 0),
            ("B", 0),
            ("C", 0),
            ("CC", 1),
            ("CCC", 2),
            ("D", 0),
            ("DD", 1),
            ("E", 0),
            ("F", 0),
        ]
    );
    assert!(target.notes()[..3]
        .iter()
        .all(|n| n.outline_id == Some(target.id)));
    assert!(source.validate().is_ok());
    assert!(target.validate().is_ok());
}

#[test]
fn refactor_of_nested_note_rebases_depth() {
    let mut source = nine();
    let mut target = build("target", &[("A", 0)]);

    let nested = id(&source, "33");
    refactor_note(&mut source, nested, &mut target).expect("moved");

    assert_eq!(shape(&target), vec![("33", 0), ("333", 1), ("A", 0)]);
    assert_eq!(
        shape(&source)[2..4].to_vec(),
        vec![("3", 0), ("4", 0)]
    );
}

#[test]
fn forget_removes_subtree_and_reports_range() {
    let mut outline = nine();

    let patch = outline.forget_note(id(&outline, "3"));

    assert_eq!(patch, Patch::deleted(2, 2));
    assert_eq!(names(&outline), vec!["1", "2", "4", "44", "5", "6"]);
}

#[test]
fn direct_children_tolerate_depth_gaps() {
    let outline = build(
        "gaps",
        &[("a", 2), ("b", 1), ("c", 2), ("d", 0), ("e", 1)],
    );

    let top: Vec<&str> = outline
        .direct_children(None)
        .into_iter()
        .map(|n| n.name.as_str())
        .collect();

    assert_eq!(top, vec!["a", "b", "d"]);
}

#[test]
fn unknown_note_ids_never_mutate() {
    let mut outline = nine();
    let original = outline.clone();
    let missing = uuid::Uuid::new_v4();

    assert_eq!(outline.promote_note(missing), Patch::none());
    assert_eq!(outline.demote_note(missing), Patch::none());
    assert_eq!(outline.move_note_up(missing), Patch::none());
    assert_eq!(outline.move_note_down(missing), Patch::none());
    assert_eq!(outline.move_note_to_first(missing), Patch::none());
    assert_eq!(outline.move_note_to_last(missing), Patch::none());
    assert_eq!(outline.forget_note(missing), Patch::none());
    assert!(outline.clone_note(missing).is_none());
    assert_eq!(outline, original);
}
