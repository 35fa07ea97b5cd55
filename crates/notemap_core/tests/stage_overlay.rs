use notemap_core::{
    load_note, note_ids, Batch, LoadError, MemoryNoteStore, Note, NoteId, NoteRecord, Operation,
    EMPTY_LOADER,
};

fn seeded_store() -> MemoryNoteStore {
    let mut topic = NoteRecord::with_value(1, "base", 5);
    topic.types = vec![40];
    topic.supertypes = vec![41];
    topic.contents = vec![2, 3];

    [
        topic,
        NoteRecord::with_value(2, "child two", 0),
        NoteRecord::with_value(3, "child three", 0),
        NoteRecord::with_value(4, "other", 5),
        NoteRecord::with_value(5, "xsd:string", 0),
    ]
    .into_iter()
    .collect()
}

/// Lexical value, datatype id and content ids of one note.
fn observe(note: &dyn Note<'_>) -> (String, NoteId, Vec<NoteId>) {
    let (lexical, datatype) = note.value().unwrap();
    (lexical, datatype.id(), note_ids(&note.contents().unwrap()))
}

#[test]
fn empty_batch_is_transparent() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);

    for id in 1..=5 {
        let base = load_note(&store, id).unwrap();
        let view = batch.note(id);
        assert_eq!(observe(&view), observe(&*base), "note {id}");
        assert_eq!(
            note_ids(&view.types().unwrap()),
            note_ids(&base.types().unwrap())
        );
        assert_eq!(
            note_ids(&view.supertypes().unwrap()),
            note_ids(&base.supertypes().unwrap())
        );
    }
}

#[test]
fn last_staged_value_wins() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);
    batch
        .append(Operation::set_value(1, "a", 10))
        .append(Operation::set_value(1, "b", 11));

    let (lexical, datatype) = batch.note(1).value().unwrap();
    assert_eq!(lexical, "b");
    assert_eq!(datatype.id(), 11);
}

#[test]
fn staged_contents_follow_base_contents_in_log_order() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);
    batch
        .append(Operation::add_content(1, 30))
        .append(Operation::add_content(1, 31))
        .append(Operation::add_content(1, 30));

    let contents = batch.note(1).contents().unwrap();
    assert_eq!(note_ids(&contents), vec![2, 3, 30, 31, 30]);
}

#[test]
fn operations_only_change_their_target() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);
    let before = observe(&batch.note(4));

    batch
        .append(Operation::set_value(1, "changed", 9))
        .append(Operation::add_content(1, 4))
        .append(Operation::add_content(2, 4));

    assert_eq!(observe(&batch.note(4)), before);
    assert_eq!(observe(&batch.note(3)).0, "child three");
}

#[test]
fn repeated_reads_are_identical() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);
    let view = batch.note(1);
    view.set_value("staged", 5);
    view.add_content(8);

    let first = observe(&view);
    let second = observe(&view);
    assert_eq!(first, second);
    assert_eq!(first, ("staged".to_string(), 5, vec![2, 3, 8]));
}

#[test]
fn reads_see_operations_appended_after_view_creation() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);
    let view = batch.note(1);
    assert_eq!(observe(&view).0, "base");

    batch.append(Operation::set_value(1, "later", 0));
    assert_eq!(observe(&view).0, "later");
}

#[test]
#[should_panic(expected = "unassigned")]
fn set_value_on_unassigned_id_panics() {
    let batch = Batch::new();
    batch.note(0).set_value("never", 1);
}

#[test]
#[should_panic(expected = "unassigned")]
fn add_content_on_unassigned_id_panics() {
    let batch = Batch::new();
    batch.note(0).add_content(1);
}

#[test]
fn unassigned_id_panic_leaves_log_untouched() {
    let batch = Batch::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        batch.note(0).add_content(1);
    }));

    assert!(result.is_err());
    assert!(batch.is_empty());
}

#[test]
fn missing_base_behaves_like_empty_loader() {
    let implicit = Batch::new();
    let explicit = Batch::with_base(&EMPTY_LOADER);
    for batch in [&implicit, &explicit] {
        batch
            .append(Operation::set_value(7, "x", 3))
            .append(Operation::add_content(7, 8));
    }

    for id in [7, 8, 99] {
        assert_eq!(observe(&implicit.note(id)), observe(&explicit.note(id)));
    }
    assert_eq!(
        observe(&implicit.note(7)),
        ("x".to_string(), 3, vec![8])
    );
    assert!(implicit.note(7).types().unwrap().is_empty());
}

#[test]
fn base_assigned_after_construction_is_used() {
    let store = seeded_store();
    let mut batch = Batch::new();
    assert_eq!(observe(&batch.note(1)).0, "");

    batch.set_base(Some(&store));
    assert_eq!(observe(&batch.note(1)).0, "base");

    batch.set_base(None);
    assert_eq!(observe(&batch.note(1)).0, "");
}

#[test]
fn failed_base_lookup_is_returned_unchanged() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);
    batch
        .append(Operation::set_value(9, "staged", 0))
        .append(Operation::add_content(9, 1));

    let view = batch.note(9);
    assert!(matches!(view.value(), Err(LoadError::NotFound(9))));
    assert!(matches!(view.contents(), Err(LoadError::NotFound(9))));
    assert!(matches!(view.types(), Err(LoadError::NotFound(9))));
    assert!(matches!(view.supertypes(), Err(LoadError::NotFound(9))));
}

#[test]
fn datatype_reads_through_the_same_batch() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);
    batch.note(1).set_value("42", 20);
    batch.note(20).set_value("xsd:integer", 0);

    let (_, datatype) = batch.note(1).value().unwrap();
    assert_eq!(datatype.value().unwrap().0, "xsd:integer");

    // Unstaged datatypes still resolve through the batch to the base.
    let (_, base_datatype) = batch.note(4).value().unwrap();
    assert_eq!(base_datatype.value().unwrap().0, "xsd:string");
}

#[test]
fn add_content_returns_view_of_child_for_chaining() {
    let batch = Batch::new();
    let leaf = batch.note(1).add_content(2).add_content(3);
    leaf.set_value("leaf", 0);

    assert_eq!(leaf.id(), 3);
    assert_eq!(batch.len(), 3);

    let level_one = batch.note(1).contents().unwrap();
    assert_eq!(note_ids(&level_one), vec![2]);
    let level_two = level_one[0].contents().unwrap();
    assert_eq!(note_ids(&level_two), vec![3]);
    assert_eq!(level_two[0].value().unwrap().0, "leaf");
}

#[test]
fn types_ignore_staged_operations() {
    let store = seeded_store();
    let batch = Batch::with_base(&store);
    batch
        .append(Operation::set_value(1, "x", 0))
        .append(Operation::add_content(1, 40));

    assert_eq!(note_ids(&batch.note(1).types().unwrap()), vec![40]);
    assert_eq!(note_ids(&batch.note(1).supertypes().unwrap()), vec![41]);
}

#[test]
fn truncating_the_log_restores_earlier_observations() {
    let store = seeded_store();
    let mut batch = Batch::with_base(&store);
    batch.append(Operation::set_value(1, "first", 0));
    let checkpoint = batch.len();
    let after_first = observe(&batch.note(1));

    batch
        .append(Operation::set_value(1, "second", 0))
        .append(Operation::add_content(1, 12));
    assert_ne!(observe(&batch.note(1)), after_first);

    batch.truncate(checkpoint);
    assert_eq!(observe(&batch.note(1)), after_first);
}
