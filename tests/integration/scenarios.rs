use crate::integration::support::{accepting_hooks, counting_loader, sample_table, visible};
use tree_table::{
    resolve_placement, transfer, InsertType, Node, RowGeometry, TableHooks, TableOptions,
    TransferMetadata, TransferScope, TreeError, TreeEvent, TreeTable,
};

#[test]
fn move_child_to_root_level_appends_after_existing_roots() {
    let mut table: TreeTable<String> = TreeTable::new("t", TableOptions::default());
    table.add_root_node(Some("A"), "a".into()).unwrap();
    table.add_node(Some("A"), Some("A/B"), "b".into(), true, true).unwrap();
    table.add_node(Some("A"), Some("A/C"), "c".into(), true, true).unwrap();

    let moved = table.move_node("A/B", None, None).unwrap().unwrap();

    assert_eq!(moved, vec!["A/B"]);
    assert_eq!(table.root_nodes(), ["A".to_string(), "A/B".to_string()]);
    assert_eq!(table.children_count("A").unwrap(), 1);
    assert_eq!(table.nesting_level("A/B").unwrap(), 0);
    assert!(table.is_visible("A/B").unwrap());
}

#[test]
fn adding_under_a_leaf_is_rejected() {
    let mut table: TreeTable<String> = TreeTable::new("t", TableOptions::default());
    table.add_node(None, Some("A"), "a".into(), false, true).unwrap();

    let err = table
        .add_node(Some("A"), Some("X"), "x".into(), true, true)
        .unwrap_err();
    assert!(matches!(err, TreeError::ChildrenNotAllowed(id) if id == "A"));
    assert!(!table.node_exists("X"));
}

#[test]
fn cursor_bands_over_a_row_accepting_children() {
    let table = sample_table("t");
    let row = RowGeometry::new(0.0, 40.0);

    let at = |fraction: f64| {
        resolve_placement(&table, None, "B", row, fraction * 40.0)
            .unwrap()
            .unwrap()
            .insert
    };
    assert_eq!(at(0.1), InsertType::Above);
    assert_eq!(at(0.5), InsertType::Into);
    assert_eq!(at(0.9), InsertType::Below);
}

#[test]
fn transfer_refused_by_policy_leaves_destination_unchanged() {
    let mut source = sample_table("left");
    let mut dest: TreeTable<String> =
        TreeTable::new("right", TableOptions::drag_and_drop()).with_hooks(accepting_hooks(TransferScope::None));
    dest.add_root_node(Some("R"), "r".into()).unwrap();
    dest.drain_events();

    let report = transfer(&mut source, &mut dest, &["A"], None, None).unwrap();

    assert_eq!(report, None);
    assert_eq!(dest.len(), 1);
    assert!(dest.drain_events().is_empty());
    assert_eq!(source.len(), 6);
}

#[test]
fn transfer_without_converter_is_a_no_op() {
    let mut source = sample_table("left");
    let hooks = TableHooks::new().with_transfer_policy(
        |_s: &str, _d: &str, _n: &Node<String>, _p: Option<&str>, _a: Option<&str>| TransferScope::All,
    );
    let mut dest: TreeTable<String> = TreeTable::new("right", TableOptions::default()).with_hooks(hooks);

    assert_eq!(transfer(&mut source, &mut dest, &["B"], None, None).unwrap(), None);
    assert!(dest.is_empty());

    // The strict primitive reports it.
    let err = tree_table::tree::transfer_nodes(
        &mut source,
        &mut dest,
        &["B"],
        None,
        tree_table::Position::Last,
    )
    .unwrap_err();
    assert!(matches!(err, TreeError::TransferUnsupported(_)));
}

#[test]
fn moving_into_own_subtree_is_rejected() {
    let mut table = sample_table("t");

    for target in ["A", "A1", "A1a"] {
        let err = table.move_node("A", Some(target), None).unwrap_err();
        assert!(matches!(err, TreeError::SelfParenting { .. }), "target {}", target);
    }
    assert!(table.check_invariants().is_valid());
}

#[test]
fn deleted_subtree_is_gone_from_the_registry() {
    let mut table = sample_table("t");

    let removed = table.delete_node("A").unwrap();

    assert_eq!(removed, vec!["A1a", "A1", "A2", "A"]);
    for id in &removed {
        assert!(matches!(table.get(id), Err(TreeError::NotFound(_))));
    }
    assert_eq!(table.root_nodes(), ["B".to_string(), "L".to_string()]);
}

#[test]
fn lazy_load_runs_the_loader_once() {
    let (loader, calls) = counting_loader(2, 1);
    let mut table: TreeTable<String> =
        TreeTable::new("t", TableOptions::default()).with_hooks(TableHooks::new().with_loader(loader));
    table.add_root_node(Some("r"), "root".into()).unwrap();

    let first = table.load_children("r").unwrap();
    let second = table.load_children("r").unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.borrow().iter().filter(|id| *id == "r").count(), 1);
}

#[test]
fn collapse_then_expand_restores_visible_rows() {
    let mut table = sample_table("t");
    let before = visible(&table);

    table.collapse("A").unwrap();
    assert_eq!(visible(&table), vec!["A", "B", "L"]);

    table.expand("A").unwrap();
    assert_eq!(visible(&table), before);
}

#[test]
fn expand_and_collapse_emit_events() {
    let mut table = sample_table("t");

    table.collapse("A").unwrap();
    table.expand("A").unwrap();

    assert_eq!(
        table.drain_events(),
        vec![
            TreeEvent::NodeCollapsed {
                node_id: "A".to_string()
            },
            TreeEvent::SizeChanged,
            TreeEvent::NodeExpanded {
                node_id: "A".to_string()
            },
            TreeEvent::SizeChanged,
        ]
    );
}

#[test]
fn converter_receives_original_metadata() {
    let mut source = sample_table("left");
    source
        .set_user_data("A2", Some(serde_json::json!({"kind": "channel"})))
        .unwrap();
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::<TransferMetadata>::new()));
    let recorded = std::rc::Rc::clone(&seen);
    let hooks = TableHooks::new()
        .with_transfer_policy(
            |_s: &str, _d: &str, _n: &Node<String>, _p: Option<&str>, _a: Option<&str>| {
                TransferScope::RowOnly
            },
        )
        .with_transfer_converter(move |_src: &str, content: &String, meta: &TransferMetadata| {
            recorded.borrow_mut().push(meta.clone());
            Some(tree_table::ConvertedRow::new(content.clone()))
        });
    let mut dest: TreeTable<String> = TreeTable::new("right", TableOptions::default()).with_hooks(hooks);

    transfer(&mut source, &mut dest, &["A2"], None, None).unwrap().unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].original_id, "A2");
    assert_eq!(seen[0].original_parent_id.as_deref(), Some("A"));
    assert_eq!(seen[0].user_data, Some(serde_json::json!({"kind": "channel"})));
}
