use crate::integration::support::{sample_table, visible};
use tree_table::{
    LoadedChild, Node, Position, TableHooks, TableOptions, TreeError, TreeEvent, TreeTable, UserData,
};

#[test]
fn move_after_sibling_under_other_parent() {
    let mut table = sample_table("t");

    let moved = table.move_to("A1", Some("B"), Position::Last).unwrap();

    assert_eq!(moved, vec!["A1", "A1a"]);
    assert_eq!(table.children_of(Some("A")).unwrap(), ["A2".to_string()]);
    assert_eq!(table.children_of(Some("B")).unwrap(), ["A1".to_string()]);
    assert_eq!(table.nesting_level("A1a").unwrap(), 2);
    // The new parent is expanded and the remembered state of A1 comes back.
    assert!(table.is_expanded("B").unwrap());
    assert_eq!(visible(&table), vec!["A", "A2", "B", "A1", "A1a", "L"]);
    assert!(table.check_invariants().is_valid());
}

#[test]
fn move_to_first_and_after_positions() {
    let mut table = sample_table("t");

    table.move_to("L", None, Position::First).unwrap();
    assert_eq!(
        table.root_nodes(),
        ["L".to_string(), "A".to_string(), "B".to_string()]
    );

    table.move_node("L", None, Some("A")).unwrap().unwrap();
    assert_eq!(
        table.root_nodes(),
        ["A".to_string(), "L".to_string(), "B".to_string()]
    );

    // After itself keeps the slot.
    table.move_node("L", None, Some("L")).unwrap().unwrap();
    assert_eq!(
        table.root_nodes(),
        ["A".to_string(), "L".to_string(), "B".to_string()]
    );
}

#[test]
fn move_into_hidden_parent_keeps_rows_hidden() {
    let mut table = sample_table("t");
    table.collapse("A").unwrap();

    table.move_to("B", Some("A1"), Position::Last).unwrap();

    assert!(!table.is_visible("B").unwrap());
    assert_eq!(visible(&table), vec!["A", "L"]);

    table.expand("A").unwrap();
    assert_eq!(visible(&table), vec!["A", "A1", "A1a", "B", "A2", "L"]);
    assert!(table.check_invariants().is_valid());
}

#[test]
fn last_child_leaving_clears_expanded_flag() {
    let mut table = sample_table("t");

    table.move_to("A1a", None, Position::Last).unwrap();

    assert!(!table.is_expanded("A1").unwrap());
    assert_eq!(table.children_count("A1").unwrap(), 0);
    assert!(table.check_invariants().is_valid());
}

#[test]
fn invalid_destinations_leave_table_untouched() {
    let mut table = sample_table("t");
    let before = table.rows();

    assert!(matches!(
        table.move_node("A2", Some("ghost"), None),
        Err(TreeError::ParentNotFound(_))
    ));
    assert!(matches!(
        table.move_node("A2", Some("L"), None),
        Err(TreeError::ChildrenNotAllowed(_))
    ));
    assert!(matches!(
        table.move_node("A2", Some("B"), Some("A1")),
        Err(TreeError::InvalidAfterNode { .. })
    ));
    assert!(matches!(
        table.move_node("ghost", None, None),
        Err(TreeError::NotFound(_))
    ));

    assert_eq!(table.rows(), before);
}

#[test]
fn move_policy_refusal_is_benign_on_public_move() {
    let mut table = sample_table("t");
    table.hooks_mut().move_policy = Some(Box::new(
        |node: &Node<String>, new_parent: Option<&str>, _after: Option<&str>| {
            node.id() != "A2" && new_parent != Some("L")
        },
    ));
    table.drain_events();

    assert_eq!(table.move_node("A2", None, None).unwrap(), None);
    assert!(matches!(
        table.move_to("A2", None, Position::Last),
        Err(TreeError::MoveDenied(_))
    ));
    assert_eq!(table.parent_of("A2").unwrap().map(|n| n.id().to_string()), Some("A".to_string()));
    assert!(table.drain_events().is_empty());

    assert!(table.move_node("B", Some("A"), None).unwrap().is_some());
}

#[test]
fn move_emits_size_changed() {
    let mut table = sample_table("t");

    table.move_node("B", Some("A2"), None).unwrap();

    let events = table.drain_events();
    assert_eq!(events.last(), Some(&TreeEvent::SizeChanged));
    assert!(events.contains(&TreeEvent::NodeExpanded {
        node_id: "A2".to_string()
    }));
}

#[test]
fn hooks_can_be_installed_after_construction() {
    let mut table = sample_table("t");
    *table.hooks_mut() = TableHooks::new().with_move_policy(
        |_node: &Node<String>, _parent: Option<&str>, _after: Option<&str>| false,
    );

    assert_eq!(table.move_node("B", None, Some("A")).unwrap(), None);
}

#[test]
fn rejected_look_ahead_load_leaves_move_undone() {
    let loader = |id: &str, _data: Option<&UserData>| match id {
        "P" => vec![LoadedChild::new("sibling".to_string()).with_id("S")],
        "S" => {
            let mut broken = LoadedChild::new("broken".to_string());
            broken.content = None;
            vec![broken]
        }
        _ => Vec::new(),
    };
    let mut table = TreeTable::new("t", TableOptions::default()).with_hooks(TableHooks::new().with_loader(loader));
    table.add_root_node(Some("P"), "parent".to_string()).unwrap();
    table.add_root_node(Some("X"), "moved".to_string()).unwrap();
    let before = table.rows();

    let err = table.move_to("X", Some("P"), Position::Last).unwrap_err();

    assert!(matches!(err, TreeError::MissingRequiredField { .. }));
    assert_eq!(table.rows(), before);
    assert_eq!(table.root_nodes(), ["P".to_string(), "X".to_string()]);
    assert_eq!(table.children_of(Some("P")).unwrap(), ["S".to_string()]);
    assert!(table.get("X").unwrap().is_root());
    assert!(table.check_invariants().is_valid());
}
