use crate::integration::support::{accepting_hooks, sample_table};
use tree_table::{
    transfer, ConvertedRow, Node, Position, TableHooks, TableOptions, TableSet, TransferMetadata,
    TransferScope, TreeError, TreeEvent, TreeTable,
};

fn destination(scope: TransferScope) -> TreeTable<String> {
    let mut dest = TreeTable::new("right", TableOptions::drag_and_drop()).with_hooks(accepting_hooks(scope));
    dest.add_root_node(Some("R"), "target".to_string()).unwrap();
    dest.add_root_node(Some("S"), "second".to_string()).unwrap();
    dest.drain_events();
    dest
}

#[test]
fn all_scope_copies_the_whole_subtree() {
    let mut source = sample_table("left");
    let mut dest = destination(TransferScope::All);

    let report = transfer(&mut source, &mut dest, &["A"], Some("R"), None)
        .unwrap()
        .unwrap();

    assert_eq!(report.source_ids, vec!["A", "A1", "A1a", "A2"]);
    assert_eq!(report.top_ids, vec!["copy:A"]);
    assert_eq!(report.dest_ids, vec!["copy:A", "copy:A1", "copy:A1a", "copy:A2"]);
    assert_eq!(report.id_map.get("A1a").map(String::as_str), Some("copy:A1a"));
    assert_eq!(dest.children_of(Some("R")).unwrap(), ["copy:A".to_string()]);
    assert_eq!(dest.nesting_level("copy:A1a").unwrap(), 3);
    assert_eq!(dest.get("copy:A2").unwrap().content(), "ALPHA TWO");
    // Source is left as it was.
    assert_eq!(source.len(), 6);
    assert!(source.node_exists("A1a"));
    assert!(dest.check_invariants().is_valid());
}

#[test]
fn visible_only_scope_follows_source_expansion() {
    let mut source = sample_table("left");
    source.collapse("A1").unwrap();
    let mut dest = destination(TransferScope::VisibleOnly);

    let report = transfer(&mut source, &mut dest, &["A"], None, None).unwrap().unwrap();

    assert_eq!(report.source_ids, vec!["A", "A1", "A2"]);
    assert!(!dest.node_exists("copy:A1a"));
    assert_eq!(
        dest.root_nodes(),
        ["R".to_string(), "S".to_string(), "copy:A".to_string()]
    );
}

#[test]
fn row_only_scope_takes_single_rows_in_order() {
    let mut source = sample_table("left");
    let mut dest = destination(TransferScope::RowOnly);

    let report = transfer(&mut source, &mut dest, &["B", "A2"], None, Some("R"))
        .unwrap()
        .unwrap();

    // Source display order, placed one after the other.
    assert_eq!(report.top_ids, vec!["copy:A2", "copy:B"]);
    assert_eq!(
        dest.root_nodes(),
        [
            "R".to_string(),
            "copy:A2".to_string(),
            "copy:B".to_string(),
            "S".to_string()
        ]
    );
}

#[test]
fn rows_below_a_skipped_parent_become_top_rows() {
    let mut source = sample_table("left");
    let hooks = TableHooks::new()
        .with_transfer_policy(
            |_s: &str, _d: &str, _n: &Node<String>, _p: Option<&str>, _a: Option<&str>| TransferScope::All,
        )
        .with_transfer_converter(|_src: &str, content: &String, meta: &TransferMetadata| {
            if meta.original_id == "A1" {
                None
            } else {
                Some(ConvertedRow::new(content.clone()).with_id(format!("n:{}", meta.original_id)))
            }
        });
    let mut dest: TreeTable<String> = TreeTable::new("right", TableOptions::default()).with_hooks(hooks);

    let report = transfer(&mut source, &mut dest, &["A"], None, None).unwrap().unwrap();

    assert!(!report.id_map.contains_key("A1"));
    assert_eq!(report.top_ids, vec!["n:A", "n:A1a"]);
    assert_eq!(dest.children_of(Some("n:A")).unwrap(), ["n:A2".to_string()]);
    assert_eq!(dest.root_nodes(), ["n:A".to_string(), "n:A1a".to_string()]);
    assert!(dest.check_invariants().is_valid());
}

#[test]
fn transfer_reports_id_map_in_event() {
    let mut source = sample_table("left");
    let mut dest = destination(TransferScope::RowOnly);

    transfer(&mut source, &mut dest, &["L"], Some("S"), None).unwrap().unwrap();

    let events = dest.drain_events();
    let Some(TreeEvent::TransferComplete {
        source_table,
        dest_table,
        new_parent_id,
        id_map,
        ..
    }) = events.last()
    else {
        panic!("expected transfer event, got {:?}", events);
    };
    assert_eq!(source_table, "left");
    assert_eq!(dest_table, "right");
    assert_eq!(new_parent_id.as_deref(), Some("S"));
    assert_eq!(id_map.get("L").map(String::as_str), Some("copy:L"));
}

#[test]
fn conflicting_ids_abort_before_insertion() {
    let mut source = sample_table("left");
    let mut dest = destination(TransferScope::RowOnly);
    dest.add_root_node(Some("copy:B"), "taken".to_string()).unwrap();
    let before = dest.len();

    let err = transfer(&mut source, &mut dest, &["A", "B"], None, None).unwrap_err();

    assert!(matches!(err, TreeError::DuplicateId(id) if id == "copy:B"));
    assert_eq!(dest.len(), before);
}

#[test]
fn missing_content_from_converter_is_an_error() {
    let mut source = sample_table("left");
    let hooks = TableHooks::new()
        .with_transfer_policy(
            |_s: &str, _d: &str, _n: &Node<String>, _p: Option<&str>, _a: Option<&str>| TransferScope::RowOnly,
        )
        .with_transfer_converter(|_src: &str, _content: &String, _meta: &TransferMetadata| {
            Some(ConvertedRow {
                content: None,
                id: None,
            })
        });
    let mut dest: TreeTable<String> = TreeTable::new("right", TableOptions::default()).with_hooks(hooks);

    let err = transfer(&mut source, &mut dest, &["B"], None, None).unwrap_err();

    assert!(matches!(err, TreeError::MissingRequiredField { .. }));
    assert!(dest.is_empty());
}

#[test]
fn transfer_into_leaf_or_bad_slot_is_rejected() {
    let mut source = sample_table("left");
    let mut dest = destination(TransferScope::RowOnly);
    dest.add_node(None, Some("leaf"), "leaf".to_string(), false, true).unwrap();

    assert!(matches!(
        transfer(&mut source, &mut dest, &["B"], Some("leaf"), None),
        Err(TreeError::ChildrenNotAllowed(_))
    ));
    assert!(matches!(
        tree_table::tree::transfer_at(&mut source, &mut dest, &["B"], Some("R"), Position::After("S".into())),
        Err(TreeError::InvalidAfterNode { .. })
    ));
    assert!(matches!(
        transfer(&mut source, &mut dest, &["ghost"], None, None),
        Err(TreeError::NotFound(_))
    ));
}

#[test]
fn table_set_transfer_between_members() {
    let mut tables = TableSet::new();
    tables.insert(sample_table("left")).unwrap();
    tables.insert(destination(TransferScope::All)).unwrap();

    let report = tables
        .transfer("left", "right", &["A1"], Some("R"), None)
        .unwrap()
        .unwrap();

    assert_eq!(report.dest_ids, vec!["copy:A1", "copy:A1a"]);
    assert_eq!(tables.get("left").unwrap().len(), 6);
    assert!(matches!(
        tables.transfer("left", "left", &["A1"], None, None),
        Err(TreeError::TransferUnsupported(_))
    ));
}
