use std::cell::RefCell;
use std::rc::Rc;
use tree_table::{
    ConvertedRow, LoadedChild, Node, TableHooks, TableOptions, TransferMetadata, TransferScope,
    TreeTable, UserData,
};

/// A (expanded)
/// ├── A1 (expanded)
/// │   └── A1a
/// └── A2
/// B
/// L (leaf)
pub fn sample_table(id: &str) -> TreeTable<String> {
    let mut table = TreeTable::new(id, TableOptions::drag_and_drop());
    table.add_root_node(Some("A"), "alpha".into()).unwrap();
    table
        .add_node(Some("A"), Some("A1"), "alpha one".into(), true, true)
        .unwrap();
    table
        .add_node(Some("A1"), Some("A1a"), "alpha one a".into(), true, true)
        .unwrap();
    table
        .add_node(Some("A"), Some("A2"), "alpha two".into(), true, true)
        .unwrap();
    table.add_root_node(Some("B"), "beta".into()).unwrap();
    table.add_node(None, Some("L"), "leaf".into(), false, true).unwrap();
    table.expand("A").unwrap();
    table.expand("A1").unwrap();
    table.drain_events();
    table
}

/// Loader serving `levels` levels of `fanout` children below every node,
/// recording each call
pub fn counting_loader(
    fanout: usize,
    levels: usize,
) -> (
    impl FnMut(&str, Option<&UserData>) -> Vec<LoadedChild<String>>,
    Rc<RefCell<Vec<String>>>,
) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&calls);
    let loader = move |id: &str, _data: Option<&UserData>| {
        recorded.borrow_mut().push(id.to_string());
        let depth = id.matches('/').count();
        if depth >= levels {
            return Vec::new();
        }
        (0..fanout)
            .map(|i| LoadedChild::new(format!("{} #{}", id, i)).with_id(format!("{}/{}", id, i)))
            .collect()
    };
    (loader, calls)
}

/// Transfer hooks accepting every row with `scope` and prefixing ids with
/// `copy:`
pub fn accepting_hooks(scope: TransferScope) -> TableHooks<String> {
    TableHooks::new()
        .with_transfer_policy(
            move |_src: &str,
                  _dst: &str,
                  _node: &Node<String>,
                  _parent: Option<&str>,
                  _after: Option<&str>| scope,
        )
        .with_transfer_converter(|_src: &str, content: &String, meta: &TransferMetadata| {
            Some(ConvertedRow::new(content.to_uppercase()).with_id(format!("copy:{}", meta.original_id)))
        })
}

pub fn visible(table: &TreeTable<String>) -> Vec<String> {
    table.visible_rows()
}
