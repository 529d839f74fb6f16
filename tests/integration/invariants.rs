use proptest::prelude::*;
use tree_table::{Position, TableOptions, TreeError, TreeTable};

#[derive(Debug, Clone)]
enum Op {
    Add { parent: Option<usize>, leaf: bool },
    Move { node: usize, parent: Option<usize>, slot: u8 },
    Delete(usize),
    Expand(usize),
    Collapse(usize),
    CollapseAll,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (proptest::option::of(0usize..64), any::<bool>())
            .prop_map(|(parent, leaf)| Op::Add { parent, leaf }),
        3 => (0usize..64, proptest::option::of(0usize..64), 0u8..3)
            .prop_map(|(node, parent, slot)| Op::Move { node, parent, slot }),
        1 => (0usize..64).prop_map(Op::Delete),
        2 => (0usize..64).prop_map(Op::Expand),
        1 => (0usize..64).prop_map(Op::Collapse),
        1 => Just(Op::CollapseAll),
    ]
}

/// Pick an existing node by index, in display order
fn pick(table: &TreeTable<u32>, index: usize) -> Option<String> {
    let ids = table.flattened();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()].clone())
    }
}

fn apply(table: &mut TreeTable<u32>, op: &Op, counter: &mut u32) -> Result<(), TreeError> {
    match op {
        Op::Add { parent, leaf } => {
            let parent = parent.and_then(|i| pick(table, i));
            *counter += 1;
            table.add_node(parent.as_deref(), None, *counter, !leaf, true)?;
        }
        Op::Move { node, parent, slot } => {
            let Some(node) = pick(table, *node) else {
                return Ok(());
            };
            let parent = parent.and_then(|i| pick(table, i));
            let position = match slot {
                0 => Position::First,
                1 => Position::Last,
                _ => {
                    let siblings = table.children_of(parent.as_deref()).unwrap_or(&[]);
                    Position::after_or_last(siblings.first().map(String::as_str))
                }
            };
            table.move_to(&node, parent.as_deref(), position)?;
        }
        Op::Delete(i) => {
            if let Some(node) = pick(table, *i) {
                table.delete_node(&node)?;
            }
        }
        Op::Expand(i) => {
            if let Some(node) = pick(table, *i) {
                table.expand(&node)?;
            }
        }
        Op::Collapse(i) => {
            if let Some(node) = pick(table, *i) {
                table.collapse(&node)?;
            }
        }
        Op::CollapseAll => table.collapse_all(None)?,
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Any sequence of operations, failed ones included, keeps the forest consistent.
    #[test]
    fn prop_operations_preserve_structure(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut table = TreeTable::new("prop", TableOptions::default());
        let mut counter = 0u32;
        for op in &ops {
            let before = table.rows();
            let result = apply(&mut table, op, &mut counter);
            if let Err(err) = &result {
                // Rejected operations never touch the structure.
                prop_assert_eq!(&table.rows(), &before, "{:?} failed with {}", op, err);
            }
            let report = table.check_invariants();
            prop_assert!(report.is_valid(), "after {:?}: {:?}", op, report.errors);
        }
    }

    // A node can never be moved below itself.
    #[test]
    fn prop_move_into_own_subtree_fails(
        ops in proptest::collection::vec(op_strategy(), 1..40),
        node in 0usize..64,
        target in 0usize..64,
    ) {
        let mut table = TreeTable::new("prop", TableOptions::default());
        let mut counter = 0u32;
        for op in &ops {
            let _ = apply(&mut table, op, &mut counter);
        }
        let Some(node) = pick(&table, node) else {
            return Ok(());
        };
        let subtree = table.loaded_subtree(&node).unwrap();
        let target = subtree[target % subtree.len()].clone();
        if table.get(&target).unwrap().allows_children() {
            let result = table.move_to(&node, Some(&target), Position::Last);
            let is_self_parenting = matches!(result, Err(TreeError::SelfParenting { .. }));
            prop_assert!(is_self_parenting);
        }
    }

    // Collapsing then expanding a visible node restores the visible rows.
    #[test]
    fn prop_collapse_expand_round_trip(
        ops in proptest::collection::vec(op_strategy(), 1..40),
        collapsed in proptest::collection::vec(0usize..64, 0..4),
        node in 0usize..64,
    ) {
        let mut table = TreeTable::new("prop", TableOptions::default());
        let mut counter = 0u32;
        for op in &ops {
            let _ = apply(&mut table, op, &mut counter);
        }
        table.expand_all().unwrap();
        for index in collapsed {
            if let Some(id) = pick(&table, index) {
                table.collapse(&id).unwrap();
            }
        }
        let Some(node) = pick(&table, node) else {
            return Ok(());
        };
        if !table.is_visible(&node).unwrap() || !table.is_expanded(&node).unwrap() {
            return Ok(());
        }
        let before = table.visible_rows();
        table.collapse(&node).unwrap();
        table.expand(&node).unwrap();
        prop_assert_eq!(table.visible_rows(), before);
    }
}
