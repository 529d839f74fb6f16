//! Tree fixtures
//!
//! A nested JSON or TOML description of a forest. Roots are added up front;
//! everything below is served lazily through a [`FixtureLoader`], the same
//! way a real data source would feed the table.

use crate::callbacks::{ChildLoader, LoadedChild, TableHooks};
use crate::config::TableOptions;
use crate::error::TreeError;
use crate::tree::TreeTable;
use crate::types::{NodeId, UserData};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureNode {
    /// Defaults to the slash-separated label path
    #[serde(default)]
    pub id: Option<NodeId>,
    pub label: String,
    #[serde(default)]
    pub no_children: bool,
    #[serde(default)]
    pub no_drag: bool,
    #[serde(default)]
    pub user_data: Option<UserData>,
    #[serde(default)]
    pub children: Vec<FixtureNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeFixture {
    #[serde(default)]
    pub roots: Vec<FixtureNode>,
}

impl TreeFixture {
    pub fn from_json_str(raw: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, TreeError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read a fixture file; `.toml` files are parsed as TOML, anything else
    /// as JSON.
    pub fn from_path(path: &Path) -> Result<Self, TreeError> {
        let raw = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if is_toml {
            Self::from_toml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }

    /// Give every node without an id its label path
    fn assign_ids(&mut self) {
        fn walk(node: &mut FixtureNode, parent_path: Option<&str>) {
            let id = node.id.clone().unwrap_or_else(|| match parent_path {
                Some(parent) => format!("{}/{}", parent, node.label),
                None => node.label.clone(),
            });
            node.id = Some(id.clone());
            for child in &mut node.children {
                walk(child, Some(&id));
            }
        }
        for root in &mut self.roots {
            walk(root, None);
        }
    }

    /// Build a table holding the fixture roots, with a loader serving the
    /// rest of the tree on demand.
    pub fn into_table(
        mut self,
        table_id: &str,
        options: TableOptions,
    ) -> Result<TreeTable<String>, TreeError> {
        self.assign_ids();
        let mut loader = FixtureLoader::default();
        let mut roots = Vec::with_capacity(self.roots.len());
        for mut root in self.roots {
            loader.register(std::mem::take(&mut root.children), root.id.as_deref());
            roots.push(root);
        }

        let mut table =
            TreeTable::new(table_id, options).with_hooks(TableHooks::new().with_loader(loader));
        for root in roots {
            let id = table.add_node(
                None,
                root.id.as_deref(),
                root.label,
                !root.no_children,
                !root.no_drag,
            )?;
            table.set_user_data(&id, root.user_data)?;
        }
        debug!(table = %table_id, roots = table.root_nodes().len(), "Built table from fixture");
        Ok(table)
    }
}

/// Serves fixture children keyed by parent id
#[derive(Debug, Default)]
pub struct FixtureLoader {
    children: HashMap<NodeId, Vec<FixtureNode>>,
}

impl FixtureLoader {
    fn register(&mut self, children: Vec<FixtureNode>, parent: Option<&str>) {
        let Some(parent) = parent else {
            return;
        };
        let mut direct = Vec::with_capacity(children.len());
        for mut child in children {
            let grandchildren = std::mem::take(&mut child.children);
            self.register(grandchildren, child.id.as_deref());
            direct.push(child);
        }
        if !direct.is_empty() {
            self.children.insert(parent.to_string(), direct);
        }
    }
}

impl ChildLoader<String> for FixtureLoader {
    fn load_children(
        &mut self,
        node_id: &str,
        _user_data: Option<&UserData>,
    ) -> Vec<LoadedChild<String>> {
        self.children
            .remove(node_id)
            .unwrap_or_default()
            .into_iter()
            .map(|node| LoadedChild {
                id: node.id,
                content: Some(node.label),
                no_children: node.no_children,
                no_drag: node.no_drag,
                user_data: node.user_data,
            })
            .collect()
    }
}
