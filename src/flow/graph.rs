use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::flow::node::{Node, NodeId};

/// A loaded flow: a map of node-id -> Node plus the entry point.
///
/// Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(rename = "start")]
    pub start_node_id: NodeId,
    pub nodes: HashMap<NodeId, Node>,
}

impl Graph {
    pub fn new(
        start_node_id: impl Into<NodeId>,
        nodes: impl IntoIterator<Item = (NodeId, Node)>,
    ) -> Self {
        Self {
            start_node_id: start_node_id.into(),
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up `id`, treating absence as a broken pointer out of `from`.
    pub fn resolve(&self, id: &str, from: &str) -> Result<&Node> {
        self.nodes.get(id).ok_or_else(|| FlowError::BrokenGraph {
            node: id.to_string(),
            referenced_from: from.to_string(),
        })
    }

    pub fn start_node(&self) -> Result<&Node> {
        self.resolve(&self.start_node_id, "start")
    }

    /// `(from, to)` pairs whose target does not exist. Not checked on load;
    /// the interpreter fails on these lazily, when the pointer is followed.
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        let mut dangling: Vec<(&str, &str)> = self
            .nodes
            .iter()
            .flat_map(|(id, node)| {
                node.successors()
                    .into_iter()
                    .map(move |next| (id.as_str(), next))
            })
            .filter(|(_, next)| !self.nodes.contains_key(*next))
            .collect();
        if !self.nodes.contains_key(&self.start_node_id) {
            dangling.push(("start", self.start_node_id.as_str()));
        }
        dangling.sort_unstable();
        dangling
    }
}
