use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, info};

use crate::error::{FlowError, Result};
use crate::flow::graph::Graph;
use crate::session::CallerType;

/// Resolves a flow definition by `(caller, category, flow)`.
pub trait GraphStore {
    fn load(&self, caller: CallerType, category: &str, flow: &str) -> Result<Graph>;
}

fn not_found(caller: CallerType, category: &str, flow: &str) -> FlowError {
    FlowError::GraphNotFound {
        caller,
        category: category.to_string(),
        flow: flow.to_string(),
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
    graphs: HashMap<(CallerType, String, String), Graph>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, caller: CallerType, category: &str, flow: &str, graph: Graph) {
        self.graphs
            .insert((caller, category.to_string(), flow.to_string()), graph);
    }

    pub fn with(mut self, caller: CallerType, category: &str, flow: &str, graph: Graph) -> Self {
        self.insert(caller, category, flow, graph);
        self
    }
}

impl GraphStore for InMemoryGraphStore {
    fn load(&self, caller: CallerType, category: &str, flow: &str) -> Result<Graph> {
        self.graphs
            .get(&(caller, category.to_string(), flow.to_string()))
            .cloned()
            .ok_or_else(|| not_found(caller, category, flow))
    }
}

// ---------------------------------------------------------------------------
// JSON directory store
// ---------------------------------------------------------------------------

/// Reads `{base}/{caller}/{category}/{flow}.json`.
#[derive(Debug, Clone)]
pub struct JsonDirGraphStore {
    base: PathBuf,
}

impl JsonDirGraphStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn path_for(&self, caller: CallerType, category: &str, flow: &str) -> Option<PathBuf> {
        // Keys come from the request layer; refuse anything that could walk
        // out of the base directory.
        let safe = |part: &str| {
            !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\'])
        };
        if !safe(category) || !safe(flow) {
            return None;
        }
        Some(
            self.base
                .join(caller.as_str())
                .join(category)
                .join(format!("{flow}.json")),
        )
    }
}

impl GraphStore for JsonDirGraphStore {
    fn load(&self, caller: CallerType, category: &str, flow: &str) -> Result<Graph> {
        let path = self
            .path_for(caller, category, flow)
            .ok_or_else(|| not_found(caller, category, flow))?;
        debug!("Reading flow definition: {}", path.display());

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(not_found(caller, category, flow))
            }
            Err(e) => return Err(e.into()),
        };

        let graph: Graph =
            serde_json::from_str(&raw).map_err(|source| FlowError::InvalidGraph {
                path: path.clone(),
                source,
            })?;

        info!(
            "Loaded flow {caller}/{category}/{flow}: {} nodes, start={}",
            graph.nodes.len(),
            graph.start_node_id
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOW: &str = r#"{"start": "n1", "nodes": {
        "n1": {"type": "resolution", "title": "Done"}
    }}"#;

    fn write_flow(dir: &tempfile::TempDir, caller: &str, category: &str, flow: &str, body: &str) {
        let folder = dir.path().join(caller).join(category);
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join(format!("{flow}.json")), body).unwrap();
    }

    #[test]
    fn test_json_store_loads_by_key() {
        let dir = tempfile::tempdir().unwrap();
        write_flow(&dir, "account_holder", "billing", "refund", FLOW);
        let store = JsonDirGraphStore::new(dir.path());

        let graph = store
            .load(CallerType::AccountHolder, "billing", "refund")
            .unwrap();
        assert_eq!(graph.start_node_id, "n1");

        // Same flow name under another caller type is a different key.
        assert!(matches!(
            store.load(CallerType::OtherUser, "billing", "refund"),
            Err(FlowError::GraphNotFound { .. })
        ));
    }

    #[test]
    fn test_json_store_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        write_flow(&dir, "other_user", "payments", "card", "{not json");
        let store = JsonDirGraphStore::new(dir.path());

        let err = store
            .load(CallerType::OtherUser, "payments", "card")
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidGraph { .. }));
    }

    #[test]
    fn test_json_store_refuses_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirGraphStore::new(dir.path());
        assert!(matches!(
            store.load(CallerType::AccountHolder, "..", "refund"),
            Err(FlowError::GraphNotFound { .. })
        ));
        assert!(matches!(
            store.load(CallerType::AccountHolder, "billing", "../../etc/passwd"),
            Err(FlowError::GraphNotFound { .. })
        ));
    }

    #[test]
    fn test_in_memory_store() {
        let graph: Graph = serde_json::from_str(FLOW).unwrap();
        let store =
            InMemoryGraphStore::new().with(CallerType::AuthorizedUser, "sim", "swap", graph.clone());

        assert_eq!(
            store.load(CallerType::AuthorizedUser, "sim", "swap").unwrap(),
            graph
        );
        assert!(store.load(CallerType::AuthorizedUser, "sim", "pac").is_err());
    }
}
