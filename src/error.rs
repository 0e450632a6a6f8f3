use std::path::PathBuf;

use thiserror::Error;

use crate::session::CallerType;

/// Errors that reach the agent-facing layer.
///
/// Everything else (missing template variables, stale requests) is recovered
/// locally and reported through [`crate::template::Rendered`] or
/// [`crate::flow::Transition`] instead.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("no flow definition for {caller}/{category}/{flow}")]
    GraphNotFound {
        caller: CallerType,
        category: String,
        flow: String,
    },

    #[error("node '{node}' referenced from '{referenced_from}' does not exist")]
    BrokenGraph {
        node: String,
        referenced_from: String,
    },

    #[error("failed to parse flow definition {}: {source}", path.display())]
    InvalidGraph {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;
