use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::Context;
use crate::template::render_text;

pub type NodeId = String;

/// Titles containing any of these mark a script the agent must read out
/// verbatim. The rendered description is then kept in the history.
const READ_BACK_MARKERS: [&str; 2] = ["TnC", "Terms"];

/// A single node in a flow's decision graph, as loaded from the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Preferred over `title` when the visit is written to the history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    /// Statement for the agent. A missing `next` ends the flow.
    Info {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<NodeId>,
    },
    Choice { choices: Vec<Choice> },
    /// Free text stored in the call context under `variable`.
    Input {
        #[serde(default = "default_variable")]
        variable: String,
        next: NodeId,
    },
    /// Outcome of the flow, recorded when the agent finishes.
    Resolution {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<NodeId>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub next: NodeId,
}

fn default_variable() -> String {
    "generic_input".to_string()
}

/// Kind discriminant, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Info,
    Choice,
    Input,
    Resolution,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Choice => "choice",
            Self::Input => "input",
            Self::Resolution => "resolution",
        })
    }
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Info { .. } => NodeType::Info,
            NodeKind::Choice { .. } => NodeType::Choice,
            NodeKind::Input { .. } => NodeType::Input,
            NodeKind::Resolution { .. } => NodeType::Resolution,
        }
    }

    /// Checked against the source title, not the rendered one.
    pub fn requires_read_back(&self) -> bool {
        self.title
            .as_deref()
            .is_some_and(|title| READ_BACK_MARKERS.iter().any(|m| title.contains(m)))
    }

    /// Every node id this node can move to, in declaration order.
    pub fn successors(&self) -> Vec<&str> {
        match &self.kind {
            NodeKind::Info { next } | NodeKind::Resolution { next } => {
                next.iter().map(String::as_str).collect()
            }
            NodeKind::Choice { choices } => choices.iter().map(|c| c.next.as_str()).collect(),
            NodeKind::Input { next, .. } => vec![next.as_str()],
        }
    }

    /// Build a fresh display copy with every template resolved against
    /// `context`. The stored node is left untouched.
    pub fn render(&self, id: &str, context: &Context) -> RenderedNode {
        let text = |t: &Option<String>| t.as_deref().map(|t| render_text(Some(t), context));

        let kind = match &self.kind {
            NodeKind::Info { .. } => RenderedKind::Info,
            NodeKind::Resolution { .. } => RenderedKind::Resolution,
            NodeKind::Input { variable, .. } => RenderedKind::Input {
                variable: variable.clone(),
            },
            NodeKind::Choice { choices } => RenderedKind::Choice {
                labels: choices
                    .iter()
                    .map(|c| render_text(Some(c.label.as_str()), context))
                    .collect(),
            },
        };

        RenderedNode {
            id: id.to_string(),
            title: text(&self.title),
            description: text(&self.description),
            log: text(&self.log),
            requires_read_back: self.requires_read_back(),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendered view
// ---------------------------------------------------------------------------

/// What the agent sees for the current node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNode {
    pub id: NodeId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub log: Option<String>,
    pub requires_read_back: bool,
    pub kind: RenderedKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderedKind {
    Info,
    Choice { labels: Vec<String> },
    Input { variable: String },
    Resolution,
}

impl RenderedNode {
    pub fn node_type(&self) -> NodeType {
        match self.kind {
            RenderedKind::Info => NodeType::Info,
            RenderedKind::Choice { .. } => NodeType::Choice,
            RenderedKind::Input { .. } => NodeType::Input,
            RenderedKind::Resolution => NodeType::Resolution,
        }
    }
}
