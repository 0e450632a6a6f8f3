pub mod graph;
pub mod node;
pub mod scenario;
pub mod store;

use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::{CallSession, CallerType, Context};

use self::graph::Graph;
use self::node::{NodeId, NodeKind, NodeType, RenderedNode};
use self::store::GraphStore;

// ---------------------------------------------------------------------------
// Interpreter state
// ---------------------------------------------------------------------------

/// The flow currently being walked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ActiveFlow {
    graph: Graph,
    current_node_id: NodeId,
    /// Whether this visit of the current node is already in the history.
    /// Only info nodes are logged on read, so only they set it.
    logged: bool,
}

impl ActiveFlow {
    fn move_to(&mut self, next: NodeId) {
        self.current_node_id = next;
        self.logged = false;
    }
}

/// Position within a flow, or nothing when idle. Serializable so a
/// stateless hosting layer can carry it between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpreterState {
    active: Option<ActiveFlow>,
}

// ---------------------------------------------------------------------------
// Transition outcome
// ---------------------------------------------------------------------------

/// Result of a request to move through the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced { from: NodeId, to: NodeId },
    /// The flow ended; the interpreter is idle again.
    Completed { from: NodeId },
    /// The request didn't apply to the current state and was dropped.
    Ignored(Ignored),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ignored {
    NoActiveFlow,
    WrongKind { expected: NodeType, found: NodeType },
    ChoiceOutOfRange { index: i64, len: usize },
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveFlow => f.write_str("no flow in progress"),
            Self::WrongKind { expected, found } => {
                write!(f, "expected a {expected} node, current node is {found}")
            }
            Self::ChoiceOutOfRange { index, len } => {
                write!(f, "choice {index} out of range for {len} choices")
            }
        }
    }
}

impl Transition {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

fn ignore(reason: Ignored) -> Result<Transition> {
    warn!("Ignoring out-of-order flow request: {reason}");
    Ok(Transition::Ignored(reason))
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Walks one call's flows. Owns its position; the call's context and
/// history live in the [`CallSession`] passed to each operation.
pub struct Interpreter<S> {
    store: S,
    state: InterpreterState,
}

impl<S: GraphStore> Interpreter<S> {
    pub fn new(store: S) -> Self {
        Self::with_state(store, InterpreterState::default())
    }

    pub fn with_state(store: S, state: InterpreterState) -> Self {
        Self { store, state }
    }

    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    pub fn into_state(self) -> InterpreterState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active.is_some()
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.state
            .active
            .as_ref()
            .map(|a| a.current_node_id.as_str())
    }

    /// Load a flow and position at its start node. Replaces any flow in
    /// progress; the session's context and history are kept.
    pub fn start_flow(&mut self, caller: CallerType, category: &str, flow: &str) -> Result<()> {
        let graph = self.store.load(caller, category, flow)?;
        graph.start_node()?;

        info!(
            "Flow started: {caller}/{category}/{flow} at node {}",
            graph.start_node_id
        );
        self.state.active = Some(ActiveFlow {
            current_node_id: graph.start_node_id.clone(),
            graph,
            logged: false,
        });
        Ok(())
    }

    /// Render the current node without side effects.
    pub fn render_current(&self, context: &Context) -> Result<Option<RenderedNode>> {
        let Some(active) = &self.state.active else {
            return Ok(None);
        };
        let node = active
            .graph
            .resolve(&active.current_node_id, &active.current_node_id)?;
        Ok(Some(node.render(&active.current_node_id, context)))
    }

    /// Render the current node for display. The first read of an info node
    /// after arriving at it writes it to the history.
    pub fn current_node(&mut self, session: &mut CallSession) -> Result<Option<RenderedNode>> {
        let Some(rendered) = self.render_current(&session.context)? else {
            return Ok(None);
        };
        if let Some(active) = self.state.active.as_mut() {
            if rendered.node_type() == NodeType::Info && !active.logged {
                session.history.append(&rendered, None, None);
                active.logged = true;
            }
        }
        Ok(Some(rendered))
    }

    /// Take choice `choice_index` on the current choice node.
    pub fn advance(&mut self, session: &mut CallSession, choice_index: i64) -> Result<Transition> {
        let Some(active) = self.state.active.as_mut() else {
            return ignore(Ignored::NoActiveFlow);
        };
        let from = active.current_node_id.clone();
        let node = active.graph.resolve(&from, &from)?;

        let NodeKind::Choice { choices } = &node.kind else {
            return ignore(Ignored::WrongKind {
                expected: NodeType::Choice,
                found: node.node_type(),
            });
        };
        let Some(index) = usize::try_from(choice_index)
            .ok()
            .filter(|i| *i < choices.len())
        else {
            return ignore(Ignored::ChoiceOutOfRange {
                index: choice_index,
                len: choices.len(),
            });
        };

        let to = choices[index].next.clone();
        active.graph.resolve(&to, &from)?;

        let rendered = node.render(&from, &session.context);
        session.history.append(&rendered, Some(index), None);

        debug!("Choice {index} taken at {from}");
        info!("Transition: {from} -> {to}");
        active.move_to(to.clone());
        Ok(Transition::Advanced { from, to })
    }

    /// Continue past the current info node.
    pub fn advance_info(&mut self, session: &mut CallSession) -> Result<Transition> {
        let Some(active) = self.state.active.as_mut() else {
            return ignore(Ignored::NoActiveFlow);
        };
        let from = active.current_node_id.clone();
        let node = active.graph.resolve(&from, &from)?;

        let NodeKind::Info { next } = &node.kind else {
            return ignore(Ignored::WrongKind {
                expected: NodeType::Info,
                found: node.node_type(),
            });
        };
        let next = next.clone();
        if let Some(to) = &next {
            active.graph.resolve(to, &from)?;
        }

        // Info nodes must reach the history even if nobody rendered them.
        if !active.logged {
            let rendered = node.render(&from, &session.context);
            session.history.append(&rendered, None, None);
            active.logged = true;
        }

        match next {
            Some(to) => {
                info!("Transition: {from} -> {to}");
                active.move_to(to.clone());
                Ok(Transition::Advanced { from, to })
            }
            None => {
                info!("Flow completed at {from}");
                self.state.active = None;
                Ok(Transition::Completed { from })
            }
        }
    }

    /// Store `value` under the current input node's variable and continue.
    pub fn submit_input(&mut self, session: &mut CallSession, value: &str) -> Result<Transition> {
        let Some(active) = self.state.active.as_mut() else {
            return ignore(Ignored::NoActiveFlow);
        };
        let from = active.current_node_id.clone();
        let node = active.graph.resolve(&from, &from)?;

        let NodeKind::Input { variable, next } = &node.kind else {
            return ignore(Ignored::WrongKind {
                expected: NodeType::Input,
                found: node.node_type(),
            });
        };
        let to = next.clone();
        active.graph.resolve(&to, &from)?;

        session.context.insert(variable.as_str(), value);
        debug!("Context: {variable} = {value:?}");

        // Rendered after the write so the log line can use the new value.
        let rendered = node.render(&from, &session.context);
        session.history.append(&rendered, None, Some(value));

        info!("Transition: {from} -> {to}");
        active.move_to(to.clone());
        Ok(Transition::Advanced { from, to })
    }

    /// The agent's "finish": record where the flow ended and go idle.
    pub fn finish(&mut self, session: &mut CallSession) -> Result<Transition> {
        let Some(rendered) = self.render_current(&session.context)? else {
            return ignore(Ignored::NoActiveFlow);
        };
        let already_logged = self.state.active.as_ref().is_some_and(|a| a.logged);
        if !already_logged {
            session.history.append(&rendered, None, None);
        }

        info!("Flow finished at {}", rendered.id);
        self.state.active = None;
        Ok(Transition::Completed { from: rendered.id })
    }

    /// Drop the flow in progress. Nothing is logged and the session is not
    /// touched.
    pub fn abort(&mut self) {
        if let Some(active) = self.state.active.take() {
            info!("Flow aborted at {}", active.current_node_id);
        }
    }
}
