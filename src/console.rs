use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::error::FlowError;
use crate::flow::node::{RenderedKind, RenderedNode};
use crate::flow::store::GraphStore;
use crate::flow::{Interpreter, Transition};
use crate::session::{CallSession, CallerIdentity, CallerType};

// ---------------------------------------------------------------------------
// Agent input
// ---------------------------------------------------------------------------

/// What the agent asked for at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AgentAction {
    Continue,
    Choose(i64),
    Submit(String),
    Finish,
    Abort,
}

/// Interpret one prompt line against the node on screen. Choices are shown
/// numbered from 1.
fn parse_action(line: &str, node: &RenderedNode) -> Option<AgentAction> {
    let line = line.trim();
    // Single-letter shortcuts would swallow real answers at an input node.
    let shortcuts = !matches!(node.kind, RenderedKind::Input { .. });
    match line.to_lowercase().as_str() {
        "finish" => return Some(AgentAction::Finish),
        "abort" => return Some(AgentAction::Abort),
        "f" if shortcuts => return Some(AgentAction::Finish),
        "a" if shortcuts => return Some(AgentAction::Abort),
        _ => {}
    }

    match &node.kind {
        RenderedKind::Info if line.is_empty() => Some(AgentAction::Continue),
        RenderedKind::Choice { .. } => line.parse::<i64>().ok().map(|n| AgentAction::Choose(n - 1)),
        RenderedKind::Input { .. } if !line.is_empty() => Some(AgentAction::Submit(line.to_string())),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

fn show_node(out: &mut impl Write, node: &RenderedNode) -> Result<()> {
    writeln!(out, "\n== {} ==", node.title.as_deref().unwrap_or(&node.id))?;
    if let Some(description) = node.description.as_deref().filter(|d| !d.is_empty()) {
        if node.requires_read_back {
            writeln!(out, "Read to the customer word for word:")?;
            writeln!(out, "  \"{description}\"")?;
        } else {
            writeln!(out, "{description}")?;
        }
    }

    match &node.kind {
        RenderedKind::Info => writeln!(out, "[Enter] Continue")?,
        RenderedKind::Choice { labels } => {
            for (i, label) in labels.iter().enumerate() {
                writeln!(out, "  [{}] {label}", i + 1)?;
            }
        }
        RenderedKind::Input { variable } => writeln!(out, "Enter {variable}:")?,
        RenderedKind::Resolution => writeln!(out, "Type 'finish' to close this flow.")?,
    }
    writeln!(out, "  ('finish' to end here, 'abort' to drop this flow)")?;
    Ok(())
}

fn read_line(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// Take the caller's details the way the intake form does.
fn take_details(
    input: &mut impl BufRead,
    out: &mut impl Write,
    caller: CallerType,
) -> Result<CallSession> {
    writeln!(out, "New call ({caller})")?;
    let identity = CallerIdentity {
        caller_type: Some(caller),
        calling_number: non_empty(read_line(input, out, "Calling number: ")?),
        issue_number: non_empty(read_line(input, out, "Number discussed: ")?),
        customer_name: non_empty(read_line(input, out, "Customer name: ")?),
    };

    let mut session = CallSession::new(identity);
    let checks = read_line(input, out, "Passed checks (comma separated, blank if none): ")?;
    session.auth_checks = checks
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();
    Ok(session)
}

/// Walk the current flow until it finishes, is aborted, or input runs out.
fn walk_flow<S: GraphStore>(
    interp: &mut Interpreter<S>,
    session: &mut CallSession,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    while let Some(node) = interp.current_node(session)? {
        show_node(out, &node)?;

        let Some(line) = read_line(input, out, "> ")? else {
            interp.abort();
            return Ok(());
        };
        let Some(action) = parse_action(&line, &node) else {
            writeln!(out, "(Not a valid response here.)")?;
            continue;
        };

        let transition = match action {
            AgentAction::Continue => interp.advance_info(session)?,
            AgentAction::Choose(index) => interp.advance(session, index)?,
            AgentAction::Submit(value) => interp.submit_input(session, &value)?,
            AgentAction::Finish => interp.finish(session)?,
            AgentAction::Abort => {
                interp.abort();
                writeln!(out, "Flow abandoned. Nothing from this step was noted.")?;
                return Ok(());
            }
        };

        if let Transition::Ignored(reason) = transition {
            writeln!(out, "(Ignored: {reason})")?;
        }
    }
    Ok(())
}

/// Run one call: caller details, the configured first flow, any further
/// flows the agent opens, then the call note.
pub fn run<S: GraphStore>(
    interp: &mut Interpreter<S>,
    caller: CallerType,
    first_flow: (&str, &str),
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<CallSession> {
    let mut session = take_details(input, out, caller)?;
    let mut next_flow = Some((first_flow.0.to_string(), first_flow.1.to_string()));

    while let Some((category, flow)) = next_flow.take() {
        match interp.start_flow(caller, &category, &flow) {
            Ok(()) => walk_flow(interp, &mut session, input, out)?,
            Err(e @ FlowError::GraphNotFound { .. }) => {
                warn!("{e}");
                writeln!(out, "No such flow: {category}/{flow}")?;
            }
            Err(e) => return Err(e).context("flow definition is unusable"),
        }

        let answer = read_line(input, out, "\nNext flow as category/flow (blank to end call): ")?;
        next_flow = non_empty(answer).and_then(|s| {
            s.split_once('/')
                .map(|(c, f)| (c.trim().to_string(), f.trim().to_string()))
        });
    }

    info!("Call ended with {} history entries", session.history.len());
    writeln!(out, "\n{}", session.call_note())?;
    Ok(session)
}
