use log::debug;
use serde::{Deserialize, Serialize};

use crate::flow::node::{RenderedKind, RenderedNode};

/// One visited node, as it will appear in the call note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Rendered `log` text, or the rendered title when there is none.
    pub message: String,
    pub choice_label: Option<String>,
    pub input_value: Option<String>,
    /// Rendered description of a script that had to be read verbatim.
    pub extended_text: Option<String>,
    /// Copy of `message` for info and resolution nodes.
    pub resolution: Option<String>,
}

/// Visit records in the order they happened. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Record a visit to `node`. `choice` is only honoured for choice nodes
    /// and only when it is in range.
    pub fn append(&mut self, node: &RenderedNode, choice: Option<usize>, input_value: Option<&str>) {
        let message = node
            .log
            .clone()
            .filter(|l| !l.is_empty())
            .or_else(|| node.title.clone())
            .unwrap_or_default();

        let extended_text = if node.requires_read_back {
            node.description.clone().filter(|d| !d.is_empty())
        } else {
            None
        };

        let (choice_label, resolution) = match &node.kind {
            RenderedKind::Choice { labels } => (choice.and_then(|i| labels.get(i).cloned()), None),
            RenderedKind::Info | RenderedKind::Resolution => (None, Some(message.clone())),
            RenderedKind::Input { .. } => (None, None),
        };

        let entry = HistoryEntry {
            message,
            choice_label,
            input_value: input_value.map(str::to_string),
            extended_text,
            resolution,
        };
        debug!("History[{}] <- {} {:?}", self.entries.len(), node.id, entry);
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: RenderedKind, title: &str) -> RenderedNode {
        RenderedNode {
            id: "n".into(),
            title: Some(title.into()),
            description: None,
            log: None,
            requires_read_back: false,
            kind,
        }
    }

    #[test]
    fn test_log_preferred_over_title() {
        let mut history = HistoryLog::new();
        let mut n = node(RenderedKind::Info, "Explain the process");
        history.append(&n, None, None);
        n.log = Some("Explained SIM swap process".into());
        history.append(&n, None, None);

        assert_eq!(history.entries()[0].message, "Explain the process");
        assert_eq!(history.entries()[1].message, "Explained SIM swap process");
        assert_eq!(
            history.entries()[1].resolution.as_deref(),
            Some("Explained SIM swap process")
        );
    }

    #[test]
    fn test_empty_log_falls_back_to_title() {
        let mut history = HistoryLog::new();
        let mut n = node(
            RenderedKind::Choice {
                labels: vec!["Yes".into()],
            },
            "Checked ID",
        );
        n.log = Some(String::new());
        history.append(&n, Some(0), None);

        let entry = history.last().unwrap();
        assert_eq!(entry.message, "Checked ID");
        assert_eq!(entry.choice_label.as_deref(), Some("Yes"));
    }

    #[test]
    fn test_choice_label_attached() {
        let mut history = HistoryLog::new();
        let n = node(
            RenderedKind::Choice {
                labels: vec!["Yes".into(), "No".into()],
            },
            "Checked ID",
        );
        history.append(&n, Some(1), None);
        history.append(&n, Some(7), None);

        let first = &history.entries()[0];
        assert_eq!(first.choice_label.as_deref(), Some("No"));
        assert_eq!(first.resolution, None);
        assert_eq!(history.entries()[1].choice_label, None);
    }

    #[test]
    fn test_input_value_recorded() {
        let mut history = HistoryLog::new();
        let n = node(
            RenderedKind::Input {
                variable: "price".into(),
            },
            "30 Day Plan Price",
        );
        history.append(&n, None, Some("12"));

        let entry = history.last().unwrap();
        assert_eq!(entry.message, "30 Day Plan Price");
        assert_eq!(entry.input_value.as_deref(), Some("12"));
        assert_eq!(entry.resolution, None);
    }

    #[test]
    fn test_read_back_captures_description() {
        let mut history = HistoryLog::new();
        let mut n = node(RenderedKind::Info, "Read TnC Script");
        n.requires_read_back = true;
        n.description = Some("You agree to a 24 month term at £12.".into());
        history.append(&n, None, None);

        let mut plain = node(RenderedKind::Info, "General Info");
        plain.description = Some("Some text".into());
        history.append(&plain, None, None);

        assert_eq!(
            history.entries()[0].extended_text.as_deref(),
            Some("You agree to a 24 month term at £12.")
        );
        assert_eq!(history.entries()[1].extended_text, None);
    }

    #[test]
    fn test_missing_title_gives_empty_message() {
        let mut history = HistoryLog::new();
        let mut n = node(RenderedKind::Resolution, "");
        n.title = None;
        history.append(&n, None, None);
        assert_eq!(history.last().unwrap().message, "");
    }
}
