// snapshot.rs — Graph persistence
//
// A snapshot is the serializable form of a graph: node records carrying id,
// kind tag, editor position, parameters and code text, and link records
// carrying their own id and both pin ids. Pin ids are not stored per pin;
// they are reproducible from the node id.
//
// Loading never fails on content. Each record that cannot be restored is
// skipped and reported as a warning-level `Diagnostic`; the graph that comes
// back is always valid and has exactly one output node, unless the snapshot
// has none and its ids fill the whole id space. That case is reported as an
// error-level `Diagnostic` and the graph comes back without an output. Links are
// replayed in file order through the same validation as interactive linking,
// so multi-input order survives a round trip.
//
// Side effects: `log::warn!` for every skipped or repaired record.

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::diag::{codes, DiagCode, Diagnostic, Subject};
use crate::error::{GraphError, SnapshotError};
use crate::graph::{Graph, LinkOutcome};
use crate::id::{LinkId, NodeId, PinId, MAX_ID};
use crate::node::Node;
use crate::pin::PinKind;
use crate::registry::NodeKind;

// ── Data shapes ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub kind: String,
    #[serde(default)]
    pub position: [f32; 2],
    /// Absent means "use the kind's defaults".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: LinkId,
    pub start: PinId,
    pub end: PinId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut text = self.to_json()?;
        text.push('\n');
        std::fs::write(path, text).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A restored graph plus everything that had to be skipped or repaired.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub graph: Graph,
    pub diagnostics: Vec<Diagnostic>,
}

// ── Save / load ─────────────────────────────────────────────────────────────

impl Graph {
    /// Capture the graph: nodes in graph order, links in link order.
    pub fn save(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self
                .nodes()
                .iter()
                .map(|n| NodeRecord {
                    id: n.id,
                    kind: n.kind.tag().to_string(),
                    position: n.position,
                    data: Some(n.data.clone()),
                    code: n.code.clone(),
                })
                .collect(),
            links: self
                .links()
                .iter()
                .map(|l| LinkRecord {
                    id: l.id,
                    start: l.start,
                    end: l.end,
                })
                .collect(),
        }
    }

    /// Rebuild a graph from a snapshot.
    pub fn load(snapshot: &GraphSnapshot) -> LoadResult {
        let mut loader = Loader {
            graph: Graph::bare(),
            diagnostics: Vec::new(),
            max_seen: 0,
        };
        for record in &snapshot.nodes {
            loader.restore_node(record);
        }
        for record in &snapshot.links {
            loader.restore_link(record);
        }
        loader.finish()
    }
}

struct Loader {
    graph: Graph,
    diagnostics: Vec<Diagnostic>,
    max_seen: u32,
}

impl Loader {
    fn report(&mut self, code: DiagCode, subject: Subject, message: String, hint: Option<&str>) {
        warn!("load: {}: {}", subject, message);
        let mut diag = Diagnostic::warning(subject, message).with_code(code);
        if let Some(hint) = hint {
            diag = diag.with_hint(hint);
        }
        self.diagnostics.push(diag);
    }

    fn restore_node(&mut self, record: &NodeRecord) {
        let subject = Subject::Node(record.id);

        let Some(kind) = NodeKind::from_tag(&record.kind) else {
            self.report(
                codes::UNKNOWN_NODE_KIND,
                subject,
                format!("unknown node kind '{}', node skipped", record.kind),
                Some("the file may come from a newer version"),
            );
            return;
        };

        if kind == NodeKind::Output {
            if let Some(existing) = self.graph.output_id() {
                self.report(
                    codes::EXTRA_OUTPUT_NODE,
                    subject,
                    format!("second output node skipped; {} is kept", existing),
                    None,
                );
                return;
            }
        }

        let pin_count = kind.definition().pin_count() as u32;
        let last = match record.id.0.checked_add(pin_count) {
            Some(last) if last <= MAX_ID && !self.graph.overlaps(record.id, last) => last,
            Some(last) if last <= MAX_ID => {
                self.report(
                    codes::DUPLICATE_NODE_ID,
                    subject,
                    format!(
                        "id range {}..={} is already in use, node skipped",
                        record.id.0, last
                    ),
                    None,
                );
                return;
            }
            _ => {
                self.report(
                    codes::DUPLICATE_NODE_ID,
                    subject,
                    format!(
                        "id range of {} pins runs past the last id {}, node skipped",
                        pin_count, MAX_ID
                    ),
                    None,
                );
                return;
            }
        };

        let mut node = Node::new(record.id, kind);
        if let Some(data) = &record.data {
            if !node.assign_data(data) {
                self.report(
                    codes::PARAMETER_LENGTH,
                    subject,
                    format!(
                        "{} has {} parameters, found {}",
                        kind,
                        node.data.len(),
                        data.len()
                    ),
                    Some("missing values take their defaults; extra values are dropped"),
                );
            }
        }
        if let (Some(slot), Some(code)) = (node.code.as_mut(), record.code.as_ref()) {
            *slot = code.clone();
        }
        node.position = record.position;

        self.max_seen = self.max_seen.max(last);
        self.graph.insert_restored(node);
    }

    fn restore_link(&mut self, record: &LinkRecord) {
        let subject = Subject::Link(record.id);

        if record.id.0 > MAX_ID {
            self.report(
                codes::DUPLICATE_LINK_ID,
                subject,
                format!("{} is past the last id {}, link skipped", record.id, MAX_ID),
                None,
            );
            return;
        }

        let id_taken = self.graph.link(record.id).is_some()
            || self.graph.overlaps(NodeId(record.id.0), record.id.0);
        if id_taken {
            self.report(
                codes::DUPLICATE_LINK_ID,
                subject,
                format!("{} is already in use, link skipped", record.id),
                None,
            );
            return;
        }

        if self.graph.pin(record.start).is_none() || self.graph.pin(record.end).is_none() {
            self.report(
                codes::INVALID_LINK_ENDPOINTS,
                subject,
                format!(
                    "endpoint {} or {} does not exist, link skipped",
                    record.start, record.end
                ),
                None,
            );
            return;
        }

        // A saved graph holds at most one link per single input. A second one
        // is reported rather than silently replacing the first.
        if let Ok((start, end)) = self.graph.check_link(record.start, record.end) {
            let occupied = self
                .graph
                .pin(end)
                .filter(|p| p.kind == PinKind::Input && p.is_linked() && !p.is_linked_to(start));
            if occupied.is_some() {
                self.report(
                    codes::REJECTED_LINK,
                    subject,
                    format!("{} is already linked, link skipped", end),
                    None,
                );
                return;
            }
        }

        match self.graph.restore_link(record.id, record.start, record.end) {
            Ok(LinkOutcome::Existing(existing)) => self.report(
                codes::REJECTED_LINK,
                subject,
                format!("duplicates {}, link skipped", existing),
                None,
            ),
            Ok(_) => self.max_seen = self.max_seen.max(record.id.0),
            Err(GraphError::RejectedLink(reason)) => self.report(
                codes::REJECTED_LINK,
                subject,
                format!("{}, link skipped", reason),
                None,
            ),
            Err(e) => self.report(
                codes::INVALID_LINK_ENDPOINTS,
                subject,
                format!("{}, link skipped", e),
                None,
            ),
        }
    }

    fn finish(mut self) -> LoadResult {
        self.graph.reseed(self.max_seen);
        if self.graph.output_id().is_none() {
            match self.graph.add_node(NodeKind::Output) {
                Ok(id) => self.report(
                    codes::MISSING_OUTPUT_NODE,
                    Subject::Node(id),
                    "snapshot has no output node; a new one was created".to_string(),
                    None,
                ),
                Err(e) => {
                    let message = format!("snapshot has no output node and {}", e);
                    warn!("load: {}", message);
                    self.diagnostics.push(
                        Diagnostic::error(Subject::Graph, message)
                            .with_code(codes::NO_ROOM_FOR_OUTPUT),
                    );
                }
            }
        }
        debug!(
            "load: {} nodes, {} links, {} diagnostics",
            self.graph.nodes().len(),
            self.graph.links().len(),
            self.diagnostics.len()
        );
        LoadResult {
            graph: self.graph,
            diagnostics: self.diagnostics,
        }
    }
}
