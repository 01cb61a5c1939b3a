// graph.rs — Node graph ownership and mutation
//
// The graph owns every node and link. Pins refer to their node and to linked
// pins by id only, so removing a node can never leave a dangling reference:
// its links are severed first, then the node is dropped from the list.
//
// Preconditions: none; `Graph::new` creates the permanent output node.
// Postconditions: after every call, committed or rejected, input adjacency is
//                 acyclic, single inputs hold at most one link, and every
//                 link record matches a symmetric pair of adjacency entries.
// Failure modes: rejected mutations return `GraphError` and change nothing.
// Side effects: `log::debug!` on committed mutations.

use std::fmt;

use log::debug;

use crate::error::{GraphError, LinkRejection};
use crate::id::{IdAllocator, LinkId, NodeId, PinId};
use crate::node::Node;
use crate::pin::{Pin, PinKind};
use crate::registry::{self, NodeKind};

// ── Public types ────────────────────────────────────────────────────────────

/// A directed edge from an output pin to an input pin.
///
/// Traversal uses pin adjacency; the link record exists so that links have
/// their own identity for selection, deletion, and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub start: PinId,
    pub end: PinId,
}

/// Result of a successful `create_link`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was added.
    Created(LinkId),
    /// A new link was added after removing the one that occupied the
    /// single-link input.
    Replaced { link: LinkId, replaced: LinkId },
    /// The same link already existed; nothing changed.
    Existing(LinkId),
}

impl LinkOutcome {
    pub fn link(self) -> LinkId {
        match self {
            LinkOutcome::Created(id) | LinkOutcome::Existing(id) => id,
            LinkOutcome::Replaced { link, .. } => link,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    ids: IdAllocator,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

// ── Construction and lookup ─────────────────────────────────────────────────

impl Graph {
    /// Create a graph holding only the output node.
    pub fn new() -> Self {
        let mut graph = Graph::bare();
        let id = NodeId(graph.ids.peek());
        graph.insert_restored(Node::new(id, NodeKind::Output));
        debug!("graph: created {} ({})", id, NodeKind::Output);
        graph
    }

    /// A graph with no nodes at all. Only the loader uses this, and it
    /// guarantees an output node exists before handing the graph out.
    pub(crate) fn bare() -> Self {
        Graph {
            nodes: Vec::new(),
            links: Vec::new(),
            ids: IdAllocator::new(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The id the allocator will issue next.
    pub fn next_id(&self) -> u32 {
        self.ids.peek()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// The permanent output node. Found by kind, never by position.
    pub fn output_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind == NodeKind::Output)
    }

    pub fn output_id(&self) -> Option<NodeId> {
        self.output_node().map(|n| n.id)
    }

    /// The node whose reserved id range contains `pin`.
    pub fn pin_owner(&self, pin: PinId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.owns_pin(pin))
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pin_owner(id).and_then(|n| n.pin(id))
    }

    fn pin_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.nodes
            .iter_mut()
            .find(|n| n.owns_pin(id))
            .and_then(|n| n.pin_mut(id))
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Links ending at `pin`, in creation order.
    pub fn links_into(&self, pin: PinId) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.end == pin)
    }

    /// Every link with an endpoint on `node`.
    pub fn links_of(&self, node: NodeId) -> Vec<LinkId> {
        let Some(n) = self.node(node) else {
            return Vec::new();
        };
        self.links
            .iter()
            .filter(|l| n.owns_pin(l.start) || n.owns_pin(l.end))
            .map(|l| l.id)
            .collect()
    }
}

// ── Node mutation ───────────────────────────────────────────────────────────

impl Graph {
    fn spawn(&mut self, kind: NodeKind) -> Result<NodeId, GraphError> {
        let pins = kind.definition().pin_count() as u32;
        let id = self.ids.alloc_node(pins).ok_or_else(|| {
            debug!("graph: no room for {} at {}", kind, self.ids.peek());
            GraphError::IdSpaceExhausted
        })?;
        debug!("graph: created {} ({})", id, kind);
        self.nodes.push(Node::new(id, kind));
        Ok(id)
    }

    /// Add a node of `kind` with a freshly allocated id.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeId, GraphError> {
        if kind == NodeKind::Output {
            if let Some(existing) = self.output_id() {
                return Err(GraphError::DuplicateOutput(existing));
            }
        }
        self.spawn(kind)
    }

    /// Add a node by persistence tag.
    pub fn add_node_by_tag(&mut self, tag: &str) -> Result<NodeId, GraphError> {
        let def = registry::lookup(tag)?;
        self.add_node(def.kind)
    }

    /// Insert a node restored from a snapshot, keeping its id. The caller has
    /// checked that its id range does not overlap an existing node.
    pub(crate) fn insert_restored(&mut self, node: Node) {
        self.ids.reserve_through(node.last_id());
        self.nodes.push(node);
    }

    /// True if a node with id range `[id, last]` would overlap an existing
    /// node's range.
    pub(crate) fn overlaps(&self, id: NodeId, last: u32) -> bool {
        self.nodes
            .iter()
            .any(|n| id.0 <= n.last_id() && n.id.0 <= last)
    }

    /// Move the allocator past `max_seen`.
    pub(crate) fn reseed(&mut self, max_seen: u32) {
        self.ids.reseed(max_seen);
    }

    /// Remove a node and every link touching it. The output node is never
    /// removed.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let node = self.node(id).ok_or(GraphError::UnknownNode(id))?;
        if node.kind == NodeKind::Output {
            debug!("graph: rejected deletion of output {}", id);
            return Err(GraphError::RejectedDeletion(id));
        }

        for link in self.links_of(id) {
            self.remove_link(link)?;
        }

        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(GraphError::UnknownNode(id))?;
        let node = self.nodes.remove(index);
        debug!("graph: removed {} ({})", id, node.kind);
        Ok(node)
    }

    pub fn set_param(&mut self, node: NodeId, index: usize, value: f32) -> Result<(), GraphError> {
        self.node_mut(node)
            .ok_or(GraphError::UnknownNode(node))?
            .set_param(index, value)
    }

    pub fn set_position(&mut self, node: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        self.node_mut(node)
            .ok_or(GraphError::UnknownNode(node))?
            .position = position;
        Ok(())
    }

    /// Replace the source of a code node.
    pub fn set_code(&mut self, node: NodeId, code: impl Into<String>) -> Result<(), GraphError> {
        let n = self.node_mut(node).ok_or(GraphError::UnknownNode(node))?;
        match n.code.as_mut() {
            Some(slot) => {
                *slot = code.into();
                Ok(())
            }
            None => Err(GraphError::NotACodeNode(node)),
        }
    }
}

// ── Link mutation ───────────────────────────────────────────────────────────

impl Graph {
    /// Validate a candidate pin pair without mutating anything. On success
    /// returns the pair normalized to `(start, end)` with `start` the output.
    pub fn check_link(&self, a: PinId, b: PinId) -> Result<(PinId, PinId), GraphError> {
        let pa = self.pin(a).ok_or(GraphError::UnknownPin(a))?;
        let pb = self.pin(b).ok_or(GraphError::UnknownPin(b))?;

        let rejection = if pa.id == pb.id {
            Some(LinkRejection::SamePin)
        } else if pa.kind == pb.kind {
            Some(LinkRejection::SameKind)
        } else if pa.ty != pb.ty {
            Some(LinkRejection::TypeMismatch(pa.ty, pb.ty))
        } else if pa.node == pb.node {
            Some(LinkRejection::SameNode)
        } else if pa.kind != PinKind::Output && pb.kind != PinKind::Output {
            Some(LinkRejection::NoOutput)
        } else {
            None
        };
        if let Some(reason) = rejection {
            return Err(reason.into());
        }

        let (start, end) = if pa.kind == PinKind::Output {
            (pa, pb)
        } else {
            (pb, pa)
        };

        // An existing identical link is accepted as a no-op before the cycle
        // guard; it cannot introduce a cycle.
        if end.is_linked_to(start.id) {
            return Ok((start.id, end.id));
        }

        let start_node = self.node(start.node).ok_or(GraphError::UnknownNode(start.node))?;
        if start_node.is_ancestor(end.node, self) {
            return Err(LinkRejection::Cycle.into());
        }

        Ok((start.id, end.id))
    }

    /// Link two pins given in either order.
    ///
    /// A single-link input that is already occupied has its old link
    /// replaced; a multi-link input always gets the new link appended.
    /// Rejections are decided before anything is removed.
    pub fn create_link(&mut self, a: PinId, b: PinId) -> Result<LinkOutcome, GraphError> {
        self.commit_link(a, b, None)
    }

    /// Replay a persisted link, keeping its id.
    pub(crate) fn restore_link(
        &mut self,
        id: LinkId,
        start: PinId,
        end: PinId,
    ) -> Result<LinkOutcome, GraphError> {
        self.commit_link(start, end, Some(id))
    }

    fn commit_link(
        &mut self,
        a: PinId,
        b: PinId,
        id: Option<LinkId>,
    ) -> Result<LinkOutcome, GraphError> {
        let (start, end) = match self.check_link(a, b) {
            Ok(pair) => pair,
            Err(e) => {
                debug!("graph: rejected link {} - {}: {}", a, b, e);
                return Err(e);
            }
        };

        if let Some(existing) = self.links.iter().find(|l| l.start == start && l.end == end) {
            return Ok(LinkOutcome::Existing(existing.id));
        }

        let end_kind = self.pin(end).map(|p| p.kind).ok_or(GraphError::UnknownPin(end))?;
        let id = match id {
            Some(id) => {
                self.ids.reserve_through(id.0);
                id
            }
            None => self.ids.alloc_link().ok_or(GraphError::IdSpaceExhausted)?,
        };

        let occupant = if end_kind == PinKind::Input {
            self.links_into(end).next().map(|l| l.id)
        } else {
            None
        };
        if let Some(old) = occupant {
            self.remove_link(old)?;
        }

        self.connect(start, end)?;
        self.links.push(Link { id, start, end });
        debug!("graph: linked {} -> {} as {}", start, end, id);

        Ok(match occupant {
            Some(replaced) => LinkOutcome::Replaced { link: id, replaced },
            None => LinkOutcome::Created(id),
        })
    }

    /// Remove a link and both sides of its adjacency.
    pub fn remove_link(&mut self, id: LinkId) -> Result<Link, GraphError> {
        let index = self
            .links
            .iter()
            .position(|l| l.id == id)
            .ok_or(GraphError::UnknownLink(id))?;
        let link = self.links.remove(index);
        self.disconnect(link.start, link.end);
        debug!("graph: unlinked {}", id);
        Ok(link)
    }

    /// Sever every link on `pin`, removing the matching link records.
    pub fn clear_links(&mut self, pin: PinId) -> Result<usize, GraphError> {
        if self.pin(pin).is_none() {
            return Err(GraphError::UnknownPin(pin));
        }
        let touching: Vec<LinkId> = self
            .links
            .iter()
            .filter(|l| l.start == pin || l.end == pin)
            .map(|l| l.id)
            .collect();
        for link in &touching {
            self.remove_link(*link)?;
        }
        Ok(touching.len())
    }

    /// Symmetric adjacency insert.
    fn connect(&mut self, a: PinId, b: PinId) -> Result<(), GraphError> {
        self.pin_mut(a).ok_or(GraphError::UnknownPin(a))?.attach(b);
        self.pin_mut(b).ok_or(GraphError::UnknownPin(b))?.attach(a);
        Ok(())
    }

    /// Symmetric adjacency removal. Missing pins are ignored.
    fn disconnect(&mut self, a: PinId, b: PinId) {
        if let Some(pin) = self.pin_mut(a) {
            pin.detach(b);
        }
        if let Some(pin) = self.pin_mut(b) {
            pin.detach(a);
        }
    }
}

// ── Structural queries ──────────────────────────────────────────────────────

impl Graph {
    /// True if some node can reach itself through input links. Never true for
    /// a graph built through the public API.
    pub fn has_cycle(&self) -> bool {
        self.nodes.iter().any(|node| {
            node.inputs.iter().flat_map(|p| p.links.iter()).any(|peer| {
                self.pin(*peer)
                    .and_then(|p| self.node(p.node))
                    .is_some_and(|upstream| upstream.is_ancestor(node.id, self))
            })
        })
    }

    /// Check that link records and pin adjacency agree. Returns a description
    /// of the first mismatch.
    pub fn check_consistency(&self) -> Result<(), String> {
        for link in &self.links {
            let start = self
                .pin(link.start)
                .ok_or_else(|| format!("{} starts at missing {}", link.id, link.start))?;
            let end = self
                .pin(link.end)
                .ok_or_else(|| format!("{} ends at missing {}", link.id, link.end))?;
            if !start.is_linked_to(end.id) || !end.is_linked_to(start.id) {
                return Err(format!("{} has no adjacency entry", link.id));
            }
        }
        for node in &self.nodes {
            for pin in node.pins() {
                if pin.kind == PinKind::Input && pin.links.len() > 1 {
                    return Err(format!("{} holds {} links", pin.id, pin.links.len()));
                }
                for peer in &pin.links {
                    let recorded = self.links.iter().any(|l| {
                        (l.start == pin.id && l.end == *peer) || (l.end == pin.id && l.start == *peer)
                    });
                    if !recorded {
                        return Err(format!("{} -> {} has no link record", pin.id, peer));
                    }
                }
            }
        }
        Ok(())
    }
}

// ── Display ─────────────────────────────────────────────────────────────────

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Graph ({} nodes, {} links)",
            self.nodes.len(),
            self.links.len()
        )?;
        for node in &self.nodes {
            writeln!(f, "  {} {} \"{}\"", node.id, node.kind, node.name())?;
        }
        for link in &self.links {
            writeln!(f, "  {}: {} -> {}", link.id, link.start, link.end)?;
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
