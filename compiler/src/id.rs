// id.rs — Stable identifiers for graph entities
//
// Nodes, pins, and links share one flat id space. Pin ids are derived from
// their node's id plus a positional offset, so a node reserves the range
// `id ..= id + pin_count` at construction and the allocator must skip past it.
// Ids are never reused within a graph's lifetime; on load the allocator is
// reseeded past every restored id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Identifier of a pin. Always `owner.0 + 1 + position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(pub u32);

/// Identifier of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin#{}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// Highest id the allocator ever issues. `u32::MAX` stays unused so the
/// counter itself never overflows.
pub const MAX_ID: u32 = u32::MAX - 1;

/// Monotonic allocator over the shared id space. Starts at 1; 0 is never
/// issued so hosts may use it as a null handle.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next allocation will return.
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Claim `span + 1` consecutive ids and return the first, or `None`
    /// when the range would pass `MAX_ID`.
    fn alloc_range(&mut self, span: u32) -> Option<u32> {
        let id = self.next;
        let last = id.checked_add(span).filter(|last| *last <= MAX_ID)?;
        self.next = last + 1;
        Some(id)
    }

    /// Allocate a node id together with the ids of its `pins` pins.
    pub fn alloc_node(&mut self, pins: u32) -> Option<NodeId> {
        self.alloc_range(pins).map(NodeId)
    }

    pub fn alloc_link(&mut self) -> Option<LinkId> {
        self.alloc_range(0).map(LinkId)
    }

    /// Mark every id up to and including `last` as used. Ids above `MAX_ID`
    /// leave the counter parked at `u32::MAX`, where allocation fails.
    pub fn reserve_through(&mut self, last: u32) {
        if last >= self.next {
            self.next = last.saturating_add(1);
        }
    }

    /// Reseed to one past `max_seen`. Never moves the counter backwards.
    pub fn reseed(&mut self, max_seen: u32) {
        self.reserve_through(max_seen);
    }
}
