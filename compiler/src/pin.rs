// pin.rs — Typed connection endpoints
//
// A pin stores adjacency as ids of the pins on the other end of its links.
// Pins enforce no link rules; validation lives in `Graph::create_link`.

use serde::{Deserialize, Serialize};

use crate::id::{NodeId, PinId};

/// Value domain carried over a pin. Links only join pins of equal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinType {
    Vec3,
    Float,
    Surface,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinKind {
    Output,
    /// Accepts at most one link.
    Input,
    /// Accepts any number of links; link order is evaluation order.
    InputMulti,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: PinId,
    pub ty: PinType,
    pub kind: PinKind,
    pub name: &'static str,
    /// Owning node. Non-owning back reference.
    pub node: NodeId,
    /// Pins on the other end of this pin's links, in link order.
    pub links: Vec<PinId>,
}

impl Pin {
    pub fn new(id: PinId, name: &'static str, ty: PinType, kind: PinKind, node: NodeId) -> Self {
        Self {
            id,
            ty,
            kind,
            name,
            node,
            links: Vec::new(),
        }
    }

    pub fn is_linked(&self) -> bool {
        !self.links.is_empty()
    }

    pub fn is_linked_to(&self, other: PinId) -> bool {
        self.links.contains(&other)
    }

    /// Record one side of a link.
    pub fn attach(&mut self, other: PinId) {
        self.links.push(other);
    }

    /// Drop one side of a link. Returns false if `other` was not attached.
    pub fn detach(&mut self, other: PinId) -> bool {
        match self.links.iter().position(|p| *p == other) {
            Some(index) => {
                self.links.remove(index);
                true
            }
            None => false,
        }
    }
}
