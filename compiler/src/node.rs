// node.rs — Node instances
//
// A node is an instance of a `NodeDefinition`: an id, concrete pins cloned
// from the definition's pin specs, and a mutable parameter vector.
//
// Pin ids are `id + 1, id + 2, ...` in declaration order, inputs first. This
// makes pin ids reproducible from a node id alone, which persisted links rely
// on.

use std::collections::HashSet;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::id::{NodeId, PinId};
use crate::pin::Pin;
use crate::registry::{NodeDefinition, NodeKind};

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub inputs: Vec<Pin>,
    pub outputs: Vec<Pin>,
    /// Editable parameters. Same length as the definition's defaults.
    pub data: Vec<f32>,
    /// Source text for code kinds.
    pub code: Option<String>,
    /// Editor position. Carried for persistence only.
    pub position: [f32; 2],
    last_id: u32,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        let def = kind.definition();
        let mut next = id.0;
        let mut make = |spec: &crate::registry::PinSpec| {
            next += 1;
            Pin::new(PinId(next), spec.name, spec.ty, spec.kind, id)
        };
        let inputs: Vec<Pin> = def.inputs.iter().map(&mut make).collect();
        let outputs: Vec<Pin> = def.outputs.iter().map(&mut make).collect();

        Node {
            id,
            kind,
            inputs,
            outputs,
            data: def.data.to_vec(),
            code: def.code.map(str::to_string),
            position: [0.0, 0.0],
            last_id: id.0 + def.pin_count() as u32,
        }
    }

    pub fn definition(&self) -> &'static NodeDefinition {
        self.kind.definition()
    }

    pub fn name(&self) -> &'static str {
        self.definition().name
    }

    /// Highest id reserved by this node (its last pin, or the node id itself
    /// when it has no pins).
    pub fn last_id(&self) -> u32 {
        self.last_id
    }

    /// True if `pin` falls inside this node's reserved id range.
    pub fn owns_pin(&self, pin: PinId) -> bool {
        pin.0 > self.id.0 && pin.0 <= self.last_id
    }

    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    pub fn pins_mut(&mut self) -> impl Iterator<Item = &mut Pin> {
        self.inputs.iter_mut().chain(self.outputs.iter_mut())
    }

    /// Linear scan over inputs, then outputs.
    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins().find(|p| p.id == id)
    }

    pub fn pin_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.pins_mut().find(|p| p.id == id)
    }

    /// Position of an output pin within `outputs`.
    pub fn output_index(&self, id: PinId) -> Option<usize> {
        self.outputs.iter().position(|p| p.id == id)
    }

    pub fn param(&self, index: usize) -> Option<f32> {
        self.data.get(index).copied()
    }

    pub fn set_param(&mut self, index: usize, value: f32) -> Result<(), GraphError> {
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(GraphError::ParameterOutOfRange {
                node: self.id,
                index,
            }),
        }
    }

    /// Replace the parameter vector, keeping the definition's length: missing
    /// tail values keep their defaults and surplus values are dropped.
    /// Returns false when the lengths differed.
    pub fn assign_data(&mut self, values: &[f32]) -> bool {
        let len = self.data.len();
        for (slot, value) in self.data.iter_mut().zip(values) {
            *slot = *value;
        }
        values.len() == len
    }

    /// True if `target` is this node or can be reached from it by walking
    /// input links upstream. Used as the cycle guard before committing a link.
    pub fn is_ancestor(&self, target: NodeId, graph: &Graph) -> bool {
        if self.id == target {
            return true;
        }
        let mut visited = HashSet::new();
        let mut stack = vec![self];
        visited.insert(self.id);

        while let Some(node) = stack.pop() {
            for input in &node.inputs {
                for peer in &input.links {
                    let Some(upstream) = graph.pin(*peer).map(|p| p.node) else {
                        continue;
                    };
                    if upstream == target {
                        return true;
                    }
                    if visited.insert(upstream) {
                        if let Some(next) = graph.node(upstream) {
                            stack.push(next);
                        }
                    }
                }
            }
        }
        false
    }
}
