// aktino — node graph core for an SDF raymarcher
//
// Library root. The graph model (`id`, `pin`, `registry`, `node`, `graph`)
// is mutated by an editor; `codegen` pulls GLSL fragments out of it and
// `template` splices them into the renderer's shader.

pub mod codegen;
pub mod demo;
pub mod diag;
pub mod dot;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod pin;
pub mod registry;
pub mod snapshot;
pub mod template;
