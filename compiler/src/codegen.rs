// codegen.rs — GLSL fragment generation for node graphs
//
// Pull-based: generation starts at the output node pin for the requested
// variant and recursively expands whatever feeds each input. There is no
// memoization; a node reachable along two paths is expanded twice, which is
// correct because expressions are pure. Recursion terminates because the
// graph's link validation keeps it acyclic.
//
// Unconnected inputs fall back to the node's own parameters, either inlined
// as literals or referenced through the uniform array (`uN[i]`), depending on
// the kind's `DefaultPolicy`. The uniform layout is an accumulator threaded
// through one generation pass; every pass starts from an empty layout.
//
// Preconditions: `graph` was built through the `Graph` mutation API.
// Postconditions: identical graph state yields byte-identical source and an
//                 identical uniform layout.
// Failure modes: dangling ids or short parameter vectors → `CodegenError`.
// Side effects: `log::debug!` per pass.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use sha2::{Digest, Sha256};

use crate::error::CodegenError;
use crate::graph::Graph;
use crate::id::NodeId;
use crate::node::Node;
use crate::pin::Pin;
use crate::registry::{DefaultPolicy, NodeKind};

/// Neutral surface used when a boolean node has nothing on its first input.
pub const EMPTY_SURFACE: &str = "Surface(FLOAT_MAX,vec3(0.0),0.0)";

// ── Public types ────────────────────────────────────────────────────────────

/// Downstream shader target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Surface,
    Sky,
    Lights,
}

impl Variant {
    /// Variants in the order `generate_all` runs them.
    pub const ALL: [Variant; 3] = [Variant::Surface, Variant::Sky, Variant::Lights];

    /// Position of the output node input feeding this variant.
    pub fn output_input(self) -> usize {
        match self {
            Variant::Surface => 0,
            Variant::Sky => 1,
            Variant::Lights => 2,
        }
    }

    /// Marker comment in the shader template the fragment is inserted before.
    pub fn marker(self) -> &'static str {
        match self {
            Variant::Surface => "// !sdf_inline",
            Variant::Sky => "// !sky_inline",
            Variant::Lights => "// !lights_inline",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Surface => "surface",
            Variant::Sky => "sky",
            Variant::Lights => "lights",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Name of the uniform float array parameters are read from.
    pub uniform_array: String,
    /// Inline every parameter regardless of kind policy. Produces a shader
    /// that needs no uniform upload.
    pub inline_parameters: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            uniform_array: "uN".to_string(),
            inline_parameters: false,
        }
    }
}

/// One entry of the flattened uniform buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub node: NodeId,
    pub index: usize,
}

/// Maps node parameters to positions in the uniform buffer.
///
/// Append-only within a pass: the first time a node needs a uniform default,
/// its whole parameter vector is appended and the base offset remembered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniformLayout {
    slots: Vec<UniformSlot>,
    bases: BTreeMap<NodeId, usize>,
}

impl UniformLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[UniformSlot] {
        &self.slots
    }

    /// Base offset of `node`'s parameters, if it was appended.
    pub fn base_of(&self, node: NodeId) -> Option<usize> {
        self.bases.get(&node).copied()
    }

    fn base_for(&mut self, node: &Node) -> usize {
        if let Some(base) = self.bases.get(&node.id) {
            return *base;
        }
        let base = self.slots.len();
        self.slots.extend((0..node.data.len()).map(|index| UniformSlot {
            node: node.id,
            index,
        }));
        self.bases.insert(node.id, base);
        base
    }

    /// Read the current parameter values in buffer order. Hosts call this
    /// after a parameter edit to re-upload without regenerating source.
    /// Slots whose node or parameter no longer exists read as 0.0.
    pub fn gather(&self, graph: &Graph) -> Vec<f32> {
        self.slots
            .iter()
            .map(|slot| {
                graph
                    .node(slot.node)
                    .and_then(|n| n.param(slot.index))
                    .unwrap_or(0.0)
            })
            .collect()
    }
}

/// Output of a single-variant generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCode {
    pub source: String,
    pub uniforms: UniformLayout,
}

/// Output of a full pass over every variant with one shared layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderFragments {
    pub surface: String,
    pub sky: String,
    pub lights: String,
    pub uniforms: UniformLayout,
}

impl ShaderFragments {
    pub fn get(&self, variant: Variant) -> &str {
        match variant {
            Variant::Surface => &self.surface,
            Variant::Sky => &self.sky,
            Variant::Lights => &self.lights,
        }
    }

    /// SHA-256 over all three sources, as 64 hex characters. Equal
    /// fingerprints mean the compiled shader can be reused and only the
    /// uniform buffer needs uploading.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for variant in Variant::ALL {
            hasher.update(variant.name().as_bytes());
            hasher.update([0u8]);
            hasher.update(self.get(variant).as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(64);
        for b in digest.iter() {
            use std::fmt::Write;
            let _ = write!(hex, "{:02x}", b);
        }
        hex
    }
}

// ── Public entry points ─────────────────────────────────────────────────────

/// Generate the fragment for one variant. Uniform indices start at 0.
pub fn generate(
    graph: &Graph,
    variant: Variant,
    options: &CodegenOptions,
) -> Result<GeneratedCode, CodegenError> {
    let mut ctx = CodegenCtx::new(graph, options);
    let source = ctx.emit_variant(variant)?;
    debug!(
        "codegen: {} pass, {} bytes, {} uniforms",
        variant,
        source.len(),
        ctx.uniforms.len()
    );
    Ok(GeneratedCode {
        source,
        uniforms: ctx.uniforms,
    })
}

/// Generate every variant in one pass (surface, sky, lights) sharing one
/// uniform layout.
pub fn generate_all(graph: &Graph, options: &CodegenOptions) -> Result<ShaderFragments, CodegenError> {
    let mut ctx = CodegenCtx::new(graph, options);
    let surface = ctx.emit_variant(Variant::Surface)?;
    let sky = ctx.emit_variant(Variant::Sky)?;
    let lights = ctx.emit_variant(Variant::Lights)?;
    debug!("codegen: full pass, {} uniforms", ctx.uniforms.len());
    Ok(ShaderFragments {
        surface,
        sky,
        lights,
        uniforms: ctx.uniforms,
    })
}

/// Format a float as a GLSL literal: always has a decimal point, never an
/// exponent. Non-finite values become `0.0`.
pub fn fmt_float(v: f32) -> String {
    if !v.is_finite() {
        return "0.0".to_string();
    }
    let s = format!("{}", v);
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

// ── Internal context ────────────────────────────────────────────────────────

struct CodegenCtx<'a> {
    graph: &'a Graph,
    options: &'a CodegenOptions,
    uniforms: UniformLayout,
    depth: usize,
}

impl<'a> CodegenCtx<'a> {
    fn new(graph: &'a Graph, options: &'a CodegenOptions) -> Self {
        CodegenCtx {
            graph,
            options,
            uniforms: UniformLayout::new(),
            depth: 0,
        }
    }

    fn emit_variant(&mut self, variant: Variant) -> Result<String, CodegenError> {
        let graph = self.graph;
        let output = graph.output_node().ok_or(CodegenError::NoOutputNode)?;
        let pin = output
            .inputs
            .get(variant.output_input())
            .ok_or(CodegenError::NoSuchInput {
                kind: NodeKind::Output.tag(),
                position: variant.output_input(),
            })?;

        match variant {
            Variant::Surface => Ok(match self.linked(pin)? {
                Some(expr) => format!("s={};", expr),
                None => String::new(),
            }),
            Variant::Sky => Ok(match self.linked(pin)? {
                Some(expr) => format!("sky={};", expr),
                None => String::new(),
            }),
            Variant::Lights => {
                let lights = self.all_linked(pin)?;
                if lights.is_empty() {
                    return Ok(String::new());
                }
                let mut out = String::new();
                for (i, expr) in lights.iter().enumerate() {
                    out.push_str(&format!("l[{}]={};", i, expr));
                }
                out.push_str(&format!("nl={};", lights.len()));
                Ok(out)
            }
        }
    }

    // ── Upstream resolution ─────────────────────────────────────────────

    /// The node and output position on the far side of `pin.links[slot]`.
    fn upstream(&self, pin: &Pin, slot: usize) -> Result<(&'a Node, usize), CodegenError> {
        let graph = self.graph;
        let peer = pin.links[slot];
        let peer_pin = graph.pin(peer).ok_or(CodegenError::DanglingPin(peer))?;
        let node = graph
            .node(peer_pin.node)
            .ok_or(CodegenError::DanglingPin(peer))?;
        let position = node.output_index(peer).ok_or(CodegenError::DanglingPin(peer))?;
        Ok((node, position))
    }

    /// Expression for the first link on `pin`, if linked.
    fn linked(&mut self, pin: &Pin) -> Result<Option<String>, CodegenError> {
        if pin.links.is_empty() {
            return Ok(None);
        }
        let (node, position) = self.upstream(pin, 0)?;
        self.emit_node(node, position).map(Some)
    }

    /// Expressions for every link on `pin`, in link order.
    fn all_linked(&mut self, pin: &Pin) -> Result<Vec<String>, CodegenError> {
        let mut exprs = Vec::with_capacity(pin.links.len());
        for slot in 0..pin.links.len() {
            let (node, position) = self.upstream(pin, slot)?;
            exprs.push(self.emit_node(node, position)?);
        }
        Ok(exprs)
    }

    /// Expression for input `index` of `node`, or `fallback` when unlinked.
    fn input_or(
        &mut self,
        node: &'a Node,
        index: usize,
        fallback: impl FnOnce(&mut Self) -> Result<String, CodegenError>,
    ) -> Result<String, CodegenError> {
        let pin = node.inputs.get(index).ok_or(CodegenError::NoSuchInput {
            kind: node.kind.tag(),
            position: index,
        })?;
        match self.linked(pin)? {
            Some(expr) => Ok(expr),
            None => fallback(self),
        }
    }

    // ── Parameters ──────────────────────────────────────────────────────

    fn policy(&self, node: &Node) -> DefaultPolicy {
        if self.options.inline_parameters {
            DefaultPolicy::Inline
        } else {
            node.definition().policy
        }
    }

    fn raw_param(&self, node: &Node, index: usize) -> Result<f32, CodegenError> {
        node.param(index).ok_or(CodegenError::MissingParameter {
            node: node.id,
            index,
        })
    }

    /// A scalar parameter as either a literal or a uniform reference.
    fn param(&mut self, node: &Node, index: usize) -> Result<String, CodegenError> {
        let value = self.raw_param(node, index)?;
        match self.policy(node) {
            DefaultPolicy::Inline => Ok(fmt_float(value)),
            DefaultPolicy::Uniform => {
                let base = self.uniforms.base_for(node);
                Ok(format!("{}[{}]", self.options.uniform_array, base + index))
            }
        }
    }

    /// Three consecutive parameters as a `vec3(...)` expression.
    fn vec3_param(&mut self, node: &Node, index: usize) -> Result<String, CodegenError> {
        Ok(format!(
            "vec3({},{},{})",
            self.param(node, index)?,
            self.param(node, index + 1)?,
            self.param(node, index + 2)?
        ))
    }

    // ── Per-kind emission ───────────────────────────────────────────────

    /// Expression for output pin `output` of `node`.
    fn emit_node(&mut self, node: &'a Node, output: usize) -> Result<String, CodegenError> {
        if self.depth > self.graph.nodes().len() {
            return Err(CodegenError::RecursionLimit(node.id));
        }
        self.depth += 1;
        let result = self.emit_kind(node, output);
        self.depth -= 1;
        result
    }

    fn emit_kind(&mut self, node: &'a Node, output: usize) -> Result<String, CodegenError> {
        match node.kind {
            NodeKind::Output => Err(CodegenError::NoSuchOutput {
                kind: node.kind.tag(),
                position: output,
            }),

            NodeKind::SurfaceBox => {
                let color = self.input_or(node, 0, |c| c.vec3_param(node, 0))?;
                let position = self.input_or(node, 1, |c| {
                    Ok(format!("pos+{}", c.vec3_param(node, 3)?))
                })?;
                let size = self.input_or(node, 2, |c| c.vec3_param(node, 6))?;
                let roundness = self.input_or(node, 3, |c| c.param(node, 9))?;
                Ok(format!(
                    "Surface(sdfBox({},{},{}),{},0.0)",
                    position, size, roundness, color
                ))
            }

            NodeKind::SurfaceSphere => {
                let color = self.input_or(node, 0, |c| c.vec3_param(node, 0))?;
                let position = self.input_or(node, 1, |c| {
                    Ok(format!("pos+{}", c.vec3_param(node, 3)?))
                })?;
                let radius = self.input_or(node, 2, |c| c.param(node, 6))?;
                Ok(format!(
                    "Surface(sdfSphere({},{}),{},0.0)",
                    position, radius, color
                ))
            }

            NodeKind::SurfaceBoolean => {
                let first_pin = node.inputs.first().ok_or(CodegenError::NoSuchInput {
                    kind: node.kind.tag(),
                    position: 0,
                })?;
                // Without A there is nothing to combine; B is not visited.
                let Some(first) = self.linked(first_pin)? else {
                    return Ok(EMPTY_SURFACE.to_string());
                };
                let rest_pin = node.inputs.get(1).ok_or(CodegenError::NoSuchInput {
                    kind: node.kind.tag(),
                    position: 1,
                })?;
                let rest = self.all_linked(rest_pin)?;
                if rest.is_empty() {
                    return Ok(first);
                }

                let func = match self.raw_param(node, 1)?.round() as i32 {
                    1 => "dSurf",
                    2 => "iSurf",
                    _ => "uSurf",
                };
                let close = if self.raw_param(node, 0)? > 0.0 {
                    format!(",{})", self.param(node, 0)?)
                } else {
                    ")".to_string()
                };

                let mut acc = first;
                for expr in rest {
                    acc = format!("{}({},{}{}", func, acc, expr, close);
                }
                Ok(acc)
            }

            NodeKind::SurfaceCode => Ok(code_or(node, EMPTY_SURFACE)),
            NodeKind::Vec3Code => Ok(code_or(node, "vec3(0.0)")),

            NodeKind::Vec3Translate => {
                let offset = self.vec3_param(node, 0)?;
                let base = self.input_or(node, 0, |_| Ok(String::new()))?;
                if base.is_empty() {
                    Ok(offset)
                } else {
                    Ok(format!("({}+{})", base, offset))
                }
            }

            NodeKind::Vec3Scale => {
                let factor = self.vec3_param(node, 0)?;
                let base = self.input_or(node, 0, |_| Ok(String::new()))?;
                if base.is_empty() {
                    Ok(factor)
                } else {
                    Ok(format!("({}*{})", base, factor))
                }
            }

            NodeKind::Vec3Constant => self.vec3_param(node, 0),

            NodeKind::Vec3Combine => {
                let x = self.input_or(node, 0, |c| c.param(node, 0))?;
                let y = self.input_or(node, 1, |c| c.param(node, 1))?;
                let z = self.input_or(node, 2, |c| c.param(node, 2))?;
                Ok(format!("vec3({},{},{})", x, y, z))
            }

            NodeKind::Vec3Split => {
                let swizzle = match output {
                    0 => "x",
                    1 => "y",
                    2 => "z",
                    _ => {
                        return Err(CodegenError::NoSuchOutput {
                            kind: node.kind.tag(),
                            position: output,
                        })
                    }
                };
                let value = self.input_or(node, 0, |c| c.vec3_param(node, 0))?;
                Ok(format!("({}).{}", value, swizzle))
            }

            NodeKind::FloatConstant => self.param(node, 0),

            NodeKind::FloatMath => {
                let a = self.input_or(node, 0, |c| c.param(node, 0))?;
                let b = self.input_or(node, 1, |c| c.param(node, 1))?;
                Ok(match self.raw_param(node, 2)?.round() as i32 {
                    1 => format!("({}-{})", a, b),
                    2 => format!("({}*{})", a, b),
                    3 => format!("({}/{})", a, b),
                    4 => format!("min({},{})", a, b),
                    5 => format!("max({},{})", a, b),
                    _ => format!("({}+{})", a, b),
                })
            }

            NodeKind::InputPosition => Ok("pos".to_string()),
            NodeKind::InputTime => Ok("t".to_string()),

            NodeKind::LightPoint => {
                let position = self.input_or(node, 0, |c| c.vec3_param(node, 0))?;
                let color = self.input_or(node, 1, |c| c.vec3_param(node, 3))?;
                let intensity = self.input_or(node, 2, |c| c.param(node, 6))?;
                Ok(format!("Light(0,{},{},{})", position, color, intensity))
            }

            NodeKind::LightDirectional => {
                let direction = self.input_or(node, 0, |c| c.vec3_param(node, 0))?;
                let color = self.input_or(node, 1, |c| c.vec3_param(node, 3))?;
                let intensity = self.input_or(node, 2, |c| c.param(node, 6))?;
                Ok(format!(
                    "Light(1,normalize({}),{},{})",
                    direction, color, intensity
                ))
            }
        }
    }
}

/// The stored source of a code node, or `fallback` when it is empty.
fn code_or(node: &Node, fallback: &str) -> String {
    match node.code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => fallback.to_string(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
