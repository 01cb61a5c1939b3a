// registry.rs — Node definition registry
//
// The catalog of node kinds is closed and known at build time. Each kind maps
// to one immutable `NodeDefinition` stored in a `static`; nothing is
// registered or mutated at runtime. Code generation for a kind is dispatched
// by matching on `NodeKind` in `codegen.rs`.

use std::fmt;

use crate::error::GraphError;
use crate::pin::{PinKind, PinType};

// ── Data types ──────────────────────────────────────────────────────────────

/// Every node kind the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Output,
    SurfaceBox,
    SurfaceSphere,
    SurfaceBoolean,
    SurfaceCode,
    Vec3Translate,
    Vec3Scale,
    Vec3Constant,
    Vec3Combine,
    Vec3Split,
    Vec3Code,
    FloatConstant,
    FloatMath,
    InputPosition,
    InputTime,
    LightPoint,
    LightDirectional,
}

/// How a node fills an unconnected input from its own parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// Parameter values are written into the source as literals. Editing
    /// them requires regenerating the shader.
    Inline,
    /// Parameters are referenced through the uniform array, so editing them
    /// only needs a buffer re-upload.
    Uniform,
}

/// Declared shape of one pin on a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinSpec {
    pub name: &'static str,
    pub ty: PinType,
    pub kind: PinKind,
}

impl PinSpec {
    pub const fn input(name: &'static str, ty: PinType) -> Self {
        PinSpec { name, ty, kind: PinKind::Input }
    }

    pub const fn multi(name: &'static str, ty: PinType) -> Self {
        PinSpec { name, ty, kind: PinKind::InputMulti }
    }

    pub const fn output(name: &'static str, ty: PinType) -> Self {
        PinSpec { name, ty, kind: PinKind::Output }
    }
}

/// Immutable template for a node kind.
#[derive(Debug, PartialEq)]
pub struct NodeDefinition {
    pub kind: NodeKind,
    pub name: &'static str,
    /// Header color (RGB). UI only.
    pub color: [u8; 3],
    /// Preferred widget width in pixels. UI only.
    pub width: f32,
    pub inputs: &'static [PinSpec],
    pub outputs: &'static [PinSpec],
    /// Initial parameter vector copied into every new node.
    pub data: &'static [f32],
    pub policy: DefaultPolicy,
    /// Initial source for free-form code kinds; `None` for every other kind.
    pub code: Option<&'static str>,
}

impl NodeDefinition {
    pub fn pin_count(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }

    pub fn is_code(&self) -> bool {
        self.code.is_some()
    }
}

// ── Catalog ─────────────────────────────────────────────────────────────────

const SURFACE_COLOR: [u8; 3] = [100, 200, 100];
const VEC3_COLOR: [u8; 3] = [200, 100, 100];
const FLOAT_COLOR: [u8; 3] = [170, 170, 170];
const LIGHT_COLOR: [u8; 3] = [230, 200, 90];

static OUTPUT: NodeDefinition = NodeDefinition {
    kind: NodeKind::Output,
    name: "Output",
    color: [200, 100, 100],
    width: 120.0,
    inputs: &[
        PinSpec::input("Surface", PinType::Surface),
        PinSpec::input("Sky", PinType::Vec3),
        PinSpec::multi("Lights", PinType::Light),
    ],
    outputs: &[],
    data: &[],
    policy: DefaultPolicy::Inline,
    code: None,
};

static SURFACE_BOX: NodeDefinition = NodeDefinition {
    kind: NodeKind::SurfaceBox,
    name: "Box",
    color: SURFACE_COLOR,
    width: 140.0,
    inputs: &[
        PinSpec::input("Color", PinType::Vec3),
        PinSpec::input("Position", PinType::Vec3),
        PinSpec::input("Size", PinType::Vec3),
        PinSpec::input("Roundness", PinType::Float),
    ],
    outputs: &[PinSpec::output("Surface", PinType::Surface)],
    data: &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static SURFACE_SPHERE: NodeDefinition = NodeDefinition {
    kind: NodeKind::SurfaceSphere,
    name: "Sphere",
    color: SURFACE_COLOR,
    width: 140.0,
    inputs: &[
        PinSpec::input("Color", PinType::Vec3),
        PinSpec::input("Position", PinType::Vec3),
        PinSpec::input("Radius", PinType::Float),
    ],
    outputs: &[PinSpec::output("Surface", PinType::Surface)],
    data: &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static SURFACE_BOOLEAN: NodeDefinition = NodeDefinition {
    kind: NodeKind::SurfaceBoolean,
    name: "Surface Boolean",
    color: [100, 150, 200],
    width: 120.0,
    inputs: &[
        PinSpec::input("Input A", PinType::Surface),
        PinSpec::multi("Input B,C...", PinType::Surface),
    ],
    outputs: &[PinSpec::output("Surface", PinType::Surface)],
    // smoothing, mode
    data: &[0.0, 0.0],
    policy: DefaultPolicy::Inline,
    code: None,
};

static SURFACE_CODE: NodeDefinition = NodeDefinition {
    kind: NodeKind::SurfaceCode,
    name: "Surface Code",
    color: SURFACE_COLOR,
    width: 220.0,
    inputs: &[],
    outputs: &[PinSpec::output("Surface", PinType::Surface)],
    data: &[],
    policy: DefaultPolicy::Inline,
    code: Some("Surface(sdfSphere(pos,1.0),vec3(1.0),0.0)"),
};

static VEC3_TRANSLATE: NodeDefinition = NodeDefinition {
    kind: NodeKind::Vec3Translate,
    name: "Vec3 Translate",
    color: VEC3_COLOR,
    width: 120.0,
    inputs: &[PinSpec::input("Input", PinType::Vec3)],
    outputs: &[PinSpec::output("Output", PinType::Vec3)],
    data: &[0.0, 0.0, 0.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static VEC3_SCALE: NodeDefinition = NodeDefinition {
    kind: NodeKind::Vec3Scale,
    name: "Vec3 Scale",
    color: VEC3_COLOR,
    width: 120.0,
    inputs: &[PinSpec::input("Input", PinType::Vec3)],
    outputs: &[PinSpec::output("Output", PinType::Vec3)],
    data: &[1.0, 1.0, 1.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static VEC3_CONSTANT: NodeDefinition = NodeDefinition {
    kind: NodeKind::Vec3Constant,
    name: "Vec3",
    color: VEC3_COLOR,
    width: 120.0,
    inputs: &[],
    outputs: &[PinSpec::output("Output", PinType::Vec3)],
    data: &[1.0, 1.0, 1.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static VEC3_COMBINE: NodeDefinition = NodeDefinition {
    kind: NodeKind::Vec3Combine,
    name: "Vec3 Combine",
    color: VEC3_COLOR,
    width: 110.0,
    inputs: &[
        PinSpec::input("X", PinType::Float),
        PinSpec::input("Y", PinType::Float),
        PinSpec::input("Z", PinType::Float),
    ],
    outputs: &[PinSpec::output("Output", PinType::Vec3)],
    data: &[0.0, 0.0, 0.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static VEC3_SPLIT: NodeDefinition = NodeDefinition {
    kind: NodeKind::Vec3Split,
    name: "Vec3 Split",
    color: VEC3_COLOR,
    width: 110.0,
    inputs: &[PinSpec::input("Input", PinType::Vec3)],
    outputs: &[
        PinSpec::output("X", PinType::Float),
        PinSpec::output("Y", PinType::Float),
        PinSpec::output("Z", PinType::Float),
    ],
    data: &[0.0, 0.0, 0.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static VEC3_CODE: NodeDefinition = NodeDefinition {
    kind: NodeKind::Vec3Code,
    name: "Vec3 Code",
    color: VEC3_COLOR,
    width: 220.0,
    inputs: &[],
    outputs: &[PinSpec::output("Output", PinType::Vec3)],
    data: &[],
    policy: DefaultPolicy::Inline,
    code: Some("vec3(0.0)"),
};

static FLOAT_CONSTANT: NodeDefinition = NodeDefinition {
    kind: NodeKind::FloatConstant,
    name: "Float",
    color: FLOAT_COLOR,
    width: 100.0,
    inputs: &[],
    outputs: &[PinSpec::output("Output", PinType::Float)],
    data: &[1.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static FLOAT_MATH: NodeDefinition = NodeDefinition {
    kind: NodeKind::FloatMath,
    name: "Float Math",
    color: FLOAT_COLOR,
    width: 110.0,
    inputs: &[
        PinSpec::input("A", PinType::Float),
        PinSpec::input("B", PinType::Float),
    ],
    outputs: &[PinSpec::output("Output", PinType::Float)],
    // a, b, op
    data: &[0.0, 0.0, 0.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static INPUT_POSITION: NodeDefinition = NodeDefinition {
    kind: NodeKind::InputPosition,
    name: "Position",
    color: VEC3_COLOR,
    width: 90.0,
    inputs: &[],
    outputs: &[PinSpec::output("", PinType::Vec3)],
    data: &[],
    policy: DefaultPolicy::Inline,
    code: None,
};

static INPUT_TIME: NodeDefinition = NodeDefinition {
    kind: NodeKind::InputTime,
    name: "Time",
    color: FLOAT_COLOR,
    width: 90.0,
    inputs: &[],
    outputs: &[PinSpec::output("", PinType::Float)],
    data: &[],
    policy: DefaultPolicy::Inline,
    code: None,
};

static LIGHT_POINT: NodeDefinition = NodeDefinition {
    kind: NodeKind::LightPoint,
    name: "Point Light",
    color: LIGHT_COLOR,
    width: 140.0,
    inputs: &[
        PinSpec::input("Position", PinType::Vec3),
        PinSpec::input("Color", PinType::Vec3),
        PinSpec::input("Intensity", PinType::Float),
    ],
    outputs: &[PinSpec::output("Light", PinType::Light)],
    data: &[0.0, 5.0, 0.0, 1.0, 1.0, 1.0, 1.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

static LIGHT_DIRECTIONAL: NodeDefinition = NodeDefinition {
    kind: NodeKind::LightDirectional,
    name: "Directional Light",
    color: LIGHT_COLOR,
    width: 140.0,
    inputs: &[
        PinSpec::input("Direction", PinType::Vec3),
        PinSpec::input("Color", PinType::Vec3),
        PinSpec::input("Intensity", PinType::Float),
    ],
    outputs: &[PinSpec::output("Light", PinType::Light)],
    data: &[0.0, -1.0, 0.0, 1.0, 1.0, 1.0, 1.0],
    policy: DefaultPolicy::Uniform,
    code: None,
};

/// All node kinds in catalog order.
pub const ALL_KINDS: [NodeKind; 17] = [
    NodeKind::Output,
    NodeKind::SurfaceBox,
    NodeKind::SurfaceSphere,
    NodeKind::SurfaceBoolean,
    NodeKind::SurfaceCode,
    NodeKind::Vec3Translate,
    NodeKind::Vec3Scale,
    NodeKind::Vec3Constant,
    NodeKind::Vec3Combine,
    NodeKind::Vec3Split,
    NodeKind::Vec3Code,
    NodeKind::FloatConstant,
    NodeKind::FloatMath,
    NodeKind::InputPosition,
    NodeKind::InputTime,
    NodeKind::LightPoint,
    NodeKind::LightDirectional,
];

impl NodeKind {
    /// The definition for this kind.
    pub fn definition(self) -> &'static NodeDefinition {
        match self {
            NodeKind::Output => &OUTPUT,
            NodeKind::SurfaceBox => &SURFACE_BOX,
            NodeKind::SurfaceSphere => &SURFACE_SPHERE,
            NodeKind::SurfaceBoolean => &SURFACE_BOOLEAN,
            NodeKind::SurfaceCode => &SURFACE_CODE,
            NodeKind::Vec3Translate => &VEC3_TRANSLATE,
            NodeKind::Vec3Scale => &VEC3_SCALE,
            NodeKind::Vec3Constant => &VEC3_CONSTANT,
            NodeKind::Vec3Combine => &VEC3_COMBINE,
            NodeKind::Vec3Split => &VEC3_SPLIT,
            NodeKind::Vec3Code => &VEC3_CODE,
            NodeKind::FloatConstant => &FLOAT_CONSTANT,
            NodeKind::FloatMath => &FLOAT_MATH,
            NodeKind::InputPosition => &INPUT_POSITION,
            NodeKind::InputTime => &INPUT_TIME,
            NodeKind::LightPoint => &LIGHT_POINT,
            NodeKind::LightDirectional => &LIGHT_DIRECTIONAL,
        }
    }

    /// Stable persistence tag.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Output => "output",
            NodeKind::SurfaceBox => "surface_box",
            NodeKind::SurfaceSphere => "surface_sphere",
            NodeKind::SurfaceBoolean => "surface_boolean",
            NodeKind::SurfaceCode => "surface_code",
            NodeKind::Vec3Translate => "vec3_translate",
            NodeKind::Vec3Scale => "vec3_scale",
            NodeKind::Vec3Constant => "vec3_constant",
            NodeKind::Vec3Combine => "vec3_combine",
            NodeKind::Vec3Split => "vec3_split",
            NodeKind::Vec3Code => "vec3_code",
            NodeKind::FloatConstant => "float_constant",
            NodeKind::FloatMath => "float_math",
            NodeKind::InputPosition => "input_position",
            NodeKind::InputTime => "input_time",
            NodeKind::LightPoint => "light_point",
            NodeKind::LightDirectional => "light_directional",
        }
    }

    pub fn from_tag(tag: &str) -> Option<NodeKind> {
        ALL_KINDS.iter().copied().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Look up a definition by persistence tag.
pub fn lookup(tag: &str) -> Result<&'static NodeDefinition, GraphError> {
    NodeKind::from_tag(tag)
        .map(NodeKind::definition)
        .ok_or_else(|| GraphError::UnknownNodeKind(tag.to_string()))
}

/// Kinds a user may add from a menu, grouped by category in display order.
/// The output node is excluded since a graph always has exactly one.
pub fn menu() -> Vec<(&'static str, Vec<NodeKind>)> {
    vec![
        (
            "Surface",
            vec![
                NodeKind::SurfaceBox,
                NodeKind::SurfaceSphere,
                NodeKind::SurfaceBoolean,
                NodeKind::SurfaceCode,
            ],
        ),
        (
            "Vec3",
            vec![
                NodeKind::Vec3Translate,
                NodeKind::Vec3Scale,
                NodeKind::Vec3Constant,
                NodeKind::Vec3Combine,
                NodeKind::Vec3Split,
                NodeKind::Vec3Code,
            ],
        ),
        ("Float", vec![NodeKind::FloatConstant, NodeKind::FloatMath]),
        ("Input", vec![NodeKind::InputPosition, NodeKind::InputTime]),
        ("Light", vec![NodeKind::LightPoint, NodeKind::LightDirectional]),
    ]
}
