use std::collections::HashMap;

/// 2D point. Z coordinates in the source file are dropped during parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Polyline vertex. A non-zero bulge turns the segment leaving this vertex
/// into a circular arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }
}

/// One block-insertion transform. Absent fields are no-ops. `rotation` is in
/// degrees; it is converted to radians when the transform is applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub x_scale: Option<f64>,
    pub y_scale: Option<f64>,
    pub rotation: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// The geometric payload of an entity, one variant per supported DXF kind.
///
/// Angle units differ by kind on purpose: `Arc` carries degrees (group codes
/// 50/51), `Ellipse` carries radians (group codes 41/42). The dispatcher in
/// `polyline` owns the conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Line {
        start: Point,
        end: Point,
    },
    Polyline {
        vertices: Vec<Vertex>,
        closed: bool,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Ellipse {
        center: Point,
        major_x: f64,
        major_y: f64,
        axis_ratio: f64,
        /// Start angle in radians.
        start_angle: f64,
        /// End angle in radians.
        end_angle: f64,
        extrusion_z: f64,
    },
    Arc {
        center: Point,
        radius: f64,
        /// Start angle in degrees.
        start_angle: f64,
        /// End angle in degrees.
        end_angle: f64,
        extrusion_z: f64,
    },
    Spline {
        control_points: Vec<Point>,
        degree: usize,
        knots: Vec<f64>,
    },
    /// Block reference. Removed by `denormalise`; if one survives to polyline
    /// conversion it is reported as unsupported.
    Insert {
        block: String,
        x: f64,
        y: f64,
        x_scale: Option<f64>,
        y_scale: Option<f64>,
        rotation: Option<f64>,
    },
    /// Any entity kind the parser does not model, kept so the conversion can
    /// name it in a warning.
    Unsupported {
        type_name: String,
    },
}

impl EntityKind {
    /// The DXF type name, for diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            EntityKind::Line { .. } => "LINE",
            EntityKind::Polyline { .. } => "POLYLINE",
            EntityKind::Circle { .. } => "CIRCLE",
            EntityKind::Ellipse { .. } => "ELLIPSE",
            EntityKind::Arc { .. } => "ARC",
            EntityKind::Spline { .. } => "SPLINE",
            EntityKind::Insert { .. } => "INSERT",
            EntityKind::Unsupported { type_name } => type_name,
        }
    }
}

/// A drawing entity: geometry plus its layer and the transforms inherited
/// from enclosing block insertions (outer-to-inner, applied left-to-right).
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub layer: String,
    pub transforms: Vec<Transform>,
}

impl Entity {
    pub fn new(kind: EntityKind, layer: impl Into<String>) -> Self {
        Self {
            kind,
            layer: layer.into(),
            transforms: Vec::new(),
        }
    }
}

/// Layer table record.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub color_number: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tables {
    pub layers: HashMap<String, Layer>,
}

/// Header variables the renderer cares about. Extents are informational; the
/// SVG viewBox is computed from the interpolated points, not from these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub ext_min: Option<Point>,
    pub ext_max: Option<Point>,
}

/// Block definition: a named group of entities with a base point.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub entities: Vec<Entity>,
}

/// A parsed DXF document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub header: Header,
    pub tables: Tables,
    pub blocks: Vec<Block>,
    pub entities: Vec<Entity>,
}
