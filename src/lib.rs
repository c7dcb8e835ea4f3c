//! # dxf-tools
//!
//! A Rust library for converting DXF CAD drawings to flat polyline geometry
//! and SVG.
//!
//! ## Features
//!
//! - **DXF parsing**: Group-code/value text into a structured drawing
//!   (header, layer table, blocks, entities)
//! - **Denormalisation**: Block references flattened into plain entities
//!   carrying their accumulated transforms
//! - **Polyline interpolation**: Lines, polylines with bulge arcs, circles,
//!   arcs, ellipses, and splines sampled to flat point sequences
//! - **SVG rendering**: Layer-colored paths in a padded, Y-flipped viewBox
//!
//! ## Example
//!
//! ```rust,ignore
//! use dxf_tools::{parse_string, to_svg};
//!
//! let dxf_content = std::fs::read_to_string("example.dxf").unwrap();
//! let drawing = parse_string(&dxf_content);
//! let mut warnings = Vec::new();
//! let svg = to_svg(&drawing, &mut warnings).unwrap();
//! std::fs::write("output.svg", svg).unwrap();
//! ```

pub mod bounds;
pub mod colors;
pub mod denormalise;
pub mod parser;
pub mod polyline;
pub mod svg;
pub mod types;

// Re-export commonly used items
pub use denormalise::{denormalise, group_entities_by_layer};
pub use parser::parse_string;
pub use polyline::entity_to_polyline;
pub use svg::{RenderError, to_svg};
pub use types::{Drawing, Entity, EntityKind, Point, Transform, Vertex};
