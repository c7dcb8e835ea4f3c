use crate::bounds::BoundingBox;
use crate::colors::rgb_for_index;
use crate::denormalise::denormalise;
use crate::polyline::entity_to_polyline;
use crate::types::{Drawing, Point};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// An entity references a layer with no layer table entry. The drawing is
    /// inconsistent and the color of the entity cannot be resolved.
    #[error("no layer table entry for layer: {0}")]
    MissingLayer(String),
}

/// Format a coordinate, normalizing `-0` so it never leaks into the markup.
fn fmt(n: f64) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{}", n)
}

/// One `<path/>` element for a polyline. Pure white strokes are rendered as
/// black, since the output background is white.
fn polyline_to_path(rgb: [u8; 3], points: &[Point]) -> String {
    let rgb = if rgb == [255, 255, 255] { [0, 0, 0] } else { rgb };
    let color = format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]);
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        d.push(command);
        d.push_str(&fmt(p.x));
        d.push(',');
        d.push_str(&fmt(p.y));
    }
    format!(
        "<path fill=\"none\" stroke=\"{}\" stroke-width=\"0.1%\" d=\"{}\"/>",
        color, d
    )
}

/// Render a drawing as a framed SVG document.
///
/// Block references are flattened first, each entity is interpolated to a
/// polyline, and the Y axis is flipped so the drawing reads the way CAD
/// software displays it. The viewBox covers the drawing extents with a
/// one-unit margin on every side. Recoverable problems (unsupported
/// entities, unknown color indices) are pushed onto `warnings`; an entity on
/// a layer missing from the layer table is fatal.
pub fn to_svg(drawing: &Drawing, warnings: &mut Vec<String>) -> Result<String, RenderError> {
    let entities = denormalise(drawing, warnings);
    let polylines: Vec<(&str, Vec<Point>)> = entities
        .iter()
        .map(|entity| (entity.layer.as_str(), entity_to_polyline(entity, warnings)))
        .collect();

    let mut bbox = BoundingBox::new();
    for (_, points) in &polylines {
        for p in points {
            bbox.expand_by_point(*p);
        }
    }

    let mut paths = String::new();
    for (layer_name, points) in &polylines {
        let layer = drawing
            .tables
            .layers
            .get(*layer_name)
            .ok_or_else(|| RenderError::MissingLayer(layer_name.to_string()))?;
        let rgb = rgb_for_index(layer.color_number).unwrap_or_else(|| {
            warnings.push(format!(
                "color index {} invalid, defaulting to black",
                layer.color_number
            ));
            [0, 0, 0]
        });
        let flipped: Vec<Point> = points
            .iter()
            .map(|p| Point::new(p.x, bbox.max_y - p.y))
            .collect();
        paths.push_str(&polyline_to_path(rgb, &flipped));
    }

    let view_box = if bbox.is_empty() {
        "-1 -1 2 2".to_string()
    } else {
        format!(
            "{} {} {} {}",
            fmt(bbox.min_x - 1.0),
            fmt(-1.0),
            fmt(bbox.width() + 2.0),
            fmt(bbox.height() + 2.0)
        )
    };

    Ok(format!(
        "<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" \
         xmlns:xlink=\"http://www.w3.org/1999/xlink\" version=\"1.1\" \
         preserveAspectRatio=\"xMinYMin meet\" viewBox=\"{}\" width=\"100%\" \
         height=\"100%\">{}</svg>",
        view_box, paths
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, EntityKind, Layer, Tables};

    fn drawing_with_line(layer: &str, color_number: i32) -> Drawing {
        let mut drawing = Drawing {
            entities: vec![Entity::new(
                EntityKind::Line {
                    start: Point::new(0.0, 0.0),
                    end: Point::new(10.0, 10.0),
                },
                layer,
            )],
            ..Drawing::default()
        };
        drawing.tables = Tables::default();
        drawing.tables.layers.insert(
            layer.to_string(),
            Layer {
                name: layer.to_string(),
                color_number,
            },
        );
        drawing
    }

    #[test]
    fn test_line_renders_with_flipped_y_and_padded_viewbox() {
        let mut warnings = Vec::new();
        let svg = to_svg(&drawing_with_line("0", 1), &mut warnings).unwrap();
        assert!(warnings.is_empty());
        assert!(svg.contains("viewBox=\"-1 -1 12 12\""));
        assert!(svg.contains("d=\"M0,10L10,0\""));
        assert!(svg.contains("stroke=\"#ff0000\""));
    }

    #[test]
    fn test_white_strokes_render_as_black() {
        let mut warnings = Vec::new();
        let svg = to_svg(&drawing_with_line("0", 7), &mut warnings).unwrap();
        assert!(svg.contains("stroke=\"#000000\""));
    }

    #[test]
    fn test_top_grayscale_index_is_white_and_renders_as_black() {
        let mut warnings = Vec::new();
        let svg = to_svg(&drawing_with_line("0", 255), &mut warnings).unwrap();
        assert!(warnings.is_empty());
        assert!(svg.contains("stroke=\"#000000\""));
    }

    #[test]
    fn test_unknown_color_index_warns_and_falls_back_to_black() {
        let mut warnings = Vec::new();
        let svg = to_svg(&drawing_with_line("0", 42), &mut warnings).unwrap();
        assert!(svg.contains("stroke=\"#000000\""));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("42"));
    }

    #[test]
    fn test_missing_layer_is_fatal() {
        let drawing = Drawing {
            entities: vec![Entity::new(
                EntityKind::Line {
                    start: Point::new(0.0, 0.0),
                    end: Point::new(1.0, 1.0),
                },
                "ghost",
            )],
            ..Drawing::default()
        };
        let mut warnings = Vec::new();
        let result = to_svg(&drawing, &mut warnings);
        assert_eq!(result, Err(RenderError::MissingLayer("ghost".to_string())));
    }

    #[test]
    fn test_empty_drawing_still_produces_a_valid_viewbox() {
        let mut warnings = Vec::new();
        let svg = to_svg(&Drawing::default(), &mut warnings).unwrap();
        assert!(svg.contains("viewBox=\"-1 -1 2 2\""));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_unsupported_entity_yields_an_empty_path_and_a_warning() {
        let mut drawing = drawing_with_line("0", 1);
        drawing.entities.push(Entity::new(
            EntityKind::Unsupported {
                type_name: "MTEXT".to_string(),
            },
            "0",
        ));
        let mut warnings = Vec::new();
        let svg = to_svg(&drawing, &mut warnings).unwrap();
        assert!(svg.contains("d=\"\""));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("MTEXT"));
    }
}
