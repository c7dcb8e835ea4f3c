use crate::types::*;
use std::f64::consts::PI;

/// Layer entities land on when the file names none.
const DEFAULT_LAYER: &str = "0";

fn parse_float(value: &str) -> f64 {
    value.trim().parse().unwrap_or(0.0)
}

fn parse_int(value: &str) -> i32 {
    value.trim().parse().unwrap_or(0)
}

/// Pair up alternating group-code / value lines. A line that fails to parse
/// as a code keeps its slot so the code/value alternation stays aligned.
fn to_pairs(source: &str) -> Vec<(i32, String)> {
    let mut pairs = Vec::new();
    let mut lines = source.lines();
    while let (Some(code_line), Some(value_line)) = (lines.next(), lines.next()) {
        let code = code_line.trim().parse().unwrap_or(-1);
        pairs.push((code, value_line.trim_end().to_string()));
    }
    pairs
}

/// Split the pair stream into named sections delimited by
/// `(0, SECTION) (2, name) ... (0, ENDSEC)`.
fn split_sections(pairs: &[(i32, String)]) -> Vec<(&str, &[(i32, String)])> {
    let mut sections = Vec::new();
    let mut start: Option<usize> = None;
    for (i, (code, value)) in pairs.iter().enumerate() {
        if *code == 0 && value == "SECTION" {
            start = Some(i + 1);
        } else if *code == 0 && value == "ENDSEC" {
            if let Some(s) = start.take() {
                if let Some(((name_code, name), content)) = pairs[s..i].split_first() {
                    if *name_code == 2 {
                        sections.push((name.as_str(), content));
                    }
                }
            }
        }
    }
    sections
}

/// Split section content into records, each starting at a `(0, TYPE)` pair.
fn split_records(content: &[(i32, String)]) -> Vec<(&str, &[(i32, String)])> {
    let mut starts: Vec<usize> = content
        .iter()
        .enumerate()
        .filter(|(_, (code, _))| *code == 0)
        .map(|(i, _)| i)
        .collect();
    starts.push(content.len());
    starts
        .windows(2)
        .map(|w| (content[w[0]].1.as_str(), &content[w[0] + 1..w[1]]))
        .collect()
}

fn layer_of(body: &[(i32, String)]) -> String {
    body.iter()
        .find(|(code, _)| *code == 8)
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_else(|| DEFAULT_LAYER.to_string())
}

fn parse_header(content: &[(i32, String)]) -> Header {
    let mut header = Header::default();
    let mut variable: Option<&str> = None;
    let mut x = 0.0;
    for (code, value) in content {
        match code {
            9 => variable = Some(value.trim()),
            10 => x = parse_float(value),
            20 => {
                let point = Point::new(x, parse_float(value));
                match variable {
                    Some("$EXTMIN") => header.ext_min = Some(point),
                    Some("$EXTMAX") => header.ext_max = Some(point),
                    _ => {}
                }
            }
            _ => {}
        }
    }
    header
}

fn parse_tables(content: &[(i32, String)]) -> Tables {
    let mut tables = Tables::default();
    for (kind, body) in split_records(content) {
        if kind != "LAYER" {
            continue;
        }
        let mut name = None;
        // 7 (white) is the format's default color.
        let mut color_number = 7;
        for (code, value) in body {
            match code {
                2 => name = Some(value.trim().to_string()),
                62 => color_number = parse_int(value),
                _ => {}
            }
        }
        if let Some(name) = name {
            tables
                .layers
                .insert(name.clone(), Layer { name, color_number });
        }
    }
    tables
}

fn parse_line(body: &[(i32, String)]) -> Entity {
    let mut start = Point::new(0.0, 0.0);
    let mut end = Point::new(0.0, 0.0);
    for (code, value) in body {
        match code {
            10 => start.x = parse_float(value),
            20 => start.y = parse_float(value),
            11 => end.x = parse_float(value),
            21 => end.y = parse_float(value),
            _ => {}
        }
    }
    Entity::new(EntityKind::Line { start, end }, layer_of(body))
}

fn parse_lwpolyline(body: &[(i32, String)]) -> Entity {
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut closed = false;
    for (code, value) in body {
        match code {
            70 => closed = parse_int(value) & 0x01 == 0x01,
            10 => vertices.push(Vertex::new(parse_float(value), 0.0)),
            20 => {
                if let Some(vertex) = vertices.last_mut() {
                    vertex.y = parse_float(value);
                }
            }
            42 => {
                if let Some(vertex) = vertices.last_mut() {
                    vertex.bulge = parse_float(value);
                }
            }
            _ => {}
        }
    }
    Entity::new(EntityKind::Polyline { vertices, closed }, layer_of(body))
}

fn parse_vertex(body: &[(i32, String)]) -> Vertex {
    let mut vertex = Vertex::new(0.0, 0.0);
    for (code, value) in body {
        match code {
            10 => vertex.x = parse_float(value),
            20 => vertex.y = parse_float(value),
            42 => vertex.bulge = parse_float(value),
            _ => {}
        }
    }
    vertex
}

fn parse_circle(body: &[(i32, String)]) -> Entity {
    let mut center = Point::new(0.0, 0.0);
    let mut radius = 0.0;
    for (code, value) in body {
        match code {
            10 => center.x = parse_float(value),
            20 => center.y = parse_float(value),
            40 => radius = parse_float(value),
            _ => {}
        }
    }
    Entity::new(EntityKind::Circle { center, radius }, layer_of(body))
}

fn parse_arc(body: &[(i32, String)]) -> Entity {
    let mut center = Point::new(0.0, 0.0);
    let mut radius = 0.0;
    // Arc angles stay in degrees here; conversion belongs to the dispatcher.
    let mut start_angle = 0.0;
    let mut end_angle = 360.0;
    let mut extrusion_z = 1.0;
    for (code, value) in body {
        match code {
            10 => center.x = parse_float(value),
            20 => center.y = parse_float(value),
            40 => radius = parse_float(value),
            50 => start_angle = parse_float(value),
            51 => end_angle = parse_float(value),
            230 => extrusion_z = parse_float(value),
            _ => {}
        }
    }
    Entity::new(
        EntityKind::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            extrusion_z,
        },
        layer_of(body),
    )
}

fn parse_ellipse(body: &[(i32, String)]) -> Entity {
    let mut center = Point::new(0.0, 0.0);
    let mut major_x = 0.0;
    let mut major_y = 0.0;
    let mut axis_ratio = 1.0;
    let mut start_angle = 0.0;
    let mut end_angle = PI * 2.0;
    let mut extrusion_z = 1.0;
    for (code, value) in body {
        match code {
            10 => center.x = parse_float(value),
            20 => center.y = parse_float(value),
            11 => major_x = parse_float(value),
            21 => major_y = parse_float(value),
            40 => axis_ratio = parse_float(value),
            41 => start_angle = parse_float(value),
            42 => end_angle = parse_float(value),
            230 => extrusion_z = parse_float(value),
            _ => {}
        }
    }
    Entity::new(
        EntityKind::Ellipse {
            center,
            major_x,
            major_y,
            axis_ratio,
            start_angle,
            end_angle,
            extrusion_z,
        },
        layer_of(body),
    )
}

fn parse_spline(body: &[(i32, String)]) -> Entity {
    let mut control_points: Vec<Point> = Vec::new();
    let mut degree = 3;
    let mut knots = Vec::new();
    for (code, value) in body {
        match code {
            71 => degree = parse_int(value).max(1) as usize,
            40 => knots.push(parse_float(value)),
            10 => control_points.push(Point::new(parse_float(value), 0.0)),
            20 => {
                if let Some(point) = control_points.last_mut() {
                    point.y = parse_float(value);
                }
            }
            _ => {}
        }
    }
    Entity::new(
        EntityKind::Spline {
            control_points,
            degree,
            knots,
        },
        layer_of(body),
    )
}

fn parse_insert(body: &[(i32, String)]) -> Entity {
    let mut block = String::new();
    let mut x = 0.0;
    let mut y = 0.0;
    let mut x_scale = None;
    let mut y_scale = None;
    let mut rotation = None;
    for (code, value) in body {
        match code {
            2 => block = value.trim().to_string(),
            10 => x = parse_float(value),
            20 => y = parse_float(value),
            41 => x_scale = Some(parse_float(value)),
            42 => y_scale = Some(parse_float(value)),
            50 => rotation = Some(parse_float(value)),
            _ => {}
        }
    }
    Entity::new(
        EntityKind::Insert {
            block,
            x,
            y,
            x_scale,
            y_scale,
            rotation,
        },
        layer_of(body),
    )
}

fn parse_entity_records(records: &[(&str, &[(i32, String)])]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut i = 0;
    while i < records.len() {
        let (kind, body) = records[i];
        match kind {
            "LINE" => entities.push(parse_line(body)),
            "LWPOLYLINE" => entities.push(parse_lwpolyline(body)),
            "POLYLINE" => {
                // Old-style polyline: vertices follow as their own records,
                // terminated by SEQEND.
                let layer = layer_of(body);
                let closed = body
                    .iter()
                    .find(|(code, _)| *code == 70)
                    .map(|(_, value)| parse_int(value) & 0x01 == 0x01)
                    .unwrap_or(false);
                let mut vertices = Vec::new();
                i += 1;
                while i < records.len() && records[i].0 == "VERTEX" {
                    vertices.push(parse_vertex(records[i].1));
                    i += 1;
                }
                if i < records.len() && records[i].0 == "SEQEND" {
                    i += 1;
                }
                entities.push(Entity::new(
                    EntityKind::Polyline { vertices, closed },
                    layer,
                ));
                continue;
            }
            "CIRCLE" => entities.push(parse_circle(body)),
            "ARC" => entities.push(parse_arc(body)),
            "ELLIPSE" => entities.push(parse_ellipse(body)),
            "SPLINE" => entities.push(parse_spline(body)),
            "INSERT" => entities.push(parse_insert(body)),
            other => entities.push(Entity::new(
                EntityKind::Unsupported {
                    type_name: other.to_string(),
                },
                layer_of(body),
            )),
        }
        i += 1;
    }
    entities
}

fn parse_blocks(content: &[(i32, String)]) -> Vec<Block> {
    let records = split_records(content);
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < records.len() {
        if records[i].0 != "BLOCK" {
            i += 1;
            continue;
        }
        let mut name = String::new();
        let mut x = 0.0;
        let mut y = 0.0;
        for (code, value) in records[i].1 {
            match code {
                2 => name = value.trim().to_string(),
                10 => x = parse_float(value),
                20 => y = parse_float(value),
                _ => {}
            }
        }
        let body_start = i + 1;
        let mut j = body_start;
        while j < records.len() && records[j].0 != "ENDBLK" {
            j += 1;
        }
        let entities = parse_entity_records(&records[body_start..j]);
        blocks.push(Block {
            name,
            x,
            y,
            entities,
        });
        i = j + 1;
    }
    blocks
}

/// Parse a DXF document. Parsing is lenient: malformed numerics fall back to
/// defaults, unknown group codes are skipped, and unknown entity kinds are
/// preserved as `EntityKind::Unsupported` so rendering can name them in a
/// warning instead of aborting.
pub fn parse_string(source: &str) -> Drawing {
    let pairs = to_pairs(source);
    let mut drawing = Drawing::default();
    for (name, content) in split_sections(&pairs) {
        match name {
            "HEADER" => drawing.header = parse_header(content),
            "TABLES" => drawing.tables = parse_tables(content),
            "BLOCKS" => drawing.blocks = parse_blocks(content),
            "ENTITIES" => drawing.entities = parse_entity_records(&split_records(content)),
            _ => {}
        }
    }
    drawing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dxf(pairs: &[(&str, &str)]) -> String {
        pairs
            .iter()
            .map(|(code, value)| format!("{}\n{}\n", code, value))
            .collect()
    }

    #[test]
    fn test_parse_line_entity() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "ENTITIES"),
            ("0", "LINE"),
            ("8", "walls"),
            ("10", "1.5"),
            ("20", "2.5"),
            ("11", "3.0"),
            ("21", "4.0"),
            ("0", "ENDSEC"),
            ("0", "EOF"),
        ]);
        let drawing = parse_string(&source);
        assert_eq!(drawing.entities.len(), 1);
        assert_eq!(drawing.entities[0].layer, "walls");
        assert_eq!(
            drawing.entities[0].kind,
            EntityKind::Line {
                start: Point::new(1.5, 2.5),
                end: Point::new(3.0, 4.0),
            }
        );
    }

    #[test]
    fn test_parse_layer_table() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "TABLES"),
            ("0", "TABLE"),
            ("2", "LAYER"),
            ("0", "LAYER"),
            ("2", "walls"),
            ("62", "1"),
            ("0", "ENDTAB"),
            ("0", "ENDSEC"),
        ]);
        let drawing = parse_string(&source);
        let layer = drawing.tables.layers.get("walls").expect("layer parsed");
        assert_eq!(layer.color_number, 1);
    }

    #[test]
    fn test_parse_lwpolyline_with_bulge_and_closed_flag() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "ENTITIES"),
            ("0", "LWPOLYLINE"),
            ("70", "1"),
            ("10", "0"),
            ("20", "0"),
            ("42", "0.5"),
            ("10", "2"),
            ("20", "0"),
            ("0", "ENDSEC"),
        ]);
        let drawing = parse_string(&source);
        match &drawing.entities[0].kind {
            EntityKind::Polyline { vertices, closed } => {
                assert!(closed);
                assert_eq!(vertices.len(), 2);
                assert_eq!(vertices[0].bulge, 0.5);
                assert_eq!(vertices[1].bulge, 0.0);
            }
            other => panic!("expected polyline, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_old_style_polyline_vertices() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "ENTITIES"),
            ("0", "POLYLINE"),
            ("8", "0"),
            ("66", "1"),
            ("0", "VERTEX"),
            ("10", "0"),
            ("20", "0"),
            ("0", "VERTEX"),
            ("10", "5"),
            ("20", "5"),
            ("0", "SEQEND"),
            ("0", "LINE"),
            ("10", "9"),
            ("20", "9"),
            ("11", "10"),
            ("21", "10"),
            ("0", "ENDSEC"),
        ]);
        let drawing = parse_string(&source);
        assert_eq!(drawing.entities.len(), 2);
        match &drawing.entities[0].kind {
            EntityKind::Polyline { vertices, .. } => {
                assert_eq!(vertices.len(), 2);
                assert_eq!(vertices[1].x, 5.0);
            }
            other => panic!("expected polyline, got {:?}", other),
        }
        assert_eq!(drawing.entities[1].kind.type_name(), "LINE");
    }

    #[test]
    fn test_parse_arc_keeps_degrees() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "ENTITIES"),
            ("0", "ARC"),
            ("10", "1"),
            ("20", "2"),
            ("40", "3"),
            ("50", "45"),
            ("51", "180"),
            ("230", "-1"),
            ("0", "ENDSEC"),
        ]);
        let drawing = parse_string(&source);
        assert_eq!(
            drawing.entities[0].kind,
            EntityKind::Arc {
                center: Point::new(1.0, 2.0),
                radius: 3.0,
                start_angle: 45.0,
                end_angle: 180.0,
                extrusion_z: -1.0,
            }
        );
    }

    #[test]
    fn test_parse_blocks_with_base_point() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "BLOCKS"),
            ("0", "BLOCK"),
            ("2", "door"),
            ("10", "1"),
            ("20", "2"),
            ("0", "LINE"),
            ("10", "0"),
            ("20", "0"),
            ("11", "1"),
            ("21", "0"),
            ("0", "ENDBLK"),
            ("0", "ENDSEC"),
        ]);
        let drawing = parse_string(&source);
        assert_eq!(drawing.blocks.len(), 1);
        let block = &drawing.blocks[0];
        assert_eq!(block.name, "door");
        assert_eq!((block.x, block.y), (1.0, 2.0));
        assert_eq!(block.entities.len(), 1);
    }

    #[test]
    fn test_unknown_entity_kind_is_preserved() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "ENTITIES"),
            ("0", "MTEXT"),
            ("8", "notes"),
            ("1", "hello"),
            ("0", "ENDSEC"),
        ]);
        let drawing = parse_string(&source);
        assert_eq!(
            drawing.entities[0].kind,
            EntityKind::Unsupported {
                type_name: "MTEXT".to_string()
            }
        );
        assert_eq!(drawing.entities[0].layer, "notes");
    }

    #[test]
    fn test_parse_header_extents() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "HEADER"),
            ("9", "$EXTMIN"),
            ("10", "0"),
            ("20", "0"),
            ("9", "$EXTMAX"),
            ("10", "100"),
            ("20", "50"),
            ("0", "ENDSEC"),
        ]);
        let drawing = parse_string(&source);
        assert_eq!(drawing.header.ext_min, Some(Point::new(0.0, 0.0)));
        assert_eq!(drawing.header.ext_max, Some(Point::new(100.0, 50.0)));
    }

    #[test]
    fn test_malformed_numbers_fall_back_to_defaults() {
        let source = dxf(&[
            ("0", "SECTION"),
            ("2", "ENTITIES"),
            ("0", "CIRCLE"),
            ("10", "not-a-number"),
            ("20", "2"),
            ("40", "1"),
            ("0", "ENDSEC"),
        ]);
        let drawing = parse_string(&source);
        assert_eq!(
            drawing.entities[0].kind,
            EntityKind::Circle {
                center: Point::new(0.0, 2.0),
                radius: 1.0,
            }
        );
    }
}
