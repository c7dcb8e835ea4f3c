use crate::types::{Entity, EntityKind, Point, Transform};
use std::f64::consts::PI;

/// Angular step for circle, arc, ellipse, and bulge interpolation:
/// 72 steps per full turn (5 degrees).
pub const ANGULAR_STEP: f64 = PI * 2.0 / 72.0;

/// Number of samples taken along a spline, t = 0.00, 0.01, ..., 1.00.
pub const SPLINE_SAMPLES: usize = 101;

/// Guard against an accidental duplicate of the final elliptic sample.
const SWEEP_EPSILON: f64 = 1e-6;

fn rotate(points: &mut [Point], angle: f64) {
    let (sin, cos) = angle.sin_cos();
    for p in points.iter_mut() {
        *p = Point::new(p.x * cos - p.y * sin, p.y * cos + p.x * sin);
    }
}

/// Sample an ellipse (or circle, when `rx == ry`) centered at `(cx, cy)`.
///
/// `start` and `end` are radians; when `end < start` the sweep wraps by a
/// full turn so it is always monotonically increasing. Intermediate samples
/// are spaced `ANGULAR_STEP` apart and the exact end point is always emitted,
/// so the arc terminates at `end` regardless of step alignment. A non-zero
/// `rotation` tilts the sampled points about the center.
pub fn interpolate_elliptic(
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    start: f64,
    end: f64,
    rotation: f64,
) -> Vec<Point> {
    // Degenerate radii or angles collapse to well-defined geometry instead of
    // leaking non-finite coordinates.
    let rx = if rx.is_finite() { rx } else { 0.0 };
    let ry = if ry.is_finite() { ry } else { 0.0 };
    let (start, mut end) = if start.is_finite() && end.is_finite() {
        (start, end)
    } else {
        (0.0, 0.0)
    };
    if end < start {
        end += PI * 2.0;
    }

    let mut points = Vec::new();
    let mut theta = start;
    while theta < end - SWEEP_EPSILON {
        points.push(Point::new(theta.cos() * rx, theta.sin() * ry));
        theta += ANGULAR_STEP;
    }
    points.push(Point::new(end.cos() * rx, end.sin() * ry));

    if rotation != 0.0 && rotation.is_finite() {
        rotate(&mut points, rotation);
    }
    for p in points.iter_mut() {
        p.x += cx;
        p.y += cy;
    }
    points
}

/// Intermediate points of the circular arc described by a polyline segment
/// with the given bulge (tan of a quarter of the included angle; the sign
/// selects the side the arc bulges to). Both segment endpoints are excluded;
/// the caller emits `from` before and `to` after these points.
///
/// A non-finite or zero bulge, or a zero-length chord, contributes no points,
/// leaving the segment straight.
pub fn bulge_arc_points(from: Point, to: Point, bulge: f64) -> Vec<Point> {
    if !bulge.is_finite() || bulge == 0.0 {
        return Vec::new();
    }
    if bulge < 0.0 {
        // A negative bulge is the same arc traversed the other way.
        let mut points = bulge_arc_points(to, from, -bulge);
        points.reverse();
        return points;
    }

    let chord = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
    if chord == 0.0 || !chord.is_finite() {
        return Vec::new();
    }

    let theta = 4.0 * bulge.atan();
    let radius = chord / (2.0 * (theta / 2.0).sin());

    // Unit normal of the chord on the bulge side.
    let nx = -(to.y - from.y) / chord;
    let ny = (to.x - from.x) / chord;
    let sagitta = bulge * chord / 2.0;
    let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    let apex = Point::new(mid.x + nx * sagitta, mid.y + ny * sagitta);
    let center = Point::new(apex.x - nx * radius, apex.y - ny * radius);

    let start_angle = (from.y - center.y).atan2(from.x - center.x);
    let segments = (theta / ANGULAR_STEP).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(segments.saturating_sub(1));
    for i in 1..segments {
        let angle = start_angle - theta * i as f64 / segments as f64;
        points.push(Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ));
    }
    points
}

/// Evaluate a B-spline of the given order (degree + 1) at `t` in `[0, 1]`
/// with de Boor's recurrence, mapping `t` into the valid knot span.
fn bspline_at(t: f64, order: usize, controls: &[Point], knots: &[f64]) -> Point {
    let degree = order - 1;
    let n = controls.len();

    let low = knots[degree];
    let high = knots[knots.len() - 1 - degree];
    let t = t * (high - low) + low;

    let mut span = degree;
    while span < n - 1 && knots[span + 1] <= t {
        span += 1;
    }

    let mut d: Vec<Point> = (0..=degree).map(|j| controls[span - degree + j]).collect();
    for r in 1..=degree {
        for j in (r..=degree).rev() {
            let i = span - degree + j;
            let denom = knots[i + degree + 1 - r] - knots[i];
            let alpha = if denom.abs() < f64::EPSILON {
                0.0
            } else {
                (t - knots[i]) / denom
            };
            d[j] = Point::new(
                (1.0 - alpha) * d[j - 1].x + alpha * d[j].x,
                (1.0 - alpha) * d[j - 1].y + alpha * d[j].y,
            );
        }
    }
    d[degree]
}

/// Sample a control-point/knot-vector curve at `SPLINE_SAMPLES` evenly spaced
/// parameter values. A malformed spline (too few control points, or a knot
/// vector whose length is not `controls + degree + 1`) degrades to its
/// control polygon rather than producing non-finite points.
pub fn sample_spline(control_points: &[Point], degree: usize, knots: &[f64]) -> Vec<Point> {
    let order = degree + 1;
    if degree == 0 || control_points.len() < order || knots.len() != control_points.len() + order {
        return control_points.to_vec();
    }
    (0..SPLINE_SAMPLES)
        .map(|i| {
            let t = i as f64 / (SPLINE_SAMPLES - 1) as f64;
            bspline_at(t, order, control_points, knots)
        })
        .collect()
}

/// Apply accumulated block-insertion transforms to a point sequence.
///
/// Per transform the fixed sub-order is x-scale, y-scale, rotation about the
/// origin, then translation. Transforms compose left-to-right: each one
/// operates on the output of the previous.
pub fn apply_transforms(mut points: Vec<Point>, transforms: &[Transform]) -> Vec<Point> {
    for transform in transforms {
        for p in points.iter_mut() {
            if let Some(scale) = transform.x_scale {
                p.x *= scale;
            }
            if let Some(scale) = transform.y_scale {
                p.y *= scale;
            }
            if let Some(degrees) = transform.rotation {
                let angle = degrees.to_radians();
                let (sin, cos) = angle.sin_cos();
                *p = Point::new(p.x * cos - p.y * sin, p.y * cos + p.x * sin);
            }
            if let Some(x) = transform.x {
                p.x += x;
            }
            if let Some(y) = transform.y {
                p.y += y;
            }
        }
    }
    points
}

/// Convert a denormalised entity to a flat polyline, then apply its
/// transforms. Never fails: unsupported kinds push a warning onto the
/// caller-supplied sink and return an empty polyline so callers can skip
/// them. Identical input always yields an identical point sequence.
pub fn entity_to_polyline(entity: &Entity, warnings: &mut Vec<String>) -> Vec<Point> {
    let polyline = match &entity.kind {
        EntityKind::Line { start, end } => vec![*start, *end],

        EntityKind::Polyline { vertices, closed } => {
            let mut polyline = Vec::new();
            for i in 0..vertices.len().saturating_sub(1) {
                let from = Point::new(vertices[i].x, vertices[i].y);
                let to = Point::new(vertices[i + 1].x, vertices[i + 1].y);
                polyline.push(from);
                if vertices[i].bulge != 0.0 {
                    polyline.extend(bulge_arc_points(from, to, vertices[i].bulge));
                }
                if i == vertices.len() - 2 {
                    polyline.push(to);
                }
            }
            if *closed && !polyline.is_empty() {
                polyline.push(polyline[0]);
            }
            polyline
        }

        EntityKind::Circle { center, radius } => {
            interpolate_elliptic(center.x, center.y, *radius, *radius, 0.0, PI * 2.0, 0.0)
        }

        EntityKind::Ellipse {
            center,
            major_x,
            major_y,
            axis_ratio,
            start_angle,
            end_angle,
            extrusion_z,
        } => {
            let rx = (major_x * major_x + major_y * major_y).sqrt();
            let ry = axis_ratio * rx;
            let rotation = -(-major_y).atan2(*major_x);
            let mut polyline = interpolate_elliptic(
                center.x,
                center.y,
                rx,
                ry,
                *start_angle,
                *end_angle,
                rotation,
            );
            if *extrusion_z == -1.0 {
                // Mirrored ellipses reflect about their center.
                for p in polyline.iter_mut() {
                    p.x = 2.0 * center.x - p.x;
                }
            }
            polyline
        }

        EntityKind::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            extrusion_z,
        } => {
            // Arc angles arrive in degrees, ellipse angles in radians; the
            // unit conversion happens here and nowhere else.
            let mut polyline = interpolate_elliptic(
                center.x,
                center.y,
                *radius,
                *radius,
                start_angle.to_radians(),
                end_angle.to_radians(),
                0.0,
            );
            if *extrusion_z == -1.0 {
                // Unlike ellipses, mirrored arcs reflect about the origin.
                // Reference CAD renderers treat the two entity kinds
                // differently, so this stays asymmetric.
                for p in polyline.iter_mut() {
                    p.x = -p.x;
                }
            }
            polyline
        }

        EntityKind::Spline {
            control_points,
            degree,
            knots,
        } => sample_spline(control_points, *degree, knots),

        other => {
            warnings.push(format!(
                "unsupported entity for converting to polyline: {}",
                other.type_name()
            ));
            return Vec::new();
        }
    };

    apply_transforms(polyline, &entity.transforms)
}
