use kurbo::ParamCurveArclen as _;

use crate::{
    foundation::{
        core::{BezPath, LayoutMode, Point},
        math::push_point,
    },
    manifest::model::{EdgeSpec, Routing},
};

/// Identifier of the shared arrowhead marker.
pub const ARROWHEAD_MARKER_ID: &str = "arrowhead-marker";

/// Arc length accuracy used when measuring curved connectors.
const ARCLEN_ACCURACY: f64 = 1e-3;

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Arrowhead marker definition terminating every connector.
pub struct ArrowMarker {
    /// Marker identifier.
    pub id: String,
    /// Marker viewBox.
    pub view_box: (f64, f64, f64, f64),
    /// Reference point inside the viewBox that sits on the path end.
    pub ref_point: (f64, f64),
    /// Marker size in stroke-width units.
    pub size: (f64, f64),
    /// Arrowhead outline.
    pub d: String,
}

impl Default for ArrowMarker {
    fn default() -> Self {
        Self {
            id: ARROWHEAD_MARKER_ID.to_string(),
            view_box: (0.0, 0.0, 10.0, 10.0),
            ref_point: (9.0, 5.0),
            size: (6.0, 6.0),
            d: "M 0 0 L 10 5 L 0 10 z".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A routed, measured connector ready to insert into a drawing surface.
///
/// Built fresh on every draw pass; stage positions may have moved since the last one.
pub struct DrawablePath {
    /// Path identifier (the edge id).
    pub id: String,
    /// SVG path data.
    pub d: String,
    /// Total path length, used for the stroke draw-in.
    pub length: f64,
    /// Marker terminating the path.
    pub marker_id: String,
}

/// Route an edge between two anchors.
///
/// Narrow layouts ignore the authored routing: every edge is a straight line except the
/// loop-back, which becomes a rectangular detour below the target.
pub fn route(routing: Routing, from: Point, to: Point, mode: LayoutMode, margin: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(from);
    match (mode, routing) {
        (LayoutMode::Wide, Routing::Straight)
        | (LayoutMode::Narrow, Routing::Straight | Routing::ElbowLeft | Routing::ElbowRight) => {
            path.line_to(to);
        }
        (LayoutMode::Wide, Routing::ElbowLeft) => elbow(&mut path, from, to, to.x - margin),
        (LayoutMode::Wide, Routing::ElbowRight) => elbow(&mut path, from, to, to.x + margin),
        (LayoutMode::Wide, Routing::BezierLoop) => {
            path.curve_to(
                Point::new(from.x + margin, from.y + margin),
                Point::new(to.x + margin, to.y + margin),
                to,
            );
        }
        (LayoutMode::Narrow, Routing::BezierLoop) => {
            let floor = to.y + margin;
            path.line_to((from.x, floor));
            path.line_to((to.x, floor));
            path.line_to(to);
        }
    }
    path
}

fn elbow(path: &mut BezPath, from: Point, to: Point, column_x: f64) {
    path.line_to((column_x, from.y));
    path.line_to((column_x, to.y));
    path.line_to(to);
}

/// Serialize a path as `M x,y L x,y C x,y x,y x,y` path data.
pub fn path_data(path: &BezPath) -> String {
    let mut out = String::new();
    for el in path.elements() {
        if !out.is_empty() {
            out.push(' ');
        }
        match *el {
            kurbo::PathEl::MoveTo(p) => {
                out.push('M');
                push_point(&mut out, p);
            }
            kurbo::PathEl::LineTo(p) => {
                out.push('L');
                push_point(&mut out, p);
            }
            kurbo::PathEl::QuadTo(c, p) => {
                out.push('Q');
                push_point(&mut out, c);
                out.push(' ');
                push_point(&mut out, p);
            }
            kurbo::PathEl::CurveTo(c1, c2, p) => {
                out.push('C');
                push_point(&mut out, c1);
                out.push(' ');
                push_point(&mut out, c2);
                out.push(' ');
                push_point(&mut out, p);
            }
            kurbo::PathEl::ClosePath => out.push('Z'),
        }
    }
    out
}

/// Measure the total length of SVG path data.
///
/// Returns `None` for data that does not parse or has a non-finite length.
pub fn measure_length(d: &str) -> Option<f64> {
    let path = BezPath::from_svg(d).ok()?;
    let mut segments = path.segments().peekable();
    segments.peek()?;
    let length: f64 = segments.map(|seg| seg.arclen(ARCLEN_ACCURACY)).sum();
    length.is_finite().then_some(length)
}

/// Build the drawable connector for `edge` between its resolved anchors.
///
/// Returns `None` when the path cannot be measured; the caller must leave it off the surface.
pub fn build_path(
    edge: &EdgeSpec,
    from: Point,
    to: Point,
    mode: LayoutMode,
    margin: f64,
) -> Option<DrawablePath> {
    let d = path_data(&route(edge.routing, from, to, mode, margin));
    let Some(length) = measure_length(&d) else {
        tracing::warn!(edge = %edge.id, d = %d, "connector length is not measurable");
        return None;
    };
    Some(DrawablePath {
        id: edge.id.clone(),
        d,
        length,
        marker_id: ARROWHEAD_MARKER_ID.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/path/builder.rs"]
mod tests;
