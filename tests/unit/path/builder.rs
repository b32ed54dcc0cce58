use super::*;
use kurbo::ParamCurve as _;

fn edge(routing: Routing) -> EdgeSpec {
    EdgeSpec::new("line-a-b", "a", "b", routing)
}

fn endpoints(d: &str) -> (Point, Point) {
    let path = BezPath::from_svg(d).unwrap();
    let segs: Vec<_> = path.segments().collect();
    (segs[0].start(), segs[segs.len() - 1].end())
}

#[test]
fn straight_path_joins_anchors_with_expected_length() {
    let a = Point::new(100.0, 100.0);
    let b = Point::new(300.0, 100.0);
    let p = build_path(&edge(Routing::Straight), a, b, LayoutMode::Wide, 100.0).unwrap();

    assert_eq!(p.d, "M100,100 L300,100");
    assert_eq!(endpoints(&p.d), (a, b));
    assert!((p.length - 200.0).abs() < 1e-6);
    assert_eq!(p.id, "line-a-b");
    assert_eq!(p.marker_id, ARROWHEAD_MARKER_ID);
}

#[test]
fn elbows_detour_through_a_column_beside_the_target() {
    let a = Point::new(100.0, 100.0);
    let b = Point::new(400.0, 300.0);

    let left = build_path(&edge(Routing::ElbowLeft), a, b, LayoutMode::Wide, 100.0).unwrap();
    assert_eq!(left.d, "M100,100 L300,100 L300,300 L400,300");
    assert!((left.length - 500.0).abs() < 1e-6);

    let right = build_path(&edge(Routing::ElbowRight), a, b, LayoutMode::Wide, 100.0).unwrap();
    assert_eq!(right.d, "M100,100 L500,100 L500,300 L400,300");
    assert!((right.length - 700.0).abs() < 1e-6);
}

#[test]
fn loop_back_bulges_with_offset_control_points() {
    let from = Point::new(400.0, 300.0);
    let to = Point::new(200.0, 100.0);
    let p = build_path(&edge(Routing::BezierLoop), from, to, LayoutMode::Wide, 100.0).unwrap();

    assert_eq!(p.d, "M400,300 C500,400 300,200 200,100");
    assert_eq!(endpoints(&p.d), (from, to));
    // Longer than the chord: the curve bulges away from it.
    let chord = (from - to).hypot();
    assert!(p.length > chord);
}

#[test]
fn narrow_layout_degrades_routing() {
    let a = Point::new(150.0, 100.0);
    let b = Point::new(150.0, 300.0);
    for routing in [Routing::Straight, Routing::ElbowLeft, Routing::ElbowRight] {
        let p = build_path(&edge(routing), a, b, LayoutMode::Narrow, 100.0).unwrap();
        assert_eq!(p.d, "M150,100 L150,300", "{routing:?}");
    }

    // Loop-back on a stack: down past the target, across, then up into it.
    let from = Point::new(150.0, 500.0);
    let to = Point::new(150.0, 200.0);
    let p = build_path(&edge(Routing::BezierLoop), from, to, LayoutMode::Narrow, 100.0).unwrap();
    assert_eq!(p.d, "M150,500 L150,300 L150,300 L150,200");
    assert!((p.length - 300.0).abs() < 1e-6);
}

#[test]
fn unmeasurable_paths_are_rejected() {
    assert_eq!(measure_length("M0,0 Lfoo"), None);
    assert_eq!(measure_length(""), None);
    assert_eq!(measure_length("M0,0"), None);

    let nan = Point::new(f64::NAN, 0.0);
    assert!(build_path(&edge(Routing::Straight), nan, Point::ORIGIN, LayoutMode::Wide, 100.0).is_none());
}

#[test]
fn coincident_anchors_give_zero_length() {
    let p = Point::new(5.0, 5.0);
    let path = build_path(&edge(Routing::Straight), p, p, LayoutMode::Wide, 100.0).unwrap();
    assert_eq!(path.length, 0.0);
}

#[test]
fn default_marker_matches_arrowhead_shape() {
    let m = ArrowMarker::default();
    assert_eq!(m.id, "arrowhead-marker");
    assert_eq!(m.ref_point, (9.0, 5.0));
    assert_eq!(m.d, "M 0 0 L 10 5 L 0 10 z");
}
