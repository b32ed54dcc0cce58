use super::*;

fn two_stage() -> DiagramManifest {
    DiagramManifest {
        stages: vec![StageSpec::new("a"), StageSpec::new("b")],
        edges: vec![EdgeSpec::new("a-b", "a", "b", Routing::Straight)],
        steps: StepPlan {
            wide: vec![StepSpec::reveal("a", &[]), StepSpec::reveal("b", &["a-b"])],
            narrow: vec![StepSpec::reveal("a", &[]), StepSpec::reveal("b", &["a-b"])],
        },
        label: None,
    }
}

#[test]
fn default_keys_derive_from_id() {
    let s = StageSpec::new("search");
    assert_eq!(s.element_key(), "box-search");
    assert_eq!(s.wrapper_key(), "stage-wrapper-search");

    let s = StageSpec::new("parsing").with_element("box-document-parsing");
    assert_eq!(s.element_key(), "box-document-parsing");
    assert_eq!(s.wrapper_key(), "stage-wrapper-parsing");
}

#[test]
fn mode_filter_selects_edges() {
    let mut m = two_stage();
    m.edges.push(EdgeSpec::new("a-b-wide", "a", "b", Routing::ElbowLeft).only(ModeFilter::WideOnly));
    m.edges
        .push(EdgeSpec::new("a-b-narrow", "a", "b", Routing::Straight).only(ModeFilter::NarrowOnly));

    let wide: Vec<_> = m.edges_for(LayoutMode::Wide).map(|e| e.id.as_str()).collect();
    let narrow: Vec<_> = m.edges_for(LayoutMode::Narrow).map(|e| e.id.as_str()).collect();
    assert_eq!(wide, vec!["a-b", "a-b-wide"]);
    assert_eq!(narrow, vec!["a-b", "a-b-narrow"]);
}

#[test]
fn validate_accepts_consistent_manifest() {
    two_stage().validate().unwrap();
}

#[test]
fn validate_rejects_unknown_edge_endpoint() {
    let mut m = two_stage();
    m.edges.push(EdgeSpec::new("a-z", "a", "z", Routing::Straight));
    let err = m.validate().unwrap_err();
    assert!(err.to_string().contains("unknown stage 'z'"));
}

#[test]
fn validate_rejects_duplicates() {
    let mut m = two_stage();
    m.stages.push(StageSpec::new("a"));
    assert!(m.validate().is_err());

    let mut m = two_stage();
    m.edges.push(EdgeSpec::new("a-b", "b", "a", Routing::Straight));
    assert!(m.validate().is_err());
}

#[test]
fn validate_rejects_oversized_or_mismatched_steps() {
    let mut m = two_stage();
    m.stages.push(StageSpec::new("c"));
    m.steps.wide.push(StepSpec {
        reveal: vec!["a".into(), "b".into(), "c".into()],
        draw: vec![],
    });
    assert!(m.validate().is_err());

    let mut m = two_stage();
    m.edges.push(EdgeSpec::new("w", "a", "b", Routing::Straight).only(ModeFilter::WideOnly));
    m.steps.narrow.push(StepSpec::draw(&["w"]));
    let err = m.validate().unwrap_err();
    assert!(err.to_string().contains("not drawn in that mode"));
}

#[test]
fn json_roundtrip_uses_snake_case_and_defaults() {
    let json = r#"{
        "stages": [{ "id": "a" }, { "id": "b", "grid": { "col": 1, "row": 0 } }],
        "edges": [{ "id": "a-b", "from": "a", "to": "b", "routing": "bezier_loop", "modes": "wide_only" }],
        "steps": { "wide": [{ "reveal": ["a"] }, { "reveal": ["b"], "draw": ["a-b"] }], "narrow": [] }
    }"#;
    let m = DiagramManifest::from_json(json).unwrap();
    assert_eq!(m.edges[0].routing, Routing::BezierLoop);
    assert_eq!(m.edges[0].modes, ModeFilter::WideOnly);
    assert_eq!(m.stages[1].grid, Some(GridCell { col: 1, row: 0 }));
    assert!(m.label.is_none());
}

#[test]
fn json_errors_surface_as_serde() {
    let err = DiagramManifest::from_json("{ not json").unwrap_err();
    assert!(matches!(err, DiagramError::Serde(_)));
}
