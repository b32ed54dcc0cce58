use super::*;
use crate::{host::BoxStyle, manifest::model::StageSpec};

#[derive(Default)]
struct Boxes(BTreeMap<String, Rect>);

impl Boxes {
    fn with(mut self, key: &str, rect: Rect) -> Self {
        self.0.insert(key.to_string(), rect);
        self
    }
}

impl StageRegistry for Boxes {
    fn stage_box(&self, key: &str) -> Option<Rect> {
        self.0.get(key).copied()
    }
    fn apply_style(&mut self, _key: &str, _style: BoxStyle) {}
    fn set_transitions(&mut self, _key: &str, _enabled: bool) {}
    fn set_class(&mut self, _key: &str, _class: &str, _enabled: bool) {}
}

fn manifest(ids: &[&str]) -> DiagramManifest {
    DiagramManifest {
        stages: ids.iter().map(|id| StageSpec::new(*id)).collect(),
        edges: vec![],
        steps: Default::default(),
        label: None,
    }
}

#[test]
fn center_is_relative_to_surface_origin() {
    let boxes = Boxes::default().with("box-a", Rect::new(150.0, 250.0, 250.0, 310.0));
    let surface = Rect::new(100.0, 200.0, 900.0, 800.0);
    assert_eq!(
        resolve_center(&boxes, surface, "box-a"),
        Anchor::Ready(Point::new(100.0, 80.0))
    );
}

#[test]
fn absent_and_collapsed_elements_are_sentinels() {
    let boxes = Boxes::default()
        .with("box-flat", Rect::new(10.0, 10.0, 90.0, 10.0))
        .with("box-thin", Rect::new(10.0, 10.0, 10.0, 90.0));
    let surface = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(resolve_center(&boxes, surface, "box-nope"), Anchor::Missing);
    assert_eq!(resolve_center(&boxes, surface, "box-flat"), Anchor::Collapsed);
    assert_eq!(resolve_center(&boxes, surface, "box-thin"), Anchor::Collapsed);
    assert_eq!(Anchor::Collapsed.point(), None);
}

#[test]
fn resolve_all_reports_first_unresolved_stage() {
    let boxes = Boxes::default()
        .with("box-a", Rect::new(0.0, 0.0, 20.0, 20.0))
        .with("box-b", Rect::new(40.0, 0.0, 40.0, 20.0));
    let surface = Rect::new(0.0, 0.0, 100.0, 100.0);

    let err = resolve_all(&boxes, surface, &manifest(&["a", "b", "c"])).unwrap_err();
    assert_eq!(err.stage, "b");
    assert_eq!(err.element, "box-b");
    assert!(!err.missing);

    let err = resolve_all(&boxes, surface, &manifest(&["a", "c"])).unwrap_err();
    assert_eq!(err.stage, "c");
    assert!(err.missing);
}

#[test]
fn resolve_all_collects_every_anchor() {
    let boxes = Boxes::default()
        .with("box-a", Rect::new(0.0, 0.0, 20.0, 20.0))
        .with("box-b", Rect::new(40.0, 0.0, 60.0, 20.0));
    let anchors = resolve_all(&boxes, Rect::new(0.0, 0.0, 100.0, 100.0), &manifest(&["a", "b"]))
        .unwrap();
    assert_eq!(anchors.len(), 2);
    assert_eq!(anchors.get("a"), Some(Point::new(10.0, 10.0)));
    assert_eq!(anchors.get("b"), Some(Point::new(50.0, 10.0)));
    assert_eq!(anchors.get("c"), None);
}
