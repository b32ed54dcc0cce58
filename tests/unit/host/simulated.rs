use super::*;
use crate::manifest::builtin::{RANKING_LABEL, nlp_pipeline};

fn page(width: f64) -> SimulatedPage {
    SimulatedPage::new(&nlp_pipeline(), width, 992.0)
}

#[test]
fn element_and_wrapper_keys_share_the_stage_frame() {
    let p = page(1200.0);
    let frame = p.frames().stages["parsing"];
    assert_eq!(p.stage_box("box-document-parsing"), Some(frame));
    assert_eq!(p.stage_box("stage-wrapper-parsing"), Some(frame));
    assert_eq!(p.stage_box(RANKING_LABEL), Some(p.frames().label));
    assert_eq!(p.stage_box("no-such-element"), None);
}

#[test]
fn collapse_and_remove_model_unready_layout() {
    let mut p = page(1200.0);
    p.collapse("box-search");
    let collapsed = p.stage_box("box-search").expect("present");
    assert_eq!(collapsed.area(), 0.0);
    // the wrapper is unaffected
    assert!(p.stage_box("stage-wrapper-search").expect("wrapper").area() > 0.0);

    p.expand("box-search");
    assert!(p.stage_box("box-search").expect("present").area() > 0.0);

    p.remove_element("box-search");
    assert_eq!(p.stage_box("box-search"), None);
}

#[test]
fn wrappers_and_label_start_hidden() {
    let p = page(1200.0);
    let wrapper = p.element("stage-wrapper-document").expect("wrapper");
    assert_eq!(wrapper.style, BoxStyle::hidden(STAGE_HIDDEN_OFFSET));
    assert!(wrapper.transitions);
    assert_eq!(
        p.element(RANKING_LABEL).expect("label").style,
        BoxStyle::hidden(LABEL_HIDDEN_OFFSET)
    );
    assert_eq!(p.elements().len(), 12);
    assert_eq!(p.mutations(), 0);
}

#[test]
fn viewport_change_switches_between_grid_and_stack() {
    let mut p = page(1200.0);
    let wide = p.frames().stages["tokenization"];
    p.set_viewport_width(700.0);
    let narrow = p.frames().stages["tokenization"];
    assert_ne!(wide, narrow);
    assert_eq!(p.viewport_width(), 700.0);
    assert_eq!(narrow.x0, p.frames().stages["document"].x0);
}

#[test]
fn surface_box_follows_its_placement() {
    let mut p = page(1200.0);
    assert_eq!(p.surface_box(), Some(p.frames().grid));

    let frame = Rect::new(10.0, 5.0, 110.0, 55.0);
    p.place_surface(frame);
    let origin = Vec2::new(p.frames().container.x0, p.frames().container.y0);
    assert_eq!(p.surface_box(), Some(frame + origin));

    p.remove_surface();
    assert_eq!(p.surface_box(), None);
}

#[test]
fn scroll_moves_boxes_but_not_relative_positions() {
    let mut p = page(1200.0);
    let doc = p.frames().stages["document"];
    let grid = p.frames().grid;
    p.scroll_to(Vec2::new(0.0, 40.0));
    assert_eq!(p.frames().stages["document"], doc - Vec2::new(0.0, 40.0));
    assert_eq!(
        p.frames().stages["document"].origin() - p.frames().grid.origin(),
        doc.origin() - grid.origin()
    );
}

#[test]
fn inserted_paths_start_undrawn_and_replace_by_id() {
    let mut p = page(1200.0);
    let path = DrawablePath {
        id: "line-a".to_string(),
        d: "M0,0 L10,0".to_string(),
        length: 10.0,
        marker_id: "arrowhead-marker".to_string(),
    };
    p.insert_path(&path);
    p.insert_path(&path);
    assert_eq!(p.path_ids(), vec!["line-a".to_string()]);
    let inserted = p.path("line-a").expect("path");
    assert_eq!(inserted.style.dash_offset, 10.0);
    assert_eq!(inserted.style.opacity, 0.0);

    p.set_path_class("line-a", "animate", true);
    assert!(p.path("line-a").expect("path").classes.contains("animate"));

    p.clear_surface();
    assert!(p.paths().is_empty());
}

#[test]
fn marker_fill_and_grid_scale_are_recorded() {
    let mut p = page(1200.0);
    p.install_marker(&ArrowMarker::default());
    p.install_marker(&ArrowMarker::default());
    assert_eq!(p.markers().len(), 1);
    p.fill_marker("arrowhead-marker", MarkerFill::Active);
    assert_eq!(p.markers()[0].fill, MarkerFill::Active);

    let flat = p.frames().grid;
    p.set_grid_scale(1.5);
    assert_eq!(p.scale(), 1.5);
    assert_eq!(p.frames().grid.width(), flat.width() * 1.5);

    p.set_zoom_controls_visible(false);
    assert!(!p.zoom_controls_visible());
    assert_eq!(p.mutations(), 5);
}
