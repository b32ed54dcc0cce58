use super::*;
use crate::{host::SimulatedPage, manifest::builtin::nlp_pipeline};

fn page(width: f64) -> (SimulatedPage, DiagramManifest, EngineConfig) {
    let manifest = nlp_pipeline();
    let config = EngineConfig::default();
    let page = SimulatedPage::new(&manifest, width, config.narrow_breakpoint_px);
    (page, manifest, config)
}

#[test]
fn wide_pass_draws_every_wide_edge_in_manifest_order() {
    let (mut page, manifest, config) = page(1200.0);
    let mut drawer = LineDrawer::new();

    let outcome = drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0);
    assert!(matches!(
        outcome,
        DrawOutcome::Drawn {
            inserted: 12,
            discarded: 0
        }
    ));

    let expected: Vec<String> = manifest
        .edges_for(LayoutMode::Wide)
        .map(|e| e.id.clone())
        .collect();
    assert_eq!(page.path_ids(), expected);
    let drawer_ids: Vec<_> = drawer.paths().iter().map(|p| p.id.clone()).collect();
    assert_eq!(drawer_ids, expected);
    assert_eq!(page.markers().len(), 1);
    assert!(drawer.paths().iter().all(|p| p.length > 0.0));
}

#[test]
fn narrow_pass_draws_only_narrow_edges() {
    let (mut page, manifest, config) = page(700.0);
    let mut drawer = LineDrawer::new();

    let outcome = drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Narrow, 0);
    assert!(outcome.is_drawn());
    assert_eq!(page.paths().len(), 12);
    assert!(page.path_ids().iter().all(|id| id.ends_with("-mobile")));
}

#[test]
fn redraw_replaces_previous_paths() {
    let (mut page, manifest, config) = page(1200.0);
    let mut drawer = LineDrawer::new();
    drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0);
    drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0);
    assert_eq!(page.paths().len(), 12);
    assert_eq!(page.markers().len(), 1);
}

#[test]
fn collapsed_stage_requests_retry_then_exhausts() {
    let (mut page, manifest, config) = page(1200.0);
    page.collapse("box-search");
    let mut drawer = LineDrawer::new();

    let outcome = drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0);
    assert!(matches!(outcome, DrawOutcome::Retry { attempt: 1 }));
    assert!(page.paths().is_empty());

    let outcome = drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 4);
    assert!(matches!(outcome, DrawOutcome::Retry { attempt: 5 }));

    let outcome = drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 5);
    assert!(matches!(outcome, DrawOutcome::Exhausted));
    assert!(page.paths().is_empty());
    assert!(drawer.paths().is_empty());
}

#[test]
fn missing_stage_or_surface_aborts_without_paths() {
    let (mut page, manifest, config) = page(1200.0);
    let mut drawer = LineDrawer::new();
    drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0);

    page.remove_element("box-ranking");
    let outcome = drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0);
    assert!(matches!(
        outcome,
        DrawOutcome::Aborted(DiagramError::MissingElement(_))
    ));
    assert!(page.paths().is_empty());
    assert!(drawer.paths().is_empty());

    let (mut page, manifest, config) = self::page(1200.0);
    page.remove_surface();
    let outcome = drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0);
    assert!(matches!(outcome, DrawOutcome::Aborted(_)));
}

#[test]
fn anchors_are_surface_local() {
    let (mut page, manifest, config) = page(1200.0);
    let mut drawer = LineDrawer::new();
    drawer.draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0);

    let frames = page.frames().clone();
    let doc = frames.stages["document"].center();
    let parsing = frames.stages["parsing"].center();
    let origin = frames.grid.origin();
    let expected = format!(
        "M{},{} L{},{}",
        doc.x - origin.x,
        doc.y - origin.y,
        parsing.x - origin.x,
        parsing.y - origin.y
    );
    assert_eq!(drawer.path("line-doc-parsing").unwrap().d, expected);
}
