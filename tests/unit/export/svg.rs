use super::*;
use crate::{
    draw::drawer::LineDrawer,
    foundation::core::LayoutMode,
    manifest::{builtin::nlp_pipeline, config::EngineConfig},
};

fn drawn_page() -> SimulatedPage {
    let manifest = nlp_pipeline();
    let config = EngineConfig::default();
    let mut page = SimulatedPage::new(&manifest, 1200.0, config.narrow_breakpoint_px);
    let mut drawer = LineDrawer::new();
    assert!(
        drawer
            .draw_all(&mut page, &manifest, &config, LayoutMode::Wide, 0)
            .is_drawn()
    );
    page
}

#[test]
fn snapshot_contains_boxes_marker_and_connectors() {
    let page = drawn_page();
    let text = snapshot_document(&page).to_string();

    assert!(text.contains("id=\"stage-wrapper-document\""));
    assert!(text.contains("id=\"deterministic-ranking-label\""));
    assert!(text.contains("id=\"arrowhead-marker\""));
    assert!(text.contains("marker-end=\"url(#arrowhead-marker)\""));
    for path in page.paths() {
        assert!(text.contains(&format!("id=\"{}\"", path.path.id)));
    }
    assert!(!text.contains("line-doc-parsing-mobile"));
}

#[test]
fn undrawn_connectors_are_fully_dashed_out() {
    let page = drawn_page();
    let path = page.path("line-doc-parsing").expect("path");
    let length = fmt_coord(path.path.length);
    let text = snapshot_document(&page).to_string();
    assert!(text.contains(&format!("stroke-dasharray=\"{length}\"")));
    assert!(text.contains(&format!("stroke-dashoffset=\"{length}\"")));
}

#[test]
fn png_raster_has_the_document_size() {
    let page = drawn_page();
    let png = rasterize_png(&snapshot_document(&page)).expect("png");
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
        .expect("decode")
        .to_rgba8();
    assert_eq!(decoded.width(), 1200);
    assert_eq!(decoded.height(), 522);
    // background is opaque white
    assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn write_snapshot_picks_format_from_extension() {
    let dir = std::path::PathBuf::from("target").join("snapshot_unit");
    std::fs::create_dir_all(&dir).expect("dir");
    let page = drawn_page();

    let svg_path = dir.join("diagram.svg");
    write_snapshot(&page, &svg_path).expect("svg");
    let text = std::fs::read_to_string(&svg_path).expect("read svg");
    assert!(text.starts_with("<svg"));

    let png_path = dir.join("diagram.PNG");
    write_snapshot(&page, &png_path).expect("png");
    let bytes = std::fs::read(&png_path).expect("read png");
    assert_eq!(&bytes[..4], b"\x89PNG");
}
