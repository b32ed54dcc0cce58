use std::{io::Cursor, path::Path};

use anyhow::Context as _;
use svg::{
    Document,
    node::element::{Definitions, Group, Marker, Path as SvgPath, Rectangle, Text},
};

use crate::{
    foundation::{
        core::Rect,
        error::{DiagramError, DiagramResult},
        math::fmt_coord,
    },
    host::{
        BoxStyle, DrawingSurface as _, MarkerFill, SimulatedPage,
        simulated::{SurfaceMarker, SurfacePath},
    },
};

const BACKGROUND: &str = "#ffffff";
const BOX_FILL: &str = "#f4f7fb";
const BOX_STROKE: &str = "#4a5568";
const TEXT_FILL: &str = "#1a202c";
const LINE_STROKE: &str = "#4a5568";
const MARKER_IDLE: &str = "#4a5568";
const MARKER_ACTIVE: &str = "#2b6cb0";
const LINE_WIDTH: f64 = 2.0;
const BOTTOM_MARGIN: f64 = 20.0;

/// Largest raster edge accepted by [`rasterize_png`].
const MAX_RASTER_DIM: u32 = 16_384;

/// Render the current visual state of a simulated page as an SVG document.
///
/// Stage wrappers and the label carry their recorded opacity and offset. Connectors use a
/// dash pattern as long as the path so that the recorded dash offset shows how far each one
/// has been drawn in.
pub fn snapshot_document(page: &SimulatedPage) -> Document {
    let frames = page.frames();
    let width = page_width(page);
    let height = (frames.container.y1 + BOTTOM_MARGIN).max(1.0).ceil();

    let mut doc = Document::new()
        .set("viewBox", format!("0 0 {} {}", fmt_coord(width), fmt_coord(height)))
        .set("width", fmt_coord(width))
        .set("height", fmt_coord(height))
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", BACKGROUND),
        );

    for stage in &page.manifest().stages {
        let key = stage.wrapper_key();
        let (Some(rect), Some(state)) = (frames.stages.get(&stage.id), page.element(&key)) else {
            continue;
        };
        doc = doc.add(labelled_box(&key, &stage.id, *rect, state.style));
    }

    if let Some(label) = page.manifest().label.as_deref()
        && let Some(state) = page.element(label)
    {
        doc = doc.add(labelled_box(label, "deterministic ranking", frames.label, state.style));
    }

    if let Some(surface) = page.surface_box() {
        let mut defs = Definitions::new();
        for marker in page.markers() {
            defs = defs.add(marker_element(marker));
        }
        let mut layer = Group::new()
            .set("id", "pipeline-lines")
            .set(
                "transform",
                format!("translate({} {})", fmt_coord(surface.x0), fmt_coord(surface.y0)),
            )
            .add(defs);
        for path in page.paths() {
            layer = layer.add(path_element(path));
        }
        doc = doc.add(layer);
    }

    doc
}

fn page_width(page: &SimulatedPage) -> f64 {
    let frames = page.frames();
    frames
        .container
        .x1
        .max(frames.grid.x1)
        .max(1.0)
        .ceil()
}

fn labelled_box(id: &str, caption: &str, rect: Rect, style: BoxStyle) -> Group {
    let center = rect.center();
    Group::new()
        .set("id", id)
        .set("opacity", fmt_coord(style.opacity))
        .set("transform", format!("translate(0 {})", fmt_coord(style.offset_y)))
        .add(
            Rectangle::new()
                .set("x", fmt_coord(rect.x0))
                .set("y", fmt_coord(rect.y0))
                .set("width", fmt_coord(rect.width()))
                .set("height", fmt_coord(rect.height()))
                .set("rx", 8)
                .set("fill", BOX_FILL)
                .set("stroke", BOX_STROKE),
        )
        .add(
            Text::new(caption)
                .set("x", fmt_coord(center.x))
                .set("y", fmt_coord(center.y))
                .set("text-anchor", "middle")
                .set("dominant-baseline", "middle")
                .set("font-size", 12)
                .set("fill", TEXT_FILL),
        )
}

fn marker_element(marker: &SurfaceMarker) -> Marker {
    let m = &marker.marker;
    let (vx, vy, vw, vh) = m.view_box;
    let fill = match marker.fill {
        MarkerFill::Idle => MARKER_IDLE,
        MarkerFill::Active => MARKER_ACTIVE,
    };
    Marker::new()
        .set("id", m.id.as_str())
        .set(
            "viewBox",
            format!(
                "{} {} {} {}",
                fmt_coord(vx),
                fmt_coord(vy),
                fmt_coord(vw),
                fmt_coord(vh)
            ),
        )
        .set("refX", fmt_coord(m.ref_point.0))
        .set("refY", fmt_coord(m.ref_point.1))
        .set("markerWidth", fmt_coord(m.size.0))
        .set("markerHeight", fmt_coord(m.size.1))
        .set("orient", "auto")
        .add(SvgPath::new().set("d", m.d.as_str()).set("fill", fill))
}

fn path_element(surface_path: &SurfacePath) -> SvgPath {
    let path = &surface_path.path;
    let mut el = SvgPath::new()
        .set("id", path.id.as_str())
        .set("d", path.d.as_str())
        .set("fill", "none")
        .set("stroke", LINE_STROKE)
        .set("stroke-width", fmt_coord(LINE_WIDTH))
        .set("stroke-dasharray", fmt_coord(path.length))
        .set("stroke-dashoffset", fmt_coord(surface_path.style.dash_offset))
        .set("opacity", fmt_coord(surface_path.style.opacity))
        .set("marker-end", format!("url(#{})", path.marker_id));
    if !surface_path.classes.is_empty() {
        let classes: Vec<&str> = surface_path.classes.iter().map(String::as_str).collect();
        el = el.set("class", classes.join(" "));
    }
    el
}

/// Rasterize an SVG document onto a white background and encode it as PNG.
pub fn rasterize_png(document: &Document) -> DiagramResult<Vec<u8>> {
    let text = document.to_string();
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_str(&text, &opts).context("parse snapshot svg")?;

    let size = tree.size();
    let width = raster_dim(size.width())?;
    let height = raster_dim(size.height())?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| DiagramError::geometry("failed to allocate snapshot pixmap"))?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    // Fully opaque, so premultiplied and straight alpha agree.
    let image = image::RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| DiagramError::geometry("snapshot pixmap has unexpected size"))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("encode snapshot png")?;
    Ok(png)
}

fn raster_dim(v: f32) -> DiagramResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(DiagramError::geometry("snapshot has invalid width/height"));
    }
    let px = (v.ceil() as u32).max(1);
    if px > MAX_RASTER_DIM {
        return Err(DiagramError::geometry(format!(
            "snapshot raster too large: {px} (max {MAX_RASTER_DIM})"
        )));
    }
    Ok(px)
}

/// Write a snapshot of `page` to `path`: PNG when the extension is `png`, SVG otherwise.
pub fn write_snapshot(page: &SimulatedPage, path: &Path) -> DiagramResult<()> {
    let doc = snapshot_document(page);
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        let png = rasterize_png(&doc)?;
        std::fs::write(path, png).with_context(|| format!("write '{}'", path.display()))?;
    } else {
        svg::save(path, &doc).with_context(|| format!("write '{}'", path.display()))?;
    }
    tracing::info!(path = %path.display(), png = is_png, "snapshot written");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/svg.rs"]
mod tests;
