use std::collections::BTreeMap;

use crate::{
    foundation::core::{LayoutMode, Point, Rect, Vec2},
    manifest::model::DiagramManifest,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Page metrics used by [`crate::SimulatedPage`] to place stage boxes.
pub struct PageGeometry {
    /// Distance from the top of the page to the diagram container.
    pub container_top: f64,
    /// Padding between the grid edge and the first cell.
    pub padding: f64,
    /// Wide layout cell size.
    pub cell: (f64, f64),
    /// Gap between wide layout cells.
    pub gap: f64,
    /// Narrow layout cell size; the width shrinks to fit the viewport.
    pub stack_cell: (f64, f64),
    /// Gap between stacked cells.
    pub stack_gap: f64,
    /// Height of the terminal label.
    pub label_height: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            container_top: 80.0,
            padding: 20.0,
            cell: (120.0, 60.0),
            gap: 30.0,
            stack_cell: (260.0, 56.0),
            stack_gap: 28.0,
            label_height: 32.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Resolved on-screen boxes for one layout pass.
pub struct PageFrames {
    /// Stage boxes keyed by stage id.
    pub stages: BTreeMap<String, Rect>,
    /// Stage grid box after scaling.
    pub grid: Rect,
    /// Diagram container box (unscaled).
    pub container: Rect,
    /// Terminal label box after scaling.
    pub label: Rect,
}

/// Lay the manifest's stages out for a viewport, then scale the grid around its center.
pub fn solve_page(
    manifest: &DiagramManifest,
    geom: &PageGeometry,
    mode: LayoutMode,
    viewport_width: f64,
    scale: f64,
) -> PageFrames {
    let (mut stages, grid) = match mode {
        LayoutMode::Wide => solve_grid(manifest, geom, viewport_width),
        LayoutMode::Narrow => solve_stack(manifest, geom, viewport_width),
    };
    let label = Rect::new(
        grid.x0 + geom.padding,
        grid.y1,
        grid.x1 - geom.padding,
        grid.y1 + geom.label_height,
    );
    let container = Rect::new(
        0.0,
        geom.container_top,
        viewport_width.max(0.0),
        label.y1 + geom.padding,
    );

    let pivot = grid.center();
    for rect in stages.values_mut() {
        *rect = scale_about(*rect, pivot, scale);
    }

    PageFrames {
        stages,
        grid: scale_about(grid, pivot, scale),
        container,
        label: scale_about(label, pivot, scale),
    }
}

fn solve_grid(
    manifest: &DiagramManifest,
    geom: &PageGeometry,
    viewport_width: f64,
) -> (BTreeMap<String, Rect>, Rect) {
    let (cell_w, cell_h) = geom.cell;
    let cols = manifest
        .stages
        .iter()
        .filter_map(|s| s.grid.map(|g| g.col + 1))
        .max()
        .unwrap_or(1);
    let rows = manifest
        .stages
        .iter()
        .filter_map(|s| s.grid.map(|g| g.row + 1))
        .max()
        .unwrap_or(1);

    let grid_w = span(cols, cell_w, geom.gap) + 2.0 * geom.padding;
    let grid_h = span(rows, cell_h, geom.gap) + 2.0 * geom.padding;
    let x0 = align_center(viewport_width, grid_w);
    let y0 = geom.container_top;

    let mut out = BTreeMap::new();
    // Stages without a placement hint fill the row after the last placed one.
    let mut overflow_col = 0u32;
    for stage in &manifest.stages {
        let (col, row) = match stage.grid {
            Some(g) => (g.col, g.row),
            None => {
                let c = overflow_col;
                overflow_col += 1;
                (c, rows)
            }
        };
        let x = x0 + geom.padding + f64::from(col) * (cell_w + geom.gap);
        let y = y0 + geom.padding + f64::from(row) * (cell_h + geom.gap);
        out.insert(stage.id.clone(), Rect::new(x, y, x + cell_w, y + cell_h));
    }

    let extra_rows = if overflow_col > 0 { 1.0 } else { 0.0 };
    let grid = Rect::new(
        x0,
        y0,
        x0 + grid_w,
        y0 + grid_h + extra_rows * (cell_h + geom.gap),
    );
    (out, grid)
}

fn solve_stack(
    manifest: &DiagramManifest,
    geom: &PageGeometry,
    viewport_width: f64,
) -> (BTreeMap<String, Rect>, Rect) {
    let (cell_w, cell_h) = geom.stack_cell;
    let cell_w = cell_w.min((viewport_width - 2.0 * geom.padding).max(0.0));
    let n = u32::try_from(manifest.stages.len()).unwrap_or(u32::MAX);

    let grid_w = cell_w + 2.0 * geom.padding;
    let grid_h = span(n, cell_h, geom.stack_gap) + 2.0 * geom.padding;
    let x0 = align_center(viewport_width, grid_w);
    let y0 = geom.container_top;

    let mut out = BTreeMap::new();
    let mut y = y0 + geom.padding;
    for stage in &manifest.stages {
        let x = x0 + geom.padding;
        out.insert(stage.id.clone(), Rect::new(x, y, x + cell_w, y + cell_h));
        y += cell_h + geom.stack_gap;
    }
    (out, Rect::new(x0, y0, x0 + grid_w, y0 + grid_h))
}

fn span(count: u32, cell: f64, gap: f64) -> f64 {
    let n = f64::from(count);
    n * cell + (n - 1.0).max(0.0) * gap
}

fn align_center(container: f64, content: f64) -> f64 {
    (container - content).max(0.0) * 0.5
}

fn scale_about(rect: Rect, pivot: Point, scale: f64) -> Rect {
    let p0 = pivot + (Point::new(rect.x0, rect.y0) - pivot) * scale;
    let p1 = pivot + (Point::new(rect.x1, rect.y1) - pivot) * scale;
    Rect::from_points(p0, p1)
}

/// Move every frame by `by`, e.g. to model page scroll.
pub fn translate_frames(frames: &mut PageFrames, by: Vec2) {
    for rect in frames.stages.values_mut() {
        *rect = *rect + by;
    }
    frames.grid = frames.grid + by;
    frames.container = frames.container + by;
    frames.label = frames.label + by;
}

#[cfg(test)]
#[path = "../../tests/unit/host/layout.rs"]
mod tests;
