use std::collections::{BTreeMap, BTreeSet};

use crate::{
    foundation::core::{LayoutMode, Rect, Vec2},
    host::{
        BoxStyle, DrawingSurface, LABEL_HIDDEN_OFFSET, LayoutContainer, MarkerFill, PathStyle,
        STAGE_HIDDEN_OFFSET, StageRegistry,
        layout::{PageFrames, PageGeometry, solve_page, translate_frames},
    },
    manifest::model::DiagramManifest,
    path::builder::{ArrowMarker, DrawablePath},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Recorded state of a stage wrapper or label element.
pub struct ElementState {
    /// Last applied style.
    pub style: BoxStyle,
    /// Whether transitions are enabled.
    pub transitions: bool,
    /// Active classes.
    pub classes: BTreeSet<String>,
}

impl ElementState {
    fn hidden(offset_y: f64) -> Self {
        Self {
            style: BoxStyle::hidden(offset_y),
            transitions: true,
            classes: BTreeSet::new(),
        }
    }

    /// Whether `class` is set.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A connector inserted into the simulated surface.
pub struct SurfacePath {
    /// The inserted path.
    pub path: DrawablePath,
    /// Last applied draw-in state. Undrawn until styled.
    pub style: PathStyle,
    /// Whether transitions are enabled.
    pub transitions: bool,
    /// Active classes.
    pub classes: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq)]
/// A marker installed into the simulated surface.
pub struct SurfaceMarker {
    /// Marker definition.
    pub marker: ArrowMarker,
    /// Current fill.
    pub fill: MarkerFill,
}

/// In-memory page implementing every host trait.
///
/// Stage boxes come from [`solve_page`] for the current viewport width and grid scale.
/// Elements can be collapsed to zero area or removed outright to exercise the engine's
/// layout-not-ready and missing-element paths. Every mutation bumps a counter so tests can
/// assert that no visual work happens after a stop.
#[derive(Clone, Debug)]
pub struct SimulatedPage {
    manifest: DiagramManifest,
    geometry: PageGeometry,
    breakpoint_px: f64,
    viewport_width: f64,
    scale: f64,
    scroll: Vec2,
    frames: PageFrames,
    /// element/wrapper key -> stage id
    keys: BTreeMap<String, String>,
    collapsed: BTreeSet<String>,
    removed: BTreeSet<String>,
    surface_present: bool,
    surface_frame: Option<Rect>,
    elements: BTreeMap<String, ElementState>,
    paths: Vec<SurfacePath>,
    markers: Vec<SurfaceMarker>,
    zoom_controls_visible: bool,
    mutations: u64,
}

impl SimulatedPage {
    /// Page for `manifest` at the given viewport width, using default page metrics.
    pub fn new(manifest: &DiagramManifest, viewport_width: f64, breakpoint_px: f64) -> Self {
        Self::with_geometry(
            manifest,
            PageGeometry::default(),
            viewport_width,
            breakpoint_px,
        )
    }

    /// Page with explicit metrics.
    pub fn with_geometry(
        manifest: &DiagramManifest,
        geometry: PageGeometry,
        viewport_width: f64,
        breakpoint_px: f64,
    ) -> Self {
        let mut keys = BTreeMap::new();
        let mut elements = BTreeMap::new();
        for stage in &manifest.stages {
            keys.insert(stage.element_key(), stage.id.clone());
            keys.insert(stage.wrapper_key(), stage.id.clone());
            elements.insert(stage.wrapper_key(), ElementState::hidden(STAGE_HIDDEN_OFFSET));
        }
        if let Some(label) = &manifest.label {
            elements.insert(label.clone(), ElementState::hidden(LABEL_HIDDEN_OFFSET));
        }

        let mut page = Self {
            manifest: manifest.clone(),
            geometry,
            breakpoint_px,
            viewport_width,
            scale: 1.0,
            scroll: Vec2::ZERO,
            frames: PageFrames::default(),
            keys,
            collapsed: BTreeSet::new(),
            removed: BTreeSet::new(),
            surface_present: true,
            surface_frame: None,
            elements,
            paths: Vec::new(),
            markers: Vec::new(),
            zoom_controls_visible: true,
            mutations: 0,
        };
        page.relayout();
        page
    }

    fn relayout(&mut self) {
        let mode = LayoutMode::for_viewport(self.viewport_width, self.breakpoint_px);
        self.frames = solve_page(
            &self.manifest,
            &self.geometry,
            mode,
            self.viewport_width,
            self.scale,
        );
        translate_frames(&mut self.frames, -self.scroll);
    }

    /// Change the viewport width and re-run layout. The engine is not notified.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
        self.relayout();
    }

    /// Scroll the page; every on-screen box moves by `-offset`.
    pub fn scroll_to(&mut self, offset: Vec2) {
        self.scroll = offset;
        self.relayout();
    }

    /// Report a zero-size box for the element or wrapper `key`.
    pub fn collapse(&mut self, key: &str) {
        self.collapsed.insert(key.to_string());
    }

    /// Undo [`SimulatedPage::collapse`].
    pub fn expand(&mut self, key: &str) {
        self.collapsed.remove(key);
    }

    /// Make the element `key` disappear from the page.
    pub fn remove_element(&mut self, key: &str) {
        self.removed.insert(key.to_string());
    }

    /// Make the drawing surface disappear from the page.
    pub fn remove_surface(&mut self) {
        self.surface_present = false;
    }

    /// Current grid scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Resolved frames of the current layout pass.
    pub fn frames(&self) -> &PageFrames {
        &self.frames
    }

    /// Manifest the page was built from.
    pub fn manifest(&self) -> &DiagramManifest {
        &self.manifest
    }

    /// Recorded state of a wrapper or label.
    pub fn element(&self, key: &str) -> Option<&ElementState> {
        self.elements.get(key)
    }

    /// Recorded wrapper and label states.
    pub fn elements(&self) -> &BTreeMap<String, ElementState> {
        &self.elements
    }

    /// Paths currently on the surface, in insertion order.
    pub fn paths(&self) -> &[SurfacePath] {
        &self.paths
    }

    /// Path with identifier `id`.
    pub fn path(&self, id: &str) -> Option<&SurfacePath> {
        self.paths.iter().find(|p| p.path.id == id)
    }

    /// Identifiers of the paths currently on the surface.
    pub fn path_ids(&self) -> Vec<String> {
        self.paths.iter().map(|p| p.path.id.clone()).collect()
    }

    /// Markers currently installed.
    pub fn markers(&self) -> &[SurfaceMarker] {
        &self.markers
    }

    /// Frame assigned by the last [`DrawingSurface::place_surface`].
    pub fn surface_frame(&self) -> Option<Rect> {
        self.surface_frame
    }

    /// Whether the zoom buttons are shown.
    pub fn zoom_controls_visible(&self) -> bool {
        self.zoom_controls_visible
    }

    /// Total number of visual mutations applied so far.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    fn element_mut(&mut self, key: &str) -> &mut ElementState {
        self.mutations += 1;
        self.elements
            .entry(key.to_string())
            .or_insert_with(|| ElementState::hidden(STAGE_HIDDEN_OFFSET))
    }

    fn path_mut(&mut self, id: &str) -> Option<&mut SurfacePath> {
        self.mutations += 1;
        self.paths.iter_mut().find(|p| p.path.id == id)
    }
}

impl StageRegistry for SimulatedPage {
    fn stage_box(&self, key: &str) -> Option<Rect> {
        if self.removed.contains(key) {
            return None;
        }
        let rect = if self.manifest.label.as_deref() == Some(key) {
            self.frames.label
        } else {
            let stage = self.keys.get(key)?;
            *self.frames.stages.get(stage)?
        };
        if self.collapsed.contains(key) {
            return Some(Rect::from_origin_size(rect.origin(), (0.0, 0.0)));
        }
        Some(rect)
    }

    fn apply_style(&mut self, key: &str, style: BoxStyle) {
        self.element_mut(key).style = style;
    }

    fn set_transitions(&mut self, key: &str, enabled: bool) {
        self.element_mut(key).transitions = enabled;
    }

    fn set_class(&mut self, key: &str, class: &str, enabled: bool) {
        let el = self.element_mut(key);
        if enabled {
            el.classes.insert(class.to_string());
        } else {
            el.classes.remove(class);
        }
    }
}

impl DrawingSurface for SimulatedPage {
    fn surface_box(&self) -> Option<Rect> {
        if !self.surface_present {
            return None;
        }
        // The surface keeps its last placement; before the first one it covers the grid.
        let origin = Vec2::new(self.frames.container.x0, self.frames.container.y0);
        Some(
            self.surface_frame
                .map_or(self.frames.grid, |frame| frame + origin),
        )
    }

    fn clear_surface(&mut self) {
        self.mutations += 1;
        self.paths.clear();
        self.markers.clear();
    }

    fn install_marker(&mut self, marker: &ArrowMarker) {
        self.mutations += 1;
        self.markers.retain(|m| m.marker.id != marker.id);
        self.markers.push(SurfaceMarker {
            marker: marker.clone(),
            fill: MarkerFill::Idle,
        });
    }

    fn insert_path(&mut self, path: &DrawablePath) {
        self.mutations += 1;
        self.paths.retain(|p| p.path.id != path.id);
        self.paths.push(SurfacePath {
            path: path.clone(),
            style: PathStyle {
                dash_offset: path.length,
                opacity: 0.0,
            },
            transitions: true,
            classes: BTreeSet::new(),
        });
    }

    fn style_path(&mut self, id: &str, style: PathStyle) {
        if let Some(p) = self.path_mut(id) {
            p.style = style;
        }
    }

    fn set_path_transitions(&mut self, id: &str, enabled: bool) {
        if let Some(p) = self.path_mut(id) {
            p.transitions = enabled;
        }
    }

    fn set_path_class(&mut self, id: &str, class: &str, enabled: bool) {
        if let Some(p) = self.path_mut(id) {
            if enabled {
                p.classes.insert(class.to_string());
            } else {
                p.classes.remove(class);
            }
        }
    }

    fn fill_marker(&mut self, marker_id: &str, fill: MarkerFill) {
        self.mutations += 1;
        if let Some(m) = self.markers.iter_mut().find(|m| m.marker.id == marker_id) {
            m.fill = fill;
        }
    }

    fn place_surface(&mut self, frame: Rect) {
        self.mutations += 1;
        self.surface_frame = Some(frame);
    }
}

impl LayoutContainer for SimulatedPage {
    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn grid_box(&self) -> Option<Rect> {
        Some(self.frames.grid)
    }

    fn container_box(&self) -> Option<Rect> {
        Some(self.frames.container)
    }

    fn set_grid_scale(&mut self, scale: f64) {
        self.mutations += 1;
        self.scale = scale;
        self.relayout();
    }

    fn set_zoom_controls_visible(&mut self, visible: bool) {
        self.mutations += 1;
        self.zoom_controls_visible = visible;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/simulated.rs"]
mod tests;
