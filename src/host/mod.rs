//! Seams between the engine and the page that hosts it.
//!
//! The engine never touches a DOM directly. Stage boxes, the drawing surface and the layout
//! container are reached through the three traits below, so geometry, routing and sequencing
//! can run against [`SimulatedPage`] as easily as against a browser.

pub mod layout;
pub mod simulated;

pub use simulated::SimulatedPage;

use crate::{
    foundation::core::Rect,
    path::builder::{ArrowMarker, DrawablePath},
};

/// Vertical offset of a hidden stage wrapper.
pub const STAGE_HIDDEN_OFFSET: f64 = 20.0;
/// Vertical offset of the hidden terminal label.
pub const LABEL_HIDDEN_OFFSET: f64 = 30.0;

/// Class added to a wrapper once it has faded in.
pub const FADED_IN_CLASS: &str = "faded-in";
/// Class added to a connector once it has been drawn in.
pub const ANIMATE_CLASS: &str = "animate";

/// Opacity and vertical offset of a stage wrapper or label.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BoxStyle {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Downward translation in pixels.
    pub offset_y: f64,
}

impl BoxStyle {
    /// Fully shown, untranslated.
    pub const SHOWN: Self = Self {
        opacity: 1.0,
        offset_y: 0.0,
    };

    /// Transparent and pushed down by `offset_y`.
    pub fn hidden(offset_y: f64) -> Self {
        Self {
            opacity: 0.0,
            offset_y,
        }
    }
}

/// Draw-in state of a connector.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PathStyle {
    /// Stroke dash offset. Equal to the path length when undrawn, zero when fully drawn.
    pub dash_offset: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Arrowhead colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum MarkerFill {
    /// Default text colour.
    #[default]
    Idle,
    /// Highlight colour used while connectors animate on wide layouts.
    Active,
}

/// Stage elements addressed by host key.
pub trait StageRegistry {
    /// On-screen box of an element, or `None` if the element does not exist.
    fn stage_box(&self, key: &str) -> Option<Rect>;

    /// Set opacity and offset.
    fn apply_style(&mut self, key: &str, style: BoxStyle);

    /// Enable or disable style transitions.
    fn set_transitions(&mut self, key: &str, enabled: bool);

    /// Toggle a class.
    fn set_class(&mut self, key: &str, class: &str, enabled: bool);
}

/// Vector surface hosting connector paths.
pub trait DrawingSurface {
    /// On-screen box of the surface, or `None` if it does not exist.
    fn surface_box(&self) -> Option<Rect>;

    /// Remove every path and marker.
    fn clear_surface(&mut self);

    /// Add a marker definition.
    fn install_marker(&mut self, marker: &ArrowMarker);

    /// Append a path. Later paths paint over earlier ones.
    fn insert_path(&mut self, path: &DrawablePath);

    /// Set draw-in state of a path.
    fn style_path(&mut self, id: &str, style: PathStyle);

    /// Enable or disable transitions of a path.
    fn set_path_transitions(&mut self, id: &str, enabled: bool);

    /// Toggle a class on a path.
    fn set_path_class(&mut self, id: &str, class: &str, enabled: bool);

    /// Recolour a marker.
    fn fill_marker(&mut self, marker_id: &str, fill: MarkerFill);

    /// Position and size the surface relative to its container.
    fn place_surface(&mut self, frame: Rect);
}

/// The element that lays out and scales the stage grid.
pub trait LayoutContainer {
    /// Current viewport width in CSS pixels.
    fn viewport_width(&self) -> f64;

    /// On-screen box of the stage grid after its scale transform.
    fn grid_box(&self) -> Option<Rect>;

    /// On-screen box of the element the surface is positioned in.
    fn container_box(&self) -> Option<Rect>;

    /// Apply a scale transform to the stage grid.
    fn set_grid_scale(&mut self, scale: f64);

    /// Show or hide the zoom buttons.
    fn set_zoom_controls_visible(&mut self, visible: bool);
}

/// Everything the engine needs from its page.
pub trait DiagramHost: StageRegistry + DrawingSurface + LayoutContainer {}

impl<T> DiagramHost for T where T: StageRegistry + DrawingSurface + LayoutContainer {}
