pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Which of the two page layouts the diagram is rendered in.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Desktop grid with lateral edge routing.
    #[default]
    Wide,
    /// Vertical stack with simplified routing.
    Narrow,
}

impl LayoutMode {
    /// Derive the mode from a viewport width. Widths at or below the breakpoint are narrow.
    pub fn for_viewport(width_px: f64, breakpoint_px: f64) -> Self {
        if width_px <= breakpoint_px {
            Self::Narrow
        } else {
            Self::Wide
        }
    }

    /// `true` for [`LayoutMode::Wide`].
    pub fn is_wide(self) -> bool {
        self == Self::Wide
    }
}

/// Zoom factor stored in tenths so repeated steps never drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    /// Smallest zoom, `0.5`.
    pub const MIN: Self = Self(5);
    /// Largest zoom, `2.0`.
    pub const MAX: Self = Self(20);
    /// Unscaled, `1.0`.
    pub const DEFAULT: Self = Self(10);

    /// Nearest zoom level for a scale factor, clamped to `[MIN, MAX]`.
    pub fn from_scale(scale: f64) -> Self {
        if !scale.is_finite() {
            return Self::DEFAULT;
        }
        let tenths = (scale * 10.0).round().clamp(f64::from(Self::MIN.0), f64::from(Self::MAX.0));
        Self(tenths as u8)
    }

    /// Scale factor applied to the layout container.
    pub fn scale(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    /// One step (`+0.1`) larger, saturating at [`ZoomLevel::MAX`].
    pub fn stepped_in(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }

    /// One step (`-0.1`) smaller, saturating at [`ZoomLevel::MIN`].
    pub fn stepped_out(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN.0))
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Center of a rect, or `None` when it has zero (or negative, or non-finite) area.
pub fn rect_center(rect: Rect) -> Option<Point> {
    let w = rect.width();
    let h = rect.height();
    if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some(rect.center())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
