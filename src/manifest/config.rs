use std::{path::Path, time::Duration};

use anyhow::Context as _;

use crate::foundation::{
    core::LayoutMode,
    error::{DiagramError, DiagramResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Engine tunables. Every field has a default matching the page it was built for.
pub struct EngineConfig {
    /// Viewport widths at or below this value use the narrow layout.
    pub narrow_breakpoint_px: f64,
    /// Lateral offset used by elbow routes and loop-back control points.
    pub route_margin: f64,
    /// Animation and debounce timings.
    pub timing: Timing,
    /// Retry policy for drawing and initialization.
    pub retry: RetryPolicy,
    /// Resting connector opacity per layout mode.
    pub path_opacity: PathOpacity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            narrow_breakpoint_px: 992.0,
            route_margin: 100.0,
            timing: Timing::default(),
            retry: RetryPolicy::default(),
            path_opacity: PathOpacity::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Millisecond timings of the sequencer and viewport adapter.
pub struct Timing {
    /// Wait before each stage fades in.
    pub reveal_delay_ms: u64,
    /// Wait after a step's effects are issued.
    pub settle_delay_ms: u64,
    /// Gap between the end of a cycle and the next one.
    pub restart_gap_ms: u64,
    /// How long transitions stay disabled after a reset.
    pub restore_transitions_ms: u64,
    /// Resize debounce window.
    pub resize_debounce_ms: u64,
    /// Delay between applying a zoom scale and re-measuring.
    pub zoom_settle_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 200,
            settle_delay_ms: 600,
            restart_gap_ms: 1000,
            restore_transitions_ms: 50,
            resize_debounce_ms: 250,
            zoom_settle_ms: 300,
        }
    }
}

impl Timing {
    pub(crate) fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub(crate) fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub(crate) fn finale_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms.saturating_mul(2))
    }

    pub(crate) fn restart_gap(&self) -> Duration {
        Duration::from_millis(self.restart_gap_ms)
    }

    pub(crate) fn restore_transitions(&self) -> Duration {
        Duration::from_millis(self.restore_transitions_ms)
    }

    pub(crate) fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub(crate) fn zoom_settle(&self) -> Duration {
        Duration::from_millis(self.zoom_settle_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Bounded retries for layout that is not ready yet.
pub struct RetryPolicy {
    /// Redraw attempts after the first one.
    pub draw_max_retries: u32,
    /// Fixed delay between redraw attempts.
    pub draw_retry_delay_ms: u64,
    /// Initialization attempts after the first one.
    pub init_max_retries: u32,
    /// Base of the exponential initialization backoff.
    pub init_backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            draw_max_retries: 5,
            draw_retry_delay_ms: 100,
            init_max_retries: 10,
            init_backoff_base_ms: 200,
        }
    }
}

impl RetryPolicy {
    pub(crate) fn draw_retry_delay(&self) -> Duration {
        Duration::from_millis(self.draw_retry_delay_ms)
    }

    /// Backoff before initialization attempt `attempt + 1`: `base * 2^attempt`.
    pub fn init_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.init_backoff_base_ms.saturating_mul(factor))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Connector opacity before it is drawn in.
pub struct PathOpacity {
    /// Wide layouts.
    pub wide: f64,
    /// Narrow layouts.
    pub narrow: f64,
}

impl Default for PathOpacity {
    fn default() -> Self {
        Self {
            wide: 0.8,
            narrow: 0.7,
        }
    }
}

impl PathOpacity {
    /// Resting opacity for `mode`.
    pub fn for_mode(&self, mode: LayoutMode) -> f64 {
        match mode {
            LayoutMode::Wide => self.wide,
            LayoutMode::Narrow => self.narrow,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON text and validate it. Missing fields take their defaults.
    pub fn from_json(s: &str) -> DiagramResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| DiagramError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a config JSON file.
    pub fn from_path(path: &Path) -> DiagramResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&s)
    }

    /// Layout mode for a viewport width.
    pub fn layout_mode(&self, viewport_width_px: f64) -> LayoutMode {
        LayoutMode::for_viewport(viewport_width_px, self.narrow_breakpoint_px)
    }

    /// Check value ranges.
    pub fn validate(&self) -> DiagramResult<()> {
        if !self.narrow_breakpoint_px.is_finite() || self.narrow_breakpoint_px <= 0.0 {
            return Err(DiagramError::validation(
                "narrow_breakpoint_px must be finite and > 0",
            ));
        }
        if !self.route_margin.is_finite() || self.route_margin < 0.0 {
            return Err(DiagramError::validation(
                "route_margin must be finite and >= 0",
            ));
        }
        for (name, v) in [
            ("path_opacity.wide", self.path_opacity.wide),
            ("path_opacity.narrow", self.path_opacity.narrow),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(DiagramError::validation(format!("{name} must be in [0, 1]")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/config.rs"]
mod tests;
