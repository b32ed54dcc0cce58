use crate::{
    foundation::core::{LayoutMode, ZoomLevel},
    host::LayoutContainer,
    manifest::config::EngineConfig,
    time::scheduler::{Scheduler, Task, TimerId},
};

/// Zoom command issued by the page's zoom buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomCommand {
    /// One step larger.
    In,
    /// One step smaller.
    Out,
    /// Back to `1.0`.
    Reset,
}

/// Tracks layout mode and zoom and owns the debounce timers that trigger a re-geometry.
///
/// A resize arms (or re-arms) a debounce timer; only the last one in a burst survives. A
/// zoom applies the new scale at once and arms a settle timer so geometry is re-measured
/// after the transform has taken effect.
#[derive(Clone, Debug, Default)]
pub struct ViewportAdapter {
    mode: LayoutMode,
    zoom: ZoomLevel,
    resize_timer: Option<TimerId>,
    zoom_timer: Option<TimerId>,
}

impl ViewportAdapter {
    /// Adapter starting in `mode` at zoom `1.0`.
    pub fn new(mode: LayoutMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Layout mode of the last sync.
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Current zoom.
    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    /// `true` while a resize debounce or zoom settle timer is pending.
    pub fn is_settling(&self) -> bool {
        self.resize_timer.is_some() || self.zoom_timer.is_some()
    }

    /// Re-derive the layout mode from the host's viewport and update the zoom controls.
    ///
    /// Entering narrow mode drops any zoom back to `1.0`, since zoom is unavailable there.
    /// Returns `true` if the mode changed.
    pub(crate) fn sync<H>(&mut self, host: &mut H, config: &EngineConfig) -> bool
    where
        H: LayoutContainer + ?Sized,
    {
        let mode = config.layout_mode(host.viewport_width());
        let changed = mode != self.mode;
        if changed {
            tracing::info!(from = ?self.mode, to = ?mode, "layout mode changed");
        }
        self.mode = mode;
        host.set_zoom_controls_visible(mode.is_wide());
        if !mode.is_wide() && self.zoom != ZoomLevel::DEFAULT {
            tracing::debug!(zoom = self.zoom.scale(), "narrow layout; zoom reset to 1.0");
            self.zoom = ZoomLevel::DEFAULT;
            host.set_grid_scale(self.zoom.scale());
        }
        changed
    }

    /// Arm the resize debounce. Any pending resize or zoom rebuild is dropped, so at most one
    /// rebuild is ever armed.
    pub(crate) fn arm_resize<S>(&mut self, scheduler: &mut S, config: &EngineConfig) -> TimerId
    where
        S: Scheduler + ?Sized,
    {
        self.disarm(scheduler);
        let id = scheduler.schedule(config.timing.resize_debounce(), Task::ResizeSettled);
        self.resize_timer = Some(id);
        id
    }

    /// Claim an expired resize timer. Returns `false` for a stale one.
    pub(crate) fn take_resize(&mut self, id: TimerId) -> bool {
        take_if(&mut self.resize_timer, id)
    }

    /// Apply a zoom command. Returns the new level, or `None` when zoom is unavailable in the
    /// current mode.
    pub(crate) fn apply_zoom<H>(&mut self, host: &mut H, command: ZoomCommand) -> Option<ZoomLevel>
    where
        H: LayoutContainer + ?Sized,
    {
        if !self.mode.is_wide() {
            tracing::debug!(?command, "zoom disabled on narrow layouts");
            return None;
        }
        self.zoom = match command {
            ZoomCommand::In => self.zoom.stepped_in(),
            ZoomCommand::Out => self.zoom.stepped_out(),
            ZoomCommand::Reset => ZoomLevel::DEFAULT,
        };
        host.set_grid_scale(self.zoom.scale());
        tracing::info!(zoom = self.zoom.scale(), "zoom adjusted");
        Some(self.zoom)
    }

    /// Arm the zoom settle timer. Like [`Self::arm_resize`], it supersedes any pending rebuild.
    pub(crate) fn arm_zoom<S>(&mut self, scheduler: &mut S, config: &EngineConfig) -> TimerId
    where
        S: Scheduler + ?Sized,
    {
        self.disarm(scheduler);
        let id = scheduler.schedule(config.timing.zoom_settle(), Task::ZoomSettled);
        self.zoom_timer = Some(id);
        id
    }

    /// Claim an expired zoom timer. Returns `false` for a stale one.
    pub(crate) fn take_zoom(&mut self, id: TimerId) -> bool {
        take_if(&mut self.zoom_timer, id)
    }

    fn disarm<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler + ?Sized,
    {
        for id in [self.resize_timer.take(), self.zoom_timer.take()]
            .into_iter()
            .flatten()
        {
            scheduler.cancel(id);
        }
    }
}

fn take_if(slot: &mut Option<TimerId>, id: TimerId) -> bool {
    if *slot == Some(id) {
        *slot = None;
        true
    } else {
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/adapter.rs"]
mod tests;
