use std::time::Duration;

use crate::{
    animation::sequencer::{Sequencer, SequencerCtx, SequencerState},
    draw::drawer::{DrawOutcome, LineDrawer},
    foundation::{
        core::{LayoutMode, Rect, ZoomLevel},
        error::{DiagramError, DiagramResult},
    },
    host::{DiagramHost, SimulatedPage},
    manifest::{config::EngineConfig, model::DiagramManifest},
    path::builder::DrawablePath,
    time::scheduler::{Scheduler, Task, TimerId, TimerQueue},
    viewport::adapter::{ViewportAdapter, ZoomCommand},
};

/// Upper bound on timers fired by one [`PipelineDiagram::advance`] call.
const MAX_TASKS_PER_ADVANCE: usize = 100_000;

/// Successful result of a draw request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum DrawStatus {
    /// Connectors are on the surface.
    Drawn {
        /// Paths inserted.
        inserted: usize,
        /// Connectors left off because they could not be measured.
        discarded: usize,
    },
    /// Layout is not ready; a redraw is scheduled.
    Retrying {
        /// Retry number of the scheduled pass.
        attempt: u32,
    },
}

/// What to do once the current redraw sequence settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AfterDraw {
    Start,
    Initialize { attempt: u32 },
}

/// Animated pipeline diagram bound to a host page and a timer source.
///
/// Every entry point runs to completion synchronously; work that has to wait is handed to the
/// scheduler and comes back through [`PipelineDiagram::fire`].
pub struct PipelineDiagram<H, S = TimerQueue> {
    host: H,
    scheduler: S,
    manifest: DiagramManifest,
    config: EngineConfig,
    drawer: LineDrawer,
    sequencer: Sequencer,
    viewport: ViewportAdapter,
    redraw: Option<TimerId>,
    init: Option<TimerId>,
    after_draw: Option<AfterDraw>,
}

impl<H, S> PipelineDiagram<H, S>
where
    H: DiagramHost,
    S: Scheduler,
{
    /// Bind a validated manifest and config to `host`.
    pub fn new(
        host: H,
        scheduler: S,
        manifest: DiagramManifest,
        config: EngineConfig,
    ) -> DiagramResult<Self> {
        manifest.validate()?;
        config.validate()?;
        let mode = config.layout_mode(host.viewport_width());
        Ok(Self {
            sequencer: Sequencer::new(&manifest),
            viewport: ViewportAdapter::new(mode),
            host,
            scheduler,
            manifest,
            config,
            drawer: LineDrawer::new(),
            redraw: None,
            init: None,
            after_draw: None,
        })
    }

    /// The host page.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host page, e.g. to change its viewport before [`Self::on_resize`].
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The timer source.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Manifest in use.
    pub fn manifest(&self) -> &DiagramManifest {
        &self.manifest
    }

    /// Config in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Layout mode of the last viewport sync.
    pub fn mode(&self) -> LayoutMode {
        self.viewport.mode()
    }

    /// Current zoom.
    pub fn zoom_level(&self) -> ZoomLevel {
        self.viewport.zoom()
    }

    /// The animation state machine.
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Sequencer lifecycle state.
    pub fn state(&self) -> SequencerState {
        self.sequencer.state()
    }

    /// Connectors of the last successful draw.
    pub fn paths(&self) -> &[DrawablePath] {
        self.drawer.paths()
    }

    /// Size and position the drawing surface to cover the stage grid, relative to the layout
    /// container. Returns the frame applied.
    pub fn resize_to_container(&mut self) -> DiagramResult<Rect> {
        let grid = self
            .host
            .grid_box()
            .ok_or_else(|| DiagramError::missing_element("stage grid"))?;
        let container = self
            .host
            .container_box()
            .ok_or_else(|| DiagramError::missing_element("layout container"))?;
        let frame = Rect::from_origin_size(
            (grid.x0 - container.x0, grid.y0 - container.y0),
            grid.size(),
        );
        self.host.place_surface(frame);
        tracing::debug!(?frame, "drawing surface resized");
        Ok(frame)
    }

    /// Rebuild every connector for the current layout mode.
    ///
    /// A layout that is not ready yet schedules bounded redraws and reports
    /// [`DrawStatus::Retrying`]; the error cases leave the surface without connectors.
    #[tracing::instrument(skip(self))]
    pub fn draw_all(&mut self) -> DiagramResult<DrawStatus> {
        self.cancel_redraw();
        self.after_draw = None;
        self.run_draw(0)
    }

    /// Resize the surface, draw, then start animating. Failures retry with exponential
    /// backoff.
    #[tracing::instrument(skip(self))]
    pub fn initialize(&mut self) {
        self.cancel_init();
        self.initialize_attempt(0);
    }

    /// Start a cycle. Returns `false` if one is already running.
    pub fn start(&mut self) -> bool {
        self.with_sequencer(|seq, cx| seq.start(cx))
    }

    /// Stop animating and drop any scheduled redraw. Returns `true` if a cycle was running.
    pub fn stop(&mut self) -> bool {
        self.cancel_redraw();
        self.cancel_init();
        self.after_draw = None;
        self.sequencer.stop(&mut self.scheduler)
    }

    /// Put every stage box, connector and the label back at the hidden baseline.
    pub fn reset(&mut self) {
        self.with_sequencer(|seq, cx| seq.reset(cx));
    }

    /// Notify the engine that the viewport size changed.
    ///
    /// Animation halts at once; geometry is rebuilt after the debounce elapses without a
    /// further resize.
    pub fn on_resize(&mut self) {
        self.viewport.sync(&mut self.host, &self.config);
        self.stop();
        self.reset();
        self.viewport.arm_resize(&mut self.scheduler, &self.config);
    }

    /// Zoom in one step. Returns the new zoom, or `None` on narrow layouts.
    pub fn zoom_in(&mut self) -> Option<ZoomLevel> {
        self.zoom(ZoomCommand::In)
    }

    /// Zoom out one step. Returns the new zoom, or `None` on narrow layouts.
    pub fn zoom_out(&mut self) -> Option<ZoomLevel> {
        self.zoom(ZoomCommand::Out)
    }

    /// Restore zoom `1.0`. Returns `None` on narrow layouts.
    pub fn zoom_reset(&mut self) -> Option<ZoomLevel> {
        self.zoom(ZoomCommand::Reset)
    }

    /// Apply a zoom command. The scale applies at once; geometry is rebuilt once it settles.
    pub fn zoom(&mut self, command: ZoomCommand) -> Option<ZoomLevel> {
        // the viewport may have crossed the breakpoint without a resize notification
        if self.viewport.sync(&mut self.host, &self.config) {
            self.on_resize();
        }
        let level = self.viewport.apply_zoom(&mut self.host, command)?;
        self.stop();
        self.reset();
        self.viewport.arm_zoom(&mut self.scheduler, &self.config);
        Some(level)
    }

    /// Dispatch an expired timer. Timers that were cancelled or superseded are ignored.
    #[tracing::instrument(skip(self))]
    pub fn fire(&mut self, id: TimerId, task: Task) {
        match task {
            Task::Sequencer => {
                self.with_sequencer(|seq, cx| seq.on_timer(id, cx));
            }
            Task::RestoreTransitions => {
                self.sequencer
                    .on_restore(id, &mut self.host, self.drawer.paths());
            }
            Task::Redraw { attempt } => {
                if self.redraw != Some(id) {
                    return;
                }
                self.redraw = None;
                self.redraw_pass(attempt);
            }
            Task::Initialize { attempt } => {
                if self.init != Some(id) {
                    return;
                }
                self.init = None;
                self.initialize_attempt(attempt);
            }
            Task::ResizeSettled => {
                if self.viewport.take_resize(id) {
                    tracing::info!("viewport resized; redrawing connectors and restarting");
                    self.rebuild();
                }
            }
            Task::ZoomSettled => {
                if self.viewport.take_zoom(id) {
                    tracing::info!(zoom = self.viewport.zoom().scale(), "zoom settled; redrawing");
                    self.rebuild();
                }
            }
        }
    }

    fn with_sequencer<R>(
        &mut self,
        f: impl FnOnce(&mut Sequencer, &mut SequencerCtx<'_, H, S>) -> R,
    ) -> R {
        let mut cx = SequencerCtx {
            host: &mut self.host,
            scheduler: &mut self.scheduler,
            paths: self.drawer.paths(),
            manifest: &self.manifest,
            config: &self.config,
            mode: self.viewport.mode(),
        };
        f(&mut self.sequencer, &mut cx)
    }

    fn initialize_attempt(&mut self, attempt: u32) {
        tracing::info!(attempt, "initializing pipeline diagram");
        self.viewport.sync(&mut self.host, &self.config);
        if let Err(err) = self.resize_to_container() {
            tracing::error!(%err, attempt, "initialization failed");
            self.retry_initialize(attempt);
            return;
        }
        self.cancel_redraw();
        self.after_draw = Some(AfterDraw::Initialize { attempt });
        self.redraw_pass(0);
    }

    fn retry_initialize(&mut self, attempt: u32) {
        let max = self.config.retry.init_max_retries;
        if attempt >= max {
            tracing::error!(retries = attempt, "failed to initialize pipeline diagram");
            return;
        }
        let delay = self.config.retry.init_backoff(attempt);
        tracing::warn!(attempt = attempt + 1, max, ?delay, "retrying initialization");
        self.cancel_init();
        self.init = Some(self.scheduler.schedule(
            delay,
            Task::Initialize {
                attempt: attempt + 1,
            },
        ));
    }

    fn rebuild(&mut self) {
        // connectors are only ever recreated while no cycle is animating them
        if self.stop() {
            self.reset();
        }
        self.viewport.sync(&mut self.host, &self.config);
        if let Err(err) = self.resize_to_container() {
            tracing::warn!(%err, "drawing surface not resized");
        }
        self.after_draw = Some(AfterDraw::Start);
        self.redraw_pass(0);
    }

    /// Run a draw pass on behalf of a timer or lifecycle step, where nobody awaits the result.
    fn redraw_pass(&mut self, retry_count: u32) {
        match self.run_draw(retry_count) {
            Ok(status) => tracing::debug!(?status, "draw pass finished"),
            Err(err) => tracing::debug!(%err, "draw pass left the surface without connectors"),
        }
    }

    fn run_draw(&mut self, retry_count: u32) -> DiagramResult<DrawStatus> {
        let outcome = self.drawer.draw_all(
            &mut self.host,
            &self.manifest,
            &self.config,
            self.viewport.mode(),
            retry_count,
        );
        let result = match outcome {
            DrawOutcome::Drawn {
                inserted,
                discarded,
            } => Ok(DrawStatus::Drawn {
                inserted,
                discarded,
            }),
            DrawOutcome::Retry { attempt } => {
                self.redraw = Some(self.scheduler.schedule(
                    self.config.retry.draw_retry_delay(),
                    Task::Redraw { attempt },
                ));
                return Ok(DrawStatus::Retrying { attempt });
            }
            DrawOutcome::Exhausted => Err(DiagramError::layout_not_ready(format!(
                "stage boxes still have zero area after {retry_count} retries"
            ))),
            DrawOutcome::Aborted(err) => Err(err),
        };
        self.finish_draw(result.is_ok());
        result
    }

    fn finish_draw(&mut self, drawn: bool) {
        match self.after_draw.take() {
            None => {}
            // boxes still animate when connectors could not be drawn
            Some(AfterDraw::Start) => {
                self.start();
            }
            Some(AfterDraw::Initialize { .. }) if drawn => {
                self.start();
            }
            Some(AfterDraw::Initialize { attempt }) => self.retry_initialize(attempt),
        }
    }

    fn cancel_redraw(&mut self) {
        if let Some(id) = self.redraw.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_init(&mut self) {
        if let Some(id) = self.init.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl<H> PipelineDiagram<H, TimerQueue>
where
    H: DiagramHost,
{
    /// Fast-forward virtual time by `by`, firing every timer that comes due in order.
    /// Returns the number of timers fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let deadline = self.scheduler.now().saturating_add(by);
        let mut fired = 0;
        while let Some((id, task)) = self.scheduler.pop_due(deadline) {
            self.fire(id, task);
            fired += 1;
            if fired >= MAX_TASKS_PER_ADVANCE {
                tracing::warn!(fired, "timer budget exhausted; virtual time not fully advanced");
                return fired;
            }
        }
        self.scheduler.set_now(deadline);
        fired
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }
}

impl PipelineDiagram<SimulatedPage, TimerQueue> {
    /// Engine over an in-memory page of the given viewport width, at virtual time zero.
    pub fn simulated(
        manifest: DiagramManifest,
        config: EngineConfig,
        viewport_width: f64,
    ) -> DiagramResult<Self> {
        let page = SimulatedPage::new(&manifest, viewport_width, config.narrow_breakpoint_px);
        Self::new(page, TimerQueue::new(), manifest, config)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/diagram.rs"]
mod tests;
