use crate::{
    foundation::core::LayoutMode,
    host::{
        ANIMATE_CLASS, BoxStyle, DrawingSurface, FADED_IN_CLASS, LABEL_HIDDEN_OFFSET,
        MarkerFill, PathStyle, STAGE_HIDDEN_OFFSET, StageRegistry,
    },
    manifest::{
        config::EngineConfig,
        model::{DiagramManifest, StepSpec},
    },
    path::builder::DrawablePath,
    time::scheduler::{Scheduler, Task, TimerId},
};

/// Lifecycle of the sequencer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum SequencerState {
    /// Never started, or stopped while not running.
    #[default]
    Idle,
    /// A cycle is in progress or waiting to restart.
    Running,
    /// Stopped by an external request.
    Interrupted,
}

/// Visibility of a stage wrapper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum RevealState {
    /// At the hidden baseline.
    #[default]
    Hidden,
    /// Fade-in issued during the current step.
    Revealing,
    /// Fade-in issued during an earlier step.
    Revealed,
}

/// A stage as seen by the sequencer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StageNode {
    /// Stage identifier.
    pub id: String,
    /// Host key of the wrapper that fades in.
    pub wrapper: String,
    /// Current visibility.
    pub state: RevealState,
}

/// What the cycle's pending timer will do when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Reveal { step: usize, item: usize },
    Settle { step: usize },
    Label,
    Finale,
    Restart,
}

/// One run through the step list.
///
/// A cycle owns at most one pending timer; it is cancelled whenever the cycle is dropped.
#[derive(Clone, Debug)]
pub struct AnimationCycle {
    number: u64,
    steps: Vec<StepSpec>,
    phase: Phase,
    pending: Option<TimerId>,
}

impl AnimationCycle {
    /// 1-based cycle counter.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Index of the step currently being worked on, or `None` after the last step.
    pub fn current_step(&self) -> Option<usize> {
        match self.phase {
            Phase::Reveal { step, .. } | Phase::Settle { step } => Some(step),
            Phase::Label | Phase::Finale | Phase::Restart => None,
        }
    }

    /// Pending timer handle.
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending
    }
}

/// Borrowed engine state a sequencer operation works on.
pub(crate) struct SequencerCtx<'a, H: ?Sized, S: ?Sized> {
    pub(crate) host: &'a mut H,
    pub(crate) scheduler: &'a mut S,
    pub(crate) paths: &'a [DrawablePath],
    pub(crate) manifest: &'a DiagramManifest,
    pub(crate) config: &'a EngineConfig,
    pub(crate) mode: LayoutMode,
}

/// Looping reveal state machine.
#[derive(Clone, Debug, Default)]
pub struct Sequencer {
    state: SequencerState,
    cycle: Option<AnimationCycle>,
    stages: Vec<StageNode>,
    label: Option<String>,
    restore: Option<TimerId>,
    cycles_started: u64,
}

impl Sequencer {
    /// Sequencer for the manifest's stages, all hidden.
    pub fn new(manifest: &DiagramManifest) -> Self {
        Self {
            stages: manifest
                .stages
                .iter()
                .map(|s| StageNode {
                    id: s.id.clone(),
                    wrapper: s.wrapper_key(),
                    state: RevealState::Hidden,
                })
                .collect(),
            label: manifest.label.clone(),
            ..Self::default()
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// `true` while running.
    pub fn is_running(&self) -> bool {
        self.state == SequencerState::Running
    }

    /// The active cycle.
    pub fn cycle(&self) -> Option<&AnimationCycle> {
        self.cycle.as_ref()
    }

    /// Number of cycles begun so far.
    pub fn cycles_started(&self) -> u64 {
        self.cycles_started
    }

    /// Stage visibility.
    pub fn stages(&self) -> &[StageNode] {
        &self.stages
    }

    /// Visibility of stage `id`.
    pub fn stage_state(&self, id: &str) -> Option<RevealState> {
        self.stages.iter().find(|s| s.id == id).map(|s| s.state)
    }

    /// Begin a cycle. Does nothing and returns `false` if one is already running.
    pub(crate) fn start<H, S>(&mut self, cx: &mut SequencerCtx<'_, H, S>) -> bool
    where
        H: StageRegistry + DrawingSurface + ?Sized,
        S: Scheduler + ?Sized,
    {
        if self.state == SequencerState::Running {
            tracing::debug!("animation already running");
            return false;
        }
        self.state = SequencerState::Running;
        self.begin_cycle(cx);
        true
    }

    /// Halt the cycle and cancel its pending timer. Returns `true` if a cycle was running.
    pub(crate) fn stop<S>(&mut self, scheduler: &mut S) -> bool
    where
        S: Scheduler + ?Sized,
    {
        if let Some(cycle) = self.cycle.take()
            && let Some(id) = cycle.pending
        {
            scheduler.cancel(id);
        }
        if self.state != SequencerState::Running {
            return false;
        }
        self.state = SequencerState::Interrupted;
        tracing::info!("animation stopped");
        true
    }

    /// Put every stage, connector and the label back at the hidden baseline without
    /// transitions, then re-enable transitions after a short delay.
    pub(crate) fn reset<H, S>(&mut self, cx: &mut SequencerCtx<'_, H, S>)
    where
        H: StageRegistry + DrawingSurface + ?Sized,
        S: Scheduler + ?Sized,
    {
        for stage in &mut self.stages {
            cx.host.set_transitions(&stage.wrapper, false);
            cx.host
                .apply_style(&stage.wrapper, BoxStyle::hidden(STAGE_HIDDEN_OFFSET));
            cx.host.set_class(&stage.wrapper, FADED_IN_CLASS, false);
            stage.state = RevealState::Hidden;
        }

        let resting = cx.config.path_opacity.for_mode(cx.mode);
        for path in cx.paths {
            cx.host.set_path_transitions(&path.id, false);
            cx.host.style_path(
                &path.id,
                PathStyle {
                    dash_offset: path.length,
                    opacity: resting,
                },
            );
            cx.host.set_path_class(&path.id, ANIMATE_CLASS, false);
            cx.host.fill_marker(&path.marker_id, MarkerFill::Idle);
        }

        if let Some(label) = &self.label {
            cx.host.set_transitions(label, false);
            cx.host
                .apply_style(label, BoxStyle::hidden(LABEL_HIDDEN_OFFSET));
            cx.host.set_class(label, FADED_IN_CLASS, false);
        }

        if let Some(id) = self.restore.take() {
            cx.scheduler.cancel(id);
        }
        self.restore = Some(
            cx.scheduler
                .schedule(cx.config.timing.restore_transitions(), Task::RestoreTransitions),
        );
    }

    /// Handle expiry of the restore timer armed by [`Sequencer::reset`].
    pub(crate) fn on_restore<H>(&mut self, id: TimerId, host: &mut H, paths: &[DrawablePath])
    where
        H: StageRegistry + DrawingSurface + ?Sized,
    {
        if self.restore != Some(id) {
            return;
        }
        self.restore = None;
        for stage in &self.stages {
            host.set_transitions(&stage.wrapper, true);
        }
        for path in paths {
            host.set_path_transitions(&path.id, true);
        }
        if let Some(label) = &self.label {
            host.set_transitions(label, true);
        }
    }

    /// Handle expiry of the cycle timer. Stale timers and timers arriving after a stop are
    /// ignored; returns whether any work was done.
    pub(crate) fn on_timer<H, S>(&mut self, id: TimerId, cx: &mut SequencerCtx<'_, H, S>) -> bool
    where
        H: StageRegistry + DrawingSurface + ?Sized,
        S: Scheduler + ?Sized,
    {
        if self.state != SequencerState::Running {
            return false;
        }
        let Some(cycle) = self.cycle.as_mut() else {
            return false;
        };
        if cycle.pending != Some(id) {
            tracing::debug!(?id, "ignoring stale animation timer");
            return false;
        }
        cycle.pending = None;
        let phase = cycle.phase;

        match phase {
            Phase::Reveal { step, item } => {
                let spec = cycle.steps[step].clone();
                if let Some(stage_id) = spec.reveal.get(item) {
                    self.reveal_stage(stage_id, cx);
                }
                if item + 1 < spec.reveal.len() {
                    self.arm(
                        Phase::Reveal {
                            step,
                            item: item + 1,
                        },
                        cx.config.timing.reveal_delay(),
                        cx.scheduler,
                    );
                } else {
                    draw_connectors(&spec, cx);
                    self.arm(
                        Phase::Settle { step },
                        cx.config.timing.settle_delay(),
                        cx.scheduler,
                    );
                }
            }
            Phase::Settle { step } => {
                let revealed = cycle.steps[step].reveal.clone();
                for stage in &mut self.stages {
                    if stage.state == RevealState::Revealing && revealed.contains(&stage.id) {
                        stage.state = RevealState::Revealed;
                    }
                }
                self.enter_step(step + 1, cx);
            }
            Phase::Label => {
                if let Some(label) = self.label.clone() {
                    reveal_box(cx.host, &label, LABEL_HIDDEN_OFFSET);
                }
                self.arm(
                    Phase::Finale,
                    cx.config.timing.finale_delay(),
                    cx.scheduler,
                );
            }
            Phase::Finale => {
                tracing::info!(cycle = cycle.number, "animation cycle finished");
                self.reset(cx);
                self.arm(
                    Phase::Restart,
                    cx.config.timing.restart_gap(),
                    cx.scheduler,
                );
            }
            Phase::Restart => self.begin_cycle(cx),
        }
        true
    }

    fn begin_cycle<H, S>(&mut self, cx: &mut SequencerCtx<'_, H, S>)
    where
        H: StageRegistry + DrawingSurface + ?Sized,
        S: Scheduler + ?Sized,
    {
        if let Some(old) = self.cycle.take()
            && let Some(id) = old.pending
        {
            cx.scheduler.cancel(id);
        }
        self.cycles_started += 1;
        let steps = cx.manifest.steps.for_mode(cx.mode).to_vec();
        tracing::info!(
            cycle = self.cycles_started,
            mode = ?cx.mode,
            steps = steps.len(),
            "animation cycle started"
        );
        self.cycle = Some(AnimationCycle {
            number: self.cycles_started,
            steps,
            phase: Phase::Restart,
            pending: None,
        });
        self.enter_step(0, cx);
    }

    fn enter_step<H, S>(&mut self, step: usize, cx: &mut SequencerCtx<'_, H, S>)
    where
        H: StageRegistry + DrawingSurface + ?Sized,
        S: Scheduler + ?Sized,
    {
        let Some(cycle) = self.cycle.as_ref() else {
            return;
        };
        let timing = &cx.config.timing;
        match cycle.steps.get(step) {
            None if self.label.is_some() => {
                self.arm(Phase::Label, timing.reveal_delay(), cx.scheduler);
            }
            None => self.arm(Phase::Finale, timing.finale_delay(), cx.scheduler),
            Some(spec) if !spec.reveal.is_empty() => {
                self.arm(
                    Phase::Reveal { step, item: 0 },
                    timing.reveal_delay(),
                    cx.scheduler,
                );
            }
            Some(spec) => {
                tracing::debug!(step, "drawing connectors");
                let spec = spec.clone();
                draw_connectors(&spec, cx);
                self.arm(Phase::Settle { step }, timing.settle_delay(), cx.scheduler);
            }
        }
    }

    fn arm<S>(&mut self, phase: Phase, delay: std::time::Duration, scheduler: &mut S)
    where
        S: Scheduler + ?Sized,
    {
        let Some(cycle) = self.cycle.as_mut() else {
            return;
        };
        if let Some(prev) = cycle.pending.take() {
            scheduler.cancel(prev);
        }
        cycle.phase = phase;
        cycle.pending = Some(scheduler.schedule(delay, Task::Sequencer));
    }

    fn reveal_stage<H, S>(&mut self, stage_id: &str, cx: &mut SequencerCtx<'_, H, S>)
    where
        H: StageRegistry + DrawingSurface + ?Sized,
        S: Scheduler + ?Sized,
    {
        let Some(stage) = self.stages.iter_mut().find(|s| s.id == stage_id) else {
            return;
        };
        tracing::debug!(stage = %stage.id, "revealing stage");
        reveal_box(cx.host, &stage.wrapper, STAGE_HIDDEN_OFFSET);
        stage.state = RevealState::Revealing;
    }
}

/// Snap an element to its hidden baseline with transitions off, then transition it in.
fn reveal_box<H>(host: &mut H, key: &str, hidden_offset: f64)
where
    H: StageRegistry + ?Sized,
{
    host.set_transitions(key, false);
    host.apply_style(key, BoxStyle::hidden(hidden_offset));
    host.set_transitions(key, true);
    host.apply_style(key, BoxStyle::SHOWN);
    host.set_class(key, FADED_IN_CLASS, true);
}

fn draw_connectors<H, S>(spec: &StepSpec, cx: &mut SequencerCtx<'_, H, S>)
where
    H: StageRegistry + DrawingSurface + ?Sized,
    S: Scheduler + ?Sized,
{
    let resting = cx.config.path_opacity.for_mode(cx.mode);
    let marker_fill = if cx.mode.is_wide() {
        MarkerFill::Active
    } else {
        MarkerFill::Idle
    };
    for edge_id in &spec.draw {
        let Some(path) = cx.paths.iter().find(|p| &p.id == edge_id) else {
            tracing::debug!(edge = %edge_id, "connector not on surface; skipping");
            continue;
        };
        cx.host.set_path_transitions(&path.id, false);
        cx.host.style_path(
            &path.id,
            PathStyle {
                dash_offset: path.length,
                opacity: resting,
            },
        );
        cx.host.set_path_transitions(&path.id, true);
        cx.host.style_path(
            &path.id,
            PathStyle {
                dash_offset: 0.0,
                opacity: 1.0,
            },
        );
        cx.host.set_path_class(&path.id, ANIMATE_CLASS, true);
        cx.host.fill_marker(&path.marker_id, marker_fill);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sequencer.rs"]
mod tests;
