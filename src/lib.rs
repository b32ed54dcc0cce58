//! Stageflow animates a pipeline diagram: stage boxes laid out on a page, joined by SVG
//! connectors that are drawn in step by step and then looped.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: stage boxes on the host page -> anchor points local to the drawing surface
//! 2. **Route**: anchors + [`Routing`] + [`LayoutMode`] -> SVG path data with a measured length
//! 3. **Draw**: clear the surface, install the arrowhead marker, insert every connector for the
//!    mode; retry a bounded number of times while layout is not ready
//! 4. **Sequence**: reveal stages and draw connectors in authored order, then reset and loop
//! 5. **Adapt**: debounce resizes and zoom, switch layout mode, rebuild and restart
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No DOM**: the page is reached only through [`StageRegistry`], [`DrawingSurface`] and
//!   [`LayoutContainer`]; [`SimulatedPage`] implements them in memory.
//! - **Timers are data**: every wait is a [`Task`] handed to a [`Scheduler`]. [`TimerQueue`]
//!   runs them in deterministic virtual time.
//! - **Degrade, don't fail**: a page that never lays out leaves the diagram without
//!   connectors and logs why; nothing panics.
//!
//! # Getting started
//!
//! ```no_run
//! use std::time::Duration;
//!
//! let mut diagram = stageflow::PipelineDiagram::simulated(
//!     stageflow::nlp_pipeline(),
//!     stageflow::EngineConfig::default(),
//!     1200.0,
//! )?;
//! diagram.initialize();
//! diagram.advance(Duration::from_secs(3));
//! let doc = stageflow::snapshot_document(diagram.host());
//! println!("{doc}");
//! # Ok::<(), stageflow::DiagramError>(())
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod draw;
mod engine;
mod export;
mod foundation;
mod geometry;
mod host;
mod manifest;
mod path;
mod time;
mod viewport;

pub use animation::sequencer::{
    AnimationCycle, RevealState, Sequencer, SequencerState, StageNode,
};
pub use draw::drawer::{DrawOutcome, LineDrawer};
pub use engine::diagram::{DrawStatus, PipelineDiagram};
pub use export::svg::{rasterize_png, snapshot_document, write_snapshot};
pub use foundation::core::{BezPath, LayoutMode, Point, Rect, Vec2, ZoomLevel, rect_center};
pub use foundation::error::{DiagramError, DiagramResult};
pub use geometry::resolver::{Anchor, AnchorSet, UnresolvedStage, resolve_all, resolve_center};
pub use host::layout::{PageFrames, PageGeometry, solve_page, translate_frames};
pub use host::simulated::{ElementState, SimulatedPage, SurfaceMarker, SurfacePath};
pub use host::{
    ANIMATE_CLASS, BoxStyle, DiagramHost, DrawingSurface, FADED_IN_CLASS, LABEL_HIDDEN_OFFSET,
    LayoutContainer, MarkerFill, PathStyle, STAGE_HIDDEN_OFFSET, StageRegistry,
};
pub use manifest::builtin::{RANKING_LABEL, nlp_pipeline};
pub use manifest::config::{EngineConfig, PathOpacity, RetryPolicy, Timing};
pub use manifest::model::{
    DiagramManifest, EdgeSpec, GridCell, MAX_STEP_FANOUT, ModeFilter, Routing, StageSpec,
    StepPlan, StepSpec,
};
pub use path::builder::{
    ARROWHEAD_MARKER_ID, ArrowMarker, DrawablePath, build_path, measure_length, path_data, route,
};
pub use time::scheduler::{Scheduler, Task, TimerId, TimerQueue};
pub use viewport::adapter::{ViewportAdapter, ZoomCommand};
