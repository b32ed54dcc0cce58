use std::{collections::BTreeSet, path::Path};

use anyhow::Context as _;

use crate::foundation::{
    core::LayoutMode,
    error::{DiagramError, DiagramResult},
};

/// Maximum number of stage reveals or connector draws a single step may issue.
pub const MAX_STEP_FANOUT: usize = 2;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A complete, hand-authored diagram description.
///
/// The manifest fixes the topology: which stages exist, which connectors join them, and in what
/// order the animation reveals them. Only pixel geometry and the layout mode are computed at
/// runtime.
pub struct DiagramManifest {
    /// Stages in authoring order.
    pub stages: Vec<StageSpec>,
    /// Connectors in drawing order. Wide-only and narrow-only variants live side by side.
    pub edges: Vec<EdgeSpec>,
    /// Reveal order for each layout mode.
    pub steps: StepPlan,
    /// Element key of the terminal label revealed after the final step.
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One named processing stage.
pub struct StageSpec {
    /// Stable stage identifier.
    pub id: String,
    /// Host key of the element measured for geometry. Defaults to `box-<id>`.
    #[serde(default)]
    pub element: Option<String>,
    /// Host key of the wrapper faded in on reveal. Defaults to `stage-wrapper-<id>`.
    #[serde(default)]
    pub wrapper: Option<String>,
    /// Placement hint for hosts that lay the grid out themselves.
    #[serde(default)]
    pub grid: Option<GridCell>,
}

impl StageSpec {
    /// Stage with default element and wrapper keys.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element: None,
            wrapper: None,
            grid: None,
        }
    }

    /// Builder-style grid placement.
    pub fn at(mut self, col: u32, row: u32) -> Self {
        self.grid = Some(GridCell { col, row });
        self
    }

    /// Builder-style element key override.
    pub fn with_element(mut self, key: impl Into<String>) -> Self {
        self.element = Some(key.into());
        self
    }

    /// Host key of the measured element.
    pub fn element_key(&self) -> String {
        self.element
            .clone()
            .unwrap_or_else(|| format!("box-{}", self.id))
    }

    /// Host key of the reveal wrapper.
    pub fn wrapper_key(&self) -> String {
        self.wrapper
            .clone()
            .unwrap_or_else(|| format!("stage-wrapper-{}", self.id))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Zero-based grid column/row.
pub struct GridCell {
    /// Column index.
    pub col: u32,
    /// Row index.
    pub row: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A directed connector between two stages.
pub struct EdgeSpec {
    /// Path identifier on the drawing surface.
    pub id: String,
    /// Source stage id.
    pub from: String,
    /// Target stage id.
    pub to: String,
    /// Authored routing on wide layouts.
    #[serde(default)]
    pub routing: Routing,
    /// Layout modes this connector is drawn in.
    #[serde(default)]
    pub modes: ModeFilter,
}

impl EdgeSpec {
    /// Connector drawn in both modes.
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        routing: Routing,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            routing,
            modes: ModeFilter::Both,
        }
    }

    /// Builder-style mode restriction.
    pub fn only(mut self, modes: ModeFilter) -> Self {
        self.modes = modes;
        self
    }

    /// Whether the connector is part of the edge set for `mode`.
    pub fn applies_to(&self, mode: LayoutMode) -> bool {
        self.modes.allows(mode)
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// How a connector is routed between its anchors.
pub enum Routing {
    /// Direct line.
    #[default]
    Straight,
    /// Orthogonal detour through a column left of the target.
    ElbowLeft,
    /// Orthogonal detour through a column right of the target.
    ElbowRight,
    /// Cubic feedback curve from a downstream stage back upstream.
    BezierLoop,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// Layout-mode restriction of a connector.
pub enum ModeFilter {
    /// Drawn on every layout.
    #[default]
    Both,
    /// Drawn only on wide layouts.
    WideOnly,
    /// Drawn only on narrow layouts.
    NarrowOnly,
}

impl ModeFilter {
    /// Whether `mode` passes the filter.
    pub fn allows(self, mode: LayoutMode) -> bool {
        match self {
            Self::Both => true,
            Self::WideOnly => mode == LayoutMode::Wide,
            Self::NarrowOnly => mode == LayoutMode::Narrow,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Reveal order per layout mode.
pub struct StepPlan {
    /// Steps on wide layouts.
    pub wide: Vec<StepSpec>,
    /// Steps on narrow layouts.
    pub narrow: Vec<StepSpec>,
}

impl StepPlan {
    /// Steps for `mode`.
    pub fn for_mode(&self, mode: LayoutMode) -> &[StepSpec] {
        match mode {
            LayoutMode::Wide => &self.wide,
            LayoutMode::Narrow => &self.narrow,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One animation step: up to two stage reveals followed by up to two connector draws.
pub struct StepSpec {
    /// Stage ids to fade in, in order.
    #[serde(default)]
    pub reveal: Vec<String>,
    /// Edge ids to draw in, issued together.
    #[serde(default)]
    pub draw: Vec<String>,
}

impl StepSpec {
    /// Step that reveals one stage and optionally draws connectors.
    pub fn reveal(stage: &str, draw: &[&str]) -> Self {
        Self {
            reveal: vec![stage.to_string()],
            draw: draw.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Step that only draws connectors.
    pub fn draw(draw: &[&str]) -> Self {
        Self {
            reveal: Vec::new(),
            draw: draw.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl DiagramManifest {
    /// Parse a manifest from JSON text and validate it.
    pub fn from_json(s: &str) -> DiagramResult<Self> {
        let manifest: Self =
            serde_json::from_str(s).map_err(|e| DiagramError::serde(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and validate a manifest JSON file.
    pub fn from_path(path: &Path) -> DiagramResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        Self::from_json(&s)
    }

    /// Look up a stage by id.
    pub fn stage(&self, id: &str) -> Option<&StageSpec> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&EdgeSpec> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Connectors drawn in `mode`, in manifest order.
    pub fn edges_for(&self, mode: LayoutMode) -> impl Iterator<Item = &EdgeSpec> {
        self.edges.iter().filter(move |e| e.applies_to(mode))
    }

    /// Check structural consistency of the manifest.
    pub fn validate(&self) -> DiagramResult<()> {
        if self.stages.is_empty() {
            return Err(DiagramError::validation(
                "manifest must declare at least one stage",
            ));
        }

        let mut stage_ids = BTreeSet::new();
        for stage in &self.stages {
            if stage.id.trim().is_empty() {
                return Err(DiagramError::validation("stage id must be non-empty"));
            }
            if !stage_ids.insert(stage.id.as_str()) {
                return Err(DiagramError::validation(format!(
                    "duplicate stage id '{}'",
                    stage.id
                )));
            }
        }

        let mut edge_ids = BTreeSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return Err(DiagramError::validation(format!(
                    "duplicate edge id '{}'",
                    edge.id
                )));
            }
            for end in [&edge.from, &edge.to] {
                if !stage_ids.contains(end.as_str()) {
                    return Err(DiagramError::validation(format!(
                        "edge '{}' references unknown stage '{end}'",
                        edge.id
                    )));
                }
            }
            if edge.from == edge.to {
                return Err(DiagramError::validation(format!(
                    "edge '{}' must join two distinct stages",
                    edge.id
                )));
            }
        }

        for mode in [LayoutMode::Wide, LayoutMode::Narrow] {
            for (idx, step) in self.steps.for_mode(mode).iter().enumerate() {
                self.validate_step(mode, idx, step, &stage_ids)?;
            }
        }
        Ok(())
    }

    fn validate_step(
        &self,
        mode: LayoutMode,
        idx: usize,
        step: &StepSpec,
        stage_ids: &BTreeSet<&str>,
    ) -> DiagramResult<()> {
        if step.reveal.len() > MAX_STEP_FANOUT || step.draw.len() > MAX_STEP_FANOUT {
            return Err(DiagramError::validation(format!(
                "{mode:?} step {idx} exceeds {MAX_STEP_FANOUT} reveals or draws"
            )));
        }
        for stage in &step.reveal {
            if !stage_ids.contains(stage.as_str()) {
                return Err(DiagramError::validation(format!(
                    "{mode:?} step {idx} reveals unknown stage '{stage}'"
                )));
            }
        }
        for edge_id in &step.draw {
            let Some(edge) = self.edge(edge_id) else {
                return Err(DiagramError::validation(format!(
                    "{mode:?} step {idx} draws unknown edge '{edge_id}'"
                )));
            };
            if !edge.applies_to(mode) {
                return Err(DiagramError::validation(format!(
                    "{mode:?} step {idx} draws edge '{edge_id}' which is not drawn in that mode"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/manifest/model.rs"]
mod tests;
