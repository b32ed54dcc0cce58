use crate::{
    foundation::{core::LayoutMode, error::DiagramError},
    geometry::resolver::resolve_all,
    host::{DrawingSurface, StageRegistry},
    manifest::{config::EngineConfig, model::DiagramManifest},
    path::builder::{ArrowMarker, DrawablePath, build_path},
};

/// Result of one draw pass.
#[derive(Debug)]
pub enum DrawOutcome {
    /// Every anchor resolved; applicable connectors were inserted in manifest order.
    Drawn {
        /// Paths now on the surface.
        inserted: usize,
        /// Connectors left off because they could not be measured.
        discarded: usize,
    },
    /// Some stage has zero area. The caller should redraw after the retry delay.
    Retry {
        /// Retry number to pass to the next pass.
        attempt: u32,
    },
    /// Layout never became ready within the retry budget. The surface holds no connectors.
    Exhausted,
    /// A required element is absent. The surface holds no connectors.
    Aborted(DiagramError),
}

impl DrawOutcome {
    /// `true` for [`DrawOutcome::Drawn`].
    pub fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn { .. })
    }
}

/// Owns the connector paths of the current draw pass.
#[derive(Clone, Debug, Default)]
pub struct LineDrawer {
    paths: Vec<DrawablePath>,
}

impl LineDrawer {
    /// Empty drawer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of the last successful pass, in insertion order.
    pub fn paths(&self) -> &[DrawablePath] {
        &self.paths
    }

    /// Path with identifier `id`.
    pub fn path(&self, id: &str) -> Option<&DrawablePath> {
        self.paths.iter().find(|p| p.id == id)
    }

    /// Clear the surface, reinstall the arrowhead marker, then route every connector that
    /// applies to `mode`.
    ///
    /// `retry_count` is the number of passes already attempted for this redraw.
    #[tracing::instrument(skip(self, host, manifest, config))]
    pub fn draw_all<H>(
        &mut self,
        host: &mut H,
        manifest: &DiagramManifest,
        config: &EngineConfig,
        mode: LayoutMode,
        retry_count: u32,
    ) -> DrawOutcome
    where
        H: StageRegistry + DrawingSurface + ?Sized,
    {
        self.paths.clear();
        host.clear_surface();
        host.install_marker(&ArrowMarker::default());

        let Some(surface) = host.surface_box() else {
            tracing::error!("drawing surface not found; connectors not drawn");
            return DrawOutcome::Aborted(DiagramError::missing_element("drawing surface"));
        };

        let anchors = match resolve_all(&*host, surface, manifest) {
            Ok(anchors) => anchors,
            Err(unresolved) if unresolved.missing => {
                tracing::error!(
                    stage = %unresolved.stage,
                    element = %unresolved.element,
                    "stage element not found; connectors not drawn"
                );
                return DrawOutcome::Aborted(DiagramError::missing_element(format!(
                    "stage '{}' (element '{}')",
                    unresolved.stage, unresolved.element
                )));
            }
            Err(unresolved) => {
                let max = config.retry.draw_max_retries;
                if retry_count < max {
                    tracing::warn!(
                        stage = %unresolved.stage,
                        attempt = retry_count + 1,
                        max,
                        "stage has zero area; retrying draw"
                    );
                    return DrawOutcome::Retry {
                        attempt: retry_count + 1,
                    };
                }
                tracing::error!(
                    stage = %unresolved.stage,
                    retries = retry_count,
                    "layout never became ready; connectors not drawn"
                );
                return DrawOutcome::Exhausted;
            }
        };

        let mut discarded = 0usize;
        for edge in manifest.edges_for(mode) {
            let (Some(from), Some(to)) = (anchors.get(&edge.from), anchors.get(&edge.to)) else {
                discarded += 1;
                continue;
            };
            match build_path(edge, from, to, mode, config.route_margin) {
                Some(path) => {
                    host.insert_path(&path);
                    self.paths.push(path);
                }
                None => discarded += 1,
            }
        }

        tracing::info!(
            inserted = self.paths.len(),
            discarded,
            ?mode,
            "connectors drawn"
        );
        DrawOutcome::Drawn {
            inserted: self.paths.len(),
            discarded,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/drawer.rs"]
mod tests;
