use std::collections::BTreeMap;

use crate::{
    foundation::core::{Point, Rect, rect_center},
    host::StageRegistry,
    manifest::model::DiagramManifest,
};

/// Result of resolving one stage's anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Center of the stage box in surface-local coordinates.
    Ready(Point),
    /// The element is not in the host at all.
    Missing,
    /// The element exists but has zero width or height (not laid out yet).
    Collapsed,
}

impl Anchor {
    /// The anchor point, if resolved.
    pub fn point(self) -> Option<Point> {
        match self {
            Self::Ready(p) => Some(p),
            Self::Missing | Self::Collapsed => None,
        }
    }
}

/// Center of the element `key` relative to `surface`'s origin.
pub fn resolve_center<R>(registry: &R, surface: Rect, key: &str) -> Anchor
where
    R: StageRegistry + ?Sized,
{
    let Some(rect) = registry.stage_box(key) else {
        return Anchor::Missing;
    };
    match rect_center(rect) {
        Some(center) => Anchor::Ready(Point::new(
            center.x - surface.x0,
            center.y - surface.y0,
        )),
        None => Anchor::Collapsed,
    }
}

/// Anchors of every stage for one draw pass. Never kept across passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnchorSet {
    points: BTreeMap<String, Point>,
}

impl AnchorSet {
    /// Anchor of stage `id`.
    pub fn get(&self, id: &str) -> Option<Point> {
        self.points.get(id).copied()
    }

    /// Number of resolved stages.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` when no stage was resolved.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The first stage whose anchor could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedStage {
    /// Stage identifier.
    pub stage: String,
    /// Host key that was measured.
    pub element: String,
    /// `true` if the element is absent, `false` if it is only collapsed.
    pub missing: bool,
}

/// Resolve every stage of the manifest, in manifest order, stopping at the first failure.
pub fn resolve_all<R>(
    registry: &R,
    surface: Rect,
    manifest: &DiagramManifest,
) -> Result<AnchorSet, UnresolvedStage>
where
    R: StageRegistry + ?Sized,
{
    let mut points = BTreeMap::new();
    for stage in &manifest.stages {
        let element = stage.element_key();
        match resolve_center(registry, surface, &element) {
            Anchor::Ready(p) => {
                points.insert(stage.id.clone(), p);
            }
            anchor => {
                return Err(UnresolvedStage {
                    stage: stage.id.clone(),
                    element,
                    missing: anchor == Anchor::Missing,
                });
            }
        }
    }
    Ok(AnchorSet { points })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/resolver.rs"]
mod tests;
