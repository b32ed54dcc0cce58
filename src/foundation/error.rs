/// Convenience result type used across stageflow.
pub type DiagramResult<T> = Result<T, DiagramError>;

/// Top-level error taxonomy used by engine APIs.
///
/// None of these are fatal to a host page: the engine degrades to "diagram not fully drawn"
/// and reports the error through its outcome types and logs.
#[derive(thiserror::Error, Debug)]
pub enum DiagramError {
    /// Invalid manifest or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A stage or structural element is absent from the host entirely.
    #[error("missing element: {0}")]
    MissingElement(String),

    /// Elements stayed at zero area after every retry.
    #[error("layout not ready: {0}")]
    LayoutNotReady(String),

    /// A connector could not be built or measured.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Errors when serializing or deserializing manifests and configs.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DiagramError {
    /// Build a [`DiagramError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DiagramError::MissingElement`] value.
    pub fn missing_element(msg: impl Into<String>) -> Self {
        Self::MissingElement(msg.into())
    }

    /// Build a [`DiagramError::LayoutNotReady`] value.
    pub fn layout_not_ready(msg: impl Into<String>) -> Self {
        Self::LayoutNotReady(msg.into())
    }

    /// Build a [`DiagramError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`DiagramError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
