/// Convenience result type used across the tour engine.
pub type TourResult<T> = Result<T, TourError>;

/// Top-level error taxonomy used by tour APIs.
#[derive(thiserror::Error, Debug)]
pub enum TourError {
    /// A navigation target outside `[0, len)`.
    #[error("invalid step index {index} (tour has {len} steps)")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Number of steps in the tour.
        len: usize,
    },

    /// No measurement handle is registered for the step.
    #[error("no target registered for step {0}")]
    UnregisteredTarget(usize),

    /// Invalid user-provided configuration or geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing tour configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TourError {
    /// Build a [`TourError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TourError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether a measurement failing with this error is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UnregisteredTarget(_) | Self::Other(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
