/// Convenience result type used across swatchforge.
pub type SwatchResult<T> = Result<T, SwatchError>;

/// Top-level error taxonomy used by every public API.
#[derive(thiserror::Error, Debug)]
pub enum SwatchError {
    /// Malformed scene documents, palettes, configuration, or a missing palette mapping.
    #[error("validation error: {0}")]
    Validation(String),

    /// A single remote query, mutation, upload, or fetch failed or timed out.
    #[error("remote call error: {0}")]
    RemoteCall(String),

    /// Headless rendering of one document failed.
    #[error("render error: {0}")]
    Render(String),

    /// Job id is unknown, or belongs to another shop.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Job state machine rejected a transition.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Durable store failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Errors when serializing or deserializing persisted payloads.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SwatchError {
    /// Build a [`SwatchError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SwatchError::RemoteCall`] value.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteCall(msg.into())
    }

    /// Build a [`SwatchError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SwatchError::JobNotFound`] value.
    pub fn job_not_found(id: impl Into<String>) -> Self {
        Self::JobNotFound(id.into())
    }

    /// Build a [`SwatchError::InvalidTransition`] value.
    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    /// Build a [`SwatchError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`SwatchError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether a pipeline may record this failure against one item and keep going.
    ///
    /// Validation failures abort the whole request; everything that can go wrong with a
    /// single variant (remote calls, rendering, one row of storage) is recoverable.
    pub fn is_item_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RemoteCall(_) | Self::Render(_) | Self::Storage(_) | Self::Other(_)
        )
    }
}

impl From<serde_json::Error> for SwatchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
