/// Convenience result type used across spotdiff.
pub type SpotDiffResult<T> = Result<T, SpotDiffError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum SpotDiffError {
    /// Invalid job description or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while probing, decoding or synthesizing media.
    #[error("media error: {0}")]
    Media(String),

    /// Errors while laying out, compositing or encoding frames.
    #[error("render error: {0}")]
    Render(String),

    /// Errors raised by the publish collaborator.
    #[error("publish error: {0}")]
    Publish(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpotDiffError {
    /// Build a [`SpotDiffError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SpotDiffError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`SpotDiffError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SpotDiffError::Publish`] value.
    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Build a [`SpotDiffError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
