/// Convenience result type used across avatar-kit.
pub type AvatarResult<T> = Result<T, AvatarError>;

/// Top-level error taxonomy used by library APIs.
///
/// Remote image fetch failures never surface here; they are absorbed by the loader state machine.
#[derive(thiserror::Error, Debug)]
pub enum AvatarError {
    /// Invalid user-provided data (group descriptions, image buffers, settings).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors reading or decoding bundled imagery.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while rasterizing a scene.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AvatarError {
    /// Build a [`AvatarError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`AvatarError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`AvatarError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`AvatarError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
