/// Convenience result type used across drillboard.
pub type DrillResult<T> = Result<T, DrillError>;

/// Top-level error taxonomy used by document, layout and playback APIs.
#[derive(thiserror::Error, Debug)]
pub enum DrillError {
    /// Invalid caller input or malformed document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An entity, event or note id that does not exist in the document.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Errors while computing a scene for a query time.
    #[error("playback error: {0}")]
    Playback(String),

    /// Errors when serializing or deserializing documents or configs.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrillError {
    /// Build a [`DrillError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DrillError::Lookup`] value.
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Build a [`DrillError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`DrillError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
