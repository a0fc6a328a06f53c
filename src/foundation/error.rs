use std::path::{Path, PathBuf};

/// Convenience result type used across loopmorph.
pub type MorphResult<T> = Result<T, MorphError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Each variant maps to the scope at which the failure is contained: decode errors skip one
/// image, flow errors degrade one transition, insufficient-image and encode errors abort one
/// group. Nothing here is fatal to a whole batch.
#[derive(thiserror::Error, Debug)]
pub enum MorphError {
    /// Invalid user-provided configuration or mismatched inputs.
    #[error("validation error: {0}")]
    Validation(String),

    /// A source image was missing or could not be decoded.
    #[error("decode error: '{}': {reason}", path.display())]
    Decode {
        /// Path of the offending source image.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Both the primary and the fallback flow algorithm failed for a frame pair.
    #[error("flow error: {0}")]
    Flow(String),

    /// A group had fewer than two usable images.
    #[error("insufficient images in group '{group}': need at least 2, got {usable}")]
    InsufficientImages {
        /// Group label.
        group: String,
        /// Number of images that survived decoding.
        usable: usize,
    },

    /// The encoder could not be started, fed, or exited unsuccessfully.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MorphError {
    /// Build a [`MorphError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MorphError::Decode`] value.
    pub fn decode(path: &Path, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Build a [`MorphError::Flow`] value.
    pub fn flow(msg: impl Into<String>) -> Self {
        Self::Flow(msg.into())
    }

    /// Build a [`MorphError::InsufficientImages`] value.
    pub fn insufficient_images(group: impl Into<String>, usable: usize) -> Self {
        Self::InsufficientImages {
            group: group.into(),
            usable,
        }
    }

    /// Build a [`MorphError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`MorphError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
