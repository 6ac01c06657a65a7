/// Convenience result type used across fastbitmap.
pub type FastBitmapResult<T> = Result<T, FastBitmapError>;

/// Error taxonomy for bitmap locking and pixel access.
#[derive(thiserror::Error, Debug)]
pub enum FastBitmapError {
    /// An operation needs a bound or mapped bitmap and none is available.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Rejected geometry or a pixel buffer of the wrong length.
    #[error("validation error: {0}")]
    Validation(String),

    /// A checked accessor or copy reached outside the bitmap.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// Wrapped lower-level error from a pixel source implementation.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FastBitmapError {
    /// Build a [`FastBitmapError::InvalidState`] value.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Build a [`FastBitmapError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FastBitmapError::OutOfBounds`] value.
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
