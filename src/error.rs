use thiserror::Error;

/// Everything an editing operation can report back to the UI.
///
/// None of these are fatal: a failed operation leaves the session exactly
/// as it was before the call.
#[derive(Debug, Error)]
pub enum EditError {
    /// No image has been loaded onto the surface yet
    #[error("load an image first")]
    NoSurface,

    #[error("select an image file first")]
    NoFileSelected,

    /// The drag selection is missing or narrower than one pixel
    #[error("drag a valid area first")]
    InvalidSelection,

    #[error("invalid size: {0}")]
    InvalidDimensions(String),

    /// A decode is still in flight
    #[error("still loading the previous image")]
    Busy,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// The decode task went away without producing a result
    #[error("image decode was abandoned")]
    DecodeAbandoned,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditError {
    /// Benign no-ops that the UI reports softly instead of as warnings
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }
}

/// Result type for session operations
pub type EditResult<T = ()> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_errors() {
        assert!(EditError::NothingToUndo.is_soft());
        assert!(EditError::NothingToRedo.is_soft());
        assert!(!EditError::InvalidSelection.is_soft());
        assert!(!EditError::Busy.is_soft());
    }

    #[test]
    fn test_messages() {
        assert_eq!(EditError::NoSurface.to_string(), "load an image first");
        assert_eq!(
            EditError::InvalidDimensions("abc".to_owned()).to_string(),
            "invalid size: abc"
        );
    }
}
