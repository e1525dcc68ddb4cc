//! Error types for editor and session operations.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors surfaced by the annotation editor and session.
#[derive(Error, Debug)]
pub enum EditorError {
    /// An operation that needs an image ran without one
    #[error("Please load an image first")]
    NoImageLoaded,

    /// Save was requested with both point sets empty
    #[error("Please load an image and mark the subject or draw a composition")]
    NothingMarked,

    /// Save was requested but the image has no content hash
    #[error("The image hash could not be determined")]
    MissingHash,

    /// The server answered but returned an empty image
    #[error("The loaded image is empty")]
    EmptyImage,

    /// A request to the annotation server failed
    #[error("{context}: {source}")]
    Backend {
        /// What the editor was doing
        context: &'static str,
        #[source]
        source: BackendError,
    },

    /// Image bytes could not be decoded into a bitmap
    #[error("The image could not be displayed: {0}")]
    Decode(#[from] image::ImageError),

    /// A newer image load started while this one was in flight
    #[error("Superseded by a newer image load")]
    StaleLoad,
}

impl EditorError {
    /// Wrap a backend error with what the editor was doing.
    pub fn backend(context: &'static str, source: BackendError) -> Self {
        Self::Backend { context, source }
    }

    /// Check if this error was caused by user input rather than the system.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            EditorError::NoImageLoaded | EditorError::NothingMarked | EditorError::MissingHash
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input_classification() {
        assert!(EditorError::NothingMarked.is_user_input());
        assert!(EditorError::MissingHash.is_user_input());
        assert!(!EditorError::StaleLoad.is_user_input());
        assert!(
            !EditorError::backend("Saving failed", BackendError::Status {
                status: 500,
                message: None,
            })
            .is_user_input()
        );
    }

    #[test]
    fn test_backend_message() {
        let err = EditorError::backend(
            "Upload failed",
            BackendError::Status {
                status: 400,
                message: Some("No file uploaded".to_string()),
            },
        );
        assert_eq!(err.to_string(), "Upload failed: No file uploaded (HTTP 400)");
    }
}
