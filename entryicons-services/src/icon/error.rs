//! Error types for the icon system.

/// Errors that can occur while serving entry icons and badges.
#[derive(Debug, thiserror::Error)]
pub enum IconError {
    /// Icon index outside the enumerated icon list.
    #[error("Invalid icon index {index} (have {count} icons)")]
    InvalidIconIndex {
        /// Requested index.
        index: usize,
        /// Number of available icons.
        count: usize,
    },

    /// Badge index outside the enumerated badge list.
    #[error("Invalid badge index {index} (have {count} badges)")]
    InvalidBadgeIndex {
        /// Requested index.
        index: usize,
        /// Number of available badges.
        count: usize,
    },

    /// Resource file not present in its namespace.
    #[error("Resource '{0}' not found")]
    ResourceNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The resource bytes could not be decoded as an image.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Invalid image format.
    #[error("Invalid image format: {0}")]
    InvalidFormat(String),
}
