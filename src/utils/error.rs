// src/utils/error.rs

use thiserror::Error;

/// The primary error type for all operations in the drawing diff library.
///
/// Every variant is recoverable: the overlay controller turns them into a
/// message on its state instead of propagating them to the UI layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    /// Pixel data of a surface could not be read (e.g. a tainted canvas).
    #[error("Could not read canvas data")]
    Read(String),

    /// A surface has not been rendered yet (missing, or zero width/height).
    #[error("Canvas not ready: {0}")]
    NotReady(String),

    /// A surface reads as fully transparent at the content probe.
    #[error("Canvas appears empty: {0}")]
    EmptyContent(String),

    /// Occurs when two surfaces that must match in size do not.
    #[error(
        "Dimension mismatch: expected ({}, {}), but got ({}, {})",
        .expected.0, .expected.1, .actual.0, .actual.1
    )]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// An invalid argument was provided to a function.
    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    /// A transform description could not be parsed.
    #[error("Invalid transform: {0}")]
    TransformParse(String),

    /// Something unexpected failed inside the diff pipeline.
    #[error("Diff computation failed: {0}")]
    Internal(String),
}

/// A specialized `Result` type for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;
