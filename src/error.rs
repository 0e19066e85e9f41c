//! # Error Types
//!
//! This module defines error types used throughout the tecraster library.
//!
//! Short reads and cancellation are not errors: they finish the page in a
//! degraded but well-defined way and are reported through
//! [`PageOutcome`](crate::session::PageOutcome).

use thiserror::Error;

/// Main error type for tecraster operations
#[derive(Debug, Error)]
pub enum TecError {
    /// Page dimensions cannot be printed (zero size, wrong depth, ...).
    /// Fatal to the page, not to the job.
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// A configuration option has a value the filter cannot use
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Malformed or truncated raster stream
    #[error("Raster error: {0}")]
    Raster(String),

    /// Page session used out of order (e.g. a line outside a page)
    #[error("Session error: {0}")]
    Session(String),

    /// Preview image error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TecError {
    /// Whether the job can continue with the next page after this error.
    pub fn is_page_local(&self) -> bool {
        matches!(self, Self::Geometry(_))
    }
}
