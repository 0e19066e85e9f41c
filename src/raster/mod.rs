//! # CUPS Raster Input
//!
//! The filter reads pages from a CUPS raster stream: a 4-byte sync word,
//! then for every page a fixed-size page header followed by the pixel data.
//!
//! ## Stream Versions
//!
//! | Sync (BE / LE) | Version | Pixel data |
//! |----------------|---------|------------|
//! | `RaSt` / `tSaR` | 1 | Uncompressed |
//! | `RaS2` / `2SaR` | 2 | Run-length compressed |
//! | `RaS3` / `3SaR` | 3 | Uncompressed |
//!
//! A reversed sync word means the header integers are little-endian.
//!
//! ## Module Structure
//!
//! - [`header`]: Page header layout and parsing
//! - [`reader`]: Streaming reader implementing [`ScanlineSource`]

pub mod header;
pub mod reader;

pub use header::{Endian, HEADER_LEN, PageHeader, RasterVersion};
pub use reader::RasterReader;

use crate::error::TecError;

/// A source of pages and their scanlines.
///
/// This is the seam between the job driver and wherever pixels come from:
/// a CUPS raster stream in production, an in-memory page list in tests.
pub trait ScanlineSource {
    /// Advance to the next page and return its header.
    ///
    /// Lines of the previous page that were never read are skipped.
    /// Returns `None` at the end of the stream.
    fn next_page(&mut self) -> Result<Option<PageHeader>, TecError>;

    /// Read the next scanline of the current page into `line`.
    ///
    /// Returns `false` when the page has no more lines (including a stream
    /// that ends early).
    fn read_line(&mut self, line: &mut [u8]) -> Result<bool, TecError>;
}
