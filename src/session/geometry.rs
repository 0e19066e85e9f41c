//! # Page Geometry
//!
//! Scanline dimensions of a page and the label size sent to the printer.
//!
//! Label sizes are in 0.1 mm. The raster header gives the page in points
//! (1/72 inch), so `mm10 = points * 254 / 72`.
//!
//! ```text
//!  ┌──────────── width ────────────┐
//!  │                               │ ▲
//!  │            label              │ │ length
//!  │                               │ ▼
//!  └───────────────────────────────┘ ▲
//!                                    │ gap       pitch = length + gap
//!  ┌───────────────────────────────┐ ▼
//! ```

use crate::error::TecError;
use crate::printer::GraphicsMode;
use crate::protocol::framer::MAX_FRAME_PAYLOAD;
use crate::protocol::topix;
use crate::raster::PageHeader;

/// Scanline dimensions of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    /// Width in pixels
    pub width: u32,
    /// Height in scanlines
    pub height: u32,
    /// Bytes per scanline, `ceil(width / 8)`
    pub bytes_per_line: usize,
}

impl PageGeometry {
    /// Validate a page header for printing in `mode`.
    ///
    /// ## Example
    ///
    /// ```
    /// use tecraster::printer::GraphicsMode;
    /// use tecraster::raster::PageHeader;
    /// use tecraster::session::PageGeometry;
    ///
    /// let header = PageHeader {
    ///     width: 100,
    ///     height: 50,
    ///     bits_per_color: 1,
    ///     bits_per_pixel: 1,
    ///     bytes_per_line: 13,
    ///     ..Default::default()
    /// };
    /// let geometry = PageGeometry::from_header(&header, GraphicsMode::Topix)?;
    /// assert_eq!(geometry.bytes_per_line, 13);
    /// assert_eq!(geometry.width_dots(), 104);
    /// # Ok::<(), tecraster::TecError>(())
    /// ```
    pub fn from_header(header: &PageHeader, mode: GraphicsMode) -> Result<Self, TecError> {
        if header.width == 0 || header.height == 0 {
            return Err(TecError::Geometry(format!(
                "Empty page {}x{}",
                header.width, header.height
            )));
        }
        if header.bits_per_pixel != 1 || header.bits_per_color != 1 {
            return Err(TecError::Geometry(format!(
                "{} bits per pixel, only 1-bit pages can be printed",
                header.bits_per_pixel
            )));
        }

        let bytes_per_line = header.width.div_ceil(8) as usize;
        if header.bytes_per_line as usize != bytes_per_line {
            return Err(TecError::Geometry(format!(
                "{} bytes per line for a {} pixel wide page",
                header.bytes_per_line, header.width
            )));
        }

        if mode.is_delta() && topix::worst_case_line_bytes(bytes_per_line) > MAX_FRAME_PAYLOAD {
            return Err(TecError::Geometry(format!(
                "{} bytes per line cannot fit in a TOPIX frame",
                bytes_per_line
            )));
        }

        Ok(Self {
            width: header.width,
            height: header.height,
            bytes_per_line,
        })
    }

    /// Width of the graphics area in dots (whole bytes).
    pub fn width_dots(&self) -> u32 {
        (self.bytes_per_line * 8) as u32
    }

    /// Total bytes of raw graphics data for the page.
    pub fn raw_len(&self) -> usize {
        self.bytes_per_line * self.height as usize
    }
}

/// Label dimensions for the `D` command, in 0.1 mm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSize {
    /// Distance from one label start to the next
    pub pitch: u32,
    pub width: u32,
    pub length: u32,
    /// Backing paper width
    pub backing_width: u32,
}

impl LabelSize {
    /// Label size of a page with `gap_mm` between labels.
    ///
    /// ## Example
    ///
    /// ```
    /// use tecraster::raster::PageHeader;
    /// use tecraster::session::LabelSize;
    ///
    /// // 4 x 2 inch label, 3 mm gap
    /// let header = PageHeader { cups_page_size: [288.0, 144.0], ..Default::default() };
    /// let size = LabelSize::from_header(&header, 3);
    /// assert_eq!((size.width, size.length), (1016, 508));
    /// assert_eq!((size.pitch, size.backing_width), (538, 1046));
    /// ```
    pub fn from_header(header: &PageHeader, gap_mm: u32) -> Self {
        let [width_pt, length_pt] = header.page_size_points();
        let gap = gap_mm.saturating_mul(10);
        let length = points_to_mm10(length_pt);
        let width = points_to_mm10(width_pt);

        Self {
            pitch: length.saturating_add(gap),
            width,
            length,
            backing_width: width.saturating_add(gap),
        }
    }
}

fn points_to_mm10(points: f32) -> u32 {
    (points * 254.0 / 72.0) as u32
}
