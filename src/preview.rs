//! # Page Preview
//!
//! Collects the scanlines of a page as they are printed and renders them as a
//! grayscale image, so a job can be checked without wasting labels.
//!
//! Set bits are black, clear bits white. Lines the source never delivered
//! stay white.

use std::path::Path;

use image::{GrayImage, ImageEncoder, Luma};

use crate::error::TecError;
use crate::session::PageGeometry;

/// Accumulates one page of 1-bit scanlines.
#[derive(Debug, Clone)]
pub struct PagePreview {
    width: u32,
    height: u32,
    bytes_per_line: usize,
    data: Vec<u8>,
}

impl PagePreview {
    pub fn new(geometry: &PageGeometry) -> Self {
        Self {
            width: geometry.width,
            height: geometry.height,
            bytes_per_line: geometry.bytes_per_line,
            data: Vec::with_capacity(geometry.raw_len()),
        }
    }

    /// Append the next scanline. Lines past the page height are ignored.
    pub fn push_line(&mut self, line: &[u8]) {
        if self.lines() < self.height as usize {
            let mut row = line.to_vec();
            row.resize(self.bytes_per_line, 0);
            self.data.extend_from_slice(&row);
        }
    }

    /// Number of scanlines collected.
    pub fn lines(&self) -> usize {
        self.data.len() / self.bytes_per_line.max(1)
    }

    /// Render the page.
    ///
    /// ## Example
    ///
    /// ```
    /// use tecraster::preview::PagePreview;
    /// use tecraster::session::PageGeometry;
    ///
    /// let geometry = PageGeometry { width: 8, height: 2, bytes_per_line: 1 };
    /// let mut preview = PagePreview::new(&geometry);
    /// preview.push_line(&[0x80]);
    ///
    /// let img = preview.to_image();
    /// assert_eq!(img.get_pixel(0, 0)[0], 0);
    /// assert_eq!(img.get_pixel(1, 0)[0], 255);
    /// assert_eq!(img.get_pixel(0, 1)[0], 255);
    /// ```
    pub fn to_image(&self) -> GrayImage {
        let mut img = GrayImage::from_pixel(self.width, self.height, Luma([255u8]));

        for (y, row) in self.data.chunks(self.bytes_per_line.max(1)).enumerate() {
            for x in 0..self.width as usize {
                let bit = 7 - (x % 8);
                if (row[x / 8] >> bit) & 1 == 1 {
                    img.put_pixel(x as u32, y as u32, Luma([0u8]));
                }
            }
        }

        img
    }

    /// Encode the page as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, TecError> {
        let img = self.to_image();
        let mut png_bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_bytes)
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::L8,
            )
            .map_err(|e| TecError::Image(format!("Failed to encode PNG: {}", e)))?;
        Ok(png_bytes)
    }

    /// Save the page as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), TecError> {
        self.to_image()
            .save(path)
            .map_err(|e| TecError::Image(format!("Failed to save {}: {}", path.display(), e)))?;
        log::debug!("Preview written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(width: u32, height: u32) -> PageGeometry {
        PageGeometry {
            width,
            height,
            bytes_per_line: width.div_ceil(8) as usize,
        }
    }

    #[test]
    fn test_bits_map_to_pixels() {
        let mut preview = PagePreview::new(&geometry(10, 1));
        preview.push_line(&[0b1010_0000, 0b0100_0000]);
        let img = preview.to_image();

        let row: Vec<u8> = (0..10).map(|x| img.get_pixel(x, 0)[0]).collect();
        assert_eq!(row, vec![0, 255, 0, 255, 255, 255, 255, 255, 255, 0]);
    }

    #[test]
    fn test_extra_lines_ignored() {
        let mut preview = PagePreview::new(&geometry(8, 2));
        for _ in 0..5 {
            preview.push_line(&[0xFF]);
        }
        assert_eq!(preview.lines(), 2);
        assert_eq!(preview.to_image().dimensions(), (8, 2));
    }

    #[test]
    fn test_png_signature() {
        let mut preview = PagePreview::new(&geometry(16, 4));
        preview.push_line(&[0xF0, 0x0F]);
        let png = preview.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_save_png() {
        let dir = std::env::temp_dir().join(format!("tecraster-preview-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("page-1.png");

        let mut preview = PagePreview::new(&geometry(8, 1));
        preview.push_line(&[0xAA]);
        preview.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded.get_pixel(0, 0)[0], 0);
        assert_eq!(loaded.get_pixel(1, 0)[0], 255);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
