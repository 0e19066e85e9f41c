//! # Raster Stream Reader
//!
//! Streaming reader for CUPS raster data. Lines are decoded one at a time
//! into a caller-supplied buffer, so a page is never held in memory.
//!
//! ## Version 2 Line Encoding
//!
//! ```text
//! line  := repeat run+
//! repeat: one byte, the line occurs repeat + 1 times
//! run   := 0..=127   pixel        (n + 1 copies of one pixel)
//!        | 129..=255 pixel*       (257 - n literal pixels)
//!        | 128                    (rest of the line is white)
//! ```
//!
//! A pixel is one byte for 1-bit data in chunked order.

use std::io::{self, Read};

use super::ScanlineSource;
use super::header::{Endian, HEADER_LEN, PageHeader, RasterVersion};
use crate::error::TecError;

/// Largest scanline the reader will allocate for.
const MAX_BYTES_PER_LINE: u32 = 1 << 20;

/// `cupsColorSpace` values whose white level is 0xFF.
const WHITE_IS_ONES: [u32; 6] = [0, 1, 17, 18, 19, 20];

/// CUPS raster stream reader.
///
/// ## Example
///
/// ```
/// use tecraster::raster::{Endian, PageHeader, RasterReader, RasterVersion, ScanlineSource};
///
/// let header = PageHeader {
///     width: 16,
///     height: 1,
///     bits_per_color: 1,
///     bits_per_pixel: 1,
///     bytes_per_line: 2,
///     ..Default::default()
/// };
/// let mut stream = RasterVersion::V3.sync(Endian::Big).to_vec();
/// stream.extend(header.to_bytes(Endian::Big));
/// stream.extend([0xF0, 0x0F]);
///
/// let mut reader = RasterReader::new(stream.as_slice())?;
/// let page = reader.next_page()?.unwrap();
/// assert_eq!(page.width, 16);
///
/// let mut line = [0u8; 2];
/// assert!(reader.read_line(&mut line)?);
/// assert_eq!(line, [0xF0, 0x0F]);
/// assert!(reader.next_page()?.is_none());
/// # Ok::<(), tecraster::TecError>(())
/// ```
#[derive(Debug)]
pub struct RasterReader<R> {
    inner: R,
    version: RasterVersion,
    endian: Endian,
    /// Header of the current page
    page: Option<PageHeader>,
    lines_left: u32,
    /// Last decoded line (compressed streams)
    line: Vec<u8>,
    /// Copies of `line` still to be returned
    repeats: u32,
    pixel_bytes: usize,
    white: u8,
}

impl<R: Read> RasterReader<R> {
    /// Open a stream by reading its sync word.
    pub fn new(mut inner: R) -> Result<Self, TecError> {
        let mut sync = [0u8; 4];
        if read_full(&mut inner, &mut sync)? < sync.len() {
            return Err(TecError::Raster("Stream too short for sync word".into()));
        }
        let (version, endian) = RasterVersion::from_sync(sync).ok_or_else(|| {
            TecError::Raster(format!("Unknown sync word {:02X?}", sync))
        })?;

        log::debug!("Raster stream version {:?}, {:?} endian", version, endian);

        Ok(Self {
            inner,
            version,
            endian,
            page: None,
            lines_left: 0,
            line: Vec::new(),
            repeats: 0,
            pixel_bytes: 1,
            white: 0,
        })
    }

    /// Stream version from the sync word.
    pub fn version(&self) -> RasterVersion {
        self.version
    }

    /// Header of the page being read, if any.
    pub fn page(&self) -> Option<&PageHeader> {
        self.page.as_ref()
    }

    /// Lines of the current page not yet read.
    pub fn lines_left(&self) -> u32 {
        self.lines_left
    }

    fn read_header(&mut self) -> Result<Option<PageHeader>, TecError> {
        let mut buf = [0u8; HEADER_LEN];
        match read_full(&mut self.inner, &mut buf)? {
            0 => return Ok(None),
            HEADER_LEN => {}
            n => {
                return Err(TecError::Raster(format!(
                    "Truncated page header ({} of {} bytes)",
                    n, HEADER_LEN
                )));
            }
        }

        let header = PageHeader::parse(&buf, self.endian);
        // A zero-width page carries no line data and is rejected per page
        if header.bytes_per_line > MAX_BYTES_PER_LINE {
            return Err(TecError::Raster(format!(
                "Bad bytes per line {}",
                header.bytes_per_line
            )));
        }
        Ok(Some(header))
    }

    /// Decode one compressed line into `self.line`. Returns `false` if the
    /// stream ends first.
    fn decode_line(&mut self) -> Result<bool, TecError> {
        let bpl = self.line.len();
        let bpp = self.pixel_bytes;
        let mut pos = 0;

        while pos < bpl {
            let mut code = [0u8; 1];
            if read_full(&mut self.inner, &mut code)? == 0 {
                return Ok(false);
            }
            let code = code[0] as usize;

            if code == 128 {
                self.line[pos..].fill(self.white);
                break;
            }

            let count = if code < 128 {
                (code + 1) * bpp
            } else {
                (257 - code) * bpp
            }
            .min(bpl - pos);
            if count < bpp {
                break;
            }

            if code < 128 {
                if read_full(&mut self.inner, &mut self.line[pos..pos + bpp])? < bpp {
                    return Ok(false);
                }
                let mut filled = bpp;
                while filled < count {
                    let n = bpp.min(count - filled);
                    self.line.copy_within(pos..pos + n, pos + filled);
                    filled += n;
                }
            } else if read_full(&mut self.inner, &mut self.line[pos..pos + count])? < count {
                return Ok(false);
            }
            pos += count;
        }

        Ok(true)
    }
}

impl<R: Read> ScanlineSource for RasterReader<R> {
    fn next_page(&mut self) -> Result<Option<PageHeader>, TecError> {
        if self.line.is_empty() && !self.version.is_compressed() {
            self.lines_left = 0;
        }
        if self.lines_left > 0 {
            log::debug!("Skipping {} unread lines", self.lines_left);
            let mut scratch = vec![0u8; self.line.len()];
            while self.read_line(&mut scratch)? {}
        }

        let Some(header) = self.read_header()? else {
            self.page = None;
            return Ok(None);
        };

        let bits = if header.color_order == 0 {
            header.bits_per_pixel
        } else {
            header.bits_per_color
        };
        self.pixel_bytes = (bits.div_ceil(8) as usize).max(1);
        self.white = if WHITE_IS_ONES.contains(&header.color_space) {
            0xFF
        } else {
            0x00
        };
        self.line = vec![0; header.bytes_per_line as usize];
        self.repeats = 0;
        self.lines_left = header.height;
        self.page = Some(header.clone());

        Ok(Some(header))
    }

    fn read_line(&mut self, line: &mut [u8]) -> Result<bool, TecError> {
        if self.lines_left == 0 {
            return Ok(false);
        }
        if line.len() != self.line.len() {
            return Err(TecError::Raster(format!(
                "Line buffer of {} bytes, page has {}",
                line.len(),
                self.line.len()
            )));
        }

        if !self.version.is_compressed() {
            if read_full(&mut self.inner, line)? < line.len() {
                self.lines_left = 0;
                return Ok(false);
            }
            self.lines_left -= 1;
            return Ok(true);
        }

        if self.repeats == 0 {
            let mut repeat = [0u8; 1];
            if read_full(&mut self.inner, &mut repeat)? == 0 || !self.decode_line()? {
                self.lines_left = 0;
                return Ok(false);
            }
            self.repeats = u32::from(repeat[0]) + 1;
        }

        line.copy_from_slice(&self.line);
        self.repeats -= 1;
        self.lines_left -= 1;
        Ok(true)
    }
}

/// Read until `buf` is full or the stream ends. Returns the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header(width: u32, height: u32) -> PageHeader {
        PageHeader {
            width,
            height,
            bits_per_color: 1,
            bits_per_pixel: 1,
            bytes_per_line: width.div_ceil(8),
            color_space: 3,
            ..Default::default()
        }
    }

    fn stream(version: RasterVersion, endian: Endian, pages: &[(PageHeader, Vec<u8>)]) -> Vec<u8> {
        let mut out = version.sync(endian).to_vec();
        for (header, data) in pages {
            out.extend(header.to_bytes(endian));
            out.extend(data);
        }
        out
    }

    fn read_all(reader: &mut RasterReader<&[u8]>, bpl: usize) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut line = vec![0u8; bpl];
        while reader.read_line(&mut line).unwrap() {
            lines.push(line.clone());
        }
        lines
    }

    #[test]
    fn test_bad_sync() {
        let err = RasterReader::new(&b"%PDF-1.7"[..]).unwrap_err();
        assert!(matches!(err, TecError::Raster(_)));
        assert!(RasterReader::new(&b"Ra"[..]).is_err());
    }

    #[test]
    fn test_empty_stream_has_no_pages() {
        let data = RasterVersion::V3.sync(Endian::Big);
        let mut reader = RasterReader::new(&data[..]).unwrap();
        assert!(reader.next_page().unwrap().is_none());
    }

    #[test]
    fn test_truncated_header() {
        let mut data = stream(RasterVersion::V3, Endian::Big, &[]);
        data.extend(&header(8, 1).to_bytes(Endian::Big)[..100]);
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        assert!(matches!(reader.next_page(), Err(TecError::Raster(_))));
    }

    #[test]
    fn test_zero_width_page_is_passed_through() {
        let data = stream(
            RasterVersion::V3,
            Endian::Big,
            &[(header(0, 3), vec![]), (header(8, 1), vec![0x5A])],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        assert_eq!(reader.next_page().unwrap().unwrap().bytes_per_line, 0);

        let page = reader.next_page().unwrap().unwrap();
        assert_eq!(page.width, 8);
        let mut line = [0u8; 1];
        assert!(reader.read_line(&mut line).unwrap());
        assert_eq!(line, [0x5A]);
    }

    #[test]
    fn test_zero_width_compressed_page_consumes_repeat_bytes() {
        // One repeat byte per line group, no pixel runs
        let data = stream(
            RasterVersion::V2,
            Endian::Big,
            &[(header(0, 2), vec![0x01]), (header(8, 1), vec![0x00, 0x00, 0x5A])],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        reader.next_page().unwrap().unwrap();

        reader.next_page().unwrap().unwrap();
        let mut line = [0u8; 1];
        assert!(reader.read_line(&mut line).unwrap());
        assert_eq!(line, [0x5A]);
    }

    #[test]
    fn test_oversized_bytes_per_line_rejected() {
        let mut bad = header(8, 1);
        bad.bytes_per_line = MAX_BYTES_PER_LINE + 1;
        let data = stream(RasterVersion::V3, Endian::Big, &[(bad, vec![])]);
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        assert!(matches!(reader.next_page(), Err(TecError::Raster(_))));
    }

    #[test]
    fn test_raw_lines_little_endian() {
        let data = stream(
            RasterVersion::V1,
            Endian::Little,
            &[(header(16, 2), vec![0x01, 0x02, 0x03, 0x04])],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        assert_eq!(reader.version(), RasterVersion::V1);
        let page = reader.next_page().unwrap().unwrap();
        assert_eq!(page.height, 2);
        assert_eq!(read_all(&mut reader, 2), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_short_raw_page() {
        let data = stream(
            RasterVersion::V3,
            Endian::Big,
            &[(header(16, 3), vec![0xAA, 0xBB, 0xCC])],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        reader.next_page().unwrap();
        assert_eq!(read_all(&mut reader, 2), vec![vec![0xAA, 0xBB]]);
        assert_eq!(reader.lines_left(), 0);
        assert!(reader.next_page().unwrap().is_none());
    }

    #[test]
    fn test_unread_lines_are_skipped() {
        let data = stream(
            RasterVersion::V3,
            Endian::Big,
            &[
                (header(8, 3), vec![1, 2, 3]),
                (header(8, 1), vec![9]),
            ],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        reader.next_page().unwrap();
        let mut line = [0u8; 1];
        assert!(reader.read_line(&mut line).unwrap());
        assert_eq!(line, [1]);

        reader.next_page().unwrap().unwrap();
        assert_eq!(read_all(&mut reader, 1), vec![vec![9]]);
    }

    #[test]
    fn test_compressed_runs_and_literals() {
        // 4 bytes per line: run of 3 x 0xFF, then 1 literal 0x0F
        let data = stream(
            RasterVersion::V2,
            Endian::Big,
            &[(header(32, 1), vec![0x00, 0x02, 0xFF, 0xFF, 0x0F])],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        reader.next_page().unwrap();
        assert_eq!(read_all(&mut reader, 4), vec![vec![0xFF, 0xFF, 0xFF, 0x0F]]);
    }

    #[test]
    fn test_compressed_line_repeat() {
        // One line, repeated: 2 + 1 = 3 lines
        let data = stream(
            RasterVersion::V2,
            Endian::Big,
            &[(header(16, 4), vec![0x02, 0xFE, 0x12, 0x34, 0x00, 0x01, 0x00])],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        reader.next_page().unwrap();
        assert_eq!(
            read_all(&mut reader, 2),
            vec![
                vec![0x12, 0x34],
                vec![0x12, 0x34],
                vec![0x12, 0x34],
                vec![0x00, 0x00],
            ]
        );
    }

    #[test]
    fn test_compressed_fill_uses_color_space_white() {
        let mut white = header(32, 1);
        white.color_space = 0;
        let black = header(32, 1);
        let payload = vec![0x00, 0x00, 0x80, 0x80];

        for (page, expected) in [(white, 0xFF), (black, 0x00)] {
            let data = stream(RasterVersion::V2, Endian::Big, &[(page, payload.clone())]);
            let mut reader = RasterReader::new(data.as_slice()).unwrap();
            reader.next_page().unwrap();
            assert_eq!(
                read_all(&mut reader, 4),
                vec![vec![0x80, expected, expected, expected]]
            );
        }
    }

    #[test]
    fn test_compressed_run_clamped_to_line() {
        // Run of 128 pixels on a 2-byte line
        let data = stream(
            RasterVersion::V2,
            Endian::Big,
            &[(header(16, 1), vec![0x00, 0x7F, 0x55])],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        reader.next_page().unwrap();
        assert_eq!(read_all(&mut reader, 2), vec![vec![0x55, 0x55]]);
    }

    #[test]
    fn test_compressed_stream_ends_mid_line() {
        let data = stream(
            RasterVersion::V2,
            Endian::Big,
            &[(header(32, 2), vec![0x00, 0x01, 0xAA])],
        );
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        reader.next_page().unwrap();
        assert!(read_all(&mut reader, 4).is_empty());
    }

    #[test]
    fn test_wrong_buffer_length() {
        let data = stream(RasterVersion::V3, Endian::Big, &[(header(16, 1), vec![0, 0])]);
        let mut reader = RasterReader::new(data.as_slice()).unwrap();
        reader.next_page().unwrap();
        let mut line = [0u8; 3];
        assert!(reader.read_line(&mut line).is_err());
    }
}
