//! # TOPIX Frame Buffering
//!
//! TOPIX data is sent as one or more `SG` commands ("frames"). Each frame
//! carries a 16-bit big-endian byte count, so a frame holds at most 65 535
//! bytes of compressed lines.
//!
//! ## Frame Layout
//!
//! ```text
//! {SG;0000,yyyy,wwww,0300,3,  LL LL  d1 ... dL  |}\n
//! └──────── header ────────┘  └len┘  └ data ┘   └end┘
//! ```
//!
//! - `yyyy`: first line of the frame (0 for the first frame of a page)
//! - `wwww`: line width in dots
//! - `LL LL`: payload length, big-endian
//!
//! ## Overflow Avoidance
//!
//! The framer never truncates. Before a line is encoded the caller asks
//! [`ChunkFramer::needs_flush`] with the line's worst-case size
//! ([`topix::worst_case_line_bytes`](super::topix::worst_case_line_bytes))
//! and flushes first if the line might not fit.

use std::io::{self, Write};

use super::commands::{self, CLOSE, LF};
use super::topix::MODE_TAG;

/// Largest payload one frame can carry (16-bit length field).
pub const MAX_FRAME_PAYLOAD: usize = 0xFFFF;

/// Height field of every TOPIX frame header, in dots.
pub const FRAME_HEIGHT: u32 = 300;

/// Accumulates encoded lines and writes them out as length-prefixed frames.
#[derive(Debug)]
pub struct ChunkFramer {
    buf: Vec<u8>,
    width_dots: u32,
    start_line: u32,
    frames: usize,
}

impl ChunkFramer {
    /// Create a framer for lines `width_dots` wide.
    pub fn new(width_dots: u32) -> Self {
        Self {
            buf: Vec::with_capacity(MAX_FRAME_PAYLOAD),
            width_dots,
            start_line: 0,
            frames: 0,
        }
    }

    /// Bytes waiting for the next frame.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing is waiting for the next frame.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Line index the next frame header will carry.
    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> usize {
        self.frames
    }

    /// Whether `growth` more bytes could push the payload past
    /// [`MAX_FRAME_PAYLOAD`].
    #[inline]
    pub fn needs_flush(&self, growth: usize) -> bool {
        self.buf.len() + growth > MAX_FRAME_PAYLOAD
    }

    /// The accumulation buffer. Callers must check
    /// [`needs_flush`](Self::needs_flush) before appending.
    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    /// Write the buffered bytes as one frame.
    ///
    /// An empty buffer writes nothing. Otherwise the buffer is cleared and,
    /// unless `line_index` is 0 (end of page), `line_index` becomes the
    /// start line of the next frame.
    ///
    /// Returns the payload length of the frame written, if any.
    ///
    /// ## Example
    ///
    /// ```
    /// use tecraster::protocol::framer::ChunkFramer;
    ///
    /// let mut framer = ChunkFramer::new(64);
    /// framer.buffer_mut().extend_from_slice(&[0x00, 0x00]);
    ///
    /// let mut out = Vec::new();
    /// assert_eq!(framer.flush(&mut out, 0).unwrap(), Some(2));
    ///
    /// let mut expected = b"{SG;0000,0000,0064,0300,3,".to_vec();
    /// expected.extend_from_slice(&[0x00, 0x02, 0x00, 0x00]);
    /// expected.extend_from_slice(b"|}\n");
    /// assert_eq!(out, expected);
    /// ```
    pub fn flush<W: Write>(&mut self, out: &mut W, line_index: u32) -> io::Result<Option<usize>> {
        let len = self.buf.len();
        if len == 0 {
            return Ok(None);
        }
        let Ok(len16) = u16::try_from(len) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("TOPIX frame of {} bytes exceeds {}", len, MAX_FRAME_PAYLOAD),
            ));
        };

        log::debug!(
            "Sending TOPIX frame: line {}, length {:04x}",
            self.start_line,
            len16
        );

        out.write_all(&commands::graphics_header(
            0,
            self.start_line,
            self.width_dots,
            FRAME_HEIGHT,
            MODE_TAG,
        ))?;
        out.write_all(&len16.to_be_bytes())?;
        out.write_all(&self.buf)?;
        out.write_all(CLOSE)?;
        out.write_all(&[LF])?;
        out.flush()?;

        if line_index != 0 {
            self.start_line = line_index;
        }
        self.buf.clear();
        self.frames += 1;

        Ok(Some(len))
    }
}

// ============================================================================
// TESTS
// ============================================================================
