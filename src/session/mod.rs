//! # Page Session
//!
//! State machine that turns a page of scanlines into TPCL commands.
//!
//! ## States
//!
//! ```text
//!            begin_page            end_page
//!   Idle ───────────────► Active ───────────► Idle
//!                           │                  ▲
//!                cancel     │                  │ end_page
//!                observed   ▼                  │
//!                        Canceling ────────────┘
//! ```
//!
//! ## Output Per Page
//!
//! | Step | Raw modes (AND / OR) | TOPIX |
//! |------|----------------------|-------|
//! | begin | `{D..|}` `{AY..|}` `{C|}` `{SG;0000,0000,wwww,hhhh,t,` | `{D..|}` `{AY..|}` `{C|}` |
//! | line | scanline bytes (or packed hex) | appended to the frame buffer |
//! | end | `|}` | last frame |
//! | trailer | `{XS;I,..|}` [`{IB|}`] | same |
//! | canceled | `{WR|}` instead of the trailer | same |
//!
//! ## Module Structure
//!
//! - [`cancel`]: Shared cancellation flag and `SIGTERM` hook
//! - [`geometry`]: Page dimensions and label size
//! - [`trailer`]: Page setup and issue commands

pub mod cancel;
pub mod geometry;
pub mod trailer;

pub use cancel::CancelToken;
pub use geometry::{LabelSize, PageGeometry};
pub use trailer::PageTrailer;

use std::io::Write;
use std::mem;

use crate::error::TecError;
use crate::printer::{GraphicsMode, LabelConfig};
use crate::protocol::framer::ChunkFramer;
use crate::protocol::topix::{self, TopixEncoder};
use crate::protocol::{commands, run_length};
use crate::raster::PageHeader;

/// How a page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Every line was encoded
    Completed,
    /// The source ran out of lines; the page was finished anyway
    ShortRead { expected: u32, received: u32 },
    /// Cancellation was observed; the printer's RAM was cleared
    Canceled { received: u32 },
}

/// Line path of the current page.
#[derive(Debug)]
enum LineEncoder {
    /// Lines go straight to the sink inside one `SG` block
    Raw { hex: bool },
    /// Lines are diffed and buffered into TOPIX frames
    Topix {
        encoder: TopixEncoder,
        framer: ChunkFramer,
    },
}

#[derive(Debug)]
struct Page {
    geometry: PageGeometry,
    encoder: LineEncoder,
    trailer: PageTrailer,
    received: u32,
}

#[derive(Debug)]
enum State {
    Idle,
    Active(Page),
    Canceling(Page),
}

/// Encodes pages into a TPCL byte sink.
///
/// ## Example
///
/// ```
/// use tecraster::printer::LabelConfig;
/// use tecraster::raster::PageHeader;
/// use tecraster::session::{CancelToken, PageOutcome, PageSession};
///
/// let header = PageHeader {
///     width: 64,
///     height: 2,
///     bits_per_color: 1,
///     bits_per_pixel: 1,
///     bytes_per_line: 8,
///     num_copies: 1,
///     ..Default::default()
/// };
///
/// let mut session = PageSession::new(Vec::new(), LabelConfig::default(), CancelToken::new());
/// session.begin_page(&header)?;
/// session.encode_line(&[0xFF; 8], 0)?;
/// session.encode_line(&[0xFF; 8], 1)?;
/// assert_eq!(session.end_page()?, PageOutcome::Completed);
///
/// let output = session.into_inner();
/// assert!(output.ends_with(b"{XS;I,0001,0000C3000|}\n"));
/// # Ok::<(), tecraster::TecError>(())
/// ```
#[derive(Debug)]
pub struct PageSession<W: Write> {
    sink: W,
    config: LabelConfig,
    cancel: CancelToken,
    state: State,
    pages: u32,
}

impl<W: Write> PageSession<W> {
    pub fn new(sink: W, config: LabelConfig, cancel: CancelToken) -> Self {
        Self {
            sink,
            config,
            cancel,
            state: State::Idle,
            pages: 0,
        }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// A handle that cancels this session from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation. Only sets the flag; the page loop reacts at the
    /// next line.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether a page is open.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Pages finished so far, canceled ones included.
    pub fn pages_finished(&self) -> u32 {
        self.pages
    }

    /// Geometry of the open page, if any.
    pub fn geometry(&self) -> Option<&PageGeometry> {
        match &self.state {
            State::Idle => None,
            State::Active(page) | State::Canceling(page) => Some(&page.geometry),
        }
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Open a page and send its setup commands.
    ///
    /// A page that cannot be printed fails with [`TecError::Geometry`]
    /// before anything is written, and the session stays idle.
    pub fn begin_page(&mut self, header: &PageHeader) -> Result<PageGeometry, TecError> {
        if self.is_active() {
            return Err(TecError::Session("Page already started".into()));
        }

        let mode = self.config.graphics_mode;
        let geometry = PageGeometry::from_header(header, mode)?;

        log::debug!(
            "Page {}: {}x{} dots, {} bytes/line, {:?} mode",
            self.pages + 1,
            geometry.width,
            geometry.height,
            geometry.bytes_per_line,
            mode
        );
        log::debug!(
            "MediaType = {:?}, CutMedia = {}, NumCopies = {}, cupsCompression = {}, cupsRowStep = {}",
            header.media_type,
            header.cut_media,
            header.num_copies,
            header.compression,
            header.row_step
        );

        self.sink.write_all(&trailer::page_setup(header, &self.config))?;

        let encoder = match mode {
            GraphicsMode::Topix => {
                if geometry.bytes_per_line > topix::MAX_LINE_BYTES {
                    log::warn!(
                        "Lines of {} bytes are wider than TOPIX supports, bytes past {} are not printed",
                        geometry.bytes_per_line,
                        topix::MAX_LINE_BYTES
                    );
                }
                LineEncoder::Topix {
                    encoder: TopixEncoder::new(geometry.bytes_per_line),
                    framer: ChunkFramer::new(geometry.width_dots()),
                }
            }
            GraphicsMode::And | GraphicsMode::Or => {
                self.sink.write_all(&commands::graphics_header(
                    0,
                    0,
                    geometry.width_dots(),
                    geometry.height,
                    mode.tag(),
                ))?;
                LineEncoder::Raw {
                    hex: self.config.hex_compression,
                }
            }
        };

        self.state = State::Active(Page {
            geometry,
            encoder,
            trailer: PageTrailer::new(header, &self.config),
            received: 0,
        });

        Ok(geometry)
    }

    /// Check for cancellation before reading the next scanline.
    ///
    /// An active page switches to canceling once the flag is set; lines
    /// passed to [`encode_line`](Self::encode_line) after that are ignored.
    /// Returns whether the open page is canceling.
    pub fn poll_cancel(&mut self) -> bool {
        if let State::Active(_) = self.state {
            if !self.cancel.is_canceled() {
                return false;
            }
            if let State::Active(page) = mem::replace(&mut self.state, State::Idle) {
                log::debug!("Canceling page after {} lines", page.received);
                self.state = State::Canceling(page);
            }
        }
        matches!(self.state, State::Canceling(_))
    }

    /// Encode scanline `line_index` of the open page.
    ///
    /// A line handed over is always encoded; cancellation takes effect at
    /// the next [`poll_cancel`](Self::poll_cancel).
    pub fn encode_line(&mut self, line: &[u8], line_index: u32) -> Result<(), TecError> {
        let page = match &mut self.state {
            State::Idle => return Err(TecError::Session("No page started".into())),
            State::Canceling(_) => return Ok(()),
            State::Active(page) => page,
        };

        if line.len() != page.geometry.bytes_per_line {
            return Err(TecError::Session(format!(
                "Line of {} bytes, page has {}",
                line.len(),
                page.geometry.bytes_per_line
            )));
        }
        if line_index >= page.geometry.height {
            return Err(TecError::Session(format!(
                "Line {} past page height {}",
                line_index, page.geometry.height
            )));
        }

        match &mut page.encoder {
            LineEncoder::Raw { hex: false } => self.sink.write_all(line)?,
            LineEncoder::Raw { hex: true } => {
                let mut packed = Vec::with_capacity(line.len() * 2);
                run_length::encode_hex_line(line, &mut packed);
                self.sink.write_all(&packed)?;
            }
            LineEncoder::Topix { encoder, framer } => {
                if framer.needs_flush(topix::worst_case_line_bytes(encoder.bytes_per_line())) {
                    framer.flush(&mut self.sink, line_index)?;
                    encoder.reset();
                }
                encoder.encode_line(line, framer.buffer_mut());
            }
        }
        page.received += 1;

        Ok(())
    }

    /// Close the open page: finish the graphics, then send the trailer, or
    /// clear the printer's RAM if the page was canceled.
    pub fn end_page(&mut self) -> Result<PageOutcome, TecError> {
        let (mut page, canceled) = match mem::replace(&mut self.state, State::Idle) {
            State::Idle => return Err(TecError::Session("No page started".into())),
            State::Active(page) => {
                let canceled = self.cancel.is_canceled();
                (page, canceled)
            }
            State::Canceling(page) => (page, true),
        };
        self.pages += 1;

        let expected = page.geometry.height;
        match &mut page.encoder {
            LineEncoder::Topix { framer, .. } => {
                framer.flush(&mut self.sink, 0)?;
                log::debug!("Page sent in {} TOPIX frames", framer.frames_written());
            }
            LineEncoder::Raw { hex } => {
                if !canceled && page.received < expected {
                    let blank = vec![0u8; page.geometry.bytes_per_line];
                    let mut packed = Vec::new();
                    if *hex {
                        run_length::encode_hex_line(&blank, &mut packed);
                    }
                    let filler = if *hex { &packed } else { &blank };
                    for _ in page.received..expected {
                        self.sink.write_all(filler)?;
                    }
                }
                self.sink.write_all(&commands::graphics_end())?;
            }
        }

        if canceled {
            self.sink.write_all(&commands::ram_clear())?;
        } else {
            self.sink.write_all(&page.trailer.to_bytes())?;
        }
        self.sink.flush()?;

        let received = page.received;
        Ok(if canceled {
            PageOutcome::Canceled { received }
        } else if received < expected {
            PageOutcome::ShortRead { expected, received }
        } else {
            PageOutcome::Completed
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
