//! # TPCL Protocol Commands
//!
//! This module implements the TPCL (TEC Printer Command Language) commands
//! used by Toshiba TEC label printers (B-SX, B-EX, B-SA, B-FV series, etc.).
//!
//! ## Protocol Overview
//!
//! TPCL is a text protocol. Every command is framed by braces and closed by a
//! vertical bar:
//!
//! ```text
//! {  command-letters  parameters  |  }
//! ```
//!
//! - `{` (0x7B) opens a command, `|}` (0x7C 0x7D) closes it
//! - Numeric parameters are zero-padded decimal (`{D0520,0760,0500|}`)
//! - Graphics commands (`SG`) carry binary payload between the parameter
//!   list and the closing `|}`
//!
//! The filter terminates every command with a line feed. The printer ignores
//! whitespace between commands, and it keeps captured streams readable.
//!
//! ## Units
//!
//! Lengths are in 0.1 mm. Graphics coordinates and sizes are in dots.

// ============================================================================
// FRAMING CONSTANTS
// ============================================================================

/// Opens a TPCL command
pub const OPEN: u8 = b'{';

/// Closes the parameter list of a TPCL command (`|}`)
pub const CLOSE: &[u8] = b"|}";

/// Line feed appended after every command
pub const LF: u8 = 0x0A;

/// Build `{body|}\n`.
fn command(body: &str) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(body.len() + 4);
    cmd.push(OPEN);
    cmd.extend_from_slice(body.as_bytes());
    cmd.extend_from_slice(CLOSE);
    cmd.push(LF);
    cmd
}

// ============================================================================
// PRINTER CONTROL
// ============================================================================

/// # Reset (WS)
///
/// Sent once at the start of every job. A printer left mid-command by a
/// failed job recovers on this.
///
/// ## Protocol Details
///
/// | Format | Bytes       |
/// |--------|-------------|
/// | ASCII  | `{WS\|}` LF |
///
/// ## Example
///
/// ```
/// use tecraster::protocol::commands;
///
/// assert_eq!(commands::reset(), b"{WS|}\n".to_vec());
/// ```
#[inline]
pub fn reset() -> Vec<u8> {
    command("WS")
}

/// # Image Buffer RAM Clear (WR)
///
/// Discards everything the printer buffered. Sent instead of the issue
/// command when a page is canceled.
#[inline]
pub fn ram_clear() -> Vec<u8> {
    command("WR")
}

/// # Clear Image Buffer (C)
///
/// Clears the drawing area before a new label is composed.
#[inline]
pub fn clear_image_buffer() -> Vec<u8> {
    command("C")
}

/// # Eject (IB)
///
/// Feeds and cuts the last issued label. Only sent when cutting is active.
#[inline]
pub fn eject() -> Vec<u8> {
    command("IB")
}

// ============================================================================
// JOB SETUP
// ============================================================================

/// Direction of a position fine adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    fn as_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

/// # Position Fine Adjust (AX)
///
/// Adjusts the feed, cut (or peel) and back-feed positions. Each value is the
/// configured choice string, passed through unchanged.
///
/// ## Protocol Details
///
/// ```text
/// {AX;±feed,±cut,±backfeed|}
/// ```
///
/// ## Example
///
/// ```
/// use tecraster::protocol::commands::{self, Sign};
///
/// let cmd = commands::feed_adjust(
///     (Sign::Plus, "010"),
///     (Sign::Minus, "005"),
///     (Sign::Plus, "000"),
/// );
/// assert_eq!(cmd, b"{AX;+010,-005,+000|}\n".to_vec());
/// ```
pub fn feed_adjust(feed: (Sign, &str), cut: (Sign, &str), backfeed: (Sign, &str)) -> Vec<u8> {
    command(&format!(
        "AX;{}{},{}{},{}{}",
        feed.0.as_char(),
        feed.1,
        cut.0.as_char(),
        cut.1,
        backfeed.0.as_char(),
        backfeed.1
    ))
}

/// # Ribbon Motor Drive Voltage (RM)
///
/// Fine adjusts the take-up (forward) and back-tension motors. Both values
/// are concatenated without a separator.
pub fn ribbon_motor(forward: &str, back: &str) -> Vec<u8> {
    command(&format!("RM;{}{}", forward, back))
}

// ============================================================================
// PAGE SETUP
// ============================================================================

/// # Label Size (D)
///
/// ## Protocol Details
///
/// ```text
/// {Dpppp,wwww,llll,gggg|}
/// ```
///
/// | Field | Meaning | Unit |
/// |-------|---------|------|
/// | pppp | Label pitch (label length + gap) | 0.1 mm |
/// | wwww | Effective print width | 0.1 mm |
/// | llll | Effective print length | 0.1 mm |
/// | gggg | Backing paper width (width + gap) | 0.1 mm |
///
/// ## Example
///
/// ```
/// use tecraster::protocol::commands;
///
/// let cmd = commands::label_size(520, 760, 500, 780);
/// assert_eq!(cmd, b"{D0520,0760,0500,0780|}\n".to_vec());
/// ```
pub fn label_size(pitch: u32, width: u32, length: u32, backing_width: u32) -> Vec<u8> {
    command(&format!(
        "D{:04},{:04},{:04},{:04}",
        pitch, width, length, backing_width
    ))
}

/// # Print Density Fine Adjust (AY)
///
/// `offset` is the temperature step in -10..=+10. `direct_thermal` selects
/// the direct thermal head profile, otherwise thermal transfer.
///
/// ## Example
///
/// ```
/// use tecraster::protocol::commands;
///
/// assert_eq!(commands::temperature_adjust(-3, true), b"{AY;-03,1|}\n".to_vec());
/// assert_eq!(commands::temperature_adjust(0, false), b"{AY;+00,0|}\n".to_vec());
/// ```
pub fn temperature_adjust(offset: i8, direct_thermal: bool) -> Vec<u8> {
    command(&format!("AY;{:+03},{}", offset, u8::from(direct_thermal)))
}

// ============================================================================
// GRAPHICS
// ============================================================================

/// # Bit Map Graphics Header (SG)
///
/// Opens a graphics command. The caller writes the graphics payload right
/// after it and closes the command with [`graphics_end`].
///
/// ## Protocol Details
///
/// ```text
/// {SG;xxxx,yyyy,wwww,hhhh,m,<payload>|}
/// ```
///
/// | Field | Meaning |
/// |-------|---------|
/// | xxxx | X origin in dots |
/// | yyyy | Y origin in dots |
/// | wwww | Width in dots |
/// | hhhh | Height in dots |
/// | m | Graphics mode tag (1 = hex AND, 3 = TOPIX, 5 = hex OR) |
///
/// ## Example
///
/// ```
/// use tecraster::protocol::commands;
///
/// let cmd = commands::graphics_header(0, 120, 832, 300, 3);
/// assert_eq!(cmd, b"{SG;0000,0120,0832,0300,3,".to_vec());
/// ```
pub fn graphics_header(x: u32, y: u32, width_dots: u32, height: u32, mode: u8) -> Vec<u8> {
    format!(
        "{{SG;{:04},{:04},{:04},{:04},{},",
        x, y, width_dots, height, mode
    )
    .into_bytes()
}

/// Closes a graphics command opened by [`graphics_header`].
#[inline]
pub fn graphics_end() -> Vec<u8> {
    let mut cmd = CLOSE.to_vec();
    cmd.push(LF);
    cmd
}

// ============================================================================
// ISSUE
// ============================================================================

/// Parameters of the issue command, one field per printed character group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Number of labels to issue (`cccc`)
    pub copies: u32,
    /// Cut interval (`nnn`)
    pub cut_interval: u32,
    /// Sensor type (`s`)
    pub sensor: u8,
    /// Issue mode (`C` batch, `D` strip, `E` partial cut)
    pub mode: char,
    /// Issue speed (`2`..`8`, `A` for 10 ips)
    pub speed: char,
    /// Ribbon / media selection (`r`)
    pub media: u8,
    /// Tag rotation or mirror (`t`)
    pub mirror: u8,
    /// Status response requested (`u`)
    pub status_response: bool,
}

/// # Issue Label (XS)
///
/// Prints the composed label and advances the media.
///
/// ## Protocol Details
///
/// ```text
/// {XS;I,cccc,nnnsmvrtu|}
/// ```
///
/// ## Example
///
/// ```
/// use tecraster::protocol::commands::{self, Issue};
///
/// let cmd = commands::issue(&Issue {
///     copies: 2,
///     cut_interval: 1,
///     sensor: 3,
///     mode: 'C',
///     speed: '4',
///     media: 1,
///     mirror: 0,
///     status_response: false,
/// });
/// assert_eq!(cmd, b"{XS;I,0002,0013C4100|}\n".to_vec());
/// ```
pub fn issue(params: &Issue) -> Vec<u8> {
    command(&format!(
        "XS;I,{:04},{:03}{}{}{}{}{}{}",
        params.copies,
        params.cut_interval,
        params.sensor,
        params.mode,
        params.speed,
        params.media,
        params.mirror,
        u8::from(params.status_response)
    ))
}

// ============================================================================
// TESTS
// ============================================================================
