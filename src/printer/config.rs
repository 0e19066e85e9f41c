//! # Label Configuration
//!
//! Typed job settings resolved from an [`OptionSet`].
//!
//! ## PPD Keywords
//!
//! | Keyword | Field | Values |
//! |---------|-------|--------|
//! | `teGraphicsMode` | [`graphics_mode`](LabelConfig::graphics_mode) | 1 TOPIX, 2 AND, 3 OR |
//! | `teHexCompression` | [`hex_compression`](LabelConfig::hex_compression) | True / False |
//! | `Gap` | [`label_gap_mm`](LabelConfig::label_gap_mm) | mm between labels |
//! | `FAdjSgn` `FAdjV` | feed adjust | sign 0 `+` / 1 `-`, value |
//! | `CAdjSgn` `CAdjV` | cut adjust | sign, value |
//! | `RAdjSgn` `RAdjV` | back-feed adjust | sign, value |
//! | `RbnAdjFwd` `RbnAdjBck` | ribbon motor | values |
//! | `tePrintMode` | [`print_mode`](LabelConfig::print_mode) | 1 strip, 2 partial cut, 3 cut |
//! | `tePrintRate` | [`speed`](LabelConfig::speed) | 2, 3, 4, 5, 6, 8, 10 ips |
//! | `teMediaTracking` | [`media_tracking`](LabelConfig::media_tracking) | 0..4 |
//! | `PrintOrient` | [`mirror`](LabelConfig::mirror) | 0..9 |
//!
//! ## Usage
//!
//! ```
//! use tecraster::printer::{GraphicsMode, LabelConfig, OptionSet};
//!
//! let mut options = OptionSet::new();
//! options.apply_job_options("teGraphicsMode=2 Gap=3 tePrintRate=10");
//!
//! let config = LabelConfig::from_options(&options)?;
//! assert_eq!(config.graphics_mode, GraphicsMode::And);
//! assert_eq!(config.label_gap_mm, 3);
//! assert_eq!(config.speed, 'A');
//! # Ok::<(), tecraster::TecError>(())
//! ```

use serde::Serialize;

use super::ppd::OptionSet;
use crate::error::TecError;
use crate::protocol::commands::{self, Sign};
use crate::protocol::topix;

// ============================================================================
// GRAPHICS MODE
// ============================================================================

/// How scanlines are sent to the printer.
///
/// | Mode | `SG` tag | Data |
/// |------|----------|------|
/// | And | 1 | Raw bytes, AND-ed into the image buffer |
/// | Topix | 3 | Sparse delta frames |
/// | Or | 5 | Raw bytes, OR-ed into the image buffer |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicsMode {
    And,
    Or,
    #[default]
    Topix,
}

impl GraphicsMode {
    /// Mode tag of the `SG` command.
    pub fn tag(self) -> u8 {
        match self {
            Self::And => 1,
            Self::Topix => topix::MODE_TAG,
            Self::Or => 5,
        }
    }

    /// Map a `teGraphicsMode` choice. Unknown choices fall back to TOPIX.
    pub fn from_choice(choice: i32) -> Self {
        match choice {
            2 => Self::And,
            3 => Self::Or,
            _ => Self::Topix,
        }
    }

    /// Whether lines go through the TOPIX encoder.
    pub fn is_delta(self) -> bool {
        self == Self::Topix
    }
}

// ============================================================================
// PRINT MODE
// ============================================================================

/// Issue mode of the `XS` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMode {
    /// Continuous issue (`C`)
    #[default]
    Batch,
    /// Peel-off issue (`D`)
    Strip,
    /// Partial cut issue (`E`)
    PartialCut,
    /// Cut issue (`C`) followed by an eject
    Cut,
}

impl PrintMode {
    /// Map a `tePrintMode` choice.
    pub fn from_choice(choice: i32) -> Self {
        match choice {
            1 => Self::Strip,
            2 => Self::PartialCut,
            3 => Self::Cut,
            _ => Self::Batch,
        }
    }

    /// Issue mode character.
    pub fn as_char(self) -> char {
        match self {
            Self::Batch | Self::Cut => 'C',
            Self::Strip => 'D',
            Self::PartialCut => 'E',
        }
    }

    /// Whether an eject command follows the issue command.
    pub fn ejects(self) -> bool {
        self == Self::Cut
    }
}

// ============================================================================
// POSITION ADJUSTMENTS
// ============================================================================

/// One signed fine adjustment, value in 0.1 mm as given in the PPD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Adjust {
    pub sign: Sign,
    pub value: String,
}

impl Adjust {
    fn from_options(options: &OptionSet, sign_key: &str, value_key: &str) -> Result<Option<Self>, TecError> {
        let Some(value) = options.get(value_key) else {
            return Ok(None);
        };
        let sign = match options.int(sign_key) {
            Some(1) => Sign::Minus,
            _ => Sign::Plus,
        };
        Ok(Some(Self {
            sign,
            value: digits(value_key, value)?,
        }))
    }

    fn as_pair(&self) -> (Sign, &str) {
        (self.sign, &self.value)
    }
}

/// Feed, cut and back-feed position adjustments (`AX`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionAdjust {
    pub feed: Adjust,
    pub cut: Adjust,
    pub backfeed: Adjust,
}

/// Ribbon motor voltage adjustments (`RM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RibbonAdjust {
    pub forward: String,
    pub back: String,
}

// ============================================================================
// LABEL CONFIG
// ============================================================================

/// Job settings for one print job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelConfig {
    /// Graphics transfer mode
    pub graphics_mode: GraphicsMode,

    /// Send raw-mode lines as run-length packed hex text
    pub hex_compression: bool,

    /// Gap between labels in mm
    pub label_gap_mm: u32,

    /// Position fine adjustment, sent only when fully configured
    pub position_adjust: Option<PositionAdjust>,

    /// Ribbon motor adjustment, sent only when fully configured
    pub ribbon_adjust: Option<RibbonAdjust>,

    /// Issue mode
    pub print_mode: PrintMode,

    /// Issue speed character
    pub speed: char,

    /// Sensor selection (0 none, 1..4 sensor types)
    pub media_tracking: u8,

    /// Print orientation / mirror digit
    pub mirror: u8,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            graphics_mode: GraphicsMode::Topix,
            hex_compression: false,
            label_gap_mm: 0,
            position_adjust: None,
            ribbon_adjust: None,
            print_mode: PrintMode::Batch,
            speed: '3',
            media_tracking: 0,
            mirror: 0,
        }
    }
}

impl LabelConfig {
    /// Resolve the configuration from marked options.
    ///
    /// Missing options take their defaults. A malformed value where the
    /// printer needs a number is an [`TecError::InvalidOption`].
    pub fn from_options(options: &OptionSet) -> Result<Self, TecError> {
        let label_gap_mm = match options.int("Gap") {
            None => 0,
            Some(gap) => u32::try_from(gap)
                .map_err(|_| TecError::InvalidOption(format!("Gap={} is negative", gap)))?,
        };

        let position_adjust = match (
            Adjust::from_options(options, "FAdjSgn", "FAdjV")?,
            Adjust::from_options(options, "CAdjSgn", "CAdjV")?,
            Adjust::from_options(options, "RAdjSgn", "RAdjV")?,
        ) {
            (Some(feed), Some(cut), Some(backfeed)) => Some(PositionAdjust { feed, cut, backfeed }),
            _ => None,
        };

        let ribbon_adjust = match (options.get("RbnAdjFwd"), options.get("RbnAdjBck")) {
            (Some(forward), Some(back)) => Some(RibbonAdjust {
                forward: digits("RbnAdjFwd", forward)?,
                back: digits("RbnAdjBck", back)?,
            }),
            _ => None,
        };

        let mirror = match options.int("PrintOrient") {
            None => 0,
            Some(value) => u8::try_from(value)
                .ok()
                .filter(|v| *v <= 9)
                .ok_or_else(|| {
                    TecError::InvalidOption(format!("PrintOrient={} is not a digit", value))
                })?,
        };

        let media_tracking = (0..=4u8)
            .find(|n| options.is_marked("teMediaTracking", &n.to_string()))
            .unwrap_or(0);

        Ok(Self {
            graphics_mode: GraphicsMode::from_choice(options.int("teGraphicsMode").unwrap_or(1)),
            hex_compression: boolean(options, "teHexCompression")?,
            label_gap_mm,
            position_adjust,
            ribbon_adjust,
            print_mode: PrintMode::from_choice(options.int("tePrintMode").unwrap_or(0)),
            speed: speed_char(options.int("tePrintRate")),
            media_tracking,
            mirror,
        })
    }

    /// Commands sent once before the first page: reset, then the position
    /// and ribbon adjustments that are configured.
    ///
    /// ## Example
    ///
    /// ```
    /// use tecraster::printer::LabelConfig;
    ///
    /// let config = LabelConfig::default();
    /// assert_eq!(config.setup_commands(), b"{WS|}\n".to_vec());
    /// ```
    pub fn setup_commands(&self) -> Vec<u8> {
        let mut out = commands::reset();
        if let Some(adjust) = &self.position_adjust {
            out.extend(commands::feed_adjust(
                adjust.feed.as_pair(),
                adjust.cut.as_pair(),
                adjust.backfeed.as_pair(),
            ));
        }
        if let Some(ribbon) = &self.ribbon_adjust {
            out.extend(commands::ribbon_motor(&ribbon.forward, &ribbon.back));
        }
        out
    }
}

/// Issue speed for a `tePrintRate` choice (inches per second).
fn speed_char(rate: Option<i32>) -> char {
    match rate {
        Some(rate @ (2 | 3 | 4 | 5 | 6 | 8)) => char::from(b'0' + rate as u8),
        Some(10) => 'A',
        _ => '3',
    }
}

/// A value sent to the printer verbatim must be plain decimal digits.
fn digits(keyword: &str, value: &str) -> Result<String, TecError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TecError::InvalidOption(format!(
            "{}={:?} is not a number",
            keyword, value
        )));
    }
    Ok(value.to_string())
}

fn boolean(options: &OptionSet, keyword: &str) -> Result<bool, TecError> {
    match options.get(keyword) {
        None => Ok(false),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(TecError::InvalidOption(format!(
                "{}={:?} is not a boolean",
                keyword, value
            ))),
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================
