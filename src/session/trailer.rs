//! # Page Commands
//!
//! Per-page commands derived from the raster header and the label
//! configuration: the setup block sent before the graphics and the issue
//! block sent after them.
//!
//! ## Issue Fields
//!
//! | Field | Source |
//! |-------|--------|
//! | copies | `NumCopies` |
//! | cut interval | `cupsRowStep` (1 = cut every label, else 0) |
//! | sensor | `teMediaTracking` |
//! | mode | `CutMedia` forces cut, else `tePrintMode` |
//! | speed | `tePrintRate` |
//! | media | `MediaType`: `Direct` 0, `Thermal` 1, `Thermal2` 2 |
//! | mirror | `PrintOrient` |

use super::geometry::LabelSize;
use crate::printer::{LabelConfig, PrintMode};
use crate::protocol::commands::{self, Issue};
use crate::raster::PageHeader;

/// Temperature fine adjust for a `cupsCompression` value.
///
/// Values 1..=21 map to -10..=+10 (11 is no adjustment). Anything else
/// leaves the temperature alone.
pub fn temperature_offset(compression: u32) -> i8 {
    match compression {
        1..=21 => compression as i8 - 11,
        _ => 0,
    }
}

/// Commands sent at the start of every page, before the graphics.
///
/// ```text
/// {Dpppp,wwww,llll,gggg|}   label size
/// {AY;±nn,m|}               temperature fine adjust
/// {C|}                      clear image buffer
/// ```
pub fn page_setup(header: &PageHeader, config: &LabelConfig) -> Vec<u8> {
    let size = LabelSize::from_header(header, config.label_gap_mm);
    let mut out = commands::label_size(size.pitch, size.width, size.length, size.backing_width);
    out.extend(commands::temperature_adjust(
        temperature_offset(header.compression),
        header.is_direct_thermal(),
    ));
    out.extend(commands::clear_image_buffer());
    out
}

/// The issue command of a finished page and whether an eject follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTrailer {
    pub issue: Issue,
    pub eject: bool,
}

impl PageTrailer {
    pub fn new(header: &PageHeader, config: &LabelConfig) -> Self {
        let mode = if header.cut_media != 0 {
            PrintMode::Cut
        } else {
            config.print_mode
        };

        let media = match header.media_type.as_str() {
            "Thermal" => 1,
            "Thermal2" => 2,
            _ => 0,
        };

        Self {
            issue: Issue {
                copies: header.num_copies,
                cut_interval: u32::from(header.row_step == 1),
                sensor: config.media_tracking,
                mode: mode.as_char(),
                speed: config.speed,
                media,
                mirror: config.mirror,
                status_response: false,
            },
            eject: mode.ejects(),
        }
    }

    /// `{XS;...|}` and, when cutting, `{IB|}`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = commands::issue(&self.issue);
        if self.eject {
            out.extend(commands::eject());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header() -> PageHeader {
        PageHeader {
            media_type: "Thermal".into(),
            num_copies: 2,
            row_step: 1,
            compression: 14,
            cups_page_size: [144.0, 72.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_temperature_offsets() {
        assert_eq!(temperature_offset(1), -10);
        assert_eq!(temperature_offset(11), 0);
        assert_eq!(temperature_offset(21), 10);
        assert_eq!(temperature_offset(0), 0);
        assert_eq!(temperature_offset(22), 0);
    }

    #[test]
    fn test_page_setup() {
        let config = LabelConfig {
            label_gap_mm: 3,
            ..Default::default()
        };
        assert_eq!(
            String::from_utf8(page_setup(&header(), &config)).unwrap(),
            "{D0284,0508,0254,0538|}\n{AY;+03,0|}\n{C|}\n"
        );
    }

    #[test]
    fn test_direct_thermal_setup() {
        let mut page = header();
        page.media_type = "Direct".into();
        page.compression = 5;
        let setup = String::from_utf8(page_setup(&page, &LabelConfig::default())).unwrap();
        assert!(setup.contains("{AY;-06,1|}\n"), "{}", setup);
    }

    #[test]
    fn test_trailer_fields() {
        let config = LabelConfig {
            media_tracking: 2,
            speed: '5',
            mirror: 1,
            ..Default::default()
        };
        let trailer = PageTrailer::new(&header(), &config);
        assert_eq!(trailer.to_bytes(), b"{XS;I,0002,0012C5110|}\n".to_vec());
    }

    #[test]
    fn test_cut_media_forces_cut_and_eject() {
        let mut page = header();
        page.cut_media = 1;
        page.row_step = 0;
        page.media_type = "Direct".into();
        let config = LabelConfig {
            print_mode: PrintMode::Strip,
            ..Default::default()
        };
        let trailer = PageTrailer::new(&page, &config);
        assert!(trailer.eject);
        assert_eq!(trailer.to_bytes(), b"{XS;I,0002,0000C3000|}\n{IB|}\n".to_vec());
    }

    #[test]
    fn test_print_mode_without_cut_media() {
        let config = LabelConfig {
            print_mode: PrintMode::PartialCut,
            ..Default::default()
        };
        let trailer = PageTrailer::new(&header(), &config);
        assert_eq!(trailer.issue.mode, 'E');
        assert!(!trailer.eject);
    }
}
