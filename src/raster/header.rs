//! # Page Header
//!
//! The CUPS page header (`cups_page_header2_t`) is a fixed 1796-byte record.
//! Strings are 64-byte NUL-padded fields, integers are `u32` in the stream's
//! byte order, and a few geometry fields are `f32`.
//!
//! Only the fields the label filter uses are decoded. The table lists their
//! byte offsets:
//!
//! | Offset | Field | Use |
//! |--------|-------|-----|
//! | 0 | MediaClass | logged |
//! | 64 | MediaColor | logged |
//! | 128 | MediaType | `Direct` / `Thermal` / `Thermal2` |
//! | 192 | OutputType | logged |
//! | 268 | CutMedia | cut after every label |
//! | 276 | HWResolution | logged |
//! | 324 | MirrorPrint | logged |
//! | 340 | NumCopies | issue quantity |
//! | 352 | PageSize | label size fallback (points) |
//! | 372 | cupsWidth | width in dots |
//! | 376 | cupsHeight | height in lines |
//! | 384 | cupsBitsPerColor | must be 1 |
//! | 388 | cupsBitsPerPixel | must be 1 |
//! | 392 | cupsBytesPerLine | scanline length |
//! | 396 | cupsColorOrder | run-length pixel size |
//! | 400 | cupsColorSpace | white level for line fill |
//! | 404 | cupsCompression | print density step (1..=21) |
//! | 416 | cupsRowStep | cut interval |
//! | 428 | cupsPageSize | label size (points, `f32`) |

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Size of one page header in the stream.
pub const HEADER_LEN: usize = 1796;

const MEDIA_CLASS: usize = 0;
const MEDIA_COLOR: usize = 64;
const MEDIA_TYPE: usize = 128;
const OUTPUT_TYPE: usize = 192;
const CUT_MEDIA: usize = 268;
const HW_RESOLUTION: usize = 276;
const MIRROR_PRINT: usize = 324;
const NUM_COPIES: usize = 340;
const PAGE_SIZE: usize = 352;
const CUPS_WIDTH: usize = 372;
const CUPS_HEIGHT: usize = 376;
const CUPS_MEDIA_TYPE: usize = 380;
const CUPS_BITS_PER_COLOR: usize = 384;
const CUPS_BITS_PER_PIXEL: usize = 388;
const CUPS_BYTES_PER_LINE: usize = 392;
const CUPS_COLOR_ORDER: usize = 396;
const CUPS_COLOR_SPACE: usize = 400;
const CUPS_COMPRESSION: usize = 404;
const CUPS_ROW_STEP: usize = 416;
const CUPS_PAGE_SIZE: usize = 428;

const STRING_LEN: usize = 64;

/// Byte order of the header integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// Raster stream version, identified by the sync word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterVersion {
    V1,
    V2,
    V3,
}

impl RasterVersion {
    /// Identify a sync word.
    pub fn from_sync(sync: [u8; 4]) -> Option<(Self, Endian)> {
        match &sync {
            b"RaSt" => Some((Self::V1, Endian::Big)),
            b"tSaR" => Some((Self::V1, Endian::Little)),
            b"RaS2" => Some((Self::V2, Endian::Big)),
            b"2SaR" => Some((Self::V2, Endian::Little)),
            b"RaS3" => Some((Self::V3, Endian::Big)),
            b"3SaR" => Some((Self::V3, Endian::Little)),
            _ => None,
        }
    }

    /// The sync word written at the start of a stream.
    pub fn sync(self, endian: Endian) -> [u8; 4] {
        let word = match self {
            Self::V1 => *b"RaSt",
            Self::V2 => *b"RaS2",
            Self::V3 => *b"RaS3",
        };
        match endian {
            Endian::Big => word,
            Endian::Little => [word[3], word[2], word[1], word[0]],
        }
    }

    /// Whether pixel data is run-length compressed.
    pub fn is_compressed(self) -> bool {
        matches!(self, Self::V2)
    }
}

/// The page header fields the filter uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageHeader {
    pub media_class: String,
    pub media_color: String,
    pub media_type: String,
    pub output_type: String,
    pub cut_media: u32,
    pub hw_resolution: [u32; 2],
    pub mirror_print: u32,
    pub num_copies: u32,
    /// Page size in points
    pub page_size: [u32; 2],
    /// Width in dots
    pub width: u32,
    /// Height in lines
    pub height: u32,
    pub cups_media_type: u32,
    pub bits_per_color: u32,
    pub bits_per_pixel: u32,
    pub bytes_per_line: u32,
    pub color_order: u32,
    pub color_space: u32,
    /// Print density step, 1..=21 (11 = no adjustment)
    pub compression: u32,
    /// Cut interval
    pub row_step: u32,
    /// Page size in points, fractional
    pub cups_page_size: [f32; 2],
}

impl PageHeader {
    /// Decode a header record.
    pub fn parse(buf: &[u8; HEADER_LEN], endian: Endian) -> Self {
        let u = |offset: usize| match endian {
            Endian::Big => BigEndian::read_u32(&buf[offset..]),
            Endian::Little => LittleEndian::read_u32(&buf[offset..]),
        };
        let f = |offset: usize| match endian {
            Endian::Big => BigEndian::read_f32(&buf[offset..]),
            Endian::Little => LittleEndian::read_f32(&buf[offset..]),
        };
        let s = |offset: usize| {
            let field = &buf[offset..offset + STRING_LEN];
            let end = field.iter().position(|&b| b == 0).unwrap_or(STRING_LEN);
            String::from_utf8_lossy(&field[..end]).into_owned()
        };

        Self {
            media_class: s(MEDIA_CLASS),
            media_color: s(MEDIA_COLOR),
            media_type: s(MEDIA_TYPE),
            output_type: s(OUTPUT_TYPE),
            cut_media: u(CUT_MEDIA),
            hw_resolution: [u(HW_RESOLUTION), u(HW_RESOLUTION + 4)],
            mirror_print: u(MIRROR_PRINT),
            num_copies: u(NUM_COPIES),
            page_size: [u(PAGE_SIZE), u(PAGE_SIZE + 4)],
            width: u(CUPS_WIDTH),
            height: u(CUPS_HEIGHT),
            cups_media_type: u(CUPS_MEDIA_TYPE),
            bits_per_color: u(CUPS_BITS_PER_COLOR),
            bits_per_pixel: u(CUPS_BITS_PER_PIXEL),
            bytes_per_line: u(CUPS_BYTES_PER_LINE),
            color_order: u(CUPS_COLOR_ORDER),
            color_space: u(CUPS_COLOR_SPACE),
            compression: u(CUPS_COMPRESSION),
            row_step: u(CUPS_ROW_STEP),
            cups_page_size: [f(CUPS_PAGE_SIZE), f(CUPS_PAGE_SIZE + 4)],
        }
    }

    /// Encode the header as a stream record. Fields this type does not
    /// carry are written as zero.
    pub fn to_bytes(&self, endian: Endian) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN];

        let mut put_u32 = |buf: &mut [u8], offset: usize, value: u32| match endian {
            Endian::Big => BigEndian::write_u32(&mut buf[offset..], value),
            Endian::Little => LittleEndian::write_u32(&mut buf[offset..], value),
        };
        for (offset, value) in [
            (CUT_MEDIA, self.cut_media),
            (HW_RESOLUTION, self.hw_resolution[0]),
            (HW_RESOLUTION + 4, self.hw_resolution[1]),
            (MIRROR_PRINT, self.mirror_print),
            (NUM_COPIES, self.num_copies),
            (PAGE_SIZE, self.page_size[0]),
            (PAGE_SIZE + 4, self.page_size[1]),
            (CUPS_WIDTH, self.width),
            (CUPS_HEIGHT, self.height),
            (CUPS_MEDIA_TYPE, self.cups_media_type),
            (CUPS_BITS_PER_COLOR, self.bits_per_color),
            (CUPS_BITS_PER_PIXEL, self.bits_per_pixel),
            (CUPS_BYTES_PER_LINE, self.bytes_per_line),
            (CUPS_COLOR_ORDER, self.color_order),
            (CUPS_COLOR_SPACE, self.color_space),
            (CUPS_COMPRESSION, self.compression),
            (CUPS_ROW_STEP, self.row_step),
        ] {
            put_u32(&mut buf, offset, value);
        }

        for (i, value) in self.cups_page_size.iter().enumerate() {
            let offset = CUPS_PAGE_SIZE + i * 4;
            match endian {
                Endian::Big => BigEndian::write_f32(&mut buf[offset..], *value),
                Endian::Little => LittleEndian::write_f32(&mut buf[offset..], *value),
            }
        }

        for (offset, value) in [
            (MEDIA_CLASS, &self.media_class),
            (MEDIA_COLOR, &self.media_color),
            (MEDIA_TYPE, &self.media_type),
            (OUTPUT_TYPE, &self.output_type),
        ] {
            let bytes = value.as_bytes();
            let n = bytes.len().min(STRING_LEN - 1);
            buf[offset..offset + n].copy_from_slice(&bytes[..n]);
        }

        buf
    }

    /// Label size in points: `cupsPageSize` when present, else `PageSize`.
    pub fn page_size_points(&self) -> [f32; 2] {
        if self.cups_page_size[0] > 0.0 && self.cups_page_size[1] > 0.0 {
            self.cups_page_size
        } else {
            [self.page_size[0] as f32, self.page_size[1] as f32]
        }
    }

    /// Whether the media is printed without a ribbon.
    pub fn is_direct_thermal(&self) -> bool {
        self.media_type == "Direct"
    }
}

// ============================================================================
// TESTS
// ============================================================================
