//! Helpers shared by the integration tests: raster stream construction and
//! a reference TOPIX frame parser.

#![allow(dead_code)]

use tecraster::raster::{Endian, PageHeader, RasterVersion};

/// Bytes of `{SG;0000,yyyy,wwww,0300,3,`.
pub const FRAME_HEADER_LEN: usize = 26;

/// One parsed TOPIX frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub start_line: u32,
    pub width_dots: u32,
    pub payload: Vec<u8>,
}

/// A 1-bit page header.
pub fn page_header(width: u32, height: u32) -> PageHeader {
    PageHeader {
        media_type: "Thermal".into(),
        width,
        height,
        bits_per_color: 1,
        bits_per_pixel: 1,
        bytes_per_line: width.div_ceil(8),
        color_space: 3,
        num_copies: 1,
        compression: 11,
        cups_page_size: [144.0, 72.0],
        hw_resolution: [203, 203],
        ..Default::default()
    }
}

/// Build a raster stream from headers and their (already encoded) data.
pub fn raster_stream(version: RasterVersion, pages: &[(PageHeader, Vec<u8>)]) -> Vec<u8> {
    let mut out = version.sync(Endian::Big).to_vec();
    for (header, data) in pages {
        out.extend(header.to_bytes(Endian::Big));
        out.extend(data);
    }
    out
}

/// Walk TPCL output: text commands end with `\n`, `SG` frames carry a
/// length. Returns every TOPIX frame in order.
pub fn frames(out: &[u8]) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut pos = 0;

    while pos < out.len() {
        let rest = &out[pos..];
        if rest.starts_with(b"{SG;") && rest.get(24) == Some(&b'3') {
            let text = std::str::from_utf8(&rest[..FRAME_HEADER_LEN]).unwrap();
            let start_line = text[9..13].parse().unwrap();
            let width_dots = text[14..18].parse().unwrap();
            assert_eq!(&text[19..24], "0300,", "frame height field");

            let len = u16::from_be_bytes([rest[FRAME_HEADER_LEN], rest[FRAME_HEADER_LEN + 1]]) as usize;
            let body = FRAME_HEADER_LEN + 2;
            assert_eq!(&rest[body + len..body + len + 3], b"|}\n", "frame terminator");

            frames.push(Frame {
                start_line,
                width_dots,
                payload: rest[body..body + len].to_vec(),
            });
            pos += body + len + 3;
        } else {
            let newline = rest.iter().position(|&b| b == b'\n').expect("unterminated command");
            pos += newline + 1;
        }
    }

    frames
}

/// Decode a TOPIX payload starting from an all-zero reference line.
pub fn decode_topix(payload: &[u8], bytes_per_line: usize) -> Vec<Vec<u8>> {
    let mut reference = vec![0u8; bytes_per_line];
    let mut lines = Vec::new();
    let mut bytes = payload.iter().copied();

    while let Some(top) = bytes.next() {
        for group in 0..8 {
            if top & (0x80 >> group) == 0 {
                continue;
            }
            let mid = bytes.next().expect("mid byte");
            for sub in 0..8 {
                if mid & (0x80 >> sub) == 0 {
                    continue;
                }
                let leaf = bytes.next().expect("leaf byte");
                for slot in 0..8 {
                    if leaf & (0x80 >> slot) != 0 {
                        reference[group * 64 + sub * 8 + slot] ^= bytes.next().expect("delta byte");
                    }
                }
            }
        }
        lines.push(reference.clone());
    }

    lines
}

pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

/// Deterministic pseudo-random page content with roughly `density`/256 of
/// the bytes set, changing a little from line to line.
pub fn label_lines(bytes_per_line: usize, height: usize, seed: u64, density: u8) -> Vec<Vec<u8>> {
    let mut state = seed | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut line = vec![0u8; bytes_per_line];
    let mut lines = Vec::with_capacity(height);
    for _ in 0..height {
        for byte in line.iter_mut() {
            let r = next();
            if (r & 0xFF) as u8 <= density {
                *byte = (r >> 8) as u8;
            }
        }
        lines.push(line.clone());
    }
    lines
}
