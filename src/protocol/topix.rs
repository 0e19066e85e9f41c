//! # TOPIX Compression
//!
//! TOPIX is the sparse delta graphics format of TPCL (`SG` mode 3). Each
//! scanline is XORed against the previous one and only the changed bytes
//! are sent, addressed through a three-level presence bitmap.
//!
//! ## Line Layout
//!
//! A line of up to 512 bytes is split into 8 groups of 64 bytes, each group
//! into 8 sub-groups of 8 bytes:
//!
//! ```text
//!  line ─┬─ group 0 ─┬─ sub 0: bytes 0..8
//!        │           ├─ sub 1: bytes 8..16
//!        │           └─ ...
//!        ├─ group 1 ─┬─ sub 0: bytes 64..72
//!        └─ ...
//! ```
//!
//! Every level carries one presence byte, MSB = first child:
//!
//! - **top**: one per line, bit per group with changes
//! - **mid**: one per changed group, bit per sub-group with changes
//! - **leaf**: one per changed sub-group, bit per changed byte
//!
//! ## Encoded Form
//!
//! ```text
//! top [ mid [ leaf delta... ]... ]...
//! ```
//!
//! The top byte is always present. Everything below it appears only when its
//! parent bit is set, and only non-zero delta bytes are written:
//!
//! | Line | Encoded |
//! |------|---------|
//! | unchanged | `00` |
//! | first byte changed to `FF` | `80 80 80 FF` |
//! | byte 9 changed to `01` | `80 40 40 01` |

/// Bytes covered by one TOPIX line (8 groups × 8 sub-groups × 8 bytes).
pub const MAX_LINE_BYTES: usize = 512;

/// Graphics mode tag of TOPIX in the `SG` command.
pub const MODE_TAG: u8 = 3;

const GROUP_BYTES: usize = 64;
const SUB_BYTES: usize = 8;

/// Upper bound on the encoded size of one line of `bytes_per_line` bytes.
///
/// `bytes_per_line + ceil(bytes_per_line / 8) * 3`. It dominates the true
/// worst case `1 + ceil(w / 64) + ceil(w / 8) + w` for every width >= 1,
/// since the top byte and the mid bytes together never exceed two bytes
/// per sub-group.
///
/// ## Example
///
/// ```
/// use tecraster::protocol::topix;
///
/// assert_eq!(topix::worst_case_line_bytes(8), 11);
/// assert_eq!(topix::worst_case_line_bytes(9), 15);
/// assert_eq!(topix::worst_case_line_bytes(104), 143);
/// ```
#[inline]
pub const fn worst_case_line_bytes(bytes_per_line: usize) -> usize {
    bytes_per_line + bytes_per_line.div_ceil(SUB_BYTES) * 3
}

/// Stateful TOPIX line encoder.
///
/// Holds the reference line the next scanline is diffed against. A new
/// encoder starts from an all-zero reference.
#[derive(Debug, Clone)]
pub struct TopixEncoder {
    reference: Vec<u8>,
}

impl TopixEncoder {
    /// Create an encoder for lines of `bytes_per_line` bytes.
    pub fn new(bytes_per_line: usize) -> Self {
        Self {
            reference: vec![0; bytes_per_line],
        }
    }

    /// Line length this encoder expects.
    pub fn bytes_per_line(&self) -> usize {
        self.reference.len()
    }

    /// The line the next call to [`encode_line`](Self::encode_line) diffs against.
    pub fn reference(&self) -> &[u8] {
        &self.reference
    }

    /// Forget the previous line. The next line is diffed against zeros.
    pub fn reset(&mut self) {
        self.reference.fill(0);
    }

    /// Encode one scanline and append it to `out`.
    ///
    /// `line` must be exactly [`bytes_per_line`](Self::bytes_per_line) long.
    /// Bytes past [`MAX_LINE_BYTES`] are not encoded but still become part
    /// of the reference.
    ///
    /// Returns the number of bytes appended.
    ///
    /// ## Example
    ///
    /// ```
    /// use tecraster::protocol::topix::TopixEncoder;
    ///
    /// let mut encoder = TopixEncoder::new(8);
    /// let mut out = Vec::new();
    ///
    /// encoder.encode_line(&[0xFF, 0, 0, 0, 0, 0, 0, 0], &mut out);
    /// assert_eq!(out, [0x80, 0x80, 0x80, 0xFF]);
    ///
    /// // Same line again: nothing changed
    /// out.clear();
    /// encoder.encode_line(&[0xFF, 0, 0, 0, 0, 0, 0, 0], &mut out);
    /// assert_eq!(out, [0x00]);
    /// ```
    pub fn encode_line(&mut self, line: &[u8], out: &mut Vec<u8>) -> usize {
        debug_assert_eq!(
            line.len(),
            self.reference.len(),
            "TOPIX line length mismatch"
        );

        let start = out.len();
        let width = line.len().min(self.reference.len()).min(MAX_LINE_BYTES);
        let delta = |i: usize| line[i] ^ self.reference[i];

        // Pass 1: presence bits
        let mut leaves = [[0u8; 8]; 8];
        for i in 0..width {
            if delta(i) != 0 {
                let group = i / GROUP_BYTES;
                let sub = (i / SUB_BYTES) % 8;
                leaves[group][sub] |= 0x80 >> (i % SUB_BYTES);
            }
        }

        let mut mids = [0u8; 8];
        let mut top = 0u8;
        for (group, subs) in leaves.iter().enumerate() {
            for (sub, &leaf) in subs.iter().enumerate() {
                if leaf != 0 {
                    mids[group] |= 0x80 >> sub;
                }
            }
            if mids[group] != 0 {
                top |= 0x80 >> group;
            }
        }

        // Pass 2: emit non-zero bytes in tree order
        out.push(top);
        for (group, &mid) in mids.iter().enumerate() {
            if mid == 0 {
                continue;
            }
            out.push(mid);

            for (sub, &leaf) in leaves[group].iter().enumerate() {
                if leaf == 0 {
                    continue;
                }
                out.push(leaf);

                let first = group * GROUP_BYTES + sub * SUB_BYTES;
                let last = (first + SUB_BYTES).min(width);
                out.extend((first..last).map(delta).filter(|&d| d != 0));
            }
        }

        self.reference.copy_from_slice(line);
        out.len() - start
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode(encoder: &mut TopixEncoder, line: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        encoder.encode_line(line, &mut out);
        out
    }

    #[test]
    fn test_blank_line_against_zero_reference() {
        for width in [1, 8, 64, 65, 512, 600] {
            let mut encoder = TopixEncoder::new(width);
            assert_eq!(encode(&mut encoder, &vec![0; width]), vec![0x00], "width {}", width);
        }
    }

    #[test]
    fn test_single_change_first_byte() {
        let mut encoder = TopixEncoder::new(8);
        let out = encode(&mut encoder, &[0xFF, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(out, vec![0x80, 0x80, 0x80, 0xFF]);
    }

    #[test]
    fn test_single_change_second_sub_group() {
        let mut line = vec![0u8; 16];
        line[9] = 0x01;
        let mut encoder = TopixEncoder::new(16);
        assert_eq!(encode(&mut encoder, &line), vec![0x80, 0x40, 0x40, 0x01]);
    }

    #[test]
    fn test_change_in_last_group() {
        let mut line = vec![0u8; 512];
        line[511] = 0xAA;
        let mut encoder = TopixEncoder::new(512);
        assert_eq!(encode(&mut encoder, &line), vec![0x01, 0x01, 0x01, 0xAA]);
    }

    #[test]
    fn test_delta_is_xor_against_previous_line() {
        let mut encoder = TopixEncoder::new(8);
        encode(&mut encoder, &[0xF0, 0, 0, 0, 0, 0, 0, 0]);
        // 0xF0 ^ 0xFF = 0x0F
        let out = encode(&mut encoder, &[0xFF, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(out, vec![0x80, 0x80, 0x80, 0x0F]);
        assert_eq!(encoder.reference(), &[0xFF, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_multiple_groups_are_ordered() {
        let mut line = vec![0u8; 130];
        line[0] = 0x01; // group 0, sub 0, slot 0
        line[7] = 0x02; // group 0, sub 0, slot 7
        line[70] = 0x03; // group 1, sub 0, slot 6
        line[129] = 0x04; // group 2, sub 0, slot 1
        let mut encoder = TopixEncoder::new(130);
        let out = encode(&mut encoder, &line);
        assert_eq!(
            out,
            vec![
                0xE0, // groups 0, 1, 2
                0x80, 0x81, 0x01, 0x02, // group 0
                0x80, 0x02, 0x03, // group 1
                0x80, 0x40, 0x04, // group 2
            ]
        );
    }

    #[test]
    fn test_full_change_hits_worst_case() {
        let width = 512;
        let mut encoder = TopixEncoder::new(width);
        let out = encode(&mut encoder, &vec![0xFF; width]);
        // 1 top + 8 mids + 64 leaves + 512 data
        assert_eq!(out.len(), 1 + 8 + 64 + 512);
        assert!(out.len() <= 1 + worst_case_line_bytes(width));
    }

    #[test]
    fn test_partial_last_sub_group() {
        // 65 bytes: second group holds a single byte
        let mut encoder = TopixEncoder::new(65);
        let out = encode(&mut encoder, &vec![0xFF; 65]);
        assert_eq!(out.len(), 1 + 2 + 9 + 65);
        assert_eq!(&out[out.len() - 3..], &[0x80, 0x80, 0xFF]);
    }

    #[test]
    fn test_bytes_past_limit_update_reference_only() {
        let mut line = vec![0u8; 520];
        line[515] = 0xFF;
        let mut encoder = TopixEncoder::new(520);
        assert_eq!(encode(&mut encoder, &line), vec![0x00]);
        assert_eq!(encoder.reference()[515], 0xFF);
    }

    #[test]
    fn test_reset_forgets_reference() {
        let mut encoder = TopixEncoder::new(8);
        let line = [0x80, 0, 0, 0, 0, 0, 0, 0];
        encode(&mut encoder, &line);
        encoder.reset();
        assert_eq!(encode(&mut encoder, &line), vec![0x80, 0x80, 0x80, 0x80]);
    }

    #[test]
    fn test_bound_dominates_worst_case_for_all_widths() {
        for width in 1..=2048usize {
            let encoded = width.min(MAX_LINE_BYTES);
            let worst = 1 + encoded.div_ceil(64) + encoded.div_ceil(8) + encoded;
            assert!(
                worst <= worst_case_line_bytes(width),
                "width {}: worst {} > bound {}",
                width,
                worst,
                worst_case_line_bytes(width)
            );
        }
    }

    #[test]
    fn test_returns_appended_length() {
        let mut encoder = TopixEncoder::new(8);
        let mut out = vec![0xEE];
        let n = encoder.encode_line(&[0, 0, 1, 0, 0, 0, 0, 0], &mut out);
        assert_eq!(n, 4);
        assert_eq!(out, vec![0xEE, 0x80, 0x80, 0x20, 0x01]);
    }
}
