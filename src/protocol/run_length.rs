//! # Run-Length Alphabet
//!
//! Symbolic run compression for hex graphics data. A run of one character is
//! written as a sequence of count letters followed by the character itself:
//!
//! | Token | Repeats |
//! |-------|---------|
//! | `z` | 400 |
//! | `g`..`y` | 20, 40, ... 380 |
//! | `G`..`Y` | 1, 2, ... 19 |
//!
//! Counts are decomposed greedily, largest unit first, so every count has
//! exactly one encoding. The literal character always comes last.
//!
//! ```text
//! 450 × 'A'  →  z  h  P  A
//!               400 40 10
//! ```

/// Repeats represented by one `z` token.
pub const RUN_400: usize = 400;

/// Unit of the `g`..`y` tokens.
pub const RUN_20: usize = 20;

/// Append the encoding of `count` repetitions of `ch` to `out`.
///
/// Counts of 0 and 1 produce the literal alone.
///
/// ## Example
///
/// ```
/// use tecraster::protocol::run_length;
///
/// let mut out = Vec::new();
/// run_length::encode_run(b'A', 450, &mut out);
/// assert_eq!(out, b"zhPA");
/// ```
pub fn encode_run(ch: u8, count: usize, out: &mut Vec<u8>) {
    if count > 1 {
        let mut remaining = count;

        while remaining >= RUN_400 {
            out.push(b'z');
            remaining -= RUN_400;
        }

        if remaining >= RUN_20 {
            out.push(b'f' + (remaining / RUN_20) as u8);
            remaining %= RUN_20;
        }

        if remaining > 0 {
            out.push(b'F' + remaining as u8);
        }
    }

    out.push(ch);
}

/// Convenience wrapper around [`encode_run`] returning a new vector.
pub fn run(ch: u8, count: usize) -> Vec<u8> {
    let mut out = Vec::new();
    encode_run(ch, count, &mut out);
    out
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Render a scanline as upper-case hex digits and run-length encode it.
///
/// Every byte becomes two digits (high nibble first); each maximal run of
/// identical digits is emitted through [`encode_run`].
///
/// ## Example
///
/// ```
/// use tecraster::protocol::run_length;
///
/// let mut out = Vec::new();
/// // "FF000000F0" → FF, 000000, F, 0
/// run_length::encode_hex_line(&[0xFF, 0x00, 0x00, 0x00, 0xF0], &mut out);
/// assert_eq!(out, b"HFL0F0");
/// ```
pub fn encode_hex_line(line: &[u8], out: &mut Vec<u8>) {
    let mut digits = line
        .iter()
        .flat_map(|&b| [HEX_DIGITS[(b >> 4) as usize], HEX_DIGITS[(b & 0x0F) as usize]]);

    let Some(mut current) = digits.next() else {
        return;
    };
    let mut count = 1;

    for digit in digits {
        if digit == current {
            count += 1;
        } else {
            encode_run(current, count, out);
            current = digit;
            count = 1;
        }
    }
    encode_run(current, count, out);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_and_one_are_literal_only() {
        assert_eq!(run(b'A', 0), b"A");
        assert_eq!(run(b'A', 1), b"A");
    }

    #[test]
    fn test_small_counts_use_single_unit_token() {
        assert_eq!(run(b'0', 2), b"H0");
        assert_eq!(run(b'0', 19), b"Y0");
    }

    #[test]
    fn test_multiples_of_twenty() {
        assert_eq!(run(b'F', 20), b"gF");
        assert_eq!(run(b'F', 21), b"gGF");
        assert_eq!(run(b'F', 380), b"yF");
        assert_eq!(run(b'F', 399), b"yYF");
    }

    #[test]
    fn test_four_hundred_repeats() {
        assert_eq!(run(b'A', 400), b"zA");
        assert_eq!(run(b'A', 450), b"zhPA");
        assert_eq!(run(b'A', 1200), b"zzzA");
        assert_eq!(run(b'A', 801), b"zzGA");
    }

    #[test]
    fn test_encode_appends() {
        let mut out = b"xx".to_vec();
        encode_run(b'1', 3, &mut out);
        assert_eq!(out, b"xxI1");
    }

    #[test]
    fn test_hex_line_blank() {
        let mut out = Vec::new();
        encode_hex_line(&[0u8; 72], &mut out);
        // 144 zeros = 7 × 20 + 4
        assert_eq!(out, b"mJ0");
    }

    #[test]
    fn test_hex_line_no_runs() {
        let mut out = Vec::new();
        encode_hex_line(&[0x12, 0x34], &mut out);
        assert_eq!(out, b"1234");
    }

    #[test]
    fn test_hex_line_empty() {
        let mut out = Vec::new();
        encode_hex_line(&[], &mut out);
        assert!(out.is_empty());
    }
}
