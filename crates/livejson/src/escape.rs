//! Decoding of string escape sequences.
//!
//! Two kinds of escapes follow a backslash: the single-character escapes
//! (`"` `\` `/` `b` `f` `n` `r` `t`) mapped by [`single_escape`], and hex
//! escapes (`u` + 4 digits, `U` + 8 digits) accumulated by
//! [`HexEscapeBuffer`] one digit at a time as characters arrive from the
//! stream.

/// Maps a single-character escape to its decoded character, or `None` if
/// `c` does not introduce one.
pub(crate) fn single_escape(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\\' => Some('\\'),
        '/' => Some('/'),
        'b' => Some('\u{0008}'),
        'f' => Some('\u{000C}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    }
}

/// Why a hex escape could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HexEscapeError {
    /// The fed character is not an ASCII hex digit.
    NotHex,
    /// The accumulated code point is not a Unicode scalar value (a
    /// surrogate half, or out of range for the 8-digit form).
    InvalidScalar,
}

/// Accumulates a fixed number of ASCII hex digits and decodes them into a
/// character once the last digit arrives.
#[derive(Debug)]
pub(crate) struct HexEscapeBuffer {
    code: u32,
    fed: u8,
    want: u8,
}

impl HexEscapeBuffer {
    /// A buffer expecting `digits` hex digits: 4 for `\u`, 8 for `\U`.
    pub(crate) fn new(digits: u8) -> Self {
        Self {
            code: 0,
            fed: 0,
            want: digits,
        }
    }

    /// Feeds one character.
    ///
    /// Returns `Ok(None)` while more digits are expected, `Ok(Some(ch))`
    /// when the final digit completes a scalar value, and an error for
    /// non-hex input or a code point that is no `char`.
    pub(crate) fn feed(&mut self, c: char) -> Result<Option<char>, HexEscapeError> {
        let digit = c.to_digit(16).ok_or(HexEscapeError::NotHex)?;
        self.code = self.code.wrapping_mul(16) | digit;
        self.fed += 1;
        if self.fed < self.want {
            return Ok(None);
        }
        char::from_u32(self.code)
            .map(Some)
            .ok_or(HexEscapeError::InvalidScalar)
    }
}

#[cfg(test)]
mod tests {
    use super::{HexEscapeBuffer, HexEscapeError, single_escape};

    #[test]
    fn four_digit_decoding() {
        let mut buf = HexEscapeBuffer::new(4);
        assert_eq!(buf.feed('0').unwrap(), None);
        assert_eq!(buf.feed('0').unwrap(), None);
        assert_eq!(buf.feed('e').unwrap(), None);
        assert_eq!(buf.feed('9').unwrap(), Some('é'));
    }

    #[test]
    fn eight_digit_decoding() {
        let mut buf = HexEscapeBuffer::new(8);
        for c in "0001f60".chars() {
            assert_eq!(buf.feed(c).unwrap(), None);
        }
        assert_eq!(buf.feed('0').unwrap(), Some('\u{1F600}'));
    }

    #[test]
    fn mixed_case_hex() {
        let mut buf = HexEscapeBuffer::new(4);
        for c in "AbC".chars() {
            assert_eq!(buf.feed(c).unwrap(), None);
        }
        assert_eq!(buf.feed('d').unwrap(), Some(char::from_u32(0xABCD).unwrap()));
    }

    #[test]
    fn non_hex_digit_is_rejected() {
        let mut buf = HexEscapeBuffer::new(4);
        assert_eq!(buf.feed('g').unwrap_err(), HexEscapeError::NotHex);
    }

    #[test]
    fn surrogate_half_is_no_scalar() {
        let mut buf = HexEscapeBuffer::new(4);
        for c in "d80".chars() {
            assert_eq!(buf.feed(c).unwrap(), None);
        }
        assert_eq!(buf.feed('0').unwrap_err(), HexEscapeError::InvalidScalar);
    }

    #[test]
    fn single_escapes_cover_the_json_set() {
        assert_eq!(single_escape('n'), Some('\n'));
        assert_eq!(single_escape('t'), Some('\t'));
        assert_eq!(single_escape('/'), Some('/'));
        assert_eq!(single_escape('x'), None);
        assert_eq!(single_escape('u'), None);
    }
}
