//! Hexadecimal rendering of raw octets.

use std::fmt;

/// Render bytes as uppercase hex pairs separated by single spaces.
///
/// This is how non-printable OCTET STRING values are shown to users.
///
/// ```
/// use mibwalk::format::hex::spaced_upper;
///
/// assert_eq!(spaced_upper(&[0x00, 0x1a, 0xff]), "00 1A FF");
/// assert_eq!(spaced_upper(&[]), "");
/// ```
pub fn spaced_upper(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:02X}", b));
    }
    out
}

/// Decode a hex string, ignoring ASCII whitespace between digits.
#[cfg(any(test, feature = "testing"))]
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(DecodeError::OddLength);
    }
    digits
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|p| u8::from_str_radix(p, 16).ok())
                .ok_or(DecodeError::InvalidChar)
        })
        .collect()
}

/// Error type for hex decoding.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input has an odd number of digits.
    OddLength,
    /// Invalid hexadecimal character.
    InvalidChar,
}

/// Lazy lowercase hex formatter for log fields.
///
/// Only formats when the event is actually recorded.
pub struct Bytes<'a>(pub &'a [u8]);

impl fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_bytes() {
        assert_eq!(format!("{}", Bytes(&[0xde, 0xad, 0xbe, 0xef])), "deadbeef");
        assert_eq!(format!("{:?}", Bytes(&[])), "");
    }

    #[test]
    fn test_spaced_upper() {
        assert_eq!(spaced_upper(&[0xde, 0xad, 0xbe, 0xef]), "DE AD BE EF");
        assert_eq!(spaced_upper(&[0x07]), "07");
    }

    #[test]
    fn test_decode_with_whitespace() {
        assert_eq!(decode("30 03\n02 01 05").unwrap(), vec![0x30, 0x03, 0x02, 0x01, 0x05]);
        assert_eq!(decode("DeAdBeEf").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode("123"), Err(DecodeError::OddLength));
        assert_eq!(decode("0g"), Err(DecodeError::InvalidChar));
    }
}
