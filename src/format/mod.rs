//! Human-readable rendering of raw SNMP data.
//!
//! OCTET STRING values carry no type information on the wire, so display
//! falls back on a byte-level guess: text when every byte is printable,
//! otherwise spaced uppercase hex.
//!
//! ```
//! use mibwalk::format::{display_octets, is_printable};
//!
//! assert!(is_printable(b"Linux router 5.15\0"));
//! assert_eq!(display_octets(b"Linux router 5.15\0"), "Linux router 5.15");
//! assert_eq!(display_octets(&[0x00, 0x1a, 0x2b]), "00 1A 2B");
//! ```

pub mod hex;

/// Whether the bytes can be shown as text.
///
/// A single trailing NUL is ignored. Any other C0 control byte or DEL makes
/// the data non-printable. Bytes from 0x80 up are accepted as text.
pub fn is_printable(data: &[u8]) -> bool {
    let data = match data.split_last() {
        Some((0, rest)) => rest,
        _ => data,
    };
    data.iter().all(|&b| !matches!(b, 0x00..=0x1F | 0x7F))
}

/// Display form of an OCTET STRING.
///
/// Printable data is decoded as UTF-8 (lossily) and cut at the first NUL,
/// unless the NUL is the very first character. Everything else is rendered
/// with [`hex::spaced_upper`].
pub fn display_octets(data: &[u8]) -> String {
    if !is_printable(data) {
        return hex::spaced_upper(data);
    }
    let text = String::from_utf8_lossy(data);
    match text.find('\0') {
        Some(pos) if pos > 0 => text[..pos].to_string(),
        _ => text.into_owned(),
    }
}
