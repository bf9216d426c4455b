//! BER decoding.
//!
//! Zero-copy decoding over `Bytes`; sub-decoders share the parent buffer.

use bytes::Bytes;
use num_bigint::BigInt;

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;

/// Maximum nesting of constructed types below the outermost message.
///
/// A GetResponse needs four levels (message, PDU, varbind list, varbind);
/// the rest is room for SEQUENCE values.
pub const MAX_DEPTH: usize = 32;

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
    /// Position of `data[0]` within the outermost message, for error offsets.
    base: usize,
    /// Constructed types enclosing this decoder.
    depth: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
            depth: 0,
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Offset of the next byte, relative to the outermost message.
    pub fn offset(&self) -> usize {
        self.base + self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn fail<T>(&self, kind: DecodeErrorKind) -> Result<T> {
        tracing::debug!(target: "mibwalk::ber", { snmp.offset = self.offset(), kind = %kind }, "decode error");
        Err(Error::malformed(self.offset(), kind))
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        let Some(&byte) = self.data.get(self.offset) else {
            return self.fail(DecodeErrorKind::TruncatedData);
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a length field.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset())?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if self.offset.saturating_add(len) > self.data.len() {
            return self.fail(DecodeErrorKind::InsufficientData {
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let tag = self.read_tag()?;
        if tag != expected {
            self.offset -= 1;
            return self.fail(DecodeErrorKind::UnexpectedTag {
                expected,
                actual: tag,
            });
        }
        self.read_length()
    }

    /// Read a BER INTEGER of any size.
    pub fn read_integer(&mut self) -> Result<BigInt> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read integer content given the length.
    pub fn read_integer_value(&mut self, len: usize) -> Result<BigInt> {
        if len == 0 {
            return self.fail(DecodeErrorKind::ZeroLengthInteger);
        }
        let bytes = self.read_bytes(len)?;
        Ok(BigInt::from_signed_bytes_be(&bytes))
    }

    /// Read an INTEGER that must fit in an `i32` (request id, error status).
    pub fn read_i32(&mut self) -> Result<i32> {
        let start = self.offset();
        let value = self.read_integer()?;
        i32::try_from(&value).map_err(|_| {
            tracing::debug!(target: "mibwalk::ber", { snmp.offset = start, value = %value }, "integer does not fit in i32");
            Error::malformed(start, DecodeErrorKind::IntegerOverflow)
        })
    }

    /// Read unsigned content (application integers), ignoring the sign bit.
    ///
    /// Returned as a `BigInt` so the caller can wrap or clamp to its width.
    pub fn read_unsigned_value(&mut self, len: usize) -> Result<BigInt> {
        if len == 0 {
            return self.fail(DecodeErrorKind::ZeroLengthInteger);
        }
        let bytes = self.read_bytes(len)?;
        Ok(BigInt::from_bytes_be(num_bigint::Sign::Plus, &bytes))
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        self.read_null_value(len)
    }

    /// Check NULL content length.
    pub fn read_null_value(&mut self, len: usize) -> Result<()> {
        if len != 0 {
            return self.fail(DecodeErrorKind::InvalidNull);
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read OID content given the length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let start = self.offset();
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match *e {
            Error::MalformedEncoding { offset, kind } => Error::malformed(start + offset, kind),
            _ => e,
        })
    }

    /// Read IpAddress content given the length.
    pub fn read_ip_address_value(&mut self, len: usize) -> Result<[u8; 4]> {
        if len != 4 {
            return self.fail(DecodeErrorKind::InvalidIpAddressLength { length: len });
        }
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        let len = self.expect_tag(tag::universal::SEQUENCE)?;
        self.sub_decoder(len)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Nesting depth of this decoder; 0 for the outermost buffer.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Split off the next `len` bytes as an independent decoder one level
    /// deeper.
    ///
    /// Fails with [`DecodeErrorKind::NestingTooDeep`] past [`MAX_DEPTH`].
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        if self.depth >= MAX_DEPTH {
            return self.fail(DecodeErrorKind::NestingTooDeep { max: MAX_DEPTH });
        }
        let base = self.offset();
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
            base,
            depth: self.depth + 1,
        })
    }

    /// Fail if any bytes remain.
    pub fn finish(&self) -> Result<()> {
        if !self.is_empty() {
            return self.fail(DecodeErrorKind::TrailingData {
                length: self.remaining(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed_kind(err: Box<Error>) -> DecodeErrorKind {
        match *err {
            Error::MalformedEncoding { kind, .. } => kind,
            other => panic!("expected MalformedEncoding, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_integer() {
        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0x00]);
        assert_eq!(dec.read_integer().unwrap(), BigInt::from(0));

        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0x00, 0x80]);
        assert_eq!(dec.read_integer().unwrap(), BigInt::from(128));

        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0x80]);
        assert_eq!(dec.read_integer().unwrap(), BigInt::from(-128));
    }

    #[test]
    fn test_wide_integer_kept_whole() {
        // 2^40, wider than any machine integer SNMPv1 defines
        let mut dec = Decoder::from_slice(&[0x02, 0x06, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(dec.read_integer().unwrap(), BigInt::from(1u64 << 40));
    }

    #[test]
    fn test_accept_non_minimal_integer() {
        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0x00, 0x7F]);
        assert_eq!(dec.read_i32().unwrap(), 127);

        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0xFF, 0xFF]);
        assert_eq!(dec.read_i32().unwrap(), -1);
    }

    #[test]
    fn test_read_i32_overflow() {
        let mut dec = Decoder::from_slice(&[0x02, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05]);
        let err = dec.read_i32().unwrap_err();
        assert_eq!(malformed_kind(err), DecodeErrorKind::IntegerOverflow);
    }

    #[test]
    fn test_zero_length_integer() {
        let mut dec = Decoder::from_slice(&[0x02, 0x00]);
        let err = dec.read_integer().unwrap_err();
        assert_eq!(malformed_kind(err), DecodeErrorKind::ZeroLengthInteger);
    }

    #[test]
    fn test_decode_oid() {
        let mut dec = Decoder::from_slice(&[0x06, 0x03, 0x2B, 0x06, 0x01]);
        assert_eq!(dec.read_oid().unwrap().arcs(), &[1, 3, 6, 1]);
    }

    #[test]
    fn test_decode_sequence() {
        let mut dec = Decoder::from_slice(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
        let mut seq = dec.read_sequence().unwrap();
        assert_eq!(seq.read_i32().unwrap(), 1);
        assert_eq!(seq.read_i32().unwrap(), 2);
        assert!(seq.is_empty());
        assert!(dec.is_empty());
    }

    #[test]
    fn test_sub_decoder_reports_absolute_offset() {
        // SEQUENCE { OCTET STRING claiming 9 bytes with only 1 present }
        let mut dec = Decoder::from_slice(&[0x30, 0x03, 0x04, 0x09, 0x41]);
        let mut seq = dec.read_sequence().unwrap();
        let err = seq.read_octet_string().unwrap_err();
        match *err {
            Error::MalformedEncoding { offset, kind } => {
                assert_eq!(offset, 4);
                assert!(matches!(kind, DecodeErrorKind::InsufficientData { needed: 9, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_tag() {
        let mut dec = Decoder::from_slice(&[0x04, 0x00]);
        let err = dec.read_null().unwrap_err();
        assert_eq!(
            malformed_kind(err),
            DecodeErrorKind::UnexpectedTag {
                expected: 0x05,
                actual: 0x04
            }
        );
    }

    #[test]
    fn test_trailing_data() {
        let mut dec = Decoder::from_slice(&[0x05, 0x00, 0xFF]);
        dec.read_null().unwrap();
        let err = dec.finish().unwrap_err();
        assert_eq!(
            malformed_kind(err),
            DecodeErrorKind::TrailingData { length: 1 }
        );
    }

    #[test]
    fn test_nesting_capped() {
        // MAX_DEPTH + 1 empty SEQUENCEs, each wrapping the next
        let mut data = vec![0x30, 0x00];
        for _ in 0..MAX_DEPTH {
            let len = data.len() as u8;
            data.insert(0, len);
            data.insert(0, 0x30);
        }
        let mut dec = Decoder::from_slice(&data[..]);
        let mut levels = 0;
        let err = loop {
            match dec.read_sequence() {
                Ok(inner) => {
                    dec = inner;
                    levels += 1;
                }
                Err(e) => break e,
            }
        };
        assert_eq!(levels, MAX_DEPTH);
        assert_eq!(dec.depth(), MAX_DEPTH);
        assert_eq!(
            malformed_kind(err),
            DecodeErrorKind::NestingTooDeep { max: MAX_DEPTH }
        );
    }
}
