//! BER encoding.
//!
//! [`EncodeBuf`] is filled back to front: the content of a TLV is pushed
//! first, then its length, then its tag. [`EncodeBuf::finish`] reverses the
//! buffer once at the end.

use bytes::Bytes;
use num_bigint::BigInt;

use super::length::encode_length;
use super::tag;
use crate::oid::Oid;

/// Reverse-order BER encode buffer.
#[derive(Debug, Default)]
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Prepend a single byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Prepend `data`, keeping its forward order on the wire.
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buf.extend(data.iter().rev());
    }

    /// Prepend a BER length.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, n) = encode_length(len);
        self.buf.extend_from_slice(&bytes[..n]);
    }

    /// Prepend a tag byte.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Prepend a complete primitive TLV.
    pub fn push_tagged_bytes(&mut self, tag: u8, content: &[u8]) {
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Prepend an INTEGER of any size, minimal two's complement.
    pub fn push_integer(&mut self, value: &BigInt) {
        let bytes = value.to_signed_bytes_be();
        if bytes.is_empty() {
            self.push_tagged_bytes(tag::universal::INTEGER, &[0]);
        } else {
            self.push_tagged_bytes(tag::universal::INTEGER, &bytes);
        }
    }

    /// Prepend an INTEGER from a machine integer (request ids, status codes).
    pub fn push_i32(&mut self, value: i32) {
        let bytes = value.to_be_bytes();
        // Skip redundant sign bytes.
        let mut start = 0;
        while start < 3 {
            let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
                || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        self.push_tagged_bytes(tag::universal::INTEGER, &bytes[start..]);
    }

    /// Prepend an unsigned application integer (Counter32, Gauge32, TimeTicks, Counter64).
    ///
    /// A leading zero byte is added when the high bit of the first
    /// significant byte is set, so the value never reads back negative.
    pub fn push_unsigned(&mut self, tag: u8, value: u64) {
        let bytes = value.to_be_bytes();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(7);
        let content = &bytes[first..];
        let before = self.len();
        self.push_bytes(content);
        if content[0] & 0x80 != 0 {
            self.push_byte(0);
        }
        self.push_length(self.len() - before);
        self.push_tag(tag);
    }

    /// Prepend an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_tagged_bytes(tag::universal::OCTET_STRING, data);
    }

    /// Prepend a NULL.
    pub fn push_null(&mut self) {
        self.push_length(0);
        self.push_tag(tag::universal::NULL);
    }

    /// Prepend an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) {
        self.push_tagged_bytes(tag::universal::OBJECT_IDENTIFIER, &oid.to_ber_smallvec());
    }

    /// Prepend an IpAddress.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_tagged_bytes(tag::application::IP_ADDRESS, &addr);
    }

    /// Prepend a constructed TLV whose content is written by `f`.
    ///
    /// Because the buffer grows backwards, `f` must push the children in
    /// reverse order.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let before = self.len();
        f(self);
        self.push_length(self.len() - before);
        self.push_tag(tag);
    }

    /// Prepend a SEQUENCE whose content is written by `f`.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Finish encoding and return the bytes in wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}
