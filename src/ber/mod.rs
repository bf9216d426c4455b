//! BER (Basic Encoding Rules) codec for the SNMPv1 subset of ASN.1.
//!
//! Encoding writes backwards into an [`EncodeBuf`] so constructed types can be
//! emitted without knowing their content length up front. Decoding reads
//! forwards from a [`Decoder`] over shared [`bytes::Bytes`].

mod decode;
mod encode;
mod length;

pub use decode::{Decoder, MAX_DEPTH};
pub use encode::EncodeBuf;
pub use length::{MAX_LENGTH, decode_length, encode_length};

/// Tag constants used by SNMPv1.
pub mod tag {
    /// Universal class tags.
    pub mod universal {
        pub const INTEGER: u8 = 0x02;
        pub const OCTET_STRING: u8 = 0x04;
        pub const NULL: u8 = 0x05;
        pub const OBJECT_IDENTIFIER: u8 = 0x06;
        pub const SEQUENCE: u8 = 0x30;
    }

    /// Application class tags (RFC 1155, plus Counter64 from RFC 2578).
    pub mod application {
        pub const IP_ADDRESS: u8 = 0x40;
        pub const COUNTER32: u8 = 0x41;
        pub const GAUGE32: u8 = 0x42;
        pub const TIMETICKS: u8 = 0x43;
        pub const OPAQUE: u8 = 0x44;
        pub const COUNTER64: u8 = 0x46;
    }

    /// Context-specific constructed tags carrying the PDU kind.
    pub mod pdu {
        pub const GET_REQUEST: u8 = 0xA0;
        pub const GET_NEXT_REQUEST: u8 = 0xA1;
        pub const GET_RESPONSE: u8 = 0xA2;
    }
}
