//! Community-based SNMPv1 message.
//!
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf};
use crate::config::SNMP_VERSION;
use crate::error::{DecodeContext, DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;

/// An SNMPv1 message: community string plus one PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityMessage {
    /// Community string for authentication.
    pub community: Bytes,
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Create a new message.
    pub fn new(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            community: community.into(),
            pdu,
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::with_capacity(64 + self.community.len());

        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_i32(SNMP_VERSION);
        });

        buf.finish()
    }

    /// Decode a complete datagram.
    ///
    /// Bytes after the outer SEQUENCE are rejected.
    pub fn decode(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let msg = Self::decode_from(&mut decoder)?;
        decoder.finish().field("message")?;
        Ok(msg)
    }

    pub(crate) fn decode_from(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence().field("message")?;

        let version_offset = seq.offset();
        let version = seq.read_i32().field("version")?;
        if version != SNMP_VERSION {
            tracing::debug!(target: "mibwalk::ber", { snmp.offset = version_offset, snmp.version = version }, "unsupported SNMP version");
            return Err(Error::ProtocolDecode {
                field: "version",
                source: Error::malformed(version_offset, DecodeErrorKind::UnknownVersion(version)),
            }
            .boxed());
        }

        let community = seq.read_octet_string().field("community")?;
        let pdu = Pdu::decode(&mut seq)?;
        seq.finish().field("message")?;

        Ok(CommunityMessage { community, pdu })
    }

    /// Consume and return the PDU.
    pub fn into_pdu(self) -> Pdu {
        self.pdu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::PduType;

    fn decode_err_field(data: &'static [u8]) -> &'static str {
        match *CommunityMessage::decode(Bytes::from_static(data)).unwrap_err() {
            Error::ProtocolDecode { field, .. } => field,
            ref other => panic!("expected ProtocolDecode, got {:?}", other),
        }
    }

    #[test]
    fn test_roundtrip() {
        let pdu = Pdu::get_next_request(42, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]);
        let msg = CommunityMessage::new(b"public".as_slice(), pdu);

        let decoded = CommunityMessage::decode(msg.encode()).unwrap();

        assert_eq!(decoded.community.as_ref(), b"public");
        assert_eq!(decoded.pdu.pdu_type, PduType::GetNextRequest);
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_version_field_is_zero() {
        let msg = CommunityMessage::new("c", Pdu::get_request(1, &[]));
        let encoded = msg.encode();
        // SEQUENCE header, then INTEGER 0
        assert_eq!(&encoded[2..5], &[0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_rejects_v2c() {
        let err = CommunityMessage::decode(Bytes::from_static(&[
            0x30, 0x03, 0x02, 0x01, 0x01,
        ]))
        .unwrap_err();
        match *err {
            Error::ProtocolDecode { field, ref source } => {
                assert_eq!(field, "version");
                assert!(matches!(
                    **source,
                    Error::MalformedEncoding {
                        offset: 2,
                        kind: DecodeErrorKind::UnknownVersion(1)
                    }
                ));
            }
            ref other => panic!("expected ProtocolDecode, got {:?}", other),
        }
    }

    #[test]
    fn test_innermost_field_reported() {
        assert_eq!(decode_err_field(&[0x04, 0x00]), "message");
        assert_eq!(decode_err_field(&[0x30, 0x03, 0x02, 0x01, 0x00]), "community");
        // community is an INTEGER
        assert_eq!(
            decode_err_field(&[0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]),
            "community"
        );
        // PDU missing
        assert_eq!(
            decode_err_field(&[0x30, 0x05, 0x02, 0x01, 0x00, 0x04, 0x00]),
            "pdu"
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut data = CommunityMessage::new("public", Pdu::get_request(1, &[]))
            .encode()
            .to_vec();
        data.push(0x00);
        let err = CommunityMessage::decode(Bytes::from(data)).unwrap_err();
        assert!(matches!(*err, Error::ProtocolDecode { field: "message", .. }));
    }

    #[test]
    fn test_decode_agent_response() {
        // GetResponse for sysName.0 = "r1"
        let wire = crate::format::hex::decode(
            "30 2B 02 01 00 04 06 70 75 62 6C 69 63 A2 1E 02 04 12 34 56 78 02 01 00 02 01 00
             30 10 30 0E 06 08 2B 06 01 02 01 01 05 00 04 02 72 31",
        )
        .unwrap();

        let msg = CommunityMessage::decode(Bytes::from(wire.clone())).unwrap();
        assert_eq!(msg.community.as_ref(), b"public");
        assert_eq!(msg.pdu.pdu_type, PduType::GetResponse);
        assert_eq!(msg.pdu.request_id, 0x12345678);
        assert_eq!(msg.pdu.varbinds.len(), 1);
        assert_eq!(msg.pdu.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
        assert_eq!(msg.pdu.varbinds[0].value, crate::value::Value::from("r1"));
        assert_eq!(msg.encode().as_ref(), wire.as_slice());
    }

    #[test]
    fn test_deeply_nested_value_rejected() {
        fn wrap(buf: &mut EncodeBuf, tag: u8) {
            let len = buf.len();
            buf.push_length(len);
            buf.push_tag(tag);
        }

        // GetResponse whose only value is 15,000 nested SEQUENCEs
        let mut buf = EncodeBuf::new();
        buf.push_null();
        for _ in 0..15_000 {
            wrap(&mut buf, 0x30);
        }
        buf.push_oid(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
        wrap(&mut buf, 0x30);
        wrap(&mut buf, 0x30);
        buf.push_i32(0);
        buf.push_i32(0);
        buf.push_i32(1);
        wrap(&mut buf, crate::ber::tag::pdu::GET_RESPONSE);
        buf.push_octet_string(b"public");
        buf.push_i32(0);
        wrap(&mut buf, 0x30);

        let err = CommunityMessage::decode(buf.finish()).unwrap_err();
        assert!(err.is_decode());
        let mut inner: &Error = &err;
        while let Error::ProtocolDecode { source, .. } = inner {
            inner = source.as_ref();
        }
        assert!(
            matches!(
                inner,
                Error::MalformedEncoding {
                    kind: DecodeErrorKind::NestingTooDeep { .. },
                    ..
                }
            ),
            "{:?}",
            inner
        );
    }
}
