//! SNMPv1 Protocol Data Units.
//!
//! The PDU is an implicitly tagged SEQUENCE of request id, error status,
//! error index and the VarBind list. Its tag selects the operation.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeContext, DecodeErrorKind, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = tag::pdu::GET_REQUEST,
    GetNextRequest = tag::pdu::GET_NEXT_REQUEST,
    GetResponse = tag::pdu::GET_RESPONSE,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::GET_RESPONSE => Some(Self::GetResponse),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::GetResponse => write!(f, "GetResponse"),
        }
    }
}

/// An SNMPv1 request or response PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    pub pdu_type: PduType,
    /// Correlates a response with its request.
    pub request_id: i32,
    /// Always 0 on requests.
    pub error_status: i32,
    /// 1-based index of the offending varbind, 0 when not applicable.
    pub error_index: i32,
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    fn request(pdu_type: PduType, request_id: i32, oids: &[Oid]) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        }
    }

    /// GetRequest for the given OIDs, each bound to NULL.
    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(PduType::GetRequest, request_id, oids)
    }

    /// GetNextRequest for the given OIDs, each bound to NULL.
    ///
    /// ```
    /// use mibwalk::{oid, pdu::{Pdu, PduType}};
    ///
    /// let pdu = Pdu::get_next_request(7, &[oid!(1, 3, 6, 1, 2, 1, 1)]);
    /// assert_eq!(pdu.pdu_type, PduType::GetNextRequest);
    /// assert_eq!((pdu.error_status, pdu.error_index), (0, 0));
    /// ```
    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(PduType::GetNextRequest, request_id, oids)
    }

    /// GetResponse carrying the given bindings with no error.
    pub fn get_response(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type: PduType::GetResponse,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_i32(self.error_index);
            buf.push_i32(self.error_status);
            buf.push_i32(self.request_id);
        });
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let tag_offset = decoder.offset();
        let tag = decoder.read_tag().field("pdu")?;
        let Some(pdu_type) = PduType::from_tag(tag) else {
            tracing::debug!(target: "mibwalk::ber", { snmp.offset = tag_offset, snmp.pdu_tag = tag }, "unknown PDU type");
            return Err(Error::ProtocolDecode {
                field: "pdu",
                source: Error::malformed(tag_offset, DecodeErrorKind::UnknownPduType(tag)),
            }
            .boxed());
        };

        let len = decoder.read_length().field("pdu")?;
        let mut body = decoder.sub_decoder(len).field("pdu")?;

        let request_id = body.read_i32().field("request-id")?;
        let error_status = body.read_i32().field("error-status")?;
        let error_index = body.read_i32().field("error-index")?;
        let varbinds = decode_varbind_list(&mut body)?;
        body.finish().field("pdu")?;

        Ok(Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    /// Whether the agent reported an error.
    pub fn is_error(&self) -> bool {
        self.error_status != 0
    }

    /// Get the error status as an enum.
    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }

    /// The request OID an error index points at, if any.
    ///
    /// The index is 1-based; 0 and out-of-range indices yield `None`.
    pub fn errored_oid<'a>(&self, request: &'a [VarBind]) -> Option<&'a Oid> {
        let index = usize::try_from(self.error_index).ok()?.checked_sub(1)?;
        request.get(index).map(|vb| &vb.oid)
    }
}
