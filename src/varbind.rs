//! Variable binding (VarBind) type.
//!
//! A VarBind is a SEQUENCE of exactly two elements: an OBJECT IDENTIFIER and
//! a value. A VarBindList is a SEQUENCE of VarBinds.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeContext, DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value, as carried by requests.
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence().field("varbind")?;
        let oid = seq.read_oid().field("name")?;
        if seq.is_empty() {
            return Err(Error::ProtocolDecode {
                field: "value",
                source: Error::malformed(seq.offset(), DecodeErrorKind::MissingVarBind),
            }
            .boxed());
        }
        let value = Value::decode(&mut seq).field("value")?;
        seq.finish().field("varbind")?;
        Ok(VarBind { oid, value })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

impl From<VarBind> for Value {
    fn from(vb: VarBind) -> Self {
        Value::Sequence(vec![Value::ObjectIdentifier(vb.oid), vb.value])
    }
}

impl TryFrom<Value> for VarBind {
    type Error = Box<Error>;

    /// Accepts a two-element Sequence whose first element is an OID.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Sequence(items) => match <[Value; 2]>::try_from(items) {
                Ok([Value::ObjectIdentifier(oid), value]) => Ok(VarBind { oid, value }),
                _ => Err(Error::bad_value("VarBind: expected (ObjectIdentifier, value) pair")),
            },
            other => Err(Error::bad_value(format!(
                "VarBind: expected Sequence, got {}",
                other.type_name()
            ))),
        }
    }
}

/// Encodes a list of VarBinds as a SEQUENCE of VarBind SEQUENCEs.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| {
        for vb in varbinds.iter().rev() {
            vb.encode(buf);
        }
    });
}

/// Decodes a VarBind list.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    let mut seq = decoder.read_sequence().field("varbind-list")?;
    let mut varbinds = Vec::with_capacity((seq.remaining() / 16).max(1));

    while !seq.is_empty() {
        varbinds.push(VarBind::decode(&mut seq)?);
    }

    Ok(varbinds)
}
