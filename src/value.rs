//! SNMP value types.
//!
//! [`Value`] is a closed enum over the SNMPv1 type system (RFC 1155) plus
//! Counter64. Every variant maps to one BER tag.

use std::net::Ipv4Addr;

use bytes::Bytes;
use num_bigint::{BigInt, Sign};

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::format;
use crate::oid::Oid;

/// SNMP value.
///
/// Equality and hashing compare contents, byte for byte for octet data.
///
/// The 32-bit application types are stored already reduced to their range.
/// Build them through [`Value::counter32`], [`Value::gauge32`] and friends
/// when the source number may be out of range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER, arbitrary precision.
    Integer(BigInt),

    /// OCTET STRING (arbitrary bytes).
    OctetString(Bytes),

    /// NULL
    Null,

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// SEQUENCE of values.
    Sequence(Vec<Value>),

    /// IpAddress (4 bytes, network order)
    IpAddress([u8; 4]),

    /// Counter32, wraps modulo 2^32.
    Counter32(u32),

    /// Gauge32, pegs at 2^32 - 1.
    Gauge32(u32),

    /// TimeTicks, hundredths of a second.
    TimeTicks(u32),

    /// Opaque, arbitrary BER wrapped in an octet string.
    Opaque(Bytes),

    /// Counter64, wraps modulo 2^64.
    Counter64(u64),
}

/// Input accepted by [`Value::set_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueInput {
    Integer(BigInt),
    Bytes(Bytes),
    Text(String),
    Oid(Oid),
    List(Vec<Value>),
}

impl From<BigInt> for ValueInput {
    fn from(v: BigInt) -> Self {
        Self::Integer(v)
    }
}

macro_rules! integer_input {
    ($($t:ty),*) => {
        $(impl From<$t> for ValueInput {
            fn from(v: $t) -> Self {
                Self::Integer(BigInt::from(v))
            }
        })*
    };
}

integer_input!(i32, i64, i128, u32, u64, u128);

impl From<Bytes> for ValueInput {
    fn from(v: Bytes) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<u8>> for ValueInput {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v.into())
    }
}

impl From<&[u8]> for ValueInput {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<&str> for ValueInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ValueInput {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Oid> for ValueInput {
    fn from(v: Oid) -> Self {
        Self::Oid(v)
    }
}

impl From<Vec<Value>> for ValueInput {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

/// Reduce `value` modulo 2^64, mapping negatives into range.
fn wrap_u64(value: &BigInt) -> u64 {
    let (sign, digits) = value.to_u64_digits();
    let low = digits.first().copied().unwrap_or(0);
    if sign == Sign::Minus {
        low.wrapping_neg()
    } else {
        low
    }
}

/// Reduce `value` modulo 2^32.
fn wrap_u32(value: &BigInt) -> u32 {
    wrap_u64(value) as u32
}

/// Clamp `value` into `0..=u32::MAX`.
fn clamp_u32(value: &BigInt) -> u32 {
    u32::try_from(value).unwrap_or(if value.sign() == Sign::Minus {
        0
    } else {
        u32::MAX
    })
}

impl Value {
    /// Build an INTEGER.
    pub fn integer(value: impl Into<BigInt>) -> Self {
        Value::Integer(value.into())
    }

    /// Build a Counter32, reducing the value modulo 2^32.
    ///
    /// ```
    /// use mibwalk::Value;
    ///
    /// assert_eq!(Value::counter32(1u64 << 32), Value::Counter32(0));
    /// assert_eq!(Value::counter32((1u64 << 32) + 5), Value::Counter32(5));
    /// assert_eq!(Value::counter32(-1), Value::Counter32(u32::MAX));
    /// ```
    pub fn counter32(value: impl Into<BigInt>) -> Self {
        Value::Counter32(wrap_u32(&value.into()))
    }

    /// Build a Gauge32, pegging at 2^32 - 1 (and at 0 from below).
    ///
    /// ```
    /// use mibwalk::Value;
    ///
    /// assert_eq!(Value::gauge32((1u64 << 32) + 5), Value::Gauge32(u32::MAX));
    /// ```
    pub fn gauge32(value: impl Into<BigInt>) -> Self {
        Value::Gauge32(clamp_u32(&value.into()))
    }

    /// Build TimeTicks, reducing modulo 2^32.
    pub fn time_ticks(value: impl Into<BigInt>) -> Self {
        Value::TimeTicks(wrap_u32(&value.into()))
    }

    /// Build a Counter64, reducing modulo 2^64.
    pub fn counter64(value: impl Into<BigInt>) -> Self {
        Value::Counter64(wrap_u64(&value.into()))
    }

    /// Short type name, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::OctetString(_) => "OctetString",
            Value::Null => "Null",
            Value::ObjectIdentifier(_) => "ObjectIdentifier",
            Value::Sequence(_) => "Sequence",
            Value::IpAddress(_) => "IpAddress",
            Value::Counter32(_) => "Counter32",
            Value::Gauge32(_) => "Gauge32",
            Value::TimeTicks(_) => "TimeTicks",
            Value::Opaque(_) => "Opaque",
            Value::Counter64(_) => "Counter64",
        }
    }

    /// BER tag of this variant.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Integer(_) => tag::universal::INTEGER,
            Value::OctetString(_) => tag::universal::OCTET_STRING,
            Value::Null => tag::universal::NULL,
            Value::ObjectIdentifier(_) => tag::universal::OBJECT_IDENTIFIER,
            Value::Sequence(_) => tag::universal::SEQUENCE,
            Value::IpAddress(_) => tag::application::IP_ADDRESS,
            Value::Counter32(_) => tag::application::COUNTER32,
            Value::Gauge32(_) => tag::application::GAUGE32,
            Value::TimeTicks(_) => tag::application::TIMETICKS,
            Value::Opaque(_) => tag::application::OPAQUE,
            Value::Counter64(_) => tag::application::COUNTER64,
        }
    }

    /// Replace the contents, keeping the variant.
    ///
    /// Fails with [`Error::BadValue`] when the input has the wrong shape for
    /// this type. Numeric types also accept decimal text; counters wrap and
    /// gauges clamp as their constructors do.
    ///
    /// ```
    /// use mibwalk::{Error, Value};
    ///
    /// let mut v = Value::Counter32(0);
    /// v.set_value("4294967301").unwrap();
    /// assert_eq!(v, Value::Counter32(5));
    ///
    /// let mut s = Value::OctetString("x".into());
    /// let err = s.set_value(7).unwrap_err();
    /// assert!(matches!(*err, Error::BadValue(_)));
    /// ```
    pub fn set_value(&mut self, input: impl Into<ValueInput>) -> Result<()> {
        let input = input.into();
        let type_name = self.type_name();
        let bad = || Error::bad_value(format!("{}: bad object supplied to set value", type_name));

        let number = |input: &ValueInput| -> Option<BigInt> {
            match input {
                ValueInput::Integer(n) => Some(n.clone()),
                ValueInput::Text(s) => s.trim().parse::<BigInt>().ok(),
                _ => None,
            }
        };

        let next = match (&*self, input) {
            (Value::Integer(_), ref i) => Value::Integer(number(i).ok_or_else(bad)?),
            (Value::Counter32(_), ref i) => Value::Counter32(wrap_u32(&number(i).ok_or_else(bad)?)),
            (Value::Gauge32(_), ref i) => Value::Gauge32(clamp_u32(&number(i).ok_or_else(bad)?)),
            (Value::TimeTicks(_), ref i) => Value::TimeTicks(wrap_u32(&number(i).ok_or_else(bad)?)),
            (Value::Counter64(_), ref i) => Value::Counter64(wrap_u64(&number(i).ok_or_else(bad)?)),
            (Value::OctetString(_), ValueInput::Bytes(b)) => Value::OctetString(b),
            (Value::OctetString(_), ValueInput::Text(s)) => Value::OctetString(s.into()),
            (Value::Opaque(_), ValueInput::Bytes(b)) => Value::Opaque(b),
            (Value::Opaque(_), ValueInput::Text(s)) => Value::Opaque(s.into()),
            (Value::IpAddress(_), ValueInput::Bytes(b)) => {
                let octets: [u8; 4] = b.as_ref().try_into().map_err(|_| bad())?;
                Value::IpAddress(octets)
            }
            (Value::IpAddress(_), ValueInput::Text(s)) => {
                let addr: Ipv4Addr = s.trim().parse().map_err(|_| bad())?;
                Value::IpAddress(addr.octets())
            }
            (Value::ObjectIdentifier(_), ValueInput::Oid(oid)) => {
                oid.validate().map_err(|_| bad())?;
                Value::ObjectIdentifier(oid)
            }
            (Value::ObjectIdentifier(_), ValueInput::Text(s)) => {
                Value::ObjectIdentifier(Oid::parse(&s).map_err(|_| bad())?)
            }
            (Value::Sequence(_), ValueInput::List(items)) => Value::Sequence(items),
            _ => return Err(bad()),
        };

        *self = next;
        Ok(())
    }

    /// Integer content, for Integer variants only.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Integer content as an `i64`, when it fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|v| i64::try_from(v).ok())
    }

    /// Unsigned content of the 32-bit application types.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            _ => None,
        }
    }

    /// Raw bytes of OctetString and Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) | Value::Opaque(v) => Some(v),
            _ => None,
        }
    }

    /// OctetString content as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::OctetString(v) => std::str::from_utf8(v).ok(),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<Ipv4Addr> {
        match self {
            Value::IpAddress(octets) => Some(Ipv4Addr::from(*octets)),
            _ => None,
        }
    }

    /// Encode into a BER buffer.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::Sequence(items) => buf.push_sequence(|buf| {
                for item in items.iter().rev() {
                    item.encode(buf);
                }
            }),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Counter32(v) => buf.push_unsigned(tag::application::COUNTER32, u64::from(*v)),
            Value::Gauge32(v) => buf.push_unsigned(tag::application::GAUGE32, u64::from(*v)),
            Value::TimeTicks(v) => buf.push_unsigned(tag::application::TIMETICKS, u64::from(*v)),
            Value::Opaque(data) => buf.push_tagged_bytes(tag::application::OPAQUE, data),
            Value::Counter64(v) => buf.push_unsigned(tag::application::COUNTER64, *v),
        }
    }

    /// Decode one value from a BER decoder.
    ///
    /// Unknown tags are rejected rather than preserved.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let tag_offset = decoder.offset();
        let tag = decoder.read_tag()?;
        let len = decoder.read_length()?;

        match tag {
            tag::universal::INTEGER => Ok(Value::Integer(decoder.read_integer_value(len)?)),
            tag::universal::OCTET_STRING => Ok(Value::OctetString(decoder.read_bytes(len)?)),
            tag::universal::NULL => {
                decoder.read_null_value(len)?;
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => {
                Ok(Value::ObjectIdentifier(decoder.read_oid_value(len)?))
            }
            tag::universal::SEQUENCE => {
                let mut seq = decoder.sub_decoder(len)?;
                let mut items = Vec::new();
                while !seq.is_empty() {
                    items.push(Value::decode(&mut seq)?);
                }
                Ok(Value::Sequence(items))
            }
            tag::application::IP_ADDRESS => {
                Ok(Value::IpAddress(decoder.read_ip_address_value(len)?))
            }
            tag::application::COUNTER32 => {
                Ok(Value::Counter32(wrap_u32(&decoder.read_unsigned_value(len)?)))
            }
            tag::application::GAUGE32 => {
                Ok(Value::Gauge32(clamp_u32(&decoder.read_unsigned_value(len)?)))
            }
            tag::application::TIMETICKS => {
                Ok(Value::TimeTicks(wrap_u32(&decoder.read_unsigned_value(len)?)))
            }
            tag::application::OPAQUE => Ok(Value::Opaque(decoder.read_bytes(len)?)),
            tag::application::COUNTER64 => {
                Ok(Value::Counter64(wrap_u64(&decoder.read_unsigned_value(len)?)))
            }
            other => {
                tracing::debug!(target: "mibwalk::ber", { snmp.offset = tag_offset, tag = other }, "unknown value tag");
                Err(Error::malformed(tag_offset, DecodeErrorKind::UnknownTag(other)))
            }
        }
    }

    /// Encode this value as a standalone TLV.
    pub fn to_ber(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.finish()
    }

    /// Decode exactly one value occupying all of `data`.
    pub fn from_ber(data: Bytes) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let value = Value::decode(&mut decoder)?;
        decoder.finish()?;
        Ok(value)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => f.write_str(&format::display_octets(data)),
            Value::Null => f.write_str("Null"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::Sequence(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
            Value::IpAddress(octets) => write!(f, "{}", Ipv4Addr::from(*octets)),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Opaque(data) => f.write_str(&format::hex::spaced_upper(data)),
            Value::Counter64(v) => write!(f, "{}", v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(BigInt::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(BigInt::from(v))
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Value::OctetString(Bytes::copy_from_slice(data))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<Ipv4Addr> for Value {
    fn from(addr: Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}
