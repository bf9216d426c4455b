//! Error types for mibwalk.
//!
//! - [`Error`] - the main error type
//! - [`ErrorStatus`] - SNMPv1 error codes returned by agents
//! - [`DecodeErrorKind`] - why a BER decode failed
//! - [`TreeErrorKind`] - why a MIB tree could not be built
//!
//! Errors are boxed: `Result<T> = Result<T, Box<Error>>`.
//!
//! ```rust
//! use mibwalk::{Error, Result};
//!
//! fn describe(result: Result<()>) -> String {
//!     match result {
//!         Ok(()) => String::new(),
//!         Err(e) => match &*e {
//!             Error::NoResponse { target, .. } => format!("{} is silent", target),
//!             Error::Agent { status, .. } => format!("agent said {}", status),
//!             other => other.to_string(),
//!         },
//!     }
//! }
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use crate::oid::Oid;

/// Result type alias using the library's boxed Error type.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Reason a walk was aborted by the engine rather than the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAbortReason {
    /// Agent returned an OID that is not greater than the one requested.
    NonIncreasing,
}

impl std::fmt::Display for WalkAbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonIncreasing => write!(f, "non-increasing OID"),
        }
    }
}

/// The main error type for all mibwalk operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Corrupt, truncated or over-long wire bytes.
    #[error("malformed encoding at offset {offset}: {kind}")]
    MalformedEncoding { offset: usize, kind: DecodeErrorKind },

    /// A message field failed to parse.
    #[error("failed to decode {field}: {source}")]
    ProtocolDecode {
        field: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Value shape does not match the SNMP type it was assigned to.
    #[error("{0}")]
    BadValue(Box<str>),

    /// The agent answered with a non-zero error status.
    #[error("agent error: {status} at index {index}{}", .oid.as_ref().map(|o| format!(" ({})", o)).unwrap_or_default())]
    Agent {
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    /// No matching response arrived before the deadline.
    #[error("no response from {target} after {elapsed:?}")]
    NoResponse { target: SocketAddr, elapsed: Duration },

    /// Host name did not resolve to any address.
    #[error("unknown host {host}")]
    UnknownHost {
        host: Box<str>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Malformed OID text.
    #[error("invalid OID: {0}")]
    InvalidOid(Box<str>),

    /// Socket-level failure.
    #[error("I/O error communicating with {target}: {source}")]
    Io {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The transport was closed while a call was pending.
    #[error("transport closed")]
    Closed,

    /// Walk stopped because the agent misbehaved.
    #[error("walk aborted for {target}: {reason}")]
    WalkAborted {
        target: SocketAddr,
        reason: WalkAbortReason,
    },

    /// MIB tree definitions could not be wired together.
    #[error("invalid MIB tree: {0}")]
    Tree(TreeErrorKind),

    /// Operation cancelled by the caller.
    #[error("cancelled")]
    Cancelled,
}

impl Error {
    /// Box this error (convenience for constructing boxed errors).
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub(crate) fn malformed(offset: usize, kind: DecodeErrorKind) -> Box<Self> {
        Self::MalformedEncoding { offset, kind }.boxed()
    }

    pub(crate) fn bad_value(msg: impl Into<Box<str>>) -> Box<Self> {
        Self::BadValue(msg.into()).boxed()
    }

    pub(crate) fn invalid_oid(input: impl Into<Box<str>>) -> Box<Self> {
        Self::InvalidOid(input.into()).boxed()
    }

    /// Whether this error came from parsing wire bytes.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::MalformedEncoding { .. } | Self::ProtocolDecode { .. }
        )
    }
}

/// Attach the name of the message field being parsed to a decode error.
///
/// The innermost field wins: an error that already names a field is passed
/// through unchanged.
pub(crate) trait DecodeContext<T> {
    fn field(self, field: &'static str) -> Result<T>;
}

impl<T> DecodeContext<T> for Result<T> {
    fn field(self, field: &'static str) -> Result<T> {
        self.map_err(|e| match *e {
            Error::ProtocolDecode { .. } => e,
            _ => Error::ProtocolDecode { field, source: e }.boxed(),
        })
    }
}

/// SNMPv1 error status codes (RFC 1157).
///
/// ```
/// use mibwalk::ErrorStatus;
///
/// let status = ErrorStatus::from_i32(2);
/// assert_eq!(status, ErrorStatus::NoSuchName);
/// assert_eq!(status.as_i32(), 2);
/// assert_eq!(status.to_string(), "noSuchName");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorStatus {
    /// status = 0
    NoError,
    /// Response would not fit in a single message (status = 1).
    TooBig,
    /// Requested OID not found, or end of MIB view reached (status = 2).
    NoSuchName,
    /// status = 3
    BadValue,
    /// status = 4
    ReadOnly,
    /// Unspecified agent failure (status = 5).
    GenErr,
    /// Code outside the SNMPv1 range.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            other => {
                tracing::warn!(target: "mibwalk::error", { snmp.error_status = other }, "unknown SNMP error status");
                Self::Unknown(other)
            }
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// Expected a different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Tag byte not part of the SNMPv1 type system.
    UnknownTag(u8),
    /// Data ended inside a TLV.
    TruncatedData,
    /// Indefinite length is not used by SNMP.
    IndefiniteLength,
    /// Length field wider than four octets.
    LengthTooLong { octets: usize },
    /// Length above [`MAX_LENGTH`](crate::ber::MAX_LENGTH).
    LengthExceedsMax { length: usize, max: usize },
    /// Content length runs past the end of the buffer.
    InsufficientData { needed: usize, available: usize },
    /// INTEGER with no content octets.
    ZeroLengthInteger,
    /// Integer does not fit the field it is stored in.
    IntegerOverflow,
    /// NULL with non-zero length.
    InvalidNull,
    /// IpAddress content is not 4 bytes.
    InvalidIpAddressLength { length: usize },
    /// Bad base-128 subidentifier.
    InvalidOidEncoding,
    /// OID longer than [`MAX_OID_LEN`](crate::oid::MAX_OID_LEN).
    OidTooLong { count: usize, max: usize },
    /// Version other than SNMPv1.
    UnknownVersion(i32),
    /// PDU tag not used by SNMPv1 GetRequest/GetNextRequest/GetResponse.
    UnknownPduType(u8),
    /// Bytes left after the outermost TLV.
    TrailingData { length: usize },
    /// VarBind sequence without its value.
    MissingVarBind,
    /// Constructed types nested past [`MAX_DEPTH`](crate::ber::MAX_DEPTH).
    NestingTooDeep { max: usize },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::UnknownTag(t) => write!(f, "unknown tag 0x{:02X}", t),
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::InsufficientData { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::InvalidOidEncoding => write!(f, "invalid OID encoding"),
            Self::OidTooLong { count, max } => {
                write!(f, "OID has {} arcs, maximum is {}", count, max)
            }
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
            Self::TrailingData { length } => write!(f, "{} trailing bytes", length),
            Self::MissingVarBind => write!(f, "response carried no varbind"),
            Self::NestingTooDeep { max } => write!(f, "nesting deeper than {} levels", max),
        }
    }
}

/// Reasons a set of MIB definitions could not become a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TreeErrorKind {
    /// Definitions whose declared parent never appeared, as `(name, parent)`.
    UnresolvedParents(Vec<(String, String)>),
    /// Two siblings share a subidentifier.
    DuplicateSubid { parent: String, subid: u32 },
}

impl std::fmt::Display for TreeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedParents(orphans) => {
                write!(f, "unresolved parents:")?;
                for (name, parent) in orphans {
                    write!(f, " {} (parent {})", name, parent)?;
                }
                Ok(())
            }
            Self::DuplicateSubid { parent, subid } => {
                write!(f, "subidentifier {} used twice under {}", subid, parent)
            }
        }
    }
}
