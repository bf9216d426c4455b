//! # mibwalk
//!
//! Async SNMPv1 subtree walker.
//!
//! ## Features
//!
//! - BER codec for SNMPv1 messages, with field-level decode errors
//! - Closed [`Value`] enum with arbitrary-precision integers
//! - Immutable MIB object tree with exact and nearest-match lookup
//! - GetNext walk engine with cancellation, state tracking and event fan-out
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mibwalk::mib::{MibObject, MibObjectDef, MibTreeBuilder};
//! use mibwalk::walk::{WalkEvent, WalkRequest, spawn_walk};
//!
//! #[tokio::main]
//! async fn main() -> mibwalk::Result<()> {
//!     let mut builder = MibTreeBuilder::with_standard_roots();
//!     builder
//!         .define(MibObjectDef::under("mib-2", MibObject::new("system", 1)))
//!         .define(MibObjectDef::under("system", MibObject::new("sysDescr", 1)));
//!     let tree = Arc::new(builder.build()?);
//!
//!     let request = WalkRequest::new("192.168.1.1", "system").community("public");
//!     let mut walk = spawn_walk(request, tree);
//!     while let Some(event) = walk.events().recv().await {
//!         if let WalkEvent::Result(result) = event {
//!             println!("{}", result);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Single requests
//!
//! ```rust,no_run
//! use mibwalk::{Communicator, oid};
//! use std::time::Duration;
//!
//! # async fn example() -> mibwalk::Result<()> {
//! let comm = Communicator::open("192.168.1.1", 161, "public", Duration::from_secs(4)).await?;
//! let next = comm.get_next(&oid!(1, 3, 6, 1, 2, 1, 1)).await?;
//! println!("{:?}", next);
//! # Ok(())
//! # }
//! ```

pub mod ber;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod message;
pub mod mib;
pub mod oid;
pub mod pdu;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod walk;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use client::{Communicator, CommunicatorConfig};
pub use error::{DecodeErrorKind, Error, ErrorStatus, Result, TreeErrorKind};
pub use mib::{MatchPolicy, MibTree, MibTreeBuilder, NodeId};
pub use oid::Oid;
pub use pdu::{Pdu, PduType};
pub use transport::{Connector, Transport, UdpConnector, UdpTransport};
pub use value::Value;
pub use varbind::VarBind;
pub use walk::{
    WalkEvent, WalkHandle, WalkListener, WalkOutcome, WalkRequest, WalkResult, WalkState,
    spawn_walk,
};
