//! SNMPv1 message wrapper.
//!
//! A message pairs a community string with one PDU. Only version 0 is
//! accepted on decode.

mod community;

pub use community::CommunityMessage;
