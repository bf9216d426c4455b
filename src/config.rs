//! Named defaults shared by the communicator, the walk engine and the CLI.

use std::time::Duration;

/// Standard SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;

/// Read community used when none is given.
pub const DEFAULT_COMMUNITY: &str = "public";

/// How long a single GetNext waits for its response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(4000);

/// Version field carried by every message (SNMPv1).
pub const SNMP_VERSION: i32 = 0;

/// Name-path prefixes removed from display OIDs, tried in order.
///
/// The first one that matches is stripped; at most one is removed.
pub const STRIP_PREFIXES: &[&str] = &[
    "iso.org.dod.internet.mgmt.mib-2.",
    "iso.org.dod.internet.private.enterprises.",
];

/// Receive buffer size for response datagrams.
///
/// SNMPv1 agents must accept 484-byte messages; real responses are often
/// larger, so leave room for a full UDP payload.
pub const RECV_BUFFER_SIZE: usize = 65535;
