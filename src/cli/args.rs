//! Command-line arguments for the `mibwalk` tool.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{DEFAULT_COMMUNITY, DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::walk::WalkRequest;

/// Walk an SNMPv1 subtree and print it through a MIB tree.
#[derive(Debug, Parser)]
#[command(name = "mibwalk", version, about)]
pub struct WalkArgs {
    /// JSON file with MIB object definitions, loaded on top of the
    /// standard registration arcs.
    #[arg(short = 'm', long = "mib", value_name = "FILE")]
    pub mib: Option<PathBuf>,

    /// Agent UDP port.
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = DEFAULT_COMMUNITY)]
    pub community: String,

    /// Per-request timeout in milliseconds.
    #[arg(short = 't', long = "timeout", default_value_t = DEFAULT_TIMEOUT.as_millis() as u64)]
    pub timeout_ms: u64,

    /// Enable debug logging (mibwalk=debug).
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Agent host name or address.
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Subtree to walk, numeric or by name (e.g. `system`, `ifTable.1`).
    #[arg(value_name = "OID")]
    pub oid: String,
}

impl WalkArgs {
    /// Initialize tracing on stderr. `RUST_LOG` overrides the default level.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let default = if self.verbose {
            "mibwalk=debug"
        } else {
            "mibwalk=warn"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The walk these arguments describe.
    pub fn walk_request(&self) -> WalkRequest {
        WalkRequest::new(self.host.clone(), self.oid.clone())
            .port(self.port)
            .community(self.community.clone())
            .timeout(self.timeout())
    }
}
