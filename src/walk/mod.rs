//! Subtree walk engine.
//!
//! A walk issues GetNext requests from a base OID until the agent returns an
//! OID outside the base subtree. Each binding inside the subtree is rendered
//! through the [`MibTree`] and published as a [`WalkEvent::Result`].
//!
//! Every walk runs in its own task and reports through a [`WalkHandle`]:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mibwalk::mib::MibTreeBuilder;
//! use mibwalk::walk::{WalkEvent, WalkRequest, spawn_walk};
//!
//! # async fn example() -> mibwalk::Result<()> {
//! let tree = Arc::new(MibTreeBuilder::with_standard_roots().build()?);
//! let mut handle = spawn_walk(WalkRequest::new("192.0.2.1", "1.3.6.1.2.1.1"), tree);
//!
//! while let Some(event) = handle.events().recv().await {
//!     match event {
//!         WalkEvent::Result(result) => println!("{}", result),
//!         WalkEvent::Terminated { message } if !message.is_empty() => eprintln!("{}", message),
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod format;
mod listener;

pub use format::{display_oid, display_value};
pub use listener::{WalkListener, dispatch};

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::instrument;

use crate::client::{Communicator, CommunicatorConfig};
use crate::config::{DEFAULT_COMMUNITY, DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::error::{DecodeErrorKind, Error, Result, WalkAbortReason};
use crate::mib::MibTree;
use crate::oid::Oid;
use crate::transport::{Connector, Transport, UdpConnector};

/// What to walk and how to reach it.
#[derive(Debug, Clone)]
pub struct WalkRequest {
    host: String,
    port: u16,
    community: Bytes,
    timeout: Duration,
    base_oid: String,
}

impl WalkRequest {
    /// Walk `base_oid` on `host` with the default port, community and
    /// timeout.
    ///
    /// `base_oid` may be numeric (`1.3.6.1.2.1.1`), start with a tree name
    /// (`system`, `ifTable.1`) or mix both. Leading and trailing dots are
    /// ignored.
    pub fn new(host: impl Into<String>, base_oid: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            community: Bytes::from_static(DEFAULT_COMMUNITY.as_bytes()),
            timeout: DEFAULT_TIMEOUT,
            base_oid: base_oid.into(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.community = community.into();
        self
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_oid(&self) -> &str {
        &self.base_oid
    }
}

/// Lifecycle of a walk, published on a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkState {
    #[default]
    Idle,
    Resolving,
    Walking,
    Completed,
    Cancelled,
    Failed,
}

/// One binding inside the walked subtree, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkResult {
    /// Name path with the well-known registration prefix removed, e.g.
    /// `system.sysDescr.0`.
    pub display_oid: String,
    pub numeric_oid: Oid,
    /// The value's display string, or its enumeration label.
    pub value: String,
}

impl fmt::Display for WalkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.display_oid, self.value)
    }
}

/// Notification emitted by a running walk, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    /// The host resolved. Sent once, before any result.
    AddressResolved { input: String, canonical: String },
    /// A binding inside the subtree.
    Result(WalkResult),
    /// Last event of every walk. `message` is empty unless the walk failed.
    Terminated { message: String },
}

/// How a walk ended.
#[derive(Debug)]
pub enum WalkOutcome {
    Completed { results: usize },
    Cancelled { results: usize },
    Failed(Box<Error>),
}

impl WalkOutcome {
    /// The terminal state matching this outcome.
    pub fn state(&self) -> WalkState {
        match self {
            Self::Completed { .. } => WalkState::Completed,
            Self::Cancelled { .. } => WalkState::Cancelled,
            Self::Failed(_) => WalkState::Failed,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// User-facing status line for a finished walk.
///
/// Empty on completion and cancellation.
///
/// ```
/// use mibwalk::Error;
/// use mibwalk::walk::{WalkOutcome, status_message};
///
/// let failed = WalkOutcome::Failed(Error::UnknownHost { host: "nowhere".into(), source: None }.boxed());
/// assert_eq!(status_message(&failed, "nowhere"), "Unknown host: nowhere");
/// assert_eq!(status_message(&WalkOutcome::Completed { results: 3 }, "router"), "");
/// ```
pub fn status_message(outcome: &WalkOutcome, host: &str) -> String {
    let WalkOutcome::Failed(err) = outcome else {
        return String::new();
    };
    match &**err {
        Error::Cancelled => String::new(),
        Error::NoResponse { .. } => format!("No response from host: {}", host),
        Error::UnknownHost { host, .. } => format!("Unknown host: {}", host),
        Error::Agent { .. } | Error::BadValue(_) => err.to_string(),
        other => format!("Exception during retrieval: {}", other),
    }
}

/// Receiving end of a walk's events.
///
/// Yields every event in emission order and ends after
/// [`WalkEvent::Terminated`].
#[derive(Debug)]
pub struct WalkEvents {
    rx: mpsc::UnboundedReceiver<WalkEvent>,
}

impl WalkEvents {
    /// Next event, or `None` once the walk has finished and all events were
    /// received.
    pub async fn recv(&mut self) -> Option<WalkEvent> {
        self.rx.recv().await
    }
}

impl futures_core::Stream for WalkEvents {
    type Item = WalkEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Control side of a running walk.
///
/// Dropping the handle cancels the walk.
pub struct WalkHandle {
    events: WalkEvents,
    cancel: CancellationToken,
    state: watch::Receiver<WalkState>,
    task: JoinHandle<WalkOutcome>,
    _cancel_on_drop: DropGuard,
}

impl WalkHandle {
    /// Ask the walk to stop before its next request.
    ///
    /// A request already in flight runs to its response or timeout, and its
    /// result is still emitted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this walk, for use after the handle was moved.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn events(&mut self) -> &mut WalkEvents {
        &mut self.events
    }

    /// Current state.
    pub fn state(&self) -> WalkState {
        *self.state.borrow()
    }

    /// Subscribe to state changes.
    pub fn watch_state(&self) -> watch::Receiver<WalkState> {
        self.state.clone()
    }

    /// Wait for the walk to finish.
    pub async fn join(self) -> WalkOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => WalkOutcome::Cancelled { results: 0 },
        }
    }
}

impl fmt::Debug for WalkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkHandle")
            .field("state", &self.state())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Start a walk over UDP.
///
/// Must be called from within a tokio runtime.
pub fn spawn_walk(request: WalkRequest, tree: Arc<MibTree>) -> WalkHandle {
    spawn_walk_with(UdpConnector, request, tree)
}

/// Start a walk that reaches the agent through `connector`.
pub fn spawn_walk_with<C>(connector: C, request: WalkRequest, tree: Arc<MibTree>) -> WalkHandle
where
    C: Connector + 'static,
{
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(WalkState::Idle);
    let cancel = CancellationToken::new();

    let walk = Walker {
        tree,
        cancel: cancel.clone(),
        events: events_tx,
        state: state_tx,
    };
    let task = tokio::spawn(walk.run(connector, request));

    WalkHandle {
        events: WalkEvents { rx: events_rx },
        _cancel_on_drop: cancel.clone().drop_guard(),
        cancel,
        state: state_rx,
        task,
    }
}

enum Stop {
    Completed,
    Cancelled,
}

struct Walker {
    tree: Arc<MibTree>,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<WalkEvent>,
    state: watch::Sender<WalkState>,
}

impl Walker {
    fn emit(&self, event: WalkEvent) {
        // The receiver may be gone; the walk still runs to its end.
        let _ = self.events.send(event);
    }

    #[instrument(
        name = "walk",
        skip_all,
        fields(snmp.host = %request.host, snmp.port = request.port, snmp.base_oid = %request.base_oid)
    )]
    async fn run<C: Connector>(self, connector: C, request: WalkRequest) -> WalkOutcome {
        let mut results = 0;
        let outcome = match self.walk(&connector, &request, &mut results).await {
            Ok(Stop::Completed) => WalkOutcome::Completed { results },
            Ok(Stop::Cancelled) => WalkOutcome::Cancelled { results },
            Err(e) if matches!(*e, Error::Cancelled) => WalkOutcome::Cancelled { results },
            Err(e) => WalkOutcome::Failed(e),
        };

        let message = status_message(&outcome, &request.host);
        match &outcome {
            WalkOutcome::Failed(e) => {
                tracing::warn!(target: "mibwalk::walk", { snmp.results = results, error = %e }, "walk failed");
            }
            _ => {
                tracing::info!(target: "mibwalk::walk", { snmp.results = results, snmp.state = ?outcome.state() }, "walk finished");
            }
        }

        self.state.send_replace(outcome.state());
        self.emit(WalkEvent::Terminated { message });
        self.state.send_replace(WalkState::Idle);
        outcome
    }

    async fn walk<C: Connector>(
        &self,
        connector: &C,
        request: &WalkRequest,
        results: &mut usize,
    ) -> Result<Stop> {
        let base = self.tree.resolve_oid(&request.base_oid)?;
        base.validate()?;
        if self.cancel.is_cancelled() {
            return Ok(Stop::Cancelled);
        }

        self.state.send_replace(WalkState::Resolving);
        let resolved = connector.resolve(&request.host, request.port).await?;
        tracing::debug!(target: "mibwalk::walk", { snmp.canonical = %resolved.canonical, snmp.target = %resolved.addr }, "host resolved");
        self.emit(WalkEvent::AddressResolved {
            input: resolved.input,
            canonical: resolved.canonical,
        });

        let transport = connector.connect(resolved.addr).await?;
        let comm = Communicator::with_transport(
            transport,
            CommunicatorConfig {
                community: request.community.clone(),
                timeout: request.timeout,
            },
        );

        self.state.send_replace(WalkState::Walking);
        let stop = self.walk_subtree(&comm, &base, results).await;
        comm.close();
        stop
    }

    async fn walk_subtree<T: Transport>(
        &self,
        comm: &Communicator<T>,
        base: &Oid,
        results: &mut usize,
    ) -> Result<Stop> {
        let mut current = base.clone();
        loop {
            if self.cancel.is_cancelled() {
                return Ok(Stop::Cancelled);
            }

            let Some(vb) = comm.get_next(&current).await?.into_iter().next() else {
                return Err(Error::malformed(0, DecodeErrorKind::MissingVarBind));
            };

            if !vb.oid.starts_with(base) {
                tracing::debug!(target: "mibwalk::walk", { snmp.oid = %vb.oid }, "left subtree");
                return Ok(Stop::Completed);
            }
            if vb.oid <= current {
                tracing::debug!(target: "mibwalk::walk", { snmp.oid = %vb.oid, snmp.requested = %current }, "agent returned non-increasing OID");
                return Err(Error::WalkAborted {
                    target: comm.peer_addr(),
                    reason: WalkAbortReason::NonIncreasing,
                }
                .boxed());
            }

            self.emit(WalkEvent::Result(WalkResult::from_varbind(&self.tree, &vb)));
            *results += 1;
            current = vb.oid;
        }
    }
}
