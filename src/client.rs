//! Live telemetry client.
//!
//! Owns the session lifecycle: resolve, connect, handshake, then hand the
//! socket to the driver task which feeds the line queue. The client itself
//! never parses telemetry; consumers pull raw lines from [`LineQueue`] and
//! apply them to an [`crate::mission::AcmiMission`] on their own task.
//! There is no automatic reconnection: when the status turns terminal the
//! owner builds a fresh client if it wants a new session.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpStream, lookup_host};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::driver::{ClientStatus, Driver};
use crate::queue::LineQueue;
use crate::sources::SocketSource;
use crate::wire::HostGreeting;
use crate::wire::handshake;
use crate::{AcmiError, Result};

/// Well-known Tacview real-time telemetry port.
pub const DEFAULT_TELEMETRY_PORT: u16 = 42674;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    /// Purge queued lines whenever a new `#` frame marker arrives, keeping
    /// only the freshest frame for a slow consumer.
    pub purge_on_frame: bool,
    /// Idle read deadline; `None` keeps the source default.
    pub idle_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_TELEMETRY_PORT,
            username: username.into(),
            password: None,
            purge_on_frame: false,
            idle_timeout: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_purge_on_frame(mut self, purge: bool) -> Self {
        self.purge_on_frame = purge;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }
}

/// Live connection to a telemetry host.
pub struct TacviewClient {
    queue: LineQueue,
    status: watch::Receiver<ClientStatus>,
    cancel: CancellationToken,
    remote_addr: SocketAddr,
    greeting: HostGreeting,
}

impl TacviewClient {
    /// Establishes a session: resolve the host (first returned address),
    /// connect, handshake, and start the background read loop.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        info!(host = %config.host, port = config.port, "connecting to telemetry host");

        let mut addrs = lookup_host((config.host.as_str(), config.port))
            .await
            .map_err(|e| {
                AcmiError::connection_failed_with_source(
                    format!("failed to resolve {}", config.host),
                    Box::new(e),
                )
            })?;
        let remote_addr = addrs
            .next()
            .ok_or_else(|| {
                AcmiError::connection_failed(format!("{} resolved to no addresses", config.host))
            })?;

        let mut stream = TcpStream::connect(remote_addr).await.map_err(|e| {
            AcmiError::connection_failed_with_source(
                format!("failed to connect to {remote_addr}"),
                Box::new(e),
            )
        })?;

        let greeting =
            handshake::negotiate(&mut stream, &config.username, config.password.as_deref())
                .await?;

        let mut source = SocketSource::new(stream);
        if let Some(timeout) = config.idle_timeout {
            source = source.with_idle_timeout(timeout);
        }

        let queue = LineQueue::new();
        let channels = Driver::spawn(source, queue.clone(), config.purge_on_frame);

        info!(%remote_addr, "telemetry session established");

        Ok(Self {
            queue,
            status: channels.status,
            cancel: channels.cancel,
            remote_addr,
            greeting,
        })
    }

    /// Handle to the raw-line queue. Intended for exactly one consumer at
    /// a time; see [`crate::driver::drive_mission`].
    pub fn lines(&self) -> LineQueue {
        self.queue.clone()
    }

    /// Status watch; turns terminal exactly once when the session ends.
    pub fn status(&self) -> watch::Receiver<ClientStatus> {
        self.status.clone()
    }

    /// Latest known session status.
    pub fn current_status(&self) -> ClientStatus {
        self.status.borrow().clone()
    }

    /// Tags and username the host advertised during the handshake.
    pub fn greeting(&self) -> &HostGreeting {
        &self.greeting
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Stops the transport task. Safe to call from any task, more than
    /// once; the session is not reusable afterwards.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TacviewClient {
    fn drop(&mut self) {
        debug!("dropping telemetry client");
        self.cancel.cancel();
    }
}
