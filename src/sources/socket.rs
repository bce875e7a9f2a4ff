//! Live socket source.
//!
//! Owns the TCP stream after the handshake completed and frames it into
//! lines. Reads are bounded by a generous idle timeout so a dead peer that
//! never closes the socket still surfaces instead of blocking forever.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

use crate::source::LineSource;
use crate::wire::LineFramer;
use crate::{AcmiError, Result};

/// A silent host is treated as gone after this long without a byte.
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Line source over an established, handshaken TCP session.
pub struct SocketSource {
    framer: LineFramer<TcpStream>,
    idle_timeout: Duration,
}

impl SocketSource {
    pub fn new(stream: TcpStream) -> Self {
        Self { framer: LineFramer::new(stream), idle_timeout: IDLE_TIMEOUT }
    }

    /// Overrides the idle read timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl LineSource for SocketSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match tokio::time::timeout(self.idle_timeout, self.framer.next_line()).await {
            Ok(result) => {
                if matches!(&result, Ok(None)) {
                    debug!("telemetry stream closed by host");
                }
                result
            }
            Err(_) => Err(AcmiError::Timeout { duration: self.idle_timeout }),
        }
    }
}
