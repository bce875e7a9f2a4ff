//! Driver spawns and manages the transport read loop.
//!
//! The loop is the producer side of the line queue and the only task that
//! touches the socket. It never applies lines itself; mission state stays
//! with the consumer (see [`drive_mission`]), preserving the single-writer
//! hand-off at the queue boundary.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::mission::{AcmiMission, ApplyReport};
use crate::queue::LineQueue;
use crate::source::LineSource;

/// Terminal and non-terminal session states published by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientStatus {
    /// Transport loop is running and lines are flowing.
    Streaming,
    /// Host closed the stream or the client was shut down.
    Closed,
    /// Transport failed; the session is dead and will not be retried.
    Failed(String),
}

impl ClientStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ClientStatus::Streaming)
    }
}

/// Result of spawning the driver task.
pub struct DriverChannels {
    /// Status updates; the last value before the task exits is terminal.
    pub status: watch::Receiver<ClientStatus>,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the transport read task.
pub struct Driver;

impl Driver {
    /// Spawn the read loop for the given source.
    ///
    /// Every framed line lands in `queue`; with `purge_on_frame` set, the
    /// queue is purged right before each `#` time-marker line is enqueued,
    /// so a slow consumer always wakes up to the freshest frame.
    pub fn spawn<S>(source: S, queue: LineQueue, purge_on_frame: bool) -> DriverChannels
    where
        S: LineSource,
    {
        let (status_tx, status_rx) = watch::channel(ClientStatus::Streaming);
        let cancel = CancellationToken::new();
        let cancel_reader = cancel.clone();

        tokio::spawn(async move {
            Self::read_task(source, queue, purge_on_frame, status_tx, cancel_reader).await;
        });

        DriverChannels { status: status_rx, cancel }
    }

    /// Transport read task: frames lines and enqueues them until the feed
    /// ends, fails, or the session is cancelled.
    async fn read_task<S>(
        mut source: S,
        queue: LineQueue,
        purge_on_frame: bool,
        status_tx: watch::Sender<ClientStatus>,
        cancel: CancellationToken,
    ) where
        S: LineSource,
    {
        info!("transport read task started");
        let mut line_count = 0u64;

        let terminal = loop {
            // Cancellation is honored between reads and during an in-flight
            // read; the socket source additionally bounds reads by a
            // deadline so a wedged peer cannot hold the task.
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("transport cancelled");
                    break ClientStatus::Closed;
                }
                result = source.next_line() => result,
            };

            match result {
                Ok(Some(line)) => {
                    line_count += 1;
                    trace!(line_count, len = line.len(), "line received");
                    if purge_on_frame && line.starts_with('#') {
                        queue.purge();
                    }
                    queue.push(line);
                }
                Ok(None) => {
                    info!(line_count, "telemetry feed ended");
                    break ClientStatus::Closed;
                }
                Err(e) => {
                    // Surfaced, not swallowed: a dead connection must not
                    // look like simple silence.
                    error!(error = %e, "transport failure");
                    break ClientStatus::Failed(e.to_string());
                }
            }
        };

        queue.close();
        let _ = status_tx.send(terminal);
        info!(line_count, "transport read task ended");
    }
}

/// Consumer loop: drains queue batches into the mission until the queue
/// closes or the token is cancelled.
///
/// This is the single place mission state gets mutated in a live session.
/// Returns the accumulated counters.
pub async fn drive_mission(
    queue: LineQueue,
    mission: &mut AcmiMission,
    cancel: CancellationToken,
) -> ApplyReport {
    let mut total = ApplyReport::default();
    loop {
        let batch = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("mission consumer cancelled");
                break;
            }
            batch = queue.recv_batch() => batch,
        };
        let Some(batch) = batch else {
            debug!("line queue closed, mission consumer done");
            break;
        };
        let report = mission.apply_lines(&batch);
        total.lines += report.lines;
        total.objects_created += report.objects_created;
        total.events_emitted += report.events_emitted;
        total.fields_rejected += report.fields_rejected;
    }
    total
}
