//! LineSource trait for telemetry line feeds.

use crate::Result;

/// Trait for ordered feeds of raw telemetry lines.
///
/// Sources abstract over where lines come from (live socket, scripted
/// memory feed) so the driver loop does not care. Each source handles its
/// own buffering and timing.
#[async_trait::async_trait]
pub trait LineSource: Send + 'static {
    /// Get the next raw line.
    ///
    /// Returns:
    /// - `Ok(Some(line))` - next line, terminator stripped
    /// - `Ok(None)` - feed ended cleanly (host closed the stream)
    /// - `Err(e)` - transport failure; the feed is finished
    async fn next_line(&mut self) -> Result<Option<String>>;
}
