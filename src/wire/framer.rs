//! Byte-stream to line framing.
//!
//! The telemetry host writes `\n`-delimited UTF-8 text over TCP. A single
//! socket read may deliver a fragment of a line, several lines, or a line
//! split at any byte boundary, so the framer buffers partial lines across
//! reads. It has no knowledge of the ACMI protocol itself.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::{AcmiError, Result};

/// Per-read buffer size. Matches the burst size the reference host uses.
const READ_CHUNK: usize = 8192;

/// Turns a raw byte stream into a sequence of text lines.
///
/// A line is terminated by `\n`; a single `\r` immediately following the
/// terminator is consumed and never emitted. End of stream (zero-length
/// read) ends the sequence without error; a non-empty unterminated tail at
/// that point is emitted as a final line so no bytes are lost. The framer
/// is not restartable: once `next_line` returns `Ok(None)` or an error, the
/// stream is finished.
pub struct LineFramer<R> {
    reader: R,
    buf: Vec<u8>,
    eof: bool,
    /// A `\n` was consumed at the very end of the buffer; swallow one `\r`
    /// if it arrives at the start of the next read.
    pending_cr: bool,
}

impl<R: AsyncRead + Unpin> LineFramer<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), eof: false, pending_cr: false }
    }

    /// Consumes the framer, returning the underlying reader and any bytes
    /// that were buffered but not yet emitted.
    pub fn into_parts(self) -> (R, Vec<u8>) {
        (self.reader, self.buf)
    }

    /// Reads the next line.
    ///
    /// Returns `Ok(Some(line))` with no terminator included, `Ok(None)` at
    /// end of stream, or a transport error if the read fails.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if self.pending_cr && !self.buf.is_empty() {
                if self.buf[0] == b'\r' {
                    self.buf.remove(0);
                }
                self.pending_cr = false;
            }

            if let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
                let rest = self.buf.split_off(idx + 1);
                self.buf.pop(); // the terminator
                let line = String::from_utf8_lossy(&self.buf).into_owned();
                self.buf = rest;
                if self.buf.first() == Some(&b'\r') {
                    self.buf.remove(0);
                } else if self.buf.is_empty() {
                    self.pending_cr = true;
                }
                trace!(len = line.len(), "framed line");
                return Ok(Some(line));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                // Unterminated tail at close; emit rather than drop bytes.
                let line = String::from_utf8_lossy(&self.buf).into_owned();
                self.buf.clear();
                return Ok(Some(line));
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self
                .reader
                .read(&mut chunk)
                .await
                .map_err(|e| AcmiError::transport("line read", e))?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    async fn collect<R: AsyncRead + Unpin>(mut framer: LineFramer<R>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = framer.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn splits_simple_lines() {
        let framer = LineFramer::new(&b"#0\n4000001,Name=Test\n"[..]);
        assert_eq!(collect(framer).await, vec!["#0", "4000001,Name=Test"]);
    }

    #[tokio::test]
    async fn emits_unterminated_tail_at_eof() {
        let framer = LineFramer::new(&b"first\npartial"[..]);
        assert_eq!(collect(framer).await, vec!["first", "partial"]);
    }

    #[tokio::test]
    async fn empty_stream_yields_no_lines() {
        let framer = LineFramer::new(&b""[..]);
        assert!(collect(framer).await.is_empty());
    }

    #[tokio::test]
    async fn consumes_single_cr_after_terminator() {
        let framer = LineFramer::new(&b"a\n\rb\n\r\rc\n"[..]);
        // One \r after each \n is swallowed; a second one stays in the line.
        assert_eq!(collect(framer).await, vec!["a", "b", "\rc"]);
    }

    #[tokio::test]
    async fn reassembles_lines_across_partial_reads() {
        let (client, mut server) = tokio::io::duplex(16);
        let writer = tokio::spawn(async move {
            for fragment in [&b"4000001,T=1."[..], b"0|2.0|30", b"0.0\n#10", b"0.5\n"] {
                server.write_all(fragment).await.unwrap();
                server.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
            drop(server);
        });

        let framer = LineFramer::new(client);
        let lines = collect(framer).await;
        writer.await.unwrap();
        assert_eq!(lines, vec!["4000001,T=1.0|2.0|300.0", "#100.5"]);
    }

    #[tokio::test]
    async fn cr_straddling_read_boundary_is_consumed() {
        let (client, mut server) = tokio::io::duplex(16);
        let writer = tokio::spawn(async move {
            server.write_all(b"a\n").await.unwrap();
            server.flush().await.unwrap();
            tokio::task::yield_now().await;
            server.write_all(b"\rb\n").await.unwrap();
            drop(server);
        });

        let mut framer = LineFramer::new(client);
        assert_eq!(framer.next_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(framer.next_line().await.unwrap().as_deref(), Some("b"));
        assert_eq!(framer.next_line().await.unwrap(), None);
        writer.await.unwrap();
    }
}
