//! In-memory scripted source.
//!
//! Feeds a fixed sequence of lines, mainly for tests and for driving the
//! mission model offline without a socket. This is not file playback; it
//! has no timing and ends as soon as the script runs out.

use std::collections::VecDeque;

use crate::Result;
use crate::source::LineSource;

/// Line source backed by a pre-loaded script.
pub struct MemorySource {
    lines: VecDeque<String>,
}

impl MemorySource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }
}

#[async_trait::async_trait]
impl LineSource for MemorySource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
