//! ACMI update line decoding.
//!
//! One line of the telemetry feed becomes one [`AcmiMessage`]: an ordered
//! list of `key=value` segments plus line-level flags. The decoder is
//! best-effort by design; anything it cannot interpret is left to the
//! field-application layer to skip.

/// Sentinel id for lines whose identifier field does not parse as hex.
///
/// Messages carrying this id are still applied, which merges all malformed
/// ids into one pseudo-object. That matches the reference implementation
/// and is flagged at the mission layer as a known source anomaly.
pub const UNKNOWN_ID: u64 = u64::MAX;

/// Reserved id carrying mission-global properties; never a simulated object.
pub const GLOBAL_ID: u64 = 0;

/// One decoded protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcmiMessage {
    text: String,
    segments: Vec<String>,
    destroyed: bool,
}

impl AcmiMessage {
    /// Decodes a raw line (no trailing newline).
    ///
    /// A leading `-` marks the object destroyed; the stripped remainder is
    /// what gets segmented. Segments are split on commas not immediately
    /// preceded by a backslash; the backslash itself stays in the segment
    /// text verbatim. That escape retention matches the wire behavior of
    /// the reference decoder and is relied upon by existing hosts.
    pub fn parse(line: &str) -> Self {
        let (destroyed, text) = match line.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let segments = split_unescaped(text);
        Self { text: text.to_string(), segments, destroyed }
    }

    /// The line text after destruction-marker stripping.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ordered field segments; segment 0 is the identifier text.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// `key=value` segments following the identifier.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().skip(1).map(String::as_str)
    }

    /// Object identifier, parsed as hexadecimal. Unparsable identifiers
    /// yield [`UNKNOWN_ID`] rather than failing the whole decode.
    pub fn object_id(&self) -> u64 {
        u64::from_str_radix(&self.segments[0], 16).unwrap_or(UNKNOWN_ID)
    }

    /// True when the line carries mission-global properties (id `0`).
    pub fn is_global(&self) -> bool {
        self.text.starts_with("0,")
    }

    /// True when the line began with the destruction marker `-`.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// True when the first field declares an event.
    pub fn is_event(&self) -> bool {
        self.segments.get(1).is_some_and(|s| s.starts_with("Event="))
    }
}

/// Splits on commas that are not immediately preceded by a backslash.
///
/// A line with no unescaped comma yields exactly one segment equal to the
/// whole line.
fn split_unescaped(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b',' && (i == 0 || bytes[i - 1] != b'\\') {
            segments.push(text[start..i].to_string());
            start = i + 1;
        }
    }
    segments.push(text[start..].to_string());
    segments
}
