//! Composite coordinate (`T`) field decoding.
//!
//! The `T` property packs an object's spatial state into one `|`-delimited
//! tuple. The feed delta-encodes it: any component may be blank, meaning
//! "unchanged since the last update". Accepted tuple lengths are exactly 3
//! (lon|lat|alt), 5 (+ native x|y), 6 (+ roll|pitch|yaw) and 9 (the full
//! form); the 6 and 9 element forms carry the value we apply as heading at
//! position 5.

/// Sparse spatial update decoded from a `T` tuple.
///
/// `None` components leave the object's previous value in place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinateUpdate {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
}

impl CoordinateUpdate {
    /// Decodes a tuple value (the text after `T=`).
    ///
    /// Returns `None` for tuple lengths other than 3, 5, 6 or 9; the whole
    /// field update is then skipped and the object left untouched.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split('|').collect();
        if !matches!(parts.len(), 3 | 5 | 6 | 9) {
            return None;
        }

        let component = |i: usize| parts.get(i).and_then(|p| p.trim().parse::<f64>().ok());

        Some(Self {
            longitude: component(0),
            latitude: component(1),
            altitude: component(2),
            heading: if parts.len() >= 6 { component(5) } else { None },
        })
    }
}
