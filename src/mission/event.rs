//! Mission event decoding.
//!
//! Events ride the property syntax (`0,Event=...`) but are notifications,
//! not state: several can occur in one frame without overriding each other.
//! The payload is `Kind|id|id|...|free text`; every part after the kind is
//! optional. All events are delivered through one channel and subscribers
//! filter on [`EventKind`].

use crate::wire::AcmiMessage;

/// Closed set of event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Generic message; also the fallback for unrecognized markers.
    Message,
    Bookmark,
    Debug,
    /// An object left the recorded area without being destroyed.
    LeftArea,
    Destroyed,
    TakenOff,
    Landed,
    /// A weapon reached or missed its target.
    Timeout,
}

impl EventKind {
    fn from_marker(marker: &str) -> Self {
        match marker {
            "Message" => EventKind::Message,
            "Bookmark" => EventKind::Bookmark,
            "Debug" => EventKind::Debug,
            "LeftArea" => EventKind::LeftArea,
            "Destroyed" => EventKind::Destroyed,
            "TakenOff" => EventKind::TakenOff,
            "Landed" => EventKind::Landed,
            "Timeout" => EventKind::Timeout,
            _ => EventKind::Message,
        }
    }
}

/// One decoded event notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionEvent {
    pub kind: EventKind,
    /// Objects affected by the event; may be empty.
    pub object_ids: Vec<u64>,
    /// Free text describing the event.
    pub text: String,
}

impl MissionEvent {
    /// Decodes an event from its message.
    ///
    /// The generic path is the default: an `Event=` field that carries no
    /// recognizable structure becomes a `Message` event whose text is the
    /// full line. Otherwise the payload splits on `|`: kind marker first,
    /// then hex object ids, then the free text as the last part.
    pub fn from_message(message: &AcmiMessage) -> Self {
        let Some(payload) =
            message.segments().get(1).and_then(|s| s.strip_prefix("Event="))
        else {
            return Self {
                kind: EventKind::Message,
                object_ids: Vec::new(),
                text: message.text().to_string(),
            };
        };

        let parts: Vec<&str> = payload.split('|').collect();
        let kind = EventKind::from_marker(parts[0]);

        let (ids, text) = match parts.len() {
            1 => (Vec::new(), String::new()),
            n => {
                let ids = parts[1..n - 1]
                    .iter()
                    .filter_map(|p| u64::from_str_radix(p, 16).ok())
                    .collect();
                (ids, parts[n - 1].to_string())
            }
        };

        Self { kind, object_ids: ids, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> MissionEvent {
        MissionEvent::from_message(&AcmiMessage::parse(line))
    }

    #[test]
    fn full_payload_decodes_kind_ids_and_text() {
        let ev = event("0,Event=Destroyed|4000001|Target down");
        assert_eq!(ev.kind, EventKind::Destroyed);
        assert_eq!(ev.object_ids, vec![0x4000001]);
        assert_eq!(ev.text, "Target down");
    }

    #[test]
    fn multiple_object_ids() {
        let ev = event("0,Event=Timeout|4000001|4000002|Missile expired");
        assert_eq!(ev.kind, EventKind::Timeout);
        assert_eq!(ev.object_ids, vec![0x4000001, 0x4000002]);
    }

    #[test]
    fn unknown_marker_falls_back_to_message() {
        let ev = event("0,Event=SomethingNew|hello");
        assert_eq!(ev.kind, EventKind::Message);
        assert_eq!(ev.text, "hello");
    }

    #[test]
    fn bare_event_field_has_empty_text() {
        let ev = event("0,Event=Bookmark");
        assert_eq!(ev.kind, EventKind::Bookmark);
        assert!(ev.object_ids.is_empty());
        assert!(ev.text.is_empty());
    }

    #[test]
    fn non_event_message_becomes_generic_with_full_line() {
        let ev = event("0,Title=Sortie");
        assert_eq!(ev.kind, EventKind::Message);
        assert_eq!(ev.text, "0,Title=Sortie");
    }

    #[test]
    fn known_markers_map_to_their_kind() {
        for (marker, kind) in [
            ("Message", EventKind::Message),
            ("Bookmark", EventKind::Bookmark),
            ("Debug", EventKind::Debug),
            ("LeftArea", EventKind::LeftArea),
            ("Destroyed", EventKind::Destroyed),
            ("TakenOff", EventKind::TakenOff),
            ("Landed", EventKind::Landed),
            ("Timeout", EventKind::Timeout),
        ] {
            let ev = event(&format!("0,Event={marker}|some text"));
            assert_eq!(ev.kind, kind, "marker {marker}");
        }
    }
}
