//! Mission state aggregation.
//!
//! [`AcmiMission`] owns the object table and the current simulation time,
//! and turns batches of raw telemetry lines into object updates and event
//! notifications. It is single-writer by design: exactly one consumer task
//! drives [`AcmiMission::apply_lines`]; the transport never touches it.

pub mod event;

pub use event::{EventKind, MissionEvent};

use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::object::SimObject;
use crate::wire::{AcmiMessage, UNKNOWN_ID};

/// Buffered events per lagging subscriber before they start missing some.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Counters for one [`AcmiMission::apply_lines`] batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub lines: usize,
    pub objects_created: usize,
    pub events_emitted: usize,
    pub fields_rejected: usize,
}

/// Live mission model: global attributes, simulation time, object table.
#[derive(Debug)]
pub struct AcmiMission {
    // Global header attributes.
    pub file_type: String,
    pub file_version: String,
    pub data_source: String,
    pub data_recorder: String,
    pub author: String,
    pub title: String,
    pub category: String,
    pub briefing: String,
    pub debriefing: String,
    pub comments: String,
    pub recording_time: Option<DateTime<Utc>>,
    /// Base time each frame offset is added to.
    pub reference_time: Option<DateTime<Utc>>,
    /// Median-point offsets added to every object longitude/latitude.
    pub reference_longitude: f64,
    pub reference_latitude: f64,

    current_frame: f64,
    objects: HashMap<u64, SimObject>,
    events: broadcast::Sender<MissionEvent>,
}

impl AcmiMission {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            file_type: String::new(),
            file_version: String::new(),
            data_source: String::new(),
            data_recorder: String::new(),
            author: String::new(),
            title: String::new(),
            category: String::new(),
            briefing: String::new(),
            debriefing: String::new(),
            comments: String::new(),
            recording_time: None,
            reference_time: None,
            reference_longitude: 0.0,
            reference_latitude: 0.0,
            current_frame: 0.0,
            objects: HashMap::new(),
            events,
        }
    }

    /// Current mission time as a frame offset in seconds.
    ///
    /// Advances only through `#<seconds>` marker lines.
    pub fn current_frame(&self) -> f64 {
        self.current_frame
    }

    /// Absolute time of the current frame, when a reference time is known.
    pub fn current_time_utc(&self) -> Option<DateTime<Utc>> {
        let offset = ChronoDuration::milliseconds((self.current_frame * 1000.0) as i64);
        self.reference_time.map(|reference| reference + offset)
    }

    /// All objects seen so far, destroyed ones included.
    pub fn objects(&self) -> &HashMap<u64, SimObject> {
        &self.objects
    }

    pub fn object(&self, id: u64) -> Option<&SimObject> {
        self.objects.get(&id)
    }

    /// Subscribes to event notifications. Every subscriber sees every
    /// event; filter on [`MissionEvent::kind`].
    pub fn subscribe_events(&self) -> broadcast::Receiver<MissionEvent> {
        self.events.subscribe()
    }

    /// Event subscription as a `Stream`.
    pub fn event_stream(&self) -> BroadcastStream<MissionEvent> {
        BroadcastStream::new(self.events.subscribe())
    }

    /// Applies an ordered batch of raw telemetry lines.
    ///
    /// Time markers advance the frame clock, header and global lines update
    /// mission attributes, everything else upserts the object table. Decode
    /// problems are local to their line or field; the batch always runs to
    /// completion.
    pub fn apply_lines<I, S>(&mut self, lines: I) -> ApplyReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ApplyReport::default();
        for line in lines {
            let line = line.as_ref();
            report.lines += 1;

            if let Some(offset) = line.strip_prefix('#') {
                match offset.parse::<f64>() {
                    Ok(seconds) => self.current_frame = seconds,
                    Err(_) => warn!(line, "unparsable time marker, keeping previous frame"),
                }
                continue;
            }
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            if let Some(value) = line.strip_prefix("FileType=") {
                self.file_type = value.to_string();
                continue;
            }
            if let Some(value) = line.strip_prefix("FileVersion=") {
                self.file_version = value.to_string();
                continue;
            }

            let message = AcmiMessage::parse(line);
            if message.is_global() {
                self.apply_global(&message, &mut report);
            } else {
                self.apply_object(&message, &mut report);
            }

            if message.is_event() {
                let event = MissionEvent::from_message(&message);
                debug!(kind = ?event.kind, "event");
                report.events_emitted += 1;
                // No subscribers is fine; events are transient.
                let _ = self.events.send(event);
            }
        }
        report
    }

    fn apply_global(&mut self, message: &AcmiMessage, report: &mut ApplyReport) {
        for segment in message.fields() {
            if segment.is_empty() || segment.starts_with("Event=") {
                continue;
            }
            let Some((key, value)) = segment.split_once('=') else {
                report.fields_rejected += 1;
                continue;
            };
            if !self.apply_global_field(key, value) {
                report.fields_rejected += 1;
            }
        }
    }

    /// Mission-scoped property dispatch; the global analogue of the object
    /// registry. Unknown keys are ignored (returns true), only known keys
    /// with unconvertible values count as rejected.
    fn apply_global_field(&mut self, key: &str, value: &str) -> bool {
        match key {
            "DataSource" => self.data_source = value.to_string(),
            "DataRecorder" => self.data_recorder = value.to_string(),
            "Author" => self.author = value.to_string(),
            "Title" => self.title = value.to_string(),
            "Category" => self.category = value.to_string(),
            "Briefing" => self.briefing = value.to_string(),
            "Debriefing" => self.debriefing = value.to_string(),
            "Comments" => self.comments = value.to_string(),
            "RecordingTime" => match value.parse::<DateTime<Utc>>() {
                Ok(t) => self.recording_time = Some(t),
                Err(_) => return false,
            },
            "ReferenceTime" => match value.parse::<DateTime<Utc>>() {
                Ok(t) => self.reference_time = Some(t),
                Err(_) => return false,
            },
            "ReferenceLongitude" => match value.parse::<f64>() {
                Ok(v) => self.reference_longitude = v,
                Err(_) => return false,
            },
            "ReferenceLatitude" => match value.parse::<f64>() {
                Ok(v) => self.reference_latitude = v,
                Err(_) => return false,
            },
            _ => debug!(key, "unknown global property, ignored"),
        }
        true
    }

    fn apply_object(&mut self, message: &AcmiMessage, report: &mut ApplyReport) {
        let id = message.object_id();
        if id == UNKNOWN_ID {
            // Known source anomaly: every unparsable id merges into one
            // sentinel pseudo-object.
            warn!(line = message.text(), "unparsable object id, applying to sentinel object");
        }

        match self.objects.get_mut(&id) {
            Some(object) => {
                if object.destroyed && !message.is_destroyed() {
                    // Destruction is monotonic; a reappearing id is a
                    // protocol anomaly, reported but still applied.
                    warn!(id, "update for destroyed object");
                }
                let outcome = object.apply_message(message);
                report.fields_rejected += outcome.rejected.len();
                if message.is_destroyed() {
                    object.destroyed = true;
                }
            }
            None => {
                let mut object = SimObject::new(id);
                let outcome = object.apply_message(message);
                report.fields_rejected += outcome.rejected.len();
                if message.is_destroyed() {
                    object.destroyed = true;
                }
                debug!(id, "object created");
                self.objects.insert(id, object);
                report.objects_created += 1;
            }
        }
    }
}

impl Default for AcmiMission {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_scenario() {
        let mut mission = AcmiMission::new();
        mission.apply_lines(["#100.0", "4000001,T=1.0|2.0|1000.0,Name=Test", "-4000001,"]);

        assert_eq!(mission.current_frame(), 100.0);
        assert_eq!(mission.objects().len(), 1);
        let obj = mission.object(0x4000001).unwrap();
        assert_eq!(obj.name, "Test");
        assert_eq!(obj.longitude, 1.0);
        assert_eq!(obj.latitude, 2.0);
        assert_eq!(obj.altitude, 1000.0);
        assert!(obj.destroyed);
    }

    #[test]
    fn time_unchanged_without_marker() {
        let mut mission = AcmiMission::new();
        mission.apply_lines(["#42.5"]);
        mission.apply_lines(["4000001,Name=Test", "4000002,Name=Other"]);
        assert_eq!(mission.current_frame(), 42.5);
    }

    #[test]
    fn unparsable_time_retains_previous_frame() {
        let mut mission = AcmiMission::new();
        mission.apply_lines(["#10.0", "#oops", "4000001,Name=x"]);
        assert_eq!(mission.current_frame(), 10.0);
    }

    #[test]
    fn object_lifecycle_creates_once_then_mutates() {
        let mut mission = AcmiMission::new();
        let first = mission.apply_lines(["4000001,Name=Alpha"]);
        let second = mission.apply_lines(["4000001,Pilot=Maverick"]);

        assert_eq!(first.objects_created, 1);
        assert_eq!(second.objects_created, 0);
        assert_eq!(mission.objects().len(), 1);
        let obj = mission.object(0x4000001).unwrap();
        assert_eq!(obj.name, "Alpha");
        assert_eq!(obj.pilot, "Maverick");
    }

    #[test]
    fn comments_and_headers_do_not_create_objects() {
        let mut mission = AcmiMission::new();
        mission.apply_lines([
            "FileType=text/acmi/tacview",
            "FileVersion=2.2",
            "// telemetry feed",
            "",
        ]);
        assert!(mission.objects().is_empty());
        assert_eq!(mission.file_type, "text/acmi/tacview");
        assert_eq!(mission.file_version, "2.2");
    }

    #[test]
    fn global_attributes_applied_to_mission() {
        let mut mission = AcmiMission::new();
        mission.apply_lines([
            "0,Title=Red Flag,Author=Range Control",
            "0,ReferenceTime=2026-08-30T12:00:00Z,ReferenceLongitude=-115.5",
        ]);
        assert_eq!(mission.title, "Red Flag");
        assert_eq!(mission.author, "Range Control");
        assert_eq!(mission.reference_longitude, -115.5);
        assert!(mission.objects().is_empty());

        mission.apply_lines(["#30.0"]);
        let utc = mission.current_time_utc().unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-08-30T12:00:30+00:00");
    }

    #[test]
    fn destruction_is_monotonic() {
        let mut mission = AcmiMission::new();
        mission.apply_lines(["4000001,Name=Alpha", "-4000001,"]);
        assert!(mission.object(0x4000001).unwrap().destroyed);

        // Reappearance is an anomaly: applied, but never revived.
        mission.apply_lines(["4000001,Pilot=Ghost"]);
        let obj = mission.object(0x4000001).unwrap();
        assert!(obj.destroyed);
        assert_eq!(obj.pilot, "Ghost");
    }

    #[test]
    fn events_reach_subscribers() {
        let mut mission = AcmiMission::new();
        let mut rx = mission.subscribe_events();

        let report = mission.apply_lines([
            "0,Event=Bookmark|Fight's on",
            "0,Event=Destroyed|4000001|Splash one",
        ]);
        assert_eq!(report.events_emitted, 2);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.kind, EventKind::Bookmark);
        assert_eq!(first.text, "Fight's on");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.kind, EventKind::Destroyed);
        assert_eq!(second.object_ids, vec![0x4000001]);
    }

    #[test]
    fn events_without_subscribers_are_dropped_quietly() {
        let mut mission = AcmiMission::new();
        let report = mission.apply_lines(["0,Event=Message|hello"]);
        assert_eq!(report.events_emitted, 1);
    }

    #[test]
    fn unknown_id_merges_into_sentinel_object() {
        let mut mission = AcmiMission::new();
        mission.apply_lines(["garbage,Name=First", "alsobad,Pilot=Second"]);
        assert_eq!(mission.objects().len(), 1);
        let obj = mission.object(UNKNOWN_ID).unwrap();
        assert_eq!(obj.name, "First");
        assert_eq!(obj.pilot, "Second");
    }

    #[test]
    fn later_time_markers_also_advance_time() {
        let mut mission = AcmiMission::new();
        mission.apply_lines(["#1.0", "4000001,Name=x", "#2.5", "4000001,IAS=100"]);
        assert_eq!(mission.current_frame(), 2.5);
    }
}
