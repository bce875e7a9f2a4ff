//! Live object model.
//!
//! A [`SimObject`] is one simulated entity's current attribute set,
//! reconstructed incrementally from decoded update lines. All mutation
//! goes through [`SimObject::apply_message`]; objects are never deleted,
//! only flagged destroyed (removal policy belongs to the mission layer).

mod coord;
pub mod registry;

pub use coord::CoordinateUpdate;
pub use registry::{PropertyKind, Slot};

use tracing::trace;

use crate::wire::AcmiMessage;

/// Outcome of applying one `key=value` segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// Converted and written to the target slot.
    Applied,
    /// Unknown key or empty segment; skipped silently.
    Ignored,
    /// Known key whose value failed conversion; slot left unchanged.
    Rejected,
}

/// Accumulated outcome of applying a whole message.
///
/// Rejections never abort the remaining segments; they are collected here
/// for the caller to log or inspect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOutcome {
    pub applied: usize,
    pub ignored: usize,
    /// Verbatim segment text of each rejected field.
    pub rejected: Vec<String>,
}

impl FieldOutcome {
    fn record(&mut self, status: FieldStatus, segment: &str) {
        match status {
            FieldStatus::Applied => self.applied += 1,
            FieldStatus::Ignored => self.ignored += 1,
            FieldStatus::Rejected => self.rejected.push(segment.to_string()),
        }
    }
}

/// One simulated entity's current state.
///
/// Field names follow the ACMI property catalogue. Everything defaults to
/// zero/empty and fills in as updates arrive; the feed is delta-encoded,
/// so a fresh object may stay sparse for its whole life.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimObject {
    pub id: u64,
    pub destroyed: bool,

    pub name: String,
    pub object_type: String,

    // Spatial state, decoded from the composite `T` field.
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
    pub heading: f64,

    // Relations to other objects.
    pub parent_id: u64,
    pub next_id: u64,
    pub focused_target: u64,
    pub locked_targets: [u64; 10],

    // Display metadata.
    pub short_name: String,
    pub long_name: String,
    pub full_name: String,
    pub call_sign: String,
    pub registration: String,
    pub squawk: i32,
    pub icao24: String,
    pub pilot: String,
    pub group: String,
    pub country: String,
    pub coalition: String,
    pub color: String,
    pub shape: String,
    pub debug_info: String,
    pub label: String,
    pub importance: f64,
    pub slot_number: i32,
    pub visible: bool,
    pub enabled: bool,
    pub health: f64,

    // Physical dimensions.
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub radius: f64,

    // Kinematics.
    pub ias: f64,
    pub cas: f64,
    pub tas: f64,
    pub mach: f64,
    pub aoa: f64,
    pub agl: f64,

    // Pilot inputs.
    pub throttle: f64,
    pub afterburner: bool,
    pub air_brakes: f64,
    pub flaps: f64,
    pub landing_gear: f64,

    // Radar and lock state.
    pub radar_mode: i32,
    pub radar_azimuth: f64,
    pub radar_elevation: f64,
    pub radar_range: f64,
    pub locked_target_mode: i32,
    pub locked_target_azimuth: f64,
    pub locked_target_elevation: f64,
    pub locked_target_range: f64,

    // Fuel state.
    pub fuel_weight: [f64; 10],
    pub fuel_volume: f64,
    pub fuel_flow_weight: f64,
}

impl SimObject {
    pub fn new(id: u64) -> Self {
        Self { id, ..Self::default() }
    }

    /// Applies every `key=value` segment of a decoded message.
    ///
    /// Conversion failures are per-segment and never stop the rest of the
    /// message; the destroyed flag is the mission's call, not handled here.
    pub fn apply_message(&mut self, message: &AcmiMessage) -> FieldOutcome {
        let mut outcome = FieldOutcome::default();
        for segment in message.fields() {
            let status = self.apply_segment(segment);
            outcome.record(status, segment);
        }
        outcome
    }

    fn apply_segment(&mut self, segment: &str) -> FieldStatus {
        if segment.is_empty() {
            return FieldStatus::Ignored;
        }
        let Some((key, value)) = segment.split_once('=') else {
            // Not a key=value pair at all.
            return FieldStatus::Rejected;
        };
        let Some(slot) = registry::resolve(key) else {
            trace!(key, "unknown property, ignored");
            return FieldStatus::Ignored;
        };
        self.apply_field(slot, value)
    }

    /// Converts `value` per the slot's semantic type and writes it.
    pub fn apply_field(&mut self, slot: Slot, value: &str) -> FieldStatus {
        match slot.kind() {
            PropertyKind::Id => match u64::from_str_radix(value, 16) {
                Ok(id) => {
                    self.set_id_slot(slot, id);
                    FieldStatus::Applied
                }
                Err(_) => FieldStatus::Rejected,
            },
            PropertyKind::Float => match value.parse::<f64>() {
                Ok(v) => {
                    self.set_float_slot(slot, v);
                    FieldStatus::Applied
                }
                Err(_) => FieldStatus::Rejected,
            },
            PropertyKind::Int => match value.parse::<i32>() {
                Ok(v) => {
                    self.set_int_slot(slot, v);
                    FieldStatus::Applied
                }
                Err(_) => FieldStatus::Rejected,
            },
            PropertyKind::Bool => {
                // No "unknown" state: only the literal `1` means true.
                self.set_bool_slot(slot, value == "1");
                FieldStatus::Applied
            }
            PropertyKind::Text => {
                self.set_text_slot(slot, value);
                FieldStatus::Applied
            }
            PropertyKind::Coord => match CoordinateUpdate::parse(value) {
                Some(update) => {
                    self.apply_coordinates(update);
                    FieldStatus::Applied
                }
                None => FieldStatus::Rejected,
            },
        }
    }

    /// Applies a sparse coordinate update, retaining previous values for
    /// absent components.
    pub fn apply_coordinates(&mut self, update: CoordinateUpdate) {
        if let Some(longitude) = update.longitude {
            self.longitude = longitude;
        }
        if let Some(latitude) = update.latitude {
            self.latitude = latitude;
        }
        if let Some(altitude) = update.altitude {
            self.altitude = altitude;
        }
        if let Some(heading) = update.heading {
            self.heading = heading;
        }
    }

    fn set_id_slot(&mut self, slot: Slot, id: u64) {
        match slot {
            Slot::Parent => self.parent_id = id,
            Slot::Next => self.next_id = id,
            Slot::FocusedTarget => self.focused_target = id,
            Slot::LockedTarget(i) => self.locked_targets[i] = id,
            _ => unreachable!("kind/slot mismatch"),
        }
    }

    fn set_float_slot(&mut self, slot: Slot, v: f64) {
        match slot {
            Slot::Importance => self.importance = v,
            Slot::Health => self.health = v,
            Slot::Length => self.length = v,
            Slot::Width => self.width = v,
            Slot::Height => self.height = v,
            Slot::Radius => self.radius = v,
            Slot::Ias => self.ias = v,
            Slot::Cas => self.cas = v,
            Slot::Tas => self.tas = v,
            Slot::Mach => self.mach = v,
            Slot::Aoa => self.aoa = v,
            Slot::Agl => self.agl = v,
            Slot::Throttle => self.throttle = v,
            Slot::AirBrakes => self.air_brakes = v,
            Slot::Flaps => self.flaps = v,
            Slot::LandingGear => self.landing_gear = v,
            Slot::RadarAzimuth => self.radar_azimuth = v,
            Slot::RadarElevation => self.radar_elevation = v,
            Slot::RadarRange => self.radar_range = v,
            Slot::LockedTargetAzimuth => self.locked_target_azimuth = v,
            Slot::LockedTargetElevation => self.locked_target_elevation = v,
            Slot::LockedTargetRange => self.locked_target_range = v,
            Slot::FuelTank(i) => self.fuel_weight[i] = v,
            Slot::FuelVolume => self.fuel_volume = v,
            Slot::FuelFlowWeight => self.fuel_flow_weight = v,
            _ => unreachable!("kind/slot mismatch"),
        }
    }

    fn set_int_slot(&mut self, slot: Slot, v: i32) {
        match slot {
            Slot::Squawk => self.squawk = v,
            Slot::SlotNumber => self.slot_number = v,
            Slot::RadarMode => self.radar_mode = v,
            Slot::LockedTargetMode => self.locked_target_mode = v,
            _ => unreachable!("kind/slot mismatch"),
        }
    }

    fn set_bool_slot(&mut self, slot: Slot, v: bool) {
        match slot {
            Slot::Visible => self.visible = v,
            Slot::Enabled => self.enabled = v,
            Slot::Afterburner => self.afterburner = v,
            _ => unreachable!("kind/slot mismatch"),
        }
    }

    fn set_text_slot(&mut self, slot: Slot, v: &str) {
        let target = match slot {
            Slot::Name => &mut self.name,
            Slot::Type => &mut self.object_type,
            Slot::ShortName => &mut self.short_name,
            Slot::LongName => &mut self.long_name,
            Slot::FullName => &mut self.full_name,
            Slot::CallSign => &mut self.call_sign,
            Slot::Registration => &mut self.registration,
            Slot::Icao24 => &mut self.icao24,
            Slot::Pilot => &mut self.pilot,
            Slot::Group => &mut self.group,
            Slot::Country => &mut self.country,
            Slot::Coalition => &mut self.coalition,
            Slot::Color => &mut self.color,
            Slot::Shape => &mut self.shape,
            Slot::Debug => &mut self.debug_info,
            Slot::Label => &mut self.label,
            _ => unreachable!("kind/slot mismatch"),
        };
        *target = v.to_string();
    }
}
