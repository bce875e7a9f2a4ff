//! Static property registry mapping wire field names to object slots.
//!
//! The reference implementation resolved aliases through runtime attribute
//! reflection. Here the whole dispatch is a table built once at first use:
//! every wire alias (including the indexed forms like `LockedTarget3`)
//! points at a [`Slot`], a closed enum naming the target field on
//! [`crate::object::SimObject`]. Unknown keys simply miss the table and are
//! ignored, which is what keeps the decoder forward compatible with newer
//! hosts.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Semantic type of a property, driving the text-to-value conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Unsigned 64-bit id, hexadecimal on the wire.
    Id,
    Float,
    Int,
    /// Literal `1` is true, anything else false.
    Bool,
    Text,
    /// Composite `|`-delimited coordinate tuple.
    Coord,
}

/// Target slot on a [`crate::object::SimObject`].
///
/// Array-valued targets carry their index (`LockedTarget3` resolves to
/// `LockedTarget(3)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Name,
    Type,
    Parent,
    Next,
    FocusedTarget,
    LockedTarget(usize),
    Position,
    ShortName,
    LongName,
    FullName,
    CallSign,
    Registration,
    Squawk,
    Icao24,
    Pilot,
    Group,
    Country,
    Coalition,
    Color,
    Shape,
    Debug,
    Label,
    Importance,
    SlotNumber,
    Visible,
    Enabled,
    Health,
    Length,
    Width,
    Height,
    Radius,
    Ias,
    Cas,
    Tas,
    Mach,
    Aoa,
    Agl,
    Throttle,
    Afterburner,
    AirBrakes,
    Flaps,
    LandingGear,
    RadarMode,
    RadarAzimuth,
    RadarElevation,
    RadarRange,
    LockedTargetMode,
    LockedTargetAzimuth,
    LockedTargetElevation,
    LockedTargetRange,
    FuelTank(usize),
    FuelVolume,
    FuelFlowWeight,
}

impl Slot {
    /// The conversion rule attached to this slot.
    pub fn kind(&self) -> PropertyKind {
        use Slot::*;
        match self {
            Parent | Next | FocusedTarget | LockedTarget(_) => PropertyKind::Id,
            Position => PropertyKind::Coord,
            Squawk | SlotNumber | RadarMode | LockedTargetMode => PropertyKind::Int,
            Visible | Enabled | Afterburner => PropertyKind::Bool,
            Importance | Health | Length | Width | Height | Radius | Ias | Cas | Tas | Mach
            | Aoa | Agl | Throttle | AirBrakes | Flaps | LandingGear | RadarAzimuth
            | RadarElevation | RadarRange | LockedTargetAzimuth | LockedTargetElevation
            | LockedTargetRange | FuelTank(_) | FuelVolume | FuelFlowWeight => PropertyKind::Float,
            Name | Type | ShortName | LongName | FullName | CallSign | Registration | Icao24
            | Pilot | Group | Country | Coalition | Color | Shape | Debug | Label => {
                PropertyKind::Text
            }
        }
    }
}

static REGISTRY: LazyLock<HashMap<&'static str, Slot>> = LazyLock::new(|| {
    use Slot::*;
    let mut table: HashMap<&'static str, Slot> = HashMap::new();

    table.insert("Name", Name);
    table.insert("Type", Type);
    // "Parent" is the wire alias; the canonical field name stays addressable.
    table.insert("Parent", Parent);
    table.insert("ParentID", Parent);
    table.insert("Next", Next);
    table.insert("FocusedTarget", FocusedTarget);
    table.insert("T", Position);

    table.insert("ShortName", ShortName);
    table.insert("LongName", LongName);
    table.insert("FullName", FullName);
    table.insert("CallSign", CallSign);
    table.insert("Registration", Registration);
    table.insert("Squawk", Squawk);
    table.insert("ICAO24", Icao24);
    table.insert("Pilot", Pilot);
    table.insert("Group", Group);
    table.insert("Country", Country);
    table.insert("Coalition", Coalition);
    table.insert("Color", Color);
    table.insert("Shape", Shape);
    table.insert("Debug", Debug);
    table.insert("Label", Label);
    table.insert("Importance", Importance);
    table.insert("Slot", SlotNumber);
    table.insert("Visible", Visible);
    table.insert("Enabled", Enabled);
    table.insert("Health", Health);
    table.insert("Length", Length);
    table.insert("Width", Width);
    table.insert("Height", Height);
    table.insert("Radius", Radius);

    table.insert("IAS", Ias);
    table.insert("CAS", Cas);
    table.insert("TAS", Tas);
    table.insert("Mach", Mach);
    table.insert("AOA", Aoa);
    table.insert("AGL", Agl);
    table.insert("Throttle", Throttle);
    table.insert("Afterburner", Afterburner);
    table.insert("AirBrakes", AirBrakes);
    table.insert("Flaps", Flaps);
    table.insert("LandingGear", LandingGear);

    table.insert("RadarMode", RadarMode);
    table.insert("RadarAzimuth", RadarAzimuth);
    table.insert("RadarElevation", RadarElevation);
    table.insert("RadarRange", RadarRange);
    table.insert("LockedTargetMode", LockedTargetMode);
    table.insert("LockedTargetAzimuth", LockedTargetAzimuth);
    table.insert("LockedTargetElevation", LockedTargetElevation);
    table.insert("LockedTargetRange", LockedTargetRange);

    table.insert("FuelVolume", FuelVolume);
    table.insert("FuelFlowWeight", FuelFlowWeight);

    // Indexed aliases: bare name is slot 0, suffixed names address 1..=9.
    const LOCKED: [&str; 10] = [
        "LockedTarget",
        "LockedTarget1",
        "LockedTarget2",
        "LockedTarget3",
        "LockedTarget4",
        "LockedTarget5",
        "LockedTarget6",
        "LockedTarget7",
        "LockedTarget8",
        "LockedTarget9",
    ];
    const FUEL: [&str; 10] = [
        "FuelWeight",
        "FuelWeight1",
        "FuelWeight2",
        "FuelWeight3",
        "FuelWeight4",
        "FuelWeight5",
        "FuelWeight6",
        "FuelWeight7",
        "FuelWeight8",
        "FuelWeight9",
    ];
    for (i, alias) in LOCKED.iter().copied().enumerate() {
        table.insert(alias, LockedTarget(i));
    }
    for (i, alias) in FUEL.iter().copied().enumerate() {
        table.insert(alias, FuelTank(i));
    }

    table
});

/// Resolves a wire field name to its target slot.
///
/// Returns `None` for unknown keys, which callers ignore silently.
pub fn resolve(key: &str) -> Option<Slot> {
    REGISTRY.get(key).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_and_alias_both_resolve() {
        assert_eq!(resolve("Parent"), Some(Slot::Parent));
        assert_eq!(resolve("ParentID"), Some(Slot::Parent));
    }

    #[test]
    fn indexed_aliases_carry_their_slot() {
        assert_eq!(resolve("LockedTarget"), Some(Slot::LockedTarget(0)));
        assert_eq!(resolve("LockedTarget3"), Some(Slot::LockedTarget(3)));
        assert_eq!(resolve("LockedTarget9"), Some(Slot::LockedTarget(9)));
        assert_eq!(resolve("FuelWeight"), Some(Slot::FuelTank(0)));
        assert_eq!(resolve("FuelWeight7"), Some(Slot::FuelTank(7)));
    }

    #[test]
    fn unknown_keys_miss() {
        assert_eq!(resolve("LockedTarget10"), None);
        assert_eq!(resolve("NotAProperty"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn kinds_follow_slot_semantics() {
        assert_eq!(Slot::Parent.kind(), PropertyKind::Id);
        assert_eq!(Slot::Position.kind(), PropertyKind::Coord);
        assert_eq!(Slot::Squawk.kind(), PropertyKind::Int);
        assert_eq!(Slot::Afterburner.kind(), PropertyKind::Bool);
        assert_eq!(Slot::Ias.kind(), PropertyKind::Float);
        assert_eq!(Slot::Name.kind(), PropertyKind::Text);
        assert_eq!(Slot::FuelTank(4).kind(), PropertyKind::Float);
    }

    #[test]
    fn lookups_are_case_sensitive() {
        assert_eq!(resolve("name"), None);
        assert_eq!(resolve("t"), None);
    }
}
