//! Concrete encoded values understood by the import pipeline

use std::fmt;

use butterfly_common::Result;

use super::encoded_value::EncodedValueDef;
use super::enum_value::TagEnum;

macro_rules! impl_display_by_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        })*
    };
}

impl_display_by_name!(Moped, RoadClass, RoadAccess);

/// Value of the OSM `moped` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Moped {
    Missing,
    No,
    Yes,
    Designated,
    UseSidepath,
}

impl TagEnum for Moped {
    const KEY: &'static str = "moped";
    const VALUES: &'static [Self] = &[
        Moped::Missing,
        Moped::No,
        Moped::Yes,
        Moped::Designated,
        Moped::UseSidepath,
    ];

    fn name(self) -> &'static str {
        match self {
            Moped::Missing => "missing",
            Moped::No => "no",
            Moped::Yes => "yes",
            Moped::Designated => "designated",
            Moped::UseSidepath => "use_sidepath",
        }
    }
}

/// Road category derived from `highway`; `_link` ways share their road's class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadClass {
    Missing,
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Unclassified,
    Service,
    Road,
    Track,
    Bridleway,
    Steps,
    Cycleway,
    Path,
    LivingStreet,
    Footway,
    Pedestrian,
    Platform,
    Corridor,
    Construction,
    Busway,
}

impl TagEnum for RoadClass {
    const KEY: &'static str = "road_class";
    const VALUES: &'static [Self] = &[
        RoadClass::Missing,
        RoadClass::Motorway,
        RoadClass::Trunk,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Residential,
        RoadClass::Unclassified,
        RoadClass::Service,
        RoadClass::Road,
        RoadClass::Track,
        RoadClass::Bridleway,
        RoadClass::Steps,
        RoadClass::Cycleway,
        RoadClass::Path,
        RoadClass::LivingStreet,
        RoadClass::Footway,
        RoadClass::Pedestrian,
        RoadClass::Platform,
        RoadClass::Corridor,
        RoadClass::Construction,
        RoadClass::Busway,
    ];

    fn name(self) -> &'static str {
        match self {
            RoadClass::Missing => "missing",
            RoadClass::Motorway => "motorway",
            RoadClass::Trunk => "trunk",
            RoadClass::Primary => "primary",
            RoadClass::Secondary => "secondary",
            RoadClass::Tertiary => "tertiary",
            RoadClass::Residential => "residential",
            RoadClass::Unclassified => "unclassified",
            RoadClass::Service => "service",
            RoadClass::Road => "road",
            RoadClass::Track => "track",
            RoadClass::Bridleway => "bridleway",
            RoadClass::Steps => "steps",
            RoadClass::Cycleway => "cycleway",
            RoadClass::Path => "path",
            RoadClass::LivingStreet => "living_street",
            RoadClass::Footway => "footway",
            RoadClass::Pedestrian => "pedestrian",
            RoadClass::Platform => "platform",
            RoadClass::Corridor => "corridor",
            RoadClass::Construction => "construction",
            RoadClass::Busway => "busway",
        }
    }
}

/// Legal access situation for general traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadAccess {
    Missing,
    Yes,
    Destination,
    Customers,
    Delivery,
    Forestry,
    Agricultural,
    Private,
    No,
}

impl TagEnum for RoadAccess {
    const KEY: &'static str = "road_access";
    const VALUES: &'static [Self] = &[
        RoadAccess::Missing,
        RoadAccess::Yes,
        RoadAccess::Destination,
        RoadAccess::Customers,
        RoadAccess::Delivery,
        RoadAccess::Forestry,
        RoadAccess::Agricultural,
        RoadAccess::Private,
        RoadAccess::No,
    ];

    fn name(self) -> &'static str {
        match self {
            RoadAccess::Missing => "missing",
            RoadAccess::Yes => "yes",
            RoadAccess::Destination => "destination",
            RoadAccess::Customers => "customers",
            RoadAccess::Delivery => "delivery",
            RoadAccess::Forestry => "forestry",
            RoadAccess::Agricultural => "agricultural",
            RoadAccess::Private => "private",
            RoadAccess::No => "no",
        }
    }
}

/// Per-vehicle accessibility flag, one bit per direction
pub struct VehicleAccess;

impl VehicleAccess {
    pub fn key(vehicle: &str) -> String {
        format!("{vehicle}_access")
    }

    pub fn create(vehicle: &str) -> Result<EncodedValueDef> {
        EncodedValueDef::boolean(Self::key(vehicle), true)
    }
}

/// Whether the way is part of a roundabout
pub struct Roundabout;

impl Roundabout {
    pub const KEY: &'static str = "roundabout";

    pub fn create() -> Result<EncodedValueDef> {
        EncodedValueDef::boolean(Self::KEY, false)
    }
}

/// Posted speed limit in km/h per direction; 0 means no usable `maxspeed` tag
pub struct MaxSpeed;

impl MaxSpeed {
    pub const KEY: &'static str = "max_speed";

    /// Stored for `maxspeed=none`
    pub const UNLIMITED_SIGN_SPEED: f64 = 150.0;

    pub fn create() -> Result<EncodedValueDef> {
        EncodedValueDef::decimal(Self::KEY, 7, 2.0, true)
    }
}
