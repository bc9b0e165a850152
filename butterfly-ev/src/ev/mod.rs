//! Encoded values: typed attributes packed into per-edge storage

pub mod boolean;
pub mod decimal;
pub mod encoded_value;
pub mod enum_value;
pub mod int;
pub mod values;

pub use boolean::BooleanEncodedValue;
pub use decimal::DecimalEncodedValue;
pub use encoded_value::{
    BitSlot, EncodedValue, EncodedValueDef, EncodedValueKind, InitializerConfig, MAX_BITS,
};
pub use enum_value::{EnumEncodedValue, TagEnum};
pub use int::IntEncodedValue;
pub use values::{MaxSpeed, Moped, RoadAccess, RoadClass, Roundabout, VehicleAccess};
