//! Closed tag-value enums stored as ordinals
//!
//! Ordinal 0 of every [`TagEnum`] is its `Missing` variant, so storage that
//! was never written decodes to "missing".

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

use butterfly_common::{Error, Result};

use super::encoded_value::{EncodedValue, EncodedValueDef, EncodedValueKind, KindSpec};
use crate::storage::EdgeIntAccess;

/// A closed set of OSM tag values with a reserved `Missing` first variant
pub trait TagEnum: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Name of the encoded value holding this enum
    const KEY: &'static str;

    /// All variants in ordinal order; `VALUES[0]` is `Missing`
    const VALUES: &'static [Self];

    /// Lowercase tag spelling of the variant
    fn name(self) -> &'static str;

    fn missing() -> Self {
        Self::VALUES[0]
    }

    fn ordinal(self) -> u32 {
        Self::VALUES
            .iter()
            .position(|v| *v == self)
            .unwrap_or(0) as u32
    }

    /// Variant for an ordinal; anything out of range is `Missing`
    fn from_ordinal(ordinal: u32) -> Self {
        Self::VALUES
            .get(ordinal as usize)
            .copied()
            .unwrap_or_else(Self::missing)
    }

    /// Case-insensitive lookup; absent, empty or unknown input is `Missing`
    fn find(value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => Self::VALUES
                .iter()
                .copied()
                .find(|v| v.name().eq_ignore_ascii_case(value))
                .unwrap_or_else(Self::missing),
            _ => Self::missing(),
        }
    }

    /// Declaration sized for exactly this variant set
    fn create() -> Result<EncodedValueDef> {
        declare::<Self>(false)
    }

    /// Like [`TagEnum::create`], with an independent value per direction
    fn create_two_directions() -> Result<EncodedValueDef> {
        declare::<Self>(true)
    }
}

fn declare<E: TagEnum>(two_directions: bool) -> Result<EncodedValueDef> {
    EncodedValueDef::enumeration(
        E::KEY,
        TypeId::of::<E>(),
        short_type_name::<E>(),
        E::VALUES.iter().map(|v| v.name()).collect(),
        two_directions,
    )
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Enum-typed view of an encoded value
#[derive(Debug, Clone, PartialEq)]
pub struct EnumEncodedValue<E: TagEnum> {
    ev: EncodedValue,
    _marker: PhantomData<E>,
}

impl<E: TagEnum> EnumEncodedValue<E> {
    pub fn from_encoded_value(ev: EncodedValue) -> Result<Self> {
        ev.expect_kind(EncodedValueKind::Enum)?;
        match ev.kind_spec() {
            KindSpec::Enum { type_id, .. } if *type_id == TypeId::of::<E>() => Ok(Self {
                ev,
                _marker: PhantomData,
            }),
            _ => Err(Error::KindMismatch {
                name: ev.name().to_string(),
                expected: format!("an enum value of {}", short_type_name::<E>()),
                actual: ev.describe_kind(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        self.ev.name()
    }

    pub fn encoded_value(&self) -> &EncodedValue {
        &self.ev
    }

    pub fn values(&self) -> &'static [E] {
        E::VALUES
    }

    pub fn get_enum<A>(&self, reverse: bool, edge_id: u32, access: &A) -> E
    where
        A: EdgeIntAccess + ?Sized,
    {
        E::from_ordinal(self.ev.get_raw(reverse, edge_id, access))
    }

    pub fn set_enum<A>(&self, reverse: bool, edge_id: u32, access: &mut A, value: E)
    where
        A: EdgeIntAccess + ?Sized,
    {
        // Width is sized to the variant count, every ordinal fits
        self.ev.set_raw(reverse, edge_id, access, value.ordinal());
    }
}
