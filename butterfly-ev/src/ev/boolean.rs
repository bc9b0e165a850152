use butterfly_common::Result;

use super::encoded_value::{EncodedValue, EncodedValueKind};
use crate::storage::EdgeIntAccess;

/// One-bit flag per direction (or one bit for both)
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanEncodedValue(EncodedValue);

impl BooleanEncodedValue {
    pub fn from_encoded_value(ev: EncodedValue) -> Result<Self> {
        ev.expect_kind(EncodedValueKind::Boolean)?;
        Ok(Self(ev))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn encoded_value(&self) -> &EncodedValue {
        &self.0
    }

    pub fn get_bool<A>(&self, reverse: bool, edge_id: u32, access: &A) -> bool
    where
        A: EdgeIntAccess + ?Sized,
    {
        self.0.get_raw(reverse, edge_id, access) != 0
    }

    pub fn set_bool<A>(&self, reverse: bool, edge_id: u32, access: &mut A, value: bool)
    where
        A: EdgeIntAccess + ?Sized,
    {
        self.0.set_raw(reverse, edge_id, access, u32::from(value));
    }
}
