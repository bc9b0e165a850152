use butterfly_common::Result;

use super::encoded_value::{EncodedValue, EncodedValueKind};
use crate::storage::EdgeIntAccess;

/// Integer value in a fixed bit range
#[derive(Debug, Clone, PartialEq)]
pub struct IntEncodedValue(EncodedValue);

impl IntEncodedValue {
    pub fn from_encoded_value(ev: EncodedValue) -> Result<Self> {
        ev.expect_kind(EncodedValueKind::Int)?;
        Ok(Self(ev))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn encoded_value(&self) -> &EncodedValue {
        &self.0
    }

    pub fn max_int(&self) -> i32 {
        self.0.max_value()
    }

    pub fn min_int(&self) -> i32 {
        self.0.min_value()
    }

    pub fn get_int<A>(&self, reverse: bool, edge_id: u32, access: &A) -> i32
    where
        A: EdgeIntAccess + ?Sized,
    {
        self.0.get_int(reverse, edge_id, access)
    }

    pub fn set_int<A>(
        &self,
        reverse: bool,
        edge_id: u32,
        access: &mut A,
        value: i32,
    ) -> Result<()>
    where
        A: EdgeIntAccess + ?Sized,
    {
        self.0.set_int(reverse, edge_id, access, value)
    }
}
