use butterfly_common::{Error, Result};

use super::encoded_value::{EncodedValue, EncodedValueKind, KindSpec};
use crate::storage::EdgeIntAccess;

/// Non-negative decimal stored as an integer multiple of `factor`
#[derive(Debug, Clone, PartialEq)]
pub struct DecimalEncodedValue {
    ev: EncodedValue,
    factor: f64,
}

impl DecimalEncodedValue {
    pub fn from_encoded_value(ev: EncodedValue) -> Result<Self> {
        ev.expect_kind(EncodedValueKind::Decimal)?;
        let factor = match ev.kind_spec() {
            KindSpec::Decimal { factor } => *factor,
            _ => unreachable!("kind checked above"),
        };
        Ok(Self { ev, factor })
    }

    pub fn name(&self) -> &str {
        self.ev.name()
    }

    pub fn encoded_value(&self) -> &EncodedValue {
        &self.ev
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Largest value that survives a round trip
    pub fn max_decimal(&self) -> f64 {
        f64::from(self.ev.max_value()) * self.factor
    }

    pub fn get_decimal<A>(&self, reverse: bool, edge_id: u32, access: &A) -> f64
    where
        A: EdgeIntAccess + ?Sized,
    {
        f64::from(self.ev.get_raw(reverse, edge_id, access)) * self.factor
    }

    /// Store `value` rounded to the nearest multiple of `factor`
    pub fn set_decimal<A>(
        &self,
        reverse: bool,
        edge_id: u32,
        access: &mut A,
        value: f64,
    ) -> Result<()>
    where
        A: EdgeIntAccess + ?Sized,
    {
        let scaled = (value / self.factor).round();
        if !scaled.is_finite() || scaled < 0.0 || scaled > f64::from(self.ev.max_value()) {
            return Err(Error::ValueOutOfRange {
                name: self.name().to_string(),
                value: if scaled.is_finite() { scaled as i64 } else { i64::MAX },
                min: 0,
                max: i64::from(self.ev.max_value()),
            });
        }
        self.ev.set_int(reverse, edge_id, access, scaled as i32)
    }
}
