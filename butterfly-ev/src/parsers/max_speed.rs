use butterfly_common::Result;

use super::TagParser;
use crate::ev::{DecimalEncodedValue, MaxSpeed};
use crate::manager::EncodingManager;
use crate::storage::{EdgeIntAccess, RelationFlags};
use crate::way::ReaderWay;

const KMH_PER_MPH: f64 = 1.609344;
const KMH_PER_KNOT: f64 = 1.852;

/// Posted `maxspeed` limits; a parsable direction-specific tag wins over `maxspeed`
#[derive(Debug, Clone)]
pub struct MaxSpeedParser {
    max_speed_enc: DecimalEncodedValue,
}

impl MaxSpeedParser {
    pub fn new(max_speed_enc: DecimalEncodedValue) -> Self {
        Self { max_speed_enc }
    }

    pub fn from_manager(em: &EncodingManager) -> Result<Self> {
        Ok(Self::new(em.decimal_encoded_value(MaxSpeed::KEY)?))
    }

    fn write(
        &self,
        reverse: bool,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        speed: Option<f64>,
    ) -> Result<()> {
        let Some(speed) = speed else {
            return Ok(());
        };
        let speed = speed.min(self.max_speed_enc.max_decimal());
        self.max_speed_enc
            .set_decimal(reverse, edge_id, access, speed)
    }
}

/// Speed in km/h; `none` is the unlimited sign speed, unknown input is `None`
pub fn parse_speed(value: &str) -> Option<f64> {
    let value = value.trim();
    if value == "none" {
        return Some(MaxSpeed::UNLIMITED_SIGN_SPEED);
    }
    if value == "walk" {
        return Some(6.0);
    }

    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;
    let kmh = match unit.trim() {
        "" | "km/h" | "kmh" | "kph" => number,
        "mph" => number * KMH_PER_MPH,
        "knots" => number * KMH_PER_KNOT,
        _ => return None,
    };
    (kmh > 0.0).then_some(kmh)
}

impl TagParser for MaxSpeedParser {
    fn writes(&self) -> Vec<&str> {
        vec![self.max_speed_enc.name()]
    }

    fn handle_way_tags(
        &self,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        way: &ReaderWay,
        _relation_flags: &RelationFlags,
    ) -> Result<()> {
        let both = way.tag("maxspeed").and_then(parse_speed);
        let directed = |key: &str| way.tag(key).and_then(parse_speed).or(both);
        self.write(false, edge_id, access, directed("maxspeed:forward"))?;
        self.write(true, edge_id, access, directed("maxspeed:backward"))
    }
}
