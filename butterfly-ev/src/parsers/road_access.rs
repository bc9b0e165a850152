use butterfly_common::Result;

use super::TagParser;
use crate::ev::{EnumEncodedValue, RoadAccess, TagEnum};
use crate::manager::EncodingManager;
use crate::storage::{EdgeIntAccess, RelationFlags};
use crate::way::ReaderWay;

const RESTRICTION_KEYS: &[&str] = &["motor_vehicle", "vehicle", "access"];

/// Legal access for motor traffic from the most specific restriction key
#[derive(Debug, Clone)]
pub struct RoadAccessParser {
    road_access_enc: EnumEncodedValue<RoadAccess>,
}

impl RoadAccessParser {
    pub fn new(road_access_enc: EnumEncodedValue<RoadAccess>) -> Self {
        Self { road_access_enc }
    }

    pub fn from_manager(em: &EncodingManager) -> Result<Self> {
        Ok(Self::new(em.enum_encoded_value::<RoadAccess>(RoadAccess::KEY)?))
    }
}

fn parse_value(value: &str) -> RoadAccess {
    match value {
        "designated" | "official" | "permissive" => RoadAccess::Yes,
        "permit" => RoadAccess::Private,
        other => RoadAccess::find(Some(other)),
    }
}

/// The most restrictive recognised value of a `;` list
fn road_access(value: &str) -> RoadAccess {
    value
        .split(';')
        .map(|v| parse_value(v.trim()))
        .filter(|a| *a != RoadAccess::Missing)
        .max_by_key(|a| a.ordinal())
        .unwrap_or(RoadAccess::Missing)
}

impl TagParser for RoadAccessParser {
    fn writes(&self) -> Vec<&str> {
        vec![self.road_access_enc.name()]
    }

    fn handle_way_tags(
        &self,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        way: &ReaderWay,
        _relation_flags: &RelationFlags,
    ) -> Result<()> {
        if let Some((_, value)) = way.first_value(RESTRICTION_KEYS) {
            let road_access = road_access(value);
            if road_access != RoadAccess::Missing {
                self.road_access_enc
                    .set_enum(false, edge_id, access, road_access);
            }
        }
        Ok(())
    }
}
