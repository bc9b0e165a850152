use butterfly_common::Result;

use super::TagParser;
use crate::ev::{BooleanEncodedValue, Roundabout};
use crate::manager::EncodingManager;
use crate::storage::{EdgeIntAccess, RelationFlags};
use crate::way::ReaderWay;

const ROUNDABOUT_JUNCTIONS: &[&str] = &["roundabout", "circular"];

#[derive(Debug, Clone)]
pub struct RoundaboutParser {
    roundabout_enc: BooleanEncodedValue,
}

impl RoundaboutParser {
    pub fn new(roundabout_enc: BooleanEncodedValue) -> Self {
        Self { roundabout_enc }
    }

    pub fn from_manager(em: &EncodingManager) -> Result<Self> {
        Ok(Self::new(em.boolean_encoded_value(Roundabout::KEY)?))
    }
}

impl TagParser for RoundaboutParser {
    fn writes(&self) -> Vec<&str> {
        vec![self.roundabout_enc.name()]
    }

    fn handle_way_tags(
        &self,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        way: &ReaderWay,
        _relation_flags: &RelationFlags,
    ) -> Result<()> {
        if way.has_tag_in("junction", ROUNDABOUT_JUNCTIONS) {
            self.roundabout_enc.set_bool(false, edge_id, access, true);
        }
        Ok(())
    }
}
