use butterfly_common::Result;

use super::TagParser;
use crate::ev::{EnumEncodedValue, RoadClass, TagEnum};
use crate::manager::EncodingManager;
use crate::storage::{EdgeIntAccess, RelationFlags};
use crate::way::ReaderWay;

/// `highway` value as a [`RoadClass`]; `primary_link` is `primary`
#[derive(Debug, Clone)]
pub struct RoadClassParser {
    road_class_enc: EnumEncodedValue<RoadClass>,
}

impl RoadClassParser {
    pub fn new(road_class_enc: EnumEncodedValue<RoadClass>) -> Self {
        Self { road_class_enc }
    }

    pub fn from_manager(em: &EncodingManager) -> Result<Self> {
        Ok(Self::new(em.enum_encoded_value::<RoadClass>(RoadClass::KEY)?))
    }
}

fn road_class(highway: &str) -> RoadClass {
    let base = highway.strip_suffix("_link").unwrap_or(highway);
    RoadClass::find(Some(base))
}

impl TagParser for RoadClassParser {
    fn writes(&self) -> Vec<&str> {
        vec![self.road_class_enc.name()]
    }

    fn handle_way_tags(
        &self,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        way: &ReaderWay,
        _relation_flags: &RelationFlags,
    ) -> Result<()> {
        if let Some(highway) = way.tag("highway") {
            let class = road_class(highway);
            if class != RoadClass::Missing {
                self.road_class_enc.set_enum(false, edge_id, access, class);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_class_mapping() {
        assert_eq!(road_class("primary"), RoadClass::Primary);
        assert_eq!(road_class("motorway_link"), RoadClass::Motorway);
        assert_eq!(road_class("living_street"), RoadClass::LivingStreet);
        assert_eq!(road_class("raceway"), RoadClass::Missing);
        assert_eq!(road_class("_link"), RoadClass::Missing);
    }

    #[test]
    fn test_parser_writes_class() {
        let em = EncodingManager::builder()
            .add(RoadClass::create().unwrap())
            .unwrap()
            .build();
        let parser = RoadClassParser::from_manager(&em).unwrap();
        let enc = em.enum_encoded_value::<RoadClass>("road_class").unwrap();
        let mut storage = em.create_edge_storage(2);
        let flags = em.create_relation_flags();

        let link = ReaderWay::with_tags(1, [("highway", "trunk_link")]);
        parser.handle_way_tags(0, &mut storage, &link, &flags).unwrap();
        parser
            .handle_way_tags(1, &mut storage, &ReaderWay::new(2), &flags)
            .unwrap();

        assert_eq!(enc.get_enum(false, 0, &storage), RoadClass::Trunk);
        assert_eq!(enc.get_enum(false, 1, &storage), RoadClass::Missing);
    }
}
