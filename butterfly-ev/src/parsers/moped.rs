//! Moped profile and the `moped` tag parser
//!
//! A moped drives wherever a car does. Cycleways are claimed by a
//! permission override and need an explicit `moped=yes` or
//! `moped=designated`.

use butterfly_common::Result;

use super::access::{AccessRules, PermissionTagOverride, VehicleAccessParser};
use super::TagParser;
use crate::config::PMap;
use crate::ev::{EnumEncodedValue, Moped, TagEnum, VehicleAccess};
use crate::manager::EncodingManager;
use crate::storage::{EdgeIntAccess, RelationFlags};
use crate::way::ReaderWay;

pub const MOPED: &str = "moped";

const PERMISSION_HIGHWAYS: &[&str] = &["cycleway"];

/// `moped_access` parser built on the car rules
pub fn moped_access_parser(em: &EncodingManager, props: &PMap) -> Result<VehicleAccessParser> {
    let access_enc = em.boolean_encoded_value(&VehicleAccess::key(MOPED))?;
    let rules = AccessRules::car().with_block_fords(props.get_bool("block_fords", false)?);
    let permitted = [Moped::Yes.name(), Moped::Designated.name()];

    Ok(VehicleAccessParser::new(MOPED, access_enc, rules)
        .widen_highways(PERMISSION_HIGHWAYS.iter().copied())
        .with_override(PermissionTagOverride::new(
            PERMISSION_HIGHWAYS.iter().copied(),
            Moped::KEY,
            permitted,
        )))
}

/// Stores the raw `moped` tag; absent or unknown values stay missing
#[derive(Debug, Clone)]
pub struct MopedParser {
    moped_enc: EnumEncodedValue<Moped>,
}

impl MopedParser {
    pub fn new(moped_enc: EnumEncodedValue<Moped>) -> Self {
        Self { moped_enc }
    }

    pub fn from_manager(em: &EncodingManager) -> Result<Self> {
        Ok(Self::new(em.enum_encoded_value::<Moped>(Moped::KEY)?))
    }
}

impl TagParser for MopedParser {
    fn writes(&self) -> Vec<&str> {
        vec![self.moped_enc.name()]
    }

    fn handle_way_tags(
        &self,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        way: &ReaderWay,
        _relation_flags: &RelationFlags,
    ) -> Result<()> {
        let moped = Moped::find(way.tag(Moped::KEY));
        if moped != Moped::missing() {
            self.moped_enc.set_enum(false, edge_id, access, moped);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::car::{car_access_parser, CAR};
    use crate::parsers::WayAccess;
    use crate::storage::ArrayEdgeIntAccess;

    fn manager() -> EncodingManager {
        EncodingManager::builder()
            .add(Moped::create().unwrap())
            .unwrap()
            .add(VehicleAccess::create(CAR).unwrap())
            .unwrap()
            .add(VehicleAccess::create(MOPED).unwrap())
            .unwrap()
            .build()
    }

    fn way(tags: &[(&str, &str)]) -> ReaderWay {
        ReaderWay::with_tags(1, tags.iter().copied())
    }

    #[test]
    fn test_access_precedence() {
        let em = manager();
        let car = car_access_parser(&em, &PMap::new()).unwrap();
        let moped = moped_access_parser(&em, &PMap::new()).unwrap();

        assert_eq!(car.access(&way(&[("highway", "motorway")])), WayAccess::Usable);
        assert_eq!(car.access(&way(&[("highway", "cycleway")])), WayAccess::Skip);
        assert_eq!(
            moped.access(&way(&[("highway", "cycleway"), ("moped", "yes")])),
            WayAccess::Usable
        );
        assert_eq!(
            moped.access(&way(&[("highway", "cycleway"), ("moped", "no")])),
            WayAccess::Skip
        );
        assert_eq!(moped.access(&way(&[("highway", "cycleway")])), WayAccess::Skip);
        assert_eq!(
            moped.access(&way(&[("highway", "residential")])),
            car.access(&way(&[("highway", "residential")]))
        );
    }

    #[test]
    fn test_override_bypasses_base_restrictions() {
        let em = manager();
        let moped = moped_access_parser(&em, &PMap::new()).unwrap();
        assert_eq!(
            moped.access(&way(&[
                ("highway", "cycleway"),
                ("access", "no"),
                ("moped", "designated")
            ])),
            WayAccess::Usable
        );
        assert_eq!(
            moped.access(&way(&[("highway", "cycleway"), ("moped", "YES")])),
            WayAccess::Usable
        );
        assert_eq!(
            moped.access(&way(&[("highway", "cycleway"), ("moped", "use_sidepath")])),
            WayAccess::Skip
        );
    }

    #[test]
    fn test_inherits_base_decisions_elsewhere() {
        let em = manager();
        let car = car_access_parser(&em, &PMap::new()).unwrap();
        let moped = moped_access_parser(&em, &PMap::new()).unwrap();
        let cases: &[&[(&str, &str)]] = &[
            &[("highway", "primary"), ("access", "private")],
            &[("highway", "footway")],
            &[("highway", "footway"), ("motor_vehicle", "yes")],
            &[("route", "ferry")],
            &[("highway", "track"), ("motor_vehicle", "agricultural")],
            &[],
        ];
        for tags in cases {
            assert_eq!(moped.access(&way(tags)), car.access(&way(tags)), "{tags:?}");
        }
        assert!(moped.rules().allows_highway("cycleway"));
        assert!(!car.rules().allows_highway("cycleway"));
    }

    #[test]
    fn test_moped_oneway_key() {
        let em = manager();
        let moped = moped_access_parser(&em, &PMap::new()).unwrap();
        let access_enc = em.boolean_encoded_value("moped_access").unwrap();
        let mut storage = ArrayEdgeIntAccess::new(em.ints_per_edge());
        let w = way(&[
            ("highway", "cycleway"),
            ("moped", "yes"),
            ("oneway", "no"),
            ("oneway:moped", "yes"),
        ]);
        moped
            .handle_way_tags(0, &mut storage, &w, &em.create_relation_flags())
            .unwrap();
        assert!(access_enc.get_bool(false, 0, &storage));
        assert!(!access_enc.get_bool(true, 0, &storage));
    }

    #[test]
    fn test_moped_tag_parser() {
        let em = manager();
        let parser = MopedParser::from_manager(&em).unwrap();
        let moped_enc = em.enum_encoded_value::<Moped>(Moped::KEY).unwrap();
        let mut storage = em.create_edge_storage(3);
        let flags = em.create_relation_flags();

        parser
            .handle_way_tags(0, &mut storage, &way(&[("moped", "Designated")]), &flags)
            .unwrap();
        parser
            .handle_way_tags(1, &mut storage, &way(&[("highway", "cycleway")]), &flags)
            .unwrap();
        parser
            .handle_way_tags(2, &mut storage, &way(&[("moped", "sometimes")]), &flags)
            .unwrap();

        assert_eq!(moped_enc.get_enum(false, 0, &storage), Moped::Designated);
        assert_eq!(moped_enc.get_enum(false, 1, &storage), Moped::Missing);
        assert_eq!(moped_enc.get_enum(false, 2, &storage), Moped::Missing);
        assert_eq!(parser.writes(), vec!["moped"]);
    }
}
