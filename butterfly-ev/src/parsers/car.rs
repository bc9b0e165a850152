//! Car profile: the base rule table other motor vehicles derive from

use butterfly_common::Result;

use super::access::{AccessRules, VehicleAccessParser};
use crate::config::PMap;
use crate::ev::VehicleAccess;
use crate::manager::EncodingManager;

pub const CAR: &str = "car";

/// Most specific first
pub const CAR_RESTRICTION_KEYS: &[&str] = &["motorcar", "motor_vehicle", "vehicle", "access"];

pub const CAR_HIGHWAYS: &[&str] = &[
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "unclassified",
    "residential",
    "living_street",
    "service",
    "road",
    "track",
];

impl AccessRules {
    pub fn car() -> Self {
        AccessRules::new(CAR_RESTRICTION_KEYS.iter().copied())
            .with_restricted_values(["agricultural", "forestry", "delivery"])
            .with_highways(CAR_HIGHWAYS.iter().copied())
    }
}

/// `car_access` parser; honours `block_fords`
pub fn car_access_parser(em: &EncodingManager, props: &PMap) -> Result<VehicleAccessParser> {
    let access_enc = em.boolean_encoded_value(&VehicleAccess::key(CAR))?;
    let rules = AccessRules::car().with_block_fords(props.get_bool("block_fords", false)?);
    Ok(VehicleAccessParser::new(CAR, access_enc, rules))
}
