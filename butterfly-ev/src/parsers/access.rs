//! Way accessibility per vehicle
//!
//! [`AccessRules`] is the shared rule table. A [`VehicleAccessParser`]
//! combines one rule table with an ordered list of [`AccessOverride`]s;
//! an override claims certain highway categories and decides them on its
//! own, every other category falls through to the rule table unchanged.

use std::fmt;

use rustc_hash::FxHashSet;

use butterfly_common::Result;

use super::{TagParser, WayAccess};
use crate::ev::BooleanEncodedValue;
use crate::storage::{EdgeIntAccess, RelationFlags};
use crate::way::ReaderWay;

const FERRY_ROUTES: &[&str] = &["ferry", "shuttle_train"];
const IMPLIED_ONEWAY_JUNCTIONS: &[&str] = &["roundabout", "circular"];
const IMPLIED_ONEWAY_HIGHWAYS: &[&str] = &["motorway", "motorway_link"];

/// Outcome of walking the restriction keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restriction {
    Deny,
    Allow,
    Undecided,
}

fn to_set<I, S>(values: I) -> FxHashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

/// Base rule table shared by vehicle kinds
#[derive(Debug, Clone)]
pub struct AccessRules {
    /// Most specific first, e.g. `motorcar` before `access`
    restriction_keys: Vec<String>,
    restricted_values: FxHashSet<String>,
    intended_values: FxHashSet<String>,
    highway_values: FxHashSet<String>,
    block_fords: bool,
}

impl AccessRules {
    /// Rules with the generic restricted and intended values and no highways
    pub fn new<I, S>(restriction_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            restriction_keys: restriction_keys.into_iter().map(Into::into).collect(),
            restricted_values: to_set([
                "no",
                "restricted",
                "military",
                "emergency",
                "private",
                "permit",
            ]),
            intended_values: to_set(["yes", "designated", "official", "permissive"]),
            highway_values: FxHashSet::default(),
            block_fords: false,
        }
    }

    pub fn with_restricted_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restricted_values.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_intended_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.intended_values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Add highway categories usable by default
    pub fn with_highways<I, S>(mut self, highways: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highway_values.extend(highways.into_iter().map(Into::into));
        self
    }

    pub fn with_block_fords(mut self, block_fords: bool) -> Self {
        self.block_fords = block_fords;
        self
    }

    pub fn restriction_keys(&self) -> &[String] {
        &self.restriction_keys
    }

    pub fn allows_highway(&self, highway: &str) -> bool {
        self.highway_values.contains(highway)
    }

    /// Walk the restriction keys; only the first present key counts
    fn restriction(&self, way: &ReaderWay) -> Restriction {
        let Some((_, value)) = way.first_value(self.restriction_keys.as_slice()) else {
            return Restriction::Undecided;
        };
        for part in value.split(';').map(str::trim) {
            if self.restricted_values.contains(part) {
                return Restriction::Deny;
            }
            if self.intended_values.contains(part) {
                return Restriction::Allow;
            }
        }
        Restriction::Undecided
    }

    /// Physical or administrative barriers no access tag can lift
    fn is_barred(&self, way: &ReaderWay) -> bool {
        way.has_tag("impassable", "yes")
            || way.has_tag("status", "impassable")
            || (way.has_tag("highway", "service") && way.has_tag("service", "emergency_access"))
            || (self.block_fords
                && (way.has_tag("highway", "ford")
                    || way.tag("ford").is_some_and(|v| v != "no")))
    }

    /// The base decision procedure; first matching step wins
    pub fn access(&self, way: &ReaderWay) -> WayAccess {
        if way.has_tag_in("route", FERRY_ROUTES) {
            return WayAccess::Special;
        }

        let restriction = self.restriction(way);
        if restriction == Restriction::Deny || self.is_barred(way) {
            return WayAccess::Skip;
        }

        // An access tag cannot turn a non-road into a road
        let Some(highway) = way.tag("highway") else {
            return WayAccess::Skip;
        };
        if restriction == Restriction::Allow {
            return WayAccess::Usable;
        }
        if !self.highway_values.contains(highway) {
            return WayAccess::Skip;
        }
        WayAccess::Usable
    }
}

/// Decides ways of selected highway categories instead of the rule table
pub trait AccessOverride: fmt::Debug + Send + Sync {
    fn intercepts(&self, highway: &str) -> bool;

    fn access(&self, way: &ReaderWay) -> WayAccess;
}

/// Categories usable only when a permission tag explicitly allows them
///
/// Absent tag or any value outside `permitted` (including "no") skips.
#[derive(Debug, Clone)]
pub struct PermissionTagOverride {
    highways: FxHashSet<String>,
    tag: String,
    permitted: Vec<String>,
}

impl PermissionTagOverride {
    pub fn new<H, P, S, T>(highways: H, tag: impl Into<String>, permitted: P) -> Self
    where
        H: IntoIterator<Item = S>,
        S: Into<String>,
        P: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            highways: to_set(highways),
            tag: tag.into(),
            permitted: permitted.into_iter().map(Into::into).collect(),
        }
    }
}

impl AccessOverride for PermissionTagOverride {
    fn intercepts(&self, highway: &str) -> bool {
        self.highways.contains(highway)
    }

    fn access(&self, way: &ReaderWay) -> WayAccess {
        match way.tag(&self.tag) {
            Some(value) if self.permitted.iter().any(|p| p.eq_ignore_ascii_case(value)) => {
                WayAccess::Usable
            }
            _ => WayAccess::Skip,
        }
    }
}

/// Access decision plus the `<vehicle>_access` flag for one vehicle
#[derive(Debug)]
pub struct VehicleAccessParser {
    vehicle: String,
    rules: AccessRules,
    overrides: Vec<Box<dyn AccessOverride>>,
    oneway_keys: Vec<String>,
    access_enc: BooleanEncodedValue,
}

impl VehicleAccessParser {
    pub fn new(
        vehicle: impl Into<String>,
        access_enc: BooleanEncodedValue,
        rules: AccessRules,
    ) -> Self {
        let vehicle = vehicle.into();
        let oneway_keys = vec![format!("oneway:{vehicle}"), "oneway".to_string()];
        Self {
            vehicle,
            rules,
            overrides: Vec::new(),
            oneway_keys,
            access_enc,
        }
    }

    /// Append an override; earlier overrides claim shared categories first
    pub fn with_override(mut self, access_override: impl AccessOverride + 'static) -> Self {
        self.overrides.push(Box::new(access_override));
        self
    }

    /// Make categories the base vehicle excludes usable by default
    pub fn widen_highways<I, S>(mut self, highways: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules = self.rules.with_highways(highways);
        self
    }

    pub fn vehicle(&self) -> &str {
        &self.vehicle
    }

    pub fn rules(&self) -> &AccessRules {
        &self.rules
    }

    pub fn access(&self, way: &ReaderWay) -> WayAccess {
        if let Some(highway) = way.tag("highway") {
            if let Some(o) = self.overrides.iter().find(|o| o.intercepts(highway)) {
                return o.access(way);
            }
        }
        self.rules.access(way)
    }

    /// (forward, backward) traversability of a usable way
    fn directions(&self, way: &ReaderWay) -> (bool, bool) {
        match way.first_value(self.oneway_keys.as_slice()).map(|(_, v)| v) {
            Some("yes" | "true" | "1") => (true, false),
            Some("-1" | "reverse") => (false, true),
            Some("no" | "false" | "0") => (true, true),
            _ if way.has_tag_in("junction", IMPLIED_ONEWAY_JUNCTIONS)
                || way.has_tag_in("highway", IMPLIED_ONEWAY_HIGHWAYS) =>
            {
                (true, false)
            }
            _ => (true, true),
        }
    }
}

impl TagParser for VehicleAccessParser {
    fn writes(&self) -> Vec<&str> {
        vec![self.access_enc.name()]
    }

    fn handle_way_tags(
        &self,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        way: &ReaderWay,
        _relation_flags: &RelationFlags,
    ) -> Result<()> {
        let (fwd, bwd) = match self.access(way) {
            WayAccess::Skip => return Ok(()),
            WayAccess::Special => (true, true),
            WayAccess::Usable => self.directions(way),
        };
        self.access_enc.set_bool(false, edge_id, access, fwd);
        self.access_enc.set_bool(true, edge_id, access, bwd);
        Ok(())
    }

    fn way_access(&self, way: &ReaderWay) -> Option<WayAccess> {
        Some(self.access(way))
    }
}
