//! Way tag parsers and the per-edge parsing pipeline
//!
//! [`OsmParsers`] first asks every access-deciding parser whether the way is
//! usable at all. A skipped way writes nothing; otherwise every registered
//! parser runs once, in registration order, and writes only the encoded
//! values it owns.

pub mod access;
pub mod car;
pub mod max_speed;
pub mod moped;
pub mod road_access;
pub mod road_class;
pub mod roundabout;

use std::fmt;

use rustc_hash::FxHashMap;

use butterfly_common::{Error, Result};

use crate::manager::check_width;
use crate::storage::{EdgeIntAccess, RelationFlags};
use crate::way::ReaderWay;

pub use access::{AccessOverride, AccessRules, PermissionTagOverride, VehicleAccessParser};
pub use max_speed::MaxSpeedParser;
pub use moped::MopedParser;
pub use road_access::RoadAccessParser;
pub use road_class::RoadClassParser;
pub use roundabout::RoundaboutParser;

/// Whether and how a vehicle may use a way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WayAccess {
    /// Regular road for this vehicle
    Usable,
    /// Not part of this vehicle's graph
    Skip,
    /// Usable, but needs dedicated handling downstream (ferries)
    Special,
}

impl WayAccess {
    pub fn is_skip(self) -> bool {
        self == WayAccess::Skip
    }

    /// Merge decisions of several vehicles: any special wins, then any usable
    pub fn combine(self, other: WayAccess) -> WayAccess {
        match (self, other) {
            (WayAccess::Special, _) | (_, WayAccess::Special) => WayAccess::Special,
            (WayAccess::Usable, _) | (_, WayAccess::Usable) => WayAccess::Usable,
            _ => WayAccess::Skip,
        }
    }
}

impl fmt::Display for WayAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WayAccess::Usable => "usable",
            WayAccess::Skip => "skip",
            WayAccess::Special => "special",
        })
    }
}

/// Writes the encoded values derived from one way's tags into an edge
pub trait TagParser: fmt::Debug + Send + Sync {
    /// Names of the encoded values this parser writes, and no others
    fn writes(&self) -> Vec<&str>;

    fn handle_way_tags(
        &self,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        way: &ReaderWay,
        relation_flags: &RelationFlags,
    ) -> Result<()>;

    /// Access decision if this parser decides way usability for a vehicle
    fn way_access(&self, _way: &ReaderWay) -> Option<WayAccess> {
        None
    }
}

/// Ordered set of tag parsers run for every edge
#[derive(Debug, Default)]
pub struct OsmParsers {
    way_tag_parsers: Vec<Box<dyn TagParser>>,
    owners: FxHashMap<String, usize>,
    ints_per_edge: usize,
}

impl OsmParsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline that refuses edge storage narrower than `ints_per_edge`
    pub fn with_ints_per_edge(ints_per_edge: usize) -> Self {
        Self {
            ints_per_edge,
            ..Self::default()
        }
    }

    pub fn ints_per_edge(&self) -> usize {
        self.ints_per_edge
    }

    /// Register a parser; two parsers may never write the same encoded value
    pub fn add_way_tag_parser(&mut self, parser: Box<dyn TagParser>) -> Result<()> {
        let index = self.way_tag_parsers.len();
        let written: Vec<String> = parser.writes().iter().map(|s| s.to_string()).collect();
        for name in &written {
            if let Some(&owner) = self.owners.get(name) {
                return Err(Error::Config(format!(
                    "encoded value '{name}' is written by both {:?} and {:?}",
                    self.way_tag_parsers[owner], parser
                )));
            }
        }
        for name in written {
            self.owners.insert(name, index);
        }
        self.way_tag_parsers.push(parser);
        Ok(())
    }

    pub fn parsers(&self) -> impl Iterator<Item = &dyn TagParser> {
        self.way_tag_parsers.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.way_tag_parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.way_tag_parsers.is_empty()
    }

    /// Combined decision of all access parsers; usable if there are none
    pub fn way_access(&self, way: &ReaderWay) -> WayAccess {
        self.way_tag_parsers
            .iter()
            .filter_map(|p| p.way_access(way))
            .reduce(WayAccess::combine)
            .unwrap_or(WayAccess::Usable)
    }

    /// Decide the way's access, then, unless skipped, run every parser
    pub fn handle_way_tags(
        &self,
        edge_id: u32,
        access: &mut dyn EdgeIntAccess,
        way: &ReaderWay,
        relation_flags: &RelationFlags,
    ) -> Result<WayAccess> {
        check_width(self.ints_per_edge, access)?;
        let decision = self.way_access(way);
        if decision.is_skip() {
            tracing::trace!(way_id = way.id, edge_id, "way skipped by all vehicles");
            return Ok(decision);
        }
        for parser in &self.way_tag_parsers {
            parser.handle_way_tags(edge_id, access, way, relation_flags)?;
        }
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArrayEdgeIntAccess;

    #[test]
    fn test_combine() {
        use WayAccess::*;
        assert_eq!(Skip.combine(Skip), Skip);
        assert_eq!(Skip.combine(Usable), Usable);
        assert_eq!(Usable.combine(Skip), Usable);
        assert_eq!(Usable.combine(Special), Special);
        assert_eq!(Special.combine(Skip), Special);
    }

    #[test]
    fn test_narrow_storage_rejected_before_any_write() {
        let parsers = OsmParsers::with_ints_per_edge(2);
        let mut storage = ArrayEdgeIntAccess::new(1);
        let way = ReaderWay::with_tags(1, [("highway", "primary")]);
        let err = parsers
            .handle_way_tags(0, &mut storage, &way, &RelationFlags::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::StorageTooNarrow {
                required: 2,
                actual: 1
            }
        ));
        assert_eq!(storage.edge_count(), 0);
    }

    #[test]
    fn test_empty_pipeline_accepts_everything() {
        let parsers = OsmParsers::new();
        assert_eq!(parsers.way_access(&ReaderWay::new(1)), WayAccess::Usable);
        assert!(parsers.is_empty());
    }
}
