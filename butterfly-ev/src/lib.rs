//! Bit-packed edge attributes and OSM way tag parsing
//!
//! Attributes are declared as [`EncodedValueDef`]s, frozen into an
//! [`EncodingManager`] that assigns every value its bit slots, and filled
//! per edge by the [`TagParser`]s of an [`OsmParsers`] pipeline.
//! [`ImportRegistry`] maps configuration keys to the value and parser pair
//! that implement them.
//!
//! ```
//! use butterfly_ev::{assemble, ImportRegistry, PMap, ReaderWay, WayAccess};
//!
//! let registry = ImportRegistry::default();
//! let (em, parsers) = assemble(&registry, ["moped_access"], &PMap::new()).unwrap();
//!
//! let mut storage = em.create_edge_storage(1);
//! let way = ReaderWay::with_tags(1, [("highway", "cycleway"), ("moped", "yes")]);
//! let access = parsers
//!     .handle_way_tags(0, &mut storage, &way, &em.create_relation_flags())
//!     .unwrap();
//! assert_eq!(access, WayAccess::Usable);
//!
//! let moped_access = em.boolean_encoded_value("moped_access").unwrap();
//! assert!(moped_access.get_bool(false, 0, &storage));
//! ```

pub mod config;
pub mod ev;
pub mod manager;
pub mod parsers;
pub mod registry;
pub mod storage;
pub mod way;

pub use butterfly_common::{Error, Result};
pub use config::{ImportConfig, PMap};
pub use ev::{
    BooleanEncodedValue, DecimalEncodedValue, EncodedValue, EncodedValueDef, EncodedValueKind,
    EnumEncodedValue, IntEncodedValue, TagEnum,
};
pub use manager::{EncodingManager, EncodingManagerBuilder};
pub use parsers::{OsmParsers, TagParser, VehicleAccessParser, WayAccess};
pub use registry::{assemble, assemble_config, ImportRegistry, ImportUnit};
pub use storage::{ArrayEdgeIntAccess, EdgeIntAccess, RelationFlags};
pub use way::ReaderWay;
