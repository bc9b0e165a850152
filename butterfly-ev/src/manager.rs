//! EncodingManager - the frozen registry of encoded values for one graph
//!
//! Built once before import through [`EncodingManagerBuilder`]. `build()`
//! consumes the builder, so no value can be added after bit layout is fixed.

use rustc_hash::FxHashMap;

use butterfly_common::{suggest_correction, Error, Result};

use crate::ev::{
    BooleanEncodedValue, DecimalEncodedValue, EncodedValue, EncodedValueDef, EnumEncodedValue,
    InitializerConfig, IntEncodedValue, TagEnum,
};
use crate::storage::{ArrayEdgeIntAccess, EdgeIntAccess, RelationFlags};

/// Words reserved for relation flags handed to parsers
const RELATION_FLAG_INTS: usize = 2;

/// Collects declarations until [`EncodingManagerBuilder::build`]
#[derive(Debug, Default)]
pub struct EncodingManagerBuilder {
    pending: Vec<EncodedValueDef>,
}

impl EncodingManagerBuilder {
    /// Queue `def`, failing if its name is already taken
    pub fn add(mut self, def: EncodedValueDef) -> Result<Self> {
        self.push(def)?;
        Ok(self)
    }

    /// Borrowing variant of [`add`](Self::add) for loops
    pub fn push(&mut self, def: EncodedValueDef) -> Result<()> {
        if self.contains(def.name()) {
            return Err(Error::DuplicateEncodedValue(def.name().to_string()));
        }
        self.pending.push(def);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pending.iter().any(|d| d.name() == name)
    }

    /// Assign slots in registration order and freeze
    pub fn build(self) -> EncodingManager {
        let mut config = InitializerConfig::new();
        let mut by_name = FxHashMap::default();
        let mut encoded_values = Vec::with_capacity(self.pending.len());

        for def in self.pending {
            let ev = def.init(&mut config);
            tracing::debug!(
                name = ev.name(),
                bits = ev.bits(),
                slots = ?ev.slots().collect::<Vec<_>>(),
                "assigned encoded value"
            );
            by_name.insert(ev.name().to_string(), encoded_values.len());
            encoded_values.push(ev);
        }

        tracing::debug!(
            encoded_values = encoded_values.len(),
            bits_used = config.bits_used(),
            ints_per_edge = config.required_ints(),
            "encoding manager built"
        );

        EncodingManager {
            encoded_values,
            by_name,
            ints_per_edge: config.required_ints(),
            bits_used: config.bits_used(),
        }
    }
}

pub(crate) fn check_width(required: usize, access: &dyn EdgeIntAccess) -> Result<()> {
    let actual = access.ints_per_edge();
    if actual < required {
        return Err(Error::StorageTooNarrow { required, actual });
    }
    Ok(())
}

/// Immutable set of encoded values with their assigned bit layout
#[derive(Debug, Clone)]
pub struct EncodingManager {
    encoded_values: Vec<EncodedValue>,
    by_name: FxHashMap<String, usize>,
    ints_per_edge: usize,
    bits_used: u32,
}

impl EncodingManager {
    pub fn builder() -> EncodingManagerBuilder {
        EncodingManagerBuilder::default()
    }

    pub fn has_encoded_value(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Untyped lookup; callers inspect [`EncodedValue::kind`]
    pub fn encoded_value(&self, name: &str) -> Result<&EncodedValue> {
        match self.by_name.get(name) {
            Some(&i) => Ok(&self.encoded_values[i]),
            None => Err(Error::EncodedValueNotFound {
                name: name.to_string(),
                suggestion: suggest_correction(name, self.names()),
            }),
        }
    }

    pub fn boolean_encoded_value(&self, name: &str) -> Result<BooleanEncodedValue> {
        BooleanEncodedValue::from_encoded_value(self.encoded_value(name)?.clone())
    }

    pub fn int_encoded_value(&self, name: &str) -> Result<IntEncodedValue> {
        IntEncodedValue::from_encoded_value(self.encoded_value(name)?.clone())
    }

    pub fn decimal_encoded_value(&self, name: &str) -> Result<DecimalEncodedValue> {
        DecimalEncodedValue::from_encoded_value(self.encoded_value(name)?.clone())
    }

    pub fn enum_encoded_value<E: TagEnum>(&self, name: &str) -> Result<EnumEncodedValue<E>> {
        EnumEncodedValue::from_encoded_value(self.encoded_value(name)?.clone())
    }

    /// Encoded values in registration order
    pub fn encoded_values(&self) -> &[EncodedValue] {
        &self.encoded_values
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + Clone {
        self.encoded_values.iter().map(|ev| ev.name())
    }

    pub fn ints_per_edge(&self) -> usize {
        self.ints_per_edge
    }

    pub fn bits_used(&self) -> u32 {
        self.bits_used
    }

    /// Zeroed storage for `edges` edges laid out for this manager
    pub fn create_edge_storage(&self, edges: usize) -> ArrayEdgeIntAccess {
        ArrayEdgeIntAccess::with_capacity(self.ints_per_edge, edges)
    }

    /// Reject storage narrower than this layout
    pub fn check_storage(&self, access: &dyn EdgeIntAccess) -> Result<()> {
        check_width(self.ints_per_edge, access)
    }

    pub fn create_relation_flags(&self) -> RelationFlags {
        RelationFlags::new(RELATION_FLAG_INTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ev::{EncodedValueKind, MaxSpeed, Moped, RoadClass, Roundabout, VehicleAccess};
    use crate::storage::EdgeIntAccess;

    fn manager() -> EncodingManager {
        EncodingManager::builder()
            .add(Moped::create().unwrap())
            .unwrap()
            .add(VehicleAccess::create("car").unwrap())
            .unwrap()
            .add(EncodedValueDef::decimal("car_average_speed", 7, 2.0, true).unwrap())
            .unwrap()
            .add(RoadClass::create().unwrap())
            .unwrap()
            .add(Roundabout::create().unwrap())
            .unwrap()
            .build()
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = EncodingManager::builder()
            .add(Moped::create().unwrap())
            .unwrap()
            .add(Moped::create().unwrap());
        assert!(matches!(result, Err(Error::DuplicateEncodedValue(name)) if name == "moped"));
    }

    #[test]
    fn test_lookup_by_name_and_kind() {
        let em = manager();
        assert!(em.has_encoded_value("moped"));
        assert!(em.has_encoded_value("car_access"));
        assert!(!em.has_encoded_value("bike_access"));

        let moped = em.enum_encoded_value::<Moped>("moped").unwrap();
        assert_eq!(moped.name(), "moped");
        assert_eq!(
            em.encoded_value("car_access").unwrap().kind(),
            EncodedValueKind::Boolean
        );
        assert!(em.boolean_encoded_value("car_access").is_ok());
        assert!(em.decimal_encoded_value("car_average_speed").is_ok());
    }

    #[test]
    fn test_kind_mismatch_is_reported() {
        let em = manager();
        let err = em.boolean_encoded_value("moped").unwrap_err();
        assert!(matches!(err, Error::KindMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "encoded value 'moped' is an enum value of Moped, not a boolean value"
        );

        assert!(em.enum_encoded_value::<Moped>("car_access").is_err());
        // Right kind, wrong enum type
        assert!(matches!(
            em.enum_encoded_value::<RoadClass>("moped"),
            Err(Error::KindMismatch { .. })
        ));
        assert!(em.int_encoded_value("car_average_speed").is_err());
    }

    #[test]
    fn test_missing_name_suggests_correction() {
        let em = manager();
        match em.encoded_value("road_clas") {
            Err(Error::EncodedValueNotFound { name, suggestion }) => {
                assert_eq!(name, "road_clas");
                assert_eq!(suggestion.as_deref(), Some("road_class"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(em.encoded_value(MaxSpeed::KEY).is_err());
    }

    #[test]
    fn test_layout_is_disjoint_and_fits() {
        let em = manager();
        let mut ranges: Vec<(usize, usize)> = em
            .encoded_values()
            .iter()
            .flat_map(|ev| ev.slots().map(|s| s.bit_range()).collect::<Vec<_>>())
            .collect();
        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "overlap: {pair:?}");
        }
        let cell_bits = em.ints_per_edge() * 32;
        assert!(ranges.iter().all(|&(_, end)| end <= cell_bits));
        // 3 + 2 + 14 + 5 + 1
        assert_eq!(em.bits_used(), 25);
        assert_eq!(em.ints_per_edge(), 1);
    }

    #[test]
    fn test_unwritten_edge_reads_missing_defaults() {
        let em = manager();
        let storage = em.create_edge_storage(4);
        let moped = em.enum_encoded_value::<Moped>("moped").unwrap();
        let car_access = em.boolean_encoded_value("car_access").unwrap();
        let speed = em.decimal_encoded_value("car_average_speed").unwrap();

        for edge in 0..4 {
            assert_eq!(moped.get_enum(false, edge, &storage), Moped::Missing);
            assert!(!car_access.get_bool(false, edge, &storage));
            assert!(!car_access.get_bool(true, edge, &storage));
            assert_eq!(speed.get_decimal(true, edge, &storage), 0.0);
            assert!(storage.edge_words(edge).iter().all(|w| *w == 0));
        }
        assert_eq!(storage.get_int(3, 0), 0);
    }

    #[test]
    fn test_registration_order_moves_slots_not_meaning() {
        let forward = manager();
        let reversed = EncodingManager::builder()
            .add(Roundabout::create().unwrap())
            .unwrap()
            .add(RoadClass::create().unwrap())
            .unwrap()
            .add(EncodedValueDef::decimal("car_average_speed", 7, 2.0, true).unwrap())
            .unwrap()
            .add(VehicleAccess::create("car").unwrap())
            .unwrap()
            .add(Moped::create().unwrap())
            .unwrap()
            .build();

        let mut a: Vec<&str> = forward.names().collect();
        let mut b: Vec<&str> = reversed.names().collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);

        for name in forward.names() {
            let x = forward.encoded_value(name).unwrap();
            let y = reversed.encoded_value(name).unwrap();
            assert_eq!(x.kind(), y.kind());
            assert_eq!(x.bits(), y.bits());
        }
    }
}
