//! Encoded value declarations and bit-slot assignment
//!
//! An [`EncodedValueDef`] names a fixed-width slot. Passing it through
//! [`EncodedValueDef::init`] with a shared [`InitializerConfig`] assigns the
//! slot's word index and shift, yielding an immutable [`EncodedValue`].
//! Slots are packed first-fit into 32-bit words and never straddle a word.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use butterfly_common::{Error, Result};

use crate::storage::EdgeIntAccess;

/// Widest slot a single encoded value may occupy
pub const MAX_BITS: u32 = 31;

const WORD_BITS: u32 = 32;

/// Declared kind of an encoded value, exposed so consumers can detect misuse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodedValueKind {
    Int,
    Boolean,
    Decimal,
    Enum,
}

impl fmt::Display for EncodedValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EncodedValueKind::Int => "an integer value",
            EncodedValueKind::Boolean => "a boolean value",
            EncodedValueKind::Decimal => "a decimal value",
            EncodedValueKind::Enum => "an enum value",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum KindSpec {
    Int,
    Boolean,
    Decimal {
        factor: f64,
    },
    Enum {
        type_id: TypeId,
        type_name: &'static str,
        names: Vec<&'static str>,
    },
}

impl KindSpec {
    fn kind(&self) -> EncodedValueKind {
        match self {
            KindSpec::Int => EncodedValueKind::Int,
            KindSpec::Boolean => EncodedValueKind::Boolean,
            KindSpec::Decimal { .. } => EncodedValueKind::Decimal,
            KindSpec::Enum { .. } => EncodedValueKind::Enum,
        }
    }
}

/// Declaration of an encoded value before bit assignment
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedValueDef {
    name: String,
    bits: u32,
    min_value: i32,
    two_directions: bool,
    kind: KindSpec,
}

impl EncodedValueDef {
    fn new(
        name: impl Into<String>,
        bits: u32,
        min_value: i32,
        two_directions: bool,
        kind: KindSpec,
    ) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| Error::InvalidDefinition {
            name: name.clone(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(invalid(
                "name must be lowercase ascii, digits or '_'".to_string(),
            ));
        }
        if bits == 0 || bits > MAX_BITS {
            return Err(invalid(format!("bits must be in 1..={MAX_BITS}, got {bits}")));
        }
        let max = i64::from(min_value) + (1i64 << bits) - 1;
        if min_value > 0 || max > i64::from(i32::MAX) {
            return Err(invalid(format!(
                "range [{min_value}, {max}] does not fit a signed 32-bit value"
            )));
        }

        Ok(Self {
            name,
            bits,
            min_value,
            two_directions,
            kind,
        })
    }

    /// Unsigned integer in `bits` bits
    pub fn int(name: impl Into<String>, bits: u32, two_directions: bool) -> Result<Self> {
        Self::new(name, bits, 0, two_directions, KindSpec::Int)
    }

    /// Integer whose storable range starts at `min_value` (≤ 0)
    pub fn signed_int(
        name: impl Into<String>,
        bits: u32,
        min_value: i32,
        two_directions: bool,
    ) -> Result<Self> {
        Self::new(name, bits, min_value, two_directions, KindSpec::Int)
    }

    pub fn boolean(name: impl Into<String>, two_directions: bool) -> Result<Self> {
        Self::new(name, 1, 0, two_directions, KindSpec::Boolean)
    }

    /// Non-negative decimal stored as `round(value / factor)`
    pub fn decimal(
        name: impl Into<String>,
        bits: u32,
        factor: f64,
        two_directions: bool,
    ) -> Result<Self> {
        let name = name.into();
        if !factor.is_finite() || factor <= 0.0 {
            return Err(Error::InvalidDefinition {
                name,
                reason: format!("factor must be finite and positive, got {factor}"),
            });
        }
        Self::new(name, bits, 0, two_directions, KindSpec::Decimal { factor })
    }

    pub(crate) fn enumeration(
        name: impl Into<String>,
        type_id: TypeId,
        type_name: &'static str,
        names: Vec<&'static str>,
        two_directions: bool,
    ) -> Result<Self> {
        let bits = bits_for_variants(names.len());
        Self::new(
            name,
            bits,
            0,
            two_directions,
            KindSpec::Enum {
                type_id,
                type_name,
                names,
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn kind(&self) -> EncodedValueKind {
        self.kind.kind()
    }

    pub fn is_two_directions(&self) -> bool {
        self.two_directions
    }

    /// Assign bit slots from `config`, advancing it past them
    pub fn init(self, config: &mut InitializerConfig) -> EncodedValue {
        let fwd = config.next_slot(self.bits);
        let bwd = self.two_directions.then(|| config.next_slot(self.bits));
        EncodedValue {
            def: Arc::new(self),
            fwd,
            bwd,
        }
    }
}

/// Smallest width that can hold ordinals `0..count`
pub(crate) fn bits_for_variants(count: usize) -> u32 {
    if count <= 2 {
        1
    } else {
        usize::BITS - (count - 1).leading_zeros()
    }
}

/// Position of one bit range inside an edge's storage cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitSlot {
    /// Word index within the edge
    pub index: usize,
    pub shift: u32,
    pub bits: u32,
}

impl BitSlot {
    pub fn mask(&self) -> u32 {
        (((1u64 << self.bits) - 1) as u32) << self.shift
    }

    /// First and one-past-last absolute bit within the edge cell
    pub fn bit_range(&self) -> (usize, usize) {
        let start = self.index * WORD_BITS as usize + self.shift as usize;
        (start, start + self.bits as usize)
    }
}

/// Cursor for assigning slots while a registry is being built
#[derive(Debug, Clone)]
pub struct InitializerConfig {
    words: usize,
    next_shift: u32,
    bits_used: u32,
}

impl Default for InitializerConfig {
    fn default() -> Self {
        Self {
            words: 0,
            next_shift: WORD_BITS,
            bits_used: 0,
        }
    }
}

impl InitializerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_slot(&mut self, bits: u32) -> BitSlot {
        let shift = if self.next_shift + bits > WORD_BITS {
            self.words += 1;
            0
        } else {
            self.next_shift
        };
        self.next_shift = shift + bits;
        self.bits_used += bits;
        BitSlot {
            index: self.words - 1,
            shift,
            bits,
        }
    }

    /// Words each edge needs for every slot assigned so far
    pub fn required_ints(&self) -> usize {
        self.words
    }

    /// Sum of all assigned slot widths
    pub fn bits_used(&self) -> u32 {
        self.bits_used
    }
}

/// An initialized encoded value: declaration plus assigned slots
///
/// Cheap to clone; parsers and lookups hold their own copies.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedValue {
    def: Arc<EncodedValueDef>,
    fwd: BitSlot,
    bwd: Option<BitSlot>,
}

impl EncodedValue {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn kind(&self) -> EncodedValueKind {
        self.def.kind()
    }

    pub fn bits(&self) -> u32 {
        self.def.bits
    }

    pub fn is_two_directions(&self) -> bool {
        self.def.two_directions
    }

    pub fn min_value(&self) -> i32 {
        self.def.min_value
    }

    pub fn max_value(&self) -> i32 {
        // Checked in EncodedValueDef::new
        (i64::from(self.def.min_value) + (1i64 << self.def.bits) - 1) as i32
    }

    /// Forward slot, then the backward slot for two-direction values
    pub fn slots(&self) -> impl Iterator<Item = BitSlot> + '_ {
        std::iter::once(self.fwd).chain(self.bwd)
    }

    pub(crate) fn kind_spec(&self) -> &KindSpec {
        &self.def.kind
    }

    fn slot(&self, reverse: bool) -> BitSlot {
        match (reverse, self.bwd) {
            (true, Some(bwd)) => bwd,
            _ => self.fwd,
        }
    }

    pub fn get_int<A>(&self, reverse: bool, edge_id: u32, access: &A) -> i32
    where
        A: EdgeIntAccess + ?Sized,
    {
        let raw = self.get_raw(reverse, edge_id, access);
        (i64::from(raw) + i64::from(self.def.min_value)) as i32
    }

    /// Store `value`, failing if it is outside `[min_value, max_value]`
    pub fn set_int<A>(
        &self,
        reverse: bool,
        edge_id: u32,
        access: &mut A,
        value: i32,
    ) -> Result<()>
    where
        A: EdgeIntAccess + ?Sized,
    {
        if value < self.min_value() || value > self.max_value() {
            return Err(Error::ValueOutOfRange {
                name: self.name().to_string(),
                value: i64::from(value),
                min: i64::from(self.min_value()),
                max: i64::from(self.max_value()),
            });
        }
        let raw = (i64::from(value) - i64::from(self.def.min_value)) as u32;
        self.set_raw(reverse, edge_id, access, raw);
        Ok(())
    }

    pub(crate) fn get_raw<A>(&self, reverse: bool, edge_id: u32, access: &A) -> u32
    where
        A: EdgeIntAccess + ?Sized,
    {
        let slot = self.slot(reverse);
        (access.get_int(edge_id, slot.index) & slot.mask()) >> slot.shift
    }

    /// Caller guarantees `raw` fits the slot width
    pub(crate) fn set_raw<A>(&self, reverse: bool, edge_id: u32, access: &mut A, raw: u32)
    where
        A: EdgeIntAccess + ?Sized,
    {
        let slot = self.slot(reverse);
        let mask = slot.mask();
        let word = access.get_int(edge_id, slot.index);
        access.set_int(edge_id, slot.index, (word & !mask) | ((raw << slot.shift) & mask));
    }

    /// Render the stored value the way the weighting side names it
    pub fn format_value<A>(&self, reverse: bool, edge_id: u32, access: &A) -> String
    where
        A: EdgeIntAccess + ?Sized,
    {
        match &self.def.kind {
            KindSpec::Int => self.get_int(reverse, edge_id, access).to_string(),
            KindSpec::Boolean => (self.get_raw(reverse, edge_id, access) != 0).to_string(),
            KindSpec::Decimal { factor } => {
                (f64::from(self.get_raw(reverse, edge_id, access)) * factor).to_string()
            }
            KindSpec::Enum { names, .. } => {
                let ordinal = self.get_raw(reverse, edge_id, access) as usize;
                names
                    .get(ordinal)
                    .or_else(|| names.first())
                    .map(|n| n.to_string())
                    .unwrap_or_default()
            }
        }
    }

    /// Human-readable kind, naming the enum type for enum values
    pub fn describe_kind(&self) -> String {
        match &self.def.kind {
            KindSpec::Enum { type_name, .. } => format!("an enum value of {type_name}"),
            other => other.kind().to_string(),
        }
    }

    pub(crate) fn expect_kind(&self, expected: EncodedValueKind) -> Result<()> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(Error::KindMismatch {
                name: self.name().to_string(),
                expected: expected.to_string(),
                actual: self.describe_kind(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArrayEdgeIntAccess;

    fn init_all(defs: Vec<EncodedValueDef>) -> (Vec<EncodedValue>, InitializerConfig) {
        let mut config = InitializerConfig::new();
        let evs = defs.into_iter().map(|d| d.init(&mut config)).collect();
        (evs, config)
    }

    #[test]
    fn test_bits_for_variants() {
        assert_eq!(bits_for_variants(1), 1);
        assert_eq!(bits_for_variants(2), 1);
        assert_eq!(bits_for_variants(3), 2);
        assert_eq!(bits_for_variants(4), 2);
        assert_eq!(bits_for_variants(5), 3);
        assert_eq!(bits_for_variants(8), 3);
        assert_eq!(bits_for_variants(9), 4);
        assert_eq!(bits_for_variants(22), 5);
    }

    #[test]
    fn test_slots_pack_first_fit_without_straddling() {
        let (evs, config) = init_all(vec![
            EncodedValueDef::int("a", 20, false).unwrap(),
            EncodedValueDef::int("b", 10, false).unwrap(),
            EncodedValueDef::int("c", 5, false).unwrap(),
            EncodedValueDef::boolean("d", true).unwrap(),
        ]);
        let slots: Vec<BitSlot> = evs.iter().flat_map(|e| e.slots()).collect();
        assert_eq!((slots[0].index, slots[0].shift), (0, 0));
        assert_eq!((slots[1].index, slots[1].shift), (0, 20));
        // 30 + 5 > 32: opens the next word
        assert_eq!((slots[2].index, slots[2].shift), (1, 0));
        assert_eq!((slots[3].index, slots[3].shift), (1, 5));
        assert_eq!((slots[4].index, slots[4].shift), (1, 6));
        assert_eq!(config.required_ints(), 2);
        assert_eq!(config.bits_used(), 37);
    }

    #[test]
    fn test_int_round_trip_both_directions() {
        let (evs, _) = init_all(vec![EncodedValueDef::int("lanes", 4, true).unwrap()]);
        let lanes = &evs[0];
        let mut access = ArrayEdgeIntAccess::new(1);

        lanes.set_int(false, 3, &mut access, 15).unwrap();
        lanes.set_int(true, 3, &mut access, 2).unwrap();
        assert_eq!(lanes.get_int(false, 3, &access), 15);
        assert_eq!(lanes.get_int(true, 3, &access), 2);
        assert_eq!(lanes.get_int(false, 2, &access), 0);
    }

    #[test]
    fn test_single_direction_ignores_reverse_flag() {
        let (evs, _) = init_all(vec![EncodedValueDef::int("layer", 3, false).unwrap()]);
        let mut access = ArrayEdgeIntAccess::new(1);
        evs[0].set_int(true, 0, &mut access, 5).unwrap();
        assert_eq!(evs[0].get_int(false, 0, &access), 5);
        assert_eq!(evs[0].get_int(true, 0, &access), 5);
    }

    #[test]
    fn test_set_out_of_range_fails() {
        let (evs, _) = init_all(vec![EncodedValueDef::int("lanes", 3, false).unwrap()]);
        let mut access = ArrayEdgeIntAccess::new(1);
        assert!(matches!(
            evs[0].set_int(false, 0, &mut access, 8),
            Err(Error::ValueOutOfRange { value: 8, min: 0, max: 7, .. })
        ));
        assert!(evs[0].set_int(false, 0, &mut access, -1).is_err());
        // Failed writes leave storage untouched
        assert_eq!(access.get_int(0, 0), 0);
    }

    #[test]
    fn test_signed_int_round_trip() {
        let (evs, _) = init_all(vec![EncodedValueDef::signed_int("layer", 4, -8, false).unwrap()]);
        let mut access = ArrayEdgeIntAccess::new(1);
        for value in -8..=7 {
            evs[0].set_int(false, 0, &mut access, value).unwrap();
            assert_eq!(evs[0].get_int(false, 0, &access), value);
        }
        assert!(evs[0].set_int(false, 0, &mut access, 8).is_err());
        assert!(evs[0].set_int(false, 0, &mut access, -9).is_err());
    }

    #[test]
    fn test_neighbours_in_one_word_are_preserved() {
        let (evs, _) = init_all(vec![
            EncodedValueDef::int("a", 7, false).unwrap(),
            EncodedValueDef::int("b", 7, true).unwrap(),
        ]);
        let mut access = ArrayEdgeIntAccess::new(1);
        evs[0].set_int(false, 0, &mut access, 127).unwrap();
        evs[1].set_int(false, 0, &mut access, 0).unwrap();
        evs[1].set_int(true, 0, &mut access, 127).unwrap();
        evs[1].set_int(true, 0, &mut access, 1).unwrap();
        assert_eq!(evs[0].get_int(false, 0, &access), 127);
        assert_eq!(evs[1].get_int(false, 0, &access), 0);
        assert_eq!(evs[1].get_int(true, 0, &access), 1);
    }

    #[test]
    fn test_full_width_slot() {
        let (evs, _) = init_all(vec![EncodedValueDef::int("wide", MAX_BITS, false).unwrap()]);
        let mut access = ArrayEdgeIntAccess::new(1);
        evs[0].set_int(false, 0, &mut access, i32::MAX).unwrap();
        assert_eq!(evs[0].get_int(false, 0, &access), i32::MAX);
    }

    #[test]
    fn test_invalid_definitions() {
        assert!(EncodedValueDef::int("zero", 0, false).is_err());
        assert!(EncodedValueDef::int("huge", 32, false).is_err());
        assert!(EncodedValueDef::int("", 3, false).is_err());
        assert!(EncodedValueDef::int("Upper", 3, false).is_err());
        assert!(EncodedValueDef::signed_int("positive_min", 3, 1, false).is_err());
        assert!(EncodedValueDef::decimal("speed", 5, 0.0, false).is_err());
        assert!(EncodedValueDef::decimal("speed", 5, f64::NAN, false).is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EncodedValueKind::Boolean.to_string(), "a boolean value");
        assert_eq!(EncodedValueKind::Enum.to_string(), "an enum value");
    }
}
