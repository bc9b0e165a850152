//! ImportRegistry - named recipes for an encoded value and its parser
//!
//! An [`ImportUnit`] knows how to declare one encoded value, how to build
//! the parser that fills it once the manager is frozen, and which other
//! units must be imported alongside it. [`assemble`] turns a list of keys
//! into a frozen [`EncodingManager`] plus the matching [`OsmParsers`].

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;

use butterfly_common::{suggest_correction, Error, Result};

use crate::config::{ImportConfig, PMap};
use crate::ev::{
    EncodedValueDef, MaxSpeed, Moped, RoadAccess, RoadClass, Roundabout, TagEnum, VehicleAccess,
};
use crate::manager::EncodingManager;
use crate::parsers::car::{car_access_parser, CAR};
use crate::parsers::moped::{moped_access_parser, MOPED};
use crate::parsers::{
    MaxSpeedParser, MopedParser, OsmParsers, RoadAccessParser, RoadClassParser, RoundaboutParser,
    TagParser,
};

type EncodedValueFactory = Box<dyn Fn(&PMap) -> Result<EncodedValueDef> + Send + Sync>;
type TagParserFactory =
    Box<dyn Fn(&EncodingManager, &PMap) -> Result<Box<dyn TagParser>> + Send + Sync>;

/// Factories for one importable attribute
pub struct ImportUnit {
    create_encoded_value: EncodedValueFactory,
    create_tag_parser: TagParserFactory,
    required: Vec<String>,
}

impl ImportUnit {
    pub fn new<E, P>(create_encoded_value: E, create_tag_parser: P) -> Self
    where
        E: Fn(&PMap) -> Result<EncodedValueDef> + Send + Sync + 'static,
        P: Fn(&EncodingManager, &PMap) -> Result<Box<dyn TagParser>> + Send + Sync + 'static,
    {
        Self {
            create_encoded_value: Box::new(create_encoded_value),
            create_tag_parser: Box::new(create_tag_parser),
            required: Vec::new(),
        }
    }

    /// Keys that must be imported whenever this one is
    pub fn requires<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn create_encoded_value(&self, props: &PMap) -> Result<EncodedValueDef> {
        (self.create_encoded_value)(props)
    }

    pub fn create_tag_parser(
        &self,
        em: &EncodingManager,
        props: &PMap,
    ) -> Result<Box<dyn TagParser>> {
        (self.create_tag_parser)(em, props)
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }
}

impl fmt::Debug for ImportUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportUnit")
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

/// Key to [`ImportUnit`] table; `default()` knows every built-in attribute
#[derive(Debug)]
pub struct ImportRegistry {
    units: BTreeMap<String, ImportUnit>,
}

impl ImportRegistry {
    /// Registry without any units
    pub fn new() -> Self {
        Self {
            units: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, key: impl Into<String>, unit: ImportUnit) -> Result<()> {
        let key = key.into();
        if self.units.contains_key(&key) {
            return Err(Error::DuplicateImportKey(key));
        }
        self.units.insert(key, unit);
        Ok(())
    }

    pub fn create_import_unit(&self, key: &str) -> Option<&ImportUnit> {
        self.units.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.units.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + Clone {
        self.units.keys().map(String::as_str)
    }

    fn unit(&self, key: &str) -> Result<&ImportUnit> {
        self.create_import_unit(key)
            .ok_or_else(|| Error::UnknownImportKey {
                key: key.to_string(),
                suggestion: suggest_correction(key, self.keys()),
            })
    }

    /// `keys` plus everything they require, requirements first, no repeats
    pub fn resolve<'a, I>(&self, keys: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ordered = Vec::new();
        let mut done = FxHashSet::default();
        let mut in_progress = Vec::new();
        for key in keys {
            self.visit(key, &mut ordered, &mut done, &mut in_progress)?;
        }
        Ok(ordered)
    }

    fn visit(
        &self,
        key: &str,
        ordered: &mut Vec<String>,
        done: &mut FxHashSet<String>,
        in_progress: &mut Vec<String>,
    ) -> Result<()> {
        if done.contains(key) {
            return Ok(());
        }
        if in_progress.iter().any(|k| k == key) {
            return Err(Error::Config(format!(
                "import key '{key}' requires itself via {}",
                in_progress.join(" -> ")
            )));
        }
        let unit = self.unit(key)?;
        in_progress.push(key.to_string());
        for required in unit.required() {
            self.visit(required, ordered, done, in_progress)?;
        }
        in_progress.pop();
        done.insert(key.to_string());
        ordered.push(key.to_string());
        Ok(())
    }
}

impl Default for ImportRegistry {
    fn default() -> Self {
        let mut units = BTreeMap::new();
        let mut add = |key: &str, unit: ImportUnit| {
            units.insert(key.to_string(), unit);
        };

        add(
            Moped::KEY,
            ImportUnit::new(
                |_| Moped::create(),
                |em, _| Ok(Box::new(MopedParser::from_manager(em)?)),
            ),
        );
        add(
            RoadClass::KEY,
            ImportUnit::new(
                |_| RoadClass::create(),
                |em, _| Ok(Box::new(RoadClassParser::from_manager(em)?)),
            ),
        );
        add(
            RoadAccess::KEY,
            ImportUnit::new(
                |_| RoadAccess::create(),
                |em, _| Ok(Box::new(RoadAccessParser::from_manager(em)?)),
            ),
        );
        add(
            Roundabout::KEY,
            ImportUnit::new(
                |_| Roundabout::create(),
                |em, _| Ok(Box::new(RoundaboutParser::from_manager(em)?)),
            ),
        );
        add(
            MaxSpeed::KEY,
            ImportUnit::new(
                |_| MaxSpeed::create(),
                |em, _| Ok(Box::new(MaxSpeedParser::from_manager(em)?)),
            ),
        );
        add(
            VehicleAccess::key(CAR).as_str(),
            ImportUnit::new(
                |_| VehicleAccess::create(CAR),
                |em, props| Ok(Box::new(car_access_parser(em, props)?)),
            ),
        );
        add(
            VehicleAccess::key(MOPED).as_str(),
            ImportUnit::new(
                |_| VehicleAccess::create(MOPED),
                |em, props| Ok(Box::new(moped_access_parser(em, props)?)),
            )
            .requires([Moped::KEY]),
        );

        Self { units }
    }
}

/// Declare, freeze and wire up everything `keys` needs
pub fn assemble<'a, I>(
    registry: &ImportRegistry,
    keys: I,
    props: &PMap,
) -> Result<(EncodingManager, OsmParsers)>
where
    I: IntoIterator<Item = &'a str>,
{
    let keys = registry.resolve(keys)?;

    let mut builder = EncodingManager::builder();
    for key in &keys {
        builder.push(registry.unit(key)?.create_encoded_value(props)?)?;
    }
    let em = builder.build();

    let mut parsers = OsmParsers::with_ints_per_edge(em.ints_per_edge());
    for key in &keys {
        parsers.add_way_tag_parser(registry.unit(key)?.create_tag_parser(&em, props)?)?;
    }

    tracing::debug!(
        keys = ?keys,
        parsers = parsers.len(),
        ints_per_edge = em.ints_per_edge(),
        "assembled import pipeline"
    );
    Ok((em, parsers))
}

/// [`assemble`] driven by a loaded [`ImportConfig`]
pub fn assemble_config(
    registry: &ImportRegistry,
    config: &ImportConfig,
) -> Result<(EncodingManager, OsmParsers)> {
    assemble(registry, config.keys(), &config.properties)
}
