//! JSON-lines way input, sharded parsing and attribute output

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use butterfly_ev::{ArrayEdgeIntAccess, EncodingManager, OsmParsers, ReaderWay, WayAccess};

/// Ways per worker shard; each shard owns its edge storage
const SHARD_SIZE: usize = 4096;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub usable: usize,
    pub special: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportSummary {
    fn merge(self, other: ImportSummary) -> ImportSummary {
        ImportSummary {
            usable: self.usable + other.usable,
            special: self.special + other.special,
            skipped: self.skipped + other.skipped,
            failed: self.failed + other.failed,
        }
    }
}

/// Stored value; two-direction values carry both sides
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordValue {
    Single(String),
    Directed { forward: String, backward: String },
}

/// Decoded attributes of one non-skipped way
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRecord {
    pub way_id: i64,
    pub access: String,
    pub values: BTreeMap<String, RecordValue>,
}

pub fn read_ways(path: &Path) -> Result<Vec<ReaderWay>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut ways = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let way: ReaderWay = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid way", path.display(), n + 1))?;
        ways.push(way);
    }
    tracing::debug!(path = %path.display(), ways = ways.len(), "read ways");
    Ok(ways)
}

fn decode(
    em: &EncodingManager,
    storage: &ArrayEdgeIntAccess,
    edge: u32,
) -> BTreeMap<String, RecordValue> {
    em.encoded_values()
        .iter()
        .map(|ev| {
            let value = if ev.is_two_directions() {
                RecordValue::Directed {
                    forward: ev.format_value(false, edge, storage),
                    backward: ev.format_value(true, edge, storage),
                }
            } else {
                RecordValue::Single(ev.format_value(false, edge, storage))
            };
            (ev.name().to_string(), value)
        })
        .collect()
}

fn run_shard(
    em: &EncodingManager,
    parsers: &OsmParsers,
    ways: &[ReaderWay],
) -> (ImportSummary, Vec<EdgeRecord>) {
    let mut storage = em.create_edge_storage(ways.len());
    let flags = em.create_relation_flags();
    let mut summary = ImportSummary::default();
    let mut records = Vec::new();

    for (edge, way) in ways.iter().enumerate() {
        let edge = edge as u32;
        match parsers.handle_way_tags(edge, &mut storage, way, &flags) {
            Ok(WayAccess::Skip) => summary.skipped += 1,
            Ok(access) => {
                match access {
                    WayAccess::Special => summary.special += 1,
                    _ => summary.usable += 1,
                }
                records.push(EdgeRecord {
                    way_id: way.id,
                    access: access.to_string(),
                    values: decode(em, &storage, edge),
                });
            }
            Err(e) => {
                tracing::warn!(way_id = way.id, error = %e, "failed to parse way");
                summary.failed += 1;
            }
        }
    }
    (summary, records)
}

/// Parse `ways` in parallel shards; a failing way is counted, not fatal
pub fn run_import(
    em: &EncodingManager,
    parsers: &OsmParsers,
    ways: &[ReaderWay],
    threads: Option<usize>,
) -> Result<(ImportSummary, Vec<EdgeRecord>)> {
    let work = || {
        let shards: Vec<(ImportSummary, Vec<EdgeRecord>)> = ways
            .par_chunks(SHARD_SIZE)
            .map(|shard| run_shard(em, parsers, shard))
            .collect();
        shards.into_iter().fold(
            (ImportSummary::default(), Vec::with_capacity(ways.len())),
            |(summary, mut records), (s, r)| {
                records.extend(r);
                (summary.merge(s), records)
            },
        )
    };

    let result = match threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("Failed to build thread pool")?
            .install(work),
        None => work(),
    };
    tracing::info!(
        usable = result.0.usable,
        special = result.0.special,
        skipped = result.0.skipped,
        failed = result.0.failed,
        "import finished"
    );
    Ok(result)
}

pub fn write_records(path: &Path, records: &[EdgeRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
