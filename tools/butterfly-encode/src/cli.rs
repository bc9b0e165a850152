//! CLI commands for butterfly-encode

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use butterfly_ev::{assemble_config, EncodingManager, ImportConfig, ImportRegistry, OsmParsers};

use crate::ingest::{read_ways, run_import, write_records};

#[derive(Parser)]
#[command(name = "butterfly-encode")]
#[command(about = "Edge attribute encoding and way access parsing", long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the bit layout produced by an import config
    Layout {
        /// Import config (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Parse JSON-lines ways and report access decisions
    Import {
        /// Import config (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Ways, one JSON object per line: {"id": 1, "tags": {...}}
        #[arg(short, long)]
        ways: PathBuf,

        /// Write decoded attributes of every usable way as JSON lines
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Worker threads (default: all cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Layout { config } => {
                let em = load(&config)?.0;
                print_layout(&em);
                Ok(())
            }
            Commands::Import {
                config,
                ways,
                out,
                threads,
            } => {
                let (em, parsers) = load(&config)?;
                let ways = read_ways(&ways)?;

                println!("🦋 Parsing {} ways", ways.len());
                let (summary, records) = run_import(&em, &parsers, &ways, threads)?;
                println!("  ✓ usable:  {}", summary.usable);
                println!("  ✓ special: {}", summary.special);
                println!("  ✓ skipped: {}", summary.skipped);
                if summary.failed > 0 {
                    println!("  ✗ failed:  {}", summary.failed);
                }

                if let Some(out) = out {
                    write_records(&out, &records)?;
                    println!("  ✓ Wrote {}", out.display());
                }
                Ok(())
            }
        }
    }
}

fn load(config: &Path) -> Result<(EncodingManager, OsmParsers)> {
    let config = ImportConfig::load(config)
        .with_context(|| format!("Failed to load import config {}", config.display()))?;
    let registry = ImportRegistry::default();
    assemble_config(&registry, &config).context("Failed to assemble import pipeline")
}

fn print_layout(em: &EncodingManager) {
    println!(
        "🦋 {} encoded values, {} bits in {} ints per edge",
        em.encoded_values().len(),
        em.bits_used(),
        em.ints_per_edge()
    );
    for ev in em.encoded_values() {
        let slots: Vec<String> = ev
            .slots()
            .map(|s| format!("int {} bits {}..{}", s.index, s.shift, s.shift + s.bits))
            .collect();
        println!(
            "  {:<16} {:<32} [{}, {}]  {}",
            ev.name(),
            ev.describe_kind(),
            ev.min_value(),
            ev.max_value(),
            slots.join(" | ")
        );
    }
}
