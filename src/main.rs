//! `csim`: replay a load/store trace through a configurable cache and report hits, misses and cycles.
//!
//! Usage: csim <sets> <blocks> <bytes> <write-allocate|no-write-allocate> <write-through|write-back> <lru|fifo> < trace

use anyhow::{Context, Result};
use cache_simulator::cache::CacheConfig;
use cache_simulator::memory::MemoryConfig;
use cache_simulator::replacement::ReplacementPolicy;
use cache_simulator::simulator::Simulator;
use cache_simulator::trace::{read_trace, ParsedTrace};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::warn;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csim", version, about = "Set-associative cache simulator")]
struct Cli {
    /// Number of sets (power of 2)
    sets: usize,
    /// Blocks per set (power of 2)
    blocks: usize,
    /// Bytes per block (power of 2, at least 4)
    bytes: usize,
    /// Store-miss policy
    #[arg(value_enum)]
    allocate: AllocateCli,
    /// Store-hit policy
    #[arg(value_enum)]
    write: WriteCli,
    /// Eviction policy
    #[arg(value_enum)]
    eviction: EvictionCli,
    /// Read the trace from a file instead of stdin
    #[arg(long)]
    trace: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AllocateCli {
    WriteAllocate,
    NoWriteAllocate,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WriteCli {
    WriteThrough,
    WriteBack,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EvictionCli {
    Lru,
    Fifo,
}

impl From<EvictionCli> for ReplacementPolicy {
    fn from(value: EvictionCli) -> Self {
        match value {
            EvictionCli::Lru => ReplacementPolicy::Lru,
            EvictionCli::Fifo => ReplacementPolicy::Fifo,
        }
    }
}

impl Cli {
    fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            num_sets: self.sets,
            blocks_per_set: self.blocks,
            block_size: self.bytes,
            write_allocate: matches!(self.allocate, AllocateCli::WriteAllocate),
            write_through: matches!(self.write, WriteCli::WriteThrough),
            replacement: self.eviction.into(),
        }
    }

    fn load_trace(&self) -> Result<ParsedTrace> {
        match &self.trace {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open trace {}", path.display()))?;
                read_trace(BufReader::new(file))
                    .with_context(|| format!("failed to read trace {}", path.display()))
            }
            None => read_trace(io::stdin().lock()).context("failed to read trace from stdin"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().filter_or("CSIM_LOG", "warn"));

    let cli = Cli::parse();
    let mut sim = Simulator::new(cli.cache_config(), MemoryConfig::default())
        .context("invalid cache configuration")?;

    let trace = cli.load_trace()?;
    if trace.skipped > 0 {
        warn!("skipped {} malformed trace lines", trace.skipped);
    }
    sim.run(trace.accesses);

    print!("{}", sim.stats());
    Ok(())
}
