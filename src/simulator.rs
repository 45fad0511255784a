//! Trace-driven simulator: replays loads and stores against the cache, applies
//! the write policy and cost model, and accumulates statistics.

use crate::cache::{Cache, CacheConfig};
use crate::core::{Access, AccessKind, AccessOutcome, CacheAccessResult, Cycle};
use crate::memory::{Memory, MemoryConfig};
use crate::metrics::Stats;
use anyhow::Result;
use log::{debug, info, trace};

/// Single-level cache simulator. Deterministic, one access at a time.
pub struct Simulator {
    cache: Cache,
    memory: Memory,
    stats: Stats,
}

impl Simulator {
    /// Fails if the configuration is invalid; nothing is simulated in that case.
    pub fn new(cache_config: CacheConfig, memory_config: MemoryConfig) -> Result<Self> {
        let cache = Cache::new(cache_config)?;
        Ok(Self {
            cache,
            memory: Memory::new(memory_config),
            stats: Stats::new(),
        })
    }

    /// Replays every access in the stream.
    pub fn run<I>(&mut self, trace: I)
    where
        I: IntoIterator<Item = Access>,
    {
        let config = self.cache.config();
        info!(
            "simulating {} sets x {} blocks x {} bytes ({}, {}, {})",
            config.num_sets,
            config.blocks_per_set,
            config.block_size,
            if config.write_allocate { "write-allocate" } else { "no-write-allocate" },
            if config.write_through { "write-through" } else { "write-back" },
            config.replacement,
        );
        for access in trace {
            self.access(access);
        }
        info!(
            "done: {} accesses, {} cycles",
            self.stats.total_accesses(),
            self.stats.total_cycles
        );
    }

    /// Resolves one access, updates cache state and stats, and returns what it cost.
    pub fn access(&mut self, access: Access) -> AccessOutcome {
        let (result, cycles) = match access.kind {
            AccessKind::Load => self.load(access.address),
            AccessKind::Store => self.store(access.address),
        };
        let outcome = AccessOutcome {
            kind: access.kind,
            result,
            cycles,
        };
        trace!(
            "{} {:#010x}: {} ({} cycles)",
            access.kind,
            access.address,
            result,
            cycles
        );
        self.stats.record(&outcome);
        outcome
    }

    fn load(&mut self, address: u32) -> (CacheAccessResult, Cycle) {
        let (tag, set_index) = self.cache.locate(address);
        let mut cycles = self.memory.hit_cycles();
        if let Some(way) = self.cache.find(set_index, tag) {
            self.cache.touch(set_index, way);
            return (CacheAccessResult::Hit, cycles);
        }
        cycles += self.fill(set_index, tag).1;
        (CacheAccessResult::Miss, cycles)
    }

    fn store(&mut self, address: u32) -> (CacheAccessResult, Cycle) {
        let (tag, set_index) = self.cache.locate(address);
        let write_through = self.cache.config().write_through;
        let mut cycles = self.memory.hit_cycles();

        if let Some(way) = self.cache.find(set_index, tag) {
            self.cache.touch(set_index, way);
            if write_through {
                cycles += self.memory.word_write_cycles();
            } else {
                self.cache.mark_dirty(set_index, way);
            }
            return (CacheAccessResult::Hit, cycles);
        }

        if !self.cache.config().write_allocate {
            // Straight to memory; the cache is untouched.
            cycles += self.memory.word_write_cycles();
            return (CacheAccessResult::Miss, cycles);
        }

        let (way, fill_cycles) = self.fill(set_index, tag);
        cycles += fill_cycles;
        if write_through {
            cycles += self.memory.word_write_cycles();
        } else {
            self.cache.mark_dirty(set_index, way);
        }
        (CacheAccessResult::Miss, cycles)
    }

    /// Brings the block into the set. Returns the way used and the transfer
    /// cycles, including the write-back of a dirty victim.
    fn fill(&mut self, set_index: usize, tag: u32) -> (usize, Cycle) {
        let transfer = self.memory.block_transfer_cycles(self.cache.block_size());
        let mut cycles = transfer;
        let (way, evicted) = self.cache.install(set_index, tag);
        if let Some(victim) = evicted {
            if victim.dirty && !self.cache.config().write_through {
                debug!("write back dirty tag {:#x} from set {}", victim.tag, set_index);
                cycles += transfer;
            }
        }
        (way, cycles)
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }
}
