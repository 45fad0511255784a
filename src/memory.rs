//! Backing memory cost model. Models latency only; no data is stored.

use crate::core::Cycle;

/// Cycle costs for the cache/memory interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Base cost charged to every access.
    pub hit_latency_cycles: u32,
    /// Cost of moving one word to or from memory.
    pub word_latency_cycles: u32,
    /// Word size in bytes; blocks are transferred word by word.
    pub word_size_bytes: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            hit_latency_cycles: 1,
            word_latency_cycles: 100,
            word_size_bytes: 4,
        }
    }
}

/// Memory behind the cache.
#[derive(Clone, Debug)]
pub struct Memory {
    config: MemoryConfig,
}

impl Memory {
    pub fn new(config: MemoryConfig) -> Self {
        Self { config }
    }

    /// Cycles every access pays, hit or miss.
    pub fn hit_cycles(&self) -> Cycle {
        self.config.hit_latency_cycles as Cycle
    }

    /// Cycles to move a whole block (fetch on miss, or dirty write-back).
    pub fn block_transfer_cycles(&self, block_size: usize) -> Cycle {
        let words = (block_size / self.config.word_size_bytes) as Cycle;
        self.config.word_latency_cycles as Cycle * words
    }

    /// Cycles for a single-word store sent straight to memory.
    pub fn word_write_cycles(&self) -> Cycle {
        self.config.word_latency_cycles as Cycle
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }
}
