//! Victim selection within a set: LRU or FIFO over per-block timestamps.

use crate::cache::Block;
use std::fmt;

/// Block replacement discipline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Evict the block touched least recently.
    #[default]
    Lru,
    /// Evict the block resident longest, regardless of recency.
    Fifo,
}

impl ReplacementPolicy {
    /// Ordering key of a block under this policy (smaller = evicted first).
    pub fn key(self, block: &Block) -> u64 {
        match self {
            ReplacementPolicy::Lru => block.last_access_time,
            ReplacementPolicy::Fifo => block.arrival_time,
        }
    }

    /// Whether a hit refreshes the block's last-access timestamp.
    pub fn touches_on_hit(self) -> bool {
        self == ReplacementPolicy::Lru
    }

    /// Picks the way to fill: the first invalid block if any, otherwise the
    /// block with the smallest key. Ties go to the lowest way.
    pub fn select_victim(self, blocks: &[Block]) -> usize {
        if let Some(free) = blocks.iter().position(|b| !b.valid) {
            return free;
        }
        let mut victim = 0;
        let mut best = u64::MAX;
        for (way, block) in blocks.iter().enumerate() {
            let key = self.key(block);
            if way == 0 || key < best {
                best = key;
                victim = way;
            }
        }
        victim
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicy::Lru => write!(f, "lru"),
            ReplacementPolicy::Fifo => write!(f, "fifo"),
        }
    }
}
