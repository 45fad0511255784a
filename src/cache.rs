//! Single-level cache model: set-associative block store with timestamped blocks
//! and a global logical clock shared by every set.

use crate::replacement::ReplacementPolicy;
use anyhow::{bail, ensure, Result};
use log::debug;

/// Minimum block size in bytes (one 4-byte word).
pub const MIN_BLOCK_SIZE: usize = 4;

/// Address width the decoder splits into tag/index/offset.
pub const ADDRESS_BITS: u32 = 32;

/// Configuration for the cache. Immutable for a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Number of sets (power of two).
    pub num_sets: usize,
    /// Blocks per set, i.e. associativity (power of two).
    pub blocks_per_set: usize,
    /// Block size in bytes (power of two, at least 4).
    pub block_size: usize,
    /// Allocate a block on a store miss.
    pub write_allocate: bool,
    /// Write every store to memory immediately; `false` means write-back.
    pub write_through: bool,
    pub replacement: ReplacementPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            num_sets: 1,
            blocks_per_set: 1,
            block_size: MIN_BLOCK_SIZE,
            write_allocate: true,
            write_through: false,
            replacement: ReplacementPolicy::Lru,
        }
    }
}

impl CacheConfig {
    /// Rejects geometry and policy combinations the simulator cannot run.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.num_sets.is_power_of_two(),
            "number of sets must be a positive power of 2 (got {})",
            self.num_sets
        );
        ensure!(
            self.blocks_per_set.is_power_of_two(),
            "number of blocks must be a positive power of 2 (got {})",
            self.blocks_per_set
        );
        ensure!(
            self.block_size.is_power_of_two() && self.block_size >= MIN_BLOCK_SIZE,
            "block size must be a power of 2 and at least {} (got {})",
            MIN_BLOCK_SIZE,
            self.block_size
        );
        if !self.write_allocate && !self.write_through {
            bail!("no-write-allocate cannot be combined with write-back");
        }
        ensure!(
            self.offset_bits() + self.index_bits() <= ADDRESS_BITS,
            "{} sets of {}-byte blocks exceed a {}-bit address",
            self.num_sets,
            self.block_size,
            ADDRESS_BITS
        );
        Ok(())
    }

    pub fn offset_bits(&self) -> u32 {
        self.block_size.trailing_zeros()
    }

    pub fn index_bits(&self) -> u32 {
        self.num_sets.trailing_zeros()
    }

    pub fn tag_bits(&self) -> u32 {
        ADDRESS_BITS.saturating_sub(self.offset_bits() + self.index_bits())
    }

    /// Total capacity in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.num_sets * self.blocks_per_set * self.block_size
    }
}

/// Splits 32-bit addresses into (tag, set index).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressDecoder {
    offset_bits: u32,
    index_bits: u32,
}

impl AddressDecoder {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            offset_bits: config.offset_bits(),
            index_bits: config.index_bits(),
        }
    }

    /// Returns (tag, set_index) for the given address. Index is 0 for a single set.
    pub fn decode(&self, address: u32) -> (u32, usize) {
        let block_addr = address.checked_shr(self.offset_bits).unwrap_or(0);
        let index_mask = ((1u64 << self.index_bits) - 1) as u32;
        let index = (block_addr & index_mask) as usize;
        let tag = block_addr.checked_shr(self.index_bits).unwrap_or(0);
        (tag, index)
    }

    /// Rebuilds an address from its parts; bits outside each field are dropped.
    pub fn compose(&self, tag: u32, index: usize, offset: u32) -> u32 {
        let offset_mask = ((1u64 << self.offset_bits) - 1) as u32;
        let index_mask = ((1u64 << self.index_bits) - 1) as u32;
        let high = tag
            .checked_shl(self.index_bits + self.offset_bits)
            .unwrap_or(0);
        let mid = ((index as u32) & index_mask) << self.offset_bits;
        high | mid | (offset & offset_mask)
    }
}

/// One cache block. Timestamps come from the cache's global clock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub valid: bool,
    pub dirty: bool,
    pub tag: u32,
    /// Clock value at install; fixed for the residency (FIFO key).
    pub arrival_time: u64,
    /// Clock value at the last LRU touch (LRU key).
    pub last_access_time: u64,
}

/// One set: a fixed number of ways.
#[derive(Clone, Debug)]
pub struct CacheSet {
    blocks: Vec<Block>,
}

impl CacheSet {
    fn new(blocks_per_set: usize) -> Self {
        Self {
            blocks: vec![Block::default(); blocks_per_set],
        }
    }

    /// Way holding a valid block with this tag, scanning from way 0.
    pub fn find_match(&self, tag: u32) -> Option<usize> {
        self.blocks.iter().position(|b| b.valid && b.tag == tag)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn valid_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.valid).count()
    }
}

/// The block store: all sets plus the logical clock used to order arrivals and touches.
#[derive(Clone, Debug)]
pub struct Cache {
    config: CacheConfig,
    decoder: AddressDecoder,
    sets: Vec<CacheSet>,
    clock: u64,
}

impl Cache {
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let sets = (0..config.num_sets)
            .map(|_| CacheSet::new(config.blocks_per_set))
            .collect();
        Ok(Self {
            decoder: AddressDecoder::new(&config),
            config,
            sets,
            clock: 0,
        })
    }

    /// Returns (tag, set_index) for the given address.
    pub fn locate(&self, address: u32) -> (u32, usize) {
        self.decoder.decode(address)
    }

    pub fn find(&self, set_index: usize, tag: u32) -> Option<usize> {
        self.sets[set_index].find_match(tag)
    }

    /// Records a hit on a resident block. Only LRU advances the clock here.
    pub fn touch(&mut self, set_index: usize, way: usize) {
        if self.config.replacement.touches_on_hit() {
            let now = self.tick();
            self.sets[set_index].blocks[way].last_access_time = now;
        }
    }

    pub fn mark_dirty(&mut self, set_index: usize, way: usize) {
        self.sets[set_index].blocks[way].dirty = true;
    }

    /// Fills `tag` into the set, replacing the policy's victim. Returns the way
    /// written and the block it displaced, if that block was valid.
    pub fn install(&mut self, set_index: usize, tag: u32) -> (usize, Option<Block>) {
        let way = self
            .config
            .replacement
            .select_victim(&self.sets[set_index].blocks);
        let now = self.tick();
        let slot = &mut self.sets[set_index].blocks[way];
        let evicted = if slot.valid {
            debug!(
                "evict set {} way {} tag {:#x} (dirty: {})",
                set_index, way, slot.tag, slot.dirty
            );
            Some(slot.clone())
        } else {
            None
        };
        *slot = Block {
            valid: true,
            dirty: false,
            tag,
            arrival_time: now,
            last_access_time: now,
        };
        (way, evicted)
    }

    fn tick(&mut self) -> u64 {
        let now = self.clock;
        self.clock += 1;
        now
    }

    pub fn set(&self, set_index: usize) -> &CacheSet {
        &self.sets[set_index]
    }

    /// Whether the block containing `address` is resident.
    pub fn contains(&self, address: u32) -> bool {
        let (tag, index) = self.locate(address);
        self.find(index, tag).is_some()
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(num_sets: usize, blocks_per_set: usize, block_size: usize) -> CacheConfig {
        CacheConfig {
            num_sets,
            blocks_per_set,
            block_size,
            ..CacheConfig::default()
        }
    }

    #[test]
    fn bit_widths_sum_to_address_width() {
        for &(sets, bytes) in &[(1, 4), (256, 16), (1024, 64), (1 << 20, 4096), (1 << 30, 4)] {
            let c = config(sets, 1, bytes);
            assert_eq!(c.offset_bits() + c.index_bits() + c.tag_bits(), 32);
        }
        let c = config(256, 4, 16);
        assert_eq!((c.offset_bits(), c.index_bits(), c.tag_bits()), (4, 8, 20));
    }

    #[test]
    fn validate_rejects_bad_geometry() {
        assert!(config(3, 1, 4).validate().is_err());
        assert!(config(0, 1, 4).validate().is_err());
        assert!(config(1, 0, 4).validate().is_err());
        assert!(config(1, 6, 4).validate().is_err());
        assert!(config(1, 1, 2).validate().is_err());
        assert!(config(1, 1, 12).validate().is_err());
        assert!(config(1 << 31, 1, 4).validate().is_err());
        assert!(config(256, 4, 16).validate().is_ok());
    }

    #[test]
    fn validate_rejects_no_write_allocate_write_back() {
        let c = CacheConfig {
            write_allocate: false,
            write_through: false,
            ..CacheConfig::default()
        };
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("no-write-allocate"));
        assert!(Cache::new(c).is_err());
    }

    #[test]
    fn decode_splits_fields() {
        let d = AddressDecoder::new(&config(256, 1, 16));
        let (tag, index) = d.decode(0x1234_5678);
        assert_eq!(index, 0x67);
        assert_eq!(tag, 0x12345);
    }

    #[test]
    fn decode_single_set_has_zero_index() {
        let d = AddressDecoder::new(&config(1, 8, 4));
        assert_eq!(d.decode(0xffff_ffff), (0x3fff_ffff, 0));
        assert_eq!(d.decode(0x8), (2, 0));
    }

    #[test]
    fn decode_round_trips_composed_addresses() {
        for &(sets, bytes) in &[(1, 4), (4, 4), (64, 32), (1024, 8)] {
            let c = config(sets, 1, bytes);
            let d = AddressDecoder::new(&c);
            let max_tag = if c.tag_bits() >= 32 { u32::MAX } else { (1u32 << c.tag_bits()) - 1 };
            for &tag in &[0, 1, 0x2a, max_tag] {
                for index in [0, sets / 2, sets - 1] {
                    for offset in [0, 1, bytes as u32 - 1] {
                        let addr = d.compose(tag, index, offset);
                        assert_eq!(d.decode(addr), (tag, index), "sets={sets} bytes={bytes}");
                    }
                }
            }
        }
    }

    #[test]
    fn install_then_find() {
        let mut cache = Cache::new(config(4, 2, 16)).unwrap();
        let (tag, index) = cache.locate(0x140);
        assert_eq!(cache.find(index, tag), None);
        let (way, evicted) = cache.install(index, tag);
        assert_eq!(way, 0);
        assert!(evicted.is_none());
        assert_eq!(cache.find(index, tag), Some(0));
        assert!(cache.contains(0x14f));
        assert!(!cache.contains(0x150));
        assert_eq!(cache.clock(), 1);
    }

    #[test]
    fn install_evicts_when_full() {
        let mut cache = Cache::new(config(1, 2, 4)).unwrap();
        cache.install(0, 1);
        cache.install(0, 2);
        cache.mark_dirty(0, 0);
        let (way, evicted) = cache.install(0, 3);
        assert_eq!(way, 0);
        let evicted = evicted.unwrap();
        assert_eq!(evicted.tag, 1);
        assert!(evicted.dirty);
        let fresh = &cache.set(0).blocks()[0];
        assert!(fresh.valid && !fresh.dirty);
        assert_eq!(fresh.tag, 3);
        assert_eq!(fresh.arrival_time, 2);
        assert_eq!(fresh.last_access_time, 2);
    }

    #[test]
    fn touch_advances_clock_only_under_lru() {
        let mut lru = Cache::new(config(1, 2, 4)).unwrap();
        lru.install(0, 1);
        lru.touch(0, 0);
        assert_eq!(lru.clock(), 2);
        assert_eq!(lru.set(0).blocks()[0].last_access_time, 1);

        let mut fifo = Cache::new(CacheConfig {
            replacement: ReplacementPolicy::Fifo,
            ..config(1, 2, 4)
        })
        .unwrap();
        fifo.install(0, 1);
        fifo.touch(0, 0);
        assert_eq!(fifo.clock(), 1);
        assert_eq!(fifo.set(0).blocks()[0].last_access_time, 0);
    }

    #[test]
    fn clock_is_shared_across_sets() {
        let mut cache = Cache::new(config(2, 1, 4)).unwrap();
        cache.install(0, 7);
        cache.install(1, 7);
        assert_eq!(cache.set(0).blocks()[0].arrival_time, 0);
        assert_eq!(cache.set(1).blocks()[0].arrival_time, 1);
        assert_eq!(cache.set(1).valid_blocks(), 1);
    }
}
