//! Single-level set-associative cache simulator: LRU/FIFO replacement,
//! write-allocate/write-through policies, and cycle-cost accounting.

pub mod cache;
pub mod core;
pub mod memory;
pub mod metrics;
pub mod replacement;
pub mod simulator;
pub mod trace;
