//! Core trace model: cycles, memory accesses, and per-access outcomes.

use std::fmt;

/// Cycle accumulator type (wide enough for long traces).
pub type Cycle = u64;

/// Kind of memory operation in the trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Load,
    Store,
}

/// A single trace record: one load or store to a 32-bit address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Access {
    pub kind: AccessKind,
    pub address: u32,
}

impl Access {
    pub fn load(address: u32) -> Self {
        Self {
            kind: AccessKind::Load,
            address,
        }
    }

    pub fn store(address: u32) -> Self {
        Self {
            kind: AccessKind::Store,
            address,
        }
    }

    pub fn is_store(&self) -> bool {
        matches!(self.kind, AccessKind::Store)
    }
}

/// Result of a cache lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheAccessResult {
    Hit,
    Miss,
}

/// What one access did and what it cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessOutcome {
    pub kind: AccessKind,
    pub result: CacheAccessResult,
    /// Cycles charged for this access, base cost included.
    pub cycles: Cycle,
}

impl AccessOutcome {
    pub fn is_hit(&self) -> bool {
        self.result == CacheAccessResult::Hit
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Load => write!(f, "load"),
            AccessKind::Store => write!(f, "store"),
        }
    }
}

impl fmt::Display for CacheAccessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheAccessResult::Hit => write!(f, "hit"),
            CacheAccessResult::Miss => write!(f, "miss"),
        }
    }
}
