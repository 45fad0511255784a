//! Run statistics: load/store hit and miss counts plus total cycles.

use crate::core::{AccessKind, AccessOutcome, Cycle};
use std::fmt;

/// Aggregate counters for one simulation run.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Stats {
    pub total_loads: u64,
    pub total_stores: u64,
    pub load_hits: u64,
    pub load_misses: u64,
    pub store_hits: u64,
    pub store_misses: u64,
    pub total_cycles: Cycle,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &AccessOutcome) {
        let hit = outcome.is_hit();
        match outcome.kind {
            AccessKind::Load => {
                self.total_loads += 1;
                if hit {
                    self.load_hits += 1;
                } else {
                    self.load_misses += 1;
                }
            }
            AccessKind::Store => {
                self.total_stores += 1;
                if hit {
                    self.store_hits += 1;
                } else {
                    self.store_misses += 1;
                }
            }
        }
        self.total_cycles += outcome.cycles;
    }

    pub fn total_accesses(&self) -> u64 {
        self.total_loads + self.total_stores
    }

    pub fn hits(&self) -> u64 {
        self.load_hits + self.store_hits
    }

    pub fn misses(&self) -> u64 {
        self.load_misses + self.store_misses
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            return 1.0;
        }
        self.hits() as f64 / total as f64
    }

    pub fn miss_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            return 0.0;
        }
        self.misses() as f64 / total as f64
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total loads: {}", self.total_loads)?;
        writeln!(f, "Total stores: {}", self.total_stores)?;
        writeln!(f, "Load hits: {}", self.load_hits)?;
        writeln!(f, "Load misses: {}", self.load_misses)?;
        writeln!(f, "Store hits: {}", self.store_hits)?;
        writeln!(f, "Store misses: {}", self.store_misses)?;
        writeln!(f, "Total cycles: {}", self.total_cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CacheAccessResult;

    fn outcome(kind: AccessKind, result: CacheAccessResult, cycles: Cycle) -> AccessOutcome {
        AccessOutcome {
            kind,
            result,
            cycles,
        }
    }

    #[test]
    fn stats_rates_no_accesses() {
        let s = Stats::new();
        assert_eq!(s.hit_rate(), 1.0);
        assert_eq!(s.miss_rate(), 0.0);
        assert_eq!(s.total_accesses(), 0);
    }

    #[test]
    fn stats_record_and_rates() {
        let mut s = Stats::new();
        s.record(&outcome(AccessKind::Load, CacheAccessResult::Hit, 1));
        s.record(&outcome(AccessKind::Store, CacheAccessResult::Hit, 101));
        s.record(&outcome(AccessKind::Load, CacheAccessResult::Miss, 101));
        assert_eq!(s.total_loads, 2);
        assert_eq!(s.total_stores, 1);
        assert_eq!(s.load_hits + s.load_misses, s.total_loads);
        assert_eq!(s.store_hits + s.store_misses, s.total_stores);
        assert_eq!(s.total_cycles, 203);
        assert!((s.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert!((s.miss_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn stats_report_format() {
        let s = Stats {
            total_loads: 3,
            total_stores: 2,
            load_hits: 1,
            load_misses: 2,
            store_hits: 2,
            store_misses: 0,
            total_cycles: 5_000_000_000,
        };
        let expected = "Total loads: 3\n\
                        Total stores: 2\n\
                        Load hits: 1\n\
                        Load misses: 2\n\
                        Store hits: 2\n\
                        Store misses: 0\n\
                        Total cycles: 5000000000\n";
        assert_eq!(s.to_string(), expected);
    }
}
