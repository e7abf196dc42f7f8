use crate::search::{INF, MATE_SCORE};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::warn;

const ONE_MB: usize = 0x10_0000;
const SCORE_BITS: u64 = 0x1_FFFF; // bits 0..17: score + INF
const DEPTH_SHIFT: u64 = 17; // bits 17..23: depth
const DEPTH_MASK: u64 = 0x3F;
const FLAG_SHIFT: u64 = 23; // bits 23..25: bound flag

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TtFlag {
    /// Exact (PV-node) score.
    Exact = 0,
    /// Fail-low: the true score is at most the stored value.
    Alpha = 1,
    /// Fail-high: the true score is at least the stored value.
    Beta = 2,
}

impl TtFlag {
    fn from_bits(v: u64) -> Self {
        match v {
            0 => TtFlag::Exact,
            1 => TtFlag::Alpha,
            _ => TtFlag::Beta,
        }
    }
}

/// One slot. `smp_data` folds {score + INF, depth, flag}; `smp_key` is
/// `smp_data ^ position.key`. A reader recomputes the key from the data it
/// saw: a torn read (one word from before a concurrent write, one from
/// after) fails the equality and turns into an ordinary miss, so no lock is
/// needed. An empty slot keeps `smp_key == 0`.
#[derive(Default)]
struct TtEntry {
    age: AtomicU32,
    smp_key: AtomicU64,
    smp_data: AtomicU64,
}

/// Fixed-size shared transposition table. One slot per hash index, no
/// probing chain. Writes and reads use relaxed atomics: the only
/// cross-thread guarantee is the per-entry XOR consistency check.
pub struct TransTable {
    entries: Vec<TtEntry>,
    current_age: AtomicU32,
    new_writes: AtomicU64,
    over_writes: AtomicU64,
}

fn fold(score: i32, depth: i32, flag: TtFlag) -> u64 {
    debug_assert!((-INF..=INF).contains(&score));
    ((score + INF) as u64 & SCORE_BITS)
        | ((depth as u64 & DEPTH_MASK) << DEPTH_SHIFT)
        | ((flag as u64) << FLAG_SHIFT)
}

impl TransTable {
    /// Allocates `mb` megabytes of slots (clamped to 1..=1024). When the
    /// allocation fails the size is halved and retried; below one megabyte
    /// the engine gives up.
    pub fn new(mb: usize) -> Self {
        let mut mb = mb.clamp(1, 1024);
        loop {
            let entry_count = mb * ONE_MB / std::mem::size_of::<TtEntry>();
            if let Some(entries) = try_alloc(entry_count) {
                return TransTable {
                    entries,
                    current_age: AtomicU32::new(0),
                    new_writes: AtomicU64::new(0),
                    over_writes: AtomicU64::new(0),
                };
            }
            if mb <= 1 {
                panic!("cannot allocate a 1 MB transposition table");
            }
            warn!(mb, "transposition table allocation failed, halving");
            mb /= 2;
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Bumped once per top-level search; replacement prefers entries from
    /// older searches.
    pub fn next_age(&self) {
        self.current_age.fetch_add(1, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        for entry in &self.entries {
            entry.age.store(0, Ordering::Relaxed);
            entry.smp_key.store(0, Ordering::Relaxed);
            entry.smp_data.store(0, Ordering::Relaxed);
        }
        self.current_age.store(0, Ordering::Relaxed);
        self.new_writes.store(0, Ordering::Relaxed);
        self.over_writes.store(0, Ordering::Relaxed);
    }

    /// Looks up `key` for a node at `ply` searching `depth` more plies with
    /// window (alpha, beta). Returns a usable score, or `None` when the slot
    /// is empty, fails verification, is too shallow, or its bound cannot
    /// settle this window.
    pub fn probe(&self, key: u64, alpha: i32, beta: i32, depth: i32, ply: i32) -> Option<i32> {
        let entry = &self.entries[(key % self.entries.len() as u64) as usize];
        let data = entry.smp_data.load(Ordering::Relaxed);
        let smp_key = entry.smp_key.load(Ordering::Relaxed);
        if smp_key == 0 || key ^ data != smp_key {
            return None;
        }

        let stored_depth = (data >> DEPTH_SHIFT & DEPTH_MASK) as i32;
        if stored_depth < depth {
            return None;
        }

        // Mate scores are stored root-relative; re-anchor them to this node
        // so mate distance is measured from here.
        let mut score = (data & SCORE_BITS) as i32 - INF;
        if score < -MATE_SCORE {
            score += ply;
        }
        if score > MATE_SCORE {
            score -= ply;
        }

        match TtFlag::from_bits(data >> FLAG_SHIFT) {
            TtFlag::Exact => Some(score),
            TtFlag::Alpha if score <= alpha => Some(alpha),
            TtFlag::Beta if score >= beta => Some(beta),
            _ => None,
        }
    }

    /// Writes a result for `key`. An empty slot is always taken; an occupied
    /// slot is replaced when it comes from an older search or when the new
    /// entry searched at least as deep.
    pub fn store(&self, key: u64, mut score: i32, depth: i32, flag: TtFlag, ply: i32) {
        let entry = &self.entries[(key % self.entries.len() as u64) as usize];
        let current_age = self.current_age.load(Ordering::Relaxed);

        let old_key = entry.smp_key.load(Ordering::Relaxed);
        if old_key == 0 {
            self.new_writes.fetch_add(1, Ordering::Relaxed);
        } else {
            let old_data = entry.smp_data.load(Ordering::Relaxed);
            let old_depth = (old_data >> DEPTH_SHIFT & DEPTH_MASK) as i32;
            if entry.age.load(Ordering::Relaxed) >= current_age && old_depth > depth {
                return;
            }
            self.over_writes.fetch_add(1, Ordering::Relaxed);
        }

        // Push mate distances back into root-relative form.
        if score < -MATE_SCORE {
            score -= ply;
        }
        if score > MATE_SCORE {
            score += ply;
        }

        let data = fold(score.clamp(-INF, INF), depth.min(DEPTH_MASK as i32), flag);
        entry.smp_data.store(data, Ordering::Relaxed);
        entry.smp_key.store(data ^ key, Ordering::Relaxed);
        entry.age.store(current_age, Ordering::Relaxed);
    }

    pub fn write_stats(&self) -> (u64, u64) {
        (
            self.new_writes.load(Ordering::Relaxed),
            self.over_writes.load(Ordering::Relaxed),
        )
    }
}

fn try_alloc(entry_count: usize) -> Option<Vec<TtEntry>> {
    let mut v: Vec<TtEntry> = Vec::new();
    v.try_reserve_exact(entry_count).ok()?;
    v.resize_with(entry_count, TtEntry::default);
    Some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_probe_round_trips_exact_scores() {
        let tt = TransTable::new(1);
        tt.store(0xDEAD_BEEF, 123, 5, TtFlag::Exact, 0);
        assert_eq!(tt.probe(0xDEAD_BEEF, -INF, INF, 5, 0), Some(123));
        // Shallower stored depth never satisfies a deeper probe.
        assert_eq!(tt.probe(0xDEAD_BEEF, -INF, INF, 6, 0), None);
        // Different keys mapping elsewhere miss.
        assert_eq!(tt.probe(0xBADC_0FFE, -INF, INF, 1, 0), None);
    }

    #[test]
    fn bound_flags_gate_on_the_window() {
        let tt = TransTable::new(1);
        tt.store(42, -300, 4, TtFlag::Alpha, 0);
        // Fail-low only helps when the stored score is below alpha.
        assert_eq!(tt.probe(42, -100, 100, 4, 0), Some(-100));
        assert_eq!(tt.probe(42, -400, 100, 4, 0), None);

        tt.store(43, 300, 4, TtFlag::Beta, 0);
        assert_eq!(tt.probe(43, -100, 100, 4, 0), Some(100));
        assert_eq!(tt.probe(43, -100, 400, 4, 0), None);
    }

    #[test]
    fn mate_scores_shift_with_ply() {
        let tt = TransTable::new(1);
        let mate_in_3 = crate::search::MATE_VALUE - 3;
        // Stored from a node at ply 2: root-relative on disk.
        tt.store(7, mate_in_3, 8, TtFlag::Exact, 2);
        // Probed from ply 4 the mate is two plies closer.
        let probed = tt.probe(7, -INF, INF, 8, 4).unwrap();
        assert_eq!(probed, mate_in_3 + 2 - 4);
    }

    #[test]
    fn corrupted_entry_reads_as_miss() {
        let tt = TransTable::new(1);
        tt.store(99, 50, 3, TtFlag::Exact, 0);
        let idx = (99u64 % tt.entries.len() as u64) as usize;
        // Simulate a torn write: clobber the data word only.
        tt.entries[idx].smp_data.store(0x1234, Ordering::Relaxed);
        assert_eq!(tt.probe(99, -INF, INF, 1, 0), None);
    }

    #[test]
    fn clear_empties_every_slot() {
        let tt = TransTable::new(1);
        tt.store(1, 10, 1, TtFlag::Exact, 0);
        tt.clear();
        assert_eq!(tt.probe(1, -INF, INF, 0, 0), None);
        assert_eq!(tt.write_stats(), (0, 0));
    }
}
