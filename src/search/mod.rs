pub mod eval;
pub mod ordering;
pub mod psqt;
#[allow(clippy::module_inception)]
pub mod search;
pub mod tt;
pub mod workers;

/// Search horizon; ply never exceeds this.
pub const MAX_PLY: usize = 64;

/// Score layout, strictly ordered:
/// `-INF < -MATE_VALUE < -MATE_SCORE < ordinary scores < MATE_SCORE <
/// MATE_VALUE < INF`. A mate in `n` plies surfaces as `MATE_VALUE - n`.
pub const INF: i32 = 50_000;
pub const MATE_VALUE: i32 = 49_000;
pub const MATE_SCORE: i32 = 48_000;
