use crate::board::Board;
use crate::book::PolyglotBook;
use crate::search::MAX_PLY;
use crate::search::search::{SearchState, iterative_deepening};
use crate::search::tt::TransTable;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::debug;

/// Compile-time cap on concurrent searchers.
pub const MAX_THREADS: usize = 4;
pub const DEFAULT_THREADS: usize = 2;

/// Search directives shared between the host thread and the workers. The
/// limits are fixed before the workers spawn; the only field mutated during
/// a search is the stop flag, which workers poll every 2048 nodes.
pub struct SearchInfo {
    stop: AtomicBool,
    pub depth: i32,
    pub time_controlled: bool,
    pub start_time: Instant,
    pub stop_time: Option<Instant>,
    pub thread_count: usize,
}

impl SearchInfo {
    pub fn new(depth: i32, stop_time: Option<Instant>, thread_count: usize) -> Self {
        SearchInfo {
            stop: AtomicBool::new(false),
            depth: if depth <= 0 { MAX_PLY as i32 } else { depth },
            time_controlled: stop_time.is_some(),
            start_time: Instant::now(),
            stop_time,
            thread_count: thread_count.clamp(1, MAX_THREADS),
        }
    }

    /// Depth-limited search without a clock; used by tests and `go depth`.
    pub fn fixed_depth(depth: i32) -> Self {
        SearchInfo::new(depth, None, 1)
    }

    #[inline(always)]
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Time poll: called from the search every 2048 nodes. Between polls a
    /// stop request is invisible to the workers.
    #[inline]
    pub fn check_up(&self) {
        if self.time_controlled
            && let Some(deadline) = self.stop_time
            && Instant::now() >= deadline
        {
            self.request_stop();
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }
}

/// Launches the search for the current position and returns the dispatcher
/// handle. A book hit short-circuits the whole pool. Otherwise `thread_count`
/// workers each receive a deep copy of the position and a fresh search
/// state; the transposition table and the stop flag are the only shared
/// pieces. Worker 0 is the reporter: it alone prints `info` lines and, after
/// the iterative-deepening loop ends, the final `bestmove`.
pub fn start_search(
    board: &Board,
    tt: &Arc<TransTable>,
    info: &Arc<SearchInfo>,
    book: Option<Arc<PolyglotBook>>,
) -> JoinHandle<()> {
    let board = board.clone();
    let tt = Arc::clone(tt);
    let info = Arc::clone(info);

    thread::spawn(move || {
        if let Some(book) = book
            && let Some(mv) = book.probe(&board)
        {
            println!("bestmove {}", mv);
            return;
        }

        tt.next_age();

        let mut workers = Vec::with_capacity(info.thread_count);
        for thread_id in 0..info.thread_count {
            let mut worker_board = board.clone();
            let tt = Arc::clone(&tt);
            let info = Arc::clone(&info);
            workers.push(thread::spawn(move || {
                let mut state = SearchState::new();
                iterative_deepening(&mut worker_board, &tt, &info, &mut state, thread_id);
                if thread_id == 0 {
                    let best = state.best_move();
                    if best.is_none() {
                        println!("bestmove 0000");
                    } else {
                        println!("bestmove {}", best);
                    }
                }
            }));
        }
        for worker in workers {
            let _ = worker.join();
        }
        let (new_writes, over_writes) = tt.write_stats();
        debug!(new_writes, over_writes, "search pool joined");
    })
}
