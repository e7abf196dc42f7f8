use crate::board::Board;
use crate::moves::execute::make_move;
use crate::moves::movegen::generate_moves;
use crate::moves::types::{MoveKind, MoveList};
use tracing::{debug, instrument};

fn driver(board: &mut Board, depth: u32, kind: MoveKind, nodes: &mut u64) {
    if depth == 0 {
        *nodes += 1;
        return;
    }
    let mut list = MoveList::new();
    generate_moves(board, kind, &mut list);
    for mv in list {
        let snapshot = board.clone();
        if !make_move(board, mv, kind) {
            continue;
        }
        driver(board, depth - 1, kind, nodes);
        *board = snapshot;
    }
}

/// Counts leaf nodes of the legal move tree to `depth`.
#[instrument(skip(board), fields(depth))]
pub fn perft(board: &mut Board, depth: u32, kind: MoveKind) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    driver(board, depth, kind, &mut nodes);
    debug!(depth, nodes, "perft finished");
    nodes
}

/// Perft with one `(move, subtree count)` entry per legal root move; the
/// UCI `perft` command prints these lines and the total.
#[instrument(skip(board), fields(depth))]
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(crate::moves::types::Move, u64)> {
    let mut list = MoveList::new();
    generate_moves(board, MoveKind::All, &mut list);

    let mut out = Vec::with_capacity(list.len());
    for mv in list {
        let snapshot = board.clone();
        if !make_move(board, mv, MoveKind::All) {
            continue;
        }
        let mut nodes = 0;
        if depth <= 1 {
            nodes = 1;
        } else {
            driver(board, depth - 1, MoveKind::All, &mut nodes);
        }
        *board = snapshot;
        out.push((mv, nodes));
    }
    out
}
