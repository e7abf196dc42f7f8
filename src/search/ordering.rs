use crate::board::{Board, Piece};
use crate::moves::types::{Move, MoveList, piece_code};
use crate::search::search::SearchState;

/// [attacker kind][victim kind]: most valuable victim first, cheapest
/// attacker breaking ties.
#[rustfmt::skip]
const MVV_LVA: [[i32; 6]; 6] = [
    [105, 205, 305, 405, 505, 605],
    [104, 204, 304, 404, 504, 604],
    [103, 203, 303, 403, 503, 603],
    [102, 202, 302, 402, 502, 602],
    [101, 201, 301, 401, 501, 601],
    [100, 200, 300, 400, 500, 600],
];

/// Scoring ladder:
///   1. the PV move from the previous iteration  (20 000)
///   2. captures by MVV-LVA                      (>= 10 100)
///   3. first and second killer moves            (9 000 / 8 000)
///   4. history score of the quiet move
pub fn score_move(board: &Board, state: &mut SearchState, mv: Move) -> i32 {
    if state.score_pv && state.pv_table[0][state.ply] == mv {
        state.score_pv = false;
        return 20_000;
    }

    if mv.is_capture() {
        // En-passant targets an empty square; the victim is a pawn.
        let victim = board
            .piece_at(mv.target())
            .map_or(Piece::Pawn, |(_, piece)| piece);
        return MVV_LVA[mv.piece() as usize][victim as usize] + 10_000;
    }

    if state.killer_moves[0][state.ply] == mv {
        9_000
    } else if state.killer_moves[1][state.ply] == mv {
        8_000
    } else {
        state.history_moves[piece_code(mv.color(), mv.piece()) as usize]
            [mv.target().index() as usize]
    }
}

/// When the node is still on the previous principal variation, keep
/// following it and let `score_move` float the PV move to the front.
pub fn enable_pv_scoring(list: &MoveList, state: &mut SearchState) {
    state.follow_pv = false;
    for &mv in list {
        if state.pv_table[0][state.ply] == mv {
            state.score_pv = true;
            state.follow_pv = true;
        }
    }
}

pub fn sort_moves(list: &mut MoveList, board: &Board, state: &mut SearchState) {
    let mut scored: Vec<(i32, Move)> = list
        .iter()
        .map(|&mv| (score_move(board, state, mv), mv))
        .collect();
    scored.sort_by_key(|&(score, _)| std::cmp::Reverse(score));
    list.clear();
    list.extend(scored.into_iter().map(|(_, mv)| mv));
}
