use crate::board::Board;
use crate::hash::zobrist::{ep_file_to_hash, zobrist_keys};
use crate::moves::execute::make_move;
use crate::moves::movegen::generate_moves;
use crate::moves::types::{Move, MoveKind, MoveList, piece_code};
use crate::search::eval::evaluate;
use crate::search::ordering::{enable_pv_scoring, sort_moves};
use crate::search::tt::{TransTable, TtFlag};
use crate::search::workers::SearchInfo;
use crate::search::{INF, MATE_SCORE, MATE_VALUE, MAX_PLY};
use std::fmt::Write as _;
use tracing::debug;

/// Moves searched at full depth before late-move reduction kicks in.
const FULL_DEPTH_MOVES: usize = 4;
/// Minimum remaining depth for late-move reduction.
const REDUCTION_LIMIT: i32 = 3;
/// Half-width of the aspiration window seeded from the previous iteration.
const ASPIRATION_WINDOW: i32 = 50;

/// Per-worker search state: ply cursor, node counter, killer and history
/// heuristics, the triangular principal-variation store, and the
/// PV-following flags. Every worker owns a private copy.
#[derive(Clone)]
pub struct SearchState {
    pub ply: usize,
    pub nodes: u64,
    /// Two quiet beta-cutoff moves per ply.
    pub killer_moves: [[Move; MAX_PLY]; 2],
    /// [piece code][target square] scores for quiet moves that raised alpha.
    pub history_moves: [[i32; 64]; 12],
    // One extra slot: a node entered exactly at the ply cap still writes
    // its own length before bailing out.
    pub pv_length: [usize; MAX_PLY + 1],
    pub pv_table: [[Move; MAX_PLY]; MAX_PLY + 1],
    pub follow_pv: bool,
    pub score_pv: bool,
}

impl SearchState {
    pub fn new() -> Self {
        SearchState {
            ply: 0,
            nodes: 0,
            killer_moves: [[Move::NONE; MAX_PLY]; 2],
            history_moves: [[0; 64]; 12],
            pv_length: [0; MAX_PLY + 1],
            pv_table: [[Move::NONE; MAX_PLY]; MAX_PLY + 1],
            follow_pv: false,
            score_pv: false,
        }
    }

    pub fn best_move(&self) -> Move {
        self.pv_table[0][0]
    }
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::new()
    }
}

fn quiescence(
    board: &mut Board,
    info: &SearchInfo,
    state: &mut SearchState,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    if state.nodes & 2047 == 0 {
        info.check_up();
    }
    state.nodes += 1;

    let evaluation = evaluate(board);
    if state.ply > MAX_PLY - 1 {
        return evaluation;
    }
    // Stand pat: the side to move may decline every capture.
    if evaluation >= beta {
        return beta;
    }
    if evaluation > alpha {
        alpha = evaluation;
    }

    let mut list = MoveList::new();
    generate_moves(board, MoveKind::Captures, &mut list);
    sort_moves(&mut list, board, state);

    for mv in list {
        let snapshot = board.clone();
        state.ply += 1;
        board.push_repetition();

        if !make_move(board, mv, MoveKind::Captures) {
            state.ply -= 1;
            board.pop_repetition();
            continue;
        }

        let score = -quiescence(board, info, state, -beta, -alpha);

        state.ply -= 1;
        *board = snapshot;

        if info.stopped() {
            return 0;
        }
        if score > alpha {
            alpha = score;
            if score >= beta {
                return beta;
            }
        }
    }
    alpha
}

#[allow(clippy::too_many_arguments)]
fn negamax(
    board: &mut Board,
    tt: &TransTable,
    info: &SearchInfo,
    state: &mut SearchState,
    mut alpha: i32,
    beta: i32,
    mut depth: i32,
) -> i32 {
    state.pv_length[state.ply] = state.ply;
    let mut flag = TtFlag::Alpha;

    if state.ply > 0 && board.is_repetition() {
        return 0;
    }

    // A full-width window marks a PV node; those are searched out even when
    // the table already knows an answer.
    let is_pv = beta - alpha > 1;
    if state.ply > 0
        && !is_pv
        && let Some(score) = tt.probe(board.key, alpha, beta, depth, state.ply as i32)
    {
        return score;
    }

    if state.nodes & 2047 == 0 {
        info.check_up();
    }

    let in_check = board.in_check(board.side_to_move);

    // The horizon yields to the check extension: a node in check is always
    // searched so forced mates at the edge are seen, not evaluated.
    if depth == 0 && !in_check {
        return quiescence(board, info, state, alpha, beta);
    }
    if state.ply > MAX_PLY - 1 {
        return evaluate(board);
    }

    state.nodes += 1;

    if in_check {
        depth += 1;
    }

    let mut legal_moves = 0usize;

    // Null move: hand the opponent a free shot; surviving beta anyway means
    // this node almost certainly fails high with a real move too.
    if depth >= 3 && !in_check && state.ply > 0 {
        let keys = zobrist_keys();
        let snapshot = board.clone();
        state.ply += 1;
        board.push_repetition();

        if let Some(file) = ep_file_to_hash(board) {
            board.key ^= keys.ep_key[file as usize];
            board.lock ^= keys.ep_lock[file as usize];
        }
        board.en_passant = None;
        board.side_to_move = board.side_to_move.opposite();
        board.key ^= keys.side_key;
        board.lock ^= keys.side_lock;

        let score = -negamax(board, tt, info, state, -beta, -beta + 1, depth - 1 - 2);

        state.ply -= 1;
        *board = snapshot;

        if info.stopped() {
            return 0;
        }
        if score >= beta {
            return beta;
        }
    }

    let mut list = MoveList::new();
    generate_moves(board, MoveKind::All, &mut list);
    if state.follow_pv {
        enable_pv_scoring(&list, state);
    }
    sort_moves(&mut list, board, state);

    let mut moves_searched = 0usize;
    for mv in list {
        let snapshot = board.clone();
        state.ply += 1;
        board.push_repetition();

        if !make_move(board, mv, MoveKind::All) {
            state.ply -= 1;
            board.pop_repetition();
            continue;
        }
        legal_moves += 1;

        let score;
        if moves_searched == 0 {
            score = -negamax(board, tt, info, state, -beta, -alpha, depth - 1);
        } else {
            // Late quiet moves get a reduced-depth scout; everything else is
            // forced through the principal-variation re-search ladder.
            let mut scout = if moves_searched >= FULL_DEPTH_MOVES
                && depth >= REDUCTION_LIMIT
                && !in_check
                && mv.promoted().is_none()
                && !mv.is_capture()
            {
                -negamax(board, tt, info, state, -alpha - 1, -alpha, depth - 2)
            } else {
                alpha + 1
            };

            if scout > alpha {
                scout = -negamax(board, tt, info, state, -alpha - 1, -alpha, depth - 1);
                if scout > alpha && scout < beta {
                    scout = -negamax(board, tt, info, state, -beta, -alpha, depth - 1);
                }
            }
            score = scout;
        }

        state.ply -= 1;
        *board = snapshot;

        if info.stopped() {
            return 0;
        }
        moves_searched += 1;

        if score > alpha {
            flag = TtFlag::Exact;
            if !mv.is_capture() {
                state.history_moves[piece_code(mv.color(), mv.piece()) as usize]
                    [mv.target().index() as usize] += depth;
            }
            alpha = score;

            state.pv_table[state.ply][state.ply] = mv;
            for next in state.ply + 1..state.pv_length[state.ply + 1] {
                state.pv_table[state.ply][next] = state.pv_table[state.ply + 1][next];
            }
            state.pv_length[state.ply] = state.pv_length[state.ply + 1];

            if score >= beta {
                tt.store(board.key, beta, depth, TtFlag::Beta, state.ply as i32);
                if !mv.is_capture() {
                    state.killer_moves[1][state.ply] = state.killer_moves[0][state.ply];
                    state.killer_moves[0][state.ply] = mv;
                }
                return beta;
            }
        }
    }

    if legal_moves == 0 {
        return if in_check {
            // Mate distance counts plies from the root.
            -MATE_VALUE + state.ply as i32
        } else {
            0
        };
    }

    tt.store(board.key, alpha, depth, flag, state.ply as i32);
    alpha
}

fn format_score(score: i32) -> String {
    if score > -MATE_VALUE && score < -MATE_SCORE {
        format!("mate {}", -(score + MATE_VALUE) / 2 - 1)
    } else if score > MATE_SCORE && score < MATE_VALUE {
        format!("mate {}", (MATE_VALUE - score) / 2 + 1)
    } else {
        format!("cp {}", score)
    }
}

/// Iterative-deepening driver for one worker. Each completed depth reseeds
/// the aspiration window; a result outside the window is thrown away and the
/// same depth is re-searched with full bounds. Only the reporter (worker 0)
/// emits `info` lines. A depth interrupted by the stop flag is discarded, so
/// the PV of the last completed iteration survives.
pub fn iterative_deepening(
    board: &mut Board,
    tt: &TransTable,
    info: &SearchInfo,
    state: &mut SearchState,
    thread_id: usize,
) {
    let mut alpha = -INF;
    let mut beta = INF;
    let mut depth = 1;

    while depth <= info.depth {
        if info.stopped() {
            break;
        }
        state.follow_pv = true;

        let score = negamax(board, tt, info, state, alpha, beta, depth);

        if info.stopped() {
            break;
        }
        if score <= alpha || score >= beta {
            alpha = -INF;
            beta = INF;
            continue;
        }
        alpha = score - ASPIRATION_WINDOW;
        beta = score + ASPIRATION_WINDOW;

        if thread_id == 0 && state.pv_length[0] > 0 {
            let mut line = format!(
                "info score {} depth {} nodes {} time {} pv",
                format_score(score),
                depth,
                state.nodes,
                info.elapsed_ms(),
            );
            for i in 0..state.pv_length[0] {
                let _ = write!(line, " {}", state.pv_table[0][i]);
            }
            println!("{}", line);
        }
        debug!(thread_id, depth, score, nodes = state.nodes, "depth completed");
        depth += 1;
    }
}
