//! End-to-end search behavior: forced mates, draws, legality of the chosen
//! move, and cancellation semantics.

use bastion::board::Board;
use bastion::moves::execute::make_move;
use bastion::moves::movegen::parse_move;
use bastion::moves::types::MoveKind;
use bastion::search::search::{SearchState, iterative_deepening};
use bastion::search::tt::TransTable;
use bastion::search::workers::SearchInfo;
use std::str::FromStr;
use std::sync::Arc;

fn search_fen(fen: &str, depth: i32) -> (SearchState, Board) {
    let mut board = Board::from_str(fen).expect("valid FEN");
    let tt = TransTable::new(16);
    let info = Arc::new(SearchInfo::fixed_depth(depth));
    let mut state = SearchState::new();
    iterative_deepening(&mut board, &tt, &info, &mut state, 1);
    (state, board)
}

#[test]
fn back_rank_mate_in_one_found_at_depth_one() {
    let (state, _) = search_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1", 1);
    assert_eq!(state.best_move().to_string(), "a1a8");
}

#[test]
fn smothered_position_mate_in_one() {
    // Nf7# against the cornered king.
    let (state, board) = search_fen("6rk/6pp/7N/8/8/8/8/Q3K3 w - - 0 1", 3);
    let mv = state.best_move();
    let mut scratch = board.clone();
    assert!(make_move(&mut scratch, mv, MoveKind::All));
    // The chosen move must deliver mate: opponent has no reply.
    let mut replies = bastion::moves::types::MoveList::new();
    bastion::moves::movegen::generate_moves(&scratch, MoveKind::All, &mut replies);
    let any_legal = replies.iter().any(|&reply| {
        let mut b = scratch.clone();
        make_move(&mut b, reply, MoveKind::All)
    });
    assert!(!any_legal, "{} does not mate", mv);
    assert!(scratch.in_check(scratch.side_to_move));
}

#[test]
fn mate_scores_sit_in_the_mate_band() {
    let mut board = Board::from_str("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    let tt = TransTable::new(8);
    let info = Arc::new(SearchInfo::fixed_depth(4));
    let mut state = SearchState::new();
    iterative_deepening(&mut board, &tt, &info, &mut state, 1);
    // PV leads with the mate; its length equals the mate distance.
    assert_eq!(state.pv_length[0], 1);
    assert_eq!(state.best_move().to_string(), "a1a8");
}

#[test]
fn repetition_on_the_board_history_reads_as_draw() {
    let mut board = Board::new();
    // Shuffle knights out and back twice; the final position repeats.
    for text in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1"] {
        let mv = parse_move(&board, text);
        board.push_repetition();
        assert!(make_move(&mut board, mv, MoveKind::All));
    }
    assert!(board.is_repetition());
}

#[test]
fn chosen_move_is_legal_in_quiet_positions() {
    for fen in [
        "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 0 1",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    ] {
        let (state, board) = search_fen(fen, 4);
        let mv = state.best_move();
        assert!(!mv.is_none(), "no best move for {}", fen);
        let mut scratch = board.clone();
        assert!(
            make_move(&mut scratch, mv, MoveKind::All),
            "{} illegal in {}",
            mv,
            fen
        );
    }
}

#[test]
fn pv_line_is_playable_from_the_root() {
    let (state, board) =
        search_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 3 3", 5);
    let mut scratch = board.clone();
    for i in 0..state.pv_length[0] {
        let mv = state.pv_table[0][i];
        assert!(
            make_move(&mut scratch, mv, MoveKind::All),
            "pv move {} at index {} is illegal",
            mv,
            i
        );
    }
}

#[test]
fn a_preset_stop_flag_freezes_the_search() {
    let mut board = Board::new();
    let tt = TransTable::new(1);
    let info = Arc::new(SearchInfo::fixed_depth(12));
    info.request_stop();
    let mut state = SearchState::new();
    iterative_deepening(&mut board, &tt, &info, &mut state, 0);
    // Nothing completed: no PV, no output-worthy state.
    assert_eq!(state.pv_length[0], 0);
    assert_eq!(state.nodes, 0);
}

#[test]
fn deeper_search_does_not_regress_obvious_recaptures() {
    // White just lost a queen for nothing unless it recaptures on d5.
    let (state, board) = search_fen("rnb1kbnr/ppp1pppp/8/3q4/8/2N5/PPPP1PPP/R1BQKBNR w KQkq - 0 3", 4);
    let mv = state.best_move();
    let mut scratch = board.clone();
    assert!(make_move(&mut scratch, mv, MoveKind::All));
    assert_eq!(mv.to_string(), "c3d5", "expected the queen recapture");
}
