use bastion::board::Board;
use bastion::moves::perft::{perft, perft_divide};
use bastion::moves::types::MoveKind;
use std::str::FromStr;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION5_FEN: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn run(fen: &str, depth: u32, expected: u64) {
    let mut board = Board::from_str(fen).expect("valid FEN");
    let nodes = perft(&mut board, depth, MoveKind::All);
    assert_eq!(
        nodes, expected,
        "perft({}) mismatch for {}: got {}, expected {}",
        depth, fen, nodes, expected
    );
}

#[test]
fn perft_startpos_shallow() {
    run(START_FEN, 0, 1);
    run(START_FEN, 1, 20);
    run(START_FEN, 2, 400);
    run(START_FEN, 3, 8_902);
}

#[test]
fn perft_startpos_d4() {
    run(START_FEN, 4, 197_281);
}

#[test]
#[ignore]
fn perft_startpos_d5() {
    run(START_FEN, 5, 4_865_609);
}

#[test]
fn perft_kiwipete_shallow() {
    run(KIWIPETE_FEN, 1, 48);
    run(KIWIPETE_FEN, 2, 2_039);
    run(KIWIPETE_FEN, 3, 97_862);
}

#[test]
fn perft_kiwipete_d4() {
    run(KIWIPETE_FEN, 4, 4_085_603);
}

#[test]
fn perft_position5_shallow() {
    run(POSITION5_FEN, 1, 44);
    run(POSITION5_FEN, 2, 1_486);
    run(POSITION5_FEN, 3, 62_379);
}

#[test]
fn perft_position5_d4() {
    run(POSITION5_FEN, 4, 2_103_487);
}

/// Counts are a pure function of the position: repeated runs agree, and the
/// board comes back untouched.
#[test]
fn perft_is_deterministic_and_side_effect_free() {
    let mut board = Board::from_str(KIWIPETE_FEN).unwrap();
    let before = board.clone();
    let first = perft(&mut board, 3, MoveKind::All);
    let second = perft(&mut board, 3, MoveKind::All);
    assert_eq!(first, second);
    assert_eq!(board, before);
}

#[test]
fn divide_agrees_with_total() {
    let mut board = Board::from_str(START_FEN).unwrap();
    let per_move = perft_divide(&mut board, 3);
    assert_eq!(per_move.len(), 20);
    let total: u64 = per_move.iter().map(|(_, n)| n).sum();
    assert_eq!(total, 8_902);
}
