//! Executor contract: an accepted move mutates exactly one ply forward and
//! the pre-move snapshot restores everything; a rejected move leaves no
//! trace; accepted moves never leave the mover's king attacked.

use bastion::board::{Board, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use bastion::moves::execute::make_move;
use bastion::moves::movegen::{generate_moves, parse_move};
use bastion::moves::types::{MoveKind, MoveList};
use bastion::square::Square;
use std::str::FromStr;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

#[test]
fn snapshot_round_trip_is_bit_exact() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let board = Board::from_str(fen).unwrap();
    let mut list = MoveList::new();
    generate_moves(&board, MoveKind::All, &mut list);
    assert_eq!(list.len(), 48);

    for mv in list {
        let mut scratch = board.clone();
        if make_move(&mut scratch, mv, MoveKind::All) {
            assert_ne!(scratch, board, "move {} must change the position", mv);
            scratch = board.clone();
            assert_eq!(scratch, board);
        } else {
            assert_eq!(scratch, board, "rejected {} must leave no trace", mv);
        }
    }
}

#[test]
fn accepted_moves_leave_the_king_safe() {
    for fen in [
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    ] {
        let board = Board::from_str(fen).unwrap();
        let mover = board.side_to_move;
        let mut list = MoveList::new();
        generate_moves(&board, MoveKind::All, &mut list);
        for mv in list {
            let mut scratch = board.clone();
            if make_move(&mut scratch, mv, MoveKind::All) {
                assert!(!scratch.in_check(mover), "{} leaves the king hanging", mv);
                assert_eq!(scratch.side_to_move, mover.opposite());
            }
        }
    }
}

#[test]
fn en_passant_clears_the_captured_pawn_and_expires() {
    let mut board =
        Board::from_str("rnbqkbnr/pp1p1pPp/8/2p1pP2/1P1P4/3P3P/P1P1P3/RNBQKBNR w KQkq e6 0 1")
            .unwrap();
    let mv = parse_move(&board, "f5e6");
    assert!(mv.is_en_passant());
    assert!(make_move(&mut board, mv, MoveKind::All));
    assert_eq!(board.piece_at(sq("e5")), None);
    assert_eq!(board.piece_at(sq("e6")), Some((Color::White, Piece::Pawn)));
    assert_eq!(board.en_passant, None);
}

#[test]
fn double_push_sets_the_transit_square() {
    let mut board = Board::new();
    let mv = parse_move(&board, "e2e4");
    assert!(make_move(&mut board, mv, MoveKind::All));
    assert_eq!(board.en_passant, Some(sq("e3")));
    let mv = parse_move(&board, "g8f6");
    assert!(make_move(&mut board, mv, MoveKind::All));
    assert_eq!(board.en_passant, None);
}

#[test]
fn rook_capture_on_the_corner_kills_that_right() {
    let mut board =
        Board::from_str("r3k2r/8/8/8/8/8/6b1/R3K2R b KQkq - 0 1").unwrap();
    // Bishop takes the h1 rook: White loses kingside castling only.
    let mv = parse_move(&board, "g2h1");
    assert!(make_move(&mut board, mv, MoveKind::All));
    assert!(!board.has_castling(CASTLE_WK));
    assert!(board.has_castling(CASTLE_WQ));
    assert!(board.has_castling(CASTLE_BQ));
}

#[test]
fn queenside_castle_relocates_the_rook() {
    let mut board =
        Board::from_str("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1").unwrap();
    let mv = parse_move(&board, "e8c8");
    assert!(make_move(&mut board, mv, MoveKind::All));
    assert_eq!(board.king_square(Color::Black), sq("c8"));
    assert_eq!(board.piece_at(sq("d8")), Some((Color::Black, Piece::Rook)));
    assert_eq!(board.piece_at(sq("a8")), None);
}

#[test]
fn promotion_capture_updates_both_sides() {
    let mut board =
        Board::from_str("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8").unwrap();
    let mv = parse_move(&board, "d7c8q");
    assert!(make_move(&mut board, mv, MoveKind::All));
    assert_eq!(board.piece_at(sq("c8")), Some((Color::White, Piece::Queen)));
    assert_eq!(board.pieces(Piece::Bishop, Color::Black).count_ones(), 1);
}

#[test]
fn capture_only_mode_rejects_every_quiet_move() {
    let board = Board::new();
    let mut list = MoveList::new();
    generate_moves(&board, MoveKind::All, &mut list);
    for mv in list {
        let mut scratch = board.clone();
        let accepted = make_move(&mut scratch, mv, MoveKind::Captures);
        assert!(!accepted, "{} is quiet and must be refused", mv);
        assert_eq!(scratch, board);
    }
}

#[test]
fn halfmove_clock_resets_on_pawn_moves_and_captures() {
    let mut board = Board::new();
    let mv = parse_move(&board, "g1f3");
    assert!(make_move(&mut board, mv, MoveKind::All));
    assert_eq!(board.halfmove_clock, 1);
    let mv = parse_move(&board, "d7d5");
    assert!(make_move(&mut board, mv, MoveKind::All));
    assert_eq!(board.halfmove_clock, 0);
    assert_eq!(board.fullmove_number, 2);
}
