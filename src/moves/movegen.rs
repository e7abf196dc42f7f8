use crate::bitboard::BitIter;
use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use crate::moves::attacks::attack_tables;
use crate::moves::types::{Move, MoveKind, MoveList};
use crate::square::Square;

const PROMOS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// Appends every pseudo-legal move for the side to move. Moves that leave
/// the own king in check are filtered later by the executor, not here.
pub fn generate_moves(board: &Board, kind: MoveKind, list: &mut MoveList) {
    generate_pawns(board, kind, list);
    generate_knights(board, kind, list);
    generate_bishops(board, kind, list);
    generate_rooks(board, kind, list);
    generate_queens(board, kind, list);
    generate_kings(board, kind, list);
}

pub fn generate_pawns(board: &Board, kind: MoveKind, list: &mut MoveList) {
    let color = board.side_to_move;
    let tables = attack_tables();
    let enemy = board.opponent_occupancy(color);

    // White pawns advance toward row 0, Black toward row 7.
    let (push_dir, promo_row, double_row) = match color {
        Color::White => (-8i16, 1u8, 6u8),
        Color::Black => (8, 6, 1),
    };

    for source in BitIter(board.pieces(Piece::Pawn, color)) {
        let from = Square::from_index(source);
        let target = source as i16 + push_dir;

        if kind != MoveKind::Captures
            && (0..64).contains(&target)
            && board.occupied() >> target & 1 == 0
        {
            let to = Square::from_index(target as u8);
            if from.row() == promo_row {
                for promo in PROMOS {
                    list.push(Move::encode(
                        from, to, color, Piece::Pawn, Some(promo),
                        false, false, false, false,
                    ));
                }
            } else {
                list.push(Move::encode(
                    from, to, color, Piece::Pawn, None, false, false, false, false,
                ));
                let double_target = target + push_dir;
                if from.row() == double_row && board.occupied() >> double_target & 1 == 0 {
                    list.push(Move::encode(
                        from,
                        Square::from_index(double_target as u8),
                        color,
                        Piece::Pawn,
                        None,
                        false,
                        true,
                        false,
                        false,
                    ));
                }
            }
        }

        for target in BitIter(tables.pawn[color as usize][source as usize] & enemy) {
            let to = Square::from_index(target);
            if from.row() == promo_row {
                for promo in PROMOS {
                    list.push(Move::encode(
                        from, to, color, Piece::Pawn, Some(promo),
                        true, false, false, false,
                    ));
                }
            } else {
                list.push(Move::encode(
                    from, to, color, Piece::Pawn, None, true, false, false, false,
                ));
            }
        }

        if let Some(ep) = board.en_passant
            && tables.pawn[color as usize][source as usize] & ep.bb() != 0
        {
            list.push(Move::encode(
                from, ep, color, Piece::Pawn, None, true, false, true, false,
            ));
        }
    }
}

fn generate_piece_moves(
    board: &Board,
    kind: MoveKind,
    piece: Piece,
    attack: impl Fn(usize, u64) -> u64,
    list: &mut MoveList,
) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy = board.opponent_occupancy(color);

    for source in BitIter(board.pieces(piece, color)) {
        let targets = attack(source as usize, board.occupied()) & !friendly;
        for target in BitIter(targets) {
            let capture = enemy >> target & 1 != 0;
            if !capture && kind == MoveKind::Captures {
                continue;
            }
            list.push(Move::encode(
                Square::from_index(source),
                Square::from_index(target),
                color,
                piece,
                None,
                capture,
                false,
                false,
                false,
            ));
        }
    }
}

pub fn generate_knights(board: &Board, kind: MoveKind, list: &mut MoveList) {
    let t = attack_tables();
    generate_piece_moves(board, kind, Piece::Knight, |sq, _| t.knight[sq], list);
}

pub fn generate_bishops(board: &Board, kind: MoveKind, list: &mut MoveList) {
    let t = attack_tables();
    generate_piece_moves(board, kind, Piece::Bishop, |sq, occ| t.bishop_attack(sq, occ), list);
}

pub fn generate_rooks(board: &Board, kind: MoveKind, list: &mut MoveList) {
    let t = attack_tables();
    generate_piece_moves(board, kind, Piece::Rook, |sq, occ| t.rook_attack(sq, occ), list);
}

pub fn generate_queens(board: &Board, kind: MoveKind, list: &mut MoveList) {
    let t = attack_tables();
    generate_piece_moves(board, kind, Piece::Queen, |sq, occ| t.queen_attack(sq, occ), list);
}

pub fn generate_kings(board: &Board, kind: MoveKind, list: &mut MoveList) {
    let t = attack_tables();
    generate_piece_moves(board, kind, Piece::King, |sq, _| t.king[sq], list);
    if kind != MoveKind::Captures {
        match board.side_to_move {
            Color::White => generate_white_castling(board, list),
            Color::Black => generate_black_castling(board, list),
        }
    }
}

/// Castling gates: the right must be live, the path between king and rook
/// empty, and the king's start and transit squares unattacked. The landing
/// square is vetted by the executor's king-safety check.
fn generate_white_castling(board: &Board, list: &mut MoveList) {
    const E1: u8 = 60;
    const F1: u8 = 61;
    const G1: u8 = 62;
    const D1: u8 = 59;
    const C1: u8 = 58;
    const B1: u8 = 57;

    let occ = board.occupied();
    if board.has_castling(CASTLE_WK)
        && occ & (1 << F1 | 1 << G1) == 0
        && !board.sq_attacked(Square::from_index(E1), Color::Black)
        && !board.sq_attacked(Square::from_index(F1), Color::Black)
    {
        list.push(Move::encode(
            Square::from_index(E1),
            Square::from_index(G1),
            Color::White,
            Piece::King,
            None,
            false,
            false,
            false,
            true,
        ));
    }
    if board.has_castling(CASTLE_WQ)
        && occ & (1 << B1 | 1 << C1 | 1 << D1) == 0
        && !board.sq_attacked(Square::from_index(E1), Color::Black)
        && !board.sq_attacked(Square::from_index(D1), Color::Black)
    {
        list.push(Move::encode(
            Square::from_index(E1),
            Square::from_index(C1),
            Color::White,
            Piece::King,
            None,
            false,
            false,
            false,
            true,
        ));
    }
}

fn generate_black_castling(board: &Board, list: &mut MoveList) {
    const E8: u8 = 4;
    const F8: u8 = 5;
    const G8: u8 = 6;
    const D8: u8 = 3;
    const C8: u8 = 2;
    const B8: u8 = 1;

    let occ = board.occupied();
    if board.has_castling(CASTLE_BK)
        && occ & (1 << F8 | 1 << G8) == 0
        && !board.sq_attacked(Square::from_index(E8), Color::White)
        && !board.sq_attacked(Square::from_index(F8), Color::White)
    {
        list.push(Move::encode(
            Square::from_index(E8),
            Square::from_index(G8),
            Color::Black,
            Piece::King,
            None,
            false,
            false,
            false,
            true,
        ));
    }
    if board.has_castling(CASTLE_BQ)
        && occ & (1 << B8 | 1 << C8 | 1 << D8) == 0
        && !board.sq_attacked(Square::from_index(E8), Color::White)
        && !board.sq_attacked(Square::from_index(D8), Color::White)
    {
        list.push(Move::encode(
            Square::from_index(E8),
            Square::from_index(C8),
            Color::Black,
            Piece::King,
            None,
            false,
            false,
            false,
            true,
        ));
    }
}

/// Finds the generated move matching a long-algebraic string such as `e2e4`
/// or `e7e8q`; returns `Move::NONE` when no candidate matches.
pub fn parse_move(board: &Board, text: &str) -> Move {
    let bytes = text.as_bytes();
    if bytes.len() < 4 || bytes.len() > 5 {
        return Move::NONE;
    }
    let (Ok(source), Ok(target)) = (text[0..2].parse::<Square>(), text[2..4].parse::<Square>())
    else {
        return Move::NONE;
    };
    let promoted = match bytes.get(4).copied() {
        None => None,
        Some(b'q') => Some(Piece::Queen),
        Some(b'r') => Some(Piece::Rook),
        Some(b'b') => Some(Piece::Bishop),
        Some(b'n') => Some(Piece::Knight),
        Some(_) => return Move::NONE,
    };

    let mut list = MoveList::new();
    generate_moves(board, MoveKind::All, &mut list);
    list.iter()
        .copied()
        .find(|mv| mv.source() == source && mv.target() == target && mv.promoted() == promoted)
        .unwrap_or(Move::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn moves_of(fen: &str) -> MoveList {
        let board = Board::from_str(fen).unwrap();
        let mut list = MoveList::new();
        generate_moves(&board, MoveKind::All, &mut list);
        list
    }

    #[test]
    fn start_position_has_twenty_pseudo_legals() {
        let list = moves_of(crate::board::START_FEN);
        assert_eq!(list.len(), 20);
    }

    #[test]
    fn promotion_emits_all_four_pieces() {
        let list = moves_of("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let promos: Vec<String> = list
            .iter()
            .filter(|m| m.promoted().is_some())
            .map(|m| m.to_string())
            .collect();
        assert_eq!(promos.len(), 4);
        assert!(promos.contains(&"a7a8q".to_string()));
        assert!(promos.contains(&"a7a8n".to_string()));
    }

    #[test]
    fn en_passant_capture_generated() {
        let list = moves_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        assert!(list.iter().any(|m| m.is_en_passant() && m.to_string() == "e5d6"));
    }

    #[test]
    fn capture_mode_skips_quiet_moves() {
        let board = Board::from_str("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        generate_moves(&board, MoveKind::Captures, &mut list);
        assert!(list.iter().all(|m| m.is_capture()));
        assert!(list.iter().any(|m| m.to_string() == "e4d5"));
    }

    #[test]
    fn castling_blocked_by_attack_on_transit() {
        // Black rook on f8 covers f1? No: f-file rook on f8 eyes f1 transit.
        let list = moves_of("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!list.iter().any(|m| m.is_castling() && m.to_string() == "e1g1"));
        assert!(list.iter().any(|m| m.is_castling() && m.to_string() == "e1c1"));
    }

    #[test]
    fn parse_move_matches_generated_candidates() {
        let board = Board::from_str(crate::board::START_FEN).unwrap();
        let mv = parse_move(&board, "e2e4");
        assert!(!mv.is_none());
        assert!(mv.is_double_push());
        assert!(parse_move(&board, "e2e5").is_none());
        assert!(parse_move(&board, "zz99").is_none());
    }
}
