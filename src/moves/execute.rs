use crate::board::castle_bits::CASTLING_RIGHTS;
use crate::board::{Board, Color, Piece};
use crate::hash::zobrist::{ep_file_to_hash, zobrist_keys};
use crate::moves::types::{Move, MoveKind};
use crate::square::Square;

/// Post-castle rook relocation keyed by the king's landing square.
#[inline(always)]
fn rook_castle_squares(king_target: u8) -> (Square, Square) {
    match king_target {
        62 => (Square::from_index(63), Square::from_index(61)), // White O-O
        58 => (Square::from_index(56), Square::from_index(59)), // White O-O-O
        6 => (Square::from_index(7), Square::from_index(5)),    // Black O-O
        2 => (Square::from_index(0), Square::from_index(3)),    // Black O-O-O
        other => unreachable!("castling king target {} not a castle square", other),
    }
}

/// Applies `mv` to the board, keeping occupancies and both hashes current.
/// On success the side to move has flipped and `true` is returned. If the
/// move would leave the mover's own king attacked, the position is restored
/// from the entry snapshot and `false` is returned. In `Captures` mode
/// quiet moves fail without touching the board.
pub fn make_move(board: &mut Board, mv: Move, kind: MoveKind) -> bool {
    if kind == MoveKind::Captures {
        if mv.is_capture() {
            return make_move(board, mv, MoveKind::All);
        }
        return false;
    }

    let snapshot = board.clone();
    let keys = zobrist_keys();
    let color = board.side_to_move;
    let piece = mv.piece();
    let source = mv.source();
    let target = mv.target();

    // Retire the old en-passant hash contribution while the pawn boards are
    // still in their pre-move state.
    if let Some(file) = ep_file_to_hash(board) {
        board.key ^= keys.ep_key[file as usize];
        board.lock ^= keys.ep_lock[file as usize];
    }
    board.en_passant = None;

    board.remove_piece(color, piece, source);

    if mv.is_en_passant() {
        // The captured pawn sits one row behind the landing square.
        let captured_sq = match color {
            Color::White => Square::from_index(target.index() + 8),
            Color::Black => Square::from_index(target.index() - 8),
        };
        board.remove_piece(color.opposite(), Piece::Pawn, captured_sq);
    } else if mv.is_capture()
        && let Some((cap_color, cap_piece)) = board.piece_at(target)
    {
        board.remove_piece(cap_color, cap_piece, target);
    }

    match mv.promoted() {
        Some(promo) => {
            debug_assert_eq!(piece, Piece::Pawn);
            board.place_piece(color, promo, target);
        }
        None => board.place_piece(color, piece, target),
    }

    if mv.is_double_push() {
        let transit = match color {
            Color::White => Square::from_index(source.index() - 8),
            Color::Black => Square::from_index(source.index() + 8),
        };
        board.en_passant = Some(transit);
    }

    if mv.is_castling() {
        let (rook_from, rook_to) = rook_castle_squares(target.index());
        board.remove_piece(color, Piece::Rook, rook_from);
        board.place_piece(color, Piece::Rook, rook_to);
    }

    // Rights decay whenever a king or rook leaves home or a corner square is
    // touched; rehash the mask word across the change.
    let old_rights = board.castling_rights;
    let new_rights = old_rights
        & CASTLING_RIGHTS[source.index() as usize]
        & CASTLING_RIGHTS[target.index() as usize];
    if new_rights != old_rights {
        board.key ^= keys.castle_key[old_rights as usize] ^ keys.castle_key[new_rights as usize];
        board.lock ^= keys.castle_lock[old_rights as usize] ^ keys.castle_lock[new_rights as usize];
        board.castling_rights = new_rights;
    }

    if mv.is_capture() || piece == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }
    if color == Color::Black {
        board.fullmove_number += 1;
    }

    board.side_to_move = color.opposite();
    board.key ^= keys.side_key;
    board.lock ^= keys.side_lock;

    // The new en-passant contribution is judged against the fully mutated
    // board (pawn boards and side already final).
    if let Some(file) = ep_file_to_hash(board) {
        board.key ^= keys.ep_key[file as usize];
        board.lock ^= keys.ep_lock[file as usize];
    }

    #[cfg(debug_assertions)]
    board.assert_hashes();

    if board.in_check(color) {
        *board = snapshot;
        return false;
    }
    true
}
