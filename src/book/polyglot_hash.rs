use crate::bitboard::BitIter;
use crate::board::castle_bits::*;
use crate::board::{Board, Color, PIECES};
use crate::book::polyglot_keys::POLYGLOT_RANDOMS;
use crate::hash::zobrist::ep_file_to_hash;

/// Polyglot piece kinds count Black first within each pair: black pawn 0,
/// white pawn 1, black knight 2, ... white king 11.
#[inline(always)]
fn poly_piece_kind(color: Color, piece: crate::board::Piece) -> usize {
    piece as usize * 2 + if color == Color::White { 1 } else { 0 }
}

/// Computes the Polyglot key for a position. This hasher is independent of
/// the engine's own Zobrist tables: Polyglot squares put a1 at index 0, so
/// board squares are mirrored with `sq ^ 56`, the side word applies when
/// *White* is to move, and the en-passant file only counts while a pawn of
/// the side to move could actually capture.
pub fn polyglot_key(board: &Board) -> u64 {
    let mut key = 0u64;

    for color in [Color::White, Color::Black] {
        for piece in PIECES {
            let kind = poly_piece_kind(color, piece);
            for sq in BitIter(board.pieces(piece, color)) {
                let poly_sq = (sq ^ 56) as usize;
                key ^= POLYGLOT_RANDOMS[64 * kind + poly_sq];
            }
        }
    }

    if board.castling_rights & CASTLE_WK != 0 {
        key ^= POLYGLOT_RANDOMS[768];
    }
    if board.castling_rights & CASTLE_WQ != 0 {
        key ^= POLYGLOT_RANDOMS[769];
    }
    if board.castling_rights & CASTLE_BK != 0 {
        key ^= POLYGLOT_RANDOMS[770];
    }
    if board.castling_rights & CASTLE_BQ != 0 {
        key ^= POLYGLOT_RANDOMS[771];
    }

    // The capturable-en-passant rule is the same one the engine hash uses.
    if let Some(file) = ep_file_to_hash(board) {
        key ^= POLYGLOT_RANDOMS[772 + file as usize];
    }

    if board.side_to_move == Color::White {
        key ^= POLYGLOT_RANDOMS[780];
    }

    key
}
