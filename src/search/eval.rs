use crate::bitboard::BitIter;
use crate::board::{Board, Color, PIECES, Piece};
use crate::moves::attacks::attack_tables;
use crate::search::psqt;
use once_cell::sync::OnceCell;

const DOUBLED_PAWN_PENALTY: (i32, i32) = (-5, -10);
const ISOLATED_PAWN_PENALTY: (i32, i32) = (-5, -10);
/// Indexed by advancement: 0 = home rank, 6 = one step from promotion.
const PASSED_PAWN_BONUS: [i32; 8] = [0, 10, 30, 50, 75, 100, 150, 200];

const SEMI_OPEN_FILE_SCORE: i32 = 10;
const OPEN_FILE_SCORE: i32 = 15;
const KING_SHIELD_BONUS: i32 = 5;

const BISHOP_UNIT: i32 = 4;
const QUEEN_UNIT: i32 = 9;
const BISHOP_MOBILITY: (i32, i32) = (5, 5);
const QUEEN_MOBILITY: (i32, i32) = (1, 2);

// Phase weights; 24 = all minor and major pieces still on the board.
const TOTAL_PHASE: i32 = 24;

/// Per-square pawn-structure masks, built once.
struct EvalMasks {
    file: [u64; 64],
    isolated: [u64; 64],
    /// [color][square]: the cone of squares an enemy pawn would need to
    /// occupy to stop this pawn.
    passed: [[u64; 64]; 2],
}

fn eval_masks() -> &'static EvalMasks {
    static MASKS: OnceCell<EvalMasks> = OnceCell::new();
    MASKS.get_or_init(build_eval_masks)
}

fn file_mask(file: i32) -> u64 {
    if (0..8).contains(&file) {
        0x0101_0101_0101_0101 << file
    } else {
        0
    }
}

fn build_eval_masks() -> EvalMasks {
    let mut masks = EvalMasks {
        file: [0; 64],
        isolated: [0; 64],
        passed: [[0; 64]; 2],
    };
    for sq in 0..64usize {
        let (row, file) = (sq as i32 / 8, sq as i32 % 8);
        masks.file[sq] = file_mask(file);
        masks.isolated[sq] = file_mask(file - 1) | file_mask(file + 1);

        let tri = file_mask(file - 1) | file_mask(file) | file_mask(file + 1);
        // White advances toward row 0, so its cone is the rows above.
        let mut white_cone = 0u64;
        for r in 0..row {
            white_cone |= 0xFFu64 << (r * 8);
        }
        let mut black_cone = 0u64;
        for r in row + 1..8 {
            black_cone |= 0xFFu64 << (r * 8);
        }
        masks.passed[Color::White as usize][sq] = tri & white_cone;
        masks.passed[Color::Black as usize][sq] = tri & black_cone;
    }
    masks
}

fn phase(board: &Board) -> i32 {
    let count = |p: Piece| {
        (board.pieces(p, Color::White).count_ones() + board.pieces(p, Color::Black).count_ones())
            as i32
    };
    (count(Piece::Knight) + count(Piece::Bishop) + 2 * count(Piece::Rook) + 4 * count(Piece::Queen))
        .clamp(0, TOTAL_PHASE)
}

fn piece_value(piece: Piece) -> (i32, i32) {
    match piece {
        Piece::Pawn => psqt::PAWN_VAL,
        Piece::Knight => psqt::KNIGHT_VAL,
        Piece::Bishop => psqt::BISHOP_VAL,
        Piece::Rook => psqt::ROOK_VAL,
        Piece::Queen => psqt::QUEEN_VAL,
        Piece::King => psqt::KING_VAL,
    }
}

fn piece_tables(piece: Piece) -> (&'static [i32; 64], &'static [i32; 64]) {
    match piece {
        Piece::Pawn => (&psqt::PAWN_TABLE.0, &psqt::PAWN_TABLE.1),
        Piece::Knight => (&psqt::KNIGHT_TABLE.0, &psqt::KNIGHT_TABLE.1),
        Piece::Bishop => (&psqt::BISHOP_TABLE.0, &psqt::BISHOP_TABLE.1),
        Piece::Rook => (&psqt::ROOK_TABLE.0, &psqt::ROOK_TABLE.1),
        Piece::Queen => (&psqt::QUEEN_TABLE.0, &psqt::QUEEN_TABLE.1),
        Piece::King => (&psqt::KING_TABLE.0, &psqt::KING_TABLE.1),
    }
}

/// Static evaluation in centipawns from the side to move's point of view.
/// Material + piece-square tables interpolated by remaining non-pawn
/// material, plus pawn structure, file control, a king shield count, and
/// bishop/queen mobility. |result| stays far below the mate band.
pub fn evaluate(board: &Board) -> i32 {
    let masks = eval_masks();
    let tables = attack_tables();
    let occ = board.occupied();

    let mut opening = 0i32;
    let mut endgame = 0i32;

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let own_pawns = board.pieces(Piece::Pawn, color);
        let enemy_pawns = board.pieces(Piece::Pawn, color.opposite());
        let all_pawns = own_pawns | enemy_pawns;

        for piece in PIECES {
            let (mg_val, eg_val) = piece_value(piece);
            let (mg_tab, eg_tab) = piece_tables(piece);

            for sq in BitIter(board.pieces(piece, color)) {
                let sq = sq as usize;
                // Tables are White-oriented; Black reads mirrored.
                let tab_sq = if color == Color::White { sq } else { sq ^ 56 };

                opening += sign * (mg_val + mg_tab[tab_sq]);
                endgame += sign * (eg_val + eg_tab[tab_sq]);

                match piece {
                    Piece::Pawn => {
                        let doubled = (own_pawns & masks.file[sq]).count_ones() as i32;
                        if doubled > 1 {
                            opening += sign * (doubled - 1) * DOUBLED_PAWN_PENALTY.0;
                            endgame += sign * (doubled - 1) * DOUBLED_PAWN_PENALTY.1;
                        }
                        if own_pawns & masks.isolated[sq] == 0 {
                            opening += sign * ISOLATED_PAWN_PENALTY.0;
                            endgame += sign * ISOLATED_PAWN_PENALTY.1;
                        }
                        if enemy_pawns & masks.passed[color as usize][sq] == 0 {
                            let advancement = match color {
                                Color::White => 7 - sq / 8,
                                Color::Black => sq / 8,
                            };
                            opening += sign * PASSED_PAWN_BONUS[advancement];
                            endgame += sign * PASSED_PAWN_BONUS[advancement];
                        }
                    }
                    Piece::Bishop => {
                        let mobility =
                            tables.bishop_attack(sq, occ).count_ones() as i32 - BISHOP_UNIT;
                        opening += sign * mobility * BISHOP_MOBILITY.0;
                        endgame += sign * mobility * BISHOP_MOBILITY.1;
                    }
                    Piece::Rook => {
                        if own_pawns & masks.file[sq] == 0 {
                            opening += sign * SEMI_OPEN_FILE_SCORE;
                            endgame += sign * SEMI_OPEN_FILE_SCORE;
                        }
                        if all_pawns & masks.file[sq] == 0 {
                            opening += sign * OPEN_FILE_SCORE;
                            endgame += sign * OPEN_FILE_SCORE;
                        }
                    }
                    Piece::Queen => {
                        let mobility =
                            tables.queen_attack(sq, occ).count_ones() as i32 - QUEEN_UNIT;
                        opening += sign * mobility * QUEEN_MOBILITY.0;
                        endgame += sign * mobility * QUEEN_MOBILITY.1;
                    }
                    Piece::King => {
                        // Standing on a half-open or open file is the
                        // inverse of the rook bonus.
                        if own_pawns & masks.file[sq] == 0 {
                            opening -= sign * SEMI_OPEN_FILE_SCORE;
                            endgame -= sign * SEMI_OPEN_FILE_SCORE;
                        }
                        if all_pawns & masks.file[sq] == 0 {
                            opening -= sign * OPEN_FILE_SCORE;
                            endgame -= sign * OPEN_FILE_SCORE;
                        }
                        let shield =
                            (tables.king[sq] & board.occupancy(color)).count_ones() as i32;
                        opening += sign * shield * KING_SHIELD_BONUS;
                        endgame += sign * shield * KING_SHIELD_BONUS;
                    }
                    Piece::Knight => {}
                }
            }
        }
    }

    let phase = phase(board);
    let score = (opening * phase + endgame * (TOTAL_PHASE - phase)) / TOTAL_PHASE;
    if board.side_to_move == Color::White {
        score
    } else {
        -score
    }
}
