use crate::board::{Board, Color, Piece};
use once_cell::sync::OnceCell;
use rand::{RngCore, SeedableRng, rngs::StdRng};

const FILE_A: u64 = 0x0101_0101_0101_0101;
const FILE_H: u64 = 0x8080_8080_8080_8080;

#[cfg(feature = "deterministic_zobrist")]
const ZOBRIST_SEED: u64 = 0xB5AD_4ECE_DA1C_E2A9;

fn make_zobrist_rng() -> StdRng {
    #[cfg(feature = "deterministic_zobrist")]
    {
        StdRng::seed_from_u64(ZOBRIST_SEED)
    }
    #[cfg(not(feature = "deterministic_zobrist"))]
    {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        StdRng::from_seed(seed)
    }
}

/// Two independent word tables fingerprint every position: `key` drives the
/// transposition table and repetition detection, `lock` is the second hash
/// carried alongside it. Each table covers [color][piece][square], the
/// castling-rights nibble (one word per mask value), the en-passant file,
/// and the side to move.
pub struct ZobristKeys {
    pub piece_key: [[[u64; 64]; 6]; 2],
    pub piece_lock: [[[u64; 64]; 6]; 2],
    pub castle_key: [u64; 16],
    pub castle_lock: [u64; 16],
    pub ep_key: [u64; 8],
    pub ep_lock: [u64; 8],
    pub side_key: u64,
    pub side_lock: u64,
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(make_zobrist_rng()))
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece_key: [[[0; 64]; 6]; 2],
        piece_lock: [[[0; 64]; 6]; 2],
        castle_key: [0; 16],
        castle_lock: [0; 16],
        ep_key: [0; 8],
        ep_lock: [0; 8],
        side_key: 0,
        side_lock: 0,
    };

    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece_key[c][p][sq] = non_zero(&mut rng);
                keys.piece_lock[c][p][sq] = non_zero(&mut rng);
            }
        }
    }
    for mask in 0..16 {
        keys.castle_key[mask] = non_zero(&mut rng);
        keys.castle_lock[mask] = non_zero(&mut rng);
    }
    for file in 0..8 {
        keys.ep_key[file] = non_zero(&mut rng);
        keys.ep_lock[file] = non_zero(&mut rng);
    }
    keys.side_key = non_zero(&mut rng);
    keys.side_lock = non_zero(&mut rng);
    keys
}

/// Returns `Some(file)` when the en-passant square contributes to the hash
/// this ply: the square must be set and a pawn of the side to move must be
/// able to capture onto it (pseudo-legally; pins are ignored).
pub fn ep_file_to_hash(board: &Board) -> Option<u8> {
    let ep = board.en_passant?;
    let row = ep.row();
    // row 5 is rank 3 (White just double-pushed), row 2 is rank 6.
    if row != 2 && row != 5 {
        return None;
    }

    let ep_bb = ep.bb();
    let has_capturing_pawn = match board.side_to_move {
        // White pawns sit one row below (higher index) the target square.
        Color::White => {
            let srcs = ((ep_bb << 9) & !FILE_A) | ((ep_bb << 7) & !FILE_H);
            srcs & board.pieces(Piece::Pawn, Color::White) != 0
        }
        Color::Black => {
            let srcs = ((ep_bb >> 7) & !FILE_A) | ((ep_bb >> 9) & !FILE_H);
            srcs & board.pieces(Piece::Pawn, Color::Black) != 0
        }
    };

    if has_capturing_pawn { Some(ep.file()) } else { None }
}
