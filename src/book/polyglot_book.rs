use crate::board::{Board, Piece};
use crate::book::polyglot_hash::polyglot_key;
use crate::moves::execute::make_move;
use crate::moves::movegen::generate_moves;
use crate::moves::types::{Move, MoveKind, MoveList};
use crate::square::Square;
use rand::Rng;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// One 16-byte book record, big-endian on disk.
#[derive(Debug, Clone, Copy)]
pub struct PolyglotEntry {
    pub key: u64,
    pub mv: u16,
    pub weight: u16,
    pub learn: u32,
}

impl PolyglotEntry {
    pub fn from_bytes(bytes: &[u8; 16]) -> Self {
        PolyglotEntry {
            key: u64::from_be_bytes(bytes[0..8].try_into().unwrap_or([0; 8])),
            mv: u16::from_be_bytes(bytes[8..10].try_into().unwrap_or([0; 2])),
            weight: u16::from_be_bytes(bytes[10..12].try_into().unwrap_or([0; 2])),
            learn: u32::from_be_bytes(bytes[12..16].try_into().unwrap_or([0; 4])),
        }
    }

    /// Unpacks the move fields. Bits [0..3) target file, [3..6) target rank,
    /// [6..9) source file, [9..12) source rank, [12..15) promotion. Ranks
    /// are Polyglot-oriented (0 = White's first rank), so squares mirror
    /// with `^ 56` into board indices.
    fn decode_squares(&self) -> (Square, Square, Option<Piece>) {
        let to_file = (self.mv & 0x7) as u8;
        let to_rank = (self.mv >> 3 & 0x7) as u8;
        let from_file = (self.mv >> 6 & 0x7) as u8;
        let from_rank = (self.mv >> 9 & 0x7) as u8;
        let promo = match self.mv >> 12 & 0x7 {
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            _ => None,
        };
        let from = Square::from_index((from_rank * 8 + from_file) ^ 56);
        let to = Square::from_index((to_rank * 8 + to_file) ^ 56);
        (from, to, promo)
    }

    /// Matches the record against the position's generated moves. Polyglot
    /// encodes castling king-onto-rook; that is translated to the engine's
    /// king-two-squares form before matching.
    pub fn decode_move(&self, board: &Board) -> Option<Move> {
        let (from, mut to, promo) = self.decode_squares();

        if board.piece_at(from).map(|(_, p)| p) == Some(Piece::King) {
            to = match (from.index(), to.index()) {
                (60, 63) => Square::from_index(62), // e1h1 -> e1g1
                (60, 56) => Square::from_index(58), // e1a1 -> e1c1
                (4, 7) => Square::from_index(6),    // e8h8 -> e8g8
                (4, 0) => Square::from_index(2),    // e8a8 -> e8c8
                _ => to,
            };
        }

        let mut list = MoveList::new();
        generate_moves(board, MoveKind::All, &mut list);
        list.into_iter()
            .find(|mv| mv.source() == from && mv.target() == to && mv.promoted() == promo)
    }
}

/// An opening book in Polyglot format: sorted fixed-size records probed by
/// the Polyglot position hash.
pub struct PolyglotBook {
    entries: Vec<PolyglotEntry>,
}

impl PolyglotBook {
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;

        if buffer.len() < 16 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "book file holds no complete entry",
            ));
        }

        let entries = buffer
            .chunks_exact(16)
            .map(|chunk| {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(chunk);
                PolyglotEntry::from_bytes(&bytes)
            })
            .collect::<Vec<_>>();
        debug!(count = entries.len(), "opening book loaded");
        Ok(PolyglotBook { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks a book move for the position, weighting the random choice by
    /// the entries' weight fields; when every weight is zero the first
    /// decodable entry wins. The chosen move is replayed on a scratch board
    /// so an unsound record can never escape.
    pub fn probe(&self, board: &Board) -> Option<Move> {
        let key = polyglot_key(board);
        let start = self.entries.partition_point(|e| e.key < key);
        let matches: Vec<&PolyglotEntry> = self.entries[start..]
            .iter()
            .take_while(|e| e.key == key)
            .collect();
        if matches.is_empty() {
            return None;
        }

        let legal = |mv: Move| {
            let mut scratch = board.clone();
            make_move(&mut scratch, mv, MoveKind::All).then_some(mv)
        };

        let total_weight: u32 = matches.iter().map(|e| e.weight as u32).sum();
        if total_weight == 0 {
            return matches
                .iter()
                .find_map(|e| e.decode_move(board).and_then(|mv| legal(mv)));
        }

        let mut pick = rand::rng().random_range(0..total_weight);
        for entry in &matches {
            let w = entry.weight as u32;
            if pick < w {
                return entry.decode_move(board).and_then(|mv| legal(mv));
            }
            pick -= w;
        }
        None
    }
}
