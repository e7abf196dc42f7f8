use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use crate::square::Square;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn piece_from_char(c: char) -> Option<(Color, Piece)> {
    let color = if c.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    let piece = match c.to_ascii_lowercase() {
        'p' => Piece::Pawn,
        'n' => Piece::Knight,
        'b' => Piece::Bishop,
        'r' => Piece::Rook,
        'q' => Piece::Queen,
        'k' => Piece::King,
        _ => return None,
    };
    Some((color, piece))
}

impl Board {
    /// Strict FEN import. The string is parsed into a scratch board and only
    /// assigned on success, so a malformed FEN never leaves `self` half
    /// updated.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!("FEN needs at least 4 fields, got {}", fields.len()));
        }

        let mut board = Board::new_empty();

        // 1. Piece placement, rank 8 first.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(format!("FEN placement has {} ranks, expected 8", ranks.len()));
        }
        for (row, rank_str) in ranks.iter().enumerate() {
            let mut file = 0u32;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(format!("bad skip digit '{}' in rank {}", c, 8 - row));
                    }
                    file += skip;
                } else if let Some((color, piece)) = piece_from_char(c) {
                    if file >= 8 {
                        return Err(format!("rank {} overflows the board", 8 - row));
                    }
                    board.place_piece(
                        color,
                        piece,
                        Square::from_index((row * 8) as u8 + file as u8),
                    );
                    file += 1;
                } else {
                    return Err(format!("unexpected character '{}' in placement", c));
                }
            }
            if file != 8 {
                return Err(format!("rank {} covers {} files, expected 8", 8 - row, file));
            }
        }

        // 2. Side to move.
        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("bad side-to-move field '{}'", other)),
        };

        // 3. Castling availability.
        if fields[2] != "-" {
            for c in fields[2].chars() {
                board.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(format!("bad castling flag '{}'", other)),
                };
            }
        }

        // 4. En-passant target.
        if fields[3] != "-" {
            let sq: Square = fields[3].parse()?;
            let valid_rank = match board.side_to_move {
                Color::White => sq.rank() == 6,
                Color::Black => sq.rank() == 3,
            };
            if !valid_rank {
                return Err(format!("en-passant square {} on impossible rank", sq));
            }
            board.en_passant = Some(sq);
        }

        // 5..6. Clocks; tolerated as absent.
        if let Some(half) = fields.get(4) {
            board.halfmove_clock = half
                .parse()
                .map_err(|_| format!("bad halfmove clock '{}'", half))?;
        }
        if let Some(full) = fields.get(5) {
            board.fullmove_number = full
                .parse()
                .map_err(|_| format!("bad fullmove number '{}'", full))?;
        }

        for color in [Color::White, Color::Black] {
            if board.pieces(Piece::King, color).count_ones() != 1 {
                return Err(format!("{:?} must have exactly one king", color));
            }
        }
        board.validate()?;
        board.refresh_hashes();

        *self = board;
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        for row in 0..8u8 {
            let mut empty = 0;
            for file in 0..8u8 {
                let sq = Square::from_index(row * 8 + file);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            out.push(char::from_digit(empty, 10).unwrap_or('0'));
                            empty = 0;
                        }
                        out.push(piece.to_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from_digit(empty, 10).unwrap_or('0'));
            }
            if row < 7 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(if self.side_to_move == Color::White { 'w' } else { 'b' });
        out.push(' ');
        if self.castling_rights == 0 {
            out.push('-');
        } else {
            out.push_str(&format_castling(self.castling_rights).replace('-', ""));
        }
        out.push(' ');
        match self.en_passant {
            Some(sq) => out.push_str(&sq.to_string()),
            None => out.push('-'),
        }
        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn start_fen_round_trips() {
        let board = Board::from_str(START_FEN).unwrap();
        assert_eq!(board.to_fen(), START_FEN);
        assert_eq!(board, Board::new());
    }

    #[test]
    fn parses_kiwipete() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board = Board::from_str(fen).unwrap();
        assert_eq!(board.to_fen(), fen);
        assert_eq!(board.occ_all.count_ones(), 32);
    }

    #[test]
    fn rejects_malformed_input_and_keeps_position() {
        let mut board = Board::new();
        let before = board.clone();
        assert!(board.set_fen("rnbqkbnr/pppppppp w KQkq - 0 1").is_err());
        assert!(board.set_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(board.set_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err()); // no kings
        assert!(
            board
                .set_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1")
                .is_err()
        );
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_square_parsed_and_ranked() {
        let board =
            Board::from_str("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(board.en_passant.map(|s| s.to_string()), Some("e3".into()));
        // ep on rank 5 is impossible
        assert!(
            Board::from_str("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e5 0 1").is_err()
        );
    }
}
