use crate::board::{Color, Piece};
use crate::square::Square;
use arrayvec::ArrayVec;
use std::fmt;

/// Ordered move buffer with fixed capacity; generation never allocates.
pub type MoveList = ArrayVec<Move, 256>;

/// Which moves a generator pass produces, and which moves the executor will
/// accept: in `Captures` mode quiet moves are refused by policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    All,
    Captures,
}

/// A move packed into 24 bits:
///
/// ```text
/// bits  0..6   source square
/// bits  6..12  target square
/// bits 12..16  mover piece code (color * 6 + kind)
/// bits 16..20  promotion piece code, 0 = none
/// bit  20      capture
/// bit  21      two-square pawn push
/// bit  22      en-passant capture
/// bit  23      castling
/// ```
///
/// The all-zero value encodes "no move".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move(u32);

#[inline(always)]
pub fn piece_code(color: Color, piece: Piece) -> u32 {
    color as u32 * 6 + piece as u32
}

impl Move {
    pub const NONE: Move = Move(0);

    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub fn encode(
        source: Square,
        target: Square,
        color: Color,
        piece: Piece,
        promoted: Option<Piece>,
        capture: bool,
        double_push: bool,
        en_passant: bool,
        castling: bool,
    ) -> Self {
        let promo_code = promoted.map_or(0, |p| piece_code(color, p));
        debug_assert!(promoted.is_none() || promo_code != 0);
        Move(
            source.index() as u32
                | (target.index() as u32) << 6
                | piece_code(color, piece) << 12
                | promo_code << 16
                | (capture as u32) << 20
                | (double_push as u32) << 21
                | (en_passant as u32) << 22
                | (castling as u32) << 23,
        )
    }

    #[inline(always)]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn source(self) -> Square {
        Square::from_index((self.0 & 0x3F) as u8)
    }

    #[inline(always)]
    pub fn target(self) -> Square {
        Square::from_index((self.0 >> 6 & 0x3F) as u8)
    }

    #[inline(always)]
    pub fn color(self) -> Color {
        Color::from_u8((self.0 >> 12 & 0xF) as u8 / 6)
    }

    #[inline(always)]
    pub fn piece(self) -> Piece {
        Piece::from_u8((self.0 >> 12 & 0xF) as u8 % 6)
    }

    /// Promotion piece kind, if any.
    #[inline(always)]
    pub fn promoted(self) -> Option<Piece> {
        let code = self.0 >> 16 & 0xF;
        if code == 0 {
            None
        } else {
            Some(Piece::from_u8((code % 6) as u8))
        }
    }

    #[inline(always)]
    pub fn is_capture(self) -> bool {
        self.0 & 1 << 20 != 0
    }

    #[inline(always)]
    pub fn is_double_push(self) -> bool {
        self.0 & 1 << 21 != 0
    }

    #[inline(always)]
    pub fn is_en_passant(self) -> bool {
        self.0 & 1 << 22 != 0
    }

    #[inline(always)]
    pub fn is_castling(self) -> bool {
        self.0 & 1 << 23 != 0
    }
}

impl fmt::Display for Move {
    /// Long-algebraic form: `e2e4`, `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source(), self.target())?;
        if let Some(promo) = self.promoted() {
            let c = match promo {
                Piece::Queen => 'q',
                Piece::Rook => 'r',
                Piece::Bishop => 'b',
                Piece::Knight => 'n',
                _ => '?',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
