/// Castling rights live in one nibble: bit 0 = White kingside, bit 1 =
/// White queenside, bit 2 = Black kingside, bit 3 = Black queenside.
pub type CastleBits = u8;

pub const CASTLE_WK: CastleBits = 0b0001;
pub const CASTLE_WQ: CastleBits = 0b0010;
pub const CASTLE_BK: CastleBits = 0b0100;
pub const CASTLE_BQ: CastleBits = 0b1000;

pub const CASTLE_ALL: CastleBits = CASTLE_WK | CASTLE_WQ | CASTLE_BK | CASTLE_BQ;

/// Per-square rights filter: after a move the remaining rights are
/// `rights & CASTLING_RIGHTS[source] & CASTLING_RIGHTS[target]`. The
/// non-trivial entries sit on the king and rook home squares, so a king or
/// rook leaving home, or a capture landing on a corner, extinguishes exactly
/// the affected rights.
#[rustfmt::skip]
pub const CASTLING_RIGHTS: [u8; 64] = [
     7, 15, 15, 15,  3, 15, 15, 11,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    13, 15, 15, 15, 12, 15, 15, 14,
];

pub fn format_castling(rights: CastleBits) -> String {
    let mut s = [b'-'; 4];
    if rights & CASTLE_WK != 0 {
        s[0] = b'K';
    }
    if rights & CASTLE_WQ != 0 {
        s[1] = b'Q';
    }
    if rights & CASTLE_BK != 0 {
        s[2] = b'k';
    }
    if rights & CASTLE_BQ != 0 {
        s[3] = b'q';
    }
    String::from_utf8_lossy(&s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castle_bits_single_and_disjoint() {
        assert_eq!(CASTLE_WK.count_ones(), 1);
        assert_eq!(CASTLE_WQ.count_ones(), 1);
        assert_eq!(CASTLE_BK.count_ones(), 1);
        assert_eq!(CASTLE_BQ.count_ones(), 1);
        assert_eq!(CASTLE_ALL.count_ones(), 4);
    }

    #[test]
    fn mask_table_clears_rights_on_home_squares() {
        // e1 = 60, h1 = 63, a8 = 0, e8 = 4
        assert_eq!(CASTLE_ALL & CASTLING_RIGHTS[60], CASTLE_BK | CASTLE_BQ);
        assert_eq!(CASTLE_ALL & CASTLING_RIGHTS[63], CASTLE_ALL & !CASTLE_WK);
        assert_eq!(CASTLE_ALL & CASTLING_RIGHTS[0], CASTLE_ALL & !CASTLE_BQ);
        assert_eq!(CASTLE_ALL & CASTLING_RIGHTS[4], CASTLE_WK | CASTLE_WQ);
    }
}
