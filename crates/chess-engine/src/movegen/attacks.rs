//! Attack patterns for all piece kinds.
//!
//! Knight, king and pawn patterns are computed once at compile time from
//! masked shifts. Sliders are computed per call by ray fill against the
//! current occupancy. No pattern contains its origin square, and none is
//! filtered by the mover's own pieces.

use crate::bitboard::Direction;
use crate::Bitboard;
use chess_core::{Color, Piece, PieceKind, Square};

/// Precomputed knight attack tables.
const KNIGHT_ATTACKS: [Bitboard; 64] = compute_knight_attacks();

/// Precomputed king attack tables.
const KING_ATTACKS: [Bitboard; 64] = compute_king_attacks();

/// Precomputed pawn attack tables [color][square].
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = compute_pawn_attacks();

const NOT_A: u64 = !Bitboard::FILE_A.0;
const NOT_AB: u64 = !(Bitboard::FILE_A.0 | Bitboard::FILE_B.0);
const NOT_H: u64 = !Bitboard::FILE_H.0;
const NOT_GH: u64 = !(Bitboard::FILE_G.0 | Bitboard::FILE_H.0);

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Returns bishop attacks from `sq` given the board occupancy.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider_attacks(sq, occupied, &Direction::DIAGONAL)
}

/// Returns rook attacks from `sq` given the board occupancy.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    slider_attacks(sq, occupied, &Direction::ORTHOGONAL)
}

/// Returns queen attacks from `sq` given the board occupancy.
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Returns the squares `piece` standing on `origin` attacks.
pub fn attacks(piece: Piece, origin: Square, occupied: Bitboard) -> Bitboard {
    match piece.kind {
        PieceKind::Pawn => pawn_attacks(origin, piece.color),
        PieceKind::Knight => knight_attacks(origin),
        PieceKind::Bishop => bishop_attacks(origin, occupied),
        PieceKind::Rook => rook_attacks(origin, occupied),
        PieceKind::Queen => queen_attacks(origin, occupied),
        PieceKind::King => king_attacks(origin),
    }
}

fn slider_attacks(sq: Square, occupied: Bitboard, directions: &[Direction]) -> Bitboard {
    let origin = Bitboard::from_square(sq);
    directions
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | origin.ray(dir, occupied))
}

/// Computes knight attacks for all squares at compile time.
const fn compute_knight_attacks() -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0;

    while sq < 64 {
        let b = 1u64 << sq;
        let one_file = ((b << 17) | (b >> 15)) & NOT_A | ((b << 15) | (b >> 17)) & NOT_H;
        let two_files = ((b << 10) | (b >> 6)) & NOT_AB | ((b << 6) | (b >> 10)) & NOT_GH;
        attacks[sq] = Bitboard(one_file | two_files);
        sq += 1;
    }

    attacks
}

/// Computes king attacks for all squares at compile time.
const fn compute_king_attacks() -> [Bitboard; 64] {
    let mut attacks = [Bitboard::EMPTY; 64];
    let mut sq = 0;

    while sq < 64 {
        let b = Bitboard(1u64 << sq);
        let row = b.east().0 | b.west().0;
        let band = Bitboard(b.0 | row);
        attacks[sq] = Bitboard(row | band.north().0 | band.south().0);
        sq += 1;
    }

    attacks
}

/// Computes pawn attacks for all squares at compile time.
const fn compute_pawn_attacks() -> [[Bitboard; 64]; 2] {
    let mut attacks = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0;

    while sq < 64 {
        let b = Bitboard(1u64 << sq);
        attacks[0][sq] = Bitboard(b.north_east().0 | b.north_west().0);
        attacks[1][sq] = Bitboard(b.south_east().0 | b.south_west().0);
        sq += 1;
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{File, Rank};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn knight_attacks_center() {
        let attacks = knight_attacks(Square::new(File::D, Rank::R4));
        assert_eq!(attacks.count(), 8); // Knight in center has 8 moves
    }

    #[test]
    fn knight_attacks_corner_and_edge() {
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(Square::H8).count(), 2);
        assert_eq!(knight_attacks(sq("a4")).count(), 4);
        assert_eq!(knight_attacks(sq("g2")).count(), 4);
    }

    #[test]
    fn knight_specific_squares() {
        let attacks = knight_attacks(sq("e4"));
        for target in ["d6", "f6", "g5", "g3", "f2", "d2", "c3", "c5"] {
            assert!(attacks.contains(sq(target)), "missing {}", target);
        }
    }

    #[test]
    fn king_attacks_counts() {
        assert_eq!(king_attacks(sq("d4")).count(), 8);
        assert_eq!(king_attacks(Square::A1).count(), 3);
        assert_eq!(king_attacks(Square::H8).count(), 3);
        assert_eq!(king_attacks(sq("a4")).count(), 5);
        assert!(!king_attacks(sq("d4")).contains(sq("d4")));
    }

    #[test]
    fn pawn_attacks_by_color() {
        let white = pawn_attacks(sq("d4"), Color::White);
        assert_eq!(white, Bitboard::from_square(sq("c5")) | Bitboard::from_square(sq("e5")));
        let black = pawn_attacks(sq("d4"), Color::Black);
        assert_eq!(black, Bitboard::from_square(sq("c3")) | Bitboard::from_square(sq("e3")));
    }

    #[test]
    fn pawn_attacks_edge_file() {
        let white = pawn_attacks(sq("a4"), Color::White);
        assert_eq!(white, Bitboard::from_square(sq("b5")));
        let black = pawn_attacks(sq("h4"), Color::Black);
        assert_eq!(black, Bitboard::from_square(sq("g3")));
        assert!(pawn_attacks(sq("d8"), Color::White).is_empty());
    }

    #[test]
    fn rook_attacks_empty_board() {
        let attacks = rook_attacks(sq("d4"), Bitboard::EMPTY);
        assert_eq!(attacks.count(), 14);
        assert!(!attacks.contains(sq("d4")));
    }

    #[test]
    fn rook_attacks_include_first_blocker_only() {
        let occupied = Bitboard::from_square(sq("d6")) | Bitboard::from_square(sq("f4"));
        let attacks = rook_attacks(sq("d4"), occupied);
        assert!(attacks.contains(sq("d5")));
        assert!(attacks.contains(sq("d6")));
        assert!(!attacks.contains(sq("d7")));
        assert!(attacks.contains(sq("f4")));
        assert!(!attacks.contains(sq("g4")));
        assert!(attacks.contains(sq("a4")));
        assert!(attacks.contains(sq("d1")));
    }

    #[test]
    fn bishop_and_queen_attacks() {
        assert_eq!(bishop_attacks(sq("d4"), Bitboard::EMPTY).count(), 13);
        assert_eq!(bishop_attacks(Square::A1, Bitboard::EMPTY).count(), 7);
        assert_eq!(queen_attacks(sq("d4"), Bitboard::EMPTY).count(), 27);
        let blocked = bishop_attacks(Square::A1, Bitboard::from_square(sq("c3")));
        assert_eq!(blocked.count(), 2);
    }

    #[test]
    fn attacks_dispatches_by_kind() {
        let queen = Piece::new(PieceKind::Queen, Color::Black);
        assert_eq!(
            attacks(queen, sq("e5"), Bitboard::EMPTY),
            queen_attacks(sq("e5"), Bitboard::EMPTY)
        );
        let pawn = Piece::new(PieceKind::Pawn, Color::Black);
        assert_eq!(
            attacks(pawn, sq("e5"), Bitboard::FULL),
            pawn_attacks(sq("e5"), Color::Black)
        );
    }
}
