//! Move representation.

use crate::{PieceKind, Square};
use std::fmt;

/// A chess move: origin, target and an optional promotion kind.
///
/// Encoded compactly: 6 bits origin, 6 bits target, 3 bits promotion
/// (0 meaning none, otherwise the promotion kind's index).
///
/// Castling and en passant are not flagged: they are inferred from the
/// position the move is applied to. Castling is written as the king's
/// two-file step (e1g1, e1c1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    /// Creates a move without promotion.
    #[inline]
    pub const fn new(origin: Square, target: Square) -> Self {
        Move((origin.index() as u16) | ((target.index() as u16) << 6))
    }

    /// Creates a promoting move.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not a kind a pawn may promote to.
    #[inline]
    pub const fn with_promotion(origin: Square, target: Square, kind: PieceKind) -> Self {
        assert!(kind.is_promotion(), "invalid promotion kind");
        Move(Self::new(origin, target).0 | ((kind.index() as u16) << 12))
    }

    /// Returns the origin square.
    #[inline]
    pub const fn origin(self) -> Square {
        // SAFETY: masked to 6 bits, always valid square index
        unsafe { Square::from_index_unchecked((self.0 & 0x3F) as u8) }
    }

    /// Returns the target square.
    #[inline]
    pub const fn target(self) -> Square {
        // SAFETY: masked to 6 bits, always valid square index
        unsafe { Square::from_index_unchecked(((self.0 >> 6) & 0x3F) as u8) }
    }

    /// Returns the promotion kind, if any.
    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        match (self.0 >> 12) & 0x7 {
            0 => None,
            index => PieceKind::from_index(index as usize),
        }
    }

    /// Returns the number of files the move spans.
    #[inline]
    pub const fn file_distance(self) -> u8 {
        self.origin().file().index().abs_diff(self.target().file().index())
    }

    /// Returns the number of ranks the move spans.
    #[inline]
    pub const fn rank_distance(self) -> u8 {
        self.origin().rank().index().abs_diff(self.target().rank().index())
    }

    /// Returns the UCI text for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion() {
            Some(kind) => format!(
                "{}{}{}",
                self.origin(),
                self.target(),
                kind.letter().to_ascii_lowercase()
            ),
            None => format!("{}{}", self.origin(), self.target()),
        }
    }

    /// Parses a move from UCI text.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let origin = Square::from_algebraic(&s[0..2])?;
        let target = Square::from_algebraic(&s[2..4])?;
        match s[4..].chars().next() {
            None => Some(Move::new(origin, target)),
            Some(c) => {
                let kind = PieceKind::from_letter(c).filter(|kind| kind.is_promotion())?;
                Some(Move::with_promotion(origin, target, kind))
            }
        }
    }

    /// A null move (used as placeholder, not a legal move).
    pub const NULL: Move = Move(0);
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, Rank};

    #[test]
    fn move_encoding() {
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        let m = Move::new(e2, e4);

        assert_eq!(m.origin(), e2);
        assert_eq!(m.target(), e4);
        assert_eq!(m.promotion(), None);
        assert_eq!(m.rank_distance(), 2);
        assert_eq!(m.file_distance(), 0);
    }

    #[test]
    fn promotion_encoding() {
        let e7 = Square::new(File::E, Rank::R7);
        let d8 = Square::new(File::D, Rank::R8);
        for kind in PieceKind::PROMOTIONS {
            let m = Move::with_promotion(e7, d8, kind);
            assert_eq!(m.promotion(), Some(kind));
            assert_eq!(m.origin(), e7);
            assert_eq!(m.target(), d8);
        }
    }

    #[test]
    #[should_panic(expected = "invalid promotion kind")]
    fn promotion_to_king_panics() {
        let _ = Move::with_promotion(Square::E1, Square::E8, PieceKind::King);
    }

    #[test]
    fn move_uci() {
        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        assert_eq!(Move::new(e2, e4).to_uci(), "e2e4");

        let e7 = Square::new(File::E, Rank::R7);
        let promo = Move::with_promotion(e7, Square::E8, PieceKind::Knight);
        assert_eq!(promo.to_uci(), "e7e8n");
    }

    #[test]
    fn move_from_uci() {
        let m = Move::from_uci("e2e4").unwrap();
        assert_eq!(m.origin().to_algebraic(), "e2");
        assert_eq!(m.target().to_algebraic(), "e4");

        let promo = Move::from_uci("e7e8Q").unwrap();
        assert_eq!(promo.promotion(), Some(PieceKind::Queen));

        assert!(Move::from_uci("invalid").is_none());
        assert!(Move::from_uci("e2e9").is_none());
        assert!(Move::from_uci("e7e8k").is_none());
        assert!(Move::from_uci("e7e8x").is_none());
        assert!(Move::from_uci("e2").is_none());
        assert!(Move::from_uci("e2e4qq").is_none());
    }

    #[test]
    fn move_debug_display() {
        let m = Move::new(Square::E1, Square::G1);
        assert_eq!(format!("{:?}", m), "Move(e1g1)");
        assert_eq!(format!("{}", m), "e1g1");
    }
}
