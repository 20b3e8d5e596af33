//! Chess position representation.

use chess_core::{Color, Fen, FenError, File, Move, Piece, PieceKind, Square};
use std::fmt;
use std::str::FromStr;

use crate::board::castle_rook_squares;
use crate::outcome::{DrawReason, KingStatus, Outcome};
use crate::{Bitboard, Board};

/// One of the four castling rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingRight {
    WhiteKingside = 0b0001,
    WhiteQueenside = 0b0010,
    BlackKingside = 0b0100,
    BlackQueenside = 0b1000,
}

impl CastlingRight {
    /// All rights in FEN order (K, Q, k, q).
    pub const ALL: [CastlingRight; 4] = [
        CastlingRight::WhiteKingside,
        CastlingRight::WhiteQueenside,
        CastlingRight::BlackKingside,
        CastlingRight::BlackQueenside,
    ];

    /// Returns the right for `color` on the given wing.
    #[inline]
    pub const fn new(color: Color, kingside: bool) -> Self {
        match (color, kingside) {
            (Color::White, true) => CastlingRight::WhiteKingside,
            (Color::White, false) => CastlingRight::WhiteQueenside,
            (Color::Black, true) => CastlingRight::BlackKingside,
            (Color::Black, false) => CastlingRight::BlackQueenside,
        }
    }

    /// Returns the color holding this right.
    #[inline]
    pub const fn color(self) -> Color {
        match self {
            CastlingRight::WhiteKingside | CastlingRight::WhiteQueenside => Color::White,
            CastlingRight::BlackKingside | CastlingRight::BlackQueenside => Color::Black,
        }
    }

    /// Returns true for the kingside (short) rights.
    #[inline]
    pub const fn is_kingside(self) -> bool {
        matches!(
            self,
            CastlingRight::WhiteKingside | CastlingRight::BlackKingside
        )
    }

    /// Returns the king's home square.
    #[inline]
    pub const fn king_square(self) -> Square {
        Square::new(File::E, self.color().back_rank())
    }

    /// Returns the rook's home square.
    #[inline]
    pub const fn rook_square(self) -> Square {
        let file = if self.is_kingside() { File::H } else { File::A };
        Square::new(file, self.color().back_rank())
    }

    /// Returns the square the king lands on.
    #[inline]
    pub const fn king_target(self) -> Square {
        let file = if self.is_kingside() { File::G } else { File::C };
        Square::new(file, self.color().back_rank())
    }

    /// Returns the squares strictly between king and rook, which must be empty.
    pub fn empty_squares(self) -> Bitboard {
        let rank = self.color().back_rank();
        self.king_square()
            .file()
            .between(self.rook_square().file())
            .map(|file| Square::new(file, rank))
            .collect()
    }

    /// Returns the squares the king crosses including its target, which must not be attacked.
    pub fn king_path(self) -> Bitboard {
        let rank = self.color().back_rank();
        let target = self.king_target();
        self.king_square()
            .file()
            .between(target.file())
            .map(|file| Square::new(file, rank))
            .chain(std::iter::once(target))
            .collect()
    }

    /// Returns the FEN letter for this right.
    #[inline]
    pub const fn to_fen_char(self) -> char {
        match self {
            CastlingRight::WhiteKingside => 'K',
            CastlingRight::WhiteQueenside => 'Q',
            CastlingRight::BlackKingside => 'k',
            CastlingRight::BlackQueenside => 'q',
        }
    }

    /// Parses a FEN castling letter.
    #[inline]
    pub const fn from_fen_char(c: char) -> Option<Self> {
        match c {
            'K' => Some(CastlingRight::WhiteKingside),
            'Q' => Some(CastlingRight::WhiteQueenside),
            'k' => Some(CastlingRight::BlackKingside),
            'q' => Some(CastlingRight::BlackQueenside),
            _ => None,
        }
    }
}

/// The set of castling rights still available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Returns true if `right` is present.
    #[inline]
    pub const fn contains(self, right: CastlingRight) -> bool {
        self.0 & right as u8 != 0
    }

    /// Returns a copy with `right` added.
    #[inline]
    pub const fn with(self, right: CastlingRight) -> Self {
        CastlingRights(self.0 | right as u8)
    }

    /// Returns a copy with `right` removed.
    #[inline]
    pub const fn without(self, right: CastlingRight) -> Self {
        CastlingRights(self.0 & !(right as u8))
    }

    /// Returns a copy with both of `color`'s rights removed.
    #[inline]
    pub const fn without_color(self, color: Color) -> Self {
        self.without(CastlingRight::new(color, true))
            .without(CastlingRight::new(color, false))
    }

    /// Returns true if no right is present.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every right in `self` is also in `other`.
    #[inline]
    pub const fn is_subset(self, other: CastlingRights) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterates over the present rights in FEN order.
    pub fn iter(self) -> impl Iterator<Item = CastlingRight> {
        CastlingRight::ALL
            .into_iter()
            .filter(move |&right| self.contains(right))
    }

    /// Returns the rights left after `piece` moves from `origin` to `target`.
    ///
    /// A king move drops both of its color's rights. Anything leaving or
    /// arriving on a rook home square drops that square's right, which
    /// covers both rook moves and rook captures.
    pub fn after_move(self, piece: Piece, origin: Square, target: Square) -> Self {
        let mut rights = if piece.kind == PieceKind::King {
            self.without_color(piece.color)
        } else {
            self
        };
        for right in CastlingRight::ALL {
            let home = right.rook_square();
            if origin == home || target == home {
                rights = rights.without(right);
            }
        }
        rights
    }

    /// Parses a FEN castling field ("-" or a subset of "KQkq").
    ///
    /// # Errors
    ///
    /// Returns [`FenError::InvalidCastlingRights`] for any other letter.
    pub fn from_fen(field: &str) -> Result<Self, FenError> {
        if field == "-" {
            return Ok(CastlingRights::NONE);
        }
        field.chars().try_fold(CastlingRights::NONE, |rights, c| {
            CastlingRight::from_fen_char(c)
                .map(|right| rights.with(right))
                .ok_or_else(|| FenError::InvalidCastlingRights(field.to_string()))
        })
    }

    /// Returns the FEN castling field.
    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        self.iter().map(CastlingRight::to_fen_char).collect()
    }
}

impl FromIterator<CastlingRight> for CastlingRights {
    fn from_iter<I: IntoIterator<Item = CastlingRight>>(iter: I) -> Self {
        iter.into_iter().fold(CastlingRights::NONE, CastlingRights::with)
    }
}

/// Complete chess position state.
///
/// A position is an immutable value: executing a move yields a new one. Its
/// fields are private so the board can only change through move execution,
/// which keeps every derived query (checks, legal moves) consistent with it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Position {
            board: Board::standard(),
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub(crate) fn from_parts(
        board: Board,
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        }
    }

    /// Creates a position from a FEN string.
    ///
    /// # Errors
    ///
    /// Returns a [`FenError`] if the string is not a well-formed FEN record.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::from_fen_record(&Fen::parse(fen)?)
    }

    /// Creates a position from parsed FEN fields.
    ///
    /// # Errors
    ///
    /// Returns a [`FenError`] if the placement or castling field is malformed.
    pub fn from_fen_record(fen: &Fen) -> Result<Self, FenError> {
        Ok(Position {
            board: Board::from_fen_placement(&fen.piece_placement)?,
            side_to_move: fen.active_color,
            castling: CastlingRights::from_fen(&fen.castling)?,
            en_passant: fen.en_passant,
            halfmove_clock: fen.halfmove_clock,
            fullmove_number: fen.fullmove_number,
        })
    }

    /// Returns the FEN fields of this position.
    pub fn to_fen_record(&self) -> Fen {
        Fen {
            piece_placement: self.board.fen_placement(),
            active_color: self.side_to_move,
            castling: self.castling.to_fen(),
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        self.to_fen_record().to_fen()
    }

    /// Returns the piece placement.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Returns the castling rights.
    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// Returns the en passant target square, if the last move was a double pawn push.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Returns the number of plies since the last capture or pawn move.
    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Returns the fullmove number.
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns the piece at the given square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.piece_at(sq)
    }

    /// Returns a bitboard of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.board.occupied()
    }

    /// Returns the squares of the opponent's pieces attacking the side to move's king.
    ///
    /// Derived from the board on every call.
    pub fn attackers_to_king(&self) -> Bitboard {
        match self.board.king_square(self.side_to_move) {
            Some(king) => self.board.attackers(king, self.side_to_move.opposite()),
            None => Bitboard::EMPTY,
        }
    }

    /// Returns the squares of `color`'s pieces attacking `target`.
    #[inline]
    pub fn attackers(&self, target: Square, color: Color) -> Bitboard {
        self.board.attackers(target, color)
    }

    /// Returns true if the side to move is in check.
    #[inline]
    pub fn is_check(&self) -> bool {
        self.attackers_to_king().is_not_empty()
    }

    /// Classifies the side to move's king.
    pub fn king_status(&self) -> KingStatus {
        if !self.is_check() {
            KingStatus::Safe
        } else if self.has_legal_moves() {
            KingStatus::Checked
        } else {
            KingStatus::Checkmated
        }
    }

    /// Returns the game outcome if this position ends the game.
    ///
    /// Checkmate takes precedence over the fifty-move rule.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.has_legal_moves() {
            return Some(if self.is_check() {
                Outcome::Win(self.side_to_move.opposite())
            } else {
                Outcome::Draw(DrawReason::Stalemate)
            });
        }
        if self.halfmove_clock >= 100 {
            return Some(Outcome::Draw(DrawReason::FiftyMoveRule));
        }
        None
    }

    /// Returns true if the position ends the game.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Returns true if `mv` is a king's castling step in this position.
    pub fn is_castle(&self, mv: Move) -> bool {
        matches!(
            self.piece_at(mv.origin()),
            Some(Piece { kind: PieceKind::King, .. })
        ) && mv.file_distance() == 2
    }

    /// Returns true if `mv` captures en passant in this position.
    pub fn is_en_passant(&self, mv: Move) -> bool {
        matches!(
            self.piece_at(mv.origin()),
            Some(Piece { kind: PieceKind::Pawn, .. })
        ) && Some(mv.target()) == self.en_passant
            && mv.file_distance() == 1
            && self.piece_at(mv.target()).is_none()
    }

    /// Returns true if `mv` moves a pawn onto its last rank.
    pub fn is_promotion(&self, mv: Move) -> bool {
        match self.piece_at(mv.origin()) {
            Some(Piece {
                kind: PieceKind::Pawn,
                color,
            }) => mv.target().rank() == color.promotion_rank(),
            _ => false,
        }
    }

    /// Returns true if `mv` takes a piece, en passant included.
    pub fn is_capture(&self, mv: Move) -> bool {
        self.piece_at(mv.target()).is_some() || self.is_en_passant(mv)
    }

    /// Returns the rook's origin and destination if `mv` castles.
    pub fn castle_rook_move(&self, mv: Move) -> Option<(Square, Square)> {
        self.is_castle(mv).then(|| castle_rook_squares(mv.target()))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn startpos_fen_roundtrip() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), Fen::STARTPOS);
        assert_eq!(Position::from_fen(Fen::STARTPOS).unwrap(), pos);
        assert_eq!(Position::default(), pos);
    }

    #[test]
    fn custom_fen_roundtrip() {
        for fen in [
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2R w Kq - 99 80",
        ] {
            let pos: Position = fen.parse().unwrap();
            assert_eq!(pos.to_fen(), fen);
        }
    }

    #[test]
    fn from_fen_rejects_malformed() {
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - -").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/7 w - - 0 1").is_err());
    }

    #[test]
    fn from_fen_rejects_en_passant_on_movers_side() {
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/3P4/4K3 w - e3 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
    }

    #[test]
    fn piece_at() {
        let pos = Position::startpos();
        assert_eq!(
            pos.piece_at(Square::E1),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(pos.piece_at(sq("e4")), None);
    }

    #[test]
    fn castling_right_geometry() {
        let wk = CastlingRight::WhiteKingside;
        assert_eq!(wk.king_square(), Square::E1);
        assert_eq!(wk.rook_square(), Square::H1);
        assert_eq!(wk.king_target(), Square::G1);
        assert_eq!(wk.empty_squares(), [Square::F1, Square::G1].into_iter().collect());
        assert_eq!(wk.king_path(), [Square::F1, Square::G1].into_iter().collect());

        let bq = CastlingRight::BlackQueenside;
        assert_eq!(
            bq.empty_squares(),
            [Square::B8, Square::C8, Square::D8].into_iter().collect()
        );
        assert_eq!(bq.king_path(), [Square::D8, Square::C8].into_iter().collect());
    }

    #[test]
    fn castling_rights_set_operations() {
        let rights = CastlingRights::ALL.without(CastlingRight::WhiteKingside);
        assert!(!rights.contains(CastlingRight::WhiteKingside));
        assert!(rights.contains(CastlingRight::WhiteQueenside));
        assert!(rights.is_subset(CastlingRights::ALL));
        assert!(!CastlingRights::ALL.is_subset(rights));
        assert_eq!(rights.to_fen(), "Qkq");
        assert_eq!(CastlingRights::NONE.to_fen(), "-");
        assert_eq!(CastlingRights::ALL.without_color(Color::Black).to_fen(), "KQ");
    }

    #[test]
    fn castling_rights_from_fen() {
        assert_eq!(CastlingRights::from_fen("KQkq").unwrap(), CastlingRights::ALL);
        assert_eq!(CastlingRights::from_fen("-").unwrap(), CastlingRights::NONE);
        assert_eq!(
            CastlingRights::from_fen("kQ").unwrap().to_fen(),
            "Qk"
        );
        assert!(CastlingRights::from_fen("X").is_err());
    }

    #[test]
    fn rights_after_king_and_rook_moves() {
        let white_king = Piece::new(PieceKind::King, Color::White);
        let white_rook = Piece::new(PieceKind::Rook, Color::White);
        let black_bishop = Piece::new(PieceKind::Bishop, Color::Black);

        let after_king = CastlingRights::ALL.after_move(white_king, Square::E1, Square::F1);
        assert_eq!(after_king.to_fen(), "kq");

        let after_rook = CastlingRights::ALL.after_move(white_rook, Square::A1, sq("a4"));
        assert_eq!(after_rook.to_fen(), "Kkq");

        let after_capture = CastlingRights::ALL.after_move(black_bishop, sq("b7"), Square::H1);
        assert_eq!(after_capture.to_fen(), "Qkq");
    }

    #[test]
    fn move_classification() {
        let pos = Position::from_fen("r3k2r/8/8/3pP3/8/8/1p6/R3K2R w KQkq d6 0 1").unwrap();
        assert!(pos.is_castle(Move::new(Square::E1, Square::G1)));
        assert!(!pos.is_castle(Move::new(Square::E1, Square::F1)));
        assert!(pos.is_en_passant(Move::new(sq("e5"), sq("d6"))));
        assert!(pos.is_capture(Move::new(sq("e5"), sq("d6"))));
        assert!(!pos.is_capture(Move::new(sq("e5"), sq("e6"))));
        assert_eq!(
            pos.castle_rook_move(Move::new(Square::E1, Square::C1)),
            Some((Square::A1, Square::D1))
        );

        let black = Position::from_fen("4k3/8/8/8/8/8/1p6/4K3 b - - 0 1").unwrap();
        assert!(black.is_promotion(Move::with_promotion(sq("b2"), Square::B1, PieceKind::Queen)));
    }

    #[test]
    fn king_status_and_outcome() {
        let start = Position::startpos();
        assert_eq!(start.king_status(), KingStatus::Safe);
        assert_eq!(start.outcome(), None);

        let mated =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        assert_eq!(mated.king_status(), KingStatus::Checkmated);
        assert_eq!(mated.outcome(), Some(Outcome::Win(Color::Black)));
        assert_eq!(mated.attackers_to_king(), Bitboard::from_square(sq("h4")));

        let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stalemate.king_status(), KingStatus::Safe);
        assert_eq!(
            stalemate.outcome(),
            Some(Outcome::Draw(DrawReason::Stalemate))
        );
    }

    #[test]
    fn fifty_move_rule_and_precedence() {
        let quiet = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
        assert_eq!(
            quiet.outcome(),
            Some(Outcome::Draw(DrawReason::FiftyMoveRule))
        );
        let almost = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
        assert_eq!(almost.outcome(), None);

        let mated = Position::from_fen("R5k1/5ppp/8/8/8/8/8/4K3 b - - 100 80").unwrap();
        assert_eq!(mated.outcome(), Some(Outcome::Win(Color::White)));
    }

    #[test]
    fn checked_with_escape() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
        assert_eq!(pos.king_status(), KingStatus::Checked);
        assert!(pos.is_check());
    }
}
