//! Move execution: successor positions and move records.

use chess_core::{Color, Move, Piece, PieceKind, Rank, Square};

use crate::board::Capture;
use crate::san::san_for_transition;
use crate::Position;

/// Everything that happened when a move was executed.
///
/// Created once per executed move and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// The position after the move.
    pub position: Position,
    /// The move that was played.
    pub mv: Move,
    /// The piece that moved, as it stood on the origin square.
    pub piece: Piece,
    /// The piece taken, if any, with the square it was taken from.
    pub capture: Option<Capture>,
    /// The piece a pawn turned into, if the move promoted.
    pub promotion: Option<Piece>,
    /// The move in Standard Algebraic Notation.
    pub san: String,
}

impl MoveRecord {
    /// Returns the color that played the move.
    #[inline]
    pub fn color(&self) -> Color {
        self.piece.color
    }
}

impl Position {
    /// Executes `mv`, producing the successor position and its record.
    ///
    /// `mv` is expected to be legal here; use [`Position::is_legal`] or
    /// [`crate::Game::execute`] when that is not already known.
    ///
    /// # Panics
    ///
    /// Panics if the origin square is empty, if a pawn reaches its last rank
    /// without a promotion kind, or if a promotion kind is given for a move
    /// that does not promote.
    pub fn execute(&self, mv: Move) -> MoveRecord {
        let (position, piece, capture) = self.successor(mv);
        let promotion = mv.promotion().map(|kind| Piece::new(kind, piece.color));
        let san = san_for_transition(self, mv, &position);
        MoveRecord {
            position,
            mv,
            piece,
            capture,
            promotion,
            san,
        }
    }

    /// Returns the position after `mv`, without building a record.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Position::execute`].
    pub fn play(&self, mv: Move) -> Position {
        self.successor(mv).0
    }

    fn successor(&self, mv: Move) -> (Position, Piece, Option<Capture>) {
        let origin = mv.origin();
        let target = mv.target();
        let piece = match self.piece_at(origin) {
            Some(piece) => piece,
            None => panic!("no piece at move origin {}", origin),
        };

        let (board, capture) = self.board().apply(mv, self.en_passant());

        let castling = self.castling().after_move(piece, origin, target);

        let en_passant = if piece.kind == PieceKind::Pawn && mv.rank_distance() == 2 {
            let middle = (origin.rank().index() + target.rank().index()) / 2;
            Rank::from_index(middle).map(|rank| Square::new(origin.file(), rank))
        } else {
            None
        };

        let halfmove_clock = if piece.kind == PieceKind::Pawn || capture.is_some() {
            0
        } else {
            self.halfmove_clock() + 1
        };

        let fullmove_number = match self.side_to_move() {
            Color::White => self.fullmove_number(),
            Color::Black => self.fullmove_number() + 1,
        };

        let position = Position::from_parts(
            board,
            self.side_to_move().opposite(),
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        );
        (position, piece, capture)
    }
}
