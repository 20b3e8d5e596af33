//! Piece placement: twelve bitboards, one per piece identity.

use chess_core::{Color, Fen, FenError, File, Move, Piece, PieceKind, Rank, Square};
use std::fmt;

use crate::movegen::attacks;
use crate::Bitboard;

/// A piece taken off the board by a move.
///
/// For en passant `square` is the captured pawn's square, which differs from
/// the capturing move's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capture {
    pub piece: Piece,
    pub square: Square,
}

/// How one square differs between two boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareChange {
    pub square: Square,
    pub before: Option<Piece>,
    pub after: Option<Piece>,
}

/// The placement of every piece on the board.
///
/// Holds one bitboard per piece (indexed by [`Piece::index`]). No square is
/// ever set in more than one of them: every placement first clears the
/// square from all twelve.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    pieces: [Bitboard; 12],
}

impl Board {
    /// Creates a board with no pieces.
    pub const fn empty() -> Self {
        Board {
            pieces: [Bitboard::EMPTY; 12],
        }
    }

    /// Creates the standard starting setup.
    pub fn standard() -> Self {
        const BACK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Board::empty();
        for color in Color::ALL {
            for (file, kind) in File::ALL.into_iter().zip(BACK) {
                board.place(Piece::new(kind, color), Square::new(file, color.back_rank()));
                board.place(
                    Piece::new(PieceKind::Pawn, color),
                    Square::new(file, color.pawn_rank()),
                );
            }
        }
        board
    }

    /// Decodes a FEN piece placement field.
    ///
    /// # Errors
    ///
    /// Returns [`FenError::InvalidPiecePlacement`] if any rank does not hold
    /// exactly eight files, or a character is neither a piece letter nor a
    /// digit 1-8.
    pub fn from_fen_placement(placement: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        for (square, piece) in Fen::placement_squares(placement)? {
            board.place(piece, square);
        }
        Ok(board)
    }

    /// Encodes the board as a FEN piece placement field.
    pub fn fen_placement(&self) -> String {
        let mut fen = String::with_capacity(72);

        for rank in Rank::ALL.into_iter().rev() {
            let mut empty_count = 0;
            for file in File::ALL {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank != Rank::R1 {
                fen.push('/');
            }
        }

        fen
    }

    /// Returns the squares holding `piece`.
    #[inline]
    pub fn bitboard(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    /// Returns the squares holding any piece of `color`.
    #[inline]
    pub fn color_bitboard(&self, color: Color) -> Bitboard {
        let start = color.index() * 6;
        self.pieces[start..start + 6]
            .iter()
            .fold(Bitboard::EMPTY, |acc, &bb| acc | bb)
    }

    /// Returns the squares holding a piece of `kind` of either color.
    #[inline]
    pub fn kind_bitboard(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()] | self.pieces[6 + kind.index()]
    }

    /// Returns every occupied square.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.pieces.iter().fold(Bitboard::EMPTY, |acc, &bb| acc | bb)
    }

    /// Returns every empty square.
    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    /// Returns the piece on `sq`, if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.pieces
            .iter()
            .position(|bb| bb.contains(sq))
            .and_then(Piece::from_index)
    }

    /// Puts `piece` on `sq`, replacing whatever stood there.
    pub fn place(&mut self, piece: Piece, sq: Square) {
        self.remove(sq);
        self.pieces[piece.index()].set(sq);
    }

    /// Clears `sq`, returning the piece that stood there.
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        let removed = self.piece_at(sq);
        for bb in &mut self.pieces {
            bb.clear(sq);
        }
        removed
    }

    /// Sets or clears `sq`.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        match piece {
            Some(piece) => self.place(piece, sq),
            None => {
                self.remove(sq);
            }
        }
    }

    /// Returns the square of the king of `color`.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.bitboard(Piece::new(PieceKind::King, color)).lsb()
    }

    /// Iterates over every piece on the board from a1 to h8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied()
            .into_iter()
            .filter_map(move |sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Returns the squares of `color`'s pieces that attack `target`.
    ///
    /// Each kind's pattern is placed on the target itself and intersected
    /// with that kind's pieces; a pawn's pattern is taken from the opposing
    /// color's point of view.
    pub fn attackers(&self, target: Square, color: Color) -> Bitboard {
        let occupied = self.occupied();
        PieceKind::ALL
            .into_iter()
            .fold(Bitboard::EMPTY, |acc, kind| {
                acc | self.attacks_by(Piece::new(kind, color), target, occupied)
            })
    }

    /// Returns the squares holding `piece` that attack `target`.
    pub fn attackers_of_kind(&self, piece: Piece, target: Square) -> Bitboard {
        self.attacks_by(piece, target, self.occupied())
    }

    fn attacks_by(&self, piece: Piece, target: Square, occupied: Bitboard) -> Bitboard {
        let reverse = Piece::new(piece.kind, piece.color.opposite());
        attacks::attacks(reverse, target, occupied) & self.bitboard(piece)
    }

    /// Returns true if any piece of `color` attacks `target`.
    #[inline]
    pub fn is_attacked(&self, target: Square, color: Color) -> bool {
        self.attackers(target, color).is_not_empty()
    }

    /// Returns every square attacked by at least one piece of `color`.
    pub fn attacks_for(&self, color: Color) -> Bitboard {
        let occupied = self.occupied();
        Piece::ALL
            .into_iter()
            .filter(|piece| piece.color == color)
            .flat_map(|piece| self.bitboard(piece).into_iter().map(move |sq| (piece, sq)))
            .fold(Bitboard::EMPTY, |acc, (piece, sq)| {
                acc | attacks::attacks(piece, sq, occupied)
            })
    }

    /// Returns `color`'s pieces standing on squares the opponent attacks.
    pub fn attacked_occupations(&self, color: Color) -> Bitboard {
        self.color_bitboard(color) & self.attacks_for(color.opposite())
    }

    /// Returns the opponent pieces `color` attacks.
    pub fn threatened_enemies(&self, color: Color) -> Bitboard {
        self.attacks_for(color) & self.color_bitboard(color.opposite())
    }

    /// Returns the squares where `self` and `other` differ, from a1 to h8.
    pub fn diff(&self, other: &Board) -> Vec<SquareChange> {
        let changed = self
            .pieces
            .iter()
            .zip(other.pieces.iter())
            .fold(Bitboard::EMPTY, |acc, (a, b)| acc | (*a ^ *b));
        changed
            .into_iter()
            .map(|square| SquareChange {
                square,
                before: self.piece_at(square),
                after: other.piece_at(square),
            })
            .collect()
    }

    /// Returns the board after playing `mv`, and what it captured.
    ///
    /// Castling is recognized as a king stepping two files and moves the
    /// matching rook as well. A pawn moving diagonally onto the empty
    /// `en_passant` square captures the pawn behind it. A promoting move
    /// replaces the arriving pawn.
    ///
    /// # Panics
    ///
    /// Panics if `mv`'s origin is empty, if a pawn reaches its last rank
    /// without a promotion kind, or if a promotion kind is given for a move
    /// that does not promote.
    pub fn apply(&self, mv: Move, en_passant: Option<Square>) -> (Board, Option<Capture>) {
        let origin = mv.origin();
        let target = mv.target();
        let piece = match self.piece_at(origin) {
            Some(piece) => piece,
            None => panic!("no piece at move origin {}", origin),
        };

        let mut board = *self;
        let mut capture = board.remove(target).map(|captured| Capture {
            piece: captured,
            square: target,
        });
        board.remove(origin);

        match piece.kind {
            PieceKind::Pawn => {
                if capture.is_none() && Some(target) == en_passant && mv.file_distance() == 1 {
                    let behind = Square::new(target.file(), origin.rank());
                    capture = board.remove(behind).map(|captured| Capture {
                        piece: captured,
                        square: behind,
                    });
                }
                let promotes = target.rank() == piece.color.promotion_rank();
                let placed = match (promotes, mv.promotion()) {
                    (true, Some(kind)) => Piece::new(kind, piece.color),
                    (true, None) => panic!("pawn move {} requires a promotion kind", mv),
                    (false, Some(_)) => panic!("move {} cannot promote", mv),
                    (false, None) => piece,
                };
                board.place(placed, target);
            }
            _ => {
                if mv.promotion().is_some() {
                    panic!("move {} cannot promote", mv);
                }
                board.place(piece, target);
                if piece.kind == PieceKind::King && mv.file_distance() == 2 {
                    let (rook_from, rook_to) = castle_rook_squares(target);
                    if let Some(rook) = board.remove(rook_from) {
                        board.place(rook, rook_to);
                    }
                }
            }
        }

        (board, capture)
    }
}

/// Returns the rook's origin and destination for a castling king landing on `king_target`.
pub(crate) fn castle_rook_squares(king_target: Square) -> (Square, Square) {
    let rank = king_target.rank();
    if king_target.file() == File::G {
        (Square::new(File::H, rank), Square::new(File::F, rank))
    } else {
        (Square::new(File::A, rank), Square::new(File::D, rank))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.fen_placement())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            write!(f, "{} ", rank)?;
            for file in File::ALL {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{} ", piece.to_fen_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
