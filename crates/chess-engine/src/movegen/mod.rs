//! Move generation.
//!
//! Pseudo-legal moves are generated per piece from its attack pattern, then
//! each is played on a copy of the board and kept only if the mover's king
//! is not attacked afterwards. There is no pin detection: the copy-and-test
//! filter alone decides legality.

pub mod attacks;
pub mod perft;

use crate::bitboard::Direction;
use crate::{Bitboard, Position};
use chess_core::{Color, Move, Piece, PieceKind, Square};

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves the list can hold.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Returns true if the list holds `m`.
    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }

    /// Collects the target squares of every move.
    pub fn targets(&self) -> Bitboard {
        self.as_slice().iter().map(|m| m.target()).collect()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all legal moves for the side to move.
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = generate_pseudo_legal(position);
    moves.retain(|&m| leaves_king_safe(position, m));
    moves
}

/// Generates moves that obey piece movement but may leave the king attacked.
///
/// In double check only king moves are produced.
pub fn generate_pseudo_legal(position: &Position) -> MoveList {
    let mut moves = MoveList::new();

    if position.attackers_to_king().count() < 2 {
        generate_pawn_moves(position, &mut moves);
        for kind in [
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
        ] {
            generate_piece_moves(position, kind, &mut moves);
        }
    }
    generate_piece_moves(position, PieceKind::King, &mut moves);
    generate_castling_moves(position, &mut moves);

    moves
}

/// Returns true if playing `m` does not leave the mover's king attacked.
fn leaves_king_safe(position: &Position, m: Move) -> bool {
    let us = position.side_to_move();
    let (board, _) = position.board().apply(m, position.en_passant());
    match board.king_square(us) {
        Some(king) => !board.is_attacked(king, us.opposite()),
        None => true,
    }
}

fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, us: Color) {
    if to.rank() == us.promotion_rank() {
        for kind in PieceKind::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, kind));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

/// Generates pseudo-legal pawn pushes and captures, en passant included.
fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let board = position.board();
    let empty = board.empty_squares();
    let enemies = board.color_bitboard(us.opposite());
    let en_passant = position
        .en_passant()
        .map_or(Bitboard::EMPTY, Bitboard::from_square);
    let forward = match us {
        Color::White => Direction::North,
        Color::Black => Direction::South,
    };

    for from in board.bitboard(Piece::new(PieceKind::Pawn, us)) {
        let origin = Bitboard::from_square(from);
        let single = origin.shift(forward) & empty;
        let double = if from.rank() == us.pawn_rank() {
            single.shift(forward) & empty
        } else {
            Bitboard::EMPTY
        };
        let captures = pawn_attacks(from, us) & (enemies | en_passant);

        for to in single | double | captures {
            push_pawn_move(moves, from, to, us);
        }
    }
}

/// Generates pseudo-legal moves for every piece of `kind`: its attack pattern
/// minus squares held by its own side.
fn generate_piece_moves(position: &Position, kind: PieceKind, moves: &mut MoveList) {
    let us = position.side_to_move();
    let board = position.board();
    let own = board.color_bitboard(us);
    let occupied = board.occupied();
    let piece = Piece::new(kind, us);

    for from in board.bitboard(piece) {
        for to in attacks::attacks(piece, from, occupied) & !own {
            moves.push(Move::new(from, to));
        }
    }
}

/// Generates castling moves whose path is clear and unattacked.
fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let board = position.board();

    if position.is_check() {
        return;
    }

    let occupied = board.occupied();
    let king = Piece::new(PieceKind::King, us);
    let rook = Piece::new(PieceKind::Rook, us);
    let threatened = board.attacks_for(us.opposite());

    for right in position.castling().iter().filter(|r| r.color() == us) {
        let in_place = board.piece_at(right.king_square()) == Some(king)
            && board.piece_at(right.rook_square()) == Some(rook);
        if in_place
            && (occupied & right.empty_squares()).is_empty()
            && (threatened & right.king_path()).is_empty()
        {
            moves.push(Move::new(right.king_square(), right.king_target()));
        }
    }
}

impl Position {
    /// Returns every legal move for the side to move.
    #[inline]
    pub fn legal_moves(&self) -> MoveList {
        generate_moves(self)
    }

    /// Returns true if the side to move has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        !generate_moves(self).is_empty()
    }

    /// Returns true if `m` is legal here.
    pub fn is_legal(&self, m: Move) -> bool {
        generate_moves(self).contains(m)
    }

    /// Returns the legal moves of the piece on `origin`.
    ///
    /// Empty when the square is empty or holds a piece of the side not to move.
    pub fn legal_moves_from(&self, origin: Square) -> Vec<Move> {
        generate_moves(self)
            .into_iter()
            .copied()
            .filter(|m| m.origin() == origin)
            .collect()
    }

    /// Returns the squares the piece on `origin` can legally move to.
    pub fn legal_targets_from(&self, origin: Square) -> Bitboard {
        self.legal_moves_from(origin).into_iter().map(|m| m.target()).collect()
    }

    /// Returns the squares `color` can legally move a piece to.
    ///
    /// Only the side to move has legal moves; for the other color this is empty.
    pub fn legal_targets(&self, color: Color) -> Bitboard {
        if color != self.side_to_move() {
            return Bitboard::EMPTY;
        }
        generate_moves(self).targets()
    }

    /// Returns the squares where `color` can legally capture, en passant included.
    pub fn legal_captures(&self, color: Color) -> Bitboard {
        if color != self.side_to_move() {
            return Bitboard::EMPTY;
        }
        generate_moves(self)
            .into_iter()
            .filter(|&&m| self.is_capture(m))
            .map(|m| m.target())
            .collect()
    }

    /// Returns the squares where the piece on `origin` can legally capture.
    pub fn legal_captures_from(&self, origin: Square) -> Bitboard {
        self.legal_moves_from(origin)
            .into_iter()
            .filter(|&m| self.is_capture(m))
            .map(|m| m.target())
            .collect()
    }

    /// Returns `color`'s pieces that stand on squares the opponent attacks.
    #[inline]
    pub fn attacked_occupations(&self, color: Color) -> Bitboard {
        self.board().attacked_occupations(color)
    }

    /// Returns the opponent pieces `color` attacks.
    #[inline]
    pub fn threatened_enemies(&self, color: Color) -> Bitboard {
        self.board().threatened_enemies(color)
    }

    /// Returns the moves of the pieces currently giving check, each onto the king.
    pub fn moves_attacking_king(&self) -> Vec<Move> {
        match self.board().king_square(self.side_to_move()) {
            Some(king) => self
                .attackers_to_king()
                .into_iter()
                .map(|origin| Move::new(origin, king))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn uci(m: &str) -> Move {
        Move::from_uci(m).unwrap()
    }

    #[test]
    fn movelist_push_and_retain() {
        let mut list = MoveList::new();
        assert!(list.is_empty());

        list.push(uci("e2e4"));
        list.push(uci("d2d4"));
        list.push(uci("g1f3"));
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], uci("e2e4"));

        list.retain(|m| m.origin() != sq("d2"));
        assert_eq!(list.as_slice(), &[uci("e2e4"), uci("g1f3")]);
        assert!(list.contains(uci("g1f3")));
        assert_eq!(list.targets().count(), 2);
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let moves = Position::startpos().legal_moves();
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn double_push_blocked() {
        let pos = Position::from_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1").unwrap();
        assert!(pos.legal_targets_from(sq("e2")).is_empty());
        let pos = Position::from_fen("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1").unwrap();
        assert_eq!(
            pos.legal_targets_from(sq("e2")),
            Bitboard::from_square(sq("e3"))
        );
    }

    #[test]
    fn promotions_expand_to_four_moves() {
        let pos = Position::from_fen("3r3k/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = pos.legal_moves_from(sq("e7"));
        assert_eq!(moves.len(), 8);
        assert!(moves.contains(&Move::with_promotion(sq("e7"), sq("d8"), PieceKind::Knight)));
        assert!(moves.contains(&Move::with_promotion(sq("e7"), sq("e8"), PieceKind::Queen)));
    }

    #[test]
    fn en_passant_capture_generated() {
        let pos =
            Position::from_fen("rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        assert!(pos.is_legal(uci("e5d6")));
        assert!(pos.legal_captures(Color::White).contains(sq("d6")));
        assert!(pos.legal_captures_from(sq("e5")).contains(sq("d6")));
    }

    #[test]
    fn en_passant_exposing_king_is_illegal() {
        // Capturing e.p. would clear the fifth rank between the rook and the king.
        let pos = Position::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1").unwrap();
        assert!(!pos.is_legal(uci("e5d6")));
        assert!(pos.is_legal(uci("e5e6")));
    }

    #[test]
    fn pinned_piece_cannot_leave_line() {
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        assert!(pos.legal_moves_from(sq("e2")).is_empty());
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        // Rook on e8 and bishop on b4 both give check; the knight on c2 could take the bishop.
        let pos = Position::from_fen("4r1k1/8/8/8/1b6/8/2N5/4K3 w - - 0 1").unwrap();
        assert_eq!(pos.attackers_to_king().count(), 2);
        let moves = pos.legal_moves();
        assert!(!moves.is_empty());
        assert!(moves.into_iter().all(|m| m.origin() == Square::E1));
    }

    #[test]
    fn castling_both_sides() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(pos.is_legal(uci("e1g1")));
        assert!(pos.is_legal(uci("e1c1")));
    }

    #[test]
    fn castling_blocked_by_attacked_transit_square() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/6b1/4K2R w K - 0 1").unwrap();
        // The bishop on g2 attacks f1.
        assert!(!pos.is_legal(uci("e1g1")));
        assert!(!pos.legal_targets_from(Square::E1).contains(Square::G1));
    }

    #[test]
    fn castling_blocked_by_piece_between() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1").unwrap();
        assert!(!pos.is_legal(uci("e1c1")));
        assert!(pos.is_legal(uci("e1g1")));
    }

    #[test]
    fn queenside_castling_allowed_when_only_b_file_attacked() {
        // b1 is attacked but the king never crosses it.
        let pos = Position::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(pos.is_legal(uci("e1c1")));
    }

    #[test]
    fn no_castling_out_of_check() {
        let pos = Position::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(!pos.is_legal(uci("e1g1")));
        assert!(!pos.is_legal(uci("e1c1")));
    }

    #[test]
    fn side_not_to_move_has_no_targets() {
        let pos = Position::startpos();
        assert_eq!(pos.legal_targets(Color::White).count(), 16);
        assert!(pos.legal_targets(Color::Black).is_empty());
        assert!(pos.legal_targets_from(sq("e7")).is_empty());
        assert!(pos.legal_targets_from(sq("e4")).is_empty());
    }

    #[test]
    fn moves_attacking_king_point_at_king() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
        assert_eq!(
            pos.moves_attacking_king(),
            vec![Move::new(Square::E1, Square::E8)]
        );
    }
}
