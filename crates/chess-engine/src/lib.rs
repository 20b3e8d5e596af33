//! Chess rules engine with bitboard representation.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets with shift, fill and ray operations
//! - [`Board`] - twelve piece bitboards and attacker queries
//! - [`Position`] - full position state, legal moves, check and mate detection
//! - [`MoveRecord`] - the immutable result of executing a move, with its SAN
//! - [`Game`] - an undo/redo timeline of move records with observer events
//! - [`Epd`] - Extended Position Description records
//!
//! # Architecture
//!
//! The engine uses bitboards for piece representation - each piece type/color
//! combination has a 64-bit integer where each bit represents a square.
//! Positions are immutable values: executing a move produces a new position.
//! Legality is decided by playing each pseudo-legal move on a copy of the
//! board and rejecting those that leave the mover's king attacked.
//!
//! # Example
//!
//! ```
//! use chess_engine::{Color, Game, KingStatus, Outcome, Position};
//!
//! // Using Position directly (stateless)
//! let position = Position::startpos();
//! println!("Legal moves from starting position: {}", position.legal_moves().len());
//!
//! // Using Game for a navigable move history
//! let mut game = Game::new();
//! game.execute_san_moves("f3 e5 g4 Qh4").unwrap();
//! assert_eq!(game.king_status(), KingStatus::Checkmated);
//! assert_eq!(game.outcome(), Some(Outcome::Win(Color::Black)));
//!
//! game.undo(2);
//! assert_eq!(game.movetext(), "1. f3 e5");
//! ```

mod bitboard;
mod board;
pub mod epd;
mod execute;
mod game;
pub mod movegen;
mod outcome;
mod position;
pub mod san;

pub use bitboard::{Bitboard, BitboardIter, Direction};
pub use board::{Board, Capture, SquareChange};
pub use chess_core::{Color, Fen, FenError, File, Move, Piece, PieceKind, Rank, Square};
pub use epd::{Epd, EpdError, Opcode};
pub use execute::MoveRecord;
pub use game::{Game, GameError, GameEvent, GameObserver, Traversal, TraversalDirection};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{
    bishop_attacks, generate_moves, generate_pseudo_legal, king_attacks, knight_attacks,
    pawn_attacks, queen_attacks, rook_attacks, MoveList,
};
pub use outcome::{DrawReason, KingStatus, Outcome};
pub use position::{CastlingRight, CastlingRights, Position};
pub use san::{move_to_san, san_to_move, SanError};
