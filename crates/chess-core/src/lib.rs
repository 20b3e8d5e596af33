//! Core value types for the chess rules engine.
//!
//! This crate provides the leaf types every other layer builds on:
//! - [`Piece`], [`PieceKind`] and [`Color`] for piece identity
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] for origin/target/promotion moves
//! - [`Fen`] for FEN field parsing and serialization

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::Move;
pub use piece::{Piece, PieceKind};
pub use square::{File, Rank, Square};
