//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN is the standard way to record chess moves in human-readable form.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1"

use chess_core::{File, Move, PieceKind, Rank, Square};
use thiserror::Error;

use crate::movegen::generate_moves;
use crate::Position;

/// Error type for SAN parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    #[error("empty SAN string")]
    Empty,
    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),
    #[error("no legal move matches: {0}")]
    NoMatchingMove(String),
    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
}

/// Converts a legal move to SAN given the position BEFORE the move.
///
/// # Panics
///
/// Panics if the origin square of `mv` is empty.
pub fn move_to_san(position: &Position, mv: Move) -> String {
    san_for_transition(position, mv, &position.play(mv))
}

/// Builds the SAN of `mv` when the resulting position is already known.
pub(crate) fn san_for_transition(before: &Position, mv: Move, after: &Position) -> String {
    let mut san = if before.is_castle(mv) {
        if mv.target().file() == File::G {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        }
    } else {
        piece_move_text(before, mv)
    };

    if after.is_check() {
        san.push(if after.has_legal_moves() { '+' } else { '#' });
    }
    san
}

fn piece_move_text(position: &Position, mv: Move) -> String {
    let origin = mv.origin();
    let kind = match position.piece_at(origin) {
        Some(piece) => piece.kind,
        None => panic!("no piece at move origin {}", origin),
    };

    let mut san = String::new();
    if kind != PieceKind::Pawn {
        san.push(kind.letter());
    }
    if kind != PieceKind::Pawn && kind != PieceKind::King {
        san.push_str(&disambiguation(position, mv, kind));
    }
    if position.is_capture(mv) {
        if kind == PieceKind::Pawn {
            san.push(origin.file().to_char());
        }
        san.push('x');
    }
    san.push_str(&mv.target().to_algebraic());
    if let Some(promotion) = mv.promotion() {
        san.push('=');
        san.push(promotion.letter());
    }
    san
}

/// Picks the shortest origin hint that tells `mv` apart from other like
/// pieces that can also legally reach its target: file, then rank, then both.
fn disambiguation(position: &Position, mv: Move, kind: PieceKind) -> String {
    let origin = mv.origin();
    let rivals: Vec<Square> = generate_moves(position)
        .into_iter()
        .filter(|other| other.target() == mv.target() && other.origin() != origin)
        .filter(|other| position.piece_at(other.origin()).map(|p| p.kind) == Some(kind))
        .map(|other| other.origin())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != origin.file()) {
        origin.file().to_char().to_string()
    } else if rivals.iter().all(|sq| sq.rank() != origin.rank()) {
        origin.rank().to_char().to_string()
    } else {
        origin.to_algebraic()
    }
}

/// Resolves a SAN string to the unique legal move it denotes.
///
/// Trailing check, mate, and annotation marks (`+`, `#`, `!`, `?`) are
/// ignored, and castling may be written with zeros.
///
/// # Errors
///
/// Returns [`SanError::Empty`] for blank input, [`SanError::InvalidFormat`]
/// when the text is not SAN, [`SanError::NoMatchingMove`] when no legal move
/// fits, and [`SanError::AmbiguousMove`] when several do.
pub fn san_to_move(position: &Position, san: &str) -> Result<Move, SanError> {
    let trimmed = san.trim();
    if trimmed.is_empty() {
        return Err(SanError::Empty);
    }

    let body = trimmed.trim_end_matches(['+', '#', '!', '?']);
    match body {
        "O-O" | "0-0" => return find_castling_move(position, File::G, trimmed),
        "O-O-O" | "0-0-0" => return find_castling_move(position, File::C, trimmed),
        _ => {}
    }

    let parsed =
        parse_components(body).ok_or_else(|| SanError::InvalidFormat(trimmed.to_string()))?;
    find_matching_move(position, &parsed, trimmed)
}

/// Parsed components of a SAN string.
#[derive(Debug)]
struct ParsedSan {
    kind: PieceKind,
    origin_file: Option<File>,
    origin_rank: Option<Rank>,
    target: Square,
    promotion: Option<PieceKind>,
}

fn parse_components(body: &str) -> Option<ParsedSan> {
    let (body, promotion) = match body.split_once('=') {
        Some((body, letter)) => {
            let mut chars = letter.chars();
            let kind = match (chars.next(), chars.next()) {
                (Some(c), None) => PieceKind::from_letter(c).filter(|k| k.is_promotion())?,
                _ => return None,
            };
            (body, Some(kind))
        }
        None => (body, None),
    };

    let mut chars: Vec<char> = body.chars().collect();
    let kind = match chars.first() {
        Some(&c) if c.is_ascii_uppercase() => {
            chars.remove(0);
            PieceKind::from_letter(c)?
        }
        Some(_) => PieceKind::Pawn,
        None => return None,
    };

    if chars.len() < 2 {
        return None;
    }
    let split = chars.len() - 2;
    let target = Square::new(
        File::from_char(chars[split])?,
        Rank::from_char(chars[split + 1])?,
    );

    let mut hint = &chars[..split];
    if let Some((&'x', rest)) = hint.split_last() {
        hint = rest;
    }
    let (origin_file, origin_rank) = match hint {
        [] => (None, None),
        [c] => match (File::from_char(*c), Rank::from_char(*c)) {
            (Some(file), _) => (Some(file), None),
            (None, Some(rank)) => (None, Some(rank)),
            (None, None) => return None,
        },
        [f, r] => (Some(File::from_char(*f)?), Some(Rank::from_char(*r)?)),
        _ => return None,
    };

    Some(ParsedSan {
        kind,
        origin_file,
        origin_rank,
        target,
        promotion,
    })
}

fn find_castling_move(position: &Position, file: File, san: &str) -> Result<Move, SanError> {
    generate_moves(position)
        .into_iter()
        .copied()
        .find(|&m| position.is_castle(m) && m.target().file() == file)
        .ok_or_else(|| SanError::NoMatchingMove(san.to_string()))
}

fn find_matching_move(
    position: &Position,
    parsed: &ParsedSan,
    san: &str,
) -> Result<Move, SanError> {
    let matching: Vec<Move> = generate_moves(position)
        .into_iter()
        .copied()
        .filter(|m| m.target() == parsed.target)
        .filter(|m| position.piece_at(m.origin()).map(|p| p.kind) == Some(parsed.kind))
        .filter(|m| parsed.origin_file.map_or(true, |f| m.origin().file() == f))
        .filter(|m| parsed.origin_rank.map_or(true, |r| m.origin().rank() == r))
        .filter(|m| m.promotion() == parsed.promotion)
        .collect();

    match matching.as_slice() {
        [] => Err(SanError::NoMatchingMove(san.to_string())),
        [only] => Ok(*only),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

impl Position {
    /// Returns the SAN of `mv` in this position.
    ///
    /// # Panics
    ///
    /// Panics if the origin square of `mv` is empty.
    #[inline]
    pub fn san(&self, mv: Move) -> String {
        move_to_san(self, mv)
    }

    /// Resolves SAN text against this position.
    ///
    /// # Errors
    ///
    /// See [`san_to_move`].
    #[inline]
    pub fn parse_san(&self, san: &str) -> Result<Move, SanError> {
        san_to_move(self, san)
    }
}
