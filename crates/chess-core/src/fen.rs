//! FEN (Forsyth-Edwards Notation) field parsing and serialization.

use crate::{Color, Piece, Rank, Square};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// The six fields of a FEN record, validated and typed.
///
/// The piece placement is kept as text; it has been checked for shape
/// (eight ranks of eight files, known piece letters) and can be decoded
/// square by square with [`Fen::placement_squares`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Piece placement (e.g., "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
    pub piece_placement: String,
    /// Side to move
    pub active_color: Color,
    /// Castling availability as a subset of "KQkq" in that order, or "-"
    pub castling: String,
    /// En passant target square
    pub en_passant: Option<Square>,
    /// Plies since the last capture or pawn move
    pub halfmove_clock: u32,
    /// Starts at 1, incremented after Black moves
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    ///
    /// # Errors
    ///
    /// Returns a [`FenError`] naming the first field that fails validation.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        Self::from_parts(parts[0], parts[1], parts[2], parts[3], parts[4], parts[5])
    }

    /// Builds a record from its six fields given separately.
    ///
    /// # Errors
    ///
    /// Returns a [`FenError`] naming the first field that fails validation.
    pub fn from_parts(
        placement: &str,
        active_color: &str,
        castling: &str,
        en_passant: &str,
        halfmove_clock: &str,
        fullmove_number: &str,
    ) -> Result<Self, FenError> {
        Self::validate_piece_placement(placement)?;

        let active_color = match active_color {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        Self::validate_castling(castling)?;
        let en_passant = Self::parse_en_passant(en_passant, active_color)?;

        let halfmove = halfmove_clock
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(halfmove_clock.to_string()))?;

        let fullmove = fullmove_number
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| FenError::InvalidFullmoveNumber(fullmove_number.to_string()))?;

        Ok(Fen {
            piece_placement: placement.to_string(),
            active_color,
            castling: castling.to_string(),
            en_passant,
            halfmove_clock: halfmove,
            fullmove_number: fullmove,
        })
    }

    /// Decodes a piece placement field into occupied squares.
    ///
    /// Ranks are read 8 to 1 and files a to h.
    ///
    /// # Errors
    ///
    /// Returns [`FenError::InvalidPiecePlacement`] if the field does not hold
    /// exactly eight ranks of exactly eight files, or contains an unknown
    /// piece letter or an empty-run digit outside 1-8.
    pub fn placement_squares(placement: &str) -> Result<Vec<(Square, Piece)>, FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut squares = Vec::with_capacity(32);
        for (i, text) in ranks.iter().enumerate() {
            let rank = Rank::ALL[7 - i];
            let mut file = 0u32;
            for c in text.chars() {
                if let Some(run) = c.to_digit(10) {
                    if !(1..=8).contains(&run) {
                        return Err(FenError::InvalidPiecePlacement(format!(
                            "invalid empty run '{}' in rank {}",
                            c, rank
                        )));
                    }
                    file += run;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if file < 8 {
                        let square = Square::new(crate::File::ALL[file as usize], rank);
                        squares.push((square, piece));
                    }
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c, rank
                    )));
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    rank, file
                )));
            }
        }

        Ok(squares)
    }

    fn validate_piece_placement(placement: &str) -> Result<(), FenError> {
        Self::placement_squares(placement).map(|_| ())
    }

    fn validate_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }
        if castling.is_empty() {
            return Err(FenError::InvalidCastlingRights(castling.to_string()));
        }

        let mut seen = [false; 4];
        for c in castling.chars() {
            let slot = match c {
                'K' => 0,
                'Q' => 1,
                'k' => 2,
                'q' => 3,
                _ => {
                    return Err(FenError::InvalidCastlingRights(format!(
                        "invalid character '{}'",
                        c
                    )))
                }
            };
            if seen[slot] {
                return Err(FenError::InvalidCastlingRights(format!(
                    "duplicate right '{}'",
                    c
                )));
            }
            seen[slot] = true;
        }

        Ok(())
    }

    /// The target must lie behind a pawn the opponent just pushed two squares:
    /// rank 6 with White to move, rank 3 with Black to move.
    fn parse_en_passant(ep: &str, active_color: Color) -> Result<Option<Square>, FenError> {
        if ep == "-" {
            return Ok(None);
        }

        let expected = match active_color {
            Color::White => Rank::R6,
            Color::Black => Rank::R3,
        };
        match Square::from_algebraic(ep) {
            Some(square) if square.rank() == expected => Ok(Some(square)),
            _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
        }
    }

    /// Converts the record back to a FEN string.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.piece_placement,
            self.active_color.to_fen_char(),
            self.castling,
            self.en_passant
                .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic()),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl std::str::FromStr for Fen {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Fen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_fen())
    }
}
