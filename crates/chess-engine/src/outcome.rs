//! Terminal-state classification.

use chess_core::Color;
use std::fmt;

/// The state of the side to move's king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KingStatus {
    /// Not attacked.
    Safe,
    /// Attacked, with at least one legal reply.
    Checked,
    /// Attacked, with no legal reply.
    Checkmated,
}

impl KingStatus {
    /// Returns true unless the king is safe.
    #[inline]
    pub const fn is_attacked(self) -> bool {
        !matches!(self, KingStatus::Safe)
    }
}

impl fmt::Display for KingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KingStatus::Safe => "safe",
            KingStatus::Checked => "checked",
            KingStatus::Checkmated => "checkmated",
        };
        f.write_str(name)
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// No legal moves but not in check.
    Stalemate,
    /// 100 half-moves without a pawn move or capture.
    FiftyMoveRule,
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The given color won by checkmate.
    Win(Color),
    /// Drawn for the given reason.
    Draw(DrawReason),
}

impl Outcome {
    /// Returns the winning color, if any.
    #[inline]
    pub const fn winner(self) -> Option<Color> {
        match self {
            Outcome::Win(color) => Some(color),
            Outcome::Draw(_) => None,
        }
    }

    /// Returns true if one side won.
    #[inline]
    pub const fn is_win(self) -> bool {
        matches!(self, Outcome::Win(_))
    }

    /// Returns true if the game was drawn.
    #[inline]
    pub const fn is_draw(self) -> bool {
        matches!(self, Outcome::Draw(_))
    }

    /// Returns the score for `color`: 1 for a win, 0.5 for a draw, 0 for a loss.
    pub fn value_for(self, color: Color) -> f32 {
        match self {
            Outcome::Win(winner) if winner == color => 1.0,
            Outcome::Win(_) => 0.0,
            Outcome::Draw(_) => 0.5,
        }
    }
}

impl fmt::Display for Outcome {
    /// Writes the PGN result token.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win(Color::White) => f.write_str("1-0"),
            Outcome::Win(Color::Black) => f.write_str("0-1"),
            Outcome::Draw(_) => f.write_str("1/2-1/2"),
        }
    }
}
