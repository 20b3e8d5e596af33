//! Game timeline with undo/redo.
//!
//! A [`Game`] owns the starting position, the ordered list of executed
//! [`MoveRecord`]s and a cursor into it. Executing a move while the cursor
//! sits in the past discards the records after it. Every state change
//! returns the events it produced; pass them to a [`GameObserver`] with
//! [`GameEvent::dispatch`] to keep a view in sync.

use std::ops::Range;

use chess_core::{Color, FenError, Move, Piece, Square};
use thiserror::Error;

use crate::board::{Capture, SquareChange};
use crate::execute::MoveRecord;
use crate::outcome::{KingStatus, Outcome};
use crate::san::{san_to_move, SanError};
use crate::{Bitboard, MoveList, Position};

/// Error type for game operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// The SAN string could not be resolved.
    #[error("invalid SAN: {0}")]
    InvalidSan(#[from] SanError),
    /// The current position already ends the game.
    #[error("game has already ended ({0})")]
    GameOver(Outcome),
}

/// Which way a traversal moved the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalDirection {
    /// Towards the starting position.
    Undo,
    /// Towards the latest record.
    Redo,
}

/// The result of moving the cursor through the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    /// Which way the cursor moved.
    pub direction: TraversalDirection,
    /// The records stepped over, in timeline order.
    pub records: Vec<MoveRecord>,
    /// Net per-square board changes between the positions before and after.
    pub changes: Vec<SquareChange>,
}

impl Traversal {
    fn empty(direction: TraversalDirection) -> Self {
        Traversal {
            direction,
            records: Vec::new(),
            changes: Vec::new(),
        }
    }

    /// Returns true if the cursor did not move.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records stepped over.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// A notification produced by a timeline transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A record was appended at the end of the timeline.
    Appended(MoveRecord),
    /// A move was executed on the board.
    Executed {
        mv: Move,
        capture: Option<Capture>,
        promotion: Option<Piece>,
    },
    /// The cursor moved through existing records.
    Traversed(Traversal),
    /// The move just executed ended the game.
    Ended(Outcome),
}

impl GameEvent {
    /// Forwards this event to the matching observer method.
    pub fn dispatch(&self, observer: &mut dyn GameObserver) {
        match self {
            GameEvent::Appended(record) => observer.did_append(record),
            GameEvent::Executed {
                mv,
                capture,
                promotion,
            } => observer.did_execute(*mv, *capture, *promotion),
            GameEvent::Traversed(traversal) => observer.did_traverse(traversal),
            GameEvent::Ended(outcome) => observer.did_end(*outcome),
        }
    }
}

impl From<Traversal> for GameEvent {
    fn from(traversal: Traversal) -> Self {
        GameEvent::Traversed(traversal)
    }
}

/// Receives game notifications. Every method defaults to doing nothing.
pub trait GameObserver {
    fn did_append(&mut self, _record: &MoveRecord) {}

    fn did_traverse(&mut self, _traversal: &Traversal) {}

    fn did_execute(&mut self, _mv: Move, _capture: Option<Capture>, _promotion: Option<Piece>) {}

    fn did_end(&mut self, _outcome: Outcome) {}
}

/// A chess game: a starting position plus a navigable list of move records.
#[derive(Debug, Clone)]
pub struct Game {
    start: Position,
    records: Vec<MoveRecord>,
    /// Index of the record whose position is current; `None` at the start.
    cursor: Option<usize>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    /// Creates a game from a custom starting position.
    pub fn from_position(position: Position) -> Self {
        Game {
            start: position,
            records: Vec::new(),
            cursor: None,
        }
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Returns the starting position.
    pub fn start_position(&self) -> &Position {
        &self.start
    }

    /// Returns every record, including those after the cursor.
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Returns the cursor: `None` at the starting position.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Returns the records from the start up to and including the cursor.
    pub fn current_line(&self) -> &[MoveRecord] {
        &self.records[..self.line_len()]
    }

    fn line_len(&self) -> usize {
        self.cursor.map_or(0, |index| index + 1)
    }

    /// Returns the record at the cursor.
    pub fn current_record(&self) -> Option<&MoveRecord> {
        self.cursor.and_then(|index| self.records.get(index))
    }

    /// Returns the position at the cursor.
    pub fn current_position(&self) -> &Position {
        self.current_record()
            .map_or(&self.start, |record| &record.position)
    }

    /// Returns the move that led to the current position.
    pub fn latest_move(&self) -> Option<Move> {
        self.current_record().map(|record| record.mv)
    }

    /// Returns the SAN of the move that led to the current position.
    pub fn last_san(&self) -> Option<&str> {
        self.current_record().map(|record| record.san.as_str())
    }

    /// Returns true if there is a record to undo.
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    /// Returns true if there is a record to redo.
    pub fn can_redo(&self) -> bool {
        self.line_len() < self.records.len()
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        self.current_position().to_fen()
    }

    /// Returns the game result if the current position ends the game.
    pub fn outcome(&self) -> Option<Outcome> {
        self.current_position().outcome()
    }

    /// Returns true if the current position ends the game.
    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Returns the state of the side to move's king.
    pub fn king_status(&self) -> KingStatus {
        self.current_position().king_status()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.current_position().is_check()
    }

    /// Returns all legal moves in the current position.
    pub fn legal_moves(&self) -> MoveList {
        self.current_position().legal_moves()
    }

    /// Returns the squares the piece on `origin` can legally move to.
    pub fn legal_targets_from(&self, origin: Square) -> Bitboard {
        self.current_position().legal_targets_from(origin)
    }

    /// Returns the squares `color` can legally move to.
    pub fn legal_targets(&self, color: Color) -> Bitboard {
        self.current_position().legal_targets(color)
    }

    /// Returns the squares where the piece on `origin` can legally capture.
    pub fn legal_captures_from(&self, origin: Square) -> Bitboard {
        self.current_position().legal_captures_from(origin)
    }

    /// Returns the squares where `color` can legally capture.
    pub fn legal_captures(&self, color: Color) -> Bitboard {
        self.current_position().legal_captures(color)
    }

    /// Returns the squares of `color`'s pieces attacking `target`.
    pub fn attackers(&self, target: Square, color: Color) -> Bitboard {
        self.current_position().attackers(target, color)
    }

    /// Returns the squares of the pieces giving check.
    pub fn attackers_to_king(&self) -> Bitboard {
        self.current_position().attackers_to_king()
    }

    fn ensure_ongoing(&self) -> Result<(), GameError> {
        match self.outcome() {
            Some(outcome) => Err(GameError::GameOver(outcome)),
            None => Ok(()),
        }
    }

    /// Executes a legal move at the cursor.
    ///
    /// Records after the cursor are discarded first. Returns the append and
    /// execute events, followed by an end event if the move finished the game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] if the current position is terminal
    /// and [`GameError::IllegalMove`] if `mv` is not legal. The game is left
    /// unchanged in both cases.
    pub fn execute(&mut self, mv: Move) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_ongoing()?;
        if !self.current_position().is_legal(mv) {
            return Err(GameError::IllegalMove(mv.to_uci()));
        }
        let record = self.current_position().execute(mv);
        Ok(self.append(record))
    }

    /// Executes a move given in UCI notation (e.g. "e2e4", "e7e8q").
    pub fn execute_uci(&mut self, uci: &str) -> Result<Vec<GameEvent>, GameError> {
        let mv = Move::from_uci(uci).ok_or_else(|| GameError::IllegalMove(uci.to_string()))?;
        self.execute(mv)
    }

    /// Resolves SAN text against the current position and executes it.
    pub fn execute_san(&mut self, san: &str) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_ongoing()?;
        let mv = san_to_move(self.current_position(), san)?;
        self.execute(mv)
    }

    /// Executes whitespace-separated SAN tokens in order.
    ///
    /// Move numbers such as `12.` or `12...` are skipped, whether they stand
    /// alone or are glued to the move (`12.Nf3`). Either every move is
    /// executed or, on the first failure, the game is left as it was.
    pub fn execute_san_moves(&mut self, text: &str) -> Result<Vec<GameEvent>, GameError> {
        let mut scratch = self.clone();
        let mut events = Vec::new();
        for san in text
            .split_whitespace()
            .map(strip_move_number)
            .filter(|san| !san.is_empty())
        {
            events.extend(scratch.execute_san(san)?);
        }
        *self = scratch;
        Ok(events)
    }

    fn append(&mut self, record: MoveRecord) -> Vec<GameEvent> {
        let keep = self.line_len();
        if keep < self.records.len() {
            tracing::debug!(
                dropped = self.records.len() - keep,
                "truncated redo history"
            );
            self.records.truncate(keep);
        }

        tracing::debug!(
            san = %record.san,
            fen = %record.position,
            "executed move"
        );

        let outcome = record.position.outcome();
        let mut events = vec![
            GameEvent::Appended(record.clone()),
            GameEvent::Executed {
                mv: record.mv,
                capture: record.capture,
                promotion: record.promotion,
            },
        ];
        self.records.push(record);
        self.cursor = Some(self.records.len() - 1);

        if let Some(outcome) = outcome {
            tracing::info!(result = %outcome, ?outcome, "game ended");
            events.push(GameEvent::Ended(outcome));
        }
        events
    }

    /// Moves the cursor back by up to `count` records.
    pub fn undo(&mut self, count: usize) -> Traversal {
        let Some(current) = self.cursor else {
            return Traversal::empty(TraversalDirection::Undo);
        };
        let steps = count.min(current + 1);
        if steps == 0 {
            return Traversal::empty(TraversalDirection::Undo);
        }
        let low = current + 1 - steps;
        self.move_cursor(low.checked_sub(1), TraversalDirection::Undo, low..current + 1)
    }

    /// Moves the cursor forward by up to `count` records.
    pub fn redo(&mut self, count: usize) -> Traversal {
        let next = self.line_len();
        let high = next.saturating_add(count).min(self.records.len());
        if high <= next {
            return Traversal::empty(TraversalDirection::Redo);
        }
        self.move_cursor(Some(high - 1), TraversalDirection::Redo, next..high)
    }

    /// Moves the cursor back to the starting position.
    pub fn undo_all(&mut self) -> Traversal {
        self.undo(self.line_len())
    }

    /// Moves the cursor to the latest record.
    pub fn redo_all(&mut self) -> Traversal {
        self.redo(self.records.len())
    }

    /// Moves the cursor to `index` (`None` for the start), clamped to the
    /// available records.
    pub fn set_index(&mut self, index: Option<usize>) -> Traversal {
        let target = index.map_or(0, |i| i.saturating_add(1)).min(self.records.len());
        let current = self.line_len();
        if target < current {
            self.undo(current - target)
        } else {
            self.redo(target - current)
        }
    }

    fn move_cursor(
        &mut self,
        cursor: Option<usize>,
        direction: TraversalDirection,
        range: Range<usize>,
    ) -> Traversal {
        let before = *self.current_position().board();
        self.cursor = cursor;
        let changes = before.diff(self.current_position().board());
        let records = self.records[range].to_vec();
        tracing::debug!(
            ?direction,
            count = records.len(),
            cursor = ?self.cursor,
            "traversed timeline"
        );
        Traversal {
            direction,
            records,
            changes,
        }
    }

    /// Returns numbered SAN text for the line up to the cursor, e.g.
    /// `1. e4 e5 2. Nf3`. A line starting with Black opens with `N...`.
    pub fn movetext(&self) -> String {
        let mut parts = Vec::with_capacity(self.line_len() * 3 / 2);
        let mut before = &self.start;
        for (i, record) in self.current_line().iter().enumerate() {
            match before.side_to_move() {
                Color::White => parts.push(format!("{}.", before.fullmove_number())),
                Color::Black if i == 0 => parts.push(format!("{}...", before.fullmove_number())),
                Color::Black => {}
            }
            parts.push(record.san.clone());
            before = &record.position;
        }
        parts.join(" ")
    }
}

/// Strips a leading move number (`12.`, `12...`) from `token`.
fn strip_move_number(token: &str) -> &str {
    let rest = token.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == token.len() || !rest.starts_with('.') {
        return token;
    }
    rest.trim_start_matches('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::DrawReason;
    use chess_core::PieceKind;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn played(moves: &str) -> Game {
        let mut game = Game::new();
        game.execute_san_moves(moves).unwrap();
        game
    }

    #[derive(Default)]
    struct Recorder {
        appended: Vec<String>,
        traversed: Vec<(TraversalDirection, usize)>,
        executed: usize,
        ended: Option<Outcome>,
    }

    impl GameObserver for Recorder {
        fn did_append(&mut self, record: &MoveRecord) {
            self.appended.push(record.san.clone());
        }

        fn did_traverse(&mut self, traversal: &Traversal) {
            self.traversed.push((traversal.direction, traversal.len()));
        }

        fn did_execute(&mut self, _mv: Move, _capture: Option<Capture>, _promotion: Option<Piece>) {
            self.executed += 1;
        }

        fn did_end(&mut self, outcome: Outcome) {
            self.ended = Some(outcome);
        }
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.cursor(), None);
        assert!(game.records().is_empty());
        assert!(!game.is_game_over());
        assert!(!game.is_check());
        assert_eq!(game.current_position(), &Position::startpos());
        assert_eq!(game.movetext(), "");
    }

    #[test]
    fn execute_uci_and_san() {
        let mut game = Game::new();
        game.execute_uci("e2e4").unwrap();
        game.execute_san("e5").unwrap();
        assert_eq!(game.cursor(), Some(1));
        assert_eq!(game.records()[0].san, "e4");
        assert_eq!(game.last_san(), Some("e5"));
        assert_eq!(game.latest_move(), Move::from_uci("e7e5"));
    }

    #[test]
    fn illegal_move_leaves_game_unchanged() {
        let mut game = Game::new();
        assert_eq!(
            game.execute_uci("e2e5"),
            Err(GameError::IllegalMove("e2e5".to_string()))
        );
        assert_eq!(
            game.execute_uci("nonsense"),
            Err(GameError::IllegalMove("nonsense".to_string()))
        );
        assert!(matches!(
            game.execute_san("Qh5"),
            Err(GameError::InvalidSan(SanError::NoMatchingMove(_)))
        ));
        assert!(game.records().is_empty());
        assert_eq!(game.cursor(), None);
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = played("f3 e5 g4");
        let events = game.execute_san("Qh4").unwrap();
        assert_eq!(events.last(), Some(&GameEvent::Ended(Outcome::Win(Color::Black))));
        assert_eq!(game.king_status(), KingStatus::Checkmated);
        assert_eq!(game.outcome(), Some(Outcome::Win(Color::Black)));
        assert_eq!(game.last_san(), Some("Qh4#"));
        assert_eq!(
            game.execute_san("a3"),
            Err(GameError::GameOver(Outcome::Win(Color::Black)))
        );
        assert_eq!(game.attackers_to_king(), Bitboard::from_square(sq("h4")));
    }

    #[test]
    fn stalemate_start_refuses_moves() {
        let mut game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.outcome(), Some(Outcome::Draw(DrawReason::Stalemate)));
        assert!(matches!(game.execute_uci("h8g8"), Err(GameError::GameOver(_))));
    }

    #[test]
    fn execute_events_in_order() {
        let mut game = played("e4 d5");
        let events = game.execute_san("exd5").unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], GameEvent::Appended(record) if record.san == "exd5"));
        assert_eq!(
            events[1],
            GameEvent::Executed {
                mv: Move::new(sq("e4"), sq("d5")),
                capture: Some(Capture {
                    piece: Piece::new(PieceKind::Pawn, Color::Black),
                    square: sq("d5"),
                }),
                promotion: None,
            }
        );
    }

    #[test]
    fn undo_and_redo_move_the_cursor() {
        let mut game = played("e4 e5 Nf3 Nc6");
        let after = game.current_position().clone();

        let traversal = game.undo(2);
        assert_eq!(traversal.direction, TraversalDirection::Undo);
        assert_eq!(
            traversal.records.iter().map(|r| r.san.as_str()).collect::<Vec<_>>(),
            ["Nf3", "Nc6"]
        );
        assert_eq!(game.cursor(), Some(1));
        assert_eq!(game.last_san(), Some("e5"));
        assert!(game.can_redo());

        let traversal = game.redo(2);
        assert_eq!(traversal.direction, TraversalDirection::Redo);
        assert_eq!(traversal.len(), 2);
        assert_eq!(game.cursor(), Some(3));
        assert_eq!(game.current_position(), &after);
        assert!(!game.can_redo());
    }

    #[test]
    fn undo_and_redo_clamp() {
        let mut game = played("e4 e5");
        assert_eq!(game.undo(10).len(), 2);
        assert_eq!(game.cursor(), None);
        assert!(game.undo(1).is_empty());
        assert_eq!(game.current_position(), &Position::startpos());

        assert_eq!(game.redo(10).len(), 2);
        assert_eq!(game.cursor(), Some(1));
        assert!(game.redo(1).is_empty());
        assert!(game.undo(0).is_empty());
        assert_eq!(game.cursor(), Some(1));
    }

    #[test]
    fn traversal_reports_board_changes() {
        let mut game = played("e4");
        let traversal = game.undo(1);
        let white_pawn = Piece::new(PieceKind::Pawn, Color::White);
        assert_eq!(
            traversal.changes,
            vec![
                SquareChange {
                    square: sq("e2"),
                    before: None,
                    after: Some(white_pawn),
                },
                SquareChange {
                    square: sq("e4"),
                    before: Some(white_pawn),
                    after: None,
                },
            ]
        );
    }

    #[test]
    fn execute_after_undo_truncates() {
        let mut game = played("e4 e5 Nf3");
        game.undo(2);
        game.execute_san("d5").unwrap();
        assert_eq!(game.records().len(), 2);
        assert_eq!(game.cursor(), Some(1));
        assert!(!game.can_redo());
        assert_eq!(game.movetext(), "1. e4 d5");
    }

    #[test]
    fn set_index_and_all() {
        let mut game = played("e4 e5 Nf3 Nc6 Bb5");
        let traversal = game.set_index(Some(1));
        assert_eq!(traversal.direction, TraversalDirection::Undo);
        assert_eq!(traversal.len(), 3);
        assert_eq!(game.cursor(), Some(1));

        let traversal = game.set_index(Some(3));
        assert_eq!(traversal.direction, TraversalDirection::Redo);
        assert_eq!(game.cursor(), Some(3));

        assert_eq!(game.set_index(Some(99)).len(), 1);
        assert_eq!(game.cursor(), Some(4));

        assert_eq!(game.undo_all().len(), 5);
        assert_eq!(game.cursor(), None);
        assert_eq!(game.redo_all().len(), 5);
        assert_eq!(game.cursor(), Some(4));
        assert!(game.set_index(Some(4)).is_empty());
        assert_eq!(game.set_index(None).len(), 5);
    }

    #[test]
    fn movetext_numbers_moves() {
        let game = played("1. e4 e5 2. Nf3 Nc6 3. Bb5");
        assert_eq!(game.movetext(), "1. e4 e5 2. Nf3 Nc6 3. Bb5");

        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 b Q - 0 30").unwrap();
        game.execute_san_moves("Kd7 Ra7+").unwrap();
        assert_eq!(game.movetext(), "30... Kd7 31. Ra7+");
    }

    #[test]
    fn execute_san_moves_is_atomic() {
        let mut game = played("e4 e5");
        let result = game.execute_san_moves("Nf3 Nc6 Ke3");
        assert!(matches!(result, Err(GameError::InvalidSan(_))));
        assert_eq!(game.records().len(), 2);
        assert_eq!(game.movetext(), "1. e4 e5");
    }

    #[test]
    fn en_passant_line() {
        let mut game = played("e4 a6 e5 d5");
        assert!(game.legal_targets_from(sq("e5")).contains(sq("d6")));
        assert!(game.legal_captures_from(sq("e5")).contains(sq("d6")));
        game.execute_san("exd6").unwrap();
        assert_eq!(game.current_position().piece_at(sq("d5")), None);
        assert_eq!(
            game.current_position().piece_at(sq("d6")),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
    }

    #[test]
    fn legal_targets_by_color() {
        let game = Game::new();
        assert_eq!(game.legal_targets(Color::White).count(), 16);
        assert!(game.legal_targets(Color::Black).is_empty());
        assert!(game.legal_captures(Color::White).is_empty());
        assert_eq!(game.attackers(sq("f3"), Color::White).count(), 3);
    }

    #[test]
    fn observer_receives_dispatched_events() {
        let mut game = Game::new();
        let mut recorder = Recorder::default();

        for san in ["f3", "e5", "g4", "Qh4"] {
            for event in game.execute_san(san).unwrap() {
                event.dispatch(&mut recorder);
            }
        }
        GameEvent::from(game.undo(2)).dispatch(&mut recorder);

        assert_eq!(recorder.appended, ["f3", "e5", "g4", "Qh4#"]);
        assert_eq!(recorder.executed, 4);
        assert_eq!(recorder.ended, Some(Outcome::Win(Color::Black)));
        assert_eq!(recorder.traversed, [(TraversalDirection::Undo, 2)]);
    }

    #[test]
    fn move_number_tokens() {
        assert_eq!(strip_move_number("1."), "");
        assert_eq!(strip_move_number("12..."), "");
        assert_eq!(strip_move_number("1.e4"), "e4");
        assert_eq!(strip_move_number("3...Nc6"), "Nc6");
        assert_eq!(strip_move_number("e4"), "e4");
        assert_eq!(strip_move_number("0-0"), "0-0");
        assert_eq!(strip_move_number("12"), "12");
    }

    #[test]
    fn glued_move_numbers_are_skipped() {
        let glued = played("1.e4 e5 2.Nf3 Nc6 3.Bb5 a6");
        let spaced = played("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6");
        assert_eq!(glued.to_fen(), spaced.to_fen());
        assert_eq!(glued.movetext(), "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6");

        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 b Q - 0 30").unwrap();
        game.execute_san_moves("30...Kd7 31.Ra7+").unwrap();
        assert_eq!(game.movetext(), "30... Kd7 31. Ra7+");
    }
}
