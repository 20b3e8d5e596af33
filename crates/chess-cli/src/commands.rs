//! Subcommand implementations. Each writes its report to `out`.

use std::io::Write;

use anyhow::{bail, Context};
use chess_engine::{perft, perft_divide, Epd, Game, Position, Square};
use serde::Serialize;

/// Counts perft nodes, optionally split by root move.
pub fn run_perft(
    out: &mut impl Write,
    position: &Position,
    depth: u32,
    divide: bool,
) -> anyhow::Result<()> {
    if divide {
        let results = perft_divide(position, depth);
        for (mv, nodes) in &results {
            writeln!(out, "{}: {}", mv, nodes)?;
        }
        let total: u64 = results.iter().map(|(_, nodes)| nodes).sum();
        writeln!(out)?;
        writeln!(out, "Nodes: {}", total)?;
    } else {
        writeln!(out, "Nodes: {}", perft(position, depth))?;
    }
    Ok(())
}

/// One played move in the `play` summary.
#[derive(Debug, Serialize)]
struct MoveSummary {
    san: String,
    uci: String,
}

/// Result of replaying a move list.
#[derive(Debug, Serialize)]
struct PlaySummary {
    movetext: String,
    moves: Vec<MoveSummary>,
    fen: String,
    king_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<String>,
}

impl PlaySummary {
    fn from_game(game: &Game) -> Self {
        PlaySummary {
            movetext: game.movetext(),
            moves: game
                .current_line()
                .iter()
                .map(|record| MoveSummary {
                    san: record.san.clone(),
                    uci: record.mv.to_uci(),
                })
                .collect(),
            fen: game.to_fen(),
            king_status: game.king_status().to_string(),
            outcome: game.outcome().map(|outcome| outcome.to_string()),
        }
    }
}

/// Executes SAN moves from `position` and reports the final state.
///
/// Nothing is written unless every move executes.
pub fn run_play(
    out: &mut impl Write,
    position: Position,
    moves: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let mut game = Game::from_position(position);
    for (i, san) in moves.iter().enumerate() {
        game.execute_san(san)
            .with_context(|| format!("move {} ({})", i + 1, san))?;
    }

    let summary = PlaySummary::from_game(&game);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        writeln!(out, "{}", summary.movetext)?;
        writeln!(out, "FEN: {}", summary.fen)?;
        writeln!(out, "King: {}", summary.king_status)?;
        if let Some(outcome) = &summary.outcome {
            writeln!(out, "Result: {}", outcome)?;
        }
    }
    Ok(())
}

/// Lists legal moves in SAN, or the legal targets of the piece on `square`.
pub fn run_moves(
    out: &mut impl Write,
    position: &Position,
    square: Option<&str>,
) -> anyhow::Result<()> {
    match square {
        Some(name) => {
            let Some(origin) = Square::from_algebraic(name) else {
                bail!("invalid square: {}", name);
            };
            let targets: Vec<String> = position
                .legal_targets_from(origin)
                .into_iter()
                .map(|sq| sq.to_algebraic())
                .collect();
            writeln!(out, "{}", targets.join(" "))?;
        }
        None => {
            let moves: Vec<String> = position
                .legal_moves()
                .as_slice()
                .iter()
                .map(|&mv| position.san(mv))
                .collect();
            writeln!(out, "{}", moves.join(" "))?;
        }
    }
    Ok(())
}

/// Parses every non-blank line of `text` as EPD and prints it back.
pub fn run_epd(out: &mut impl Write, text: &str) -> anyhow::Result<()> {
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let epd = Epd::parse(line).with_context(|| format!("line {}", index + 1))?;
        writeln!(out, "{}", epd.position.to_fen())?;
        for opcode in &epd.opcodes {
            writeln!(out, "  {}", opcode.to_epd(&epd.position))?;
        }
    }
    Ok(())
}
