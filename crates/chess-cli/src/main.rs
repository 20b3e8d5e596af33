//! Command-line front end for the chess rules engine.
//!
//! Runs perft counts, replays SAN move lists, lists legal moves and
//! validates EPD files.

mod commands;
mod config;

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use chess_engine::Position;
use clap::{Parser, Subcommand};
use config::ChessConfig;

#[derive(Parser)]
#[command(name = "chess")]
#[command(about = "Chess rules engine tools")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count leaf nodes of the legal move tree
    Perft {
        /// Starting position in FEN
        #[arg(long)]
        fen: Option<String>,
        /// Search depth in plies
        #[arg(short, long)]
        depth: Option<u32>,
        /// Print the count below each root move
        #[arg(long)]
        divide: bool,
    },
    /// Play a list of SAN moves and report the resulting position
    Play {
        /// Starting position in FEN
        #[arg(long)]
        fen: Option<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Moves in SAN, e.g. `e4 e5 Nf3`
        moves: Vec<String>,
    },
    /// List legal moves
    Moves {
        /// Position in FEN
        #[arg(long)]
        fen: Option<String>,
        /// Only list targets of the piece on this square
        #[arg(long)]
        square: Option<String>,
    },
    /// Parse and echo an EPD file
    Epd {
        /// EPD file, one record per line
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ChessConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(cli.log_level.as_deref().or(config.log_level.as_deref()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Perft { fen, depth, divide } => {
            let position = start_position(fen.as_deref(), &config)?;
            let depth = depth.unwrap_or(config.perft_depth);
            tracing::info!(depth, divide, "running perft");
            commands::run_perft(&mut out, &position, depth, divide)
        }
        Commands::Play { fen, json, moves } => {
            let position = start_position(fen.as_deref(), &config)?;
            commands::run_play(&mut out, position, &moves, json)
        }
        Commands::Moves { fen, square } => {
            let position = start_position(fen.as_deref(), &config)?;
            commands::run_moves(&mut out, &position, square.as_deref())
        }
        Commands::Epd { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            commands::run_epd(&mut out, &text)
        }
    }
}

fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    let level = match level {
        Some(name) => tracing::Level::from_str(name)
            .map_err(|_| anyhow::anyhow!("invalid log level: {}", name))?,
        None => tracing::Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

/// Position from `--fen`, else the configured start FEN, else the initial position.
fn start_position(fen: Option<&str>, config: &ChessConfig) -> anyhow::Result<Position> {
    match fen.or(config.start_fen.as_deref()) {
        Some(fen) => Position::from_fen(fen).with_context(|| format!("invalid FEN: {}", fen)),
        None => Ok(Position::startpos()),
    }
}
