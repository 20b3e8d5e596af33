//! EPD (Extended Position Description) records.
//!
//! An EPD line holds the first four FEN fields followed by operations, each
//! an opcode and its operands terminated by a semicolon:
//!
//! ```text
//! 1k1r4/pp1b1R2/3q2pp/4p3/2B5/4Q3/PPP2B2/2K5 b - - bm Qd1+; id "BK.01";
//! ```
//!
//! Move operands are SAN and are resolved against the record's position.

use std::fmt;
use std::str::FromStr;

use chess_core::{Fen, FenError, Move};
use thiserror::Error;

use crate::san::san_to_move;
use crate::Position;

/// Errors that can occur when parsing EPD records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EpdError {
    #[error("EPD record needs four position fields")]
    MissingFields,

    #[error("invalid EPD position: {0}")]
    InvalidPosition(#[from] FenError),

    #[error("invalid EPD opcode: {0}")]
    InvalidOpcode(String),
}

/// One EPD operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    /// `acd`: analysis depth in plies.
    AnalysisDepth(u32),
    /// `acn`: analysis node count.
    AnalysisNodes(u64),
    /// `acs`: analysis time in seconds.
    AnalysisSeconds(u64),
    /// `bm`: best moves.
    BestMoves(Vec<Move>),
    /// `am`: moves to avoid.
    AvoidMoves(Vec<Move>),
    /// `ce`: centipawn evaluation from the side to move's point of view.
    CentipawnEvaluation(i32),
    /// `dm`: mate in this many full moves.
    DirectMate(u32),
    /// `c0` to `c9`: numbered comments.
    Comment(u8, String),
    /// `eco`: ECO opening code.
    Eco(String),
    /// `id`: position identifier.
    Id(String),
    /// `nic`: New In Chess opening code.
    Nic(String),
    /// `pm`: predicted move.
    PredictedMove(Move),
    /// `pv`: predicted variation, each move played after the previous one.
    PredictedVariation(Vec<Move>),
    /// `rc`: repetition count.
    RepetitionCount(u32),
    /// Any other opcode, kept verbatim.
    Other { name: String, operands: Vec<String> },
}

impl Opcode {
    /// Returns the opcode mnemonic.
    pub fn name(&self) -> String {
        let name = match self {
            Opcode::AnalysisDepth(_) => "acd",
            Opcode::AnalysisNodes(_) => "acn",
            Opcode::AnalysisSeconds(_) => "acs",
            Opcode::BestMoves(_) => "bm",
            Opcode::AvoidMoves(_) => "am",
            Opcode::CentipawnEvaluation(_) => "ce",
            Opcode::DirectMate(_) => "dm",
            Opcode::Comment(n, _) => return format!("c{}", n),
            Opcode::Eco(_) => "eco",
            Opcode::Id(_) => "id",
            Opcode::Nic(_) => "nic",
            Opcode::PredictedMove(_) => "pm",
            Opcode::PredictedVariation(_) => "pv",
            Opcode::RepetitionCount(_) => "rc",
            Opcode::Other { name, .. } => return name.clone(),
        };
        name.to_string()
    }

    fn parse(name: &str, operands: &[String], position: &Position) -> Result<Self, EpdError> {
        let invalid = || EpdError::InvalidOpcode(format!("{} {}", name, operands.join(" ")));

        let opcode = match name {
            "acd" => Opcode::AnalysisDepth(number_operand(operands).ok_or_else(invalid)?),
            "acn" => Opcode::AnalysisNodes(number_operand(operands).ok_or_else(invalid)?),
            "acs" => Opcode::AnalysisSeconds(number_operand(operands).ok_or_else(invalid)?),
            "ce" => Opcode::CentipawnEvaluation(number_operand(operands).ok_or_else(invalid)?),
            "dm" => Opcode::DirectMate(number_operand(operands).ok_or_else(invalid)?),
            "rc" => Opcode::RepetitionCount(number_operand(operands).ok_or_else(invalid)?),
            "eco" => Opcode::Eco(text_operand(operands).ok_or_else(invalid)?),
            "id" => Opcode::Id(text_operand(operands).ok_or_else(invalid)?),
            "nic" => Opcode::Nic(text_operand(operands).ok_or_else(invalid)?),
            "bm" | "am" => {
                if operands.is_empty() {
                    return Err(invalid());
                }
                let moves = operands
                    .iter()
                    .map(|san| resolve(name, san, position))
                    .collect::<Result<Vec<_>, _>>()?;
                if name == "bm" {
                    Opcode::BestMoves(moves)
                } else {
                    Opcode::AvoidMoves(moves)
                }
            }
            "pm" => {
                let san = single_operand(operands).ok_or_else(invalid)?;
                Opcode::PredictedMove(resolve(name, san, position)?)
            }
            "pv" => {
                if operands.is_empty() {
                    return Err(invalid());
                }
                let mut current = position.clone();
                let mut moves = Vec::with_capacity(operands.len());
                for san in operands {
                    let mv = resolve(name, san, &current)?;
                    current = current.play(mv);
                    moves.push(mv);
                }
                Opcode::PredictedVariation(moves)
            }
            _ => match comment_number(name) {
                Some(n) => Opcode::Comment(n, text_operand(operands).ok_or_else(invalid)?),
                None => Opcode::Other {
                    name: name.to_string(),
                    operands: operands.to_vec(),
                },
            },
        };
        Ok(opcode)
    }

    /// Serializes this operation, including its terminating semicolon.
    ///
    /// Moves are written as SAN relative to `position`.
    pub fn to_epd(&self, position: &Position) -> String {
        let operands: Vec<String> = match self {
            Opcode::AnalysisDepth(n) | Opcode::DirectMate(n) | Opcode::RepetitionCount(n) => {
                vec![n.to_string()]
            }
            Opcode::AnalysisNodes(n) | Opcode::AnalysisSeconds(n) => vec![n.to_string()],
            Opcode::CentipawnEvaluation(n) => vec![n.to_string()],
            Opcode::BestMoves(moves) | Opcode::AvoidMoves(moves) => {
                moves.iter().map(|&mv| position.san(mv)).collect()
            }
            Opcode::PredictedMove(mv) => vec![position.san(*mv)],
            Opcode::PredictedVariation(moves) => {
                let mut current = position.clone();
                moves
                    .iter()
                    .map(|&mv| {
                        let record = current.execute(mv);
                        current = record.position;
                        record.san
                    })
                    .collect()
            }
            Opcode::Comment(_, s) | Opcode::Eco(s) | Opcode::Id(s) | Opcode::Nic(s) => {
                vec![quote(s)]
            }
            Opcode::Other { operands, .. } => operands
                .iter()
                .map(|operand| {
                    if operand.is_empty()
                        || operand.contains(char::is_whitespace)
                        || operand.contains(';')
                    {
                        quote(operand)
                    } else {
                        operand.clone()
                    }
                })
                .collect(),
        };

        let mut out = self.name();
        for operand in operands {
            out.push(' ');
            out.push_str(&operand);
        }
        out.push(';');
        out
    }
}

fn single_operand(operands: &[String]) -> Option<&str> {
    match operands {
        [operand] => Some(operand.as_str()),
        _ => None,
    }
}

fn number_operand<T: FromStr>(operands: &[String]) -> Option<T> {
    single_operand(operands)?.parse().ok()
}

fn text_operand(operands: &[String]) -> Option<String> {
    single_operand(operands).map(str::to_string)
}

fn comment_number(name: &str) -> Option<u8> {
    let digit = name.strip_prefix('c')?;
    match digit.as_bytes() {
        [d @ b'0'..=b'9'] => Some(d - b'0'),
        _ => None,
    }
}

fn resolve(name: &str, san: &str, position: &Position) -> Result<Move, EpdError> {
    san_to_move(position, san)
        .map_err(|e| EpdError::InvalidOpcode(format!("{} {}: {}", name, san, e)))
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s)
}

/// A parsed EPD record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Epd {
    /// The described position. Its clocks are 0 and 1.
    pub position: Position,
    /// The operations, in the order they were written.
    pub opcodes: Vec<Opcode>,
}

impl Epd {
    /// Creates a record from a position and its operations.
    pub fn new(position: Position, opcodes: Vec<Opcode>) -> Self {
        Epd { position, opcodes }
    }

    /// Parses one EPD line.
    ///
    /// # Errors
    ///
    /// Returns [`EpdError::MissingFields`] when fewer than four position
    /// fields are present, [`EpdError::InvalidPosition`] when they do not
    /// describe a position, and [`EpdError::InvalidOpcode`] for a malformed
    /// or unterminated operation or an unresolvable move.
    pub fn parse(line: &str) -> Result<Self, EpdError> {
        let mut rest = line.trim();
        let mut fields = Vec::with_capacity(4);
        for _ in 0..4 {
            if rest.is_empty() {
                return Err(EpdError::MissingFields);
            }
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            fields.push(&rest[..end]);
            rest = rest[end..].trim_start();
        }

        let fen = Fen::from_parts(fields[0], fields[1], fields[2], fields[3], "0", "1")?;
        let position = Position::from_fen_record(&fen)?;

        let opcodes = operations(rest)?
            .into_iter()
            .map(|tokens| match tokens.split_first() {
                Some((name, operands)) => Opcode::parse(name, operands, &position),
                None => Err(EpdError::InvalidOpcode(";".to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Epd { position, opcodes })
    }

    /// Returns the first operation with the given mnemonic.
    pub fn opcode(&self, name: &str) -> Option<&Opcode> {
        self.opcodes.iter().find(|op| op.name() == name)
    }

    /// Returns the `id` operand, if present.
    pub fn id(&self) -> Option<&str> {
        self.opcodes.iter().find_map(|op| match op {
            Opcode::Id(id) => Some(id.as_str()),
            _ => None,
        })
    }
}

/// Splits operation text into token lists, one per `;`-terminated operation.
fn operations(text: &str) -> Result<Vec<Vec<String>>, EpdError> {
    let mut operations = Vec::new();
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ';' => {
                chars.next();
                operations.push(std::mem::take(&mut tokens));
            }
            '"' => {
                chars.next();
                let mut quoted = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(c) => quoted.push(c),
                        None => {
                            return Err(EpdError::InvalidOpcode(format!(
                                "unterminated string in {}",
                                text
                            )))
                        }
                    }
                }
                tokens.push(quoted);
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == ';' || c == '"' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(word);
            }
        }
    }

    if !tokens.is_empty() {
        return Err(EpdError::InvalidOpcode(format!("missing ';' after {}", tokens.join(" "))));
    }
    Ok(operations)
}

impl FromStr for Epd {
    type Err = EpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Epd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fen = self.position.to_fen_record();
        let en_passant = fen
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic());
        write!(
            f,
            "{} {} {} {}",
            fen.piece_placement,
            fen.active_color.to_fen_char(),
            fen.castling,
            en_passant
        )?;
        for opcode in &self.opcodes {
            write!(f, " {}", opcode.to_epd(&self.position))?;
        }
        Ok(())
    }
}
