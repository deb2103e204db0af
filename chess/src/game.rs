use cozy_chess::{Board, Move};

use crate::fen::{format_fen, parse_fen, FenError};
use crate::pgn::san::{legal_moves, parse_san, SanError};

/// A board that stored games can be replayed against.
///
/// Implementations must reject moves they cannot apply by returning an
/// error, leaving the position unchanged.
pub trait RulesEngine {
    /// Return to the starting position.
    fn reset(&mut self);

    /// Apply one SAN move token.
    fn play(&mut self, san: &str) -> Result<(), SanError>;

    /// Current position as FEN.
    fn fen(&self) -> String;
}

/// Starting position of the replay
#[derive(Debug, Clone)]
pub enum StartPosition {
    Standard,
    Fen(String),
}

/// Rules engine backed by a cozy-chess Board
#[derive(Debug, Clone)]
pub struct ReplayBoard {
    start: Board,
    start_position: StartPosition,
    position: Board,
    applied: Vec<Move>,
}

impl ReplayBoard {
    /// Create a board at the standard starting position
    pub fn new() -> Self {
        Self {
            start: Board::default(),
            start_position: StartPosition::Standard,
            position: Board::default(),
            applied: Vec::new(),
        }
    }

    /// Create a board that resets to the given FEN
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let start = parse_fen(fen)?;
        Ok(Self {
            position: start.clone(),
            start,
            start_position: StartPosition::Fen(fen.to_string()),
            applied: Vec::new(),
        })
    }

    pub fn position(&self) -> &Board {
        &self.position
    }

    pub fn start_position(&self) -> &StartPosition {
        &self.start_position
    }

    /// Moves applied since the last reset
    pub fn applied(&self) -> &[Move] {
        &self.applied
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.position)
    }
}

impl RulesEngine for ReplayBoard {
    fn reset(&mut self) {
        self.position = self.start.clone();
        self.applied.clear();
    }

    fn play(&mut self, san: &str) -> Result<(), SanError> {
        let mv = parse_san(&self.position, san)?;
        // parse_san only returns legal moves
        self.position.play_unchecked(mv);
        self.applied.push(mv);
        Ok(())
    }

    fn fen(&self) -> String {
        format_fen(&self.position)
    }
}

impl Default for ReplayBoard {
    fn default() -> Self {
        Self::new()
    }
}
