//! Chess rules collaborator for pgnshelf
//!
//! Wraps cozy-chess with the pieces the game library needs: PGN text
//! parsing, SAN move resolution, normalized FEN rendering and a replay
//! board that stored games can be stepped through.

pub mod fen;
pub mod game;
pub mod pgn;

pub use fen::{fen_prefix, format_fen, normalize_prefix, parse_fen, ply_from_fen, FenError};
pub use game::{ReplayBoard, RulesEngine, StartPosition};
pub use pgn::{parse_pgn, parse_pgn_collection, PgnError, PgnGame, PgnHeaders, SanError};
