use cozy_chess::{Board, Color, Piece, Rank, Square};

use crate::pgn::san::legal_moves;

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(FenError::InvalidFormat);
    }

    // cozy-chess wants all six fields; fill in the counters when a bare prefix is given
    let full = match parts.len() {
        4 => format!("{} 0 1", parts.join(" ")),
        5 => format!("{} 1", parts.join(" ")),
        _ => parts.join(" "),
    };

    if let Ok(board) = full.parse::<Board>() {
        return Ok(board);
    }

    // Some writers set the en-passant square after every double push; retry without it
    if parts[3] != "-" {
        let mut fields: Vec<&str> = full.split(' ').collect();
        fields[3] = "-";
        if let Ok(board) = fields.join(" ").parse::<Board>() {
            return Ok(board);
        }
    }

    Err(FenError::InvalidBoardLayout)
}

/// Format a Board as a FEN string.
///
/// The en-passant field is written only when an en-passant capture is
/// actually legal, so positions reached by different move orders render
/// identically.
pub fn format_fen(board: &Board) -> String {
    let rendered = board.to_string();
    let mut fields: Vec<&str> = rendered.split_whitespace().collect();
    let ep = legal_en_passant(board).map(|sq| sq.to_string());
    if fields.len() >= 4 {
        fields[3] = ep.as_deref().unwrap_or("-");
    }
    fields.join(" ")
}

/// The first four space-delimited fields of a FEN: board, side to move,
/// castling rights and en-passant target.
pub fn fen_prefix(fen: &str) -> Option<String> {
    let fields: Vec<&str> = fen.split_whitespace().take(4).collect();
    if fields.len() < 4 {
        return None;
    }
    Some(fields.join(" "))
}

/// Normalized position key for a FEN.
///
/// Valid positions are re-rendered through [`format_fen`]; anything cozy-chess
/// refuses falls back to the raw prefix.
pub fn normalize_prefix(fen: &str) -> Option<String> {
    match parse_fen(fen) {
        Ok(board) => fen_prefix(&format_fen(&board)),
        Err(_) => fen_prefix(fen),
    }
}

/// Ply count implied by the side-to-move and full-move fields.
///
/// A missing or unparsable full-move number counts as move 1. Returns
/// `None` when the side to move is unknown or the ply does not fit.
pub fn ply_from_fen(fen: &str) -> Option<usize> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let black_to_move = match fields.get(1).copied() {
        Some("w") => false,
        Some("b") => true,
        _ => return None,
    };
    let fullmove = fields
        .get(5)
        .and_then(|f| f.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    (fullmove - 1)
        .checked_mul(2)?
        .checked_add(usize::from(black_to_move))
}

fn legal_en_passant(board: &Board) -> Option<Square> {
    let file = board.en_passant()?;
    let rank = match board.side_to_move() {
        Color::White => Rank::Sixth,
        Color::Black => Rank::Third,
    };
    let target = Square::new(file, rank);
    legal_moves(board)
        .into_iter()
        .any(|mv| mv.to == target && board.piece_on(mv.from) == Some(Piece::Pawn))
        .then_some(target)
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
    #[error("Invalid board layout")]
    InvalidBoardLayout,
}
