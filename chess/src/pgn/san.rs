use cozy_chess::{Board, Color, File, Move, Piece, Rank, Square};

/// Parse Standard Algebraic Notation (SAN) move against the given position.
///
/// The returned move is always legal in `board`. Castling is returned in
/// cozy-chess's king-takes-rook encoding.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let trimmed = san
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    if trimmed.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    match trimmed {
        "O-O" | "0-0" => return parse_castle(board, san, CastleSide::Short),
        "O-O-O" | "0-0-0" => return parse_castle(board, san, CastleSide::Long),
        _ => {}
    }

    let (body, promotion) = split_promotion(trimmed)?;

    let mut chars: Vec<char> = body
        .chars()
        .filter(|c| !matches!(c, 'x' | 'X' | '-' | ':'))
        .collect();

    let piece = match chars.first().copied().and_then(piece_from_char) {
        Some(piece) => {
            chars.remove(0);
            piece
        }
        None => Piece::Pawn,
    };

    if chars.len() < 2 {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let split = chars.len() - 2;
    let dest = parse_square(chars[split], chars[split + 1])?;

    let mut file_hint = None;
    let mut rank_hint = None;
    for &c in &chars[..split] {
        match c {
            'a'..='h' => file_hint = Some(parse_file(c)?),
            '1'..='8' => rank_hint = Some(parse_rank(c)?),
            _ => return Err(SanError::InvalidFormat(san.to_string())),
        }
    }

    let us = board.side_to_move();
    let mut candidates = legal_moves(board).into_iter().filter(|mv| {
        mv.to == dest
            && mv.promotion == promotion
            && board.piece_on(mv.from) == Some(piece)
            // cozy-chess encodes castling as the king capturing its own rook
            && board.color_on(mv.to) != Some(us)
            && file_hint.map_or(true, |f| mv.from.file() == f)
            && rank_hint.map_or(true, |r| mv.from.rank() == r)
    });

    match (candidates.next(), candidates.next()) {
        (Some(mv), None) => Ok(mv),
        (Some(_), Some(_)) => Err(SanError::AmbiguousMove(san.to_string())),
        (None, _) => Err(SanError::NoLegalMove(san.to_string())),
    }
}

/// All legal moves in the position.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

#[derive(Debug, Clone, Copy)]
enum CastleSide {
    Short,
    Long,
}

fn parse_castle(board: &Board, san: &str, side: CastleSide) -> Result<Move, SanError> {
    let us = board.side_to_move();
    let rights = board.castle_rights(us);
    let rook_file = match side {
        CastleSide::Short => rights.short,
        CastleSide::Long => rights.long,
    }
    .ok_or_else(|| SanError::NoLegalMove(san.to_string()))?;

    let back_rank = match us {
        Color::White => Rank::First,
        Color::Black => Rank::Eighth,
    };
    let mv = Move {
        from: board.king(us),
        to: Square::new(rook_file, back_rank),
        promotion: None,
    };

    if legal_moves(board).contains(&mv) {
        Ok(mv)
    } else {
        Err(SanError::NoLegalMove(san.to_string()))
    }
}

/// Split `e8=Q` / `e8Q` into the move body and the promotion piece.
fn split_promotion(san: &str) -> Result<(&str, Option<Piece>), SanError> {
    if let Some((body, promo)) = san.split_once('=') {
        let mut promo_chars = promo.chars();
        let piece = match (promo_chars.next(), promo_chars.next()) {
            (Some(c), None) => promotion_from_char(c)
                .ok_or_else(|| SanError::InvalidPromotion(promo.to_string()))?,
            _ => return Err(SanError::InvalidPromotion(promo.to_string())),
        };
        return Ok((body, Some(piece)));
    }

    let bytes = san.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_lowercase() {
        let last = bytes[bytes.len() - 1] as char;
        let before = bytes[bytes.len() - 2];
        if matches!(before, b'1' | b'8') {
            if let Some(piece) = promotion_from_char(last) {
                return Ok((&san[..san.len() - 1], Some(piece)));
            }
        }
    }

    Ok((san, None))
}

fn piece_from_char(c: char) -> Option<Piece> {
    match c {
        'K' => Some(Piece::King),
        'Q' => Some(Piece::Queen),
        'R' => Some(Piece::Rook),
        'B' => Some(Piece::Bishop),
        'N' => Some(Piece::Knight),
        _ => None,
    }
}

fn promotion_from_char(c: char) -> Option<Piece> {
    match c.to_ascii_uppercase() {
        'Q' => Some(Piece::Queen),
        'R' => Some(Piece::Rook),
        'B' => Some(Piece::Bishop),
        'N' => Some(Piece::Knight),
        _ => None,
    }
}

fn parse_square(file: char, rank: char) -> Result<Square, SanError> {
    let file = parse_file(file).map_err(|_| SanError::InvalidSquare(format!("{file}{rank}")))?;
    let rank = parse_rank(rank).map_err(|_| SanError::InvalidSquare(format!("{file}{rank}")))?;
    Ok(Square::new(file, rank))
}

fn parse_file(c: char) -> Result<File, SanError> {
    match c {
        'a'..='h' => Ok(File::ALL[(c as u8 - b'a') as usize]),
        _ => Err(SanError::InvalidFile(c)),
    }
}

fn parse_rank(c: char) -> Result<Rank, SanError> {
    match c {
        '1'..='8' => Ok(Rank::ALL[(c as u8 - b'1') as usize]),
        _ => Err(SanError::InvalidRank(c)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid file: {0}")]
    InvalidFile(char),
    #[error("Invalid rank: {0}")]
    InvalidRank(char),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}
