use once_cell::sync::Lazy;
use regex::Regex;

use super::{PgnGame, PgnHeaders};

/// Blank line followed by an `[Event` tag; group 1 starts the next game.
static GAME_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*(\[Event\b)").unwrap());

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[\s*([A-Za-z0-9_]+)\s+"((?:[^"\\]|\\.)*)"\s*\]"#).unwrap()
});

static BRACE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r";[^\n]*").unwrap());

/// A parenthesized group with no parentheses inside it.
static INNERMOST_VARIATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^()]*\)").unwrap());

static BLACK_CONTINUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\.\.").unwrap());

static MOVE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.+").unwrap());

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Parse a single game chunk.
///
/// Fails only when the chunk carries neither a White nor an Event header.
pub fn parse_pgn(input: &str) -> Result<PgnGame, PgnError> {
    let chunk = input.trim();
    if chunk.is_empty() {
        return Err(PgnError::EmptyInput);
    }

    let mut headers = PgnHeaders::default();
    let mut movetext_start = 0;
    for caps in HEADER.captures_iter(chunk) {
        headers.insert(&caps[1], unescape(&caps[2]));
        if let Some(m) = caps.get(0) {
            movetext_start = m.end();
        }
    }

    if !headers.is_identifiable() {
        return Err(PgnError::MissingRequiredHeaders);
    }

    Ok(PgnGame {
        headers,
        moves: clean_movetext(&chunk[movetext_start..]),
        raw: chunk.to_string(),
    })
}

/// Parse every game in a text blob. Chunks that fail [`parse_pgn`] are skipped.
pub fn parse_pgn_collection(input: &str) -> Vec<PgnGame> {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    let chunks = split_games(&normalized);
    let total = chunks.len();

    let games: Vec<PgnGame> = chunks
        .into_iter()
        .filter_map(|chunk| parse_pgn(chunk).ok())
        .collect();

    if games.len() < total {
        tracing::debug!(
            parsed = games.len(),
            dropped = total - games.len(),
            "Dropped malformed game chunks"
        );
    }
    games
}

/// Split newline-normalized text into game-sized chunks at each blank line
/// that is followed by an `[Event` tag.
pub fn split_games(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for caps in GAME_BOUNDARY.captures_iter(text) {
        if let Some(next) = caps.get(1) {
            chunks.push(&text[start..next.start()]);
            start = next.start();
        }
    }
    chunks.push(&text[start..]);

    chunks
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Reduce movetext to the main line's SAN tokens.
pub fn clean_movetext(movetext: &str) -> Vec<String> {
    let text = BRACE_COMMENT.replace_all(movetext, " ");
    let mut text = LINE_COMMENT.replace_all(&text, " ").into_owned();

    // Peel variations from the inside out until none are left
    loop {
        let stripped = INNERMOST_VARIATION.replace_all(&text, " ");
        if stripped.len() == text.len() {
            break;
        }
        text = stripped.into_owned();
    }

    let text = BLACK_CONTINUATION.replace_all(&text, " ");

    text.split_whitespace()
        .filter(|token| !RESULT_TOKENS.contains(token))
        .filter(|token| !is_nag(token))
        .map(|token| MOVE_NUMBER.replace(token, ""))
        .map(|token| token.trim_end_matches(['!', '?']).to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_nag(token: &str) -> bool {
    token
        .strip_prefix('$')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, thiserror::Error)]
pub enum PgnError {
    #[error("Empty game text")]
    EmptyInput,
    #[error("Game has neither a White nor an Event header")]
    MissingRequiredHeaders,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GAMES: &str = r#"[Event "Havana"]
[White "Capablanca"]
[Black "Lasker"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 1-0

[Event "St. Petersburg"]
[White "Lasker"]
[Black "Capablanca"]
[Result "0-1"]

1. d4 d5 0-1
"#;

    #[test]
    fn test_two_games_split() {
        let games = parse_pgn_collection(TWO_GAMES);
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].headers.event.as_deref(), Some("Havana"));
        assert_eq!(games[0].headers.white.as_deref(), Some("Capablanca"));
        assert_eq!(games[0].moves, vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(games[1].headers.event.as_deref(), Some("St. Petersburg"));
        assert_eq!(games[1].headers.white.as_deref(), Some("Lasker"));
        assert_eq!(games[1].moves, vec!["d4", "d5"]);
        assert!(games[1].raw.starts_with("[Event \"St. Petersburg\"]"));
    }

    #[test]
    fn test_crlf_input() {
        let games = parse_pgn_collection(&TWO_GAMES.replace('\n', "\r\n"));
        assert_eq!(games.len(), 2);
    }

    #[test]
    fn test_chunk_without_required_headers_dropped() {
        let text = "[Event \"A\"]\n[White \"X\"]\n\n1. e4 *\n\n[Event \"B\"]\n\n1. d4 *\n\n[Site \"nowhere\"]\n\n1. c4 *";
        // The third block has no Event tag so it stays attached to the second.
        let games = parse_pgn_collection(text);
        assert_eq!(games.len(), 2);

        assert!(matches!(
            parse_pgn("[Black \"Nobody\"]\n\n1. e4 *"),
            Err(PgnError::MissingRequiredHeaders)
        ));
        assert!(matches!(parse_pgn("   "), Err(PgnError::EmptyInput)));
    }

    #[test]
    fn test_comments_and_nested_variations_removed() {
        let moves = clean_movetext(
            "1. e4 {best by test} e5 (1... c5 2. Nf3 (2. c3 d5 (2... Nf6)) d6) 2. Nf3 ; a line comment\n2... Nc6 3. Bb5 $1 a6 *",
        );
        assert_eq!(moves, vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
    }

    #[test]
    fn test_annotation_glyphs_and_numbers_stripped() {
        let moves = clean_movetext("1.e4! e5?! 2.Nf3!! Nc6?? 3.Bb5+ $14 3...a6 1/2-1/2");
        assert_eq!(moves, vec!["e4", "e5", "Nf3", "Nc6", "Bb5+", "a6"]);
    }

    #[test]
    fn test_header_values_unescaped() {
        let game = parse_pgn(r#"[Event "The \"Immortal\" Game"] 1. e4 *"#).unwrap();
        assert_eq!(
            game.headers.event.as_deref(),
            Some("The \"Immortal\" Game")
        );
        assert_eq!(game.moves, vec!["e4"]);
    }

    #[test]
    fn test_extra_headers_kept_in_order() {
        let game = parse_pgn(
            "[White \"Tal\"]\n[WhiteElo \"2700\"]\n[TimeControl \"40/7200\"]\n\n1. e4 *",
        )
        .unwrap();
        assert_eq!(game.headers.get("WhiteElo"), Some("2700"));
        let extras: Vec<&str> = game.headers.extra.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(extras, vec!["WhiteElo", "TimeControl"]);
    }

    #[test]
    fn test_split_without_blank_line_keeps_one_chunk() {
        let text = "[Event \"A\"]\n1. e4 *\n[Event \"B\"]\n1. d4 *";
        assert_eq!(split_games(text).len(), 1);
    }
}
