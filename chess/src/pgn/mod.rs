pub mod parser;
pub mod san;

pub use parser::{clean_movetext, parse_pgn, parse_pgn_collection, split_games, PgnError};
pub use san::{legal_moves, parse_san, SanError};

/// A parsed PGN game
#[derive(Debug, Clone, PartialEq)]
pub struct PgnGame {
    pub headers: PgnHeaders,
    /// SAN move tokens of the main line, in play order
    pub moves: Vec<String>,
    /// The chunk of text this game was parsed from
    pub raw: String,
}

/// Header section of a game.
///
/// The tags used downstream get their own fields; everything else is kept in
/// `extra` in the order it appeared. Keys are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PgnHeaders {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub round: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub eco: Option<String>,
    pub opening: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl PgnHeaders {
    /// Set a header. A repeated key overwrites the earlier value.
    pub fn insert(&mut self, key: &str, value: String) {
        let slot = match key {
            "Event" => &mut self.event,
            "Site" => &mut self.site,
            "Date" => &mut self.date,
            "Round" => &mut self.round,
            "White" => &mut self.white,
            "Black" => &mut self.black,
            "Result" => &mut self.result,
            "ECO" => &mut self.eco,
            "Opening" => &mut self.opening,
            _ => {
                match self.extra.iter().position(|(k, _)| k == key) {
                    Some(pos) => self.extra[pos].1 = value,
                    None => self.extra.push((key.to_string(), value)),
                }
                return;
            }
        };
        *slot = Some(value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "Event" => self.event.as_deref(),
            "Site" => self.site.as_deref(),
            "Date" => self.date.as_deref(),
            "Round" => self.round.as_deref(),
            "White" => self.white.as_deref(),
            "Black" => self.black.as_deref(),
            "Result" => self.result.as_deref(),
            "ECO" => self.eco.as_deref(),
            "Opening" => self.opening.as_deref(),
            _ => self
                .extra
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// All headers, named fields first, then the extras in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let named = [
            ("Event", &self.event),
            ("Site", &self.site),
            ("Date", &self.date),
            ("Round", &self.round),
            ("White", &self.white),
            ("Black", &self.black),
            ("Result", &self.result),
            ("ECO", &self.eco),
            ("Opening", &self.opening),
        ];
        named
            .into_iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// A game needs at least a White or an Event header to be kept.
    pub fn is_identifiable(&self) -> bool {
        self.white.is_some() || self.event.is_some()
    }
}
