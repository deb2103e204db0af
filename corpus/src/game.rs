use chess::{PgnGame, PgnHeaders};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category a collection is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Players,
    Events,
    Openings,
    Imported,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 4] = [
        CategoryKind::Players,
        CategoryKind::Events,
        CategoryKind::Openings,
        CategoryKind::Imported,
    ];

    /// Stable id used to join games to their category.
    pub fn id(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::Events => "events",
            Self::Openings => "openings",
            Self::Imported => "imported",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Players => "Players",
            Self::Events => "Events",
            Self::Openings => "Openings",
            Self::Imported => "Imported",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for CategoryKind {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(&s.trim().to_ascii_lowercase()).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A parsed game tagged with where it came from. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub headers: PgnHeaders,
    pub white: String,
    pub black: String,
    pub event: String,
    pub date: String,
    pub result: String,
    pub eco: String,
    /// SAN tokens of the main line; only meaningful replayed in order
    pub moves: Vec<String>,
    pub raw: String,
    pub collection: String,
    pub category: CategoryKind,
    pub category_name: String,
    haystack: String,
}

impl Game {
    pub fn from_pgn(pgn: PgnGame, collection: &str, category: CategoryKind) -> Self {
        let PgnGame {
            headers,
            moves,
            raw,
        } = pgn;

        let field = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };
        let white = field(&headers.white, "?");
        let black = field(&headers.black, "?");
        let event = field(&headers.event, "");
        let date = field(&headers.date, "");
        let result = field(&headers.result, "*");
        let eco = field(&headers.eco, "");

        let haystack = [&white, &black, &event, &date, &eco]
            .iter()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            headers,
            white,
            black,
            event,
            date,
            result,
            eco,
            moves,
            raw,
            collection: collection.to_string(),
            category,
            category_name: category.display_name().to_string(),
            haystack,
        }
    }

    /// Lower-cased names, event, date and ECO, space separated.
    pub fn haystack(&self) -> &str {
        &self.haystack
    }

    /// Duplicate-detection key: `white|black|date|event|result`.
    pub fn fingerprint(&self) -> String {
        [&self.white, &self.black, &self.date, &self.event, &self.result]
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }
}

/// A named set of games sharing an import origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub count: usize,
    pub category: CategoryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryKind,
    pub name: String,
    pub collections: Vec<Collection>,
}

impl Category {
    pub fn new(id: CategoryKind) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            collections: Vec::new(),
        }
    }
}
