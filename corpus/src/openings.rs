use std::collections::HashMap;
use std::sync::Arc;

use crate::game::{CategoryKind, Collection, Game};

/// Ordered, non-overlapping ECO ranges. Several ranges may share a name.
const ECO_RANGES: &[(&str, &str, &str)] = &[
    ("A00", "A00", "Irregular Openings"),
    ("A01", "A01", "Nimzo-Larsen Attack"),
    ("A02", "A03", "Bird's Opening"),
    ("A04", "A09", "Reti Opening"),
    ("A10", "A39", "English Opening"),
    ("A40", "A44", "Queen's Pawn Game"),
    ("A45", "A50", "Indian Game"),
    ("A51", "A52", "Budapest Gambit"),
    ("A53", "A55", "Old Indian Defence"),
    ("A56", "A56", "Benoni Defence"),
    ("A57", "A59", "Benko Gambit"),
    ("A60", "A79", "Modern Benoni"),
    ("A80", "A99", "Dutch Defence"),
    ("B00", "B00", "Uncommon King's Pawn"),
    ("B01", "B01", "Scandinavian Defence"),
    ("B02", "B05", "Alekhine's Defence"),
    ("B06", "B06", "Modern Defence"),
    ("B07", "B09", "Pirc Defence"),
    ("B10", "B19", "Caro-Kann Defence"),
    ("B20", "B99", "Sicilian Defence"),
    ("C00", "C19", "French Defence"),
    ("C20", "C20", "King's Pawn Game"),
    ("C21", "C22", "Centre Game"),
    ("C23", "C24", "Bishop's Opening"),
    ("C25", "C29", "Vienna Game"),
    ("C30", "C39", "King's Gambit"),
    ("C40", "C40", "King's Knight Opening"),
    ("C41", "C41", "Philidor Defence"),
    ("C42", "C43", "Petrov's Defence"),
    ("C44", "C45", "Scotch Game"),
    ("C46", "C46", "Three Knights Game"),
    ("C47", "C49", "Four Knights Game"),
    ("C50", "C54", "Italian Game"),
    ("C55", "C59", "Two Knights Defence"),
    ("C60", "C99", "Ruy Lopez"),
    ("D00", "D05", "Queen's Pawn Game"),
    ("D06", "D06", "Queen's Gambit"),
    ("D07", "D09", "Chigorin Defence"),
    ("D10", "D19", "Slav Defence"),
    ("D20", "D29", "Queen's Gambit Accepted"),
    ("D30", "D69", "Queen's Gambit Declined"),
    ("D70", "D99", "Grunfeld Defence"),
    ("E00", "E09", "Catalan Opening"),
    ("E10", "E10", "Queen's Pawn Game"),
    ("E11", "E11", "Bogo-Indian Defence"),
    ("E12", "E19", "Queen's Indian Defence"),
    ("E20", "E59", "Nimzo-Indian Defence"),
    ("E60", "E99", "King's Indian Defence"),
];

/// Opening name for an ECO code such as `B33`. Codes shorter than three
/// characters have no opening.
pub fn opening_for_eco(eco: &str) -> Option<&'static str> {
    let code: String = eco.trim().chars().take(3).collect::<String>().to_ascii_uppercase();
    if code.chars().count() < 3 {
        return None;
    }
    ECO_RANGES
        .iter()
        .find(|(low, high, _)| *low <= code.as_str() && code.as_str() <= *high)
        .map(|(_, _, name)| *name)
}

/// Games bucketed by opening name. Built in one pass; never updated in place.
#[derive(Debug, Clone, Default)]
pub struct OpeningIndex {
    buckets: HashMap<&'static str, Vec<Arc<Game>>>,
    indexed: usize,
}

impl OpeningIndex {
    pub fn build(games: &[Arc<Game>]) -> Self {
        let mut buckets: HashMap<&'static str, Vec<Arc<Game>>> = HashMap::new();
        let mut indexed = 0;
        for game in games {
            if let Some(name) = opening_for_eco(&game.eco) {
                buckets.entry(name).or_default().push(Arc::clone(game));
                indexed += 1;
            }
        }
        Self { buckets, indexed }
    }

    /// Games filed under an opening name. Unknown names yield an empty slice.
    pub fn games(&self, opening: &str) -> &[Arc<Game>] {
        self.buckets.get(opening).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, opening: &str) -> bool {
        self.buckets.contains_key(opening)
    }

    /// One pseudo-collection per opening, largest first.
    pub fn collections(&self) -> Vec<Collection> {
        let mut list: Vec<Collection> = self
            .buckets
            .iter()
            .map(|(name, games)| Collection {
                name: name.to_string(),
                count: games.len(),
                category: CategoryKind::Openings,
            })
            .collect();
        list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        list
    }

    /// Number of distinct openings.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of games that landed in some bucket.
    pub fn indexed_games(&self) -> usize {
        self.indexed
    }
}
