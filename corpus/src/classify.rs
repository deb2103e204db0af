//! Heuristic category labels for collections, plus the nickname aliases
//! used by text search.

use crate::game::CategoryKind;

/// Surnames too short for substring matching ("tal" hides in "total").
/// Only an exact match on the whole name counts.
const SHORT_PLAYER_NAMES: &[&str] = &["tal", "so", "ding", "giri", "mvl", "wei yi"];

const PLAYER_SURNAMES: &[&str] = &[
    "carlsen",
    "fischer",
    "kasparov",
    "karpov",
    "capablanca",
    "alekhine",
    "morphy",
    "anand",
    "kramnik",
    "botvinnik",
    "petrosian",
    "spassky",
    "smyslov",
    "steinitz",
    "lasker",
    "euwe",
    "nakamura",
    "caruana",
    "firouzja",
    "nepomniachtchi",
    "keres",
    "rubinstein",
    "nimzowitsch",
    "polgar",
    "korchnoi",
    "bronstein",
    "topalov",
    "aronian",
    "gukesh",
    "praggnanandhaa",
    "tarrasch",
    "pillsbury",
    "marshall",
    "larsen",
];

const EVENT_KEYWORDS: &[&str] = &[
    "olympiad",
    "championship",
    "candidates",
    "tournament",
    "world cup",
    "memorial",
    "tata steel",
    "wijk aan zee",
    "linares",
    "sinquefield",
    "norway chess",
    "grand prix",
    "grand tour",
    "match",
    "invitational",
    "congress",
    "blitz",
    "rapid",
];

const OPENING_KEYWORDS: &[&str] = &[
    "sicilian",
    "french",
    "caro-kann",
    "caro kann",
    "ruy lopez",
    "spanish",
    "italian",
    "king's indian",
    "kings indian",
    "queen's gambit",
    "queens gambit",
    "nimzo",
    "grunfeld",
    "grünfeld",
    "slav",
    "dutch",
    "english",
    "catalan",
    "london",
    "pirc",
    "scandinavian",
    "benoni",
    "benko",
    "petrov",
    "petroff",
    "scotch",
    "vienna",
    "gambit",
    "defense",
    "defence",
    "opening",
];

/// Nickname or first name to canonical surname.
const ALIASES: &[(&str, &str)] = &[
    ("bobby", "fischer"),
    ("magnus", "carlsen"),
    ("garry", "kasparov"),
    ("gary", "kasparov"),
    ("anatoly", "karpov"),
    ("misha", "tal"),
    ("mikhail", "tal"),
    ("capa", "capablanca"),
    ("vishy", "anand"),
    ("hikaru", "nakamura"),
    ("fabi", "caruana"),
    ("fabiano", "caruana"),
    ("nepo", "nepomniachtchi"),
    ("ian", "nepomniachtchi"),
    ("alireza", "firouzja"),
    ("judit", "polgar"),
    ("boris", "spassky"),
    ("tigran", "petrosian"),
    ("paul", "morphy"),
    ("vlad", "kramnik"),
    ("pragg", "praggnanandhaa"),
];

/// Label a collection by its name.
///
/// Priority: exact short player names, player surnames, event keywords,
/// opening keywords. Anything else is `Imported`.
pub fn detect_category(name: &str) -> CategoryKind {
    let name = name.trim().to_lowercase();

    if SHORT_PLAYER_NAMES.iter().any(|short| *short == name) {
        return CategoryKind::Players;
    }

    let contains_any = |words: &[&str]| words.iter().any(|w| name.contains(w));

    if contains_any(PLAYER_SURNAMES) {
        CategoryKind::Players
    } else if contains_any(EVENT_KEYWORDS) {
        CategoryKind::Events
    } else if contains_any(OPENING_KEYWORDS) {
        CategoryKind::Openings
    } else {
        CategoryKind::Imported
    }
}

/// Canonical surname for a lower-case nickname, if one is known.
pub fn alias_for(word: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == word)
        .map(|(_, surname)| *surname)
}
