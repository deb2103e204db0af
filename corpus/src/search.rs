//! Free-text game search over names, event, date and ECO.
//!
//! Every query word has to match (AND). A word matches a game when it is a
//! substring of the game's haystack, when its alias is, or when it is one
//! edit away from a haystack token. Typo tolerance only applies to words of
//! four or more characters.

use std::sync::Arc;

use crate::classify::alias_for;
use crate::game::{CategoryKind, Game};
use crate::store::CorpusStore;

/// Shortest query word that gets edit-distance matching.
pub const MIN_FUZZY_WORD_LEN: usize = 4;

/// Search the corpus.
///
/// `collection` and `category` narrow the candidates first. When browsing
/// the openings category with a specific opening selected, candidates come
/// straight from the opening index. An empty query returns every candidate.
pub fn search(
    store: &CorpusStore,
    query: &str,
    collection: Option<&str>,
    category: Option<CategoryKind>,
) -> Vec<Arc<Game>> {
    let words = query_words(query);

    let from_index = match (category, collection, store.opening_index()) {
        (Some(CategoryKind::Openings), Some(name), Some(index)) if index.contains(name) => {
            Some(index.games(name))
        }
        _ => None,
    };

    let matches = |game: &&Arc<Game>| words.iter().all(|w| word_matches(w, game.haystack()));

    match from_index {
        Some(games) => games.iter().filter(matches).cloned().collect(),
        None => store
            .games()
            .iter()
            .filter(|g| category.map_or(true, |c| g.category == c))
            .filter(|g| collection.map_or(true, |c| g.collection == c))
            .filter(matches)
            .cloned()
            .collect(),
    }
}

/// Lower-cased query words, split on whitespace and commas.
pub fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether one lower-case query word matches a haystack.
pub fn word_matches(word: &str, haystack: &str) -> bool {
    if haystack.contains(word) {
        return true;
    }

    if alias_for(word).is_some_and(|surname| haystack.contains(surname)) {
        return true;
    }

    if word.chars().count() < MIN_FUZZY_WORD_LEN {
        return false;
    }

    haystack
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .any(|token| within_one_edit(word, token))
}

/// True when `a` and `b` differ by at most one substitution, insertion or
/// deletion. Single pass; gives up at the second edit.
pub fn within_one_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > 1 {
        return false;
    }

    let (mut i, mut j) = (0, 0);
    let mut edits = 0;
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            i += 1;
            j += 1;
            continue;
        }

        edits += 1;
        if edits > 1 {
            return false;
        }
        match a.len().cmp(&b.len()) {
            std::cmp::Ordering::Greater => i += 1,
            std::cmp::Ordering::Less => j += 1,
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }

    // Whatever is left over on either side is one trailing insertion at most
    edits + (a.len() - i) + (b.len() - j) <= 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Collection;
    use chess::{PgnGame, PgnHeaders};

    fn game(white: &str, black: &str, event: &str, eco: &str, collection: &str, category: CategoryKind) -> Game {
        let mut headers = PgnHeaders::default();
        headers.insert("White", white.into());
        headers.insert("Black", black.into());
        headers.insert("Event", event.into());
        headers.insert("Date", "1960.01.01".into());
        headers.insert("ECO", eco.into());
        let pgn = PgnGame {
            headers,
            moves: vec![],
            raw: String::new(),
        };
        Game::from_pgn(pgn, collection, category)
    }

    fn corpus() -> CorpusStore {
        let mut store = CorpusStore::new();
        store.append_game(game("Fischer, Robert", "Spassky, Boris", "Reykjavik", "D59", "WC 1972", CategoryKind::Events));
        store.append_game(game("Tal, Mikhail", "Botvinnik, Mikhail", "Moscow", "B18", "WC 1960", CategoryKind::Events));
        store.append_game(game("Keres, Paul", "Fischer, Robert", "Curacao", "B97", "Candidates", CategoryKind::Events));
        store.append_game(game("Carlsen, Magnus", "Anand, Viswanathan", "Chennai", "C67", "Carlsen", CategoryKind::Players));
        store.add_collection(Collection {
            name: "Carlsen".into(),
            count: 1,
            category: CategoryKind::Players,
        });
        store
    }

    fn whites(games: &[Arc<Game>]) -> Vec<&str> {
        games.iter().map(|g| g.white.as_str()).collect()
    }

    #[test]
    fn test_within_one_edit() {
        assert!(within_one_edit("keres", "keres"));
        assert!(within_one_edit("keres", "kerez"));
        assert!(within_one_edit("keres", "kere"));
        assert!(within_one_edit("keres", "kerres"));
        assert!(within_one_edit("keres", "eres"));
        assert!(!within_one_edit("keres", "kares2"));
        assert!(!within_one_edit("keres", "karez"));
        assert!(!within_one_edit("keres", "ker"));
    }

    #[test]
    fn test_substring_match() {
        let store = corpus();
        assert_eq!(whites(&search(&store, "Fischer", None, None)), vec!["Fischer, Robert", "Keres, Paul"]);
    }

    #[test]
    fn test_all_words_must_match() {
        let store = corpus();
        let results = search(&store, "fischer, keres", None, None);
        assert_eq!(whites(&results), vec!["Keres, Paul"]);
        assert!(search(&store, "fischer carlsen", None, None).is_empty());
    }

    #[test]
    fn test_alias_matches_same_games_as_surname() {
        let store = corpus();
        let by_surname = search(&store, "Fischer", None, None);
        let by_alias = search(&store, "Bobby", None, None);
        assert_eq!(by_surname, by_alias);
    }

    #[test]
    fn test_typo_tolerance() {
        let store = corpus();
        assert_eq!(whites(&search(&store, "Kerez", None, None)), vec!["Keres, Paul"]);
        assert!(search(&store, "Kares2", None, None).is_empty());
    }

    #[test]
    fn test_short_words_skip_typo_matching() {
        let store = corpus();
        // "taq" is one edit from "tal" but too short to be fuzzy-matched
        assert!(search(&store, "taq", None, None).is_empty());
        assert_eq!(search(&store, "tal", None, None).len(), 1);
    }

    #[test]
    fn test_category_and_collection_filters() {
        let store = corpus();
        assert_eq!(search(&store, "", None, Some(CategoryKind::Events)).len(), 3);
        assert_eq!(search(&store, "", Some("WC 1960"), None).len(), 1);
        assert!(search(&store, "fischer", None, Some(CategoryKind::Players)).is_empty());
    }

    #[test]
    fn test_openings_fast_path_uses_index() {
        let mut store = corpus();
        store.build_opening_index();
        let results = search(&store, "", Some("Sicilian Defence"), Some(CategoryKind::Openings));
        assert_eq!(whites(&results), vec!["Keres, Paul"]);

        let results = search(&store, "keres", Some("Ruy Lopez"), Some(CategoryKind::Openings));
        assert!(results.is_empty());
    }

    #[test]
    fn test_eco_and_date_are_searchable() {
        let store = corpus();
        assert_eq!(search(&store, "b18", None, None).len(), 1);
        assert_eq!(search(&store, "1960", None, None).len(), 4);
    }

    #[test]
    fn test_empty_corpus_returns_empty() {
        let store = CorpusStore::new();
        assert!(search(&store, "anything", None, None).is_empty());
    }
}
