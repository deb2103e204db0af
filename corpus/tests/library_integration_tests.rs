//! End-to-end behaviour of the library: import, search, position search
//! and restore across restarts.

use corpus::{
    detect_category, CategoryKind, CorpusStore, JsonKvStore, Library, LibraryOptions,
    MemoryKvStore,
};

const TWO_GAMES: &str = r#"[Event "Vienna 1922"]
[White "Rubinstein, Akiba"]
[Black "Tartakower, Savielly"]
[Date "1922.11.13"]
[Result "1-0"]
[ECO "D46"]

1. d4 d5 2. Nf3 Nf6 3. c4 e6 {a comment (with parens)} 4. Nc3 c6 (4... Be7 5. Bg5) 1-0

[Event "Havana 1966"]
[White "Fischer, Robert"]
[Black "Najdorf, Miguel"]
[Date "1966.11.04"]
[Result "1/2-1/2"]
[ECO "B20"]

1. e4 c5 2. Nf3 d6 3. d4 cxd4 1/2-1/2
"#;

const TRANSPOSED: &str = r#"[Event "Blitz"]
[White "Keres, Paul"]
[Black "Smyslov, Vassily"]
[ECO "A04"]

1. Nf3 c5 2. e4 Nc6 *
"#;

const SICILIAN_AFTER_NF3: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";

fn memory_library() -> Library {
    Library::new(Box::new(MemoryKvStore::new()), LibraryOptions::default())
}

#[test]
fn two_games_are_parsed_with_separate_headers() {
    let mut lib = memory_library();
    let summary = lib.import_all_games(TWO_GAMES, "Club Archive", false);
    assert_eq!(summary.imported, 2);

    let games = lib.store().games();
    assert_eq!(games[0].white, "Rubinstein, Akiba");
    assert_eq!(games[0].result, "1-0");
    assert_eq!(
        games[0].moves,
        vec!["d4", "d5", "Nf3", "Nf6", "c4", "e6", "Nc3", "c6"]
    );
    assert_eq!(games[1].white, "Fischer, Robert");
    assert_eq!(games[1].eco, "B20");
    assert_eq!(games[1].event, "Havana 1966");
}

#[test]
fn dedup_reimport_counts_everything_as_duplicate() {
    let mut lib = memory_library();
    let first = lib.import_all_games(TWO_GAMES, "Club Archive", true);
    let second = lib.import_all_games(TWO_GAMES, "Club Archive", true);

    assert_eq!(second.imported, 0);
    assert_eq!(second.duplicates, first.imported);
    assert_eq!(lib.store().len(), 2);
}

#[test]
fn alias_and_surname_find_the_same_games() {
    let mut lib = memory_library();
    lib.import_all_games(TWO_GAMES, "Club Archive", false);

    let by_surname = lib.search("Fischer", None, "");
    let by_alias = lib.search("Bobby", None, "");
    assert_eq!(by_surname.len(), 1);
    assert_eq!(by_surname, by_alias);
}

#[test]
fn typo_in_long_word_still_matches() {
    let mut lib = memory_library();
    lib.import_all_games(TRANSPOSED, "Club Archive", false);
    assert_eq!(lib.search("Kerez", None, "").len(), 1);
    assert!(lib.search("Kares2", None, "").is_empty());
}

#[tokio::test]
async fn position_search_finds_transpositions_in_both_modes() {
    let mut lib = memory_library();
    lib.import_all_games(TWO_GAMES, "Club Archive", false);
    lib.import_all_games(TRANSPOSED, "Blitz Night", false);

    let blocking = lib.filter_by_position(SICILIAN_AFTER_NF3);
    let whites: Vec<&str> = blocking.iter().map(|g| g.white.as_str()).collect();
    assert_eq!(whites, vec!["Fischer, Robert", "Keres, Paul"]);

    assert_eq!(lib.count_by_position_async(SICILIAN_AFTER_NF3).await, 2);
    let chunked = lib.filter_by_position_async(SICILIAN_AFTER_NF3).await;
    assert_eq!(chunked, blocking);
}

#[tokio::test]
async fn import_after_search_is_visible() {
    let mut lib = memory_library();
    lib.import_all_games(TWO_GAMES, "Club Archive", false);
    assert_eq!(lib.count_by_position_async(SICILIAN_AFTER_NF3).await, 1);
    assert_eq!(lib.store().position_cache().len(), 1);

    lib.import_all_games(TRANSPOSED, "Blitz Night", false);
    assert!(lib.store().position_cache().is_empty());
    assert_eq!(lib.count_by_position_async(SICILIAN_AFTER_NF3).await, 2);
}

#[test]
fn position_cache_evicts_oldest_inserted() {
    let mut store = CorpusStore::new();
    let cache = store.position_cache_mut();
    for i in 0..200 {
        cache.insert(format!("key-{i}"), Vec::new());
    }
    // Reading the first entry does not protect it
    assert!(cache.get("key-0").is_some());

    let evicted = cache.insert("key-200".to_string(), Vec::new());
    assert_eq!(evicted.as_deref(), Some("key-0"));
    assert_eq!(cache.len(), 200);
    assert!(cache.get("key-1").is_some());
}

#[test]
fn category_detection_examples() {
    assert_eq!(detect_category("Magnus Carlsen Best Games"), CategoryKind::Players);
    assert_eq!(detect_category("Sicilian Defense Masterclass"), CategoryKind::Openings);
    assert_eq!(detect_category("Random Club Games"), CategoryKind::Imported);
    assert_eq!(detect_category("Candidates 2024"), CategoryKind::Events);
}

#[test]
fn opening_index_serves_openings_category() {
    let mut lib = memory_library();
    lib.import_all_games(TWO_GAMES, "Club Archive", false);
    lib.build_opening_index();

    let names: Vec<String> = lib
        .get_collections_for_category("openings")
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert!(names.contains(&"Sicilian Defence".to_string()));

    let sicilians = lib.search("", Some("Sicilian Defence"), "openings");
    assert_eq!(sicilians.len(), 1);
    assert_eq!(sicilians[0].black, "Najdorf, Miguel");
}

#[test]
fn collections_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let kv = JsonKvStore::new(dir.path().to_path_buf());
        let mut lib = Library::new(Box::new(kv), LibraryOptions::default());
        lib.import_all_games(TWO_GAMES, "Club Archive", true);
        lib.import_all_games(TRANSPOSED, "Fischer Files", false);
    }

    let kv = JsonKvStore::new(dir.path().to_path_buf());
    let mut lib = Library::new(Box::new(kv), LibraryOptions::default());
    assert_eq!(lib.load_collections(), 2);
    assert_eq!(lib.store().len(), 3);
    assert_eq!(
        lib.get_collections_for_category("players")[0].name,
        "Fischer Files"
    );
    assert_eq!(lib.search("najdorf", None, "imported").len(), 1);
}

#[test]
fn long_collection_name_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let name = "A".repeat(200);

    {
        let kv = JsonKvStore::new(dir.path().to_path_buf());
        let mut lib = Library::new(Box::new(kv), LibraryOptions::default());
        assert_eq!(lib.import_all_games(TRANSPOSED, &name, false).imported, 1);
    }

    let kv = JsonKvStore::new(dir.path().to_path_buf());
    let mut lib = Library::new(Box::new(kv), LibraryOptions::default());
    assert_eq!(lib.load_collections(), 1);
    assert_eq!(lib.store().collection(&name).map(|c| c.count), Some(1));
}

#[test]
fn empty_corpus_degrades_to_empty_results() {
    let mut lib = memory_library();
    assert!(lib.search("anything", None, "").is_empty());
    assert!(lib.filter_by_position(SICILIAN_AFTER_NF3).is_empty());
    assert!(lib.get_collections_for_category("players").is_empty());
    assert_eq!(lib.load_collections(), 0);
}
