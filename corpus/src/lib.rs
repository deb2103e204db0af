//! Game library core: PGN ingestion, classification, indexing and search.
//!
//! Imported text is parsed into [`Game`]s, filed under a collection and a
//! heuristic [`CategoryKind`], and kept in a [`CorpusStore`]. Text search,
//! opening browsing and position search all read from that store. Source
//! text is written to a [`KeyValueStore`] so the corpus can be rebuilt on
//! the next start.
//!
//! Most callers only need [`Library`]:
//!
//! ```no_run
//! use corpus::{JsonKvStore, Library, LibraryOptions};
//!
//! let kv = JsonKvStore::new("data".into());
//! let mut library = Library::new(Box::new(kv), LibraryOptions::default());
//! library.load_collections();
//! for game in library.search("carlsen", None, "players") {
//!     println!("{} - {}", game.white, game.black);
//! }
//! ```

pub mod cache;
pub mod classify;
pub mod explorer;
pub mod fetch;
pub mod game;
pub mod import;
pub mod library;
pub mod openings;
pub mod persistence;
pub mod position;
pub mod search;
pub mod store;

pub use cache::FifoCache;
pub use classify::{alias_for, detect_category};
pub use explorer::{ExplorerMove, ExplorerStats, OpeningExplorer, DEFAULT_EXPLORER_URL};
pub use fetch::{Fetch, FetchError, HttpFetcher};
pub use game::{Category, CategoryKind, Collection, Game, UnknownCategory};
pub use import::{ImportManager, ImportOptions, ImportSummary};
pub use library::{Library, LibraryOptions};
pub use openings::{opening_for_eco, OpeningIndex};
pub use persistence::{JsonKvStore, KeyValueStore, MemoryKvStore, PersistenceError, StoredCollection};
pub use position::{PositionError, PositionSearch, PositionTarget, YieldPolicy, DEFAULT_CHUNK_SIZE};
pub use store::{CorpusStore, PositionCache, POSITION_CACHE_CAPACITY};
