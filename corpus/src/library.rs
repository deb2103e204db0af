//! The caller-facing facade over a corpus.
//!
//! A [`Library`] owns the [`CorpusStore`], the import manager and the
//! position search, and exposes the operations a front end needs. Nothing
//! here fails hard: collaborator errors are logged and turn into empty or
//! zero results.

use std::str::FromStr;
use std::sync::Arc;

use chess::{ReplayBoard, RulesEngine};
use serde::Deserialize;

use crate::explorer::EXPLORER_CACHE_CAPACITY;
use crate::fetch::Fetch;
use crate::game::{Category, CategoryKind, Collection, Game};
use crate::import::{ImportManager, ImportOptions, ImportSummary};
use crate::openings::OpeningIndex;
use crate::persistence::KeyValueStore;
use crate::position::{self, PositionSearch, DEFAULT_CHUNK_SIZE};
use crate::search;
use crate::store::{CorpusStore, POSITION_CACHE_CAPACITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryOptions {
    /// Games per batch in chunked position search
    pub chunk_size: usize,
    pub position_cache_capacity: usize,
    pub explorer_cache_capacity: usize,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            position_cache_capacity: POSITION_CACHE_CAPACITY,
            explorer_cache_capacity: EXPLORER_CACHE_CAPACITY,
        }
    }
}

/// Index of remotely hosted collections.
#[derive(Debug, Deserialize)]
struct RemoteManifest {
    #[serde(default)]
    collections: Vec<RemoteCollection>,
}

#[derive(Debug, Deserialize)]
struct RemoteCollection {
    name: String,
    url: String,
}

pub struct Library<R = ReplayBoard> {
    store: CorpusStore,
    importer: ImportManager,
    positions: PositionSearch<R>,
    options: LibraryOptions,
}

impl Library<ReplayBoard> {
    pub fn new(kv: Box<dyn KeyValueStore>, options: LibraryOptions) -> Self {
        Self::with_engine(kv, ReplayBoard::new(), options)
    }
}

impl<R: RulesEngine> Library<R> {
    pub fn with_engine(kv: Box<dyn KeyValueStore>, engine: R, options: LibraryOptions) -> Self {
        Self {
            store: CorpusStore::with_cache_capacity(options.position_cache_capacity),
            importer: ImportManager::new(kv),
            positions: PositionSearch::new(engine, options.chunk_size),
            options,
        }
    }

    pub fn options(&self) -> &LibraryOptions {
        &self.options
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    /// Restore every collection saved by earlier imports.
    pub fn load_collections(&mut self) -> usize {
        self.importer.restore(&mut self.store)
    }

    /// Import every collection listed in a remote manifest that is not
    /// already loaded. Remote collections are not written to the store.
    ///
    /// Returns the number of games imported.
    pub async fn load_remote_collections<F: Fetch>(&mut self, fetcher: &F, manifest_url: &str) -> usize {
        let manifest: RemoteManifest = match fetcher.fetch_json(manifest_url).await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(url = %manifest_url, "Could not load collection manifest: {}", e);
                return 0;
            }
        };
        let base = reqwest::Url::parse(manifest_url).ok();

        let mut imported = 0;
        for entry in manifest.collections {
            if self.store.collection(&entry.name).is_some() {
                tracing::debug!(collection = %entry.name, "Already loaded, skipping");
                continue;
            }

            let url = match base.as_ref().map(|b| b.join(&entry.url)) {
                Some(Ok(url)) => url.to_string(),
                _ => entry.url.clone(),
            };
            let text = match fetcher.fetch_text(&url).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(collection = %entry.name, %url, "Could not fetch collection: {}", e);
                    continue;
                }
            };

            let options = ImportOptions {
                dedup: false,
                persist: false,
            };
            imported += self
                .importer
                .import_all(&mut self.store, &text, &entry.name, options)
                .imported;
        }
        imported
    }

    pub fn import_all_games(&mut self, text: &str, name: &str, dedup: bool) -> ImportSummary {
        let options = ImportOptions {
            dedup,
            persist: true,
        };
        self.importer.import_all(&mut self.store, text, name, options)
    }

    /// Remove a collection and its games, including its stored text.
    pub fn remove_collection(&mut self, name: &str) -> usize {
        self.importer.remove(&mut self.store, name)
    }

    /// Free-text search. `category` is a category id; empty or `"all"`
    /// searches every category and an unknown id matches nothing.
    pub fn search(&self, query: &str, collection: Option<&str>, category: &str) -> Vec<Arc<Game>> {
        let category = match category.trim() {
            "" | "all" => None,
            id => match CategoryKind::from_str(id) {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::debug!("{}", e);
                    return Vec::new();
                }
            },
        };
        let collection = collection.filter(|c| !c.is_empty());
        search::search(&self.store, query, collection, category)
    }

    pub fn filter_by_position(&mut self, fen: &str) -> Vec<Arc<Game>> {
        self.positions.filter_by_position(&mut self.store, fen)
    }

    pub async fn filter_by_position_async(&mut self, fen: &str) -> Vec<Arc<Game>> {
        self.positions
            .filter_by_position_chunked(&mut self.store, fen)
            .await
    }

    pub async fn count_by_position_async(&mut self, fen: &str) -> usize {
        self.positions
            .count_by_position_async(&mut self.store, fen)
            .await
    }

    pub fn build_opening_index(&mut self) -> &OpeningIndex {
        self.store.build_opening_index()
    }

    /// Games in one opening bucket. Empty until the index is built.
    pub fn opening_games(&self, name: &str) -> &[Arc<Game>] {
        self.store
            .opening_index()
            .map(|index| index.games(name))
            .unwrap_or(&[])
    }

    pub fn get_collections_for_category(&self, id: &str) -> Vec<Collection> {
        match CategoryKind::from_str(id) {
            Ok(kind) => self.store.collections_for_category(kind),
            Err(_) => Vec::new(),
        }
    }

    pub fn categories(&self) -> &[Category] {
        self.store.categories()
    }

    /// Replay a game on the library's engine. Returns the applied moves.
    pub fn load_game(&mut self, game: &Game) -> Vec<String> {
        position::load_game(game, self.positions.engine_mut())
    }
}
