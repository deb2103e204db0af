//! Turning PGN text into filed, searchable games.

use chess::parse_pgn_collection;

use crate::classify::detect_category;
use crate::game::{Collection, Game};
use crate::persistence::{now_millis, KeyValueStore, StoredCollection};
use crate::store::CorpusStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Skip games whose fingerprint has been seen before
    pub dedup: bool,
    /// Write the source text to the key-value store
    pub persist: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            dedup: false,
            persist: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
}

/// Imports PGN collections and restores them from durable storage.
pub struct ImportManager {
    kv: Box<dyn KeyValueStore>,
}

impl ImportManager {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Parse `text` and file every game under the collection `name`.
    ///
    /// Text with no parseable game changes nothing. Importing a name that
    /// already exists replaces its collection record; games from the
    /// earlier import stay in the corpus and are counted again. The stored
    /// text is replaced though, so after a restart the collection holds only
    /// the games of its latest import.
    pub fn import_all(
        &self,
        store: &mut CorpusStore,
        text: &str,
        name: &str,
        options: ImportOptions,
    ) -> ImportSummary {
        let parsed = parse_pgn_collection(text);
        if parsed.is_empty() {
            tracing::info!(collection = %name, "No games found to import");
            return ImportSummary::default();
        }

        let category = detect_category(name);
        store.ensure_category(category);
        store.remove_collection(name);

        let mut summary = ImportSummary::default();
        for pgn in parsed {
            let game = Game::from_pgn(pgn, name, category);
            if options.dedup && !store.record_fingerprint(game.fingerprint()) {
                summary.duplicates += 1;
                continue;
            }
            store.append_game(game);
            summary.imported += 1;
        }

        store.add_collection(Collection {
            name: name.to_string(),
            count: store.count_in_collection(name),
            category,
        });

        if options.persist {
            let record = StoredCollection {
                name: name.to_string(),
                text: text.to_string(),
                dedup: options.dedup,
                saved_at: now_millis(),
            };
            if let Err(e) = self.kv.put(name, &record) {
                tracing::warn!(collection = %name, "Failed to persist collection: {}", e);
            }
        }

        tracing::info!(
            collection = %name,
            category = %category,
            imported = summary.imported,
            duplicates = summary.duplicates,
            "Imported collection"
        );
        summary
    }

    /// Re-import every stored collection, oldest first, without writing
    /// them back. Returns the number of collections restored.
    pub fn restore(&self, store: &mut CorpusStore) -> usize {
        let mut records = match self.kv.get_all() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to read stored collections: {}", e);
                return 0;
            }
        };
        records.sort_by(|a, b| a.saved_at.cmp(&b.saved_at).then_with(|| a.name.cmp(&b.name)));

        for record in &records {
            let options = ImportOptions {
                dedup: record.dedup,
                persist: false,
            };
            self.import_all(store, &record.text, &record.name, options);
        }
        tracing::info!(collections = records.len(), games = store.len(), "Restored collections");
        records.len()
    }

    /// Drop a collection's games and record, and its stored text so it
    /// is not restored again. Returns the number of games removed.
    pub fn remove(&self, store: &mut CorpusStore, name: &str) -> usize {
        let removed = store.remove_games_in(name);
        store.remove_collection(name);
        if let Err(e) = self.kv.delete(name) {
            tracing::warn!(collection = %name, "Failed to delete stored collection: {}", e);
        }
        tracing::info!(collection = %name, removed, "Removed collection");
        removed
    }
}
