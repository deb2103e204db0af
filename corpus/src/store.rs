use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::FifoCache;
use crate::game::{Category, CategoryKind, Collection, Game};
use crate::openings::OpeningIndex;

/// Maximum number of positions remembered by the position cache.
pub const POSITION_CACHE_CAPACITY: usize = 200;

/// Normalized FEN prefix to the games that reach it.
pub type PositionCache = FifoCache<String, Vec<Arc<Game>>>;

/// Everything the library knows: the games, how they are filed, and the
/// derived indices over them.
///
/// The opening index and position cache only hold references to games
/// owned by the corpus.
#[derive(Debug)]
pub struct CorpusStore {
    games: Vec<Arc<Game>>,
    categories: Vec<Category>,
    opening_index: Option<OpeningIndex>,
    opening_index_stale: bool,
    position_cache: PositionCache,
    fingerprints: HashSet<String>,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::with_cache_capacity(POSITION_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            games: Vec::new(),
            categories: Vec::new(),
            opening_index: None,
            opening_index_stale: false,
            position_cache: FifoCache::new(capacity),
            fingerprints: HashSet::new(),
        }
    }

    pub fn games(&self) -> &[Arc<Game>] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Append a tagged game.
    ///
    /// Marks the opening index stale and drops cached position results so
    /// later position searches see the new game.
    pub fn append_game(&mut self, game: Game) -> Arc<Game> {
        let game = Arc::new(game);
        self.games.push(Arc::clone(&game));
        self.invalidate_derived();
        game
    }

    /// Drop every game tagged with a collection name, and fingerprints no
    /// remaining game carries. Returns the number of games removed.
    pub fn remove_games_in(&mut self, name: &str) -> usize {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.games)
            .into_iter()
            .partition(|g| g.collection == name);
        self.games = kept;
        if removed.is_empty() {
            return 0;
        }

        let remaining: HashSet<String> = self.games.iter().map(|g| g.fingerprint()).collect();
        for game in &removed {
            let fingerprint = game.fingerprint();
            if !remaining.contains(&fingerprint) {
                self.fingerprints.remove(&fingerprint);
            }
        }
        self.invalidate_derived();
        removed.len()
    }

    fn invalidate_derived(&mut self) {
        if self.opening_index.is_some() {
            self.opening_index_stale = true;
        }
        if !self.position_cache.is_empty() {
            tracing::debug!(
                entries = self.position_cache.len(),
                "Clearing position cache after corpus change"
            );
            self.position_cache.clear();
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: CategoryKind) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Get a category, registering it first if this is its first collection.
    pub fn ensure_category(&mut self, id: CategoryKind) -> &mut Category {
        let pos = match self.categories.iter().position(|c| c.id == id) {
            Some(pos) => pos,
            None => {
                self.categories.push(Category::new(id));
                self.categories.len() - 1
            }
        };
        &mut self.categories[pos]
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.categories
            .iter()
            .flat_map(|c| c.collections.iter())
            .find(|c| c.name == name)
    }

    /// Remove a collection record from whichever category holds it.
    pub fn remove_collection(&mut self, name: &str) -> Option<Collection> {
        for category in &mut self.categories {
            if let Some(pos) = category.collections.iter().position(|c| c.name == name) {
                return Some(category.collections.remove(pos));
            }
        }
        None
    }

    pub fn add_collection(&mut self, collection: Collection) {
        self.ensure_category(collection.category)
            .collections
            .push(collection);
    }

    /// Number of games in the corpus tagged with a collection name.
    pub fn count_in_collection(&self, name: &str) -> usize {
        self.games.iter().filter(|g| g.collection == name).count()
    }

    /// Collections listed under a category.
    ///
    /// The openings category lists the opening index buckets (largest first)
    /// when an index has been built, followed by any imported collections
    /// filed there.
    pub fn collections_for_category(&self, id: CategoryKind) -> Vec<Collection> {
        let mut list = Vec::new();
        if id == CategoryKind::Openings {
            if let Some(index) = &self.opening_index {
                list.extend(index.collections());
            }
        }
        if let Some(category) = self.category(id) {
            for collection in &category.collections {
                if !list.iter().any(|c: &Collection| c.name == collection.name) {
                    list.push(collection.clone());
                }
            }
        }
        list
    }

    /// Record a fingerprint. Returns false if it had been seen before.
    pub fn record_fingerprint(&mut self, fingerprint: String) -> bool {
        self.fingerprints.insert(fingerprint)
    }

    pub fn has_fingerprint(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    pub fn fingerprint_count(&self) -> usize {
        self.fingerprints.len()
    }

    /// Rebuild the opening index from the whole corpus.
    pub fn build_opening_index(&mut self) -> &OpeningIndex {
        let index = OpeningIndex::build(&self.games);
        tracing::info!(
            openings = index.len(),
            games = index.indexed_games(),
            "Built opening index"
        );
        self.opening_index_stale = false;
        self.opening_index.insert(index)
    }

    pub fn opening_index(&self) -> Option<&OpeningIndex> {
        self.opening_index.as_ref()
    }

    /// True when games were imported after the opening index was last built.
    pub fn opening_index_is_stale(&self) -> bool {
        self.opening_index_stale
    }

    pub fn position_cache(&self) -> &PositionCache {
        &self.position_cache
    }

    pub fn position_cache_mut(&mut self) -> &mut PositionCache {
        &mut self.position_cache
    }
}

impl Default for CorpusStore {
    fn default() -> Self {
        Self::new()
    }
}
