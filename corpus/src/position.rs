//! "Which games pass through this position" queries.
//!
//! A target FEN implies a ply count from its side-to-move and full-move
//! fields. Each candidate game is replayed for exactly that many plies and
//! the resulting position compared on the first four FEN fields, so games
//! that transpose into the target by a different move order are found too.
//!
//! Blocking and chunked searches run the same scan. The chunked one yields
//! to the runtime after every batch; the blocking one never yields. Both
//! read and fill the store's position cache.

use std::sync::Arc;

use chess::{normalize_prefix, ply_from_fen, RulesEngine};

use crate::game::Game;
use crate::store::CorpusStore;

/// Games processed between yields in chunked mode.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("FEN needs at least four fields: {0}")]
    TooFewFields(String),
    #[error("Invalid side to move or move number in FEN: {0}")]
    InvalidPly(String),
}

/// A position to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionTarget {
    /// Normalized four-field FEN prefix, also the cache key
    pub key: String,
    /// Plies from the start position
    pub ply: usize,
}

impl PositionTarget {
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let key = normalize_prefix(fen).ok_or_else(|| PositionError::TooFewFields(fen.to_string()))?;
        let ply = ply_from_fen(fen).ok_or_else(|| PositionError::InvalidPly(fen.to_string()))?;
        Ok(Self { key, ply })
    }
}

/// How often a scan hands control back to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YieldPolicy {
    every: usize,
}

impl YieldPolicy {
    /// Never yield; the scan completes in one poll.
    pub const BLOCKING: YieldPolicy = YieldPolicy { every: 0 };

    /// Yield after every `n` games. Zero means blocking.
    pub fn every(n: usize) -> Self {
        Self { every: n }
    }

    pub fn is_blocking(self) -> bool {
        self.every == 0
    }
}

/// Replay a game's opening `target.ply` moves and compare the position.
///
/// Games too short to reach the ply, or with a move the engine rejects on
/// the way, do not match.
pub fn reaches<R: RulesEngine>(game: &Game, target: &PositionTarget, engine: &mut R) -> bool {
    if game.moves.len() < target.ply {
        return false;
    }

    engine.reset();
    for (ply, san) in game.moves[..target.ply].iter().enumerate() {
        if let Err(e) = engine.play(san) {
            tracing::trace!(white = %game.white, black = %game.black, ply, "Replay stopped: {}", e);
            return false;
        }
    }

    normalize_prefix(&engine.fen()).as_deref() == Some(target.key.as_str())
}

/// Scan `games` for the target, yielding between batches per `policy`.
///
/// A batch always runs to completion once started.
pub async fn scan<R: RulesEngine>(
    games: &[Arc<Game>],
    target: &PositionTarget,
    engine: &mut R,
    policy: YieldPolicy,
) -> Vec<Arc<Game>> {
    let mut matches = Vec::new();
    for (i, game) in games.iter().enumerate() {
        if !policy.is_blocking() && i > 0 && i % policy.every == 0 {
            tracing::debug!(scanned = i, total = games.len(), "Position scan yielding");
            tokio::task::yield_now().await;
        }
        if reaches(game, target, engine) {
            matches.push(Arc::clone(game));
        }
    }
    matches
}

/// Replay a whole game, stopping at the first move the engine rejects.
/// Returns the moves that were applied.
pub fn load_game<R: RulesEngine>(game: &Game, engine: &mut R) -> Vec<String> {
    engine.reset();
    let mut applied = Vec::with_capacity(game.moves.len());
    for san in &game.moves {
        if let Err(e) = engine.play(san) {
            tracing::debug!(ply = applied.len(), "Stopped loading game: {}", e);
            break;
        }
        applied.push(san.clone());
    }
    applied
}

/// Position search over a corpus, owning the engine used for replays.
pub struct PositionSearch<R> {
    engine: R,
    chunk_size: usize,
}

impl<R: RulesEngine> PositionSearch<R> {
    pub fn new(engine: R, chunk_size: usize) -> Self {
        Self { engine, chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn engine_mut(&mut self) -> &mut R {
        &mut self.engine
    }

    /// Scan the whole corpus before returning.
    pub fn filter_by_position(&mut self, store: &mut CorpusStore, fen: &str) -> Vec<Arc<Game>> {
        futures::executor::block_on(self.run(store, fen, YieldPolicy::BLOCKING))
    }

    /// Scan in batches of `chunk_size`, yielding between batches.
    pub async fn filter_by_position_chunked(
        &mut self,
        store: &mut CorpusStore,
        fen: &str,
    ) -> Vec<Arc<Game>> {
        let policy = YieldPolicy::every(self.chunk_size);
        self.run(store, fen, policy).await
    }

    pub async fn count_by_position_async(&mut self, store: &mut CorpusStore, fen: &str) -> usize {
        self.filter_by_position_chunked(store, fen).await.len()
    }

    async fn run(
        &mut self,
        store: &mut CorpusStore,
        fen: &str,
        policy: YieldPolicy,
    ) -> Vec<Arc<Game>> {
        let target = match PositionTarget::from_fen(fen) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Ignoring position search: {}", e);
                return Vec::new();
            }
        };

        if target.ply == 0 {
            return store.games().to_vec();
        }

        if let Some(hit) = store.position_cache().get(&target.key) {
            tracing::debug!(key = %target.key, games = hit.len(), "Position cache hit");
            return hit.clone();
        }

        let matches = scan(store.games(), &target, &mut self.engine, policy).await;
        tracing::debug!(
            key = %target.key,
            ply = target.ply,
            scanned = store.len(),
            matched = matches.len(),
            "Position scan complete"
        );

        if let Some(evicted) = store
            .position_cache_mut()
            .insert(target.key, matches.clone())
        {
            tracing::debug!(key = %evicted, "Evicted oldest position cache entry");
        }
        matches
    }
}
