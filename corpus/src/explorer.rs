//! Move statistics from a remote opening explorer.

use serde::{Deserialize, Serialize};

use crate::cache::FifoCache;
use crate::fetch::{Fetch, FetchError};

pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.lichess.ovh/masters";
pub const EXPLORER_CACHE_CAPACITY: usize = 200;

/// Aggregate results for a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerStats {
    #[serde(default)]
    pub white: u64,
    #[serde(default)]
    pub draws: u64,
    #[serde(default)]
    pub black: u64,
    #[serde(default)]
    pub moves: Vec<ExplorerMove>,
}

impl ExplorerStats {
    pub fn total(&self) -> u64 {
        self.white + self.draws + self.black
    }
}

/// Results after one candidate move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerMove {
    pub san: String,
    #[serde(default)]
    pub white: u64,
    #[serde(default)]
    pub draws: u64,
    #[serde(default)]
    pub black: u64,
}

impl ExplorerMove {
    pub fn total(&self) -> u64 {
        self.white + self.draws + self.black
    }
}

/// Explorer client with a bounded cache of answered positions.
pub struct OpeningExplorer<F> {
    fetcher: F,
    base_url: String,
    cache: FifoCache<String, ExplorerStats>,
}

impl<F: Fetch> OpeningExplorer<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>) -> Self {
        Self::with_capacity(fetcher, base_url, EXPLORER_CACHE_CAPACITY)
    }

    pub fn with_capacity(fetcher: F, base_url: impl Into<String>, capacity: usize) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            cache: FifoCache::new(capacity),
        }
    }

    pub fn cached(&self, fen: &str) -> Option<&ExplorerStats> {
        self.cache.get(fen.trim())
    }

    /// Stats for a position, from the cache when available.
    ///
    /// Returns None when the position is not cached and the request fails.
    pub async fn query(&mut self, fen: &str) -> Option<ExplorerStats> {
        if let Some(hit) = self.cached(fen) {
            tracing::debug!(%fen, "Explorer cache hit");
            return Some(hit.clone());
        }
        self.refresh(fen).await
    }

    /// Ask the explorer again even if the position is cached. A failed
    /// request falls back to the cached value.
    pub async fn refresh(&mut self, fen: &str) -> Option<ExplorerStats> {
        let key = fen.trim().to_string();
        match self.request(&key).await {
            Ok(stats) => {
                self.cache.insert(key, stats.clone());
                Some(stats)
            }
            Err(e) => {
                tracing::warn!(fen = %key, "Explorer request failed: {}", e);
                self.cache.get(&key).cloned()
            }
        }
    }

    async fn request(&self, fen: &str) -> Result<ExplorerStats, FetchError> {
        let url = reqwest::Url::parse_with_params(&self.base_url, &[("fen", fen)])
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        self.fetcher.fetch_json(url.as_str()).await
    }
}
