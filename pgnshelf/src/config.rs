//! Runtime configuration for pgnshelf.
//!
//! Every value has a compile-time default and can be overridden with an
//! environment variable.

use std::path::PathBuf;

use corpus::{LibraryOptions, DEFAULT_CHUNK_SIZE, DEFAULT_EXPLORER_URL};

const DEFAULT_CONFIG_DIR: &str = ".config/pgnshelf/data";
const DEV_DATA_DIR: &str = "./data";

/// Get the data directory for stored collections.
///
/// Priority:
/// 1. PGNSHELF_DATA_DIR env variable if set
/// 2. $HOME/.config/pgnshelf/data if HOME is set
/// 3. ./data as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PGNSHELF_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_CONFIG_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}

/// Games per batch in chunked position search.
///
/// Priority:
/// 1. `PGNSHELF_CHUNK_SIZE` env variable if set (falls back to the default
///    if it is not a positive integer)
/// 2. `50`
pub fn get_chunk_size() -> usize {
    if let Ok(size) = std::env::var("PGNSHELF_CHUNK_SIZE") {
        return parse_chunk_size(&size);
    }

    DEFAULT_CHUNK_SIZE
}

fn parse_chunk_size(value: &str) -> usize {
    match value.trim().parse() {
        Ok(0) | Err(_) => DEFAULT_CHUNK_SIZE,
        Ok(n) => n,
    }
}

/// Base URL of the opening explorer.
pub fn get_explorer_url() -> String {
    std::env::var("PGNSHELF_EXPLORER_URL").unwrap_or_else(|_| DEFAULT_EXPLORER_URL.to_string())
}

/// Remote collection manifest, if one is configured.
pub fn get_manifest_url() -> Option<String> {
    std::env::var("PGNSHELF_MANIFEST_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

pub fn library_options() -> LibraryOptions {
    LibraryOptions {
        chunk_size: get_chunk_size(),
        ..LibraryOptions::default()
    }
}
