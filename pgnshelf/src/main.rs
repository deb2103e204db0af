//! pgnshelf - a local library of chess games.
//!
//! Imports PGN files into collections, files them under a heuristic
//! category and answers text, opening and position queries over
//! everything imported so far. Imported text is kept under the data
//! directory (see [`config`]) and restored at the start of every command.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use corpus::{
    CategoryKind, Game, HttpFetcher, JsonKvStore, Library, OpeningExplorer, PositionTarget,
};

mod config;

#[derive(Parser)]
#[command(name = "pgnshelf", about = "Import, browse and search chess game collections")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a PGN file as a collection.
    Import {
        file: PathBuf,
        /// Collection name. Defaults to the file name without extension.
        #[arg(short, long)]
        name: Option<String>,
        /// Skip games already present in any collection.
        #[arg(long)]
        dedup: bool,
    },
    /// Remove a collection and its stored text.
    Remove { name: String },
    /// List categories and their collections.
    List {
        /// Only list one category (players, events, openings, imported).
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Search games by player, event, date or ECO code.
    Search {
        query: Vec<String>,
        #[arg(long)]
        collection: Option<String>,
        #[arg(short, long, default_value = "all")]
        category: String,
    },
    /// Find games that pass through a position.
    Position {
        fen: String,
        /// Scan in batches, yielding between them.
        #[arg(long)]
        chunked: bool,
    },
    /// Group games by opening using their ECO codes.
    Openings,
    /// Query the opening explorer for a position.
    Explore { fen: String },
    /// Load collections listed in a remote manifest.
    Fetch {
        /// Manifest URL. Defaults to PGNSHELF_MANIFEST_URL.
        #[arg(long)]
        manifest: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Category(#[from] corpus::UnknownCategory),

    #[error("invalid position: {0}")]
    Position(#[from] corpus::PositionError),

    #[error("no manifest given and PGNSHELF_MANIFEST_URL is not set")]
    NoManifest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let data_dir = config::get_data_dir();
    tracing::debug!("Using data directory: {}", data_dir.display());

    let mut library = Library::new(
        Box::new(JsonKvStore::new(data_dir)),
        config::library_options(),
    );
    let restored = library.load_collections();
    tracing::debug!(restored, games = library.store().len(), "Library ready");

    match cli.command {
        Commands::Import { file, name, dedup } => import(&mut library, &file, name, dedup)?,
        Commands::Remove { name } => remove(&mut library, &name),
        Commands::List { category } => list(&mut library, category.as_deref())?,
        Commands::Search {
            query,
            collection,
            category,
        } => {
            let query = query.join(" ");
            print_games(&library.search(&query, collection.as_deref(), &category));
        }
        Commands::Position { fen, chunked } => position(&mut library, &fen, chunked).await?,
        Commands::Openings => openings(&mut library),
        Commands::Explore { fen } => explore(&fen).await?,
        Commands::Fetch { manifest } => fetch(&mut library, manifest).await?,
    }

    Ok(())
}

fn import(library: &mut Library, file: &Path, name: Option<String>, dedup: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file).map_err(|source| CliError::ReadInput {
        path: file.to_path_buf(),
        source,
    })?;
    let name = name.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Imported".to_string())
    });

    let summary = library.import_all_games(&text, &name, dedup);
    match library.store().collection(&name) {
        Some(collection) => println!(
            "Imported {} games into \"{}\" ({}), {} duplicates skipped",
            summary.imported, name, collection.category, summary.duplicates
        ),
        None => println!("No games found in {}", file.display()),
    }
    Ok(())
}

fn remove(library: &mut Library, name: &str) {
    if library.store().collection(name).is_none() {
        println!("No collection named \"{}\"", name);
        return;
    }
    let removed = library.remove_collection(name);
    println!("Removed \"{}\" ({} games)", name, removed);
}

fn list(library: &mut Library, category: Option<&str>) -> Result<(), CliError> {
    let kinds = match category {
        Some(id) => vec![CategoryKind::from_str(id)?],
        None => CategoryKind::ALL.to_vec(),
    };
    if kinds.contains(&CategoryKind::Openings) {
        library.build_opening_index();
    }

    for kind in kinds {
        let collections = library.get_collections_for_category(kind.id());
        if collections.is_empty() {
            continue;
        }
        println!("{}", kind.display_name());
        for collection in collections {
            println!("  {:<40} {:>6}", collection.name, collection.count);
        }
    }
    Ok(())
}

async fn position(library: &mut Library, fen: &str, chunked: bool) -> Result<(), CliError> {
    let target = PositionTarget::from_fen(fen)?;
    tracing::debug!(key = %target.key, ply = target.ply, chunked, "Position search");

    let games = if chunked {
        library.filter_by_position_async(fen).await
    } else {
        library.filter_by_position(fen)
    };
    print_games(&games);
    Ok(())
}

fn openings(library: &mut Library) {
    let index = library.build_opening_index();
    for collection in index.collections() {
        println!("{:<40} {:>6}", collection.name, collection.count);
    }
}

async fn explore(fen: &str) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new().context("failed to create HTTP client")?;
    let options = config::library_options();
    let mut explorer =
        OpeningExplorer::with_capacity(fetcher, config::get_explorer_url(), options.explorer_cache_capacity);

    let Some(stats) = explorer.query(fen).await else {
        println!("No explorer data for this position");
        return Ok(());
    };

    println!(
        "{} games: +{} ={} -{}",
        stats.total(),
        stats.white,
        stats.draws,
        stats.black
    );
    for mv in &stats.moves {
        println!(
            "  {:<8} {:>8}  +{} ={} -{}",
            mv.san,
            mv.total(),
            mv.white,
            mv.draws,
            mv.black
        );
    }
    Ok(())
}

async fn fetch(library: &mut Library, manifest: Option<String>) -> anyhow::Result<()> {
    let manifest = manifest
        .or_else(config::get_manifest_url)
        .ok_or(CliError::NoManifest)?;
    let fetcher = HttpFetcher::new().context("failed to create HTTP client")?;

    let imported = library.load_remote_collections(&fetcher, &manifest).await;
    println!("Loaded {} games from {}", imported, manifest);
    Ok(())
}

fn print_games(games: &[Arc<Game>]) {
    for game in games {
        println!("{}", describe(game));
    }
    println!("{} games", games.len());
}

fn describe(game: &Game) -> String {
    let mut line = format!("{} - {}  {}", game.white, game.black, game.result);
    let details: Vec<&str> = [game.event.as_str(), game.date.as_str(), game.eco.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !details.is_empty() {
        line.push_str(&format!("  ({})", details.join(", ")));
    }
    line.push_str(&format!("  [{}, {} plies]", game.collection, game.ply_count()));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus::MemoryKvStore;

    const PGN: &str = "[Event \"Casual\"]\n[White \"Tal, Mikhail\"]\n[Black \"Koblents, Alexander\"]\n[Result \"1-0\"]\n\n1. e4 e5 2. Nf3 1-0\n";

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["pgnshelf", "search", "bobby", "fischer", "--category", "players"]).unwrap();
        match cli.command {
            Commands::Search { query, category, collection } => {
                assert_eq!(query, vec!["bobby", "fischer"]);
                assert_eq!(category, "players");
                assert!(collection.is_none());
            }
            _ => panic!("expected search"),
        }

        let cli = Cli::try_parse_from(["pgnshelf", "import", "games.pgn", "--dedup"]).unwrap();
        assert!(matches!(cli.command, Commands::Import { dedup: true, name: None, .. }));
    }

    #[test]
    fn test_import_names_collection_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Tal Attacks.pgn");
        std::fs::write(&file, PGN).unwrap();

        let mut library = Library::new(Box::new(MemoryKvStore::new()), Default::default());
        import(&mut library, &file, None, false).unwrap();
        let collection = library.store().collection("Tal Attacks").unwrap();
        assert_eq!(collection.count, 1);
    }

    #[test]
    fn test_import_missing_file_is_an_error() {
        let mut library = Library::new(Box::new(MemoryKvStore::new()), Default::default());
        let err = import(&mut library, Path::new("/nonexistent/x.pgn"), None, false).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_remove_collection() {
        let cli = Cli::try_parse_from(["pgnshelf", "remove", "Tal Attacks"]).unwrap();
        assert!(matches!(cli.command, Commands::Remove { ref name } if name == "Tal Attacks"));

        let mut library = Library::new(Box::new(MemoryKvStore::new()), Default::default());
        library.import_all_games(PGN, "Tal Attacks", false);
        remove(&mut library, "Tal Attacks");
        assert!(library.store().is_empty());
        assert!(library.store().collection("Tal Attacks").is_none());
    }

    #[test]
    fn test_list_rejects_unknown_category() {
        let mut library = Library::new(Box::new(MemoryKvStore::new()), Default::default());
        assert!(matches!(list(&mut library, Some("nope")), Err(CliError::Category(_))));
    }

    #[test]
    fn test_describe_game() {
        let mut library = Library::new(Box::new(MemoryKvStore::new()), Default::default());
        library.import_all_games(PGN, "Club", false);
        let game = Arc::clone(&library.store().games()[0]);
        assert_eq!(
            describe(&game),
            "Tal, Mikhail - Koblents, Alexander  1-0  (Casual)  [Club, 3 plies]"
        );
    }
}
