//! cityfinder: command-line interface for cityfinder-core
//!
//! Loads the world cities dataset, answers prefix searches against it and
//! keeps a persisted list of favorite cities.
//!
//! Usage examples
//! --------------
//!
//! - Show dataset size and number of favorites
//!   $ cityfinder stats
//!
//! - Search by name prefix (case-insensitive)
//!   $ cityfinder search Al
//!   $ cityfinder --input cities.json.gz search "buenos"
//!
//! - Manage favorites
//!   $ cityfinder fav add 3435910
//!   $ cityfinder fav list
//!   $ cityfinder search b --favorites
//!
//! Data source
//! -----------
//!
//! Without `--input` the dataset is downloaded from the configured URL with
//! bounded retries. With `--input` a local JSON (or `.json.gz`) file is read
//! and a binary cache is written next to it for fast subsequent runs.
//! Favorites are stored under `--data-dir` (default `./.cityfinder`).
mod args;

use crate::args::{CliArgs, Commands, FavCommand};
use anyhow::{bail, Context};
use cityfinder_core::prelude::*;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    setup_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("reading config {}", path.display()))?
        }
        None => Config::default(),
    };

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(".cityfinder"));
    tracing::debug!(data_dir = %data_dir.display(), folding = ?config.folding, "starting");
    let favorites = FavoritesStore::with_key(DirStore::new(&data_dir), &config.favorites_key);
    let mut coordinator = CityCoordinator::with_folding(favorites, config.folding);

    match &args.command {
        Commands::Stats => {
            load_dataset(&mut coordinator, &args, &config)?;
            println!("Directory statistics:");
            println!("  Cities: {}", coordinator.total_count());
            println!("  Favorites: {}", coordinator.favorites_count());
        }

        Commands::Search {
            prefix,
            favorites,
            limit,
        } => {
            load_dataset(&mut coordinator, &args, &config)?;
            coordinator.set_favorites_only(*favorites);
            coordinator.set_query(prefix.as_str());
            print_result(&coordinator, *limit);
        }

        Commands::Fav(cmd) => run_fav(&mut coordinator, cmd, &args, &config)?,
    }

    if let Some(e) = coordinator.favorites().last_persist_error() {
        eprintln!("warning: favorites were not saved: {e}");
    }
    Ok(())
}

fn run_fav(
    coordinator: &mut CityCoordinator<DirStore>,
    cmd: &FavCommand,
    args: &CliArgs,
    config: &Config,
) -> anyhow::Result<()> {
    match cmd {
        FavCommand::Add { id } => {
            coordinator.add_favorite(*id);
            println!("{id} added ({} favorites)", coordinator.favorites_count());
        }
        FavCommand::Remove { id } => {
            coordinator.remove_favorite(*id);
            println!("{id} removed ({} favorites)", coordinator.favorites_count());
        }
        FavCommand::Toggle { id } => {
            let now = coordinator.toggle_favorite(*id);
            let verb = if now { "added" } else { "removed" };
            println!("{id} {verb} ({} favorites)", coordinator.favorites_count());
        }
        FavCommand::Clear => {
            coordinator.clear_favorites();
            println!("All favorites removed");
        }
        FavCommand::List => {
            load_dataset(coordinator, args, config)?;
            coordinator.set_favorites_only(true);
            coordinator.clear_query();
            print_result(coordinator, usize::MAX);

            let missing = coordinator
                .favorites_count()
                .saturating_sub(coordinator.result().len());
            if missing > 0 {
                println!("({missing} favorite ids are not in the current dataset)");
            }
        }
    }
    Ok(())
}

/// Fetches the dataset on a worker thread and applies it to `coordinator`.
fn load_dataset(
    coordinator: &mut CityCoordinator<DirStore>,
    args: &CliArgs,
    config: &Config,
) -> anyhow::Result<()> {
    let source = build_source(args, config)?;
    let (tx, rx) = mpsc::channel();

    let token = coordinator.begin_reload();
    let worker = spawn_fetch(source, token, tx);
    let completion = rx.recv().context("dataset worker exited without a result")?;
    coordinator.complete_reload(completion);
    if worker.join().is_err() {
        bail!("dataset worker panicked");
    }

    if let Some(e) = coordinator.error() {
        bail!("{e}\n{}", e.recovery_suggestion());
    }
    Ok(())
}

fn build_source(args: &CliArgs, config: &Config) -> anyhow::Result<Box<dyn CitySource + Send>> {
    let policy = config.retry_policy();

    if let Some(path) = &args.input {
        return file_source(path, policy);
    }
    http_source(args.url.as_deref().unwrap_or(&config.dataset_url), config, policy)
}

#[cfg(feature = "json")]
fn file_source(path: &Path, policy: RetryPolicy) -> anyhow::Result<Box<dyn CitySource + Send>> {
    use cityfinder_core::source::JsonFileSource;
    let source = CachedSource::new(JsonFileSource::new(path), path);
    Ok(Box::new(Retrying::new(source, policy)))
}

#[cfg(not(feature = "json"))]
fn file_source(path: &Path, _policy: RetryPolicy) -> anyhow::Result<Box<dyn CitySource + Send>> {
    bail!("reading {} requires the 'json' feature", path.display())
}

#[cfg(feature = "fetch")]
fn http_source(
    url: &str,
    config: &Config,
    policy: RetryPolicy,
) -> anyhow::Result<Box<dyn CitySource + Send>> {
    use cityfinder_core::source::HttpSource;
    let source = HttpSource::with_timeout(url, config.timeout())?;
    Ok(Box::new(Retrying::new(source, policy)))
}

#[cfg(not(feature = "fetch"))]
fn http_source(
    _url: &str,
    _config: &Config,
    _policy: RetryPolicy,
) -> anyhow::Result<Box<dyn CitySource + Send>> {
    bail!("downloading the dataset requires the 'fetch' feature; pass --input instead")
}

fn print_result(coordinator: &CityCoordinator<DirStore>, limit: usize) {
    let result = coordinator.result();
    if result.is_empty() {
        println!("No cities found matching: {:?}", coordinator.params().prefix);
        return;
    }

    for city in result.iter().take(limit) {
        let star = if coordinator.is_favorite(city.id()) { "*" } else { " " };
        println!(
            "{star} {:>8}  {:<32} {}",
            city.id(),
            city.display_name(),
            city.coordinates_label()
        );
    }
    if result.len() > limit {
        println!("... and {} more", result.len() - limit);
    }
}

fn setup_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "cityfinder_core=warn,cityfinder=warn",
            1 => "cityfinder_core=debug,cityfinder=debug,info",
            _ => "trace",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
