//! BracketLab CLI: load tournament data and manage its cache.
//!
//! Commands:
//! - `load`: build the tournament table (from cache or barttorvik.com)
//! - `cache status`: report the cache path, row count and seasons
//! - `cache clear`: remove the cache file
//! - `rounds`: print the final-round to games-won mapping

use anyhow::{bail, Context, Result};
use bracketlab_core::data::{StdoutProgress, TableCache};
use bracketlab_core::{FinalRound, LoaderConfig, TournamentLoader, TournamentTable};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// First season the standings page publishes.
const FIRST_SEASON: i32 = 2008;

#[derive(Parser)]
#[command(
    name = "bracketlab",
    about = "BracketLab CLI: NCAA tournament team efficiency data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the tournament table, fetching and caching it if needed.
    Load {
        /// Season-ending years, comma separated (e.g. 2019,2021). Defaults to the config's years.
        #[arg(long, value_delimiter = ',')]
        years: Vec<i32>,

        /// Ignore an existing cache and fetch every season.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Cache file. Defaults to ./ncaa_tournament_teams.csv.
        #[arg(long)]
        cache: Option<PathBuf>,

        /// TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full table as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Print the final-round to games-won mapping.
    Rounds,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cache path, row count, and seasons.
    Status {
        /// Cache file. Defaults to ./ncaa_tournament_teams.csv.
        #[arg(long)]
        cache: Option<PathBuf>,
    },
    /// Remove the cache file.
    Clear {
        /// Cache file. Defaults to ./ncaa_tournament_teams.csv.
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Load {
            years,
            force,
            cache,
            config,
            json,
        } => run_load(years, force, cache, config, json),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache } => run_cache_status(&cache_path(cache)),
            CacheAction::Clear { cache, confirm } => run_cache_clear(&cache_path(cache), confirm),
        },
        Commands::Rounds => {
            run_rounds();
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bracketlab_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cache_path(cache: Option<PathBuf>) -> PathBuf {
    cache.unwrap_or_else(|| LoaderConfig::default().cache_path)
}

/// Season-ending year of the season in progress (or just finished).
fn current_season() -> i32 {
    let today = chrono::Local::now().date_naive();
    if today.month() >= 11 {
        today.year() + 1
    } else {
        today.year()
    }
}

fn check_years(years: &[i32]) -> Result<()> {
    let last = current_season();
    for &year in years {
        if !(FIRST_SEASON..=last).contains(&year) {
            bail!("season {year} is outside {FIRST_SEASON}..={last}");
        }
    }
    Ok(())
}

fn run_load(
    years: Vec<i32>,
    force: bool,
    cache: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let mut loader_config = match &config {
        Some(path) => LoaderConfig::load(path)?,
        None => LoaderConfig::default(),
    };
    if let Some(path) = cache {
        loader_config.cache_path = path;
    }
    let years = if years.is_empty() {
        loader_config.years.clone()
    } else {
        years
    };
    check_years(&years)?;

    let loader = TournamentLoader::from_config(&loader_config)
        .context("failed to set up standings source")?;

    // JSON goes to stdout, so progress lines are suppressed.
    let loaded = if json {
        loader.load(&years, force)
    } else {
        loader.load_with_progress(&years, force, &StdoutProgress)
    };
    let table = loaded.with_context(|| format!("failed to load seasons {years:?}"))?;

    if json {
        let out = serde_json::to_string_pretty(&table).context("failed to serialize table")?;
        println!("{out}");
    } else {
        print_summary(&table);
    }
    Ok(())
}

fn print_summary(table: &TournamentTable) {
    println!();
    println!(
        "{:<6} {:>6} {:<24} {:>10}",
        "Year", "Teams", "Champion", "Champ Eff"
    );
    println!("{}", "-".repeat(49));
    for year in table.years() {
        let teams = table.for_year(year).count();
        let (champion, eff) = match table.champion(year) {
            Some(r) => (r.team().to_string(), format!("{:.3}", r.total_efficiency())),
            None => ("(in progress)".to_string(), "-".to_string()),
        };
        println!("{:<6} {:>6} {:<24} {:>10}", year, teams, champion, eff);
    }
    println!();
    println!("Total: {} records", table.len());
}

fn run_cache_status(path: &Path) -> Result<()> {
    let status = TableCache::new(path)
        .status()
        .with_context(|| format!("failed to read cache {}", path.display()))?;

    if !status.cached {
        println!("No cache at {}", status.path.display());
        return Ok(());
    }

    let years: Vec<String> = status.years.iter().map(|y| y.to_string()).collect();
    println!("Cache: {}", status.path.display());
    println!("Rows: {}", status.rows.unwrap_or(0));
    println!("Seasons: {}", years.join(", "));
    Ok(())
}

fn run_cache_clear(path: &Path, confirm: bool) -> Result<()> {
    let cache = TableCache::new(path);
    if !cache.exists() {
        println!("No cache at {}", path.display());
        return Ok(());
    }

    if !confirm {
        println!("Would remove {} (pass --confirm to delete)", path.display());
        return Ok(());
    }

    cache.clear()?;
    println!("Removed {}", path.display());
    Ok(())
}

fn run_rounds() {
    println!("{:<14} {:>9}", "Final Round", "Games Won");
    println!("{}", "-".repeat(24));
    for round in FinalRound::ALL {
        println!("{:<14} {:>9}", round.code(), round.games_won().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn years_parse_comma_separated() {
        let cli = Cli::try_parse_from(["bracketlab", "load", "--years", "2019,2021", "--force"])
            .unwrap();
        match cli.command {
            Commands::Load { years, force, .. } => {
                assert_eq!(years, [2019, 2021]);
                assert!(force);
            }
            _ => panic!("expected load"),
        }
    }

    #[test]
    fn season_bounds() {
        assert!(check_years(&[2008, 2021]).is_ok());
        assert!(check_years(&[2007]).is_err());
        assert!(check_years(&[current_season() + 1]).is_err());
    }
}
