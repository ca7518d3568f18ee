//! Command-line interface for r3.
//!
//! Provides commands for managing the media catalog, creating and
//! preparing Logics, creating Trials and fetching their content.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::config::{self, ResolvedConfig};
use crate::core::{parse_entry, Dispatcher};
use crate::domain::{CatalogOrdering, Implementation, MediaOrder, Trial};
use crate::store::{LogicStore, MediaCatalog, SqliteStore, TrialStore};

/// Log filter used when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "r3=info,warn";

/// r3 - Trial content selection
#[derive(Parser, Debug)]
#[command(name = "r3")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the media catalog
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },

    /// Manage content selection logics
    Logic {
        #[command(subcommand)]
        command: LogicCommands,
    },

    /// Manage trials
    Trial {
        #[command(subcommand)]
        command: TrialCommands,
    },

    /// Fetch content for a trial by sequence number
    Fetch {
        /// Trial ID (UUID)
        trial_id: String,

        /// Sequence number (wraps around the prepared selection)
        #[arg(allow_negative_numbers = true)]
        seq: i64,
    },

    /// Show resolved configuration (debug)
    Config,
}

#[derive(Subcommand, Debug)]
pub enum MediaCommands {
    /// Add a single file to the catalog
    Add {
        /// File to copy into the media root
        file: PathBuf,

        /// Tags to apply (space-separated)
        #[arg(short, long, default_value = "")]
        tag: String,
    },

    /// Add every file in a directory matching a glob pattern
    Import {
        /// Directory to scan
        dir: PathBuf,

        /// Glob pattern relative to the directory
        #[arg(short, long, default_value = "*")]
        pattern: String,

        /// Tags to apply (space-separated)
        #[arg(short, long, default_value = "")]
        tag: String,
    },

    /// List catalog entries, newest first
    List,
}

#[derive(Subcommand, Debug)]
pub enum LogicCommands {
    /// Create a new logic
    Create {
        /// Selector to use
        #[arg(short, long, value_enum)]
        implement: ImplementArg,

        /// Extension filter (space-separated, "*" for any)
        #[arg(short, long, default_value = "*")]
        ext: String,

        /// Tag filter (space-separated, "*" for any)
        #[arg(short, long, default_value = "*")]
        tag: String,

        /// Serving order (sequential or shuffle)
        #[arg(short, long, default_value = "sequential")]
        order: MediaOrder,
    },

    /// Prepare a logic's selection
    Prep {
        /// Logic ID
        logic_id: i64,
    },

    /// Show a logic and its state log
    Show {
        /// Logic ID
        logic_id: i64,
    },

    /// Delete a logic and its cached data
    Delete {
        /// Logic ID
        logic_id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum TrialCommands {
    /// Create a trial bound to a logic
    Create {
        /// Logic ID
        logic_id: i64,
    },
}

/// Selector variant for CLI (maps to Implementation)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImplementArg {
    Media,
    Text,
    Blank,
}

impl From<ImplementArg> for Implementation {
    fn from(arg: ImplementArg) -> Self {
        match arg {
            ImplementArg::Media => Implementation::Media,
            ImplementArg::Text => Implementation::Text,
            ImplementArg::Blank => Implementation::Blank,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;

        match self.command {
            Commands::Config => show_config(cfg),
            Commands::Media { command } => execute_media(&open_store(cfg)?, command).await,
            Commands::Logic { command } => {
                let dispatcher = Dispatcher::new(open_store(cfg)?, cfg.selection);
                execute_logic(&dispatcher, command).await
            }
            Commands::Trial { command } => execute_trial(&open_store(cfg)?, command).await,
            Commands::Fetch { trial_id, seq } => {
                let dispatcher = Dispatcher::new(open_store(cfg)?, cfg.selection);
                fetch(&dispatcher, &trial_id, seq).await
            }
        }
    }
}

/// Open the configured SQLite store
fn open_store(cfg: &ResolvedConfig) -> Result<SqliteStore> {
    SqliteStore::open(&cfg.database, &cfg.media_root, cfg.media_url.as_str())
        .with_context(|| format!("Failed to open database: {}", cfg.database.display()))
}

/// Execute media subcommands
async fn execute_media(store: &SqliteStore, command: MediaCommands) -> Result<()> {
    match command {
        MediaCommands::Add { file, tag } => {
            let record = store
                .add_media(&file, &tag)
                .await
                .with_context(|| format!("Failed to add media: {}", file.display()))?;
            println!("Added media {} ({}) -> {}", record.id, record.ext, record.content_url);
            Ok(())
        }
        MediaCommands::Import { dir, pattern, tag } => import_media(store, &dir, &pattern, &tag).await,
        MediaCommands::List => list_media(store).await,
    }
}

/// Add every regular file under `dir` matching `pattern`
async fn import_media(store: &SqliteStore, dir: &Path, pattern: &str, tag: &str) -> Result<()> {
    let full_pattern = dir.join(pattern);
    let full_pattern = full_pattern
        .to_str()
        .with_context(|| format!("Pattern is not valid UTF-8: {}", full_pattern.display()))?;

    let mut imported = 0usize;
    for entry in glob::glob(full_pattern).with_context(|| format!("Invalid pattern: {}", pattern))? {
        let path = entry.context("Failed to read directory entry")?;
        if !path.is_file() {
            continue;
        }

        let record = store
            .add_media(&path, tag)
            .await
            .with_context(|| format!("Failed to add media: {}", path.display()))?;
        println!("  {:<6} {:<6} {}", record.id, record.ext, path.display());
        imported += 1;
    }

    println!("\nImported {} files", imported);
    Ok(())
}

/// List the media catalog
async fn list_media(store: &SqliteStore) -> Result<()> {
    let records = store.list_media(CatalogOrdering::IdDescending).await?;

    if records.is_empty() {
        println!("Catalog is empty. Use 'r3 media add <file>' to add content.");
        return Ok(());
    }

    println!("{:<8} {:<6} {:<30} {:<40}", "ID", "EXT", "TAGS", "URL");
    println!("{}", "-".repeat(86));

    for record in &records {
        println!(
            "{:<8} {:<6} {:<30} {:<40}",
            record.id, record.ext, record.tag, record.content_url
        );
    }

    println!("\nTotal: {} items", records.len());
    Ok(())
}

/// Execute logic subcommands
async fn execute_logic(dispatcher: &Dispatcher<SqliteStore>, command: LogicCommands) -> Result<()> {
    match command {
        LogicCommands::Create {
            implement,
            ext,
            tag,
            order,
        } => {
            let implementation = Implementation::from(implement);
            let logic = dispatcher
                .store()
                .create_logic(implementation.as_str(), &ext, &tag, order)
                .await?;
            println!("Created logic {} ({})", logic.id, logic.implement);
            Ok(())
        }
        LogicCommands::Prep { logic_id } => {
            let logic = dispatcher
                .prepare_by_id(logic_id)
                .await
                .with_context(|| format!("Failed to prepare logic {}", logic_id))?;
            println!("Prepared logic {}: {} items", logic.id, logic.media_count);
            Ok(())
        }
        LogicCommands::Show { logic_id } => {
            let logic = dispatcher
                .store()
                .get_logic(logic_id)
                .await?
                .with_context(|| format!("Logic not found: {}", logic_id))?;

            println!("Logic ID:   {}", logic.id);
            println!("Implement:  {}", logic.implement);
            println!("Extensions: {}", logic.media_ext);
            println!("Tags:       {}", logic.media_tag);
            println!("Order:      {}", logic.media_order);
            println!("Count:      {}", logic.media_count);
            println!("\nState:");
            for line in logic.state.lines() {
                match parse_entry(line) {
                    Some((at, message)) => println!("  [{}] {}", at.format("%H:%M:%S"), message),
                    None => println!("  {}", line),
                }
            }
            Ok(())
        }
        LogicCommands::Delete { logic_id } => {
            if dispatcher.delete_logic(logic_id).await? {
                println!("Deleted logic {}", logic_id);
            } else {
                println!("Logic {} did not exist", logic_id);
            }
            Ok(())
        }
    }
}

/// Execute trial subcommands
async fn execute_trial(store: &SqliteStore, command: TrialCommands) -> Result<()> {
    match command {
        TrialCommands::Create { logic_id } => {
            store
                .get_logic(logic_id)
                .await?
                .with_context(|| format!("Logic not found: {}", logic_id))?;

            let trial = Trial::new(logic_id);
            store.save_trial(&trial).await?;
            println!("{}", trial.id);
            Ok(())
        }
    }
}

/// Print the JSON payload for a trial's sequence number
async fn fetch(dispatcher: &Dispatcher<SqliteStore>, trial_id_str: &str, seq: i64) -> Result<()> {
    let trial_id = Uuid::parse_str(trial_id_str)
        .with_context(|| format!("Invalid trial ID: {}", trial_id_str))?;

    let payload = dispatcher.fetch_content_by_trial_id(trial_id, seq).await?;
    println!("{}", payload.to_json()?);
    Ok(())
}

/// Show resolved configuration
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    match &cfg.config_file {
        Some(path) => println!("Loaded from: {}", path.display()),
        None => println!("Loaded from: built-in defaults (no .r3/config.yaml found)"),
    }
    println!();
    println!("Paths:");
    println!("  Home:       {}", cfg.home.display());
    println!("  Database:   {}", cfg.database.display());
    println!("  Media root: {}", cfg.media_root.display());
    println!("  Media URL:  {}", cfg.media_url);
    println!();
    println!("Selection:");
    println!("  Max media count:  {}", cfg.selection.max_media_count);
    println!("  Catalog ordering: {}", cfg.selection.catalog_ordering);
    println!("  State retention:  {:?}", cfg.selection.state_retention);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logic_create_parses_order() {
        let cli = Cli::try_parse_from(["r3", "logic", "create", "-i", "text", "-o", "SHUFFLE"]).unwrap();
        match cli.command {
            Commands::Logic {
                command: LogicCommands::Create { order, ext, .. },
            } => {
                assert_eq!(order, MediaOrder::Shuffle);
                assert_eq!(ext, "*");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_logic_create_rejects_unknown_order() {
        let err = Cli::try_parse_from(["r3", "logic", "create", "-i", "media", "-o", "random"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("invalid media order"));
    }

    #[test]
    fn test_default_log_filter_parses() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_fetch_accepts_negative_seq() {
        let trial = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["r3", "fetch", trial.as_str(), "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Fetch { seq: -1, .. }));
    }
}
