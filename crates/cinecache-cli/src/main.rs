//! cinecache - a terminal client for browsing, searching and bookmarking
//! movies from a remote catalog.
//!
//! Fetched pages are kept on disk so previously seen results stay
//! available offline; favorites and preferences persist across runs.

mod render;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cinecache_core::auth::{AuthSession, CredentialStore};
use cinecache_core::images::ImageResolver;
use cinecache_core::models::ViewMode;
use cinecache_core::{
    ApiClient, CacheManager, Catalog, Config, FileStore, SearchSession, SessionStatus, UserState,
};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding the configured API key
const API_KEY_ENV: &str = "CINECACHE_API_KEY";

/// Environment variable naming a directory for daily log files
const LOG_DIR_ENV: &str = "CINECACHE_LOG_DIR";

/// Log file name prefix inside the log directory
const LOG_FILE_PREFIX: &str = "cinecache.log";

#[derive(Parser)]
#[command(name = "cinecache", version, about = "Browse, search and bookmark movies - works offline")]
struct Cli {
    /// Serve only from the disk cache
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Today's trending movies
    Trending {
        /// Only show this category id
        #[arg(long)]
        category: Option<u32>,
        /// Ignore the cached copy
        #[arg(long)]
        refresh: bool,
    },
    /// Search by title; reuses the last term when none is given
    Search {
        term: Option<String>,
        /// Pages to step through with load-more
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Only show this category id
        #[arg(long)]
        category: Option<u32>,
    },
    /// Full details for one movie
    Detail { id: u64 },
    /// List favorites
    Favorites,
    /// Add a movie to favorites
    FavAdd { id: u64 },
    /// Remove a movie from favorites
    FavRemove { id: u64 },
    /// Show or change the view mode
    View { mode: Option<ViewArg> },
    /// List categories
    Categories,
    /// Sign in with the demo account
    Login { email: String, password: String },
    /// Sign out
    Logout,
    /// Store the catalog API key in the OS keychain
    SetKey {
        #[arg(required_unless_present = "clear")]
        api_key: Option<String>,
        /// Remove the stored key instead
        #[arg(long, conflicts_with = "api_key")]
        clear: bool,
    },
    /// Show disk cache ages and size
    CacheStatus {
        /// Delete all cached pages
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Grid,
    List,
    Toggle,
}

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so buffered file logs flush.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Resolve the API key: environment, then config, then keychain.
fn resolve_api_key(config: &Config) -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.is_empty())
        .or_else(|| config.api_key.clone())
        .or_else(|| match CredentialStore::get_api_key() {
            Ok(key) => Some(key),
            Err(e) => {
                debug!(error = %e, "No API key in keychain");
                None
            }
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();
    let cli = Cli::parse();
    info!("cinecache starting");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let data_dir = config.data_dir().context("Failed to locate data directory")?;
    let store = FileStore::new(data_dir).context("Failed to open user data store")?;

    let mut api = ApiClient::new(&config.api_base_url)?;
    if let Some(key) = resolve_api_key(&config) {
        api.set_api_key(key);
    }

    let cache_dir = config.cache_dir().context("Failed to locate cache directory")?;
    let disk = CacheManager::new(cache_dir)?;
    let mut catalog = Catalog::new(Arc::new(api.clone())).with_disk_cache(disk);
    catalog.set_offline(cli.offline || config.offline_mode);

    if !api.has_api_key() && !catalog.is_offline() {
        warn!("No API key configured; set {} or run `cinecache set-key`", API_KEY_ENV);
    }

    let images = ImageResolver::new(&config.image_base_url);
    let mut user = UserState::load(store.clone());

    let result = run(cli.command, &catalog, &mut user, store, &images).await;
    info!("cinecache shutting down");
    result
}

async fn run(
    command: Command,
    catalog: &Catalog,
    user: &mut UserState<FileStore>,
    store: FileStore,
    images: &ImageResolver,
) -> Result<()> {
    match command {
        Command::Trending { category, refresh } => {
            let page = if refresh {
                catalog.refresh_trending().await?
            } else {
                catalog.trending().await?
            };
            let visible = cinecache_core::filter_by_category(&page.items, category);
            println!("Trending movies ({})", visible.len());
            render::print_items(&visible, &*user, images);
        }

        Command::Search { term, pages, category } => {
            let term = term.unwrap_or_else(|| user.last_search_term().to_string());
            if let Err(e) = user.set_last_search_term(&term) {
                warn!(error = %e, "Search term not saved");
            }

            let mut session = SearchSession::new();
            session.search(catalog, &term).await;
            for _ in 1..pages {
                if !session.load_more_from(catalog).await {
                    break;
                }
            }
            if let SessionStatus::Failed(e) = session.status() {
                anyhow::bail!("Error searching movies: {} (try again)", e);
            }

            session.select_category(category);
            render::print_search(&session, &*user, images);
        }

        Command::Detail { id } => {
            let detail = catalog.detail(id).await?;
            render::print_detail(&detail, user.is_favorite(id), images);
        }

        Command::Favorites => {
            render::print_favorites(user.favorites(), user.view_mode(), images);
        }

        Command::FavAdd { id } => {
            let detail = catalog.detail(id).await?;
            if user.add_favorite(&detail.item)? {
                println!("Added to favorites: {}", detail.item.title);
            } else {
                println!("Already a favorite: {}", detail.item.title);
            }
        }

        Command::FavRemove { id } => {
            if user.remove_favorite(id)? {
                println!("Removed from favorites: {}", id);
            } else {
                println!("Not a favorite: {}", id);
            }
        }

        Command::View { mode } => {
            let mode = match mode {
                None => user.view_mode(),
                Some(ViewArg::Toggle) => user.toggle_view_mode()?,
                Some(ViewArg::Grid) => {
                    user.set_view_mode(ViewMode::Grid)?;
                    ViewMode::Grid
                }
                Some(ViewArg::List) => {
                    user.set_view_mode(ViewMode::List)?;
                    ViewMode::List
                }
            };
            println!("View mode: {}", mode);
        }

        Command::Categories => {
            let categories = catalog.categories().await?;
            for category in &categories.categories {
                println!("{:>6}  {}", category.id, category.name);
            }
        }

        Command::Login { email, password } => {
            let mut auth = AuthSession::load(store);
            if auth.login(&email, &password)? {
                let mut config = Config::load().unwrap_or_default();
                config.last_username = Some(email.clone());
                if let Err(e) = config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                println!("Signed in as {}", email);
            } else {
                anyhow::bail!("Invalid email or password");
            }
        }

        Command::Logout => {
            let mut auth = AuthSession::load(store);
            auth.logout()?;
            println!("Signed out");
        }

        Command::SetKey { api_key, clear } => match api_key {
            Some(key) if !clear => {
                CredentialStore::store_api_key(&key)?;
                println!("API key stored in keychain");
            }
            _ => {
                CredentialStore::delete_api_key()?;
                println!("API key removed from keychain");
            }
        },

        Command::CacheStatus { clear } => {
            let Some(disk) = catalog.disk_cache() else {
                println!("No disk cache configured");
                return Ok(());
            };
            if clear {
                let removed = disk.clear()?;
                println!("Removed {} cached pages", removed);
                return Ok(());
            }
            let ages = disk.get_cache_ages();
            println!("Cache directory: {}", disk.cache_dir().display());
            println!("Cached queries:  {}", disk.entry_count()?);
            println!("Trending:        {}", ages.trending_age());
            println!("Categories:      {}", ages.categories_age());
            if disk.is_trending_stale() {
                println!("Trending is stale; run `cinecache trending --refresh`");
            }
        }
    }

    Ok(())
}
