/// Elementa - narrated periodic table player
use anyhow::Context;
use clap::{Parser, Subcommand};
use elementa_audio_desktop::DesktopBackend;
use elementa_catalog::{CatalogClient, ItemRegistry};
use elementa_cli::{catalog, config::AppConfig, display};
use elementa_core::{Item, ItemId};
use elementa_playback::{AudioBackend, PlaybackEvent, SessionCoordinator, SilentBackend};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const APP_KEY_HELP: &str = "The catalog requires an app key: set ELEMENTA_CATALOG__APP_KEY \
or app_key under [catalog] in elementa.toml. Run `elementa config` to check.";

const DEFAULT_LOG_FILTER: &str =
    "elementa=info,elementa_playback=info,elementa_catalog=info,elementa_audio_desktop=info";

#[derive(Parser)]
#[command(name = "elementa")]
#[command(about = "Browse and listen to the narrated periodic table")]
#[command(after_help = APP_KEY_HELP)]
struct Cli {
    /// Configuration file path (defaults to ./elementa.toml when present)
    #[arg(short, long, global = true, env = "ELEMENTA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all elements
    List {
        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Search by name, symbol, number, category, discoverer, phase or summary
    Search {
        /// Search text (accents and case are ignored)
        query: String,
    },
    /// Show the details of one element
    Show {
        /// Atomic number
        id: u32,
    },
    /// Play an element's narration
    Play {
        /// Atomic number
        id: u32,
        /// Stop after this many seconds
        #[arg(short, long)]
        seconds: Option<u64>,
        /// Skip the audio device and simulate playback
        #[arg(long)]
        simulated: bool,
    },
    /// Print the effective configuration
    ///
    /// Values come from elementa.toml (or --config) overlaid with ELEMENTA_* environment
    /// variables. The catalog app key has no default: set `app_key` under `[catalog]` or
    /// export ELEMENTA_CATALOG__APP_KEY before listing or playing anything.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;

    if let Commands::Config = cli.command {
        println!("{:#?}", config.redacted());
        if let Err(e) = config.validate() {
            println!("\n{}", e);
        }
        return Ok(());
    }

    config.validate()?;
    let client = CatalogClient::new(config.catalog_config())?;

    match cli.command {
        Commands::List { category } => {
            let registry = catalog::load_registry_or_empty(&client).await;
            let items = match category.as_deref() {
                Some(category) => registry.by_category(category),
                None => registry.items().iter().collect(),
            };
            print_rows(&items, "No elements found");
        }
        Commands::Search { query } => {
            let registry = catalog::load_registry_or_empty(&client).await;
            let items = registry.search(&query);
            let empty_message = if registry.is_empty() {
                "No elements found".to_string()
            } else {
                format!("No matches for \"{}\"", query.trim())
            };
            print_rows(&items, &empty_message);
        }
        Commands::Show { id } => {
            let registry = load_registry(&client).await?;
            let item = find(&registry, id)?;
            print!("{}", display::item_details(item));
        }
        Commands::Play {
            id,
            seconds,
            simulated,
        } => {
            let registry = load_registry(&client).await?;
            let item = find(&registry, id)?.clone();
            play(&config, item, seconds, simulated).await;
        }
        Commands::Config => {}
    }

    Ok(())
}

async fn load_registry(client: &CatalogClient) -> anyhow::Result<ItemRegistry> {
    catalog::load_registry(client)
        .await
        .with_context(|| format!("loading catalog from {}", client.base_url()))
}

fn find(registry: &ItemRegistry, id: u32) -> anyhow::Result<&Item> {
    registry
        .get(ItemId::new(id))
        .with_context(|| format!("no element with atomic number {}", id))
}

fn print_rows(items: &[&Item], empty_message: &str) {
    if items.is_empty() {
        println!("{}", empty_message);
        return;
    }
    for item in items {
        println!("{}", display::item_row(item));
    }
}

/// Play until the item finishes, the time budget runs out or Ctrl-C
async fn play(config: &AppConfig, item: Item, seconds: Option<u64>, simulated: bool) {
    let backend: Arc<dyn AudioBackend> = if simulated {
        Arc::new(SilentBackend)
    } else {
        match DesktopBackend::new(&config.audio.assets_dir) {
            Ok(backend) => Arc::new(backend),
            Err(e) => {
                tracing::warn!(error = %e, "Desktop audio unavailable, simulating");
                Arc::new(SilentBackend)
            }
        }
    };

    let coordinator = SessionCoordinator::new(backend, config.playback_config());
    let mut snapshots = coordinator.subscribe();
    let mut events = coordinator.events();

    println!("{}", display::item_row(&item));
    coordinator.play(item).await;

    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
    let mut last_line = String::new();

    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        let line = display::progress_line(&snapshot);
        if line != last_line {
            println!("{}", line);
            last_line = line;
        }
        if snapshot.finished {
            break;
        }

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(PlaybackEvent::SimulatedFallback { reason, .. }) => {
                    println!("No audio ({}), simulating playback", reason);
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            () = sleep_until(deadline) => {
                println!("Time limit reached");
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    coordinator.stop().await;
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
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
    fn help_explains_the_app_key() {
        let mut command = Cli::command();
        let help = command.render_long_help().to_string();
        assert!(help.contains("ELEMENTA_CATALOG__APP_KEY"));

        let config = command
            .find_subcommand_mut("config")
            .expect("config subcommand");
        let help = config.render_long_help().to_string();
        assert!(help.contains("ELEMENTA_CATALOG__APP_KEY"));
    }
}
