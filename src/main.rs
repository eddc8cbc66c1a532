//! Storehub - content hub for a retail outlet's team, gallery, news and guestbook
//!
//! Serves the HTTP API and offers a few operator commands that work directly
//! on the data directory.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storehub::{
    api::build_app,
    attachment::PendingImage,
    augment::{headlines, PromptKind},
    config::HubConfig,
    content::{CategoryFilter, MemoryCategory, NewsCategory, TeamMemberDraft},
    hub::{Collection, ContentHub},
    session::AdminToken,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "storehub")]
#[command(version)]
#[command(about = "Content hub for a store's team, memories, news and guestbook")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STOREHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print a collection as JSON
    List {
        /// team, memories, news or guestbook
        collection: Collection,

        /// Category filter for memories and news
        #[arg(long)]
        category: Option<String>,
    },

    /// Add a team member with a photo from disk
    AddMember {
        #[arg(long)]
        name: String,

        #[arg(long)]
        role: String,

        #[arg(long)]
        quote: Option<String>,

        /// PNG, JPEG, GIF or WebP file
        #[arg(long)]
        photo: PathBuf,
    },

    /// Delete an entity by id
    Delete { collection: Collection, id: String },

    /// Restore a collection's seed content
    Reset { collection: Collection },

    /// Generate flash news headlines
    FlashNews,

    /// Generate the team synergy sentence
    Vibe,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("storehub={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => HubConfig::from_file(path)?,
        None => HubConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => run_server(config, host, port).await?,
        Commands::List {
            collection,
            category,
        } => list(config, collection, category.as_deref()).await?,
        Commands::AddMember {
            name,
            role,
            quote,
            photo,
        } => add_member(config, name, role, quote, photo).await?,
        Commands::Delete { collection, id } => {
            let hub = ContentHub::open(config).await?;
            if hub.delete(collection, &id).await {
                println!("Deleted {} from {}", id, collection);
            } else {
                println!("Nothing with id {} in {}", id, collection);
            }
            flush(&hub).await;
        }
        Commands::Reset { collection } => {
            let hub = ContentHub::open(config).await?;
            hub.reset(collection).await?;
            println!("Restored seed content of {}", collection);
        }
        Commands::FlashNews => {
            let hub = ContentHub::open(config).await?;
            let text = hub.augment.generate(&PromptKind::FlashNews).await;
            for line in headlines(&text) {
                println!("• {}", line);
            }
        }
        Commands::Vibe => {
            let hub = ContentHub::open(config).await?;
            let names = hub.team.list().await.into_iter().map(|m| m.name).collect();
            println!(
                "{}",
                hub.augment
                    .generate(&PromptKind::TeamSynergy { names })
                    .await
            );
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(config: HubConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.gateway.host.clone());
    let port = port.unwrap_or(config.gateway.port);
    let auth = AdminToken::from_config(&config.gateway);

    let hub = Arc::new(ContentHub::open(config).await?);
    let app = build_app(hub.clone(), auth);

    // Warm the team sentence so the first page view has one
    {
        let hub = hub.clone();
        tokio::spawn(async move {
            let names = hub.team.list().await.into_iter().map(|m| m.name).collect();
            hub.team_vibe
                .refresh(&hub.augment, &PromptKind::TeamSynergy { names })
                .await;
        });
    }

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;
    tracing::info!("Storehub listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down, flushing collections...");
    match tokio::time::timeout(SHUTDOWN_FLUSH_TIMEOUT, hub.flush_all()).await {
        Ok(Ok(())) => tracing::info!("All collections flushed"),
        Ok(Err(e)) => tracing::warn!("Flush on shutdown incomplete: {}", e),
        Err(_) => tracing::warn!("Flush on shutdown timed out"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn list(config: HubConfig, collection: Collection, category: Option<&str>) -> Result<()> {
    let hub = ContentHub::open(config).await?;
    let json = match (collection, category) {
        (Collection::Memories, Some(raw)) => {
            let filter: CategoryFilter<MemoryCategory> =
                raw.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            serde_json::to_string_pretty(&hub.memories.list_filtered(&filter).await)?
        }
        (Collection::News, Some(raw)) => {
            let filter: CategoryFilter<NewsCategory> =
                raw.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            serde_json::to_string_pretty(&hub.news.list_filtered(&filter).await)?
        }
        (_, Some(_)) => bail!("{} has no categories", collection),
        (Collection::Team, None) => serde_json::to_string_pretty(&hub.team.list().await)?,
        (Collection::Memories, None) => serde_json::to_string_pretty(&hub.memories.list().await)?,
        (Collection::News, None) => serde_json::to_string_pretty(&hub.news.list().await)?,
        (Collection::Guestbook, None) => serde_json::to_string_pretty(&hub.guestbook.list().await)?,
    };
    println!("{}", json);
    Ok(())
}

async fn add_member(
    config: HubConfig,
    name: String,
    role: String,
    quote: Option<String>,
    photo: PathBuf,
) -> Result<()> {
    let bytes = tokio::fs::read(&photo)
        .await
        .with_context(|| format!("Failed to read {}", photo.display()))?;

    let mut pending = PendingImage::new(config.images.max_bytes);
    pending.select(bytes).await?;

    let hub = ContentHub::open(config).await?;
    let member = hub
        .team
        .create(TeamMemberDraft {
            name,
            role,
            quote: quote.unwrap_or_default(),
            image_url: pending.take(),
        })
        .await?;
    println!("Added {} ({}) with id {}", member.name, member.role, member.id);

    flush(&hub).await;
    Ok(())
}

/// Persist everything before the process exits; failures are reported, not fatal
async fn flush(hub: &ContentHub) {
    if let Err(e) = hub.flush_all().await {
        eprintln!("Warning: change kept in memory only and will be lost: {}", e);
    }
}

fn show_config(config: Option<&HubConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
