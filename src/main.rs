use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::error;

use bali_explorer::cache::ItineraryCache;
use bali_explorer::catalog::{Catalog, Category};
use bali_explorer::client::OpenRouterClient;
use bali_explorer::config::Config;
use bali_explorer::logging;
use bali_explorer::navigation::{LoggingCamera, MapCamera};
use bali_explorer::renderer;
use bali_explorer::service::ItineraryService;

#[derive(Parser)]
#[command(name = "bali_explorer")]
#[command(about = "AI itinerary engine for the Bali 3D Explorer")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch (or serve from cache) the AI itinerary for a destination
    Itinerary {
        /// Destination id, e.g. uluwatu-temple
        destination: String,
        /// Ignore any cached entry and fetch a fresh itinerary
        #[arg(long)]
        refresh: bool,
        /// Print rendered HTML instead of the normalized JSON
        #[arg(long)]
        html: bool,
    },
    /// List catalog destinations
    Catalog {
        /// Restrict to one category, e.g. beach-clubs
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive name search
        #[arg(long)]
        search: Option<String>,
    },
    /// Remove expired itinerary cache entries
    PurgeCache,
    /// Empty the itinerary cache and its durable store
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    let catalog = Catalog::load()?;

    match cli.command {
        Commands::Itinerary {
            destination,
            refresh,
            html,
        } => {
            let Some(record) = catalog.get(&destination) else {
                println!("⚠️  Unknown destination: {destination}");
                println!("   Try `bali_explorer catalog` to list valid ids.");
                std::process::exit(1);
            };

            let cache = Arc::new(ItineraryCache::load(
                &config.cache.path,
                config.cache.retention_hours,
            ));
            if refresh {
                cache.remove(&record.id);
            }
            let client = Arc::new(OpenRouterClient::new(config.proxy.clone())?);
            let service = ItineraryService::new(cache, client, config.proxy.attempts);

            // Selecting a destination moves the camera, then fills the panel.
            let camera = LoggingCamera;
            camera.fly_to_destination(record).await?;

            println!("🗺️  Fetching itinerary for {}...", record.name);
            match service.fetch_itinerary(record).await {
                Ok(itinerary) => {
                    if html {
                        println!("{}", renderer::render(&itinerary));
                    } else {
                        println!("{}", serde_json::to_string_pretty(&itinerary)?);
                    }
                    println!(
                        "✅ {} tour option(s) for {}",
                        itinerary.options.len(),
                        record.name
                    );
                }
                Err(e) => {
                    error!("Itinerary fetch failed: {}", e);
                    println!("❌ {e}");
                    println!("{}", renderer::render_error());
                    std::process::exit(1);
                }
            }
        }
        Commands::Catalog { category, search } => {
            if let Some(query) = search {
                for destination in catalog.search(&query) {
                    println!(
                        "{:<40} {:<22} ({:.4}, {:.4})",
                        destination.id,
                        destination.category.display_name(),
                        destination.coordinates.0,
                        destination.coordinates.1
                    );
                }
                return Ok(());
            }

            let categories: Vec<Category> = match category.as_deref() {
                Some(slug) => match Category::from_slug(slug) {
                    Some(c) => vec![c],
                    None => {
                        println!("⚠️  Unknown category: {slug}");
                        std::process::exit(1);
                    }
                },
                None => Category::ALL.to_vec(),
            };

            for category in categories {
                let destinations = catalog.by_category(category);
                if destinations.is_empty() {
                    continue;
                }
                println!("\n📍 {}", category.display_name());
                for destination in destinations {
                    println!(
                        "   {:<38} {} ({})",
                        destination.id, destination.name, destination.distance
                    );
                }
            }
        }
        Commands::PurgeCache => {
            let cache = ItineraryCache::load(&config.cache.path, config.cache.retention_hours);
            cache.purge_expired();
            println!("✅ Purged expired entries, {} remain", cache.len());
        }
        Commands::ClearCache => {
            let cache = ItineraryCache::load(&config.cache.path, config.cache.retention_hours);
            cache.clear();
            println!("✅ Itinerary cache cleared");
        }
    }
    Ok(())
}
