use anyhow::Result;
use cinescope::render::{render_detail, MovieCard};
use cinescope::{CatalogConfig, DetailController, ListingController, TmdbClient};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Browse the TMDB movie catalog from the terminal.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// API key (defaults to TMDB_API_KEY).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API base URL (defaults to TMDB_BASE_URL or the public endpoint).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Image host prefix for poster paths.
    #[arg(long, global = true)]
    image_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List popular movies.
    Popular {
        /// Number of pages to load.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Search movies by title.
    Search {
        query: String,
        /// Number of result pages to load.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Show one movie.
    Detail { id: i32 },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn resolve_config(cli: &Cli) -> Result<CatalogConfig> {
    let mut config = CatalogConfig::from_env_with_key(cli.api_key.clone())?;
    if let Some(base) = &cli.base_url {
        config = config.with_base_url(base.clone());
    }
    if let Some(images) = &cli.image_base_url {
        config = config.with_image_base_url(images.clone());
    }
    Ok(config)
}

fn print_listing(controller: &ListingController, config: &CatalogConfig) {
    for movie in controller.items() {
        println!("{}\n", MovieCard::from_summary(movie, config).lines().join("\n"));
    }
    info!(
        "{} movies across {} page(s), more available: {}",
        controller.items().len(),
        controller.page(),
        controller.has_more()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_result = dotenv();
    init_tracing();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let client = TmdbClient::new(config.clone())?;

    match cli.command {
        Commands::Popular { pages } => {
            let mut controller = ListingController::new();
            controller.load_pages(&client, pages).await;
            print_listing(&controller, &config);
        }
        Commands::Search { query, pages } => {
            let mut controller = ListingController::new();
            controller.search_pages(&client, &query, pages).await;
            print_listing(&controller, &config);
        }
        Commands::Detail { id } => {
            let mut controller = DetailController::new(id);
            let state = controller.load(&client).await;
            println!("{}", render_detail(state, &config));
        }
    }
    Ok(())
}
