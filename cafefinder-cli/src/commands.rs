//! CLI command implementations

use anyhow::Context;
use cafefinder_core::{CafeFinderConfig, Coordinates, RuntimeMode};
use cafefinder_search::{Cafe, CafeSearchService, GeocodingService, SearchQuery, SortOrder};
use clap::Subcommand;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Server {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
        /// Runtime mode (production or development)
        #[arg(long, default_value = "development")]
        mode: RuntimeMode,
    },
    /// Resolve an address to coordinates
    Geocode {
        /// Free-form address
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,
    },
    /// Resolve coordinates to an address
    #[command(allow_negative_numbers = true)]
    Reverse {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lng: f64,
    },
    /// Search for cafés around a point
    #[command(allow_negative_numbers = true)]
    Search {
        /// Latitude in degrees
        #[arg(long)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long)]
        lng: f64,
        /// Search radius in metres
        #[arg(short, long, default_value = "1000")]
        radius: u32,
        /// Number of cafés to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Ordering: distance or rating
        #[arg(long, default_value = "distance")]
        sort: SortOrder,
        /// Runtime mode (production or development)
        #[arg(long, default_value = "production")]
        mode: RuntimeMode,
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns the failure of the command that ran
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Server { host, port, mode } => start_server(host, port, mode).await,
        Commands::Geocode { address } => geocode(&address.join(" ")).await,
        Commands::Reverse { lat, lng } => reverse(lat, lng).await,
        Commands::Search {
            lat,
            lng,
            radius,
            limit,
            sort,
            mode,
            json,
        } => search(lat, lng, radius, limit, sort, mode, json).await,
    }
}

/// Start the API server
///
/// # Errors
/// Fails when the configuration is invalid or the address cannot be bound
pub async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    mode: RuntimeMode,
) -> anyhow::Result<()> {
    let mut config = mode.config();
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("Starting CafeFinder API on http://{}", config.bind_address());
    println!("Mode: {mode}");
    if mode.is_development() {
        println!("Serving synthetic cafés; upstream services are not contacted");
    }

    cafefinder_web::run_server(config, mode)
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {e}"))
}

fn production_config() -> anyhow::Result<CafeFinderConfig> {
    let config = RuntimeMode::Production.config();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Print the coordinates of an address
///
/// # Errors
/// Fails when no geocoder can resolve the address
pub async fn geocode(address: &str) -> anyhow::Result<()> {
    let geocoding = GeocodingService::from_config(&production_config()?)?;
    let location = geocoding
        .geocode(address)
        .await
        .with_context(|| format!("Failed to geocode '{address}'"))?;

    println!("{:.6}, {:.6}", location.lat, location.lng);
    if let Some(resolved) = location.address {
        println!("{resolved}");
    }
    Ok(())
}

/// Print the address at a point
///
/// # Errors
/// Fails for invalid coordinates or when no geocoder answers
pub async fn reverse(lat: f64, lng: f64) -> anyhow::Result<()> {
    let at = Coordinates::validated(lat, lng)?;
    let geocoding = GeocodingService::from_config(&production_config()?)?;
    let address = geocoding
        .reverse_geocode(at)
        .await
        .with_context(|| format!("Failed to reverse geocode {at}"))?;

    println!("{address}");
    Ok(())
}

/// Print the nearest cafés around a point
///
/// # Errors
/// Fails for invalid coordinates or configuration
pub async fn search(
    lat: f64,
    lng: f64,
    radius: u32,
    limit: usize,
    sort: SortOrder,
    mode: RuntimeMode,
    json: bool,
) -> anyhow::Result<()> {
    let centre = Coordinates::validated(lat, lng)?;
    let config = mode.config();
    config.validate().context("Invalid configuration")?;

    let service = CafeSearchService::from_config(&config)?;
    let query = SearchQuery::new(centre, service.effective_radius(radius))
        .with_sort(sort)
        .with_page(1, limit);
    let outcome = service.search(&query).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.cafes)?);
        return Ok(());
    }

    println!(
        "{} cafés within {} m of {centre} (source: {})",
        outcome.total, query.radius_m, outcome.source
    );
    if let Some(message) = &outcome.message {
        println!("{message}");
    }
    println!();
    println!("{:<32} {:>8} {:>6} {:>6}  Address", "Name", "Distance", "Rating", "Open");
    println!("{}", "-".repeat(80));
    for cafe in &outcome.cafes {
        println!("{}", table_row(cafe));
    }

    Ok(())
}

fn table_row(cafe: &Cafe) -> String {
    let rating = cafe
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));
    let open = match cafe.open_now {
        Some(true) => "yes",
        Some(false) => "no",
        None => "?",
    };
    let name: String = cafe.name.chars().take(32).collect();
    format!(
        "{name:<32} {:>7.0}m {rating:>6} {open:>6}  {}",
        cafe.distance, cafe.address
    )
}
