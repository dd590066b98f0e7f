use anyhow::{Context, Result};
use clap::Parser;
use estate_search::backend::{ListingBackend, MemoryBackend, SupabaseBackend};
use estate_search::models::{Availability, BhkType, Furnishing, ListingTab, PropertyAge, PropertyType, SortBy};
use estate_search::search::{BudgetRange, FilterUpdate, SearchSession, ShareableUrl};
use estate_search::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "estate-search")]
#[command(about = "Search property listings the way the marketplace search page does")]
#[command(version)]
struct Cli {
    /// Listing tab: buy, rent or commercial
    #[arg(long, default_value = "buy")]
    tab: ListingTab,

    /// City or area text
    #[arg(long)]
    location: Option<String>,

    /// Property type label, repeatable (e.g. "PG HOSTEL")
    #[arg(long = "property-type")]
    property_types: Vec<PropertyType>,

    #[arg(long)]
    bhk: Vec<BhkType>,

    #[arg(long)]
    furnished: Vec<Furnishing>,

    #[arg(long)]
    availability: Vec<Availability>,

    /// Age of construction
    #[arg(long)]
    age: Vec<PropertyAge>,

    #[arg(long)]
    locality: Vec<String>,

    #[arg(long)]
    budget_min: Option<u64>,

    #[arg(long)]
    budget_max: Option<u64>,

    #[arg(long)]
    sort: Option<SortBy>,

    /// Start from a shared link query, e.g. "type=rent&location=Pune"
    #[arg(long)]
    share: Option<String>,

    /// Read listings from a JSON fixture instead of the hosted backend
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Write the results as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::init().context("Failed to load configuration")?;

    info!("🏠 Estate Search");

    match &cli.fixture {
        Some(path) => {
            let backend = MemoryBackend::from_fixture_file(path)
                .await
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            run(Arc::new(backend), &config, &cli).await
        }
        None => {
            let backend_config = config
                .backend
                .as_ref()
                .context("SUPABASE_URL and SUPABASE_ANON_KEY must be set, or pass --fixture")?;
            let backend = SupabaseBackend::new(backend_config).context("Failed to create backend client")?;
            run(Arc::new(backend), &config, &cli).await
        }
    }
}

async fn run<B: ListingBackend>(backend: Arc<B>, config: &Config, cli: &Cli) -> Result<()> {
    let mut session = match &cli.share {
        Some(query) => {
            let url = ShareableUrl::parse(query).context("Invalid share link")?;
            SearchSession::from_share_url(backend, config, &url)
        }
        None => {
            let mut session = SearchSession::new(backend, config);
            session.set_tab(cli.tab);
            session
        }
    };

    apply_filters(&mut session, cli, config)?;

    info!("Searching {} listings...", session.tab());
    let response = session.refresh().await.clone();

    if let Some(message) = session.error() {
        anyhow::bail!("{}", message);
    }

    if response.is_empty() {
        println!("No properties match these filters.");
    }

    for (i, record) in response.records.iter().enumerate() {
        let badge = if record.is_new { " [NEW]" } else { "" };
        println!("{}. {}{} ({})", i + 1, record.title, badge, record.price);
        println!("   {} · {}", record.property_type, record.area);
        if !record.location.is_empty() {
            println!("   Location: {}", record.location);
        }
        if let Some(bedrooms) = record.bedrooms {
            println!("   Bedrooms: {}", bedrooms);
        }
        println!("   ID: {}", record.id);
        println!();
    }

    info!(
        "✅ Showing {} of {} properties{}",
        response.records.len(),
        response.total,
        if response.has_more { " (more available)" } else { "" }
    );
    println!("Share: ?{}", session.share_url().to_query()?);

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&response)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("💾 Saved results to {}", path.display());
    }

    Ok(())
}

fn apply_filters<B: ListingBackend>(session: &mut SearchSession<B>, cli: &Cli, config: &Config) -> Result<()> {
    if let Some(location) = &cli.location {
        session.commit_location(location.clone());
    }
    if !cli.property_types.is_empty() {
        session.update(FilterUpdate::PropertyType(cli.property_types.clone()));
    }
    if !cli.bhk.is_empty() {
        session.update(FilterUpdate::BhkType(cli.bhk.clone()));
    }
    if !cli.furnished.is_empty() {
        session.update(FilterUpdate::Furnished(cli.furnished.clone()));
    }
    if !cli.availability.is_empty() {
        session.update(FilterUpdate::Availability(cli.availability.clone()));
    }
    if !cli.age.is_empty() {
        session.update(FilterUpdate::Construction(cli.age.clone()));
    }
    if !cli.locality.is_empty() {
        session.update(FilterUpdate::Locality(cli.locality.clone()));
    }
    if cli.budget_min.is_some() || cli.budget_max.is_some() {
        let budget = BudgetRange::new(
            cli.budget_min.unwrap_or(0),
            cli.budget_max.unwrap_or(config.budget_max),
        )?;
        session.update(FilterUpdate::Budget(budget));
    }
    if let Some(sort) = cli.sort {
        session.update(FilterUpdate::SortBy(sort));
    }
    Ok(())
}
