//! Storefront command line front end
//!
//! Renders the catalog, an event's detail page and the purchase confirmation
//! as text.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use storefront::api::{EventsApi, GraphQlEventsApi, StubEventsApi};
use storefront::view::{QuantityPicker, render_confirmation, render_detail, render_list_item};
use storefront::{Storefront, StorefrontConfig, StorefrontEnvironment};
use storefront_core::environment::SystemClock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Browse events and buy tickets
#[derive(Debug, Parser)]
#[command(name = "storefront", version, about)]
struct Cli {
    /// GraphQL endpoint (overrides `STOREFRONT_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Serve a built-in catalog instead of calling the API
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every event
    List,
    /// Show one event
    Show {
        /// Event id
        id: String,
    },
    /// Buy tickets for an event
    Buy {
        /// Event id
        id: String,
        /// Number of tickets
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = StorefrontConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let api: Arc<dyn EventsApi> = if cli.demo {
        tracing::info!("Using the built-in demo catalog");
        Arc::new(StubEventsApi::default())
    } else {
        tracing::info!(endpoint = %config.api_url, "Using the events API");
        Arc::new(GraphQlEventsApi::from_config(&config).context("building HTTP client")?)
    };

    let env = StorefrontEnvironment::new(api, Arc::new(SystemClock));
    let storefront = Storefront::start_with_capacity(env, config.broadcast_capacity).await;

    if let Err(error) = storefront.wait_for_catalog().await {
        bail!("Error loading events: {error}");
    }

    match cli.command {
        Command::List => list(&storefront).await,
        Command::Show { id } => show(&storefront, id).await,
        Command::Buy { id, quantity } => buy(&storefront, id, quantity).await,
    }
}

async fn list(storefront: &Storefront) -> anyhow::Result<()> {
    let snapshot = storefront.snapshot().await;
    if snapshot.events.is_empty() {
        println!("No events available");
        return Ok(());
    }

    println!("Upcoming Events\n");
    for event in &snapshot.events {
        println!("{}\n", render_list_item(event));
    }
    Ok(())
}

async fn show(storefront: &Storefront, id: String) -> anyhow::Result<()> {
    storefront.select(id).await;
    let Some(event) = storefront.snapshot().await.current_event else {
        bail!("Event not found");
    };

    println!("{}", render_detail(&event));
    let picker = QuantityPicker::for_event(&event);
    if picker.can_purchase() {
        println!("\n1 ticket: {}", picker.total());
    }
    Ok(())
}

async fn buy(storefront: &Storefront, id: String, quantity: i64) -> anyhow::Result<()> {
    storefront.select(id.clone()).await;

    let receipt = match storefront.purchase(id, quantity).await {
        Ok(receipt) => receipt,
        Err(error) => bail!("Purchase failed: {error}"),
    };

    let snapshot = storefront.snapshot().await;
    let order = snapshot
        .order
        .context("purchase succeeded but no order was recorded")?;
    println!("{}", render_confirmation(&receipt.order_number, &order));

    if let Some(event) = snapshot.current_event {
        println!("\nTickets left for {}: {}", event.name, event.tickets_available);
    }

    storefront.reset_order().await;
    Ok(())
}
