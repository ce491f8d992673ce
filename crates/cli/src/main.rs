//! MyStore CLI - a terminal front end over the cart core.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog and fill the cart
//! mystore products
//! mystore cart add 65a1f0c2 --quantity 2
//! mystore cart set 65a1f0c2 3
//! mystore cart show
//!
//! # Sign in and place the order
//! MYSTORE_PASSWORD=... mystore login shopper@example.com
//! mystore checkout
//! ```
//!
//! # Commands
//!
//! - `cart` - Show or change the stored cart
//! - `products` - List the product catalog
//! - `login` / `register` / `logout` - Manage the session
//! - `checkout` - Submit the cart as an order
//!
//! # Environment Variables
//!
//! - `MYSTORE_STORAGE_PATH` - Cart and session file (default: `.mystore/storage.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN (optional)
//! - everything read by `CartConfig::from_env`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mystore_cart::{CartConfig, FileStorage, Storefront};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "mystore")]
#[command(author, version, about = "MyStore storefront CLI")]
struct Cli {
    /// File holding the cart and session tokens
    #[arg(
        long,
        global = true,
        env = "MYSTORE_STORAGE_PATH",
        default_value = ".mystore/storage.json"
    )]
    storage: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List the product catalog
    Products,
    /// Sign in and store the session token
    Login {
        /// Account email address
        email: String,

        /// Account password
        #[arg(long, env = "MYSTORE_PASSWORD", hide_env_values = true)]
        password: String,

        /// Sign in as a store administrator
        #[arg(long)]
        admin: bool,
    },
    /// Create a customer account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(long, env = "MYSTORE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget all session tokens
    Logout,
    /// Submit the cart as an order
    Checkout,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show line items and totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product id
        id: String,

        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Display name (skips the catalog lookup together with --price)
        #[arg(long, requires = "price")]
        name: Option<String>,

        /// Displayed unit price, e.g. "$12.50"
        #[arg(long, requires = "name")]
        price: Option<String>,

        /// Image URL or file name
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Change the quantity of a line item (values below 1 become 1)
    Set {
        /// Product id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line item
    Remove {
        /// Product id
        id: String,
    },
    /// Empty the cart
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|v| !v.is_empty())?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Map tracing levels to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let _sentry_guard = init_sentry();

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mystore_cart=info,mystore_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    let storage = Arc::new(FileStorage::open(cli.storage)?);
    let storefront = Storefront::new(config, storage)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront)?,
            CartAction::Add {
                id,
                quantity,
                name,
                price,
                image,
            } => {
                let manual = name.zip(price);
                commands::cart::add(&storefront, &id, quantity, manual, &image).await?;
            }
            CartAction::Set { id, quantity } => {
                commands::cart::set_quantity(&storefront, &id, quantity)?;
            }
            CartAction::Remove { id } => commands::cart::remove(&storefront, &id)?,
            CartAction::Clear => commands::cart::clear(&storefront)?,
        },
        Commands::Products => commands::catalog::list(&storefront).await?,
        Commands::Login {
            email,
            password,
            admin,
        } => commands::account::login(&storefront, &email, password, admin).await?,
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(&storefront, &name, &email, password).await?,
        Commands::Logout => commands::account::logout(&storefront)?,
        Commands::Checkout => commands::checkout::submit(&storefront).await?,
    }
    Ok(())
}
