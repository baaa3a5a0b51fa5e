//! Souk cart CLI - inspect and edit a persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! souk show
//!
//! # Add two units of a product
//! souk add sku-001 -q 2
//!
//! # Set a quantity (0 removes the line)
//! souk update sku-001 5
//!
//! # Seed an empty cart from a JSON file of line items
//! souk seed defaults.json
//!
//! # Build a checkout request and clear the cart
//! souk checkout --prices prices.json
//! ```
//!
//! Storage settings come from `SOUK_CART_*` environment variables (or a
//! `.env` file) and can be overridden with `--storage-dir` and `--key`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use souk_cart::CartConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "souk")]
#[command(author, version, about = "Souk cart tools")]
struct Cli {
    /// Directory of the file-backed store
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Slot key the cart is stored under
    #[arg(long, global = true)]
    key: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart and its total quantity
    Show,
    /// Add units of a product
    Add {
        /// Product ID
        product_id: String,

        /// Units to add (values below 1 count as 1)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Set a product's quantity (0 or less removes the line)
    Update {
        /// Product ID
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Seed an empty cart from a JSON array of line items
    Seed {
        /// Path to the defaults file
        file: PathBuf,
    },
    /// Build a checkout request from the cart
    Checkout {
        /// Path to a JSON price book keyed by product ID
        #[arg(short, long)]
        prices: PathBuf,

        /// Print the request without clearing the cart
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "souk_cart=info,souk=info".into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CartConfig::from_env()?;
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }
    if let Some(key) = cli.key {
        souk_cart::config::validate_key(&key).map_err(|e| format!("Invalid --key: {e}"))?;
        config.storage_key = key;
    }

    match cli.command {
        Commands::Show => commands::cart::show(&config)?,
        Commands::Add {
            product_id,
            quantity,
        } => commands::cart::add(&config, &product_id, quantity)?,
        Commands::Remove { product_id } => commands::cart::remove(&config, &product_id)?,
        Commands::Update {
            product_id,
            quantity,
        } => commands::cart::update(&config, &product_id, quantity)?,
        Commands::Clear => commands::cart::clear(&config)?,
        Commands::Seed { file } => commands::cart::seed(&config, &file)?,
        Commands::Checkout { prices, dry_run } => {
            commands::checkout::run(&config, &prices, dry_run)?;
        }
    }
    Ok(())
}
