//! Paintshop CLI - catalog listings and price quotes.
//!
//! # Usage
//!
//! ```bash
//! # List products, shipping options and promo codes
//! paintshop catalog
//! paintshop shipping
//! paintshop promos
//!
//! # Quote a cart
//! paintshop quote -l signature-interior,sage-leaf,eggshell,2 -s express -p SAVE10
//! ```
//!
//! # Commands
//!
//! - `catalog` - List products with colors and finish prices
//! - `shipping` - List shipping options
//! - `promos` - List promo codes
//! - `quote` - Price a set of lines the way checkout would

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use paintshop_storefront::catalog::Catalog;
use paintshop_storefront::config::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "paintshop")]
#[command(author, version, about = "Paintshop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with colors and finish prices
    Catalog,
    /// List shipping options
    Shipping,
    /// List promo codes
    Promos,
    /// Price a set of cart lines
    Quote {
        /// Line as `product,color,finish,quantity` (repeatable)
        #[arg(short, long = "line", required = true)]
        lines: Vec<String>,

        /// Shipping option ID
        #[arg(short, long)]
        shipping: Option<String>,

        /// Promo code
        #[arg(short, long)]
        promo: Option<String>,

        /// Apply trade volume pricing
        #[arg(long)]
        trade: bool,

        /// Override the configured tax rate (at least 0, below 1)
        #[arg(long)]
        tax_rate: Option<Decimal>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::reference();

    match cli.command {
        Commands::Catalog => commands::catalog::products(&catalog),
        Commands::Shipping => commands::catalog::shipping(&catalog),
        Commands::Promos => commands::catalog::promos(&catalog),
        Commands::Quote {
            lines,
            shipping,
            promo,
            trade,
            tax_rate,
            json,
        } => {
            let tax_rate = match tax_rate {
                Some(rate) => rate,
                None => StorefrontConfig::from_env()?.tax_rate,
            };
            let request = commands::quote::QuoteRequest {
                lines,
                shipping,
                promo,
                trade,
            };
            let quote = commands::quote::build(&catalog, &request, tax_rate)?;
            commands::quote::print(&quote, json)?;
        }
    }
    Ok(())
}
