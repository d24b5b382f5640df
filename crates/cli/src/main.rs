//! Khoojlo CLI - Shopping cart and checkout from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of product 7
//! khoojlo cart add 7 --quantity 2 --name "Desk Lamp" --price 19.99
//!
//! # Add a product using its catalog details
//! khoojlo cart add 12 --fetch
//!
//! # Show the cart with totals
//! khoojlo cart show
//!
//! # Place a cash-on-delivery order
//! khoojlo checkout --first-name Asha --last-name Rai \
//!     --address "12 Lake Road" --city Pokhara --phone 9800000000
//! ```
//!
//! # Commands
//!
//! - `cart` - Inspect and change the persisted cart
//! - `checkout` - Place an order for the cart
//! - `product` - Look up products and product URLs
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `khoojlo=info`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use clap::{Args, Parser, Subcommand};
use khoojlo_core::{PaymentMethod, ShippingDetails};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "khoojlo")]
#[command(author, version, about = "Khoojlo storefront cart")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout(CheckoutArgs),
    /// Look up products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart lines and totals
    Show,
    /// Print the number of units in the cart
    Count,
    /// Add units of a product
    Add {
        /// Product ID
        id: String,

        /// Units to add (anything below one adds one)
        #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
        quantity: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Unit price
        #[arg(short, long)]
        price: Option<String>,

        /// Image path or URL
        #[arg(short, long)]
        image: Option<String>,

        /// Load name, price and image from the catalog API
        #[arg(short, long, conflicts_with_all = ["name", "price", "image"])]
        fetch: bool,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        id: String,
    },
    /// Set a line's quantity (zero or less removes it)
    Set {
        /// Product ID
        id: String,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Remove every line
    Clear,
    /// Show totals
    Totals {
        /// Use checkout shipping (free over Rs500) instead of the cart page fee
        #[arg(long)]
        checkout: bool,
    },
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long, default_value = "")]
    first_name: String,

    #[arg(long, default_value = "")]
    last_name: String,

    #[arg(long, default_value = "")]
    email: String,

    /// Street address
    #[arg(long, default_value = "")]
    address: String,

    #[arg(long, default_value = "")]
    city: String,

    #[arg(long, default_value = "")]
    zip: String,

    #[arg(long, default_value = "")]
    phone: String,

    /// Pay by card instead of cash on delivery
    #[arg(long)]
    card: bool,
}

#[derive(Subcommand)]
enum ProductAction {
    /// Print the storefront URL of a product
    Url {
        /// Product ID
        id: String,
        /// Product name
        name: String,
    },
    /// Show a product from the catalog API
    Show {
        /// Product ID
        id: String,
    },
    /// Search the catalog
    Search {
        /// Search text
        query: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("khoojlo=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut out = std::io::stdout().lock();
    let result = run(cli, &mut out).await;
    let _ = out.flush();

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        if e.is_retryable() {
            tracing::info!("The cart was left unchanged; run the command again to retry");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let json = cli.json;
    match cli.command {
        Commands::Product {
            action: ProductAction::Url { id, name },
        } => commands::product::url(&id, &name, out)?,
        Commands::Product {
            action: ProductAction::Show { id },
        } => commands::product::show(&Context::open()?, &id, json, out).await?,
        Commands::Product {
            action: ProductAction::Search { query },
        } => commands::product::search(&Context::open()?, &query, json, out).await?,
        Commands::Cart { action } => {
            let ctx = Context::open()?;
            match action {
                CartAction::Show => commands::cart::show(&ctx, json, out)?,
                CartAction::Count => commands::cart::count(&ctx, out)?,
                CartAction::Add {
                    id,
                    quantity,
                    name,
                    price,
                    image,
                    fetch,
                } => {
                    let source = if fetch {
                        commands::cart::ProductSource::Catalog
                    } else {
                        commands::cart::ProductSource::Manual { name, price, image }
                    };
                    commands::cart::add(&ctx, &id, &quantity, source, json, out).await?;
                }
                CartAction::Remove { id } => commands::cart::remove(&ctx, &id, json, out)?,
                CartAction::Set { id, quantity } => {
                    commands::cart::set(&ctx, &id, &quantity, json, out)?;
                }
                CartAction::Clear => commands::cart::clear(&ctx, out)?,
                CartAction::Totals { checkout } => {
                    commands::cart::totals(&ctx, checkout, json, out)?;
                }
            }
        }
        Commands::Checkout(args) => {
            let ctx = Context::open()?;
            let details = ShippingDetails {
                first_name: args.first_name,
                last_name: args.last_name,
                email: args.email,
                address: args.address,
                city: args.city,
                zip: args.zip,
                phone: args.phone,
                payment_method: if args.card {
                    PaymentMethod::Card
                } else {
                    PaymentMethod::CashOnDelivery
                },
            };
            commands::checkout::place(&ctx, &details, json, out).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from([
            "khoojlo", "cart", "add", "7", "--quantity", "2", "--price", "19.99",
        ])
        .unwrap();
        let Commands::Cart {
            action:
                CartAction::Add {
                    id,
                    quantity,
                    price,
                    fetch,
                    ..
                },
        } = cli.command
        else {
            panic!("expected cart add");
        };
        assert_eq!(id, "7");
        assert_eq!(quantity, "2");
        assert_eq!(price.as_deref(), Some("19.99"));
        assert!(!fetch);
    }

    #[test]
    fn test_parse_negative_quantity() {
        let cli = Cli::try_parse_from(["khoojlo", "cart", "set", "7", "-5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cart { action: CartAction::Set { ref quantity, .. } } if quantity == "-5"
        ));
    }

    #[test]
    fn test_fetch_conflicts_with_manual_fields() {
        let result = Cli::try_parse_from(["khoojlo", "cart", "add", "7", "--fetch", "--name", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_json_flag() {
        let cli = Cli::try_parse_from(["khoojlo", "cart", "show", "--json"]).unwrap();
        assert!(cli.json);
    }
}
