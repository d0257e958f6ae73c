//! Lifestyle Store CLI - browse, fill a cart and check out from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! ls-cli products --category kitchen --sort price-low
//!
//! # Manage the cart (persisted in LIFESTYLE_DATA_DIR)
//! ls-cli cart add 12 --quantity 2
//! ls-cli cart show
//!
//! # Sign in (password from LIFESTYLE_PASSWORD or stdin) and check out
//! ls-cli login -e lin@example.com
//! ls-cli checkout --payment alipay
//!
//! # Track a shipment
//! ls-cli track SF1234567890
//! ```
//!
//! # Commands
//!
//! - `products`, `product`, `categories` - Catalog
//! - `cart` - Show or change the cart
//! - `searches` - Recent search terms
//! - `login`, `register`, `logout`, `whoami`, `profile`, `addresses` - Account
//! - `wishlist`, `notifications`, `payment-methods` - Saved account data
//! - `checkout`, `track` - Orders

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifestyle_store_core::{Money, PaymentMethod, ProductId, WishlistId};
use lifestyle_store_storefront::Storefront;
use lifestyle_store_storefront::catalog::{ProductQuery, SortOrder};
use lifestyle_store_storefront::config::ClientConfig;

mod commands;

#[derive(Parser)]
#[command(name = "ls-cli")]
#[command(author, version, about = "Lifestyle Store command-line client")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only these categories (repeatable)
        #[arg(short, long)]
        category: Vec<String>,

        /// Minimum price, inclusive
        #[arg(long)]
        min_price: Option<Money>,

        /// Maximum price, inclusive
        #[arg(long)]
        max_price: Option<Money>,

        /// Case-insensitive name search
        #[arg(short, long)]
        search: Option<String>,

        /// `default`, `price-low`, `price-high`, `rating` or `newest`
        #[arg(long, default_value = "default")]
        sort: SortOrder,
    },
    /// Show one product
    Product {
        id: ProductId,
    },
    /// List categories
    Categories,
    /// Show recent search terms
    Searches {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(long, env = "LIFESTYLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(long, env = "LIFESTYLE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the signed-in user's profile
    Profile,
    /// List saved shipping addresses
    Addresses,
    /// Show the wishlist
    Wishlist {
        /// Remove this wishlist entry first
        #[arg(long)]
        remove: Option<WishlistId>,
    },
    /// Show notifications
    Notifications,
    /// List saved payment methods
    PaymentMethods,
    /// Place an order for the cart
    Checkout {
        /// `alipay`, `wechat`, `card`, `bank` or `stripe`
        #[arg(short, long, default_value = "alipay")]
        payment: PaymentMethod,

        /// Address id; defaults to the default address
        #[arg(short, long)]
        address: Option<i64>,
    },
    /// Track a shipment
    Track {
        tracking_number: String,
    },
    /// Delete the persisted cart and session
    Reset,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart (default)
    Show,
    /// Add a product
    Add {
        id: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity; 0 removes it
    Set {
        id: ProductId,
        quantity: i64,
    },
    /// Remove a line
    Remove {
        id: ProductId,
    },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lifestyle_store_storefront=info,ls_cli=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let mut shop = Storefront::open(&config)?;

    match cli.command {
        Commands::Products {
            category,
            min_price,
            max_price,
            search,
            sort,
        } => {
            let query = ProductQuery {
                categories: category,
                min_price,
                max_price,
                search,
                sort,
            };
            commands::catalog::list(&mut shop, &query).await?;
        }
        Commands::Product { id } => commands::catalog::show(&shop, id).await?,
        Commands::Categories => commands::catalog::categories(&shop).await?,
        Commands::Searches { clear } => commands::catalog::searches(&mut shop, clear),
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&shop),
            CartAction::Add { id, quantity } => {
                commands::cart::add(&mut shop, id, quantity).await?;
            }
            CartAction::Set { id, quantity } => commands::cart::set(&mut shop, id, quantity),
            CartAction::Remove { id } => commands::cart::remove(&mut shop, id),
            CartAction::Clear => commands::cart::clear(&mut shop),
        },
        Commands::Login { email, password } => {
            commands::account::login(&mut shop, &email, password).await?;
        }
        Commands::Register {
            username,
            email,
            password,
        } => commands::account::register(&mut shop, &username, &email, password).await?,
        Commands::Logout => commands::account::logout(&mut shop),
        Commands::Whoami => commands::account::whoami(&shop),
        Commands::Profile => commands::account::profile(&shop).await?,
        Commands::Addresses => commands::account::addresses(&shop).await?,
        Commands::Wishlist { remove } => commands::account::wishlist(&shop, remove).await?,
        Commands::Notifications => commands::account::notifications(&shop).await?,
        Commands::PaymentMethods => commands::account::payment_methods(&shop).await?,
        Commands::Checkout { payment, address } => {
            commands::order::checkout(&mut shop, payment, address).await?;
        }
        Commands::Track { tracking_number } => {
            commands::order::track(&shop, &tracking_number).await?;
        }
        Commands::Reset => shop.reset()?,
    }

    shop.close()?;
    Ok(())
}
