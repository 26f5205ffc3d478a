//! Doko CLI - Drive the cart and wishlist engine from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of a product to the cart
//! doko cart add sku-1 --price 1749 --qty 2 --name "Dhaka Topi"
//!
//! # Change a quantity (0 removes the line)
//! doko cart set sku-1 3
//!
//! # Apply a coupon and show the checkout summary
//! doko cart coupon apply DASHAIN10
//! doko cart show
//!
//! # Save a product, then move it into the cart
//! doko wishlist add sku-9 --price 2500 --name "Singing Bowl"
//! doko wishlist move-to-cart sku-9
//! ```
//!
//! State is kept in `DOKO_STATE_DIR` (default `.doko`), one JSON file per
//! store. Set `RUST_LOG=doko=debug` to see persistence activity.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doko_state::{EngineConfig, StorefrontSession};

mod commands;

#[derive(Parser)]
#[command(name = "doko")]
#[command(author, version, about = "Doko cart and wishlist tools")]
struct Cli {
    /// Directory holding cart and wishlist snapshots
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistCommand,
    },
}

#[derive(Subcommand)]
enum CartCommand {
    /// Add a product to the cart
    Add {
        /// Product ID or SKU
        id: String,

        /// Unit price in rupees
        #[arg(short, long)]
        price: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        qty: u32,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID or SKU
        id: String,
    },
    /// Set the exact quantity of a product (0 removes it)
    Set {
        /// Product ID or SKU
        id: String,

        /// New quantity
        #[arg(allow_hyphen_values = true)]
        qty: String,
    },
    /// Remove every item (the coupon is kept)
    Clear,
    /// Apply or remove a coupon
    Coupon {
        #[command(subcommand)]
        action: CouponCommand,
    },
    /// Show items and checkout totals
    Show,
}

#[derive(Subcommand)]
enum CouponCommand {
    /// Apply a coupon, replacing any active one
    Apply {
        /// Coupon code
        code: String,
    },
    /// Remove the active coupon
    Remove,
}

#[derive(Subcommand)]
enum WishlistCommand {
    /// Save a product
    Add {
        /// Product ID or SKU
        id: String,

        /// Unit price in rupees
        #[arg(short, long)]
        price: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Remove a saved product
    Remove {
        /// Product ID or SKU
        id: String,
    },
    /// Remove every saved product
    Clear,
    /// Move a saved product into the cart
    MoveToCart {
        /// Product ID or SKU
        id: String,
    },
    /// Show saved products
    Show,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for the doko_* crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "doko=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = EngineConfig::from_env()?;
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }

    let mut session = StorefrontSession::open_in_dir(&config).await;
    let mut toasts = session.notifications();

    let outcome = execute(&mut session, cli.command);

    while let Ok(toast) = toasts.try_recv() {
        tracing::info!("{}", toast.message);
    }
    session.close().await;

    outcome?;
    Ok(())
}

fn execute(
    session: &mut StorefrontSession,
    command: Commands,
) -> Result<(), commands::CommandError> {
    match command {
        Commands::Cart { action } => match action {
            CartCommand::Add {
                id,
                price,
                qty,
                name,
            } => commands::cart::add(session, &id, &price, qty, name.as_deref()),
            CartCommand::Remove { id } => commands::cart::remove(session, &id),
            CartCommand::Set { id, qty } => commands::cart::set_quantity(session, &id, &qty),
            CartCommand::Clear => {
                commands::cart::clear(session);
                Ok(())
            }
            CartCommand::Coupon { action } => match action {
                CouponCommand::Apply { code } => commands::cart::apply_coupon(session, &code),
                CouponCommand::Remove => {
                    commands::cart::remove_coupon(session);
                    Ok(())
                }
            },
            CartCommand::Show => {
                commands::cart::show(session);
                Ok(())
            }
        },
        Commands::Wishlist { action } => match action {
            WishlistCommand::Add { id, price, name } => {
                commands::wishlist::add(session, &id, &price, name.as_deref())
            }
            WishlistCommand::Remove { id } => commands::wishlist::remove(session, &id),
            WishlistCommand::Clear => {
                commands::wishlist::clear(session);
                Ok(())
            }
            WishlistCommand::MoveToCart { id } => commands::wishlist::move_to_cart(session, &id),
            WishlistCommand::Show => {
                commands::wishlist::show(session);
                Ok(())
            }
        },
    }
}
