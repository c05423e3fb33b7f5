//! Quote cart and wishlist command handlers.
//!
//! Both lists live in one JSON file at `KCAT_QUOTE_PATH`. Each command loads
//! the file, applies one change and writes it back.

use clap::Subcommand;
use kcat_core::{AppConfig, QuoteStore};
use kcat_erp::{ErpClient, ErpError};

/// Sub-commands available under `quote`.
#[derive(Debug, Subcommand)]
pub enum QuoteCommands {
    /// Add an item (or more units of it) to the quote cart
    Add {
        /// Item or variant code
        code: String,
        /// Units to add
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    /// Remove an item from the quote cart
    Remove { code: String },
    /// Replace an item's quantity
    SetQty { code: String, qty: u32 },
    /// Show the quote cart
    List,
    /// Empty the quote cart
    Clear,
}

/// Sub-commands available under `wishlist`.
#[derive(Debug, Subcommand)]
pub enum WishlistCommands {
    /// Add an item to the wishlist
    Add { code: String },
    /// Remove an item from the wishlist
    Remove { code: String },
    /// Add the item if absent, remove it if present
    Toggle { code: String },
    /// Show the wishlist
    List,
}

/// Run a `quote` sub-command.
///
/// `add` looks the item up in the ERP so the cart records its display name.
///
/// # Errors
///
/// Returns an error if the item does not exist, the quantity is zero, or the
/// quote file cannot be read or written.
pub(crate) async fn run_quote(config: &AppConfig, command: QuoteCommands) -> anyhow::Result<()> {
    let store = QuoteStore::new(&config.quote_path);
    let mut state = store.load()?;

    match command {
        QuoteCommands::Add { code, qty } => {
            let client = ErpClient::from_config(config)?;
            let item = match client.fetch_catalog_item(&code).await {
                Ok(item) => item,
                Err(ErpError::NotFound { .. }) => anyhow::bail!("item '{code}' not found"),
                Err(e) => return Err(e.into()),
            };
            let line = state.cart.add(&item.item_code, &item.item_name, qty)?;
            println!("{} x {} ({})", line.quantity, line.item_code, line.item_name);
        }
        QuoteCommands::Remove { code } => {
            if !state.cart.remove(&code) {
                anyhow::bail!("item '{code}' is not in the quote cart");
            }
            println!("removed {code}");
        }
        QuoteCommands::SetQty { code, qty } => {
            state.cart.set_quantity(&code, qty)?;
            println!("{qty} x {code}");
        }
        QuoteCommands::List => {
            print_cart(&state.cart);
            return Ok(());
        }
        QuoteCommands::Clear => {
            state.cart.clear();
            println!("quote cart cleared");
        }
    }

    store.save(&state)?;
    tracing::debug!(path = %store.path().display(), "quote store saved");
    Ok(())
}

fn print_cart(cart: &kcat_core::QuoteCart) {
    if cart.is_empty() {
        println!("quote cart is empty");
        return;
    }
    let header = format!("{:<32}{:<40}{:>6}  ADDED", "CODE", "NAME", "QTY");
    println!("{header}");
    for line in cart.lines() {
        println!(
            "{:<32}{:<40}{:>6}  {}",
            line.item_code,
            line.item_name,
            line.quantity,
            line.added_at.format("%Y-%m-%d")
        );
    }
    println!();
    println!(
        "{} line(s), {} unit(s)",
        cart.lines().len(),
        cart.total_quantity()
    );
}

/// Run a `wishlist` sub-command.
///
/// # Errors
///
/// Returns an error if the quote file cannot be read or written.
pub(crate) fn run_wishlist(config: &AppConfig, command: WishlistCommands) -> anyhow::Result<()> {
    let store = QuoteStore::new(&config.quote_path);
    let mut state = store.load()?;

    match command {
        WishlistCommands::Add { code } => {
            if state.wishlist.add(&code) {
                println!("added {code} to wishlist");
            } else {
                println!("{code} is already on the wishlist");
            }
        }
        WishlistCommands::Remove { code } => {
            if !state.wishlist.remove(&code) {
                anyhow::bail!("item '{code}' is not on the wishlist");
            }
            println!("removed {code} from wishlist");
        }
        WishlistCommands::Toggle { code } => {
            if state.wishlist.toggle(&code) {
                println!("added {code} to wishlist");
            } else {
                println!("removed {code} from wishlist");
            }
        }
        WishlistCommands::List => {
            if state.wishlist.items().is_empty() {
                println!("wishlist is empty");
            }
            for code in state.wishlist.items() {
                println!("{code}");
            }
            return Ok(());
        }
    }

    store.save(&state)?;
    Ok(())
}
